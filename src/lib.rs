//! # Reinhardt Navigation
//!
//! Hierarchical activity routing for Reinhardt client applications.
//!
//! An application is described as a tree of long-lived activities. A URL
//! fragment such as `#/users/42` resolves to an activity path such as
//! `Users::Detail` with positional arguments, and the router moves the
//! running activities from the old path to the new one.
//!
//! ## Crates
//!
//! - [`urls`]: fragment patterns, the route table, activity paths
//! - [`activities`]: activity lifecycle, redirects, layouts, task queues
//!
//! ## Quick Example
//!
//! ```
//! use reinhardt_navigation::prelude::*;
//!
//! #[derive(Default)]
//! struct Inbox;
//!
//! #[async_trait]
//! impl Activity for Inbox {
//!     async fn on_start(&mut self, ctx: &mut ActivityContext<'_>, _args: &Arguments) -> ActivityResult {
//!         ctx.enqueue_once(["refresh"]);
//!         Ok(())
//!     }
//! }
//!
//! # tokio_test::block_on(async {
//! let router = ActivityRouter::builder()
//!     .settings(RouterSettings::new().with_default_route("Inbox"))
//!     .activity(ActivityDefinition::of::<Inbox>("Inbox").route("/inbox"))
//!     .build()
//!     .unwrap();
//!
//! router.start(None).await.unwrap();
//! assert_eq!(router.current_path().await.to_string(), "Inbox");
//! # });
//! ```

pub mod activities;
pub mod urls;

// Re-export routing primitives
pub use reinhardt_activity_urls::{
	ActivityPath, Arguments, DuplicatePolicy, RouteMatch, RoutePattern, RouteTable, UrlError,
};

// Re-export the router
pub use reinhardt_activities::{
	Activity, ActivityContext, ActivityDefinition, ActivityRouter, ActivityRouterBuilder,
	AuthRedirect, Authenticator, NavigationError, NavigationOutcome, NavigationResult,
	NavigationWarning, Redirect, RouterSettings, ViewPresenter,
};

/// Re-export commonly used types.
pub mod prelude {
	pub use reinhardt_activities::prelude::*;

	// External
	pub use async_trait::async_trait;
}
