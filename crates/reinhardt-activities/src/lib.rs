//! Hierarchical activity lifecycle engine for Reinhardt navigation.
//!
//! An application is a tree of long-lived *activities*. Navigating to a
//! fragment such as `/users/42` resolves to an activity path such as
//! `Users::Detail` with arguments `["42"]`. The router then moves the active
//! path from its current value to the new one:
//!
//! 1. activities only on the old path are stopped, deepest first
//! 2. the new path is committed
//! 3. activities only on the new path are started, shallowest first
//!
//! Activities shared by both paths are left running. Before anything is
//! committed, an authentication gate and per-activity redirect hooks may
//! send the navigation elsewhere.
//!
//! # Quick Start
//!
//! ```
//! use async_trait::async_trait;
//! use reinhardt_activities::prelude::*;
//!
//! #[derive(Default)]
//! struct Users;
//! impl Activity for Users {}
//!
//! #[derive(Default)]
//! struct Detail;
//!
//! #[async_trait]
//! impl Activity for Detail {
//!     async fn on_start(&mut self, ctx: &mut ActivityContext<'_>, args: &Arguments) -> ActivityResult {
//!         tracing::info!(user = ?args.get(0), "showing user");
//!         ctx.enqueue(["load"]);
//!         Ok(())
//!     }
//! }
//!
//! # tokio_test::block_on(async {
//! let router = ActivityRouter::builder()
//!     .activity(
//!         ActivityDefinition::of::<Users>("Users")
//!             .child(ActivityDefinition::of::<Detail>("Detail").route("/users/:id")),
//!     )
//!     .build()
//!     .unwrap();
//!
//! router.start(Some("/users/42")).await.unwrap();
//! assert_eq!(router.current_path().await.to_string(), "Users::Detail");
//! assert_eq!(router.current_arguments().await.get(0), Some("42"));
//! # });
//! ```

#![warn(missing_docs)]

pub mod activity;
pub mod error;
pub mod layout;
pub mod presenter;
pub mod redirect;
pub mod registry;
pub mod router;
pub mod settings;
pub mod tasks;
pub mod transition;

pub use activity::{
	Activity, ActivityContext, ActivityDefinition, ActivityFactory, ActivityId, ActivitySource,
};
pub use error::{
	ActivityResult, LifecyclePhase, NavigationError, NavigationResult, NavigationWarning,
};
pub use layout::LayoutBroadcaster;
pub use presenter::{NoopPresenter, ViewPresenter};
pub use redirect::{
	AuthRedirect, AuthRedirectFn, Authenticator, DEFAULT_MAX_REDIRECTS, NavigationTarget,
	Redirect, RedirectHook, RedirectResolver,
};
pub use registry::{ActivityRegistry, ResolvedPath};
pub use reinhardt_activity_urls::{
	ActivityPath, Arguments, DuplicatePolicy, RouteMatch, RoutePattern, RouteTable, UrlError,
};
pub use router::{ActivityRouter, ActivityRouterBuilder};
pub use settings::{RouteSetting, RouterSettings, SettingsError};
pub use tasks::TaskQueue;
pub use transition::{
	DEFAULT_MAX_FOLLOW_UPS, NavigationOutcome, TransitionEngine, TransitionSnapshot,
	TransitionState,
};

/// Re-export commonly used types.
pub mod prelude {
	pub use crate::activity::{Activity, ActivityContext, ActivityDefinition, ActivityId};
	pub use crate::error::{ActivityResult, NavigationError, NavigationResult, NavigationWarning};
	pub use crate::presenter::{NoopPresenter, ViewPresenter};
	pub use crate::redirect::{AuthRedirect, Authenticator, Redirect};
	pub use crate::router::ActivityRouter;
	pub use crate::settings::RouterSettings;
	pub use crate::transition::NavigationOutcome;
	pub use reinhardt_activity_urls::{ActivityPath, Arguments};
}
