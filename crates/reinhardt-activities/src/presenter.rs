//! Interface to the view layer.
//!
//! The router never renders anything itself. It tells a [`ViewPresenter`]
//! which activities become visible, which are dismissed, and when the layout
//! changes.

use reinhardt_activity_urls::ActivityPath;

/// Receives view-level notifications from the transition engine.
///
/// All methods default to doing nothing.
pub trait ViewPresenter: Send + Sync {
	/// An activity is about to start and should be shown.
	fn present_activity(&self, _path: &ActivityPath) {}

	/// An activity has stopped and should be hidden.
	fn dismiss_activity(&self, _path: &ActivityPath) {}

	/// The router layout changed from `previous` to `next`.
	fn layout_changed(&self, _previous: Option<&str>, _next: &str) {}
}

/// Presenter that ignores every notification.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopPresenter;

impl ViewPresenter for NoopPresenter {}
