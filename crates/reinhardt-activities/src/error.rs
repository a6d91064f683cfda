//! Navigation error and warning types.

use crate::settings::SettingsError;
use reinhardt_activity_urls::{ActivityPath, UrlError};
use std::fmt;
use thiserror::Error;

/// Result type for navigation operations.
pub type NavigationResult<T> = Result<T, NavigationError>;

/// Result type returned by activity callbacks.
pub type ActivityResult<T = ()> = anyhow::Result<T>;

/// The lifecycle step an activity was executing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecyclePhase {
	/// `on_create`, run once per activity lifetime.
	Create,
	/// `on_start`.
	Start,
	/// `on_stop`.
	Stop,
	/// A layout callback.
	Layout,
	/// A queued task drained after a callback.
	Task,
	/// The `redirect` capability.
	Redirect,
	/// The authentication gate.
	Authenticate,
}

impl fmt::Display for LifecyclePhase {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Create => write!(f, "create"),
			Self::Start => write!(f, "start"),
			Self::Stop => write!(f, "stop"),
			Self::Layout => write!(f, "layout"),
			Self::Task => write!(f, "task"),
			Self::Redirect => write!(f, "redirect"),
			Self::Authenticate => write!(f, "authenticate"),
		}
	}
}

/// Errors surfaced by the router and transition engine.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum NavigationError {
	/// The first segment of an activity path names no registered activity.
	#[error("activity not found: {0}")]
	ActivityNotFound(String),

	/// No route pattern matches the fragment.
	#[error("route not found: {0}")]
	RouteNotFound(String),

	/// Too many redirects (or follow-up navigations) in one navigation.
	#[error("redirect chain exceeded {limit} redirects at '{target}'")]
	RedirectLoop {
		/// The configured bound.
		limit: usize,
		/// The redirect target that crossed the bound.
		target: String,
	},

	/// A lifecycle callback failed.
	#[error("activity '{activity}' failed during {phase}: {message}")]
	Transition {
		/// Activity path of the failing activity.
		activity: String,
		/// The phase that failed.
		phase: LifecyclePhase,
		/// Error message reported by the callback.
		message: String,
	},

	/// Authentication failed and no redirect target is configured.
	#[error("authentication failed for '{path}' and no redirect is configured")]
	Unauthenticated {
		/// The activity path that was guarded.
		path: String,
	},

	/// A snapshot does not hold one activity per path segment.
	#[error("snapshot of '{path}' holds {active} activities")]
	SnapshotMismatch {
		/// Number of activity ids supplied.
		active: usize,
		/// The snapshot path.
		path: String,
	},

	/// Pattern or activity path error.
	#[error(transparent)]
	Url(#[from] UrlError),

	/// Router settings error.
	#[error(transparent)]
	Settings(#[from] SettingsError),
}

impl NavigationError {
	pub(crate) fn transition(
		activity: &ActivityPath,
		phase: LifecyclePhase,
		err: anyhow::Error,
	) -> Self {
		Self::Transition {
			activity: activity.to_string(),
			phase,
			message: format!("{:#}", err),
		}
	}

	/// Returns the failing phase for [`NavigationError::Transition`].
	pub fn phase(&self) -> Option<LifecyclePhase> {
		match self {
			Self::Transition { phase, .. } => Some(*phase),
			_ => None,
		}
	}
}

/// Recoverable conditions reported alongside a navigation outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationWarning {
	/// A deeper path segment could not be resolved; the shorter path was used.
	PartialResolution {
		/// The path that was requested.
		requested: ActivityPath,
		/// The prefix that was resolved.
		resolved: ActivityPath,
	},
	/// Fragment navigation was attempted before the router was started.
	RoutingBeforeStart {
		/// The fragment that was ignored.
		target: String,
	},
}

impl fmt::Display for NavigationWarning {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::PartialResolution {
				requested,
				resolved,
			} => write!(
				f,
				"activity path '{}' resolved only up to '{}'",
				requested, resolved
			),
			Self::RoutingBeforeStart { target } => {
				write!(f, "cannot route to '{}' before the router is started", target)
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	#[case(LifecyclePhase::Create, "create")]
	#[case(LifecyclePhase::Start, "start")]
	#[case(LifecyclePhase::Stop, "stop")]
	#[case(LifecyclePhase::Layout, "layout")]
	#[case(LifecyclePhase::Task, "task")]
	#[case(LifecyclePhase::Redirect, "redirect")]
	#[case(LifecyclePhase::Authenticate, "authenticate")]
	fn test_phase_display(#[case] phase: LifecyclePhase, #[case] expected: &str) {
		assert_eq!(phase.to_string(), expected);
	}

	#[rstest]
	fn test_transition_error_display() {
		let path = ActivityPath::parse("Users::Detail").unwrap();
		let err = NavigationError::transition(
			&path,
			LifecyclePhase::Start,
			anyhow::anyhow!("database unavailable"),
		);

		assert_eq!(
			err.to_string(),
			"activity 'Users::Detail' failed during start: database unavailable"
		);
		assert_eq!(err.phase(), Some(LifecyclePhase::Start));
	}

	#[rstest]
	fn test_redirect_loop_display() {
		let err = NavigationError::RedirectLoop {
			limit: 10,
			target: "Step11".to_string(),
		};
		assert_eq!(
			err.to_string(),
			"redirect chain exceeded 10 redirects at 'Step11'"
		);
		assert_eq!(err.phase(), None);
	}

	#[rstest]
	fn test_url_error_conversion() {
		let err: NavigationError = UrlError::InvalidActivityPath("A::".to_string()).into();
		assert!(matches!(err, NavigationError::Url(_)));
		assert_eq!(err.to_string(), "invalid activity path 'A::'");
	}

	#[rstest]
	fn test_warning_display() {
		let warning = NavigationWarning::PartialResolution {
			requested: ActivityPath::parse("Users::Gone").unwrap(),
			resolved: ActivityPath::parse("Users").unwrap(),
		};
		assert_eq!(
			warning.to_string(),
			"activity path 'Users::Gone' resolved only up to 'Users'"
		);

		let warning = NavigationWarning::RoutingBeforeStart {
			target: "users".to_string(),
		};
		assert!(warning.to_string().contains("before the router is started"));
	}
}
