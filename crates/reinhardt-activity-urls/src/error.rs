//! Error types for route registration and activity path parsing.

use thiserror::Error;

/// Result type for URL and activity path operations.
pub type UrlResult<T> = Result<T, UrlError>;

/// Errors raised while compiling patterns or parsing activity paths.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum UrlError {
	/// The route pattern could not be compiled.
	#[error("invalid route pattern '{pattern}': {reason}")]
	InvalidPattern {
		/// The offending pattern.
		pattern: String,
		/// Why it was rejected.
		reason: String,
	},

	/// An identical pattern already maps to a different activity path.
	#[error("route pattern '{pattern}' already maps to '{existing}', cannot map it to '{requested}'")]
	DuplicatePattern {
		/// The duplicated pattern.
		pattern: String,
		/// Activity path of the route already registered.
		existing: String,
		/// Activity path of the rejected registration.
		requested: String,
	},

	/// An activity path string was empty or contained an empty segment.
	#[error("invalid activity path '{0}'")]
	InvalidActivityPath(String),
}

impl UrlError {
	pub(crate) fn invalid_pattern(pattern: &str, reason: impl Into<String>) -> Self {
		Self::InvalidPattern {
			pattern: pattern.to_string(),
			reason: reason.into(),
		}
	}
}
