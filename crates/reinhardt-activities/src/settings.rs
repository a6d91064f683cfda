//! Router settings.
//!
//! Settings can be built in code or loaded from TOML:
//!
//! ```toml
//! initial_layout = "wide"
//! default_route = "Home"
//! authenticate_redirect = "Login"
//! max_redirects = 10
//! max_follow_ups = 10
//! duplicate_routes = "shadow"
//!
//! [[routes]]
//! pattern = "/users/:id"
//! path = "Users::Detail"
//! ```

use crate::redirect::{DEFAULT_MAX_REDIRECTS, Redirect};
use crate::transition::DEFAULT_MAX_FOLLOW_UPS;
use reinhardt_activity_urls::{ActivityPath, DuplicatePolicy};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// A route declared in settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteSetting {
	/// Fragment pattern.
	pub pattern: String,
	/// Target activity path in `A::B` form.
	pub path: String,
}

/// Configuration of an [`ActivityRouter`](crate::ActivityRouter).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouterSettings {
	/// Layout applied when the router is built.
	pub initial_layout: Option<String>,
	/// Activity path shown for the empty fragment.
	pub default_route: Option<String>,
	/// Router-level redirect used when authentication fails.
	pub authenticate_redirect: Option<String>,
	/// Bound on redirects followed within one navigation.
	pub max_redirects: usize,
	/// Bound on navigations requested from callbacks within one navigation.
	pub max_follow_ups: usize,
	/// Handling of duplicate route patterns.
	pub duplicate_routes: DuplicatePolicy,
	/// Routes registered after the routes declared by activities.
	pub routes: Vec<RouteSetting>,
}

impl Default for RouterSettings {
	fn default() -> Self {
		Self {
			initial_layout: None,
			default_route: None,
			authenticate_redirect: None,
			max_redirects: DEFAULT_MAX_REDIRECTS,
			max_follow_ups: DEFAULT_MAX_FOLLOW_UPS,
			duplicate_routes: DuplicatePolicy::default(),
			routes: Vec::new(),
		}
	}
}

impl RouterSettings {
	/// Creates default settings.
	pub fn new() -> Self {
		Self::default()
	}

	/// Parses settings from a TOML document and validates them.
	pub fn from_toml_str(contents: &str) -> Result<Self, SettingsError> {
		let settings: RouterSettings = toml::from_str(contents)
			.map_err(|e| SettingsError::ParseError(format!("TOML parse error: {}", e)))?;
		settings.validate()?;
		Ok(settings)
	}

	/// Loads settings from a TOML file.
	pub fn from_file(path: impl Into<PathBuf>) -> Result<Self, SettingsError> {
		let path = path.into();
		let contents = std::fs::read_to_string(&path).map_err(|e| {
			SettingsError::FileError(format!("Failed to read {}: {}", path.display(), e))
		})?;
		Self::from_toml_str(&contents)
	}

	/// Serializes the settings as TOML.
	pub fn to_toml_string(&self) -> Result<String, SettingsError> {
		toml::to_string(self).map_err(|e| SettingsError::SerializationError(e.to_string()))
	}

	/// Checks that paths and redirects are well formed.
	pub fn validate(&self) -> Result<(), SettingsError> {
		if self.max_redirects == 0 {
			return Err(SettingsError::ValidationError(
				"max_redirects must be at least 1".to_string(),
			));
		}
		if let Some(path) = &self.default_route {
			ActivityPath::parse(path).map_err(|e| {
				SettingsError::ValidationError(format!("default_route: {}", e))
			})?;
		}
		if let Some(target) = &self.authenticate_redirect {
			Redirect::parse(target).map_err(|e| {
				SettingsError::ValidationError(format!("authenticate_redirect: {}", e))
			})?;
		}
		for route in &self.routes {
			ActivityPath::parse(&route.path).map_err(|e| {
				SettingsError::ValidationError(format!("route '{}': {}", route.pattern, e))
			})?;
		}
		Ok(())
	}

	/// Sets the initial layout.
	pub fn with_initial_layout(mut self, layout: impl Into<String>) -> Self {
		self.initial_layout = Some(layout.into());
		self
	}

	/// Sets the activity path for the empty fragment.
	pub fn with_default_route(mut self, path: impl Into<String>) -> Self {
		self.default_route = Some(path.into());
		self
	}

	/// Adds a route.
	pub fn with_route(mut self, pattern: impl Into<String>, path: impl Into<String>) -> Self {
		self.routes.push(RouteSetting {
			pattern: pattern.into(),
			path: path.into(),
		});
		self
	}

	/// Sets the router-level authentication redirect.
	pub fn with_authenticate_redirect(mut self, target: impl Into<String>) -> Self {
		self.authenticate_redirect = Some(target.into());
		self
	}

	/// Sets the redirect bound.
	pub fn with_max_redirects(mut self, max: usize) -> Self {
		self.max_redirects = max;
		self
	}

	/// Sets the bound on callback-requested navigations.
	pub fn with_max_follow_ups(mut self, max: usize) -> Self {
		self.max_follow_ups = max;
		self
	}

	/// Sets the duplicate route policy.
	pub fn with_duplicate_routes(mut self, policy: DuplicatePolicy) -> Self {
		self.duplicate_routes = policy;
		self
	}
}

/// Errors loading or validating [`RouterSettings`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SettingsError {
	/// The settings file could not be read.
	#[error("File error: {0}")]
	FileError(String),

	/// The TOML document is malformed.
	#[error("Parse error: {0}")]
	ParseError(String),

	/// A value is well-formed TOML but not a valid setting.
	#[error("Validation error: {0}")]
	ValidationError(String),

	/// The settings could not be encoded.
	#[error("Serialization error: {0}")]
	SerializationError(String),
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use std::io::Write;

	#[rstest]
	fn test_default_settings() {
		let settings = RouterSettings::default();
		assert_eq!(settings.max_redirects, 10);
		assert_eq!(settings.max_follow_ups, 10);
		assert_eq!(settings.duplicate_routes, DuplicatePolicy::Shadow);
		assert!(settings.routes.is_empty());
		assert!(settings.validate().is_ok());
	}

	#[rstest]
	fn test_from_toml_str() {
		// Arrange
		let contents = r#"
initial_layout = "wide"
default_route = "Home"
authenticate_redirect = "Login"
duplicate_routes = "reject"
max_follow_ups = 2

[[routes]]
pattern = "/users/:id"
path = "Users::Detail"
"#;

		// Act
		let settings = RouterSettings::from_toml_str(contents).unwrap();

		// Assert
		assert_eq!(settings.initial_layout.as_deref(), Some("wide"));
		assert_eq!(settings.default_route.as_deref(), Some("Home"));
		assert_eq!(settings.max_redirects, 10);
		assert_eq!(settings.max_follow_ups, 2);
		assert_eq!(settings.duplicate_routes, DuplicatePolicy::Reject);
		assert_eq!(
			settings.routes,
			vec![RouteSetting {
				pattern: "/users/:id".to_string(),
				path: "Users::Detail".to_string(),
			}]
		);
	}

	#[rstest]
	#[case("max_redirects = \"ten\"")]
	#[case("duplicate_routes = \"sometimes\"")]
	fn test_from_toml_str_parse_errors(#[case] contents: &str) {
		let result = RouterSettings::from_toml_str(contents);
		assert!(matches!(result, Err(SettingsError::ParseError(_))));
	}

	#[rstest]
	#[case("max_redirects = 0")]
	#[case("default_route = \"Home::\"")]
	#[case("authenticate_redirect = \"::Login\"")]
	#[case("[[routes]]\npattern = \"/x\"\npath = \"\"")]
	fn test_from_toml_str_validation_errors(#[case] contents: &str) {
		let result = RouterSettings::from_toml_str(contents);
		assert!(matches!(result, Err(SettingsError::ValidationError(_))));
	}

	#[rstest]
	fn test_builder_round_trips_through_toml() {
		let settings = RouterSettings::new()
			.with_initial_layout("narrow")
			.with_default_route("Home")
			.with_route("/about", "About")
			.with_max_redirects(3)
			.with_max_follow_ups(4);

		let encoded = settings.to_toml_string().unwrap();
		let decoded = RouterSettings::from_toml_str(&encoded).unwrap();

		assert_eq!(decoded, settings);
	}

	#[rstest]
	fn test_from_file() {
		let mut file = tempfile::NamedTempFile::new().unwrap();
		writeln!(file, "default_route = \"Home\"").unwrap();

		let settings = RouterSettings::from_file(file.path()).unwrap();
		assert_eq!(settings.default_route.as_deref(), Some("Home"));

		let missing = RouterSettings::from_file("/nonexistent/router.toml");
		assert!(matches!(missing, Err(SettingsError::FileError(_))));
	}
}
