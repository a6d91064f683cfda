//! Route table mapping fragment patterns to activity paths.
//!
//! Routes are matched in reverse registration order, so a route registered
//! later overrides an earlier one that matches the same fragment. This lets
//! applications register their own routes after a set of defaults.

use crate::error::{UrlError, UrlResult};
use crate::path::{ActivityPath, Arguments};
use crate::pattern::RoutePattern;
use serde::{Deserialize, Serialize};

/// What to do when an identical pattern is registered for a different path.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DuplicatePolicy {
	/// Keep both routes; the later registration wins.
	#[default]
	Shadow,
	/// Fail with [`UrlError::DuplicatePattern`].
	Reject,
}

/// A single registered route.
#[derive(Debug, Clone)]
pub struct Route {
	pattern: RoutePattern,
	path: ActivityPath,
}

impl Route {
	/// Returns the compiled pattern.
	pub fn pattern(&self) -> &RoutePattern {
		&self.pattern
	}

	/// Returns the activity path this route resolves to.
	pub fn path(&self) -> &ActivityPath {
		&self.path
	}
}

/// Result of resolving a fragment against the table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatch {
	/// The activity path of the matched route.
	pub path: ActivityPath,
	/// Positional arguments extracted from the fragment.
	pub arguments: Arguments,
	/// The normalized pattern that matched.
	pub pattern: String,
}

/// Ordered collection of routes.
///
/// # Examples
///
/// ```
/// use reinhardt_activity_urls::{ActivityPath, RouteTable};
///
/// let mut table = RouteTable::new();
/// table.register("/", ActivityPath::parse("Home").unwrap()).unwrap();
/// table.register("/users/:id", ActivityPath::parse("Users::Detail").unwrap()).unwrap();
///
/// let found = table.resolve("/users/42").unwrap();
/// assert_eq!(found.path.to_string(), "Users::Detail");
/// assert_eq!(found.arguments.get(0), Some("42"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
	routes: Vec<Route>,
	policy: DuplicatePolicy,
}

impl RouteTable {
	/// Creates an empty table that shadows duplicate patterns.
	pub fn new() -> Self {
		Self::default()
	}

	/// Creates an empty table with the given duplicate policy.
	pub fn with_policy(policy: DuplicatePolicy) -> Self {
		Self {
			routes: Vec::new(),
			policy,
		}
	}

	/// Returns the duplicate policy.
	pub fn policy(&self) -> DuplicatePolicy {
		self.policy
	}

	/// Registers a pattern for an activity path.
	///
	/// # Errors
	///
	/// Returns [`UrlError::InvalidPattern`] if the pattern does not compile,
	/// or [`UrlError::DuplicatePattern`] under [`DuplicatePolicy::Reject`]
	/// when the same pattern already maps to a different path.
	pub fn register(&mut self, pattern: &str, path: ActivityPath) -> UrlResult<()> {
		let pattern = RoutePattern::new(pattern)?;

		if let Some(existing) = self
			.routes
			.iter()
			.rev()
			.find(|r| r.pattern == pattern && r.path != path)
		{
			match self.policy {
				DuplicatePolicy::Reject => {
					return Err(UrlError::DuplicatePattern {
						pattern: pattern.pattern().to_string(),
						existing: existing.path.to_string(),
						requested: path.to_string(),
					});
				}
				DuplicatePolicy::Shadow => {
					tracing::debug!(
						pattern = %pattern,
						existing = %existing.path,
						requested = %path,
						"route pattern shadowed by later registration"
					);
				}
			}
		}

		tracing::debug!(pattern = %pattern, path = %path, "registered route");
		self.routes.push(Route { pattern, path });
		Ok(())
	}

	/// Resolves a fragment to an activity path and its arguments.
	///
	/// Routes are tried from the most recently registered to the oldest.
	pub fn resolve(&self, fragment: &str) -> Option<RouteMatch> {
		self.routes.iter().rev().find_map(|route| {
			route.pattern.matches(fragment).map(|arguments| RouteMatch {
				path: route.path.clone(),
				arguments,
				pattern: route.pattern.pattern().to_string(),
			})
		})
	}

	/// Parses a literal `A::B::C` activity path, bypassing pattern matching.
	///
	/// # Errors
	///
	/// Returns [`UrlError::InvalidActivityPath`] for malformed strings.
	pub fn resolve_activity_path_string(&self, path: &str) -> UrlResult<ActivityPath> {
		ActivityPath::parse(path)
	}

	/// Builds a fragment that navigates to `path` with `arguments`.
	///
	/// Uses the most recently registered route targeting `path` whose
	/// parameters can be filled.
	pub fn reverse(&self, path: &ActivityPath, arguments: &Arguments) -> Option<String> {
		self.routes
			.iter()
			.rev()
			.filter(|r| &r.path == path)
			.find_map(|r| r.pattern.reverse(arguments))
	}

	/// Iterates over the routes in registration order.
	pub fn routes(&self) -> impl Iterator<Item = &Route> {
		self.routes.iter()
	}

	/// Returns the number of registered routes.
	pub fn len(&self) -> usize {
		self.routes.len()
	}

	/// Returns `true` if no route is registered.
	pub fn is_empty(&self) -> bool {
		self.routes.is_empty()
	}
}
