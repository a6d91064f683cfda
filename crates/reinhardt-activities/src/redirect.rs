//! Navigation targets, redirects and the pre-commit redirect gate.
//!
//! Before a candidate path is committed, the [`RedirectResolver`] runs the
//! authentication gate and then asks the router hook and every activity on
//! the candidate path (shallowest first) whether navigation should go
//! elsewhere. The chain of redirects is bounded so that misconfigured
//! activities cannot loop forever.

use crate::activity::ActivityId;
use crate::error::{ActivityResult, LifecyclePhase, NavigationError, NavigationResult};
use crate::registry::ActivityRegistry;
use async_trait::async_trait;
use reinhardt_activity_urls::{ActivityPath, Arguments, UrlResult};
use std::fmt;
use std::sync::Arc;

/// Default bound on redirects followed within one navigation.
pub const DEFAULT_MAX_REDIRECTS: usize = 10;

/// Where a navigation should go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationTarget {
	/// A URL fragment matched against the route table.
	Fragment(String),
	/// A literal activity path with explicit arguments.
	Path {
		/// The activity path.
		path: ActivityPath,
		/// Arguments for the leaf activity.
		arguments: Arguments,
	},
}

impl NavigationTarget {
	/// Parses a target string, treating anything containing `::` as an
	/// activity path.
	///
	/// # Errors
	///
	/// Returns an error for a malformed activity path.
	pub fn parse(target: &str) -> UrlResult<Self> {
		if ActivityPath::looks_like_path(target) {
			Ok(Self::Path {
				path: ActivityPath::parse(target)?,
				arguments: Arguments::new(),
			})
		} else {
			Ok(Self::Fragment(target.to_string()))
		}
	}
}

impl fmt::Display for NavigationTarget {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Fragment(fragment) => write!(f, "{}", fragment),
			Self::Path { path, arguments } if arguments.is_empty() => write!(f, "{}", path),
			Self::Path { path, arguments } => write!(f, "{}{}", path, arguments),
		}
	}
}

impl From<Redirect> for NavigationTarget {
	fn from(redirect: Redirect) -> Self {
		match redirect {
			Redirect::Fragment(fragment) => Self::Fragment(fragment),
			Redirect::Path { path, arguments } => Self::Path {
				path,
				arguments: arguments.unwrap_or_default(),
			},
		}
	}
}

/// Redirect target returned by a redirect hook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Redirect {
	/// Redirect to a URL fragment.
	Fragment(String),
	/// Redirect to an activity path. Missing arguments mean empty arguments.
	Path {
		/// The activity path.
		path: ActivityPath,
		/// Optional arguments for the leaf activity.
		arguments: Option<Arguments>,
	},
}

impl Redirect {
	/// Parses a redirect string: `Path` when it contains `::`, `Fragment`
	/// otherwise.
	///
	/// # Errors
	///
	/// Returns an error for a malformed activity path.
	pub fn parse(target: &str) -> UrlResult<Self> {
		if ActivityPath::looks_like_path(target) {
			Ok(Self::Path {
				path: ActivityPath::parse(target)?,
				arguments: None,
			})
		} else {
			Ok(Self::Fragment(target.to_string()))
		}
	}

	/// Redirect to a fragment.
	pub fn fragment(fragment: impl Into<String>) -> Self {
		Self::Fragment(fragment.into())
	}

	/// Redirect to an activity path without arguments.
	pub fn path(path: ActivityPath) -> Self {
		Self::Path {
			path,
			arguments: None,
		}
	}

	/// Redirect to an activity path with arguments.
	pub fn path_with_args(path: ActivityPath, arguments: impl Into<Arguments>) -> Self {
		Self::Path {
			path,
			arguments: Some(arguments.into()),
		}
	}
}

impl fmt::Display for Redirect {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		NavigationTarget::from(self.clone()).fmt(f)
	}
}

/// Decides whether navigation to a path is allowed.
///
/// Closures `Fn(&ActivityPath, &Arguments) -> bool` implement this trait and
/// never fail.
#[async_trait]
pub trait Authenticator: Send + Sync {
	/// Returns `Ok(true)` if navigation to `path` with `arguments` may proceed.
	///
	/// An error aborts the navigation.
	async fn authenticate(&self, path: &ActivityPath, arguments: &Arguments) -> ActivityResult<bool>;
}

#[async_trait]
impl<F> Authenticator for F
where
	F: Fn(&ActivityPath, &Arguments) -> bool + Send + Sync,
{
	async fn authenticate(&self, path: &ActivityPath, arguments: &Arguments) -> ActivityResult<bool> {
		Ok(self(path, arguments))
	}
}

/// Closure computing an authentication redirect from the rejected path.
pub type AuthRedirectFn = Arc<dyn Fn(&ActivityPath, &Arguments) -> Redirect + Send + Sync>;

/// Where to send a navigation that failed authentication.
#[derive(Clone)]
pub enum AuthRedirect {
	/// A fixed redirect.
	To(Redirect),
	/// A redirect computed from the rejected path and arguments.
	With(AuthRedirectFn),
}

impl AuthRedirect {
	/// Builds a computed redirect.
	pub fn with<F>(f: F) -> Self
	where
		F: Fn(&ActivityPath, &Arguments) -> Redirect + Send + Sync + 'static,
	{
		Self::With(Arc::new(f))
	}

	/// Returns the redirect for a rejected navigation.
	pub fn resolve(&self, path: &ActivityPath, arguments: &Arguments) -> Redirect {
		match self {
			Self::To(redirect) => redirect.clone(),
			Self::With(f) => f(path, arguments),
		}
	}
}

impl From<Redirect> for AuthRedirect {
	fn from(redirect: Redirect) -> Self {
		Self::To(redirect)
	}
}

impl fmt::Debug for AuthRedirect {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::To(redirect) => f.debug_tuple("AuthRedirect::To").field(redirect).finish(),
			Self::With(_) => f.write_str("AuthRedirect::With(..)"),
		}
	}
}

/// Router-level redirect hook, consulted before any activity.
pub type RedirectHook = Arc<dyn Fn(&ActivityPath, &Arguments) -> Option<Redirect> + Send + Sync>;

/// Pre-commit redirect gate.
#[derive(Clone)]
pub struct RedirectResolver {
	max_redirects: usize,
	hook: Option<RedirectHook>,
	authenticator: Option<Arc<dyn Authenticator>>,
	authenticate_redirect: Option<AuthRedirect>,
}

impl Default for RedirectResolver {
	fn default() -> Self {
		Self::new(DEFAULT_MAX_REDIRECTS)
	}
}

impl RedirectResolver {
	/// Creates a resolver following at most `max_redirects` redirects.
	pub fn new(max_redirects: usize) -> Self {
		Self {
			max_redirects,
			hook: None,
			authenticator: None,
			authenticate_redirect: None,
		}
	}

	/// Sets the router-level redirect hook.
	pub fn with_hook(mut self, hook: RedirectHook) -> Self {
		self.hook = Some(hook);
		self
	}

	/// Sets the router-level authenticator.
	pub fn with_authenticator(mut self, authenticator: Arc<dyn Authenticator>) -> Self {
		self.authenticator = Some(authenticator);
		self
	}

	/// Sets the router-level authentication redirect.
	pub fn with_authenticate_redirect(mut self, redirect: AuthRedirect) -> Self {
		self.authenticate_redirect = Some(redirect);
		self
	}

	/// Returns the redirect bound.
	pub fn max_redirects(&self) -> usize {
		self.max_redirects
	}

	/// Runs the gate for a candidate path.
	///
	/// Returns the first redirect produced, or `None` if the candidate may
	/// be committed.
	///
	/// # Errors
	///
	/// Returns [`NavigationError::Unauthenticated`] when authentication
	/// fails without a redirect target, or [`NavigationError::Transition`]
	/// when the authenticator or an activity's redirect hook fails.
	pub async fn check(
		&self,
		registry: &mut ActivityRegistry,
		ids: &[ActivityId],
		path: &ActivityPath,
		arguments: &Arguments,
	) -> NavigationResult<Option<Redirect>> {
		let (authenticator, on_failure) = self.auth_gate(registry, ids);
		let allowed = match authenticator {
			Some(authenticator) => authenticator
				.authenticate(path, arguments)
				.await
				.map_err(|e| NavigationError::transition(path, LifecyclePhase::Authenticate, e))?,
			None => true,
		};
		if !allowed {
			return match on_failure {
				Some(redirect) => {
					let redirect = redirect.resolve(path, arguments);
					tracing::debug!(path = %path, redirect = %redirect, "authentication redirect");
					Ok(Some(redirect))
				}
				None => Err(NavigationError::Unauthenticated {
					path: path.to_string(),
				}),
			};
		}

		if let Some(hook) = &self.hook
			&& let Some(redirect) = hook(path, arguments)
		{
			tracing::debug!(path = %path, redirect = %redirect, "router redirect");
			return Ok(Some(redirect));
		}

		for &id in ids {
			let Some(node) = registry.node_mut(id) else {
				continue;
			};
			let redirect = node
				.activity
				.redirect(arguments)
				.await
				.map_err(|e| NavigationError::transition(&node.path, LifecyclePhase::Redirect, e))?;
			if let Some(redirect) = redirect {
				tracing::debug!(activity = %node.path, redirect = %redirect, "activity redirect");
				return Ok(Some(redirect));
			}
		}

		Ok(None)
	}

	/// Effective authenticator and failure redirect: the deepest activity
	/// providing one wins, then the router-level setting.
	fn auth_gate(
		&self,
		registry: &ActivityRegistry,
		ids: &[ActivityId],
	) -> (Option<Arc<dyn Authenticator>>, Option<AuthRedirect>) {
		let nodes = move || ids.iter().rev().filter_map(move |&id| registry.get(id));

		let authenticator = nodes()
			.find_map(|node| node.activity.authenticator())
			.or_else(|| self.authenticator.clone());
		let redirect = nodes()
			.find_map(|node| node.activity.authenticate_redirect())
			.or_else(|| self.authenticate_redirect.clone());

		(authenticator, redirect)
	}
}

impl fmt::Debug for RedirectResolver {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("RedirectResolver")
			.field("max_redirects", &self.max_redirects)
			.field("has_hook", &self.hook.is_some())
			.field("has_authenticator", &self.authenticator.is_some())
			.field("authenticate_redirect", &self.authenticate_redirect)
			.finish()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	fn path(s: &str) -> ActivityPath {
		ActivityPath::parse(s).unwrap()
	}

	#[rstest]
	#[case("users/42", Redirect::Fragment("users/42".to_string()))]
	#[case("Users::Detail", Redirect::Path { path: path("Users::Detail"), arguments: None })]
	fn test_redirect_parse(#[case] input: &str, #[case] expected: Redirect) {
		assert_eq!(Redirect::parse(input).unwrap(), expected);
	}

	#[rstest]
	fn test_redirect_parse_rejects_bad_path() {
		assert!(Redirect::parse("Users::").is_err());
		assert!(NavigationTarget::parse("::Detail").is_err());
	}

	#[rstest]
	fn test_path_redirect_without_arguments_uses_empty() {
		let target = NavigationTarget::from(Redirect::path(path("Login")));
		assert_eq!(
			target,
			NavigationTarget::Path {
				path: path("Login"),
				arguments: Arguments::new(),
			}
		);
	}

	#[rstest]
	fn test_display() {
		assert_eq!(Redirect::fragment("login").to_string(), "login");
		assert_eq!(
			Redirect::path_with_args(path("Users::Detail"), ["7"]).to_string(),
			"Users::Detail[7]"
		);
	}

	#[rstest]
	fn test_auth_redirect_resolve() {
		let fixed = AuthRedirect::from(Redirect::fragment("login"));
		let computed = AuthRedirect::with(|path, _args| {
			Redirect::fragment(format!("login?next={}", path))
		});
		let target = path("Admin");

		assert_eq!(
			fixed.resolve(&target, &Arguments::new()),
			Redirect::fragment("login")
		);
		assert_eq!(
			computed.resolve(&target, &Arguments::new()),
			Redirect::fragment("login?next=Admin")
		);
	}

	#[rstest]
	#[tokio::test]
	async fn test_closure_authenticator() {
		let auth = |path: &ActivityPath, _args: &Arguments| path.root() != Some("Admin");

		assert!(auth.authenticate(&path("Home"), &Arguments::new()).await.unwrap());
		assert!(!auth.authenticate(&path("Admin::Users"), &Arguments::new()).await.unwrap());
	}
}
