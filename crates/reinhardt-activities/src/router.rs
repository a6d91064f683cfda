//! The public router.
//!
//! [`ActivityRouter`] owns the route table and the transition engine. Route
//! registration goes through a read/write lock so routes can be added while
//! the router is live; navigations go through an async mutex, so concurrent
//! calls run one after another in arrival order.

use crate::activity::ActivityDefinition;
use crate::error::{NavigationResult, NavigationWarning};
use crate::layout::LayoutBroadcaster;
use crate::presenter::ViewPresenter;
use crate::redirect::{AuthRedirect, Authenticator, NavigationTarget, Redirect, RedirectHook, RedirectResolver};
use crate::registry::ActivityRegistry;
use crate::settings::RouterSettings;
use crate::transition::{NavigationOutcome, TransitionEngine, TransitionSnapshot};
use parking_lot::RwLock;
use reinhardt_activity_urls::{ActivityPath, Arguments, RouteMatch, RouteTable};
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::{Mutex, MutexGuard};

/// Entry point for activity navigation.
///
/// # Examples
///
/// ```
/// use reinhardt_activities::{Activity, ActivityDefinition, ActivityRouter};
///
/// #[derive(Default)]
/// struct Home;
/// impl Activity for Home {}
///
/// # tokio_test::block_on(async {
/// let router = ActivityRouter::builder()
///     .activity(ActivityDefinition::of::<Home>("Home").route("/"))
///     .build()
///     .unwrap();
///
/// router.start(None).await.unwrap();
/// assert_eq!(router.current_path().await.to_string(), "Home");
/// # });
/// ```
pub struct ActivityRouter {
	engine: Mutex<TransitionEngine>,
	routes: Arc<RwLock<RouteTable>>,
	started: AtomicBool,
}

impl ActivityRouter {
	/// Creates a builder.
	pub fn builder() -> ActivityRouterBuilder {
		ActivityRouterBuilder::new()
	}

	/// Registers a route while the router is live.
	///
	/// # Errors
	///
	/// Returns an error if the pattern or the activity path is invalid, or
	/// if the duplicate policy rejects the pattern.
	pub fn route(&self, pattern: &str, path: &str) -> NavigationResult<()> {
		let path = ActivityPath::parse(path)?;
		self.routes.write().register(pattern, path)?;
		Ok(())
	}

	/// Matches a fragment against the route table without navigating.
	pub fn resolve_fragment(&self, fragment: &str) -> Option<RouteMatch> {
		self.routes.read().resolve(fragment)
	}

	/// Builds a fragment for `path` and `arguments` from the registered routes.
	pub fn reverse(&self, path: &ActivityPath, arguments: &Arguments) -> Option<String> {
		self.routes.read().reverse(path, arguments)
	}

	/// Marks history as started and navigates to `initial`, or to the empty
	/// fragment when `None`.
	pub async fn start(&self, initial: Option<&str>) -> NavigationResult<NavigationOutcome> {
		if self.started.swap(true, Ordering::SeqCst) {
			tracing::debug!("router already started");
		}
		let target = NavigationTarget::parse(initial.unwrap_or_default())?;
		self.engine.lock().await.navigate(target).await
	}

	/// Returns `true` once [`start`](Self::start) has been called.
	pub fn is_started(&self) -> bool {
		self.started.load(Ordering::SeqCst)
	}

	/// Navigates to a fragment or to an `A::B` activity path.
	///
	/// Fragment navigation before [`start`](Self::start) is ignored and
	/// reported as [`NavigationWarning::RoutingBeforeStart`]. Activity paths
	/// are always accepted.
	pub async fn navigate(&self, target: &str) -> NavigationResult<NavigationOutcome> {
		let target = NavigationTarget::parse(target)?;
		if let NavigationTarget::Fragment(fragment) = &target
			&& !self.is_started()
		{
			let warning = NavigationWarning::RoutingBeforeStart {
				target: fragment.clone(),
			};
			tracing::warn!(fragment = %fragment, "{}", warning);
			return Ok(NavigationOutcome::Ignored(warning));
		}
		self.engine.lock().await.navigate(target).await
	}

	/// Navigates to an activity path with explicit arguments.
	pub async fn navigate_path(
		&self,
		path: ActivityPath,
		arguments: Arguments,
	) -> NavigationResult<NavigationOutcome> {
		self.engine
			.lock()
			.await
			.navigate(NavigationTarget::Path { path, arguments })
			.await
	}

	/// Changes the layout. Returns `false` if it was already current.
	pub async fn set_layout(&self, layout: &str) -> NavigationResult<bool> {
		self.engine.lock().await.set_layout(layout).await
	}

	/// Returns the current layout.
	pub async fn layout(&self) -> Option<String> {
		self.engine.lock().await.layout().map(str::to_string)
	}

	/// Returns a copy of the active snapshot.
	pub async fn snapshot(&self) -> TransitionSnapshot {
		self.engine.lock().await.snapshot().clone()
	}

	/// Returns the active activity path.
	pub async fn current_path(&self) -> ActivityPath {
		self.engine.lock().await.snapshot().path().clone()
	}

	/// Returns the arguments of the active leaf.
	pub async fn current_arguments(&self) -> Arguments {
		self.engine.lock().await.snapshot().arguments().clone()
	}

	/// Locks the engine, waiting for any running navigation to finish.
	pub async fn engine(&self) -> MutexGuard<'_, TransitionEngine> {
		self.engine.lock().await
	}
}

impl fmt::Debug for ActivityRouter {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ActivityRouter")
			.field("routes", &self.routes.read().len())
			.field("started", &self.is_started())
			.finish_non_exhaustive()
	}
}

/// Builder for [`ActivityRouter`].
#[derive(Default)]
pub struct ActivityRouterBuilder {
	settings: RouterSettings,
	activities: Vec<ActivityDefinition>,
	routes: Vec<(String, String)>,
	presenter: Option<Arc<dyn ViewPresenter>>,
	authenticator: Option<Arc<dyn Authenticator>>,
	authenticate_redirect: Option<AuthRedirect>,
	redirect_hook: Option<RedirectHook>,
	max_follow_ups: Option<usize>,
}

impl ActivityRouterBuilder {
	/// Creates a builder with default settings.
	pub fn new() -> Self {
		Self::default()
	}

	/// Replaces the settings.
	pub fn settings(mut self, settings: RouterSettings) -> Self {
		self.settings = settings;
		self
	}

	/// Registers a root activity.
	pub fn activity(mut self, definition: ActivityDefinition) -> Self {
		self.activities.push(definition);
		self
	}

	/// Adds a route registered after every other route.
	pub fn route(mut self, pattern: impl Into<String>, path: impl Into<String>) -> Self {
		self.routes.push((pattern.into(), path.into()));
		self
	}

	/// Sets the view presenter.
	pub fn presenter<P: ViewPresenter + 'static>(mut self, presenter: P) -> Self {
		self.presenter = Some(Arc::new(presenter));
		self
	}

	/// Sets a shared view presenter.
	pub fn shared_presenter(mut self, presenter: Arc<dyn ViewPresenter>) -> Self {
		self.presenter = Some(presenter);
		self
	}

	/// Sets the router-level authenticator.
	pub fn authenticator<A: Authenticator + 'static>(mut self, authenticator: A) -> Self {
		self.authenticator = Some(Arc::new(authenticator));
		self
	}

	/// Sets the router-level authentication redirect, overriding
	/// `authenticate_redirect` from the settings.
	pub fn authenticate_redirect(mut self, redirect: impl Into<AuthRedirect>) -> Self {
		self.authenticate_redirect = Some(redirect.into());
		self
	}

	/// Sets the router-level redirect hook, consulted before activities.
	pub fn redirect<F>(mut self, hook: F) -> Self
	where
		F: Fn(&ActivityPath, &Arguments) -> Option<Redirect> + Send + Sync + 'static,
	{
		self.redirect_hook = Some(Arc::new(hook));
		self
	}

	/// Sets the bound on callback-requested navigations, overriding
	/// `max_follow_ups` from the settings.
	pub fn max_follow_ups(mut self, max: usize) -> Self {
		self.max_follow_ups = Some(max);
		self
	}

	/// Builds the router.
	///
	/// Routes are registered in this order, later ones taking precedence:
	/// the default route, routes declared by activities, routes from the
	/// settings, then routes added on the builder.
	///
	/// # Errors
	///
	/// Returns an error for invalid settings, patterns or activity paths.
	pub fn build(self) -> NavigationResult<ActivityRouter> {
		let settings = self.settings;
		settings.validate()?;

		let mut registry = ActivityRegistry::new();
		for definition in self.activities {
			registry.register(definition);
		}

		let mut table = RouteTable::with_policy(settings.duplicate_routes);
		if let Some(default) = &settings.default_route {
			table.register("", ActivityPath::parse(default)?)?;
		}
		for (pattern, path) in registry.declared_routes() {
			table.register(&pattern, path)?;
		}
		for route in &settings.routes {
			table.register(&route.pattern, ActivityPath::parse(&route.path)?)?;
		}
		for (pattern, path) in &self.routes {
			table.register(pattern, ActivityPath::parse(path)?)?;
		}
		tracing::debug!(routes = table.len(), "route table built");

		let mut redirects = RedirectResolver::new(settings.max_redirects);
		if let Some(hook) = self.redirect_hook {
			redirects = redirects.with_hook(hook);
		}
		if let Some(authenticator) = self.authenticator {
			redirects = redirects.with_authenticator(authenticator);
		}
		let authenticate_redirect = match (self.authenticate_redirect, &settings.authenticate_redirect) {
			(Some(redirect), _) => Some(redirect),
			(None, Some(target)) => Some(AuthRedirect::To(Redirect::parse(target)?)),
			(None, None) => None,
		};
		if let Some(redirect) = authenticate_redirect {
			redirects = redirects.with_authenticate_redirect(redirect);
		}

		let routes = Arc::new(RwLock::new(table));
		let mut engine = TransitionEngine::new(registry, Arc::clone(&routes))
			.with_redirects(redirects)
			.with_layouts(LayoutBroadcaster::new(settings.initial_layout))
			.with_max_follow_ups(self.max_follow_ups.unwrap_or(settings.max_follow_ups));
		if let Some(presenter) = self.presenter {
			engine = engine.with_presenter(presenter);
		}

		Ok(ActivityRouter {
			engine: Mutex::new(engine),
			routes,
			started: AtomicBool::new(false),
		})
	}
}

impl fmt::Debug for ActivityRouterBuilder {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ActivityRouterBuilder")
			.field("settings", &self.settings)
			.field("activities", &self.activities.len())
			.field("routes", &self.routes)
			.finish_non_exhaustive()
	}
}
