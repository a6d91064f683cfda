//! The activity trait, its callback context and activity definitions.
//!
//! An activity is a long-lived node in the navigation tree. The router
//! instantiates it the first time a path containing it is resolved and then
//! keeps reusing the same instance, so activities may hold state across
//! navigations.

use crate::error::ActivityResult;
use crate::redirect::{AuthRedirect, Authenticator, NavigationTarget, Redirect};
use crate::tasks::TaskQueue;
use async_trait::async_trait;
use reinhardt_activity_urls::{ActivityPath, Arguments, UrlResult};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Index of a live activity inside the [`ActivityRegistry`](crate::ActivityRegistry).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ActivityId(usize);

impl ActivityId {
	pub(crate) fn new(index: usize) -> Self {
		Self(index)
	}

	/// Returns the arena index.
	pub fn index(self) -> usize {
		self.0
	}
}

impl fmt::Display for ActivityId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "#{}", self.0)
	}
}

/// A node in the activity hierarchy.
///
/// Every callback has a no-op default, so an activity only implements the
/// hooks it cares about.
///
/// # Examples
///
/// ```
/// use async_trait::async_trait;
/// use reinhardt_activities::{Activity, ActivityContext, ActivityResult, Arguments};
///
/// #[derive(Default)]
/// struct Detail {
///     user_id: Option<String>,
/// }
///
/// #[async_trait]
/// impl Activity for Detail {
///     async fn on_start(
///         &mut self,
///         ctx: &mut ActivityContext<'_>,
///         args: &Arguments,
///     ) -> ActivityResult {
///         self.user_id = args.get(0).map(str::to_string);
///         ctx.enqueue(["load_user"]);
///         Ok(())
///     }
///
///     async fn run_task(&mut self, _ctx: &mut ActivityContext<'_>, task: &str) -> ActivityResult {
///         match task {
///             "load_user" => Ok(()),
///             other => anyhow::bail!("unknown task {other}"),
///         }
///     }
/// }
/// ```
#[async_trait]
pub trait Activity: Send + 'static {
	/// Called once, the first time the activity is started.
	async fn on_create(&mut self, _ctx: &mut ActivityContext<'_>) -> ActivityResult {
		Ok(())
	}

	/// Called each time the activity becomes part of the active path.
	async fn on_start(
		&mut self,
		_ctx: &mut ActivityContext<'_>,
		_args: &Arguments,
	) -> ActivityResult {
		Ok(())
	}

	/// Called when the activity leaves the active path.
	async fn on_stop(&mut self, _ctx: &mut ActivityContext<'_>) -> ActivityResult {
		Ok(())
	}

	/// Pre-commit redirect capability.
	///
	/// Returning `Some` abandons the current candidate path and restarts
	/// resolution at the returned target.
	async fn redirect(&mut self, _args: &Arguments) -> ActivityResult<Option<Redirect>> {
		Ok(None)
	}

	/// Returns `true` if [`on_layout`](Activity::on_layout) should run for `layout`.
	fn handles_layout(&self, _layout: &str) -> bool {
		false
	}

	/// Layout callback, invoked on start and whenever the layout changes.
	async fn on_layout(
		&mut self,
		_ctx: &mut ActivityContext<'_>,
		_layout: &str,
		_args: &Arguments,
	) -> ActivityResult {
		Ok(())
	}

	/// Runs a task previously queued with [`ActivityContext::enqueue`].
	async fn run_task(&mut self, _ctx: &mut ActivityContext<'_>, task: &str) -> ActivityResult {
		tracing::debug!(task = %task, "no handler for queued task");
		Ok(())
	}

	/// Authenticator guarding this activity and its descendants.
	fn authenticator(&self) -> Option<Arc<dyn Authenticator>> {
		None
	}

	/// Redirect used when this activity's authenticator rejects a navigation.
	fn authenticate_redirect(&self) -> Option<AuthRedirect> {
		None
	}
}

/// Handle passed to every lifecycle callback.
///
/// Gives access to the activity's own task queue, the current layout and
/// deferred navigation. Navigation requested here runs after the current
/// transition has finished.
pub struct ActivityContext<'a> {
	id: ActivityId,
	path: &'a ActivityPath,
	layout: Option<&'a str>,
	tasks: &'a mut TaskQueue,
	requests: &'a mut Vec<NavigationTarget>,
}

impl<'a> ActivityContext<'a> {
	pub(crate) fn new(
		id: ActivityId,
		path: &'a ActivityPath,
		layout: Option<&'a str>,
		tasks: &'a mut TaskQueue,
		requests: &'a mut Vec<NavigationTarget>,
	) -> Self {
		Self {
			id,
			path,
			layout,
			tasks,
			requests,
		}
	}

	/// Returns the id of the activity being called.
	pub fn id(&self) -> ActivityId {
		self.id
	}

	/// Returns the full path of the activity being called.
	pub fn path(&self) -> &ActivityPath {
		self.path
	}

	/// Returns the activity's own name.
	pub fn name(&self) -> &str {
		self.path.leaf().unwrap_or_default()
	}

	/// Returns the router's current layout.
	pub fn layout(&self) -> Option<&str> {
		self.layout
	}

	/// Queues tasks to run after the current callback returns.
	pub fn enqueue<I, S>(&mut self, names: I)
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.tasks.enqueue(names);
	}

	/// Queues tasks that are not already pending.
	pub fn enqueue_once<I, S>(&mut self, names: I)
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.tasks.enqueue_once(names);
	}

	/// Returns the tasks still pending for this activity.
	pub fn pending_tasks(&self) -> &[String] {
		self.tasks.pending()
	}

	/// Requests a navigation once the current transition completes.
	///
	/// `target` is either a fragment or an `A::B` activity path.
	///
	/// # Errors
	///
	/// Returns an error if `target` looks like an activity path but is
	/// malformed.
	pub fn navigate(&mut self, target: &str) -> UrlResult<()> {
		let target = NavigationTarget::parse(target)?;
		self.requests.push(target);
		Ok(())
	}

	/// Requests a navigation to an activity path once the current transition
	/// completes.
	pub fn navigate_path(&mut self, path: ActivityPath, arguments: Arguments) {
		self.requests.push(NavigationTarget::Path { path, arguments });
	}
}

impl fmt::Debug for ActivityContext<'_> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ActivityContext")
			.field("id", &self.id)
			.field("path", &self.path.to_string())
			.field("layout", &self.layout)
			.field("pending_tasks", &self.tasks.len())
			.finish()
	}
}

/// Factory producing a fresh activity instance.
pub type ActivityFactory = Arc<dyn Fn() -> Box<dyn Activity> + Send + Sync>;

/// Where an activity instance comes from.
pub enum ActivitySource {
	/// Built on first resolution by calling the factory.
	Factory(ActivityFactory),
	/// A pre-built instance, moved into the registry on first resolution.
	Instance(Box<dyn Activity>),
}

impl ActivitySource {
	pub(crate) fn instantiate(self) -> Box<dyn Activity> {
		match self {
			Self::Factory(factory) => factory(),
			Self::Instance(activity) => activity,
		}
	}
}

impl fmt::Debug for ActivitySource {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Factory(_) => f.write_str("ActivitySource::Factory"),
			Self::Instance(_) => f.write_str("ActivitySource::Instance"),
		}
	}
}

/// Declaration of an activity, its children and the routes it publishes.
///
/// # Examples
///
/// ```
/// use reinhardt_activities::{Activity, ActivityDefinition};
///
/// #[derive(Default)]
/// struct Users;
/// impl Activity for Users {}
///
/// #[derive(Default)]
/// struct Detail;
/// impl Activity for Detail {}
///
/// let users = ActivityDefinition::of::<Users>("Users")
///     .route("/users")
///     .child(ActivityDefinition::of::<Detail>("Detail").route("/users/:id"));
///
/// assert_eq!(users.name(), "Users");
/// assert_eq!(users.children().count(), 1);
/// ```
#[derive(Debug)]
pub struct ActivityDefinition {
	name: String,
	source: Option<ActivitySource>,
	children: HashMap<String, ActivityDefinition>,
	routes: Vec<String>,
}

impl ActivityDefinition {
	/// Creates a definition from an explicit source.
	pub fn new(name: impl Into<String>, source: ActivitySource) -> Self {
		Self {
			name: name.into(),
			source: Some(source),
			children: HashMap::new(),
			routes: Vec::new(),
		}
	}

	/// Creates a definition whose instance is built with `A::default()`.
	pub fn of<A>(name: impl Into<String>) -> Self
	where
		A: Activity + Default,
	{
		Self::factory(name, || Box::new(A::default()) as Box<dyn Activity>)
	}

	/// Creates a definition built lazily by `factory`.
	pub fn factory<F>(name: impl Into<String>, factory: F) -> Self
	where
		F: Fn() -> Box<dyn Activity> + Send + Sync + 'static,
	{
		Self::new(name, ActivitySource::Factory(Arc::new(factory)))
	}

	/// Creates a definition from a pre-built instance.
	pub fn instance<A: Activity>(name: impl Into<String>, activity: A) -> Self {
		Self::new(name, ActivitySource::Instance(Box::new(activity)))
	}

	/// Adds a child activity. A child with the same name is replaced.
	pub fn child(mut self, child: ActivityDefinition) -> Self {
		self.children.insert(child.name.clone(), child);
		self
	}

	/// Declares a route pattern that resolves to this activity.
	pub fn route(mut self, pattern: impl Into<String>) -> Self {
		self.routes.push(pattern.into());
		self
	}

	/// Returns the activity name.
	pub fn name(&self) -> &str {
		&self.name
	}

	/// Iterates over the child definitions.
	pub fn children(&self) -> impl Iterator<Item = &ActivityDefinition> {
		self.children.values()
	}

	/// Returns the route patterns declared by this activity.
	pub fn routes(&self) -> &[String] {
		&self.routes
	}

	pub(crate) fn child_mut(&mut self, name: &str) -> Option<&mut ActivityDefinition> {
		self.children.get_mut(name)
	}

	pub(crate) fn take_source(&mut self) -> Option<ActivitySource> {
		self.source.take()
	}

	/// Collects `(pattern, path)` pairs for this definition and all
	/// descendants, parents before children.
	pub(crate) fn collect_routes(&self, parent: Option<&ActivityPath>, out: &mut Vec<(String, ActivityPath)>) {
		let path = match parent {
			Some(parent) => parent.child(self.name.clone()),
			None => ActivityPath::default().child(self.name.clone()),
		};
		for pattern in &self.routes {
			out.push((pattern.clone(), path.clone()));
		}

		let mut children: Vec<&ActivityDefinition> = self.children.values().collect();
		children.sort_by(|a, b| a.name.cmp(&b.name));
		for child in children {
			child.collect_routes(Some(&path), out);
		}
	}
}
