//! Arena of live activities keyed by activity path.
//!
//! Activities are instantiated lazily, the first time a path containing them
//! is resolved, and cached under their joined path string (`Users::Detail`).
//! Later resolutions reuse the cached instance, so every activity exists at
//! most once per distinct path.

use crate::activity::{Activity, ActivityContext, ActivityDefinition, ActivityId};
use crate::error::{ActivityResult, LifecyclePhase, NavigationError, NavigationResult, NavigationWarning};
use crate::redirect::NavigationTarget;
use crate::tasks::TaskQueue;
use reinhardt_activity_urls::{ActivityPath, Arguments};
use std::collections::HashMap;
use std::fmt;

/// A live activity and its bookkeeping.
pub(crate) struct ActivityNode {
	pub(crate) id: ActivityId,
	pub(crate) path: ActivityPath,
	pub(crate) parent: Option<ActivityId>,
	pub(crate) children: HashMap<String, ActivityId>,
	pub(crate) activity: Box<dyn Activity>,
	pub(crate) tasks: TaskQueue,
	pub(crate) initialized: bool,
	pub(crate) current_arguments: Option<Arguments>,
}

impl ActivityNode {
	pub(crate) async fn create(
		&mut self,
		layout: Option<&str>,
		requests: &mut Vec<NavigationTarget>,
	) -> ActivityResult {
		let mut ctx = ActivityContext::new(self.id, &self.path, layout, &mut self.tasks, requests);
		self.activity.on_create(&mut ctx).await
	}

	pub(crate) async fn start(
		&mut self,
		arguments: &Arguments,
		layout: Option<&str>,
		requests: &mut Vec<NavigationTarget>,
	) -> ActivityResult {
		self.current_arguments = Some(arguments.clone());
		let mut ctx = ActivityContext::new(self.id, &self.path, layout, &mut self.tasks, requests);
		self.activity.on_start(&mut ctx, arguments).await
	}

	pub(crate) async fn stop(
		&mut self,
		layout: Option<&str>,
		requests: &mut Vec<NavigationTarget>,
	) -> ActivityResult {
		let mut ctx = ActivityContext::new(self.id, &self.path, layout, &mut self.tasks, requests);
		self.activity.on_stop(&mut ctx).await
	}

	pub(crate) async fn layout(
		&mut self,
		layout: &str,
		requests: &mut Vec<NavigationTarget>,
	) -> ActivityResult {
		let arguments = self.current_arguments.clone().unwrap_or_default();
		let mut ctx = ActivityContext::new(self.id, &self.path, Some(layout), &mut self.tasks, requests);
		self.activity.on_layout(&mut ctx, layout, &arguments).await
	}

	/// Drains the task queue, mapping a failing task to a transition error.
	pub(crate) async fn drain(
		&mut self,
		layout: Option<&str>,
		requests: &mut Vec<NavigationTarget>,
	) -> NavigationResult<()> {
		self.tasks
			.drain(self.activity.as_mut(), self.id, &self.path, layout, requests)
			.await
			.map(|_| ())
			.map_err(|failure| {
				NavigationError::transition(
					&self.path,
					LifecyclePhase::Task,
					failure.error.context(format!("task '{}'", failure.task)),
				)
			})
	}
}

impl fmt::Debug for ActivityNode {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ActivityNode")
			.field("id", &self.id)
			.field("path", &self.path.to_string())
			.field("parent", &self.parent)
			.field("initialized", &self.initialized)
			.field("current_arguments", &self.current_arguments)
			.field("tasks", &self.tasks)
			.finish_non_exhaustive()
	}
}

/// Outcome of resolving an activity path against the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPath {
	/// Live activities from root to leaf.
	pub ids: Vec<ActivityId>,
	/// The resolved path, possibly shorter than the requested one.
	pub path: ActivityPath,
	/// Set when deeper segments had to be dropped.
	pub dropped: Option<NavigationWarning>,
}

/// Arena holding activity definitions and their live instances.
#[derive(Debug, Default)]
pub struct ActivityRegistry {
	definitions: HashMap<String, ActivityDefinition>,
	nodes: Vec<ActivityNode>,
	by_path: HashMap<String, ActivityId>,
}

impl ActivityRegistry {
	/// Creates an empty registry.
	pub fn new() -> Self {
		Self::default()
	}

	/// Registers a root activity definition.
	///
	/// A root with the same name replaces the previous definition; already
	/// instantiated activities are kept.
	pub fn register(&mut self, definition: ActivityDefinition) {
		tracing::debug!(activity = %definition.name(), "registered root activity");
		self.definitions
			.insert(definition.name().to_string(), definition);
	}

	/// Returns the `(pattern, path)` routes declared by all definitions,
	/// parents before children.
	pub fn declared_routes(&self) -> Vec<(String, ActivityPath)> {
		let mut roots: Vec<&ActivityDefinition> = self.definitions.values().collect();
		roots.sort_by(|a, b| a.name().cmp(b.name()));

		let mut routes = Vec::new();
		for root in roots {
			root.collect_routes(None, &mut routes);
		}
		routes
	}

	/// Resolves `path` into live activities, instantiating missing ones.
	///
	/// # Errors
	///
	/// Returns [`NavigationError::ActivityNotFound`] if the first segment
	/// names no registered activity. Unknown deeper segments are dropped and
	/// reported through [`ResolvedPath::dropped`].
	pub fn resolve(&mut self, path: &ActivityPath) -> NavigationResult<ResolvedPath> {
		let Some(mut def) = path.root().and_then(|root| self.definitions.get_mut(root)) else {
			return Err(NavigationError::ActivityNotFound(path.to_string()));
		};
		let mut ids = Vec::with_capacity(path.len());
		let mut parent: Option<ActivityId> = None;
		let mut depth = 0;

		loop {
			let key = path.key_at(depth);
			let id = match self.by_path.get(&key) {
				Some(id) => *id,
				None => {
					let Some(source) = def.take_source() else {
						return Err(NavigationError::ActivityNotFound(key));
					};
					let id = ActivityId::new(self.nodes.len());
					tracing::debug!(activity = %key, id = %id, "instantiated activity");
					self.nodes.push(ActivityNode {
						id,
						path: path.prefix(depth + 1),
						parent,
						children: HashMap::new(),
						activity: source.instantiate(),
						tasks: TaskQueue::new(),
						initialized: false,
						current_arguments: None,
					});
					if let Some(parent) = parent {
						self.nodes[parent.index()]
							.children
							.insert(def.name().to_string(), id);
					}
					self.by_path.insert(key, id);
					id
				}
			};
			ids.push(id);
			parent = Some(id);

			depth += 1;
			let Some(name) = path.get(depth) else {
				break;
			};
			match def.child_mut(name) {
				Some(child) => def = child,
				None => break,
			}
		}

		let resolved = path.prefix(ids.len());
		let dropped = (resolved.len() < path.len()).then(|| {
			let warning = NavigationWarning::PartialResolution {
				requested: path.clone(),
				resolved: resolved.clone(),
			};
			tracing::warn!(requested = %path, resolved = %resolved, "{}", warning);
			warning
		});

		Ok(ResolvedPath {
			ids,
			path: resolved,
			dropped,
		})
	}

	pub(crate) fn get(&self, id: ActivityId) -> Option<&ActivityNode> {
		self.nodes.get(id.index())
	}

	pub(crate) fn node_mut(&mut self, id: ActivityId) -> Option<&mut ActivityNode> {
		self.nodes.get_mut(id.index())
	}

	/// Returns the id of the live activity at `path` (`A::B` form).
	pub fn id_of(&self, path: &str) -> Option<ActivityId> {
		self.by_path.get(path).copied()
	}

	/// Returns the activity's own name.
	pub fn name(&self, id: ActivityId) -> Option<&str> {
		self.get(id).and_then(|node| node.path.leaf())
	}

	/// Returns the activity's full path.
	pub fn path(&self, id: ActivityId) -> Option<&ActivityPath> {
		self.get(id).map(|node| &node.path)
	}

	/// Returns the parent activity, if any.
	pub fn parent(&self, id: ActivityId) -> Option<ActivityId> {
		self.get(id).and_then(|node| node.parent)
	}

	/// Returns the live child named `name`.
	pub fn child(&self, id: ActivityId, name: &str) -> Option<ActivityId> {
		self.get(id).and_then(|node| node.children.get(name).copied())
	}

	/// Returns `true` once `on_create` has succeeded for the activity.
	pub fn is_initialized(&self, id: ActivityId) -> bool {
		self.get(id).is_some_and(|node| node.initialized)
	}

	/// Returns the arguments passed to the activity's last `on_start`.
	pub fn current_arguments(&self, id: ActivityId) -> Option<&Arguments> {
		self.get(id).and_then(|node| node.current_arguments.as_ref())
	}

	/// Returns the tasks pending for the activity.
	pub fn pending_tasks(&self, id: ActivityId) -> Option<&[String]> {
		self.get(id).map(|node| node.tasks.pending())
	}

	/// Returns the number of live activities.
	pub fn len(&self) -> usize {
		self.nodes.len()
	}

	/// Returns `true` if no activity has been instantiated.
	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty()
	}
}
