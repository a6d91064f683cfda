//! The transition engine.
//!
//! A navigation moves the active activity path from an old snapshot to a
//! new one. Activities shared by both paths are left alone; the rest of the
//! old path is stopped deepest-first, the snapshot is committed, and the
//! rest of the new path is started shallowest-first.
//!
//! ```text
//! old: Users::Detail(42)        new: Users::Detail(43)
//!      ^^^^^ kept                    Detail.on_stop, then Detail.on_start(43)
//! ```

use crate::activity::ActivityId;
use crate::error::{LifecyclePhase, NavigationError, NavigationResult, NavigationWarning};
use crate::layout::LayoutBroadcaster;
use crate::presenter::{NoopPresenter, ViewPresenter};
use crate::redirect::{NavigationTarget, RedirectResolver};
use crate::registry::{ActivityRegistry, ResolvedPath};
use parking_lot::RwLock;
use reinhardt_activity_urls::{ActivityPath, Arguments, RouteTable};
use std::fmt;
use std::sync::Arc;

/// Default cap on navigations requested from callbacks during one call.
pub const DEFAULT_MAX_FOLLOW_UPS: usize = 10;

/// Where the engine is in a transition.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TransitionState {
	/// No transition in progress.
	#[default]
	Idle,
	/// Resolving the target and running the redirect gate.
	Resolving,
	/// Stopping activities that leave the active path.
	CommittingStop,
	/// Starting activities that join the active path.
	CommittingStart,
}

/// The active path and the arguments it was started with.
///
/// Holds one live activity per path segment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransitionSnapshot {
	active: Vec<ActivityId>,
	path: ActivityPath,
	arguments: Arguments,
}

impl TransitionSnapshot {
	/// Creates a snapshot.
	///
	/// # Errors
	///
	/// Returns [`NavigationError::SnapshotMismatch`] unless `active` holds
	/// exactly one activity per segment of `path`.
	pub fn new(
		active: Vec<ActivityId>,
		path: ActivityPath,
		arguments: Arguments,
	) -> NavigationResult<Self> {
		if active.len() != path.len() {
			return Err(NavigationError::SnapshotMismatch {
				active: active.len(),
				path: path.to_string(),
			});
		}
		Ok(Self {
			active,
			path,
			arguments,
		})
	}

	/// Live activities from root to leaf.
	pub fn active(&self) -> &[ActivityId] {
		&self.active
	}

	/// Path of the active activities.
	pub fn path(&self) -> &ActivityPath {
		&self.path
	}

	/// Arguments passed to the leaf.
	pub fn arguments(&self) -> &Arguments {
		&self.arguments
	}

	/// Returns `true` if nothing is active.
	pub fn is_empty(&self) -> bool {
		self.active.is_empty()
	}

	/// Number of leading activities shared with the candidate path.
	///
	/// When both paths are identical but the arguments differ, the leaf is
	/// not shared so that it is restarted with the new arguments.
	pub fn common_depth(&self, path: &ActivityPath, arguments: &Arguments) -> usize {
		let mut common = self.path.common_prefix_len(path);
		if common > 0
			&& common == self.path.len()
			&& common == path.len()
			&& &self.arguments != arguments
		{
			common -= 1;
		}
		common
	}
}

/// What a navigation did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationOutcome {
	/// A new path was committed.
	Committed {
		/// The committed path.
		path: ActivityPath,
		/// Arguments passed to the leaf.
		arguments: Arguments,
		/// Recoverable conditions met on the way.
		warnings: Vec<NavigationWarning>,
	},
	/// The target equals the active path and arguments; nothing ran.
	Unchanged {
		/// Recoverable conditions met on the way.
		warnings: Vec<NavigationWarning>,
	},
	/// The navigation was not attempted.
	Ignored(NavigationWarning),
}

impl NavigationOutcome {
	/// Returns `true` for [`NavigationOutcome::Committed`].
	pub fn is_committed(&self) -> bool {
		matches!(self, Self::Committed { .. })
	}

	/// Returns the warnings attached to the outcome.
	pub fn warnings(&self) -> &[NavigationWarning] {
		match self {
			Self::Committed { warnings, .. } | Self::Unchanged { warnings } => warnings,
			Self::Ignored(warning) => std::slice::from_ref(warning),
		}
	}
}

/// A resolved, redirect-free navigation candidate.
struct Candidate {
	resolved: ResolvedPath,
	arguments: Arguments,
	warnings: Vec<NavigationWarning>,
}

/// Computes and executes transitions between active paths.
pub struct TransitionEngine {
	registry: ActivityRegistry,
	routes: Arc<RwLock<RouteTable>>,
	redirects: RedirectResolver,
	presenter: Arc<dyn ViewPresenter>,
	layouts: LayoutBroadcaster,
	snapshot: TransitionSnapshot,
	state: TransitionState,
	requests: Vec<NavigationTarget>,
	max_follow_ups: usize,
}

impl TransitionEngine {
	/// Creates an idle engine with nothing active.
	pub fn new(registry: ActivityRegistry, routes: Arc<RwLock<RouteTable>>) -> Self {
		Self {
			registry,
			routes,
			redirects: RedirectResolver::default(),
			presenter: Arc::new(NoopPresenter),
			layouts: LayoutBroadcaster::default(),
			snapshot: TransitionSnapshot::default(),
			state: TransitionState::Idle,
			requests: Vec::new(),
			max_follow_ups: DEFAULT_MAX_FOLLOW_UPS,
		}
	}

	/// Sets the redirect gate.
	pub fn with_redirects(mut self, redirects: RedirectResolver) -> Self {
		self.redirects = redirects;
		self
	}

	/// Sets the view presenter.
	pub fn with_presenter(mut self, presenter: Arc<dyn ViewPresenter>) -> Self {
		self.presenter = presenter;
		self
	}

	/// Sets the layout broadcaster.
	pub fn with_layouts(mut self, layouts: LayoutBroadcaster) -> Self {
		self.layouts = layouts;
		self
	}

	/// Starts from a fixed snapshot without running any callback.
	pub fn with_snapshot(mut self, snapshot: TransitionSnapshot) -> Self {
		self.snapshot = snapshot;
		self
	}

	/// Sets the cap on callback-requested navigations per call.
	pub fn with_max_follow_ups(mut self, max: usize) -> Self {
		self.max_follow_ups = max;
		self
	}

	/// Returns the active snapshot.
	pub fn snapshot(&self) -> &TransitionSnapshot {
		&self.snapshot
	}

	/// Returns the current state.
	pub fn state(&self) -> TransitionState {
		self.state
	}

	/// Returns the current layout.
	pub fn layout(&self) -> Option<&str> {
		self.layouts.current()
	}

	/// Returns the activity registry.
	pub fn registry(&self) -> &ActivityRegistry {
		&self.registry
	}

	/// Returns the activity registry mutably.
	pub fn registry_mut(&mut self) -> &mut ActivityRegistry {
		&mut self.registry
	}

	/// Navigates to `target`, then runs any navigation requested from
	/// callbacks in the order it was requested.
	///
	/// Returns the outcome of the last navigation that ran.
	///
	/// # Errors
	///
	/// Returns the first error of any navigation in the chain. Pending
	/// follow-up requests are discarded on error.
	pub async fn navigate(&mut self, target: NavigationTarget) -> NavigationResult<NavigationOutcome> {
		let mut outcome = self.transition(target).await?;

		let mut follow_ups = 0;
		while !self.requests.is_empty() {
			let next = self.requests.remove(0);
			follow_ups += 1;
			if follow_ups > self.max_follow_ups {
				self.requests.clear();
				return Err(NavigationError::RedirectLoop {
					limit: self.max_follow_ups,
					target: next.to_string(),
				});
			}
			tracing::debug!(request = %next, "running requested navigation");
			outcome = self.transition(next).await?;
		}

		Ok(outcome)
	}

	/// Changes the layout and runs layout callbacks on the active path.
	///
	/// Returns `false` if `layout` was already current.
	pub async fn set_layout(&mut self, layout: &str) -> NavigationResult<bool> {
		let active = self.snapshot.active.clone();
		let changed = self
			.layouts
			.set_layout(
				layout,
				&mut self.registry,
				&active,
				self.presenter.as_ref(),
				&mut self.requests,
			)
			.await;

		let changed = match changed {
			Ok(changed) => changed,
			Err(e) => {
				self.requests.clear();
				return Err(e);
			}
		};

		if !self.requests.is_empty() {
			let next = self.requests.remove(0);
			self.navigate(next).await?;
		}
		Ok(changed)
	}

	/// One navigation with its redirect chain, without follow-ups.
	async fn transition(&mut self, target: NavigationTarget) -> NavigationResult<NavigationOutcome> {
		self.state = TransitionState::Resolving;
		let result = self.run(target).await;
		self.state = TransitionState::Idle;
		if result.is_err() {
			self.requests.clear();
		}
		result
	}

	async fn run(&mut self, target: NavigationTarget) -> NavigationResult<NavigationOutcome> {
		let Candidate {
			resolved,
			arguments,
			warnings,
		} = self.resolve(target).await?;

		let common = self.snapshot.common_depth(&resolved.path, &arguments);
		if common == self.snapshot.active.len() && common == resolved.ids.len() {
			tracing::debug!(path = %resolved.path, "already active");
			return Ok(NavigationOutcome::Unchanged { warnings });
		}

		self.state = TransitionState::CommittingStop;
		self.stop_from(common).await?;

		let next = TransitionSnapshot {
			active: resolved.ids,
			path: resolved.path,
			arguments,
		};
		let previous = self.commit(next);

		self.state = TransitionState::CommittingStart;
		self.start_from(common).await?;

		tracing::info!(
			from = %previous.path,
			to = %self.snapshot.path,
			arguments = %self.snapshot.arguments,
			"transition committed"
		);
		Ok(NavigationOutcome::Committed {
			path: self.snapshot.path.clone(),
			arguments: self.snapshot.arguments.clone(),
			warnings,
		})
	}

	/// Resolves the target and follows redirects until none is produced.
	async fn resolve(&mut self, target: NavigationTarget) -> NavigationResult<Candidate> {
		let mut target = target;
		let mut warnings = Vec::new();
		let mut redirects = 0;

		loop {
			let (path, arguments) = self.locate(&target)?;
			let mut resolved = self.registry.resolve(&path)?;
			warnings.extend(resolved.dropped.take());

			let redirect = self
				.redirects
				.check(&mut self.registry, &resolved.ids, &resolved.path, &arguments)
				.await?;

			let Some(redirect) = redirect else {
				return Ok(Candidate {
					resolved,
					arguments,
					warnings,
				});
			};

			redirects += 1;
			if redirects > self.redirects.max_redirects() {
				return Err(NavigationError::RedirectLoop {
					limit: self.redirects.max_redirects(),
					target: redirect.to_string(),
				});
			}
			tracing::debug!(from = %resolved.path, to = %redirect, count = redirects, "following redirect");
			target = redirect.into();
		}
	}

	/// Maps a target to an activity path and arguments.
	fn locate(&self, target: &NavigationTarget) -> NavigationResult<(ActivityPath, Arguments)> {
		match target {
			NavigationTarget::Path { path, arguments } => Ok((path.clone(), arguments.clone())),
			NavigationTarget::Fragment(fragment) => {
				let found = self.routes.read().resolve(fragment);
				found
					.map(|m| (m.path, m.arguments))
					.ok_or_else(|| NavigationError::RouteNotFound(fragment.clone()))
			}
		}
	}

	/// Replaces the snapshot, returning the previous one.
	fn commit(&mut self, next: TransitionSnapshot) -> TransitionSnapshot {
		std::mem::replace(&mut self.snapshot, next)
	}

	/// Stops the active activities below `common`, deepest first.
	async fn stop_from(&mut self, common: usize) -> NavigationResult<()> {
		let leaving: Vec<ActivityId> = self.snapshot.active[common..].iter().rev().copied().collect();
		let layout = self.layouts.current().map(str::to_string);

		for id in leaving {
			let Some(node) = self.registry.node_mut(id) else {
				continue;
			};
			tracing::debug!(activity = %node.path, "stopping activity");
			node.stop(layout.as_deref(), &mut self.requests)
				.await
				.map_err(|e| NavigationError::transition(&node.path, LifecyclePhase::Stop, e))?;
			node.drain(layout.as_deref(), &mut self.requests).await?;
			self.presenter.dismiss_activity(&node.path);
		}
		Ok(())
	}

	/// Starts the active activities below `common`, shallowest first.
	async fn start_from(&mut self, common: usize) -> NavigationResult<()> {
		let joining: Vec<ActivityId> = self.snapshot.active[common..].to_vec();
		let arguments = self.snapshot.arguments.clone();
		let layout = self.layouts.current().map(str::to_string);

		for id in joining {
			let Some(node) = self.registry.node_mut(id) else {
				continue;
			};
			self.presenter.present_activity(&node.path);

			if !node.initialized {
				tracing::debug!(activity = %node.path, "creating activity");
				node.create(layout.as_deref(), &mut self.requests)
					.await
					.map_err(|e| NavigationError::transition(&node.path, LifecyclePhase::Create, e))?;
				node.initialized = true;
				node.drain(layout.as_deref(), &mut self.requests).await?;
			}

			tracing::debug!(activity = %node.path, arguments = %arguments, "starting activity");
			node.start(&arguments, layout.as_deref(), &mut self.requests)
				.await
				.map_err(|e| NavigationError::transition(&node.path, LifecyclePhase::Start, e))?;
			node.drain(layout.as_deref(), &mut self.requests).await?;

			if let Some(layout) = layout.as_deref() {
				LayoutBroadcaster::apply(&mut self.registry, id, layout, &mut self.requests).await?;
			}
		}
		Ok(())
	}
}

impl fmt::Debug for TransitionEngine {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("TransitionEngine")
			.field("snapshot", &self.snapshot)
			.field("state", &self.state)
			.field("layout", &self.layouts.current())
			.field("redirects", &self.redirects)
			.field("pending_requests", &self.requests.len())
			.finish_non_exhaustive()
	}
}
