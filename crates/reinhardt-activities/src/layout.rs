//! Layout broadcasting over the active activity path.

use crate::activity::ActivityId;
use crate::error::{LifecyclePhase, NavigationError, NavigationResult};
use crate::presenter::ViewPresenter;
use crate::redirect::NavigationTarget;
use crate::registry::ActivityRegistry;

/// Tracks the current layout and fans layout changes out to activities.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LayoutBroadcaster {
	current: Option<String>,
}

impl LayoutBroadcaster {
	/// Creates a broadcaster with an initial layout.
	///
	/// The initial layout is recorded without invoking any callback.
	pub fn new(initial: Option<String>) -> Self {
		Self { current: initial }
	}

	/// Returns the current layout.
	pub fn current(&self) -> Option<&str> {
		self.current.as_deref()
	}

	/// Switches to `layout` and notifies the active path shallowest-first.
	///
	/// Returns `false` without doing anything when `layout` is already
	/// current.
	pub(crate) async fn set_layout(
		&mut self,
		layout: &str,
		registry: &mut ActivityRegistry,
		active: &[ActivityId],
		presenter: &dyn ViewPresenter,
		requests: &mut Vec<NavigationTarget>,
	) -> NavigationResult<bool> {
		if self.current.as_deref() == Some(layout) {
			return Ok(false);
		}

		let previous = self.current.replace(layout.to_string());
		tracing::info!(previous = ?previous, layout = %layout, "layout changed");
		presenter.layout_changed(previous.as_deref(), layout);

		for &id in active {
			Self::apply(registry, id, layout, requests).await?;
		}
		Ok(true)
	}

	/// Runs the layout callback of one activity if it handles `layout`,
	/// then drains its tasks.
	pub(crate) async fn apply(
		registry: &mut ActivityRegistry,
		id: ActivityId,
		layout: &str,
		requests: &mut Vec<NavigationTarget>,
	) -> NavigationResult<()> {
		let Some(node) = registry.node_mut(id) else {
			return Ok(());
		};
		if !node.activity.handles_layout(layout) {
			return Ok(());
		}

		tracing::debug!(activity = %node.path, layout = %layout, "layout callback");
		node.layout(layout, requests)
			.await
			.map_err(|e| NavigationError::transition(&node.path, LifecyclePhase::Layout, e))?;
		node.drain(Some(layout), requests).await
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::activity::{Activity, ActivityContext, ActivityDefinition};
	use crate::error::ActivityResult;
	use crate::presenter::NoopPresenter;
	use async_trait::async_trait;
	use parking_lot::Mutex;
	use reinhardt_activity_urls::{ActivityPath, Arguments};
	use rstest::rstest;
	use std::sync::Arc;

	struct Wide {
		log: Arc<Mutex<Vec<String>>>,
	}

	#[async_trait]
	impl Activity for Wide {
		fn handles_layout(&self, layout: &str) -> bool {
			layout == "wide"
		}

		async fn on_layout(
			&mut self,
			ctx: &mut ActivityContext<'_>,
			layout: &str,
			_args: &Arguments,
		) -> ActivityResult {
			self.log.lock().push(format!("{}:{}", ctx.name(), layout));
			Ok(())
		}
	}

	fn setup(log: &Arc<Mutex<Vec<String>>>) -> (ActivityRegistry, Vec<ActivityId>) {
		let outer = Arc::clone(log);
		let inner = Arc::clone(log);
		let mut registry = ActivityRegistry::new();
		registry.register(
			ActivityDefinition::instance("Outer", Wide { log: outer })
				.child(ActivityDefinition::instance("Inner", Wide { log: inner })),
		);
		let resolved = registry
			.resolve(&ActivityPath::parse("Outer::Inner").unwrap())
			.unwrap();
		(registry, resolved.ids)
	}

	#[rstest]
	#[tokio::test]
	async fn test_set_layout_notifies_shallowest_first() {
		// Arrange
		let log = Arc::new(Mutex::new(Vec::new()));
		let (mut registry, active) = setup(&log);
		let mut layouts = LayoutBroadcaster::new(None);
		let mut requests = Vec::new();

		// Act
		let changed = layouts
			.set_layout("wide", &mut registry, &active, &NoopPresenter, &mut requests)
			.await
			.unwrap();

		// Assert
		assert!(changed);
		assert_eq!(layouts.current(), Some("wide"));
		assert_eq!(*log.lock(), vec!["Outer:wide", "Inner:wide"]);
	}

	#[rstest]
	#[tokio::test]
	async fn test_same_layout_is_a_no_op() {
		let log = Arc::new(Mutex::new(Vec::new()));
		let (mut registry, active) = setup(&log);
		let mut layouts = LayoutBroadcaster::new(Some("wide".to_string()));
		let mut requests = Vec::new();

		let changed = layouts
			.set_layout("wide", &mut registry, &active, &NoopPresenter, &mut requests)
			.await
			.unwrap();

		assert!(!changed);
		assert!(log.lock().is_empty());
	}

	#[rstest]
	#[tokio::test]
	async fn test_unhandled_layout_skips_callbacks() {
		let log = Arc::new(Mutex::new(Vec::new()));
		let (mut registry, active) = setup(&log);
		let mut layouts = LayoutBroadcaster::new(Some("wide".to_string()));
		let mut requests = Vec::new();

		let changed = layouts
			.set_layout("narrow", &mut registry, &active, &NoopPresenter, &mut requests)
			.await
			.unwrap();

		assert!(changed);
		assert_eq!(layouts.current(), Some("narrow"));
		assert!(log.lock().is_empty());
	}
}
