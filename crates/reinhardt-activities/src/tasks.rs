//! Per-activity queue of named deferred work.
//!
//! Callbacks queue tasks by name; the transition engine drains the queue
//! after every lifecycle step, so queued work runs before the next step of
//! the same transition.

use crate::activity::{Activity, ActivityContext, ActivityId};
use crate::redirect::NavigationTarget;
use reinhardt_activity_urls::ActivityPath;

/// Ordered list of pending task names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskQueue {
	pending: Vec<String>,
}

/// A task that failed while the queue was drained.
#[derive(Debug)]
pub(crate) struct TaskFailure {
	pub(crate) task: String,
	pub(crate) error: anyhow::Error,
}

impl TaskQueue {
	/// Creates an empty queue.
	pub fn new() -> Self {
		Self::default()
	}

	/// Appends tasks. Duplicates are kept.
	pub fn enqueue<I, S>(&mut self, names: I)
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.pending.extend(names.into_iter().map(Into::into));
	}

	/// Appends only the tasks that are not already pending.
	pub fn enqueue_once<I, S>(&mut self, names: I)
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		for name in names {
			let name = name.into();
			if !self.pending.contains(&name) {
				self.pending.push(name);
			}
		}
	}

	/// Returns the pending task names in order.
	pub fn pending(&self) -> &[String] {
		&self.pending
	}

	/// Returns the number of pending tasks.
	pub fn len(&self) -> usize {
		self.pending.len()
	}

	/// Returns `true` if nothing is pending.
	pub fn is_empty(&self) -> bool {
		self.pending.is_empty()
	}

	/// Runs every task pending at call time, in order.
	///
	/// The first failure stops the drain and is returned, leaving the queue
	/// empty. After a successful drain, tasks queued by the tasks themselves
	/// stay pending for the next drain.
	pub(crate) async fn drain(
		&mut self,
		activity: &mut dyn Activity,
		id: ActivityId,
		path: &ActivityPath,
		layout: Option<&str>,
		requests: &mut Vec<NavigationTarget>,
	) -> Result<usize, TaskFailure> {
		let batch = std::mem::take(&mut self.pending);
		let count = batch.len();

		for task in batch {
			tracing::debug!(activity = %path, task = %task, "running queued task");
			let mut ctx = ActivityContext::new(id, path, layout, self, requests);
			if let Err(error) = activity.run_task(&mut ctx, &task).await {
				self.pending.clear();
				return Err(TaskFailure { task, error });
			}
		}

		Ok(count)
	}
}
