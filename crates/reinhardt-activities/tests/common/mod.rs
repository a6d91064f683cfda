//! Shared fixtures for activity router integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use parking_lot::Mutex;
use reinhardt_activities::{
	Activity, ActivityContext, ActivityDefinition, ActivityResult, Arguments, AuthRedirect,
	Authenticator, LifecyclePhase, Redirect, ViewPresenter,
};
use reinhardt_activity_urls::ActivityPath;
use std::sync::Arc;

/// Ordered record of callbacks and presenter notifications.
#[derive(Debug, Clone, Default)]
pub struct EventLog(Arc<Mutex<Vec<String>>>);

impl EventLog {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn push(&self, event: impl Into<String>) {
		self.0.lock().push(event.into());
	}

	pub fn events(&self) -> Vec<String> {
		self.0.lock().clone()
	}

	/// Events that are not presenter notifications.
	pub fn callbacks(&self) -> Vec<String> {
		self.events()
			.into_iter()
			.filter(|e| !e.starts_with("present:") && !e.starts_with("dismiss:") && !e.starts_with("layout:"))
			.collect()
	}

	pub fn count(&self, event: &str) -> usize {
		self.0.lock().iter().filter(|e| *e == event).count()
	}

	pub fn clear(&self) {
		self.0.lock().clear();
	}
}

/// Configurable behaviour of a [`Recorder`].
#[derive(Clone, Default)]
pub struct Behavior {
	pub redirect: Option<Redirect>,
	pub start_tasks: Vec<String>,
	pub layouts: Vec<String>,
	pub fail_on: Option<LifecyclePhase>,
	pub navigate_on_start: Option<String>,
	pub authenticator: Option<Arc<dyn Authenticator>>,
	pub authenticate_redirect: Option<AuthRedirect>,
}

impl Behavior {
	pub fn redirect_to(mut self, redirect: Redirect) -> Self {
		self.redirect = Some(redirect);
		self
	}

	pub fn tasks_on_start(mut self, tasks: &[&str]) -> Self {
		self.start_tasks = tasks.iter().map(|t| t.to_string()).collect();
		self
	}

	pub fn layouts(mut self, layouts: &[&str]) -> Self {
		self.layouts = layouts.iter().map(|l| l.to_string()).collect();
		self
	}

	pub fn fail_on(mut self, phase: LifecyclePhase) -> Self {
		self.fail_on = Some(phase);
		self
	}

	pub fn navigate_on_start(mut self, target: &str) -> Self {
		self.navigate_on_start = Some(target.to_string());
		self
	}

	pub fn authenticator<A: Authenticator + 'static>(mut self, authenticator: A) -> Self {
		self.authenticator = Some(Arc::new(authenticator));
		self
	}

	pub fn authenticate_redirect(mut self, redirect: impl Into<AuthRedirect>) -> Self {
		self.authenticate_redirect = Some(redirect.into());
		self
	}
}

/// Activity that records every callback into an [`EventLog`].
pub struct Recorder {
	name: String,
	log: EventLog,
	behavior: Behavior,
}

impl Recorder {
	fn fail_if(&self, phase: LifecyclePhase) -> ActivityResult {
		if self.behavior.fail_on == Some(phase) {
			anyhow::bail!("{} failed on purpose", self.name);
		}
		Ok(())
	}
}

#[async_trait]
impl Activity for Recorder {
	async fn on_create(&mut self, _ctx: &mut ActivityContext<'_>) -> ActivityResult {
		self.log.push(format!("{}.on_create", self.name));
		self.fail_if(LifecyclePhase::Create)
	}

	async fn on_start(&mut self, ctx: &mut ActivityContext<'_>, args: &Arguments) -> ActivityResult {
		self.log.push(format!("{}.on_start({})", self.name, args));
		ctx.enqueue(self.behavior.start_tasks.iter().cloned());
		if let Some(target) = &self.behavior.navigate_on_start {
			ctx.navigate(target)?;
		}
		self.fail_if(LifecyclePhase::Start)
	}

	async fn on_stop(&mut self, _ctx: &mut ActivityContext<'_>) -> ActivityResult {
		self.log.push(format!("{}.on_stop", self.name));
		self.fail_if(LifecyclePhase::Stop)
	}

	async fn redirect(&mut self, _args: &Arguments) -> ActivityResult<Option<Redirect>> {
		self.fail_if(LifecyclePhase::Redirect)?;
		Ok(self.behavior.redirect.clone())
	}

	fn handles_layout(&self, layout: &str) -> bool {
		self.behavior.layouts.iter().any(|l| l == layout)
	}

	async fn on_layout(
		&mut self,
		_ctx: &mut ActivityContext<'_>,
		layout: &str,
		args: &Arguments,
	) -> ActivityResult {
		self.log.push(format!("{}.on_layout({}, {})", self.name, layout, args));
		self.fail_if(LifecyclePhase::Layout)
	}

	async fn run_task(&mut self, ctx: &mut ActivityContext<'_>, task: &str) -> ActivityResult {
		self.log.push(format!("{}.task({}) pending={}", self.name, task, ctx.pending_tasks().len()));
		self.fail_if(LifecyclePhase::Task)
	}

	fn authenticator(&self) -> Option<Arc<dyn Authenticator>> {
		self.behavior.authenticator.clone()
	}

	fn authenticate_redirect(&self) -> Option<AuthRedirect> {
		self.behavior.authenticate_redirect.clone()
	}
}

/// Definition of a [`Recorder`] with default behaviour.
pub fn recorder(name: &str, log: &EventLog) -> ActivityDefinition {
	recorder_with(name, log, Behavior::default())
}

/// Definition of a [`Recorder`] with custom behaviour.
pub fn recorder_with(name: &str, log: &EventLog, behavior: Behavior) -> ActivityDefinition {
	let activity_name = name.to_string();
	let log = log.clone();
	ActivityDefinition::factory(name, move || -> Box<dyn Activity> {
		Box::new(Recorder {
			name: activity_name.clone(),
			log: log.clone(),
			behavior: behavior.clone(),
		})
	})
}

/// Presenter that records notifications into an [`EventLog`].
pub struct RecordingPresenter {
	log: EventLog,
}

impl RecordingPresenter {
	pub fn new(log: &EventLog) -> Self {
		Self { log: log.clone() }
	}
}

impl ViewPresenter for RecordingPresenter {
	fn present_activity(&self, path: &ActivityPath) {
		self.log.push(format!("present:{}", path));
	}

	fn dismiss_activity(&self, path: &ActivityPath) {
		self.log.push(format!("dismiss:{}", path));
	}

	fn layout_changed(&self, previous: Option<&str>, next: &str) {
		self.log.push(format!("layout:{}->{}", previous.unwrap_or("none"), next));
	}
}

/// Parses an activity path.
pub fn path(s: &str) -> ActivityPath {
	ActivityPath::parse(s).unwrap()
}
