//! Integration tests for task queues, layouts and deferred navigation

mod common;

use common::{Behavior, EventLog, RecordingPresenter, path, recorder, recorder_with};
use reinhardt_activities::{
	ActivityRouter, Arguments, LifecyclePhase, NavigationError, RouterSettings,
};
use rstest::{fixture, rstest};

#[fixture]
fn log() -> EventLog {
	EventLog::new()
}

#[rstest]
#[tokio::test]
async fn test_task_from_on_start_runs_before_layout_callback(log: EventLog) {
	// Arrange
	let router = ActivityRouter::builder()
		.settings(RouterSettings::new().with_initial_layout("wide"))
		.activity(recorder_with(
			"Dashboard",
			&log,
			Behavior::default()
				.tasks_on_start(&["load_widgets", "load_feed"])
				.layouts(&["wide"]),
		))
		.build()
		.unwrap();

	// Act
	router.navigate_path(path("Dashboard"), Arguments::from(["7"])).await.unwrap();

	// Assert
	assert_eq!(
		log.callbacks(),
		vec![
			"Dashboard.on_create",
			"Dashboard.on_start([7])",
			"Dashboard.task(load_widgets) pending=0",
			"Dashboard.task(load_feed) pending=0",
			"Dashboard.on_layout(wide, [7])",
		]
	);
	let engine = router.engine().await;
	let id = engine.registry().id_of("Dashboard").unwrap();
	assert_eq!(engine.registry().pending_tasks(id), Some(&[][..]));
}

#[rstest]
#[tokio::test]
async fn test_failing_task_aborts_transition(log: EventLog) {
	let router = ActivityRouter::builder()
		.activity(recorder_with(
			"Report",
			&log,
			Behavior::default()
				.tasks_on_start(&["render"])
				.fail_on(LifecyclePhase::Task),
		))
		.build()
		.unwrap();

	let result = router.navigate_path(path("Report"), Arguments::new()).await;

	let err = result.unwrap_err();
	assert_eq!(err.phase(), Some(LifecyclePhase::Task));
	assert!(err.to_string().contains("task 'render'"));
}

#[rstest]
#[tokio::test]
async fn test_set_layout_broadcasts_shallowest_first(log: EventLog) {
	// Arrange
	let router = ActivityRouter::builder()
		.presenter(RecordingPresenter::new(&log))
		.activity(
			recorder_with("Shell", &log, Behavior::default().layouts(&["compact"]))
				.child(recorder("Body", &log).child(recorder_with(
					"Panel",
					&log,
					Behavior::default().layouts(&["compact", "wide"]),
				))),
		)
		.build()
		.unwrap();
	router.navigate_path(path("Shell::Body::Panel"), Arguments::from(["x"])).await.unwrap();
	log.clear();

	// Act
	let changed = router.set_layout("compact").await.unwrap();

	// Assert
	assert!(changed);
	assert_eq!(router.layout().await.as_deref(), Some("compact"));
	assert_eq!(
		log.events(),
		vec![
			"layout:none->compact",
			"Shell.on_layout(compact, [x])",
			"Panel.on_layout(compact, [x])",
		]
	);
}

#[rstest]
#[tokio::test]
async fn test_set_same_layout_does_nothing(log: EventLog) {
	let router = ActivityRouter::builder()
		.settings(RouterSettings::new().with_initial_layout("wide"))
		.presenter(RecordingPresenter::new(&log))
		.activity(recorder_with("Home", &log, Behavior::default().layouts(&["wide"])))
		.build()
		.unwrap();
	router.navigate_path(path("Home"), Arguments::new()).await.unwrap();
	log.clear();

	let changed = router.set_layout("wide").await.unwrap();

	assert!(!changed);
	assert!(log.events().is_empty());
}

#[rstest]
#[tokio::test]
async fn test_layout_callback_runs_on_start_only_for_current_layout(log: EventLog) {
	let router = ActivityRouter::builder()
		.settings(RouterSettings::new().with_initial_layout("narrow"))
		.activity(recorder_with("Home", &log, Behavior::default().layouts(&["wide"])))
		.build()
		.unwrap();

	router.navigate_path(path("Home"), Arguments::new()).await.unwrap();

	assert_eq!(log.count("Home.on_layout(wide, [])"), 0);
	assert_eq!(log.callbacks(), vec!["Home.on_create", "Home.on_start([])"]);
}

#[rstest]
#[tokio::test]
async fn test_navigation_requested_from_callback_runs_after_transition(log: EventLog) {
	// Arrange
	let router = ActivityRouter::builder()
		.activity(recorder_with(
			"Splash",
			&log,
			Behavior::default().navigate_on_start("Main::Feed"),
		))
		.activity(recorder("Main", &log).child(recorder("Feed", &log)))
		.build()
		.unwrap();

	// Act
	let outcome = router.navigate_path(path("Splash"), Arguments::new()).await.unwrap();

	// Assert
	assert!(outcome.is_committed());
	assert_eq!(router.current_path().await, path("Main::Feed"));
	assert_eq!(
		log.callbacks(),
		vec![
			"Splash.on_create",
			"Splash.on_start([])",
			"Splash.on_stop",
			"Main.on_create",
			"Main.on_start([])",
			"Feed.on_create",
			"Feed.on_start([])",
		]
	);
}

#[rstest]
#[tokio::test]
async fn test_callback_navigation_ping_pong_is_bounded(log: EventLog) {
	let router = ActivityRouter::builder()
		.activity(recorder_with("Ping", &log, Behavior::default().navigate_on_start("Pong::Ball")))
		.activity(
			recorder_with("Pong", &log, Behavior::default().navigate_on_start("Ping::Ball"))
				.child(recorder("Ball", &log)),
		)
		.build()
		.unwrap();

	let result = router.navigate_path(path("Ping"), Arguments::new()).await;

	assert!(matches!(result, Err(NavigationError::RedirectLoop { limit: 10, .. })));
	assert_eq!(router.engine().await.state(), reinhardt_activities::TransitionState::Idle);
}

#[rstest]
#[case::from_settings(RouterSettings::new().with_max_follow_ups(1), None)]
#[case::from_builder(RouterSettings::new(), Some(1))]
#[tokio::test]
async fn test_follow_up_bound_is_configurable(
	log: EventLog,
	#[case] settings: RouterSettings,
	#[case] builder_max: Option<usize>,
) {
	// Arrange
	let mut builder = ActivityRouter::builder()
		.settings(settings)
		.activity(recorder_with("First", &log, Behavior::default().navigate_on_start("Second::Step")))
		.activity(
			recorder_with("Second", &log, Behavior::default().navigate_on_start("Third::Step"))
				.child(recorder("Step", &log)),
		)
		.activity(recorder("Third", &log).child(recorder("Step", &log)));
	if let Some(max) = builder_max {
		builder = builder.max_follow_ups(max);
	}
	let router = builder.build().unwrap();

	// Act
	let result = router.navigate_path(path("First"), Arguments::new()).await;

	// Assert
	assert!(matches!(
		result,
		Err(NavigationError::RedirectLoop { limit: 1, ref target }) if target == "Third::Step"
	));
	assert_eq!(router.current_path().await, path("Second::Step"));
}

#[rstest]
#[tokio::test]
async fn test_router_from_toml_settings(log: EventLog) {
	// Arrange
	let settings = RouterSettings::from_toml_str(
		r#"
default_route = "Home"
initial_layout = "wide"

[[routes]]
pattern = "/articles/*slug"
path = "Articles"
"#,
	)
	.unwrap();
	let router = ActivityRouter::builder()
		.settings(settings)
		.activity(recorder("Home", &log))
		.activity(recorder_with("Articles", &log, Behavior::default().layouts(&["wide"])))
		.build()
		.unwrap();

	// Act
	router.start(None).await.unwrap();
	router.navigate("#/articles/2024/rust%20tips").await.unwrap();

	// Assert
	assert_eq!(router.current_path().await, path("Articles"));
	assert_eq!(
		router.current_arguments().await,
		Arguments::from(["2024/rust tips"])
	);
	assert_eq!(log.count("Articles.on_layout(wide, [2024/rust tips])"), 1);
}
