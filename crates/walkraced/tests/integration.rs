//! Integration tests for walkraced
//!
//! These tests drive the game core the way the service does: config from
//! TOML, an on-disk store, a pedometer stream and the JSON event stream.

use std::sync::Arc;
use std::time::Duration;
use walkrace_api::{EventPayload, PedometerPermission, PermissionStatus};
use walkrace_config::{GameConfig, parse_config};
use walkrace_core::{CoreEvent, Game};
use walkrace_pedometer::{
    MockPedometer, PedometerGateway, SimulatedPedometer, SimulatedSettings, StepStream,
};
use walkrace_store::{SqliteStore, Store};
use walkrace_util::MonotonicInstant;
use walkraced::{EventPublisher, to_payload};

const TEST_CONFIG: &str = r#"
config_version = 1

[service]
seed = 7

[race]
goal_steps = 500

[[race.players]]
id = "player"
name = "Hailey"
human = true

[[race.players]]
id = "ai1"
name = "Buddy"

[[race.players]]
id = "ai2"
name = "Whiskers"
"#;

fn open_store(dir: &tempfile::TempDir) -> Arc<dyn Store> {
    Arc::new(SqliteStore::open(dir.path().join("walkrace.db")).unwrap())
}

async fn next_steps(stream: &mut StepStream) -> u64 {
    tokio::time::timeout(Duration::from_secs(5), stream.recv())
        .await
        .expect("timed out waiting for steps")
        .expect("step stream closed")
        .steps
}

#[test]
fn test_config_parsing() {
    let config = parse_config(TEST_CONFIG).unwrap();
    assert_eq!(config.race.goal_steps, 500);
    assert_eq!(config.race.players.len(), 3);
    assert_eq!(config.race.human().unwrap().name, "Hailey");
    assert_eq!(config.service.seed, Some(7));
}

#[tokio::test]
async fn test_stream_driven_session() {
    let dir = tempfile::tempdir().unwrap();
    let config = parse_config(TEST_CONFIG).unwrap();
    let mock = Arc::new(MockPedometer::new());
    let mut game = Game::new(&config, mock.clone(), open_store(&dir), walkrace_util::now());

    let (events, steps) = game
        .start(walkrace_util::now(), MonotonicInstant::now())
        .await;
    assert!(matches!(events[0], CoreEvent::SessionStarted { .. }));
    let mut stream = steps.expect("tracking should have started");

    for value in [0, 50, 130] {
        assert!(mock.emit(value));
        let steps = next_steps(&mut stream).await;
        game.on_steps(steps, walkrace_util::now());
    }

    assert_eq!(game.session().session_steps(), 130);
    assert_eq!(game.session().daily_steps(), 180);

    let events = game.stop(walkrace_util::now(), MonotonicInstant::now());
    match &events[0] {
        CoreEvent::SessionStopped(result) => assert_eq!(result.session_steps, 130),
        other => panic!("Expected SessionStopped, got {:?}", other),
    }
    assert_eq!(mock.stop_count(), 1);
    assert_eq!(game.session().daily_steps(), 0);

    // The stream is released with the session
    assert!(!mock.emit(10));
}

#[tokio::test]
async fn test_totals_survive_restart() {
    let dir = tempfile::tempdir().unwrap();
    let config = parse_config(TEST_CONFIG).unwrap();

    {
        let mock = Arc::new(MockPedometer::new());
        let mut game = Game::new(&config, mock.clone(), open_store(&dir), walkrace_util::now());
        game.start(walkrace_util::now(), MonotonicInstant::now()).await;
        game.on_steps(75, walkrace_util::now());
        assert_eq!(game.session().total_steps(), 75);
    }

    let mock = Arc::new(MockPedometer::new());
    let game = Game::new(&config, mock, open_store(&dir), walkrace_util::now());
    assert!(!game.is_active());
    assert_eq!(game.session().daily_steps(), 75);
    assert_eq!(game.session().total_steps(), 75);
    assert_eq!(game.session().session_steps(), 0);
}

#[tokio::test]
async fn test_denied_permission_publishes_notice() {
    let dir = tempfile::tempdir().unwrap();
    let mock = Arc::new(MockPedometer::with_permissions(
        PedometerPermission::undetermined(),
        PedometerPermission::denied(false),
    ));
    let mut game = Game::new(
        &GameConfig::default(),
        mock.clone(),
        open_store(&dir),
        walkrace_util::now(),
    );

    let (events, steps) = game
        .start(walkrace_util::now(), MonotonicInstant::now())
        .await;
    assert!(steps.is_none());
    assert!(!game.is_active());
    assert_eq!(mock.permission_requests(), 1);

    let mut publisher = EventPublisher::new(Vec::new());
    publisher.publish_all(events);
    let out = String::from_utf8(publisher.into_inner()).unwrap();
    let event: serde_json::Value = serde_json::from_str(out.trim()).unwrap();
    assert_eq!(event["payload"]["type"], "notice_raised");
    assert_eq!(event["payload"]["kind"], "permission_denied");
    assert_eq!(event["payload"]["can_ask_again"], false);
}

#[tokio::test]
async fn test_simulated_pedometer_drives_game() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = parse_config(TEST_CONFIG).unwrap();
    config.service.accounting = walkrace_api::StepAccounting::SessionCumulative;

    let settings = SimulatedSettings {
        update_interval: Duration::from_millis(5),
        steps_per_update: 2..5,
        initial_permission: PermissionStatus::Undetermined,
        ..Default::default()
    };
    let gateway: Arc<dyn PedometerGateway> = Arc::new(SimulatedPedometer::new(settings, Some(3)));
    let mut game = Game::new(&config, gateway.clone(), open_store(&dir), walkrace_util::now());

    let (_, steps) = game
        .start(walkrace_util::now(), MonotonicInstant::now())
        .await;
    assert!(game.gate().permission().is_granted());
    let mut stream = steps.expect("tracking should have started");

    let mut last = 0;
    for _ in 0..3 {
        let steps = next_steps(&mut stream).await;
        assert!(steps > last, "cumulative count must grow");
        last = steps;
        game.on_steps(steps, walkrace_util::now());
    }

    // Cumulative accounting adds only growth, so the totals match the session
    assert_eq!(game.session().session_steps(), last);
    assert_eq!(game.session().daily_steps(), last);

    game.stop(walkrace_util::now(), MonotonicInstant::now());
    assert!(!gateway.is_tracking());
}

#[tokio::test]
async fn test_event_stream_for_a_race() {
    let dir = tempfile::tempdir().unwrap();
    let config = parse_config(TEST_CONFIG).unwrap();
    let mock = Arc::new(MockPedometer::new());
    let mut game = Game::new(&config, mock, open_store(&dir), walkrace_util::now());

    let mut payloads = Vec::new();
    let (events, _steps) = game
        .start(walkrace_util::now(), MonotonicInstant::now())
        .await;
    payloads.extend(events.into_iter().map(to_payload));
    payloads.extend(game.on_steps(600, walkrace_util::now()).into_iter().map(to_payload));

    let winner = payloads.iter().find_map(|p| match p {
        EventPayload::WinnerDeclared(w) => Some(w.clone()),
        _ => None,
    });
    let winner = winner.expect("the human passed the goal");
    assert_eq!(winner.name, "Hailey");
    assert!((100..150).contains(&winner.points));

    assert!(payloads
        .iter()
        .any(|p| matches!(p, EventPayload::StepsUpdated { session_steps: 600, .. })));
}
