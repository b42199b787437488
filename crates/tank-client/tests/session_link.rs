//! Session link behaviour against the in-memory transport.
//!
//! All tests run on paused time, so reconnect delays elapse instantly and
//! attempt timestamps are exact.

use std::sync::Arc;
use std::time::Duration;

use tank_client::application::notices::NoticeBoard;
use tank_client::application::telemetry::{TelemetryStore, TelemetryView};
use tank_client::infrastructure::session::MockTransport;
use tank_client::infrastructure::{SessionConfig, SessionLink};
use tank_core::{Command, ConnectivityState, Direction, Position, StepSize};

const ENDPOINT: &str = "ws://rig.test/ws";

fn open(transport: &MockTransport) -> (SessionLink, TelemetryView, Arc<NoticeBoard>) {
    let store = Arc::new(TelemetryStore::new());
    let notices = Arc::new(NoticeBoard::default());
    let view = store.view();
    let link = SessionLink::open(
        transport.clone(),
        SessionConfig::new(ENDPOINT),
        store,
        Arc::clone(&notices),
    );
    (link, view, notices)
}

async fn settle() {
    tokio::time::sleep(Duration::from_millis(10)).await;
}

fn position_frame(x: f64, y: f64, z: f64) -> String {
    format!(r#"{{"type":"position","position":{{"x":{x},"y":{y},"z":{z}}}}}"#)
}

#[tokio::test(start_paused = true)]
async fn test_refused_server_is_retried_at_constant_delay() {
    // Arrange
    let transport = MockTransport::refusing();

    // Act
    let (link, _view, _) = open(&transport);
    tokio::time::sleep(Duration::from_millis(3500)).await;

    // Assert: attempts at t = 0, 1, 2, 3 s
    let times = transport.attempt_times();
    assert_eq!(times.len(), 4);
    for pair in times.windows(2) {
        assert_eq!(pair[1] - pair[0], Duration::from_secs(1));
    }
    assert_eq!(link.connectivity(), ConnectivityState::Reconnecting);
    link.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_reconnects_after_server_drops_connection() {
    // Arrange
    let transport = MockTransport::new();
    let (link, mut view, _) = open(&transport);
    assert!(view.wait_for_connectivity(ConnectivityState::Open).await);

    // Act
    transport.drop_connection();
    assert!(view.wait_for_connectivity(ConnectivityState::Reconnecting).await);
    assert!(view.wait_for_connectivity(ConnectivityState::Open).await);

    // Assert
    assert_eq!(transport.connect_attempts(), 2);
    assert_eq!(transport.endpoints(), vec![ENDPOINT.to_string(); 2]);
    link.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_during_backoff_prevents_further_attempts() {
    // Arrange
    let transport = MockTransport::refusing();
    let (link, mut view, _) = open(&transport);
    assert!(view.wait_for_connectivity(ConnectivityState::Reconnecting).await);

    // Act
    link.shutdown().await;
    tokio::time::sleep(Duration::from_secs(10)).await;

    // Assert
    assert_eq!(transport.connect_attempts(), 1);
    assert_eq!(view.connectivity(), ConnectivityState::Closed);
}

#[tokio::test(start_paused = true)]
async fn test_commands_sent_while_down_are_never_delivered() {
    // Arrange
    let transport = MockTransport::refusing();
    let (link, mut view, _) = open(&transport);
    assert!(view.wait_for_connectivity(ConnectivityState::Reconnecting).await);

    // Act
    link.send(Command::Move {
        direction: Direction::Left,
        step: StepSize::COARSE,
    });
    link.send(Command::ReadPressure);
    transport.set_refusing(false);
    assert!(view.wait_for_connectivity(ConnectivityState::Open).await);
    settle().await;

    // Assert
    assert!(transport.sent_frames().is_empty());
    link.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_latest_position_frame_wins() {
    // Arrange
    let transport = MockTransport::new();
    let (link, mut view, _) = open(&transport);
    view.wait_for_connectivity(ConnectivityState::Open).await;

    // Act
    transport.push_inbound(position_frame(1.0, -2.0, 170.0));
    transport.push_inbound(position_frame(4.5, -6.0, 160.0));
    settle().await;

    // Assert
    assert_eq!(view.reported_position(), Some(Position::new(4.5, -6.0, 160.0)));
    link.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_pressure_frame_updates_only_pressure() {
    let transport = MockTransport::new();
    let (link, mut view, _) = open(&transport);
    view.wait_for_connectivity(ConnectivityState::Open).await;

    transport.push_inbound(r#"{"type":"pressure","pressure":101.3}"#);
    settle().await;

    let snapshot = view.snapshot();
    assert_eq!(snapshot.pressure.map(|p| p.kilopascals()), Some(101.3));
    assert!(!snapshot.position_confirmed);
    link.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_unknown_frame_type_changes_nothing() {
    // Arrange
    let transport = MockTransport::new();
    let (link, mut view, notices) = open(&transport);
    view.wait_for_connectivity(ConnectivityState::Open).await;
    let before = view.snapshot();

    // Act
    transport.push_inbound(r#"{"type":"ping"}"#);
    settle().await;

    // Assert
    assert_eq!(view.snapshot(), before);
    assert!(notices.active().is_empty());
    assert_eq!(transport.connect_attempts(), 1);
    link.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_error_notice_expires_without_touching_telemetry() {
    // Arrange
    let transport = MockTransport::new();
    let (link, mut view, notices) = open(&transport);
    view.wait_for_connectivity(ConnectivityState::Open).await;
    transport.push_inbound(position_frame(2.0, -3.0, 175.0));
    settle().await;
    let before = view.snapshot();

    // Act
    transport.push_inbound(r#"{"type":"error","message":"Pressure reader not connected"}"#);
    settle().await;

    // Assert
    assert_eq!(notices.active(), vec!["Pressure reader not connected".to_string()]);
    assert_eq!(view.snapshot(), before);

    tokio::time::sleep(Duration::from_secs(5)).await;
    assert!(notices.active().is_empty());
    assert_eq!(view.snapshot(), before);
    link.shutdown().await;
}
