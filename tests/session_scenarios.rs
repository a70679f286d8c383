mod common;

use common::{wait_until, FakeDevice, FakeHost};
use cue_remote_ble::{ConnectionState, Cue, Remote, SendMode, Session};
use pretty_assertions::assert_eq;
use std::sync::atomic::Ordering;
use std::sync::Arc;

fn session_with(device: &Arc<FakeDevice>) -> Session {
    let host = FakeHost::with_device(device.clone());
    Session::new(Arc::new(Remote::new(host)))
}

#[tokio::test]
async fn demo_mode_never_touches_the_peripheral() {
    let device = FakeDevice::new("AA:BB:CC", Some("HapticX"));
    let session = session_with(&device);

    session.connect().await;
    assert!(session.snapshot().connection.connected);
    assert_eq!(session.snapshot().send_mode(), SendMode::Demo);

    session.push_cue(Cue::Pinch).await;
    session.push_intensity(30).await;
    session.push_stop().await;

    let state = session.snapshot();
    assert_eq!(state.cue, Cue::Pinch);
    assert_eq!(state.intensity.percent(), 30);
    assert!(device.writes().is_empty());
}

#[tokio::test]
async fn pairing_leaves_demo_and_sends_live() {
    let device = FakeDevice::new("AA:BB:CC", Some("HapticX"));
    let session = session_with(&device);

    session.begin_pairing().await;

    let state = session.snapshot();
    assert!(!state.demo);
    assert_eq!(state.connection, ConnectionState::connected("HapticX"));
    assert_eq!(state.send_mode(), SendMode::Live);

    session.push_intensity(60).await;
    session.push_cue(Cue::Chance).await;
    session.push_stop().await;

    assert_eq!(
        device.writes(),
        vec![vec![0x02, 60], vec![0x01, 1], vec![0xFF]]
    );
    assert!(!session.snapshot().has_error());
}

#[tokio::test]
async fn paused_session_only_highlights_cues() {
    let device = FakeDevice::new("AA:BB:CC", Some("HapticX"));
    let session = session_with(&device);
    session.begin_pairing().await;

    session.toggle_paused();
    session.push_cue(Cue::Pinch).await;
    session.push_intensity(90).await;

    assert_eq!(session.snapshot().cue, Cue::Pinch);
    assert_eq!(device.writes(), vec![vec![0x02, 90]]);
}

#[tokio::test]
async fn displayed_cue_diverges_from_peripheral_on_failed_write() {
    let device = FakeDevice::new("AA:BB:CC", Some("HapticX"));
    let session = session_with(&device);
    session.begin_pairing().await;

    session.push_cue(Cue::Chance).await;
    device.characteristic().fail_writes.store(true, Ordering::SeqCst);
    session.push_cue(Cue::Pinch).await;

    // The screen shows Pinch while the peripheral last received Chance.
    let state = session.snapshot();
    assert_eq!(state.cue, Cue::Pinch);
    assert!(state.has_error());
    assert_eq!(device.writes(), vec![vec![0x01, 1]]);
    assert!(state.connection.connected);
}

#[tokio::test]
async fn connect_failure_lands_in_error_slot() {
    let session = Session::new(Arc::new(Remote::new(FakeHost::unsupported())));

    assert!(!session.is_supported());
    session.begin_pairing().await;

    let state = session.snapshot();
    assert!(state.has_error());
    assert!(!state.connection.connected);
    assert_eq!(state.send_mode(), SendMode::Offline);
}

#[tokio::test]
async fn malformed_identifier_is_reported() {
    let device = FakeDevice::new("AA:BB:CC", Some("HapticX"));
    let session = session_with(&device);
    session.set_service_uuid("not-a-uuid");

    session.connect().await;

    let state = session.snapshot();
    assert_eq!(state.error, "Invalid parameter: service_uuid = not-a-uuid");
    assert!(!state.connection.connected);
}

#[tokio::test]
async fn session_mirrors_unsolicited_disconnect() {
    let device = FakeDevice::new("AA:BB:CC", Some("HapticX"));
    let session = session_with(&device);
    session.begin_pairing().await;

    device.power_off();

    assert!(wait_until(|| !session.snapshot().connection.connected).await);
    assert_eq!(session.snapshot().connection, ConnectionState::default());

    session.push_stop().await;
    assert_eq!(session.snapshot().error, "Not connected");
}

#[tokio::test]
async fn errors_clear_on_next_action() {
    let device = FakeDevice::new("AA:BB:CC", Some("HapticX"));
    let session = session_with(&device);
    session.set_demo(false);

    session.push_stop().await;
    assert!(session.snapshot().has_error());

    session.connect().await;
    assert!(!session.snapshot().has_error());

    session.disconnect().await;
    session.disconnect().await;
    assert!(!session.snapshot().has_error());
    assert_eq!(session.snapshot().connection, ConnectionState::default());
}

#[tokio::test]
async fn pairing_again_keeps_the_link_up() {
    let device = FakeDevice::new("AA:BB:CC", Some("HapticX"));
    let session = session_with(&device);

    session.begin_pairing().await;
    session.begin_pairing().await;

    assert_eq!(
        session.snapshot().connection,
        ConnectionState::connected("HapticX")
    );
    assert!(device.server.is_up());

    session.push_cue(Cue::Chance).await;
    assert_eq!(device.writes(), vec![vec![0x01, 1]]);
    assert!(!session.snapshot().has_error());
}
