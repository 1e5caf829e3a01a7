//! End-to-end session scenarios against the mock transport.
//!
//! Time is paused; every fixed delay runs on the virtual clock.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::sleep;

use lmsh_client::{ConnectionManager, ConnectionMetrics, ManagerConfig, ManagerHandle};
use lmsh_core::constants::START_COMMAND;
use lmsh_core::protocol::{Message, ProgramStatus};
use lmsh_test_utils::{
    ConnectOutcome, MockRemote, MockTransport, RecordingDisplay, RecordingStatus,
};

struct Session {
    handle: ManagerHandle,
    display: RecordingDisplay,
    status: RecordingStatus,
    transport: Arc<MockTransport>,
    remotes: mpsc::UnboundedReceiver<MockRemote>,
    task: JoinHandle<ConnectionMetrics>,
}

fn start_with(config: ManagerConfig, script: Vec<ConnectOutcome>, default: ConnectOutcome) -> Session {
    let (transport, remotes) = MockTransport::scripted(script, default);
    let display = RecordingDisplay::new();
    let status = RecordingStatus::new();
    let manager = ConnectionManager::new(
        config,
        transport.clone(),
        display.clone(),
        status.clone(),
    );
    let handle = manager.handle();
    let task = tokio::spawn(manager.run());
    Session {
        handle,
        display,
        status,
        transport,
        remotes,
        task,
    }
}

fn start(script: Vec<ConnectOutcome>, default: ConnectOutcome) -> Session {
    start_with(ManagerConfig::default(), script, default)
}

/// Let queued events drain without crossing any of the fixed delays.
async fn settle() {
    sleep(Duration::from_millis(50)).await;
}

async fn finish(session: Session) {
    session.handle.shutdown();
    session.task.await.expect("manager task");
}

#[tokio::test(start_paused = true)]
async fn scenario_a_student_login_in_fallback_mode() {
    let session = start(vec![], ConnectOutcome::Refuse);
    settle().await;

    // The refused connect brought the simulated session up.
    assert!(session.display.contains("Library Management System"));
    assert!(session.display.contains("1. Login"));

    session.handle.input(b"1\r");
    session.handle.input(b"john@example.com\r");
    session.handle.input(b"pass123\r");
    sleep(Duration::from_secs(2)).await;

    let out = session.display.transcript();
    assert!(out.contains("Welcome back, student."));
    assert!(out.contains("1. View Books"));
    assert!(out.contains("2. Search Books"));
    assert!(out.contains("3. Borrow Book"));
    assert!(out.contains("8. Logout"));

    finish(session).await;
}

#[tokio::test(start_paused = true)]
async fn scenario_b_bad_credentials_return_to_the_main_menu() {
    let session = start(vec![], ConnectOutcome::Refuse);
    settle().await;

    session.handle.input(b"1\r");
    session.handle.input(b"x@x.com\r");
    session.handle.input(b"wrong\r");
    sleep(Duration::from_secs(2)).await;

    let out = session.display.transcript();
    assert!(out.contains("Invalid credentials! Please try again."));
    assert!(!out.contains("Welcome back"));
    // The choice prompt reappeared after the reset.
    assert!(session.display.count("Choice: ") >= 2);

    finish(session).await;
}

#[tokio::test(start_paused = true)]
async fn scenario_c_disconnect_retries_once_then_falls_back_once() {
    let mut session = start(vec![ConnectOutcome::Accept], ConnectOutcome::Pend);
    settle().await;

    let mut remote = session.remotes.recv().await.expect("host side");
    assert_eq!(
        remote.recv().await,
        Some(Message::Command {
            command: START_COMMAND.into()
        })
    );
    remote.send(Message::Status {
        status: ProgramStatus::Started,
    });
    settle().await;

    assert!(session.display.contains("Connected to terminal service"));
    assert_eq!(session.status.last(), Some(true));
    assert_eq!(session.transport.attempts(), 1);

    remote.close();
    settle().await;

    assert!(
        session
            .display
            .contains("Connection closed. Attempting to reconnect in 3 seconds...")
    );
    assert_eq!(session.status.last(), Some(false));
    // The retry waits for the fixed delay.
    assert_eq!(session.transport.attempts(), 1);

    sleep(Duration::from_secs(4)).await;
    // Exactly one reconnection attempt within the cycle; it hangs, so the
    // fallback has not started yet.
    assert_eq!(session.transport.attempts(), 2);
    assert_eq!(session.display.count("1. Login"), 0);

    sleep(Duration::from_secs(3)).await;
    // The grace window elapsed: the simulated session started exactly once.
    assert_eq!(session.display.count("1. Login"), 1);

    sleep(Duration::from_secs(10)).await;
    assert_eq!(session.transport.attempts(), 2);
    assert_eq!(session.display.count("1. Login"), 1);

    let metrics = {
        session.handle.shutdown();
        session.task.await.expect("manager task")
    };
    assert_eq!(metrics.fallback_activations, 1);
    assert_eq!(metrics.reconnects, 1);
}

#[tokio::test(start_paused = true)]
async fn scenario_d_librarian_relogin_keeps_the_librarian_menu() {
    let session = start(vec![], ConnectOutcome::Refuse);
    settle().await;

    session.handle.input(b"1\r");
    session.handle.input(b"admin@library.com\r");
    session.handle.input(b"admin123\r");
    sleep(Duration::from_secs(2)).await;

    let out = session.display.transcript();
    assert!(out.contains("Welcome back, librarian."));
    assert!(out.contains("1. Add Book"));
    assert!(out.contains("2. Remove Book"));
    assert!(out.contains("3. Add User"));
    assert!(!out.contains("View Books"));

    session.handle.input(b"8\r");
    sleep(Duration::from_secs(2)).await;
    assert!(session.display.contains("Logging out..."));

    session.handle.input(b"1\r");
    session.handle.input(b"admin@library.com\r");
    session.handle.input(b"admin123\r");
    sleep(Duration::from_secs(2)).await;

    assert_eq!(session.display.count("3. Add User"), 2);
    let out = session.display.transcript();
    assert!(!out.contains("Borrow Book"));
    assert!(!out.contains("Search Books"));

    finish(session).await;
}

#[tokio::test(start_paused = true)]
async fn local_mode_never_touches_the_transport() {
    let config = ManagerConfig {
        local_only: true,
        ..ManagerConfig::default()
    };
    let session = start_with(config, vec![], ConnectOutcome::Accept);
    settle().await;

    assert_eq!(session.transport.attempts(), 0);
    assert!(session.display.contains("1. Login"));

    session.handle.input(b"1\r");
    session.handle.input(b"wilson@example.com\r");
    session.handle.input(b"pass987\r");
    sleep(Duration::from_secs(2)).await;

    assert!(session.display.contains("Welcome back, faculty."));
    assert_eq!(session.transport.attempts(), 0);

    finish(session).await;
}

#[tokio::test(start_paused = true)]
async fn line_editing_erase_is_applied_before_submit() {
    let session = start(vec![], ConnectOutcome::Refuse);
    settle().await;

    // "19" with the 9 erased submits "1".
    session.handle.input(b"19\x7f\r");
    settle().await;

    assert!(session.display.contains("Email: "));
    // The erase was rendered as backspace, space, backspace.
    assert!(session.display.contains("\x08 \x08"));

    finish(session).await;
}
