//! Integration tests for wiring the TUI `App` to the net worker.
//!
//! Runs `App` against `spawn_net` + `InMemoryBackend` the way the main
//! loop does: key events produce commands, worker events are applied and
//! their follow-ups sent back.
//!
//! These tests validate:
//! - The board stays interactive while a slow write is in flight
//! - A settled write triggers a refresh that reconciles the board
//! - A failed write rolls the card back and leaves an error notice
//! - Refresh failures keep the board and surface a notice
//! - Shutdown terminates the worker

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;
use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tokio::sync::mpsc;

use taskboard::api::BoardScope;
use taskboard::api::memory::InMemoryBackend;
use taskboard::app::App;
use taskboard::board::{NoticeLevel, SyncPhase};
use taskboard::net::{self, NetCommand, NetConfig, NetEvent};
use taskboard_proto::task::{TaskId, TaskStatus};

struct Harness {
    app: App,
    backend: Arc<InMemoryBackend>,
    tx: mpsc::Sender<NetCommand>,
    rx: mpsc::Receiver<NetEvent>,
}

impl Harness {
    /// Demo board, worker started, initial fetch applied.
    async fn start(backend: InMemoryBackend) -> Self {
        let backend = Arc::new(backend);
        let (tx, rx) = net::spawn_net(Arc::clone(&backend), NetConfig::new(BoardScope::Personal));
        let mut harness = Self {
            app: App::new(BoardScope::Personal),
            backend,
            tx,
            rx,
        };
        harness.send(NetCommand::Refresh).await;
        harness.pump_until(|app| !app.store.is_empty()).await;
        harness
    }

    async fn send(&self, command: NetCommand) {
        self.tx.send(command).await.expect("worker hung up");
    }

    async fn key(&mut self, code: KeyCode) {
        if let Some(command) = self.app.handle_key_event(KeyEvent::new(code, KeyModifiers::NONE)) {
            self.send(command).await;
        }
    }

    /// Apply worker events (sending follow-ups) until `done` holds.
    async fn pump_until(&mut self, done: impl Fn(&App) -> bool) {
        tokio::time::timeout(Duration::from_secs(5), async {
            while !done(&self.app) {
                let event = self.rx.recv().await.expect("worker hung up");
                if let Some(command) = self.app.apply_net_event(event) {
                    self.tx.send(command).await.expect("worker hung up");
                }
            }
        })
        .await
        .expect("timed out waiting for board state");
    }

    fn status(&self, id: u64) -> TaskStatus {
        self.app.store.get(TaskId::new(id)).unwrap().status
    }
}

#[tokio::test]
async fn initial_refresh_loads_demo_board() {
    let h = Harness::start(InMemoryBackend::demo()).await;
    assert_eq!(h.app.store.len(), 7);
    assert_eq!(h.app.store.grouped().counts(), [3, 2, 2]);
}

#[tokio::test]
async fn keyboard_move_is_confirmed_and_reconciled() {
    let mut h = Harness::start(InMemoryBackend::demo()).await;

    // Focus is TO DO, first card is task 5.
    assert_eq!(h.app.selected_task().unwrap().id, TaskId::new(5));
    h.key(KeyCode::Char('L')).await;
    assert_eq!(h.status(5), TaskStatus::InProgress);
    assert_eq!(h.app.coordinator.phase(), SyncPhase::Pending);

    h.pump_until(|app| app.coordinator.phase() == SyncPhase::Reconciled)
        .await;
    assert_eq!(h.status(5), TaskStatus::InProgress);
    assert_eq!(h.app.notice().unwrap().level, NoticeLevel::Info);
    assert_eq!(
        h.backend.updates(),
        vec![(TaskId::new(5), TaskStatus::InProgress)]
    );
}

#[tokio::test]
async fn failed_move_rolls_back_with_notice() {
    let backend = InMemoryBackend::demo();
    backend.fail_next_updates(1);
    let mut h = Harness::start(backend).await;

    h.key(KeyCode::Char('L')).await;
    assert_eq!(h.status(5), TaskStatus::InProgress);

    h.pump_until(|app| app.coordinator.phase() == SyncPhase::Reconciled)
        .await;
    assert_eq!(h.status(5), TaskStatus::Todo);
    let notice = h.app.notice().unwrap();
    assert_eq!(notice.level, NoticeLevel::Error);
    assert!(notice.text.contains("task #5"));
}

#[tokio::test]
async fn board_stays_interactive_during_slow_write() {
    let backend = InMemoryBackend::demo().with_latency(Duration::from_millis(200));
    let mut h = Harness::start(backend).await;

    h.key(KeyCode::Char('L')).await;
    // While the write is in flight, move another card.
    h.key(KeyCode::Char('h')).await;
    assert_eq!(h.app.focus, TaskStatus::Todo);
    let next = h.app.selected_task().unwrap().id;
    h.key(KeyCode::Char('L')).await;
    assert_eq!(h.app.coordinator.pending_count(), 2);
    assert_eq!(h.status(next.get()), TaskStatus::InProgress);

    h.pump_until(|app| app.coordinator.phase() == SyncPhase::Reconciled)
        .await;
    assert_eq!(h.status(5), TaskStatus::InProgress);
    assert_eq!(h.status(next.get()), TaskStatus::InProgress);
    assert_eq!(h.app.store.grouped().counts(), [1, 4, 2]);
}

#[tokio::test]
async fn rapid_moves_end_in_last_column() {
    let backend = InMemoryBackend::demo().with_latency(Duration::from_millis(50));
    let mut h = Harness::start(backend).await;

    // Task 5: TO DO -> IN PROGRESS -> DONE before either write lands.
    h.key(KeyCode::Char('L')).await;
    h.key(KeyCode::Char('L')).await;
    assert_eq!(h.status(5), TaskStatus::Done);
    assert_eq!(h.app.coordinator.pending_count(), 1);

    h.pump_until(|app| app.coordinator.phase() == SyncPhase::Reconciled)
        .await;
    // Both writes race in their own tasks; the board shows whichever the
    // backend kept.
    assert_eq!(
        h.app.store.tasks(),
        h.backend.snapshot(BoardScope::Personal).as_slice()
    );
    assert_eq!(h.backend.updates().len(), 2);
}

#[tokio::test]
async fn refresh_failure_keeps_board_and_warns() {
    let mut h = Harness::start(InMemoryBackend::demo()).await;
    let before = h.app.store.tasks().to_vec();
    h.backend.fail_next_fetches(1);

    h.key(KeyCode::Char('r')).await;
    h.pump_until(|app| app.notice().is_some()).await;

    assert_eq!(h.app.notice().unwrap().level, NoticeLevel::Error);
    assert_eq!(h.app.store.tasks(), before.as_slice());
}

#[tokio::test]
async fn refresh_picks_up_remote_changes() {
    let mut h = Harness::start(InMemoryBackend::demo()).await;
    h.backend.set_status(TaskId::new(6), TaskStatus::Done);

    h.key(KeyCode::Char('r')).await;
    h.pump_until(|app| {
        app.store
            .get(TaskId::new(6))
            .is_some_and(|t| t.status == TaskStatus::Done)
    })
    .await;
    assert_eq!(h.app.store.grouped().counts(), [2, 2, 3]);
}

#[tokio::test]
async fn shutdown_stops_worker() {
    let mut h = Harness::start(InMemoryBackend::demo()).await;
    h.send(NetCommand::Shutdown).await;
    let closed = tokio::time::timeout(Duration::from_secs(2), h.rx.recv())
        .await
        .expect("worker did not stop");
    assert!(closed.is_none());
}
