//! Background worker wiring the TUI to the task backend.
//!
//! The TUI event loop is synchronous (crossterm polling) while backend
//! calls are async. [`spawn_net`] starts tokio tasks that own the backend
//! and talk to the main thread over two channels:
//!
//! ```text
//! TUI (main thread)  ←── NetEvent ───  tokio background tasks
//!                     ─── NetCommand →
//! ```
//!
//! Every status update runs in its own task, so a slow write never blocks
//! the board or other writes. Refresh requests are coalesced: any number
//! of `Refresh` commands arriving while a fetch is running result in one
//! more fetch afterwards.
//!
//! Writes and fetches overlap, so the worker counts confirmed writes. Each
//! settlement carries the count after its write and each fetch the count
//! seen before it started; the board uses them to tell a stale fetch from
//! a current one.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::{Notify, mpsc};

use taskboard_proto::task::{Task, TaskId};

use crate::api::{BoardScope, TaskBackend};
use crate::board::{DispatchTicket, SettleOutcome};

/// Commands sent from the TUI main loop to the worker.
#[derive(Debug)]
pub enum NetCommand {
    /// Write an optimistic status change to the backend.
    UpdateStatus(DispatchTicket),
    /// Re-fetch the board's task list.
    Refresh,
    /// Stop the worker.
    Shutdown,
}

/// Events sent from the worker to the TUI main loop.
#[derive(Debug)]
pub enum NetEvent {
    /// A status write finished.
    TransitionSettled {
        /// Task that was written.
        task_id: TaskId,
        /// Sequence number of the ticket.
        seq: u64,
        /// What the backend said.
        outcome: SettleOutcome,
        /// Write epoch of this write if confirmed, else the current one.
        epoch: u64,
    },
    /// A fresh task list arrived.
    TasksFetched {
        /// The board's tasks.
        tasks: Vec<Task>,
        /// Writes confirmed before the fetch started.
        epoch: u64,
    },
    /// A fetch failed; the board keeps its current state.
    FetchFailed(String),
}

/// Worker settings.
#[derive(Debug, Clone, Copy)]
pub struct NetConfig {
    /// Task list the board shows.
    pub scope: BoardScope,
    /// Capacity of the command and event channels.
    pub channel_capacity: usize,
}

/// Default channel capacity for commands and events.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 256;

impl NetConfig {
    /// Settings for `scope` with the default channel capacity.
    #[must_use]
    pub const fn new(scope: BoardScope) -> Self {
        Self {
            scope,
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }
}

/// Spawns the worker tasks and returns the channel handles.
///
/// Must be called from within a tokio runtime.
pub fn spawn_net<B>(
    backend: Arc<B>,
    config: NetConfig,
) -> (mpsc::Sender<NetCommand>, mpsc::Receiver<NetEvent>)
where
    B: TaskBackend + 'static,
{
    let capacity = config.channel_capacity.max(1);
    let (cmd_tx, cmd_rx) = mpsc::channel::<NetCommand>(capacity);
    let (evt_tx, evt_rx) = mpsc::channel::<NetEvent>(capacity);

    let wake = Arc::new(Notify::new());
    let landed = Arc::new(AtomicU64::new(0));
    let refresher = tokio::spawn(refresh_loop(
        Arc::clone(&backend),
        config.scope,
        Arc::clone(&wake),
        Arc::clone(&landed),
        evt_tx.clone(),
    ));

    tokio::spawn(async move {
        command_handler(backend, cmd_rx, evt_tx, wake, landed).await;
        refresher.abort();
    });

    (cmd_tx, evt_rx)
}

/// Background task: dispatch commands until `Shutdown` or the TUI hangs up.
async fn command_handler<B>(
    backend: Arc<B>,
    mut cmd_rx: mpsc::Receiver<NetCommand>,
    evt_tx: mpsc::Sender<NetEvent>,
    wake: Arc<Notify>,
    landed: Arc<AtomicU64>,
) where
    B: TaskBackend + 'static,
{
    while let Some(cmd) = cmd_rx.recv().await {
        match cmd {
            NetCommand::UpdateStatus(ticket) => {
                let backend = Arc::clone(&backend);
                let evt_tx = evt_tx.clone();
                let landed = Arc::clone(&landed);
                tokio::spawn(async move {
                    let DispatchTicket {
                        task_id,
                        status,
                        seq,
                    } = ticket;
                    let (outcome, epoch) = match backend.update_status(task_id, status).await {
                        Ok(_) => (
                            SettleOutcome::Confirmed,
                            landed.fetch_add(1, Ordering::SeqCst) + 1,
                        ),
                        Err(e) => {
                            tracing::warn!(%task_id, seq, error = %e, "status write failed");
                            (
                                SettleOutcome::Failed(e.to_string()),
                                landed.load(Ordering::SeqCst),
                            )
                        }
                    };
                    let _ = evt_tx
                        .send(NetEvent::TransitionSettled {
                            task_id,
                            seq,
                            outcome,
                            epoch,
                        })
                        .await;
                });
            }
            NetCommand::Refresh => wake.notify_one(),
            NetCommand::Shutdown => {
                tracing::info!("net worker shutting down");
                break;
            }
        }
    }
}

/// Background task: one fetch per wake-up, later wake-ups coalesced.
async fn refresh_loop<B>(
    backend: Arc<B>,
    scope: BoardScope,
    wake: Arc<Notify>,
    landed: Arc<AtomicU64>,
    evt_tx: mpsc::Sender<NetEvent>,
) where
    B: TaskBackend + 'static,
{
    loop {
        wake.notified().await;
        let epoch = landed.load(Ordering::SeqCst);
        let event = match backend.fetch_tasks(scope).await {
            Ok(tasks) => {
                tracing::debug!(%scope, count = tasks.len(), epoch, "tasks fetched");
                NetEvent::TasksFetched { tasks, epoch }
            }
            Err(e) => {
                tracing::warn!(%scope, error = %e, "task fetch failed");
                NetEvent::FetchFailed(e.to_string())
            }
        };
        if evt_tx.send(event).await.is_err() {
            // TUI dropped; exit.
            break;
        }
    }
}
