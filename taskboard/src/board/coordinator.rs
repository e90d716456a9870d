//! Optimistic update coordinator.
//!
//! A status change runs in two phases. [`Coordinator::tentative_apply`]
//! patches the store immediately and hands back a [`DispatchTicket`] for
//! the caller to send. When the backend answers, [`Coordinator::settle`]
//! turns the outcome into a [`Notice`], and the caller re-fetches the task
//! list and feeds it to [`Coordinator::reconcile`], which replaces local
//! state with server truth. Reconciliation always re-fetches, on success
//! as well as failure, so a rejected move is rolled back by the same path
//! that picks up other users' edits.
//!
//! Each task has at most one pending transition. A second move of the
//! same task before the first settles supersedes it; the older settlement
//! is then ignored for pending bookkeeping and the newer overlay survives
//! any refresh that lands in between.
//!
//! Fetches and writes can overlap. The net worker numbers confirmed writes
//! with a write epoch and tags every fetch with the epoch seen when it
//! started; [`Coordinator::settle_at`] and [`Coordinator::reconcile_at`]
//! use those numbers to keep a confirmed status on the board until a fetch
//! that started after the write is reconciled.

use std::collections::HashMap;

use taskboard_proto::task::{Task, TaskId, TaskStatus};

use super::store::BoardStore;
use super::{BoardError, TransitionRequest};
use crate::api::{BoardScope, TaskBackend};

/// A status change applied locally and not yet settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingTransition {
    /// Task being moved.
    pub task_id: TaskId,
    /// Last status the server is known to hold.
    pub previous: TaskStatus,
    /// Optimistic status shown on the board.
    pub next: TaskStatus,
    /// Dispatch sequence number.
    pub seq: u64,
}

/// The write the caller must send to the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchTicket {
    /// Task to update.
    pub task_id: TaskId,
    /// Status to write.
    pub status: TaskStatus,
    /// Matches the pending entry this ticket settles.
    pub seq: u64,
}

/// Where the board is in the optimistic protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SyncPhase {
    /// Nothing has been moved yet.
    #[default]
    Idle,
    /// At least one transition has not been reconciled.
    Pending,
    /// The last refresh left nothing pending.
    Reconciled,
}

impl SyncPhase {
    /// Short label for the status bar.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Pending => "syncing",
            Self::Reconciled => "synced",
        }
    }
}

/// Backend answer for one dispatched update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettleOutcome {
    /// The backend accepted the write.
    Confirmed,
    /// The write failed; carries the error text.
    Failed(String),
}

/// Severity of a [`Notice`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    /// Success or neutral information.
    Info,
    /// A transient failure.
    Error,
}

/// A short user-facing message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    /// Severity.
    pub level: NoticeLevel,
    /// Message text.
    pub text: String,
}

impl Notice {
    /// An informational notice.
    #[must_use]
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            text: text.into(),
        }
    }

    /// An error notice.
    #[must_use]
    pub fn error(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            text: text.into(),
        }
    }
}

/// Result of [`Coordinator::settle`]. The caller must refresh afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settlement {
    /// Message to show.
    pub notice: Notice,
    /// A newer transition of the same task is still pending.
    pub superseded: bool,
}

/// A confirmed write that an in-flight fetch may predate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct LandedWrite {
    status: TaskStatus,
    epoch: u64,
}

/// Tracks pending transitions for one board.
#[derive(Debug, Default)]
pub struct Coordinator {
    pending: HashMap<TaskId, PendingTransition>,
    /// Target status of every ticket not yet settled.
    dispatched: HashMap<(TaskId, u64), TaskStatus>,
    landed: HashMap<TaskId, LandedWrite>,
    next_seq: u64,
    phase: SyncPhase,
}

impl Coordinator {
    /// Creates a coordinator with nothing pending.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current protocol phase.
    #[must_use]
    pub const fn phase(&self) -> SyncPhase {
        self.phase
    }

    /// Whether `task_id` has an unsettled transition.
    #[must_use]
    pub fn is_pending(&self, task_id: TaskId) -> bool {
        self.pending.contains_key(&task_id)
    }

    /// The pending transition of `task_id`, if any.
    #[must_use]
    pub fn pending(&self, task_id: TaskId) -> Option<&PendingTransition> {
        self.pending.get(&task_id)
    }

    /// Number of unsettled transitions.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Applies `request` to the store and returns the write to dispatch.
    ///
    /// Returns `None` when the task is not on the board or already has the
    /// target status; the store is untouched in both cases.
    pub fn tentative_apply(
        &mut self,
        store: &mut BoardStore,
        request: TransitionRequest,
    ) -> Option<DispatchTicket> {
        let TransitionRequest { task_id, target } = request;
        let current = match store.get(task_id) {
            Some(task) => task.status,
            None => {
                tracing::debug!(%task_id, "transition for task not on board, ignoring");
                return None;
            }
        };
        if current == target {
            return None;
        }
        if let Err(e) = store.patch_status(task_id, target) {
            tracing::debug!(%task_id, error = %e, "optimistic patch failed");
            return None;
        }

        self.next_seq += 1;
        let seq = self.next_seq;
        // A superseded entry keeps the server-known status it started from.
        let previous = self
            .pending
            .get(&task_id)
            .map_or(current, |p| p.previous);
        self.pending.insert(
            task_id,
            PendingTransition {
                task_id,
                previous,
                next: target,
                seq,
            },
        );
        self.dispatched.insert((task_id, seq), target);
        self.phase = SyncPhase::Pending;
        tracing::debug!(
            %task_id,
            from = %current,
            to = %target,
            seq,
            "optimistic transition applied"
        );

        Some(DispatchTicket {
            task_id,
            status: target,
            seq,
        })
    }

    /// Records the backend's answer for the ticket `(task_id, seq)`.
    pub fn settle(&mut self, task_id: TaskId, seq: u64, outcome: &SettleOutcome) -> Settlement {
        self.settle_inner(task_id, seq, outcome, None)
    }

    /// Like [`settle`](Self::settle) for a write the worker numbered
    /// `epoch`.
    ///
    /// A confirmed status is kept on the board through any fetch tagged
    /// with an earlier epoch.
    pub fn settle_at(
        &mut self,
        task_id: TaskId,
        seq: u64,
        outcome: &SettleOutcome,
        epoch: u64,
    ) -> Settlement {
        self.settle_inner(task_id, seq, outcome, Some(epoch))
    }

    fn settle_inner(
        &mut self,
        task_id: TaskId,
        seq: u64,
        outcome: &SettleOutcome,
        epoch: Option<u64>,
    ) -> Settlement {
        let status = self.dispatched.remove(&(task_id, seq));
        if let (SettleOutcome::Confirmed, Some(status), Some(epoch)) = (outcome, status, epoch) {
            let newer = self.landed.get(&task_id).is_none_or(|w| w.epoch < epoch);
            if newer {
                self.landed.insert(task_id, LandedWrite { status, epoch });
            }
        }
        let latest = self.pending.get(&task_id).map(|p| p.seq);
        let superseded = match latest {
            Some(latest) if latest == seq => {
                self.pending.remove(&task_id);
                false
            }
            Some(latest) if latest > seq => {
                // The older write landed, so the server now holds its target.
                if let (SettleOutcome::Confirmed, Some(status), Some(entry)) =
                    (outcome, status, self.pending.get_mut(&task_id))
                {
                    entry.previous = status;
                }
                true
            }
            _ => false,
        };

        let notice = match outcome {
            SettleOutcome::Confirmed => {
                tracing::info!(%task_id, seq, "status update confirmed");
                let label = status.map_or("its new column", TaskStatus::label);
                Notice::info(format!("Task #{task_id} moved to {label}"))
            }
            SettleOutcome::Failed(reason) => {
                tracing::warn!(%task_id, seq, error = %reason, "status update failed");
                Notice::error(format!("Failed to update task #{task_id}: {reason}"))
            }
        };
        Settlement { notice, superseded }
    }

    /// Replaces local state with `fresh` and re-applies unsettled overlays.
    ///
    /// `fresh` is taken to reflect every write settled so far. Pending
    /// entries for tasks missing from `fresh` are dropped.
    pub fn reconcile(&mut self, store: &mut BoardStore, fresh: Vec<Task>) {
        self.reconcile_at(store, fresh, u64::MAX);
    }

    /// Like [`reconcile`](Self::reconcile) for a fetch that started when
    /// `epoch` writes had landed.
    ///
    /// Confirmed writes with a later epoch are re-applied on top of
    /// `fresh`, since the fetch may not include them.
    pub fn reconcile_at(&mut self, store: &mut BoardStore, fresh: Vec<Task>, epoch: u64) {
        store.replace_all(fresh);
        self.landed.retain(|&task_id, write| {
            write.epoch > epoch && store.patch_status(task_id, write.status).is_ok()
        });
        self.pending.retain(|&task_id, entry| {
            match store.patch_status(task_id, entry.next) {
                Ok(_) => true,
                Err(e) => {
                    tracing::debug!(%task_id, error = %e, "dropping pending transition");
                    false
                }
            }
        });
        self.phase = if self.pending.is_empty() && self.landed.is_empty() {
            SyncPhase::Reconciled
        } else {
            SyncPhase::Pending
        };
        tracing::debug!(
            tasks = store.len(),
            pending = self.pending.len(),
            landed = self.landed.len(),
            revision = store.revision(),
            "board reconciled"
        );
    }

    /// Fetches `scope` from `backend` and reconciles.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::RefreshFailed`] if the fetch fails; the store
    /// keeps its current state.
    pub async fn refresh<B: TaskBackend>(
        &mut self,
        store: &mut BoardStore,
        backend: &B,
        scope: BoardScope,
    ) -> Result<(), BoardError> {
        match backend.fetch_tasks(scope).await {
            Ok(fresh) => {
                self.reconcile(store, fresh);
                Ok(())
            }
            Err(e) => {
                tracing::warn!(%scope, error = %e, "refresh failed, keeping local state");
                Err(BoardError::RefreshFailed(e))
            }
        }
    }

    /// Runs one transition end to end: apply, write, settle, re-fetch.
    ///
    /// Returns `Ok(None)` when the request is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::RefreshFailed`] if the closing re-fetch fails.
    /// The settlement notice is logged in that case.
    pub async fn run_transition<B: TaskBackend>(
        &mut self,
        store: &mut BoardStore,
        backend: &B,
        scope: BoardScope,
        request: TransitionRequest,
    ) -> Result<Option<Settlement>, BoardError> {
        let Some(ticket) = self.tentative_apply(store, request) else {
            return Ok(None);
        };
        let outcome = match backend.update_status(ticket.task_id, ticket.status).await {
            Ok(_) => SettleOutcome::Confirmed,
            Err(e) => SettleOutcome::Failed(e.to_string()),
        };
        let settlement = self.settle(ticket.task_id, ticket.seq, &outcome);
        self.refresh(store, backend, scope).await?;
        Ok(Some(settlement))
    }
}
