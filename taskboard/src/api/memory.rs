//! In-memory [`TaskBackend`] for offline demo mode and tests.
//!
//! Behaves like the REST backend for the two board calls, with knobs to
//! inject failures, drop writes, add latency and simulate another user's
//! concurrent edits.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use taskboard_proto::task::{Task, TaskId, TaskPriority, TaskStatus};
use taskboard_proto::user::User;

use super::{ApiError, BoardScope, TaskBackend};

/// Task store standing in for the REST backend.
#[derive(Debug, Default)]
pub struct InMemoryBackend {
    tasks: Mutex<Vec<Task>>,
    updates: Mutex<Vec<(TaskId, TaskStatus)>>,
    fetches: AtomicUsize,
    fail_updates: AtomicUsize,
    fail_fetches: AtomicUsize,
    ignore_writes: AtomicBool,
    latency: Mutex<Option<Duration>>,
}

impl InMemoryBackend {
    /// Creates a backend holding `tasks`.
    #[must_use]
    pub fn new(tasks: Vec<Task>) -> Self {
        Self {
            tasks: Mutex::new(tasks),
            ..Self::default()
        }
    }

    /// A small personal board used by offline demo mode.
    #[must_use]
    pub fn demo() -> Self {
        let me = User {
            id: 1,
            username: "you".to_string(),
            email: "you@example.com".to_string(),
            first_name: String::new(),
            last_name: String::new(),
        };
        let rows = [
            (1, "Sketch board layout", TaskStatus::Done, TaskPriority::Low),
            (2, "Wire drag and drop", TaskStatus::Done, TaskPriority::High),
            (3, "Optimistic status updates", TaskStatus::InProgress, TaskPriority::High),
            (4, "Reconcile after refresh", TaskStatus::InProgress, TaskPriority::Medium),
            (5, "Comment threads", TaskStatus::Todo, TaskPriority::Medium),
            (6, "Attachment uploads", TaskStatus::Todo, TaskPriority::Low),
            (7, "Notification bell", TaskStatus::Todo, TaskPriority::Medium),
        ];
        let tasks = rows
            .into_iter()
            .map(|(id, title, status, priority)| {
                let mut task = Task::new(id, title, status);
                task.priority = priority;
                task.is_personal = true;
                if id % 2 == 1 {
                    task.assignee = Some(me.clone());
                }
                task
            })
            .collect();
        Self::new(tasks)
    }

    /// Delays every call by `latency`.
    #[must_use]
    pub fn with_latency(self, latency: Duration) -> Self {
        *self.latency.lock() = Some(latency);
        self
    }

    /// Makes the next `count` status updates fail with a 500.
    pub fn fail_next_updates(&self, count: usize) {
        self.fail_updates.store(count, Ordering::SeqCst);
    }

    /// Makes the next `count` fetches fail with a 503.
    pub fn fail_next_fetches(&self, count: usize) {
        self.fail_fetches.store(count, Ordering::SeqCst);
    }

    /// Accept updates without storing them, as if a write was lost.
    pub fn set_ignore_writes(&self, ignore: bool) {
        self.ignore_writes.store(ignore, Ordering::SeqCst);
    }

    /// Changes a task's status directly, as another user would.
    pub fn set_status(&self, id: TaskId, status: TaskStatus) {
        if let Some(task) = self.tasks.lock().iter_mut().find(|t| t.id == id) {
            task.status = status;
        }
    }

    /// Adds a task directly, as another user would.
    pub fn insert(&self, task: Task) {
        self.tasks.lock().push(task);
    }

    /// Removes a task directly, as another user would.
    pub fn remove(&self, id: TaskId) {
        self.tasks.lock().retain(|t| t.id != id);
    }

    /// Every status update received, in arrival order.
    #[must_use]
    pub fn updates(&self) -> Vec<(TaskId, TaskStatus)> {
        self.updates.lock().clone()
    }

    /// Number of fetches served (including failed ones).
    #[must_use]
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    /// The stored tasks visible in `scope`.
    #[must_use]
    pub fn snapshot(&self, scope: BoardScope) -> Vec<Task> {
        self.tasks
            .lock()
            .iter()
            .filter(|t| in_scope(t, scope))
            .cloned()
            .collect()
    }

    async fn simulate_latency(&self) {
        let latency = *self.latency.lock();
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
    }
}

/// Decrements `counter` if positive, returning whether it was.
fn take_one(counter: &AtomicUsize) -> bool {
    counter
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
        .is_ok()
}

fn in_scope(task: &Task, scope: BoardScope) -> bool {
    match scope {
        BoardScope::Project(id) => task.project == Some(id),
        BoardScope::Personal => task.is_personal,
    }
}

impl TaskBackend for InMemoryBackend {
    async fn fetch_tasks(&self, scope: BoardScope) -> Result<Vec<Task>, ApiError> {
        self.simulate_latency().await;
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if take_one(&self.fail_fetches) {
            return Err(ApiError::Status {
                status: 503,
                body: "backend unavailable".to_string(),
            });
        }
        Ok(self.snapshot(scope))
    }

    async fn update_status(&self, id: TaskId, status: TaskStatus) -> Result<Task, ApiError> {
        self.simulate_latency().await;
        self.updates.lock().push((id, status));
        if take_one(&self.fail_updates) {
            return Err(ApiError::Status {
                status: 500,
                body: "internal server error".to_string(),
            });
        }
        let mut tasks = self.tasks.lock();
        let task = tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| ApiError::NotFound(format!("/tasks/{id}/")))?;
        if !self.ignore_writes.load(Ordering::SeqCst) {
            task.status = status;
        }
        Ok(task.clone())
    }
}
