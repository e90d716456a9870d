//! Application state and event handling.
//!
//! [`App`] is the synchronous half of the board: it owns the store, the
//! coordinator and the drag controller, and turns key, mouse and worker
//! events into [`NetCommand`]s for the background worker.

use std::time::{Duration, Instant};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::Position;
use taskboard_proto::task::{Task, TaskId, TaskStatus};
use tokio::sync::mpsc::{self, error::TrySendError};

use crate::api::BoardScope;
use crate::board::{
    BoardLayout, BoardStore, Coordinator, DispatchTicket, DragController, DropOutcome,
    MoveDirection, Notice, SettleOutcome, SyncPhase, TransitionRequest,
};
use crate::net::{NetCommand, NetEvent};

/// Default time a notice stays visible.
const DEFAULT_NOTICE_TIMEOUT: Duration = Duration::from_secs(4);

/// Main application state.
#[derive(Debug)]
pub struct App {
    /// Tasks on the board.
    pub store: BoardStore,
    /// Optimistic update bookkeeping.
    pub coordinator: Coordinator,
    /// Pointer gesture state.
    pub drag: DragController,
    /// Column with keyboard focus.
    pub focus: TaskStatus,
    /// Selected row within the focused column.
    pub selected: usize,
    /// Task list shown.
    pub scope: BoardScope,
    /// Whether the app should quit.
    pub should_quit: bool,
    notice: Option<(Notice, Instant)>,
    notice_timeout: Duration,
    /// A refresh the worker has not accepted yet.
    refresh_owed: bool,
}

impl App {
    /// Creates an empty board for `scope`.
    #[must_use]
    pub fn new(scope: BoardScope) -> Self {
        Self {
            store: BoardStore::new(),
            coordinator: Coordinator::new(),
            drag: DragController::default(),
            focus: TaskStatus::Todo,
            selected: 0,
            scope,
            should_quit: false,
            notice: None,
            notice_timeout: DEFAULT_NOTICE_TIMEOUT,
            refresh_owed: false,
        }
    }

    /// Sets the pointer travel needed to start a drag.
    #[must_use]
    pub fn with_drag_activation(mut self, cells: u16) -> Self {
        self.drag = DragController::new(cells);
        self
    }

    /// Sets how long notices stay visible.
    #[must_use]
    pub const fn with_notice_timeout(mut self, timeout: Duration) -> Self {
        self.notice_timeout = timeout;
        self
    }

    /// The current notice, if it has not expired.
    #[must_use]
    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref().map(|(notice, _)| notice)
    }

    /// Shows `notice` until the notice timeout elapses.
    pub fn show_notice(&mut self, notice: Notice) {
        self.notice = Some((notice, Instant::now() + self.notice_timeout));
    }

    /// Expires the notice once its deadline has passed.
    pub fn tick(&mut self, now: Instant) {
        if self.notice.as_ref().is_some_and(|(_, deadline)| now >= *deadline) {
            self.notice = None;
        }
    }

    /// Whether a refresh is waiting for room in the command channel.
    #[must_use]
    pub const fn refresh_owed(&self) -> bool {
        self.refresh_owed
    }

    /// Protocol phase for display; an owed refresh counts as pending.
    #[must_use]
    pub fn sync_phase(&self) -> SyncPhase {
        if self.refresh_owed {
            SyncPhase::Pending
        } else {
            self.coordinator.phase()
        }
    }

    /// Hands `command` to the worker without blocking.
    ///
    /// A status write that cannot be queued is settled as failed on the
    /// spot. A refresh that cannot be queued stays owed until
    /// [`retry_refresh`](Self::retry_refresh) gets it through.
    pub fn send_command(&mut self, tx: &mpsc::Sender<NetCommand>, command: NetCommand) {
        let mut next = Some(command);
        while let Some(command) = next.take() {
            let is_refresh = matches!(command, NetCommand::Refresh);
            let command = match tx.try_send(command) {
                Ok(()) => {
                    if is_refresh {
                        self.refresh_owed = false;
                    }
                    continue;
                }
                Err(TrySendError::Full(c) | TrySendError::Closed(c)) => c,
            };
            match command {
                NetCommand::UpdateStatus(ticket) => {
                    let DispatchTicket { task_id, seq, .. } = ticket;
                    tracing::warn!(%task_id, seq, "net worker unavailable, write dropped");
                    next = self.apply_net_event(NetEvent::TransitionSettled {
                        task_id,
                        seq,
                        outcome: SettleOutcome::Failed("network busy".to_string()),
                        epoch: 0,
                    });
                }
                NetCommand::Refresh => {
                    if !self.refresh_owed {
                        tracing::warn!("net worker unavailable, refresh deferred");
                    }
                    self.refresh_owed = true;
                }
                NetCommand::Shutdown => {}
            }
        }
    }

    /// Re-sends an owed refresh. Call once per loop iteration.
    pub fn retry_refresh(&mut self, tx: &mpsc::Sender<NetCommand>) {
        if self.refresh_owed && tx.try_send(NetCommand::Refresh).is_ok() {
            tracing::debug!("deferred refresh queued");
            self.refresh_owed = false;
        }
    }

    /// Applies every event already waiting in `rx`, sending follow-ups.
    pub fn drain_net_events(
        &mut self,
        rx: &mut mpsc::Receiver<NetEvent>,
        tx: &mpsc::Sender<NetCommand>,
    ) {
        while let Ok(event) = rx.try_recv() {
            if let Some(command) = self.apply_net_event(event) {
                self.send_command(tx, command);
            }
        }
    }

    /// Installs the regions of the frame just drawn.
    pub fn set_layout(&mut self, layout: BoardLayout) {
        self.drag.set_layout(layout);
    }

    /// The task under the keyboard cursor.
    #[must_use]
    pub fn selected_task(&self) -> Option<&Task> {
        self.store
            .grouped()
            .get(self.focus)
            .get(self.selected)
            .copied()
    }

    /// Handle a key event.
    pub fn handle_key_event(&mut self, key: KeyEvent) -> Option<NetCommand> {
        match (key.code, key.modifiers) {
            (KeyCode::Char('c'), KeyModifiers::CONTROL) | (KeyCode::Char('q'), _) => {
                self.should_quit = true;
                None
            }
            (KeyCode::Esc, _) => {
                if self.drag.cancel() == DropOutcome::Ignored {
                    self.should_quit = true;
                }
                None
            }
            (KeyCode::Char('H'), _) | (KeyCode::Left, KeyModifiers::SHIFT) => {
                self.move_selected(MoveDirection::Left)
            }
            (KeyCode::Char('L'), _) | (KeyCode::Right, KeyModifiers::SHIFT) => {
                self.move_selected(MoveDirection::Right)
            }
            (KeyCode::Left | KeyCode::Char('h'), _) => {
                self.shift_focus(MoveDirection::Left);
                None
            }
            (KeyCode::Right | KeyCode::Char('l'), _) => {
                self.shift_focus(MoveDirection::Right);
                None
            }
            (KeyCode::Up | KeyCode::Char('k'), _) => {
                self.selected = self.selected.saturating_sub(1);
                None
            }
            (KeyCode::Down | KeyCode::Char('j'), _) => {
                self.selected += 1;
                self.clamp_selection();
                None
            }
            (KeyCode::Char('r'), _) => Some(NetCommand::Refresh),
            _ => None,
        }
    }

    /// Handle a mouse event.
    pub fn handle_mouse_event(&mut self, mouse: MouseEvent) -> Option<NetCommand> {
        let pos = Position::new(mouse.column, mouse.row);
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                if let Some(task_id) = self.drag.pointer_down(pos) {
                    self.select(task_id);
                }
                None
            }
            MouseEventKind::Drag(MouseButton::Left) => {
                self.drag.pointer_move(pos);
                None
            }
            MouseEventKind::Up(MouseButton::Left) => match self.drag.pointer_up(pos, &self.store) {
                DropOutcome::Transition(request) => self.dispatch(request),
                DropOutcome::Click(task_id) => {
                    self.select(task_id);
                    None
                }
                DropOutcome::Cancelled | DropOutcome::NoOp | DropOutcome::Ignored => None,
            },
            _ => None,
        }
    }

    /// Applies a worker event. Returns the follow-up command, if any.
    pub fn apply_net_event(&mut self, event: NetEvent) -> Option<NetCommand> {
        match event {
            NetEvent::TransitionSettled {
                task_id,
                seq,
                outcome,
                epoch,
            } => {
                let settlement = self.coordinator.settle_at(task_id, seq, &outcome, epoch);
                self.show_notice(settlement.notice);
                Some(NetCommand::Refresh)
            }
            NetEvent::TasksFetched { tasks, epoch } => {
                let selected = self.selected_task().map(|t| t.id);
                self.coordinator.reconcile_at(&mut self.store, tasks, epoch);
                match selected {
                    Some(task_id) if self.store.get(task_id).is_some() => self.select(task_id),
                    _ => self.clamp_selection(),
                }
                None
            }
            NetEvent::FetchFailed(reason) => {
                self.show_notice(Notice::error(format!("Refresh failed: {reason}")));
                None
            }
        }
    }

    /// Moves the selected card one column over.
    fn move_selected(&mut self, direction: MoveDirection) -> Option<NetCommand> {
        let task_id = self.selected_task()?.id;
        match self.drag.request_move(task_id, direction, &self.store) {
            DropOutcome::Transition(request) => self.dispatch(request),
            _ => None,
        }
    }

    /// Applies a transition locally and returns the write to send.
    fn dispatch(&mut self, request: TransitionRequest) -> Option<NetCommand> {
        let ticket = self.coordinator.tentative_apply(&mut self.store, request)?;
        self.select(ticket.task_id);
        Some(NetCommand::UpdateStatus(ticket))
    }

    /// Puts the keyboard cursor on `task_id`.
    fn select(&mut self, task_id: TaskId) {
        if let Some((status, row)) = self.store.locate(task_id) {
            self.focus = status;
            self.selected = row;
        }
    }

    fn shift_focus(&mut self, direction: MoveDirection) {
        let index = self.focus.column_index();
        let next = match direction {
            MoveDirection::Left => index.checked_sub(1),
            MoveDirection::Right => Some(index + 1),
        };
        if let Some(status) = next.and_then(TaskStatus::from_column_index) {
            self.focus = status;
            self.clamp_selection();
        }
    }

    fn clamp_selection(&mut self) {
        let len = self.store.grouped().get(self.focus).len();
        self.selected = self.selected.min(len.saturating_sub(1));
    }
}
