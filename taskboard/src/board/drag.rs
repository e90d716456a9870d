//! Drag interaction controller.
//!
//! Turns pointer gestures into [`TransitionRequest`]s. A press on a card
//! only becomes a drag once the pointer has travelled the activation
//! distance, so a plain click never moves a task. On release the column
//! under the pointer is the drop target. The controller reads the store
//! to filter no-op drops but never mutates it.

use ratatui::layout::{Position, Rect};
use taskboard_proto::task::{TaskId, TaskStatus};

use super::TransitionRequest;
use super::store::BoardStore;

/// Default activation distance, in terminal cells.
pub const DEFAULT_ACTIVATION_DISTANCE: u16 = 2;

/// Screen regions of the last rendered frame.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoardLayout {
    /// Column drop zones.
    pub columns: Vec<(TaskStatus, Rect)>,
    /// Card hit boxes.
    pub cards: Vec<(TaskId, Rect)>,
}

impl BoardLayout {
    /// Column whose area contains `pos`.
    #[must_use]
    pub fn column_at(&self, pos: Position) -> Option<TaskStatus> {
        self.columns
            .iter()
            .find(|(_, area)| contains(*area, pos))
            .map(|(status, _)| *status)
    }

    /// Card whose area contains `pos`.
    #[must_use]
    pub fn card_at(&self, pos: Position) -> Option<TaskId> {
        self.cards
            .iter()
            .find(|(_, area)| contains(*area, pos))
            .map(|(id, _)| *id)
    }
}

fn contains(area: Rect, pos: Position) -> bool {
    pos.x >= area.x
        && pos.x < area.x.saturating_add(area.width)
        && pos.y >= area.y
        && pos.y < area.y.saturating_add(area.height)
}

/// An active drag, from activation to release.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DragSession {
    /// Task being moved.
    pub task_id: TaskId,
    /// Where the press started.
    pub origin: Position,
    /// Last known pointer position.
    pub pointer: Position,
    /// Column currently under the pointer.
    pub over: Option<TaskStatus>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Gesture {
    Idle,
    /// Pressed on a card, not yet past the activation distance.
    Pressed { task_id: TaskId, origin: Position },
    Dragging(DragSession),
}

/// What a finished gesture amounts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropOutcome {
    /// No gesture was in progress.
    Ignored,
    /// Press and release without reaching the activation distance.
    Click(TaskId),
    /// Released outside every column, or cancelled explicitly.
    Cancelled,
    /// Dropped on the column the task is already in, or the task is gone.
    NoOp,
    /// Move the task.
    Transition(TransitionRequest),
}

/// Keyboard move direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveDirection {
    /// One column left.
    Left,
    /// One column right.
    Right,
}

/// Tracks one pointer gesture at a time against the last layout.
#[derive(Debug, Clone)]
pub struct DragController {
    activation_distance: u16,
    layout: BoardLayout,
    gesture: Gesture,
}

impl Default for DragController {
    fn default() -> Self {
        Self::new(DEFAULT_ACTIVATION_DISTANCE)
    }
}

impl DragController {
    /// Creates a controller that activates after `activation_distance` cells.
    #[must_use]
    pub fn new(activation_distance: u16) -> Self {
        Self {
            activation_distance,
            layout: BoardLayout::default(),
            gesture: Gesture::Idle,
        }
    }

    /// Installs the regions of the frame just rendered.
    pub fn set_layout(&mut self, layout: BoardLayout) {
        self.layout = layout;
    }

    /// Regions of the last rendered frame.
    #[must_use]
    pub const fn layout(&self) -> &BoardLayout {
        &self.layout
    }

    /// The active drag, if the pointer has passed the activation distance.
    #[must_use]
    pub const fn session(&self) -> Option<&DragSession> {
        match &self.gesture {
            Gesture::Dragging(session) => Some(session),
            _ => None,
        }
    }

    /// Whether a drag session is active.
    #[must_use]
    pub const fn is_dragging(&self) -> bool {
        matches!(self.gesture, Gesture::Dragging(_))
    }

    /// Pointer pressed. Returns the card under the pointer, if any.
    pub fn pointer_down(&mut self, pos: Position) -> Option<TaskId> {
        let task_id = self.layout.card_at(pos);
        self.gesture = task_id.map_or(Gesture::Idle, |task_id| Gesture::Pressed {
            task_id,
            origin: pos,
        });
        task_id
    }

    /// Pointer moved with the button held.
    pub fn pointer_move(&mut self, pos: Position) {
        match self.gesture {
            Gesture::Idle => {}
            Gesture::Pressed { task_id, origin } => {
                if self.past_threshold(origin, pos) {
                    tracing::trace!(%task_id, "drag activated");
                    self.gesture = Gesture::Dragging(DragSession {
                        task_id,
                        origin,
                        pointer: pos,
                        over: self.layout.column_at(pos),
                    });
                }
            }
            Gesture::Dragging(ref mut session) => {
                session.pointer = pos;
                session.over = self.layout.column_at(pos);
            }
        }
    }

    /// Pointer released: resolves the drop against the column under `pos`.
    pub fn pointer_up(&mut self, pos: Position, store: &BoardStore) -> DropOutcome {
        let gesture = std::mem::replace(&mut self.gesture, Gesture::Idle);
        match gesture {
            Gesture::Idle => DropOutcome::Ignored,
            Gesture::Pressed { task_id, .. } => DropOutcome::Click(task_id),
            Gesture::Dragging(session) => match self.layout.column_at(pos) {
                None => {
                    tracing::debug!(task_id = %session.task_id, "dropped outside columns");
                    DropOutcome::Cancelled
                }
                Some(target) => resolve(store, session.task_id, target),
            },
        }
    }

    /// Abandons the current gesture.
    pub fn cancel(&mut self) -> DropOutcome {
        match std::mem::replace(&mut self.gesture, Gesture::Idle) {
            Gesture::Idle => DropOutcome::Ignored,
            Gesture::Pressed { .. } | Gesture::Dragging(_) => DropOutcome::Cancelled,
        }
    }

    /// Keyboard move of `task_id` one column in `direction`.
    #[must_use]
    pub fn request_move(
        &self,
        task_id: TaskId,
        direction: MoveDirection,
        store: &BoardStore,
    ) -> DropOutcome {
        let Some(task) = store.get(task_id) else {
            return DropOutcome::NoOp;
        };
        let index = task.status.column_index();
        let target = match direction {
            MoveDirection::Left => index.checked_sub(1).and_then(TaskStatus::from_column_index),
            MoveDirection::Right => TaskStatus::from_column_index(index + 1),
        };
        target.map_or(DropOutcome::NoOp, |target| resolve(store, task_id, target))
    }

    fn past_threshold(&self, origin: Position, pos: Position) -> bool {
        let dx = u32::from(origin.x.abs_diff(pos.x));
        let dy = u32::from(origin.y.abs_diff(pos.y));
        let min = u32::from(self.activation_distance);
        dx * dx + dy * dy >= min * min
    }
}

/// Applies the no-op rules to a drop of `task_id` on `target`.
fn resolve(store: &BoardStore, task_id: TaskId, target: TaskStatus) -> DropOutcome {
    match store.get(task_id) {
        None => DropOutcome::NoOp,
        Some(task) if task.status == target => DropOutcome::NoOp,
        Some(_) => DropOutcome::Transition(TransitionRequest { task_id, target }),
    }
}
