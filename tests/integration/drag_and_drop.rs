//! Integration tests for mouse drag-and-drop on a rendered board.
//!
//! Renders the real UI into a `TestBackend`, hands the resulting layout to
//! the `App`, then replays crossterm mouse events:
//! - Press, drag past the threshold and release over a column moves a card
//! - A short press-release selects without moving
//! - Releasing outside the columns or pressing Esc cancels
//! - Dropping onto the current column sends nothing

#![allow(clippy::unwrap_used, clippy::expect_used)]

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::{Terminal, backend::TestBackend, layout::Rect};

use taskboard::api::BoardScope;
use taskboard::app::App;
use taskboard::board::{BoardLayout, BoardStore};
use taskboard::net::NetCommand;
use taskboard::ui;
use taskboard_proto::task::{Task, TaskId, TaskStatus};

fn app() -> App {
    let mut app = App::new(BoardScope::Personal).with_drag_activation(2);
    app.store = BoardStore::from_tasks(vec![
        Task::new(7, "Fix login", TaskStatus::Todo),
        Task::new(8, "Write docs", TaskStatus::InProgress),
    ]);
    app
}

/// Draw one frame and install its layout, as the main loop does.
fn render(app: &mut App) -> BoardLayout {
    let mut terminal = Terminal::new(TestBackend::new(90, 24)).unwrap();
    let mut layout = BoardLayout::default();
    terminal
        .draw(|frame| layout = ui::draw(frame, app))
        .unwrap();
    app.set_layout(layout.clone());
    layout
}

fn mouse(kind: MouseEventKind, x: u16, y: u16) -> MouseEvent {
    MouseEvent {
        kind,
        column: x,
        row: y,
        modifiers: KeyModifiers::NONE,
    }
}

fn card_area(layout: &BoardLayout, id: u64) -> Rect {
    layout
        .cards
        .iter()
        .find(|(task_id, _)| *task_id == TaskId::new(id))
        .map(|(_, area)| *area)
        .expect("card not rendered")
}

fn column_area(layout: &BoardLayout, status: TaskStatus) -> Rect {
    layout
        .columns
        .iter()
        .find(|(s, _)| *s == status)
        .map(|(_, area)| *area)
        .expect("column not rendered")
}

/// A point inside the column well below any card.
fn empty_spot(area: Rect) -> (u16, u16) {
    (area.x + area.width / 2, area.y + area.height - 2)
}

// =============================================================================
// Drag and drop
// =============================================================================

#[test]
fn drag_card_to_in_progress_dispatches_update() {
    let mut app = app();
    let layout = render(&mut app);
    let card = card_area(&layout, 7);
    let (tx, ty) = empty_spot(column_area(&layout, TaskStatus::InProgress));

    app.handle_mouse_event(mouse(MouseEventKind::Down(MouseButton::Left), card.x + 2, card.y + 1));
    app.handle_mouse_event(mouse(MouseEventKind::Drag(MouseButton::Left), tx, ty));
    assert!(app.drag.is_dragging());
    assert_eq!(
        app.drag.session().unwrap().over,
        Some(TaskStatus::InProgress)
    );

    // The dragged card renders while the session is active.
    render(&mut app);

    let cmd = app.handle_mouse_event(mouse(MouseEventKind::Up(MouseButton::Left), tx, ty));
    let Some(NetCommand::UpdateStatus(ticket)) = cmd else {
        panic!("expected UpdateStatus, got {cmd:?}");
    };
    assert_eq!(ticket.task_id, TaskId::new(7));
    assert_eq!(ticket.status, TaskStatus::InProgress);

    // Grouped under the new column before any network activity.
    let groups = app.store.grouped();
    let in_progress: Vec<TaskId> = groups
        .get(TaskStatus::InProgress)
        .iter()
        .map(|t| t.id)
        .collect();
    assert!(in_progress.contains(&TaskId::new(7)));
    assert!(groups.get(TaskStatus::Todo).is_empty());
    assert!(app.coordinator.is_pending(TaskId::new(7)));
}

#[test]
fn short_press_selects_without_moving() {
    let mut app = app();
    let layout = render(&mut app);
    let card = card_area(&layout, 8);
    let revision = app.store.revision();

    app.handle_mouse_event(mouse(MouseEventKind::Down(MouseButton::Left), card.x + 2, card.y + 1));
    app.handle_mouse_event(mouse(MouseEventKind::Drag(MouseButton::Left), card.x + 3, card.y + 1));
    let cmd = app.handle_mouse_event(mouse(
        MouseEventKind::Up(MouseButton::Left),
        card.x + 3,
        card.y + 1,
    ));

    assert!(cmd.is_none());
    assert_eq!(app.store.revision(), revision);
    assert_eq!(app.focus, TaskStatus::InProgress);
    assert_eq!(app.selected_task().unwrap().id, TaskId::new(8));
}

#[test]
fn drop_on_own_column_sends_nothing() {
    let mut app = app();
    let layout = render(&mut app);
    let card = card_area(&layout, 7);
    let (x, y) = empty_spot(column_area(&layout, TaskStatus::Todo));
    let revision = app.store.revision();

    app.handle_mouse_event(mouse(MouseEventKind::Down(MouseButton::Left), card.x + 2, card.y + 1));
    app.handle_mouse_event(mouse(MouseEventKind::Drag(MouseButton::Left), x, y));
    let cmd = app.handle_mouse_event(mouse(MouseEventKind::Up(MouseButton::Left), x, y));

    assert!(cmd.is_none());
    assert_eq!(app.store.revision(), revision);
    assert_eq!(app.coordinator.pending_count(), 0);
}

#[test]
fn release_outside_columns_cancels() {
    let mut app = app();
    let layout = render(&mut app);
    let card = card_area(&layout, 7);
    // The status bar row sits below every column.
    let outside_y = column_area(&layout, TaskStatus::Todo).bottom();

    app.handle_mouse_event(mouse(MouseEventKind::Down(MouseButton::Left), card.x + 2, card.y + 1));
    app.handle_mouse_event(mouse(MouseEventKind::Drag(MouseButton::Left), 45, outside_y));
    assert_eq!(app.drag.session().unwrap().over, None);
    let cmd = app.handle_mouse_event(mouse(MouseEventKind::Up(MouseButton::Left), 45, outside_y));

    assert!(cmd.is_none());
    assert!(!app.drag.is_dragging());
    assert_eq!(app.store.get(TaskId::new(7)).unwrap().status, TaskStatus::Todo);
}

#[test]
fn escape_cancels_drag_before_quitting() {
    let mut app = app();
    let layout = render(&mut app);
    let card = card_area(&layout, 7);
    let (tx, ty) = empty_spot(column_area(&layout, TaskStatus::Done));

    app.handle_mouse_event(mouse(MouseEventKind::Down(MouseButton::Left), card.x + 2, card.y + 1));
    app.handle_mouse_event(mouse(MouseEventKind::Drag(MouseButton::Left), tx, ty));

    app.handle_key_event(KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE));
    assert!(!app.should_quit);
    assert!(!app.drag.is_dragging());

    // Releasing after the cancel does nothing.
    let cmd = app.handle_mouse_event(mouse(MouseEventKind::Up(MouseButton::Left), tx, ty));
    assert!(cmd.is_none());
    assert_eq!(app.store.get(TaskId::new(7)).unwrap().status, TaskStatus::Todo);

    app.handle_key_event(KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE));
    assert!(app.should_quit);
}

#[test]
fn press_on_empty_column_starts_nothing() {
    let mut app = app();
    let layout = render(&mut app);
    let (x, y) = empty_spot(column_area(&layout, TaskStatus::Done));
    let (tx, ty) = empty_spot(column_area(&layout, TaskStatus::Todo));

    app.handle_mouse_event(mouse(MouseEventKind::Down(MouseButton::Left), x, y));
    app.handle_mouse_event(mouse(MouseEventKind::Drag(MouseButton::Left), tx, ty));
    assert!(!app.drag.is_dragging());
    assert!(app
        .handle_mouse_event(mouse(MouseEventKind::Up(MouseButton::Left), tx, ty))
        .is_none());
}
