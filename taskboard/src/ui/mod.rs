//! Terminal UI rendering.

pub mod board;
pub mod status_bar;
pub mod theme;

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    widgets::Clear,
};

use crate::app::App;
use crate::board::BoardLayout;

/// Width of the card that follows the pointer during a drag.
const GHOST_WIDTH: u16 = 28;

/// Main draw function for the entire UI.
///
/// Returns the screen regions of the columns and cards just drawn; the
/// caller hands them back to [`App::set_layout`] for hit testing.
pub fn draw(frame: &mut Frame, app: &App) -> BoardLayout {
    // Board on top, status bar at bottom
    let main_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(1)])
        .split(frame.area());

    let layout = board::render(frame, main_chunks[0], app);
    status_bar::render(frame, main_chunks[1], app);
    draw_drag_ghost(frame, app);

    layout
}

/// Draws the dragged card under the pointer.
fn draw_drag_ghost(frame: &mut Frame, app: &App) {
    let Some(session) = app.drag.session() else {
        return;
    };
    let Some(task) = app.store.get(session.task_id) else {
        return;
    };
    let screen = frame.area();
    let width = GHOST_WIDTH.min(screen.width);
    let height = board::CARD_HEIGHT.min(screen.height);
    let x = session
        .pointer
        .x
        .saturating_sub(width / 2)
        .min(screen.right().saturating_sub(width));
    let y = session.pointer.y.min(screen.bottom().saturating_sub(height));
    let area = Rect::new(x, y, width, height);

    frame.render_widget(Clear, area);
    let pending = app.coordinator.is_pending(task.id);
    board::render_card(frame, area, task, board::CardStyle::Ghost, pending);
}
