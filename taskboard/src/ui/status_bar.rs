//! Status bar rendering.

use ratatui::{
    Frame,
    layout::Rect,
    text::{Line, Span},
    widgets::Paragraph,
};

use super::theme;
use crate::app::App;
use crate::board::{NoticeLevel, SyncPhase};

const HELP: &str = "h/l: column | j/k: card | H/L or drag: move | r: refresh | q: quit";
const DRAG_HELP: &str = "release over a column to drop | Esc: cancel";

/// Render the status bar at the bottom of the screen.
pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let phase = app.sync_phase();
    let dot_color = match phase {
        SyncPhase::Idle => theme::FG_SECONDARY,
        SyncPhase::Pending => theme::WARNING,
        SyncPhase::Reconciled => theme::SUCCESS,
    };
    let pending = app.coordinator.pending_count();
    let phase_text = if pending > 0 {
        format!(" {} ({pending} pending)", phase.label())
    } else {
        format!(" {}", phase.label())
    };

    let mut spans = vec![
        Span::styled("Taskboard", theme::bold()),
        Span::raw(" | "),
        Span::raw(app.scope.to_string()),
        Span::raw(" | "),
        Span::styled("●", theme::normal().fg(dot_color)),
        Span::raw(phase_text),
        Span::raw(" | "),
    ];

    if let Some(notice) = app.notice() {
        let color = match notice.level {
            NoticeLevel::Info => theme::SUCCESS,
            NoticeLevel::Error => theme::ERROR,
        };
        spans.push(Span::styled(notice.text.clone(), theme::normal().fg(color)));
    } else if app.drag.is_dragging() {
        spans.push(Span::styled(DRAG_HELP, theme::dimmed()));
    } else {
        spans.push(Span::styled(HELP, theme::dimmed()));
    }

    let paragraph = Paragraph::new(Line::from(spans)).style(theme::status_bar_bg());
    frame.render_widget(paragraph, area);
}
