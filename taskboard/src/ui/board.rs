//! Kanban columns and cards.

use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};
use taskboard_proto::task::Task;

use super::theme;
use crate::app::App;
use crate::board::BoardLayout;

/// Rows taken by one card, borders included.
pub const CARD_HEIGHT: u16 = 3;

/// How a card is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardStyle {
    /// Plain card.
    Normal,
    /// Under the keyboard cursor.
    Selected,
    /// Left behind in its column while being dragged.
    Placeholder,
    /// Following the pointer.
    Ghost,
}

/// Render the three status columns and return their hit regions.
pub fn render(frame: &mut Frame, area: Rect, app: &App) -> BoardLayout {
    let columns = Layout::horizontal([Constraint::Ratio(1, 3); 3]).split(area);
    let groups = app.store.grouped();
    let session = app.drag.session();
    let hover = session.and_then(|s| s.over);
    let dragged = session.map(|s| s.task_id);

    let mut layout = BoardLayout::default();
    for (status, tasks) in groups.iter() {
        let column_area = columns[status.column_index()];
        layout.columns.push((status, column_area));

        let focused = app.focus == status;
        let border_style = if hover == Some(status) {
            theme::drop_target()
        } else if focused {
            theme::highlighted()
        } else {
            theme::normal()
        };
        let block = Block::default()
            .title(Span::styled(
                format!(" {} ({}) ", status.label(), tasks.len()),
                theme::panel_title(theme::column_color(status)),
            ))
            .borders(Borders::ALL)
            .border_style(border_style);
        let inner = block.inner(column_area);
        frame.render_widget(block, column_area);

        // Scroll the focused column so the selected card stays visible.
        let visible = usize::from(inner.height / CARD_HEIGHT);
        let offset = if focused && app.selected >= visible {
            app.selected + 1 - visible
        } else {
            0
        };

        let mut y = inner.y;
        for (row, task) in tasks.iter().enumerate().skip(offset).take(visible) {
            let card = Rect::new(inner.x, y, inner.width, CARD_HEIGHT);
            let style = if dragged == Some(task.id) {
                CardStyle::Placeholder
            } else if focused && row == app.selected {
                CardStyle::Selected
            } else {
                CardStyle::Normal
            };
            render_card(frame, card, task, style, app.coordinator.is_pending(task.id));
            layout.cards.push((task.id, card));
            y = y.saturating_add(CARD_HEIGHT);
        }
    }
    layout
}

/// Render one card: priority badge, title, assignee initial.
pub fn render_card(frame: &mut Frame, area: Rect, task: &Task, style: CardStyle, pending: bool) {
    let border_style = match style {
        CardStyle::Normal => theme::dimmed(),
        CardStyle::Selected => theme::highlighted(),
        CardStyle::Placeholder => theme::placeholder(),
        CardStyle::Ghost => theme::drop_target(),
    };
    let text_style = if style == CardStyle::Placeholder {
        theme::placeholder()
    } else {
        theme::normal()
    };

    let mut title = format!(" #{} ", task.id);
    if pending {
        title.push_str("⟳ ");
    }

    let mut spans = vec![
        Span::styled(
            format!("[{}]", task.priority.code()),
            theme::normal().fg(theme::priority_color(task.priority)),
        ),
        Span::raw(" "),
        Span::styled(task.title.clone(), text_style),
    ];
    if let Some(assignee) = &task.assignee {
        spans.push(Span::styled(format!(" @{}", assignee.initial()), theme::dimmed()));
    }

    let block = Block::default()
        .title(Span::styled(title, theme::dimmed()))
        .borders(Borders::ALL)
        .border_style(border_style);
    frame.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
}
