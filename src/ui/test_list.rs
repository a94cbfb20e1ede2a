use ratatui::{
    prelude::*,
    widgets::{Block, Borders, List, ListItem},
};

use super::theme;
use crate::app::{App, Panel};

pub const SPINNER_FRAMES: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

pub fn draw(frame: &mut Frame, app: &mut App, area: Rect) {
    let focused = app.active_panel == Panel::TestList;
    let border_style = if focused {
        Style::default().fg(theme::BLUE)
    } else {
        Style::default().fg(theme::SURFACE2)
    };

    let block = Block::default()
        .title(format!(" {} ", app.runner.title()))
        .borders(Borders::ALL)
        .border_style(border_style);

    app.list_viewport_height = block.inner(area).height as usize;

    let visible = app.visible_tests();
    let end = (app.list_scroll_offset + app.list_viewport_height).min(visible.len());
    let start = app.list_scroll_offset.min(end);
    let show_timings = app.config.display.show_timings;

    let items: Vec<ListItem> = visible[start..end]
        .iter()
        .enumerate()
        .filter_map(|(view_i, &index)| {
            let definition = app.runner.definitions().get(index)?;
            let result = app.runner.result(&definition.id);
            let status = app.runner.status(&definition.id);

            let (icon, color) = if app.scheduled.contains(&definition.id) {
                (
                    SPINNER_FRAMES[app.spinner_tick % SPINNER_FRAMES.len()],
                    theme::YELLOW,
                )
            } else {
                (status.icon(), status.color())
            };

            let selected = view_i + start == app.selected_test_index && focused;
            let name_style = if selected {
                Style::default().bg(theme::SURFACE1).fg(theme::TEXT)
            } else {
                Style::default().fg(theme::TEXT)
            };

            let mut spans = vec![
                Span::styled(format!("{} ", icon), Style::default().fg(color)),
                Span::styled(definition.name.as_str(), name_style),
            ];
            if show_timings && let Some(result) = result {
                spans.push(Span::styled(
                    format!("  {:.2}ms", result.execution_time_ms()),
                    Style::default().fg(theme::OVERLAY0),
                ));
            }

            Some(ListItem::new(Line::from(spans)))
        })
        .collect();

    let list = List::new(items).block(block);
    frame.render_widget(list, area);
}
