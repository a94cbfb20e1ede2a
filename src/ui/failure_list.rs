use ratatui::{
    prelude::*,
    widgets::{Block, Borders, List, ListItem},
};

use super::theme;
use crate::app::{App, Panel};

pub fn draw(frame: &mut Frame, app: &mut App, area: Rect) {
    let focused = app.active_panel == Panel::FailedList;
    let border_style = if focused {
        Style::default().fg(theme::BLUE)
    } else {
        Style::default().fg(theme::SURFACE2)
    };

    let block = Block::default()
        .title(" Failed Tests ")
        .borders(Borders::ALL)
        .border_style(border_style);

    app.failed_viewport_height = block.inner(area).height as usize;

    let failed = app.failed_tests();
    let end = (app.failed_scroll_offset + app.failed_viewport_height).min(failed.len());
    let start = app.failed_scroll_offset.min(end);

    let items: Vec<ListItem> = failed[start..end]
        .iter()
        .enumerate()
        .filter_map(|(view_i, &index)| {
            let definition = app.runner.definitions().get(index)?;
            let selected = view_i + start == app.selected_failed_index && focused;

            let item = ListItem::new(Line::from(vec![
                Span::styled("✘ ", Style::default().fg(theme::RED)),
                Span::styled(definition.name.as_str(), Style::default().fg(theme::RED)),
            ]));

            Some(if selected {
                item.style(Style::default().bg(theme::SURFACE1))
            } else {
                item
            })
        })
        .collect();

    let list = List::new(items).block(block);
    frame.render_widget(list, area);
}
