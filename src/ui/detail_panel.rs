use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Gauge, Paragraph, Wrap},
};

use super::theme;
use crate::app::{App, Panel};
use crate::models::{TestDefinition, TestResult, TestStatus};

pub fn draw(frame: &mut Frame, app: &mut App, area: Rect) {
    let focused = app.active_panel == Panel::Detail;
    let border_style = if focused {
        Style::default().fg(theme::BLUE)
    } else {
        Style::default().fg(theme::SURFACE2)
    };

    let block = Block::default()
        .title(" Detail ")
        .borders(Borders::ALL)
        .border_style(border_style);

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let [progress_area, content_area] =
        Layout::vertical([Constraint::Length(1), Constraint::Min(1)]).areas(inner);

    let percent = (app.progress_percent() * 100.0).min(100.0) as u16;
    let gauge = Gauge::default()
        .gauge_style(Style::default().fg(theme::GREEN).bg(theme::SURFACE0))
        .percent(percent)
        .label(format!("{}%", percent));
    frame.render_widget(gauge, progress_area);

    let content = match app.selected_definition() {
        Some(definition) => {
            let scheduled = app.scheduled.contains(&definition.id);
            build_detail_text(definition, app.runner.result(&definition.id), scheduled)
        }
        None => Text::from("Select a test to view details."),
    };

    let content_height = content.height() as u16;
    let max_scroll = content_height.saturating_sub(content_area.height);
    let scroll = app.detail_scroll_offset.min(max_scroll);

    let paragraph = Paragraph::new(content)
        .wrap(Wrap { trim: false })
        .scroll((scroll, 0));
    frame.render_widget(paragraph, content_area);
    app.detail_scroll_offset = scroll;
}

fn build_detail_text<'a>(
    definition: &'a TestDefinition,
    result: Option<&'a TestResult>,
    scheduled: bool,
) -> Text<'a> {
    let status = result.map_or(TestStatus::Pending, TestResult::status);
    let mut lines: Vec<Line> = vec![
        Line::from(vec![
            Span::styled(status.icon(), Style::default().fg(status.color())),
            Span::raw(" "),
            Span::styled(definition.name.as_str(), Style::default().fg(theme::TEXT).bold()),
        ]),
        Line::from(Span::styled(
            definition.description.as_str(),
            Style::default().fg(theme::SUBTEXT0),
        )),
        Line::from(""),
    ];

    let Some(result) = result else {
        let hint = if scheduled {
            "Queued in the current run..."
        } else {
            "No result yet. Press [enter] to run this test."
        };
        lines.push(Line::from(Span::styled(hint, Style::default().fg(theme::OVERLAY0))));
        return Text::from(lines);
    };

    lines.push(Line::from(vec![
        Span::styled("  Expected: ", Style::default().fg(theme::GREEN)),
        Span::styled(result.expected.to_string(), Style::default().fg(theme::GREEN)),
    ]));
    let actual_color = if result.passed { theme::GREEN } else { theme::RED };
    lines.push(Line::from(vec![
        Span::styled("  Actual:   ", Style::default().fg(actual_color)),
        Span::styled(result.actual.to_string(), Style::default().fg(actual_color).bold()),
    ]));

    if let Some(ref error) = result.error {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "━━ Error ━━",
            Style::default().fg(theme::RED),
        )));
        for error_line in error.lines() {
            lines.push(Line::from(Span::styled(error_line, Style::default().fg(theme::RED))));
        }
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        format!("  {:.3}ms", result.execution_time_ms()),
        Style::default().fg(theme::MAUVE),
    )));

    Text::from(lines)
}
