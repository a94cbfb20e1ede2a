use ratatui::{prelude::*, widgets::Paragraph};

use super::test_list::SPINNER_FRAMES;
use super::theme;
use crate::app::App;

fn key_hint<'a>(key: &'a str, label: &'a str) -> [Span<'a>; 2] {
    [
        Span::styled(key, Style::default().fg(theme::YELLOW)),
        Span::raw(label),
    ]
}

pub fn draw(frame: &mut Frame, app: &App, area: Rect) {
    let bar = if app.filter_active {
        let mut spans = vec![Span::raw(" ")];
        spans.extend(key_hint("[esc]", " clear  "));
        spans.extend(key_hint("[enter]", " apply"));
        Line::from(spans)
    } else {
        let mut spans = vec![Span::raw(" ")];
        for (key, label) in [
            ("[enter]", " run  "),
            ("[a]", " run all  "),
            ("[r]", " rerun failed  "),
            ("[x]", " reset  "),
            ("[y]", " copy  "),
            ("[f]", " filter  "),
            ("[q]", " quit"),
        ] {
            spans.extend(key_hint(key, label));
        }

        if app.running() {
            let spinner = SPINNER_FRAMES[app.spinner_tick % SPINNER_FRAMES.len()];
            spans.push(Span::styled(
                format!("  {} running...", spinner),
                Style::default().fg(theme::YELLOW),
            ));
        }

        let summary = app.runner.summary();
        if summary.passed + summary.failed > 0 {
            spans.push(Span::styled("  ✔ ", Style::default().fg(theme::GREEN)));
            spans.push(Span::styled(
                summary.passed.to_string(),
                Style::default().fg(theme::GREEN),
            ));
            spans.push(Span::styled("  ✘ ", Style::default().fg(theme::RED)));
            spans.push(Span::styled(
                summary.failed.to_string(),
                Style::default().fg(theme::RED),
            ));
            spans.push(Span::styled("  ◌ ", Style::default().fg(theme::TEAL)));
            spans.push(Span::styled(
                summary.pending.to_string(),
                Style::default().fg(theme::TEAL),
            ));
            spans.push(Span::styled(
                format!("  {:.2}ms", summary.duration.as_secs_f64() * 1000.0),
                Style::default().fg(theme::MAUVE),
            ));
        }

        Line::from(spans)
    };

    let paragraph = Paragraph::new(bar).style(Style::default().bg(theme::SURFACE0));
    frame.render_widget(paragraph, area);
}
