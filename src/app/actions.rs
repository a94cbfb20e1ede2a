use anyhow::{Context, Result};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tracing::{info, warn};
use tui_input::InputRequest;

use crate::app::{App, Panel};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Quit,
    FocusNext,
    FocusPrevious,
    NavigateUp,
    NavigateDown,
    ScrollUp,
    ScrollDown,
    JumpToStart,
    JumpToEnd,
    RunSelected,
    RunAll,
    RerunFailed,
    Reset,
    CopyResult,
    FilterEnter,
    FilterInput(char),
    FilterBackspace,
    FilterExit,
    FilterApply,
}

/// Process a keyboard action. Must run inside a tokio runtime because
/// [`Action::RunAll`] schedules a staggered run.
pub fn handle_action(app: &mut App, action: Action) {
    match action {
        Action::Quit => {
            app.cancel_run();
            app.should_quit = true;
        }

        Action::FocusNext => {
            app.active_panel = match app.active_panel {
                Panel::TestList => Panel::FailedList,
                Panel::FailedList => Panel::Detail,
                Panel::Detail => Panel::TestList,
            };
        }

        Action::FocusPrevious => {
            app.active_panel = match app.active_panel {
                Panel::TestList => Panel::Detail,
                Panel::FailedList => Panel::TestList,
                Panel::Detail => Panel::FailedList,
            };
        }

        Action::NavigateUp => move_selection(app, -1),
        Action::NavigateDown => move_selection(app, 1),

        Action::ScrollUp => {
            let half = (app.list_viewport_height / 2).max(1) as isize;
            move_selection(app, -half);
        }

        Action::ScrollDown => {
            let half = (app.list_viewport_height / 2).max(1) as isize;
            move_selection(app, half);
        }

        Action::JumpToStart => match app.active_panel {
            Panel::TestList => {
                app.selected_test_index = 0;
                app.list_scroll_offset = 0;
                app.detail_scroll_offset = 0;
            }
            Panel::FailedList => {
                app.selected_failed_index = 0;
                app.failed_scroll_offset = 0;
                app.detail_scroll_offset = 0;
            }
            Panel::Detail => app.detail_scroll_offset = 0,
        },

        Action::JumpToEnd => match app.active_panel {
            Panel::Detail => app.detail_scroll_offset = u16::MAX,
            _ => move_selection(app, isize::MAX),
        },

        Action::RunSelected => {
            let Some(index) = app.selected_test() else {
                return;
            };
            let id = app.runner.definitions()[index].id.clone();
            match app.runner.run_single_test(&id) {
                Ok(result) => {
                    info!(test = %id, passed = result.passed, "ran single test");
                    app.scheduled.remove(&id);
                }
                Err(e) => app.notifier.error(e.to_string()),
            }
        }

        Action::RunAll => {
            let handle = app
                .runner
                .run_all_staggered(app.event_tx.clone(), app.config.run.stagger());
            app.scheduled = app
                .runner
                .definitions()
                .iter()
                .map(|d| d.id.clone())
                .collect();
            // Replacing the handle aborts the previous run.
            app.run_handle = Some(handle);
            app.selected_failed_index = 0;
            app.failed_scroll_offset = 0;
        }

        Action::RerunFailed => {
            let failed: Vec<_> = app
                .failed_tests()
                .into_iter()
                .map(|i| app.runner.definitions()[i].id.clone())
                .collect();
            if failed.is_empty() {
                app.notifier.info("No failed tests", 2);
                return;
            }
            for id in &failed {
                if let Err(e) = app.runner.run_single_test(id) {
                    app.notifier.error(e.to_string());
                }
            }
            app.selected_failed_index = 0;
            app.failed_scroll_offset = 0;
            let still_failing = app.failed_tests().len();
            app.notifier.info(
                format!("Reran {} failed, {} still failing", failed.len(), still_failing),
                2,
            );
        }

        Action::Reset => {
            app.cancel_run();
            app.runner.reset_results();
            app.selected_failed_index = 0;
            app.failed_scroll_offset = 0;
            app.notifier.info("Results cleared", 2);
        }

        Action::CopyResult => {
            let Some(definition) = app.selected_definition() else {
                return;
            };
            let copied = match app.runner.result(&definition.id) {
                Some(result) => serde_json::to_string_pretty(result)
                    .context("failed to serialize result")
                    .and_then(|text| copy_to_clipboard(&text)),
                None => {
                    app.notifier.info("No result to copy yet", 2);
                    return;
                }
            };
            match copied {
                Ok(()) => app.notifier.success("Result copied to clipboard"),
                Err(e) => {
                    warn!(error = %e, "clipboard copy failed");
                    app.notifier.error(format!("{:#}", e));
                }
            }
        }

        Action::FilterEnter => {
            app.filter_active = true;
        }

        Action::FilterInput(c) => {
            app.filter.handle(InputRequest::InsertChar(c));
            app.selected_test_index = 0;
            app.list_scroll_offset = 0;
        }

        Action::FilterBackspace => {
            app.filter.handle(InputRequest::DeletePrevChar);
            app.selected_test_index = 0;
            app.list_scroll_offset = 0;
        }

        Action::FilterExit => {
            app.filter.reset();
            app.filter_active = false;
        }

        Action::FilterApply => {
            app.filter_active = false;
        }
    }
}

pub fn trigger_action(key: KeyEvent, filter_active: bool) -> Option<Action> {
    if filter_active {
        match key.code {
            KeyCode::Esc => Some(Action::FilterExit),
            KeyCode::Enter => Some(Action::FilterApply),
            KeyCode::Backspace => Some(Action::FilterBackspace),
            KeyCode::Up => Some(Action::NavigateUp),
            KeyCode::Down => Some(Action::NavigateDown),
            KeyCode::Char(c) => Some(Action::FilterInput(c)),
            _ => None,
        }
    } else {
        map_key(key)
    }
}

fn map_key(key: KeyEvent) -> Option<Action> {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('c') => Some(Action::Quit),
            KeyCode::Char('u') => Some(Action::ScrollUp),
            KeyCode::Char('d') => Some(Action::ScrollDown),
            _ => None,
        };
    }

    match key.code {
        KeyCode::Char('q') => Some(Action::Quit),
        KeyCode::Tab => Some(Action::FocusNext),
        KeyCode::BackTab => Some(Action::FocusPrevious),
        KeyCode::Up | KeyCode::Char('k') => Some(Action::NavigateUp),
        KeyCode::Down | KeyCode::Char('j') => Some(Action::NavigateDown),
        KeyCode::Char('g') | KeyCode::Home => Some(Action::JumpToStart),
        KeyCode::Char('G') | KeyCode::End => Some(Action::JumpToEnd),
        KeyCode::Enter => Some(Action::RunSelected),
        KeyCode::Char('a') => Some(Action::RunAll),
        KeyCode::Char('r') => Some(Action::RerunFailed),
        KeyCode::Char('x') => Some(Action::Reset),
        KeyCode::Char('y') => Some(Action::CopyResult),
        KeyCode::Char('f') | KeyCode::Char('/') => Some(Action::FilterEnter),
        KeyCode::PageUp => Some(Action::ScrollUp),
        KeyCode::PageDown => Some(Action::ScrollDown),
        _ => None,
    }
}

/// Move the cursor of the active panel by `delta` rows, clamped to its bounds.
fn move_selection(app: &mut App, delta: isize) {
    match app.active_panel {
        Panel::TestList => {
            let max = app.visible_tests().len().saturating_sub(1);
            app.selected_test_index = step(app.selected_test_index, delta, max);
            app.detail_scroll_offset = 0;
            app.adjust_list_scroll();
        }
        Panel::FailedList => {
            let max = app.failed_tests().len().saturating_sub(1);
            app.selected_failed_index = step(app.selected_failed_index, delta, max);
            app.detail_scroll_offset = 0;
            app.adjust_failed_scroll();
        }
        Panel::Detail => {
            let magnitude = u16::try_from(delta.unsigned_abs()).unwrap_or(u16::MAX);
            app.detail_scroll_offset = if delta < 0 {
                app.detail_scroll_offset.saturating_sub(magnitude)
            } else {
                app.detail_scroll_offset.saturating_add(magnitude)
            };
        }
    }
}

fn step(current: usize, delta: isize, max: usize) -> usize {
    current.saturating_add_signed(delta).min(max)
}

fn copy_to_clipboard(text: &str) -> Result<()> {
    let mut clipboard = arboard::Clipboard::new().context("clipboard unavailable")?;
    clipboard
        .set_text(text)
        .context("failed to write to clipboard")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::models::{TestDefinition, TestOutcome, TestStatus};
    use crate::runner::TestRunner;
    use crate::matcher::expect;

    fn app() -> App {
        let runner = TestRunner::new(
            "Keys",
            vec![
                TestDefinition::assertion("passes", "", || expect(1).to_be(1)),
                TestDefinition::new("fails", "", || Ok(TestOutcome::new(1, 2))),
                TestDefinition::assertion("also passes", "", || expect("a").to_contain("a")),
            ],
        )
        .unwrap();
        App::new(runner, Config::default()).0
    }

    #[test]
    fn navigation_is_clamped() {
        let mut app = app();
        handle_action(&mut app, Action::NavigateUp);
        assert_eq!(app.selected_test_index, 0);
        handle_action(&mut app, Action::JumpToEnd);
        assert_eq!(app.selected_test_index, 2);
        handle_action(&mut app, Action::NavigateDown);
        assert_eq!(app.selected_test_index, 2);
    }

    #[test]
    fn run_selected_then_rerun_failed() {
        let mut app = app();
        handle_action(&mut app, Action::NavigateDown);
        handle_action(&mut app, Action::RunSelected);
        assert_eq!(app.runner.status(&"fails".into()), TestStatus::Failed);
        assert_eq!(app.failed_tests(), vec![1]);

        handle_action(&mut app, Action::RerunFailed);
        assert_eq!(app.runner.failed_count(), 1);
        assert_eq!(app.runner.passed_count(), 0);
    }

    #[test]
    fn filter_narrows_the_list() {
        let mut app = app();
        handle_action(&mut app, Action::FilterEnter);
        for c in "PASS".chars() {
            handle_action(&mut app, Action::FilterInput(c));
        }
        assert_eq!(app.visible_tests(), vec![0, 2]);
        handle_action(&mut app, Action::FilterExit);
        assert_eq!(app.visible_tests(), vec![0, 1, 2]);
        assert!(!app.filter_active);
    }

    #[tokio::test(start_paused = true)]
    async fn run_all_marks_every_test_scheduled_and_reset_clears() {
        let mut app = app();
        handle_action(&mut app, Action::RunAll);
        assert_eq!(app.scheduled.len(), 3);
        assert!(app.running());

        handle_action(&mut app, Action::Reset);
        assert!(!app.running());
        assert!(app.run_handle.is_none());
        assert!(app.runner.results().iter().all(Option::is_none));
    }

    #[test]
    fn key_map() {
        let key = |code| KeyEvent::new(code, KeyModifiers::NONE);
        assert_eq!(trigger_action(key(KeyCode::Char('a')), false), Some(Action::RunAll));
        assert_eq!(trigger_action(key(KeyCode::Char('x')), false), Some(Action::Reset));
        assert_eq!(
            trigger_action(key(KeyCode::Char('a')), true),
            Some(Action::FilterInput('a'))
        );
        assert_eq!(
            trigger_action(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL), false),
            Some(Action::Quit)
        );
    }
}
