use crate::{app::App, runner::RunnerEvent};

/// Process an event from a staggered run.
pub fn handle_runner_event(app: &mut App, event: RunnerEvent) {
    let finished_id = match &event {
        RunnerEvent::TestFinished { id, .. } => Some(id.clone()),
        RunnerEvent::RunFinished { .. } => None,
    };

    if !app.runner.apply(event) {
        return;
    }

    match finished_id {
        Some(id) => {
            app.scheduled.remove(&id);
        }
        None => {
            app.scheduled.clear();
            app.run_handle = None;
            let summary = app.runner.summary();
            let message = format!(
                "{} passed, {} failed in {:.1}ms",
                summary.passed,
                summary.failed,
                summary.duration.as_secs_f64() * 1000.0
            );
            if summary.failed == 0 {
                app.notifier.success(message);
            } else {
                app.notifier.error(message);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::{Action, handle_action};
    use crate::config::Config;
    use crate::matcher::expect;
    use crate::models::TestDefinition;
    use crate::runner::TestRunner;

    fn app() -> (App, tokio::sync::mpsc::UnboundedReceiver<RunnerEvent>) {
        let runner = TestRunner::new(
            "Events",
            vec![
                TestDefinition::assertion("one", "", || expect(1).to_be(1)),
                TestDefinition::assertion("two", "", || expect(2).to_be(3)),
            ],
        )
        .unwrap();
        App::new(runner, Config::default())
    }

    #[tokio::test(start_paused = true)]
    async fn run_all_completes_through_events() {
        let (mut app, mut rx) = app();
        handle_action(&mut app, Action::RunAll);

        loop {
            let event = rx.recv().await.unwrap();
            let done = matches!(event, RunnerEvent::RunFinished { .. });
            handle_runner_event(&mut app, event);
            if done {
                break;
            }
        }

        assert!(!app.running());
        assert!(app.run_handle.is_none());
        assert_eq!(app.runner.passed_count(), 1);
        assert_eq!(app.runner.failed_count(), 1);
        assert!(app.notifier.recent().is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn events_after_reset_are_ignored() {
        let (mut app, mut rx) = app();
        handle_action(&mut app, Action::RunAll);
        let first = rx.recv().await.unwrap();

        handle_action(&mut app, Action::Reset);
        handle_runner_event(&mut app, first);

        assert!(app.runner.results().iter().all(Option::is_none));
        assert!(app.scheduled.is_empty());
    }
}
