use std::collections::HashSet;

use tokio::sync::mpsc;

use crate::{
    app::notifier::Notifier,
    config::Config,
    models::{TestDefinition, TestId, TestStatus},
    runner::{RunHandle, RunnerEvent, TestRunner},
};

pub mod actions;
pub mod events;
pub mod notifier;

pub use actions::{Action, handle_action, trigger_action};
pub use events::handle_runner_event;
pub use notifier::NotificationKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Panel {
    TestList,
    FailedList,
    Detail,
}

pub struct App {
    pub runner: TestRunner,
    pub config: Config,
    pub active_panel: Panel,
    pub selected_test_index: usize,
    pub selected_failed_index: usize,
    pub list_scroll_offset: usize,
    pub failed_scroll_offset: usize,
    pub list_viewport_height: usize,
    pub failed_viewport_height: usize,
    pub detail_scroll_offset: u16,
    /// Tests queued by the active staggered run. Display-only; results never carry it.
    pub scheduled: HashSet<TestId>,
    pub run_handle: Option<RunHandle>,
    pub event_tx: mpsc::UnboundedSender<RunnerEvent>,
    pub should_quit: bool,
    pub filter_active: bool,
    pub filter: tui_input::Input,
    pub spinner_tick: usize,
    pub notifier: Notifier,
}

impl App {
    pub fn new(runner: TestRunner, config: Config) -> (Self, mpsc::UnboundedReceiver<RunnerEvent>) {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let app = Self {
            runner,
            config,
            active_panel: Panel::TestList,
            selected_test_index: 0,
            selected_failed_index: 0,
            list_scroll_offset: 0,
            failed_scroll_offset: 0,
            list_viewport_height: 0,
            failed_viewport_height: 0,
            detail_scroll_offset: 0,
            scheduled: HashSet::new(),
            run_handle: None,
            event_tx,
            should_quit: false,
            filter_active: false,
            filter: tui_input::Input::default(),
            spinner_tick: 0,
            notifier: Notifier::new(),
        };
        (app, event_rx)
    }

    pub fn running(&self) -> bool {
        !self.scheduled.is_empty()
    }

    /// Indices of definitions whose name matches the filter (case-insensitive).
    pub fn visible_tests(&self) -> Vec<usize> {
        let query = self.filter.value().to_lowercase();
        self.runner
            .definitions()
            .iter()
            .enumerate()
            .filter(|(_, d)| query.is_empty() || d.name.to_lowercase().contains(&query))
            .map(|(i, _)| i)
            .collect()
    }

    /// Indices of definitions whose latest result failed.
    pub fn failed_tests(&self) -> Vec<usize> {
        self.runner
            .definitions()
            .iter()
            .enumerate()
            .filter(|(_, d)| self.runner.status(&d.id) == TestStatus::Failed)
            .map(|(i, _)| i)
            .collect()
    }

    /// Definition index of the test under the cursor of the active list.
    pub fn selected_test(&self) -> Option<usize> {
        match self.active_panel {
            Panel::FailedList => self.failed_tests().get(self.selected_failed_index).copied(),
            _ => self.visible_tests().get(self.selected_test_index).copied(),
        }
    }

    pub fn selected_definition(&self) -> Option<&TestDefinition> {
        self.selected_test()
            .and_then(|i| self.runner.definitions().get(i))
    }

    pub fn progress_percent(&self) -> f64 {
        let total = self.runner.len();
        if total == 0 {
            0.0
        } else {
            (total - self.runner.summary().pending) as f64 / total as f64
        }
    }

    /// Stop any in-flight staggered run. Its remaining events are then stale or never sent.
    pub fn cancel_run(&mut self) {
        if let Some(handle) = self.run_handle.take() {
            handle.cancel();
        }
        self.scheduled.clear();
    }

    fn adjust_list_scroll(&mut self) {
        if self.list_viewport_height == 0 {
            return;
        }
        if self.selected_test_index < self.list_scroll_offset {
            self.list_scroll_offset = self.selected_test_index;
        } else if self.selected_test_index >= self.list_scroll_offset + self.list_viewport_height {
            self.list_scroll_offset = self.selected_test_index - self.list_viewport_height + 1;
        }
    }

    fn adjust_failed_scroll(&mut self) {
        if self.failed_viewport_height == 0 {
            return;
        }
        if self.selected_failed_index < self.failed_scroll_offset {
            self.failed_scroll_offset = self.selected_failed_index;
        } else if self.selected_failed_index
            >= self.failed_scroll_offset + self.failed_viewport_height
        {
            self.failed_scroll_offset =
                self.selected_failed_index - self.failed_viewport_height + 1;
        }
    }
}
