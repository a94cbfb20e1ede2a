use ratatui::style::Color;
use serde::Serialize;

use crate::ui::theme;

/// State of one test slot. A slot with no result yet is `Pending`, which is
/// distinct from a failing result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum TestStatus {
    #[default]
    Pending,
    Passed,
    Failed,
}

impl TestStatus {
    pub fn icon(&self) -> &'static str {
        match self {
            TestStatus::Pending => "◌",
            TestStatus::Passed => "✔",
            TestStatus::Failed => "✘",
        }
    }

    pub fn color(&self) -> Color {
        match self {
            TestStatus::Passed => theme::GREEN,
            TestStatus::Failed => theme::RED,
            TestStatus::Pending => theme::SUBTEXT0,
        }
    }
}
