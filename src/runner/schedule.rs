use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, sleep_until};
use tracing::debug;

use super::execute;
use crate::models::{TestDefinition, TestId, TestResult};

/// Events streamed from a staggered run back to the owning [`super::TestRunner`].
#[derive(Debug)]
pub enum RunnerEvent {
    TestFinished {
        generation: u64,
        id: TestId,
        result: TestResult,
    },
    RunFinished {
        generation: u64,
    },
}

impl RunnerEvent {
    pub fn generation(&self) -> u64 {
        match self {
            RunnerEvent::TestFinished { generation, .. } | RunnerEvent::RunFinished { generation } => {
                *generation
            }
        }
    }
}

/// Handle to a scheduled run. The run is aborted when the handle is cancelled or dropped.
#[derive(Debug)]
pub struct RunHandle {
    generation: u64,
    task: JoinHandle<()>,
}

impl RunHandle {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn cancel(&self) {
        self.task.abort();
    }
}

impl Drop for RunHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

pub(super) fn spawn(
    generation: u64,
    definitions: Vec<TestDefinition>,
    stagger: Duration,
    tx: mpsc::UnboundedSender<RunnerEvent>,
) -> RunHandle {
    let task = tokio::spawn(async move {
        let start = Instant::now();
        for (index, definition) in definitions.into_iter().enumerate() {
            let step = u32::try_from(index).unwrap_or(u32::MAX);
            sleep_until(start + stagger.saturating_mul(step)).await;

            let result = execute(&definition);
            let event = RunnerEvent::TestFinished {
                generation,
                id: definition.id,
                result,
            };
            if tx.send(event).is_err() {
                debug!(generation, "event receiver dropped, abandoning run");
                return;
            }
        }
        let _ = tx.send(RunnerEvent::RunFinished { generation });
    });

    RunHandle { generation, task }
}
