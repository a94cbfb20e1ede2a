pub mod schedule;

use std::collections::{HashMap, HashSet};
use std::time::{Duration, Instant};

use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::models::{RunSummary, TestDefinition, TestId, TestResult, TestStatus};
use crate::thrown;
use crate::value::{Value, deep_equal};

pub use schedule::{RunHandle, RunnerEvent};

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("duplicate test '{0}'")]
    DuplicateTest(TestId),
    #[error("unknown test '{0}'")]
    UnknownTest(TestId),
    #[error("no test at index {0}")]
    IndexOutOfRange(usize),
}

/// Owns a titled, ordered list of test definitions and their latest results.
///
/// Results are keyed by [`TestId`], so reordering definitions never attaches a
/// result to the wrong test. Every mutation that discards results bumps the run
/// generation; events from an older generation are rejected by [`TestRunner::apply`].
pub struct TestRunner {
    title: String,
    definitions: Vec<TestDefinition>,
    results: HashMap<TestId, TestResult>,
    generation: u64,
}

impl TestRunner {
    pub fn new(
        title: impl Into<String>,
        definitions: Vec<TestDefinition>,
    ) -> Result<Self, RunnerError> {
        let mut seen = HashSet::new();
        for definition in &definitions {
            if !seen.insert(&definition.id) {
                return Err(RunnerError::DuplicateTest(definition.id.clone()));
            }
        }

        Ok(Self {
            title: title.into(),
            definitions,
            results: HashMap::new(),
            generation: 0,
        })
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn definitions(&self) -> &[TestDefinition] {
        &self.definitions
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn result(&self, id: &TestId) -> Option<&TestResult> {
        self.results.get(id)
    }

    /// One slot per definition, in definition order. `None` means no result yet.
    pub fn results(&self) -> Vec<Option<&TestResult>> {
        self.definitions
            .iter()
            .map(|d| self.results.get(&d.id))
            .collect()
    }

    pub fn status(&self, id: &TestId) -> TestStatus {
        self.results
            .get(id)
            .map_or(TestStatus::Pending, TestResult::status)
    }

    pub fn run_single_test(&mut self, id: &TestId) -> Result<&TestResult, RunnerError> {
        let definition = self
            .definitions
            .iter()
            .find(|d| &d.id == id)
            .ok_or_else(|| RunnerError::UnknownTest(id.clone()))?;
        let result = execute(definition);
        self.results.insert(id.clone(), result);
        Ok(&self.results[id])
    }

    pub fn run_single_test_at(&mut self, index: usize) -> Result<&TestResult, RunnerError> {
        let id = self
            .definitions
            .get(index)
            .map(|d| d.id.clone())
            .ok_or(RunnerError::IndexOutOfRange(index))?;
        self.run_single_test(&id)
    }

    /// Clear all results, then run every test in order on the calling thread.
    pub fn run_all_tests(&mut self) {
        self.reset_results();
        info!(title = %self.title, tests = self.definitions.len(), "running all tests");
        for definition in &self.definitions {
            let result = execute(definition);
            self.results.insert(definition.id.clone(), result);
        }
    }

    /// Clear all results, then schedule test `i` to run after `i * stagger`.
    ///
    /// Results arrive as [`RunnerEvent`]s on `tx` and must be fed back through
    /// [`TestRunner::apply`]. Dropping the returned handle stops the run. Must be
    /// called from within a tokio runtime.
    pub fn run_all_staggered(
        &mut self,
        tx: mpsc::UnboundedSender<RunnerEvent>,
        stagger: Duration,
    ) -> RunHandle {
        self.reset_results();
        info!(
            title = %self.title,
            tests = self.definitions.len(),
            stagger_ms = stagger.as_millis() as u64,
            "scheduling staggered run"
        );
        schedule::spawn(self.generation, self.definitions.clone(), stagger, tx)
    }

    /// Record an event from a staggered run. Returns `false` for events that
    /// belong to a run superseded by a reset or a newer run.
    pub fn apply(&mut self, event: RunnerEvent) -> bool {
        if event.generation() != self.generation {
            debug!(
                event_generation = event.generation(),
                current = self.generation,
                "dropping stale runner event"
            );
            return false;
        }

        match event {
            RunnerEvent::TestFinished { id, result, .. } => {
                if !self.definitions.iter().any(|d| d.id == id) {
                    return false;
                }
                self.results.insert(id, result);
            }
            RunnerEvent::RunFinished { .. } => {
                info!(passed = self.passed_count(), failed = self.failed_count(), "run finished");
            }
        }
        true
    }

    pub fn reset_results(&mut self) {
        self.results.clear();
        self.generation += 1;
        debug!(generation = self.generation, "results reset");
    }

    pub fn passed_count(&self) -> usize {
        self.results.values().filter(|r| r.passed).count()
    }

    pub fn failed_count(&self) -> usize {
        self.results.values().filter(|r| !r.passed).count()
    }

    pub fn total_time(&self) -> Duration {
        self.results.values().map(|r| r.execution_time).sum()
    }

    pub fn summary(&self) -> RunSummary {
        let passed = self.passed_count();
        let failed = self.failed_count();
        RunSummary {
            total: self.definitions.len(),
            passed,
            failed,
            pending: self.definitions.len() - self.results.len(),
            duration: self.total_time(),
        }
    }
}

/// Run one definition, timing it. Errors and panics become failed results.
pub fn execute(definition: &TestDefinition) -> TestResult {
    let start = Instant::now();
    let outcome = thrown::catch(|| (definition.test_fn)());
    let execution_time = start.elapsed();

    let result = match outcome {
        Ok(outcome) => TestResult {
            name: definition.name.clone(),
            passed: outcome
                .passed
                .unwrap_or_else(|| deep_equal(&outcome.expected, &outcome.actual)),
            expected: outcome.expected,
            actual: outcome.actual,
            error: None,
            execution_time,
        },
        Err(message) => TestResult {
            name: definition.name.clone(),
            passed: false,
            expected: Value::from("No error"),
            actual: Value::from("Error thrown"),
            error: Some(message),
            execution_time,
        },
    };

    debug!(
        test = %definition.id,
        passed = result.passed,
        elapsed_us = execution_time.as_micros() as u64,
        "test executed"
    );
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matcher::expect;
    use crate::models::TestOutcome;
    use pretty_assertions::assert_eq;

    fn sample_tests() -> Vec<TestDefinition> {
        vec![
            TestDefinition::assertion("adds", "2 + 3 is 5", || expect(2 + 3).to_be(5)),
            TestDefinition::new("float", "0.1 + 0.2 equals 0.3", || {
                Ok(TestOutcome::new(0.3, 0.1 + 0.2))
            }),
            TestDefinition::new("explodes", "returns an error", || anyhow::bail!("boom")),
        ]
    }

    fn runner() -> TestRunner {
        TestRunner::new("Sample", sample_tests()).unwrap()
    }

    #[test]
    fn rejects_duplicate_names() {
        let tests = vec![
            TestDefinition::new("same", "", || Ok(TestOutcome::default())),
            TestDefinition::new("same", "", || Ok(TestOutcome::default())),
        ];
        assert!(matches!(
            TestRunner::new("dup", tests),
            Err(RunnerError::DuplicateTest(id)) if id.as_str() == "same"
        ));
    }

    #[test]
    fn slots_start_pending() {
        let runner = runner();
        assert_eq!(runner.results().len(), 3);
        assert!(runner.results().iter().all(Option::is_none));
        assert_eq!(runner.status(&TestId::from("adds")), TestStatus::Pending);
    }

    #[test]
    fn run_single_uses_the_returned_verdict_or_deep_equality() {
        let mut runner = runner();
        assert!(runner.run_single_test(&TestId::from("adds")).unwrap().passed);

        let float = runner.run_single_test(&TestId::from("float")).unwrap();
        assert!(!float.passed);
        assert_eq!(float.error, None);

        assert_eq!(runner.results().iter().filter(|r| r.is_some()).count(), 2);
        assert_eq!(runner.status(&TestId::from("explodes")), TestStatus::Pending);
    }

    #[test]
    fn errors_become_failed_results() {
        let mut runner = runner();
        let result = runner.run_single_test_at(2).unwrap();
        assert!(!result.passed);
        assert_eq!(result.expected.to_string(), "\"No error\"");
        assert_eq!(result.actual.to_string(), "\"Error thrown\"");
        assert!(result.error.as_deref().unwrap().contains("boom"));
    }

    #[test]
    fn error_wins_over_any_verdict() {
        let tests = vec![TestDefinition::new("panics", "", || {
            let _ = TestOutcome::new(1, 1).with_verdict(true);
            panic!("boom")
        })];
        let mut runner = TestRunner::new("panic", tests).unwrap();
        let result = runner.run_single_test_at(0).unwrap();
        assert!(!result.passed);
        assert_eq!(result.error.as_deref(), Some("boom"));
    }

    #[test]
    fn unknown_tests_are_reported() {
        let mut runner = runner();
        assert!(matches!(
            runner.run_single_test(&TestId::from("missing")),
            Err(RunnerError::UnknownTest(_))
        ));
        assert!(matches!(
            runner.run_single_test_at(9),
            Err(RunnerError::IndexOutOfRange(9))
        ));
    }

    #[test]
    fn rerun_overwrites_the_slot() {
        let mut runner = runner();
        runner.run_single_test_at(0).unwrap();
        runner.run_single_test_at(0).unwrap();
        assert_eq!(runner.passed_count(), 1);
    }

    #[test]
    fn run_all_then_reset() {
        let mut runner = runner();
        runner.run_all_tests();

        let summary = runner.summary();
        assert_eq!(summary.passed, 1);
        assert_eq!(summary.failed, 2);
        assert_eq!(summary.pending, 0);
        assert_eq!(summary.passed + summary.failed, runner.len());
        assert_eq!(summary.duration, runner.total_time());

        runner.reset_results();
        assert!(runner.results().iter().all(Option::is_none));
        assert_eq!(runner.passed_count(), 0);
        assert_eq!(runner.failed_count(), 0);
        assert_eq!(runner.total_time(), Duration::ZERO);
    }

    #[test]
    fn stale_events_are_rejected() {
        let mut runner = runner();
        let old = runner.generation();
        runner.reset_results();
        let result = execute(&runner.definitions()[0]);
        let accepted = runner.apply(RunnerEvent::TestFinished {
            generation: old,
            id: TestId::from("adds"),
            result,
        });
        assert!(!accepted);
        assert!(runner.result(&TestId::from("adds")).is_none());
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        #[derive(Debug, Clone, Copy)]
        enum Kind {
            Pass,
            Fail,
            Error,
        }

        fn suite(kinds: &[Kind]) -> TestRunner {
            let tests = kinds
                .iter()
                .enumerate()
                .map(|(i, kind)| {
                    let name = format!("t{}", i);
                    match kind {
                        Kind::Pass => TestDefinition::assertion(name, "", || expect(1).to_be(1)),
                        Kind::Fail => TestDefinition::assertion(name, "", || expect(1).to_be(2)),
                        Kind::Error => TestDefinition::new(name, "", || anyhow::bail!("boom")),
                    }
                })
                .collect();
            TestRunner::new("Generated", tests).unwrap()
        }

        fn kinds() -> impl Strategy<Value = Vec<Kind>> {
            proptest::collection::vec(
                prop_oneof![Just(Kind::Pass), Just(Kind::Fail), Just(Kind::Error)],
                0..12,
            )
        }

        proptest! {
            #[test]
            fn run_all_fills_every_slot_and_reset_clears_them(kinds in kinds()) {
                let mut runner = suite(&kinds);
                runner.run_all_tests();

                let expected_passed = kinds.iter().filter(|k| matches!(k, Kind::Pass)).count();
                prop_assert_eq!(runner.passed_count(), expected_passed);
                prop_assert_eq!(runner.passed_count() + runner.failed_count(), runner.len());
                prop_assert!(runner.results().iter().all(Option::is_some));

                runner.reset_results();
                prop_assert!(runner.results().iter().all(Option::is_none));
                prop_assert_eq!(runner.summary().pending, kinds.len());
            }
        }
    }
}
