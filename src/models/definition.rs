use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use crate::matcher::AssertionResult;
use crate::value::Value;

pub type TestFn = Arc<dyn Fn() -> anyhow::Result<TestOutcome> + Send + Sync>;

/// Stable identifier of a test within a runner, derived from its name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct TestId(String);

impl TestId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for TestId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for TestId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl fmt::Display for TestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// What a test function reports back. Without an explicit verdict the runner
/// compares `expected` and `actual` by deep equality.
#[derive(Debug, Clone, Default)]
pub struct TestOutcome {
    pub expected: Value,
    pub actual: Value,
    pub passed: Option<bool>,
}

impl TestOutcome {
    pub fn new(expected: impl Into<Value>, actual: impl Into<Value>) -> Self {
        Self {
            expected: expected.into(),
            actual: actual.into(),
            passed: None,
        }
    }

    pub fn with_verdict(mut self, passed: bool) -> Self {
        self.passed = Some(passed);
        self
    }
}

impl From<AssertionResult> for TestOutcome {
    fn from(result: AssertionResult) -> Self {
        Self {
            expected: result.expected,
            actual: result.actual,
            passed: Some(result.passed),
        }
    }
}

#[derive(Clone)]
pub struct TestDefinition {
    pub id: TestId,
    pub name: String,
    pub description: String,
    pub test_fn: TestFn,
}

impl TestDefinition {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        test_fn: impl Fn() -> anyhow::Result<TestOutcome> + Send + Sync + 'static,
    ) -> Self {
        let name = name.into();
        Self {
            id: TestId::from(name.as_str()),
            name,
            description: description.into(),
            test_fn: Arc::new(test_fn),
        }
    }

    /// Test whose verdict comes from a single assertion.
    pub fn assertion(
        name: impl Into<String>,
        description: impl Into<String>,
        assertion: impl Fn() -> AssertionResult + Send + Sync + 'static,
    ) -> Self {
        Self::new(name, description, move || Ok(assertion().into()))
    }
}

impl fmt::Debug for TestDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestDefinition")
            .field("id", &self.id)
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}
