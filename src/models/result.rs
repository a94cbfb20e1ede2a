use std::time::Duration;

use serde::{Serialize, Serializer};

use super::status::TestStatus;
use crate::value::Value;

/// Outcome of executing one test definition once.
#[derive(Debug, Clone, Serialize)]
pub struct TestResult {
    pub name: String,
    pub passed: bool,
    pub expected: Value,
    pub actual: Value,
    pub error: Option<String>,
    #[serde(rename = "execution_time_ms", serialize_with = "as_millis")]
    pub execution_time: Duration,
}

impl TestResult {
    pub fn execution_time_ms(&self) -> f64 {
        self.execution_time.as_secs_f64() * 1000.0
    }

    pub fn status(&self) -> TestStatus {
        if self.passed {
            TestStatus::Passed
        } else {
            TestStatus::Failed
        }
    }
}

/// Aggregate counters over the current results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub pending: usize,
    #[serde(rename = "duration_ms", serialize_with = "as_millis")]
    pub duration: Duration,
}

fn as_millis<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(duration.as_secs_f64() * 1000.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn durations_serialize_as_milliseconds() {
        let result = TestResult {
            name: "timed".into(),
            passed: true,
            expected: Value::from(1),
            actual: Value::from(1),
            error: None,
            execution_time: Duration::from_millis(1500),
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["execution_time_ms"], serde_json::json!(1500.0));
        assert!(json.get("execution_time").is_none());

        let summary = RunSummary {
            total: 1,
            passed: 1,
            duration: Duration::from_secs(3),
            ..RunSummary::default()
        };
        let json = serde_json::to_value(summary).unwrap();
        assert_eq!(json["duration_ms"], serde_json::json!(3000.0));
    }
}
