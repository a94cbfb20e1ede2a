pub mod definition;
pub mod result;
pub mod status;

pub use definition::{TestDefinition, TestFn, TestId, TestOutcome};
pub use result::{RunSummary, TestResult};
pub use status::TestStatus;
