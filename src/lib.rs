//! Expectation matchers and an interactive test runner, with a terminal front end.

pub mod app;
pub mod config;
pub mod logging;
pub mod matcher;
pub mod models;
pub mod runner;
pub mod suites;
pub mod ui;
pub mod value;

mod thrown;

pub use matcher::{AssertionResult, Expectation, expect};
pub use models::{TestDefinition, TestOutcome, TestResult};
pub use runner::TestRunner;
pub use thrown::install_panic_hook;
pub use value::Value;
