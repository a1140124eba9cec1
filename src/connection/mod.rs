//! Connection testing
//!
//! Runs an ordered list of named [`TestStep`]s against a backend client and
//! reports a [`ConnectionTestSummary`]. A failed mandatory step marks the
//! connection failed and skips every later step.

pub mod runner;
pub mod step;
pub mod summary;

pub use runner::{ConnectionTestRunner, TestConnectionDefinition, TestStepDefinition};
pub use step::{StepError, StepFn, StepFuture, TestStep, blocking_step_fn, step_fn};
pub use summary::{ConnectionStatus, ConnectionTestSummary, TestResult, TestStatus};
