//! Test steps.

use std::fmt;
use std::future::Future;

use futures::future::BoxFuture;

/// Failure raised by a test step.
pub type StepError = Box<dyn std::error::Error + Send + Sync>;

/// Future returned by a step invocation.
pub type StepFuture = BoxFuture<'static, Result<(), StepError>>;

/// One-shot step invocation.
pub type StepFn = Box<dyn FnOnce() -> StepFuture + Send>;

/// Box an async closure into a [`StepFn`].
pub fn step_fn<F, Fut, E>(f: F) -> StepFn
where
    F: FnOnce() -> Fut + Send + 'static,
    Fut: Future<Output = Result<(), E>> + Send + 'static,
    E: Into<StepError>,
{
    Box::new(move || {
        Box::pin(async move { f().await.map_err(Into::into) }) as StepFuture
    })
}

/// Box a blocking closure into a [`StepFn`]. It runs on tokio's blocking pool.
pub fn blocking_step_fn<F, E>(f: F) -> StepFn
where
    F: FnOnce() -> Result<(), E> + Send + 'static,
    E: Into<StepError> + Send + 'static,
{
    Box::new(move || {
        Box::pin(async move {
            match tokio::task::spawn_blocking(f).await {
                Ok(result) => result.map_err(Into::into),
                Err(e) => Err(format!("blocking step did not complete: {e}").into()),
            }
        }) as StepFuture
    })
}

/// A named check run against a backend client.
pub struct TestStep {
    name: String,
    mandatory: bool,
    description: Option<String>,
    invoke: StepFn,
}

impl TestStep {
    /// A non-mandatory async step.
    pub fn new<F, Fut, E>(name: impl Into<String>, f: F) -> Self
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<(), E>> + Send + 'static,
        E: Into<StepError>,
    {
        Self::from_fn(name, step_fn(f))
    }

    /// A non-mandatory step wrapping a synchronous SDK call.
    pub fn blocking<F, E>(name: impl Into<String>, f: F) -> Self
    where
        F: FnOnce() -> Result<(), E> + Send + 'static,
        E: Into<StepError> + Send + 'static,
    {
        Self::from_fn(name, blocking_step_fn(f))
    }

    pub fn from_fn(name: impl Into<String>, invoke: StepFn) -> Self {
        Self {
            name: name.into(),
            mandatory: false,
            description: None,
            invoke,
        }
    }

    /// Mark the step mandatory: its failure stops the run.
    pub fn mandatory(self) -> Self {
        self.with_mandatory(true)
    }

    pub fn with_mandatory(mut self, mandatory: bool) -> Self {
        self.mandatory = mandatory;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_mandatory(&self) -> bool {
        self.mandatory
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub(crate) fn into_parts(self) -> (StepInfo, StepFn) {
        (
            StepInfo {
                name: self.name,
                mandatory: self.mandatory,
                description: self.description,
            },
            self.invoke,
        )
    }
}

impl fmt::Debug for TestStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestStep")
            .field("name", &self.name)
            .field("mandatory", &self.mandatory)
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

/// Step metadata without the invocation.
#[derive(Debug, Clone)]
pub(crate) struct StepInfo {
    pub name: String,
    pub mandatory: bool,
    pub description: Option<String>,
}
