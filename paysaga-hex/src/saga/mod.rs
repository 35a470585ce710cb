//! Compensating-transaction orchestrator.
//!
//! A [`Saga`] runs its steps strictly in order. When a forward action fails,
//! every step from the failing one down to the first is compensated in
//! reverse order, and a single [`TransactionError`] is returned.

mod operations;
mod payment;
mod step;


use std::future::Future;
use std::time::Duration;

use tracing::{debug, error, info, warn};

use paysaga_types::{CompensationError, StepError, TransactionError};

pub use operations::{INTENT_KEY_TTL_SECS, PaymentOperations};
pub use payment::PaymentTransaction;
pub use step::SagaStep;

/// Execution limits applied to every step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SagaConfig {
    /// Deadline for each forward and compensating action; unbounded when `None`.
    pub step_timeout: Option<Duration>,
}

impl SagaConfig {
    pub fn with_step_timeout(timeout: Duration) -> Self {
        Self {
            step_timeout: Some(timeout),
        }
    }
}

/// An ordered, append-only sequence of steps executed as one unit of work.
///
/// `execute` takes `&mut self`, so one instance can never run twice at once.
/// The saga is cleared after every execution, successful or not.
pub struct Saga<T> {
    steps: Vec<Box<dyn SagaStep<T>>>,
    completed: usize,
    failed_index: Option<usize>,
    config: SagaConfig,
}

impl<T: Send + 'static> Default for Saga<T> {
    fn default() -> Self {
        Self::new(SagaConfig::default())
    }
}

impl<T: Send + 'static> Saga<T> {
    pub fn new(config: SagaConfig) -> Self {
        Self {
            steps: Vec::new(),
            completed: 0,
            failed_index: None,
            config,
        }
    }

    /// Appends a step; it runs after every step already added.
    pub fn add_step(&mut self, step: impl SagaStep<T> + 'static) -> &mut Self {
        self.steps.push(Box::new(step));
        self
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Forward actions that have succeeded in the current execution.
    pub fn completed(&self) -> usize {
        self.completed
    }

    pub fn failed_index(&self) -> Option<usize> {
        self.failed_index
    }

    pub fn config(&self) -> SagaConfig {
        self.config
    }

    /// Runs every step in order.
    ///
    /// Returns the last step's result, or `None` for an empty saga. On
    /// failure, compensates the failed step and every step before it, then
    /// returns the original failure together with any compensation failures.
    pub async fn execute(&mut self) -> Result<Option<T>, TransactionError> {
        if self.steps.is_empty() {
            return Ok(None);
        }

        info!(steps = self.steps.len(), "Executing saga");

        let mut last = None;
        let mut failure = None;
        for (index, step) in self.steps.iter().enumerate() {
            debug!(step = step.name(), index, "Running step");
            match bounded(self.config.step_timeout, step.execute()).await {
                Ok(value) => {
                    self.completed += 1;
                    last = Some(value);
                }
                Err(cause) => {
                    error!(step = step.name(), index, error = %cause, "Step failed");
                    self.failed_index = Some(index);
                    failure = Some((index, step.name(), cause));
                    break;
                }
            }
        }

        let Some((failed_step, step_name, cause)) = failure else {
            info!(completed = self.completed, "Saga completed");
            self.reset();
            return Ok(last);
        };

        let compensation_failures = self.compensate(failed_step).await;
        self.reset();

        let err = TransactionError::new(failed_step, step_name, cause, compensation_failures);
        if err.is_fully_compensated() {
            warn!(step = step_name, "Saga rolled back");
        } else {
            error!(
                step = step_name,
                failures = err.compensation_failures().len(),
                "Saga rollback incomplete"
            );
        }
        Err(err)
    }

    /// Compensates steps `from..=0` in reverse order. Every compensation runs
    /// even when a later one has failed.
    async fn compensate(&self, from: usize) -> Vec<CompensationError> {
        let mut failures = Vec::new();

        for index in (0..=from).rev() {
            let step = &self.steps[index];
            debug!(step = step.name(), index, "Compensating step");

            if let Err(source) = bounded(self.config.step_timeout, step.compensate()).await {
                error!(step = step.name(), index, error = %source, "Compensation failed");
                failures.push(CompensationError {
                    step_index: index,
                    step: step.name(),
                    source,
                });
            }
        }

        failures
    }

    /// Clears steps and counters; the saga can be rebuilt afterwards.
    pub fn reset(&mut self) {
        self.steps.clear();
        self.completed = 0;
        self.failed_index = None;
    }
}

async fn bounded<R>(
    limit: Option<Duration>,
    action: impl Future<Output = Result<R, StepError>>,
) -> Result<R, StepError> {
    match limit {
        Some(limit) => tokio::time::timeout(limit, action)
            .await
            .map_err(|_| StepError::Timeout(limit))?,
        None => action.await,
    }
}
