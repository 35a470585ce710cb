//! The unit of work a saga sequences.

use async_trait::async_trait;

use paysaga_types::StepError;

/// A forward action paired with the action that undoes it.
///
/// `compensate` may be invoked on a step whose `execute` failed, so it must
/// tolerate finding nothing to undo.
#[async_trait]
pub trait SagaStep<T>: Send + Sync {
    /// Stable name used in logs and errors.
    fn name(&self) -> &'static str;

    async fn execute(&self) -> Result<T, StepError>;

    async fn compensate(&self) -> Result<(), StepError>;
}
