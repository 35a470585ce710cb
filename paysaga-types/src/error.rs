//! Error types for the payment saga service.

use std::time::Duration;

/// Malformed caller input, rejected before any saga is built.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("Amount is required")]
    MissingAmount,

    #[error("Amount must be greater than 0")]
    NonPositiveAmount,

    #[error("Amount must be a finite number")]
    InvalidAmount,

    #[error("Currency is required")]
    MissingCurrency,

    #[error("Currency must be one of: USD, EUR, GBP (got {0})")]
    UnsupportedCurrency(String),

    #[error("Payment intent ID is required")]
    MissingPaymentId,

    #[error("Invalid payment intent ID: {0}")]
    InvalidPaymentId(String),
}

/// The payment provider rejected a call or could not be reached.
#[derive(Debug, Clone, thiserror::Error)]
pub enum GatewayError {
    /// Provider answered with an error body; displays the provider's message.
    #[error("{message}")]
    Api {
        status: u16,
        code: Option<String>,
        message: String,
    },

    #[error("Gateway transport error: {0}")]
    Transport(String),

    #[error("Gateway response could not be decoded: {0}")]
    Decode(String),
}

impl GatewayError {
    /// A provider-side rejection with a human-readable message.
    pub fn rejected(message: impl Into<String>) -> Self {
        GatewayError::Api {
            status: 402,
            code: None,
            message: message.into(),
        }
    }

    /// True when the provider reports the resource does not exist.
    pub fn is_not_found(&self) -> bool {
        match self {
            GatewayError::Api { status, code, .. } => {
                *status == 404 || code.as_deref() == Some("resource_missing")
            }
            _ => false,
        }
    }
}

/// State store failures.
#[derive(Debug, Clone, thiserror::Error)]
pub enum StoreError {
    #[error("Store connection failed: {0}")]
    Connection(String),

    #[error("Store error: {0}")]
    Backend(String),
}

/// Why a saga step's forward or compensating action failed.
#[derive(Debug, thiserror::Error)]
pub enum StepError {
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Step timed out after {0:?}")]
    Timeout(Duration),
}

/// A compensating action that itself failed.
///
/// Never raised on its own: collected into the [`TransactionError`] so
/// callers can alert on degraded compensation.
#[derive(Debug, thiserror::Error)]
#[error("Compensation of step {step_index} ({step}) failed: {source}")]
pub struct CompensationError {
    pub step_index: usize,
    pub step: &'static str,
    pub source: StepError,
}

/// The single error a saga execution surfaces to its caller.
///
/// Keeps the original forward failure as a structured cause, plus every
/// compensation failure observed while unwinding.
#[derive(Debug, thiserror::Error)]
#[error("Transaction failed: {cause}")]
pub struct TransactionError {
    failed_step: usize,
    step_name: &'static str,
    #[source]
    cause: StepError,
    compensation_failures: Vec<CompensationError>,
}

impl TransactionError {
    pub fn new(
        failed_step: usize,
        step_name: &'static str,
        cause: StepError,
        compensation_failures: Vec<CompensationError>,
    ) -> Self {
        Self {
            failed_step,
            step_name,
            cause,
            compensation_failures,
        }
    }

    /// Index of the step whose forward action failed.
    pub fn failed_step(&self) -> usize {
        self.failed_step
    }

    pub fn step_name(&self) -> &'static str {
        self.step_name
    }

    /// The original forward failure.
    pub fn cause(&self) -> &StepError {
        &self.cause
    }

    pub fn compensation_failures(&self) -> &[CompensationError] {
        &self.compensation_failures
    }

    /// True when every compensating action in the sweep succeeded.
    pub fn is_fully_compensated(&self) -> bool {
        self.compensation_failures.is_empty()
    }
}

/// Application-level errors (for HTTP responses).
///
/// Maps cleanly to HTTP status codes.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("{0}")]
    PaymentFailed(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        AppError::BadRequest(err.to_string())
    }
}

impl From<TransactionError> for AppError {
    fn from(err: TransactionError) -> Self {
        AppError::PaymentFailed(err.to_string())
    }
}

impl From<GatewayError> for AppError {
    fn from(err: GatewayError) -> Self {
        if err.is_not_found() {
            return AppError::NotFound(err.to_string());
        }
        match err {
            GatewayError::Api { message, .. } => AppError::BadRequest(message),
            other => AppError::Internal(other.to_string()),
        }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        AppError::Internal(err.to_string())
    }
}
