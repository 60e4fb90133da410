use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum YieldrError {
    #[error("Invalid input: {field} — {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Domain error: {field} — {reason}")]
    DomainError { field: String, reason: String },

    #[error("Numerical instability in {context}")]
    NumericalInstability { context: String },

    #[error("Non-convergence: {function} did not converge after {iterations} iterations (last step: {last_delta})")]
    NonConvergence {
        function: String,
        iterations: u32,
        last_delta: Decimal,
    },

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl YieldrError {
    pub(crate) fn invalid(field: &str, reason: impl Into<String>) -> Self {
        YieldrError::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn overflow(context: impl Into<String>) -> Self {
        YieldrError::NumericalInstability {
            context: context.into(),
        }
    }
}

impl From<serde_json::Error> for YieldrError {
    fn from(e: serde_json::Error) -> Self {
        YieldrError::SerializationError(e.to_string())
    }
}
