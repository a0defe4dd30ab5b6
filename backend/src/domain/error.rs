//! Domain-level error types.
//!
//! These errors are transport agnostic. Inbound adapters map them to HTTP
//! responses or any other protocol-specific envelope; the ledger core only
//! guarantees the stable code taxonomy and that no failure leaves partially
//! applied state behind.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Stable machine-readable error code describing the failure category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// The request is malformed or fails validation.
    InvalidArgument,
    /// The referenced user or grocer does not exist.
    NotFound,
    /// A requested increase exceeds the user's available balance.
    InsufficientBalance,
    /// Concurrent modification persisted through the retry budget; the whole
    /// operation may safely be retried.
    Conflict,
    /// The persistence collaborator could not be reached.
    ServiceUnavailable,
    /// An unexpected error occurred inside the domain.
    InternalError,
}

/// Domain error payload.
///
/// ## Invariants
/// - `message` is non-empty once trimmed of whitespace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Error {
    code: ErrorCode,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<Value>,
}

/// Validation errors emitted by the constructors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorValidationError {
    EmptyMessage,
}

impl std::fmt::Display for ErrorValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyMessage => write!(f, "error message must not be empty"),
        }
    }
}

impl std::error::Error for ErrorValidationError {}

impl Error {
    /// Create a new error, panicking if validation fails.
    ///
    /// All call sites in this crate pass literal or formatted non-empty
    /// messages; use [`Error::try_new`] for untrusted input.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        match Self::try_new(code, message) {
            Ok(value) => value,
            Err(err) => panic!("error messages must satisfy validation: {err}"),
        }
    }

    /// Fallible constructor that validates the message content.
    pub fn try_new(
        code: ErrorCode,
        message: impl Into<String>,
    ) -> Result<Self, ErrorValidationError> {
        let message = message.into();
        if message.trim().is_empty() {
            return Err(ErrorValidationError::EmptyMessage);
        }
        Ok(Self {
            code,
            message,
            details: None,
        })
    }

    /// Stable machine-readable error code.
    pub fn code(&self) -> ErrorCode {
        self.code
    }

    /// Human-readable message returned to adapters.
    pub fn message(&self) -> &str {
        self.message.as_str()
    }

    /// Supplementary structured details for adapters.
    pub fn details(&self) -> Option<&Value> {
        self.details.as_ref()
    }

    /// Attach structured details to the error.
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Convenience constructor for [`ErrorCode::InvalidArgument`].
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidArgument, message)
    }

    /// Convenience constructor for [`ErrorCode::NotFound`].
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotFound, message)
    }

    /// Convenience constructor for [`ErrorCode::InsufficientBalance`].
    ///
    /// The message reports both the available amount and the amount the
    /// requested increase would require; `details` carries the same numbers
    /// for machine consumption.
    pub fn insufficient_balance(available: i64, required: i64) -> Self {
        Self::new(
            ErrorCode::InsufficientBalance,
            format!("insufficient points: available {available}, required {required}"),
        )
        .with_details(json!({ "available": available, "required": required }))
    }

    /// Convenience constructor for [`ErrorCode::Conflict`].
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Conflict, message)
    }

    /// Convenience constructor for [`ErrorCode::ServiceUnavailable`].
    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ServiceUnavailable, message)
    }

    /// Convenience constructor for [`ErrorCode::InternalError`].
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.

    use rstest::rstest;

    use super::*;

    #[rstest]
    fn try_new_rejects_blank_message() {
        let result = Error::try_new(ErrorCode::NotFound, "   ");
        assert_eq!(result, Err(ErrorValidationError::EmptyMessage));
    }

    #[rstest]
    fn insufficient_balance_reports_both_amounts() {
        let err = Error::insufficient_balance(5, 20);

        assert_eq!(err.code(), ErrorCode::InsufficientBalance);
        assert!(err.message().contains("available 5"));
        assert!(err.message().contains("required 20"));
        assert_eq!(
            err.details(),
            Some(&json!({ "available": 5, "required": 20 }))
        );
    }

    #[rstest]
    fn codes_serialise_snake_case() {
        let err = Error::invalid_argument("points must be a non-negative integer");
        let value = serde_json::to_value(&err).expect("serialises");

        assert_eq!(value["code"], "invalid_argument");
        assert!(value.get("details").is_none());
    }

    #[rstest]
    #[case(Error::not_found("user missing"), ErrorCode::NotFound)]
    #[case(Error::conflict("concurrent update"), ErrorCode::Conflict)]
    #[case(Error::service_unavailable("pool down"), ErrorCode::ServiceUnavailable)]
    #[case(Error::internal("broken"), ErrorCode::InternalError)]
    fn constructors_set_matching_code(#[case] err: Error, #[case] code: ErrorCode) {
        assert_eq!(err.code(), code);
    }
}
