//! Error types for the spendlog CLI.
//!
//! Most errors travel as `anyhow::Error` with context attached at each layer. The `ApiError`
//! enum carries the failures that the command layer needs to react to specifically (for example
//! a 401 clears the saved session), and is recovered with `downcast_ref`.

use std::fmt::{Display, Formatter};

pub type Error = anyhow::Error;
pub type Result<T> = std::result::Result<T, Error>;

/// Failures from the expense-store boundary that have a specific meaning to the caller.
///
/// Malformed response payloads (e.g. a collection endpoint returning a non-array) are not an
/// error variant: they are coerced to empty defaults where the payload is decoded, so that a
/// bad server response degrades the display instead of failing the command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// Required fields were missing or empty before a mutation was attempted. Raised locally,
    /// never reaches the network. Holds one message per offending field.
    Validation(Vec<String>),

    /// The request could not be completed at the transport level (connection refused, DNS, TLS).
    Network(String),

    /// The server answered with a non-2xx status other than 401. The message is extracted from
    /// the response body when the server provided one.
    Server { status: u16, message: String },

    /// The server answered 401. The saved session is invalid and must be re-established.
    Auth,
}

impl Display for ApiError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiError::Validation(problems) => {
                write!(f, "invalid input: {}", problems.join(", "))
            }
            ApiError::Network(message) => write!(f, "network error: {message}"),
            ApiError::Server { status, message } => {
                write!(f, "server error ({status}): {message}")
            }
            ApiError::Auth => write!(f, "not authorized (401), please log in again"),
        }
    }
}

impl std::error::Error for ApiError {}

impl ApiError {
    /// True when this error means the saved session is no longer valid.
    pub fn is_auth(&self) -> bool {
        matches!(self, ApiError::Auth)
    }
}

/// Checks whether an `anyhow::Error` wraps `ApiError::Auth` anywhere in its chain.
pub(crate) fn is_auth_error(error: &Error) -> bool {
    error
        .chain()
        .any(|cause| matches!(cause.downcast_ref::<ApiError>(), Some(e) if e.is_auth()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_display() {
        let e = ApiError::Validation(vec![
            "title cannot be empty".to_string(),
            "Missing field: date".to_string(),
        ]);
        assert_eq!(
            e.to_string(),
            "invalid input: title cannot be empty, Missing field: date"
        );
    }

    #[test]
    fn test_is_auth_error_through_context() {
        use anyhow::Context;
        let result: Result<()> = Err(ApiError::Auth.into());
        let wrapped = result.context("while listing expenses").unwrap_err();
        assert!(is_auth_error(&wrapped));

        let other: Error = ApiError::Network("connection refused".to_string()).into();
        assert!(!is_auth_error(&other));
    }
}
