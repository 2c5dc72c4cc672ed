//! # Gateway Error Types
//!
//! Typed error handling for the ezic gateway client.
//! Every fallible operation returns `Result<T, GatewayError>`.
//!
//! A gateway-reported decline is *not* an error: it comes back as a
//! [`TransactionResult`](crate::TransactionResult) with `success == false`.

use thiserror::Error;

/// Core error type for all gateway operations
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Required construction input was missing (account id)
    #[error("Initialization error: {0}")]
    Initialization(String),

    /// A record field required for transmission is empty
    #[error("Unable to verify: {field} is empty")]
    Validation { field: String },

    /// Wrong payment variant for the requested operation
    #[error("Payment must be of type \"{expected}\", got \"{found}\"")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },

    /// The id-issuing endpoint returned something other than digits
    #[error("Invalid transaction id: {body:?}")]
    InvalidTransactionId { body: String },

    /// Network/TLS failure before a response was received
    #[error("Transport error: {0}")]
    Transport(String),

    /// Configuration errors (bad URL parts, unparsable config)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A bound value could not be represented as a scalar field
    #[error("Invalid value for field {field}: {message}")]
    InvalidField { field: String, message: String },
}

impl GatewayError {
    /// Name of the offending field, for validation-style errors
    pub fn field(&self) -> Option<&str> {
        match self {
            GatewayError::Validation { field } | GatewayError::InvalidField { field, .. } => {
                Some(field)
            }
            _ => None,
        }
    }
}

/// Result type alias for gateway operations
pub type GatewayResult<T> = Result<T, GatewayError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_message_names_field() {
        let err = GatewayError::Validation {
            field: "cvv2".into(),
        };
        assert_eq!(err.to_string(), "Unable to verify: cvv2 is empty");
        assert_eq!(err.field(), Some("cvv2"));
    }

    #[test]
    fn test_type_mismatch_message() {
        let err = GatewayError::TypeMismatch {
            expected: "recurring_card",
            found: "card",
        };
        assert_eq!(
            err.to_string(),
            "Payment must be of type \"recurring_card\", got \"card\""
        );
        assert!(err.field().is_none());
    }
}
