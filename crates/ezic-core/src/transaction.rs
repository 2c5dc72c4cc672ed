//! # Transaction Types
//!
//! Transaction codes sent to the gateway and the result handed back to
//! callers.

use crate::error::{GatewayError, GatewayResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Session-scoped id issued by the gateway before any billing call.
///
/// Always a non-empty run of ASCII digits; kept as text so long ids
/// survive untouched.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct TransactionId(String);

impl TransactionId {
    /// Validate a raw id-issuing response body
    pub fn parse(body: &str) -> GatewayResult<Self> {
        if body.is_empty() || !body.bytes().all(|b| b.is_ascii_digit()) {
            return Err(GatewayError::InvalidTransactionId {
                body: body.to_string(),
            });
        }
        Ok(Self(body.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Operation code carried in the `tran_type` field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TranType {
    Authorization,
    Sale,
    Refund,
}

impl TranType {
    /// Single-character wire code
    pub fn code(&self) -> &'static str {
        match self {
            TranType::Authorization => "A",
            TranType::Sale => "S",
            TranType::Refund => "R",
        }
    }
}

impl fmt::Display for TranType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Outcome of one gateway round trip.
///
/// A non-200 status is a normal result (declined card, bad field), not an
/// error; `message` then carries the HTTP reason phrase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionResult {
    /// True only for HTTP 200
    pub success: bool,
    /// Response body on success, reason phrase on failure
    pub message: String,
    /// HTTP status code returned by the gateway
    pub status: u16,
}

impl TransactionResult {
    pub fn approved(body: impl Into<String>) -> Self {
        Self {
            success: true,
            message: body.into(),
            status: 200,
        }
    }

    pub fn declined(status: u16, reason: impl Into<String>) -> Self {
        Self {
            success: false,
            message: reason.into(),
            status,
        }
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    /// The `(success, payload)` pair
    pub fn into_parts(self) -> (bool, String) {
        (self.success, self.message)
    }
}
