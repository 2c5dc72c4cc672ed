//! # ezic-core
//!
//! Core types for the ezic payment gateway client.
//!
//! This crate provides:
//! - `Record`, `FieldMap` and `FieldValue` for gateway field containers
//! - `CardPayment`, `RecurringCardPayment` and the `Payment` enum
//! - `CustomerRecord` for billing details
//! - `TranType`, `TransactionId` and `TransactionResult` for the transaction flow
//! - `GatewayError` for typed error handling
//!
//! ## Example
//!
//! ```rust
//! use ezic_core::{CardPayment, CustomerRecord, Record};
//!
//! let customer = CustomerRecord::new()
//!     .with_name("Ada", "Lovelace")
//!     .with_address("12 St James Sq", "London", "LND", "SW1Y", "GB")
//!     .with_ip("203.0.113.7");
//!
//! let payment = CardPayment::new()
//!     .with_amount("19.99")
//!     .with_card_number("4111111111111111")
//!     .with_card_expire("1228")
//!     .with_cvv2("123");
//!
//! assert!(customer.flatten().is_ok());
//! assert!(payment.flatten().is_ok());
//! ```

pub mod customer;
pub mod error;
pub mod payment;
pub mod record;
pub mod transaction;

// Re-exports for convenience
pub use customer::{CustomerRecord, CUSTOMER_FIELDS};
pub use error::{GatewayError, GatewayResult};
pub use payment::{
    CardPayment, Payment, RecurringCardPayment, CARD_FIELDS, CARD_PAY_TYPE, RECURRING_FIELDS,
};
pub use record::{Emptiness, FieldMap, FieldValue, Record};
pub use transaction::{TranType, TransactionId, TransactionResult};
