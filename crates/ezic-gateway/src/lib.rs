//! # ezic-gateway
//!
//! HTTPS client for the ezic direct payment gateway.
//!
//! Build a [`CustomerRecord`](ezic_core::CustomerRecord) and a
//! [`Payment`](ezic_core::Payment), connect a [`GatewayClient`], then call
//! one of its billing operations. Every operation is a single round trip
//! with no retries.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use ezic_core::{CardPayment, CustomerRecord, Payment};
//! use ezic_gateway::{GatewayClient, GatewayConfig, SharedAccount};
//!
//! let account = SharedAccount::new();
//! let config = GatewayConfig::default();
//! let mut client = GatewayClient::connect(config, account, Some("123456")).await?;
//!
//! let result = client.sale(&customer, &Payment::from(card)).await?;
//! if result.is_success() {
//!     println!("approved: {}", result.message);
//! } else {
//!     println!("declined: {}", result.message);
//! }
//! ```
//!
//! ## Failures
//!
//! Local faults (missing account id, empty record field, wrong payment
//! variant, bad transaction id, network/TLS failure) surface as
//! [`GatewayError`](ezic_core::GatewayError). A non-200 gateway answer is a
//! [`TransactionResult`](ezic_core::TransactionResult) with
//! `success == false` and the HTTP reason phrase as its message.

pub mod client;
pub mod config;
pub mod transport;

// Re-exports
pub use client::GatewayClient;
pub use config::{GatewayConfig, RequestMethod, SharedAccount, DEFAULT_USER_AGENT};
pub use transport::{OutboundRequest, RawResponse, ReqwestTransport, Transport};
