//! # Sale Example
//!
//! Runs one test-mode sale against the gateway.
//!
//! ```bash
//! export EZIC_ACCOUNT_ID=123456
//! cargo run -p ezic-gateway --example sale
//! ```

use ezic_core::{CardPayment, CustomerRecord, Payment};
use ezic_gateway::GatewayClient;
use tracing::{info, warn, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(Level::INFO.into())
                .from_env_lossy(),
        )
        .init();

    let mut client = GatewayClient::from_env().await?;
    info!("Connected, trans_id={}", client.trans_id());

    let customer = CustomerRecord::new()
        .with_name("Test", "Customer")
        .with_address("1 Main St", "Springfield", "IL", "62701", "US")
        .with_ip("127.0.0.1");

    let payment = Payment::from(
        CardPayment::new()
            .with_amount("1.00")
            .with_card_number("4111111111111111")
            .with_card_expire("1230")
            .with_cvv2("999"),
    );

    let result = client.sale(&customer, &payment).await?;
    if result.is_success() {
        info!("Approved: {}", result.message);
    } else {
        warn!("Declined ({}): {}", result.status, result.message);
    }

    Ok(())
}
