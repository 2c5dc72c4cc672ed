//! # Gateway Client
//!
//! Session-holding client for the ezic direct gateway.
//!
//! A client is usable only once it holds a transaction id, which it fetches
//! from the gateway while connecting. Every billing call afterwards performs
//! exactly one round trip:
//!
//! ```text
//! base request fields ─┐
//! customer.flatten() ──┼─ merge (later wins) ─ inject session fields
//! payment.flatten()  ──┘                          │
//!                                                 └─ send ─ TransactionResult
//! ```

use crate::config::{GatewayConfig, RequestMethod, SharedAccount};
use crate::transport::{OutboundRequest, RawResponse, ReqwestTransport, Transport};
use ezic_core::{
    CustomerRecord, FieldMap, GatewayError, GatewayResult, Payment, Record, TranType,
    TransactionId, TransactionResult,
};
use tracing::{debug, info, instrument, warn};

/// Client bound to one gateway session
pub struct GatewayClient<T = ReqwestTransport> {
    config: GatewayConfig,
    account: SharedAccount,
    transport: T,
    base_request: FieldMap,
    trans_id: TransactionId,
    last_request: Option<FieldMap>,
    last_response: Option<RawResponse>,
}

impl GatewayClient<ReqwestTransport> {
    /// Connect over HTTPS using reqwest
    pub async fn connect(
        config: GatewayConfig,
        account: SharedAccount,
        account_id: Option<&str>,
    ) -> GatewayResult<Self> {
        let account_id = require_account_id(account_id)?;
        let transport = ReqwestTransport::new(&config)?;
        Self::connect_with(config, account, Some(account_id), transport).await
    }

    /// Connect using `GatewayConfig::from_env` and `EZIC_ACCOUNT_ID`
    pub async fn from_env() -> GatewayResult<Self> {
        let config = GatewayConfig::from_env()?;
        let account_id = std::env::var("EZIC_ACCOUNT_ID").ok();
        Self::connect(config, SharedAccount::new(), account_id.as_deref()).await
    }
}

impl<T: Transport> GatewayClient<T> {
    /// Connect with a caller-supplied transport.
    ///
    /// Fails with `Initialization` before any network call when the account
    /// id is missing or empty. Otherwise publishes the id to `account`,
    /// then fetches a fresh transaction id (single attempt).
    pub async fn connect_with(
        config: GatewayConfig,
        account: SharedAccount,
        account_id: Option<&str>,
        transport: T,
    ) -> GatewayResult<Self> {
        let account_id = require_account_id(account_id)?;
        account.set(account_id);

        let mut base_request = FieldMap::new();
        if config.test_mode {
            base_request.insert("disable_email_receipts", "true");
        }

        let response = transport.send(OutboundRequest::get(config.id_url()?)).await?;
        let trans_id = TransactionId::parse(response.body())?;

        info!("Gateway session established: trans_id={}", trans_id);

        Ok(Self {
            config,
            account,
            transport,
            base_request,
            trans_id,
            last_request: None,
            last_response: Some(response),
        })
    }

    /// Transaction id issued for this session
    pub fn trans_id(&self) -> &TransactionId {
        &self.trans_id
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Parameters sent by the most recent transaction
    pub fn last_request(&self) -> Option<&FieldMap> {
        self.last_request.as_ref()
    }

    /// Raw response to the most recent request
    pub fn last_response(&self) -> Option<&RawResponse> {
        self.last_response.as_ref()
    }

    /// Authorize a card without capturing funds
    #[instrument(skip(self, customer, payment), fields(trans_id = %self.trans_id))]
    pub async fn auth(
        &mut self,
        customer: &CustomerRecord,
        payment: &Payment,
    ) -> GatewayResult<TransactionResult> {
        self.charge(TranType::Authorization, customer, payment).await
    }

    /// Authorize and capture in one step
    #[instrument(skip(self, customer, payment), fields(trans_id = %self.trans_id))]
    pub async fn sale(
        &mut self,
        customer: &CustomerRecord,
        payment: &Payment,
    ) -> GatewayResult<TransactionResult> {
        self.charge(TranType::Sale, customer, payment).await
    }

    /// Sale that sets up a recurring schedule.
    ///
    /// Only `Payment::RecurringCard` is accepted.
    #[instrument(skip(self, customer, payment), fields(trans_id = %self.trans_id))]
    pub async fn recurring_sale(
        &mut self,
        customer: &CustomerRecord,
        payment: &Payment,
    ) -> GatewayResult<TransactionResult> {
        match payment {
            Payment::RecurringCard(_) => self.charge(TranType::Sale, customer, payment).await,
            other => Err(GatewayError::TypeMismatch {
                expected: "recurring_card",
                found: other.kind(),
            }),
        }
    }

    /// Refund a previous transaction
    #[instrument(skip(self, orig_id), fields(trans_id = %self.trans_id))]
    pub async fn refund(&mut self, orig_id: &str) -> GatewayResult<TransactionResult> {
        let mut params = self.request_fields(TranType::Refund);
        params.insert("orig_id", orig_id);
        self.transact(params).await
    }

    async fn charge(
        &mut self,
        tran_type: TranType,
        customer: &CustomerRecord,
        payment: &Payment,
    ) -> GatewayResult<TransactionResult> {
        let rule = self.config.emptiness;
        let customer_info = customer.flatten_with(rule)?;
        let payment_info = payment.flatten_with(rule)?;

        let mut params = self.request_fields(tran_type);
        params.merge(&customer_info);
        params.merge(&payment_info);

        self.transact(params).await
    }

    /// Base fields plus the operation code
    fn request_fields(&self, tran_type: TranType) -> FieldMap {
        let mut params = self.base_request.clone();
        params.insert("tran_type", tran_type.code());
        params
    }

    /// Session fields attached to every parameterized request
    fn inject_session_fields(&self, params: &mut FieldMap) {
        params.insert("account_id", self.account.get());
        params.insert("trans_id", self.trans_id.as_str());
        if !self.config.dynip_sec_code.is_empty() {
            params.insert("dynip_sec_code", self.config.dynip_sec_code.as_str());
        }
        if !self.config.site_tag.is_empty() {
            params.insert("site_tag", self.config.site_tag.as_str());
        }
    }

    fn build_request(&self, params: &FieldMap) -> GatewayResult<OutboundRequest> {
        let encoded = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(params.to_pairs())
            .finish();
        let mut url = self.config.transaction_url()?;

        Ok(match self.config.method {
            RequestMethod::Get => {
                url.set_query(Some(&encoded));
                OutboundRequest {
                    method: RequestMethod::Get,
                    url,
                    body: None,
                }
            }
            RequestMethod::Post => OutboundRequest {
                method: RequestMethod::Post,
                url,
                body: Some(encoded),
            },
        })
    }

    async fn transact(&mut self, mut params: FieldMap) -> GatewayResult<TransactionResult> {
        self.inject_session_fields(&mut params);
        let request = self.build_request(&params)?;

        debug!(
            "Sending {} {} with {} fields",
            request.method.as_str(),
            request.url.path(),
            params.len()
        );

        self.last_request = Some(params);
        let response = self.transport.send(request).await?;

        let result = if response.status == 200 {
            TransactionResult::approved(response.body())
        } else {
            let reason = response.reason_phrase().unwrap_or_default();
            warn!("Gateway rejected transaction: {} {}", response.status, reason);
            TransactionResult::declined(response.status, reason)
        };
        self.last_response = Some(response);

        info!("Transaction finished: success={}", result.success);
        Ok(result)
    }
}

fn require_account_id(account_id: Option<&str>) -> GatewayResult<&str> {
    match account_id {
        Some(id) if !id.is_empty() => Ok(id),
        _ => Err(GatewayError::Initialization(
            "Unable to initialize without an account ID".to_string(),
        )),
    }
}
