//! # Gateway Transport
//!
//! The HTTP seam between `GatewayClient` and the network. Production uses
//! [`ReqwestTransport`]; tests plug in their own implementation.

use crate::config::{GatewayConfig, RequestMethod};
use async_trait::async_trait;
use ezic_core::{GatewayError, GatewayResult};
use hyper::ext::ReasonPhrase;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use tracing::{debug, error, warn};
use url::Url;

/// A fully assembled request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundRequest {
    pub method: RequestMethod,
    /// Target URL, including the query string for GET requests
    pub url: Url,
    /// URL-encoded form body for POST requests
    pub body: Option<String>,
}

impl OutboundRequest {
    pub fn get(url: Url) -> Self {
        Self {
            method: RequestMethod::Get,
            url,
            body: None,
        }
    }

    /// Decoded parameters, from the query string or the form body
    pub fn params(&self) -> Vec<(String, String)> {
        match (&self.method, &self.body) {
            (RequestMethod::Post, Some(body)) => url::form_urlencoded::parse(body.as_bytes())
                .into_owned()
                .collect(),
            _ => self.url.query_pairs().into_owned().collect(),
        }
    }
}

/// Raw response: header block followed by body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    /// HTTP status code
    pub status: u16,
    raw: String,
    header_size: usize,
}

impl RawResponse {
    /// Wrap a raw response whose first `header_size` bytes are the header block
    pub fn new(status: u16, raw: impl Into<String>, header_size: usize) -> Self {
        Self {
            status,
            raw: raw.into(),
            header_size,
        }
    }

    /// Assemble a raw response from its header block and body
    pub fn from_parts(status: u16, header: &str, body: &str) -> Self {
        Self::new(status, format!("{}{}", header, body), header.len())
    }

    /// Header block, status line included
    pub fn header(&self) -> &str {
        self.raw.get(..self.header_size).unwrap_or(&self.raw)
    }

    /// Body with trailing newlines stripped
    pub fn body(&self) -> &str {
        self.raw
            .get(self.header_size..)
            .unwrap_or_default()
            .trim_end_matches('\n')
    }

    /// Reason phrase of the first `HTTP/<ver> <code> <reason>` line
    pub fn reason_phrase(&self) -> Option<&str> {
        parse_reason_phrase(self.header())
    }
}

fn parse_reason_phrase(header: &str) -> Option<&str> {
    header.lines().find_map(|line| {
        let rest = line.trim_end_matches('\r').strip_prefix("HTTP/")?;
        let mut parts = rest.splitn(3, ' ');
        let _version = parts.next()?;
        let code = parts.next()?;
        if code.is_empty() || !code.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        Some(parts.next().unwrap_or("").trim())
    })
}

/// Reason phrase as sent on the wire.
///
/// hyper only records the phrase when it differs from the canonical one
/// for the code, so the canonical phrase is the fallback.
fn reason_phrase(response: &reqwest::Response) -> String {
    response
        .extensions()
        .get::<ReasonPhrase>()
        .map(|phrase| String::from_utf8_lossy(phrase.as_bytes()).into_owned())
        .or_else(|| response.status().canonical_reason().map(str::to_string))
        .unwrap_or_default()
}

/// Sends one request and returns the raw response.
///
/// Implementations must return `GatewayError::Transport` when no response
/// could be obtained; any HTTP status is a successful send.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: OutboundRequest) -> GatewayResult<RawResponse>;
}

/// reqwest-backed transport
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Build a transport for the given gateway settings.
    ///
    /// Idle connections are not kept, so every request opens its own.
    pub fn new(config: &GatewayConfig) -> GatewayResult<Self> {
        if !config.verify_certificates {
            warn!(
                "TLS certificate verification is disabled for {}",
                config.host
            );
        }

        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .danger_accept_invalid_certs(!config.verify_certificates)
            .pool_max_idle_per_host(0)
            .build()
            .map_err(|e| {
                GatewayError::Configuration(format!("failed to create HTTP client: {}", e))
            })?;

        Ok(Self { client })
    }

    /// Use an existing reqwest client as-is
    pub fn from_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: OutboundRequest) -> GatewayResult<RawResponse> {
        let builder = match request.method {
            RequestMethod::Get => self.client.get(request.url.clone()),
            RequestMethod::Post => self
                .client
                .post(request.url.clone())
                .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(request.body.clone().unwrap_or_default()),
        };

        let response = builder.send().await.map_err(|e| {
            error!("Gateway request to {} failed: {}", request.url.path(), e);
            GatewayError::Transport(e.to_string())
        })?;

        let status = response.status();
        let mut header = format!(
            "{:?} {} {}\r\n",
            response.version(),
            status.as_u16(),
            reason_phrase(&response)
        );
        for (name, value) in response.headers() {
            header.push_str(name.as_str());
            header.push_str(": ");
            header.push_str(value.to_str().unwrap_or(""));
            header.push_str("\r\n");
        }
        header.push_str("\r\n");

        let body = response
            .text()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        debug!(
            "Gateway responded: status={}, body_len={}",
            status,
            body.len()
        );

        Ok(RawResponse::from_parts(status.as_u16(), &header, &body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_on_header_size() {
        let header = "HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\n\r\n";
        let response = RawResponse::from_parts(200, header, "APPROVED:123\n\n");

        assert_eq!(response.header(), header);
        assert_eq!(response.body(), "APPROVED:123");
    }

    #[test]
    fn test_reason_phrase() {
        let response = RawResponse::from_parts(
            402,
            "HTTP/1.1 402 Payment Required\r\nServer: gw\r\n\r\n",
            "",
        );
        assert_eq!(response.reason_phrase(), Some("Payment Required"));

        let multi_word = RawResponse::from_parts(
            500,
            "HTTP/1.0 500 Invalid card number supplied\r\n\r\n",
            "",
        );
        assert_eq!(multi_word.reason_phrase(), Some("Invalid card number supplied"));
    }

    #[test]
    fn test_reason_phrase_skips_non_status_lines() {
        assert_eq!(parse_reason_phrase("X-HTTP/1.1 400 Bad\r\n"), None);
        assert_eq!(parse_reason_phrase("HTTP/2 404\r\n"), Some(""));
        assert_eq!(parse_reason_phrase(""), None);
    }

    #[test]
    fn test_header_size_past_end() {
        let response = RawResponse::new(200, "short", 100);
        assert_eq!(response.header(), "short");
        assert_eq!(response.body(), "");
    }

    #[test]
    fn test_request_params_from_query_and_body() {
        let get = OutboundRequest::get(Url::parse("https://gw.test/x?a=1&b=two+words").unwrap());
        assert_eq!(
            get.params(),
            vec![
                ("a".to_string(), "1".to_string()),
                ("b".to_string(), "two words".to_string())
            ]
        );

        let post = OutboundRequest {
            method: RequestMethod::Post,
            url: Url::parse("https://gw.test/x").unwrap(),
            body: Some("tran_type=R&orig_id=77".to_string()),
        };
        assert_eq!(post.params()[1], ("orig_id".to_string(), "77".to_string()));
    }

    #[test]
    fn test_reqwest_transport_builds() {
        let transport = ReqwestTransport::new(&GatewayConfig::default());
        assert!(transport.is_ok());
    }

    #[test]
    fn test_reqwest_transport_builds_with_verification() {
        let config = GatewayConfig::default().with_verify_certificates(true);
        assert!(ReqwestTransport::new(&config).is_ok());
    }

    fn response_with(status: u16, phrase: Option<&'static [u8]>) -> reqwest::Response {
        let mut builder = hyper::Response::builder().status(status);
        if let Some(phrase) = phrase {
            builder = builder.extension(ReasonPhrase::from_static(phrase));
        }
        builder.body("").unwrap().into()
    }

    #[test]
    fn test_wire_reason_phrase_wins_over_canonical() {
        let response = response_with(402, Some(b"Card Declined: Insufficient Funds"));
        assert_eq!(reason_phrase(&response), "Card Declined: Insufficient Funds");
    }

    #[test]
    fn test_canonical_reason_when_phrase_absent() {
        assert_eq!(reason_phrase(&response_with(402, None)), "Payment Required");
        assert_eq!(reason_phrase(&response_with(599, None)), "");
    }
}
