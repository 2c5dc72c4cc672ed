//! # Gateway Configuration
//!
//! Connection settings for the ezic gateway.
//! Values can come from defaults, a TOML document or `EZIC_*` environment
//! variables.

use ezic_core::{Emptiness, GatewayError, GatewayResult};
use serde::Deserialize;
use std::env;
use std::sync::{Arc, RwLock};
use url::Url;

/// Default gateway host
pub const DEFAULT_HOST: &str = "secure-dm3.ezic.com";

/// Default transaction endpoint
pub const DEFAULT_ENDPOINT: &str = "/gw/sas/direct3.1";

/// Default transaction-id endpoint
pub const DEFAULT_ID_ENDPOINT: &str = "/gw/sas/getid3.1";

/// User agent the gateway has always been called with
pub const DEFAULT_USER_AGENT: &str = "Mozilla/4.0 (compatible; MSIE 5.01; Windows NT 5.0)";

/// How parameters are sent to the transaction endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RequestMethod {
    /// URL-encoded query string
    #[default]
    Get,
    /// URL-encoded form body
    Post,
}

impl RequestMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestMethod::Get => "GET",
            RequestMethod::Post => "POST",
        }
    }
}

impl std::str::FromStr for RequestMethod {
    type Err = GatewayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(RequestMethod::Get),
            "POST" => Ok(RequestMethod::Post),
            other => Err(GatewayError::Configuration(format!(
                "unsupported request method: {}",
                other
            ))),
        }
    }
}

/// Per-client gateway settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Gateway host name
    pub host: String,

    /// Path of the transaction endpoint
    pub endpoint: String,

    /// Path of the transaction-id endpoint
    pub id_endpoint: String,

    /// TCP port
    pub port: u16,

    /// URL scheme (`https` in production; `http` only for local mocks)
    pub scheme: String,

    /// Suppress live side effects such as email receipts
    pub test_mode: bool,

    /// Request method for transactions
    pub method: RequestMethod,

    /// Dynamic IP security code (sent when non-empty)
    pub dynip_sec_code: String,

    /// Site tag (sent when non-empty)
    pub site_tag: String,

    /// User-Agent header value
    pub user_agent: String,

    /// Verify the gateway's TLS certificate.
    ///
    /// Off by default to match the gateway's reference client. Turn it on
    /// wherever the host presents a valid chain.
    pub verify_certificates: bool,

    /// Which values count as empty when records are flattened
    pub emptiness: Emptiness,
}

impl GatewayConfig {
    /// Load configuration from environment variables.
    ///
    /// Every variable is optional; unset ones keep the default:
    /// - `EZIC_HOST`, `EZIC_ENDPOINT`, `EZIC_ID_ENDPOINT`, `EZIC_PORT`, `EZIC_SCHEME`
    /// - `EZIC_TEST_MODE`, `EZIC_METHOD`
    /// - `EZIC_DYNIP_SEC_CODE`, `EZIC_SITE_TAG`, `EZIC_USER_AGENT`
    /// - `EZIC_VERIFY_CERTIFICATES`, `EZIC_ALLOW_ZERO`
    pub fn from_env() -> GatewayResult<Self> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let mut config = Self::default();

        if let Ok(host) = env::var("EZIC_HOST") {
            config.host = host;
        }
        if let Ok(endpoint) = env::var("EZIC_ENDPOINT") {
            config.endpoint = endpoint;
        }
        if let Ok(id_endpoint) = env::var("EZIC_ID_ENDPOINT") {
            config.id_endpoint = id_endpoint;
        }
        if let Ok(port) = env::var("EZIC_PORT") {
            config.port = port.parse().map_err(|_| {
                GatewayError::Configuration(format!("EZIC_PORT is not a port: {}", port))
            })?;
        }
        if let Ok(scheme) = env::var("EZIC_SCHEME") {
            config.scheme = scheme;
        }
        if let Some(test_mode) = env_flag("EZIC_TEST_MODE")? {
            config.test_mode = test_mode;
        }
        if let Ok(method) = env::var("EZIC_METHOD") {
            config.method = method.parse()?;
        }
        if let Ok(code) = env::var("EZIC_DYNIP_SEC_CODE") {
            config.dynip_sec_code = code;
        }
        if let Ok(tag) = env::var("EZIC_SITE_TAG") {
            config.site_tag = tag;
        }
        if let Ok(agent) = env::var("EZIC_USER_AGENT") {
            config.user_agent = agent;
        }
        if let Some(verify) = env_flag("EZIC_VERIFY_CERTIFICATES")? {
            config.verify_certificates = verify;
        }
        if let Some(true) = env_flag("EZIC_ALLOW_ZERO")? {
            config.emptiness = Emptiness::AllowZero;
        }

        Ok(config)
    }

    /// Load configuration from a TOML document; missing keys keep defaults
    pub fn from_toml(toml_str: &str) -> GatewayResult<Self> {
        toml::from_str(toml_str)
            .map_err(|e| GatewayError::Configuration(format!("invalid gateway config: {}", e)))
    }

    /// Absolute URL for a path on the gateway host
    pub fn url_for(&self, path: &str) -> GatewayResult<Url> {
        let raw = format!("{}://{}:{}{}", self.scheme, self.host, self.port, path);
        Url::parse(&raw).map_err(|e| {
            GatewayError::Configuration(format!("invalid gateway url {}: {}", raw, e))
        })
    }

    /// URL of the transaction endpoint
    pub fn transaction_url(&self) -> GatewayResult<Url> {
        self.url_for(&self.endpoint)
    }

    /// URL of the transaction-id endpoint
    pub fn id_url(&self) -> GatewayResult<Url> {
        self.url_for(&self.id_endpoint)
    }

    /// Builder: set host
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Builder: set port
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Builder: set scheme (for testing against a local mock)
    pub fn with_scheme(mut self, scheme: impl Into<String>) -> Self {
        self.scheme = scheme.into();
        self
    }

    /// Builder: toggle test mode
    pub fn with_test_mode(mut self, enabled: bool) -> Self {
        self.test_mode = enabled;
        self
    }

    /// Builder: set request method
    pub fn with_method(mut self, method: RequestMethod) -> Self {
        self.method = method;
        self
    }

    /// Builder: set dynamic IP security code
    pub fn with_dynip_sec_code(mut self, code: impl Into<String>) -> Self {
        self.dynip_sec_code = code.into();
        self
    }

    /// Builder: set site tag
    pub fn with_site_tag(mut self, tag: impl Into<String>) -> Self {
        self.site_tag = tag.into();
        self
    }

    /// Builder: toggle TLS certificate verification
    pub fn with_verify_certificates(mut self, verify: bool) -> Self {
        self.verify_certificates = verify;
        self
    }

    /// Builder: set the record emptiness rule
    pub fn with_emptiness(mut self, rule: Emptiness) -> Self {
        self.emptiness = rule;
        self
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            id_endpoint: DEFAULT_ID_ENDPOINT.to_string(),
            port: 443,
            scheme: "https".to_string(),
            test_mode: true,
            method: RequestMethod::Get,
            dynip_sec_code: String::new(),
            site_tag: String::new(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            verify_certificates: false,
            emptiness: Emptiness::Loose,
        }
    }
}

fn env_flag(name: &str) -> GatewayResult<Option<bool>> {
    match env::var(name) {
        Ok(raw) => match raw.to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(Some(true)),
            "0" | "false" | "no" | "off" | "" => Ok(Some(false)),
            _ => Err(GatewayError::Configuration(format!(
                "{} must be a boolean, got {}",
                name, raw
            ))),
        },
        Err(_) => Ok(None),
    }
}

/// Account id shared by every client that holds a clone of this handle.
///
/// Setting it is visible to all holders immediately; the last writer wins.
#[derive(Debug, Clone, Default)]
pub struct SharedAccount {
    inner: Arc<RwLock<String>>,
}

impl SharedAccount {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the account id for all holders
    pub fn set(&self, account_id: impl Into<String>) {
        let mut guard = self.inner.write().unwrap_or_else(|e| e.into_inner());
        *guard = account_id.into();
    }

    /// Current account id (empty if never set)
    pub fn get(&self) -> String {
        self.inner.read().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = GatewayConfig::default();
        assert_eq!(config.host, "secure-dm3.ezic.com");
        assert_eq!(config.port, 443);
        assert!(config.test_mode);
        assert!(!config.verify_certificates);
        assert_eq!(config.method, RequestMethod::Get);
        assert_eq!(config.emptiness, Emptiness::Loose);
    }

    #[test]
    fn test_urls() {
        let config = GatewayConfig::default();
        assert_eq!(
            config.transaction_url().unwrap().as_str(),
            "https://secure-dm3.ezic.com/gw/sas/direct3.1"
        );

        let local = GatewayConfig::default()
            .with_scheme("http")
            .with_host("127.0.0.1")
            .with_port(8089);
        assert_eq!(
            local.id_url().unwrap().as_str(),
            "http://127.0.0.1:8089/gw/sas/getid3.1"
        );
    }

    #[test]
    fn test_bad_host_is_configuration_error() {
        let config = GatewayConfig::default().with_host("bad host");
        assert!(matches!(
            config.transaction_url(),
            Err(GatewayError::Configuration(_))
        ));
    }

    #[test]
    fn test_from_toml_partial() {
        let config = GatewayConfig::from_toml(
            r#"
            method = "POST"
            site_tag = "shop"
            test_mode = false
            emptiness = "allow_zero"
            "#,
        )
        .unwrap();

        assert_eq!(config.method, RequestMethod::Post);
        assert_eq!(config.site_tag, "shop");
        assert!(!config.test_mode);
        assert_eq!(config.emptiness, Emptiness::AllowZero);
        assert_eq!(config.host, DEFAULT_HOST);
    }

    #[test]
    fn test_verify_certificates_from_toml_and_builder() {
        let config = GatewayConfig::from_toml("verify_certificates = true").unwrap();
        assert!(config.verify_certificates);

        let config = GatewayConfig::default().with_verify_certificates(true);
        assert!(config.verify_certificates);
        assert!(!config.with_verify_certificates(false).verify_certificates);
    }

    #[test]
    fn test_verify_certificates_from_env() {
        env::set_var("EZIC_VERIFY_CERTIFICATES", "true");
        let enabled = GatewayConfig::from_env();
        env::set_var("EZIC_VERIFY_CERTIFICATES", "maybe");
        let invalid = GatewayConfig::from_env();
        env::remove_var("EZIC_VERIFY_CERTIFICATES");

        assert!(enabled.unwrap().verify_certificates);
        assert!(matches!(invalid, Err(GatewayError::Configuration(_))));
    }

    #[test]
    fn test_from_toml_invalid() {
        assert!(GatewayConfig::from_toml("port = \"not a number\"").is_err());
    }

    #[test]
    fn test_method_parse() {
        assert_eq!("post".parse::<RequestMethod>().unwrap(), RequestMethod::Post);
        assert!("PUT".parse::<RequestMethod>().is_err());
    }

    #[test]
    fn test_shared_account_last_writer_wins() {
        let account = SharedAccount::new();
        let other = account.clone();

        account.set("1001");
        other.set("2002");

        assert_eq!(account.get(), "2002");
    }
}
