//! Backend destination: base URL plus request timeout

use crate::error::{ClientError, ClientResult};
use std::time::Duration;
use url::Url;

/// Natural-language query endpoint, relative to the base URL
pub const NATURAL_QUERY_PATH: &str = "entity/natural_query";
/// Generic tool dispatch endpoint, relative to the base URL
pub const TOOL_DISPATCH_PATH: &str = "entity/data";

/// Where and how long: everything about a backend call except the credential
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrmEndpoint {
    base_url: Url,
    timeout: Duration,
}

impl CrmEndpoint {
    pub fn new(base_url: &str, timeout: Duration) -> ClientResult<Self> {
        let mut base_url = Url::parse(base_url)
            .map_err(|e| ClientError::InvalidConfig(format!("Invalid base URL '{}': {}", base_url, e)))?;
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(ClientError::InvalidConfig(format!(
                "Unsupported base URL scheme '{}'",
                base_url.scheme()
            )));
        }
        if timeout.is_zero() {
            return Err(ClientError::InvalidConfig("Timeout must be greater than 0".to_string()));
        }
        // A trailing slash makes relative joins append instead of replace.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        base_url.set_query(None);
        base_url.set_fragment(None);
        Ok(Self { base_url, timeout })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// `host[:port]` used to key pooled HTTP clients
    pub fn authority(&self) -> String {
        match (self.base_url.host_str(), self.base_url.port_or_known_default()) {
            (Some(host), Some(port)) => format!("{}://{}:{}", self.base_url.scheme(), host, port),
            (Some(host), None) => format!("{}://{}", self.base_url.scheme(), host),
            _ => self.base_url.to_string(),
        }
    }

    /// Resolve a relative endpoint path against the base URL
    pub fn url_for(&self, path: &str) -> ClientResult<Url> {
        self.base_url.join(path.trim_start_matches('/')).map_err(|e| {
            ClientError::InvalidConfig(format!(
                "Failed to join '{}' with path '{}': {}",
                self.base_url, path, e
            ))
        })
    }
}
