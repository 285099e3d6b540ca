//! Externally visible scheme and host of the running gateway

use std::fmt;

/// Where a client reached us, used for `servers` and manifest URLs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostContext {
    scheme: String,
    host: String,
}

impl HostContext {
    pub fn new(scheme: impl Into<String>, host: impl Into<String>) -> Self {
        Self { scheme: scheme.into(), host: host.into() }
    }

    /// Build from request headers.
    ///
    /// `X-Forwarded-Proto` wins when present; otherwise loopback hosts get
    /// `http` and everything else `https`. Without a `Host` header the
    /// configured bind address is used.
    pub fn detect(host_header: Option<&str>, forwarded_proto: Option<&str>, fallback_host: &str) -> Self {
        let host = host_header
            .map(str::trim)
            .filter(|h| !h.is_empty())
            .unwrap_or(fallback_host)
            .to_string();

        let forwarded = forwarded_proto
            .and_then(|p| p.split(',').next())
            .map(|p| p.trim().to_ascii_lowercase())
            .filter(|p| p == "http" || p == "https");

        let scheme = match forwarded {
            Some(p) => p,
            None if is_loopback(&host) => "http".to_string(),
            None => "https".to_string(),
        };
        Self { scheme, host }
    }

    /// Parse a full server URL such as `https://crm.example.com`
    pub fn from_server_url(url: &str) -> Option<Self> {
        let (scheme, rest) = url.trim().split_once("://")?;
        let host = rest.trim_end_matches('/');
        if host.is_empty() || !matches!(scheme, "http" | "https") {
            return None;
        }
        Some(Self::new(scheme, host))
    }

    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn base_url(&self) -> String {
        format!("{}://{}", self.scheme, self.host)
    }

    pub fn is_local(&self) -> bool {
        is_loopback(&self.host)
    }
}

impl fmt::Display for HostContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.base_url())
    }
}

/// `localhost`, `127.x.x.x`, `::1` or `0.0.0.0`, with or without a port
fn is_loopback(host: &str) -> bool {
    let name = if let Some(rest) = host.strip_prefix('[') {
        rest.split(']').next().unwrap_or(rest)
    } else if host.matches(':').count() > 1 {
        host
    } else {
        match host.rsplit_once(':') {
            Some((name, port)) if port.chars().all(|c| c.is_ascii_digit()) => name,
            _ => host,
        }
    };
    let name = name.to_ascii_lowercase();
    name == "localhost"
        || name.ends_with(".localhost")
        || name.starts_with("127.")
        || name == "::1"
        || name == "0.0.0.0"
}
