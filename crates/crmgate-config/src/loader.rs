//! Config file loading (YAML or JSON) followed by environment overrides

use crate::env_resolver::EnvResolver;
use crate::error::{ConfigError, ConfigResult};
use crate::settings::GatewayConfig;
use serde_json::Value as JsonValue;
use std::fs;
use std::path::Path;

/// Supported config file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Yaml,
    Json,
}

impl FileFormat {
    pub fn from_path<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        match path.as_ref().extension().and_then(|s| s.to_str()) {
            Some("yaml") | Some("yml") => Ok(FileFormat::Yaml),
            Some("json") => Ok(FileFormat::Json),
            Some(ext) => Err(ConfigError::UnsupportedFormat(ext.to_string())),
            None => Err(ConfigError::UnsupportedFormat("no extension".to_string())),
        }
    }
}

/// Parse config text, resolving `${VAR:default}` references first
pub fn parse_config(
    content: &str,
    format: FileFormat,
    resolver: &EnvResolver,
    lookup: &dyn Fn(&str) -> Option<String>,
) -> ConfigResult<GatewayConfig> {
    let raw: JsonValue = match format {
        FileFormat::Yaml => serde_yaml::from_str(content)?,
        FileFormat::Json => serde_json::from_str(content)?,
    };
    // an empty YAML document parses as null
    if raw.is_null() {
        return Ok(GatewayConfig::default());
    }
    if !raw.is_object() {
        return Err(ConfigError::Validation("config file must contain a mapping".to_string()));
    }
    let resolved = resolver.resolve_with(&raw, lookup)?;
    Ok(serde_json::from_value(resolved)?)
}

/// Load the effective configuration: defaults, then the optional file, then `CRMGATE_*` env vars.
pub fn load_config(path: Option<&Path>) -> ConfigResult<GatewayConfig> {
    let lookup = |name: &str| std::env::var(name).ok();
    let mut config = match path {
        Some(path) => {
            let content = fs::read_to_string(path)?;
            let format = FileFormat::from_path(path)?;
            tracing::debug!(path = %path.display(), ?format, "loading config file");
            parse_config(&content, format, &EnvResolver::default(), &lookup)?
        }
        None => GatewayConfig::default(),
    };
    config.apply_env(lookup)?;
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn detects_format_from_extension() {
        assert_eq!(FileFormat::from_path("gate.yaml").unwrap(), FileFormat::Yaml);
        assert_eq!(FileFormat::from_path("gate.yml").unwrap(), FileFormat::Yaml);
        assert_eq!(FileFormat::from_path("gate.json").unwrap(), FileFormat::Json);
        assert!(FileFormat::from_path("gate.toml").is_err());
        assert!(FileFormat::from_path("gate").is_err());
    }

    #[test]
    fn yaml_with_partial_fields_keeps_defaults() {
        let yaml = r#"
api_base_url: "${CRMGATE_TEST_API:https://crm.example.com}"
port: "${CRMGATE_TEST_PORT:9001}"
rate_limit:
  max_requests: 10
"#;
        let config =
            parse_config(yaml, FileFormat::Yaml, &EnvResolver::default(), &|_| None).unwrap();
        assert_eq!(config.api_base_url, "https://crm.example.com");
        assert_eq!(config.port, 9001);
        assert_eq!(config.rate_limit.max_requests, 10);
        assert_eq!(config.rate_limit.window_secs, 60);
        assert_eq!(config.max_query_length, 2000);
    }

    #[test]
    fn numeric_token_is_read_as_string() {
        let json = r#"{"auth_token": "${CRMGATE_TOKEN}"}"#;
        let lookup = |_: &str| Some("123456".to_string());
        let config = parse_config(json, FileFormat::Json, &EnvResolver::default(), &lookup).unwrap();
        assert_eq!(config.auth_token.as_deref(), Some("123456"));
    }

    #[test]
    fn non_mapping_documents_are_rejected() {
        let err = parse_config("[1, 2]", FileFormat::Json, &EnvResolver::default(), &|_| None);
        assert!(matches!(err, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn load_config_reads_file() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(file, "host: 0.0.0.0\nrequest_timeout_secs: 5").unwrap();

        let config = load_config(Some(file.path())).unwrap();
        assert_eq!(config.request_timeout_secs, 5);
    }
}
