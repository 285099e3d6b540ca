//! CRMGate configuration
//!
//! Defaults live in [`GatewayConfig::default`]; a YAML/JSON file and
//! `CRMGATE_*` environment variables override them, in that order.

pub mod env_resolver;
pub mod error;
pub mod loader;
pub mod settings;

pub use env_resolver::{EnvResolver, EnvResolverError};
pub use error::{ConfigError, ConfigResult};
pub use loader::{load_config, parse_config, FileFormat};
pub use settings::{GatewayConfig, RateLimitSettings};
