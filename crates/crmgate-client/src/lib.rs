//! CRMGate backend client
//!
//! One [`CrmClient`] is built per invocation and carries that caller's
//! credential only. HTTP connection pools are shared per destination through
//! [`ClientCache`].

pub mod backend;
pub mod client;
pub mod client_cache;
pub mod endpoint;
pub mod error;
pub mod timeout;

pub use backend::{BackendFactory, CrmBackend, HttpBackendFactory};
pub use client::CrmClient;
pub use client_cache::ClientCache;
pub use endpoint::{CrmEndpoint, NATURAL_QUERY_PATH, TOOL_DISPATCH_PATH};
pub use error::{ClientError, ClientResult};
