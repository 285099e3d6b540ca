//! CRMGate schema projection
//!
//! Pure derivation of the OpenAPI document and the plugin manifest from the
//! tool registry. Nothing here performs I/O; the same registry and
//! [`HostContext`] always produce the same document.

pub mod document;
pub mod error;
pub mod host;
pub mod manifest;
pub mod metadata;

pub use document::{project, render_document, DocumentFormat, OPENAPI_VERSION};
pub use error::{OpenApiError, OpenApiResult};
pub use host::HostContext;
pub use manifest::{plugin_manifest, PluginManifest};
pub use metadata::ApiMetadata;
