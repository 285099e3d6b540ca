//! CRMGate core
//!
//! Transport-independent building blocks of the tool invocation gateway:
//! the data model, the error taxonomy, the tool registry, argument validation
//! and per-caller rate limiting.

pub mod error;
pub mod rate_limit;
pub mod registry;
pub mod sanitization;
pub mod types;
pub mod validation;

pub use error::{ErrorKind, GatewayError, GatewayResult, GENERIC_INTERNAL_MESSAGE};
pub use rate_limit::{
    Clock, ManualClock, RateLimitConfig, RateLimitDecision, RateLimiter, SystemClock,
};
pub use registry::ToolRegistry;
pub use types::{
    Arguments, CallerIdentity, Credential, InvocationRequest, InvocationResult, ResponseFormat,
    ToolDescriptor, NATURAL_QUERY_TOOL,
};
pub use validation::{
    validate_arguments, validate_entity_type, validate_fields, validate_query, ValidationLimits,
};
