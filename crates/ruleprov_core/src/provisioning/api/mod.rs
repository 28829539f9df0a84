//! In-process APIs of the provisioning store.
//!
//! - **Rule provisioning**: the surface the rule-management service calls to
//!   check, record and clear rule provenance
//! - **Types**: request and response enums of every service in the crate

pub mod rules;
pub mod types;

// Re-export all types for convenience
pub use types::*;
