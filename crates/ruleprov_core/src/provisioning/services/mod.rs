//! Core services of the provisioning store.
//!
//! - **Provenance**: the keyed, organization-scoped provenance store
//! - **Policy**: the edit check applied on top of a stored provenance

pub mod policy;
pub mod provenance;
