//! A multi-tenant provenance store for provisionable alerting resources.
//!
//! This crate records, for every alert rule (or other provisionable object)
//! identified by an organization, a resource kind and a UID, which channel last
//! wrote its configuration: an operator through the API, a file provisioning
//! job, or nobody. The rule-management service reads that tag before it lets an
//! edit through, so tenant scoping is part of every key and cannot be left out
//! by a call site.
//!
//! The store is exposed as a [`tower::Service`] over pluggable storage
//! backends: a sharded in-memory map and an SQLite database file.
//!
//! [`tower::Service`]: https://docs.rs/tower

#[cfg(test)]
pub mod tests;

pub mod provisioning;
pub mod storage;

#[cfg(feature = "ruleprov_tracing")]
pub mod ruleprov_tracing {
    use std::sync::Once;
    use tracing_subscriber::{EnvFilter, fmt};

    static INIT: Once = Once::new();

    /// Initialize tracing for tests
    /// This sets up a tracing subscriber that will display logs during test execution.
    /// Call this at the beginning of tests that need to see tracing output.
    pub fn init() {
        INIT.call_once(|| {
            let filter = EnvFilter::try_from_default_env()
                .or_else(|_| EnvFilter::try_new("off"))
                .unwrap();

            fmt()
                .with_target(false)
                .with_test_writer()
                .with_env_filter(filter)
                .init();
        });
    }
}
