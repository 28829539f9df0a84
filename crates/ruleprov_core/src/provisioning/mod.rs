//! Provisioning module.
//!
//! This module provides the organization-scoped provenance store of
//! provisionable alerting resources, and the rule provisioning API built on it.
//!
//! ## Core Architecture
//!
//! ### Provenance store
//! A keyed mapping from `(organization, kind, uid)` to a [`Provenance`] tag with
//! get, upsert, delete and per-kind listing. A missing record reads as
//! `Provenance::None`. The store applies no transition rules.
//!
//! ### Rule provisioning API
//! The interface of the rule-management service: reads the provenance of a
//! rule, applies the edit policy and records accepted edits and deletions.
//!
//! ## Service Components
//!
//! - **Provenance**: the store service, generic over its storage backend
//! - **Policy**: the edit check (`check_edit`)
//! - **Validation**: rejects keys with a non-positive organization or an empty UID
//! - **Naming**: record keys, kinds and provenance tags
//!
//! ## Default Service Stacks
//!
//! - `ProvenanceDefaultStack`: store over the in-memory backend
//! - `ProvenanceSqliteStack`: store over an SQLite database file
//! - `RulesApiDefaultStack` / `RulesApiSqliteStack`: rule API over either store
//!
//! ## Initialization Helpers
//!
//! - `init_provisioning()`: in-memory stack
//! - `init_provisioning_with_sqlite()`: SQLite stack
//!
//! [`Provenance`]: infrastructure::naming::Provenance
use std::{path::Path, time::Duration};

pub mod api;
pub mod error;
pub mod infrastructure;
pub mod services;

// Re-export the naming and validation primitives at the module root
pub use infrastructure::{naming, validation};

use crate::storage::{MemoryStorage, SqliteStorage, sqlite::DEFAULT_BUSY_TIMEOUT};

/// Provenance store over the in-memory backend.
pub type ProvenanceDefaultStack = services::provenance::ProvenanceService<MemoryStorage>;

/// Provenance store over an SQLite database file.
pub type ProvenanceSqliteStack = services::provenance::ProvenanceService<SqliteStorage>;

/// Rule provisioning API over the in-memory store.
pub type RulesApiDefaultStack = api::rules::RuleProvisioningService<ProvenanceDefaultStack>;

/// Rule provisioning API over the SQLite store.
pub type RulesApiSqliteStack = api::rules::RuleProvisioningService<ProvenanceSqliteStack>;

/// Store configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Reject keys with a non-positive organization or an empty UID
    pub key_validation: bool,
    /// How long an SQLite call waits on a locked database
    pub busy_timeout: Duration,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self { key_validation: true, busy_timeout: DEFAULT_BUSY_TIMEOUT }
    }
}

impl StoreConfig {
    pub fn with_key_validation(mut self, enable: bool) -> Self {
        self.key_validation = enable;
        self
    }

    pub fn with_busy_timeout(mut self, busy_timeout: Duration) -> Self {
        self.busy_timeout = busy_timeout;
        self
    }
}

/// Initialize an in-memory provisioning stack.
///
/// # Returns
/// A tuple containing (provenance store, rule provisioning API) sharing the same records
pub fn init_provisioning(config: &StoreConfig) -> (ProvenanceDefaultStack, RulesApiDefaultStack) {
    let provenance = services::provenance::ProvenanceService::new(MemoryStorage::default())
        .with_key_validation(config.key_validation);
    let rules = api::rules::RuleProvisioningService::new(provenance.clone());
    (provenance, rules)
}

/// Initialize a provisioning stack persisted in the SQLite database at `path`.
///
/// The database file and its schema are created if missing.
///
/// # Returns
/// A tuple containing (provenance store, rule provisioning API) sharing the same database
pub fn init_provisioning_with_sqlite(
    path: impl AsRef<Path>,
    config: &StoreConfig,
) -> Result<(ProvenanceSqliteStack, RulesApiSqliteStack), error::ProvisioningError> {
    let storage = SqliteStorage::open(path, config.busy_timeout)?;
    let provenance = services::provenance::ProvenanceService::new(storage)
        .with_key_validation(config.key_validation);
    let rules = api::rules::RuleProvisioningService::new(provenance.clone());
    Ok((provenance, rules))
}
