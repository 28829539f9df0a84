//! Persistence backends of the provenance store.
//!
//! A backend only has to offer four single-record operations keyed by the full
//! record triple. Each call acquires whatever handle it needs and releases it
//! before returning, so no backend keeps a lock or a connection across two
//! logical operations.

use std::{collections::HashMap, future::Future};

use crate::provisioning::{
    error::ProvisioningError,
    infrastructure::naming::{OrgId, Provenance, ProvenanceKey, ResourceKind},
};

pub mod memory;
pub mod sqlite;

pub use memory::MemoryStorage;
pub use sqlite::SqliteStorage;

/// Storage contract of the provenance store.
///
/// Implementations must make `upsert` atomic per key: concurrent upserts on the
/// same key leave exactly one of the written values, never a mix.
pub trait ProvenanceStorage: Clone + Send + Sync + 'static {
    /// Reads one record, `None` when absent.
    fn read(
        &self,
        key: ProvenanceKey,
    ) -> impl Future<Output = Result<Option<Provenance>, ProvisioningError>> + Send;

    /// Inserts the record or overwrites its provenance.
    fn upsert(
        &self,
        key: ProvenanceKey,
        provenance: Provenance,
    ) -> impl Future<Output = Result<(), ProvisioningError>> + Send;

    /// Removes the record if present.
    fn remove(&self, key: ProvenanceKey)
    -> impl Future<Output = Result<(), ProvisioningError>> + Send;

    /// Lists the records of one kind in one organization, keyed by UID.
    fn list(
        &self,
        org_id: OrgId,
        kind: ResourceKind,
    ) -> impl Future<Output = Result<HashMap<String, Provenance>, ProvisioningError>> + Send;
}
