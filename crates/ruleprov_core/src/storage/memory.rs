//! In-memory storage backed by a sharded concurrent map.
use std::{collections::HashMap, future::Future, sync::Arc};

use dashmap::DashMap;
#[cfg(feature = "ruleprov_tracing")]
use tracing::debug;

use crate::{
    provisioning::{
        error::ProvisioningError,
        infrastructure::naming::{OrgId, Provenance, ProvenanceKey, ResourceKind},
    },
    storage::ProvenanceStorage,
};

/// Records keyed by the full triple, so two organizations never share an entry.
#[derive(Debug, Default, Clone)]
pub struct MemoryStorage {
    records: Arc<DashMap<ProvenanceKey, Provenance>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records, across all organizations.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl ProvenanceStorage for MemoryStorage {
    fn read(
        &self,
        key: ProvenanceKey,
    ) -> impl Future<Output = Result<Option<Provenance>, ProvisioningError>> + Send {
        let records = self.records.clone();
        async move { Ok(records.get(&key).map(|entry| *entry.value())) }
    }

    fn upsert(
        &self,
        key: ProvenanceKey,
        provenance: Provenance,
    ) -> impl Future<Output = Result<(), ProvisioningError>> + Send {
        let records = self.records.clone();
        async move {
            let _previous = records.insert(key, provenance);
            #[cfg(feature = "ruleprov_tracing")]
            debug!("[memory] upsert replaced {:?} with {:?}", _previous, provenance);
            Ok(())
        }
    }

    fn remove(
        &self,
        key: ProvenanceKey,
    ) -> impl Future<Output = Result<(), ProvisioningError>> + Send {
        let records = self.records.clone();
        async move {
            records.remove(&key);
            Ok(())
        }
    }

    fn list(
        &self,
        org_id: OrgId,
        kind: ResourceKind,
    ) -> impl Future<Output = Result<HashMap<String, Provenance>, ProvisioningError>> + Send {
        let records = self.records.clone();
        async move {
            Ok(records
                .iter()
                .filter(|entry| entry.key().org_id() == org_id && entry.key().kind() == kind)
                .map(|entry| (entry.key().uid().to_string(), *entry.value()))
                .collect())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule_key(org_id: i64, uid: &str) -> ProvenanceKey {
        ProvenanceKey::new(OrgId::new(org_id), ResourceKind::AlertRule, uid)
    }

    #[tokio::test]
    async fn unit_memory_storage_upsert_overwrites() {
        let storage = MemoryStorage::new();
        assert_eq!(storage.read(rule_key(1, "a")).await, Ok(None));

        storage.upsert(rule_key(1, "a"), Provenance::File).await.unwrap();
        storage.upsert(rule_key(1, "a"), Provenance::Api).await.unwrap();

        assert_eq!(storage.read(rule_key(1, "a")).await, Ok(Some(Provenance::Api)));
        assert_eq!(storage.len(), 1);
    }

    #[tokio::test]
    async fn unit_memory_storage_remove_absent() {
        let storage = MemoryStorage::new();
        storage.remove(rule_key(1, "a")).await.unwrap();
        storage.upsert(rule_key(1, "a"), Provenance::File).await.unwrap();
        storage.remove(rule_key(1, "a")).await.unwrap();
        storage.remove(rule_key(1, "a")).await.unwrap();
        assert!(storage.is_empty());
    }

    #[tokio::test]
    async fn unit_memory_storage_list_scoped() {
        let storage = MemoryStorage::new();
        storage.upsert(rule_key(1, "a"), Provenance::File).await.unwrap();
        storage.upsert(rule_key(1, "b"), Provenance::Api).await.unwrap();
        storage.upsert(rule_key(2, "a"), Provenance::Api).await.unwrap();
        let template = ProvenanceKey::new(OrgId::new(1), ResourceKind::Template, "c");
        storage.upsert(template, Provenance::File).await.unwrap();

        assert_eq!(
            storage.list(OrgId::new(1), ResourceKind::AlertRule).await.unwrap(),
            HashMap::from([
                ("a".to_string(), Provenance::File),
                ("b".to_string(), Provenance::Api)
            ])
        );
        assert_eq!(
            storage.list(OrgId::new(2), ResourceKind::AlertRule).await.unwrap(),
            HashMap::from([("a".to_string(), Provenance::Api)])
        );
        assert!(storage.list(OrgId::new(3), ResourceKind::AlertRule).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn unit_memory_storage_writes_on_await() {
        let storage = MemoryStorage::new();
        drop(storage.upsert(rule_key(1, "a"), Provenance::File));
        assert!(storage.is_empty());

        storage.upsert(rule_key(1, "a"), Provenance::File).await.unwrap();
        drop(storage.remove(rule_key(1, "a")));
        assert_eq!(storage.read(rule_key(1, "a")).await, Ok(Some(Provenance::File)));
    }
}
