//! Provenance store service.
//!
//! Keyed get/set/delete of provenance tags over a [`ProvenanceStorage`] backend,
//! exposed as a tower::Service. The organization is part of every key, so a
//! record written for one tenant is never returned to another.
use std::{pin::Pin, task::Poll};

use tower::Service;
#[cfg(feature = "ruleprov_tracing")]
use tracing::info;

use crate::{
    provisioning::{
        api::types::{ProvenanceRequest, ProvenanceResponse},
        error::ProvisioningError,
        infrastructure::{
            naming::{OrgId, Provenance, ProvenanceKey, Provisionable, ResourceKind},
            validation::KeyValidator,
        },
    },
    storage::{MemoryStorage, ProvenanceStorage},
};

/// Provenance store over a storage backend.
///
/// Clones share the same backend handle. Records are only reachable through
/// [`Service::call`], which validates every key first.
#[derive(Debug, Clone)]
pub struct ProvenanceService<S = MemoryStorage> {
    storage: S,
    validator: Option<KeyValidator>,
}

impl Default for ProvenanceService<MemoryStorage> {
    fn default() -> Self {
        Self::new(MemoryStorage::default())
    }
}

impl<S: ProvenanceStorage> ProvenanceService<S> {
    /// Creates a store over `storage`, with key validation enabled.
    pub fn new(storage: S) -> Self {
        Self { storage, validator: Some(KeyValidator) }
    }

    /// Enable or disable key validation.
    pub fn with_key_validation(mut self, enable: bool) -> Self {
        self.validator = enable.then_some(KeyValidator);
        self
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    fn validate(&self, request: &ProvenanceRequest) -> Result<(), ProvisioningError> {
        match &self.validator {
            Some(validator) => validator.check(request),
            None => Ok(()),
        }
    }

    /// Get the provenance of a record
    ///
    /// Returns `Provenance::None` if no record exists.
    async fn get_provenance(&self, key: ProvenanceKey) -> Result<Provenance, ProvisioningError> {
        Ok(self.storage.read(key).await?.unwrap_or_default())
    }

    /// Set the provenance of a resource, creating or overwriting its record
    async fn set_provenance<R: Provisionable + ?Sized>(
        &self,
        org_id: OrgId,
        resource: &R,
        provenance: Provenance,
    ) -> Result<(), ProvisioningError> {
        self.storage.upsert(ProvenanceKey::for_resource(org_id, resource), provenance).await
    }

    /// Delete the record of a resource, absent records are ignored
    async fn delete_provenance(&self, key: ProvenanceKey) -> Result<(), ProvisioningError> {
        self.storage.remove(key).await
    }

    /// List the provenances of one kind in one organization
    async fn get_provenances(
        &self,
        org_id: OrgId,
        kind: ResourceKind,
    ) -> Result<std::collections::HashMap<String, Provenance>, ProvisioningError> {
        self.storage.list(org_id, kind).await
    }
}

impl<S: ProvenanceStorage> Service<ProvenanceRequest> for ProvenanceService<S> {
    type Response = ProvenanceResponse;
    type Error = ProvisioningError;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, _: &mut std::task::Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, request: ProvenanceRequest) -> Self::Future {
        let this = self.clone();
        Box::pin(async move {
            this.validate(&request)?;
            match request {
                ProvenanceRequest::GetProvenance(key) => {
                    #[cfg(feature = "ruleprov_tracing")]
                    info!("[provenance] GetProvenance: {}", key);
                    this.get_provenance(key).await.map(ProvenanceResponse::Provenance)
                }
                ProvenanceRequest::GetProvenances { org_id, kind } => {
                    #[cfg(feature = "ruleprov_tracing")]
                    info!("[provenance] GetProvenances: org: {}, kind: {}", org_id, kind);
                    this.get_provenances(org_id, kind).await.map(ProvenanceResponse::Provenances)
                }
                ProvenanceRequest::SetProvenance { org_id, resource, provenance } => {
                    #[cfg(feature = "ruleprov_tracing")]
                    info!(
                        "[provenance] SetProvenance: org: {}, resource: {:?}, provenance: {}",
                        org_id, resource, provenance
                    );
                    this.set_provenance(org_id, &resource, provenance).await?;
                    Ok(ProvenanceResponse::Ack)
                }
                ProvenanceRequest::DeleteProvenance(key) => {
                    #[cfg(feature = "ruleprov_tracing")]
                    info!("[provenance] DeleteProvenance: {}", key);
                    this.delete_provenance(key).await?;
                    Ok(ProvenanceResponse::Ack)
                }
            }
        })
    }
}
