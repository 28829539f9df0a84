//! Record key validation.
//!
//! Keys are validated before a request reaches the storage backend, so an
//! obviously broken key never creates a row. Validation is enabled by default
//! and can be switched off with `ProvenanceService::with_key_validation(false)`
//! for deployments that address the default organization `0`.
//!
//! ## Validation Rules
//!
//! - **Organization IDs**: must be strictly positive
//! - **UIDs**: must be non-empty

use crate::provisioning::{
    api::ProvenanceRequest,
    error::ProvisioningError,
    infrastructure::naming::{OrgId, ProvenanceKey},
};

#[derive(Debug, Default, Clone)]
pub struct KeyValidator;

impl KeyValidator {
    pub fn is_valid_org(&self, org_id: OrgId) -> bool {
        org_id.get() > 0
    }

    pub fn is_valid_uid(&self, uid: &str) -> bool {
        !uid.is_empty()
    }

    fn check_parts(&self, org_id: OrgId, uid: &str) -> Result<(), ProvisioningError> {
        if self.is_valid_org(org_id) && self.is_valid_uid(uid) {
            Ok(())
        } else {
            Err(ProvisioningError::InvalidRecordKey { org_id: org_id.get(), uid: uid.to_string() })
        }
    }

    pub fn check_key(&self, key: &ProvenanceKey) -> Result<(), ProvisioningError> {
        self.check_parts(key.org_id(), key.uid())
    }

    /// Validates every key a request names.
    pub fn check(&self, request: &ProvenanceRequest) -> Result<(), ProvisioningError> {
        match request {
            ProvenanceRequest::GetProvenance(key) | ProvenanceRequest::DeleteProvenance(key) => {
                self.check_key(key)
            }
            ProvenanceRequest::SetProvenance { org_id, resource, .. } => {
                self.check_parts(*org_id, &resource.uid)
            }
            ProvenanceRequest::GetProvenances { org_id, .. } => {
                if self.is_valid_org(*org_id) {
                    Ok(())
                } else {
                    Err(ProvisioningError::InvalidRecordKey {
                        org_id: org_id.get(),
                        uid: String::new(),
                    })
                }
            }
        }
    }
}
