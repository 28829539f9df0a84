use thiserror::Error;

use crate::provisioning::infrastructure::naming::Provenance;

#[derive(Debug, Error, PartialEq)]
pub enum ProvisioningError {
    #[error("Provisioning error, internal ruleprov API error")]
    InternalError,

    #[error("Provisioning error, invalid provenance value ({0:?})")]
    InvalidProvenanceValue(String),

    #[error("Provisioning error, invalid resource kind ({0:?})")]
    InvalidResourceKind(String),

    #[error("Provisioning error, invalid record key (org_id: {org_id}, uid: {uid:?})")]
    InvalidRecordKey { org_id: i64, uid: String },

    #[error("Provisioning error, storage unavailable ({0})")]
    StorageUnavailable(String),

    #[error("Provisioning error, corrupt record ({0})")]
    CorruptRecord(String),

    #[error("Provisioning error, cannot change provenance from '{stored}' to '{incoming}'")]
    ProvenanceConflict { stored: Provenance, incoming: Provenance },
}

impl From<rusqlite::Error> for ProvisioningError {
    fn from(error: rusqlite::Error) -> Self {
        ProvisioningError::StorageUnavailable(error.to_string())
    }
}

impl From<tokio::task::JoinError> for ProvisioningError {
    fn from(error: tokio::task::JoinError) -> Self {
        ProvisioningError::StorageUnavailable(error.to_string())
    }
}
