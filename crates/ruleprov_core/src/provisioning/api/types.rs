//! Provisioning API type definitions.
//!
//! This module defines the request and response types of the provisioning store.
//! Two layers talk through them:
//!
//! ## Rule provisioning API
//! Used by the rule-management service. It reads the provenance of a rule before
//! an edit, records the channel of every accepted edit and clears the record when
//! the rule is deleted.
//!
//! ## Provenance store API
//! The raw keyed store underneath: get, upsert, delete and per-kind listing, all
//! scoped by organization.

use std::collections::HashMap;

use crate::provisioning::infrastructure::naming::{
    AlertRule, OrgId, Provenance, ProvenanceKey, Provisionable, ResourceKind, ResourceRef,
};

/// Provenance store request types.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum ProvenanceRequest {
    /// Read the provenance of one record.
    ///
    /// A missing record answers `Provenance::None`, never an error.
    GetProvenance(ProvenanceKey),

    /// Read every recorded provenance of one kind inside one organization.
    GetProvenances {
        /// Organization to list
        org_id: OrgId,
        /// Kind of resource to list
        kind: ResourceKind,
    },

    /// Insert or overwrite the provenance of a resource.
    SetProvenance {
        /// Organization owning the resource
        org_id: OrgId,
        /// Kind-qualified resource reference
        resource: ResourceRef,
        /// New provenance tag
        provenance: Provenance,
    },

    /// Remove the record of a resource.
    ///
    /// Removing a record that does not exist succeeds.
    DeleteProvenance(ProvenanceKey),
}

impl ProvenanceRequest {
    /// Builds a `SetProvenance` request from any provisionable resource.
    pub fn set<R: Provisionable + ?Sized>(
        org_id: OrgId,
        resource: &R,
        provenance: Provenance,
    ) -> Self {
        ProvenanceRequest::SetProvenance {
            org_id,
            resource: ResourceRef::new(resource.resource_kind(), resource.resource_uid()),
            provenance,
        }
    }
}

/// Provenance store response types.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum ProvenanceResponse {
    /// Provenance of a single record.
    Provenance(Provenance),

    /// Provenances keyed by resource UID.
    Provenances(HashMap<String, Provenance>),

    /// Acknowledgment of a write or a removal.
    Ack,
}

/// Rule provisioning request types.
///
/// Every variant carries the rule identity, organization included, as handed
/// over by the rule-management service.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum RuleRequest {
    /// Read the current provenance of a rule.
    GetProvenance(AlertRule),

    /// Check whether an edit arriving through `incoming` may proceed.
    AuthorizeEdit {
        rule: AlertRule,
        /// Channel the edit arrives through
        incoming: Provenance,
        /// Override the provenance protection
        force: bool,
    },

    /// Authorize an edit, then record `incoming` as the rule's provenance.
    ///
    /// The check and the write are separate store calls. Two edits of the same
    /// rule racing from `Provenance::None` through different channels can both
    /// pass; callers must serialize edits per rule.
    RecordEdit { rule: AlertRule, incoming: Provenance, force: bool },

    /// Authorize the deletion of a rule, then drop its provenance record.
    ///
    /// Not atomic either, see `RecordEdit`.
    RecordDeletion { rule: AlertRule, incoming: Provenance, force: bool },
}

/// Rule provisioning response types.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum RuleResponse {
    /// Current provenance of the rule.
    Provenance(Provenance),

    /// The edit may proceed.
    Authorized,

    /// The edit or deletion has been recorded.
    Ack,
}
