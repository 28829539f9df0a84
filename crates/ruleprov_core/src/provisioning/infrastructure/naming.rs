//! Record naming and identification.
//!
//! This module defines how a provenance record is addressed. Every record lives
//! under a triple made of the owning organization, the kind of resource and the
//! resource UID. UIDs are only unique inside one organization and one kind, so
//! none of the three parts is optional.
//!
//! ## Key Construction
//!
//! [`ProvenanceKey`] has no `Default` implementation and its only constructors
//! take an [`OrgId`]. A call site that has a resource in hand but no
//! organization cannot build a key, which is what keeps reads and writes inside
//! one tenant.
//!
//! ## Resources
//!
//! Any type that can carry a provenance implements [`Provisionable`]. The store
//! only needs the kind and the UID; it never checks that the resource exists.

use std::{fmt::Display, str::FromStr};

use crate::provisioning::error::ProvisioningError;

/// Organization (tenant) identifier.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct OrgId(i64);

impl OrgId {
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    pub fn get(&self) -> i64 {
        self.0
    }
}

impl From<i64> for OrgId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl Display for OrgId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Kind of provisionable resource owning a UID namespace.
///
/// Two resources of different kinds may share a UID inside the same
/// organization without their provenance records colliding.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum ResourceKind {
    AlertRule,
    ContactPoint,
    NotificationPolicy,
    MuteTiming,
    Template,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 5] = [
        ResourceKind::AlertRule,
        ResourceKind::ContactPoint,
        ResourceKind::NotificationPolicy,
        ResourceKind::MuteTiming,
        ResourceKind::Template,
    ];

    /// Code stored in the `record_type` column.
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::AlertRule => "alert-rule",
            ResourceKind::ContactPoint => "contact-point",
            ResourceKind::NotificationPolicy => "notification-policy",
            ResourceKind::MuteTiming => "mute-timing",
            ResourceKind::Template => "template",
        }
    }
}

impl Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceKind {
    type Err = ProvisioningError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ResourceKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| ProvisioningError::InvalidResourceKind(s.to_string()))
    }
}

/// Channel that last wrote a resource's configuration.
///
/// The set is closed. New channels get new variants and new codes; existing
/// codes are never reused for a different meaning.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Default)]
pub enum Provenance {
    /// Not provisioned, the resource is freely editable
    #[default]
    None,
    /// Written through the provisioning API
    Api,
    /// Written by a file provisioning job
    File,
}

impl Provenance {
    /// Code stored in the `provenance` column.
    pub fn as_str(&self) -> &'static str {
        match self {
            Provenance::None => "",
            Provenance::Api => "api",
            Provenance::File => "file",
        }
    }

    /// Decodes a persisted code, as opposed to operator input.
    pub fn from_code(code: &str) -> Result<Self, ProvisioningError> {
        match code {
            "" => Ok(Provenance::None),
            "api" => Ok(Provenance::Api),
            "file" => Ok(Provenance::File),
            other => Err(ProvisioningError::CorruptRecord(format!(
                "unknown provenance code {other:?}"
            ))),
        }
    }
}

impl Display for Provenance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Provenance::None => f.write_str("none"),
            other => f.write_str(other.as_str()),
        }
    }
}

impl FromStr for Provenance {
    type Err = ProvisioningError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "" | "none" => Ok(Provenance::None),
            "api" => Ok(Provenance::Api),
            "file" => Ok(Provenance::File),
            other => Err(ProvisioningError::InvalidProvenanceValue(other.to_string())),
        }
    }
}

/// A resource that can carry a provenance record.
pub trait Provisionable {
    fn resource_kind(&self) -> ResourceKind;
    fn resource_uid(&self) -> &str;
}

/// Kind-qualified reference to a resource, without its organization.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct ResourceRef {
    pub kind: ResourceKind,
    pub uid: String,
}

impl ResourceRef {
    pub fn new(kind: ResourceKind, uid: impl Into<String>) -> Self {
        Self { kind, uid: uid.into() }
    }

    pub fn alert_rule(uid: impl Into<String>) -> Self {
        Self::new(ResourceKind::AlertRule, uid)
    }
}

impl Provisionable for ResourceRef {
    fn resource_kind(&self) -> ResourceKind {
        self.kind
    }

    fn resource_uid(&self) -> &str {
        &self.uid
    }
}

/// Identity of an alert rule as handed over by the rule-management service.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct AlertRule {
    pub org_id: OrgId,
    pub uid: String,
}

impl AlertRule {
    pub fn new(org_id: i64, uid: impl Into<String>) -> Self {
        Self { org_id: OrgId::new(org_id), uid: uid.into() }
    }

    /// Key of this rule's provenance record.
    pub fn key(&self) -> ProvenanceKey {
        ProvenanceKey::for_resource(self.org_id, self)
    }
}

impl Provisionable for AlertRule {
    fn resource_kind(&self) -> ResourceKind {
        ResourceKind::AlertRule
    }

    fn resource_uid(&self) -> &str {
        &self.uid
    }
}

/// Address of exactly one provenance record.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct ProvenanceKey {
    org_id: OrgId,
    kind: ResourceKind,
    uid: String,
}

impl ProvenanceKey {
    pub fn new(org_id: OrgId, kind: ResourceKind, uid: impl Into<String>) -> Self {
        Self { org_id, kind, uid: uid.into() }
    }

    pub fn for_resource<R: Provisionable + ?Sized>(org_id: OrgId, resource: &R) -> Self {
        Self::new(org_id, resource.resource_kind(), resource.resource_uid())
    }

    pub fn org_id(&self) -> OrgId {
        self.org_id
    }

    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    pub fn uid(&self) -> &str {
        &self.uid
    }
}

impl Display for ProvenanceKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "org:{}/{}/{}", self.org_id, self.kind, self.uid)
    }
}
