//! Rule provisioning API service implementation.
//!
//! This is the surface the rule-management service talks to. It wraps the
//! provenance store with the edit policy:
//!
//! - before an edit, the stored provenance is read and checked against the
//!   channel the edit arrives through
//! - after an accepted edit, that channel becomes the rule's provenance
//! - on deletion, the rule's record is dropped so a rule re-created later with
//!   the same UID starts unprovisioned
//!
//! The check and the write are two store calls. Concurrent edits of the same
//! rule are serialized by the rule-management service, not here.

use std::{future::Future, pin::Pin, task::Poll};

use tower::Service;
#[cfg(feature = "ruleprov_tracing")]
use tracing::info;

use crate::provisioning::{
    api::types::{ProvenanceRequest, ProvenanceResponse, RuleRequest, RuleResponse},
    error::ProvisioningError,
    infrastructure::naming::{AlertRule, Provenance},
    services::policy::check_edit,
};

/// Rule provisioning API service.
#[derive(Debug, Clone)]
pub struct RuleProvisioningService<P> {
    /// Provenance store
    provenance: P,
}

impl<P> RuleProvisioningService<P> {
    pub fn new(provenance: P) -> Self {
        Self { provenance }
    }
}

async fn stored_provenance<P>(
    provenance: &mut P,
    rule: &AlertRule,
) -> Result<Provenance, ProvisioningError>
where
    P: Service<ProvenanceRequest, Response = ProvenanceResponse, Error = ProvisioningError>,
{
    match provenance.call(ProvenanceRequest::GetProvenance(rule.key())).await? {
        ProvenanceResponse::Provenance(stored) => Ok(stored),
        _ => Err(ProvisioningError::InternalError),
    }
}

async fn authorize<P>(
    provenance: &mut P,
    rule: &AlertRule,
    incoming: Provenance,
    force: bool,
) -> Result<(), ProvisioningError>
where
    P: Service<ProvenanceRequest, Response = ProvenanceResponse, Error = ProvisioningError>,
{
    let stored = stored_provenance(provenance, rule).await?;
    check_edit(stored, incoming, force)
}

impl<P> Service<RuleRequest> for RuleProvisioningService<P>
where
    P: Service<ProvenanceRequest, Response = ProvenanceResponse, Error = ProvisioningError>
        + Clone
        + Send
        + 'static,
    P::Future: Send,
{
    type Response = RuleResponse;
    type Error = ProvisioningError;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, _: &mut std::task::Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, request: RuleRequest) -> Self::Future {
        let mut provenance = self.provenance.clone();
        Box::pin(async move {
            match request {
                RuleRequest::GetProvenance(rule) => {
                    #[cfg(feature = "ruleprov_tracing")]
                    info!("[rules] GetProvenance: {:?}", rule);
                    stored_provenance(&mut provenance, &rule).await.map(RuleResponse::Provenance)
                }
                RuleRequest::AuthorizeEdit { rule, incoming, force } => {
                    #[cfg(feature = "ruleprov_tracing")]
                    info!(
                        "[rules] AuthorizeEdit: rule: {:?}, incoming: {}, force: {}",
                        rule, incoming, force
                    );
                    authorize(&mut provenance, &rule, incoming, force).await?;
                    Ok(RuleResponse::Authorized)
                }
                RuleRequest::RecordEdit { rule, incoming, force } => {
                    #[cfg(feature = "ruleprov_tracing")]
                    info!(
                        "[rules] RecordEdit: rule: {:?}, incoming: {}, force: {}",
                        rule, incoming, force
                    );
                    authorize(&mut provenance, &rule, incoming, force).await?;
                    match provenance
                        .call(ProvenanceRequest::set(rule.org_id, &rule, incoming))
                        .await?
                    {
                        ProvenanceResponse::Ack => Ok(RuleResponse::Ack),
                        _ => Err(ProvisioningError::InternalError),
                    }
                }
                RuleRequest::RecordDeletion { rule, incoming, force } => {
                    #[cfg(feature = "ruleprov_tracing")]
                    info!(
                        "[rules] RecordDeletion: rule: {:?}, incoming: {}, force: {}",
                        rule, incoming, force
                    );
                    authorize(&mut provenance, &rule, incoming, force).await?;
                    match provenance.call(ProvenanceRequest::DeleteProvenance(rule.key())).await? {
                        ProvenanceResponse::Ack => Ok(RuleResponse::Ack),
                        _ => Err(ProvisioningError::InternalError),
                    }
                }
            }
        })
    }
}
