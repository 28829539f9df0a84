

use std::collections::HashMap;

use fixtures::RuleFixture;
use tower::Service;

use crate::provisioning::{
    StoreConfig,
    api::{ProvenanceRequest, RuleRequest, RuleResponse},
    error::ProvisioningError,
    init_provisioning,
    naming::{OrgId, Provenance, ResourceKind},
};

#[tokio::test]
async fn integration_default_provenance_is_none() {
    #[cfg(feature = "ruleprov_tracing")]
    crate::ruleprov_tracing::init();
    let (mut store, _) = init_provisioning(&StoreConfig::default());

    let rule = RuleFixture::new(1, "asdf");
    assert_provenance!(store, rule.key(), Provenance::None);
}

#[tokio::test]
async fn integration_store_returns_saved_provenance() {
    #[cfg(feature = "ruleprov_tracing")]
    crate::ruleprov_tracing::init();
    let (mut store, _) = init_provisioning(&StoreConfig::default());

    let rule = RuleFixture::new(1, "123");
    set_provenance!(store, rule, Provenance::File);
    assert_provenance!(store, rule.key(), Provenance::File);
}

#[tokio::test]
async fn integration_last_write_wins() {
    #[cfg(feature = "ruleprov_tracing")]
    crate::ruleprov_tracing::init();
    let (mut store, _) = init_provisioning(&StoreConfig::default());

    let rule = RuleFixture::new(1, "123");
    set_provenance!(store, rule, Provenance::File);
    set_provenance!(store, rule, Provenance::Api);
    assert_provenance!(store, rule.key(), Provenance::Api);
    set_provenance!(store, rule, Provenance::None);
    assert_provenance!(store, rule.key(), Provenance::None);
    assert_eq!(store.storage().len(), 1);
}

#[tokio::test]
async fn integration_delete_is_idempotent() {
    #[cfg(feature = "ruleprov_tracing")]
    crate::ruleprov_tracing::init();
    let (mut store, _) = init_provisioning(&StoreConfig::default());

    let rule = RuleFixture::new(1, "gone");
    delete_provenance!(store, rule.key());
    set_provenance!(store, rule, Provenance::File);
    delete_provenance!(store, rule.key());
    delete_provenance!(store, rule.key());
    assert_provenance!(store, rule.key(), Provenance::None);
    assert!(store.storage().is_empty());
}

#[tokio::test]
async fn integration_default_org_needs_validation_disabled() {
    #[cfg(feature = "ruleprov_tracing")]
    crate::ruleprov_tracing::init();
    let (mut strict, _) = init_provisioning(&StoreConfig::default());
    let (mut relaxed, _) = init_provisioning(&StoreConfig::default().with_key_validation(false));

    let rule = RuleFixture::new(0, "asdf");
    assert_eq!(
        strict.call(ProvenanceRequest::GetProvenance(rule.key())).await.unwrap_err(),
        ProvisioningError::InvalidRecordKey { org_id: 0, uid: "asdf".to_string() }
    );
    assert_provenance!(relaxed, rule.key(), Provenance::None);
    set_provenance!(relaxed, rule, Provenance::File);
    assert_provenance!(relaxed, rule.key(), Provenance::File);
}

#[tokio::test]
async fn integration_rules_api_shares_store() {
    #[cfg(feature = "ruleprov_tracing")]
    crate::ruleprov_tracing::init();
    let (mut store, mut rules) = init_provisioning(&StoreConfig::default());

    // A file provisioning job creates two rules
    let cpu = RuleFixture::new(1, "cpu");
    let disk = RuleFixture::new(1, "disk");
    for fixture in [&cpu, &disk] {
        assert_eq!(
            rules
                .call(RuleRequest::RecordEdit {
                    rule: fixture.rule(),
                    incoming: Provenance::File,
                    force: false,
                })
                .await
                .unwrap(),
            RuleResponse::Ack
        );
    }

    // An operator edits one of them through the API without force
    assert!(matches!(
        rules
            .call(RuleRequest::AuthorizeEdit {
                rule: cpu.rule(),
                incoming: Provenance::Api,
                force: false
            })
            .await,
        Err(ProvisioningError::ProvenanceConflict { .. })
    ));

    // and adopts the other one with force
    rules
        .call(RuleRequest::RecordEdit { rule: disk.rule(), incoming: Provenance::Api, force: true })
        .await
        .unwrap();

    assert_provenances!(
        store,
        OrgId::new(1),
        ResourceKind::AlertRule,
        HashMap::from([
            ("cpu".to_string(), Provenance::File),
            ("disk".to_string(), Provenance::Api)
        ])
    );

    // The store itself does not enforce the policy
    set_provenance!(store, cpu, Provenance::None);
    assert_eq!(
        rules
            .call(RuleRequest::AuthorizeEdit {
                rule: cpu.rule(),
                incoming: Provenance::Api,
                force: false
            })
            .await
            .unwrap(),
        RuleResponse::Authorized
    );
}
