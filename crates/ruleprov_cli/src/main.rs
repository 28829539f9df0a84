//! CLI entry point for ruleprov
//!
//! Reads and edits the provenance records of provisioned alerting resources
//! stored in an SQLite database.
//!
//! # Examples
//!
//! ```bash
//! ruleprov --db grafana.db set --org 1 123 file
//! ruleprov --db grafana.db get --org 1 123
//! ruleprov --db grafana.db authorize --org 1 123 api
//! ruleprov --db grafana.db list --org 1 --kind contact-point
//! ```

use std::{path::PathBuf, time::Duration};

use anyhow::bail;
use clap::{Parser, Subcommand};
use ruleprov_core::provisioning::{
    StoreConfig,
    api::{ProvenanceRequest, ProvenanceResponse, RuleRequest, RuleResponse},
    error::ProvisioningError,
    init_provisioning_with_sqlite,
    naming::{AlertRule, OrgId, Provenance, ProvenanceKey, ResourceKind, ResourceRef},
};
use tower::Service;
use tracing::debug;
use tracing_subscriber::{EnvFilter, fmt};

#[derive(Parser, Debug)]
#[command(name = "ruleprov")]
#[command(about = "Inspect and edit alerting resource provenance", long_about = None)]
struct Args {
    /// Path to the SQLite provenance database, created if missing
    #[arg(short, long, env = "RULEPROV_DB", default_value = "ruleprov.db")]
    db: PathBuf,

    /// How long a database call waits on a locked database, in milliseconds
    #[arg(long, env = "RULEPROV_BUSY_TIMEOUT_MS", default_value_t = 5000)]
    busy_timeout_ms: u64,

    /// Accept the default organization 0 and empty UIDs
    #[arg(long, default_value_t = false)]
    disable_key_validation: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the provenance of a resource
    Get {
        #[arg(long)]
        org: i64,
        #[arg(long, default_value = "alert-rule")]
        kind: ResourceKind,
        uid: String,
    },
    /// Overwrite the provenance of a resource, without any edit check
    Set {
        #[arg(long)]
        org: i64,
        #[arg(long, default_value = "alert-rule")]
        kind: ResourceKind,
        uid: String,
        /// One of none, api, file
        provenance: Provenance,
    },
    /// Drop the provenance record of a resource
    Delete {
        #[arg(long)]
        org: i64,
        #[arg(long, default_value = "alert-rule")]
        kind: ResourceKind,
        uid: String,
    },
    /// List the provenances of one kind in an organization
    List {
        #[arg(long)]
        org: i64,
        #[arg(long, default_value = "alert-rule")]
        kind: ResourceKind,
    },
    /// Check whether an alert rule edit through a channel would be accepted
    Authorize {
        #[arg(long)]
        org: i64,
        uid: String,
        provenance: Provenance,
        #[arg(long, default_value_t = false)]
        force: bool,
    },
    /// Record an alert rule edit through a channel, if accepted
    Edit {
        #[arg(long)]
        org: i64,
        uid: String,
        provenance: Provenance,
        #[arg(long, default_value_t = false)]
        force: bool,
    },
}

#[cfg(not(tarpaulin_include))]
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new("warn"))?;
    fmt().with_writer(std::io::stderr).with_target(false).with_env_filter(filter).init();

    let args = Args::parse();
    println!("{}", run(args).await?);
    Ok(())
}

async fn run(args: Args) -> anyhow::Result<String> {
    let config = StoreConfig::default()
        .with_key_validation(!args.disable_key_validation)
        .with_busy_timeout(Duration::from_millis(args.busy_timeout_ms));
    debug!("Opening {:?} with {:?}", args.db, config);
    let (mut store, mut rules) = init_provisioning_with_sqlite(&args.db, &config)?;

    let output = match args.command {
        Command::Get { org, kind, uid } => {
            let key = ProvenanceKey::new(OrgId::new(org), kind, uid);
            match store.call(ProvenanceRequest::GetProvenance(key)).await? {
                ProvenanceResponse::Provenance(provenance) => provenance.to_string(),
                other => bail!("unexpected store response: {other:?}"),
            }
        }
        Command::Set { org, kind, uid, provenance } => {
            let resource = ResourceRef::new(kind, uid);
            store.call(ProvenanceRequest::set(OrgId::new(org), &resource, provenance)).await?;
            format!("{kind} {} in org {org}: {provenance}", resource.uid)
        }
        Command::Delete { org, kind, uid } => {
            let key = ProvenanceKey::new(OrgId::new(org), kind, uid);
            store.call(ProvenanceRequest::DeleteProvenance(key.clone())).await?;
            format!("deleted {key}")
        }
        Command::List { org, kind } => {
            match store
                .call(ProvenanceRequest::GetProvenances { org_id: OrgId::new(org), kind })
                .await?
            {
                ProvenanceResponse::Provenances(provenances) => {
                    let mut lines = provenances
                        .into_iter()
                        .map(|(uid, provenance)| format!("{uid}\t{provenance}"))
                        .collect::<Vec<_>>();
                    lines.sort();
                    lines.join("\n")
                }
                other => bail!("unexpected store response: {other:?}"),
            }
        }
        Command::Authorize { org, uid, provenance, force } => {
            let rule = AlertRule::new(org, uid);
            match rules.call(RuleRequest::AuthorizeEdit { rule, incoming: provenance, force }).await
            {
                Ok(RuleResponse::Authorized) => "authorized".to_string(),
                Ok(other) => bail!("unexpected rules response: {other:?}"),
                Err(conflict @ ProvisioningError::ProvenanceConflict { .. }) => {
                    format!("rejected: {conflict}")
                }
                Err(error) => return Err(error.into()),
            }
        }
        Command::Edit { org, uid, provenance, force } => {
            let rule = AlertRule::new(org, uid);
            rules
                .call(RuleRequest::RecordEdit { rule: rule.clone(), incoming: provenance, force })
                .await?;
            format!("recorded {} as {provenance}", rule.key())
        }
    };
    Ok(output)
}
