//! SQLite storage.
//!
//! Records live in a single `provenance_type` table with a unique index over
//! `(record_type, record_key, org_id)`. Every operation opens its own
//! connection on the blocking thread pool and drops it before returning; the
//! connection busy timeout bounds how long a call waits on a locked database.
use std::{
    collections::HashMap,
    future::Future,
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};

use rusqlite::{Connection, OptionalExtension, params};
#[cfg(feature = "ruleprov_tracing")]
use tracing::debug;

use crate::{
    provisioning::{
        error::ProvisioningError,
        infrastructure::naming::{OrgId, Provenance, ProvenanceKey, ResourceKind},
    },
    storage::ProvenanceStorage,
};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS provenance_type (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    record_key TEXT NOT NULL,
    record_type TEXT NOT NULL,
    org_id INTEGER NOT NULL,
    provenance TEXT NOT NULL
);
CREATE UNIQUE INDEX IF NOT EXISTS provenance_type_record_idx
    ON provenance_type (record_type, record_key, org_id);
"#;

const SELECT_ONE: &str = "SELECT provenance FROM provenance_type \
     WHERE record_type = ?1 AND record_key = ?2 AND org_id = ?3";

const UPSERT: &str = "INSERT INTO provenance_type (record_key, record_type, org_id, provenance) \
     VALUES (?1, ?2, ?3, ?4) \
     ON CONFLICT (record_type, record_key, org_id) DO UPDATE SET provenance = excluded.provenance";

const DELETE_ONE: &str = "DELETE FROM provenance_type \
     WHERE record_type = ?1 AND record_key = ?2 AND org_id = ?3";

const SELECT_KIND: &str = "SELECT record_key, provenance FROM provenance_type \
     WHERE record_type = ?1 AND org_id = ?2";

pub const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone)]
pub struct SqliteStorage {
    path: Arc<PathBuf>,
    busy_timeout: Duration,
}

impl SqliteStorage {
    /// Opens (or creates) the database file and ensures the schema exists.
    pub fn open(path: impl AsRef<Path>, busy_timeout: Duration) -> Result<Self, ProvisioningError> {
        let storage = Self { path: Arc::new(path.as_ref().to_path_buf()), busy_timeout };
        storage.connect()?.execute_batch(SCHEMA)?;
        #[cfg(feature = "ruleprov_tracing")]
        debug!("[sqlite] opened {:?}", storage.path);
        Ok(storage)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn connect(&self) -> Result<Connection, ProvisioningError> {
        let conn = Connection::open(self.path.as_ref())?;
        conn.busy_timeout(self.busy_timeout)?;
        Ok(conn)
    }

    /// Runs `f` on a fresh connection off the async runtime.
    async fn with_connection<T, F>(&self, f: F) -> Result<T, ProvisioningError>
    where
        F: FnOnce(&Connection) -> Result<T, ProvisioningError> + Send + 'static,
        T: Send + 'static,
    {
        let this = self.clone();
        tokio::task::spawn_blocking(move || {
            let conn = this.connect()?;
            f(&conn)
        })
        .await?
    }
}

impl ProvenanceStorage for SqliteStorage {
    fn read(
        &self,
        key: ProvenanceKey,
    ) -> impl Future<Output = Result<Option<Provenance>, ProvisioningError>> + Send {
        self.with_connection(move |conn| {
            let code = conn
                .query_row(
                    SELECT_ONE,
                    params![key.kind().as_str(), key.uid(), key.org_id().get()],
                    |row| row.get::<_, String>(0),
                )
                .optional()?;
            code.as_deref().map(Provenance::from_code).transpose()
        })
    }

    fn upsert(
        &self,
        key: ProvenanceKey,
        provenance: Provenance,
    ) -> impl Future<Output = Result<(), ProvisioningError>> + Send {
        self.with_connection(move |conn| {
            conn.execute(
                UPSERT,
                params![key.uid(), key.kind().as_str(), key.org_id().get(), provenance.as_str()],
            )?;
            #[cfg(feature = "ruleprov_tracing")]
            debug!("[sqlite] upsert {} -> {:?}", key, provenance);
            Ok(())
        })
    }

    fn remove(
        &self,
        key: ProvenanceKey,
    ) -> impl Future<Output = Result<(), ProvisioningError>> + Send {
        self.with_connection(move |conn| {
            let _removed = conn
                .execute(DELETE_ONE, params![key.kind().as_str(), key.uid(), key.org_id().get()])?;
            #[cfg(feature = "ruleprov_tracing")]
            debug!("[sqlite] remove {}: {} row(s)", key, _removed);
            Ok(())
        })
    }

    fn list(
        &self,
        org_id: OrgId,
        kind: ResourceKind,
    ) -> impl Future<Output = Result<HashMap<String, Provenance>, ProvisioningError>> + Send {
        self.with_connection(move |conn| {
            let mut stmt = conn.prepare(SELECT_KIND)?;
            let rows = stmt.query_map(params![kind.as_str(), org_id.get()], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
            })?;
            let mut records = HashMap::new();
            for row in rows {
                let (uid, code) = row?;
                records.insert(uid, Provenance::from_code(&code)?);
            }
            Ok(records)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule_key(org_id: i64, uid: &str) -> ProvenanceKey {
        ProvenanceKey::new(OrgId::new(org_id), ResourceKind::AlertRule, uid)
    }

    fn row_count(path: &Path) -> i64 {
        Connection::open(path)
            .unwrap()
            .query_row("SELECT COUNT(*) FROM provenance_type", [], |row| row.get(0))
            .unwrap()
    }

    #[tokio::test]
    async fn unit_sqlite_storage_upsert_single_row() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("provenance.db");
        let storage = SqliteStorage::open(&path, DEFAULT_BUSY_TIMEOUT).unwrap();

        assert_eq!(storage.read(rule_key(1, "a")).await, Ok(None));
        storage.upsert(rule_key(1, "a"), Provenance::File).await.unwrap();
        storage.upsert(rule_key(1, "a"), Provenance::Api).await.unwrap();
        storage.upsert(rule_key(2, "a"), Provenance::File).await.unwrap();

        assert_eq!(storage.read(rule_key(1, "a")).await, Ok(Some(Provenance::Api)));
        assert_eq!(storage.read(rule_key(2, "a")).await, Ok(Some(Provenance::File)));
        assert_eq!(row_count(&path), 2);
    }

    #[tokio::test]
    async fn unit_sqlite_storage_none_is_stored_as_empty_code() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("provenance.db");
        let storage = SqliteStorage::open(&path, DEFAULT_BUSY_TIMEOUT).unwrap();

        storage.upsert(rule_key(1, "a"), Provenance::None).await.unwrap();
        let code: String = Connection::open(&path)
            .unwrap()
            .query_row("SELECT provenance FROM provenance_type", [], |row| row.get(0))
            .unwrap();
        assert_eq!(code, "");
        assert_eq!(storage.read(rule_key(1, "a")).await, Ok(Some(Provenance::None)));
    }

    #[tokio::test]
    async fn unit_sqlite_storage_remove_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("provenance.db");
        let storage = SqliteStorage::open(&path, DEFAULT_BUSY_TIMEOUT).unwrap();

        storage.remove(rule_key(1, "a")).await.unwrap();
        storage.upsert(rule_key(1, "a"), Provenance::File).await.unwrap();
        storage.remove(rule_key(1, "a")).await.unwrap();
        storage.remove(rule_key(1, "a")).await.unwrap();
        assert_eq!(storage.read(rule_key(1, "a")).await, Ok(None));
        assert_eq!(row_count(&path), 0);
    }

    #[tokio::test]
    async fn unit_sqlite_storage_corrupt_code() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("provenance.db");
        let storage = SqliteStorage::open(&path, DEFAULT_BUSY_TIMEOUT).unwrap();

        Connection::open(&path)
            .unwrap()
            .execute(
                "INSERT INTO provenance_type (record_key, record_type, org_id, provenance) \
                 VALUES ('a', 'alert-rule', 1, 'manual')",
                [],
            )
            .unwrap();
        assert!(matches!(
            storage.read(rule_key(1, "a")).await,
            Err(ProvisioningError::CorruptRecord(_))
        ));
    }

    #[tokio::test]
    async fn unit_sqlite_storage_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        // A directory cannot be opened as a database file
        assert!(matches!(
            SqliteStorage::open(dir.path(), DEFAULT_BUSY_TIMEOUT),
            Err(ProvisioningError::StorageUnavailable(_))
        ));
    }
}
