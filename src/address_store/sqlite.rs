//! A NixOps state file backed implementation of the [`AddressStore`][super::AddressStore] trait.
//!
//! `nixops` keeps its deployments in a SQLite database, by default at
//! `~/.nixops/deployments.nixops`. The file is only ever opened read-only: `nixops` owns it.
use crate::address_store::{parse_stored_addr, AddressStore, LookupError};
use crate::error::Error;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::net::Ipv4Addr;
use std::path::Path;

const MAX_CONNECTIONS: u32 = 4;

/// Find a machine's `privateIpv4` attribute by machine name and deployment name. The deployment
/// name is itself an attribute of the deployment, not a column.
const HOST_IP_QUERY: &str = "
    SELECT RA.value
    FROM Resources R
    INNER JOIN ResourceAttrs RA ON RA.machine = R.id AND RA.name = 'privateIpv4'
    INNER JOIN DeploymentAttrs DA ON DA.deployment = R.deployment AND DA.name = 'name'
    WHERE R.name = ?
    AND DA.value = ?
";

/// Read-only view of the machine addresses in a NixOps state file.
///
/// Cloning is cheap: clones share the same connection pool.
#[derive(Debug, Clone)]
pub struct NixopsStateStore {
    pool: SqlitePool,
}

impl NixopsStateStore {
    /// Open the NixOps state file at the given path read-only.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StateFile`] if the file doesn't exist or can't be opened as a SQLite
    /// database. A connection is established eagerly so a bad path fails here rather than on
    /// the first query.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let options = SqliteConnectOptions::new().filename(path).read_only(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(MAX_CONNECTIONS)
            .connect_with(options)
            .await
            .map_err(|source| Error::StateFile {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(Self::from_pool(pool))
    }

    #[must_use]
    pub fn from_pool(pool: SqlitePool) -> Self {
        NixopsStateStore { pool }
    }

    /// Close every connection to the state file. Lookups after this fail with
    /// [`LookupError::StoreFailure`].
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[async_trait::async_trait]
impl AddressStore for NixopsStateStore {
    async fn lookup(&self, deployment: &str, hostname: &str) -> Result<Ipv4Addr, LookupError> {
        let value = sqlx::query_scalar::<_, String>(HOST_IP_QUERY)
            .bind(hostname)
            .bind(deployment)
            .fetch_optional(&self.pool)
            .await
            .map_err(|err| {
                LookupError::StoreFailure(format!(
                    "error while looking up host \"{hostname}\" in deployment \"{deployment}\": {err}"
                ))
            })?;

        match value {
            None => Err(LookupError::not_found(deployment, hostname)),
            Some(value) => parse_stored_addr(deployment, hostname, &value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const SCHEMA: &str = "
        CREATE TABLE Deployments (uuid TEXT PRIMARY KEY NOT NULL);
        CREATE TABLE DeploymentAttrs (
            deployment TEXT NOT NULL, name TEXT NOT NULL, value TEXT NOT NULL,
            PRIMARY KEY (deployment, name)
        );
        CREATE TABLE Resources (
            id INTEGER PRIMARY KEY AUTOINCREMENT, deployment TEXT NOT NULL,
            name TEXT NOT NULL, type TEXT NOT NULL
        );
        CREATE TABLE ResourceAttrs (
            machine INTEGER NOT NULL, name TEXT NOT NULL, value TEXT NOT NULL,
            PRIMARY KEY (machine, name)
        );
    ";

    const FIXTURES: &str = "
        INSERT INTO Deployments VALUES ('u-myapp'), ('u-staging');
        INSERT INTO DeploymentAttrs VALUES
            ('u-myapp', 'name', 'myapp'),
            ('u-staging', 'name', 'staging.myapp');
        INSERT INTO Resources (id, deployment, name, type) VALUES
            (1, 'u-myapp', 'db1', 'ec2'),
            (2, 'u-myapp', 'web1', 'ec2'),
            (3, 'u-staging', 'db1', 'ec2'),
            (4, 'u-myapp', 'broken', 'ec2'),
            (5, 'u-myapp', 'nokey', 'ec2');
        INSERT INTO ResourceAttrs VALUES
            (1, 'privateIpv4', '10.0.0.5'),
            (1, 'publicIpv4', '203.0.113.5'),
            (2, 'privateIpv4', '10.0.0.6'),
            (3, 'privateIpv4', '10.1.0.5'),
            (4, 'privateIpv4', 'pending'),
            (5, 'publicIpv4', '203.0.113.9');
    ";

    async fn write_state(dir: &TempDir, statements: &[&str]) -> std::path::PathBuf {
        let path = dir.path().join("deployments.nixops");
        let options = SqliteConnectOptions::new()
            .filename(&path)
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .unwrap();
        for sql in statements {
            sqlx::raw_sql(sql).execute(&pool).await.unwrap();
        }
        pool.close().await;
        path
    }

    async fn fixture_store(dir: &TempDir) -> NixopsStateStore {
        let path = write_state(dir, &[SCHEMA, FIXTURES]).await;
        NixopsStateStore::open(&path).await.unwrap()
    }

    #[tokio::test]
    async fn finds_private_ipv4() {
        let dir = TempDir::new().unwrap();
        let store = fixture_store(&dir).await;

        assert_eq!(
            store.lookup("myapp", "db1").await,
            Ok(Ipv4Addr::new(10, 0, 0, 5))
        );
        assert_eq!(
            store.lookup("myapp", "web1").await,
            Ok(Ipv4Addr::new(10, 0, 0, 6))
        );
    }

    #[tokio::test]
    async fn deployment_name_matches_exactly() {
        let dir = TempDir::new().unwrap();
        let store = fixture_store(&dir).await;

        assert_eq!(
            store.lookup("staging.myapp", "db1").await,
            Ok(Ipv4Addr::new(10, 1, 0, 5))
        );
        assert_eq!(
            store.lookup("staging", "db1").await,
            Err(LookupError::not_found("staging", "db1"))
        );
    }

    #[tokio::test]
    async fn unknown_or_addressless_hosts_are_not_found() {
        let dir = TempDir::new().unwrap();
        let store = fixture_store(&dir).await;

        assert_eq!(
            store.lookup("myapp", "db9").await,
            Err(LookupError::not_found("myapp", "db9"))
        );
        assert_eq!(
            store.lookup("nope", "db1").await,
            Err(LookupError::not_found("nope", "db1"))
        );
        assert_eq!(
            store.lookup("myapp", "nokey").await,
            Err(LookupError::not_found("myapp", "nokey"))
        );
    }

    #[tokio::test]
    async fn corrupt_address_is_a_store_failure() {
        let dir = TempDir::new().unwrap();
        let store = fixture_store(&dir).await;

        assert!(matches!(
            store.lookup("myapp", "broken").await,
            Err(LookupError::StoreFailure(_))
        ));
    }

    #[tokio::test]
    async fn missing_schema_is_a_store_failure() {
        let dir = TempDir::new().unwrap();
        let path = write_state(&dir, &["CREATE TABLE Unrelated (id INTEGER)"]).await;
        let store = NixopsStateStore::open(&path).await.unwrap();

        assert!(matches!(
            store.lookup("myapp", "db1").await,
            Err(LookupError::StoreFailure(_))
        ));
    }

    #[tokio::test]
    async fn closed_store_is_a_store_failure() {
        let dir = TempDir::new().unwrap();
        let store = fixture_store(&dir).await;
        store.close().await;

        assert!(matches!(
            store.lookup("myapp", "db1").await,
            Err(LookupError::StoreFailure(_))
        ));
    }

    #[tokio::test]
    async fn missing_state_file_fails_to_open() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("absent.nixops");

        match NixopsStateStore::open(&path).await {
            Err(Error::StateFile { path: failed, .. }) => assert_eq!(failed, path),
            other => panic!("expected StateFile error, got {other:?}"),
        }
        assert!(!path.exists());
    }
}
