use async_trait::async_trait;
use libsql::{named_params, Builder, Connection, Database as LibsqlDatabase};

use crate::{
    configuration::DatabaseLocation,
    store::{LinkRecord, LinkStore, StoreError},
};

#[derive(thiserror::Error, Debug)]
#[error("Error creating database: {0}")]
pub struct CreateError(#[from] libsql::Error);

#[derive(thiserror::Error, Debug)]
pub enum InitializationError {
    #[error("Error creating databse: {0}")]
    CreateError(#[from] CreateError),
    #[error("Error connecting to database: {0}")]
    ConnectionError(libsql::Error),
    #[error("Error executing create tables batch query: {0}")]
    CreateTablesError(libsql::Error),
}

#[derive(thiserror::Error, Debug)]
pub enum StatementError {
    #[error("Error preparing statement: {0}")]
    PrepareError(libsql::Error),
    #[error("Error exectuing statement: {0}")]
    ExecuteError(libsql::Error),
}

/// A wrapper around the libsql database to hide the database and provide access to predefined queries.
/// The connection is opened once and shared by every request.
pub struct Database {
    // Owns the database the connection belongs to
    _database: LibsqlDatabase,
    connection: Connection,
}

impl Database {
    async fn create(location: DatabaseLocation) -> Result<LibsqlDatabase, CreateError> {
        let database = match location {
            DatabaseLocation::Remote { url, auth_token } => {
                Builder::new_remote(url, auth_token).build().await?
            }
            DatabaseLocation::Local { path } => Builder::new_local(path).build().await?,
        };

        Ok(database)
    }

    /// Creates the database and initializes it with the tables
    pub async fn initialize(location: DatabaseLocation) -> Result<Database, InitializationError> {
        let database = Self::create(location).await?;

        let connection = database
            .connect()
            .map_err(InitializationError::ConnectionError)?;

        let query = include_str!("./create_tables.sql");
        connection
            .execute_batch(query)
            .await
            .map_err(InitializationError::CreateTablesError)?;

        tracing::debug!("Tables created");

        Ok(Self {
            _database: database,
            connection,
        })
    }

    async fn query(
        &self,
        sql: &'static str,
        parameters: impl libsql::params::IntoParams,
    ) -> Result<libsql::Rows, StatementError> {
        let mut statement = self
            .connection
            .prepare(sql)
            .await
            .map_err(StatementError::PrepareError)?;

        statement
            .query(parameters)
            .await
            .map_err(StatementError::ExecuteError)
    }

    async fn execute(
        &self,
        sql: &'static str,
        parameters: impl libsql::params::IntoParams,
    ) -> Result<usize, StatementError> {
        let mut statement = self
            .connection
            .prepare(sql)
            .await
            .map_err(StatementError::PrepareError)?;

        statement
            .execute(parameters)
            .await
            .map_err(StatementError::ExecuteError)
    }
}

#[async_trait]
impl LinkStore for Database {
    async fn get(&self, id: &str) -> Result<Option<LinkRecord>, StoreError> {
        let mut rows = self
            .query(
                "SELECT original_link, is_active, scans FROM qr_codes WHERE id = :id",
                named_params![":id": id],
            )
            .await?;

        let Some(row) = rows.next().await.map_err(StoreError::RowError)? else {
            return Ok(None);
        };

        let original_link = row.get::<String>(0).map_err(StoreError::RowError)?;
        let is_active = row.get::<i64>(1).map_err(StoreError::RowError)? != 0;
        let scans = row.get::<i64>(2).map_err(StoreError::RowError)?;
        let scans = u64::try_from(scans).map_err(|_| StoreError::NegativeScans {
            id: id.to_owned(),
            scans,
        })?;

        Ok(Some(LinkRecord {
            id: id.to_owned(),
            original_link,
            is_active,
            scans,
        }))
    }

    async fn increment_scans(&self, id: &str) -> Result<bool, StoreError> {
        // Evaluated by the database so concurrent scans can't overwrite each other
        let updated = self
            .execute(
                "UPDATE qr_codes SET scans = scans + 1 WHERE id = :id",
                named_params![":id": id],
            )
            .await?;

        Ok(updated > 0)
    }
}

#[cfg(test)]
impl Database {
    pub(crate) async fn insert_link(&self, link: &LinkRecord) {
        self.connection
            .execute(
                "INSERT INTO qr_codes (id, original_link, is_active, scans) \
                VALUES (:id, :original_link, :is_active, :scans)",
                named_params![
                    ":id": link.id.as_str(),
                    ":original_link": link.original_link.as_str(),
                    ":is_active": i64::from(link.is_active),
                    ":scans": i64::try_from(link.scans).unwrap(),
                ],
            )
            .await
            .unwrap();
    }

    pub(crate) async fn set_active(&self, id: &str, is_active: bool) {
        self.connection
            .execute(
                "UPDATE qr_codes SET is_active = :is_active WHERE id = :id",
                named_params![":id": id, ":is_active": i64::from(is_active)],
            )
            .await
            .unwrap();
    }

    pub(crate) async fn delete_link(&self, id: &str) {
        self.connection
            .execute(
                "DELETE FROM qr_codes WHERE id = :id",
                named_params![":id": id],
            )
            .await
            .unwrap();
    }

    /// Makes every following statement fail
    pub(crate) async fn drop_tables(&self) {
        self.connection
            .execute_batch("DROP TABLE qr_codes;")
            .await
            .unwrap();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::testing::{link, memory_database};

    #[tokio::test]
    async fn initialize_is_idempotent() {
        let database = memory_database().await;

        database
            .connection
            .execute_batch(include_str!("./create_tables.sql"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn get_returns_stored_link() {
        let database = memory_database().await;
        let stored = link("abc123", "https://example.com", true, 5);
        database.insert_link(&stored).await;

        let found = database.get("abc123").await.unwrap();

        assert_eq!(found, Some(stored));
    }

    #[tokio::test]
    async fn get_unknown_id_is_none() {
        let database = memory_database().await;
        database
            .insert_link(&link("abc123", "https://example.com", true, 0))
            .await;

        assert_eq!(database.get("ABC123").await.unwrap(), None);
        assert_eq!(database.get("").await.unwrap(), None);
    }

    #[tokio::test]
    async fn inactive_flag_is_read() {
        let database = memory_database().await;
        database
            .insert_link(&link("off", "https://example.com", false, 2))
            .await;

        let found = database.get("off").await.unwrap().unwrap();

        assert!(!found.is_active);
        assert_eq!(found.scans, 2);
    }

    #[tokio::test]
    async fn increment_adds_one() {
        let database = memory_database().await;
        database
            .insert_link(&link("abc123", "https://example.com", true, 5))
            .await;

        assert!(database.increment_scans("abc123").await.unwrap());
        assert!(database.increment_scans("abc123").await.unwrap());

        let found = database.get("abc123").await.unwrap().unwrap();
        assert_eq!(found.scans, 7);
    }

    #[tokio::test]
    async fn increment_unknown_id_updates_nothing() {
        let database = memory_database().await;

        assert!(!database.increment_scans("missing").await.unwrap());
    }

    #[tokio::test]
    async fn negative_scans_are_rejected() {
        let database = memory_database().await;
        database
            .connection
            .execute_batch(
                "DROP TABLE qr_codes;
                CREATE TABLE qr_codes (
                    id TEXT PRIMARY KEY,
                    original_link TEXT NOT NULL,
                    is_active INTEGER NOT NULL,
                    scans INTEGER NOT NULL
                );
                INSERT INTO qr_codes VALUES ('broken', 'https://example.com', 1, -3);",
            )
            .await
            .unwrap();

        let result = database.get("broken").await;

        assert!(matches!(
            result,
            Err(StoreError::NegativeScans { scans: -3, .. })
        ));
    }

    #[tokio::test]
    async fn missing_table_is_an_error() {
        let database = memory_database().await;
        database.drop_tables().await;

        assert!(matches!(
            database.get("abc123").await,
            Err(StoreError::StatementError(_))
        ));
        assert!(matches!(
            database.increment_scans("abc123").await,
            Err(StoreError::StatementError(_))
        ));
    }
}
