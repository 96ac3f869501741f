use async_trait::async_trait;

use crate::database::StatementError;

/// A QR code link as it is stored
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkRecord {
    pub id: String,
    pub original_link: String,
    pub is_active: bool,
    /// How often the link was resolved while it was active
    pub scans: u64,
}

#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("Error running statement: {0}")]
    StatementError(#[from] StatementError),
    #[error("Error reading value from row: {0}")]
    RowError(libsql::Error),
    #[error("Stored scan count for link {id} is negative: {scans}")]
    NegativeScans { id: String, scans: i64 },
}

/// The operations the resolver needs from the document store
#[async_trait]
pub trait LinkStore: Send + Sync {
    /// Point lookup. `None` if there is no link with this id.
    async fn get(&self, id: &str) -> Result<Option<LinkRecord>, StoreError>;

    /// Adds one to the scan counter inside the store without reading it first.
    /// Returns `false` if no link with this id exists (anymore).
    async fn increment_scans(&self, id: &str) -> Result<bool, StoreError>;
}
