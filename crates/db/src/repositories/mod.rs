use async_trait::async_trait;
use thiserror::Error;

use adops_core::errors::{ApplicationError, DomainError};
use adops_core::filter::{FilterState, FilterStateError, SortState, TableRecord};

pub mod memory;

pub use memory::InMemoryRepository;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("invalid filter: {0}")]
    Filter(#[from] FilterStateError),
    #[error("record in table `{table}` has an empty id")]
    MissingId { table: &'static str },
}

impl From<RepositoryError> for ApplicationError {
    fn from(error: RepositoryError) -> Self {
        match error {
            RepositoryError::Filter(error) => {
                Self::Domain(DomainError::MalformedFilterState(error))
            }
            other => Self::Persistence(other.to_string()),
        }
    }
}

/// Storage boundary shared by every table. Mock data sits behind it so a real
/// store can replace the in-memory one without touching callers.
#[async_trait]
pub trait RecordRepository<T: TableRecord>: Send + Sync {
    async fn find_by_id(&self, id: &str) -> Result<Option<T>, RepositoryError>;

    /// Filtered and optionally sorted view; unsorted output keeps insertion order.
    async fn list(
        &self,
        filter: &FilterState,
        sort: Option<&SortState>,
    ) -> Result<Vec<T>, RepositoryError>;

    /// Inserts or replaces by `record_id`, returning the stored record.
    async fn save(&self, record: T) -> Result<T, RepositoryError>;
}
