use tokio::sync::RwLock;
use tracing::debug;

use adops_core::filter::{self, FilterState, SortState, TableRecord};

use super::{RecordRepository, RepositoryError};

pub struct InMemoryRepository<T> {
    records: RwLock<Vec<T>>,
}

impl<T: TableRecord> InMemoryRepository<T> {
    pub fn new(records: Vec<T>) -> Self {
        Self { records: RwLock::new(records) }
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

impl<T: TableRecord> Default for InMemoryRepository<T> {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

#[async_trait::async_trait]
impl<T: TableRecord> RecordRepository<T> for InMemoryRepository<T> {
    async fn find_by_id(&self, id: &str) -> Result<Option<T>, RepositoryError> {
        let records = self.records.read().await;
        Ok(records.iter().find(|record| record.record_id() == id).cloned())
    }

    async fn list(
        &self,
        state: &FilterState,
        sort: Option<&SortState>,
    ) -> Result<Vec<T>, RepositoryError> {
        let records = self.records.read().await;
        let listed = filter::apply(records.as_slice(), state, sort)?;
        debug!(
            event_name = "repository.listed",
            table = T::schema().table,
            total = records.len(),
            matched = listed.len(),
            "listed records"
        );
        Ok(listed)
    }

    async fn save(&self, record: T) -> Result<T, RepositoryError> {
        if record.record_id().trim().is_empty() {
            return Err(RepositoryError::MissingId { table: T::schema().table });
        }

        let mut records = self.records.write().await;
        let existing =
            records.iter().position(|stored| stored.record_id() == record.record_id());
        match existing {
            Some(index) => records[index] = record.clone(),
            None => records.push(record.clone()),
        }
        debug!(
            event_name = "repository.saved",
            table = T::schema().table,
            record_id = record.record_id(),
            replaced = existing.is_some(),
            "saved record"
        );
        Ok(record)
    }
}
