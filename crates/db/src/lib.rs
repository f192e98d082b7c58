pub mod fixtures;
pub mod repositories;

pub use fixtures::{MockDataset, MockStore, TableCount};
pub use repositories::{InMemoryRepository, RecordRepository, RepositoryError};
