pub mod engine;
pub mod record;
pub mod state;

pub use engine::{apply, matches, sort_records, FilteredView};
pub use record::{FieldKind, FieldSpec, FieldValue, RecordSchema, TableRecord};
pub use state::{DateRange, FilterState, FilterStateError, SortDirection, SortState};
