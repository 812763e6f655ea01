pub mod conformance;
mod error;
mod memory;
mod record;
mod traits;

pub use error::StorageError;
pub use memory::InMemoryStorage;
pub use record::StoredReport;
pub use traits::ReportStorage;
