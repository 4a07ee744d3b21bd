//! Domain record storage.
//!
//! Stands in for the domain record endpoints of the control panel API: a plan is applied by
//! deleting and creating records one at a time through a [`RecordStore`].
//!
//! Two implementations are provided, [`memory::InMemoryRecordStore`] and
//! [`file::FileRecordStore`]. The former is not durable. The latter writes its state to a JSON
//! file after each update and loads it again when opened.

use crate::error::Error;
use crate::import::{DomainRecord, RecordId, RecordRequest};
use std::sync::Arc;
use tokio::sync::RwLock;

pub mod file;
pub mod memory;

#[allow(clippy::module_name_repetitions)]
pub use file::FileRecordStore;
#[allow(clippy::module_name_repetitions)]
pub use memory::InMemoryRecordStore;

/// `DynRecordStore` is a type alias for a [`RecordStore`] that can be shared by multiple
/// consumers that coordinate through an [`Arc`] and a [`RwLock`] wrapping the [`RecordStore`].
#[allow(clippy::module_name_repetitions)]
pub type DynRecordStore = Arc<RwLock<dyn RecordStore + Send + Sync>>;

/// An async trait describing the records of a single domain.
#[async_trait::async_trait]
pub trait RecordStore {
    /// All records, ordered by id.
    async fn records(&self) -> Vec<DomainRecord>;

    /// Delete the record with the given id.
    async fn delete_record(&mut self, id: RecordId) -> Result<(), Error>;

    /// Create a record, returning it with its newly assigned id.
    async fn create_record(&mut self, request: RecordRequest) -> Result<DomainRecord, Error>;
}
