//! A JSON file-backed implementation of the [`RecordStore`][super::RecordStore] trait.
//!
//! Wraps a [`InMemoryRecordStore`][super::memory::InMemoryRecordStore] instance, persisting
//! updates to a JSON file on disk.
use crate::error::Error;
use crate::import::{DomainRecord, RecordId, RecordRequest};
use crate::record_store::memory::InMemoryRecordStore;
use crate::record_store::RecordStore;
use std::io::ErrorKind;
use tokio::fs::File;
use tokio::io;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

/// A file-backed record store. After each update the JSON file on disk is rewritten with the new
/// data.
///
/// Wraps a [`InMemoryRecordStore`][super::memory::InMemoryRecordStore], operating the same way
/// except for keeping its state on disk.
#[derive(Default, Debug, Clone)]
#[allow(clippy::module_name_repetitions)]
pub struct FileRecordStore {
    record_store: InMemoryRecordStore,
    path: String,
}

impl FileRecordStore {
    /// Save the state of the record store as JSON to the store's configured path, or return an
    /// Error.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidJSON`] if a record in the store can't be serialized to JSON.
    ///
    /// Returns [`Error::IO`] if the serialized state can't be written to the backing file path.
    pub async fn save(&self) -> Result<(), Error> {
        let data = serde_json::to_string_pretty(&self.record_store)?;
        let mut output_file = File::create(&self.path).await?;
        output_file.write_all(data.as_bytes()).await?;
        output_file.flush().await?;
        Ok(())
    }

    /// Load a [`FileRecordStore`] from the JSON state located at the given path, or return an
    /// Error. A missing file is created with an empty state.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidJSON`] if the JSON state file is invalid.
    ///
    /// Returns [`Error::IO`] if the path can't be opened or read.
    pub async fn try_from_file(p: &str) -> Result<Self, Error> {
        let contents = match File::open(p).await {
            Ok(mut f) => {
                let mut buf = vec![];
                f.read_to_end(&mut buf).await?;
                buf
            }
            Err(err) => match err.kind() {
                ErrorKind::NotFound => Self::write_empty_state(File::create(&p).await?).await?,
                _ => return Err(Error::IO(err)),
            },
        };

        let record_store: InMemoryRecordStore = serde_json::from_slice(&contents)?;
        tracing::debug!("loaded record store from {p}");
        Ok(Self {
            path: p.to_string(),
            record_store,
        })
    }

    async fn write_empty_state(mut f: File) -> io::Result<Vec<u8>> {
        let default_data = serde_json::to_string_pretty(&InMemoryRecordStore::default())?;
        let default_bytes = default_data.as_bytes();
        f.write_all(default_bytes).await?;
        f.flush().await?;
        Ok(default_bytes.to_vec())
    }
}

#[async_trait::async_trait]
impl RecordStore for FileRecordStore {
    async fn records(&self) -> Vec<DomainRecord> {
        self.record_store.records().await
    }

    async fn delete_record(&mut self, id: RecordId) -> Result<(), Error> {
        self.record_store.delete_record(id).await?;
        self.save().await?;
        Ok(())
    }

    async fn create_record(&mut self, request: RecordRequest) -> Result<DomainRecord, Error> {
        let record = self.record_store.create_record(request).await?;
        self.save().await?;
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn persists_across_loads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("records.json");
        let path = path.to_str().unwrap();

        let mut store = FileRecordStore::try_from_file(path).await.unwrap();
        assert!(store.records().await.is_empty());
        let created = store
            .create_record(RecordRequest {
                name: "www".to_string(),
                record_type: "A".to_string(),
                content: "192.0.2.1".to_string(),
                priority: 0,
            })
            .await
            .unwrap();

        let reloaded = FileRecordStore::try_from_file(path).await.unwrap();
        assert_eq!(reloaded.records().await, vec![created]);
    }

    #[tokio::test]
    async fn invalid_state() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("records.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            FileRecordStore::try_from_file(path.to_str().unwrap()).await,
            Err(Error::InvalidJSON(_))
        ));
    }
}
