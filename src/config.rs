use crate::error::Error;
use crate::record_store::{DynRecordStore, FileRecordStore, InMemoryRecordStore};
use serde::Deserialize;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::RwLock;

pub type SharedConfig = Arc<Config>;

/// Settings read from the optional JSON config file. Command line flags take precedence.
///
/// ```json
/// { "record_store_path": "records.json", "assume_yes": false }
/// ```
#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// JSON file holding the domain's records. Without it imports start from an empty, in-memory
    /// record set.
    pub record_store_path: Option<String>,
    /// Import without asking for confirmation.
    pub assume_yes: bool,
}

impl Config {
    pub fn try_from_file(p: impl AsRef<Path>) -> Result<Self, Error> {
        let f = File::open(p)?;
        let reader = BufReader::new(f);
        let conf: Config = serde_json::from_reader(reader)?;
        conf.validate()?;
        Ok(conf)
    }

    /// Open the record store at `path_override`, or at the configured path.
    ///
    /// # Errors
    ///
    /// Returns an error if the record store file can't be loaded.
    pub async fn record_store(&self, path_override: Option<&str>) -> Result<DynRecordStore, Error> {
        match path_override.or(self.record_store_path.as_deref()) {
            Some(path) => Ok(Arc::new(RwLock::new(
                FileRecordStore::try_from_file(path).await?,
            ))),
            None => Ok(Arc::new(RwLock::new(InMemoryRecordStore::default()))),
        }
    }

    fn validate(&self) -> Result<(), Error> {
        match &self.record_store_path {
            Some(path) if path.trim().is_empty() => Err(Error::InvalidConfig(
                "record_store_path must not be empty".to_string(),
            )),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record_store::RecordStore;

    fn load(json: &str) -> Result<Config, Error> {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, json).unwrap();
        Config::try_from_file(&path)
    }

    #[test]
    fn defaults() {
        let config = load("{}").unwrap();
        assert_eq!(config.record_store_path, None);
        assert!(!config.assume_yes);
    }

    #[test]
    fn full() {
        let config = load(r#"{"record_store_path": "records.json", "assume_yes": true}"#).unwrap();
        assert_eq!(config.record_store_path.as_deref(), Some("records.json"));
        assert!(config.assume_yes);
    }

    #[test]
    fn invalid() {
        assert!(matches!(
            load(r#"{"record_store_path": " "}"#),
            Err(Error::InvalidConfig(_))
        ));
        assert!(matches!(
            load(r#"{"api_key": "secret"}"#),
            Err(Error::InvalidJSON(_))
        ));
        assert!(matches!(
            Config::try_from_file("/nonexistent/config.json"),
            Err(Error::IO(_))
        ));
    }

    #[tokio::test]
    async fn record_store_override() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("records.json");
        let config = Config::default();
        let store = config
            .record_store(Some(path.to_str().unwrap()))
            .await
            .unwrap();
        assert!(store.read().await.records().await.is_empty());
        assert!(path.exists());
    }
}
