use crate::error::Error;
use crate::import::{DomainRecord, RecordId, RecordRequest};
use crate::record_store::RecordStore;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Default, Debug, Clone, Serialize, Deserialize)]
pub struct InMemoryRecordStore {
    #[serde(default)]
    records: BTreeMap<RecordId, DomainRecord>,
    #[serde(default)]
    next_id: RecordId,
}

impl InMemoryRecordStore {
    pub fn from_records(records: impl IntoIterator<Item = DomainRecord>) -> Self {
        let records: BTreeMap<_, _> = records.into_iter().map(|r| (r.id, r)).collect();
        let next_id = records.keys().next_back().map_or(1, |id| id + 1);
        Self { records, next_id }
    }

    // Ids are never reused, also not when the state was written by hand.
    fn allocate_id(&mut self) -> RecordId {
        let id = self
            .next_id
            .max(self.records.keys().next_back().map_or(1, |id| id + 1));
        self.next_id = id + 1;
        id
    }
}

#[async_trait::async_trait]
impl RecordStore for InMemoryRecordStore {
    async fn records(&self) -> Vec<DomainRecord> {
        self.records.values().cloned().collect()
    }

    async fn delete_record(&mut self, id: RecordId) -> Result<(), Error> {
        match self.records.remove(&id) {
            Some(_) => Ok(()),
            None => Err(Error::RecordNotFound(id)),
        }
    }

    async fn create_record(&mut self, request: RecordRequest) -> Result<DomainRecord, Error> {
        let record = DomainRecord {
            id: self.allocate_id(),
            record_type: request.record_type,
            name: request.name,
            content: request.content,
            priority: request.priority,
        };
        self.records.insert(record.id, record.clone());
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn a_record(id: RecordId, name: &str) -> DomainRecord {
        DomainRecord {
            id,
            record_type: "A".to_string(),
            name: name.to_string(),
            content: "192.0.2.1".to_string(),
            priority: 0,
        }
    }

    #[tokio::test]
    async fn ids_are_not_reused() {
        let mut store = InMemoryRecordStore::from_records([a_record(3, "www"), a_record(7, "")]);
        store.delete_record(7).await.unwrap();
        let created = store
            .create_record(RecordRequest {
                name: "mail".to_string(),
                record_type: "MX".to_string(),
                content: "smtp.example.com.".to_string(),
                priority: 10,
            })
            .await
            .unwrap();
        assert_eq!(created.id, 8);
        let ids: Vec<_> = store.records().await.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![3, 8]);
    }

    #[tokio::test]
    async fn delete_unknown_record() {
        let mut store = InMemoryRecordStore::default();
        assert!(matches!(
            store.delete_record(1).await,
            Err(Error::RecordNotFound(1))
        ));
        let created = store.create_record(RecordRequest::default()).await.unwrap();
        assert_eq!(created.id, 1);
    }
}
