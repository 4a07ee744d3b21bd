use crate::error::Error;
use crate::import::ImportPlan;
use crate::record_store::DynRecordStore;

/// Apply a plan to a record store: delete every record being replaced, then create the new
/// records in order.
///
/// Changes are made one at a time and not rolled back. The first failure stops the import and is
/// returned, leaving the changes made so far in place.
///
/// # Errors
///
/// Returns the first error from the record store.
pub async fn apply_plan(store: &DynRecordStore, plan: &ImportPlan) -> Result<(), Error> {
    let mut store = store.write().await;
    for id in &plan.to_replace {
        store.delete_record(*id).await?;
        tracing::debug!("deleted record {id}");
    }
    for request in &plan.to_create {
        let record = store.create_record(request.clone()).await?;
        tracing::debug!(
            "created {} record {} for \"{}\"",
            record.record_type,
            record.id,
            record.name
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::import::{plan_import, DomainRecord, ExistingRecordsIndex};
    use crate::record_store::{InMemoryRecordStore, RecordStore};
    use std::sync::Arc;
    use tokio::sync::RwLock;

    fn existing() -> Vec<DomainRecord> {
        vec![
            DomainRecord {
                id: 1,
                record_type: "A".to_string(),
                name: "www".to_string(),
                content: "198.51.100.1".to_string(),
                priority: 0,
            },
            DomainRecord {
                id: 2,
                record_type: "TXT".to_string(),
                name: String::new(),
                content: "keep me".to_string(),
                priority: 0,
            },
        ]
    }

    #[tokio::test]
    async fn replaces_and_creates() {
        let records = existing();
        let index = ExistingRecordsIndex::from_records(&records);
        let plan = plan_import(
            "example.com.",
            "www IN A 192.0.2.1\nmail MX 10 mx.example.com.\n".as_bytes(),
            &index,
        )
        .unwrap();

        let store: DynRecordStore = Arc::new(RwLock::new(InMemoryRecordStore::from_records(records)));
        apply_plan(&store, &plan).await.unwrap();

        let after = store.read().await.records().await;
        let summary: Vec<_> = after
            .iter()
            .map(|r| (r.id, r.record_type.as_str(), r.name.as_str(), r.content.as_str()))
            .collect();
        assert_eq!(
            summary,
            vec![
                (2, "TXT", "", "keep me"),
                (3, "A", "www", "192.0.2.1"),
                (4, "MX", "mail", "mx.example.com."),
            ]
        );
    }

    #[tokio::test]
    async fn stops_at_first_error() {
        let mut plan = ImportPlan::default();
        plan.to_replace.extend([1, 5]);
        plan.to_create.push(Default::default());

        let store: DynRecordStore =
            Arc::new(RwLock::new(InMemoryRecordStore::from_records(existing())));
        assert!(matches!(
            apply_plan(&store, &plan).await,
            Err(Error::RecordNotFound(5))
        ));
        let ids: Vec<_> = store
            .read()
            .await
            .records()
            .await
            .iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(ids, vec![2]);
    }
}
