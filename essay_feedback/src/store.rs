use async_trait::async_trait;
use common::models::AnalysisRecord;
use log::warn;
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use tokio::sync::Mutex;
use uuid::Uuid;

#[async_trait]
pub trait ResultStore: Send + Sync {
    /// Stores `record` under `id`. An existing record is never replaced.
    async fn put(&self, id: Uuid, record: AnalysisRecord);
    async fn get(&self, id: &Uuid) -> Option<AnalysisRecord>;
}

/// Process-lifetime store without expiry or size bound.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: Mutex<HashMap<Uuid, AnalysisRecord>>,
}

impl MemoryStore {
    #[cfg(test)]
    pub async fn len(&self) -> usize {
        self.records.lock().await.len()
    }
}

#[async_trait]
impl ResultStore for MemoryStore {
    async fn put(&self, id: Uuid, record: AnalysisRecord) {
        match self.records.lock().await.entry(id) {
            Entry::Occupied(_) => warn!("Result {id} already stored, keeping the first record"),
            Entry::Vacant(entry) => {
                entry.insert(record);
            }
        }
    }

    async fn get(&self, id: &Uuid) -> Option<AnalysisRecord> {
        self.records.lock().await.get(id).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::models::{BatchAnalysis, BatchRecord};

    fn batch(overall: &str) -> AnalysisRecord {
        AnalysisRecord::Batch(BatchRecord {
            ai_analysis: BatchAnalysis {
                data: vec![],
                overall_analysis: overall.to_string(),
                improve_analysis: String::new(),
            },
        })
    }

    #[tokio::test]
    async fn unknown_id_is_absent() {
        let store = MemoryStore::default();
        assert_eq!(store.get(&Uuid::new_v4()).await, None);
    }

    #[tokio::test]
    async fn records_are_written_once() {
        let store = MemoryStore::default();
        let id = Uuid::new_v4();

        store.put(id, batch("first")).await;
        store.put(id, batch("second")).await;

        assert_eq!(store.get(&id).await, Some(batch("first")));
        assert_eq!(store.len().await, 1);
    }
}
