use super::{check_batch, merge_into, DocumentSink, Upsert};
use crate::error::Result;
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use tokio::sync::Mutex;

/// Keeps documents in memory. Backs dry runs and tests.
#[derive(Default)]
pub struct MemorySink {
    documents: Mutex<BTreeMap<String, Map<String, Value>>>,
    batches: Mutex<Vec<usize>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, key: &str) -> Option<Map<String, Value>> {
        self.documents.lock().await.get(key).cloned()
    }

    pub async fn len(&self) -> usize {
        self.documents.lock().await.len()
    }

    /// Size of every committed batch, in commit order.
    pub async fn batch_sizes(&self) -> Vec<usize> {
        self.batches.lock().await.clone()
    }
}

#[async_trait]
impl DocumentSink for MemorySink {
    async fn commit(&self, batch: Vec<Upsert>) -> Result<()> {
        check_batch(&batch)?;

        let size = batch.len();
        let mut documents = self.documents.lock().await;
        for upsert in batch {
            match documents.entry(upsert.key) {
                Entry::Occupied(mut entry) if upsert.merge => {
                    merge_into(entry.get_mut(), upsert.document)
                }
                Entry::Occupied(mut entry) => {
                    entry.insert(upsert.document);
                }
                Entry::Vacant(entry) => {
                    entry.insert(upsert.document);
                }
            }
        }
        self.batches.lock().await.push(size);
        Ok(())
    }
}
