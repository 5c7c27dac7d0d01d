//! Batched merge-upserts into a document store keyed by class id.

mod json_dir;
mod memory;

pub use json_dir::JsonDirSink;
pub use memory::MemorySink;

use crate::config::MAX_BATCH_SIZE;
use crate::error::{Result, SinkError};
use crate::log_info;
use crate::model::ClassRecord;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

/// One write. With `merge`, fields present overwrite and absent fields are preserved.
#[derive(Debug, Clone, PartialEq)]
pub struct Upsert {
    pub key: String,
    pub document: Map<String, Value>,
    pub merge: bool,
}

#[async_trait]
pub trait DocumentSink: Send + Sync {
    /// Applies a batch of at most [`MAX_BATCH_SIZE`] writes.
    async fn commit(&self, batch: Vec<Upsert>) -> Result<()>;
}

/// Splits records into bounded batches and commits them one after another.
pub struct BatchWriter<'a> {
    sink: &'a dyn DocumentSink,
    batch_size: usize,
    tag: Option<String>,
}

impl<'a> BatchWriter<'a> {
    pub fn new(sink: &'a dyn DocumentSink, batch_size: usize) -> Self {
        Self {
            sink,
            batch_size: batch_size.clamp(1, MAX_BATCH_SIZE),
            tag: None,
        }
    }

    /// Stamps every document with `scrapedFor`.
    pub fn with_tag(mut self, tag: Option<String>) -> Self {
        self.tag = tag;
        self
    }

    /// Writes every record, returning how many were committed.
    pub async fn write_all(&self, records: &[ClassRecord]) -> Result<usize> {
        let written_at: DateTime<Utc> = Utc::now();
        let mut committed = 0;

        for (index, chunk) in records.chunks(self.batch_size).enumerate() {
            let batch: Vec<Upsert> = chunk
                .iter()
                .map(|record| Upsert {
                    key: record.document_key(),
                    document: record.to_document(written_at, self.tag.as_deref()),
                    merge: true,
                })
                .collect();

            self.sink.commit(batch).await?;
            committed += chunk.len();
            log_info!(
                "[sink] Batch {} saved: {} classes ({} total)",
                index + 1,
                chunk.len(),
                committed
            );
        }

        Ok(committed)
    }
}

pub(crate) fn check_batch(batch: &[Upsert]) -> Result<()> {
    if batch.len() > MAX_BATCH_SIZE {
        return Err(SinkError::BatchTooLarge {
            size: batch.len(),
            limit: MAX_BATCH_SIZE,
        }
        .into());
    }

    for upsert in batch {
        let valid = !upsert.key.is_empty()
            && upsert
                .key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(SinkError::InvalidKey(upsert.key.clone()).into());
        }
    }

    Ok(())
}

/// Recursive merge: nested objects merge key by key, anything else is replaced.
pub(crate) fn merge_into(target: &mut Map<String, Value>, incoming: Map<String, Value>) {
    for (key, value) in incoming {
        match value {
            Value::Object(update) => match target.get_mut(&key) {
                Some(Value::Object(existing)) => merge_into(existing, update),
                _ => {
                    target.insert(key, Value::Object(update));
                }
            },
            value => {
                target.insert(key, value);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::model::{Activity, Enrolment, Location, Schedule, Status, Term};
    use serde_json::json;

    fn record(class_id: u32) -> ClassRecord {
        ClassRecord {
            course_code: "COMP1511".to_string(),
            course_name: String::new(),
            class_id,
            section: "A01".to_string(),
            term: Term::T3,
            activity: Activity::Lecture,
            status: Status::Open,
            enrolment: Enrolment {
                enrolled: 1,
                capacity: 10,
            },
            schedule: Schedule::default(),
            location: Location::default(),
        }
    }

    #[tokio::test]
    async fn splits_into_bounded_batches() {
        let sink = MemorySink::new();
        let records: Vec<_> = (1000..1012).map(record).collect();

        let written = BatchWriter::new(&sink, 5)
            .with_tag(Some("comp-t3-2025".to_string()))
            .write_all(&records)
            .await
            .unwrap();

        assert_eq!(written, 12);
        assert_eq!(sink.batch_sizes().await, vec![5, 5, 2]);
        let stored = sink.get("1011").await.unwrap();
        assert_eq!(stored["scrapedFor"], json!("comp-t3-2025"));
        assert_eq!(stored["classId"], json!(1011));
    }

    #[tokio::test]
    async fn nothing_to_write_commits_nothing() {
        let sink = MemorySink::new();
        let written = BatchWriter::new(&sink, 500).write_all(&[]).await.unwrap();
        assert_eq!(written, 0);
        assert!(sink.batch_sizes().await.is_empty());
    }

    #[test]
    fn merge_preserves_absent_fields() {
        let mut stored = json!({
            "status": "Full",
            "notes": "kept",
            "courseEnrolment": { "enrolments": 30, "capacity": 30, "waitlist": 4 }
        })
        .as_object()
        .cloned()
        .unwrap();
        let update = json!({
            "status": "Open",
            "courseEnrolment": { "enrolments": 29, "capacity": 30 }
        })
        .as_object()
        .cloned()
        .unwrap();

        merge_into(&mut stored, update);
        assert_eq!(
            Value::Object(stored),
            json!({
                "status": "Open",
                "notes": "kept",
                "courseEnrolment": { "enrolments": 29, "capacity": 30, "waitlist": 4 }
            })
        );
    }

    #[test]
    fn rejects_unsafe_keys_and_oversized_batches() {
        let upsert = |key: &str| Upsert {
            key: key.to_string(),
            document: Map::new(),
            merge: true,
        };

        let err = check_batch(&[upsert("../etc")]).unwrap_err();
        assert!(matches!(err, AppError::Sink(SinkError::InvalidKey(_))));

        let batch: Vec<_> = (0..=MAX_BATCH_SIZE).map(|i| upsert(&i.to_string())).collect();
        let err = check_batch(&batch).unwrap_err();
        assert!(matches!(err, AppError::Sink(SinkError::BatchTooLarge { .. })));
    }
}
