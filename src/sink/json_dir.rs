use super::{check_batch, merge_into, DocumentSink, Upsert};
use crate::error::{Result, SinkError};
use crate::utils;
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

/// Stores each document as pretty JSON at `<dir>/<key>.json`.
pub struct JsonDirSink {
    dir: PathBuf,
}

impl JsonDirSink {
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        utils::ensure_directory(&dir)?;
        Ok(Self { dir })
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }

    pub fn read(&self, key: &str) -> Result<Option<Map<String, Value>>> {
        read_document(&self.path_for(key))
    }
}

fn read_document(path: &Path) -> Result<Option<Map<String, Value>>> {
    if !path.exists() {
        return Ok(None);
    }

    let content = std::fs::read_to_string(path)?;
    match serde_json::from_str::<Value>(&content)? {
        Value::Object(map) => Ok(Some(map)),
        _ => Err(SinkError::Write {
            key: path.display().to_string(),
            reason: "stored document is not an object".to_string(),
        }
        .into()),
    }
}

#[async_trait]
impl DocumentSink for JsonDirSink {
    async fn commit(&self, batch: Vec<Upsert>) -> Result<()> {
        check_batch(&batch)?;

        // Resolve every merged document before writing any, so a bad stored file
        // fails the batch without a partial write.
        let mut resolved = Vec::with_capacity(batch.len());
        for upsert in batch {
            let path = self.path_for(&upsert.key);
            let document = match read_document(&path)? {
                Some(mut existing) if upsert.merge => {
                    merge_into(&mut existing, upsert.document);
                    existing
                }
                _ => upsert.document,
            };
            resolved.push((path, document));
        }

        for (path, document) in resolved {
            utils::save_json(&document, &path)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn upsert(key: &str, document: Value, merge: bool) -> Upsert {
        Upsert {
            key: key.to_string(),
            document: document.as_object().cloned().unwrap(),
            merge,
        }
    }

    #[tokio::test]
    async fn merges_into_existing_documents() {
        let dir = tempfile::tempdir().unwrap();
        let sink = JsonDirSink::new(dir.path().join("classes")).unwrap();

        sink.commit(vec![upsert(
            "12345",
            json!({ "status": "Full", "notifiedUsers": ["u1"] }),
            true,
        )])
        .await
        .unwrap();
        sink.commit(vec![upsert("12345", json!({ "status": "Open" }), true)])
            .await
            .unwrap();

        let stored = sink.read("12345").unwrap().unwrap();
        assert_eq!(
            Value::Object(stored),
            json!({ "status": "Open", "notifiedUsers": ["u1"] })
        );
    }

    #[tokio::test]
    async fn replaces_without_merge() {
        let dir = tempfile::tempdir().unwrap();
        let sink = JsonDirSink::new(dir.path()).unwrap();

        sink.commit(vec![upsert("1", json!({ "a": 1, "b": 2 }), true)])
            .await
            .unwrap();
        sink.commit(vec![upsert("1", json!({ "a": 3 }), false)])
            .await
            .unwrap();

        assert_eq!(
            Value::Object(sink.read("1").unwrap().unwrap()),
            json!({ "a": 3 })
        );
        assert!(sink.read("2").unwrap().is_none());
    }
}
