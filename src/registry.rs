//! In-memory registry of uploaded papers.
//!
//! File ids are the upload time at second resolution, so two uploads within
//! the same second share an id and the later one replaces the earlier entry.

use chrono::{DateTime, Local, Utc};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{PoisonError, RwLock};

/// Timestamp format of generated file ids.
pub const FILE_ID_FORMAT: &str = "%Y%m%d%H%M%S";

/// A saved upload.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadRecord {
    pub file_id: String,
    pub path: PathBuf,
    pub filename: String,
    pub uploaded_at: DateTime<Utc>,
}

impl UploadRecord {
    /// Create a record stamped with the current time.
    pub fn new(file_id: String, path: PathBuf, filename: String) -> Self {
        Self {
            file_id,
            path,
            filename,
            uploaded_at: Utc::now(),
        }
    }
}

/// Generate a file id from the current local time.
pub fn new_file_id() -> String {
    Local::now().format(FILE_ID_FORMAT).to_string()
}

/// Thread-safe map from file id to upload record.
#[derive(Debug, Default)]
pub struct UploadRegistry {
    records: RwLock<HashMap<String, UploadRecord>>,
}

impl UploadRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record, replacing any record with the same id.
    pub fn put(&self, record: UploadRecord) -> Option<UploadRecord> {
        let mut records = self.records.write().unwrap_or_else(PoisonError::into_inner);
        records.insert(record.file_id.clone(), record)
    }

    pub fn get(&self, file_id: &str) -> Option<UploadRecord> {
        let records = self.records.read().unwrap_or_else(PoisonError::into_inner);
        records.get(file_id).cloned()
    }

    pub fn remove(&self, file_id: &str) -> Option<UploadRecord> {
        let mut records = self.records.write().unwrap_or_else(PoisonError::into_inner);
        records.remove(file_id)
    }

    /// Remove and return every record uploaded before `cutoff`.
    pub fn take_expired(&self, cutoff: DateTime<Utc>) -> Vec<UploadRecord> {
        let mut records = self.records.write().unwrap_or_else(PoisonError::into_inner);
        let expired: Vec<String> = records
            .values()
            .filter(|r| r.uploaded_at < cutoff)
            .map(|r| r.file_id.clone())
            .collect();
        expired
            .iter()
            .filter_map(|id| records.remove(id))
            .collect()
    }

    /// Paths of every registered upload.
    pub fn paths(&self) -> Vec<PathBuf> {
        let records = self.records.read().unwrap_or_else(PoisonError::into_inner);
        records.values().map(|r| r.path.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.records.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn record(id: &str, path: &str) -> UploadRecord {
        UploadRecord::new(id.to_string(), PathBuf::from(path), "paper.pdf".to_string())
    }

    #[test]
    fn test_file_id_format() {
        let id = new_file_id();
        assert_eq!(id.len(), 14);
        assert!(id.chars().all(|c| c.is_ascii_digit()));
        assert!(chrono::NaiveDateTime::parse_from_str(&id, FILE_ID_FORMAT).is_ok());
    }

    #[test]
    fn test_put_get_remove() {
        let registry = UploadRegistry::new();
        assert!(registry.is_empty());

        assert!(registry.put(record("20240101120000", "/tmp/a.pdf")).is_none());
        assert_eq!(
            registry.get("20240101120000").unwrap().path,
            PathBuf::from("/tmp/a.pdf")
        );
        assert!(registry.get("missing").is_none());

        assert_eq!(registry.paths(), vec![PathBuf::from("/tmp/a.pdf")]);
        assert!(registry.remove("20240101120000").is_some());
        assert!(registry.get("20240101120000").is_none());
    }

    #[test]
    fn test_same_second_upload_overwrites() {
        let registry = UploadRegistry::new();
        registry.put(record("20240101120000", "/tmp/first.pdf"));
        let replaced = registry.put(record("20240101120000", "/tmp/second.pdf"));

        assert_eq!(replaced.unwrap().path, PathBuf::from("/tmp/first.pdf"));
        assert_eq!(registry.len(), 1);
        assert_eq!(
            registry.get("20240101120000").unwrap().path,
            PathBuf::from("/tmp/second.pdf")
        );
    }

    #[test]
    fn test_take_expired() {
        let registry = UploadRegistry::new();
        let mut old = record("old", "/tmp/old.pdf");
        old.uploaded_at = Utc::now() - Duration::hours(2);
        registry.put(old);
        registry.put(record("new", "/tmp/new.pdf"));

        let expired = registry.take_expired(Utc::now() - Duration::hours(1));
        assert_eq!(expired.len(), 1);
        assert_eq!(expired[0].file_id, "old");
        assert!(registry.get("new").is_some());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_concurrent_puts() {
        let registry = std::sync::Arc::new(UploadRegistry::new());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let registry = registry.clone();
                std::thread::spawn(move || {
                    registry.put(record(&format!("id{}", i), "/tmp/x.pdf"));
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(registry.len(), 8);
    }
}
