//! In-process record of submitted downloads.
//!
//! The server hands out an id as soon as a download is accepted and runs the
//! job in the background. Pages and the JSON API read the job's state here.
//! Records live only as long as the process.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DownloadStatus {
    Pending,
    Completed { url: String },
    Failed { error: String },
}

impl DownloadStatus {
    pub fn is_pending(&self) -> bool {
        matches!(self, DownloadStatus::Pending)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DownloadRecord {
    pub id: Uuid,
    pub remote_url: String,
    pub audio_only: bool,
    #[serde(flatten)]
    pub status: DownloadStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Default)]
pub struct DownloadRegistry {
    records: RwLock<HashMap<Uuid, DownloadRecord>>,
}

impl DownloadRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a pending download and return its record.
    pub async fn create(&self, remote_url: &str, audio_only: bool) -> DownloadRecord {
        let now = Utc::now();
        let record = DownloadRecord {
            id: Uuid::new_v4(),
            remote_url: remote_url.to_string(),
            audio_only,
            status: DownloadStatus::Pending,
            created_at: now,
            updated_at: now,
        };
        self.records.write().await.insert(record.id, record.clone());
        record
    }

    pub async fn complete(&self, id: Uuid, url: String) {
        self.finish(id, DownloadStatus::Completed { url }).await;
    }

    pub async fn fail(&self, id: Uuid, error: String) {
        self.finish(id, DownloadStatus::Failed { error }).await;
    }

    async fn finish(&self, id: Uuid, status: DownloadStatus) {
        let mut records = self.records.write().await;
        match records.get_mut(&id) {
            Some(record) => {
                record.status = status;
                record.updated_at = Utc::now();
            }
            None => tracing::warn!(download_id = %id, "Finished download has no record"),
        }
    }

    pub async fn get(&self, id: Uuid) -> Option<DownloadRecord> {
        self.records.read().await.get(&id).cloned()
    }

    /// Number of downloads still running.
    pub async fn pending_count(&self) -> usize {
        self.records
            .read()
            .await
            .values()
            .filter(|record| record.status.is_pending())
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_lifecycle() {
        let registry = DownloadRegistry::new();
        let first = registry.create("https://example.com/a", true).await;
        let second = registry.create("https://example.com/b", false).await;
        assert_ne!(first.id, second.id);
        assert_eq!(registry.pending_count().await, 2);

        registry
            .complete(first.id, "https://bucket/link".to_string())
            .await;
        registry.fail(second.id, "Failed to download media".to_string()).await;

        let first = registry.get(first.id).await.unwrap();
        assert_eq!(
            first.status,
            DownloadStatus::Completed {
                url: "https://bucket/link".to_string()
            }
        );
        assert!(first.updated_at >= first.created_at);
        assert!(matches!(
            registry.get(second.id).await.unwrap().status,
            DownloadStatus::Failed { .. }
        ));
        assert_eq!(registry.pending_count().await, 0);
    }

    #[tokio::test]
    async fn test_unknown_id() {
        let registry = DownloadRegistry::new();
        assert!(registry.get(Uuid::new_v4()).await.is_none());
        // Finishing an unknown id is logged and ignored.
        registry.complete(Uuid::new_v4(), "x".to_string()).await;
        assert_eq!(registry.pending_count().await, 0);
    }

    #[test]
    fn test_status_is_flattened_into_record_json() {
        let record = DownloadRecord {
            id: Uuid::nil(),
            remote_url: "https://example.com/a".to_string(),
            audio_only: true,
            status: DownloadStatus::Completed {
                url: "https://bucket/link".to_string(),
            },
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["status"], "completed");
        assert_eq!(json["url"], "https://bucket/link");
        assert_eq!(json["audio_only"], true);
    }
}
