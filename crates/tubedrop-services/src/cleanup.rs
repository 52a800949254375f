use chrono::{DateTime, TimeDelta, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::interval;
use tubedrop_storage::Storage;

/// Deletes published files once they are older than the retention window.
#[derive(Clone)]
pub struct GarbageCollector {
    storage: Arc<dyn Storage>,
}

impl GarbageCollector {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    /// Start the background sweep, running now and then every `period`.
    /// Returns a JoinHandle for graceful shutdown
    pub fn start(self: Arc<Self>, period: Duration, max_age: Duration) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let mut sweep_interval = interval(period);

            loop {
                sweep_interval.tick().await;

                let Some(cutoff) = cutoff_before_now(max_age) else {
                    tracing::error!(max_age_secs = max_age.as_secs(), "Retention window out of range, skipping sweep");
                    continue;
                };

                tracing::info!(cutoff = %cutoff, "Starting scheduled garbage collection");

                match self.delete_stale_files(cutoff).await {
                    Ok(deleted) => tracing::info!(deleted, "Garbage collection completed"),
                    Err(e) => tracing::error!(error = %e, "Garbage collection failed"),
                }

                tracing::debug!(sleep_secs = period.as_secs(), "Sleeping before next garbage collection");
            }
        })
    }

    /// Delete every uploaded file last modified strictly before `cutoff`.
    ///
    /// A failed delete is logged and skipped. Returns how many files were deleted.
    #[tracing::instrument(skip(self), fields(backend = %self.storage.backend_type()))]
    pub async fn delete_stale_files(&self, cutoff: DateTime<Utc>) -> Result<usize, anyhow::Error> {
        let remote_files = self.storage.list_all_uploaded_files().await?;
        let mut deleted = 0;

        for remote_file in remote_files {
            if remote_file.last_modified >= cutoff {
                continue;
            }

            tracing::info!(
                path = %remote_file.path,
                last_modified = %remote_file.last_modified,
                "Deleting stale file"
            );

            match self.storage.delete_file(&remote_file.path).await {
                Ok(()) => deleted += 1,
                Err(e) => {
                    tracing::error!(
                        error = %e,
                        path = %remote_file.path,
                        "Failed to delete stale file, continuing"
                    );
                }
            }
        }

        Ok(deleted)
    }
}

/// `now - max_age`, or `None` if that is not representable.
pub fn cutoff_before_now(max_age: Duration) -> Option<DateTime<Utc>> {
    let max_age = TimeDelta::from_std(max_age).ok()?;
    Utc::now().checked_sub_signed(max_age)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tubedrop_storage::InMemoryStorage;

    #[tokio::test]
    async fn test_deletes_only_files_older_than_cutoff() {
        let storage = Arc::new(InMemoryStorage::new());
        storage.seed_file("fresh", TimeDelta::hours(1)).await;
        storage.seed_file("stale", TimeDelta::hours(25)).await;
        storage.seed_file("ancient", TimeDelta::days(30)).await;
        storage.seed_file("recent", TimeDelta::minutes(10)).await;

        let gc = GarbageCollector::new(storage.clone());
        let cutoff = cutoff_before_now(Duration::from_secs(24 * 60 * 60)).unwrap();
        let deleted = gc.delete_stale_files(cutoff).await.unwrap();

        assert_eq!(deleted, 2);
        assert_eq!(storage.file_names().await, vec!["fresh", "recent"]);
    }

    #[tokio::test]
    async fn test_empty_store() {
        let gc = GarbageCollector::new(Arc::new(InMemoryStorage::new()));
        assert_eq!(gc.delete_stale_files(Utc::now()).await.unwrap(), 0);
    }

    #[test]
    fn test_cutoff_out_of_range() {
        assert!(cutoff_before_now(Duration::from_secs(u64::MAX)).is_none());
        let cutoff = cutoff_before_now(Duration::from_secs(60)).unwrap();
        assert!(cutoff < Utc::now());
    }

    #[tokio::test]
    async fn test_background_sweep_runs_immediately() {
        let storage = Arc::new(InMemoryStorage::new());
        storage.seed_file("stale", TimeDelta::days(2)).await;

        let gc = Arc::new(GarbageCollector::new(storage.clone()));
        let handle = gc.start(Duration::from_secs(3600), Duration::from_secs(24 * 60 * 60));

        for _ in 0..100 {
            if storage.file_names().await.is_empty() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        handle.abort();
        assert!(storage.file_names().await.is_empty());
    }
}
