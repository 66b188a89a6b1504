use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use anyhow::anyhow;
use async_trait::async_trait;

use crate::maven::repository::RepositorySource;
use crate::maven::versioning::VersioningRecord;
use crate::source::metadata_source::{MetadataRequest, MetadataSource};

/// (repository id, groupId, artifactId, version)
type RecordKey = (String, String, String, Option<String>);

/// in-memory metadata, neither optimized nor particularly robust - for testing purposes
#[derive(Default)]
pub struct TransientMetadataSource {
    records: Mutex<HashMap<RecordKey, Result<VersioningRecord, String>>>,
    fetches: Mutex<Vec<String>>,
    num_fetches: AtomicUsize,
    delay: Option<Duration>,
}
impl TransientMetadataSource {
    pub fn new() -> TransientMetadataSource {
        Default::default()
    }

    /// every fetch waits this long before answering
    pub fn with_delay(delay: Duration) -> TransientMetadataSource {
        TransientMetadataSource {
            delay: Some(delay),
            ..Default::default()
        }
    }

    pub fn put(&self, repository_id: &str, group_id: &str, artifact_id: &str, version: Option<&str>, record: VersioningRecord) {
        self.records.lock()
            .unwrap()
            .insert(Self::key(repository_id, group_id, artifact_id, version), Ok(record));
    }

    pub fn put_failure(&self, repository_id: &str, group_id: &str, artifact_id: &str, version: Option<&str>, message: &str) {
        self.records.lock()
            .unwrap()
            .insert(Self::key(repository_id, group_id, artifact_id, version), Err(message.to_string()));
    }

    pub fn num_fetches(&self) -> usize {
        self.num_fetches.load(Ordering::SeqCst)
    }

    /// ids of the repositories that were asked, in the order the fetches started
    pub fn fetched_repositories(&self) -> Vec<String> {
        self.fetches.lock().unwrap().clone()
    }

    fn key(repository_id: &str, group_id: &str, artifact_id: &str, version: Option<&str>) -> RecordKey {
        (repository_id.to_string(), group_id.to_string(), artifact_id.to_string(), version.map(|v| v.to_string()))
    }
}

#[async_trait]
impl MetadataSource for TransientMetadataSource {
    async fn fetch_versioning(&self, request: &MetadataRequest, repository: &RepositorySource) -> anyhow::Result<Option<VersioningRecord>> {
        self.num_fetches.fetch_add(1, Ordering::SeqCst);
        self.fetches.lock().unwrap().push(repository.id.clone());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let key = Self::key(&repository.id, &request.group_id, &request.artifact_id, request.version.as_deref());
        match self.records.lock().unwrap().get(&key) {
            None => Ok(None),
            Some(Ok(record)) => Ok(Some(record.clone())),
            Some(Err(msg)) => Err(anyhow!("{}", msg)),
        }
    }
}
