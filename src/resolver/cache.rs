use dashmap::DashMap;

use crate::maven::coordinates::Coordinate;
use crate::maven::repository::{RepositoryKey, RepositoryKind, RepositorySource};
use crate::resolver::error::ResolutionIssue;

/// Fingerprint of a version resolution request. Repository managers are replaced by the
///  repositories they mirror, and the request context only matters if there was such a
///  replacement, since it is what distinguishes otherwise identical mirror setups.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    group_id: String,
    artifact_id: String,
    classifier: String,
    extension: String,
    version: String,
    request_context: String,
    local_repository: RepositoryKey,
    workspace: Option<RepositoryKey>,
    repositories: Vec<RepositoryKey>,
}
impl CacheKey {
    pub fn new(
        coordinate: &Coordinate,
        repositories: &[RepositorySource],
        request_context: &str,
        local_repository: &RepositorySource,
        workspace: Option<&RepositorySource>,
    ) -> CacheKey {
        let mut expanded = false;
        let mut keys = Vec::with_capacity(repositories.len());
        for repository in repositories {
            if repository.repository_manager {
                expanded = true;
                keys.extend(repository.mirrored_repositories.iter().map(|r| r.key()));
            }
            else {
                keys.push(repository.key());
            }
        }

        CacheKey {
            group_id: coordinate.group_id.clone(),
            artifact_id: coordinate.artifact_id.clone(),
            classifier: coordinate.classifier.clone(),
            extension: coordinate.extension.clone(),
            version: coordinate.version.clone(),
            request_context: if expanded { request_context.to_string() } else { String::new() },
            local_repository: local_repository.key(),
            workspace: workspace.map(|w| w.key()),
            repositories: keys,
        }
    }
}

/// A previously resolved version. The repository is stored by kind and id only, and looked up in
///  the current request when the entry is used. Issues are kept so that a cache hit reports the
///  same result as the original resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    pub version: String,
    pub repository: Option<(RepositoryKind, String)>,
    pub issues: Vec<ResolutionIssue>,
}
impl CacheEntry {
    pub fn new(version: &str, repository: Option<&RepositorySource>) -> CacheEntry {
        CacheEntry {
            version: version.to_string(),
            repository: repository.map(|r| (r.kind, r.id.clone())),
            issues: vec![],
        }
    }

    pub fn with_issues(self, issues: Vec<ResolutionIssue>) -> CacheEntry {
        CacheEntry {
            issues,
            ..self
        }
    }

    pub fn materialize_repository(
        &self,
        repositories: &[RepositorySource],
        local_repository: &RepositorySource,
        workspace: Option<&RepositorySource>,
    ) -> Option<RepositorySource> {
        let (kind, id) = self.repository.as_ref()?;
        match kind {
            RepositoryKind::Workspace => workspace.cloned(),
            RepositoryKind::Local => Some(local_repository.clone()),
            RepositoryKind::Remote => repositories.iter()
                .find(|r| &r.id == id)
                .cloned(),
        }
    }
}

/// Session scoped cache of version resolution results. Concurrent resolutions of the same key
///  may both compute and insert a result, the last write wins.
#[derive(Debug, Default)]
pub struct ResolutionCache {
    entries: DashMap<CacheKey, CacheEntry>,
}
impl ResolutionCache {
    pub fn new() -> ResolutionCache {
        Default::default()
    }

    pub fn get(&self, key: &CacheKey) -> Option<CacheEntry> {
        self.entries.get(key)
            .map(|e| e.value().clone())
    }

    pub fn insert(&self, key: CacheKey, entry: CacheEntry) {
        self.entries.insert(key, entry);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

}
