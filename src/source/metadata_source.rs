use async_trait::async_trait;

use crate::maven::coordinates::Coordinate;
use crate::maven::repository::{RepositoryKind, RepositorySource};
use crate::maven::versioning::VersioningRecord;

/// Which kind of versions a metadata lookup is interested in. Repositories that have the
///  corresponding policy disabled are not asked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetadataNature {
    Release,
    ReleaseOrSnapshot,
    Snapshot,
}
impl MetadataNature {
    pub fn is_enabled_for(&self, repository: &RepositorySource) -> bool {
        if repository.kind != RepositoryKind::Remote {
            return true;
        }
        match self {
            MetadataNature::Release => repository.release_policy.enabled,
            MetadataNature::ReleaseOrSnapshot => repository.release_policy.enabled || repository.snapshot_policy.enabled,
            MetadataNature::Snapshot => repository.snapshot_policy.enabled,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MetadataRequest {
    pub group_id: String,
    pub artifact_id: String,
    /// set for the per-version metadata of a snapshot, `None` for GA level metadata
    pub version: Option<String>,
    pub nature: MetadataNature,
}
impl MetadataRequest {
    pub fn for_artifact(coordinate: &Coordinate, nature: MetadataNature) -> MetadataRequest {
        MetadataRequest {
            group_id: coordinate.group_id.clone(),
            artifact_id: coordinate.artifact_id.clone(),
            version: None,
            nature,
        }
    }

    pub fn for_snapshot(coordinate: &Coordinate) -> MetadataRequest {
        MetadataRequest {
            group_id: coordinate.group_id.clone(),
            artifact_id: coordinate.artifact_id.clone(),
            version: Some(coordinate.base_version()),
            nature: MetadataNature::Snapshot,
        }
    }
}

/// Provides one repository's view of an artifact's versioning. `Ok(None)` means the repository
///  has no metadata for the request, which is not an error.
#[async_trait]
pub trait MetadataSource: Send + Sync {
    async fn fetch_versioning(&self, request: &MetadataRequest, repository: &RepositorySource) -> anyhow::Result<Option<VersioningRecord>>;
}
