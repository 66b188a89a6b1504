use std::collections::HashSet;
use std::iter::once;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, trace};

use crate::maven::coordinates::Coordinate;
use crate::maven::repository::{dedup_repositories, RepositorySource};
use crate::maven::version::GenericVersion;
use crate::maven::version_range::VersionConstraint;
use crate::resolver::context::ResolutionContext;
use crate::resolver::error::{ResolutionIssue, VersionRangeResolutionError};
use crate::source::events::{EventKind, RepositoryEvent};
use crate::source::metadata_source::{MetadataNature, MetadataRequest, MetadataSource};
use crate::util::fan_out::fan_out;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeVersion {
    pub version: GenericVersion,
    /// the first repository that reported the version, `None` for a pinned version
    pub repository: Option<RepositorySource>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeResult {
    pub constraint: VersionConstraint,
    /// ascending
    pub versions: Vec<RangeVersion>,
    pub issues: Vec<ResolutionIssue>,
}
impl RangeResult {
    pub fn version_strings(&self) -> Vec<String> {
        self.versions.iter()
            .map(|v| v.version.to_string())
            .collect()
    }
}

/// Resolves a coordinate whose version is a range to all matching versions
#[async_trait]
pub trait VersionRangeResolver: Send + Sync {
    async fn resolve_version_range(&self, coordinate: &Coordinate, repositories: &[RepositorySource], context: &ResolutionContext) -> Result<RangeResult, VersionRangeResolutionError>;
}

/// Lists the versions known to the workspace and to all repositories' metadata, and keeps those
///  matching the range
pub struct DefaultVersionRangeResolver {
    metadata: Arc<dyn MetadataSource>,
}
impl DefaultVersionRangeResolver {
    pub fn new(metadata: Arc<dyn MetadataSource>) -> DefaultVersionRangeResolver {
        DefaultVersionRangeResolver {
            metadata,
        }
    }

    /// every known version with the first source that reported it, workspace first
    async fn known_versions(
        &self,
        coordinate: &Coordinate,
        repositories: &[RepositorySource],
        context: &ResolutionContext,
        issues: &mut Vec<ResolutionIssue>,
    ) -> Result<Vec<(String, RepositorySource)>, VersionRangeResolutionError> {
        let mut known: Vec<(String, RepositorySource)> = Vec::new();
        let mut seen = HashSet::new();
        let mut add = |version: &str, repository: &RepositorySource| {
            if seen.insert(version.to_string()) {
                known.push((version.to_string(), repository.clone()));
            }
        };

        if let Some(workspace) = &context.session.workspace {
            let identity = workspace.identity();
            for version in workspace.find_versions(&coordinate.group_id, &coordinate.artifact_id) {
                add(&version, &identity);
            }
        }

        let request = MetadataRequest::for_artifact(coordinate, MetadataNature::ReleaseOrSnapshot);
        let sources = once(&context.session.local_repository)
            .chain(repositories.iter().filter(|r| request.nature.is_enabled_for(r)))
            .collect::<Vec<_>>();

        let fetched = fan_out(
            sources.iter().map(|repository| self.metadata.fetch_versioning(&request, repository)),
            &context.cancel,
            context.deadline,
        ).await
            .map_err(|cause| VersionRangeResolutionError::Interrupted {
                coordinate: coordinate.clone(),
                cause,
            })?;

        for (repository, outcome) in sources.into_iter().zip(fetched) {
            match outcome {
                Ok(Ok(Some(record))) => {
                    for version in &record.versions {
                        add(version, repository);
                    }
                }
                Ok(Ok(None)) => {}
                Ok(Err(e)) => {
                    let cause = format!("{:#}", e);
                    context.session.emit(RepositoryEvent {
                        kind: EventKind::MetadataInvalid,
                        coordinate: coordinate.clone(),
                        repository: Some(repository.clone()),
                        cause: cause.clone(),
                    });
                    issues.push(ResolutionIssue::MetadataFetch {
                        coordinate: coordinate.to_string(),
                        repository: repository.id.clone(),
                        cause,
                    });
                }
                Err(interrupted) => {
                    issues.push(ResolutionIssue::MetadataFetch {
                        coordinate: coordinate.to_string(),
                        repository: repository.id.clone(),
                        cause: interrupted.to_string(),
                    });
                }
            }
        }
        Ok(known)
    }
}

#[async_trait]
impl VersionRangeResolver for DefaultVersionRangeResolver {
    async fn resolve_version_range(&self, coordinate: &Coordinate, repositories: &[RepositorySource], context: &ResolutionContext) -> Result<RangeResult, VersionRangeResolutionError> {
        let constraint = VersionConstraint::parse(&coordinate.version)
            .map_err(|source| VersionRangeResolutionError::InvalidConstraint {
                coordinate: coordinate.clone(),
                source,
            })?;

        if let Some(pinned) = constraint.pinned() {
            trace!("{} is not a range", coordinate);
            return Ok(RangeResult {
                versions: vec![RangeVersion {
                    version: pinned.clone(),
                    repository: None,
                }],
                constraint,
                issues: vec![],
            });
        }

        let mut issues = Vec::new();
        let known = self.known_versions(coordinate, &dedup_repositories(repositories), context, &mut issues).await?;

        let mut versions = Vec::new();
        for (version, repository) in known {
            match GenericVersion::parse(&version) {
                Ok(parsed) => {
                    if constraint.contains(&parsed) {
                        versions.push(RangeVersion {
                            version: parsed,
                            repository: Some(repository),
                        });
                    }
                }
                Err(e) => issues.push(ResolutionIssue::UnparseableVersion {
                    coordinate: coordinate.to_string(),
                    version,
                    cause: e.to_string(),
                }),
            }
        }
        versions.sort_by(|a, b| a.version.cmp(&b.version));

        debug!("{} matches {} versions", coordinate, versions.len());
        Ok(RangeResult {
            constraint,
            versions,
            issues,
        })
    }
}
