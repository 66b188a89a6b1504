use std::iter::once;
use std::sync::Arc;

use async_recursion::async_recursion;
use tracing::{debug, trace};

use crate::maven::coordinates::{Coordinate, VersionToken, SNAPSHOT};
use crate::maven::repository::{dedup_repositories, RepositoryKind, RepositorySource};
use crate::maven::versioning::VersioningRecord;
use crate::resolver::cache::{CacheEntry, CacheKey};
use crate::resolver::context::ResolutionContext;
use crate::resolver::error::{ResolutionIssue, VersionResolutionError};
use crate::resolver::merge::{MergeRole, MetadataMerger};
use crate::source::events::{EventKind, RepositoryEvent};
use crate::source::metadata_source::{MetadataNature, MetadataRequest, MetadataSource};
use crate::util::fan_out::fan_out;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedVersion {
    pub version: String,
    /// `None` if no repository vouches for the version, e.g. for versions that were exact to begin with
    pub repository: Option<RepositorySource>,
    pub issues: Vec<ResolutionIssue>,
}

/// Resolves 'RELEASE', 'LATEST' and snapshot versions to the concrete version they currently
///  stand for, based on the metadata of all repositories involved.
pub struct VersionResolver {
    metadata: Arc<dyn MetadataSource>,
}
impl VersionResolver {
    pub fn new(metadata: Arc<dyn MetadataSource>) -> VersionResolver {
        VersionResolver {
            metadata,
        }
    }

    #[async_recursion]
    pub async fn resolve_version(&self, coordinate: &Coordinate, repositories: &[RepositorySource], context: &ResolutionContext) -> Result<ResolvedVersion, VersionResolutionError> {
        let repositories = &dedup_repositories(repositories);
        let session = &context.session;
        let workspace = session.workspace_identity();

        let cache_key = if session.caching_enabled() {
            Some(CacheKey::new(coordinate, repositories, &context.request_context, &session.local_repository, workspace.as_ref()))
        }
        else {
            None
        };

        if let Some(entry) = cache_key.as_ref().and_then(|key| session.cache.get(key)) {
            debug!("version of {} resolved from cache: {}", coordinate, entry.version);
            return Ok(ResolvedVersion {
                repository: entry.materialize_repository(repositories, &session.local_repository, workspace.as_ref()),
                version: entry.version,
                issues: entry.issues,
            });
        }

        let request = match coordinate.version_token() {
            VersionToken::Release => MetadataRequest::for_artifact(coordinate, MetadataNature::Release),
            VersionToken::Latest => MetadataRequest::for_artifact(coordinate, MetadataNature::ReleaseOrSnapshot),
            VersionToken::Snapshot(version) => {
                if let Some(workspace) = &session.workspace {
                    if workspace.find_versions(&coordinate.group_id, &coordinate.artifact_id).contains(version) {
                        trace!("{} is provided by the workspace", coordinate);
                        return Ok(ResolvedVersion {
                            version: version.to_string(),
                            repository: Some(workspace.identity()),
                            issues: vec![],
                        });
                    }
                }
                MetadataRequest::for_snapshot(coordinate)
            }
            VersionToken::Exact(version) | VersionToken::Range(version) => {
                let repository = session.workspace.as_ref()
                    .filter(|w| w.owns(coordinate))
                    .map(|w| w.identity());
                return Ok(ResolvedVersion {
                    version: version.to_string(),
                    repository,
                    issues: vec![],
                });
            }
        };

        let mut issues = Vec::new();
        let merger = self.merge_metadata(coordinate, &request, repositories, context, &mut issues).await?;

        let (version, repository) = match coordinate.version_token() {
            VersionToken::Release => match merger.winner(&MergeRole::Release) {
                Some(winner) => (winner.version.clone(), Some(winner.repository.clone())),
                None => (String::new(), None),
            },
            VersionToken::Latest => {
                let winner = merger.winner(&MergeRole::Latest)
                    .or_else(|| merger.winner(&MergeRole::Release))
                    .cloned();

                match winner {
                    Some(winner) if winner.version.ends_with(SNAPSHOT) => {
                        let sub_repositories = if winner.repository.kind == RepositoryKind::Remote {
                            vec![winner.repository.clone()]
                        }
                        else {
                            repositories.to_vec()
                        };
                        debug!("LATEST of {} is snapshot {} from {}", coordinate, winner.version, winner.repository);

                        let snapshot = coordinate.with_version(&winner.version);
                        match self.resolve_version(&snapshot, &sub_repositories, context).await {
                            Ok(mut sub_result) => {
                                issues.append(&mut sub_result.issues);
                                (sub_result.version, sub_result.repository)
                            }
                            Err(VersionResolutionError::Unresolved { issues: mut sub_issues, .. }) => {
                                issues.append(&mut sub_issues);
                                (String::new(), None)
                            }
                            Err(e) => return Err(e),
                        }
                    }
                    Some(winner) => (winner.version, Some(winner.repository)),
                    None => (String::new(), None),
                }
            }
            _ => {
                let role = MergeRole::snapshot_variant(&coordinate.classifier, &coordinate.extension);
                let mut merger = merger;
                merger.merge_across_roles(&MergeRole::Snapshot, &role);
                match merger.winner(&role) {
                    Some(winner) => (winner.version.clone(), Some(winner.repository.clone())),
                    None => (coordinate.version.clone(), None),
                }
            }
        };

        if version.is_empty() {
            return Err(VersionResolutionError::Unresolved {
                coordinate: coordinate.clone(),
                issues,
            });
        }

        if let Some(key) = cache_key {
            if self.is_safely_cacheable(coordinate, context) {
                session.cache.insert(key, CacheEntry::new(&version, repository.as_ref()).with_issues(issues.clone()));
            }
        }

        debug!("resolved {} to version {}", coordinate, version);
        Ok(ResolvedVersion {
            version,
            repository,
            issues,
        })
    }

    /// Fetches the metadata of the local repository and all remote repositories concurrently, and
    ///  merges whatever was fetched successfully
    async fn merge_metadata(
        &self,
        coordinate: &Coordinate,
        request: &MetadataRequest,
        repositories: &[RepositorySource],
        context: &ResolutionContext,
        issues: &mut Vec<ResolutionIssue>,
    ) -> Result<MetadataMerger, VersionResolutionError> {
        let sources = once(&context.session.local_repository)
            .chain(repositories.iter().filter(|r| request.nature.is_enabled_for(r)))
            .collect::<Vec<_>>();

        let fetched = fan_out(
            sources.iter().map(|repository| self.metadata.fetch_versioning(request, repository)),
            &context.cancel,
            context.deadline,
        ).await
            .map_err(|cause| VersionResolutionError::Interrupted {
                coordinate: coordinate.clone(),
                cause,
            })?;

        let mut merger = MetadataMerger::new();
        for (repository, outcome) in sources.into_iter().zip(fetched) {
            let record = match outcome {
                Ok(Ok(Some(record))) => record,
                Ok(Ok(None)) => continue,
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
                    continue;
                }
                Err(interrupted) => {
                    debug!("no metadata for {} from {}: {}", coordinate, repository, interrupted);
                    issues.push(ResolutionIssue::MetadataFetch {
                        coordinate: coordinate.to_string(),
                        repository: repository.id.clone(),
                        cause: interrupted.to_string(),
                    });
                    continue;
                }
            };

            let record = self.repair_local_record(coordinate, record, repository, context, issues);
            merger.merge_record(&coordinate.version, &record, repository);
        }
        Ok(merger)
    }

    /// Snapshot build numbers in the local repository's own metadata mean that a remote repository
    ///  with the id 'local' overwrote it. Only the timestamp is kept in that case.
    fn repair_local_record(
        &self,
        coordinate: &Coordinate,
        record: VersioningRecord,
        repository: &RepositorySource,
        context: &ResolutionContext,
        issues: &mut Vec<ResolutionIssue>,
    ) -> VersioningRecord {
        if repository.kind != RepositoryKind::Local || !record.has_remote_snapshot_data() {
            return record;
        }

        let cause = format!(
            "snapshot information corrupted with remote repository data, please verify that no remote repository uses the id '{}'",
            repository.id,
        );
        context.session.emit(RepositoryEvent {
            kind: EventKind::MetadataInvalid,
            coordinate: coordinate.clone(),
            repository: Some(repository.clone()),
            cause: cause.clone(),
        });
        issues.push(ResolutionIssue::MetadataInvalid {
            coordinate: coordinate.to_string(),
            repository: repository.id.clone(),
            cause,
        });
        record.repaired_local_copy()
    }

    /// the workspace is in flux, so nothing it provides is cached
    fn is_safely_cacheable(&self, coordinate: &Coordinate, context: &ResolutionContext) -> bool {
        match &context.session.workspace {
            None => true,
            Some(workspace) => !workspace.owns(&coordinate.descriptor()),
        }
    }
}

#[cfg(test)]
mod test {
    use std::time::Duration;

    use tokio_util::sync::CancellationToken;

    use super::*;
    use crate::config::{keys, MapConfiguration};
    use crate::maven::versioning::{SnapshotMarker, SnapshotVariant};
    use crate::resolver::test_support::*;
    use crate::source::transient_metadata_source::TransientMetadataSource;
    use crate::source::workspace::TransientWorkspace;
    use crate::util::fan_out::Interrupted;

    fn resolver(metadata: &Arc<TransientMetadataSource>) -> VersionResolver {
        VersionResolver::new(metadata.clone())
    }

    #[tokio::test]
    async fn test_release_from_most_recent_repository() {
        init_tracing();
        let metadata = Arc::new(TransientMetadataSource::new());
        metadata.put("repo-1", "g", "a", None, release_record("2.0", "20230101000000"));
        metadata.put("repo-2", "g", "a", None, release_record("2.1", "20230601000000"));

        let ctx = context(session());
        let result = resolver(&metadata)
            .resolve_version(&Coordinate::new("g", "a", "RELEASE"), &[remote("repo-1"), remote("repo-2")], &ctx)
            .await.unwrap();

        assert_eq!(result.version, "2.1");
        assert_eq!(result.repository, Some(remote("repo-2")));
        assert!(result.issues.is_empty());
        assert_eq!(metadata.fetched_repositories().len(), 3);
        assert_eq!(metadata.fetched_repositories()[0], "local");
    }

    #[tokio::test]
    async fn test_release_without_metadata_fails() {
        let metadata = Arc::new(TransientMetadataSource::new());
        metadata.put_failure("repo-1", "g", "a", None, "connection refused");

        let ctx = context(session());
        let result = resolver(&metadata)
            .resolve_version(&Coordinate::new("g", "a", "RELEASE"), &[remote("repo-1")], &ctx)
            .await;

        match result {
            Err(VersionResolutionError::Unresolved { issues, .. }) => {
                assert_eq!(issues.len(), 1);
                assert!(issues[0].to_string().contains("connection refused"));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_failing_repository_does_not_prevent_resolution() {
        let metadata = Arc::new(TransientMetadataSource::new());
        metadata.put_failure("repo-1", "g", "a", None, "connection refused");
        metadata.put("repo-2", "g", "a", None, release_record("1.0", "20230101000000"));
        let (session, events) = session_with_events();

        let ctx = context(session);
        let result = resolver(&metadata)
            .resolve_version(&Coordinate::new("g", "a", "RELEASE"), &[remote("repo-1"), remote("repo-2")], &ctx)
            .await.unwrap();

        assert_eq!(result.version, "1.0");
        assert_eq!(result.issues.len(), 1);
        assert_eq!(events.kinds(), vec![EventKind::MetadataInvalid]);
    }

    #[tokio::test]
    async fn test_latest_falls_back_to_release() {
        let metadata = Arc::new(TransientMetadataSource::new());
        metadata.put("repo-1", "g", "a", None, release_record("3.0", "20230101000000"));

        let ctx = context(session());
        let result = resolver(&metadata)
            .resolve_version(&Coordinate::new("g", "a", "LATEST"), &[remote("repo-1")], &ctx)
            .await.unwrap();

        assert_eq!(result.version, "3.0");
        assert_eq!(result.repository, Some(remote("repo-1")));
    }

    #[tokio::test]
    async fn test_latest_snapshot_is_resolved_in_winning_repository() {
        let metadata = Arc::new(TransientMetadataSource::new());
        metadata.put("releases", "g", "a", None, VersioningRecord {
            latest: Some("1.0".to_string()),
            last_updated: Some("20230101000000".to_string()),
            ..Default::default()
        });
        metadata.put("snapshots", "g", "a", None, VersioningRecord {
            latest: Some("1.1-SNAPSHOT".to_string()),
            last_updated: Some("20230601000000".to_string()),
            ..Default::default()
        });
        metadata.put("snapshots", "g", "a", Some("1.1-SNAPSHOT"), snapshot_record("20230601.101500", 3, "20230601101500"));

        let ctx = context(session());
        let result = resolver(&metadata)
            .resolve_version(&Coordinate::new("g", "a", "LATEST"), &[remote("releases"), remote("snapshots")], &ctx)
            .await.unwrap();

        assert_eq!(result.version, "1.1-20230601.101500-3");
        assert_eq!(result.repository, Some(remote("snapshots")));
        // local, releases, snapshots - then local and snapshots for the snapshot itself
        assert_eq!(metadata.fetched_repositories()[3..], ["local".to_string(), "snapshots".to_string()]);
    }

    #[tokio::test]
    async fn test_snapshot_variant() {
        let metadata = Arc::new(TransientMetadataSource::new());
        metadata.put("snapshots", "g", "a", Some("1.0-SNAPSHOT"), VersioningRecord {
            snapshot_versions: vec![
                SnapshotVariant { classifier: "".to_string(), extension: "jar".to_string(), version: "1.0-20230601.101500-3".to_string(), updated: Some("20230601101500".to_string()) },
                SnapshotVariant { classifier: "".to_string(), extension: "pom".to_string(), version: "1.0-20230601.101500-3".to_string(), updated: Some("20230601101500".to_string()) },
                SnapshotVariant { classifier: "sources".to_string(), extension: "jar".to_string(), version: "1.0-20230501.090000-2".to_string(), updated: Some("20230501090000".to_string()) },
            ],
            last_updated: Some("20230601101500".to_string()),
            ..Default::default()
        });

        let ctx = context(session());
        let resolver = resolver(&metadata);
        let sources = Coordinate::new("g", "a", "1.0-SNAPSHOT").with_classifier_and_extension("sources", "jar");
        let result = resolver.resolve_version(&sources, &[remote("snapshots")], &ctx).await.unwrap();
        assert_eq!(result.version, "1.0-20230501.090000-2");

        let javadoc = Coordinate::new("g", "a", "1.0-SNAPSHOT").with_classifier_and_extension("javadoc", "jar");
        let result = resolver.resolve_version(&javadoc, &[remote("snapshots")], &ctx).await.unwrap();
        assert_eq!(result.version, "1.0-SNAPSHOT");
        assert_eq!(result.repository, None);
    }

    #[tokio::test]
    async fn test_newer_snapshot_marker_from_other_repository_wins() {
        let metadata = Arc::new(TransientMetadataSource::new());
        metadata.put("old", "g", "a", Some("1.0-SNAPSHOT"), VersioningRecord {
            snapshot_versions: vec![SnapshotVariant {
                classifier: "".to_string(),
                extension: "jar".to_string(),
                version: "1.0-20230101.000000-1".to_string(),
                updated: Some("20230101000000".to_string()),
            }],
            ..Default::default()
        });
        metadata.put("new", "g", "a", Some("1.0-SNAPSHOT"), snapshot_record("20230601.000000", 7, "20230601000000"));

        let ctx = context(session());
        let result = resolver(&metadata)
            .resolve_version(&Coordinate::new("g", "a", "1.0-SNAPSHOT"), &[remote("old"), remote("new")], &ctx)
            .await.unwrap();

        assert_eq!(result.version, "1.0-20230601.000000-7");
        assert_eq!(result.repository, Some(remote("new")));
    }

    #[tokio::test]
    async fn test_snapshot_in_workspace_needs_no_metadata() {
        let metadata = Arc::new(TransientMetadataSource::new());
        let workspace = Arc::new(TransientWorkspace::new("reactor").with_project("g", "a", "1.0-SNAPSHOT"));

        let ctx = context(session().with_workspace(workspace));
        let result = resolver(&metadata)
            .resolve_version(&Coordinate::new("g", "a", "1.0-SNAPSHOT"), &[remote("snapshots")], &ctx)
            .await.unwrap();

        assert_eq!(result.version, "1.0-SNAPSHOT");
        assert_eq!(result.repository, Some(RepositorySource::workspace("reactor")));
        assert_eq!(metadata.num_fetches(), 0);
    }

    #[tokio::test]
    async fn test_exact_version() {
        let metadata = Arc::new(TransientMetadataSource::new());
        let workspace = Arc::new(TransientWorkspace::new("reactor").with_project("g", "in-workspace", "1.0"));
        let ctx = context(session().with_workspace(workspace));
        let resolver = resolver(&metadata);

        let result = resolver.resolve_version(&Coordinate::new("g", "a", "1.0"), &[remote("central")], &ctx).await.unwrap();
        assert_eq!(result, ResolvedVersion { version: "1.0".to_string(), repository: None, issues: vec![] });

        let result = resolver.resolve_version(&Coordinate::new("g", "in-workspace", "1.0"), &[remote("central")], &ctx).await.unwrap();
        assert_eq!(result.repository, Some(RepositorySource::workspace("reactor")));

        assert_eq!(metadata.num_fetches(), 0);
        assert!(ctx.session.cache.is_empty());
    }

    #[tokio::test]
    async fn test_corrupted_local_metadata_is_repaired() {
        let metadata = Arc::new(TransientMetadataSource::new());
        metadata.put("local", "g", "a", Some("1.0-SNAPSHOT"), snapshot_record("20230601.101500", 5, "20230601101500"));
        let (session, events) = session_with_events();

        let ctx = context(session);
        let result = resolver(&metadata)
            .resolve_version(&Coordinate::new("g", "a", "1.0-SNAPSHOT"), &[], &ctx)
            .await.unwrap();

        assert_eq!(result.version, "1.0-SNAPSHOT");
        assert_eq!(result.repository.map(|r| r.kind), Some(RepositoryKind::Local));
        assert!(matches!(result.issues.as_slice(), [ResolutionIssue::MetadataInvalid { .. }]));
        assert_eq!(events.kinds(), vec![EventKind::MetadataInvalid]);
    }

    #[tokio::test]
    async fn test_cached_result_is_reused() {
        let metadata = Arc::new(TransientMetadataSource::new());
        metadata.put("repo-1", "g", "a", None, release_record("2.0", "20230101000000"));

        let ctx = context(session());
        let resolver = resolver(&metadata);
        let coordinate = Coordinate::new("g", "a", "RELEASE");

        let first = resolver.resolve_version(&coordinate, &[remote("repo-1")], &ctx).await.unwrap();
        let fetches = metadata.num_fetches();
        let second = resolver.resolve_version(&coordinate, &[remote("repo-1")], &ctx).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(metadata.num_fetches(), fetches);
        assert_eq!(ctx.session.cache.len(), 1);
    }

    #[tokio::test]
    async fn test_cached_result_keeps_issues() {
        let metadata = Arc::new(TransientMetadataSource::new());
        metadata.put_failure("repo-1", "g", "a", None, "connection refused");
        metadata.put("repo-2", "g", "a", None, release_record("2.0", "20230101000000"));

        let ctx = context(session());
        let resolver = resolver(&metadata);
        let coordinate = Coordinate::new("g", "a", "RELEASE");
        let repositories = [remote("repo-1"), remote("repo-2")];

        let first = resolver.resolve_version(&coordinate, &repositories, &ctx).await.unwrap();
        let fetches = metadata.num_fetches();
        let second = resolver.resolve_version(&coordinate, &repositories, &ctx).await.unwrap();

        assert_eq!(first.issues.len(), 1);
        assert_eq!(first, second);
        assert_eq!(metadata.num_fetches(), fetches);
    }

    #[tokio::test]
    async fn test_local_repository_wins_tie() {
        let metadata = Arc::new(TransientMetadataSource::new());
        metadata.put("local", "g", "a", None, release_record("1.9", "20230601000000"));
        metadata.put("central", "g", "a", None, release_record("2.0", "20230601000000"));

        let ctx = context(session());
        let result = resolver(&metadata)
            .resolve_version(&Coordinate::new("g", "a", "RELEASE"), &[remote("central")], &ctx)
            .await.unwrap();

        assert_eq!(result.version, "1.9");
        assert_eq!(result.repository, Some(ctx.session.local_repository.clone()));
    }

    #[tokio::test]
    async fn test_duplicate_repositories_are_asked_once() {
        let metadata = Arc::new(TransientMetadataSource::new());
        metadata.put("central", "g", "a", None, release_record("2.0", "20230101000000"));

        let ctx = context(session());
        let result = resolver(&metadata)
            .resolve_version(&Coordinate::new("g", "a", "RELEASE"), &[remote("central"), remote("central")], &ctx)
            .await.unwrap();

        assert_eq!(result.version, "2.0");
        assert_eq!(metadata.fetched_repositories(), vec!["local", "central"]);
    }

    #[tokio::test]
    async fn test_no_cache() {
        let metadata = Arc::new(TransientMetadataSource::new());
        metadata.put("repo-1", "g", "a", None, release_record("2.0", "20230101000000"));

        let config = MapConfiguration::new().with(keys::VERSION_RESOLVER_NO_CACHE, "true");
        let ctx = context(session().with_config(Arc::new(config)));
        let resolver = resolver(&metadata);
        let coordinate = Coordinate::new("g", "a", "RELEASE");

        resolver.resolve_version(&coordinate, &[remote("repo-1")], &ctx).await.unwrap();
        resolver.resolve_version(&coordinate, &[remote("repo-1")], &ctx).await.unwrap();

        assert_eq!(metadata.num_fetches(), 4);
        assert!(ctx.session.cache.is_empty());
    }

    #[tokio::test]
    async fn test_disabled_repositories_are_not_asked() {
        let metadata = Arc::new(TransientMetadataSource::new());
        let mut releases_only = remote("releases");
        releases_only.snapshot_policy.enabled = false;

        let ctx = context(session());
        resolver(&metadata)
            .resolve_version(&Coordinate::new("g", "a", "1.0-SNAPSHOT"), &[releases_only, remote("snapshots")], &ctx)
            .await.unwrap();

        assert_eq!(metadata.fetched_repositories(), vec!["local", "snapshots"]);
    }

    #[tokio::test]
    async fn test_cancelled_resolution_is_not_cached() {
        let metadata = Arc::new(TransientMetadataSource::with_delay(Duration::from_secs(60)));
        metadata.put("repo-1", "g", "a", None, release_record("2.0", "20230101000000"));

        let cancel = CancellationToken::new();
        let ctx = context(session()).with_cancellation(cancel.clone());

        let canceller = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            cancel.cancel();
        });

        let result = resolver(&metadata)
            .resolve_version(&Coordinate::new("g", "a", "RELEASE"), &[remote("repo-1")], &ctx)
            .await;
        canceller.await.unwrap();

        assert!(matches!(result, Err(VersionResolutionError::Interrupted { cause: Interrupted::Cancelled, .. })));
        assert!(ctx.session.cache.is_empty());
    }

    #[tokio::test]
    async fn test_slow_repository_times_out() {
        let metadata = Arc::new(TransientMetadataSource::with_delay(Duration::from_secs(60)));

        let ctx = context(session()).with_timeout(Duration::from_millis(20));
        let result = resolver(&metadata)
            .resolve_version(&Coordinate::new("g", "a", "RELEASE"), &[remote("repo-1")], &ctx)
            .await;

        match result {
            Err(VersionResolutionError::Unresolved { issues, .. }) => assert_eq!(issues.len(), 2),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_snapshot_marker_helper() {
        let record = snapshot_record("20230601.101500", 3, "20230601101500");
        assert_eq!(record.snapshot, Some(SnapshotMarker { timestamp: Some("20230601.101500".to_string()), build_number: 3, local_copy: false }));
    }
}
