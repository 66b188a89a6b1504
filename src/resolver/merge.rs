use std::collections::HashMap;
use std::fmt::{Display, Formatter};

use crate::maven::coordinates::with_snapshot_qualifier;
use crate::maven::repository::RepositorySource;
use crate::maven::versioning::VersioningRecord;

/// What a merged version stands for
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MergeRole {
    Release,
    Latest,
    /// the snapshot marker, used when a repository has no per-variant data
    Snapshot,
    SnapshotVariant {
        classifier: String,
        extension: String,
    },
}
impl MergeRole {
    pub fn snapshot_variant(classifier: &str, extension: &str) -> MergeRole {
        MergeRole::SnapshotVariant {
            classifier: classifier.trim().to_string(),
            extension: extension.trim().to_string(),
        }
    }
}
impl Display for MergeRole {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            MergeRole::Release => write!(f, "RELEASE"),
            MergeRole::Latest => write!(f, "LATEST"),
            MergeRole::Snapshot => write!(f, "SNAPSHOT"),
            MergeRole::SnapshotVariant { classifier, extension } => write!(f, "SNAPSHOT{}:{}", classifier, extension),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionCandidate {
    pub version: String,
    /// `yyyyMMddHHmmss`
    pub timestamp: Option<String>,
    pub repository: RepositorySource,
}
impl VersionCandidate {
    /// A missing timestamp never wins, and counts as the empty string when compared against
    fn is_outdated_by(&self, timestamp: Option<&str>) -> bool {
        match timestamp {
            None => false,
            Some(timestamp) => timestamp > self.timestamp.as_deref().unwrap_or(""),
        }
    }
}

/// Collects the most recent version per role across repositories. Records must be offered in
///  repository order: on equal timestamps the first one stays.
#[derive(Debug, Default)]
pub struct MetadataMerger {
    winners: HashMap<MergeRole, VersionCandidate>,
}
impl MetadataMerger {
    pub fn new() -> MetadataMerger {
        Default::default()
    }

    pub fn offer(&mut self, role: MergeRole, version: &str, timestamp: Option<&str>, repository: &RepositorySource) {
        if version.is_empty() {
            return;
        }

        match self.winners.get_mut(&role) {
            None => {
                self.winners.insert(role, VersionCandidate {
                    version: version.to_string(),
                    timestamp: timestamp.map(|t| t.to_string()),
                    repository: repository.clone(),
                });
            }
            Some(current) if current.is_outdated_by(timestamp) => {
                current.version = version.to_string();
                current.timestamp = timestamp.map(|t| t.to_string());
                current.repository = repository.clone();
            }
            Some(_) => {}
        }
    }

    /// Offers everything a repository's record has to say. The snapshot marker is only considered
    ///  if the record has no per-variant entries; it yields `requested_version` with the
    ///  marker's timestamp and build number if it has both, or `requested_version` unchanged.
    pub fn merge_record(&mut self, requested_version: &str, record: &VersioningRecord, repository: &RepositorySource) {
        let last_updated = record.last_updated.as_deref();

        if let Some(release) = &record.release {
            self.offer(MergeRole::Release, release, last_updated, repository);
        }
        if let Some(latest) = &record.latest {
            self.offer(MergeRole::Latest, latest, last_updated, repository);
        }

        for variant in &record.snapshot_versions {
            self.offer(
                MergeRole::snapshot_variant(&variant.classifier, &variant.extension),
                &variant.version,
                variant.updated.as_deref(),
                repository,
            );
        }

        if let Some(snapshot) = &record.snapshot {
            if record.snapshot_versions.is_empty() {
                let version = match &snapshot.timestamp {
                    Some(timestamp) if snapshot.build_number > 0 => with_snapshot_qualifier(requested_version, timestamp, snapshot.build_number),
                    _ => requested_version.to_string(),
                };
                self.offer(MergeRole::Snapshot, &version, last_updated, repository);
            }
        }
    }

    /// Promotes the winner of `from` to `to` if `to` has no winner yet, or if `from`'s winner is
    ///  strictly newer and comes from a different repository.
    pub fn merge_across_roles(&mut self, from: &MergeRole, to: &MergeRole) {
        let promoted = match (self.winners.get(from), self.winners.get(to)) {
            (Some(src), None) => Some(src.clone()),
            (Some(src), Some(dst)) if dst.is_outdated_by(src.timestamp.as_deref()) && !src.repository.is_same(&dst.repository) => Some(src.clone()),
            _ => None,
        };

        if let Some(promoted) = promoted {
            self.winners.insert(to.clone(), promoted);
        }
    }

    pub fn winner(&self, role: &MergeRole) -> Option<&VersionCandidate> {
        self.winners.get(role)
    }
}

/// the winner for a single role across records given in repository order
pub fn merge<'a>(
    role: &MergeRole,
    requested_version: &str,
    records: impl IntoIterator<Item = (&'a VersioningRecord, &'a RepositorySource)>,
) -> Option<VersionCandidate> {
    let mut merger = MetadataMerger::new();
    for (record, repository) in records {
        merger.merge_record(requested_version, record, repository);
    }
    merger.winner(role).cloned()
}
