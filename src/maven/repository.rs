use std::collections::HashSet;
use std::fmt::{Display, Formatter};

use crate::maven::MavenRepoPolicy;

/// Id of the local repository, also used in the file names of metadata it owns itself
pub const LOCAL_REPOSITORY_ID: &str = "local";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RepositoryKind {
    /// the local cache of downloaded artifacts
    Local,
    /// in-memory / in-progress projects that override everything else
    Workspace,
    Remote,
}

/// A place artifacts and metadata can come from. Policies are opaque to resolution and only
///  passed on to collaborators.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepositorySource {
    pub id: String,
    pub kind: RepositoryKind,
    /// base URL for remote repositories, base directory for the local repository
    pub url: String,
    pub release_policy: MavenRepoPolicy,
    pub snapshot_policy: MavenRepoPolicy,
    /// a repository manager stands in for the repositories it mirrors
    pub repository_manager: bool,
    pub mirrored_repositories: Vec<RepositorySource>,
}
impl RepositorySource {
    pub fn remote(id: &str, url: &str) -> RepositorySource {
        RepositorySource {
            id: id.to_string(),
            kind: RepositoryKind::Remote,
            url: url.to_string(),
            release_policy: MavenRepoPolicy::default(),
            snapshot_policy: MavenRepoPolicy::default(),
            repository_manager: false,
            mirrored_repositories: vec![],
        }
    }

    pub fn local(base_dir: &str) -> RepositorySource {
        RepositorySource {
            id: LOCAL_REPOSITORY_ID.to_string(),
            kind: RepositoryKind::Local,
            ..RepositorySource::remote(LOCAL_REPOSITORY_ID, base_dir)
        }
    }

    pub fn workspace(id: &str) -> RepositorySource {
        RepositorySource {
            kind: RepositoryKind::Workspace,
            ..RepositorySource::remote(id, "")
        }
    }

    pub fn as_repository_manager(self, mirrored_repositories: Vec<RepositorySource>) -> RepositorySource {
        RepositorySource {
            repository_manager: true,
            mirrored_repositories,
            ..self
        }
    }

    pub fn key(&self) -> RepositoryKey {
        RepositoryKey {
            kind: self.kind,
            id: self.id.clone(),
            url: self.url.clone(),
        }
    }

    /// Two sources are the same repository if they agree on kind and id
    pub fn is_same(&self, other: &RepositorySource) -> bool {
        self.kind == other.kind && self.id == other.id
    }
}
impl Display for RepositorySource {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.kind {
            RepositoryKind::Local => write!(f, "local ({})", self.url),
            RepositoryKind::Workspace => write!(f, "workspace ({})", self.id),
            RepositoryKind::Remote => write!(f, "{} ({})", self.id, self.url),
        }
    }
}

/// The parts of a repository's identity that matter for caching
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepositoryKey {
    pub kind: RepositoryKind,
    pub id: String,
    pub url: String,
}

/// Removes repositories with an id that was seen before, keeping the first occurrence
pub fn dedup_repositories(repositories: &[RepositorySource]) -> Vec<RepositorySource> {
    let mut seen = HashSet::new();
    repositories.iter()
        .filter(|r| seen.insert(r.id.clone()))
        .cloned()
        .collect()
}
