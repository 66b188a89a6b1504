use std::collections::{BTreeSet, HashMap};

use crate::maven::coordinates::Coordinate;
use crate::maven::repository::RepositorySource;

/// Projects that are part of the current build and take precedence over anything in a repository
pub trait WorkspaceReader: Send + Sync {
    fn identity(&self) -> RepositorySource;

    fn find_versions(&self, group_id: &str, artifact_id: &str) -> BTreeSet<String>;

    /// true if the workspace provides this exact artifact
    fn owns(&self, coordinate: &Coordinate) -> bool;
}

/// a workspace defined in memory
pub struct TransientWorkspace {
    identity: RepositorySource,
    projects: HashMap<(String, String), BTreeSet<String>>,
}
impl TransientWorkspace {
    pub fn new(id: &str) -> TransientWorkspace {
        TransientWorkspace {
            identity: RepositorySource::workspace(id),
            projects: HashMap::new(),
        }
    }

    pub fn with_project(mut self, group_id: &str, artifact_id: &str, version: &str) -> TransientWorkspace {
        self.projects.entry((group_id.to_string(), artifact_id.to_string()))
            .or_default()
            .insert(version.to_string());
        self
    }
}

impl WorkspaceReader for TransientWorkspace {
    fn identity(&self) -> RepositorySource {
        self.identity.clone()
    }

    fn find_versions(&self, group_id: &str, artifact_id: &str) -> BTreeSet<String> {
        self.projects.get(&(group_id.to_string(), artifact_id.to_string()))
            .cloned()
            .unwrap_or_default()
    }

    fn owns(&self, coordinate: &Coordinate) -> bool {
        self.projects.get(&(coordinate.group_id.clone(), coordinate.artifact_id.clone()))
            .map(|versions| versions.contains(&coordinate.version))
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_owns_exact_version_only() {
        let workspace = TransientWorkspace::new("reactor")
            .with_project("g", "a", "1.0-SNAPSHOT")
            .with_project("g", "a", "0.9");

        assert!(workspace.owns(&Coordinate::new("g", "a", "1.0-SNAPSHOT")));
        assert!(workspace.owns(&Coordinate::new("g", "a", "1.0-SNAPSHOT").descriptor()));
        assert!(!workspace.owns(&Coordinate::new("g", "a", "1.0")));
        assert!(!workspace.owns(&Coordinate::new("g", "b", "0.9")));

        assert_eq!(workspace.find_versions("g", "a").into_iter().collect::<Vec<_>>(), vec!["0.9", "1.0-SNAPSHOT"]);
        assert!(workspace.find_versions("x", "y").is_empty());
    }
}
