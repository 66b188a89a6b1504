use std::path::PathBuf;

use async_trait::async_trait;
use tokio::fs::metadata;
use tracing::trace;

use crate::maven::coordinates::Coordinate;
use crate::maven::paths::as_maven_path;
use crate::maven::repository::RepositorySource;
use crate::source::artifact_fetcher::{ArtifactFetcher, FetchError, FetchedFile};

/// Finds artifacts in a local repository directory without ever going to the network. Files
///  found there are attributed to the local repository.
pub struct FsArtifactFetcher {
    root: PathBuf,
    local_repository: RepositorySource,
}
impl FsArtifactFetcher {
    pub fn new(root: impl Into<PathBuf>) -> FsArtifactFetcher {
        let root = root.into();
        FsArtifactFetcher {
            local_repository: RepositorySource::local(&root.to_string_lossy()),
            root,
        }
    }
}

#[async_trait]
impl ArtifactFetcher for FsArtifactFetcher {
    async fn fetch(&self, coordinate: &Coordinate, _repositories: &[RepositorySource]) -> Result<FetchedFile, FetchError> {
        let mut path = self.root.clone();
        path.push(as_maven_path(coordinate));
        trace!("looking up {} at {}", coordinate, path.display());

        match metadata(&path).await {
            Ok(m) if m.is_file() => Ok(FetchedFile {
                path,
                repository: self.local_repository.clone(),
            }),
            Ok(_) => Err(FetchError::NotFound { coordinate: coordinate.to_string() }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(FetchError::NotFound { coordinate: coordinate.to_string() }),
            Err(e) => Err(FetchError::Transport {
                coordinate: coordinate.to_string(),
                cause: format!("{}: {}", path.display(), e),
            }),
        }
    }
}
