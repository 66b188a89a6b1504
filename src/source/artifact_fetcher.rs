use std::path::PathBuf;

use async_trait::async_trait;
use thiserror::Error;

use crate::maven::coordinates::Coordinate;
use crate::maven::repository::RepositorySource;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("{coordinate} was not found")]
    NotFound {
        coordinate: String,
    },
    #[error("could not transfer {coordinate}: {cause}")]
    Transport {
        coordinate: String,
        cause: String,
    },
}

/// a file that is available locally, and the repository it was found in
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedFile {
    pub path: PathBuf,
    pub repository: RepositorySource,
}

/// Makes an artifact's file available locally, downloading it if necessary
#[async_trait]
pub trait ArtifactFetcher: Send + Sync {
    async fn fetch(&self, coordinate: &Coordinate, repositories: &[RepositorySource]) -> Result<FetchedFile, FetchError>;
}
