use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::maven::coordinates::Coordinate;
use crate::maven::descriptor::ParsedModel;
use crate::maven::paths::as_maven_path;
use crate::maven::repository::RepositorySource;
use crate::source::artifact_fetcher::{ArtifactFetcher, FetchError, FetchedFile};
use crate::source::model_builder::{InterpolationContext, ModelBuildError, ModelBuilder};

enum StoredDescriptor {
    Model(ParsedModel),
    BuildFailure(ModelBuildError),
    FetchFailure(String),
}

/// In-memory descriptors, acting as both the fetcher of descriptor files and the builder of their
///  models. The 'file' handed out is the artifact's repository path - for testing purposes
pub struct TransientDescriptors {
    repository: RepositorySource,
    descriptors: Mutex<HashMap<String, (RepositorySource, StoredDescriptor)>>,
    num_fetches: AtomicUsize,
}
impl TransientDescriptors {
    /// descriptors are attributed to `repository` unless stored with a different one
    pub fn new(repository: RepositorySource) -> TransientDescriptors {
        TransientDescriptors {
            repository,
            descriptors: Default::default(),
            num_fetches: AtomicUsize::new(0),
        }
    }

    pub fn put(&self, coordinate: &Coordinate, model: ParsedModel) {
        self.store(coordinate, self.repository.clone(), StoredDescriptor::Model(model));
    }

    pub fn put_in(&self, coordinate: &Coordinate, repository: RepositorySource, model: ParsedModel) {
        self.store(coordinate, repository, StoredDescriptor::Model(model));
    }

    pub fn put_build_failure(&self, coordinate: &Coordinate, error: ModelBuildError) {
        self.store(coordinate, self.repository.clone(), StoredDescriptor::BuildFailure(error));
    }

    pub fn put_fetch_failure(&self, coordinate: &Coordinate, cause: &str) {
        self.store(coordinate, self.repository.clone(), StoredDescriptor::FetchFailure(cause.to_string()));
    }

    pub fn num_fetches(&self) -> usize {
        self.num_fetches.load(Ordering::SeqCst)
    }

    fn store(&self, coordinate: &Coordinate, repository: RepositorySource, descriptor: StoredDescriptor) {
        self.descriptors.lock()
            .unwrap()
            .insert(as_maven_path(&coordinate.descriptor()), (repository, descriptor));
    }
}

#[async_trait]
impl ArtifactFetcher for TransientDescriptors {
    async fn fetch(&self, coordinate: &Coordinate, _repositories: &[RepositorySource]) -> Result<FetchedFile, FetchError> {
        self.num_fetches.fetch_add(1, Ordering::SeqCst);

        let path = as_maven_path(coordinate);
        match self.descriptors.lock().unwrap().get(&path) {
            None => Err(FetchError::NotFound { coordinate: coordinate.to_string() }),
            Some((_, StoredDescriptor::FetchFailure(cause))) => Err(FetchError::Transport {
                coordinate: coordinate.to_string(),
                cause: cause.clone(),
            }),
            Some((repository, _)) => Ok(FetchedFile {
                path: PathBuf::from(path),
                repository: repository.clone(),
            }),
        }
    }
}

#[async_trait]
impl ModelBuilder for TransientDescriptors {
    async fn build(&self, file: &FetchedFile, _context: &InterpolationContext) -> Result<ParsedModel, ModelBuildError> {
        let path = file.path.to_string_lossy().to_string();
        match self.descriptors.lock().unwrap().get(&path) {
            Some((_, StoredDescriptor::Model(model))) => Ok(model.clone()),
            Some((_, StoredDescriptor::BuildFailure(e))) => Err(e.clone()),
            _ => Err(ModelBuildError::Invalid {
                path,
                reason: "no such descriptor".to_string(),
            }),
        }
    }
}
