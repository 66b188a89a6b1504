use std::sync::Arc;

use tracing::{debug, warn};

use crate::maven::coordinates::Coordinate;
use crate::maven::descriptor::{ArtifactDescriptor, ParsedModel};
use crate::maven::repository::{dedup_repositories, RepositorySource};
use crate::resolver::context::ResolutionContext;
use crate::resolver::error::{DescriptorFailure, DescriptorResolutionError, ResolutionIssue};
use crate::resolver::version_resolver::VersionResolver;
use crate::source::artifact_fetcher::{ArtifactFetcher, FetchError, FetchedFile};
use crate::source::events::{EventKind, RepositoryEvent};
use crate::source::model_builder::{ModelBuildError, ModelBuilder};
use crate::util::fan_out::bounded;

#[derive(Debug, Clone, PartialEq)]
pub struct DescriptorResult {
    /// the coordinate the descriptor was finally read for, i.e. after following all relocations
    pub coordinate: Coordinate,
    /// the coordinates that were relocated away from, in the order they were encountered
    pub relocations: Vec<Coordinate>,
    /// where the descriptor file came from
    pub repository: Option<RepositorySource>,
    /// `None` if the descriptor was missing or invalid and the session tolerates that
    pub descriptor: Option<ArtifactDescriptor>,
    pub issues: Vec<ResolutionIssue>,
}

enum LoadState {
    ResolvingVersion(Coordinate),
    FetchingFile(Coordinate),
    ParsingModel(Coordinate, FetchedFile),
    CheckingRelocation(Coordinate, ParsedModel),
    Done(Coordinate, Option<ParsedModel>),
}

/// Book keeping of a single `read_descriptor` call
struct Load<'a> {
    context: &'a ResolutionContext,
    /// every coordinate that was visited, with resolved versions
    chain: Vec<Coordinate>,
    /// relocation keys in visiting order
    visited: Vec<String>,
    relocations: Vec<Coordinate>,
    repository: Option<RepositorySource>,
    issues: Vec<ResolutionIssue>,
}
impl <'a> Load<'a> {
    fn fail(self, failure: DescriptorFailure) -> DescriptorResolutionError {
        DescriptorResolutionError {
            chain: self.chain,
            failure,
            issues: self.issues,
        }
    }

    /// `repository` is where the current hop's descriptor came from, if it was found at all
    fn emit(&self, kind: EventKind, coordinate: &Coordinate, repository: Option<&RepositorySource>, cause: String) {
        self.context.session.emit(RepositoryEvent {
            kind,
            coordinate: coordinate.clone(),
            repository: repository.cloned(),
            cause,
        });
    }
}

/// Reads an artifact's descriptor, following relocations. Relocations are followed in a loop,
///  and visiting the same groupId:artifactId:baseVersion twice is a fatal cycle.
pub struct DescriptorReader {
    versions: Arc<VersionResolver>,
    fetcher: Arc<dyn ArtifactFetcher>,
    model_builder: Arc<dyn ModelBuilder>,
}
impl DescriptorReader {
    pub fn new(versions: Arc<VersionResolver>, fetcher: Arc<dyn ArtifactFetcher>, model_builder: Arc<dyn ModelBuilder>) -> DescriptorReader {
        DescriptorReader {
            versions,
            fetcher,
            model_builder,
        }
    }

    pub async fn read_descriptor(&self, coordinate: &Coordinate, repositories: &[RepositorySource], context: &ResolutionContext) -> Result<DescriptorResult, DescriptorResolutionError> {
        let repositories = &dedup_repositories(repositories);
        let session = &context.session;
        let mut load = Load {
            context,
            chain: vec![],
            visited: vec![],
            relocations: vec![],
            repository: None,
            issues: vec![],
        };

        let mut state = LoadState::ResolvingVersion(coordinate.clone());
        let (artifact, model) = loop {
            state = match state {
                LoadState::ResolvingVersion(artifact) => {
                    let resolved = match self.versions.resolve_version(&artifact, repositories, context).await {
                        Ok(resolved) => resolved,
                        Err(e) => {
                            load.chain.push(artifact);
                            load.issues.extend(e.issues().iter().cloned());
                            return Err(load.fail(DescriptorFailure::Version(e)));
                        }
                    };
                    load.issues.extend(resolved.issues);

                    let artifact = artifact.with_version(&resolved.version);
                    load.chain.push(artifact.clone());

                    let key = artifact.relocation_key();
                    if load.visited.contains(&key) {
                        load.visited.push(key);
                        let failure = DescriptorFailure::RelocationCycle { visited: load.visited.clone() };
                        load.emit(EventKind::DescriptorInvalid, &artifact, None, failure.to_string());
                        return Err(load.fail(failure));
                    }
                    load.visited.push(key);

                    LoadState::FetchingFile(artifact)
                }
                LoadState::FetchingFile(artifact) => {
                    let descriptor = match self.versions.resolve_version(&artifact.descriptor(), repositories, context).await {
                        Ok(resolved) => {
                            load.issues.extend(resolved.issues);
                            artifact.descriptor().with_version(&resolved.version)
                        }
                        Err(e) => {
                            load.issues.extend(e.issues().iter().cloned());
                            return Err(load.fail(DescriptorFailure::Version(e)));
                        }
                    };

                    let fetched = bounded(self.fetcher.fetch(&descriptor, repositories), &context.cancel, context.deadline).await;
                    match fetched {
                        Err(interrupted) => return Err(load.fail(DescriptorFailure::Interrupted(interrupted))),
                        Ok(Err(e @ FetchError::NotFound { .. })) => {
                            load.repository = None;
                            load.emit(EventKind::DescriptorMissing, &artifact, None, e.to_string());
                            if session.ignore_missing_descriptors() {
                                debug!("ignoring missing descriptor of {}", artifact);
                                LoadState::Done(artifact, None)
                            }
                            else {
                                return Err(load.fail(DescriptorFailure::Missing(e)));
                            }
                        }
                        Ok(Err(e)) => return Err(load.fail(DescriptorFailure::Fetch(e))),
                        Ok(Ok(file)) => {
                            load.repository = Some(file.repository.clone());
                            LoadState::ParsingModel(artifact, file)
                        }
                    }
                }
                LoadState::ParsingModel(artifact, file) => {
                    let built = bounded(
                        self.model_builder.build(&file, &session.interpolation_context()),
                        &context.cancel,
                        context.deadline,
                    ).await;

                    match built {
                        Err(interrupted) => return Err(load.fail(DescriptorFailure::Interrupted(interrupted))),
                        Ok(Err(e @ ModelBuildError::UnresolvableReference { .. })) => return Err(load.fail(DescriptorFailure::Model(e))),
                        Ok(Err(e)) => {
                            load.emit(EventKind::DescriptorInvalid, &artifact, Some(&file.repository), e.to_string());
                            if session.ignore_invalid_descriptors() {
                                debug!("ignoring invalid descriptor of {}", artifact);
                                LoadState::Done(artifact, None)
                            }
                            else {
                                return Err(load.fail(DescriptorFailure::Model(e)));
                            }
                        }
                        Ok(Ok(model)) => LoadState::CheckingRelocation(artifact, model),
                    }
                }
                LoadState::CheckingRelocation(artifact, model) => {
                    match &model.relocation {
                        None => LoadState::Done(artifact, Some(model)),
                        Some(relocation) => {
                            let target = relocation.apply(&artifact);
                            if target.same_gav(&artifact) {
                                LoadState::Done(artifact, Some(model))
                            }
                            else {
                                match &relocation.message {
                                    Some(message) => warn!("{} has been relocated to {}: {}", artifact, target, message),
                                    None => debug!("{} has been relocated to {}", artifact, target),
                                }
                                load.relocations.push(artifact);
                                LoadState::ResolvingVersion(target)
                            }
                        }
                    }
                }
                LoadState::Done(artifact, model) => break (artifact, model),
            };
        };

        Ok(DescriptorResult {
            coordinate: artifact,
            relocations: load.relocations,
            repository: load.repository,
            descriptor: model.map(|m| ArtifactDescriptor::from_model(&m, &session.artifact_types)),
            issues: load.issues,
        })
    }
}
