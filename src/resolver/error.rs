use thiserror::Error;

use crate::maven::coordinates::Coordinate;
use crate::maven::version_range::VersionConstraintError;
use crate::source::artifact_fetcher::FetchError;
use crate::source::model_builder::ModelBuildError;
use crate::util::fan_out::Interrupted;

/// A problem resolution recovered from. Issues are collected along the way and reported with
///  the result, or with the error if resolution fails after all.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolutionIssue {
    #[error("could not read metadata for {coordinate} from {repository}: {cause}")]
    MetadataFetch {
        coordinate: String,
        repository: String,
        cause: String,
    },
    #[error("invalid metadata for {coordinate} in {repository}: {cause}")]
    MetadataInvalid {
        coordinate: String,
        repository: String,
        cause: String,
    },
    #[error("ignoring version {version:?} of {coordinate}: {cause}")]
    UnparseableVersion {
        coordinate: String,
        version: String,
        cause: String,
    },
}

fn render_issues(issues: &[ResolutionIssue]) -> String {
    issues.iter()
        .map(|i| format!("\n  caused by: {}", i))
        .collect()
}

fn render_chain(chain: &[Coordinate]) -> String {
    chain.iter()
        .map(|c| c.to_string())
        .collect::<Vec<_>>()
        .join(" -> ")
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VersionResolutionError {
    #[error("could not determine a version for {coordinate}{}", render_issues(.issues))]
    Unresolved {
        coordinate: Coordinate,
        issues: Vec<ResolutionIssue>,
    },
    #[error("resolving the version of {coordinate} was interrupted: {cause}")]
    Interrupted {
        coordinate: Coordinate,
        cause: Interrupted,
    },
}
impl VersionResolutionError {
    pub fn issues(&self) -> &[ResolutionIssue] {
        match self {
            VersionResolutionError::Unresolved { issues, .. } => issues,
            VersionResolutionError::Interrupted { .. } => &[],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VersionRangeResolutionError {
    #[error("invalid version range for {coordinate}: {source}")]
    InvalidConstraint {
        coordinate: Coordinate,
        #[source]
        source: VersionConstraintError,
    },
    #[error("resolving the version range of {coordinate} was interrupted: {cause}")]
    Interrupted {
        coordinate: Coordinate,
        cause: Interrupted,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DescriptorFailure {
    #[error(transparent)]
    Version(#[from] VersionResolutionError),
    #[error("artifact relocations form a cycle: {}", .visited.join(" -> "))]
    RelocationCycle {
        visited: Vec<String>,
    },
    #[error("descriptor is missing: {0}")]
    Missing(FetchError),
    #[error(transparent)]
    Fetch(FetchError),
    #[error(transparent)]
    Model(ModelBuildError),
    #[error("reading the descriptor was interrupted: {0}")]
    Interrupted(Interrupted),
}

/// Fatal failure to read a descriptor. `chain` holds every coordinate that was visited, i.e.
///  the requested one followed by all relocation targets.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("failed to read the descriptor of {}: {failure}{}", render_chain(.chain), render_issues(.issues))]
pub struct DescriptorResolutionError {
    pub chain: Vec<Coordinate>,
    pub failure: DescriptorFailure,
    pub issues: Vec<ResolutionIssue>,
}
