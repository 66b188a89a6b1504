//! Version and descriptor resolution for Maven style repositories: symbolic versions, version
//!  ranges and artifact descriptors including relocations.

pub mod config;
pub mod maven;
pub mod resolver;
pub mod source;
pub mod util;

pub use maven::coordinates::Coordinate;
pub use maven::descriptor::ArtifactDescriptor;
pub use maven::repository::RepositorySource;
pub use resolver::context::{ResolutionContext, ResolutionSession};
pub use resolver::descriptor_reader::{DescriptorReader, DescriptorResult};
pub use resolver::error::{DescriptorFailure, DescriptorResolutionError, ResolutionIssue, VersionRangeResolutionError, VersionResolutionError};
pub use resolver::range_resolver::{DefaultVersionRangeResolver, RangeResult, VersionRangeResolver};
pub use resolver::range_strategy::StrategyDispatcher;
pub use resolver::version_resolver::{ResolvedVersion, VersionResolver};
