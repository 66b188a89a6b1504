//! The collaborators resolution depends on. Each one is a trait with an in-memory ('transient')
//!  implementation, plus a file system implementation where reading from a local repository
//!  directory makes sense.

pub mod artifact_fetcher;
pub mod events;
pub mod fs_artifact_fetcher;
pub mod fs_metadata_source;
pub mod metadata_source;
pub mod model_builder;
pub mod transient_descriptors;
pub mod transient_metadata_source;
pub mod workspace;
