use std::path::PathBuf;

use anyhow::Context;
use async_trait::async_trait;
use tokio::fs::{read_to_string, try_exists};
use tracing::trace;

use crate::maven::metadata_xml::Metadata;
use crate::maven::paths::metadata_path;
use crate::maven::repository::RepositorySource;
use crate::maven::versioning::VersioningRecord;
use crate::source::metadata_source::{MetadataRequest, MetadataSource};

/// Reads the `maven-metadata-<repository id>.xml` files a local repository keeps for itself and
///  for every remote repository it downloaded metadata from. This allows fully offline resolution.
pub struct FsMetadataSource {
    root: PathBuf,
}
impl FsMetadataSource {
    pub fn new(root: impl Into<PathBuf>) -> FsMetadataSource {
        FsMetadataSource {
            root: root.into(),
        }
    }

    fn file_path(&self, request: &MetadataRequest, repository: &RepositorySource) -> PathBuf {
        let mut result = self.root.clone();
        result.push(metadata_path(&request.group_id, &request.artifact_id, request.version.as_deref(), &repository.id));
        result
    }
}

#[async_trait]
impl MetadataSource for FsMetadataSource {
    async fn fetch_versioning(&self, request: &MetadataRequest, repository: &RepositorySource) -> anyhow::Result<Option<VersioningRecord>> {
        let path = self.file_path(request, repository);
        trace!("reading metadata for {}:{} of {} from {}", request.group_id, request.artifact_id, repository.id, path.display());

        if !try_exists(&path).await? {
            return Ok(None);
        }

        let xml = read_to_string(&path).await
            .with_context(|| format!("error reading {}", path.display()))?;
        let metadata = Metadata::parse(&xml)
            .with_context(|| format!("invalid metadata in {}", path.display()))?;
        Ok(metadata.into_versioning_record())
    }
}

#[cfg(test)]
mod test {
    use std::fs::{create_dir_all, write};

    use super::*;
    use crate::maven::coordinates::Coordinate;
    use crate::source::metadata_source::MetadataNature;

    const METADATA: &str = r#"<metadata>
  <groupId>org.example</groupId>
  <artifactId>lib</artifactId>
  <versioning>
    <release>1.0</release>
    <versions><version>1.0</version></versions>
    <lastUpdated>20230601000000</lastUpdated>
  </versioning>
</metadata>"#;

    fn request() -> MetadataRequest {
        MetadataRequest::for_artifact(&Coordinate::new("org.example", "lib", "RELEASE"), MetadataNature::Release)
    }

    #[tokio::test]
    async fn test_reads_per_repository_file() {
        let root = tempfile::tempdir().unwrap();
        create_dir_all(root.path().join("org/example/lib")).unwrap();
        write(root.path().join("org/example/lib/maven-metadata-central.xml"), METADATA).unwrap();

        let source = FsMetadataSource::new(root.path());
        let central = RepositorySource::remote("central", "https://repo1.maven.org/maven2");

        let record = source.fetch_versioning(&request(), &central).await.unwrap().unwrap();
        assert_eq!(record.release.as_deref(), Some("1.0"));

        let other = RepositorySource::remote("other", "https://example.com");
        assert!(source.fetch_versioning(&request(), &other).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_malformed_file_is_an_error() {
        let root = tempfile::tempdir().unwrap();
        create_dir_all(root.path().join("org/example/lib")).unwrap();
        write(root.path().join("org/example/lib/maven-metadata-local.xml"), "<metadata><versioning>").unwrap();

        let source = FsMetadataSource::new(root.path());
        let result = source.fetch_versioning(&request(), &RepositorySource::local(&root.path().to_string_lossy())).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_snapshot_metadata_is_per_version() {
        let root = tempfile::tempdir().unwrap();
        create_dir_all(root.path().join("org/example/lib/1.1-SNAPSHOT")).unwrap();
        write(root.path().join("org/example/lib/1.1-SNAPSHOT/maven-metadata-snapshots.xml"), METADATA).unwrap();

        let source = FsMetadataSource::new(root.path());
        let request = MetadataRequest::for_snapshot(&Coordinate::new("org.example", "lib", "1.1-SNAPSHOT"));
        let snapshots = RepositorySource::remote("snapshots", "https://example.com/snapshots");
        assert!(source.fetch_versioning(&request, &snapshots).await.unwrap().is_some());
    }
}
