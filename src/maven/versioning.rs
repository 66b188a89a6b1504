/// The 'versioning' part of a repository's maven-metadata.xml for a single GA (or for a single
///  snapshot GAV), as reported by one repository. See
///  https://maven.apache.org/ref/3.9.5/maven-repository-metadata/repository-metadata.html
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VersioningRecord {
    pub release: Option<String>,
    pub latest: Option<String>,
    pub versions: Vec<String>,
    /// only used if there are no per-variant snapshot versions
    pub snapshot: Option<SnapshotMarker>,
    pub snapshot_versions: Vec<SnapshotVariant>,
    /// `yyyyMMddHHmmss`, so string comparison is chronological
    pub last_updated: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SnapshotMarker {
    /// `yyyyMMdd.HHmmss`
    pub timestamp: Option<String>,
    pub build_number: u32,
    pub local_copy: bool,
}

/// The concrete deployment of a snapshot for one (classifier, extension) combination
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SnapshotVariant {
    pub classifier: String,
    pub extension: String,
    pub version: String,
    pub updated: Option<String>,
}

impl VersioningRecord {
    /// Build numbers are assigned by remote repositories during deployment, so a local repository
    ///  record carrying one was overwritten with remote data (typically by a remote repository
    ///  using the id 'local').
    pub fn has_remote_snapshot_data(&self) -> bool {
        self.snapshot.as_ref()
            .map(|s| s.build_number > 0)
            .unwrap_or(false)
    }

    /// the part of a corrupted local record that can be trusted
    pub fn repaired_local_copy(&self) -> VersioningRecord {
        VersioningRecord {
            last_updated: self.last_updated.clone(),
            snapshot: Some(SnapshotMarker {
                timestamp: self.snapshot.as_ref().and_then(|s| s.timestamp.clone()),
                build_number: 0,
                local_copy: true,
            }),
            ..Default::default()
        }
    }
}
