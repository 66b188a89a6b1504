#![allow(non_snake_case)]

//! Wire format of maven-metadata.xml. Field names follow the XML elements.

use serde::Deserialize;

use crate::maven::versioning::{SnapshotMarker, SnapshotVariant, VersioningRecord};

#[derive(Deserialize, Debug, Default)]
pub struct Metadata {
    versioning: Option<Versioning>,
}

#[derive(Deserialize, Debug, Default)]
pub struct Versioning {
    latest: Option<String>,
    release: Option<String>,
    versions: Option<Versions>,
    lastUpdated: Option<String>,
    snapshot: Option<Snapshot>,
    snapshotVersions: Option<SnapshotVersions>,
}

#[derive(Deserialize, Debug, Default)]
pub struct Versions {
    #[serde(default)]
    version: Vec<String>,
}

#[derive(Deserialize, Debug, Default)]
pub struct Snapshot {
    timestamp: Option<String>,
    buildNumber: Option<u32>,
    localCopy: Option<bool>,
}

#[derive(Deserialize, Debug, Default)]
pub struct SnapshotVersions {
    #[serde(default)]
    snapshotVersion: Vec<SnapshotVersion>,
}

#[derive(Deserialize, Debug, Default)]
pub struct SnapshotVersion {
    classifier: Option<String>,
    extension: Option<String>,
    value: Option<String>,
    updated: Option<String>,
}

impl Metadata {
    pub fn parse(xml: &str) -> anyhow::Result<Metadata> {
        Ok(serde_xml_rs::from_str(xml)?)
    }

    /// None if the document has no versioning section at all
    pub fn into_versioning_record(self) -> Option<VersioningRecord> {
        let versioning = self.versioning?;

        Some(VersioningRecord {
            release: non_empty(versioning.release),
            latest: non_empty(versioning.latest),
            versions: versioning.versions
                .map(|v| v.version)
                .unwrap_or_default(),
            snapshot: versioning.snapshot.map(|s| SnapshotMarker {
                timestamp: non_empty(s.timestamp),
                build_number: s.buildNumber.unwrap_or(0),
                local_copy: s.localCopy.unwrap_or(false),
            }),
            snapshot_versions: versioning.snapshotVersions
                .map(|sv| sv.snapshotVersion)
                .unwrap_or_default()
                .into_iter()
                .map(|sv| SnapshotVariant {
                    classifier: sv.classifier.unwrap_or_default(),
                    extension: sv.extension.unwrap_or_default(),
                    version: sv.value.unwrap_or_default(),
                    updated: non_empty(sv.updated),
                })
                .collect(),
            last_updated: non_empty(versioning.lastUpdated),
        })
    }
}

fn non_empty(s: Option<String>) -> Option<String> {
    s.map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

#[cfg(test)]
mod test {
    use super::*;

    const GA_METADATA: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<metadata>
  <groupId>org.example</groupId>
  <artifactId>lib</artifactId>
  <versioning>
    <latest>1.1-SNAPSHOT</latest>
    <release>1.0</release>
    <versions>
      <version>0.9</version>
      <version>1.0</version>
      <version>1.1-SNAPSHOT</version>
    </versions>
    <lastUpdated>20230601000000</lastUpdated>
  </versioning>
</metadata>"#;

    const SNAPSHOT_METADATA: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<metadata modelVersion="1.1.0">
  <groupId>org.example</groupId>
  <artifactId>lib</artifactId>
  <version>1.1-SNAPSHOT</version>
  <versioning>
    <snapshot>
      <timestamp>20230601.101500</timestamp>
      <buildNumber>3</buildNumber>
    </snapshot>
    <lastUpdated>20230601101500</lastUpdated>
    <snapshotVersions>
      <snapshotVersion>
        <extension>jar</extension>
        <value>1.1-20230601.101500-3</value>
        <updated>20230601101500</updated>
      </snapshotVersion>
      <snapshotVersion>
        <classifier>sources</classifier>
        <extension>jar</extension>
        <value>1.1-20230601.101400-2</value>
        <updated>20230601101400</updated>
      </snapshotVersion>
    </snapshotVersions>
  </versioning>
</metadata>"#;

    #[test]
    fn test_parse_ga_metadata() {
        let metadata = Metadata::parse(GA_METADATA).unwrap();
        let record = metadata.into_versioning_record().unwrap();
        assert_eq!(record.release.as_deref(), Some("1.0"));
        assert_eq!(record.latest.as_deref(), Some("1.1-SNAPSHOT"));
        assert_eq!(record.versions, vec!["0.9", "1.0", "1.1-SNAPSHOT"]);
        assert_eq!(record.last_updated.as_deref(), Some("20230601000000"));
        assert!(record.snapshot.is_none());
        assert!(record.snapshot_versions.is_empty());
    }

    #[test]
    fn test_parse_snapshot_metadata() {
        let record = Metadata::parse(SNAPSHOT_METADATA).unwrap()
            .into_versioning_record()
            .unwrap();

        let snapshot = record.snapshot.unwrap();
        assert_eq!(snapshot.timestamp.as_deref(), Some("20230601.101500"));
        assert_eq!(snapshot.build_number, 3);
        assert!(!snapshot.local_copy);

        assert_eq!(record.snapshot_versions.len(), 2);
        assert_eq!(record.snapshot_versions[0].classifier, "");
        assert_eq!(record.snapshot_versions[0].version, "1.1-20230601.101500-3");
        assert_eq!(record.snapshot_versions[1].classifier, "sources");
        assert_eq!(record.snapshot_versions[1].updated.as_deref(), Some("20230601101400"));
    }

    #[test]
    fn test_no_versioning() {
        let metadata = Metadata::parse("<metadata><groupId>g</groupId></metadata>").unwrap();
        assert!(metadata.into_versioning_record().is_none());
    }

    #[test]
    fn test_malformed() {
        assert!(Metadata::parse("<metadata><versioning>").is_err());
    }
}
