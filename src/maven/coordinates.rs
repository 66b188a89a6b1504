use std::fmt::{Display, Formatter};

use anyhow::anyhow;
use lazy_static::lazy_static;
use regex::Regex;

pub const SNAPSHOT: &str = "SNAPSHOT";
pub const RELEASE: &str = "RELEASE";
pub const LATEST: &str = "LATEST";

lazy_static! {
    /// a snapshot version that was already resolved to a concrete deployment, e.g. `1.0-20230101.120000-3`
    static ref TIMESTAMPED_SNAPSHOT_REGEX: Regex = Regex::new(r"^(.*-)?([0-9]{8}\.[0-9]{6}-[0-9]+)$").unwrap();
}

/// The symbolic meaning of a coordinate's version string
#[derive(Debug, Eq, PartialEq, Clone, Copy)]
pub enum VersionToken<'a> {
    /// the most recent release
    Release,
    /// the most recent deployment, release or snapshot
    Latest,
    /// ends in 'SNAPSHOT', i.e. is resolved to a timestamped deployment
    Snapshot(&'a str),
    /// interval / union syntax, e.g. "[1.0,2.0)"
    Range(&'a str),
    Exact(&'a str),
}
impl <'a> VersionToken<'a> {
    pub fn classify(version: &'a str) -> VersionToken<'a> {
        if version == RELEASE {
            VersionToken::Release
        }
        else if version == LATEST {
            VersionToken::Latest
        }
        else if version.ends_with(SNAPSHOT) {
            VersionToken::Snapshot(version)
        }
        else if version.starts_with('[') || version.starts_with('(') {
            VersionToken::Range(version)
        }
        else {
            VersionToken::Exact(version)
        }
    }
}

/// true for both 'floating' snapshots ("1.0-SNAPSHOT") and timestamped ones ("1.0-20230101.120000-3")
pub fn is_snapshot_version(version: &str) -> bool {
    version.ends_with(SNAPSHOT) || TIMESTAMPED_SNAPSHOT_REGEX.is_match(version)
}

/// Strips a deployment's timestamp and build number, i.e. "1.0-20230101.120000-3" becomes
///  "1.0-SNAPSHOT". All other versions are returned unchanged.
pub fn base_version(version: &str) -> String {
    if let Some(captures) = TIMESTAMPED_SNAPSHOT_REGEX.captures(version) {
        if let Some(prefix) = captures.get(1) {
            return format!("{}{}", prefix.as_str(), SNAPSHOT);
        }
    }
    version.to_string()
}

/// Replaces the trailing 'SNAPSHOT' of a version with a deployment qualifier
pub fn with_snapshot_qualifier(version: &str, timestamp: &str, build_number: u32) -> String {
    let prefix = version.strip_suffix(SNAPSHOT).unwrap_or(version);
    format!("{}{}-{}", prefix, timestamp, build_number)
}

/// Identifies a single file in a Maven repository. Instances are never modified - changing the
///  version (or GA after relocation) creates a new coordinate.
#[derive(PartialEq, Eq, Hash, Clone, Debug)]
pub struct Coordinate {
    pub group_id: String,
    pub artifact_id: String,
    /// empty for unclassified artifacts
    pub classifier: String,
    /// without leading '.', e.g. "jar"
    pub extension: String,
    pub version: String,
}
impl Coordinate {
    pub fn new(group_id: &str, artifact_id: &str, version: &str) -> Coordinate {
        Coordinate {
            group_id: group_id.to_string(),
            artifact_id: artifact_id.to_string(),
            classifier: String::new(),
            extension: "jar".to_string(),
            version: version.to_string(),
        }
    }

    /// parses `groupId:artifactId[:extension[:classifier]]:version`
    pub fn parse(s: &str) -> anyhow::Result<Coordinate> {
        let parts = s.split(':').collect::<Vec<_>>();
        let (group_id, artifact_id, extension, classifier, version) = match parts.as_slice() {
            [g, a, v] => (*g, *a, "jar", "", *v),
            [g, a, e, v] => (*g, *a, *e, "", *v),
            [g, a, e, c, v] => (*g, *a, *e, *c, *v),
            _ => return Err(anyhow!("not a valid artifact coordinate: {:?}", s)),
        };
        if group_id.is_empty() || artifact_id.is_empty() || version.is_empty() {
            return Err(anyhow!("not a valid artifact coordinate: {:?}", s));
        }

        Ok(Coordinate {
            group_id: group_id.to_string(),
            artifact_id: artifact_id.to_string(),
            classifier: classifier.to_string(),
            extension: extension.to_string(),
            version: version.to_string(),
        })
    }

    pub fn with_version(&self, version: &str) -> Coordinate {
        Coordinate {
            version: version.to_string(),
            ..self.clone()
        }
    }

    pub fn with_classifier_and_extension(&self, classifier: &str, extension: &str) -> Coordinate {
        Coordinate {
            classifier: classifier.to_string(),
            extension: extension.to_string(),
            ..self.clone()
        }
    }

    /// the coordinate of the descriptor ("pom") file that describes this artifact
    pub fn descriptor(&self) -> Coordinate {
        self.with_classifier_and_extension("", "pom")
    }

    pub fn version_token(&self) -> VersionToken {
        VersionToken::classify(&self.version)
    }

    pub fn is_snapshot(&self) -> bool {
        is_snapshot_version(&self.version)
    }

    pub fn base_version(&self) -> String {
        base_version(&self.version)
    }

    /// `groupId:artifactId:baseVersion` - the identity used for detecting relocation cycles
    pub fn relocation_key(&self) -> String {
        format!("{}:{}:{}", self.group_id, self.artifact_id, self.base_version())
    }

    pub fn same_gav(&self, other: &Coordinate) -> bool {
        self.group_id == other.group_id
            && self.artifact_id == other.artifact_id
            && self.version == other.version
    }
}
impl Display for Coordinate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}:{}", self.group_id, self.artifact_id, self.extension)?;
        if !self.classifier.is_empty() {
            write!(f, ":{}", self.classifier)?;
        }
        write!(f, ":{}", self.version)
    }
}

#[cfg(test)]
mod test {
    use rstest::*;
    use super::*;

    #[rstest]
    #[case::release("RELEASE", VersionToken::Release)]
    #[case::latest("LATEST", VersionToken::Latest)]
    #[case::lowercase_release("release", VersionToken::Exact("release"))]
    #[case::snapshot("1.0-SNAPSHOT", VersionToken::Snapshot("1.0-SNAPSHOT"))]
    #[case::timestamped("1.0-20230101.120000-3", VersionToken::Exact("1.0-20230101.120000-3"))]
    #[case::range("[1.0,2.0)", VersionToken::Range("[1.0,2.0)"))]
    #[case::open_range("(,2.0]", VersionToken::Range("(,2.0]"))]
    #[case::exact("1.2.3", VersionToken::Exact("1.2.3"))]
    fn test_classify(#[case] version: &str, #[case] expected: VersionToken) {
        assert_eq!(VersionToken::classify(version), expected);
    }

    #[rstest]
    #[case::release("1.0", "1.0")]
    #[case::snapshot("1.0-SNAPSHOT", "1.0-SNAPSHOT")]
    #[case::timestamped("1.0-20230101.120000-3", "1.0-SNAPSHOT")]
    #[case::timestamped_qualifier("1.0-beta-20230101.120000-17", "1.0-beta-SNAPSHOT")]
    #[case::bare_timestamp("20230101.120000-3", "20230101.120000-3")]
    #[case::short_timestamp("1.0-2023010.120000-3", "1.0-2023010.120000-3")]
    fn test_base_version(#[case] version: &str, #[case] expected: &str) {
        assert_eq!(base_version(version), expected);
    }

    #[rstest]
    #[case::floating("1.0-SNAPSHOT", true)]
    #[case::timestamped("1.0-20230101.120000-3", true)]
    #[case::release("1.0", false)]
    #[case::lowercase("1.0-snapshot", false)]
    fn test_is_snapshot(#[case] version: &str, #[case] expected: bool) {
        assert_eq!(is_snapshot_version(version), expected);
    }

    #[test]
    fn test_snapshot_qualifier() {
        assert_eq!(with_snapshot_qualifier("1.0-SNAPSHOT", "20230101.120000", 4), "1.0-20230101.120000-4");
    }

    #[rstest]
    #[case::gav("g:a:1.0", Some(Coordinate::new("g", "a", "1.0")))]
    #[case::extension("g:a:pom:1.0", Some(Coordinate::new("g", "a", "1.0").with_classifier_and_extension("", "pom")))]
    #[case::classifier("g:a:jar:tests:1.0", Some(Coordinate::new("g", "a", "1.0").with_classifier_and_extension("tests", "jar")))]
    #[case::too_short("g:a", None)]
    #[case::empty_version("g:a:", None)]
    #[case::too_long("g:a:b:c:d:e", None)]
    fn test_parse(#[case] s: &str, #[case] expected: Option<Coordinate>) {
        assert_eq!(Coordinate::parse(s).ok(), expected);
    }

    #[test]
    fn test_display_round_trip() {
        let coordinate = Coordinate::parse("org.example:lib:jar:sources:1.2").unwrap();
        assert_eq!(coordinate.to_string(), "org.example:lib:jar:sources:1.2");
        assert_eq!(Coordinate::parse(&coordinate.to_string()).unwrap(), coordinate);
    }

    #[test]
    fn test_relocation_key_uses_base_version() {
        let coordinate = Coordinate::new("g", "a", "2.0-20230101.120000-1");
        assert_eq!(coordinate.relocation_key(), "g:a:2.0-SNAPSHOT");
    }
}
