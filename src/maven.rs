pub mod artifact_type;
pub mod coordinates;
pub mod descriptor;
pub mod metadata_xml;
pub mod paths;
pub mod repository;
pub mod version;
pub mod version_range;
pub mod versioning;

use anyhow::anyhow;

/// How strictly a repository's checksums are verified. This is passed through to whatever
///  transport fetches files - resolution itself never looks at checksums.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ChecksumHandling {
    Require,
    #[default]
    VerifyIfPresent,
    Ignore,
}
impl ChecksumHandling {
    /// parses the values used in descriptor `<checksumPolicy>` elements
    pub fn parse(s: &str) -> anyhow::Result<ChecksumHandling> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fail" => Ok(ChecksumHandling::Require),
            "warn" | "" => Ok(ChecksumHandling::VerifyIfPresent),
            "ignore" => Ok(ChecksumHandling::Ignore),
            other => Err(anyhow!("unknown checksum policy: {:?}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum UpdatePolicy {
    Always,
    #[default]
    Daily,
    IntervalMinutes(u32),
    Never,
}
impl UpdatePolicy {
    pub fn parse(s: &str) -> anyhow::Result<UpdatePolicy> {
        let s = s.trim().to_ascii_lowercase();
        match s.as_str() {
            "always" => Ok(UpdatePolicy::Always),
            "daily" | "" => Ok(UpdatePolicy::Daily),
            "never" => Ok(UpdatePolicy::Never),
            _ => {
                if let Some(minutes) = s.strip_prefix("interval:") {
                    Ok(UpdatePolicy::IntervalMinutes(minutes.parse()?))
                }
                else {
                    Err(anyhow!("unknown update policy: {:?}", s))
                }
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MavenRepoPolicy {
    pub enabled: bool,
    pub update_policy: UpdatePolicy,
    pub checksum_handling: ChecksumHandling,
}
impl Default for MavenRepoPolicy {
    fn default() -> Self {
        MavenRepoPolicy {
            enabled: true,
            update_policy: UpdatePolicy::default(),
            checksum_handling: ChecksumHandling::default(),
        }
    }
}
