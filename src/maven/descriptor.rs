use std::collections::BTreeMap;

use serde_json::Value;
use tracing::warn;

use crate::maven::artifact_type::{ArtifactType, ArtifactTypeRegistry};
use crate::maven::coordinates::Coordinate;
use crate::maven::repository::{dedup_repositories, RepositorySource};
use crate::maven::{ChecksumHandling, MavenRepoPolicy, UpdatePolicy};

/// artifact property holding the file system path of a 'system' scoped dependency
pub const LOCAL_PATH_PROPERTY: &str = "localPath";

/// A fully built (inherited and interpolated) descriptor, as produced by a model builder.
///  Only the parts relevant for dependency resolution are represented.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedModel {
    pub group_id: String,
    pub artifact_id: String,
    pub version: String,
    pub packaging: String,
    pub dependencies: Vec<ModelDependency>,
    pub managed_dependencies: Vec<ModelDependency>,
    pub repositories: Vec<ModelRepository>,
    pub relocation: Option<Relocation>,
    pub prerequisites_maven: Option<String>,
    pub licenses: Vec<License>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelDependency {
    pub group_id: String,
    pub artifact_id: String,
    pub version: String,
    /// declared type, "jar" unless specified otherwise
    pub dependency_type: String,
    pub classifier: String,
    pub scope: String,
    pub optional: bool,
    pub system_path: Option<String>,
    pub exclusions: Vec<ModelExclusion>,
}
impl ModelDependency {
    pub fn new(group_id: &str, artifact_id: &str, version: &str) -> ModelDependency {
        ModelDependency {
            group_id: group_id.to_string(),
            artifact_id: artifact_id.to_string(),
            version: version.to_string(),
            dependency_type: "jar".to_string(),
            classifier: String::new(),
            scope: "compile".to_string(),
            optional: false,
            system_path: None,
            exclusions: vec![],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelExclusion {
    pub group_id: String,
    pub artifact_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModelRepository {
    pub id: String,
    pub url: String,
    pub releases: Option<ModelRepositoryPolicy>,
    pub snapshots: Option<ModelRepositoryPolicy>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelRepositoryPolicy {
    pub enabled: bool,
    pub update_policy: Option<String>,
    pub checksum_policy: Option<String>,
}

/// "distributionManagement/relocation". Fields that are `None` (or empty) keep the relocated
///  artifact's value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Relocation {
    pub group_id: Option<String>,
    pub artifact_id: Option<String>,
    pub version: Option<String>,
    pub message: Option<String>,
}
impl Relocation {
    /// classifier and extension are never relocated
    pub fn apply(&self, artifact: &Coordinate) -> Coordinate {
        fn pick(relocated: &Option<String>, original: &str) -> String {
            match relocated {
                Some(s) if !s.is_empty() => s.clone(),
                _ => original.to_string(),
            }
        }

        Coordinate {
            group_id: pick(&self.group_id, &artifact.group_id),
            artifact_id: pick(&self.artifact_id, &artifact.artifact_id),
            classifier: artifact.classifier.clone(),
            extension: artifact.extension.clone(),
            version: pick(&self.version, &artifact.version),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct License {
    pub name: Option<String>,
    pub url: Option<String>,
    pub comments: Option<String>,
    pub distribution: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedArtifact {
    pub coordinate: Coordinate,
    pub artifact_type: ArtifactType,
    pub properties: BTreeMap<String, String>,
}

/// An exclusion always applies to all classifiers and extensions of the excluded GA
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exclusion {
    pub group_id: String,
    pub artifact_id: String,
    pub classifier: String,
    pub extension: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedDependency {
    pub artifact: ResolvedArtifact,
    pub scope: String,
    pub optional: bool,
    pub exclusions: Vec<Exclusion>,
}

/// What dependency resolution needs to know about an artifact, extracted from its descriptor
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArtifactDescriptor {
    pub dependencies: Vec<ResolvedDependency>,
    pub managed_dependencies: Vec<ResolvedDependency>,
    pub repositories: Vec<RepositorySource>,
    pub properties: BTreeMap<String, Value>,
}
impl ArtifactDescriptor {
    pub fn from_model(model: &ParsedModel, types: &ArtifactTypeRegistry) -> ArtifactDescriptor {
        ArtifactDescriptor {
            dependencies: model.dependencies.iter()
                .map(|d| convert_dependency(d, types))
                .collect(),
            managed_dependencies: model.managed_dependencies.iter()
                .map(|d| convert_dependency(d, types))
                .collect(),
            repositories: dedup_repositories(&model.repositories.iter()
                .map(convert_repository)
                .collect::<Vec<_>>()),
            properties: descriptor_properties(model),
        }
    }
}

fn convert_dependency(dependency: &ModelDependency, types: &ArtifactTypeRegistry) -> ResolvedDependency {
    let artifact_type = types.get_or_ad_hoc(&dependency.dependency_type);

    let classifier = if dependency.classifier.is_empty() {
        artifact_type.classifier.clone()
    }
    else {
        dependency.classifier.clone()
    };

    let mut properties = BTreeMap::new();
    if let Some(system_path) = dependency.system_path.as_ref().filter(|p| !p.is_empty()) {
        properties.insert(LOCAL_PATH_PROPERTY.to_string(), system_path.clone());
    }

    ResolvedDependency {
        artifact: ResolvedArtifact {
            coordinate: Coordinate {
                group_id: dependency.group_id.clone(),
                artifact_id: dependency.artifact_id.clone(),
                classifier,
                extension: artifact_type.extension.clone(),
                version: dependency.version.clone(),
            },
            artifact_type,
            properties,
        },
        scope: dependency.scope.clone(),
        optional: dependency.optional,
        exclusions: dependency.exclusions.iter()
            .map(|e| Exclusion {
                group_id: e.group_id.clone(),
                artifact_id: e.artifact_id.clone(),
                classifier: "*".to_string(),
                extension: "*".to_string(),
            })
            .collect(),
    }
}

fn convert_repository(repository: &ModelRepository) -> RepositorySource {
    fn convert_policy(repository_id: &str, policy: &Option<ModelRepositoryPolicy>) -> MavenRepoPolicy {
        let policy = match policy {
            None => return MavenRepoPolicy::default(),
            Some(p) => p,
        };

        // a broken policy in a third party descriptor must not break resolution
        let update_policy = policy.update_policy.as_deref()
            .map(UpdatePolicy::parse)
            .transpose()
            .unwrap_or_else(|e| {
                warn!("ignoring update policy of repository {}: {}", repository_id, e);
                None
            })
            .unwrap_or_default();
        let checksum_handling = policy.checksum_policy.as_deref()
            .map(ChecksumHandling::parse)
            .transpose()
            .unwrap_or_else(|e| {
                warn!("ignoring checksum policy of repository {}: {}", repository_id, e);
                None
            })
            .unwrap_or_default();

        MavenRepoPolicy {
            enabled: policy.enabled,
            update_policy,
            checksum_handling,
        }
    }

    RepositorySource {
        release_policy: convert_policy(&repository.id, &repository.releases),
        snapshot_policy: convert_policy(&repository.id, &repository.snapshots),
        ..RepositorySource::remote(&repository.id, &repository.url)
    }
}

fn descriptor_properties(model: &ParsedModel) -> BTreeMap<String, Value> {
    fn opt(s: &Option<String>) -> Value {
        s.as_ref()
            .map(|s| Value::String(s.clone()))
            .unwrap_or(Value::Null)
    }

    let mut properties = BTreeMap::new();
    if let Some(maven) = &model.prerequisites_maven {
        properties.insert("prerequisites.maven".to_string(), Value::String(maven.clone()));
    }

    properties.insert("license.count".to_string(), Value::from(model.licenses.len()));
    for (i, license) in model.licenses.iter().enumerate() {
        properties.insert(format!("license.{}.name", i), opt(&license.name));
        properties.insert(format!("license.{}.url", i), opt(&license.url));
        properties.insert(format!("license.{}.comments", i), opt(&license.comments));
        properties.insert(format!("license.{}.distribution", i), opt(&license.distribution));
    }
    properties
}
