use std::collections::HashMap;

/// Maps a dependency's declared type (e.g. "test-jar") to the file it actually refers to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactType {
    pub id: String,
    pub extension: String,
    pub classifier: String,
    pub language: String,
    pub constitutes_build_path: bool,
    pub includes_dependencies: bool,
}
impl ArtifactType {
    fn new(id: &str, extension: &str, classifier: &str, language: &str, constitutes_build_path: bool, includes_dependencies: bool) -> ArtifactType {
        ArtifactType {
            id: id.to_string(),
            extension: extension.to_string(),
            classifier: classifier.to_string(),
            language: language.to_string(),
            constitutes_build_path,
            includes_dependencies,
        }
    }

    /// for types nobody registered: the type id doubles as file extension
    pub fn ad_hoc(id: &str) -> ArtifactType {
        ArtifactType::new(id, id, "", "none", false, false)
    }
}

#[derive(Debug, Clone)]
pub struct ArtifactTypeRegistry {
    types: HashMap<String, ArtifactType>,
}
impl ArtifactTypeRegistry {
    pub fn empty() -> ArtifactTypeRegistry {
        ArtifactTypeRegistry {
            types: HashMap::new(),
        }
    }

    pub fn register(&mut self, artifact_type: ArtifactType) {
        self.types.insert(artifact_type.id.clone(), artifact_type);
    }

    pub fn get(&self, id: &str) -> Option<&ArtifactType> {
        self.types.get(id)
    }

    pub fn get_or_ad_hoc(&self, id: &str) -> ArtifactType {
        self.get(id)
            .cloned()
            .unwrap_or_else(|| ArtifactType::ad_hoc(id))
    }
}
impl Default for ArtifactTypeRegistry {
    fn default() -> Self {
        let mut registry = ArtifactTypeRegistry::empty();
        registry.register(ArtifactType::new("pom", "pom", "", "none", false, false));
        registry.register(ArtifactType::new("maven-plugin", "jar", "", "java", true, false));
        registry.register(ArtifactType::new("jar", "jar", "", "java", true, false));
        registry.register(ArtifactType::new("ejb", "jar", "", "java", true, false));
        registry.register(ArtifactType::new("ejb-client", "jar", "client", "java", true, false));
        registry.register(ArtifactType::new("test-jar", "jar", "tests", "java", true, false));
        registry.register(ArtifactType::new("javadoc", "jar", "javadoc", "java", true, false));
        registry.register(ArtifactType::new("java-source", "jar", "sources", "java", false, false));
        registry.register(ArtifactType::new("war", "war", "", "java", false, true));
        registry.register(ArtifactType::new("ear", "ear", "", "java", false, true));
        registry.register(ArtifactType::new("rar", "rar", "", "java", false, true));
        registry.register(ArtifactType::new("par", "par", "", "java", false, true));
        registry
    }
}

#[cfg(test)]
mod test {
    use rstest::*;
    use super::*;

    #[rstest]
    #[case::jar("jar", "jar", "")]
    #[case::test_jar("test-jar", "jar", "tests")]
    #[case::sources("java-source", "jar", "sources")]
    #[case::plugin("maven-plugin", "jar", "")]
    #[case::war("war", "war", "")]
    #[case::unknown("zip", "zip", "")]
    fn test_defaults(#[case] id: &str, #[case] extension: &str, #[case] classifier: &str) {
        let artifact_type = ArtifactTypeRegistry::default().get_or_ad_hoc(id);
        assert_eq!(artifact_type.id, id);
        assert_eq!(artifact_type.extension, extension);
        assert_eq!(artifact_type.classifier, classifier);
    }

    #[test]
    fn test_register_overrides() {
        let mut registry = ArtifactTypeRegistry::default();
        registry.register(ArtifactType::ad_hoc("jar"));
        assert_eq!(registry.get("jar").unwrap().language, "none");
    }
}
