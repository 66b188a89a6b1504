use crate::maven::coordinates::Coordinate;

/// relative path of an artifact inside a Maven repository, i.e. it starts with something like
///  "org/..." or "com/...". Timestamped snapshots live in their base version's directory.
pub fn as_maven_path(coordinate: &Coordinate) -> String {
    format!(
        "{}/{}/{}/{}",
        group_path(&coordinate.group_id),
        coordinate.artifact_id,
        coordinate.base_version(),
        maven_file_name(coordinate),
    )
}

/// `<artifactId>-<version>[-<classifier>].<extension>`
pub fn maven_file_name(coordinate: &Coordinate) -> String {
    let classifier_string = if coordinate.classifier.is_empty() {
        "".to_string()
    }
    else {
        format!("-{}", coordinate.classifier)
    };

    let extension_string = if coordinate.extension.is_empty() {
        "".to_string()
    }
    else {
        format!(".{}", coordinate.extension)
    };

    format!("{}-{}{}{}",
            coordinate.artifact_id,
            coordinate.version,
            classifier_string,
            extension_string,
    )
}

/// Metadata is stored per GA, and additionally per GAV for snapshots. Every repository gets its
///  own file so that records from different sources can be told apart.
pub fn metadata_path(group_id: &str, artifact_id: &str, version: Option<&str>, repository_id: &str) -> String {
    let file_name = format!("maven-metadata-{}.xml", repository_id);
    match version {
        None => format!("{}/{}/{}", group_path(group_id), artifact_id, file_name),
        Some(version) => format!("{}/{}/{}/{}", group_path(group_id), artifact_id, version, file_name),
    }
}

fn group_path(group_id: &str) -> String {
    group_id.replace('.', "/")
}
