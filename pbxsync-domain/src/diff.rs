use pbxsync_pbxproj::FileRefIndex;
use pbxsync_types::source::SourceFile;
use tracing::debug;

/// Discovered files the manifest does not reference yet, in discovery order.
///
/// Files whose name is in `ignore` never count as missing.
pub fn missing_files(
    discovered: &[SourceFile],
    index: &FileRefIndex,
    ignore: &[String],
) -> Vec<SourceFile> {
    discovered
        .iter()
        .filter(|f| {
            if ignore.iter().any(|i| *i == f.file_name) {
                debug!(path = %f.path, "ignored by configuration");
                return false;
            }
            !index.contains(f)
        })
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pbxsync_pbxproj::Project;
    use pbxsync_types::source::MatchMode;
    use pretty_assertions::assert_eq;

    const SRC: &str = r#"{
	objects = {
		F1 /* Foo.swift */ = {isa = PBXFileReference; path = Foo.swift; sourceTree = "<group>"; };
	};
}"#;

    fn files(paths: &[&str]) -> Vec<SourceFile> {
        paths.iter().filter_map(|p| SourceFile::new(*p)).collect()
    }

    #[test]
    fn referenced_and_ignored_files_are_not_missing() {
        let project = Project::parse(SRC).unwrap();
        let index = FileRefIndex::build(&project, MatchMode::FileName);
        let discovered = files(&["Plena/Bar.swift", "Plena/Foo.swift", "Plena/Skip.swift"]);
        let missing = missing_files(&discovered, &index, &["Skip.swift".to_string()]);
        assert_eq!(missing, files(&["Plena/Bar.swift"]));
    }
}
