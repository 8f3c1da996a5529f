//! Which source files the manifest already references.

use crate::project::{ISA_FILE_REFERENCE, Project};
use camino::Utf8Path;
use pbxsync_types::source::{MatchMode, SourceFile};
use std::collections::{BTreeMap, BTreeSet};
use tracing::warn;

/// Existing `PBXFileReference` records keyed by file name or relative path.
#[derive(Debug, Clone)]
pub struct FileRefIndex {
    mode: MatchMode,
    entries: BTreeMap<String, String>,
    duplicates: BTreeSet<String>,
}

impl FileRefIndex {
    pub fn build(project: &Project, mode: MatchMode) -> Self {
        let mut entries = BTreeMap::new();
        let mut duplicates = BTreeSet::new();

        for obj in project.by_isa(ISA_FILE_REFERENCE) {
            let Some(declared) = obj.get_str("path").or_else(|| obj.get_str("name")) else {
                continue;
            };
            let key = match mode {
                MatchMode::FileName => Utf8Path::new(declared)
                    .file_name()
                    .unwrap_or(declared)
                    .to_string(),
                MatchMode::RelativePath => project
                    .resolved_path(&obj.id)
                    .map(|p| p.to_string())
                    .unwrap_or_else(|| declared.to_string()),
            };
            if entries.contains_key(&key) {
                duplicates.insert(key);
            } else {
                entries.insert(key, obj.id.clone());
            }
        }

        if mode == MatchMode::FileName && !duplicates.is_empty() {
            warn!(
                names = ?duplicates,
                "several file references share a file name; matching by name cannot tell them apart"
            );
        }

        Self {
            mode,
            entries,
            duplicates,
        }
    }

    pub fn mode(&self) -> MatchMode {
        self.mode
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Identifier of the existing reference for `file`, if any.
    pub fn lookup(&self, file: &SourceFile) -> Option<&str> {
        let key = match self.mode {
            MatchMode::FileName => file.file_name.as_str(),
            MatchMode::RelativePath => file.path.as_str(),
        };
        self.entries.get(key).map(String::as_str)
    }

    pub fn contains(&self, file: &SourceFile) -> bool {
        self.lookup(file).is_some()
    }

    /// Keys referenced by more than one record.
    pub fn duplicates(&self) -> &BTreeSet<String> {
        &self.duplicates
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SRC: &str = r#"{
	objects = {
		F1 /* Foo.swift */ = {isa = PBXFileReference; path = Foo.swift; sourceTree = "<group>"; };
		F2 /* Bar.swift */ = {isa = PBXFileReference; path = Views/Bar.swift; sourceTree = "<group>"; };
		F3 /* Foo.swift */ = {isa = PBXFileReference; path = Foo.swift; sourceTree = "<group>"; };
		F4 /* App.app */ = {isa = PBXFileReference; explicitFileType = wrapper.application; name = App.app; sourceTree = BUILT_PRODUCTS_DIR; };
		G1 /* App */ = {isa = PBXGroup; children = ( F1, F2, ); path = App; sourceTree = "<group>"; };
		G2 /* Other */ = {isa = PBXGroup; children = ( F3, ); path = Other; sourceTree = "<group>"; };
	};
}"#;

    fn project() -> Project {
        Project::parse(SRC).unwrap()
    }

    #[test]
    fn file_name_mode_uses_base_names() {
        let idx = FileRefIndex::build(&project(), MatchMode::FileName);
        assert_eq!(idx.lookup(&SourceFile::new("Elsewhere/Bar.swift").unwrap()), Some("F2"));
        assert_eq!(idx.lookup(&SourceFile::new("X/Foo.swift").unwrap()), Some("F1"));
        assert!(idx.contains(&SourceFile::new("App.app").unwrap()));
        assert!(!idx.contains(&SourceFile::new("App/Baz.swift").unwrap()));
    }

    #[test]
    fn file_name_mode_reports_duplicate_names() {
        let idx = FileRefIndex::build(&project(), MatchMode::FileName);
        assert_eq!(idx.duplicates().iter().collect::<Vec<_>>(), vec!["Foo.swift"]);
        assert_eq!(idx.len(), 3);
    }

    #[test]
    fn relative_path_mode_distinguishes_directories() {
        let idx = FileRefIndex::build(&project(), MatchMode::RelativePath);
        assert_eq!(idx.lookup(&SourceFile::new("App/Foo.swift").unwrap()), Some("F1"));
        assert_eq!(idx.lookup(&SourceFile::new("Other/Foo.swift").unwrap()), Some("F3"));
        assert_eq!(idx.lookup(&SourceFile::new("App/Views/Bar.swift").unwrap()), Some("F2"));
        assert!(!idx.contains(&SourceFile::new("Tests/Foo.swift").unwrap()));
        assert!(idx.duplicates().is_empty());
    }
}
