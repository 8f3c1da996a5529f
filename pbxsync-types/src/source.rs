use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};

/// A source file found on disk, relative to the repository root.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SourceFile {
    /// `/`-separated path relative to the repository root.
    pub path: Utf8PathBuf,
    pub file_name: String,
}

impl SourceFile {
    /// Returns `None` when the path has no file name component.
    pub fn new(path: impl Into<Utf8PathBuf>) -> Option<Self> {
        let path = path.into();
        let file_name = path.file_name()?.to_string();
        Some(Self { path, file_name })
    }

    /// Path segments, including the file name.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.path.components().map(|c| c.as_str())
    }

    /// The file extension, if any.
    pub fn extension(&self) -> Option<&str> {
        self.path.extension()
    }

    pub fn parent(&self) -> &Utf8Path {
        self.path.parent().unwrap_or_else(|| Utf8Path::new(""))
    }
}

/// Which manifest group a file belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GroupQuery {
    pub name: String,

    /// Expected `path` of the group, used to pick between same-named groups.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path_hint: Option<String>,
}

impl GroupQuery {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path_hint: None,
        }
    }

    pub fn with_hint(name: impl Into<String>, hint: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path_hint: Some(hint.into()),
        }
    }
}

impl std::fmt::Display for GroupQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.path_hint {
            Some(hint) => write!(f, "{} ({})", self.name, hint),
            None => f.write_str(&self.name),
        }
    }
}

/// Result of classifying one source file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub group: GroupQuery,
    /// Logical target names, in rule order, deduplicated.
    pub targets: Vec<String>,
}

/// How discovered files are matched against existing file references.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MatchMode {
    /// Compare by base file name only. Two files sharing a name in different
    /// directories cannot be told apart.
    #[default]
    FileName,
    /// Compare by project-relative path resolved through the group tree.
    RelativePath,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_file_splits_name_and_segments() {
        let f = SourceFile::new("Plena Watch App/Views/Foo.swift").unwrap();
        assert_eq!(f.file_name, "Foo.swift");
        assert_eq!(
            f.segments().collect::<Vec<_>>(),
            vec!["Plena Watch App", "Views", "Foo.swift"]
        );
        assert_eq!(f.extension(), Some("swift"));
        assert_eq!(f.parent(), Utf8Path::new("Plena Watch App/Views"));
    }

    #[test]
    fn group_query_display_includes_hint() {
        assert_eq!(GroupQuery::named("Tests").to_string(), "Tests");
        assert_eq!(
            GroupQuery::with_hint("Views", "Plena Watch App/Views").to_string(),
            "Views (Plena Watch App/Views)"
        );
    }

    #[test]
    fn match_mode_uses_kebab_case() {
        let s = serde_json::to_string(&MatchMode::RelativePath).unwrap();
        assert_eq!(s, "\"relative-path\"");
        let m: MatchMode = serde_json::from_str("\"file-name\"").unwrap();
        assert_eq!(m, MatchMode::FileName);
    }
}
