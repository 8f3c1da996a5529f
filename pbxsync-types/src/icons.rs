use serde::{Deserialize, Serialize};

/// Outcome of processing one `.appiconset` directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IconSetReport {
    pub schema: String,

    /// Icon set directory as given on the command line.
    pub dir: String,

    #[serde(default)]
    pub results: Vec<IconResult>,

    /// `Contents.json` was rewritten with generated filenames.
    #[serde(default)]
    pub contents_updated: bool,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,

    /// Set-level failures. A non-empty list fails the command.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

impl IconSetReport {
    pub fn new(dir: impl Into<String>) -> Self {
        Self {
            schema: crate::schema::PBXSYNC_ICONS_V1.to_string(),
            dir: dir.into(),
            results: vec![],
            contents_updated: false,
            warnings: vec![],
            errors: vec![],
        }
    }

    pub fn count(&self, action: IconAction) -> usize {
        self.results.iter().filter(|r| r.action == action).count()
    }

    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IconResult {
    pub filename: String,
    pub action: IconAction,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IconAction {
    /// Re-encoded as opaque RGB.
    Flattened,
    /// Near-white pixels made transparent.
    BorderCleared,
    /// Rendered from the largest existing icon.
    Generated,
    /// Listed in `Contents.json` but absent on disk.
    Missing,
    Failed,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn set_level_errors_fail_the_report() {
        let mut report = IconSetReport::new("AppIcon.appiconset");
        report.results.push(IconResult {
            filename: "a.png".into(),
            action: IconAction::Failed,
            width: None,
            height: None,
            message: Some("bad png".into()),
        });
        assert!(report.is_success());
        assert_eq!(report.count(IconAction::Failed), 1);

        report.errors.push("no source icon".into());
        assert!(!report.is_success());
    }

    #[test]
    fn serializes_with_schema_and_snake_case_actions() {
        let mut report = IconSetReport::new("X.appiconset");
        report.results.push(IconResult {
            filename: "icon_watch_216.png".into(),
            action: IconAction::Generated,
            width: Some(216),
            height: Some(216),
            message: None,
        });
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["schema"], "pbxsync.icons.v1");
        assert_eq!(json["results"][0]["action"], "generated");
        assert!(json.get("errors").is_none());
    }
}
