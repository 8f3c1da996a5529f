//! Clap-free settings for the sync pipeline.

use camino::Utf8PathBuf;
use pbxsync_domain::{RuleSet, TARGET_IOS, TARGET_WATCH};
use pbxsync_types::source::MatchMode;
use std::collections::BTreeMap;

pub const DEFAULT_PROJECT: &str = "Plena.xcodeproj/project.pbxproj";
pub const DEFAULT_ROOTS: &[&str] = &["Plena", "Plena Watch App", "PlenaShared", "Tests"];
pub const DEFAULT_EXTENSION: &str = "swift";
pub const DEFAULT_IGNORE: &[&str] = &["BackgroundSessionManager.swift"];
pub const DEFAULT_BACKUP_SUFFIX: &str = ".backup";

/// How a logical target finds its Sources build phase.
///
/// `sources_phase` wins over `native_target` when both are set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TargetBinding {
    pub native_target: Option<String>,
    pub sources_phase: Option<String>,
}

impl TargetBinding {
    pub fn native(name: impl Into<String>) -> Self {
        Self {
            native_target: Some(name.into()),
            sources_phase: None,
        }
    }
}

/// Settings for the sync pipeline.
#[derive(Debug, Clone)]
pub struct SyncSettings {
    pub repo_root: Utf8PathBuf,
    /// Manifest path relative to `repo_root`.
    pub project: Utf8PathBuf,
    pub roots: Vec<String>,
    pub extension: String,
    /// File names that never count as missing.
    pub ignore: Vec<String>,
    pub match_mode: MatchMode,
    pub targets: BTreeMap<String, TargetBinding>,
    pub rules: RuleSet,

    pub dry_run: bool,

    // Backups
    pub backup_suffix: String,
}

impl Default for SyncSettings {
    fn default() -> Self {
        let mut targets = BTreeMap::new();
        targets.insert(TARGET_IOS.to_string(), TargetBinding::native("Plena"));
        targets.insert(
            TARGET_WATCH.to_string(),
            TargetBinding::native("Plena Watch App"),
        );
        Self {
            repo_root: Utf8PathBuf::from("."),
            project: Utf8PathBuf::from(DEFAULT_PROJECT),
            roots: DEFAULT_ROOTS.iter().map(|s| s.to_string()).collect(),
            extension: DEFAULT_EXTENSION.to_string(),
            ignore: DEFAULT_IGNORE.iter().map(|s| s.to_string()).collect(),
            match_mode: MatchMode::default(),
            targets,
            rules: RuleSet::default(),
            dry_run: false,
            backup_suffix: DEFAULT_BACKUP_SUFFIX.to_string(),
        }
    }
}
