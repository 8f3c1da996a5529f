use crate::source::SourceFile;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolInfo {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ended_at: Option<DateTime<Utc>>,
}

/// Outcome of one `pbxsync` run over one manifest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncReport {
    pub schema: String,
    pub tool: ToolInfo,
    pub run: RunInfo,

    /// Manifest path relative to the repository root.
    pub manifest: String,
    pub dry_run: bool,

    /// Number of qualifying files found under the roots.
    pub discovered: u64,

    #[serde(default)]
    pub missing: Vec<SourceFile>,

    #[serde(default)]
    pub results: Vec<FileResult>,

    pub summary: SyncSummary,

    /// Set whenever the manifest was written.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backup_path: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manifest_change: Option<ManifestChange>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl SyncReport {
    pub fn new(tool: ToolInfo, manifest: impl Into<String>, dry_run: bool) -> Self {
        Self {
            schema: crate::schema::PBXSYNC_REPORT_V1.to_string(),
            tool,
            run: RunInfo::default(),
            manifest: manifest.into(),
            dry_run,
            discovered: 0,
            missing: vec![],
            results: vec![],
            summary: SyncSummary::default(),
            backup_path: None,
            manifest_change: None,
            warnings: vec![],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileResult {
    pub path: String,
    pub status: PatchStatus,

    /// Group name (and hint) the file was classified into.
    pub group: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<String>,

    #[serde(default)]
    pub targets: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_ref_id: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub build_file_ids: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatchStatus {
    /// Dry-run: classified and located, nothing inserted.
    Planned,
    Patched,
    Skipped,
    Failed,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncSummary {
    pub missing: u64,
    pub attempted: u64,
    pub patched: u64,
    pub planned: u64,
    pub skipped: u64,
    pub failed: u64,
}

impl SyncSummary {
    pub fn record(&mut self, status: PatchStatus) {
        match status {
            PatchStatus::Planned => self.planned += 1,
            PatchStatus::Patched => self.patched += 1,
            PatchStatus::Skipped => self.skipped += 1,
            PatchStatus::Failed => self.failed += 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestChange {
    pub sha256_before: String,
    pub sha256_after: String,
    pub bytes_before: u64,
    pub bytes_after: u64,
}
