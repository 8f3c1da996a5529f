//! The sync pipeline, extracted from the CLI.
//!
//! Reads go through `RepoView`, writes through `WritePort`, and fresh
//! identifiers come from an `IdSource`, so the whole run can be driven
//! in-memory.

use crate::ports::WritePort;
use crate::settings::SyncSettings;
use anyhow::Context;
use camino::Utf8Path;
use chrono::Utc;
use pbxsync_domain::{RepoView, discover_sources, missing_files};
use pbxsync_edit::{
    PatchError, PatchOptions, PendingFile, TargetPhases, manifest_change, patch_manifest,
    render_patch, write_with_backup,
};
use pbxsync_pbxproj::{FileRefIndex, ISA_SOURCES_PHASE, IdSource, Project};
use pbxsync_render::render_sync_md;
use pbxsync_types::report::{SyncReport, ToolInfo};
use pbxsync_types::source::MatchMode;
use tracing::{debug, info, warn};

/// Error type for pipeline results. Every variant maps to exit code 1.
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("project file not found: {path}")]
    ManifestMissing { path: String },

    #[error(transparent)]
    Patch(#[from] PatchError),

    #[error("{0:#}")]
    Internal(#[from] anyhow::Error),
}

impl ToolError {
    pub fn exit_code(&self) -> u8 {
        match self {
            ToolError::ManifestMissing { .. } => 1,
            ToolError::Patch(e) => e.exit_code(),
            ToolError::Internal(_) => 1,
        }
    }
}

/// Outcome of `run_sync`.
#[derive(Debug, Clone)]
pub struct SyncOutcome {
    pub report: SyncReport,
    /// Unified diff of the manifest; empty when nothing changed.
    pub patch: String,
}

/// Run discovery, diffing and patching for one manifest.
///
/// The manifest (and its backup) are written only when this is not a dry
/// run and at least one file was patched.
pub fn run_sync(
    settings: &SyncSettings,
    repo: &dyn RepoView,
    writer: &dyn WritePort,
    ids: &mut dyn IdSource,
    tool: ToolInfo,
) -> Result<SyncOutcome, ToolError> {
    let manifest_rel = settings.project.as_path();
    let mut report = SyncReport::new(tool, manifest_rel.as_str(), settings.dry_run);
    report.run.started_at = Some(Utc::now());

    if !repo.exists(manifest_rel) {
        return Err(ToolError::ManifestMissing {
            path: manifest_rel.to_string(),
        });
    }
    let before = repo
        .read_to_string(manifest_rel)
        .context("read project manifest")?;
    let project = Project::parse(before.as_str()).map_err(PatchError::from)?;

    let phases = resolve_phases(&project, settings, &mut report.warnings);
    let index = FileRefIndex::build(&project, settings.match_mode);
    if settings.match_mode == MatchMode::FileName && !index.duplicates().is_empty() {
        let names: Vec<&str> = index.duplicates().iter().map(String::as_str).collect();
        report.warnings.push(format!(
            "several file references share a file name ({}); consider match_mode = \"relative-path\"",
            names.join(", ")
        ));
    }

    info!(roots = ?settings.roots, extension = %settings.extension, "scanning for missing source files");
    let discovered = discover_sources(repo, &settings.roots, &settings.extension)
        .context("discover source files")?;
    let missing = missing_files(&discovered, &index, &settings.ignore);
    report.discovered = discovered.len() as u64;
    report.summary.missing = missing.len() as u64;
    report.missing = missing.clone();

    if missing.is_empty() {
        info!(discovered = discovered.len(), "all source files are in the project");
        report.run.ended_at = Some(Utc::now());
        return Ok(SyncOutcome {
            report,
            patch: String::new(),
        });
    }
    info!(missing = missing.len(), "found missing files");

    let pending: Vec<PendingFile> = missing
        .into_iter()
        .map(|file| {
            let classification = settings.rules.classify(&file);
            debug!(path = %file.path, group = %classification.group, targets = ?classification.targets, "classified");
            PendingFile {
                file,
                classification,
            }
        })
        .collect();

    let opts = PatchOptions {
        dry_run: settings.dry_run,
    };
    let outcome = patch_manifest(&before, &pending, &phases, ids, &opts)?;

    report.results = outcome.results.clone();
    report.summary = outcome.summary.clone();
    report.warnings.extend(outcome.warnings.iter().cloned());
    let patch = render_patch(manifest_rel.as_str(), &outcome.before, &outcome.after);

    if !settings.dry_run && outcome.summary.patched > 0 && outcome.changed() {
        let manifest_abs = settings.repo_root.join(manifest_rel);
        let backup_abs = write_with_backup(
            &manifest_abs,
            &outcome.before,
            &outcome.after,
            &settings.backup_suffix,
            |path, bytes| writer.write_file(path, bytes),
        )?;
        let backup = backup_abs
            .strip_prefix(&settings.repo_root)
            .map(|p| p.to_path_buf())
            .unwrap_or(backup_abs);
        info!(backup = %backup, patched = outcome.summary.patched, "project manifest updated");
        report.backup_path = Some(backup.to_string());
        report.manifest_change = Some(manifest_change(&outcome.before, &outcome.after));
    } else {
        debug!("project manifest not written");
    }

    report.run.ended_at = Some(Utc::now());
    Ok(SyncOutcome { report, patch })
}

/// Look up each configured target's Sources phase.
///
/// Targets that cannot be resolved are left out; files assigned to them
/// are still added to their other targets.
pub fn resolve_phases(
    project: &Project,
    settings: &SyncSettings,
    warnings: &mut Vec<String>,
) -> TargetPhases {
    let mut phases = TargetPhases::new();
    for (name, binding) in &settings.targets {
        let resolved = if let Some(id) = &binding.sources_phase {
            match project.object(id) {
                Some(obj) if obj.isa == ISA_SOURCES_PHASE => Some(obj.id.clone()),
                Some(obj) => {
                    let msg = format!("target {name}: object {id} is a {}, not a Sources phase", obj.isa);
                    warn!(target = %name, id = %id, isa = %obj.isa, "configured phase is not a Sources phase");
                    warnings.push(msg);
                    None
                }
                None => {
                    warn!(target = %name, id = %id, "configured Sources phase not in manifest");
                    warnings.push(format!("target {name}: Sources phase {id} not found"));
                    None
                }
            }
        } else if let Some(native) = &binding.native_target {
            match project.sources_phase_for_target(native) {
                Some(phase) => Some(phase.id.clone()),
                None => {
                    warn!(target = %name, native_target = %native, "no Sources phase for native target");
                    warnings.push(format!(
                        "target {name}: no Sources phase found for native target \"{native}\""
                    ));
                    None
                }
            }
        } else {
            warnings.push(format!("target {name}: neither native_target nor sources_phase set"));
            None
        };
        if let Some(id) = resolved {
            debug!(target = %name, phase = %id, "resolved Sources phase");
            phases.insert(name.clone(), id);
        }
    }

    for name in settings.rules.target_names() {
        if !settings.targets.contains_key(&name) {
            warn!(target = %name, "classification rules use an unconfigured target");
            warnings.push(format!("target {name} is used by classification rules but not configured"));
        }
    }
    phases
}

/// Write `report.json`, `report.md` and `patch.diff` to `out_dir`.
pub fn write_report_artifacts(
    outcome: &SyncOutcome,
    out_dir: &Utf8Path,
    writer: &dyn WritePort,
) -> anyhow::Result<()> {
    writer.create_dir_all(out_dir)?;

    let json = serde_json::to_string_pretty(&outcome.report).context("serialize report")?;
    writer.write_file(&out_dir.join("report.json"), json.as_bytes())?;

    let md = render_sync_md(&outcome.report);
    writer.write_file(&out_dir.join("report.md"), md.as_bytes())?;

    writer.write_file(&out_dir.join("patch.diff"), outcome.patch.as_bytes())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::TargetBinding;
    use pretty_assertions::assert_eq;

    const SRC: &str = r#"{
	objects = {
		S1 /* Sources */ = {isa = PBXSourcesBuildPhase; files = ( ); };
		R1 /* Resources */ = {isa = PBXResourcesBuildPhase; files = ( ); };
		T1 /* Plena */ = {isa = PBXNativeTarget; buildPhases = ( R1 /* Resources */, S1 /* Sources */, ); name = Plena; };
	};
}"#;

    #[test]
    fn phases_resolve_by_native_target_name() {
        let project = Project::parse(SRC).unwrap();
        let mut warnings = vec![];
        let phases = resolve_phases(&project, &SyncSettings::default(), &mut warnings);
        assert_eq!(phases.get("iOS").map(String::as_str), Some("S1"));
        assert!(!phases.contains_key("Watch"));
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("Plena Watch App"));
    }

    #[test]
    fn explicit_phase_must_be_a_sources_phase() {
        let project = Project::parse(SRC).unwrap();
        let mut settings = SyncSettings::default();
        settings.targets.clear();
        settings.targets.insert(
            "iOS".into(),
            TargetBinding {
                native_target: None,
                sources_phase: Some("R1".into()),
            },
        );
        settings.targets.insert(
            "Watch".into(),
            TargetBinding {
                native_target: Some("Ignored".into()),
                sources_phase: Some("S1".into()),
            },
        );
        let mut warnings = vec![];
        let phases = resolve_phases(&project, &settings, &mut warnings);
        assert_eq!(phases.len(), 1);
        assert_eq!(phases["Watch"], "S1");
        assert!(warnings[0].contains("PBXResourcesBuildPhase"));
    }

    #[test]
    fn exit_codes_are_one() {
        let err = ToolError::ManifestMissing {
            path: "X.xcodeproj/project.pbxproj".into(),
        };
        assert_eq!(err.exit_code(), 1);
        assert!(err.to_string().contains("X.xcodeproj/project.pbxproj"));
        assert_eq!(ToolError::from(anyhow::anyhow!("boom")).exit_code(), 1);
    }
}
