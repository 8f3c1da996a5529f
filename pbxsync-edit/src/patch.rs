use crate::error::{PatchError, StageError};
use crate::stage::{BuildMembership, NewRecords, path_in_group, splice, stage};
use pbxsync_pbxproj::{IdSource, ObjectId, Project};
use pbxsync_types::report::{FileResult, PatchStatus, SyncSummary};
use pbxsync_types::source::{Classification, SourceFile};
use std::collections::{BTreeMap, HashSet};
use tracing::{debug, info, warn};

/// A missing file together with where it belongs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingFile {
    pub file: SourceFile,
    pub classification: Classification,
}

#[derive(Debug, Clone, Default)]
pub struct PatchOptions {
    pub dry_run: bool,
}

/// Logical target name to the identifier of its `PBXSourcesBuildPhase`.
pub type TargetPhases = BTreeMap<String, String>;

#[derive(Debug, Clone)]
pub struct PatchOutcome {
    pub before: String,
    pub after: String,
    pub results: Vec<FileResult>,
    pub summary: SyncSummary,
    pub warnings: Vec<String>,
}

impl PatchOutcome {
    pub fn changed(&self) -> bool {
        self.before != self.after
    }
}

/// Add records for every pending file, one file at a time.
///
/// Each file's insertions are staged against the current manifest and
/// applied together; the manifest is re-parsed before the next file. A file
/// whose group or regions cannot be found, or whose records leave the
/// manifest unparseable, is reported and left out. Errors returned from here
/// abort the batch.
pub fn patch_manifest(
    text: &str,
    pending: &[PendingFile],
    phases: &TargetPhases,
    ids: &mut dyn IdSource,
    opts: &PatchOptions,
) -> Result<PatchOutcome, PatchError> {
    let mut project = Project::parse(text)?;
    let mut issued: HashSet<ObjectId> = HashSet::new();
    let mut results = Vec::with_capacity(pending.len());
    let mut summary = SyncSummary {
        missing: pending.len() as u64,
        ..SyncSummary::default()
    };
    let mut warnings = Vec::new();

    for item in pending {
        let path = item.file.path.to_string();
        let group = &item.classification.group;
        summary.attempted += 1;

        let mut result = FileResult {
            path: path.clone(),
            status: PatchStatus::Skipped,
            group: group.to_string(),
            group_id: None,
            targets: vec![],
            file_ref_id: None,
            build_file_ids: vec![],
            message: None,
        };

        let Some(group_obj) = project.find_group(group) else {
            warn!(path = %path, group = %group, "could not determine group; skipping");
            result.message = Some(format!("could not determine group {group}"));
            summary.record(result.status);
            results.push(result);
            continue;
        };
        let group_id = group_obj.id.clone();
        result.group_id = Some(group_id.clone());
        let ref_path = match path_in_group(&project, &group_id, &item.file) {
            Ok(p) => p,
            Err(e) => {
                warn!(path = %path, group = %group, error = %e, "file is outside its group; skipping");
                result.message = Some(e.to_string());
                summary.record(result.status);
                results.push(result);
                continue;
            }
        };

        let file_ref = fresh_id(&project, &mut issued, ids)?;
        let mut builds: Vec<BuildMembership> = Vec::new();
        for target in &item.classification.targets {
            let Some(phase_id) = phases.get(target) else {
                let msg = format!("{path}: target {target} has no Sources phase; not added to it");
                warn!(path = %path, target = %target, "target has no Sources phase");
                warnings.push(msg);
                continue;
            };
            if builds.iter().any(|b| &b.phase_id == phase_id) {
                debug!(path = %path, target = %target, phase = %phase_id, "phase already covered");
                continue;
            }
            builds.push(BuildMembership {
                target: target.clone(),
                phase_id: phase_id.clone(),
                id: fresh_id(&project, &mut issued, ids)?,
            });
        }

        result.targets = builds.iter().map(|b| b.target.clone()).collect();
        result.file_ref_id = Some(file_ref.to_string());
        result.build_file_ids = builds.iter().map(|b| b.id.to_string()).collect();

        if opts.dry_run {
            info!(path = %path, group = %group_id, targets = ?result.targets, "would add");
            result.status = PatchStatus::Planned;
            summary.record(result.status);
            results.push(result);
            continue;
        }

        let records = NewRecords {
            file: item.file.clone(),
            group_id,
            ref_path,
            file_ref,
            builds,
        };
        let applied = stage(&project, &records).and_then(|insertions| {
            let next = splice(project.text(), &insertions);
            Project::parse(next).map_err(|source| StageError::Reparse { source })
        });
        match applied {
            Ok(next) => {
                project = next;
                info!(path = %path, group = %records.group_id, targets = ?result.targets, "added");
                result.status = PatchStatus::Patched;
            }
            Err(e) => {
                warn!(path = %path, error = %e, "could not apply records; skipping");
                result.status = PatchStatus::Failed;
                result.message = Some(e.to_string());
                result.file_ref_id = None;
                result.build_file_ids.clear();
            }
        }
        summary.record(result.status);
        results.push(result);
    }

    Ok(PatchOutcome {
        before: text.to_string(),
        after: project.into_text(),
        results,
        summary,
        warnings,
    })
}

fn fresh_id(
    project: &Project,
    issued: &mut HashSet<ObjectId>,
    ids: &mut dyn IdSource,
) -> Result<ObjectId, PatchError> {
    let id = ids.next_id();
    if project.contains_id(id.as_str()) || !issued.insert(id.clone()) {
        return Err(PatchError::IdCollision { id: id.to_string() });
    }
    Ok(id)
}
