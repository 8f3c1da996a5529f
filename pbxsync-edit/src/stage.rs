//! Turning one file's new records into text insertions.

use crate::error::StageError;
use crate::file_type::last_known_file_type;
use pbxsync_pbxproj::{InsertPoint, ObjectId, Project, comment_text, quote};
use pbxsync_types::source::SourceFile;
use std::collections::BTreeSet;

pub const SECTION_FILE_REFERENCE: &str = "PBXFileReference";
pub const SECTION_BUILD_FILE: &str = "PBXBuildFile";

/// Text to place at a byte offset of the current manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Insertion {
    pub offset: usize,
    pub text: String,
}

/// Membership of the new file in one target's Sources phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildMembership {
    pub target: String,
    pub phase_id: String,
    pub id: ObjectId,
}

/// Everything added to the manifest for one source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRecords {
    pub file: SourceFile,
    pub group_id: String,
    /// `path` of the new reference, relative to the group's directory.
    pub ref_path: String,
    pub file_ref: ObjectId,
    pub builds: Vec<BuildMembership>,
}

/// Path of `file` relative to the directory of group `group_id`.
///
/// Groups anchored outside the project tree get the bare file name.
pub fn path_in_group(
    project: &Project,
    group_id: &str,
    file: &SourceFile,
) -> Result<String, StageError> {
    let Some(dir) = project.resolved_path(group_id) else {
        return Ok(file.file_name.clone());
    };
    match file.path.strip_prefix(&dir) {
        Ok(rel) if !rel.as_str().is_empty() => Ok(rel.to_string()),
        _ => Err(StageError::OutsideGroup {
            path: file.path.to_string(),
            group_dir: dir.to_string(),
        }),
    }
}

/// Locate every insertion point for `records` in `project`.
///
/// Either all insertions are returned or none: a missing region fails the
/// whole file.
pub fn stage(project: &Project, records: &NewRecords) -> Result<Vec<Insertion>, StageError> {
    let name = comment_text(&records.file.file_name);
    let path = quote(&records.ref_path);
    let kind = last_known_file_type(records.file.extension());
    let file_ref = &records.file_ref;

    let mut out = Vec::new();
    let mut separators = BTreeSet::new();

    let at = project
        .section_end(SECTION_FILE_REFERENCE)
        .ok_or(StageError::MissingSection {
            section: SECTION_FILE_REFERENCE,
        })?;
    out.push(record_line(
        &at,
        &format!(
            "{file_ref} /* {name} */ = {{isa = PBXFileReference; lastKnownFileType = {kind}; path = {path}; sourceTree = \"<group>\"; }};"
        ),
    ));

    if !records.builds.is_empty() {
        let at = project
            .section_end(SECTION_BUILD_FILE)
            .ok_or(StageError::MissingSection {
                section: SECTION_BUILD_FILE,
            })?;
        for build in &records.builds {
            out.push(record_line(
                &at,
                &format!(
                    "{} /* {name} in Sources */ = {{isa = PBXBuildFile; fileRef = {file_ref} /* {name} */; }};",
                    build.id
                ),
            ));
        }
    }

    list_entry(
        project,
        &records.group_id,
        "children",
        &format!("{file_ref} /* {name} */"),
        &mut separators,
        &mut out,
    )?;

    for build in &records.builds {
        list_entry(
            project,
            &build.phase_id,
            "files",
            &format!("{} /* {name} in Sources */", build.id),
            &mut separators,
            &mut out,
        )?;
    }

    Ok(out)
}

fn record_line(at: &InsertPoint, body: &str) -> Insertion {
    let text = if at.own_line {
        format!("{}{}\n", at.indent, body)
    } else {
        format!("\n{}{}\n", at.indent, body)
    };
    Insertion {
        offset: at.offset,
        text,
    }
}

fn list_entry(
    project: &Project,
    object: &str,
    key: &'static str,
    entry: &str,
    separators: &mut BTreeSet<usize>,
    out: &mut Vec<Insertion>,
) -> Result<(), StageError> {
    let at = project
        .list_end(object, key)
        .ok_or_else(|| StageError::MissingList {
            object: object.to_string(),
            key,
        })?;

    if let Some(sep) = at.separator_at
        && separators.insert(sep)
    {
        out.push(Insertion {
            offset: sep,
            text: ",".to_string(),
        });
    }

    let text = if at.own_line {
        format!("{}{},\n", at.indent, entry)
    } else {
        let close_indent = at.indent.strip_prefix('\t').unwrap_or("");
        format!("\n{}{},\n{}", at.indent, entry, close_indent)
    };
    out.push(Insertion {
        offset: at.offset,
        text,
    });
    Ok(())
}

/// Apply all insertions to `text` in one pass.
///
/// Insertions sharing an offset keep their staging order.
pub fn splice(text: &str, insertions: &[Insertion]) -> String {
    let mut order: Vec<&Insertion> = insertions.iter().collect();
    order.sort_by_key(|i| i.offset);

    let extra: usize = insertions.iter().map(|i| i.text.len()).sum();
    let mut out = String::with_capacity(text.len() + extra);
    let mut last = 0;
    for ins in order {
        let at = ins.offset.min(text.len());
        out.push_str(&text[last..at]);
        out.push_str(&ins.text);
        last = at;
    }
    out.push_str(&text[last..]);
    out
}
