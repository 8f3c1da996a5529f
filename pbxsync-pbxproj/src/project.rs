//! Addressable view over a parsed `project.pbxproj`.

use crate::error::ParseError;
use crate::tree::{self, Array, Dict, SectionMarkers};
use camino::{Utf8Path, Utf8PathBuf};
use pbxsync_types::source::GroupQuery;
use std::collections::{BTreeMap, HashMap};
use std::ops::Range;
use tracing::debug;

pub const ISA_FILE_REFERENCE: &str = "PBXFileReference";
pub const ISA_BUILD_FILE: &str = "PBXBuildFile";
pub const ISA_GROUP: &str = "PBXGroup";
pub const ISA_VARIANT_GROUP: &str = "PBXVariantGroup";
pub const ISA_NATIVE_TARGET: &str = "PBXNativeTarget";
pub const ISA_SOURCES_PHASE: &str = "PBXSourcesBuildPhase";
pub const ISA_PROJECT: &str = "PBXProject";

/// One record of the `objects` dictionary.
#[derive(Debug, Clone)]
pub struct Object {
    pub id: String,
    pub comment: Option<String>,
    pub isa: String,
    /// From the identifier through the terminating `;`.
    pub span: Range<usize>,
    pub body: Dict,
}

impl Object {
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.body.get_str(key)
    }

    pub fn get_array(&self, key: &str) -> Option<&Array> {
        self.body.get_array(key)
    }

    /// Identifiers listed under `key`, e.g. `children` or `files`.
    pub fn id_list(&self, key: &str) -> Vec<&str> {
        self.get_array(key)
            .map(|a| a.strings().collect())
            .unwrap_or_default()
    }

    pub fn is_group(&self) -> bool {
        self.isa == ISA_GROUP || self.isa == ISA_VARIANT_GROUP
    }

    /// The name Xcode shows in the navigator: `name`, else the last component
    /// of `path`, else the record comment.
    pub fn display_name(&self) -> Option<&str> {
        if let Some(name) = self.get_str("name") {
            return Some(name);
        }
        if let Some(path) = self.get_str("path") {
            return Some(Utf8Path::new(path).file_name().unwrap_or(path));
        }
        self.comment.as_deref()
    }
}

/// Where a new line of text should be spliced in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsertPoint {
    pub offset: usize,
    /// Indentation for the inserted line.
    pub indent: String,
    /// True when `offset` is the start of a line that only holds the closing
    /// delimiter or marker; false for inline lists such as `files = ( );`.
    pub own_line: bool,
    /// Where a `,` must be added after the list's last item before
    /// anything can follow it.
    pub separator_at: Option<usize>,
}

/// A parsed project. Owns the text it was parsed from; offsets in every
/// node refer to that text.
#[derive(Debug, Clone)]
pub struct Project {
    text: String,
    objects: Vec<Object>,
    by_id: HashMap<String, usize>,
    parents: HashMap<String, String>,
    sections: BTreeMap<String, SectionMarkers>,
    root_object: Option<String>,
}

impl Project {
    pub fn parse(text: impl Into<String>) -> Result<Self, ParseError> {
        let text = text.into();
        let doc = tree::parse_document(&text)?;

        let objects_dict = doc
            .root
            .get_dict("objects")
            .ok_or_else(|| ParseError::Structure {
                message: "missing `objects` dictionary".to_string(),
            })?;

        let mut objects = Vec::with_capacity(objects_dict.entries.len());
        let mut by_id = HashMap::new();
        for entry in &objects_dict.entries {
            let Some(body) = entry.value.as_dict() else {
                return Err(ParseError::Structure {
                    message: format!("object {} is not a dictionary", entry.key),
                });
            };
            if by_id.insert(entry.key.clone(), objects.len()).is_some() {
                return Err(ParseError::Structure {
                    message: format!("duplicate object identifier {}", entry.key),
                });
            }
            objects.push(Object {
                id: entry.key.clone(),
                comment: entry.comment.clone(),
                isa: body.get_str("isa").unwrap_or_default().to_string(),
                span: entry.span.clone(),
                body: body.clone(),
            });
        }

        let mut parents = HashMap::new();
        for obj in objects.iter().filter(|o| o.is_group()) {
            for child in obj.id_list("children") {
                parents
                    .entry(child.to_string())
                    .or_insert_with(|| obj.id.clone());
            }
        }

        let root_object = doc.root.get_str("rootObject").map(str::to_string);
        debug!(objects = objects.len(), sections = doc.sections.len(), "parsed project");

        Ok(Self {
            text,
            objects,
            by_id,
            parents,
            sections: doc.sections,
            root_object,
        })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn into_text(self) -> String {
        self.text
    }

    pub fn objects(&self) -> &[Object] {
        &self.objects
    }

    pub fn object(&self, id: &str) -> Option<&Object> {
        self.by_id.get(id).map(|&i| &self.objects[i])
    }

    pub fn contains_id(&self, id: &str) -> bool {
        self.by_id.contains_key(id)
    }

    pub fn by_isa<'a>(&'a self, isa: &'a str) -> impl Iterator<Item = &'a Object> + 'a {
        self.objects.iter().filter(move |o| o.isa == isa)
    }

    pub fn groups(&self) -> impl Iterator<Item = &Object> {
        self.objects.iter().filter(|o| o.is_group())
    }

    pub fn sections(&self) -> &BTreeMap<String, SectionMarkers> {
        &self.sections
    }

    /// The group that lists `id` among its children.
    pub fn parent_of(&self, id: &str) -> Option<&Object> {
        self.parents.get(id).and_then(|p| self.object(p))
    }

    pub fn main_group(&self) -> Option<&Object> {
        let project = match &self.root_object {
            Some(id) => self.object(id),
            None => self.by_isa(ISA_PROJECT).next(),
        }?;
        self.object(project.get_str("mainGroup")?)
    }

    /// Project-relative path of a group or file reference, following
    /// `sourceTree = "<group>"` up through parent groups.
    ///
    /// Returns `None` for items anchored to an absolute, SDK or build-products
    /// tree, and for cyclic group structures.
    pub fn resolved_path(&self, id: &str) -> Option<Utf8PathBuf> {
        let mut parts: Vec<&str> = Vec::new();
        let mut current = self.object(id)?;
        for _ in 0..=self.objects.len() {
            if let Some(path) = current.get_str("path") {
                parts.push(path);
            }
            match current.get_str("sourceTree").unwrap_or("<group>") {
                "<group>" => match self.parent_of(&current.id) {
                    Some(parent) => current = parent,
                    None => return Some(join_reversed(&parts)),
                },
                "SOURCE_ROOT" => return Some(join_reversed(&parts)),
                _ => return None,
            }
        }
        None
    }

    /// Locate a group by display name, using the query's path hint to choose
    /// between same-named groups.
    ///
    /// The hint is tried against each candidate's resolved path (exact, then
    /// trailing segments) and finally its `path` attribute. The first tier
    /// with a single match decides; a tier with several matches makes the
    /// search inconclusive, as do several candidates none of which match.
    /// Inconclusive searches yield `None`.
    pub fn find_group(&self, query: &GroupQuery) -> Option<&Object> {
        let candidates: Vec<&Object> = self
            .groups()
            .filter(|g| g.display_name() == Some(query.name.as_str()))
            .collect();

        let hint = match query.path_hint.as_deref() {
            Some(hint) if !hint.is_empty() => Utf8Path::new(hint),
            _ => return candidates.first().copied(),
        };

        let resolved: Vec<Option<Utf8PathBuf>> = candidates
            .iter()
            .map(|g| self.resolved_path(&g.id))
            .collect();
        let exact = |i: usize| resolved[i].as_deref() == Some(hint);
        let suffix = |i: usize| resolved[i].as_deref().is_some_and(|p| p.ends_with(hint));
        let attr = |i: usize| candidates[i].get_str("path") == Some(hint.as_str());
        let tiers: [&dyn Fn(usize) -> bool; 3] = [&exact, &suffix, &attr];
        for tier in tiers {
            let matched: Vec<&Object> = (0..candidates.len())
                .filter(|&i| tier(i))
                .map(|i| candidates[i])
                .collect();
            match matched.as_slice() {
                [] => continue,
                [only] => return Some(*only),
                _ => {
                    debug!(group = %query, matches = matched.len(), "path hint matches several groups");
                    return None;
                }
            }
        }

        if candidates.len() == 1 {
            return candidates.first().copied();
        }
        debug!(
            group = %query,
            candidates = candidates.len(),
            "group search inconclusive"
        );
        None
    }

    pub fn native_target(&self, name: &str) -> Option<&Object> {
        self.by_isa(ISA_NATIVE_TARGET).find(|t| {
            t.get_str("name") == Some(name) || t.comment.as_deref() == Some(name)
        })
    }

    /// The Sources build phase of the native target called `target_name`.
    pub fn sources_phase_for_target(&self, target_name: &str) -> Option<&Object> {
        let target = self.native_target(target_name)?;
        target
            .id_list("buildPhases")
            .into_iter()
            .filter_map(|id| self.object(id))
            .find(|phase| phase.isa == ISA_SOURCES_PHASE)
    }

    /// Insertion point just before `/* End <name> section */`.
    pub fn section_end(&self, name: &str) -> Option<InsertPoint> {
        let marker = self.sections.get(name)?.end?;
        let (offset, _, own_line) = line_start(&self.text, marker);
        Some(InsertPoint {
            offset,
            indent: "\t\t".to_string(),
            own_line,
            separator_at: None,
        })
    }

    /// Insertion point just before the closing `)` of `object.key`.
    pub fn list_end(&self, object_id: &str, key: &str) -> Option<InsertPoint> {
        let list = self.object(object_id)?.get_array(key)?;
        let separator_at = if list.trailing_comma {
            None
        } else {
            list.items.last().map(|item| item.value.span().end)
        };
        let (offset, close_indent, own_line) = line_start(&self.text, list.close);
        if own_line {
            Some(InsertPoint {
                offset,
                indent: format!("{close_indent}\t"),
                own_line,
                separator_at,
            })
        } else {
            Some(InsertPoint {
                offset: list.close,
                indent: "\t\t\t\t".to_string(),
                own_line: false,
                separator_at,
            })
        }
    }
}

fn join_reversed(parts: &[&str]) -> Utf8PathBuf {
    let mut out = Utf8PathBuf::new();
    for part in parts.iter().rev() {
        out.push(part);
    }
    out
}

/// Returns the start of the line holding `offset`, the whitespace that
/// precedes `offset` on it, and whether only whitespace precedes it.
fn line_start(text: &str, offset: usize) -> (usize, &str, bool) {
    let before = &text[..offset];
    let ws_len = before.len() - before.trim_end_matches([' ', '\t']).len();
    let ws_start = offset - ws_len;
    if ws_start == 0 || text.as_bytes()[ws_start - 1] == b'\n' {
        (ws_start, &text[ws_start..offset], true)
    } else {
        (offset, "", false)
    }
}
