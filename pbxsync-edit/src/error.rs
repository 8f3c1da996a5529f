//! Error types for pbxsync-edit.
//!
//! This module separates failures confined to one file (the file is
//! reported as failed and the batch continues) from failures that abort the
//! whole batch before anything is written.

use pbxsync_pbxproj::ParseError;
use thiserror::Error;

/// A single file's records could not be staged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StageError {
    /// `/* End <section> section */` marker not found.
    #[error("could not find {section} section")]
    MissingSection { section: &'static str },

    /// The object or its list was not found.
    #[error("could not find `{key}` list of {object}")]
    MissingList { object: String, key: &'static str },

    /// The spliced records left a manifest that no longer parses.
    #[error("manifest no longer parses with this file's records: {source}")]
    Reparse { source: ParseError },

    /// The file does not live below its group's directory.
    #[error("{path} is not under group directory {group_dir}")]
    OutsideGroup { path: String, group_dir: String },
}

/// The batch was aborted; the manifest must not be written.
#[derive(Debug, Error)]
pub enum PatchError {
    #[error("manifest could not be parsed: {0}")]
    Parse(#[from] ParseError),

    /// A generated identifier already exists in the manifest or was handed
    /// out earlier in this run.
    #[error("generated identifier {id} collides with an existing identifier")]
    IdCollision { id: String },
}

impl PatchError {
    /// Returns the recommended exit code for this error.
    pub fn exit_code(&self) -> u8 {
        1
    }
}
