//! Edit engine for pbxsync.
//!
//! Responsibilities:
//! - Stage the records for one source file as text insertions and splice
//!   them into the manifest.
//! - Run a batch of files, recording a result per file.
//! - Write the backup and the patched manifest; render a diff preview.

mod error;
mod file_type;
mod patch;
mod stage;
mod write;

pub use error::{PatchError, StageError};
pub use file_type::last_known_file_type;
pub use patch::{PatchOptions, PatchOutcome, PendingFile, TargetPhases, patch_manifest};
pub use stage::{
    BuildMembership, Insertion, NewRecords, SECTION_BUILD_FILE, SECTION_FILE_REFERENCE, path_in_group,
    splice, stage,
};
pub use write::{backup_path, manifest_change, render_patch, sha256_hex, write_with_backup};
