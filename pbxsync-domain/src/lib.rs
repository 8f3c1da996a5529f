//! Domain logic: which source files exist, which the manifest lacks, and
//! where each one belongs.
//!
//! This crate owns *what* should be added. It does not own *how* records
//! are spliced into the manifest; that's the `pbxsync-edit` crate.

mod classify;
mod diff;
mod discovery;
mod ports;

pub use classify::{
    DEFAULT_FALLBACK_GROUP, GroupRule, RuleSet, TARGET_IOS, TARGET_WATCH, TargetRule,
    default_group_rules, default_target_rules,
};
pub use diff::missing_files;
pub use discovery::discover_sources;
pub use ports::{FsRepoView, RepoView};
