//! Shared DTOs (schemas-as-code) for the pbxsync workspace.
//!
//! # Design constraints
//! - Report types are serialized to disk (`report.json`).
//! - Be conservative with breaking changes.
//! - Prefer adding optional fields over changing semantics.

pub mod icons;
pub mod report;
pub mod source;

/// Schema identifiers.
pub mod schema {
    pub const PBXSYNC_REPORT_V1: &str = "pbxsync.report.v1";
    pub const PBXSYNC_ICONS_V1: &str = "pbxsync.icons.v1";
}
