//! Embeddable core library for pbxsync.
//!
//! Provides a clap-free, I/O-abstracted entry point suitable for linking
//! into other build tooling.
//!
//! # Ports
//!
//! - [`RepoView`] reads the repository (re-exported from pbxsync-domain)
//! - [`WritePort`](ports::WritePort) writes files and creates directories
//! - [`IdSource`] hands out fresh manifest identifiers
//!
//! The [`adapters`] module provides the filesystem-backed writer.
//!
//! # Entry points
//!
//! - [`run_sync`](pipeline::run_sync) adds missing source files to a manifest
//! - [`write_report_artifacts`](pipeline::write_report_artifacts) writes the
//!   report and diff to an output directory

pub mod adapters;
pub mod pipeline;
pub mod ports;
pub mod settings;

pub use pbxsync_domain::{FsRepoView, RepoView};
pub use pbxsync_pbxproj::{IdSource, RandomIds, SequentialIds};
