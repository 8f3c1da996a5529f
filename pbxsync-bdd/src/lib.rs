//! BDD harness (cucumber-rs).
//!
//! This crate keeps scenario tests isolated from the production crates.
//! Shared helpers for the step definitions live here.

use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use fs_err as fs;

/// Workspace-root fixture repository used by every scenario.
pub fn fixture_repo_dir() -> Utf8PathBuf {
    Utf8Path::new(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .map(|root| root.join("tests/fixtures/plena/repo"))
        .unwrap_or_else(|| Utf8PathBuf::from("tests/fixtures/plena/repo"))
}

/// Recursively copy `src` into `dst`.
pub fn copy_tree(src: &Utf8Path, dst: &Utf8Path) -> anyhow::Result<()> {
    fs::create_dir_all(dst)?;
    for entry in fs::read_dir(src)? {
        let entry = entry?;
        let name = entry.file_name();
        let name = name
            .to_str()
            .with_context(|| format!("non UTF-8 file name under {}", src))?;
        let from = src.join(name);
        let to = dst.join(name);
        if entry.file_type()?.is_dir() {
            copy_tree(&from, &to)?;
        } else {
            fs::copy(&from, &to).with_context(|| format!("copy {}", from))?;
        }
    }
    Ok(())
}
