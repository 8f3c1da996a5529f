use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use diffy::PatchFormatter;
use pbxsync_types::report::ManifestChange;
use sha2::{Digest, Sha256};

/// `<manifest><suffix>`, e.g. `project.pbxproj.backup`.
pub fn backup_path(manifest: &Utf8Path, suffix: &str) -> Utf8PathBuf {
    Utf8PathBuf::from(format!("{manifest}{suffix}"))
}

/// Persist `before` as the backup, then overwrite the manifest with `after`.
///
/// The manifest is not touched if the backup cannot be written.
pub fn write_with_backup<W>(
    manifest: &Utf8Path,
    before: &str,
    after: &str,
    suffix: &str,
    mut write: W,
) -> anyhow::Result<Utf8PathBuf>
where
    W: FnMut(&Utf8Path, &[u8]) -> anyhow::Result<()>,
{
    let backup = backup_path(manifest, suffix);
    write(&backup, before.as_bytes()).with_context(|| format!("write backup {}", backup))?;
    write(manifest, after.as_bytes()).with_context(|| format!("write {}", manifest))?;
    Ok(backup)
}

pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

pub fn manifest_change(before: &str, after: &str) -> ManifestChange {
    ManifestChange {
        sha256_before: sha256_hex(before.as_bytes()),
        sha256_after: sha256_hex(after.as_bytes()),
        bytes_before: before.len() as u64,
        bytes_after: after.len() as u64,
    }
}

/// Unified diff of the manifest, empty when nothing changed.
pub fn render_patch(path: &str, before: &str, after: &str) -> String {
    if before == after {
        return String::new();
    }
    let mut out = String::new();
    let formatter = PatchFormatter::new();

    out.push_str(&format!("diff --git a/{0} b/{0}\n", path));
    out.push_str(&format!("--- a/{0}\n+++ b/{0}\n", path));

    let patch = diffy::create_patch(before, after);
    out.push_str(&formatter.fmt_patch(&patch).to_string());
    if !out.ends_with('\n') {
        out.push('\n');
    }
    out
}
