use crate::ports::RepoView;
use anyhow::Context;
use camino::Utf8Path;
use pbxsync_types::source::SourceFile;
use std::collections::BTreeSet;
use tracing::debug;

/// Every file with extension `ext` under the given roots, sorted by
/// relative path with duplicates removed.
///
/// Roots that do not exist are skipped.
pub fn discover_sources(
    repo: &dyn RepoView,
    roots: &[String],
    ext: &str,
) -> anyhow::Result<Vec<SourceFile>> {
    let mut found = BTreeSet::new();
    for root in roots {
        let rel = Utf8Path::new(root);
        if !repo.is_dir(rel) {
            debug!(root = %root, "source root missing; skipped");
            continue;
        }
        let files = repo
            .files_with_extension(rel, ext)
            .with_context(|| format!("scan {}", root))?;
        debug!(root = %root, files = files.len(), "scanned source root");
        found.extend(files);
    }
    Ok(found.into_iter().filter_map(SourceFile::new).collect())
}
