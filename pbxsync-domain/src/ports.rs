use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use fs_err as fs;
use glob::{Pattern, glob};
use tracing::debug;

/// Read-only repository access.
///
/// pbxsync-domain uses this so discovery and diffing can run against an
/// in-memory tree in tests.
pub trait RepoView {
    fn root(&self) -> &Utf8Path;

    fn read_to_string(&self, rel: &Utf8Path) -> anyhow::Result<String>;

    fn exists(&self, rel: &Utf8Path) -> bool;

    fn is_dir(&self, rel: &Utf8Path) -> bool;

    /// Files under the directory `rel` (recursively) whose extension is
    /// `ext`, as paths relative to the repository root.
    fn files_with_extension(&self, rel: &Utf8Path, ext: &str) -> anyhow::Result<Vec<Utf8PathBuf>>;
}

/// File-system backed `RepoView`.
#[derive(Debug, Clone)]
pub struct FsRepoView {
    root: Utf8PathBuf,
}

impl FsRepoView {
    pub fn new(root: Utf8PathBuf) -> Self {
        Self { root }
    }

    fn abs(&self, rel: &Utf8Path) -> Utf8PathBuf {
        if rel.is_absolute() {
            rel.to_path_buf()
        } else {
            self.root.join(rel)
        }
    }
}

impl RepoView for FsRepoView {
    fn root(&self) -> &Utf8Path {
        &self.root
    }

    fn read_to_string(&self, rel: &Utf8Path) -> anyhow::Result<String> {
        let abs = self.abs(rel);
        fs::read_to_string(&abs).with_context(|| format!("read {}", abs))
    }

    fn exists(&self, rel: &Utf8Path) -> bool {
        self.abs(rel).exists()
    }

    fn is_dir(&self, rel: &Utf8Path) -> bool {
        self.abs(rel).is_dir()
    }

    fn files_with_extension(&self, rel: &Utf8Path, ext: &str) -> anyhow::Result<Vec<Utf8PathBuf>> {
        let base = self.abs(rel);
        let pattern = format!(
            "{}/**/*.{}",
            Pattern::escape(base.as_str()),
            Pattern::escape(ext)
        );
        debug!(pattern = %pattern, "scanning for source files");

        let mut out = Vec::new();
        for entry in glob(&pattern).with_context(|| format!("glob {}", pattern))? {
            let path = entry.map_err(|e| anyhow::anyhow!("glob error: {e}"))?;
            if !path.is_file() {
                continue;
            }
            let Ok(path) = Utf8PathBuf::from_path_buf(path) else {
                debug!("skipping non-UTF-8 path");
                continue;
            };
            match path.strip_prefix(&self.root) {
                Ok(rel) => out.push(normalize(rel)),
                Err(_) => out.push(path),
            }
        }
        Ok(out)
    }
}

/// `/`-separated form of a relative path.
fn normalize(rel: &Utf8Path) -> Utf8PathBuf {
    let joined: Vec<&str> = rel.components().map(|c| c.as_str()).collect();
    Utf8PathBuf::from(joined.join("/"))
}
