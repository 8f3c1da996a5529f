//! Configuration file loading for pbxsync.
//!
//! Discovers and loads `pbxsync.toml` from the repository root (or an
//! explicit `--config` path) and merges it with CLI arguments. CLI
//! arguments take precedence.

use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use fs_err as fs;
use pbxsync_core::settings::{SyncSettings, TargetBinding};
use pbxsync_domain::{GroupRule, TargetRule};
use pbxsync_types::source::MatchMode;
use serde::Deserialize;
use std::collections::BTreeMap;
use tracing::debug;

/// The config file name to search for.
pub const CONFIG_FILE_NAME: &str = "pbxsync.toml";

/// Top-level configuration from pbxsync.toml.
///
/// Every field is optional; anything left out keeps the built-in default.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PbxsyncConfig {
    /// Manifest path relative to the repository root.
    pub project: Option<Utf8PathBuf>,
    pub roots: Option<Vec<String>>,
    pub extension: Option<String>,
    pub ignore: Option<Vec<String>>,
    pub match_mode: Option<MatchMode>,
    pub backup_suffix: Option<String>,

    /// Logical target name to Sources phase lookup. Replaces the default
    /// targets when non-empty.
    pub targets: BTreeMap<String, TargetConfig>,

    pub classify: ClassifyConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TargetConfig {
    pub native_target: Option<String>,
    /// Explicit Sources phase id; wins over `native_target`.
    pub sources_phase: Option<String>,
}

/// `[classify]` section. Rule lists replace the defaults when present.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ClassifyConfig {
    pub fallback_group: Option<String>,
    pub fallback_targets: Option<Vec<String>>,
    pub groups: Option<Vec<GroupRule>>,
    pub targets: Option<Vec<TargetRule>>,
}

/// Discover the pbxsync.toml config file.
///
/// Returns `None` if no config file is found.
pub fn discover_config(repo_root: &Utf8Path) -> Option<Utf8PathBuf> {
    let config_path = repo_root.join(CONFIG_FILE_NAME);
    if config_path.exists() {
        debug!("found config file at {}", config_path);
        Some(config_path)
    } else {
        debug!("no config file found at {}", config_path);
        None
    }
}

/// Load and parse a pbxsync.toml config file.
pub fn load_config(path: &Utf8Path) -> anyhow::Result<PbxsyncConfig> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("read config file {}", path))?;
    parse_config(&contents).with_context(|| format!("parse config file {}", path))
}

pub fn parse_config(contents: &str) -> anyhow::Result<PbxsyncConfig> {
    let config: PbxsyncConfig = toml::from_str(contents).context("invalid TOML")?;
    Ok(config)
}

/// Load the explicit config if given (it must exist), else the discovered
/// one, else defaults.
pub fn load_or_default(
    repo_root: &Utf8Path,
    explicit: Option<&Utf8Path>,
) -> anyhow::Result<PbxsyncConfig> {
    if let Some(path) = explicit {
        return load_config(path);
    }
    match discover_config(repo_root) {
        Some(path) => load_config(&path),
        None => Ok(PbxsyncConfig::default()),
    }
}

/// Sync flags given on the command line.
#[derive(Debug, Clone, Default)]
pub struct SyncArgs {
    pub repo_root: Utf8PathBuf,
    pub project: Option<Utf8PathBuf>,
    pub dry_run: bool,
}

/// Builder for merging config file with CLI arguments.
pub struct ConfigMerger {
    config: PbxsyncConfig,
}

impl ConfigMerger {
    pub fn new(config: PbxsyncConfig) -> Self {
        Self { config }
    }

    /// Produce pipeline settings. `--project` overrides the config file and
    /// `--dry-run` can only switch dry-run on.
    pub fn merge_sync_args(self, args: &SyncArgs) -> SyncSettings {
        let mut settings = SyncSettings {
            repo_root: args.repo_root.clone(),
            dry_run: args.dry_run,
            ..SyncSettings::default()
        };
        let cfg = self.config;

        if let Some(project) = args.project.clone().or(cfg.project) {
            settings.project = project;
        }
        if let Some(roots) = cfg.roots {
            settings.roots = roots;
        }
        if let Some(ext) = cfg.extension {
            settings.extension = ext.trim_start_matches('.').to_string();
        }
        if let Some(ignore) = cfg.ignore {
            settings.ignore = ignore;
        }
        if let Some(mode) = cfg.match_mode {
            settings.match_mode = mode;
        }
        if let Some(suffix) = cfg.backup_suffix {
            settings.backup_suffix = suffix;
        }
        if !cfg.targets.is_empty() {
            settings.targets = cfg
                .targets
                .into_iter()
                .map(|(name, t)| {
                    (
                        name,
                        TargetBinding {
                            native_target: t.native_target,
                            sources_phase: t.sources_phase,
                        },
                    )
                })
                .collect();
        }

        let classify = cfg.classify;
        if let Some(group) = classify.fallback_group {
            settings.rules.fallback_group = group;
        }
        if let Some(targets) = classify.fallback_targets {
            settings.rules.fallback_targets = targets;
        }
        if let Some(groups) = classify.groups {
            settings.rules.groups = groups;
        }
        if let Some(targets) = classify.targets {
            settings.rules.targets = targets;
        }
        settings
    }
}
