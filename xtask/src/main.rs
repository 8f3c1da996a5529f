use anyhow::Context;
use clap::{Parser, Subcommand};
use fs_err as fs;
use pbxsync_core::settings::SyncSettings;
use pbxsync_domain::{GroupRule, TargetRule};
use pbxsync_types::source::MatchMode;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Debug, Parser)]
#[command(name = "xtask", about = "Workspace helper tasks")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print schema identifiers used by pbxsync.
    PrintSchemas,
    /// Write a pbxsync.toml holding the built-in defaults.
    InitConfig {
        #[arg(long, default_value = "pbxsync.toml")]
        path: String,
        /// Overwrite an existing file.
        #[arg(long, default_value_t = false)]
        force: bool,
    },
}

/// Mirror of the CLI's config model, serialized from `SyncSettings`.
#[derive(Debug, Serialize)]
struct ConfigTemplate {
    project: String,
    roots: Vec<String>,
    extension: String,
    ignore: Vec<String>,
    match_mode: MatchMode,
    backup_suffix: String,
    targets: BTreeMap<String, TargetTemplate>,
    classify: ClassifyTemplate,
}

#[derive(Debug, Serialize)]
struct TargetTemplate {
    #[serde(skip_serializing_if = "Option::is_none")]
    native_target: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    sources_phase: Option<String>,
}

#[derive(Debug, Serialize)]
struct ClassifyTemplate {
    fallback_group: String,
    fallback_targets: Vec<String>,
    groups: Vec<GroupRule>,
    targets: Vec<TargetRule>,
}

fn default_config_toml() -> anyhow::Result<String> {
    let s = SyncSettings::default();
    let template = ConfigTemplate {
        project: s.project.to_string(),
        roots: s.roots,
        extension: s.extension,
        ignore: s.ignore,
        match_mode: s.match_mode,
        backup_suffix: s.backup_suffix,
        targets: s
            .targets
            .into_iter()
            .map(|(name, b)| {
                (
                    name,
                    TargetTemplate {
                        native_target: b.native_target,
                        sources_phase: b.sources_phase,
                    },
                )
            })
            .collect(),
        classify: ClassifyTemplate {
            fallback_group: s.rules.fallback_group,
            fallback_targets: s.rules.fallback_targets,
            groups: s.rules.groups,
            targets: s.rules.targets,
        },
    };
    toml::to_string_pretty(&template).context("serialize default config")
}

fn init_config(path: &Path, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!("{} already exists (use --force to overwrite)", path.display());
    }
    let body = default_config_toml()?;
    fs::write(path, body).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.cmd {
        Command::PrintSchemas => {
            println!("{}", pbxsync_types::schema::PBXSYNC_REPORT_V1);
            println!("{}", pbxsync_types::schema::PBXSYNC_ICONS_V1);
        }
        Command::InitConfig { path, force } => {
            init_config(Path::new(&path), force)?;
            println!("wrote {path}");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_lists_targets_and_rules() {
        let body = default_config_toml().unwrap();
        let v: toml::Value = toml::from_str(&body).unwrap();
        assert_eq!(v["match_mode"].as_str(), Some("file-name"));
        assert_eq!(v["targets"]["Watch"]["native_target"].as_str(), Some("Plena Watch App"));
        let groups = v["classify"]["groups"].as_array().unwrap();
        assert!(groups.iter().any(|g| g["group"].as_str() == Some("Components")));
    }

    #[test]
    fn init_config_refuses_to_overwrite() {
        let td = tempfile::tempdir().unwrap();
        let path = td.path().join("pbxsync.toml");
        init_config(&path, false).unwrap();
        assert!(init_config(&path, false).is_err());
        init_config(&path, true).unwrap();
    }
}
