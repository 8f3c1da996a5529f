mod config;

use anyhow::Context;
use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand};
use config::{ConfigMerger, SyncArgs};
use pbxsync_core::adapters::FsWritePort;
use pbxsync_core::pipeline::{run_sync, write_report_artifacts};
use pbxsync_core::{FsRepoView, RandomIds};
use pbxsync_icons::{
    DEFAULT_BORDER_THRESHOLD, IconSetOptions, StripOptions, analyze_icon_file, process_icon_set,
    strip_border_dir,
};
use pbxsync_render::{render_icons_text, render_sync_text};
use pbxsync_types::icons::IconSetReport;
use pbxsync_types::report::ToolInfo;
use std::process::ExitCode;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "pbxsync",
    version,
    about = "Adds Swift sources missing from an Xcode project and fixes app-icon assets."
)]
struct Cli {
    #[command(subcommand)]
    cmd: Option<Command>,

    #[command(flatten)]
    sync: SyncFlags,

    /// Log at debug level (RUST_LOG overrides).
    #[arg(short, long, global = true, default_value_t = false)]
    verbose: bool,
}

#[derive(Debug, Args)]
struct SyncFlags {
    /// Report what would be added without touching the project file.
    #[arg(long, default_value_t = false)]
    dry_run: bool,

    /// Repository root (default: current directory).
    #[arg(long, default_value = ".")]
    repo_root: Utf8PathBuf,

    /// Project manifest relative to the repository root.
    #[arg(long)]
    project: Option<Utf8PathBuf>,

    /// Config file (default: <repo_root>/pbxsync.toml when present).
    #[arg(long)]
    config: Option<Utf8PathBuf>,

    /// Write report.json, report.md and patch.diff here.
    #[arg(long)]
    out_dir: Option<Utf8PathBuf>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// App-icon asset fixes for App Store submission.
    #[command(subcommand)]
    Icons(IconsCommand),
}

#[derive(Debug, Subcommand)]
enum IconsCommand {
    /// Remove alpha channels from every icon of an .appiconset.
    Fix(FixArgs),
    /// Check an icon for transparent edges and write a filled copy.
    Analyze(AnalyzeArgs),
    /// Make near-white pixels transparent in every PNG of a directory.
    StripBorder(StripBorderArgs),
}

#[derive(Debug, Parser)]
struct FixArgs {
    /// Path to the .appiconset directory.
    dir: Utf8PathBuf,

    /// Render icons for Contents.json entries that have no file.
    #[arg(long, default_value_t = false)]
    generate_missing: bool,

    /// Generated files are named icon_<prefix>_<px>.png.
    #[arg(long, default_value = "watch")]
    prefix: String,

    /// Print the report as JSON instead of text.
    #[arg(long, default_value_t = false)]
    json: bool,
}

#[derive(Debug, Parser)]
struct AnalyzeArgs {
    /// Icon to analyze.
    file: Utf8PathBuf,

    /// Where to write the edge-filled copy (default: <name>_fixed.png).
    #[arg(long)]
    fix_output: Option<Utf8PathBuf>,
}

#[derive(Debug, Parser)]
struct StripBorderArgs {
    /// Directory holding the PNG files.
    dir: Utf8PathBuf,

    /// Output directory; without it files are replaced in place after a
    /// .backup copy.
    #[arg(long)]
    output: Option<Utf8PathBuf>,

    /// Channels above this value count as white.
    #[arg(long, default_value_t = DEFAULT_BORDER_THRESHOLD)]
    threshold: u8,

    /// Print the report as JSON instead of text.
    #[arg(long, default_value_t = false)]
    json: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match real_main(cli) {
        Ok(code) => code,
        Err(e) => {
            error!("{:?}", e);
            eprintln!("error: {:#}", e);
            ExitCode::from(1)
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn real_main(cli: Cli) -> anyhow::Result<ExitCode> {
    match cli.cmd {
        None => cmd_sync(cli.sync),
        Some(Command::Icons(IconsCommand::Fix(args))) => cmd_icons_fix(args),
        Some(Command::Icons(IconsCommand::Analyze(args))) => cmd_icons_analyze(args),
        Some(Command::Icons(IconsCommand::StripBorder(args))) => cmd_icons_strip(args),
    }
}

fn cmd_sync(flags: SyncFlags) -> anyhow::Result<ExitCode> {
    let file_config = config::load_or_default(&flags.repo_root, flags.config.as_deref())
        .context("load pbxsync.toml config")?;
    let settings = ConfigMerger::new(file_config).merge_sync_args(&SyncArgs {
        repo_root: flags.repo_root.clone(),
        project: flags.project,
        dry_run: flags.dry_run,
    });
    debug!(
        "merged config: project={}, roots={:?}, ignore={:?}, targets={:?}",
        settings.project, settings.roots, settings.ignore, settings.targets
    );

    let repo = FsRepoView::new(flags.repo_root);
    let mut ids = RandomIds;
    let outcome = match run_sync(&settings, &repo, &FsWritePort, &mut ids, tool_info()) {
        Ok(outcome) => outcome,
        Err(e) => {
            error!("{}", e);
            eprintln!("error: {}", e);
            return Ok(ExitCode::from(e.exit_code()));
        }
    };

    print!("{}", render_sync_text(&outcome.report));

    if let Some(out_dir) = flags.out_dir {
        write_report_artifacts(&outcome, &out_dir, &FsWritePort)
            .with_context(|| format!("write report artifacts to {}", out_dir))?;
        info!("wrote report to {}", out_dir);
    }
    Ok(ExitCode::SUCCESS)
}

fn cmd_icons_fix(args: FixArgs) -> anyhow::Result<ExitCode> {
    let opts = IconSetOptions {
        generate_missing: args.generate_missing,
        prefix: args.prefix,
        ..IconSetOptions::default()
    };
    let report = process_icon_set(&args.dir, &opts)
        .with_context(|| format!("process icon set {}", args.dir))?;
    print_icon_report(&report, args.json)
}

fn cmd_icons_analyze(args: AnalyzeArgs) -> anyhow::Result<ExitCode> {
    let outcome = analyze_icon_file(&args.file, args.fix_output.as_deref())
        .with_context(|| format!("analyze {}", args.file))?;
    let r = &outcome.report;

    println!("Analyzing: {}", args.file);
    println!("  Size: {}x{}", r.width, r.height);
    if !r.has_alpha {
        println!("  No alpha channel; icon should be fine.");
        return Ok(ExitCode::SUCCESS);
    }
    println!(
        "  Edge transparency: {:.1}% ({}/{} pixels)",
        r.transparent_percent, r.transparent_pixels, r.edge_pixels
    );
    match &outcome.fixed {
        Some(path) => {
            println!("  Significant edge transparency; this shows as a dark border.");
            println!("Fixed icon created: {}", path);
        }
        None => println!("  Edges are mostly opaque."),
    }
    Ok(ExitCode::SUCCESS)
}

fn cmd_icons_strip(args: StripBorderArgs) -> anyhow::Result<ExitCode> {
    let opts = StripOptions {
        output: args.output,
        threshold: args.threshold,
    };
    let report =
        strip_border_dir(&args.dir, &opts).with_context(|| format!("strip border in {}", args.dir))?;
    print_icon_report(&report, args.json)
}

fn print_icon_report(report: &IconSetReport, json: bool) -> anyhow::Result<ExitCode> {
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(report).context("serialize icon report")?
        );
    } else {
        print!("{}", render_icons_text(report));
    }
    if report.is_success() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::from(1))
    }
}

fn tool_info() -> ToolInfo {
    ToolInfo {
        name: "pbxsync".to_string(),
        version: Some(env!("CARGO_PKG_VERSION").to_string()),
    }
}
