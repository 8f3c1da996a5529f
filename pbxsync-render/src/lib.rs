//! Rendering helpers (console text, markdown) for human-readable output.

use pbxsync_types::icons::{IconAction, IconSetReport};
use pbxsync_types::report::{PatchStatus, SyncReport};

/// Console summary printed after a run.
pub fn render_sync_text(report: &SyncReport) -> String {
    let mut out = String::new();

    if report.missing.is_empty() {
        out.push_str(&format!(
            "All {} source files are in the project.\n",
            report.discovered
        ));
        return out;
    }

    out.push_str(&format!(
        "Found {} missing file(s):\n",
        report.missing.len()
    ));
    for f in &report.missing {
        out.push_str(&format!("  - {}\n", f.path));
    }
    out.push('\n');

    for r in &report.results {
        let line = match r.status {
            PatchStatus::Planned => format!(
                "  would add {} (group {}, targets: {})\n",
                r.path,
                r.group_id.as_deref().unwrap_or("-"),
                targets_label(&r.targets)
            ),
            PatchStatus::Patched => format!(
                "  added {} (group {}, targets: {})\n",
                r.path,
                r.group_id.as_deref().unwrap_or("-"),
                targets_label(&r.targets)
            ),
            PatchStatus::Skipped | PatchStatus::Failed => format!(
                "  {} {}: {}\n",
                status_label(r.status),
                r.path,
                r.message.as_deref().unwrap_or("no reason recorded")
            ),
        };
        out.push_str(&line);
    }
    for w in &report.warnings {
        out.push_str(&format!("  warning: {}\n", w));
    }
    out.push('\n');

    let s = &report.summary;
    if report.dry_run {
        out.push_str(&format!(
            "Dry run: {} of {} file(s) would be added; no changes made.\n",
            s.planned, s.attempted
        ));
        return out;
    }

    out.push_str(&format!(
        "Added {} of {} file(s) ({} skipped, {} failed).\n",
        s.patched, s.attempted, s.skipped, s.failed
    ));
    if let Some(backup) = &report.backup_path {
        out.push_str(&format!("Backup saved to: {}\n", backup));
        out.push_str(&format!(
            "Restore it if needed: cp \"{}\" \"{}\"\n",
            backup, report.manifest
        ));
    } else {
        out.push_str("Project file not modified.\n");
    }
    out
}

pub fn render_sync_md(report: &SyncReport) -> String {
    let mut out = String::new();
    out.push_str("# pbxsync report\n\n");
    out.push_str(&format!("- Manifest: `{}`\n", report.manifest));
    out.push_str(&format!("- Dry run: `{}`\n", report.dry_run));
    out.push_str(&format!("- Discovered: {}\n", report.discovered));
    out.push_str(&format!(
        "- Missing: {} (patched {}, planned {}, skipped {}, failed {})\n",
        report.summary.missing,
        report.summary.patched,
        report.summary.planned,
        report.summary.skipped,
        report.summary.failed
    ));
    if let Some(backup) = &report.backup_path {
        out.push_str(&format!("- Backup: `{}`\n", backup));
    }
    if let Some(change) = &report.manifest_change {
        out.push_str(&format!(
            "- Manifest sha256: `{}` -> `{}` ({} -> {} bytes)\n",
            short(&change.sha256_before),
            short(&change.sha256_after),
            change.bytes_before,
            change.bytes_after
        ));
    }
    out.push('\n');

    out.push_str("## Files\n\n");
    if report.results.is_empty() {
        out.push_str("_No missing files._\n");
    } else {
        out.push_str("| File | Status | Group | Targets | Note |\n");
        out.push_str("|------|--------|-------|---------|------|\n");
        for r in &report.results {
            out.push_str(&format!(
                "| `{}` | {} | {} | {} | {} |\n",
                r.path,
                status_label(r.status),
                r.group,
                targets_label(&r.targets),
                r.message.as_deref().unwrap_or("")
            ));
        }
    }

    if !report.warnings.is_empty() {
        out.push_str("\n## Warnings\n\n");
        for w in &report.warnings {
            out.push_str(&format!("- {}\n", w));
        }
    }

    out
}

/// Console summary for `pbxsync icons fix` and `strip-border`.
pub fn render_icons_text(report: &IconSetReport) -> String {
    let mut out = String::new();
    out.push_str(&format!("Processing icons in: {}\n", report.dir));
    for r in &report.results {
        let size = match (r.width, r.height) {
            (Some(w), Some(h)) => format!(" ({}x{})", w, h),
            _ => String::new(),
        };
        let note = r
            .message
            .as_deref()
            .map(|m| format!(": {}", m))
            .unwrap_or_default();
        out.push_str(&format!(
            "  {} {}{}{}\n",
            icon_action_label(r.action),
            r.filename,
            size,
            note
        ));
    }
    for w in &report.warnings {
        out.push_str(&format!("  warning: {}\n", w));
    }
    for e in &report.errors {
        out.push_str(&format!("  error: {}\n", e));
    }
    if report.contents_updated {
        out.push_str("  updated Contents.json\n");
    }
    out.push('\n');

    let done = report.count(IconAction::Flattened) + report.count(IconAction::BorderCleared);
    out.push_str(&format!("Processed {} icon(s)", done));
    let generated = report.count(IconAction::Generated);
    if generated > 0 {
        out.push_str(&format!(", created {}", generated));
    }
    let failed = report.count(IconAction::Failed);
    if failed > 0 {
        out.push_str(&format!(", {} failed", failed));
    }
    out.push_str(".\n");
    out
}

fn icon_action_label(action: IconAction) -> &'static str {
    match action {
        IconAction::Flattened => "fixed",
        IconAction::BorderCleared => "cleared",
        IconAction::Generated => "created",
        IconAction::Missing => "missing",
        IconAction::Failed => "failed",
    }
}

fn status_label(status: PatchStatus) -> &'static str {
    match status {
        PatchStatus::Planned => "planned",
        PatchStatus::Patched => "patched",
        PatchStatus::Skipped => "skipped",
        PatchStatus::Failed => "failed",
    }
}

fn targets_label(targets: &[String]) -> String {
    if targets.is_empty() {
        "none".to_string()
    } else {
        targets.join(", ")
    }
}

fn short(sha: &str) -> &str {
    sha.get(..12).unwrap_or(sha)
}
