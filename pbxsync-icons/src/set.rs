//! Whole-directory icon operations.

use crate::contents::{Contents, to_json};
use crate::error::IconError;
use crate::ops::{
    DEFAULT_BORDER_THRESHOLD, EdgeReport, WHITE, analyze_edges, clear_white_border, decode,
    encode_png, fill_edges, remove_alpha,
};
use camino::{Utf8Path, Utf8PathBuf};
use fs_err as fs;
use image::imageops::{self, FilterType};
use image::{DynamicImage, Rgb};
use pbxsync_types::icons::{IconAction, IconResult, IconSetReport};
use tracing::{debug, info, warn};

pub const CONTENTS_FILE: &str = "Contents.json";

#[derive(Debug, Clone)]
pub struct IconSetOptions {
    /// Render entries that have no `filename` from the largest icon.
    pub generate_missing: bool,
    /// Generated files are named `icon_<prefix>_<px>.png`.
    pub prefix: String,
    pub background: Rgb<u8>,
}

impl Default for IconSetOptions {
    fn default() -> Self {
        Self {
            generate_missing: false,
            prefix: "watch".to_string(),
            background: WHITE,
        }
    }
}

fn result(filename: &str, action: IconAction) -> IconResult {
    IconResult {
        filename: filename.to_string(),
        action,
        width: None,
        height: None,
        message: None,
    }
}

fn failed(filename: &str, err: &IconError) -> IconResult {
    IconResult {
        message: Some(err.to_string()),
        ..result(filename, IconAction::Failed)
    }
}

fn flatten_file(path: &Utf8Path, background: Rgb<u8>) -> Result<(u32, u32), IconError> {
    let img = decode(&fs::read(path)?, path.as_str())?;
    let flat = DynamicImage::ImageRgb8(remove_alpha(&img, background));
    fs::write(path, encode_png(&flat)?)?;
    Ok((flat.width(), flat.height()))
}

/// Make every icon of an `.appiconset` opaque and optionally fill empty
/// slots.
///
/// Fails only when the directory or its `Contents.json` cannot be used;
/// per-file problems are recorded in the report.
pub fn process_icon_set(dir: &Utf8Path, opts: &IconSetOptions) -> Result<IconSetReport, IconError> {
    if !dir.is_dir() {
        return Err(IconError::DirMissing {
            path: dir.to_string(),
        });
    }
    let contents_path = dir.join(CONTENTS_FILE);
    if !contents_path.is_file() {
        return Err(IconError::ContentsMissing {
            path: dir.to_string(),
        });
    }
    let mut contents: Contents = serde_json::from_str(&fs::read_to_string(&contents_path)?)
        .map_err(|source| IconError::Contents {
            path: dir.to_string(),
            source,
        })?;

    let mut report = IconSetReport::new(dir.as_str());
    let mut empty_slots = Vec::new();
    for (i, entry) in contents.images.iter().enumerate() {
        let Some(filename) = entry.filename.as_deref() else {
            empty_slots.push(i);
            continue;
        };
        let path = dir.join(filename);
        if !path.is_file() {
            warn!(file = %filename, "icon listed in Contents.json is missing");
            report.warnings.push(format!("missing file: {filename}"));
            report.results.push(result(filename, IconAction::Missing));
            continue;
        }
        match flatten_file(&path, opts.background) {
            Ok((w, h)) => {
                debug!(file = %filename, width = w, height = h, "removed alpha channel");
                report.results.push(IconResult {
                    width: Some(w),
                    height: Some(h),
                    ..result(filename, IconAction::Flattened)
                });
            }
            Err(err) => {
                warn!(file = %filename, error = %err, "could not fix icon");
                report.results.push(failed(filename, &err));
            }
        }
    }

    if empty_slots.is_empty() {
        return Ok(report);
    }
    if !opts.generate_missing {
        report.warnings.push(format!(
            "{} icon slot(s) have no file; use --generate-missing to render them",
            empty_slots.len()
        ));
        return Ok(report);
    }

    let Some(source) = largest_icon(dir, &contents) else {
        report
            .errors
            .push("no source icon found to create missing icons".to_string());
        return Ok(report);
    };
    let source = remove_alpha(&source, opts.background);
    info!(slots = empty_slots.len(), "creating missing icons");

    let mut generated = 0usize;
    for i in empty_slots {
        let entry = &mut contents.images[i];
        let Some((w, h)) = entry.pixel_size() else {
            let size = entry.size.as_deref().unwrap_or("unknown");
            report.warnings.push(format!("could not parse size '{size}'"));
            continue;
        };
        let filename = format!("icon_{}_{}.png", opts.prefix, w);
        let resized = DynamicImage::ImageRgb8(imageops::resize(&source, w, h, FilterType::Lanczos3));
        let written = encode_png(&resized)
            .and_then(|bytes| fs::write(dir.join(&filename), bytes).map_err(IconError::from));
        match written {
            Ok(()) => {
                info!(file = %filename, width = w, height = h, "created icon");
                entry.filename = Some(filename.clone());
                generated += 1;
                report.results.push(IconResult {
                    width: Some(w),
                    height: Some(h),
                    ..result(&filename, IconAction::Generated)
                });
            }
            Err(err) => report.results.push(failed(&filename, &err)),
        }
    }

    if generated > 0 {
        let json = to_json(&contents).map_err(|source| IconError::Contents {
            path: dir.to_string(),
            source,
        })?;
        fs::write(&contents_path, json)?;
        report.contents_updated = true;
    }
    Ok(report)
}

/// The listed, decodable icon with the largest area. Ties keep the first.
fn largest_icon(dir: &Utf8Path, contents: &Contents) -> Option<DynamicImage> {
    let mut best: Option<DynamicImage> = None;
    for filename in contents.images.iter().filter_map(|e| e.filename.as_deref()) {
        let path = dir.join(filename);
        let Ok(bytes) = fs::read(&path) else {
            continue;
        };
        let Ok(img) = decode(&bytes, path.as_str()) else {
            continue;
        };
        let area = u64::from(img.width()) * u64::from(img.height());
        if best
            .as_ref()
            .is_none_or(|b| area > u64::from(b.width()) * u64::from(b.height()))
        {
            best = Some(img);
        }
    }
    best
}

#[derive(Debug, Clone)]
pub struct AnalyzeOutcome {
    pub report: EdgeReport,
    /// Where the edge-filled copy was written, when one was needed.
    pub fixed: Option<Utf8PathBuf>,
}

/// `<dir>/<stem>_fixed.png` next to `path`.
pub fn default_fix_output(path: &Utf8Path) -> Utf8PathBuf {
    let stem = path.file_stem().unwrap_or("icon");
    path.with_file_name(format!("{stem}_fixed.png"))
}

/// Check one icon for edge transparency and write a filled copy if needed.
pub fn analyze_icon_file(
    path: &Utf8Path,
    fix_output: Option<&Utf8Path>,
) -> Result<AnalyzeOutcome, IconError> {
    let img = decode(&fs::read(path)?, path.as_str())?;
    let report = analyze_edges(&img);
    info!(
        file = %path,
        transparent = report.transparent_pixels,
        edge = report.edge_pixels,
        has_issues = report.has_issues,
        "analyzed icon edges"
    );
    if !report.has_issues {
        return Ok(AnalyzeOutcome {
            report,
            fixed: None,
        });
    }
    let out = fix_output.map_or_else(|| default_fix_output(path), Utf8Path::to_path_buf);
    fs::write(&out, encode_png(&fill_edges(&img))?)?;
    Ok(AnalyzeOutcome {
        report,
        fixed: Some(out),
    })
}

#[derive(Debug, Clone)]
pub struct StripOptions {
    /// Write results here instead of replacing the originals.
    pub output: Option<Utf8PathBuf>,
    pub threshold: u8,
}

impl Default for StripOptions {
    fn default() -> Self {
        Self {
            output: None,
            threshold: DEFAULT_BORDER_THRESHOLD,
        }
    }
}

/// Suffix of the copy kept when an icon is replaced in place.
pub const BACKUP_SUFFIX: &str = ".backup";

/// Clear near-white pixels from every `*.png` in `dir`.
///
/// In place, each original is first copied to `<file>.backup` unless that
/// backup already exists.
pub fn strip_border_dir(dir: &Utf8Path, opts: &StripOptions) -> Result<IconSetReport, IconError> {
    if !dir.is_dir() {
        return Err(IconError::DirMissing {
            path: dir.to_string(),
        });
    }
    let mut pngs = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if let Some(name) = entry.file_name().to_str()
            && name.ends_with(".png")
            && entry.file_type()?.is_file()
        {
            pngs.push(name.to_string());
        }
    }
    if pngs.is_empty() {
        return Err(IconError::NoPngs {
            path: dir.to_string(),
        });
    }
    pngs.sort();
    if let Some(out_dir) = &opts.output {
        fs::create_dir_all(out_dir)?;
    }

    let mut report = IconSetReport::new(dir.as_str());
    for name in &pngs {
        match strip_one(dir, name, opts) {
            Ok((w, h)) => {
                debug!(file = %name, "cleared white border");
                report.results.push(IconResult {
                    width: Some(w),
                    height: Some(h),
                    ..result(name, IconAction::BorderCleared)
                });
            }
            Err(err) => {
                warn!(file = %name, error = %err, "could not clear border");
                report.results.push(failed(name, &err));
            }
        }
    }
    let failures = report.count(IconAction::Failed);
    if failures > 0 {
        report
            .errors
            .push(format!("{failures} of {} icon(s) could not be processed", pngs.len()));
    }
    Ok(report)
}

fn strip_one(dir: &Utf8Path, name: &str, opts: &StripOptions) -> Result<(u32, u32), IconError> {
    let input = dir.join(name);
    let bytes = fs::read(&input)?;
    let target = match &opts.output {
        Some(out_dir) => out_dir.join(name),
        None => {
            let backup = Utf8PathBuf::from(format!("{input}{BACKUP_SUFFIX}"));
            if !backup.exists() {
                fs::write(&backup, &bytes)?;
            }
            input
        }
    };
    let img = decode(&bytes, name)?;
    let cleared = DynamicImage::ImageRgba8(clear_white_border(&img, opts.threshold));
    fs::write(&target, encode_png(&cleared)?)?;
    Ok((cleared.width(), cleared.height()))
}
