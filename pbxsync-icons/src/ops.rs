//! Pixel operations on single images.

use crate::error::IconError;
use image::{DynamicImage, ImageFormat, Rgb, RgbImage, RgbaImage};
use std::collections::HashMap;
use std::io::Cursor;

pub const WHITE: Rgb<u8> = Rgb([255, 255, 255]);

/// Default RGB threshold for [`clear_white_border`].
pub const DEFAULT_BORDER_THRESHOLD: u8 = 240;

/// Edge transparency above this percentage causes a visible border.
pub const EDGE_ISSUE_PERCENT: f64 = 5.0;

/// Largest side of the centre sample used by [`fill_edges`].
const MAX_SAMPLE_SIDE: u32 = 100;

/// Composite `img` onto a solid `background`, dropping the alpha channel.
pub fn remove_alpha(img: &DynamicImage, background: Rgb<u8>) -> RgbImage {
    if !img.color().has_alpha() {
        return img.to_rgb8();
    }
    let rgba = img.to_rgba8();
    let mut out = RgbImage::new(rgba.width(), rgba.height());
    for (x, y, px) in rgba.enumerate_pixels() {
        let [r, g, b, a] = px.0;
        out.put_pixel(
            x,
            y,
            Rgb([
                blend(r, background[0], a),
                blend(g, background[1], a),
                blend(b, background[2], a),
            ]),
        );
    }
    out
}

fn blend(fg: u8, bg: u8, alpha: u8) -> u8 {
    let a = u32::from(alpha);
    ((u32::from(fg) * a + u32::from(bg) * (255 - a) + 127) / 255) as u8
}

/// Transparency along the outermost rows and columns of an image.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeReport {
    pub width: u32,
    pub height: u32,
    pub has_alpha: bool,
    /// Top and bottom rows plus left and right columns; corners count twice.
    pub edge_pixels: u64,
    pub transparent_pixels: u64,
    pub transparent_percent: f64,
    pub has_issues: bool,
}

pub fn analyze_edges(img: &DynamicImage) -> EdgeReport {
    let (width, height) = (img.width(), img.height());
    let mut report = EdgeReport {
        width,
        height,
        has_alpha: img.color().has_alpha(),
        edge_pixels: 0,
        transparent_pixels: 0,
        transparent_percent: 0.0,
        has_issues: false,
    };
    if !report.has_alpha || width == 0 || height == 0 {
        return report;
    }

    let rgba = img.to_rgba8();
    let top = (0..width).map(|x| (x, 0));
    let bottom = (0..width).map(|x| (x, height - 1));
    let left = (0..height).map(|y| (0, y));
    let right = (0..height).map(|y| (width - 1, y));
    for (x, y) in top.chain(bottom).chain(left).chain(right) {
        report.edge_pixels += 1;
        if rgba.get_pixel(x, y)[3] < 255 {
            report.transparent_pixels += 1;
        }
    }
    report.transparent_percent =
        report.transparent_pixels as f64 * 100.0 / report.edge_pixels as f64;
    report.has_issues = report.transparent_percent > EDGE_ISSUE_PERCENT;
    report
}

/// Most common colour in a centred square of side `min(100, w/4, h/4)`.
///
/// Pixels are counted with their alpha, so transparent pixels only share a
/// bucket with equally transparent ones. The winner's alpha is dropped.
pub fn dominant_center_color(img: &DynamicImage) -> Rgb<u8> {
    let rgba = img.to_rgba8();
    let (w, h) = rgba.dimensions();
    if w == 0 || h == 0 {
        return WHITE;
    }
    let side = MAX_SAMPLE_SIDE.min(w / 4).min(h / 4).max(1);
    let x0 = (w - side) / 2;
    let y0 = (h - side) / 2;

    let sample = move || {
        (y0..y0 + side).flat_map(move |y| (x0..x0 + side).map(move |x| (x, y)))
    };
    let mut counts: HashMap<[u8; 4], u32> = HashMap::new();
    for (x, y) in sample() {
        *counts.entry(rgba.get_pixel(x, y).0).or_default() += 1;
    }
    let best = counts.values().copied().max().unwrap_or(0);
    // First colour in scan order among the most frequent.
    sample()
        .map(|(x, y)| rgba.get_pixel(x, y).0)
        .find(|c| counts.get(c) == Some(&best))
        .map(|[r, g, b, _]| Rgb([r, g, b]))
        .unwrap_or(WHITE)
}

/// Flatten transparent edges onto the icon's own dominant colour.
///
/// Images without an alpha channel are returned unchanged.
pub fn fill_edges(img: &DynamicImage) -> DynamicImage {
    if !img.color().has_alpha() {
        return img.clone();
    }
    let background = dominant_center_color(img);
    DynamicImage::ImageRgb8(remove_alpha(img, background))
}

/// Make every pixel whose RGB channels all exceed `threshold` transparent.
pub fn clear_white_border(img: &DynamicImage, threshold: u8) -> RgbaImage {
    let mut rgba = img.to_rgba8();
    for px in rgba.pixels_mut() {
        if px[0] > threshold && px[1] > threshold && px[2] > threshold {
            px[3] = 0;
        }
    }
    rgba
}

pub fn decode(bytes: &[u8], path: &str) -> Result<DynamicImage, IconError> {
    image::load_from_memory(bytes).map_err(|source| IconError::Decode {
        path: path.to_string(),
        source,
    })
}

pub fn encode_png(img: &DynamicImage) -> Result<Vec<u8>, IconError> {
    let mut out = Vec::new();
    img.write_to(&mut Cursor::new(&mut out), ImageFormat::Png)
        .map_err(IconError::Encode)?;
    Ok(out)
}
