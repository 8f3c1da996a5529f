//! `Contents.json` of an `.appiconset`.
//!
//! Only the fields the fixer reads are typed; everything else is carried
//! through `extra` so a rewrite keeps what Xcode wrote.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Contents {
    #[serde(default)]
    pub images: Vec<ImageEntry>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImageEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub idiom: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ImageEntry {
    /// Pixel dimensions from `size` ("108x108", "83.5x83.5") times `scale`
    /// ("2x", defaulting to 1x).
    pub fn pixel_size(&self) -> Option<(u32, u32)> {
        let (w, h) = self.size.as_deref()?.split_once('x')?;
        let w: f64 = w.trim().parse().ok()?;
        let h: f64 = h.trim().parse().ok()?;
        let scale: f64 = match self.scale.as_deref() {
            Some(s) => s.trim().trim_end_matches('x').parse().ok()?,
            None => 1.0,
        };
        let px = |pt: f64| {
            let v = (pt * scale).round();
            (1.0..=f64::from(u32::MAX)).contains(&v).then_some(v as u32)
        };
        Some((px(w)?, px(h)?))
    }
}

/// Serialize with two-space indentation and a trailing newline.
pub fn to_json(contents: &Contents) -> Result<String, serde_json::Error> {
    let mut out = serde_json::to_string_pretty(contents)?;
    out.push('\n');
    Ok(out)
}
