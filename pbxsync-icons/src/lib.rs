//! App-icon asset fixes.
//!
//! App Store validation rejects icons with an alpha channel, and icons
//! with transparent edges render with a dark border. This crate flattens
//! icon sets, fills transparent edges and strips white borders.

mod contents;
mod error;
mod ops;
mod set;

pub use contents::{Contents, ImageEntry, to_json};
pub use error::IconError;
pub use ops::{
    DEFAULT_BORDER_THRESHOLD, EDGE_ISSUE_PERCENT, EdgeReport, WHITE, analyze_edges,
    clear_white_border, decode, dominant_center_color, encode_png, fill_edges, remove_alpha,
};
pub use set::{
    AnalyzeOutcome, BACKUP_SUFFIX, CONTENTS_FILE, IconSetOptions, StripOptions,
    analyze_icon_file, default_fix_output, process_icon_set, strip_border_dir,
};
