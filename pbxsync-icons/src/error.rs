use thiserror::Error;

/// An icon or icon set could not be processed.
#[derive(Debug, Error)]
pub enum IconError {
    #[error("directory not found: {path}")]
    DirMissing { path: String },

    #[error("Contents.json not found in {path}")]
    ContentsMissing { path: String },

    #[error("invalid Contents.json in {path}: {source}")]
    Contents {
        path: String,
        source: serde_json::Error,
    },

    #[error("no PNG files found in {path}")]
    NoPngs { path: String },

    #[error("decode {path}: {source}")]
    Decode {
        path: String,
        source: image::ImageError,
    },

    #[error("encode PNG: {0}")]
    Encode(#[source] image::ImageError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl IconError {
    /// Returns the recommended exit code for this error.
    pub fn exit_code(&self) -> u8 {
        1
    }
}
