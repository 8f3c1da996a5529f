//! Reader for Xcode `project.pbxproj` manifests.
//!
//! The manifest is parsed into a lossless tree: each dictionary, list and
//! string remembers where it sits in the source text. Callers locate
//! insertion points from the tree instead of pattern-searching the text,
//! and all bytes outside those points are left untouched by construction.

mod error;
mod ids;
mod index;
mod project;
mod quote;
pub mod tree;

pub use error::ParseError;
pub use ids::{IdSource, ObjectId, RandomIds, SequentialIds};
pub use index::FileRefIndex;
pub use project::{
    ISA_BUILD_FILE, ISA_FILE_REFERENCE, ISA_GROUP, ISA_NATIVE_TARGET, ISA_PROJECT,
    ISA_SOURCES_PHASE, ISA_VARIANT_GROUP, InsertPoint, Object, Project,
};
pub use quote::{comment_text, quote};
