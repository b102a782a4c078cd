//! Upload handling: classifying and storing files, and reading PDF pages.

pub mod files;
pub mod pdf;

pub use files::{FileKind, ImageFormat, persist_upload};
pub use pdf::extract_page_texts;
