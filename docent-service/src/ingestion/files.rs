//! Upload classification, filename sanitizing and persistence.

use std::path::{Path, PathBuf};

use tracing::debug;
use unicode_normalization::UnicodeNormalization;
use uuid::Uuid;

use crate::error::ProcessingError;

/// Image encodings accepted for upload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Jpeg,
}

impl ImageFormat {
    pub fn mime(self) -> mime::Mime {
        match self {
            ImageFormat::Png => mime::IMAGE_PNG,
            ImageFormat::Jpeg => mime::IMAGE_JPEG,
        }
    }
}

/// What an upload is, judged by its filename
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Image(ImageFormat),
    Pdf,
}

impl FileKind {
    /// Classify by case-insensitive extension. `None` means the upload is rejected.
    pub fn from_filename(filename: &str) -> Option<Self> {
        let lower = filename.to_lowercase();
        if lower.ends_with(".pdf") {
            Some(FileKind::Pdf)
        } else if lower.ends_with(".png") {
            Some(FileKind::Image(ImageFormat::Png))
        } else if lower.ends_with(".jpg") || lower.ends_with(".jpeg") {
            Some(FileKind::Image(ImageFormat::Jpeg))
        } else {
            None
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            FileKind::Pdf => "pdf",
            FileKind::Image(ImageFormat::Png) => "png",
            FileKind::Image(ImageFormat::Jpeg) => "jpg",
        }
    }
}

/// Reduce a client-supplied filename to something safe to join onto a directory.
///
/// The name is NFKD-decomposed so accented letters keep their base letter,
/// then non-ASCII characters are dropped, path separators become word breaks,
/// whitespace runs become `_`, anything outside `[A-Za-z0-9_.-]` is removed
/// and leading/trailing `.`/`_` are trimmed. The result may be empty.
pub fn secure_filename(filename: &str) -> String {
    let ascii: String = filename
        .nfkd()
        .filter(char::is_ascii)
        .map(|c| if c == '/' || c == '\\' { ' ' } else { c })
        .collect();

    ascii
        .split(is_separator_whitespace)
        .filter(|word| !word.is_empty())
        .collect::<Vec<_>>()
        .join("_")
        .chars()
        .filter(|&c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
        .collect::<String>()
        .trim_matches(['.', '_'])
        .to_string()
}

/// ASCII whitespace as Python's `str.split()` sees it, which includes the
/// vertical tab and the `\x1c`..`\x1f` separators
fn is_separator_whitespace(c: char) -> bool {
    c.is_ascii_whitespace() || matches!(c, '\x0b' | '\x1c'..='\x1f')
}

/// Write an upload under `dir` and return where it landed.
///
/// Stored names carry a UUID prefix so uploads sharing a filename never
/// overwrite each other.
pub async fn persist_upload(
    dir: &Path,
    filename: &str,
    kind: FileKind,
    content: &[u8],
) -> Result<PathBuf, ProcessingError> {
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(ProcessingError::Io)?;

    let id = Uuid::new_v4();
    let safe_name = secure_filename(filename);
    let stored_name = if safe_name.is_empty() {
        format!("{}.{}", id, kind.extension())
    } else {
        format!("{}_{}", id, safe_name)
    };

    let path = dir.join(stored_name);
    tokio::fs::write(&path, content)
        .await
        .map_err(ProcessingError::Io)?;

    debug!(path = %path.display(), bytes = content.len(), "Upload written to disk");

    Ok(path)
}
