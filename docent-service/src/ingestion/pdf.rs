//! PDF page text extraction.

use std::path::Path;

use pdfium_render::prelude::*;
use tracing::{debug, warn};

use crate::error::ProcessingError;

/// Create a new Pdfium instance (dynamically linked).
///
/// Searches for libpdfium in:
/// 1. `library_dir`, when configured
/// 2. Current directory (./libpdfium.so)
/// 3. vendor/pdfium/lib/
/// 4. System library paths
pub fn create_pdfium(library_dir: Option<&Path>) -> Result<Pdfium, ProcessingError> {
    if let Some(dir) = library_dir {
        match Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(dir)) {
            Ok(bindings) => return Ok(Pdfium::new(bindings)),
            Err(e) => warn!(
                dir = %dir.display(),
                error = ?e,
                "Failed to load PDFium from configured directory, trying defaults"
            ),
        }
    }

    let bindings = Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
        .or_else(|_| {
            Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(
                "./vendor/pdfium/lib/",
            ))
        })
        .or_else(|_| Pdfium::bind_to_system_library())
        .map_err(|e| ProcessingError::PdfiumUnavailable {
            source: Box::new(std::io::Error::other(format!(
                "Install libpdfium or set pdf.pdfium_dir: {:?}",
                e
            ))),
        })?;

    Ok(Pdfium::new(bindings))
}

/// Extract the text of every page, in page order.
///
/// Pages without text yield an empty string so that index `i` is always
/// page `i + 1`. This is blocking; call it from `spawn_blocking`.
pub fn extract_page_texts(
    library_dir: Option<&Path>,
    path: &Path,
) -> Result<Vec<String>, ProcessingError> {
    let pdfium = create_pdfium(library_dir)?;

    let document = pdfium
        .load_pdf_from_file(path, None)
        .map_err(|e| ProcessingError::PdfLoad {
            source: Box::new(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("Failed to load PDF: {:?}", e),
            )),
        })?;

    let mut pages = Vec::with_capacity(document.pages().len() as usize);
    for (page_index, page) in document.pages().iter().enumerate() {
        let page_num = page_index as u32 + 1;

        let text = page.text().map_err(|e| {
            warn!(page = page_num, error = ?e, "Failed to get text object for page");
            ProcessingError::TextExtraction {
                page: page_num,
                source: Box::new(std::io::Error::new(
                    std::io::ErrorKind::InvalidData,
                    format!("Failed to extract text from page {}: {:?}", page_num, e),
                )),
            }
        })?;

        pages.push(text.all());
    }

    debug!(
        path = %path.display(),
        pages = pages.len(),
        empty_pages = pages.iter().filter(|p| p.trim().is_empty()).count(),
        "PDF page text extracted"
    );

    Ok(pages)
}
