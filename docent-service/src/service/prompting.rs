//! Upload dispatch: one model call per image, or one per PDF page.

use std::path::Path;

use futures::{StreamExt, TryStreamExt, stream};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::{ProcessingError, ServiceError, ServiceResult, format_error_chain};
use crate::gemini::Part;
use crate::ingestion::{FileKind, ImageFormat, extract_page_texts, persist_upload};
use crate::service::DocentService;

/// The caller's two prompts, wrapped around every payload
#[derive(Debug, Clone)]
pub struct Prompts {
    pub system: String,
    pub user: String,
}

impl Prompts {
    /// `[system, payload, user]`
    fn scaffold(&self, payload: Part) -> Vec<Part> {
        vec![
            Part::text(self.system.as_str()),
            payload,
            Part::text(self.user.as_str()),
        ]
    }
}

/// Model output for a single PDF page
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageResponse {
    pub page_number: u32,
    pub response: String,
}

/// Result of processing an upload.
///
/// Serializes as a bare JSON string for images and a bare array for PDFs.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PromptOutcome {
    Image(String),
    Pages(Vec<PageResponse>),
}

impl DocentService {
    /// Validate, store and process an uploaded file
    pub async fn process_upload(
        &self,
        filename: &str,
        content: &[u8],
        prompts: &Prompts,
    ) -> ServiceResult<PromptOutcome> {
        let kind =
            FileKind::from_filename(filename).ok_or_else(|| ServiceError::InvalidFileFormat {
                filename: filename.to_string(),
            })?;

        let path = persist_upload(&self.config.storage.upload_dir, filename, kind, content).await?;

        info!(
            filename = %filename,
            path = %path.display(),
            kind = ?kind,
            bytes = content.len(),
            "Upload stored"
        );

        match kind {
            FileKind::Pdf => self.process_pdf(&path, prompts).await.map(PromptOutcome::Pages),
            FileKind::Image(format) => self
                .process_image(&path, format, prompts)
                .await
                .map(PromptOutcome::Image),
        }
    }

    /// Send a stored image to the model in a single request
    pub async fn process_image(
        &self,
        path: &Path,
        format: ImageFormat,
        prompts: &Prompts,
    ) -> ServiceResult<String> {
        let data = tokio::fs::read(path).await.map_err(ProcessingError::Io)?;

        let response = self
            .gemini
            .generate(prompts.scaffold(Part::inline_data(&format.mime(), &data)))
            .await?;

        info!(path = %path.display(), model = %self.gemini.model(), "Image processed");

        Ok(response)
    }

    /// Extract a stored PDF's pages and prompt the model once per page
    pub async fn process_pdf(
        &self,
        path: &Path,
        prompts: &Prompts,
    ) -> ServiceResult<Vec<PageResponse>> {
        let library_dir = self.config.pdf.pdfium_dir.clone();
        let pdf_path = path.to_path_buf();

        let pages = tokio::task::spawn_blocking(move || {
            extract_page_texts(library_dir.as_deref(), &pdf_path)
        })
        .await
        .map_err(|e| ServiceError::Internal {
            message: format!("PDF extraction task failed: {}", e),
        })??;

        info!(path = %path.display(), pages = pages.len(), "PDF text extracted");

        self.process_pages(pages, prompts).await
    }

    /// Prompt the model with each page's text, returning responses in page order.
    ///
    /// Up to `prompting.page_concurrency` requests are in flight at once. The
    /// first failure aborts the remaining pages.
    pub async fn process_pages(
        &self,
        pages: Vec<String>,
        prompts: &Prompts,
    ) -> ServiceResult<Vec<PageResponse>> {
        let concurrency = self.config.prompting.page_concurrency.max(1);

        stream::iter(pages.into_iter().enumerate())
            .map(|(page_index, text)| async move {
                let page_number = page_index as u32 + 1;
                debug!(page = page_number, chars = text.len(), "Prompting page");

                match self.gemini.generate(prompts.scaffold(Part::text(text))).await {
                    Ok(response) => Ok(PageResponse {
                        page_number,
                        response,
                    }),
                    Err(e) => {
                        warn!(page = page_number, error = %format_error_chain(&e), "Page failed");
                        Err(ServiceError::Page {
                            page: page_number,
                            source: Box::new(e),
                        })
                    }
                }
            })
            .buffered(concurrency)
            .try_collect()
            .await
    }
}
