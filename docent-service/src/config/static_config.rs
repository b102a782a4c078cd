//! Server binding, upload storage and PDFium location.

use serde::Deserialize;
use std::path::PathBuf;

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Storage configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Directory uploaded files are written to. Created on demand.
    #[serde(default = "default_upload_dir")]
    pub upload_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            upload_dir: default_upload_dir(),
        }
    }
}

/// PDF extraction configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PdfConfig {
    /// Directory containing libpdfium. When unset (or the library cannot be
    /// loaded from it), the current directory, vendor/pdfium/lib/ and the
    /// system library path are tried in turn.
    #[serde(default)]
    pub pdfium_dir: Option<PathBuf>,
}

// ==================== Default Value Functions ====================

pub(crate) fn default_host() -> String {
    "0.0.0.0".to_string()
}

pub(crate) fn default_port() -> u16 {
    5000
}

pub(crate) fn default_upload_dir() -> PathBuf {
    PathBuf::from("./uploads")
}
