use std::path::{Path, PathBuf};

use thiserror::Error;

pub mod batch;
pub mod docx;
pub mod plain_text;

pub use batch::extract_from_files;
pub use docx::DocxDecoder;
pub use plain_text::PlainTextDecoder;
// Re-export domain types for convenience
pub use citescan_core::{
    DecodeError, Document, DocumentDecoder, ExtractionReport, FileOutcome, FileReport,
    ReferenceList, SkipReason,
};

#[derive(Error, Debug)]
pub enum IngestError {
    #[error("keyword is empty")]
    EmptyKeyword,
    #[error("invalid keyword: {0}")]
    InvalidKeyword(String),
    #[error("at least one file is required")]
    NoFiles,
    #[error("none of the {} uploaded files could be processed", .skipped.len())]
    AllFilesFailed { skipped: Vec<FileReport> },
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// An uploaded or on-disk file: display name plus raw bytes.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub name: String,
    pub data: Vec<u8>,
}

impl SourceFile {
    pub fn new(name: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            data: data.into(),
        }
    }
}

/// Read a file from disk, named by its file name.
pub fn read_source(path: &Path) -> Result<SourceFile, IngestError> {
    let data = std::fs::read(path).map_err(|source| IngestError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string());
    Ok(SourceFile { name, data })
}

/// Supported input formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Docx,
    PlainText,
}

impl FileFormat {
    /// Detect the format from the file extension, verifying the ZIP magic
    /// bytes for `.docx`.
    pub fn detect(name: &str, data: &[u8]) -> Result<Self, DecodeError> {
        let ext = Path::new(name)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        match ext.as_str() {
            "docx" if data.starts_with(b"PK") => Ok(FileFormat::Docx),
            "docx" => Err(DecodeError::Corrupt(format!(
                "{name} is not a Word (.docx) package"
            ))),
            "txt" => Ok(FileFormat::PlainText),
            _ => Err(DecodeError::Unsupported(format!(
                "{name}: only .docx and .txt files are supported"
            ))),
        }
    }

    pub fn decoder(self) -> &'static dyn DocumentDecoder {
        match self {
            FileFormat::Docx => &DocxDecoder,
            FileFormat::PlainText => &PlainTextDecoder,
        }
    }
}

/// Decode a file with the decoder matching its extension.
pub fn decode(file: &SourceFile) -> Result<Document, DecodeError> {
    let format = FileFormat::detect(&file.name, &file.data)?;
    let decoder = format.decoder();
    tracing::debug!(file = %file.name, format = decoder.format_name(), bytes = file.data.len(), "decoding");
    decoder.decode(&file.data)
}
