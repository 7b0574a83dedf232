use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid PDF: {0}")]
    InvalidPdf(String),

    /// Quad points or rectangles that cannot describe a region. Fatal for the
    /// document: the geometry is corrupt, not merely unsupported.
    #[error("malformed annotation geometry: {0}")]
    MalformedGeometry(String),

    #[error("failed to write DOCX archive: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("failed to write CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("cannot write {}: {source}", path.display())]
    Output {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl From<lopdf::Error> for Error {
    fn from(e: lopdf::Error) -> Self {
        Error::InvalidPdf(e.to_string())
    }
}
