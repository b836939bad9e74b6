use std::path::PathBuf;

use thiserror::Error;

use super::types::ParseArgError;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Arg(#[from] ParseArgError),
    #[error(transparent)]
    Import(#[from] hexrec::ImportError),
    #[error(transparent)]
    Export(#[from] hexrec::ExportError),
    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("cannot detect the format of {}", .0.display())]
    UnknownFormat(PathBuf),
    #[error("{0}")]
    Other(String),
}

impl From<String> for CliError {
    fn from(message: String) -> Self {
        Self::Other(message)
    }
}
