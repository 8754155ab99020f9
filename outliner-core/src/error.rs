use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum OutlineError {
    /// The layout source could not open or decode the document.
    #[error("can't extract layout from {}: {source:#}", path.display())]
    Ingest {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    #[error("no eligible documents found in {}", dir.display())]
    NoInputDocuments { dir: PathBuf },

    #[error("io error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("can't serialize outline to {}: {source}", path.display())]
    Serialize {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl OutlineError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, OutlineError>;
