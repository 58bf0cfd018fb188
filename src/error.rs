use std::path::PathBuf;

use reqwest::StatusCode;
use thiserror::Error;

/// Every way a single fetch can fail. Each variant is terminal for the
/// resource it concerns; nothing is retried.
#[derive(Debug, Error)]
pub enum MirrorError {
    #[error("invalid URL {url}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("cannot resolve {reference} against {base}: {source}")]
    Resolution {
        base: String,
        reference: String,
        #[source]
        source: url::ParseError,
    },

    #[error("error getting URL {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("status code error for {url}: {status}")]
    Status { url: String, status: StatusCode },

    #[error("unable to write {path:?}: {source}")]
    Filesystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unable to parse HTML from {url}: {source}")]
    Parse {
        url: String,
        #[source]
        source: std::io::Error,
    },

    #[error("unable to rebuild page {url}: {source}")]
    Serialization {
        url: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),
}

impl MirrorError {
    pub(crate) fn filesystem(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Filesystem {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T, E = MirrorError> = std::result::Result<T, E>;
