use std::path::PathBuf;

use thiserror::Error;

/// Fatal: the scan root cannot be traversed. No graph is produced.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("root directory does not exist: {}", path.display())]
    RootNotFound { path: PathBuf },

    #[error("root path is not a directory: {}", path.display())]
    NotADirectory { path: PathBuf },

    #[error("root directory cannot be read: {}", path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Content problems of a single POM document.
#[derive(Debug, Error)]
pub enum PomError {
    #[error("malformed XML: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("root element is <{0}>, expected <project>")]
    NotAProject(String),

    #[error("cannot decode document: {0}")]
    Encoding(String),

    #[error("document ends inside <{0}>")]
    Truncated(String),

    #[error("missing <artifactId>")]
    MissingArtifactId,

    #[error("missing <groupId> and no parent to inherit it from")]
    MissingGroupId,
}

/// Recoverable: one descriptor is skipped and the scan continues.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("could not read {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not parse {}", path.display())]
    Invalid {
        path: PathBuf,
        #[source]
        source: PomError,
    },
}

/// Recoverable: one metadata lookup is skipped and enrichment continues.
#[derive(Debug, Error)]
pub enum MetadataLookupError {
    #[error("lookup of {coordinates} timed out")]
    Timeout { coordinates: String },

    #[error("lookup of {coordinates} returned HTTP {status}")]
    Status {
        coordinates: String,
        status: reqwest::StatusCode,
    },

    #[error("lookup of {coordinates} failed")]
    Transport {
        coordinates: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("response for {coordinates} is not a valid POM")]
    Malformed {
        coordinates: String,
        #[source]
        source: PomError,
    },
}
