use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("failed to read manifest {path:?}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse manifest")]
    Parse(#[from] toml::de::Error),

    #[error("manifest lists no targets")]
    NoTargets,

    #[error("backup suffix must not be empty")]
    EmptyBackupSuffix,

    #[error("marker for {0:?} must be a single non-empty line")]
    InvalidMarker(PathBuf),

    #[error("target {0:?} has neither a marker nor any rules")]
    EmptyTarget(PathBuf),

    #[error("rule #{index} for {path:?} is invalid: {reason}")]
    InvalidRule {
        path: PathBuf,
        index: usize,
        reason: String,
    },

    #[error("glob {pattern:?} is invalid: {reason}")]
    InvalidGlob { pattern: String, reason: String },
}

#[derive(Debug, Error)]
pub enum CodemodError {
    #[error(transparent)]
    Manifest(#[from] ManifestError),

    #[error("invalid pattern {pattern:?}")]
    Pattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("marker {0:?} must be a single non-empty line")]
    InvalidMarker(String),

    #[error("backup suffix must not be empty")]
    EmptyBackupSuffix,

    #[error("preflight checks failed ({} error(s))", .0.len())]
    Preflight(Vec<String>),

    #[error("{0:#}")]
    Fs(anyhow::Error),
}

impl From<anyhow::Error> for CodemodError {
    fn from(err: anyhow::Error) -> Self {
        CodemodError::Fs(err)
    }
}

pub type Result<T, E = CodemodError> = std::result::Result<T, E>;
