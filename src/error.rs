// src/error.rs
// =============================================================================
// Error types shared by the link checker and the release helpers.
//
// The command handlers in main.rs work with anyhow::Result; the modules below
// them return GuardianError so callers (and tests) can match on the variant.
// =============================================================================

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GuardianError {
    /// Mutually exclusive options were both set
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Path not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Failed to access {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("'{0}' is empty")]
    MissingEnv(&'static str),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered, but not with a 2xx status
    #[error("Response is not successful: {0}")]
    Api(String),

    #[error("Could not find MR ID in {0}")]
    NoMergeRequestId(String),

    #[error("No merge request found with IID {0}")]
    MergeRequestNotFound(u64),

    #[error("git {command} failed: {stderr}")]
    Git { command: String, stderr: String },

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("Invalid pattern: {0}")]
    Pattern(#[from] globset::Error),
}

impl GuardianError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        GuardianError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, GuardianError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_not_found() {
        let err = GuardianError::NotFound(PathBuf::from("/no/such/dir"));
        assert_eq!(err.to_string(), "Path not found: /no/such/dir");
    }

    #[test]
    fn test_display_missing_env() {
        let err = GuardianError::MissingEnv("CI_COMMIT_MESSAGE");
        assert_eq!(err.to_string(), "'CI_COMMIT_MESSAGE' is empty");
    }

    #[test]
    fn test_display_api() {
        let err = GuardianError::Api("error content".to_string());
        assert_eq!(err.to_string(), "Response is not successful: error content");
    }
}
