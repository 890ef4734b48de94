//! Error types for tasklist conversion

use thiserror::Error;

/// Result type for conversion operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while converting a tasklist
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed issue or repository URL
    #[error("{0}")]
    InvalidUrl(String),

    /// Expected field absent from a fetched issue
    #[error("{field} field not present in issue {issue}")]
    MissingField { field: &'static str, issue: String },

    /// Non-success response when reading an issue
    #[error("issue GET failed on {issue}, {status}, {body}")]
    FetchIssueFailed {
        issue: String,
        status: u16,
        body: String,
    },

    /// Non-success response when creating an issue
    #[error("issue POST failed, can't create issue in {repo}, {status}, {body}")]
    CreateIssueFailed {
        repo: String,
        status: u16,
        body: String,
    },

    /// Non-success response when patching an issue
    #[error("issue PATCH failed on {issue}, {status}, {body}")]
    UpdateIssueFailed {
        issue: String,
        status: u16,
        body: String,
    },

    /// The sub-issue mutation was rejected
    #[error("Unable to link sub-issue: {0}")]
    LinkFailed(String),

    /// Cross-owner tasks present without a reference repository
    #[error(
        "There are {count} issues to convert from a different owner than the target issue. \
         Must provide a \"reference repo url\" via --refrepo option to create reference issues in."
    )]
    MissingReferenceRepo { count: usize },

    /// Transport or decoding failure
    #[error("GitHub request failed: {0}")]
    Http(#[from] reqwest::Error),
}
