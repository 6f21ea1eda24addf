//! Error types exposed by the GitHub client layer.

use thiserror::Error;

use crate::persistence::PersistenceError;

/// Errors surfaced while talking to GitHub or reconciling sidebar state.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ForgeError {
    /// No personal access token has been stored.
    #[error("no GitHub token is stored; save a personal access token in the settings")]
    Unauthenticated,

    /// GitHub answered with a non-success HTTP status.
    #[error("GitHub API {status}: {body_excerpt}")]
    Remote {
        /// HTTP status code returned by GitHub.
        status: u16,
        /// Leading part of the response body.
        body_excerpt: String,
    },

    /// The GraphQL endpoint returned an `errors` array.
    #[error("GitHub GraphQL error: {}", messages.join("; "))]
    GraphQl {
        /// Messages of every reported GraphQL error.
        messages: Vec<String>,
    },

    /// A requested resource does not exist.
    #[error("{what} not found")]
    NotFound {
        /// Description of the missing resource.
        what: String,
    },

    /// Networking failed while calling GitHub.
    #[error("network error talking to GitHub: {message}")]
    Network {
        /// Transport-level error detail.
        message: String,
    },

    /// A response body could not be decoded.
    #[error("could not decode GitHub response: {message}")]
    Decode {
        /// Decoder error detail.
        message: String,
    },

    /// A repository key was not of the form `owner/repo`.
    #[error("repository must be given as owner/repo, got {value:?}")]
    InvalidRepoKey {
        /// The rejected input.
        value: String,
    },

    /// A URL or request route could not be parsed.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// A workflow definition could not be interpreted.
    #[error("invalid workflow definition: {message}")]
    InvalidWorkflow {
        /// Parser error detail.
        message: String,
    },

    /// Configuration could not be loaded.
    #[error("configuration error: {message}")]
    Configuration {
        /// Details about the configuration failure.
        message: String,
    },

    /// The persistent store failed.
    #[error("storage error: {message}")]
    Storage {
        /// Error detail from the store.
        message: String,
    },

    /// Writing output failed.
    #[error("I/O error: {message}")]
    Io {
        /// Error detail from the writer.
        message: String,
    },
}

impl From<PersistenceError> for ForgeError {
    fn from(error: PersistenceError) -> Self {
        Self::Storage {
            message: error.to_string(),
        }
    }
}
