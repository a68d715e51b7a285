//! Error handling types

use thiserror::Error;

/// Result type alias for operations that can fail
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the codebase search coordinator
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation error
    #[error("I/O error: {message}")]
    Io {
        /// Description of the failure
        message: String,
        /// Optional source error
        #[source]
        source: Option<std::io::Error>,
    },

    /// JSON parsing or serialization error
    #[error("JSON error: {source}")]
    Json {
        /// The underlying JSON error
        #[from]
        source: serde_json::Error,
    },

    /// Resource not found
    #[error("not found: {resource}")]
    NotFound {
        /// The resource that was not found
        resource: String,
    },

    /// Invalid argument supplied to an operation
    #[error("invalid argument: {message}")]
    InvalidArgument {
        /// Description of the invalid argument
        message: String,
    },

    /// Vector store collaborator failure
    #[error("vector store error: {message}")]
    VectorStore {
        /// Description of the failure
        message: String,
    },

    /// Embedding provider collaborator failure
    #[error("embedding provider error: {message}")]
    Embedding {
        /// Description of the failure
        message: String,
    },

    /// Reranker collaborator failure
    #[error("reranker error: {message}")]
    Reranker {
        /// Description of the failure
        message: String,
    },

    /// Indexer collaborator failure
    #[error("indexer error: {message}")]
    Indexer {
        /// Description of the failure
        message: String,
    },

    /// Configuration error
    #[error("configuration error: {message}")]
    Config {
        /// Description of the failure
        message: String,
    },

    /// Git collaborator failure
    #[error("git error: {message}")]
    Git {
        /// Description of the failure
        message: String,
    },

    /// Internal invariant violation
    #[error("internal error: {message}")]
    Internal {
        /// Description of the failure
        message: String,
    },
}

impl Error {
    /// Create a not-found error
    pub fn not_found<S: Into<String>>(resource: S) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }

    /// Create an invalid-argument error
    pub fn invalid_argument<S: Into<String>>(message: S) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Create an I/O error without a source
    pub fn io<S: Into<String>>(message: S) -> Self {
        Self::Io {
            message: message.into(),
            source: None,
        }
    }

    /// Create an I/O error wrapping a `std::io::Error`
    pub fn io_with_source<S: Into<String>>(message: S, source: std::io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source: Some(source),
        }
    }

    /// Create a vector store error
    pub fn vector_store<S: Into<String>>(message: S) -> Self {
        Self::VectorStore {
            message: message.into(),
        }
    }

    /// Create an embedding provider error
    pub fn embedding<S: Into<String>>(message: S) -> Self {
        Self::Embedding {
            message: message.into(),
        }
    }

    /// Create a reranker error
    pub fn reranker<S: Into<String>>(message: S) -> Self {
        Self::Reranker {
            message: message.into(),
        }
    }

    /// Create an indexer error
    pub fn indexer<S: Into<String>>(message: S) -> Self {
        Self::Indexer {
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config { message: message.into() }
    }

    /// Create a git collaborator error
    pub fn git<S: Into<String>>(message: S) -> Self {
        Self::Git { message: message.into() }
    }

    /// Create an internal invariant-violation error
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(source: std::io::Error) -> Self {
        Self::Io {
            message: source.to_string(),
            source: Some(source),
        }
    }
}
