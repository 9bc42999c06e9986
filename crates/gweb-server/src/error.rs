//! Server error types.

/// Error starting or running the server.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Listening socket could not be bound.
    #[error("failed to bind {addr}: {source}")]
    Bind {
        /// Address as configured (`host:port`).
        addr: String,
        /// Underlying error.
        source: std::io::Error,
    },

    /// I/O error while serving.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
