//! Error types for question decomposition.

use thiserror::Error;

/// Errors raised by the decomposition pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NlpError {
    /// Combinations were requested for a query with no entries.
    #[error("cannot split an empty query into combinations")]
    EmptyQuery,

    /// The gap count of the query does not fit the 64-bit split counter.
    #[error("query of {len} entries is too long to enumerate combinations")]
    QueryTooLong {
        /// Number of entries in the rejected query.
        len: usize,
    },

    /// Parser output that does not form a dependency tree.
    #[error("malformed parse document: {message}")]
    MalformedDocument {
        /// What was wrong with the document.
        message: String,
    },

    /// The fixture parser has no document for the requested text.
    #[error("no fixture parse for '{text}'")]
    UnknownFixture {
        /// Normalized question text that was looked up.
        text: String,
    },

    /// The external parser process failed.
    #[error("parser command failed: {message}")]
    ParserCommand {
        /// Exit status and stderr of the failed process.
        message: String,
    },
}

impl NlpError {
    pub(crate) fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedDocument {
            message: message.into(),
        }
    }
}
