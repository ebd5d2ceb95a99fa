//! Diagnostics for malformed query text.

/// Errors produced while compiling query text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueryError {
    /// The text is not a valid query.
    #[error("query parse error at byte {offset}: {message}")]
    Parse {
        /// Byte offset of the offending input.
        offset: usize,
        /// What was expected or found.
        message: String,
    },

    /// The text ended in the middle of a query.
    #[error("unexpected end of query: expected {expected}")]
    UnexpectedEnd {
        /// What the parser was looking for.
        expected: String,
    },
}

impl QueryError {
    pub(crate) fn parse(offset: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            offset,
            message: message.into(),
        }
    }
}
