//! Error types for building, transforming and rendering statements.

/// Boxed error returned by transformers.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors surfaced by `to_sql` and the renderer.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The tree violates a render-time invariant.
    #[error("malformed AST: {0}")]
    MalformedAst(String),

    /// A transformer in the pipeline returned an error.
    #[error("transformer '{transformer}' rejected the statement: {source}")]
    TransformerRejected {
        /// Name of the failing transformer.
        transformer: String,
        /// The error it returned.
        #[source]
        source: BoxError,
    },
}

impl Error {
    /// Creates a `MalformedAst` error.
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedAst(message.into())
    }

    /// Returns the transformer's own error if it is of type `E`.
    #[must_use]
    pub fn transformer_error<E: std::error::Error + 'static>(&self) -> Option<&E> {
        match self {
            Self::TransformerRejected { source, .. } => source.downcast_ref::<E>(),
            Self::MalformedAst(_) => None,
        }
    }
}

/// Result type alias for this crate.
pub type Result<T> = std::result::Result<T, Error>;
