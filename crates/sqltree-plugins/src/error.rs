//! Errors raised by the policy transformer.
//!
//! They reach callers of `to_sql` wrapped in
//! `sqltree_core::Error::TransformerRejected`; use
//! `Error::transformer_error::<PolicyError>()` to get them back.

/// Policy failures.
#[derive(Debug, thiserror::Error)]
pub enum PolicyError {
    /// The policy service denied access to a table.
    #[error("policy denied access to table '{table}'")]
    Deny { table: String },

    /// The policy service could not be reached or timed out.
    #[error("policy service unreachable: {0}")]
    Unreachable(String),

    /// The policy service answered with an error status or a body that is
    /// not the expected JSON.
    #[error("bad response from policy service: {0}")]
    BadResponse(String),

    /// A decision used an operator with no SQL translation.
    #[error("unsupported policy operator '{0}'")]
    UnsupportedOperator(String),

    /// A decision expression does not have a translatable shape.
    #[error("malformed policy expression: {0}")]
    MalformedExpression(String),

    /// Masking needed the column list of a table and none was available.
    #[error("column list required to mask table '{0}'")]
    ResolverRequired(String),
}

/// Result type alias for policy operations.
pub type Result<T> = std::result::Result<T, PolicyError>;
