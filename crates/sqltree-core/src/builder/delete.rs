//! DELETE builder.

use std::sync::Arc;

use crate::ast::{Cte, DeleteStatement, IntoExpr, Query, Relation};
use crate::error::Result;
use crate::render::{Rendered, Renderer};
use crate::transform::{Pipeline, Transformer};

/// A DELETE statement under construction. Without a WHERE predicate it
/// deletes every row.
#[derive(Debug, Clone)]
pub struct Delete {
    stmt: DeleteStatement,
    pipeline: Pipeline,
}

impl Delete {
    /// Starts a DELETE from `table`.
    #[must_use]
    pub fn from_table(table: impl Into<Relation>) -> Self {
        Self {
            stmt: DeleteStatement::new(table.into()),
            pipeline: Pipeline::new(),
        }
    }

    /// Appends a WHERE predicate; predicates are ANDed.
    #[must_use]
    pub fn where_clause(mut self, predicate: impl IntoExpr) -> Self {
        self.stmt.wheres.push(predicate.into_expr());
        self
    }

    #[must_use]
    pub fn returning<I>(mut self, exprs: I) -> Self
    where
        I: IntoIterator,
        I::Item: IntoExpr,
    {
        self.stmt
            .returning
            .extend(exprs.into_iter().map(IntoExpr::into_expr));
        self
    }

    #[must_use]
    pub fn with(mut self, name: impl Into<String>, query: impl Into<Query>) -> Self {
        self.stmt.ctes.push(Cte {
            name: name.into(),
            query: query.into(),
            recursive: false,
        });
        self
    }

    #[must_use]
    pub fn use_transformer(mut self, transformer: impl Transformer + 'static) -> Self {
        self.pipeline.push(Arc::new(transformer));
        self
    }

    #[must_use]
    pub const fn statement(&self) -> &DeleteStatement {
        &self.stmt
    }

    /// # Errors
    ///
    /// Returns `Error::TransformerRejected` if a transformer fails and
    /// `Error::MalformedAst` if the statement cannot be rendered.
    pub fn to_sql(&self, renderer: &Renderer) -> Result<Rendered> {
        let stmt = self.pipeline.apply_delete(self.stmt.clone())?;
        renderer.render(&stmt)
    }
}
