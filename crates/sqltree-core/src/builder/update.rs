//! UPDATE builder.

use std::sync::Arc;

use crate::ast::{Assignment, Cte, IntoExpr, Query, Relation, UpdateStatement};
use crate::error::Result;
use crate::render::{Rendered, Renderer};
use crate::transform::{Pipeline, Transformer};

/// An UPDATE statement under construction.
#[derive(Debug, Clone)]
pub struct Update {
    stmt: UpdateStatement,
    pipeline: Pipeline,
}

impl Update {
    /// Starts an UPDATE of `table`.
    #[must_use]
    pub fn table(table: impl Into<Relation>) -> Self {
        Self {
            stmt: UpdateStatement::new(table.into()),
            pipeline: Pipeline::new(),
        }
    }

    /// Appends `column = value` to the SET list.
    #[must_use]
    pub fn set(mut self, column: impl Into<String>, value: impl IntoExpr) -> Self {
        self.stmt.assignments.push(Assignment {
            column: column.into(),
            value: value.into_expr(),
        });
        self
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
    pub const fn statement(&self) -> &UpdateStatement {
        &self.stmt
    }

    /// # Errors
    ///
    /// Returns `Error::TransformerRejected` if a transformer fails and
    /// `Error::MalformedAst` if the statement cannot be rendered.
    pub fn to_sql(&self, renderer: &Renderer) -> Result<Rendered> {
        let stmt = self.pipeline.apply_update(self.stmt.clone())?;
        renderer.render(&stmt)
    }
}
