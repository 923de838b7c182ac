//! INSERT builder.

use std::sync::Arc;

use crate::ast::{
    Assignment, ConflictAction, Cte, Expr, InsertSource, InsertStatement, IntoExpr, OnConflict,
    Query, Relation,
};
use crate::error::Result;
use crate::render::{Rendered, Renderer};
use crate::transform::{Pipeline, Transformer};

/// An INSERT statement under construction. Without rows or a source
/// query it renders `DEFAULT VALUES`.
#[derive(Debug, Clone)]
pub struct Insert {
    stmt: InsertStatement,
    pipeline: Pipeline,
}

impl Insert {
    /// Starts an INSERT into `table`.
    #[must_use]
    pub fn into_table(table: impl Into<Relation>) -> Self {
        Self {
            stmt: InsertStatement::new(table.into()),
            pipeline: Pipeline::new(),
        }
    }

    /// Sets the column list.
    #[must_use]
    pub fn columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.stmt.columns = columns.into_iter().map(Into::into).collect();
        self
    }

    /// Appends a row of values.
    #[must_use]
    pub fn values<I>(mut self, row: I) -> Self
    where
        I: IntoIterator,
        I::Item: IntoExpr,
    {
        let row: Vec<Expr> = row.into_iter().map(IntoExpr::into_expr).collect();
        match &mut self.stmt.source {
            InsertSource::Values(rows) => rows.push(row),
            source => *source = InsertSource::Values(vec![row]),
        }
        self
    }

    /// Inserts the rows produced by a query.
    #[must_use]
    pub fn select(mut self, query: impl Into<Query>) -> Self {
        self.stmt.source = InsertSource::Query(Box::new(query.into()));
        self
    }

    /// `ON CONFLICT (target) DO NOTHING`.
    #[must_use]
    pub fn on_conflict_do_nothing<I, S>(mut self, target: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.stmt.on_conflict = Some(OnConflict {
            target: target.into_iter().map(Into::into).collect(),
            action: ConflictAction::DoNothing,
        });
        self
    }

    /// `ON CONFLICT (target) DO UPDATE SET ...`.
    #[must_use]
    pub fn on_conflict_do_update<I, S, A, V>(mut self, target: I, assignments: A) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        A: IntoIterator<Item = (S, V)>,
        V: IntoExpr,
    {
        self.stmt.on_conflict = Some(OnConflict {
            target: target.into_iter().map(Into::into).collect(),
            action: ConflictAction::DoUpdate(
                assignments
                    .into_iter()
                    .map(|(column, value)| Assignment {
                        column: column.into(),
                        value: value.into_expr(),
                    })
                    .collect(),
            ),
        });
        self
    }

    /// Appends RETURNING expressions.
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
    pub const fn statement(&self) -> &InsertStatement {
        &self.stmt
    }

    /// # Errors
    ///
    /// Returns `Error::TransformerRejected` if a transformer fails and
    /// `Error::MalformedAst` if the statement cannot be rendered.
    pub fn to_sql(&self, renderer: &Renderer) -> Result<Rendered> {
        let stmt = self.pipeline.apply_insert(self.stmt.clone())?;
        renderer.render(&stmt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Table;

    #[test]
    fn test_values_accumulate_rows() {
        let insert = Insert::into_table(Table::new("t"))
            .columns(["a"])
            .values([1])
            .values([2]);
        match &insert.statement().source {
            InsertSource::Values(rows) => assert_eq!(rows.len(), 2),
            other => panic!("unexpected source {other:?}"),
        }
    }

    #[test]
    fn test_no_rows_is_default_values() {
        let insert = Insert::into_table(Table::new("t"));
        assert_eq!(insert.statement().source, InsertSource::DefaultValues);
    }
}
