//! Statement transformers.
//!
//! A [`Transformer`] rewrites a statement's AST before rendering. Builders
//! hold an ordered [`Pipeline`]; each transformer receives the output of
//! the previous one, and the first error aborts rendering.

use std::fmt;
use std::sync::Arc;

use crate::ast::{
    DeleteStatement, InsertStatement, JoinSource, Relation, SelectCore, UpdateStatement,
};
use crate::error::{BoxError, Error, Result};

/// Rewrites statements before they are rendered.
///
/// Every method defaults to returning its input unchanged, so an
/// implementation overrides only the statement kinds it cares about.
pub trait Transformer: Send + Sync {
    /// Name used in logs and in `Error::TransformerRejected`.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// # Errors
    ///
    /// An error aborts rendering of the statement.
    fn transform_select(&self, core: SelectCore) -> std::result::Result<SelectCore, BoxError> {
        Ok(core)
    }

    /// # Errors
    ///
    /// An error aborts rendering of the statement.
    fn transform_insert(
        &self,
        stmt: InsertStatement,
    ) -> std::result::Result<InsertStatement, BoxError> {
        Ok(stmt)
    }

    /// # Errors
    ///
    /// An error aborts rendering of the statement.
    fn transform_update(
        &self,
        stmt: UpdateStatement,
    ) -> std::result::Result<UpdateStatement, BoxError> {
        Ok(stmt)
    }

    /// # Errors
    ///
    /// An error aborts rendering of the statement.
    fn transform_delete(
        &self,
        stmt: DeleteStatement,
    ) -> std::result::Result<DeleteStatement, BoxError> {
        Ok(stmt)
    }
}

/// A transformer that changes nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct Noop;

impl Transformer for Noop {
    fn name(&self) -> &str {
        "noop"
    }
}

/// Ordered list of transformers attached to a builder.
#[derive(Clone, Default)]
pub struct Pipeline {
    transformers: Vec<Arc<dyn Transformer>>,
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.transformers.iter().map(|t| t.name()))
            .finish()
    }
}

impl Pipeline {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a transformer; it runs after those already registered.
    pub fn push(&mut self, transformer: Arc<dyn Transformer>) {
        self.transformers.push(transformer);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.transformers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.transformers.is_empty()
    }

    /// The registered transformers, in run order.
    #[must_use]
    pub fn transformers(&self) -> &[Arc<dyn Transformer>] {
        &self.transformers
    }

    /// Runs every transformer over a SELECT core.
    ///
    /// # Errors
    ///
    /// Returns `Error::TransformerRejected` for the first failure.
    pub fn apply_select(&self, core: SelectCore) -> Result<SelectCore> {
        self.run("select", core, |t, core| t.transform_select(core))
    }

    /// # Errors
    ///
    /// Returns `Error::TransformerRejected` for the first failure.
    pub fn apply_insert(&self, stmt: InsertStatement) -> Result<InsertStatement> {
        self.run("insert", stmt, |t, stmt| t.transform_insert(stmt))
    }

    /// # Errors
    ///
    /// Returns `Error::TransformerRejected` for the first failure.
    pub fn apply_update(&self, stmt: UpdateStatement) -> Result<UpdateStatement> {
        self.run("update", stmt, |t, stmt| t.transform_update(stmt))
    }

    /// # Errors
    ///
    /// Returns `Error::TransformerRejected` for the first failure.
    pub fn apply_delete(&self, stmt: DeleteStatement) -> Result<DeleteStatement> {
        self.run("delete", stmt, |t, stmt| t.transform_delete(stmt))
    }

    fn run<T, F>(&self, kind: &'static str, mut node: T, step: F) -> Result<T>
    where
        F: Fn(&dyn Transformer, T) -> std::result::Result<T, BoxError>,
    {
        for transformer in &self.transformers {
            tracing::debug!(
                transformer = transformer.name(),
                statement = kind,
                "applying transformer"
            );
            node = step(transformer.as_ref(), node).map_err(|source| {
                tracing::debug!(
                    transformer = transformer.name(),
                    error = %source,
                    "transformer rejected statement"
                );
                Error::TransformerRejected {
                    transformer: transformer.name().to_string(),
                    source,
                }
            })?;
        }
        Ok(node)
    }
}

/// Base tables referenced by the FROM relation and joins of a SELECT,
/// keyed by table name, in source order. Each entry carries the relation
/// as written (aliases included) so predicates can be qualified with it.
/// Subqueries and raw joins are skipped.
#[must_use]
pub fn collect_tables(core: &SelectCore) -> Vec<(String, Relation)> {
    let joined = core.joins.iter().filter_map(|source| match source {
        JoinSource::Join(join) => Some(&join.relation),
        JoinSource::Raw(_) => None,
    });
    core.from
        .iter()
        .chain(joined)
        .filter_map(|relation| {
            relation
                .base_table()
                .map(|table| (table.name.clone(), relation.clone()))
        })
        .collect()
}
