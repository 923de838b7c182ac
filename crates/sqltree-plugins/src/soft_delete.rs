//! Hides soft-deleted rows from SELECT statements.
//!
//! For every base table referenced in FROM or a join that falls in the
//! configured scope, [`SoftDelete`] appends `<relation>.<column> IS NULL`
//! to the WHERE list. Predicates are qualified with the relation as
//! written, so aliased and self-joined tables are each filtered.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use sqltree_core::ast::SelectCore;
use sqltree_core::transform::collect_tables;
use sqltree_core::{BoxError, Transformer};

/// Column used when a scope does not name one.
pub const DEFAULT_COLUMN: &str = "deleted_at";

/// Which tables are filtered, and on which column.
///
/// Deserialises from `{"column": "deleted_at"}`, `{"tables": ["users"]}`
/// or `{"columns": {"users": "removed_at"}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SoftDeleteScope {
    /// Every table, using this column.
    Column(String),
    /// Only the listed tables, using [`DEFAULT_COLUMN`].
    Tables(Vec<String>),
    /// Only the listed tables, each with its own column.
    Columns(BTreeMap<String, String>),
}

impl Default for SoftDeleteScope {
    fn default() -> Self {
        Self::Column(String::from(DEFAULT_COLUMN))
    }
}

impl SoftDeleteScope {
    /// The soft-delete column of `table`, or `None` if it is out of scope.
    #[must_use]
    pub fn column_for(&self, table: &str) -> Option<&str> {
        match self {
            Self::Column(column) => Some(column.as_str()),
            Self::Tables(tables) => tables
                .iter()
                .any(|t| t == table)
                .then_some(DEFAULT_COLUMN),
            Self::Columns(columns) => columns.get(table).map(String::as_str),
        }
    }
}

/// The soft-delete transformer.
#[derive(Debug, Clone, Default)]
pub struct SoftDelete {
    scope: SoftDeleteScope,
}

impl SoftDelete {
    #[must_use]
    pub const fn new(scope: SoftDeleteScope) -> Self {
        Self { scope }
    }

    /// Filters every table on `column`.
    #[must_use]
    pub fn column(column: impl Into<String>) -> Self {
        Self::new(SoftDeleteScope::Column(column.into()))
    }

    /// Filters the listed tables on `deleted_at`.
    #[must_use]
    pub fn tables<I, S>(tables: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(SoftDeleteScope::Tables(
            tables.into_iter().map(Into::into).collect(),
        ))
    }

    /// Filters each listed table on its own column.
    #[must_use]
    pub fn columns<I, T, C>(columns: I) -> Self
    where
        I: IntoIterator<Item = (T, C)>,
        T: Into<String>,
        C: Into<String>,
    {
        Self::new(SoftDeleteScope::Columns(
            columns
                .into_iter()
                .map(|(table, column)| (table.into(), column.into()))
                .collect(),
        ))
    }

    #[must_use]
    pub const fn scope(&self) -> &SoftDeleteScope {
        &self.scope
    }
}

impl Transformer for SoftDelete {
    fn name(&self) -> &str {
        "soft_delete"
    }

    fn transform_select(&self, mut core: SelectCore) -> Result<SelectCore, BoxError> {
        for (table, relation) in collect_tables(&core) {
            if let Some(column) = self.scope.column_for(&table) {
                tracing::trace!(table = %table, column, "hiding soft-deleted rows");
                core.wheres.push(relation.col(column).is_null());
            }
        }
        Ok(core)
    }
}
