//! Table metadata and column lookup.
//!
//! [`Table`] is implemented by `#[derive(Table)]` and gives static table
//! and column names. [`ColumnResolver`] answers "which columns does this
//! table have?" at run time, which transformers need to expand `*`.

use std::collections::HashMap;

use crate::ast;

/// Static table metadata.
pub trait Table {
    /// The SQL table name.
    const NAME: &'static str;

    /// The schema qualifying the table, if any.
    const SCHEMA: Option<&'static str> = None;

    /// Column names, in declaration order.
    const COLUMNS: &'static [&'static str];

    /// The primary key column name, if any.
    const PRIMARY_KEY: Option<&'static str>;

    /// A relation node for this table.
    #[must_use]
    fn relation() -> ast::Table {
        match Self::SCHEMA {
            Some(schema) => ast::Table::with_schema(schema, Self::NAME),
            None => ast::Table::new(Self::NAME),
        }
    }
}

/// Looks up the column names of a table.
pub trait ColumnResolver: Send + Sync {
    /// Columns of `table`, or `None` if the table is unknown.
    fn columns(&self, table: &str) -> Option<Vec<String>>;
}

impl ColumnResolver for HashMap<String, Vec<String>> {
    fn columns(&self, table: &str) -> Option<Vec<String>> {
        self.get(table).cloned()
    }
}

impl<F> ColumnResolver for F
where
    F: Fn(&str) -> Option<Vec<String>> + Send + Sync,
{
    fn columns(&self, table: &str) -> Option<Vec<String>> {
        self(table)
    }
}

/// A resolver backed by registered table metadata.
#[derive(Debug, Clone, Default)]
pub struct StaticResolver {
    tables: HashMap<String, Vec<String>>,
}

impl StaticResolver {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a derived table.
    #[must_use]
    pub fn register<T: Table>(self) -> Self {
        self.with_table(T::NAME, T::COLUMNS.iter().copied())
    }

    /// Registers a table by name.
    #[must_use]
    pub fn with_table<I, S>(mut self, name: impl Into<String>, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tables
            .insert(name.into(), columns.into_iter().map(Into::into).collect());
        self
    }
}

impl ColumnResolver for StaticResolver {
    fn columns(&self, table: &str) -> Option<Vec<String>> {
        self.tables.get(table).cloned()
    }
}
