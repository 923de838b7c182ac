//! Relations: anything usable in FROM or JOIN position.

use std::sync::Arc;

use super::expression::{Attribute, Expr};
use super::statement::Query;

/// A base table, optionally schema-qualified.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Table {
    /// Schema name (optional).
    pub schema: Option<String>,
    /// Table name.
    pub name: String,
}

impl Table {
    /// Creates a table reference.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            schema: None,
            name: name.into(),
        }
    }

    /// Creates a schema-qualified table reference.
    #[must_use]
    pub fn with_schema(schema: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            schema: Some(schema.into()),
            name: name.into(),
        }
    }

    /// Returns a column of this table.
    #[must_use]
    pub fn col(&self, name: impl Into<String>) -> Expr {
        Relation::Table(self.clone()).col(name)
    }

    /// Returns `"table".*`.
    #[must_use]
    pub fn star(&self) -> Expr {
        Expr::Star(Some(Relation::Table(self.clone())))
    }

    /// Aliases this table.
    #[must_use]
    pub fn alias(&self, name: impl Into<String>) -> TableAlias {
        TableAlias::new(Relation::Table(self.clone()), name)
    }
}

/// A relation under an alias. Columns looked up on the alias are
/// qualified by the alias name.
#[derive(Debug, Clone, PartialEq)]
pub struct TableAlias {
    /// The aliased relation.
    pub relation: Arc<Relation>,
    /// The alias name.
    pub name: String,
}

impl TableAlias {
    /// Creates an alias for a relation.
    #[must_use]
    pub fn new(relation: impl Into<Relation>, name: impl Into<String>) -> Self {
        Self {
            relation: Arc::new(relation.into()),
            name: name.into(),
        }
    }

    /// Returns a column qualified by the alias.
    #[must_use]
    pub fn col(&self, name: impl Into<String>) -> Expr {
        Relation::Alias(self.clone()).col(name)
    }

    /// Returns `"alias".*`.
    #[must_use]
    pub fn star(&self) -> Expr {
        Expr::Star(Some(Relation::Alias(self.clone())))
    }
}

/// Anything usable in FROM/JOIN position.
#[derive(Debug, Clone, PartialEq)]
pub enum Relation {
    /// A base table.
    Table(Table),
    /// An aliased relation.
    Alias(TableAlias),
    /// A nested query.
    Subquery(Arc<Query>),
}

impl Relation {
    /// Returns the base table, looking through aliases. Subqueries have none.
    #[must_use]
    pub fn base_table(&self) -> Option<&Table> {
        match self {
            Self::Table(table) => Some(table),
            Self::Alias(alias) => alias.relation.base_table(),
            Self::Subquery(_) => None,
        }
    }

    /// Returns the name that qualifies columns of this relation.
    #[must_use]
    pub fn qualifier(&self) -> Option<&str> {
        match self {
            Self::Table(table) => Some(&table.name),
            Self::Alias(alias) => Some(&alias.name),
            Self::Subquery(_) => None,
        }
    }

    /// Returns a column of this relation.
    #[must_use]
    pub fn col(&self, name: impl Into<String>) -> Expr {
        Expr::Attribute(Attribute {
            relation: Some(self.clone()),
            name: name.into(),
        })
    }

    /// Returns the qualified star for this relation.
    #[must_use]
    pub fn star(&self) -> Expr {
        Expr::Star(Some(self.clone()))
    }

    /// Aliases this relation.
    #[must_use]
    pub fn alias(self, name: impl Into<String>) -> TableAlias {
        TableAlias::new(self, name)
    }
}

impl From<Table> for Relation {
    fn from(table: Table) -> Self {
        Self::Table(table)
    }
}

impl From<&Table> for Relation {
    fn from(table: &Table) -> Self {
        Self::Table(table.clone())
    }
}

impl From<TableAlias> for Relation {
    fn from(alias: TableAlias) -> Self {
        Self::Alias(alias)
    }
}

impl From<&TableAlias> for Relation {
    fn from(alias: &TableAlias) -> Self {
        Self::Alias(alias.clone())
    }
}

impl From<Query> for Relation {
    fn from(query: Query) -> Self {
        Self::Subquery(Arc::new(query))
    }
}

impl From<&str> for Relation {
    fn from(name: &str) -> Self {
        Self::Table(Table::new(name))
    }
}
