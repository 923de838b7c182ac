//! Ordering terms and window specifications.

use super::expression::{Expr, IntoExpr};

/// Order direction for ORDER BY.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OrderDirection {
    /// Ascending order (default).
    #[default]
    Asc,
    /// Descending order.
    Desc,
}

impl OrderDirection {
    /// Returns the SQL representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// Null ordering for ORDER BY.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NullOrdering {
    /// Whatever the database does.
    #[default]
    Default,
    /// NULLs come first.
    First,
    /// NULLs come last.
    Last,
}

impl NullOrdering {
    /// Returns the SQL suffix, empty for `Default`.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Default => "",
            Self::First => "NULLS FIRST",
            Self::Last => "NULLS LAST",
        }
    }
}

/// An ORDER BY term.
#[derive(Debug, Clone, PartialEq)]
pub struct Ordering {
    pub expr: Expr,
    pub direction: OrderDirection,
    pub nulls: NullOrdering,
}

impl Ordering {
    #[must_use]
    pub const fn nulls_first(mut self) -> Self {
        self.nulls = NullOrdering::First;
        self
    }

    #[must_use]
    pub const fn nulls_last(mut self) -> Self {
        self.nulls = NullOrdering::Last;
        self
    }
}

impl From<Expr> for Ordering {
    fn from(expr: Expr) -> Self {
        expr.asc()
    }
}

/// ROWS or RANGE framing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameUnits {
    Rows,
    Range,
}

impl FrameUnits {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Rows => "ROWS",
            Self::Range => "RANGE",
        }
    }
}

/// One end of a window frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameBound {
    UnboundedPreceding,
    Preceding(u64),
    CurrentRow,
    Following(u64),
    UnboundedFollowing,
}

impl FrameBound {
    /// Returns the SQL representation.
    #[must_use]
    pub fn to_sql(&self) -> String {
        match self {
            Self::UnboundedPreceding => String::from("UNBOUNDED PRECEDING"),
            Self::Preceding(n) => format!("{n} PRECEDING"),
            Self::CurrentRow => String::from("CURRENT ROW"),
            Self::Following(n) => format!("{n} FOLLOWING"),
            Self::UnboundedFollowing => String::from("UNBOUNDED FOLLOWING"),
        }
    }
}

/// `ROWS|RANGE start` or `ROWS|RANGE BETWEEN start AND end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowFrame {
    pub units: FrameUnits,
    pub start: FrameBound,
    pub end: Option<FrameBound>,
}

/// A window: partitioning, ordering and framing. Named definitions go in
/// the WINDOW clause; unnamed ones are written inline after OVER.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct WindowDefinition {
    pub name: Option<String>,
    pub partition_by: Vec<Expr>,
    pub order_by: Vec<Ordering>,
    pub frame: Option<WindowFrame>,
}

impl WindowDefinition {
    /// An empty inline window (`OVER ()`).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A window to be declared in the WINDOW clause.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn partition_by<I>(mut self, exprs: I) -> Self
    where
        I: IntoIterator,
        I::Item: IntoExpr,
    {
        self.partition_by
            .extend(exprs.into_iter().map(IntoExpr::into_expr));
        self
    }

    #[must_use]
    pub fn order_by<I>(mut self, orderings: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Ordering>,
    {
        self.order_by.extend(orderings.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub const fn rows(mut self, start: FrameBound, end: Option<FrameBound>) -> Self {
        self.frame = Some(WindowFrame {
            units: FrameUnits::Rows,
            start,
            end,
        });
        self
    }

    #[must_use]
    pub const fn range(mut self, start: FrameBound, end: Option<FrameBound>) -> Self {
        self.frame = Some(WindowFrame {
            units: FrameUnits::Range,
            start,
            end,
        });
        self
    }
}

/// What follows OVER: a reference to a named window or an inline one.
#[derive(Debug, Clone, PartialEq)]
pub enum WindowSpec {
    Named(String),
    Inline(WindowDefinition),
}
