//! SQL statement AST types.

use super::expression::Expr;
use super::relation::Relation;
use super::window::{Ordering, WindowDefinition};

/// Join kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    Inner,
    LeftOuter,
    RightOuter,
    FullOuter,
    Cross,
}

impl JoinKind {
    /// Returns the SQL representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Inner => "INNER JOIN",
            Self::LeftOuter => "LEFT OUTER JOIN",
            Self::RightOuter => "RIGHT OUTER JOIN",
            Self::FullOuter => "FULL OUTER JOIN",
            Self::Cross => "CROSS JOIN",
        }
    }
}

/// A join against the relations to its left.
#[derive(Debug, Clone, PartialEq)]
pub struct Join {
    pub relation: Relation,
    pub kind: JoinKind,
    pub lateral: bool,
    /// Join predicate. Required for everything but CROSS joins.
    pub on: Option<Expr>,
}

/// An entry in the join list.
#[derive(Debug, Clone, PartialEq)]
pub enum JoinSource {
    Join(Join),
    /// Raw join text, emitted verbatim.
    Raw(String),
}

/// Row lock requested by `SELECT ... FOR ...`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockMode {
    Update,
    NoKeyUpdate,
    Share,
    KeyShare,
}

impl LockMode {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Update => "FOR UPDATE",
            Self::NoKeyUpdate => "FOR NO KEY UPDATE",
            Self::Share => "FOR SHARE",
            Self::KeyShare => "FOR KEY SHARE",
        }
    }
}

/// A common table expression.
#[derive(Debug, Clone, PartialEq)]
pub struct Cte {
    pub name: String,
    pub query: Query,
    pub recursive: bool,
}

/// The body of a SELECT, in clause order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SelectCore {
    pub ctes: Vec<Cte>,
    pub from: Option<Relation>,
    pub joins: Vec<JoinSource>,
    pub projections: Vec<Expr>,
    pub wheres: Vec<Expr>,
    pub groups: Vec<Expr>,
    pub havings: Vec<Expr>,
    pub windows: Vec<WindowDefinition>,
    pub orders: Vec<Ordering>,
    pub distinct: bool,
    pub distinct_on: Vec<Expr>,
    pub limit: Option<Expr>,
    pub offset: Option<Expr>,
    pub lock: Option<LockMode>,
    pub skip_locked: bool,
    /// Leading `/* comment */`.
    pub comment: Option<String>,
    /// Optimizer hints, rendered as `/*+ ... */` after SELECT.
    pub hints: Vec<String>,
}

/// Set operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetOperator {
    Union,
    UnionAll,
    Intersect,
    IntersectAll,
    Except,
    ExceptAll,
}

impl SetOperator {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Union => "UNION",
            Self::UnionAll => "UNION ALL",
            Self::Intersect => "INTERSECT",
            Self::IntersectAll => "INTERSECT ALL",
            Self::Except => "EXCEPT",
            Self::ExceptAll => "EXCEPT ALL",
        }
    }

    /// INTERSECT binds tighter than UNION and EXCEPT.
    #[must_use]
    pub const fn precedence(&self) -> u8 {
        match self {
            Self::Intersect | Self::IntersectAll => 2,
            _ => 1,
        }
    }
}

/// Two queries combined by a set operator.
#[derive(Debug, Clone, PartialEq)]
pub struct SetOperation {
    pub left: Box<Query>,
    pub op: SetOperator,
    pub right: Box<Query>,
}

/// A query: a single SELECT or a set operation.
#[derive(Debug, Clone, PartialEq)]
pub enum Query {
    Select(Box<SelectCore>),
    SetOperation(SetOperation),
}

impl From<SelectCore> for Query {
    fn from(core: SelectCore) -> Self {
        Self::Select(Box::new(core))
    }
}

impl From<SetOperation> for Query {
    fn from(op: SetOperation) -> Self {
        Self::SetOperation(op)
    }
}

/// `column = value` in UPDATE SET or an upsert.
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    pub column: String,
    pub value: Expr,
}

/// Source of rows for INSERT.
#[derive(Debug, Clone, PartialEq)]
pub enum InsertSource {
    Values(Vec<Vec<Expr>>),
    Query(Box<Query>),
    DefaultValues,
}

/// What to do when an insert conflicts with an existing row.
#[derive(Debug, Clone, PartialEq)]
pub enum ConflictAction {
    DoNothing,
    DoUpdate(Vec<Assignment>),
}

/// `ON CONFLICT (target) DO ...`.
#[derive(Debug, Clone, PartialEq)]
pub struct OnConflict {
    pub target: Vec<String>,
    pub action: ConflictAction,
}

/// An INSERT statement.
#[derive(Debug, Clone, PartialEq)]
pub struct InsertStatement {
    pub ctes: Vec<Cte>,
    pub table: Relation,
    pub columns: Vec<String>,
    pub source: InsertSource,
    pub on_conflict: Option<OnConflict>,
    pub returning: Vec<Expr>,
}

impl InsertStatement {
    #[must_use]
    pub const fn new(table: Relation) -> Self {
        Self {
            ctes: Vec::new(),
            table,
            columns: Vec::new(),
            source: InsertSource::DefaultValues,
            on_conflict: None,
            returning: Vec::new(),
        }
    }
}

/// An UPDATE statement.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateStatement {
    pub ctes: Vec<Cte>,
    pub table: Relation,
    pub assignments: Vec<Assignment>,
    pub wheres: Vec<Expr>,
    pub returning: Vec<Expr>,
}

impl UpdateStatement {
    #[must_use]
    pub const fn new(table: Relation) -> Self {
        Self {
            ctes: Vec::new(),
            table,
            assignments: Vec::new(),
            wheres: Vec::new(),
            returning: Vec::new(),
        }
    }
}

/// A DELETE statement.
#[derive(Debug, Clone, PartialEq)]
pub struct DeleteStatement {
    pub ctes: Vec<Cte>,
    pub table: Relation,
    pub wheres: Vec<Expr>,
    pub returning: Vec<Expr>,
}

impl DeleteStatement {
    #[must_use]
    pub const fn new(table: Relation) -> Self {
        Self {
            ctes: Vec::new(),
            table,
            wheres: Vec::new(),
            returning: Vec::new(),
        }
    }
}

/// Any renderable statement.
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Query(Query),
    Insert(InsertStatement),
    Update(UpdateStatement),
    Delete(DeleteStatement),
}

impl From<Query> for Statement {
    fn from(query: Query) -> Self {
        Self::Query(query)
    }
}

impl From<SelectCore> for Statement {
    fn from(core: SelectCore) -> Self {
        Self::Query(Query::from(core))
    }
}

impl From<InsertStatement> for Statement {
    fn from(stmt: InsertStatement) -> Self {
        Self::Insert(stmt)
    }
}

impl From<UpdateStatement> for Statement {
    fn from(stmt: UpdateStatement) -> Self {
        Self::Update(stmt)
    }
}

impl From<DeleteStatement> for Statement {
    fn from(stmt: DeleteStatement) -> Self {
        Self::Delete(stmt)
    }
}
