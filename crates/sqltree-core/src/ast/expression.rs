//! Expression AST types.

use std::sync::Arc;

use super::relation::Relation;
use super::statement::Query;
use super::value::{SqlValue, ToSqlValue};
use super::window::{NullOrdering, OrderDirection, Ordering, WindowDefinition, WindowSpec};

/// A column bound to the relation it was looked up on.
#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    /// Owning relation. `None` renders an unqualified column.
    pub relation: Option<Relation>,
    /// Column name.
    pub name: String,
}

impl Attribute {
    /// Name of the base table behind the owning relation, if any.
    #[must_use]
    pub fn table_name(&self) -> Option<&str> {
        self.relation
            .as_ref()
            .and_then(Relation::base_table)
            .map(|table| table.name.as_str())
    }
}

/// Comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonOp {
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    /// Array/range containment (`@>`).
    Contains,
    /// Array/range overlap (`&&`).
    Overlaps,
}

impl ComparisonOp {
    /// Returns the SQL representation of the operator.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::NotEq => "!=",
            Self::Lt => "<",
            Self::LtEq => "<=",
            Self::Gt => ">",
            Self::GtEq => ">=",
            Self::Contains => "@>",
            Self::Overlaps => "&&",
        }
    }

    /// Returns the operator with its operands swapped (`a < b` iff `b > a`).
    #[must_use]
    pub const fn flipped(self) -> Self {
        match self {
            Self::Lt => Self::Gt,
            Self::LtEq => Self::GtEq,
            Self::Gt => Self::Lt,
            Self::GtEq => Self::LtEq,
            other => other,
        }
    }
}

/// Arithmetic, bitwise and string infix operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InfixOp {
    // Arithmetic
    Add,
    Sub,
    Mul,
    Div,
    Mod,

    // String
    Concat,

    // Bitwise
    BitAnd,
    BitOr,
    BitXor,
    LeftShift,
    RightShift,
}

impl InfixOp {
    /// Returns the SQL representation of the operator.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Mod => "%",
            Self::Concat => "||",
            Self::BitAnd => "&",
            Self::BitOr => "|",
            Self::BitXor => "^",
            Self::LeftShift => "<<",
            Self::RightShift => ">>",
        }
    }

    /// Portable binding strength of the operator (higher binds tighter).
    /// Dialects adjust it through `Dialect::infix_precedence`.
    #[must_use]
    pub const fn precedence(&self) -> u8 {
        match self {
            Self::Mul | Self::Div | Self::Mod => 9,
            Self::Add | Self::Sub => 8,
            Self::Concat | Self::BitAnd | Self::BitOr | Self::BitXor | Self::LeftShift
            | Self::RightShift => 7,
        }
    }

    /// Whether `(a op b) op c` equals `a op (b op c)`.
    #[must_use]
    pub const fn is_associative(&self) -> bool {
        matches!(
            self,
            Self::Add | Self::Mul | Self::Concat | Self::BitAnd | Self::BitOr | Self::BitXor
        )
    }
}

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    /// Logical NOT.
    Not,
    /// Bitwise NOT (`~`).
    BitNot,
    /// Negation (`-`).
    Neg,
}

/// Aggregate functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregateFunc {
    Count,
    Sum,
    Avg,
    Min,
    Max,
}

impl AggregateFunc {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Count => "COUNT",
            Self::Sum => "SUM",
            Self::Avg => "AVG",
            Self::Min => "MIN",
            Self::Max => "MAX",
        }
    }
}

/// An aggregate call such as `COUNT(DISTINCT x) FILTER (WHERE p)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Aggregate {
    pub func: AggregateFunc,
    /// Argument; `None` means `*`.
    pub expr: Option<Box<Expr>>,
    pub distinct: bool,
    pub filter: Option<Box<Expr>>,
}

impl Aggregate {
    /// Creates an aggregate call.
    #[must_use]
    pub fn new(func: AggregateFunc, expr: Option<Expr>) -> Self {
        Self {
            func,
            expr: expr.map(Box::new),
            distinct: false,
            filter: None,
        }
    }

    /// Aggregates over distinct values only.
    #[must_use]
    pub const fn distinct(mut self) -> Self {
        self.distinct = true;
        self
    }

    /// Restricts the aggregated rows with `FILTER (WHERE predicate)`.
    #[must_use]
    pub fn filter(mut self, predicate: impl IntoExpr) -> Self {
        self.filter = Some(Box::new(predicate.into_expr()));
        self
    }

    /// Turns the aggregate into a window call.
    #[must_use]
    pub fn over(self, window: impl Into<WindowSpec>) -> Expr {
        Expr::Aggregate(self).over(window)
    }
}

/// A generic function call. The name is emitted verbatim, upper-cased.
#[derive(Debug, Clone, PartialEq)]
pub struct NamedFunction {
    pub name: String,
    pub args: Vec<Expr>,
    pub distinct: bool,
}

impl NamedFunction {
    /// Creates a function call.
    #[must_use]
    pub fn new<I>(name: &str, args: I) -> Self
    where
        I: IntoIterator,
        I::Item: IntoExpr,
    {
        Self {
            name: name.to_uppercase(),
            args: args.into_iter().map(IntoExpr::into_expr).collect(),
            distinct: false,
        }
    }

    /// Applies DISTINCT to the arguments.
    #[must_use]
    pub const fn distinct(mut self) -> Self {
        self.distinct = true;
        self
    }

    /// Turns the function into a window call.
    #[must_use]
    pub fn over(self, window: impl Into<WindowSpec>) -> Expr {
        Expr::Function(self).over(window)
    }
}

/// Ranking and offset functions that require an OVER clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowFunc {
    RowNumber,
    Rank,
    DenseRank,
    CumeDist,
    PercentRank,
    Ntile,
    Lag,
    Lead,
    FirstValue,
    LastValue,
    NthValue,
}

impl WindowFunc {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::RowNumber => "ROW_NUMBER",
            Self::Rank => "RANK",
            Self::DenseRank => "DENSE_RANK",
            Self::CumeDist => "CUME_DIST",
            Self::PercentRank => "PERCENT_RANK",
            Self::Ntile => "NTILE",
            Self::Lag => "LAG",
            Self::Lead => "LEAD",
            Self::FirstValue => "FIRST_VALUE",
            Self::LastValue => "LAST_VALUE",
            Self::NthValue => "NTH_VALUE",
        }
    }
}

/// A window function call, e.g. `LAG(x, 1, 0)`.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowFunction {
    pub func: WindowFunc,
    pub args: Vec<Expr>,
}

impl WindowFunction {
    /// Attaches the OVER clause.
    #[must_use]
    pub fn over(self, window: impl Into<WindowSpec>) -> Expr {
        Expr::Window(self).over(window)
    }
}

/// `CASE [operand] WHEN .. THEN .. [ELSE ..] END`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Case {
    pub operand: Option<Box<Expr>>,
    pub whens: Vec<(Expr, Expr)>,
    pub otherwise: Option<Box<Expr>>,
}

impl Case {
    /// Searched CASE (`CASE WHEN cond THEN ...`).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Simple CASE (`CASE operand WHEN value THEN ...`).
    #[must_use]
    pub fn on(operand: impl IntoExpr) -> Self {
        Self {
            operand: Some(Box::new(operand.into_expr())),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn when(mut self, condition: impl IntoExpr, result: impl IntoExpr) -> Self {
        self.whens.push((condition.into_expr(), result.into_expr()));
        self
    }

    /// Sets the ELSE branch.
    #[must_use]
    pub fn otherwise(mut self, result: impl IntoExpr) -> Self {
        self.otherwise = Some(Box::new(result.into_expr()));
        self
    }
}

/// Fields accepted by `EXTRACT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractField {
    Year,
    Quarter,
    Month,
    Week,
    Day,
    Hour,
    Minute,
    Second,
    /// Day of week, Sunday = 0.
    Dow,
    /// Day of year.
    Doy,
    /// Seconds since the Unix epoch.
    Epoch,
}

impl ExtractField {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Year => "YEAR",
            Self::Quarter => "QUARTER",
            Self::Month => "MONTH",
            Self::Week => "WEEK",
            Self::Day => "DAY",
            Self::Hour => "HOUR",
            Self::Minute => "MINUTE",
            Self::Second => "SECOND",
            Self::Dow => "DOW",
            Self::Doy => "DOY",
            Self::Epoch => "EPOCH",
        }
    }
}

/// Kind of a GROUP BY grouping element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupingKind {
    Cube,
    Rollup,
    GroupingSets,
}

impl GroupingKind {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Cube => "CUBE",
            Self::Rollup => "ROLLUP",
            Self::GroupingSets => "GROUPING SETS",
        }
    }
}

/// `CUBE`, `ROLLUP` or `GROUPING SETS` over lists of expressions.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupingSet {
    pub kind: GroupingKind,
    pub sets: Vec<Vec<Expr>>,
}

/// A SQL expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Column reference.
    Attribute(Attribute),
    /// `*` or `"rel".*`.
    Star(Option<Relation>),
    /// A value; rendered inline or captured depending on the renderer.
    Literal(SqlValue),
    /// A value that always renders as a placeholder.
    BindParam(SqlValue),
    /// A value that always renders inline with the dialect's escaping.
    InlineValue(SqlValue),
    /// Raw SQL emitted verbatim. Never pass untrusted input here.
    SqlLiteral(String),
    /// Binary comparison.
    Comparison {
        left: Box<Expr>,
        op: ComparisonOp,
        right: Box<Expr>,
    },
    /// Prefix operator.
    Unary { op: UnaryOp, operand: Box<Expr> },
    /// Arithmetic/bitwise/string infix operator.
    Infix {
        left: Box<Expr>,
        op: InfixOp,
        right: Box<Expr>,
    },
    /// Conjunction of predicates.
    And(Vec<Expr>),
    /// Disjunction; always rendered parenthesised.
    Or(Box<Expr>, Box<Expr>),
    /// Explicit parentheses.
    Grouping(Box<Expr>),
    /// `IS [NOT] NULL`.
    IsNull { expr: Box<Expr>, negated: bool },
    /// `IS [NOT] DISTINCT FROM`.
    IsDistinctFrom {
        left: Box<Expr>,
        right: Box<Expr>,
        negated: bool,
    },
    /// `[NOT] IN (list)`.
    In {
        expr: Box<Expr>,
        list: Vec<Expr>,
        negated: bool,
    },
    /// `[NOT] IN (subquery)`.
    InQuery {
        expr: Box<Expr>,
        query: Arc<Query>,
        negated: bool,
    },
    /// `[NOT] EXISTS (subquery)`.
    Exists { query: Arc<Query>, negated: bool },
    /// `[NOT] BETWEEN low AND high`.
    Between {
        expr: Box<Expr>,
        low: Box<Expr>,
        high: Box<Expr>,
        negated: bool,
    },
    /// `[NOT] LIKE` / `ILIKE`, with an optional escape character.
    Like {
        expr: Box<Expr>,
        pattern: Box<Expr>,
        negated: bool,
        case_insensitive: bool,
        escape: Option<char>,
    },
    /// Regular-expression match.
    Regex {
        expr: Box<Expr>,
        pattern: Box<Expr>,
        negated: bool,
        case_insensitive: bool,
    },
    Aggregate(Aggregate),
    Function(NamedFunction),
    Window(WindowFunction),
    /// `function OVER window`.
    Over {
        function: Box<Expr>,
        window: WindowSpec,
    },
    Case(Case),
    /// `CAST(expr AS type)`. The type name is emitted verbatim.
    Cast { expr: Box<Expr>, type_name: String },
    Extract {
        field: ExtractField,
        expr: Box<Expr>,
    },
    GroupingSet(GroupingSet),
    /// `expr AS "name"`.
    Alias { expr: Box<Expr>, name: String },
    /// Scalar subquery.
    Subquery(Arc<Query>),
    /// The proposed row in an upsert (`EXCLUDED."col"`).
    Excluded(String),
}

/// Binding strength used for parenthesisation.
pub(crate) mod precedence {
    pub const ALIAS: u8 = 0;
    pub const AND: u8 = 2;
    pub const NOT: u8 = 3;
    pub const PREDICATE: u8 = 4;
    /// Infix operators that bind tighter than `*` in some dialects.
    pub const TIGHT_INFIX: u8 = 10;
    pub const UNARY: u8 = 11;
    pub const ATOM: u8 = 12;
}

impl Expr {
    /// Unqualified column reference.
    #[must_use]
    pub fn column(name: impl Into<String>) -> Self {
        Self::Attribute(Attribute {
            relation: None,
            name: name.into(),
        })
    }

    /// Binding strength of this node.
    #[must_use]
    pub(crate) fn precedence(&self) -> u8 {
        match self {
            Self::Alias { .. } => precedence::ALIAS,
            Self::And(_) => precedence::AND,
            Self::Unary { op: UnaryOp::Not, .. } | Self::Exists { negated: true, .. } => {
                precedence::NOT
            }
            Self::Comparison { .. }
            | Self::IsNull { .. }
            | Self::IsDistinctFrom { .. }
            | Self::In { .. }
            | Self::InQuery { .. }
            | Self::Between { .. }
            | Self::Like { .. }
            | Self::Regex { .. } => precedence::PREDICATE,
            Self::Infix { op, .. } => op.precedence(),
            Self::Unary { .. } => precedence::UNARY,
            _ => precedence::ATOM,
        }
    }

    fn comparison(self, op: ComparisonOp, other: impl IntoExpr) -> Self {
        Self::Comparison {
            left: Box::new(self),
            op,
            right: Box::new(other.into_expr()),
        }
    }

    fn infix(self, op: InfixOp, other: impl IntoExpr) -> Self {
        Self::Infix {
            left: Box::new(self),
            op,
            right: Box::new(other.into_expr()),
        }
    }

    // Comparisons

    #[must_use]
    pub fn eq(self, other: impl IntoExpr) -> Self {
        self.comparison(ComparisonOp::Eq, other)
    }

    #[must_use]
    pub fn not_eq(self, other: impl IntoExpr) -> Self {
        self.comparison(ComparisonOp::NotEq, other)
    }

    #[must_use]
    pub fn lt(self, other: impl IntoExpr) -> Self {
        self.comparison(ComparisonOp::Lt, other)
    }

    #[must_use]
    pub fn lt_eq(self, other: impl IntoExpr) -> Self {
        self.comparison(ComparisonOp::LtEq, other)
    }

    #[must_use]
    pub fn gt(self, other: impl IntoExpr) -> Self {
        self.comparison(ComparisonOp::Gt, other)
    }

    #[must_use]
    pub fn gt_eq(self, other: impl IntoExpr) -> Self {
        self.comparison(ComparisonOp::GtEq, other)
    }

    /// `self @> other`.
    #[must_use]
    pub fn contains(self, other: impl IntoExpr) -> Self {
        self.comparison(ComparisonOp::Contains, other)
    }

    /// `self && other`.
    #[must_use]
    pub fn overlaps(self, other: impl IntoExpr) -> Self {
        self.comparison(ComparisonOp::Overlaps, other)
    }

    // Pattern matching

    fn pattern_match(self, pattern: impl IntoExpr, negated: bool, case_insensitive: bool) -> Self {
        Self::Like {
            expr: Box::new(self),
            pattern: Box::new(pattern.into_expr()),
            negated,
            case_insensitive,
            escape: None,
        }
    }

    #[must_use]
    pub fn like(self, pattern: impl IntoExpr) -> Self {
        self.pattern_match(pattern, false, false)
    }

    #[must_use]
    pub fn not_like(self, pattern: impl IntoExpr) -> Self {
        self.pattern_match(pattern, true, false)
    }

    /// Case-insensitive LIKE.
    #[must_use]
    pub fn ilike(self, pattern: impl IntoExpr) -> Self {
        self.pattern_match(pattern, false, true)
    }

    #[must_use]
    pub fn not_ilike(self, pattern: impl IntoExpr) -> Self {
        self.pattern_match(pattern, true, true)
    }

    /// Sets the escape character of a LIKE node. Other nodes are returned
    /// unchanged.
    #[must_use]
    pub fn escape(self, ch: char) -> Self {
        match self {
            Self::Like {
                expr,
                pattern,
                negated,
                case_insensitive,
                ..
            } => Self::Like {
                expr,
                pattern,
                negated,
                case_insensitive,
                escape: Some(ch),
            },
            other => other,
        }
    }

    fn regex(self, pattern: impl IntoExpr, negated: bool, case_insensitive: bool) -> Self {
        Self::Regex {
            expr: Box::new(self),
            pattern: Box::new(pattern.into_expr()),
            negated,
            case_insensitive,
        }
    }

    #[must_use]
    pub fn matches_regex(self, pattern: impl IntoExpr) -> Self {
        self.regex(pattern, false, false)
    }

    #[must_use]
    pub fn not_matches_regex(self, pattern: impl IntoExpr) -> Self {
        self.regex(pattern, true, false)
    }

    #[must_use]
    pub fn imatches_regex(self, pattern: impl IntoExpr) -> Self {
        self.regex(pattern, false, true)
    }

    #[must_use]
    pub fn not_imatches_regex(self, pattern: impl IntoExpr) -> Self {
        self.regex(pattern, true, true)
    }

    // Null and distinctness

    #[must_use]
    pub fn is_null(self) -> Self {
        Self::IsNull {
            expr: Box::new(self),
            negated: false,
        }
    }

    #[must_use]
    pub fn is_not_null(self) -> Self {
        Self::IsNull {
            expr: Box::new(self),
            negated: true,
        }
    }

    #[must_use]
    pub fn is_distinct_from(self, other: impl IntoExpr) -> Self {
        Self::IsDistinctFrom {
            left: Box::new(self),
            right: Box::new(other.into_expr()),
            negated: false,
        }
    }

    #[must_use]
    pub fn is_not_distinct_from(self, other: impl IntoExpr) -> Self {
        Self::IsDistinctFrom {
            left: Box::new(self),
            right: Box::new(other.into_expr()),
            negated: true,
        }
    }

    // Membership and ranges

    /// `self IN (values...)`. An empty list fails at render time.
    #[must_use]
    pub fn in_list<I>(self, values: I) -> Self
    where
        I: IntoIterator,
        I::Item: IntoExpr,
    {
        Self::In {
            expr: Box::new(self),
            list: values.into_iter().map(IntoExpr::into_expr).collect(),
            negated: false,
        }
    }

    #[must_use]
    pub fn not_in_list<I>(self, values: I) -> Self
    where
        I: IntoIterator,
        I::Item: IntoExpr,
    {
        Self::In {
            expr: Box::new(self),
            list: values.into_iter().map(IntoExpr::into_expr).collect(),
            negated: true,
        }
    }

    #[must_use]
    pub fn in_query(self, query: impl Into<Query>) -> Self {
        Self::InQuery {
            expr: Box::new(self),
            query: Arc::new(query.into()),
            negated: false,
        }
    }

    #[must_use]
    pub fn not_in_query(self, query: impl Into<Query>) -> Self {
        Self::InQuery {
            expr: Box::new(self),
            query: Arc::new(query.into()),
            negated: true,
        }
    }

    #[must_use]
    pub fn between(self, low: impl IntoExpr, high: impl IntoExpr) -> Self {
        Self::Between {
            expr: Box::new(self),
            low: Box::new(low.into_expr()),
            high: Box::new(high.into_expr()),
            negated: false,
        }
    }

    #[must_use]
    pub fn not_between(self, low: impl IntoExpr, high: impl IntoExpr) -> Self {
        Self::Between {
            expr: Box::new(self),
            low: Box::new(low.into_expr()),
            high: Box::new(high.into_expr()),
            negated: true,
        }
    }

    // Boolean connectives

    /// Conjunction. Chained calls flatten into a single AND node.
    #[must_use]
    pub fn and(self, other: impl IntoExpr) -> Self {
        let other = other.into_expr();
        match self {
            Self::And(mut items) => {
                items.push(other);
                Self::And(items)
            }
            first => Self::And(vec![first, other]),
        }
    }

    #[must_use]
    pub fn or(self, other: impl IntoExpr) -> Self {
        Self::Or(Box::new(self), Box::new(other.into_expr()))
    }

    #[must_use]
    #[allow(clippy::should_implement_trait)]
    pub fn not(self) -> Self {
        Self::Unary {
            op: UnaryOp::Not,
            operand: Box::new(self),
        }
    }

    /// Wraps the expression in parentheses.
    #[must_use]
    pub fn grouped(self) -> Self {
        Self::Grouping(Box::new(self))
    }

    // Arithmetic, string and bitwise

    #[must_use]
    #[allow(clippy::should_implement_trait)]
    pub fn add(self, other: impl IntoExpr) -> Self {
        self.infix(InfixOp::Add, other)
    }

    #[must_use]
    #[allow(clippy::should_implement_trait)]
    pub fn sub(self, other: impl IntoExpr) -> Self {
        self.infix(InfixOp::Sub, other)
    }

    #[must_use]
    #[allow(clippy::should_implement_trait)]
    pub fn mul(self, other: impl IntoExpr) -> Self {
        self.infix(InfixOp::Mul, other)
    }

    #[must_use]
    #[allow(clippy::should_implement_trait)]
    pub fn div(self, other: impl IntoExpr) -> Self {
        self.infix(InfixOp::Div, other)
    }

    #[must_use]
    pub fn modulo(self, other: impl IntoExpr) -> Self {
        self.infix(InfixOp::Mod, other)
    }

    #[must_use]
    pub fn concat(self, other: impl IntoExpr) -> Self {
        self.infix(InfixOp::Concat, other)
    }

    #[must_use]
    pub fn bit_and(self, other: impl IntoExpr) -> Self {
        self.infix(InfixOp::BitAnd, other)
    }

    #[must_use]
    pub fn bit_or(self, other: impl IntoExpr) -> Self {
        self.infix(InfixOp::BitOr, other)
    }

    #[must_use]
    pub fn bit_xor(self, other: impl IntoExpr) -> Self {
        self.infix(InfixOp::BitXor, other)
    }

    #[must_use]
    pub fn shift_left(self, other: impl IntoExpr) -> Self {
        self.infix(InfixOp::LeftShift, other)
    }

    #[must_use]
    pub fn shift_right(self, other: impl IntoExpr) -> Self {
        self.infix(InfixOp::RightShift, other)
    }

    #[must_use]
    pub fn bit_not(self) -> Self {
        Self::Unary {
            op: UnaryOp::BitNot,
            operand: Box::new(self),
        }
    }

    #[must_use]
    #[allow(clippy::should_implement_trait)]
    pub fn neg(self) -> Self {
        Self::Unary {
            op: UnaryOp::Neg,
            operand: Box::new(self),
        }
    }

    // Projection and ordering helpers

    /// `self AS "name"`.
    #[must_use]
    pub fn alias(self, name: impl Into<String>) -> Self {
        Self::Alias {
            expr: Box::new(self),
            name: name.into(),
        }
    }

    #[must_use]
    pub fn cast(self, type_name: impl Into<String>) -> Self {
        Self::Cast {
            expr: Box::new(self),
            type_name: type_name.into(),
        }
    }

    /// Ascending order (rendered explicitly as `ASC`).
    #[must_use]
    pub fn asc(self) -> Ordering {
        Ordering {
            expr: self,
            direction: OrderDirection::Asc,
            nulls: NullOrdering::Default,
        }
    }

    #[must_use]
    pub fn desc(self) -> Ordering {
        Ordering {
            expr: self,
            direction: OrderDirection::Desc,
            nulls: NullOrdering::Default,
        }
    }

    /// Attaches an OVER clause to a function or aggregate.
    #[must_use]
    pub fn over(self, window: impl Into<WindowSpec>) -> Self {
        Self::Over {
            function: Box::new(self),
            window: window.into(),
        }
    }
}

/// Attaches the expression builder methods to aggregate nodes so that
/// `count(x).gt(10)` reads naturally.
macro_rules! forward_predicates {
    ($ty:ty) => {
        impl $ty {
            #[must_use]
            pub fn eq(self, other: impl IntoExpr) -> Expr {
                self.into_expr().eq(other)
            }

            #[must_use]
            pub fn not_eq(self, other: impl IntoExpr) -> Expr {
                self.into_expr().not_eq(other)
            }

            #[must_use]
            pub fn lt(self, other: impl IntoExpr) -> Expr {
                self.into_expr().lt(other)
            }

            #[must_use]
            pub fn lt_eq(self, other: impl IntoExpr) -> Expr {
                self.into_expr().lt_eq(other)
            }

            #[must_use]
            pub fn gt(self, other: impl IntoExpr) -> Expr {
                self.into_expr().gt(other)
            }

            #[must_use]
            pub fn gt_eq(self, other: impl IntoExpr) -> Expr {
                self.into_expr().gt_eq(other)
            }

            #[must_use]
            pub fn alias(self, name: impl Into<String>) -> Expr {
                self.into_expr().alias(name)
            }

            #[must_use]
            pub fn asc(self) -> Ordering {
                self.into_expr().asc()
            }

            #[must_use]
            pub fn desc(self) -> Ordering {
                self.into_expr().desc()
            }
        }
    };
}

forward_predicates!(Aggregate);
forward_predicates!(NamedFunction);
forward_predicates!(Case);

/// Conversion into an expression node. Plain values become literals.
pub trait IntoExpr {
    fn into_expr(self) -> Expr;
}

impl IntoExpr for Expr {
    fn into_expr(self) -> Expr {
        self
    }
}

impl IntoExpr for &Expr {
    fn into_expr(self) -> Expr {
        self.clone()
    }
}

impl IntoExpr for Attribute {
    fn into_expr(self) -> Expr {
        Expr::Attribute(self)
    }
}

impl IntoExpr for Aggregate {
    fn into_expr(self) -> Expr {
        Expr::Aggregate(self)
    }
}

impl IntoExpr for NamedFunction {
    fn into_expr(self) -> Expr {
        Expr::Function(self)
    }
}

impl IntoExpr for WindowFunction {
    fn into_expr(self) -> Expr {
        Expr::Window(self)
    }
}

impl IntoExpr for Case {
    fn into_expr(self) -> Expr {
        Expr::Case(self)
    }
}

impl IntoExpr for GroupingSet {
    fn into_expr(self) -> Expr {
        Expr::GroupingSet(self)
    }
}

macro_rules! impl_value_into_expr {
    ($($ty:ty),*) => {
        $(
            impl IntoExpr for $ty {
                fn into_expr(self) -> Expr {
                    Expr::Literal(self.to_sql_value())
                }
            }
        )*
    };
}

impl_value_into_expr!(
    SqlValue, bool, i8, i16, i32, i64, u8, u16, u32, f32, f64, String, &str, &String,
    Vec<u8>, &[u8]
);

impl<T: ToSqlValue> IntoExpr for Option<T> {
    fn into_expr(self) -> Expr {
        Expr::Literal(self.to_sql_value())
    }
}

impl From<WindowDefinition> for WindowSpec {
    fn from(definition: WindowDefinition) -> Self {
        Self::Inline(definition)
    }
}

impl From<&str> for WindowSpec {
    fn from(name: &str) -> Self {
        Self::Named(String::from(name))
    }
}
