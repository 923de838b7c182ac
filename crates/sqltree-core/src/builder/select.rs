//! SELECT builder and set operations.

use std::sync::Arc;

use crate::ast::{
    Cte, IntoExpr, Join, JoinKind, JoinSource, LockMode, Ordering, Query, Relation,
    SelectCore, SetOperation, SetOperator, WindowDefinition,
};
use crate::error::Result;
use crate::render::{Rendered, Renderer};
use crate::transform::{Pipeline, Transformer};

/// A SELECT statement under construction.
///
/// Every method consumes and returns the builder. List setters append,
/// except [`Select::select`] which replaces the projection list.
#[derive(Debug, Clone, Default)]
pub struct Select {
    core: SelectCore,
    pipeline: Pipeline,
}

impl Select {
    /// Creates an empty SELECT.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps an existing core.
    #[must_use]
    pub fn from_core(core: SelectCore) -> Self {
        Self {
            core,
            pipeline: Pipeline::new(),
        }
    }

    /// Sets the FROM relation.
    #[must_use]
    pub fn from(mut self, relation: impl Into<Relation>) -> Self {
        self.core.from = Some(relation.into());
        self
    }

    /// Replaces the projection list.
    #[must_use]
    pub fn select<I>(mut self, exprs: I) -> Self
    where
        I: IntoIterator,
        I::Item: IntoExpr,
    {
        self.core.projections = exprs.into_iter().map(IntoExpr::into_expr).collect();
        self
    }

    /// Appends one projection.
    #[must_use]
    pub fn project(mut self, expr: impl IntoExpr) -> Self {
        self.core.projections.push(expr.into_expr());
        self
    }

    /// `SELECT DISTINCT`. Clears any DISTINCT ON list.
    #[must_use]
    pub fn distinct(mut self) -> Self {
        self.core.distinct = true;
        self.core.distinct_on.clear();
        self
    }

    /// `SELECT DISTINCT ON (...)`. Clears plain DISTINCT.
    #[must_use]
    pub fn distinct_on<I>(mut self, exprs: I) -> Self
    where
        I: IntoIterator,
        I::Item: IntoExpr,
    {
        self.core.distinct = false;
        self.core.distinct_on = exprs.into_iter().map(IntoExpr::into_expr).collect();
        self
    }

    fn push_join(mut self, relation: Relation, kind: JoinKind, lateral: bool) -> Self {
        self.core.joins.push(JoinSource::Join(Join {
            relation,
            kind,
            lateral,
            on: None,
        }));
        self
    }

    /// Appends a join; follow with [`Select::on`] unless it is a CROSS join.
    #[must_use]
    pub fn join(self, relation: impl Into<Relation>, kind: JoinKind) -> Self {
        self.push_join(relation.into(), kind, false)
    }

    #[must_use]
    pub fn inner_join(self, relation: impl Into<Relation>) -> Self {
        self.join(relation, JoinKind::Inner)
    }

    #[must_use]
    pub fn left_join(self, relation: impl Into<Relation>) -> Self {
        self.join(relation, JoinKind::LeftOuter)
    }

    #[must_use]
    pub fn right_join(self, relation: impl Into<Relation>) -> Self {
        self.join(relation, JoinKind::RightOuter)
    }

    #[must_use]
    pub fn full_join(self, relation: impl Into<Relation>) -> Self {
        self.join(relation, JoinKind::FullOuter)
    }

    #[must_use]
    pub fn cross_join(self, relation: impl Into<Relation>) -> Self {
        self.join(relation, JoinKind::Cross)
    }

    /// Appends a LATERAL join.
    #[must_use]
    pub fn lateral_join(self, relation: impl Into<Relation>, kind: JoinKind) -> Self {
        self.push_join(relation.into(), kind, true)
    }

    /// Appends raw join text, emitted verbatim.
    #[must_use]
    pub fn string_join(mut self, raw: impl Into<String>) -> Self {
        self.core.joins.push(JoinSource::Raw(raw.into()));
        self
    }

    /// Sets the ON predicate of the most recent join. A second call ANDs
    /// with the first. Without a preceding join the call is ignored.
    #[must_use]
    pub fn on(mut self, predicate: impl IntoExpr) -> Self {
        let predicate = predicate.into_expr();
        match self.core.joins.last_mut() {
            Some(JoinSource::Join(join)) => {
                join.on = Some(match join.on.take() {
                    Some(existing) => existing.and(predicate),
                    None => predicate,
                });
            }
            Some(JoinSource::Raw(_)) | None => {
                tracing::warn!("on() called without a preceding join; predicate ignored");
            }
        }
        self
    }

    /// Appends a WHERE predicate; predicates are ANDed.
    #[must_use]
    pub fn where_clause(mut self, predicate: impl IntoExpr) -> Self {
        self.core.wheres.push(predicate.into_expr());
        self
    }

    /// Appends GROUP BY expressions.
    #[must_use]
    pub fn group<I>(mut self, exprs: I) -> Self
    where
        I: IntoIterator,
        I::Item: IntoExpr,
    {
        self.core
            .groups
            .extend(exprs.into_iter().map(IntoExpr::into_expr));
        self
    }

    /// Appends a HAVING predicate; predicates are ANDed.
    #[must_use]
    pub fn having(mut self, predicate: impl IntoExpr) -> Self {
        self.core.havings.push(predicate.into_expr());
        self
    }

    /// Declares a named window in the WINDOW clause.
    #[must_use]
    pub fn window(mut self, definition: WindowDefinition) -> Self {
        self.core.windows.push(definition);
        self
    }

    /// Appends ORDER BY terms. Bare expressions sort ascending.
    #[must_use]
    pub fn order<I>(mut self, orderings: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Ordering>,
    {
        self.core
            .orders
            .extend(orderings.into_iter().map(Into::into));
        self
    }

    /// Sets the row limit. Negative counts fail at render time.
    #[must_use]
    pub fn limit(mut self, n: i64) -> Self {
        self.core.limit = Some(n.into_expr());
        self
    }

    /// Sets the number of rows to skip. Negative counts fail at render time.
    #[must_use]
    pub fn offset(mut self, n: i64) -> Self {
        self.core.offset = Some(n.into_expr());
        self
    }

    /// Requests a row lock.
    #[must_use]
    pub const fn lock(mut self, mode: LockMode) -> Self {
        self.core.lock = Some(mode);
        self
    }

    /// Adds SKIP LOCKED, taking `FOR UPDATE` if no lock was requested.
    #[must_use]
    pub const fn skip_locked(mut self) -> Self {
        if self.core.lock.is_none() {
            self.core.lock = Some(LockMode::Update);
        }
        self.core.skip_locked = true;
        self
    }

    /// Sets the leading `/* comment */`.
    #[must_use]
    pub fn comment(mut self, text: impl Into<String>) -> Self {
        self.core.comment = Some(text.into());
        self
    }

    /// Appends an optimizer hint.
    #[must_use]
    pub fn hint(mut self, text: impl Into<String>) -> Self {
        self.core.hints.push(text.into());
        self
    }

    /// Adds a common table expression.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, query: impl Into<Query>) -> Self {
        self.core.ctes.push(Cte {
            name: name.into(),
            query: query.into(),
            recursive: false,
        });
        self
    }

    /// Adds a recursive common table expression.
    #[must_use]
    pub fn with_recursive(mut self, name: impl Into<String>, query: impl Into<Query>) -> Self {
        self.core.ctes.push(Cte {
            name: name.into(),
            query: query.into(),
            recursive: true,
        });
        self
    }

    /// Appends a transformer to this statement's pipeline.
    #[must_use]
    pub fn use_transformer(mut self, transformer: impl Transformer + 'static) -> Self {
        self.pipeline.push(Arc::new(transformer));
        self
    }

    /// Appends an already shared transformer.
    #[must_use]
    pub fn use_shared_transformer(mut self, transformer: Arc<dyn Transformer>) -> Self {
        self.pipeline.push(transformer);
        self
    }

    /// The untransformed core.
    #[must_use]
    pub const fn core(&self) -> &SelectCore {
        &self.core
    }

    /// A deep copy of the untransformed core.
    #[must_use]
    pub fn clone_core(&self) -> SelectCore {
        self.core.clone()
    }

    #[must_use]
    pub fn transformers(&self) -> &[Arc<dyn Transformer>] {
        self.pipeline.transformers()
    }

    /// Runs the pipeline over a copy of the core.
    ///
    /// # Errors
    ///
    /// Returns `Error::TransformerRejected` if a transformer fails.
    pub fn transformed(&self) -> Result<SelectCore> {
        self.pipeline.apply_select(self.core.clone())
    }

    /// Runs the transformers and renders. The builder is left untouched,
    /// so calling this twice gives the same output.
    ///
    /// # Errors
    ///
    /// Returns `Error::TransformerRejected` if a transformer fails and
    /// `Error::MalformedAst` if the tree cannot be rendered.
    pub fn to_sql(&self, renderer: &Renderer) -> Result<Rendered> {
        let core = self.transformed()?;
        renderer.render(&core)
    }

    fn combine(self, op: SetOperator, other: Self) -> Compound {
        Compound::new(self).push(op, other)
    }

    #[must_use]
    pub fn union(self, other: Self) -> Compound {
        self.combine(SetOperator::Union, other)
    }

    #[must_use]
    pub fn union_all(self, other: Self) -> Compound {
        self.combine(SetOperator::UnionAll, other)
    }

    #[must_use]
    pub fn intersect(self, other: Self) -> Compound {
        self.combine(SetOperator::Intersect, other)
    }

    #[must_use]
    pub fn intersect_all(self, other: Self) -> Compound {
        self.combine(SetOperator::IntersectAll, other)
    }

    #[must_use]
    pub fn except(self, other: Self) -> Compound {
        self.combine(SetOperator::Except, other)
    }

    #[must_use]
    pub fn except_all(self, other: Self) -> Compound {
        self.combine(SetOperator::ExceptAll, other)
    }
}

/// Embedding a builder as a subquery or CTE body. The builder's own
/// transformers are not applied; use [`Select::transformed`] first if
/// they should be.
impl From<Select> for Query {
    fn from(select: Select) -> Self {
        Self::from(select.core)
    }
}

impl From<Select> for Relation {
    fn from(select: Select) -> Self {
        Self::from(Query::from(select))
    }
}

/// SELECTs combined left to right with set operators. Each branch runs
/// its own transformers when the compound is rendered.
#[derive(Debug, Clone)]
pub struct Compound {
    first: Select,
    rest: Vec<(SetOperator, Select)>,
}

impl Compound {
    #[must_use]
    pub const fn new(first: Select) -> Self {
        Self {
            first,
            rest: Vec::new(),
        }
    }

    fn push(mut self, op: SetOperator, next: Select) -> Self {
        self.rest.push((op, next));
        self
    }

    #[must_use]
    pub fn union(self, other: Select) -> Self {
        self.push(SetOperator::Union, other)
    }

    #[must_use]
    pub fn union_all(self, other: Select) -> Self {
        self.push(SetOperator::UnionAll, other)
    }

    #[must_use]
    pub fn intersect(self, other: Select) -> Self {
        self.push(SetOperator::Intersect, other)
    }

    #[must_use]
    pub fn intersect_all(self, other: Select) -> Self {
        self.push(SetOperator::IntersectAll, other)
    }

    #[must_use]
    pub fn except(self, other: Select) -> Self {
        self.push(SetOperator::Except, other)
    }

    #[must_use]
    pub fn except_all(self, other: Select) -> Self {
        self.push(SetOperator::ExceptAll, other)
    }

    /// Builds the query tree, running each branch's transformers.
    ///
    /// # Errors
    ///
    /// Returns `Error::TransformerRejected` if a branch transformer fails.
    pub fn transformed(&self) -> Result<Query> {
        let mut query = Query::from(self.first.transformed()?);
        for (op, branch) in &self.rest {
            query = Query::SetOperation(SetOperation {
                left: Box::new(query),
                op: *op,
                right: Box::new(Query::from(branch.transformed()?)),
            });
        }
        Ok(query)
    }

    /// # Errors
    ///
    /// See [`Compound::transformed`] and [`Renderer::render`].
    pub fn to_sql(&self, renderer: &Renderer) -> Result<Rendered> {
        let query = self.transformed()?;
        renderer.render(&query)
    }

    fn into_untransformed(self) -> Query {
        self.rest
            .into_iter()
            .fold(Query::from(self.first), |left, (op, right)| {
                Query::SetOperation(SetOperation {
                    left: Box::new(left),
                    op,
                    right: Box::new(Query::from(right)),
                })
            })
    }
}

/// Embedding a compound as a subquery or CTE body; branch transformers
/// are not applied.
impl From<Compound> for Query {
    fn from(compound: Compound) -> Self {
        compound.into_untransformed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Table;

    #[test]
    fn test_on_without_join_is_ignored() {
        let users = Table::new("users");
        let select = Select::new().from(&users).on(users.col("id").eq(1));
        assert!(select.core().joins.is_empty());
    }

    #[test]
    fn test_repeated_on_combines_with_and() {
        let users = Table::new("users");
        let posts = Table::new("posts");
        let select = Select::new()
            .from(&users)
            .inner_join(&posts)
            .on(posts.col("user_id").eq(users.col("id")))
            .on(posts.col("published").eq(true));
        match &select.core().joins[0] {
            JoinSource::Join(join) => {
                assert!(matches!(&join.on, Some(Expr::And(items)) if items.len() == 2));
            }
            JoinSource::Raw(_) => panic!("expected a structured join"),
        }
    }

    #[test]
    fn test_distinct_variants_clear_each_other() {
        let t = Table::new("t");
        let select = Select::new().from(&t).distinct().distinct_on([t.col("a")]);
        assert!(!select.core().distinct);
        assert_eq!(select.core().distinct_on.len(), 1);

        let select = select.distinct();
        assert!(select.core().distinct);
        assert!(select.core().distinct_on.is_empty());
    }

    #[test]
    fn test_select_replaces_and_project_appends() {
        let t = Table::new("t");
        let select = Select::new()
            .from(&t)
            .select([t.col("a")])
            .select([t.col("b")])
            .project(t.col("c"));
        assert_eq!(select.core().projections, vec![t.col("b"), t.col("c")]);
    }

    #[test]
    fn test_skip_locked_defaults_to_for_update() {
        let select = Select::new().from(Table::new("jobs")).skip_locked();
        assert_eq!(select.core().lock, Some(LockMode::Update));
        assert!(select.core().skip_locked);
    }

    #[test]
    fn test_compound_is_left_deep() {
        let t = Table::new("t");
        let q = Query::from(
            Select::new()
                .from(&t)
                .union(Select::new().from(&t))
                .except(Select::new().from(&t)),
        );
        match q {
            Query::SetOperation(op) => {
                assert_eq!(op.op, SetOperator::Except);
                assert!(matches!(*op.left, Query::SetOperation(_)));
                assert!(matches!(*op.right, Query::Select(_)));
            }
            Query::Select(_) => panic!("expected a set operation"),
        }
    }
}
