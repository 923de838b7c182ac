//! Column masking of SELECT projections.

use std::collections::BTreeMap;

use serde_json::Value;
use sqltree_core::ast::{Expr, Relation, SelectCore};
use sqltree_core::builder::inline;
use sqltree_core::schema::ColumnResolver;

use super::client::MaskResponse;
use crate::error::{PolicyError, Result};

/// Active masks, keyed by table then column.
///
/// Only rules whose `replace.value` is a string are active; anything
/// else (`{}`, numbers, missing keys) leaves the column visible.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MaskMap {
    tables: BTreeMap<String, BTreeMap<String, String>>,
}

impl MaskMap {
    #[must_use]
    pub fn from_response(response: &MaskResponse) -> Self {
        let Some(Value::Object(result)) = &response.result else {
            return Self::default();
        };

        let tables = result
            .iter()
            .filter_map(|(table, columns)| {
                let active: BTreeMap<String, String> = columns
                    .as_object()?
                    .iter()
                    .filter_map(|(column, rule)| {
                        rule.pointer("/replace/value")
                            .and_then(Value::as_str)
                            .map(|value| (column.clone(), value.to_string()))
                    })
                    .collect();
                (!active.is_empty()).then(|| (table.clone(), active))
            })
            .collect();
        Self { tables }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Whether any column of `table` is masked.
    #[must_use]
    pub fn covers(&self, table: &str) -> bool {
        self.tables.contains_key(table)
    }

    /// The replacement for `table.column`, if masked.
    #[must_use]
    pub fn replacement(&self, table: &str, column: &str) -> Option<&str> {
        self.tables
            .get(table)
            .and_then(|columns| columns.get(column))
            .map(String::as_str)
    }

    /// Rewrites the projections of `core`.
    ///
    /// `tables` are the referenced tables as returned by
    /// `collect_tables`. A star (or empty) projection list is replaced by
    /// the full column list of every referenced table, which needs
    /// `resolver`. Explicit projections are masked in place.
    pub fn apply(
        &self,
        core: &mut SelectCore,
        tables: &[(String, Relation)],
        resolver: Option<&dyn ColumnResolver>,
    ) -> Result<()> {
        if !tables.iter().any(|(table, _)| self.covers(table)) {
            return Ok(());
        }

        let has_star = core.projections.is_empty()
            || core
                .projections
                .iter()
                .any(|projection| matches!(projection, Expr::Star(_)));
        if has_star {
            core.projections = self.expand(tables, resolver)?;
            return Ok(());
        }

        // A bare column is attributed to the table when only one is referenced.
        let sole = match tables {
            [(table, _)] => Some(table.as_str()),
            _ => None,
        };
        for projection in &mut core.projections {
            if let Some(masked) = self.mask_projection(projection, sole) {
                *projection = masked;
            }
        }
        Ok(())
    }

    fn expand(
        &self,
        tables: &[(String, Relation)],
        resolver: Option<&dyn ColumnResolver>,
    ) -> Result<Vec<Expr>> {
        let mut projections = Vec::new();
        for (table, relation) in tables {
            let columns = resolver
                .and_then(|resolver| resolver.columns(table))
                .ok_or_else(|| PolicyError::ResolverRequired(table.clone()))?;
            projections.extend(columns.into_iter().map(|column| {
                match self.replacement(table, &column) {
                    Some(replacement) => masked_literal(replacement, &column),
                    None => relation.col(column),
                }
            }));
        }
        Ok(projections)
    }

    fn mask_projection(&self, projection: &Expr, sole: Option<&str>) -> Option<Expr> {
        match projection {
            Expr::Attribute(attr) => {
                let table = attr.table_name().or(sole)?;
                self.replacement(table, &attr.name)
                    .map(|replacement| masked_literal(replacement, &attr.name))
            }
            Expr::Alias { expr, name } => match expr.as_ref() {
                Expr::Attribute(attr) => {
                    let table = attr.table_name().or(sole)?;
                    self.replacement(table, &attr.name)
                        .map(|replacement| masked_literal(replacement, name))
                }
                _ => None,
            },
            _ => None,
        }
    }
}

/// `'<replacement>' AS "<column>"`. The replacement is inlined with the
/// dialect's string escaping, never bound.
#[must_use]
pub fn masked_literal(replacement: &str, column: &str) -> Expr {
    inline(replacement).alias(column)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use sqltree_core::ast::Table;

    fn masks(result: Value) -> MaskMap {
        MaskMap::from_response(&MaskResponse {
            result: Some(result),
        })
    }

    #[test]
    fn test_only_string_replacements_are_active() {
        let map = masks(json!({
            "orders": {
                "total": {"replace": {"value": "***"}},
                "account": {"replace": {"value": {}}},
                "note": {"replace": {}},
                "id": 1
            },
            "users": {"email": {"replace": {"value": 0}}},
            "junk": "nope"
        }));
        assert_eq!(map.replacement("orders", "total"), Some("***"));
        assert_eq!(map.replacement("orders", "account"), None);
        assert_eq!(map.replacement("orders", "note"), None);
        assert!(!map.covers("users"));
        assert!(!map.covers("junk"));
    }

    #[test]
    fn test_absent_result_means_no_masks() {
        assert!(MaskMap::from_response(&MaskResponse::default()).is_empty());
        assert!(masks(json!([])).is_empty());
    }

    #[test]
    fn test_explicit_projections_are_masked_in_place() {
        let orders = Table::new("orders");
        let tables = vec![(String::from("orders"), Relation::from(&orders))];
        let mut core = SelectCore {
            projections: vec![
                orders.col("id"),
                orders.col("total").alias("amount"),
                Expr::column("total"),
            ],
            ..SelectCore::default()
        };

        masks(json!({"orders": {"total": {"replace": {"value": "0"}}}}))
            .apply(&mut core, &tables, None)
            .unwrap();

        assert_eq!(
            core.projections,
            vec![
                orders.col("id"),
                masked_literal("0", "amount"),
                masked_literal("0", "total"),
            ]
        );
    }

    #[test]
    fn test_star_needs_a_resolver() {
        let orders = Table::new("orders");
        let tables = vec![(String::from("orders"), Relation::from(&orders))];
        let mut core = SelectCore::default();

        let err = masks(json!({"orders": {"total": {"replace": {"value": "x"}}}}))
            .apply(&mut core, &tables, None)
            .unwrap_err();
        assert!(matches!(err, PolicyError::ResolverRequired(table) if table == "orders"));
    }

    #[test]
    fn test_unmasked_tables_are_left_alone() {
        let users = Table::new("users");
        let tables = vec![(String::from("users"), Relation::from(&users))];
        let mut core = SelectCore::default();

        masks(json!({"orders": {"total": {"replace": {"value": "x"}}}}))
            .apply(&mut core, &tables, None)
            .unwrap();
        assert!(core.projections.is_empty());
    }
}
