//! Row filtering and column masking driven by an external policy service.
//!
//! For each base table a statement touches, [`Policy`] asks the service
//! to partially evaluate the configured rule with `data.<table>` left
//! unknown. The residual queries become WHERE predicates; an empty
//! answer is a deny and aborts rendering. SELECTs additionally fetch the
//! masks document and replace masked columns with inline literals.
//!
//! ```rust,no_run
//! use serde_json::json;
//! use sqltree_core::ast::Table;
//! use sqltree_core::{Renderer, Select};
//! use sqltree_plugins::policy::{Policy, PolicyConfig};
//!
//! let config = PolicyConfig::new("http://localhost:8181", "app/orders/allow");
//! let policy = Policy::new(&config, json!({"tenant": "acme"})).unwrap();
//!
//! let orders = Table::new("orders");
//! let rendered = Select::new()
//!     .from(&orders)
//!     .use_transformer(policy)
//!     .to_sql(&Renderer::postgres());
//! ```

mod client;
mod mask;
mod translate;

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqltree_core::ast::{DeleteStatement, Expr, Relation, SelectCore, UpdateStatement};
use sqltree_core::schema::ColumnResolver;
use sqltree_core::transform::collect_tables;
use sqltree_core::{BoxError, Transformer};

pub use client::{
    CompileRequest, CompileResponse, CompileResult, HttpPolicyClient, MaskResponse, PolicyClient,
};
pub use mask::{masked_literal, MaskMap};
pub use translate::{escape_like, expression, row_filter};

use crate::error::Result;

const DEFAULT_TIMEOUT_SECS: u64 = 5;

const fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

/// Where the policy service lives and which rule to evaluate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyConfig {
    /// Service root, e.g. `http://localhost:8181`.
    pub base_url: String,
    /// Rule path, slash- or dot-separated, with or without `data.`.
    pub policy_path: String,
    /// Per-request timeout.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl PolicyConfig {
    #[must_use]
    pub fn new(base_url: impl Into<String>, policy_path: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            policy_path: policy_path.into(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    #[must_use]
    pub const fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// The rule as a dotted reference under `data`.
    #[must_use]
    pub fn data_path(&self) -> String {
        let path = self
            .policy_path
            .trim_matches(|c| c == '/' || c == '.')
            .replace('/', ".");
        let path = path.strip_prefix("data.").unwrap_or(&path);
        if path.is_empty() || path == "data" {
            String::from("data")
        } else {
            format!("data.{path}")
        }
    }

    /// The query sent for partial evaluation.
    #[must_use]
    pub fn compile_query(&self) -> String {
        format!("{} == true", self.data_path())
    }

    #[must_use]
    pub fn compile_url(&self) -> String {
        format!("{}/v1/compile", self.base_url.trim_end_matches('/'))
    }

    /// The data API URL of the masks document, a sibling of the rule.
    #[must_use]
    pub fn masks_url(&self) -> String {
        let path = self.data_path();
        let mut segments: Vec<&str> = path.split('.').skip(1).collect();
        match segments.last_mut() {
            Some(last) => *last = "masks",
            None => segments.push("masks"),
        }
        format!(
            "{}/v1/data/{}",
            self.base_url.trim_end_matches('/'),
            segments.join("/")
        )
    }
}

/// The policy transformer.
#[derive(Clone)]
pub struct Policy {
    client: Arc<dyn PolicyClient>,
    query: String,
    input: Value,
    resolver: Option<Arc<dyn ColumnResolver>>,
}

impl fmt::Debug for Policy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Policy")
            .field("query", &self.query)
            .field("input", &self.input)
            .field("resolver", &self.resolver.is_some())
            .finish_non_exhaustive()
    }
}

impl Policy {
    /// A transformer talking HTTP to the configured service.
    pub fn new(config: &PolicyConfig, input: Value) -> Result<Self> {
        let client = HttpPolicyClient::new(config)?;
        Ok(Self::with_client(config, client, input))
    }

    /// A transformer using a custom transport.
    pub fn with_client(
        config: &PolicyConfig,
        client: impl PolicyClient + 'static,
        input: Value,
    ) -> Self {
        Self {
            client: Arc::new(client),
            query: config.compile_query(),
            input,
            resolver: None,
        }
    }

    /// Supplies table columns for masking `SELECT *`.
    #[must_use]
    pub fn resolver(mut self, resolver: impl ColumnResolver + 'static) -> Self {
        self.resolver = Some(Arc::new(resolver));
        self
    }

    /// The row filter for one table, `None` when access is unconditional.
    fn row_filter(&self, table: &str, relation: &Relation) -> Result<Option<Expr>> {
        let request = CompileRequest {
            query: self.query.clone(),
            input: self.input.clone(),
            unknowns: vec![format!("data.{table}")],
        };
        tracing::debug!(table, query = %self.query, "compiling policy");
        let response = self.client.compile(&request)?;
        let queries = response.queries().unwrap_or_default();
        let filter = row_filter(table, queries, relation)?;
        if filter.is_none() {
            tracing::debug!(table, "policy allows unconditionally");
        }
        Ok(filter)
    }

    fn select(&self, mut core: SelectCore) -> Result<SelectCore> {
        let tables = collect_tables(&core);
        if tables.is_empty() {
            return Ok(core);
        }
        for (table, relation) in &tables {
            core.wheres.extend(self.row_filter(table, relation)?);
        }

        tracing::debug!(tables = tables.len(), "fetching policy masks");
        let masks = MaskMap::from_response(&self.client.masks(&self.input)?);
        masks.apply(&mut core, &tables, self.resolver.as_deref())?;
        Ok(core)
    }

    fn target_filter(&self, target: &Relation) -> Result<Option<Expr>> {
        match target.base_table() {
            Some(table) => self.row_filter(&table.name, target),
            None => Ok(None),
        }
    }
}

impl Transformer for Policy {
    fn name(&self) -> &str {
        "policy"
    }

    fn transform_select(&self, core: SelectCore) -> std::result::Result<SelectCore, BoxError> {
        Ok(self.select(core)?)
    }

    fn transform_update(
        &self,
        mut stmt: UpdateStatement,
    ) -> std::result::Result<UpdateStatement, BoxError> {
        stmt.wheres.extend(self.target_filter(&stmt.table)?);
        Ok(stmt)
    }

    fn transform_delete(
        &self,
        mut stmt: DeleteStatement,
    ) -> std::result::Result<DeleteStatement, BoxError> {
        stmt.wheres.extend(self.target_filter(&stmt.table)?);
        Ok(stmt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_paths_are_normalised() {
        for path in ["app/orders/allow", "data.app.orders.allow", "/app/orders/allow/"] {
            let config = PolicyConfig::new("http://opa:8181/", path);
            assert_eq!(config.data_path(), "data.app.orders.allow", "{path}");
            assert_eq!(config.compile_query(), "data.app.orders.allow == true");
            assert_eq!(config.compile_url(), "http://opa:8181/v1/compile");
            assert_eq!(config.masks_url(), "http://opa:8181/v1/data/app/orders/masks");
        }
    }

    #[test]
    fn test_config_deserialises_with_default_timeout() {
        let config: PolicyConfig = serde_json::from_str(
            r#"{"base_url": "http://opa:8181", "policy_path": "authz/allow"}"#,
        )
        .unwrap();
        assert_eq!(config.timeout(), Duration::from_secs(5));
        assert_eq!(config.masks_url(), "http://opa:8181/v1/data/authz/masks");
        assert_eq!(config.with_timeout_secs(1).timeout_secs, 1);
    }
}
