//! Statement builders.
//!
//! Builders own an AST and an ordered transformer pipeline. Methods take
//! the builder by value and return it, so statements read as a chain:
//!
//! ```rust
//! use sqltree_core::builder::{count_star, Select};
//! use sqltree_core::ast::Table;
//! use sqltree_core::render::Renderer;
//!
//! let orders = Table::new("orders");
//! let rendered = Select::new()
//!     .from(&orders)
//!     .select([orders.col("customer_id"), count_star().alias("n")])
//!     .group([orders.col("customer_id")])
//!     .having(count_star().gt(10))
//!     .to_sql(&Renderer::postgres())
//!     .unwrap();
//!
//! assert_eq!(
//!     rendered.sql,
//!     r#"SELECT "orders"."customer_id", COUNT(*) AS "n" FROM "orders" GROUP BY "orders"."customer_id" HAVING COUNT(*) > $1"#
//! );
//! ```

mod delete;
mod expr;
mod insert;
mod select;
mod update;

pub use delete::Delete;
pub use expr::{
    all, any, avg, bind, case, cast, col, count, count_star, cube, cume_dist, dense_rank,
    excluded, exists, extract, first_value, func, grouping_sets, inline, lag, last_value, lead, lit,
    max, min, not_exists, nth_value, ntile, null, percent_rank, rank, rollup, row_number, sql, star,
    subquery, sum, table,
};
pub use insert::Insert;
pub use select::{Compound, Select};
pub use update::Update;
