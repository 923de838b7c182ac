//! # sqltree-plugins
//!
//! Ready-made transformers for `sqltree-core`:
//!
//! - [`SoftDelete`] hides rows whose soft-delete column is set
//! - [`Policy`] filters rows and masks columns according to an external
//!   OPA-compatible policy service
//!
//! ```rust
//! use sqltree_core::ast::Table;
//! use sqltree_core::{Renderer, Select};
//! use sqltree_plugins::SoftDelete;
//!
//! let users = Table::new("users");
//! let rendered = Select::new()
//!     .from(&users)
//!     .use_transformer(SoftDelete::default())
//!     .to_sql(&Renderer::postgres())
//!     .unwrap();
//!
//! assert_eq!(
//!     rendered.sql,
//!     r#"SELECT * FROM "users" WHERE "users"."deleted_at" IS NULL"#
//! );
//! ```

pub mod error;
pub mod policy;
pub mod soft_delete;

pub use error::{PolicyError, Result};
pub use policy::{HttpPolicyClient, Policy, PolicyClient, PolicyConfig};
pub use soft_delete::{SoftDelete, SoftDeleteScope};
