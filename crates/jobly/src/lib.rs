//! # jobly
//!
//! Data access for a companies/jobs backend on PostgreSQL.
//!
//! The pieces that build SQL are pure functions that return a
//! [`SqlFragment`]: a clause with `$1, $2, ...` placeholders plus the values
//! that bind to them.
//!
//! - [`build_partial_update`]: fields to change → `"col"=$1, "col2"=$2`
//! - [`build_filter_clause`]: query-string filters → `name ILIKE $1 AND ...`
//!
//! The [`models`] layer splices those fragments into full statements and runs
//! them through any [`GenericClient`].
//!
//! ```ignore
//! use jobly::{Company, DbConfig, connect};
//! use serde_json::json;
//!
//! let client = connect(&DbConfig::from_env()).await?;
//!
//! let filters = json!({"name": "net", "minEmployees": "10"});
//! let companies = Company::find_all(&client, filters.as_object().unwrap()).await?;
//!
//! let changes = json!({"numEmployees": 42, "logoUrl": null});
//! let updated = Company::update(&client, "anderson", changes.as_object().unwrap()).await?;
//! ```

pub mod client;
pub mod column;
pub mod config;
pub mod db;
pub mod error;
pub mod fragment;
pub mod models;
pub mod row;
pub mod value;

pub use client::GenericClient;
pub use column::ColumnName;
pub use config::{DbConfig, Environment};
pub use db::{connect, connect_url};
pub use error::{JoblyError, JoblyResult};
pub use fragment::{
    ColumnAliases, FieldMap, FilterColumns, FilterMap, SqlFragment, build_filter_clause,
    build_partial_update,
};
pub use models::{Company, CompanyDetail, Job, NewCompany, NewJob};
pub use row::{FromRow, RowExt};
pub use value::SqlValue;

/// DDL for the `companies` and `jobs` tables.
pub const SCHEMA_SQL: &str = include_str!("../sql/schema.sql");
