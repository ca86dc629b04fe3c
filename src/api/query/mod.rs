//! Store Query Builder Module
//!
//! Provides fluent API for building and executing filtered reads against the store.
//! Follows the same pattern as operations with Query (reusable) and QueryBuilder (fluent).

pub mod builder;
pub mod filters;
pub mod query;
pub mod result;

pub use builder::QueryBuilder;
pub use filters::{Filter, FilterValue};
pub use query::Query;
pub use result::QueryResult;
