//! Store API Module
//!
//! Typed access to the relational store behind its REST gateway: structured
//! filter queries, conflict-aware bulk writes, and the [`Store`] seam the
//! reconciliation pipeline is written against.

pub mod client;
pub mod constants;
pub mod operations;
pub mod query;
pub mod store;

pub use client::StoreClient;
pub use operations::{Resolution, Returning, Write, WriteResult};
pub use query::{Filter, FilterValue, Query, QueryBuilder, QueryResult};
pub use store::Store;
