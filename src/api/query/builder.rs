//! QueryBuilder for fluent query construction
//!
//! Provides a fluent API that builds Query objects for execution

use super::filters::Filter;
use super::query::Query;
use super::result::QueryResult;
use crate::api::store::Store;

#[derive(Debug, Clone)]
pub struct QueryBuilder {
    query: Query,
}

impl QueryBuilder {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            query: Query::new(table),
        }
    }

    /// Select specific columns
    pub fn select(mut self, fields: &[&str]) -> Self {
        self.query.select = Some(fields.iter().map(|f| f.to_string()).collect());
        self
    }

    /// Add filter condition. A second call is AND-ed with the first.
    pub fn filter(mut self, filter: Filter) -> Self {
        self.query.filter = Some(match self.query.filter.take() {
            None => filter,
            Some(Filter::And(mut existing)) => {
                existing.push(filter);
                Filter::And(existing)
            }
            Some(existing) => Filter::and(vec![existing, filter]),
        });
        self
    }

    /// Limit number of results
    pub fn limit(mut self, limit: u32) -> Self {
        self.query.limit = Some(limit);
        self
    }

    /// Build the final Query object (reusable)
    pub fn build(self) -> Query {
        self.query
    }

    /// Build and execute immediately
    pub async fn execute(self, store: &dyn Store) -> anyhow::Result<QueryResult> {
        let query = self.build();
        store.select(&query).await
    }
}
