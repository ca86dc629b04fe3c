//! Reusable Query object
//!
//! Represents a complete store read that can be executed multiple times

use super::filters::Filter;

#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub table: String,
    pub select: Option<Vec<String>>,
    pub filter: Option<Filter>,
    pub limit: Option<u32>,
}

impl Query {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            select: None,
            filter: None,
            limit: None,
        }
    }

    /// Full request URL, logged with each read
    pub fn to_url(&self, base_url: &str) -> String {
        let mut url = crate::api::constants::table_endpoint(base_url, &self.table);
        let params: Vec<String> = self
            .to_query_params()
            .into_iter()
            .map(|(k, v)| format!("{}={}", urlencoding::encode(&k), urlencoding::encode(&v)))
            .collect();

        if !params.is_empty() {
            url.push('?');
            url.push_str(&params.join("&"));
        }

        url
    }

    /// Query parameters in request order, unencoded
    pub fn to_query_params(&self) -> Vec<(String, String)> {
        let mut params = Vec::new();

        if let Some(select) = &self.select {
            params.push(("select".to_string(), select.join(",")));
        }

        if let Some(filter) = &self.filter {
            params.push(filter.to_query_pair());
        }

        if let Some(limit) = self.limit {
            params.push(("limit".to_string(), limit.to_string()));
        }

        params
    }
}
