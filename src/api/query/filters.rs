//! Store filter building
//!
//! Provides type-safe filter construction for the store's horizontal
//! filtering grammar (`field=op.value`, `or=(...)`, `and=(...)`).

#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    // Comparison operators
    Eq(String, FilterValue),
    Neq(String, FilterValue),

    // Set membership
    In(String, Vec<FilterValue>),

    // Case-insensitive pattern match
    ILike(String, String),

    IsNull(String),

    // Logical operators
    And(Vec<Filter>),
    Or(Vec<Filter>),
    Not(Box<Filter>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    String(String),
    Integer(i64),
    Boolean(bool),
    Null,
}

impl Filter {
    pub fn eq(field: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        Self::Eq(field.into(), value.into())
    }

    pub fn neq(field: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        Self::Neq(field.into(), value.into())
    }

    pub fn in_list<V, I>(field: impl Into<String>, values: I) -> Self
    where
        V: Into<FilterValue>,
        I: IntoIterator<Item = V>,
    {
        Self::In(field.into(), values.into_iter().map(Into::into).collect())
    }

    /// Case-insensitive exact match. Pattern metacharacters in `value` are
    /// escaped so it only matches itself.
    pub fn ieq(field: impl Into<String>, value: &str) -> Self {
        Self::ILike(field.into(), escape_like(value))
    }

    pub fn is_null(field: impl Into<String>) -> Self {
        Self::IsNull(field.into())
    }

    pub fn and(filters: Vec<Filter>) -> Self {
        Self::And(filters)
    }

    pub fn or(filters: Vec<Filter>) -> Self {
        Self::Or(filters)
    }

    pub fn not(filter: Filter) -> Self {
        Self::Not(Box::new(filter))
    }

    /// Render as a top-level query parameter, e.g. `("sku_code", "in.(A,B)")`
    /// or `("or", "(name.eq.x,name.eq.y)")`.
    pub fn to_query_pair(&self) -> (String, String) {
        let (key, value, _) = self.parts();
        (key, value)
    }

    /// Render as an item nested inside `and(...)` / `or(...)`.
    pub fn to_nested_string(&self) -> String {
        let (key, value, logical) = self.parts();
        if logical {
            format!("{}{}", key, value)
        } else {
            format!("{}.{}", key, value)
        }
    }

    /// (key, operator expression, is_logical)
    fn parts(&self) -> (String, String, bool) {
        match self {
            Filter::Eq(field, value) => (field.clone(), format!("eq.{}", value.to_filter_string()), false),
            Filter::Neq(field, value) => (field.clone(), format!("neq.{}", value.to_filter_string()), false),
            Filter::In(field, values) => {
                let items: Vec<String> = values.iter().map(|v| v.to_filter_string()).collect();
                (field.clone(), format!("in.({})", items.join(",")), false)
            }
            Filter::ILike(field, pattern) => (field.clone(), format!("ilike.{}", quote_if_needed(pattern)), false),
            Filter::IsNull(field) => (field.clone(), "is.null".to_string(), false),
            Filter::And(filters) => ("and".to_string(), group(filters), true),
            Filter::Or(filters) => ("or".to_string(), group(filters), true),
            Filter::Not(inner) => {
                let (key, value, logical) = inner.parts();
                if logical {
                    (format!("not.{}", key), value, true)
                } else {
                    (key, format!("not.{}", value), false)
                }
            }
        }
    }
}

fn group(filters: &[Filter]) -> String {
    let items: Vec<String> = filters.iter().map(|f| f.to_nested_string()).collect();
    format!("({})", items.join(","))
}

impl FilterValue {
    pub fn to_filter_string(&self) -> String {
        match self {
            FilterValue::String(s) => quote_if_needed(s),
            FilterValue::Integer(i) => i.to_string(),
            FilterValue::Boolean(b) => b.to_string(),
            FilterValue::Null => "null".to_string(),
        }
    }
}

/// Double-quote values containing grammar characters; `"` and `\` are
/// backslash-escaped inside quotes.
pub fn quote_if_needed(raw: &str) -> String {
    let reserved = matches!(raw, "null" | "true" | "false");
    let needs_quotes = raw.is_empty()
        || reserved
        || raw
            .chars()
            .any(|c| matches!(c, ',' | '.' | ':' | '(' | ')' | '"' | '\\') || c.is_whitespace());

    if !needs_quotes {
        return raw.to_string();
    }

    let mut out = String::with_capacity(raw.len() + 2);
    out.push('"');
    for c in raw.chars() {
        if c == '"' || c == '\\' {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('"');
    out
}

/// Escape LIKE metacharacters so the value matches literally
pub fn escape_like(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

impl From<String> for FilterValue {
    fn from(value: String) -> Self {
        FilterValue::String(value)
    }
}

impl From<&str> for FilterValue {
    fn from(value: &str) -> Self {
        FilterValue::String(value.to_string())
    }
}

impl From<&String> for FilterValue {
    fn from(value: &String) -> Self {
        FilterValue::String(value.clone())
    }
}

impl From<i64> for FilterValue {
    fn from(value: i64) -> Self {
        FilterValue::Integer(value)
    }
}

impl From<i32> for FilterValue {
    fn from(value: i32) -> Self {
        FilterValue::Integer(value as i64)
    }
}

impl From<bool> for FilterValue {
    fn from(value: bool) -> Self {
        FilterValue::Boolean(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comparison_filters() {
        assert_eq!(Filter::eq("brand_id", 7).to_query_pair(), ("brand_id".to_string(), "eq.7".to_string()));
        assert_eq!(Filter::neq("name", "Acme").to_nested_string(), "name.neq.Acme");
        assert_eq!(Filter::is_null("sku_id").to_nested_string(), "sku_id.is.null");
    }

    #[test]
    fn test_in_list() {
        let filter = Filter::in_list("sku_code", ["A-1", "B 2"]);
        assert_eq!(filter.to_query_pair(), ("sku_code".to_string(), "in.(A-1,\"B 2\")".to_string()));
    }

    #[test]
    fn test_logical_operators() {
        let or_filter = Filter::or(vec![
            Filter::and(vec![Filter::eq("brand_id", 1), Filter::eq("sku_code", "X1")]),
            Filter::and(vec![Filter::eq("brand_id", 2), Filter::eq("sku_code", "X1")]),
        ]);
        assert_eq!(
            or_filter.to_query_pair(),
            (
                "or".to_string(),
                "(and(brand_id.eq.1,sku_code.eq.X1),and(brand_id.eq.2,sku_code.eq.X1))".to_string()
            )
        );
    }

    #[test]
    fn test_not_placement() {
        assert_eq!(
            Filter::not(Filter::eq("batch_no", "B1")).to_query_pair(),
            ("batch_no".to_string(), "not.eq.B1".to_string())
        );
        let negated_group = Filter::not(Filter::or(vec![Filter::eq("a", 1), Filter::eq("b", 2)]));
        assert_eq!(negated_group.to_query_pair(), ("not.or".to_string(), "(a.eq.1,b.eq.2)".to_string()));
        assert_eq!(negated_group.to_nested_string(), "not.or(a.eq.1,b.eq.2)");
    }

    #[test]
    fn test_reserved_characters_are_quoted() {
        assert_eq!(quote_if_needed("Smith, Jones"), "\"Smith, Jones\"");
        assert_eq!(quote_if_needed("v1.2"), "\"v1.2\"");
        assert_eq!(quote_if_needed("say \"hi\""), "\"say \\\"hi\\\"\"");
        assert_eq!(quote_if_needed("null"), "\"null\"");
        assert_eq!(quote_if_needed("PLAIN-123"), "PLAIN-123");
    }

    #[test]
    fn test_ieq_escapes_like_metacharacters() {
        let filter = Filter::ieq("name", "50%_off");
        assert_eq!(filter, Filter::ILike("name".to_string(), "50\\%\\_off".to_string()));
        assert_eq!(filter.to_query_pair().1, "ilike.\"50\\\\%\\\\_off\"");
    }
}
