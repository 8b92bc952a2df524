use serde_json::Value;

/// A single filter clause applied to a collection read or write.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// `column = value`
    Eq(String, Value),
    /// `column IN (values...)`
    In(String, Vec<Value>),
    /// OR-combined case-insensitive pattern matches, e.g. free-text search
    /// over several columns at once.
    OrIlike(Vec<(String, String)>),
}

/// Builder for a filtered, ordered, paginated collection query.
///
/// Rendered as PostgREST query parameters by the gateway; evaluated directly
/// by test doubles.
#[derive(Debug, Clone, Default)]
pub struct Query {
    select: Option<String>,
    filters: Vec<Filter>,
    order: Option<(String, bool)>,
    limit: Option<usize>,
    offset: Option<usize>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    /// Column projection, including embedded resources such as
    /// `*, product:products(*)`.
    pub fn select(mut self, expr: &str) -> Self {
        self.select = Some(expr.to_string());
        self
    }

    pub fn eq(mut self, column: &str, value: Value) -> Self {
        self.filters.push(Filter::Eq(column.to_string(), value));
        self
    }

    pub fn is_in(mut self, column: &str, values: Vec<Value>) -> Self {
        self.filters.push(Filter::In(column.to_string(), values));
        self
    }

    /// OR-combination of ILIKE clauses over `(column, pattern)` pairs.
    /// Patterns use `*` as the wildcard, as PostgREST expects in URLs.
    pub fn or_ilike(mut self, clauses: &[(&str, &str)]) -> Self {
        self.filters.push(Filter::OrIlike(
            clauses
                .iter()
                .map(|(c, p)| (c.to_string(), p.to_string()))
                .collect(),
        ));
        self
    }

    pub fn order(mut self, column: &str, ascending: bool) -> Self {
        self.order = Some((column.to_string(), ascending));
        self
    }

    /// Inclusive row range `[start, end]`, rendered as limit/offset.
    pub fn range(mut self, start: usize, end: usize) -> Self {
        self.offset = Some(start);
        self.limit = Some(end.saturating_sub(start) + 1);
        self
    }

    pub fn selection(&self) -> Option<&str> {
        self.select.as_deref()
    }

    pub fn filters(&self) -> &[Filter] {
        &self.filters
    }

    pub fn order_by(&self) -> Option<(&str, bool)> {
        self.order.as_ref().map(|(c, asc)| (c.as_str(), *asc))
    }

    pub fn limit(&self) -> Option<usize> {
        self.limit
    }

    pub fn offset(&self) -> Option<usize> {
        self.offset
    }

    /// Render as PostgREST query parameters.
    pub fn to_params(&self) -> Vec<(String, String)> {
        let mut params = Vec::new();
        if let Some(select) = &self.select {
            params.push(("select".to_string(), select.clone()));
        }
        for filter in &self.filters {
            match filter {
                Filter::Eq(column, value) => {
                    params.push((column.clone(), format!("eq.{}", literal(value))));
                }
                Filter::In(column, values) => {
                    let list = values.iter().map(literal).collect::<Vec<_>>().join(",");
                    params.push((column.clone(), format!("in.({list})")));
                }
                Filter::OrIlike(clauses) => {
                    let body = clauses
                        .iter()
                        .map(|(c, p)| format!("{c}.ilike.{p}"))
                        .collect::<Vec<_>>()
                        .join(",");
                    params.push(("or".to_string(), format!("({body})")));
                }
            }
        }
        if let Some((column, ascending)) = &self.order {
            let dir = if *ascending { "asc" } else { "desc" };
            params.push(("order".to_string(), format!("{column}.{dir}")));
        }
        if let Some(limit) = self.limit {
            params.push(("limit".to_string(), limit.to_string()));
        }
        if let Some(offset) = self.offset {
            params.push(("offset".to_string(), offset.to_string()));
        }
        params
    }
}

/// Filter operands are rendered bare: strings without JSON quoting, other
/// scalars via their JSON form.
fn literal(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
