use serde::Serialize;

use crate::ValidationError;

const SELECT_ALL: &str = "*";

/// One SoQL query: projection, filtering, grouping, ordering and paging.
///
/// Every field is kept as the caller wrote it; no coercion happens here.
/// Values are immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryParameters {
    select: String,
    #[serde(rename = "where")]
    filter: Option<String>,
    order: Option<String>,
    group: Option<String>,
    having: Option<String>,
    limit: Option<String>,
    offset: Option<String>,
}

impl Default for QueryParameters {
    fn default() -> Self {
        Self {
            select: String::from(SELECT_ALL),
            filter: None,
            order: None,
            group: None,
            having: None,
            limit: None,
            offset: None,
        }
    }
}

impl QueryParameters {
    pub fn builder() -> QueryParametersBuilder {
        QueryParametersBuilder::default()
    }

    pub fn select(&self) -> &str {
        &self.select
    }

    pub fn filter(&self) -> Option<&str> {
        self.filter.as_deref()
    }

    pub fn order(&self) -> Option<&str> {
        self.order.as_deref()
    }

    pub fn group(&self) -> Option<&str> {
        self.group.as_deref()
    }

    pub fn having(&self) -> Option<&str> {
        self.having.as_deref()
    }

    pub fn limit(&self) -> Option<&str> {
        self.limit.as_deref()
    }

    pub fn offset(&self) -> Option<&str> {
        self.offset.as_deref()
    }

    /// Serializes into SODA2 query-string pairs.
    ///
    /// Keys carry the `$` prefix that marks them as SoQL directives rather
    /// than column filters. Absent fields are omitted.
    pub fn to_wire(&self) -> Vec<(String, String)> {
        self.fields()
            .into_iter()
            .filter_map(|(name, value)| value.map(|value| (format!("${name}"), value.to_owned())))
            .collect()
    }

    /// Keys [`to_wire`](Self::to_wire) would emit, in order.
    pub fn wire_keys(&self) -> Vec<String> {
        self.to_wire().into_iter().map(|(key, _)| key).collect()
    }

    fn fields(&self) -> [(&'static str, Option<&str>); 7] {
        [
            ("select", Some(self.select.as_str())),
            ("where", self.filter()),
            ("order", self.order()),
            ("group", self.group()),
            ("having", self.having()),
            ("limit", self.limit()),
            ("offset", self.offset()),
        ]
    }
}

/// Consuming builder for [`QueryParameters`].
#[derive(Debug, Clone, Default)]
pub struct QueryParametersBuilder {
    select: Option<String>,
    filter: Option<String>,
    order: Option<String>,
    group: Option<String>,
    having: Option<String>,
    limit: Option<String>,
    offset: Option<String>,
}

impl QueryParametersBuilder {
    pub fn select(mut self, value: impl Into<String>) -> Self {
        self.select = Some(value.into());
        self
    }

    /// Sets the `$where` predicate.
    pub fn filter(mut self, value: impl Into<String>) -> Self {
        self.filter = Some(value.into());
        self
    }

    pub fn order(mut self, value: impl Into<String>) -> Self {
        self.order = Some(value.into());
        self
    }

    pub fn group(mut self, value: impl Into<String>) -> Self {
        self.group = Some(value.into());
        self
    }

    pub fn having(mut self, value: impl Into<String>) -> Self {
        self.having = Some(value.into());
        self
    }

    pub fn limit(mut self, value: impl Into<String>) -> Self {
        self.limit = Some(value.into());
        self
    }

    pub fn offset(mut self, value: impl Into<String>) -> Self {
        self.offset = Some(value.into());
        self
    }

    /// Validates and freezes the query.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyQueryValue`] for any field set to an
    /// empty or whitespace-only string.
    pub fn build(self) -> Result<QueryParameters, ValidationError> {
        Ok(QueryParameters {
            select: non_blank("select", self.select)?.unwrap_or_else(|| String::from(SELECT_ALL)),
            filter: non_blank("where", self.filter)?,
            order: non_blank("order", self.order)?,
            group: non_blank("group", self.group)?,
            having: non_blank("having", self.having)?,
            limit: non_blank("limit", self.limit)?,
            offset: non_blank("offset", self.offset)?,
        })
    }
}

fn non_blank(field: &'static str, value: Option<String>) -> Result<Option<String>, ValidationError> {
    match value {
        Some(value) if value.trim().is_empty() => Err(ValidationError::EmptyQueryValue { field }),
        other => Ok(other),
    }
}
