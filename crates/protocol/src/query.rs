//! Query-string encoding for the generic table endpoint.
//!
//! Every tabular report the server can render is addressed by a `queryid`
//! plus optional column filters, a row limit, and an optional foreign-key
//! scope. Filters travel as two positionally paired comma-joined lists:
//! `searchcol` carries the column indices and `key` carries one
//! `_<operator>_<value>` token per filter, in the same order.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Comparison operator of a column filter.
///
/// The operator name is embedded verbatim in the `key` token, e.g.
/// `_<exact>_42` or `_<contains>_pump`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterOp {
    Exact,
    Contains,
}

impl FilterOp {
    pub fn as_str(self) -> &'static str {
        match self {
            FilterOp::Exact => "exact",
            FilterOp::Contains => "contains",
        }
    }
}

impl fmt::Display for FilterOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FilterOp {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "exact" => Ok(FilterOp::Exact),
            "contains" => Ok(FilterOp::Contains),
            _ => Err(()),
        }
    }
}

/// A single column filter of a table query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filter {
    /// Server-side column index the filter applies to.
    pub column: u32,
    /// Comparison operator.
    pub op: FilterOp,
    /// Filter value, transmitted as-is inside the key token.
    pub value: String,
}

impl Filter {
    /// Renders the `key` token for this filter: `_<op>_value`.
    pub fn key_token(&self) -> String {
        format!("_<{}>_{}", self.op, self.value)
    }
}

/// Foreign-key scope for relationship listings, e.g. the running tickets
/// of one staff member. The name is transmitted verbatim; the server
/// expects the operator to be part of it (`_<arrayoverlaps>_…`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignScope {
    pub name: String,
    pub value: String,
}

/// A fully described table query, immutable once built.
///
/// Translated 1:1 into request query parameters by [`QuerySpec::to_params`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuerySpec {
    /// Server-side identifier of the predefined report to run.
    pub query_id: String,
    /// Column filters, order-preserving.
    pub filters: Vec<Filter>,
    /// Maximum number of rows the server should return.
    pub limit: Option<u32>,
    /// Optional foreign-key scope.
    pub foreign: Option<ForeignScope>,
}

impl QuerySpec {
    /// Creates a spec for the named server-side query.
    pub fn new(query_id: impl Into<String>) -> Self {
        Self {
            query_id: query_id.into(),
            filters: Vec::new(),
            limit: None,
            foreign: None,
        }
    }

    /// Appends a column filter, preserving insertion order.
    pub fn filter(mut self, column: u32, op: FilterOp, value: impl Into<String>) -> Self {
        self.filters.push(Filter {
            column,
            op,
            value: value.into(),
        });
        self
    }

    /// Sets the maximum row count (`maxrows`).
    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Scopes the query to rows linked to a foreign entity.
    pub fn with_foreign(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.foreign = Some(ForeignScope {
            name: name.into(),
            value: value.into(),
        });
        self
    }

    /// Encodes the spec as request query parameters.
    ///
    /// `searchcol` and `key` always come out with equal cardinality and in
    /// the order the filters were added.
    pub fn to_params(&self) -> Vec<(String, String)> {
        let mut params = vec![("queryid".to_string(), self.query_id.clone())];

        if !self.filters.is_empty() {
            let columns = self
                .filters
                .iter()
                .map(|f| f.column.to_string())
                .collect::<Vec<_>>()
                .join(",");
            let keys = self
                .filters
                .iter()
                .map(Filter::key_token)
                .collect::<Vec<_>>()
                .join(",");
            params.push(("searchcol".to_string(), columns));
            params.push(("key".to_string(), keys));
        }

        if let Some(limit) = self.limit {
            params.push(("maxrows".to_string(), limit.to_string()));
        }

        if let Some(foreign) = &self.foreign {
            params.push(("foreignUNIDName".to_string(), foreign.name.clone()));
            params.push(("foreignUNIDValue".to_string(), foreign.value.clone()));
        }

        params
    }
}
