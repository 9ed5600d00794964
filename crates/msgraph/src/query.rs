//! OData query options for Microsoft Graph requests
//!
//! A [`Query`] is an ordered list of [`QueryOption`]s rendered into a single
//! form-URL-encoded query string. Options are rendered in the order they were
//! added and are never deduplicated: adding two `$select` options yields two
//! `%24select=` pairs.
//!
//! ```rust
//! use msgraph::query::{OrderDirection, Query, QueryOption};
//!
//! let mut query = Query::new();
//! query
//!     .add_option(QueryOption::select(["displayName", "mail"]))
//!     .add_option(QueryOption::order_by([("displayName", OrderDirection::Ascending)]))
//!     .add_option(QueryOption::Top(10));
//!
//! assert_eq!(
//!     query.render(),
//!     "%24select=displayName%2Cmail&%24orderby=displayName+asc&%24top=10"
//! );
//! ```

use std::fmt;

use url::{form_urlencoded, Url};

// ============================================================================
// Sort direction
// ============================================================================

/// Sort direction for an `$orderby` property
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OrderDirection {
    /// Sort results in ascending order
    #[default]
    Ascending,
    /// Sort results in descending order
    Descending,
}

impl OrderDirection {
    /// Returns the OData keyword for this direction
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderDirection::Ascending => "asc",
            OrderDirection::Descending => "desc",
        }
    }
}

impl fmt::Display for OrderDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Logical filters
// ============================================================================

/// Operator joining the expressions of a [`LogicalFilter`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOperator {
    And,
    Or,
}

impl LogicalOperator {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogicalOperator::And => "and",
            LogicalOperator::Or => "or",
        }
    }
}

impl fmt::Display for LogicalOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single `$filter` expression
///
/// Only the logical composer is modelled. `Raw` carries a predicate that was
/// built elsewhere (for example `startswith(displayName,'J')`) and is
/// rendered verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterExpression {
    /// A nested and/or group
    Logical(LogicalFilter),
    /// A pre-built predicate rendered as-is
    Raw(String),
}

impl fmt::Display for FilterExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterExpression::Logical(filter) => filter.fmt(f),
            FilterExpression::Raw(expression) => f.write_str(expression),
        }
    }
}

/// An and/or composition of filter expressions, rendered in parentheses
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogicalFilter {
    pub operator: LogicalOperator,
    pub expressions: Vec<FilterExpression>,
}

impl LogicalFilter {
    /// Creates an empty group joined by `operator`
    pub fn new(operator: LogicalOperator) -> Self {
        Self {
            operator,
            expressions: Vec::new(),
        }
    }

    /// Shorthand for an `and` group
    pub fn and() -> Self {
        Self::new(LogicalOperator::And)
    }

    /// Shorthand for an `or` group
    pub fn or() -> Self {
        Self::new(LogicalOperator::Or)
    }

    /// Appends an expression to the group
    pub fn with(mut self, expression: FilterExpression) -> Self {
        self.expressions.push(expression);
        self
    }
}

impl fmt::Display for LogicalFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let separator = format!(" {} ", self.operator);
        let joined = self
            .expressions
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(&separator);
        write!(f, "({})", joined)
    }
}

// ============================================================================
// QueryOption
// ============================================================================

/// One OData system query option
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryOption {
    /// `$select`: subset of properties to return
    Select(Vec<String>),
    /// `$orderby`: sort properties, in priority order
    OrderBy(Vec<(String, OrderDirection)>),
    /// `$top`: maximum number of items in a result set
    Top(u32),
    /// `$skip`: number of items to skip
    Skip(u32),
    /// `$skiptoken`: opaque continuation marker from a paged response
    SkipToken(String),
    /// `$count`: whether to include the collection count
    Count(bool),
    /// `$filter`: an and/or composition of expressions
    Filter(LogicalFilter),
}

impl QueryOption {
    /// Builds a `$select` option from any list of property names
    pub fn select<I, S>(properties: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        QueryOption::Select(properties.into_iter().map(Into::into).collect())
    }

    /// Builds an `$orderby` option from `(property, direction)` pairs
    pub fn order_by<I, S>(properties: I) -> Self
    where
        I: IntoIterator<Item = (S, OrderDirection)>,
        S: Into<String>,
    {
        QueryOption::OrderBy(
            properties
                .into_iter()
                .map(|(property, direction)| (property.into(), direction))
                .collect(),
        )
    }

    /// Returns the query parameter name, including the `$` prefix
    pub fn name(&self) -> &'static str {
        match self {
            QueryOption::Select(_) => "$select",
            QueryOption::OrderBy(_) => "$orderby",
            QueryOption::Top(_) => "$top",
            QueryOption::Skip(_) => "$skip",
            QueryOption::SkipToken(_) => "$skiptoken",
            QueryOption::Count(_) => "$count",
            QueryOption::Filter(_) => "$filter",
        }
    }

    /// Returns the unencoded parameter value
    pub fn value(&self) -> String {
        match self {
            QueryOption::Select(properties) => properties.join(","),
            QueryOption::OrderBy(properties) => properties
                .iter()
                .map(|(property, direction)| format!("{} {}", property, direction))
                .collect::<Vec<_>>()
                .join(","),
            QueryOption::Top(n) | QueryOption::Skip(n) => n.to_string(),
            QueryOption::SkipToken(token) => token.clone(),
            QueryOption::Count(enabled) => u8::from(*enabled).to_string(),
            QueryOption::Filter(filter) => filter.to_string(),
        }
    }
}

// ============================================================================
// Query
// ============================================================================

/// An ordered collection of query options
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    options: Vec<QueryOption>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an option and returns the query for chaining
    pub fn add_option(&mut self, option: QueryOption) -> &mut Self {
        self.options.push(option);
        self
    }

    pub fn options(&self) -> &[QueryOption] {
        &self.options
    }

    pub fn len(&self) -> usize {
        self.options.len()
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    /// Renders every option as a form-URL-encoded `name=value` pair, joined by `&`
    pub fn render(&self) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        for option in &self.options {
            serializer.append_pair(option.name(), &option.value());
        }
        serializer.finish()
    }

    /// Replaces the query component of `url` with this query
    ///
    /// An empty query clears the component entirely.
    pub fn apply_to(&self, url: &mut Url) {
        if self.is_empty() {
            url.set_query(None);
        } else {
            url.set_query(Some(&self.render()));
        }
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

impl FromIterator<QueryOption> for Query {
    fn from_iter<I: IntoIterator<Item = QueryOption>>(iter: I) -> Self {
        Self {
            options: iter.into_iter().collect(),
        }
    }
}
