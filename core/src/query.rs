// SPDX-FileCopyrightText: Copyright (c) 2025 NVIDIA CORPORATION & AFFILIATES. All rights reserved.
// SPDX-License-Identifier: Apache-2.0
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
// http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! OData query options
//!
//! This module composes the query string of read requests and ingests
//! property filters that the hosting framework binds one property at a
//! time.
//!
//! # Query options
//!
//! | Option | Wire clause |
//! |--------|-------------|
//! | filter | `$filter=<expr>` |
//! | orderby | `$orderby=<expr>` |
//! | select | `$select=<comma-list>` |
//! | includeTotalCount | `$inlinecount=allpages` |
//! | skip | `$skip=<n>` |
//! | top | `$top=<n>` |
//!
//! Clauses are always emitted in the order of the table, regardless of
//! the order they were set in.
//!
//! ```rust
//! use odata_proxy_core::query::{apply_query_options, QuerySpec};
//!
//! let spec = QuerySpec::new()
//!     .with_top(5)?
//!     .with_filter("Price gt 10")?;
//! assert_eq!(
//!     apply_query_options("http://h/s.svc/Product", &spec),
//!     "http://h/s.svc/Product?$filter=Price gt 10&$top=5"
//! );
//! # Ok::<(), odata_proxy_core::Error>(())
//! ```
//!
//! # Filter expressions
//!
//! [`FilterExpression`] builds `$filter` expressions with OData literal
//! rules:
//!
//! ```rust
//! use odata_proxy_core::query::FilterExpression;
//!
//! let filter = FilterExpression::eq("Status", "Enabled")
//!     .and(FilterExpression::gt("Price", 10))
//!     .group()
//!     .or(FilterExpression::eq("Name", "O'Brien"));
//! assert_eq!(
//!     filter.to_string(),
//!     "(Status eq 'Enabled' and Price gt 10) or Name eq 'O''Brien'"
//! );
//! ```
//!
//! # References
//!
//! - [OData Version 3.0 URI Conventions](https://www.odata.org/documentation/odata-version-3-0/url-conventions/)
//! - [OData Version 4.0 Protocol](http://docs.oasis-open.org/odata/odata/v4.0/os/part2-url-conventions/odata-v4.0-os-part2-url-conventions.html)

use crate::path::Key;
use crate::Error;
use crate::Value;
use std::fmt::Display;
use std::fmt::Formatter;
use std::fmt::Result as FmtResult;

/// Query option recognized by the composer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryOption {
    /// `$filter`.
    Filter,
    /// `$orderby`.
    OrderBy,
    /// `$select`.
    Select,
    /// `$inlinecount=allpages`.
    IncludeTotalCount,
    /// `$skip`.
    Skip,
    /// `$top`.
    Top,
}

impl QueryOption {
    /// Options in emission order.
    pub const ALL: [Self; 6] = [
        Self::Filter,
        Self::OrderBy,
        Self::Select,
        Self::IncludeTotalCount,
        Self::Skip,
        Self::Top,
    ];

    /// Property name that selects the option in a property filter.
    #[must_use]
    pub const fn property_name(self) -> &'static str {
        match self {
            Self::Filter => "Filter",
            Self::OrderBy => "OrderBy",
            Self::Select => "Select",
            Self::IncludeTotalCount => "IncludeTotalResponseCount",
            Self::Skip => "Skip",
            Self::Top => "Top",
        }
    }

    /// Option by property name. The match is case-sensitive.
    #[must_use]
    pub fn from_property_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|o| o.property_name() == name)
    }

    const fn index(self) -> usize {
        self as usize
    }
}

/// Accumulated query options of one request.
///
/// Every option can be set once; a second attempt is reported as
/// `Error::QueryOptionAlreadySet`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuerySpec {
    clauses: [Option<String>; 6],
    concatenation_operator: String,
}

impl Default for QuerySpec {
    fn default() -> Self {
        Self {
            clauses: Default::default(),
            concatenation_operator: "&".to_string(),
        }
    }
}

impl QuerySpec {
    /// Empty set of query options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the operator used to join clauses (`&` by default).
    #[must_use]
    pub fn with_concatenation_operator(mut self, operator: impl Into<String>) -> Self {
        self.concatenation_operator = operator.into();
        self
    }

    /// Operator used to join clauses.
    #[must_use]
    pub fn concatenation_operator(&self) -> &str {
        &self.concatenation_operator
    }

    fn with_clause(mut self, option: QueryOption, clause: String) -> Result<Self, Error> {
        let slot = &mut self.clauses[option.index()];
        if slot.is_some() {
            return Err(Error::QueryOptionAlreadySet(option.property_name()));
        }
        *slot = Some(clause);
        Ok(self)
    }

    /// Set `$filter`.
    ///
    /// # Errors
    ///
    /// `Error::QueryOptionAlreadySet` if the option is already set.
    pub fn with_filter(self, expr: impl Into<String>) -> Result<Self, Error> {
        self.with_clause(QueryOption::Filter, format!("$filter={}", expr.into()))
    }

    /// Set `$orderby`.
    ///
    /// # Errors
    ///
    /// `Error::QueryOptionAlreadySet` if the option is already set.
    pub fn with_order_by(self, expr: impl Into<String>) -> Result<Self, Error> {
        self.with_clause(QueryOption::OrderBy, format!("$orderby={}", expr.into()))
    }

    /// Set `$select` from a list of property names.
    ///
    /// # Errors
    ///
    /// `Error::QueryOptionAlreadySet` if the option is already set.
    pub fn with_select<I, S>(self, properties: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let list = properties
            .into_iter()
            .map(|s| s.as_ref().to_string())
            .collect::<Vec<_>>()
            .join(",");
        self.with_clause(QueryOption::Select, format!("$select={list}"))
    }

    /// Request the total count of the collection (`$inlinecount=allpages`).
    ///
    /// # Errors
    ///
    /// `Error::QueryOptionAlreadySet` if the option is already set.
    pub fn with_total_count(self) -> Result<Self, Error> {
        self.with_clause(
            QueryOption::IncludeTotalCount,
            "$inlinecount=allpages".to_string(),
        )
    }

    /// Set `$skip`.
    ///
    /// # Errors
    ///
    /// `Error::QueryOptionAlreadySet` if the option is already set.
    pub fn with_skip(self, n: u64) -> Result<Self, Error> {
        self.with_clause(QueryOption::Skip, format!("$skip={n}"))
    }

    /// Set `$top`.
    ///
    /// # Errors
    ///
    /// `Error::QueryOptionAlreadySet` if the option is already set.
    pub fn with_top(self, n: u64) -> Result<Self, Error> {
        self.with_clause(QueryOption::Top, format!("$top={n}"))
    }

    /// Set option from a property filter value.
    ///
    /// # Errors
    ///
    /// `Error::QueryOptionAlreadySet` if the option is already set.
    pub fn with_option(self, option: QueryOption, value: &Value) -> Result<Self, Error> {
        match option {
            QueryOption::Filter => self.with_filter(value.to_string()),
            QueryOption::OrderBy => self.with_order_by(value.to_string()),
            QueryOption::Select => self.with_clause(option, format!("$select={value}")),
            QueryOption::IncludeTotalCount => self.with_total_count(),
            QueryOption::Skip => self.with_clause(option, format!("$skip={value}")),
            QueryOption::Top => self.with_clause(option, format!("$top={value}")),
        }
    }

    /// True if the option is set.
    #[must_use]
    pub fn is_set(&self, option: QueryOption) -> bool {
        self.clauses[option.index()].is_some()
    }

    /// True if no option is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.clauses.iter().all(Option::is_none)
    }

    /// Set clauses in emission order.
    pub fn clauses(&self) -> impl Iterator<Item = &str> {
        self.clauses.iter().filter_map(Option::as_deref)
    }

    /// Set options as unencoded name / value pairs in emission order.
    #[must_use]
    pub fn pairs(&self) -> Vec<(String, String)> {
        self.clauses()
            .map(|clause| match clause.split_once('=') {
                Some((name, value)) => (name.to_string(), value.to_string()),
                None => (clause.to_string(), String::new()),
            })
            .collect()
    }

    /// Clauses joined with the concatenation operator.
    #[must_use]
    pub fn to_query_string(&self) -> String {
        self.clauses()
            .collect::<Vec<_>>()
            .join(&self.concatenation_operator)
    }
}

/// Append query options of `spec` to `base_uri`.
///
/// The clause is prefixed by `?` if `base_uri` has no query yet and by the
/// concatenation operator otherwise. Empty `spec` returns `base_uri`
/// unchanged.
#[must_use]
pub fn apply_query_options(base_uri: &str, spec: &QuerySpec) -> String {
    if spec.is_empty() {
        return base_uri.to_string();
    }
    let prefix = if base_uri.contains('?') {
        spec.concatenation_operator()
    } else {
        "?"
    };
    format!("{base_uri}{prefix}{}", spec.to_query_string())
}

/// Keys, query options and navigation target collected from property
/// filters of one read request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryBuilder {
    /// Keys in the order they were bound.
    pub keys: Vec<Key>,
    /// Query options.
    pub spec: QuerySpec,
    /// Name of referred resource for association reads.
    pub referred_resource: Option<String>,
}

impl QueryBuilder {
    /// Empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind one property filter.
    ///
    /// `name` is either `Property`, `QueryOption:Option` or
    /// `Referred:Property:Key`. Only the first value is used except for
    /// `Select`, where all non-null values are comma-joined. A null first
    /// value leaves the builder unchanged.
    ///
    /// # Errors
    ///
    /// - `Error::MalformedPropertyName` if `name` does not follow the grammar
    /// - `Error::QueryOptionAlreadySet` if the same query option is bound twice
    pub fn filter_by_property<I>(mut self, name: &str, values: I) -> Result<Self, Error>
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        let segments = name.split(':').collect::<Vec<_>>();
        let property = match segments.as_slice() {
            [property] => *property,
            [prefix, option] if prefix.eq_ignore_ascii_case("QueryOption") => *option,
            [referred, property, "Key"] => {
                self.referred_resource = Some((*referred).to_string());
                *property
            }
            _ => return Err(Error::MalformedPropertyName(name.to_string())),
        };

        let mut values = values.into_iter().map(Into::into);
        let value = match values.next() {
            None | Some(Value::Null) => return Ok(self),
            Some(v) if property.eq_ignore_ascii_case("Select") => {
                let list = std::iter::once(v)
                    .chain(values.filter(|v| !v.is_null()))
                    .map(|v| v.to_string())
                    .collect::<Vec<_>>();
                Value::String(list.join(","))
            }
            Some(v) => v,
        };

        match QueryOption::from_property_name(property) {
            Some(option) => self.spec = self.spec.with_option(option, &value)?,
            None => self.keys.push(Key::new(property, value)),
        }
        Ok(self)
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Expr {
    Comparison {
        property: String,
        operator: &'static str,
        value: Value,
    },
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
    Not(Box<Expr>),
    Group(Box<Expr>),
}

impl Display for Expr {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Comparison {
                property,
                operator,
                value,
            } => write!(f, "{property} {operator} {}", filter_literal(value)),
            Self::And(l, r) => write!(f, "{l} and {r}"),
            Self::Or(l, r) => write!(f, "{l} or {r}"),
            Self::Not(e) => write!(f, "not {e}"),
            Self::Group(e) => write!(f, "({e})"),
        }
    }
}

fn filter_literal(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Boolean(_) | Value::Double(_) | Value::Decimal(_) => value.to_string(),
        Value::String(s) => format!("'{}'", s.replace('\'', "''")),
        v => v.key_literal().unwrap_or_default(),
    }
}

/// Builder of `$filter` expressions.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterExpression(Expr);

macro_rules! comparison {
    ($(#[$doc:meta] $name:ident => $op:literal),* $(,)?) => {
        $(
            #[$doc]
            pub fn $name(property: impl Into<String>, value: impl Into<Value>) -> Self {
                Self(Expr::Comparison {
                    property: property.into(),
                    operator: $op,
                    value: value.into(),
                })
            }
        )*
    };
}

impl FilterExpression {
    comparison! {
        /// `property eq value`
        eq => "eq",
        /// `property ne value`
        ne => "ne",
        /// `property gt value`
        gt => "gt",
        /// `property ge value`
        ge => "ge",
        /// `property lt value`
        lt => "lt",
        /// `property le value`
        le => "le",
    }

    /// `self and other`
    #[must_use]
    pub fn and(self, other: Self) -> Self {
        Self(Expr::And(Box::new(self.0), Box::new(other.0)))
    }

    /// `self or other`
    #[must_use]
    pub fn or(self, other: Self) -> Self {
        Self(Expr::Or(Box::new(self.0), Box::new(other.0)))
    }

    /// `not self`
    #[must_use]
    #[allow(clippy::should_implement_trait)]
    pub fn not(self) -> Self {
        Self(Expr::Not(Box::new(self.0)))
    }

    /// `(self)`
    #[must_use]
    pub fn group(self) -> Self {
        Self(Expr::Group(Box::new(self.0)))
    }
}

impl Display for FilterExpression {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        self.0.fmt(f)
    }
}

impl From<FilterExpression> for String {
    fn from(v: FilterExpression) -> Self {
        v.to_string()
    }
}
