//! Declarative query descriptors for remote datasets.
//!
//! A [`QuerySpec`] composes filter predicates, grouping keys, aggregations,
//! and an optional column projection. It is built eagerly but evaluated
//! lazily: nothing touches the network until [`crate::Dataset::query`]
//! materializes the result. Validation against the dataset schema happens
//! first, so unknown columns and non-pushable predicate verbs fail fast,
//! before any row data is requested.

use arrow_schema::Schema;
use datafusion::functions_aggregate::expr_fn::{count, count_distinct};
use datafusion::logical_expr::Expr;
use datafusion::prelude::{col, in_list, lit};

use geofetch_core::error::{GeoFetchError, QueryError, SchemaError};

/// A literal value appearing in a predicate.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// UTF-8 string
    Str(String),
    /// 64-bit signed integer
    Int(i64),
    /// 64-bit float
    Float(f64),
    /// Boolean
    Bool(bool),
}

impl Value {
    fn to_lit(&self) -> Expr {
        match self {
            Value::Str(s) => lit(s.clone()),
            Value::Int(i) => lit(*i),
            Value::Float(f) => lit(*f),
            Value::Bool(b) => lit(*b),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i64::from(i))
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

/// Predicate verbs that can be applied to a column.
#[derive(Debug, Clone, PartialEq)]
pub enum PredicateOp {
    /// Equality
    Eq(Value),
    /// Inequality
    NotEq(Value),
    /// Strictly less than
    Lt(Value),
    /// Less than or equal
    LtEq(Value),
    /// Strictly greater than
    Gt(Value),
    /// Greater than or equal
    GtEq(Value),
    /// Membership in a value set
    In(Vec<Value>),
    /// Regex match; not expressible against the remote source
    Matches(String),
}

impl PredicateOp {
    fn verb(&self) -> &'static str {
        match self {
            PredicateOp::Eq(_) => "eq",
            PredicateOp::NotEq(_) => "neq",
            PredicateOp::Lt(_) => "lt",
            PredicateOp::LtEq(_) => "lte",
            PredicateOp::Gt(_) => "gt",
            PredicateOp::GtEq(_) => "gte",
            PredicateOp::In(_) => "in",
            PredicateOp::Matches(_) => "matches",
        }
    }
}

/// A single filter predicate on one column.
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    /// The column the predicate applies to
    pub column: String,
    /// The predicate verb and operand(s)
    pub op: PredicateOp,
}

impl Predicate {
    fn new(column: &str, op: PredicateOp) -> Self {
        Self {
            column: column.to_string(),
            op,
        }
    }

    /// `column == value`
    pub fn eq(column: &str, value: impl Into<Value>) -> Self {
        Self::new(column, PredicateOp::Eq(value.into()))
    }

    /// `column != value`
    pub fn neq(column: &str, value: impl Into<Value>) -> Self {
        Self::new(column, PredicateOp::NotEq(value.into()))
    }

    /// `column < value`
    pub fn lt(column: &str, value: impl Into<Value>) -> Self {
        Self::new(column, PredicateOp::Lt(value.into()))
    }

    /// `column <= value`
    pub fn lt_eq(column: &str, value: impl Into<Value>) -> Self {
        Self::new(column, PredicateOp::LtEq(value.into()))
    }

    /// `column > value`
    pub fn gt(column: &str, value: impl Into<Value>) -> Self {
        Self::new(column, PredicateOp::Gt(value.into()))
    }

    /// `column >= value`
    pub fn gt_eq(column: &str, value: impl Into<Value>) -> Self {
        Self::new(column, PredicateOp::GtEq(value.into()))
    }

    /// `column IN (values...)`
    pub fn in_set<V: Into<Value>>(column: &str, values: impl IntoIterator<Item = V>) -> Self {
        Self::new(
            column,
            PredicateOp::In(values.into_iter().map(Into::into).collect()),
        )
    }

    /// `column ~ pattern`. Always rejected at validation time: regex
    /// matching cannot be pushed to the remote source.
    pub fn matches(column: &str, pattern: &str) -> Self {
        Self::new(column, PredicateOp::Matches(pattern.to_string()))
    }

    fn to_expr(&self) -> Result<Expr, GeoFetchError> {
        let column = col(&self.column);
        let expr = match &self.op {
            PredicateOp::Eq(v) => column.eq(v.to_lit()),
            PredicateOp::NotEq(v) => column.not_eq(v.to_lit()),
            PredicateOp::Lt(v) => column.lt(v.to_lit()),
            PredicateOp::LtEq(v) => column.lt_eq(v.to_lit()),
            PredicateOp::Gt(v) => column.gt(v.to_lit()),
            PredicateOp::GtEq(v) => column.gt_eq(v.to_lit()),
            PredicateOp::In(values) => in_list(
                column,
                values.iter().map(Value::to_lit).collect(),
                false,
            ),
            PredicateOp::Matches(_) => {
                return Err(QueryError::UnsupportedOperation {
                    verb: self.op.verb().to_string(),
                    reason: "regex matching cannot be pushed to the remote source".to_string(),
                }
                .into());
            },
        };
        Ok(expr)
    }
}

/// An aggregation expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Aggregate {
    /// Row count per group
    Count {
        /// Output column name
        alias: String,
    },
    /// Distinct-value count of a column per group
    CountDistinct {
        /// The column to count distinct values of
        column: String,
        /// Output column name
        alias: String,
    },
}

impl Aggregate {
    /// A `count(*)`-style aggregation named `alias`.
    #[must_use]
    pub fn count(alias: &str) -> Self {
        Aggregate::Count {
            alias: alias.to_string(),
        }
    }

    /// A distinct count of `column`, named `alias`.
    #[must_use]
    pub fn count_distinct(column: &str, alias: &str) -> Self {
        Aggregate::CountDistinct {
            column: column.to_string(),
            alias: alias.to_string(),
        }
    }

    fn to_expr(&self) -> Expr {
        match self {
            Aggregate::Count { alias } => count(lit(1i64)).alias(alias),
            Aggregate::CountDistinct { column, alias } => count_distinct(col(column)).alias(alias),
        }
    }

    fn column(&self) -> Option<&str> {
        match self {
            Aggregate::Count { .. } => None,
            Aggregate::CountDistinct { column, .. } => Some(column),
        }
    }
}

/// A declarative, lazily evaluated query over a remote dataset.
///
/// Built fluently; evaluated by [`crate::Dataset::query`]. Deferral is the
/// contract: constructing a spec transfers nothing.
#[derive(Debug, Clone, Default)]
pub struct QuerySpec {
    predicates: Vec<Predicate>,
    group_keys: Vec<String>,
    aggregations: Vec<Aggregate>,
    projection: Option<Vec<String>>,
}

impl QuerySpec {
    /// An empty spec: full projection, no filters, no grouping.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a filter predicate. Multiple predicates are AND-combined.
    #[must_use]
    pub fn filter(mut self, predicate: Predicate) -> Self {
        self.predicates.push(predicate);
        self
    }

    /// Sets the grouping keys.
    #[must_use]
    pub fn group_by<S: Into<String>>(mut self, keys: impl IntoIterator<Item = S>) -> Self {
        self.group_keys = keys.into_iter().map(Into::into).collect();
        self
    }

    /// Adds an aggregation expression.
    #[must_use]
    pub fn aggregate(mut self, aggregate: Aggregate) -> Self {
        self.aggregations.push(aggregate);
        self
    }

    /// Restricts the result to the given columns (ignored when grouping).
    #[must_use]
    pub fn select<S: Into<String>>(mut self, columns: impl IntoIterator<Item = S>) -> Self {
        self.projection = Some(columns.into_iter().map(Into::into).collect());
        self
    }

    /// Whether the spec carries grouping or aggregation.
    #[must_use]
    pub fn has_aggregation(&self) -> bool {
        !self.group_keys.is_empty() || !self.aggregations.is_empty()
    }

    /// The optional column projection.
    #[must_use]
    pub fn projection(&self) -> Option<&[String]> {
        self.projection.as_deref()
    }

    /// Validates the spec against a dataset schema.
    ///
    /// Checks every referenced column and rejects predicate verbs that
    /// cannot be evaluated at the remote source. Runs before any network
    /// transfer.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::UnknownColumn`] or
    /// [`QueryError::UnsupportedOperation`].
    pub fn validate(&self, schema: &Schema) -> Result<(), GeoFetchError> {
        for predicate in &self.predicates {
            if let PredicateOp::Matches(_) = predicate.op {
                return Err(QueryError::UnsupportedOperation {
                    verb: predicate.op.verb().to_string(),
                    reason: "regex matching cannot be pushed to the remote source".to_string(),
                }
                .into());
            }
            check_column(schema, &predicate.column)?;
        }
        for key in &self.group_keys {
            check_column(schema, key)?;
        }
        for aggregate in &self.aggregations {
            if let Some(column) = aggregate.column() {
                check_column(schema, column)?;
            }
        }
        if let Some(columns) = &self.projection {
            for column in columns {
                check_column(schema, column)?;
            }
        }
        Ok(())
    }

    /// The AND-combined filter expression, if any predicates are present.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::UnsupportedOperation`] for verbs that cannot be
    /// translated.
    pub fn predicate_expr(&self) -> Result<Option<Expr>, GeoFetchError> {
        let mut combined: Option<Expr> = None;
        for predicate in &self.predicates {
            let expr = predicate.to_expr()?;
            combined = Some(match combined {
                Some(acc) => acc.and(expr),
                None => expr,
            });
        }
        Ok(combined)
    }

    /// Grouping key expressions.
    #[must_use]
    pub fn group_exprs(&self) -> Vec<Expr> {
        self.group_keys.iter().map(|k| col(k)).collect()
    }

    /// Aggregation expressions.
    #[must_use]
    pub fn aggregate_exprs(&self) -> Vec<Expr> {
        self.aggregations.iter().map(Aggregate::to_expr).collect()
    }
}

fn check_column(schema: &Schema, column: &str) -> Result<(), GeoFetchError> {
    if schema.field_with_name(column).is_ok() {
        return Ok(());
    }
    let available = schema
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect::<Vec<_>>()
        .join(", ");
    Err(SchemaError::UnknownColumn {
        column: column.to_string(),
        available,
    }
    .into())
}
