//! Parameter bindings and result rows.

use chrono::NaiveDateTime;
use error::GatewayError;
use rust_decimal::Decimal;

/// A value bound to a procedure parameter or read from a result column.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Int(i64),
    Decimal(Decimal),
    Text(String),
    Timestamp(NaiveDateTime),
}

impl SqlValue {
    /// Name of the variant, for error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            SqlValue::Null => "null",
            SqlValue::Int(_) => "integer",
            SqlValue::Decimal(_) => "decimal",
            SqlValue::Text(_) => "text",
            SqlValue::Timestamp(_) => "timestamp",
        }
    }
}

impl From<i32> for SqlValue {
    fn from(v: i32) -> Self {
        SqlValue::Int(i64::from(v))
    }
}

impl From<i64> for SqlValue {
    fn from(v: i64) -> Self {
        SqlValue::Int(v)
    }
}

impl From<Decimal> for SqlValue {
    fn from(v: Decimal) -> Self {
        SqlValue::Decimal(v)
    }
}

impl From<&str> for SqlValue {
    fn from(v: &str) -> Self {
        SqlValue::Text(v.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(v: String) -> Self {
        SqlValue::Text(v)
    }
}

impl From<NaiveDateTime> for SqlValue {
    fn from(v: NaiveDateTime) -> Self {
        SqlValue::Timestamp(v)
    }
}

/// A named parameter binding.
///
/// Names are given without a driver prefix; binding is positional in the
/// order the parameters are supplied.
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: &'static str,
    pub value: SqlValue,
}

impl Param {
    pub fn new(name: &'static str, value: impl Into<SqlValue>) -> Self {
        Self {
            name,
            value: value.into(),
        }
    }
}

/// One row of a tabular result: column names mapped to values, in column order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    columns: Vec<(String, SqlValue)>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a column, builder style.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<SqlValue>) -> Self {
        self.push(name, value);
        self
    }

    pub fn push(&mut self, name: impl Into<String>, value: impl Into<SqlValue>) {
        self.columns.push((name.into(), value.into()));
    }

    /// Look up a column by name (ASCII case-insensitive).
    pub fn get(&self, name: &str) -> Option<&SqlValue> {
        self.columns
            .iter()
            .find(|(column, _)| column.eq_ignore_ascii_case(name))
            .map(|(_, value)| value)
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    fn require(&self, name: &str) -> Result<&SqlValue, GatewayError> {
        self.get(name)
            .ok_or_else(|| GatewayError::Unexpected(format!("missing column {}", name)))
    }

    fn mismatch(name: &str, expected: &str, found: &SqlValue) -> GatewayError {
        GatewayError::Unexpected(format!(
            "column {} is {}, expected {}",
            name,
            found.kind(),
            expected
        ))
    }

    pub fn get_str(&self, name: &str) -> Result<&str, GatewayError> {
        match self.require(name)? {
            SqlValue::Text(v) => Ok(v.as_str()),
            other => Err(Self::mismatch(name, "text", other)),
        }
    }

    pub fn get_i64(&self, name: &str) -> Result<i64, GatewayError> {
        match self.require(name)? {
            SqlValue::Int(v) => Ok(*v),
            other => Err(Self::mismatch(name, "integer", other)),
        }
    }

    /// Decimal column; integer values are widened.
    pub fn get_decimal(&self, name: &str) -> Result<Decimal, GatewayError> {
        match self.require(name)? {
            SqlValue::Decimal(v) => Ok(*v),
            SqlValue::Int(v) => Ok(Decimal::from(*v)),
            other => Err(Self::mismatch(name, "decimal", other)),
        }
    }

    pub fn get_timestamp(&self, name: &str) -> Result<NaiveDateTime, GatewayError> {
        match self.require(name)? {
            SqlValue::Timestamp(v) => Ok(*v),
            other => Err(Self::mismatch(name, "timestamp", other)),
        }
    }
}
