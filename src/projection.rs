//! Column projection for page queries.
//!
//! Query methods let the caller pick which page columns come back: a single
//! column yields flat scalar values, a list of columns yields one row of
//! values per page, in the requested order. Column names are validated
//! against a fixed whitelist before they are ever spliced into query text;
//! caller-supplied *values* are always bound as parameters, never spliced.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// A projectable column of the page table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    Id,
    Key,
    Html,
    Json,
}

impl Field {
    /// All projectable columns, in table order.
    pub const ALL: [Field; 4] = [Field::Id, Field::Key, Field::Html, Field::Json];

    /// The column identifier as it appears in SQL. These static strings are
    /// the only identifiers ever interpolated into a query.
    pub fn column(&self) -> &'static str {
        match self {
            Field::Id => "id",
            Field::Key => "key",
            Field::Html => "html",
            Field::Json => "json",
        }
    }
}

impl FromStr for Field {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "id" => Ok(Field::Id),
            "key" => Ok(Field::Key),
            "html" => Ok(Field::Html),
            "json" => Ok(Field::Json),
            other => Err(Error::InvalidColumn(other.to_string())),
        }
    }
}

/// Which columns a query should return, and how results are shaped.
///
/// `Single` produces a flat sequence of scalars ([`Projected::Scalar`]);
/// `Multiple` produces one [`Projected::Row`] per page, values in the
/// requested column order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Projection {
    Single(Field),
    Multiple(Vec<Field>),
}

impl Projection {
    pub fn single(field: Field) -> Self {
        Projection::Single(field)
    }

    /// A multi-column projection. At least one column is required.
    pub fn multiple(fields: Vec<Field>) -> Result<Self> {
        if fields.is_empty() {
            return Err(Error::EmptyProjection);
        }
        Ok(Projection::Multiple(fields))
    }

    /// Parse a single column name. Unknown names fail with
    /// [`Error::InvalidColumn`]; nothing reaches the database.
    pub fn parse_one(name: &str) -> Result<Self> {
        Ok(Projection::Single(name.parse()?))
    }

    /// Parse an ordered list of column names.
    pub fn parse_many(names: &[&str]) -> Result<Self> {
        let fields = names
            .iter()
            .map(|name| name.parse())
            .collect::<Result<Vec<Field>>>()?;
        Self::multiple(fields)
    }

    /// The `SELECT` column list, built purely from whitelisted identifiers.
    pub(crate) fn column_list(&self) -> String {
        match self {
            Projection::Single(field) => field.column().to_string(),
            Projection::Multiple(fields) => fields
                .iter()
                .map(|field| field.column())
                .collect::<Vec<_>>()
                .join(","),
        }
    }

    /// Shape one result row according to the projection variant.
    pub(crate) fn read_row(&self, row: &rusqlite::Row) -> rusqlite::Result<Projected> {
        match self {
            Projection::Single(_) => Ok(Projected::Scalar(read_value(row, 0)?)),
            Projection::Multiple(fields) => {
                let mut values = Vec::with_capacity(fields.len());
                for idx in 0..fields.len() {
                    values.push(read_value(row, idx)?);
                }
                Ok(Projected::Row(values))
            }
        }
    }
}

impl Default for Projection {
    /// The json payload, the most common thing callers want back.
    fn default() -> Self {
        Projection::Single(Field::Json)
    }
}

/// A projected column value. `id` comes back as `Integer`; `key`, `html`
/// and `json` as `Text` or `Null`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Value {
    Integer(i64),
    Text(String),
    Null,
}

impl Value {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(n) => Some(*n),
            _ => None,
        }
    }
}

/// One query result, shaped by the [`Projection`] that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Projected {
    /// Result of a `Single` projection.
    Scalar(Value),
    /// Result of a `Multiple` projection, values in requested order.
    Row(Vec<Value>),
}

impl Projected {
    pub fn as_scalar(&self) -> Option<&Value> {
        match self {
            Projected::Scalar(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_row(&self) -> Option<&[Value]> {
        match self {
            Projected::Row(values) => Some(values),
            _ => None,
        }
    }

    /// Shortcut for the common "one text column" case.
    pub fn as_text(&self) -> Option<&str> {
        self.as_scalar().and_then(Value::as_text)
    }
}

fn read_value(row: &rusqlite::Row, idx: usize) -> rusqlite::Result<Value> {
    use rusqlite::types::ValueRef;

    match row.get_ref(idx)? {
        ValueRef::Null => Ok(Value::Null),
        ValueRef::Integer(n) => Ok(Value::Integer(n)),
        ValueRef::Text(bytes) => Ok(Value::Text(String::from_utf8_lossy(bytes).into_owned())),
        other => Err(rusqlite::Error::InvalidColumnType(
            idx,
            "page".to_string(),
            other.data_type(),
        )),
    }
}
