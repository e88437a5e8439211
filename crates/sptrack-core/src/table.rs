//! Columnar track table with named, typed columns.
//!
//! A [`TrackTable`] is what file readers hand to the core: an ordered set of
//! named columns sharing one row count. Only the columns in
//! [`REQUIRED_TRACK_COLS`] are interpreted; any others ride along untouched,
//! whatever they hold.
//!
//! Serialized form (JSON/CBOR) is a map from column name to an array of
//! scalars, e.g. `{"cell_id": [1, 1], "frame": [0, 1], ...}`. Row-oriented
//! input (JSON Lines) goes through [`TrackTable::from_records`].

use crate::error::StepsError;
use crate::types::{f64s_or_nan, TrackPoint};
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::borrow::Cow;
use std::fmt;

/// Columns every track table must provide.
pub const REQUIRED_TRACK_COLS: [&str; 5] = ["cell_id", "frame", "t_min", "x_um", "y_um"];

/// A single homogeneous column.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Column {
    /// Integer values.
    Int(Vec<i64>),
    /// Floating-point values; JSON `null` reads as NaN.
    Float(#[serde(deserialize_with = "f64s_or_nan")] Vec<f64>),
    /// Free-form text (only ever an extra column).
    Text(Vec<String>),
    /// Anything else: booleans, mixed types, nested values.
    Other(Vec<Value>),
}

impl Column {
    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Int(v) => v.len(),
            Self::Float(v) => v.len(),
            Self::Text(v) => v.len(),
            Self::Other(v) => v.len(),
        }
    }

    /// Whether the column holds no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Value at row `i` as JSON (for row-oriented writers).
    #[must_use]
    pub fn value_at(&self, i: usize) -> Value {
        match self {
            Self::Int(v) => Value::from(v[i]),
            Self::Float(v) => Value::from(v[i]),
            Self::Text(v) => Value::from(v[i].as_str()),
            Self::Other(v) => v[i].clone(),
        }
    }
}

/// Ordered collection of named columns of equal length.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TrackTable {
    columns: Vec<(String, Column)>,
}

impl TrackTable {
    /// Empty table with no columns.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            columns: Vec::new(),
        }
    }

    /// Append a column.
    ///
    /// # Errors
    /// `DuplicateColumn` if `name` is taken, `RaggedColumn` if its length
    /// disagrees with the columns already present.
    pub fn push_column(&mut self, name: impl Into<String>, column: Column) -> Result<(), StepsError> {
        let name = name.into();
        if self.column(&name).is_some() {
            return Err(StepsError::DuplicateColumn(name));
        }
        if let Some((_, first)) = self.columns.first() {
            if first.len() != column.len() {
                return Err(StepsError::RaggedColumn {
                    column: name,
                    len: column.len(),
                    expected: first.len(),
                });
            }
        }
        self.columns.push((name, column));
        Ok(())
    }

    /// Builder-style [`Self::push_column`].
    pub fn with_column(mut self, name: impl Into<String>, column: Column) -> Result<Self, StepsError> {
        self.push_column(name, column)?;
        Ok(self)
    }

    /// Look up a column by name.
    #[must_use]
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|(n, _)| n == name).map(|(_, c)| c)
    }

    /// Column names in insertion order.
    pub fn column_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.columns.iter().map(|(n, _)| n.as_str())
    }

    /// Number of columns.
    #[must_use]
    pub fn n_columns(&self) -> usize {
        self.columns.len()
    }

    /// Number of rows (0 for a table without columns).
    #[must_use]
    pub fn len(&self) -> usize {
        self.columns.first().map_or(0, |(_, c)| c.len())
    }

    /// Whether the table has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Build a table holding exactly the required columns.
    #[must_use]
    pub fn from_points(points: &[TrackPoint]) -> Self {
        let ints = |f: fn(&TrackPoint) -> i64| Column::Int(points.iter().map(f).collect());
        let floats = |f: fn(&TrackPoint) -> f64| Column::Float(points.iter().map(f).collect());
        Self {
            columns: vec![
                ("cell_id".to_owned(), ints(|p| p.cell_id)),
                ("frame".to_owned(), ints(|p| p.frame)),
                ("t_min".to_owned(), floats(|p| p.t_min)),
                ("x_um".to_owned(), floats(|p| p.x_um)),
                ("y_um".to_owned(), floats(|p| p.y_um)),
            ],
        }
    }

    /// Typed rows, in table order.
    ///
    /// # Errors
    /// `MissingColumns` if a required column is absent; `ColumnType` if
    /// `cell_id`/`frame` are not integer or a position/time column is text.
    pub fn points(&self) -> Result<Vec<TrackPoint>, StepsError> {
        crate::validate::validate_tracks(self)?;
        let cell_id = self.int_column("cell_id")?;
        let frame = self.int_column("frame")?;
        let t_min = self.float_column("t_min")?;
        let x_um = self.float_column("x_um")?;
        let y_um = self.float_column("y_um")?;

        Ok((0..self.len())
            .map(|i| TrackPoint::new(cell_id[i], frame[i], t_min[i], x_um[i], y_um[i]))
            .collect())
    }

    fn required(&self, name: &str) -> Result<&Column, StepsError> {
        self.column(name)
            .ok_or_else(|| StepsError::MissingColumns(vec![name.to_owned()]))
    }

    fn int_column(&self, name: &str) -> Result<&[i64], StepsError> {
        match self.required(name)? {
            Column::Int(v) => Ok(v.as_slice()),
            _ => Err(StepsError::ColumnType {
                column: name.to_owned(),
                expected: "integer",
            }),
        }
    }

    /// Float view of a column; integer columns widen.
    fn float_column(&self, name: &str) -> Result<Cow<'_, [f64]>, StepsError> {
        match self.required(name)? {
            Column::Float(v) => Ok(Cow::Borrowed(v.as_slice())),
            #[allow(clippy::cast_precision_loss)]
            Column::Int(v) => Ok(Cow::Owned(v.iter().map(|&x| x as f64).collect())),
            Column::Text(_) | Column::Other(_) => Err(StepsError::ColumnType {
                column: name.to_owned(),
                expected: "numeric",
            }),
        }
    }

    /// Build a table from row records (e.g. parsed JSON Lines).
    ///
    /// The column set is the union of keys in first-seen order. Each column
    /// becomes `Int` if every value is an integer, `Float` if every value is
    /// numeric or `null` (read as NaN), `Text` if every value is a string, and
    /// `Other` otherwise.
    ///
    /// # Errors
    /// `RaggedColumn` if a record lacks a key another record has.
    pub fn from_records(records: &[Map<String, Value>]) -> Result<Self, StepsError> {
        let mut names: Vec<&str> = Vec::new();
        for rec in records {
            for k in rec.keys() {
                if !names.contains(&k.as_str()) {
                    names.push(k.as_str());
                }
            }
        }

        let mut table = Self::new();
        for name in names {
            let values: Vec<&Value> = records.iter().filter_map(|r| r.get(name)).collect();
            if values.len() != records.len() {
                return Err(StepsError::RaggedColumn {
                    column: name.to_owned(),
                    len: values.len(),
                    expected: records.len(),
                });
            }
            table.push_column(name, column_from_values(&values))?;
        }
        Ok(table)
    }

    /// Row records in table order (inverse of [`Self::from_records`]).
    #[must_use]
    pub fn to_records(&self) -> Vec<Map<String, Value>> {
        (0..self.len())
            .map(|i| {
                self.columns
                    .iter()
                    .map(|(n, c)| (n.clone(), c.value_at(i)))
                    .collect()
            })
            .collect()
    }
}

fn column_from_values(values: &[&Value]) -> Column {
    if let Some(v) = values.iter().map(|v| v.as_i64()).collect::<Option<Vec<_>>>() {
        return Column::Int(v);
    }
    let float_or_nan = |v: &Value| match v {
        Value::Null => Some(f64::NAN),
        _ => v.as_f64(),
    };
    if let Some(v) = values.iter().map(|v| float_or_nan(*v)).collect::<Option<Vec<_>>>() {
        return Column::Float(v);
    }
    if let Some(v) = values
        .iter()
        .map(|v| v.as_str().map(str::to_owned))
        .collect::<Option<Vec<_>>>()
    {
        return Column::Text(v);
    }
    Column::Other(values.iter().map(|&v| v.clone()).collect())
}

impl Serialize for TrackTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.columns.len()))?;
        for (name, col) in &self.columns {
            map.serialize_entry(name, col)?;
        }
        map.end()
    }
}

struct TableVisitor;

impl<'de> Visitor<'de> for TableVisitor {
    type Value = TrackTable;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a map from column name to an array of scalars")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<TrackTable, A::Error> {
        let mut table = TrackTable::new();
        while let Some((name, col)) = access.next_entry::<String, Column>()? {
            table
                .push_column(name, col)
                .map_err(<A::Error as serde::de::Error>::custom)?;
        }
        Ok(table)
    }
}

impl<'de> Deserialize<'de> for TrackTable {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(TableVisitor)
    }
}
