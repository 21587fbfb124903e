use serde::Serialize;

/// The type of a column of a [`Table`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum DataType {
    Boolean,
    Int64,
    Float64,
    Utf8,
}

/// A single cell of a [`Table`]
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Boolean(bool),
    Int64(i64),
    Float64(f64),
    Utf8(String),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int64(x) => Some(*x),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float64(x) => Some(*x),
            Self::Int64(x) => Some(*x as f64),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(x) => Some(*x),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Utf8(x) => Some(x.as_str()),
            _ => None,
        }
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Int64(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Float64(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Utf8(value.to_string())
    }
}

/// A named, typed column of a [`Table`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Field {
    pub name: String,
    pub data_type: DataType,
}

/// A row of a [`Table`] does not have one value per field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RaggedRow {
    pub row: usize,
    pub expected: usize,
    pub found: usize,
}

impl std::error::Error for RaggedRow {}

impl std::fmt::Display for RaggedRow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "row {} has {} values, the schema has {} fields",
            self.row, self.found, self.expected
        )
    }
}

/// An in-memory table: named columns and ordered rows.
/// # Invariants
/// * every row has one [`Value`] per field of the schema
/// * every non-null value matches the [`DataType`] of its field
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    schema: Vec<Field>,
    rows: Vec<Vec<Value>>,
}

impl Table {
    /// Creates a new [`Table`].
    /// # Error
    /// Errors if a row does not have one value per field
    pub fn try_new(schema: Vec<Field>, rows: Vec<Vec<Value>>) -> Result<Self, RaggedRow> {
        if let Some((row, values)) = rows
            .iter()
            .enumerate()
            .find(|(_, values)| values.len() != schema.len())
        {
            return Err(RaggedRow {
                row,
                expected: schema.len(),
                found: values.len(),
            });
        }
        Ok(Self { schema, rows })
    }

    /// Creates a [`Table`] whose rows are known to match `schema`
    pub(crate) fn new(schema: Vec<Field>, rows: Vec<Vec<Value>>) -> Self {
        debug_assert!(rows.iter().all(|row| row.len() == schema.len()));
        Self { schema, rows }
    }

    pub fn schema(&self) -> &[Field] {
        &self.schema
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.schema.iter().map(|field| field.name.as_str())
    }

    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn num_columns(&self) -> usize {
        self.schema.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    pub fn row(&self, index: usize) -> Option<&[Value]> {
        self.rows.get(index).map(|row| row.as_slice())
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.schema.iter().position(|field| field.name == name)
    }

    /// Returns the values of column `name`, in row order
    pub fn column(&self, name: &str) -> Option<Vec<&Value>> {
        let position = self.position(name)?;
        Some(self.rows.iter().map(|row| &row[position]).collect())
    }

    pub fn value(&self, row: usize, name: &str) -> Option<&Value> {
        let position = self.position(name)?;
        self.rows.get(row).map(|row| &row[position])
    }
}

/// Serializes as a sequence of records (`{column: value}`)
impl Serialize for Table {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::{SerializeMap, SerializeSeq};

        struct Record<'a>(&'a [Field], &'a [Value]);

        impl Serialize for Record<'_> {
            fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                let mut map = serializer.serialize_map(Some(self.0.len()))?;
                for (field, value) in self.0.iter().zip(self.1) {
                    map.serialize_entry(&field.name, value)?;
                }
                map.end()
            }
        }

        let mut seq = serializer.serialize_seq(Some(self.rows.len()))?;
        for row in &self.rows {
            seq.serialize_element(&Record(&self.schema, row))?;
        }
        seq.end()
    }
}
