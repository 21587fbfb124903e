use std::collections::HashMap;

use crate::table::{DataType, Field, Table, Value};

/// Cells that are decoded as [`Value::Null`], regardless of the column's type
static NULL_MARKERS: [&'static str; 19] = [
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

#[derive(Debug)]
pub enum DecodeError {
    /// The data is not valid UTF-8
    Utf8(std::str::Utf8Error),
    /// The data has no header row
    MissingHeader,
    /// The data is not valid CSV
    Csv(csv::Error),
    /// A record has more fields than the header
    TooManyFields {
        line: u64,
        expected: usize,
        found: usize,
    },
}

impl std::error::Error for DecodeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Utf8(e) => Some(e),
            Self::MissingHeader => None,
            Self::Csv(e) => Some(e),
            Self::TooManyFields { .. } => None,
        }
    }
}

impl std::fmt::Display for DecodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Utf8(e) => write!(f, "invalid UTF-8: {e}"),
            Self::MissingHeader => write!(f, "CSV has no header row"),
            Self::Csv(e) => write!(f, "invalid CSV: {e}"),
            Self::TooManyFields {
                line,
                expected,
                found,
            } => write!(
                f,
                "record on line {line} has {found} fields, the header has {expected}"
            ),
        }
    }
}

/// Decodes UTF-8, comma-separated `data` whose first row is the header into a [`Table`].
/// The type of each column is inferred from its cells.
/// # Error
/// Errors if `data` is not UTF-8, has no header, or any record has more fields than the
/// header. No partial table is returned. Missing trailing fields are decoded as nulls.
pub fn decode(data: &[u8]) -> Result<Table, DecodeError> {
    let text = std::str::from_utf8(data).map_err(DecodeError::Utf8)?;
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);

    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(b',')
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers = rdr.headers().map_err(DecodeError::Csv)?.clone();
    if headers.is_empty() {
        return Err(DecodeError::MissingHeader);
    }
    let names = column_names(&headers);

    let records = rdr
        .records()
        .collect::<Result<Vec<_>, _>>()
        .map_err(DecodeError::Csv)?;
    if let Some(record) = records.iter().find(|record| record.len() > headers.len()) {
        return Err(DecodeError::TooManyFields {
            line: record.position().map(|p| p.line()).unwrap_or_default(),
            expected: headers.len(),
            found: record.len(),
        });
    }

    let mut schema = Vec::with_capacity(names.len());
    let mut columns = Vec::with_capacity(names.len());
    for (i, name) in names.into_iter().enumerate() {
        let cells = records
            .iter()
            .map(|record| record.get(i).unwrap_or_default())
            .collect::<Vec<_>>();
        let (data_type, values) = infer(&cells);
        schema.push(Field { name, data_type });
        columns.push(values.into_iter());
    }

    let rows = (0..records.len())
        .map(|_| {
            columns
                .iter_mut()
                .map(|column| column.next().unwrap_or(Value::Null))
                .collect()
        })
        .collect();

    Ok(Table::new(schema, rows))
}

/// Empty names become `Unnamed: {i}`; repeated names get a `.{n}` suffix
fn column_names(headers: &csv::StringRecord) -> Vec<String> {
    let mut suffixes = HashMap::<String, usize>::new();
    let mut names = Vec::<String>::with_capacity(headers.len());
    for (i, name) in headers.iter().enumerate() {
        let base = if name.is_empty() {
            format!("Unnamed: {i}")
        } else {
            name.to_string()
        };
        let mut candidate = base.clone();
        while names.contains(&candidate) {
            let suffix = suffixes.entry(base.clone()).or_default();
            *suffix += 1;
            candidate = format!("{base}.{suffix}");
        }
        names.push(candidate);
    }
    names
}

fn is_null(cell: &str) -> bool {
    NULL_MARKERS.contains(&cell)
}

fn parse_bool(cell: &str) -> Option<bool> {
    match cell {
        "true" | "True" | "TRUE" => Some(true),
        "false" | "False" | "FALSE" => Some(false),
        _ => None,
    }
}

/// Returns the column if every non-null cell is parsed by `parse`.
/// Cells are trimmed before parsing.
fn typed<T>(
    cells: &[&str],
    parse: impl Fn(&str) -> Option<T>,
    wrap: fn(T) -> Value,
) -> Option<Vec<Value>> {
    cells
        .iter()
        .map(|cell| {
            if is_null(cell) {
                Some(Value::Null)
            } else {
                parse(cell.trim()).map(wrap)
            }
        })
        .collect()
}

/// Infers the narrowest [`DataType`] of a column: integer, then float, then boolean,
/// falling back to text.
fn infer(cells: &[&str]) -> (DataType, Vec<Value>) {
    if cells.iter().all(|cell| is_null(cell)) {
        return (DataType::Utf8, vec![Value::Null; cells.len()]);
    }
    if let Some(values) = typed(cells, |x| x.parse::<i64>().ok(), Value::Int64) {
        return (DataType::Int64, values);
    }
    if let Some(values) = typed(cells, |x| x.parse::<f64>().ok(), Value::Float64) {
        return (DataType::Float64, values);
    }
    if let Some(values) = typed(cells, parse_bool, Value::Boolean) {
        return (DataType::Boolean, values);
    }
    let values = cells
        .iter()
        .map(|cell| {
            if is_null(cell) {
                Value::Null
            } else {
                Value::Utf8(cell.to_string())
            }
        })
        .collect();
    (DataType::Utf8, values)
}
