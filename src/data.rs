use serde_json::Value;
use std::io::Read;
use thiserror::Error;
use tracing::{debug, info};

/// Month abbreviations in calendar order, as they appear in `month_name`.
pub const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Failed to read data source '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("Failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Input data must be a JSON array of objects")]
    NotAnArray,
    #[error("Input data array is empty")]
    EmptyArray,
    #[error("Unsupported value type for field '{0}'")]
    UnsupportedValue(String),
    #[error("Required column '{0}' not found")]
    MissingColumn(String),
    #[error("Row {row}: column '{column}' holds '{value}', expected a non-negative integer")]
    InvalidNumber {
        row: usize,
        column: String,
        value: String,
    },
    #[error("Row {row}: month {month} is outside 1-12")]
    MonthOutOfRange { row: usize, month: u64 },
    #[error("Row {row}: unknown month abbreviation '{value}'")]
    UnknownMonth { row: usize, value: String },
}

/// Raw tabular data: a header row plus string cells.
#[derive(Debug, Clone, Default)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    /// Parse comma-separated text with a header row.
    /// Short rows are allowed; missing cells read as empty strings.
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self, LoadError> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::Headers)
            .from_reader(reader);

        let headers = rdr.headers()?.iter().map(|h| h.to_string()).collect();
        let mut rows = Vec::new();
        for record in rdr.records() {
            let record = record?;
            rows.push(record.iter().map(|cell| cell.to_string()).collect());
        }

        Ok(Self { headers, rows })
    }

    pub fn from_csv_str(text: &str) -> Result<Self, LoadError> {
        Self::from_csv_reader(text.as_bytes())
    }

    /// Create a Table from a JSON array of objects; headers come from the first object.
    pub fn from_json(value: &Value) -> Result<Self, LoadError> {
        let array = value.as_array().ok_or(LoadError::NotAnArray)?;
        let first = array.first().ok_or(LoadError::EmptyArray)?;
        let first_obj = first.as_object().ok_or(LoadError::NotAnArray)?;

        let headers: Vec<String> = first_obj.keys().cloned().collect();

        let mut rows = Vec::with_capacity(array.len());
        for item in array {
            let obj = item.as_object().ok_or(LoadError::NotAnArray)?;

            let mut row = Vec::with_capacity(headers.len());
            for header in &headers {
                let cell = match obj.get(header) {
                    Some(Value::String(s)) => s.clone(),
                    Some(Value::Number(n)) => n.to_string(),
                    Some(Value::Bool(b)) => b.to_string(),
                    Some(Value::Null) | None => String::new(),
                    _ => return Err(LoadError::UnsupportedValue(header.clone())),
                };
                row.push(cell);
            }
            rows.push(row);
        }

        Ok(Self { headers, rows })
    }

    /// Locate a column, preferring an exact header match over a case-insensitive one.
    fn column(&self, name: &str) -> Result<usize, LoadError> {
        self.headers
            .iter()
            .position(|h| h == name)
            .or_else(|| self.headers.iter().position(|h| h.eq_ignore_ascii_case(name)))
            .ok_or_else(|| LoadError::MissingColumn(name.to_string()))
    }
}

fn cell(row: &[String], idx: usize) -> &str {
    row.get(idx).map(String::as_str).unwrap_or("")
}

fn parse_count(row: usize, column: &str, value: &str) -> Result<u64, LoadError> {
    value.trim().parse::<u64>().map_err(|_| LoadError::InvalidNumber {
        row,
        column: column.to_string(),
        value: value.to_string(),
    })
}

/// One row of the per-reason totals resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReasonCount {
    pub reason: String,
    pub count: u64,
}

impl ReasonCount {
    pub fn new(reason: impl Into<String>, count: u64) -> Self {
        Self { reason: reason.into(), count }
    }

    pub fn from_table(table: &Table) -> Result<Vec<Self>, LoadError> {
        let reason_idx = table.column("reason")?;
        let count_idx = table.column("Count")?;

        table
            .rows
            .iter()
            .enumerate()
            .map(|(i, row)| {
                Ok(Self {
                    reason: cell(row, reason_idx).trim().to_string(),
                    count: parse_count(i + 1, "Count", cell(row, count_idx))?,
                })
            })
            .collect()
    }
}

/// One row of the detailed (reason × neighborhood × month) resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComplaintRecord {
    pub reason: String,
    pub neighborhood: String,
    pub month: u8,
    pub month_name: String,
    pub count: u64,
}

impl ComplaintRecord {
    pub fn from_table(table: &Table) -> Result<Vec<Self>, LoadError> {
        let reason_idx = table.column("reason")?;
        let neighborhood_idx = table.column("neighborhood")?;
        let month_idx = table.column("month")?;
        let month_name_idx = table.column("month_name")?;
        let count_idx = table.column("count")?;

        let mut records = Vec::with_capacity(table.rows.len());
        for (i, row) in table.rows.iter().enumerate() {
            let row_no = i + 1;

            let month = parse_count(row_no, "month", cell(row, month_idx))?;
            if !(1..=12).contains(&month) {
                return Err(LoadError::MonthOutOfRange { row: row_no, month });
            }

            let month_name = cell(row, month_name_idx).trim();
            if !MONTHS.contains(&month_name) {
                return Err(LoadError::UnknownMonth {
                    row: row_no,
                    value: month_name.to_string(),
                });
            }

            records.push(Self {
                reason: cell(row, reason_idx).trim().to_string(),
                neighborhood: cell(row, neighborhood_idx).trim().to_string(),
                month: month as u8,
                month_name: month_name.to_string(),
                count: parse_count(row_no, "count", cell(row, count_idx))?,
            });
        }

        Ok(records)
    }
}

/// Read a data source into a Table. `-` reads CSV from stdin; a `.json`
/// extension selects the JSON array-of-objects reader.
pub fn load_table(path: &str) -> Result<Table, LoadError> {
    let io_err = |source| LoadError::Io { path: path.to_string(), source };

    let table = if path == "-" {
        let mut text = String::new();
        std::io::stdin().read_to_string(&mut text).map_err(io_err)?;
        Table::from_csv_str(&text)?
    } else {
        let text = std::fs::read_to_string(path).map_err(io_err)?;
        if path.to_ascii_lowercase().ends_with(".json") {
            Table::from_json(&serde_json::from_str(&text)?)?
        } else {
            Table::from_csv_str(&text)?
        }
    };

    debug!(path, columns = ?table.headers, "parsed data source");
    Ok(table)
}

pub fn load_reason_counts(path: &str) -> Result<Vec<ReasonCount>, LoadError> {
    let records = ReasonCount::from_table(&load_table(path)?)?;
    info!(path, rows = records.len(), "loaded reason totals");
    Ok(records)
}

pub fn load_complaints(path: &str) -> Result<Vec<ComplaintRecord>, LoadError> {
    let records = ComplaintRecord::from_table(&load_table(path)?)?;
    info!(path, rows = records.len(), "loaded complaint records");
    Ok(records)
}
