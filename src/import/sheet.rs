//! Decoding an uploaded workbook into positional rows.
//!
//! The first sheet row is the header. Every later row, blank ones included,
//! becomes a [`SheetRow`], so data row 0 is the second row of the sheet.
//! Columns are counted from column A regardless of where the used range
//! starts.

use std::collections::HashMap;
use std::io::Cursor;
use std::path::Path;

use calamine::{open_workbook_auto_from_rs, Data, Reader};
use serde::ser::{Serialize, SerializeMap, Serializer};

use super::ImportError;

#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Int(i64),
    Float(f64),
    Text(String),
    Bool(bool),
}

impl Cell {
    /// Integral value of the cell, if it holds one. Numeric text counts.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Cell::Int(n) => Some(*n),
            Cell::Float(f) if f.is_finite() && f.fract() == 0.0 => Some(*f as i64),
            Cell::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// Text rendering used for name-like fields. Blank cells give "".
    pub fn to_text(&self) -> String {
        match self {
            Cell::Empty => String::new(),
            Cell::Int(n) => n.to_string(),
            Cell::Float(f) => f.to_string(),
            Cell::Text(s) => s.trim().to_string(),
            Cell::Bool(b) => b.to_string(),
        }
    }
}

impl From<&Data> for Cell {
    fn from(data: &Data) -> Self {
        match data {
            Data::Empty => Cell::Empty,
            Data::Int(n) => Cell::Int(*n),
            Data::Float(f) => Cell::Float(*f),
            Data::String(s) => Cell::Text(s.clone()),
            Data::Bool(b) => Cell::Bool(*b),
            other => Cell::Text(other.to_string()),
        }
    }
}

impl Serialize for Cell {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Cell::Empty => serializer.serialize_none(),
            Cell::Int(n) => serializer.serialize_i64(*n),
            Cell::Float(f) => serializer.serialize_f64(*f),
            Cell::Text(s) => serializer.serialize_str(s),
            Cell::Bool(b) => serializer.serialize_bool(*b),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SheetRow {
    cells: Vec<Cell>,
}

impl SheetRow {
    pub fn new(cells: Vec<Cell>) -> Self {
        Self { cells }
    }

    pub fn cell(&self, column: usize) -> Option<&Cell> {
        self.cells.get(column)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.iter().all(Cell::is_empty)
    }
}

#[derive(Debug, Clone, Default)]
pub struct Sheet {
    columns: Vec<String>,
    rows: Vec<SheetRow>,
}

impl Sheet {
    /// Build a sheet from a header row and data rows. Header cells that are
    /// blank are labelled `Unnamed: N`; repeated labels get a `.N` suffix.
    pub fn new(header: &[Cell], rows: Vec<SheetRow>) -> Self {
        let width = rows.iter().map(SheetRow::len).max().unwrap_or(0).max(header.len());
        let mut seen: HashMap<String, usize> = HashMap::new();
        let columns = (0..width)
            .map(|column| {
                let label = match header.get(column) {
                    Some(cell) if !cell.is_empty() => cell.to_text(),
                    _ => format!("Unnamed: {column}"),
                };
                let count = seen.entry(label.clone()).or_insert(0);
                *count += 1;
                if *count > 1 {
                    format!("{label}.{}", *count - 1)
                } else {
                    label
                }
            })
            .collect();
        Self { columns, rows }
    }

    /// Decode the first worksheet of an xlsx/xls/ods workbook.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ImportError> {
        let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))?;
        let range = workbook
            .worksheet_range_at(0)
            .ok_or(ImportError::EmptyWorkbook)??;

        let Some((last_row, last_col)) = range.end() else {
            return Ok(Self::default());
        };

        let mut grid = (0..=last_row).map(|row| {
            (0..=last_col)
                .map(|col| range.get_value((row, col)).map(Cell::from).unwrap_or(Cell::Empty))
                .collect::<Vec<_>>()
        });

        let header = grid.next().unwrap_or_default();
        let rows = grid.map(SheetRow::new).collect();
        Ok(Self::new(&header, rows))
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[SheetRow] {
        &self.rows
    }

    /// Write the decoded rows as a JSON array of `{label: value}` records,
    /// replacing any previous dump.
    pub fn write_dump(&self, path: &Path) -> Result<(), ImportError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let records: Vec<Record<'_>> = self
            .rows
            .iter()
            .map(|row| Record {
                columns: &self.columns,
                row,
            })
            .collect();
        let file = std::fs::File::create(path)?;
        serde_json::to_writer_pretty(std::io::BufWriter::new(file), &records)?;
        Ok(())
    }
}

/// One row keyed by column label, in column order.
struct Record<'a> {
    columns: &'a [String],
    row: &'a SheetRow,
}

impl Serialize for Record<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.columns.len()))?;
        for (column, label) in self.columns.iter().enumerate() {
            map.serialize_entry(label, self.row.cell(column).unwrap_or(&Cell::Empty))?;
        }
        map.end()
    }
}
