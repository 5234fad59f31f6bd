use std::collections::HashSet;

use crate::error::AppError;

/// A single cell value. Missing cells are represented as `None` at the
/// column level, so `Cell` itself is always a present value.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Number(f64),
    Text(String),
}

impl Cell {
    pub fn render(&self) -> String {
        match self {
            Cell::Number(n) => format!("{}", n),
            Cell::Text(s) => s.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Numeric,
    Categorical,
    Datetime,
}

impl ColumnKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnKind::Numeric => "numeric",
            ColumnKind::Categorical => "categorical",
            ColumnKind::Datetime => "datetime",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Column {
    pub name: String,
    pub kind: ColumnKind,
    pub cells: Vec<Option<Cell>>,
}

impl Column {
    pub fn null_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_none()).count()
    }

    pub fn non_null_count(&self) -> usize {
        self.cells.len() - self.null_count()
    }

    /// Non-null numeric values in row order. Text cells are skipped, so for
    /// a `Numeric` column this is exactly the defined sample.
    pub fn numeric_values(&self) -> Vec<f64> {
        self.cells
            .iter()
            .filter_map(|c| match c {
                Some(Cell::Number(n)) => Some(*n),
                _ => None,
            })
            .collect()
    }

    /// All cells rendered as text, nulls becoming the empty string.
    pub fn text_values(&self) -> Vec<String> {
        self.cells
            .iter()
            .map(|c| c.as_ref().map(Cell::render).unwrap_or_default())
            .collect()
    }

    /// Value frequencies sorted by descending count; ties keep first-seen
    /// order. Nulls count as the empty string.
    pub fn value_counts(&self) -> Vec<(String, usize)> {
        let mut order: Vec<String> = Vec::new();
        let mut counts: Vec<usize> = Vec::new();
        for value in self.text_values() {
            match order.iter().position(|v| *v == value) {
                Some(idx) => counts[idx] += 1,
                None => {
                    order.push(value);
                    counts.push(1);
                }
            }
        }
        let mut pairs: Vec<(String, usize)> = order.into_iter().zip(counts).collect();
        pairs.sort_by(|a, b| b.1.cmp(&a.1));
        pairs
    }

    /// Distinct value count with nulls counted as one extra distinct value,
    /// mirroring `nunique(dropna=False)`.
    pub fn unique_count_with_nulls(&self) -> usize {
        let mut seen = HashSet::new();
        for cell in &self.cells {
            seen.insert(cell_key(cell));
        }
        seen.len()
    }
}

/// An immutable, column-major table. Every pipeline stage consumes one table
/// and produces a new one; row count is uniform across columns.
#[derive(Debug, Clone, Default)]
pub struct Table {
    pub columns: Vec<Column>,
}

impl Table {
    pub fn height(&self) -> usize {
        self.columns.first().map_or(0, |c| c.cells.len())
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn numeric_columns(&self) -> Vec<&Column> {
        self.columns
            .iter()
            .filter(|c| c.kind == ColumnKind::Numeric)
            .collect()
    }

    pub fn categorical_columns(&self) -> Vec<&Column> {
        self.columns
            .iter()
            .filter(|c| c.kind == ColumnKind::Categorical)
            .collect()
    }

    /// Number of rows that exactly duplicate an earlier row.
    pub fn duplicate_row_count(&self) -> usize {
        if self.columns.is_empty() {
            return 0;
        }
        let mut seen = HashSet::new();
        let mut duplicates = 0;
        for row in 0..self.height() {
            let key: Vec<RowKey> = self
                .columns
                .iter()
                .map(|c| cell_key(&c.cells[row]))
                .collect();
            if !seen.insert(key) {
                duplicates += 1;
            }
        }
        duplicates
    }

    /// Comma-serialization of the table (header row plus data rows, nulls as
    /// empty fields). Used by export collaborators.
    pub fn to_csv(&self) -> Result<String, AppError> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer
            .write_record(self.columns.iter().map(|c| c.name.as_str()))
            .map_err(|e| AppError::Internal(e.to_string()))?;
        for row in 0..self.height() {
            let record: Vec<String> = self
                .columns
                .iter()
                .map(|c| c.cells[row].as_ref().map(Cell::render).unwrap_or_default())
                .collect();
            writer
                .write_record(&record)
                .map_err(|e| AppError::Internal(e.to_string()))?;
        }
        let bytes = writer
            .into_inner()
            .map_err(|e| AppError::Internal(e.to_string()))?;
        String::from_utf8(bytes).map_err(|e| AppError::Internal(e.to_string()))
    }
}

/// Hashable stand-in for a cell; f64 cells key on their bit pattern.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum RowKey {
    Null,
    Number(u64),
    Text(String),
}

fn cell_key(cell: &Option<Cell>) -> RowKey {
    match cell {
        None => RowKey::Null,
        Some(Cell::Number(n)) => RowKey::Number(n.to_bits()),
        Some(Cell::Text(s)) => RowKey::Text(s.clone()),
    }
}
