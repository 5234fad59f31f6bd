use chrono::{NaiveDate, NaiveDateTime};
use serde_json::Value;

use super::dataset::{Cell, Column, ColumnKind, Table};

/// Parse raw dataset text into a [`Table`], trying formats in a fixed order:
/// JSON (only when the trimmed text starts with `{` or `[`), then
/// comma-delimited, then tab-delimited. The final fallback is a single
/// `text` column holding the input lines and can never fail.
pub fn parse_dataset_text(text: &str) -> Table {
    let trimmed = text.trim();

    if trimmed.starts_with('{') || trimmed.starts_with('[') {
        if let Some(table) = parse_json(trimmed) {
            tracing::debug!("ingested input as JSON");
            return table;
        }
    }

    if let Some(table) = parse_delimited(trimmed, b',') {
        tracing::debug!("ingested input as CSV");
        return table;
    }

    if let Some(table) = parse_delimited(trimmed, b'\t') {
        tracing::debug!("ingested input as TSV");
        return table;
    }

    tracing::debug!("falling back to raw text ingestion");
    text_fallback(trimmed)
}

fn parse_json(text: &str) -> Option<Table> {
    let value: Value = serde_json::from_str(text).ok()?;
    let raw_columns = match value {
        Value::Array(records) => columns_from_records(records)?,
        Value::Object(map) => {
            // Object-of-arrays: {"col": [v, v, ...], ...}
            let mut columns = Vec::new();
            let mut height = None;
            for (name, entry) in map {
                let Value::Array(values) = entry else {
                    return None;
                };
                match height {
                    None => height = Some(values.len()),
                    Some(h) if h != values.len() => return None,
                    _ => {}
                }
                columns.push((name, values.into_iter().map(json_cell).collect()));
            }
            columns
        }
        _ => return None,
    };

    let columns = raw_columns
        .into_iter()
        .map(|(name, cells)| type_column(name, cells))
        .collect();
    Some(Table { columns })
}

/// Array-of-records: column order follows first appearance of each key.
fn columns_from_records(records: Vec<Value>) -> Option<Vec<(String, Vec<Option<Cell>>)>> {
    let mut names: Vec<String> = Vec::new();
    let mut columns: Vec<Vec<Option<Cell>>> = Vec::new();

    for (row, record) in records.iter().enumerate() {
        let Value::Object(map) = record else {
            return None;
        };
        for (key, value) in map {
            let idx = match names.iter().position(|n| n == key) {
                Some(idx) => idx,
                None => {
                    names.push(key.clone());
                    columns.push(vec![None; row]);
                    names.len() - 1
                }
            };
            columns[idx].resize(row, None);
            columns[idx].push(json_cell(value.clone()));
        }
        for column in &mut columns {
            column.resize(row + 1, None);
        }
    }

    Some(names.into_iter().zip(columns).collect())
}

fn json_cell(value: Value) -> Option<Cell> {
    match value {
        Value::Null => None,
        Value::Number(n) => n.as_f64().map(Cell::Number),
        Value::String(s) => Some(Cell::Text(s)),
        Value::Bool(b) => Some(Cell::Text(b.to_string())),
        other => Some(Cell::Text(other.to_string())),
    }
}

fn parse_delimited(text: &str, delimiter: u8) -> Option<Table> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .ok()?
        .iter()
        .map(|h| h.to_string())
        .collect();
    if headers.is_empty() || headers.iter().all(|h| h.is_empty()) {
        return None;
    }

    let mut rows: Vec<Vec<Option<Cell>>> = Vec::new();
    for record in reader.records() {
        let record = record.ok()?;
        // Short rows are padded with nulls; over-long rows reject the format.
        if record.len() > headers.len() {
            return None;
        }
        let mut row: Vec<Option<Cell>> = record
            .iter()
            .map(|field| {
                if field.is_empty() {
                    None
                } else {
                    Some(Cell::Text(field.to_string()))
                }
            })
            .collect();
        row.resize(headers.len(), None);
        rows.push(row);
    }

    let columns = headers
        .into_iter()
        .enumerate()
        .map(|(idx, name)| {
            let cells = rows.iter().map(|row| row[idx].clone()).collect();
            type_column(name, cells)
        })
        .collect();
    Some(Table { columns })
}

fn text_fallback(text: &str) -> Table {
    let cells = text
        .lines()
        .map(|line| Some(Cell::Text(line.to_string())))
        .collect();
    Table {
        columns: vec![Column {
            name: "text".to_string(),
            kind: ColumnKind::Categorical,
            cells,
        }],
    }
}

/// Infer the column kind from raw cells: numeric when every non-null cell
/// parses as a number, datetime when most non-null cells look like dates,
/// categorical otherwise.
fn type_column(name: String, cells: Vec<Option<Cell>>) -> Column {
    let non_null: Vec<&Cell> = cells.iter().flatten().collect();

    if !non_null.is_empty() {
        let numbers: Vec<Option<f64>> = cells
            .iter()
            .map(|cell| match cell {
                Some(Cell::Number(n)) => Some(*n),
                Some(Cell::Text(s)) => parse_number(s),
                None => None,
            })
            .collect();
        if numbers.iter().flatten().count() == non_null.len() {
            return Column {
                name,
                kind: ColumnKind::Numeric,
                cells: numbers.into_iter().map(|n| n.map(Cell::Number)).collect(),
            };
        }

        let date_count = non_null
            .iter()
            .filter(|cell| match cell {
                Cell::Text(s) => is_date_string(s),
                Cell::Number(_) => false,
            })
            .count();
        if date_count as f64 / non_null.len() as f64 > 0.5 {
            return Column {
                name,
                kind: ColumnKind::Datetime,
                cells,
            };
        }
    }

    Column {
        name,
        kind: ColumnKind::Categorical,
        cells,
    }
}

pub fn parse_number(s: &str) -> Option<f64> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|n| n.is_finite())
}

pub fn is_date_string(s: &str) -> bool {
    const DATE_FORMATS: [&str; 5] = ["%Y-%m-%d", "%d/%m/%Y", "%m/%d/%Y", "%Y/%m/%d", "%d-%m-%Y"];
    const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%d/%m/%Y %H:%M:%S"];

    DATE_FORMATS
        .iter()
        .any(|fmt| NaiveDate::parse_from_str(s, fmt).is_ok())
        || DATETIME_FORMATS
            .iter()
            .any(|fmt| NaiveDateTime::parse_from_str(s, fmt).is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn csv_column_names_and_row_count_match_source() {
        let table = parse_dataset_text("a,b,c\n1,x,2024-01-01\n2,y,2024-01-02\n");
        assert_eq!(table.width(), 3);
        assert_eq!(table.height(), 2);
        let names: Vec<&str> = table.columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["a", "b", "c"]);
        assert_eq!(table.columns[0].kind, ColumnKind::Numeric);
        assert_eq!(table.columns[1].kind, ColumnKind::Categorical);
        assert_eq!(table.columns[2].kind, ColumnKind::Datetime);
    }

    #[test]
    fn csv_round_trip_is_stable() {
        let table = parse_dataset_text("a,b\n1,x\n2,y\n");
        let serialized = table.to_csv().unwrap();
        let reparsed = parse_dataset_text(&serialized);
        assert_eq!(reparsed.height(), table.height());
        let names: Vec<&str> = reparsed.columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["a", "b"]);
        assert_eq!(reparsed.to_csv().unwrap(), serialized);
    }

    #[test]
    fn json_array_of_records_keeps_first_appearance_order() {
        let table = parse_dataset_text(r#"[{"b": 1, "a": "x"}, {"a": "y", "b": 2, "c": true}]"#);
        let names: Vec<&str> = table.columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["b", "a", "c"]);
        assert_eq!(table.height(), 2);
        assert_eq!(table.columns[0].kind, ColumnKind::Numeric);
        // "c" is absent in the first record
        assert_eq!(table.column("c").unwrap().null_count(), 1);
    }

    #[test]
    fn json_object_of_arrays() {
        let table = parse_dataset_text(r#"{"a": [1, 2, null], "b": ["x", "y", "z"]}"#);
        assert_eq!(table.height(), 3);
        assert_eq!(table.column("a").unwrap().null_count(), 1);
        assert_eq!(table.column("a").unwrap().kind, ColumnKind::Numeric);
    }

    #[test]
    fn json_looking_csv_is_not_misrouted() {
        // Prefix heuristic sends it to the JSON parser, which fails, and the
        // CSV attempt takes over.
        let table = parse_dataset_text("{id,name\n1,x\n2,y");
        assert_eq!(table.width(), 2);
        assert_eq!(table.height(), 2);
    }

    #[test]
    fn tsv_is_tried_after_csv() {
        // An over-long comma row rejects CSV, tabs are consistent.
        let table = parse_dataset_text("a\tb\n1,2,3\t4\n5\t6\n");
        assert_eq!(table.width(), 2);
        assert_eq!(table.columns[0].name, "a");
        assert_eq!(table.columns[1].name, "b");
        assert_eq!(table.height(), 2);
    }

    #[test]
    fn raw_text_fallback_never_fails() {
        let table = parse_dataset_text("x,y\tz\n1,2,3\t4\t5\nplain line");
        assert_eq!(table.width(), 1);
        assert_eq!(table.columns[0].name, "text");
        assert_eq!(table.height(), 3);
    }

    #[test]
    fn empty_input_yields_empty_text_table() {
        let table = parse_dataset_text("");
        assert_eq!(table.width(), 1);
        assert_eq!(table.columns[0].name, "text");
        assert_eq!(table.height(), 0);
    }

    #[test]
    fn short_csv_rows_are_padded_with_nulls() {
        let table = parse_dataset_text("a,b\n1,2\n3\n");
        assert_eq!(table.height(), 2);
        assert_eq!(table.column("b").unwrap().null_count(), 1);
    }
}
