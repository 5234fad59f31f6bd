use super::dataset::{Cell, Column, ColumnKind, Table};
use super::ingest::parse_number;
use super::profiler::stats;

/// Coercion threshold: a text column becomes numeric when more than this
/// share of its cells parse as numbers.
const NUMERIC_COERCION_RATIO: f64 = 0.6;

/// Produce a cleaned copy of the table: mis-typed text columns are coerced
/// to numeric, then nulls are imputed (median for numeric columns, mode for
/// the rest). The input table is left untouched.
pub fn auto_clean(table: &Table) -> Table {
    let columns = table
        .columns
        .iter()
        .map(|column| {
            let column = coerce_numeric(column);
            match column.kind {
                ColumnKind::Numeric => impute_median(column),
                _ => impute_mode(column),
            }
        })
        .collect();
    Table { columns }
}

fn coerce_numeric(column: &Column) -> Column {
    if column.kind == ColumnKind::Numeric {
        return column.clone();
    }

    let parsed: Vec<Option<f64>> = column
        .cells
        .iter()
        .map(|cell| match cell {
            Some(Cell::Number(n)) => Some(*n),
            Some(Cell::Text(s)) => parse_number(s),
            None => None,
        })
        .collect();

    let parsed_count = parsed.iter().flatten().count();
    if parsed_count as f64 > column.cells.len() as f64 * NUMERIC_COERCION_RATIO {
        tracing::debug!(column = %column.name, "coercing mixed column to numeric");
        Column {
            name: column.name.clone(),
            kind: ColumnKind::Numeric,
            cells: parsed.into_iter().map(|n| n.map(Cell::Number)).collect(),
        }
    } else {
        column.clone()
    }
}

fn impute_median(mut column: Column) -> Column {
    let values = column.numeric_values();
    if let Some(median) = stats::median(&values) {
        for cell in &mut column.cells {
            if cell.is_none() {
                *cell = Some(Cell::Number(median));
            }
        }
    }
    column
}

/// Fill nulls with the most frequent non-null value; ties resolve to the
/// smallest value, and a column with no mode at all falls back to the empty
/// string.
fn impute_mode(mut column: Column) -> Column {
    let mode = mode_value(&column).unwrap_or_default();
    for cell in &mut column.cells {
        if cell.is_none() {
            *cell = Some(Cell::Text(mode.clone()));
        }
    }
    column
}

fn mode_value(column: &Column) -> Option<String> {
    let mut counts: Vec<(String, usize)> = Vec::new();
    for cell in column.cells.iter().flatten() {
        let value = cell.render();
        match counts.iter_mut().find(|(v, _)| *v == value) {
            Some((_, n)) => *n += 1,
            None => counts.push((value, 1)),
        }
    }
    let best = counts.iter().map(|(_, n)| *n).max()?;
    counts
        .into_iter()
        .filter(|(_, n)| *n == best)
        .map(|(v, _)| v)
        .min()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_column(name: &str, values: &[Option<&str>]) -> Column {
        Column {
            name: name.to_string(),
            kind: ColumnKind::Categorical,
            cells: values
                .iter()
                .map(|v| v.map(|s| Cell::Text(s.to_string())))
                .collect(),
        }
    }

    fn numeric_column(name: &str, values: &[Option<f64>]) -> Column {
        Column {
            name: name.to_string(),
            kind: ColumnKind::Numeric,
            cells: values.iter().map(|v| v.map(Cell::Number)).collect(),
        }
    }

    #[test]
    fn coerces_mostly_numeric_text_column() {
        let table = Table {
            columns: vec![text_column(
                "a",
                &[Some("1"), Some("2"), Some("3"), Some("oops"), Some("5")],
            )],
        };
        let cleaned = auto_clean(&table);
        let col = &cleaned.columns[0];
        assert_eq!(col.kind, ColumnKind::Numeric);
        // "oops" became null and was imputed with the median of {1,2,3,5}
        assert_eq!(col.cells[3], Some(Cell::Number(2.5)));
    }

    #[test]
    fn does_not_coerce_at_sixty_percent_or_below() {
        // 3 of 5 parse: 60% is not strictly greater than the threshold.
        let table = Table {
            columns: vec![text_column(
                "a",
                &[Some("1"), Some("2"), Some("3"), Some("x"), Some("y")],
            )],
        };
        let cleaned = auto_clean(&table);
        assert_eq!(cleaned.columns[0].kind, ColumnKind::Categorical);
    }

    #[test]
    fn numeric_nulls_filled_with_median() {
        let table = Table {
            columns: vec![numeric_column("a", &[Some(1.0), Some(2.0), Some(3.0), None])],
        };
        let cleaned = auto_clean(&table);
        let col = &cleaned.columns[0];
        assert_eq!(col.cells[3], Some(Cell::Number(2.0)));
        assert_eq!(col.null_count(), 0);
    }

    #[test]
    fn text_nulls_filled_with_mode() {
        let table = Table {
            columns: vec![text_column("b", &[Some("x"), Some("y"), Some("x"), None])],
        };
        let cleaned = auto_clean(&table);
        assert_eq!(cleaned.columns[0].cells[3], Some(Cell::Text("x".into())));
    }

    #[test]
    fn all_null_text_column_filled_with_empty_string() {
        let table = Table {
            columns: vec![text_column("b", &[None, None])],
        };
        let cleaned = auto_clean(&table);
        assert_eq!(cleaned.columns[0].cells[0], Some(Cell::Text(String::new())));
    }

    #[test]
    fn cleaning_preserves_shape_and_input() {
        let table = Table {
            columns: vec![
                numeric_column("a", &[Some(1.0), None]),
                text_column("b", &[Some("x"), None]),
            ],
        };
        let cleaned = auto_clean(&table);
        assert_eq!(cleaned.height(), table.height());
        assert_eq!(cleaned.width(), table.width());
        // input untouched
        assert_eq!(table.columns[0].null_count(), 1);
    }
}
