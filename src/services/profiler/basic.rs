use rayon::prelude::*;
use std::collections::BTreeMap;

use super::stats;
use crate::models::{ColumnSummary, EdaReport};
use crate::services::dataset::{Column, ColumnKind, Table};

/// Minimum non-null sample for IQR outlier detection; smaller columns are
/// omitted from `outliers_count` entirely.
const MIN_OUTLIER_SAMPLE: usize = 4;

/// Build the basic report sections from the cleaned table. Null counts come
/// from the table as ingested, before imputation erased them.
pub fn profile(cleaned: &Table, ingested: &Table) -> EdaReport {
    let mut report = EdaReport {
        rows: cleaned.height(),
        columns: cleaned.width(),
        columns_list: cleaned.columns.iter().map(|c| c.name.clone()).collect(),
        ..EdaReport::default()
    };

    report.missing_values = ingested
        .columns
        .iter()
        .map(|c| (c.name.clone(), c.null_count()))
        .collect();

    report.types = cleaned
        .columns
        .iter()
        .map(|c| (c.name.clone(), c.kind.as_str().to_string()))
        .collect();

    report.summary = cleaned
        .columns
        .par_iter()
        .map(|c| (c.name.clone(), summarize_column(c)))
        .collect::<Vec<_>>()
        .into_iter()
        .collect();

    report.correlation = correlation_section(cleaned);
    report.outliers_count = outliers_section(cleaned);
    report
}

fn summarize_column(column: &Column) -> ColumnSummary {
    match column.kind {
        ColumnKind::Numeric => {
            let values = column.numeric_values();
            ColumnSummary {
                count: values.len(),
                mean: stats::mean(&values),
                std: stats::sample_std(&values),
                min: values.iter().copied().reduce(f64::min),
                q25: stats::quantile(&values, 0.25),
                q50: stats::quantile(&values, 0.5),
                q75: stats::quantile(&values, 0.75),
                max: values.iter().copied().reduce(f64::max),
                ..ColumnSummary::default()
            }
        }
        _ => {
            let counts = column.value_counts();
            let top = counts.first().cloned();
            ColumnSummary {
                count: column.non_null_count(),
                unique: Some(counts.len()),
                top: top.as_ref().map(|(value, _)| value.clone()),
                freq: top.map(|(_, count)| count),
                ..ColumnSummary::default()
            }
        }
    }
}

/// Pairwise Pearson matrix over numeric columns, present only when at least
/// two exist; undefined coefficients are reported as zero.
fn correlation_section(table: &Table) -> BTreeMap<String, BTreeMap<String, f64>> {
    let numeric = table.numeric_columns();
    if numeric.len() < 2 {
        return BTreeMap::new();
    }
    let values: Vec<Vec<f64>> = numeric.iter().map(|c| c.numeric_values()).collect();
    let matrix = stats::correlation_matrix(&values);

    let mut section = BTreeMap::new();
    for (i, col_i) in numeric.iter().enumerate() {
        let row: BTreeMap<String, f64> = numeric
            .iter()
            .enumerate()
            .map(|(j, col_j)| (col_j.name.clone(), matrix[i][j]))
            .collect();
        section.insert(col_i.name.clone(), row);
    }
    section
}

fn outliers_section(table: &Table) -> BTreeMap<String, usize> {
    table
        .numeric_columns()
        .into_iter()
        .filter_map(|column| {
            let values = column.numeric_values();
            iqr_outlier_count(&values).map(|count| (column.name.clone(), count))
        })
        .collect()
}

/// Count of values strictly outside [Q1 - 1.5 IQR, Q3 + 1.5 IQR]; `None`
/// when the sample is too small to bound.
pub(crate) fn iqr_outlier_count(values: &[f64]) -> Option<usize> {
    if values.len() < MIN_OUTLIER_SAMPLE {
        return None;
    }
    let q1 = stats::quantile(values, 0.25)?;
    let q3 = stats::quantile(values, 0.75)?;
    let iqr = q3 - q1;
    let low = q1 - 1.5 * iqr;
    let high = q3 + 1.5 * iqr;
    Some(values.iter().filter(|v| **v < low || **v > high).count())
}
