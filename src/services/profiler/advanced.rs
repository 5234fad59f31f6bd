use once_cell::sync::Lazy;
use regex::Regex;

use super::stats;
use crate::models::{CategoricalSummary, CorrelationPair, DistributionSummary, EdaReport, TopValue};
use crate::services::dataset::{ColumnKind, Table};

const TOP_VALUES: usize = 5;
const TOP_CORRELATIONS: usize = 15;
const RARE_LABEL_SHARE: f64 = 0.01;
const MIXED_TYPE_RATIO: f64 = 0.6;
const HIGH_MISSING_SHARE: f64 = 0.4;

/// Digits with at most one decimal point, the shape of a number that ended
/// up stored as text.
static NUMERIC_LOOKING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:\d+\.?\d*|\.\d+)$").expect("static regex"));

/// Fill the advanced report sections from the cleaned table. Missingness
/// ratios for the recommendations are read from the already-populated
/// `missing_values` section.
pub fn extend(report: &mut EdaReport, table: &Table) {
    report.distribution_summary = distribution_section(table);
    report.categorical_summary = categorical_section(table);
    report.correlation_top = correlation_ranking(table);
    report.quality_flags = quality_flags(table);
    report.ml_recommendations = recommendations(report, table);
}

fn distribution_section(table: &Table) -> Vec<DistributionSummary> {
    table
        .numeric_columns()
        .into_iter()
        .filter_map(|column| {
            let values = column.numeric_values();
            if values.is_empty() {
                return None;
            }
            let skew = stats::skewness(&values).unwrap_or(0.0);
            let kurtosis = stats::excess_kurtosis(&values).unwrap_or(0.0);
            Some(DistributionSummary {
                column: column.name.clone(),
                skew: stats::round3(skew),
                kurtosis: stats::round3(kurtosis),
                fix: classify_skew(skew).to_string(),
                count_non_null: values.len(),
            })
        })
        .collect()
}

pub(crate) fn classify_skew(skew: f64) -> &'static str {
    if skew.abs() > 1.0 {
        "Apply log/box-cox transform"
    } else if skew.abs() > 0.5 {
        "Try normalization or robust scaling"
    } else {
        "Distribution looks approximately normal"
    }
}

fn categorical_section(table: &Table) -> Vec<CategoricalSummary> {
    let total = table.height();
    table
        .categorical_columns()
        .into_iter()
        .map(|column| {
            // value_counts already folds nulls into the empty string.
            let counts = column.value_counts();
            let rare_labels = counts
                .iter()
                .filter(|(_, count)| (*count as f64) < RARE_LABEL_SHARE * total as f64)
                .map(|(value, _)| value.clone())
                .collect();
            CategoricalSummary {
                column: column.name.clone(),
                cardinality: counts.len(),
                top_values: counts
                    .into_iter()
                    .take(TOP_VALUES)
                    .map(|(value, count)| TopValue { value, count })
                    .collect(),
                rare_labels,
            }
        })
        .collect()
}

/// Strongest absolute correlations over all unordered numeric pairs, capped
/// at 15. The sort is stable, so equal magnitudes keep the column-index
/// discovery order.
fn correlation_ranking(table: &Table) -> Vec<CorrelationPair> {
    let numeric = table.numeric_columns();
    if numeric.len() < 2 {
        return Vec::new();
    }
    let values: Vec<Vec<f64>> = numeric.iter().map(|c| c.numeric_values()).collect();

    let mut pairs = Vec::new();
    for i in 0..numeric.len() {
        for j in (i + 1)..numeric.len() {
            let raw = stats::pearson(&values[i], &values[j]).unwrap_or(0.0);
            pairs.push(CorrelationPair {
                pair: format!("{} ↔ {}", numeric[i].name, numeric[j].name),
                value: stats::round3(raw.abs()),
                raw_value: raw,
            });
        }
    }
    pairs.sort_by(|a, b| b.value.partial_cmp(&a.value).unwrap_or(std::cmp::Ordering::Equal));
    pairs.truncate(TOP_CORRELATIONS);
    pairs
}

fn quality_flags(table: &Table) -> Vec<String> {
    let mut flags = Vec::new();

    let duplicates = table.duplicate_row_count();
    if duplicates > 0 {
        flags.push(format!("{} duplicate rows detected.", duplicates));
    }

    let total = table.height();
    for column in &table.columns {
        if column.kind == ColumnKind::Numeric {
            continue;
        }
        let numeric_looking = column
            .cells
            .iter()
            .flatten()
            .filter(|cell| NUMERIC_LOOKING.is_match(&cell.render()))
            .count();
        if numeric_looking as f64 > total as f64 * MIXED_TYPE_RATIO {
            flags.push(format!(
                "Column '{}' contains many numeric-looking strings (mixed types). Consider coercing to numeric.",
                column.name
            ));
        }
    }

    for column in &table.columns {
        if column.unique_count_with_nulls() <= 1 {
            flags.push(format!(
                "Column '{}' is constant (single unique value). Consider dropping it.",
                column.name
            ));
        }
    }

    flags
}

fn recommendations(report: &EdaReport, table: &Table) -> Vec<String> {
    let mut recs = Vec::new();

    if !table.categorical_columns().is_empty() {
        recs.push(
            "Apply One Hot Encoding or target encoding for categorical variables (watch high-cardinality columns)."
                .to_string(),
        );
    }
    if !table.numeric_columns().is_empty() {
        recs.push(
            "Standardize or normalize numerical columns (e.g., StandardScaler or RobustScaler)."
                .to_string(),
        );
    }
    recs.push(
        "Consider removing or capping extreme outliers, or use robust models (e.g., tree-based or robust regression)."
            .to_string(),
    );

    let total = table.height();
    let high_missing: Vec<&str> = report
        .columns_list
        .iter()
        .filter(|name| {
            let missing = report.missing_values.get(*name).copied().unwrap_or(0);
            total > 0 && missing as f64 / total as f64 > HIGH_MISSING_SHARE
        })
        .map(String::as_str)
        .collect();
    if !high_missing.is_empty() {
        recs.push(format!(
            "Drop or impute columns with >40% missing values: {}",
            high_missing.join(", ")
        ));
    }

    if !report.quality_flags.is_empty() {
        recs.push(
            "Resolve data quality flags before model training (duplicates, mixed types, constant cols)."
                .to_string(),
        );
    }

    recs
}
