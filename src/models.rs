use serde::Serialize;
use std::collections::BTreeMap;

/// Full exploratory-data-analysis report for one dataset.
///
/// Sections are computed independently; a section that could not be computed
/// is left empty rather than failing the whole report.
#[derive(Debug, Clone, Default, Serialize)]
pub struct EdaReport {
    pub rows: usize,
    pub columns: usize,
    pub columns_list: Vec<String>,
    pub missing_values: BTreeMap<String, usize>,
    pub types: BTreeMap<String, String>,
    pub summary: BTreeMap<String, ColumnSummary>,
    pub correlation: BTreeMap<String, BTreeMap<String, f64>>,
    pub outliers_count: BTreeMap<String, usize>,
    pub distribution_summary: Vec<DistributionSummary>,
    pub categorical_summary: Vec<CategoricalSummary>,
    pub correlation_top: Vec<CorrelationPair>,
    pub quality_flags: Vec<String>,
    pub ml_recommendations: Vec<String>,
}

/// Describe-style statistics for one column. Numeric columns populate the
/// moment/quantile fields, categorical ones the unique/top/freq fields.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ColumnSummary {
    pub count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mean: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub std: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(rename = "25%", skip_serializing_if = "Option::is_none")]
    pub q25: Option<f64>,
    #[serde(rename = "50%", skip_serializing_if = "Option::is_none")]
    pub q50: Option<f64>,
    #[serde(rename = "75%", skip_serializing_if = "Option::is_none")]
    pub q75: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unique: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub freq: Option<usize>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DistributionSummary {
    pub column: String,
    pub skew: f64,
    pub kurtosis: f64,
    pub fix: String,
    pub count_non_null: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoricalSummary {
    pub column: String,
    pub cardinality: usize,
    pub top_values: Vec<TopValue>,
    pub rare_labels: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TopValue {
    pub value: String,
    pub count: usize,
}

/// One entry of the ranked correlation list. `value` is |r| rounded to three
/// decimals (the sort key), `raw_value` the signed coefficient.
#[derive(Debug, Clone, Serialize)]
pub struct CorrelationPair {
    pub pair: String,
    pub value: f64,
    pub raw_value: f64,
}

/// Registered chart artifact handle returned to clients. The PNG bytes stay
/// in the chart registry and are served by `/download-chart/{id}`.
#[derive(Debug, Clone, Serialize)]
pub struct ChartInfo {
    pub id: String,
    pub title: String,
}
