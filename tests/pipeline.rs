use datasage::services::cleaner;
use datasage::services::dataset::{Cell, ColumnKind};
use datasage::services::ingest;
use datasage::services::profiler::{advanced, basic};
use datasage::services::registry::ChartRegistry;
use datasage::services::session::{SessionStore, DEFAULT_SESSION};
use datasage::services::analyzer;

const MIXED_CSV: &str = "a,b\n1,x\n2,y\n3,x\n,z\n";

#[test]
fn csv_flows_through_the_full_pipeline() {
    let ingested = ingest::parse_dataset_text(MIXED_CSV);
    assert_eq!(ingested.height(), 4);
    assert_eq!(ingested.width(), 2);

    let cleaned = cleaner::auto_clean(&ingested);
    let a = cleaned.column("a").expect("column a");
    assert_eq!(a.kind, ColumnKind::Numeric);
    // the missing value in `a` is filled with the median of {1, 2, 3}
    assert_eq!(a.cells[3], Some(Cell::Number(2.0)));
    assert_eq!(a.null_count(), 0);

    let mut report = basic::profile(&cleaned, &ingested);
    advanced::extend(&mut report, &cleaned);

    assert_eq!(report.rows, 4);
    assert_eq!(report.columns, 2);
    assert_eq!(report.columns_list, ["a", "b"]);
    // missingness reflects the table as ingested, before imputation
    assert_eq!(report.missing_values["a"], 1);
    assert_eq!(report.missing_values["b"], 0);
    assert_eq!(report.types["a"], "numeric");
    assert_eq!(report.types["b"], "categorical");

    let summary_a = &report.summary["a"];
    assert_eq!(summary_a.count, 4);
    assert_eq!(summary_a.mean, Some(2.0));

    let cat = &report.categorical_summary[0];
    assert_eq!(cat.column, "b");
    assert_eq!(cat.cardinality, 3);
    assert_eq!(cat.top_values[0].value, "x");
    assert_eq!(cat.top_values[0].count, 2);
}

#[test]
fn analysis_registers_charts_with_stable_ids() {
    let registry = ChartRegistry::new();
    let sessions = SessionStore::new();

    let outcome = analyzer::run_analysis(MIXED_CSV, "mixed.csv", DEFAULT_SESSION, &registry, &sessions);
    // one numeric column and one categorical column: histogram + bar chart
    assert_eq!(outcome.charts.len(), 2);
    assert_eq!(outcome.charts[0].id, "chart_1");
    assert_eq!(outcome.charts[0].title, "Distribution: a");
    assert_eq!(outcome.charts[1].id, "chart_2");
    assert_eq!(outcome.charts[1].title, "Top categories: b");

    for chart in &outcome.charts {
        let png = registry.get(&chart.id).expect("registered chart");
        assert_eq!(&png[..4], b"\x89PNG");
    }

    // a second run keeps counting instead of reusing identifiers
    let again = analyzer::run_analysis(MIXED_CSV, "mixed.csv", DEFAULT_SESSION, &registry, &sessions);
    assert_eq!(again.charts[0].id, "chart_3");
    assert!(registry.get("chart_1").is_some());
}

#[test]
fn wide_numeric_dataset_caps_the_chart_set() {
    let mut text = String::from("c0,c1,c2,c3,c4,c5,c6\n");
    for row in 0..8 {
        let fields: Vec<String> = (0..7).map(|col| format!("{}", row * (col + 1))).collect();
        text.push_str(&fields.join(","));
        text.push('\n');
    }

    let registry = ChartRegistry::new();
    let sessions = SessionStore::new();
    let outcome = analyzer::run_analysis(&text, "wide.csv", DEFAULT_SESSION, &registry, &sessions);

    // five histograms plus the correlation heatmap, no categorical columns
    assert_eq!(outcome.charts.len(), 6);
    assert_eq!(outcome.charts[5].title, "Correlation Heatmap");
}

#[test]
fn sessions_are_keyed_independently() {
    let registry = ChartRegistry::new();
    let sessions = SessionStore::new();

    analyzer::run_analysis("a\n1\n2\n", "first.csv", "alice", &registry, &sessions);
    analyzer::run_analysis("b\nx\ny\n", "second.csv", "bob", &registry, &sessions);

    assert_eq!(sessions.get("alice").unwrap().dataset_name, "first.csv");
    assert_eq!(sessions.get("bob").unwrap().dataset_name, "second.csv");
    assert!(sessions.get(DEFAULT_SESSION).is_none());
}

#[test]
fn cleaned_table_round_trips_through_csv() {
    let ingested = ingest::parse_dataset_text(MIXED_CSV);
    let cleaned = cleaner::auto_clean(&ingested);
    let exported = cleaned.to_csv().unwrap();

    let reparsed = ingest::parse_dataset_text(&exported);
    assert_eq!(reparsed.height(), cleaned.height());
    assert_eq!(reparsed.width(), cleaned.width());
    let a = reparsed.column("a").unwrap();
    assert_eq!(a.kind, ColumnKind::Numeric);
    assert_eq!(a.numeric_values(), [1.0, 2.0, 3.0, 2.0]);
}

#[test]
fn json_and_unstructured_inputs_are_accepted() {
    let json = r#"[{"score": 10, "label": "hi"}, {"score": 20, "label": "lo"}]"#;
    let table = ingest::parse_dataset_text(json);
    assert_eq!(table.height(), 2);
    assert_eq!(
        table.columns.iter().map(|c| c.name.as_str()).collect::<Vec<_>>(),
        ["score", "label"]
    );

    // Delimiter-free prose is a valid one-column CSV, header = first line.
    let prose = ingest::parse_dataset_text("totally unstructured\ntext lines\n");
    assert_eq!(prose.width(), 1);
    assert_eq!(prose.columns[0].name, "totally unstructured");
    assert_eq!(prose.height(), 1);

    // Inconsistent delimiters reject every structured attempt.
    let fallback = ingest::parse_dataset_text("x,y\tz\n1,2,3\t4\t5\nplain line");
    assert_eq!(fallback.width(), 1);
    assert_eq!(fallback.columns[0].name, "text");
    assert_eq!(fallback.height(), 3);
}
