use std::time::Instant;

use super::charts;
use super::cleaner;
use super::ingest;
use super::profiler::{advanced, basic};
use super::registry::ChartRegistry;
use super::session::{AnalysisSession, SessionStore};
use crate::models::{ChartInfo, EdaReport};

/// Everything one analysis run produces for the caller.
pub struct AnalysisOutcome {
    pub dataset_name: String,
    pub report: EdaReport,
    pub charts: Vec<ChartInfo>,
}

/// Full pipeline for one dataset: ingest, clean, profile, render charts,
/// then publish the session for follow-up questions. The session is stored
/// last so chat never observes a half-built analysis.
pub fn run_analysis(
    raw_text: &str,
    dataset_name: &str,
    session_key: &str,
    registry: &ChartRegistry,
    sessions: &SessionStore,
) -> AnalysisOutcome {
    let started = Instant::now();

    let ingested = ingest::parse_dataset_text(raw_text);
    tracing::info!(
        rows = ingested.height(),
        columns = ingested.width(),
        "dataset ingested"
    );

    let cleaned = cleaner::auto_clean(&ingested);

    let mut report = basic::profile(&cleaned, &ingested);
    advanced::extend(&mut report, &cleaned);

    let chart_infos = charts::render_all(&cleaned, registry);

    sessions.put(
        session_key,
        AnalysisSession {
            dataset_name: dataset_name.to_string(),
            table: cleaned,
            report: report.clone(),
        },
    );

    tracing::info!(
        dataset = dataset_name,
        charts = chart_infos.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "analysis complete"
    );

    AnalysisOutcome {
        dataset_name: dataset_name.to_string(),
        report,
        charts: chart_infos,
    }
}
