pub mod analyzer;
pub mod charts;
pub mod cleaner;
pub mod dataset;
pub mod ingest;
pub mod llm_gateway;
pub mod profiler;
pub mod registry;
pub mod session;
