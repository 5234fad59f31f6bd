pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod routes;
pub mod services;

use services::llm_gateway::LlmGateway;
use services::registry::ChartRegistry;
use services::session::SessionStore;

// Application state shared across request handlers.
pub struct AppState {
    pub config: config::Config,
    pub registry: ChartRegistry,
    pub sessions: SessionStore,
    pub gateway: LlmGateway,
}

impl AppState {
    pub fn new(config: config::Config) -> Self {
        let gateway = LlmGateway::new(&config);
        Self {
            config,
            registry: ChartRegistry::new(),
            sessions: SessionStore::new(),
            gateway,
        }
    }
}
