use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

use super::dataset::Table;
use crate::models::EdaReport;

/// Session key used when the caller does not supply one.
pub const DEFAULT_SESSION: &str = "default";

/// The most recent analysis for one session: the cleaned table and its
/// report, consumed by the chat-with-data collaborator.
#[derive(Debug)]
pub struct AnalysisSession {
    pub dataset_name: String,
    pub table: Table,
    pub report: EdaReport,
}

/// Keyed store of analysis sessions. Each analysis run replaces its slot
/// wholesale; keying by a caller-supplied id keeps concurrent analyses from
/// interleaving into a report/table pair no single request produced.
pub struct SessionStore {
    sessions: RwLock<HashMap<String, Arc<AnalysisSession>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
        }
    }

    pub fn put(&self, key: &str, session: AnalysisSession) {
        self.sessions
            .write()
            .insert(key.to_string(), Arc::new(session));
    }

    pub fn get(&self, key: &str) -> Option<Arc<AnalysisSession>> {
        self.sessions.read().get(key).cloned()
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}
