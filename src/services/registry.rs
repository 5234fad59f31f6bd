use parking_lot::Mutex;
use std::collections::HashMap;

/// Append-only store of rendered chart PNGs. Identifiers are `chart_N` with
/// N monotonically increasing for the process lifetime; they are never
/// reused, even across analysis runs.
pub struct ChartRegistry {
    inner: Mutex<RegistryInner>,
}

struct RegistryInner {
    next_id: u64,
    charts: HashMap<String, Vec<u8>>,
}

impl ChartRegistry {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(RegistryInner {
                next_id: 1,
                charts: HashMap::new(),
            }),
        }
    }

    pub fn register(&self, png: Vec<u8>) -> String {
        let mut inner = self.inner.lock();
        let id = format!("chart_{}", inner.next_id);
        inner.next_id += 1;
        inner.charts.insert(id.clone(), png);
        id
    }

    pub fn get(&self, id: &str) -> Option<Vec<u8>> {
        self.inner.lock().charts.get(id).cloned()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().charts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for ChartRegistry {
    fn default() -> Self {
        Self::new()
    }
}
