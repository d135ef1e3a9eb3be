use std::sync::Arc;

use crate::config::Config;
use crate::db::RemedyStore;
use crate::services::TriageService;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    /// Remedy lookup tables, also probed by the health check.
    pub remedies: Arc<dyn RemedyStore>,
    pub triage: TriageService,
}

impl AppState {
    pub fn new(config: Config, remedies: Arc<dyn RemedyStore>, triage: TriageService) -> Self {
        Self {
            config: Arc::new(config),
            remedies,
            triage,
        }
    }
}
