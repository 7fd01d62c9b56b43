use std::sync::Arc;

use tierflow_core::config::{Config, SanitizedConfig};
use tierflow_core::journal::JournalStore;
use tierflow_core::service::IngestService;

/// Shared application state
pub struct AppState {
    config: Config,
    service: Arc<IngestService>,
    journal: Arc<dyn JournalStore>,
}

impl AppState {
    pub fn new(
        config: Config,
        service: Arc<IngestService>,
        journal: Arc<dyn JournalStore>,
    ) -> Self {
        Self {
            config,
            service,
            journal,
        }
    }

    pub fn sanitized_config(&self) -> SanitizedConfig {
        SanitizedConfig::from(&self.config)
    }

    pub fn service(&self) -> &IngestService {
        &self.service
    }

    pub fn journal(&self) -> &dyn JournalStore {
        self.journal.as_ref()
    }
}
