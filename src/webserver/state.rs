/// Shared application state for the webserver
use crate::assignments::AssignmentStore;
use crate::config::WebserverConfig;
use crate::world::WorldBuilder;
use std::sync::Arc;

/// Shared application state passed to all route handlers
#[derive(Clone)]
pub struct AppState {
    /// Webserver configuration
    pub config: Arc<WebserverConfig>,

    /// Holder fetcher, assignment store and world defaults
    pub world: Arc<WorldBuilder>,

    /// Server startup time
    pub startup_time: chrono::DateTime<chrono::Utc>,
}

impl AppState {
    pub fn new(config: WebserverConfig, world: Arc<WorldBuilder>) -> Self {
        Self {
            config: Arc::new(config),
            world,
            startup_time: chrono::Utc::now(),
        }
    }

    pub fn store(&self) -> &Arc<AssignmentStore> {
        self.world.store()
    }

    /// Get server uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        (chrono::Utc::now() - self.startup_time)
            .num_seconds()
            .max(0) as u64
    }
}
