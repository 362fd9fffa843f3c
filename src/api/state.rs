//! Application state for the API server

use crate::Config;
use crate::jobs::JobLauncher;
use std::sync::Arc;

/// Shared application state accessible to all route handlers
///
/// Cloned for each request (cheap Arc clone).
#[derive(Clone)]
pub struct AppState {
    /// Starts download jobs and owns the extraction engine
    pub launcher: Arc<JobLauncher>,

    /// Configuration (read-only)
    pub config: Arc<Config>,
}

impl AppState {
    /// Create a new AppState
    pub fn new(launcher: Arc<JobLauncher>, config: Arc<Config>) -> Self {
        Self { launcher, config }
    }
}
