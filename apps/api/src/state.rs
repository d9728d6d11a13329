use std::sync::Arc;

use crate::config::Config;
use crate::scanner::ScannerContext;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Vocabulary, matcher and optional model. Built once at startup, read-only after.
    pub scanner: Arc<ScannerContext>,
}
