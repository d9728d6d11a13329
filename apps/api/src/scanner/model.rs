//! Optional numeric model artifact.
//!
//! Loaded at startup when present; nothing on the scoring path reads it yet.
//! Any failure degrades to "no model" instead of blocking startup.

use std::path::Path;

use serde::Deserialize;
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ModelArtifact {
    pub weights: Vec<f64>,
    #[serde(default)]
    pub bias: f64,
}

impl ModelArtifact {
    pub fn load_optional(path: &Path) -> Option<Self> {
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!("No model artifact at {}; continuing without one", path.display());
                return None;
            }
            Err(e) => {
                warn!("Could not read model artifact {}: {e}", path.display());
                return None;
            }
        };

        match serde_json::from_str::<ModelArtifact>(&raw) {
            Ok(model) => {
                info!(
                    "Model artifact loaded from {} ({} features)",
                    path.display(),
                    model.feature_count()
                );
                Some(model)
            }
            Err(e) => {
                warn!("Ignoring malformed model artifact {}: {e}", path.display());
                None
            }
        }
    }

    pub fn feature_count(&self) -> usize {
        self.weights.len()
    }
}
