use crate::model::EntityId;
use std::sync::Arc;

/// Used when no public origin has been configured.
pub const FALLBACK_ORIGIN: &str = "http://localhost:3000";

/// Builds the public URL where feedback for an entity is submitted. The result is a plain
/// string, suitable for QR rendering or messaging.
#[derive(Debug, Clone)]
pub struct LinkGenerator {
    origin: Arc<str>,
}

impl LinkGenerator {
    pub fn new(origin: impl AsRef<str>) -> Self {
        Self {
            origin: origin.as_ref().trim().trim_end_matches('/').into(),
        }
    }

    /// Falls back to [`FALLBACK_ORIGIN`] when `origin` is missing or blank.
    pub fn from_config(origin: Option<&str>) -> Self {
        match origin.map(str::trim) {
            Some(origin) if !origin.trim_end_matches('/').is_empty() => Self::new(origin),
            _ => Self::new(FALLBACK_ORIGIN),
        }
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    pub fn feedback_link(&self, entity_id: &EntityId) -> String {
        format!("{}/feedback/{}", self.origin, entity_id)
    }
}

impl Default for LinkGenerator {
    fn default() -> Self {
        Self::new(FALLBACK_ORIGIN)
    }
}
