pub mod artwork_handlers;
pub mod extract;
pub mod favorite_handlers;
pub mod health_handlers;
pub mod stats_handlers;

use serde::Serialize;
use uuid::Uuid;

/// `{"id": ...}` returned by create endpoints.
#[derive(Debug, Serialize)]
pub struct IdResponse {
    pub id: Uuid,
}

/// `{"ok": true}` returned by successful owner-scoped mutations.
#[derive(Debug, Serialize)]
pub struct OkResponse {
    pub ok: bool,
}

impl OkResponse {
    pub fn ok() -> Self {
        Self { ok: true }
    }
}

/// Trimmed-emptiness check shared by body validation.
pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
