//! Shared router state, built once at startup and cloned into every handler.

use crate::services::{
    artwork_store::ArtworkStore, favorite_store::FavoriteStore, identity::IdentityVerifier,
};
use sqlx::SqlitePool;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    /// Shared SQLite pool; the stores hold clones of the same handle.
    pub db: Arc<SqlitePool>,
    pub artworks: ArtworkStore,
    pub favorites: FavoriteStore,
    pub verifier: Arc<dyn IdentityVerifier>,
}

impl AppState {
    pub fn new(db: Arc<SqlitePool>, verifier: Arc<dyn IdentityVerifier>) -> Self {
        Self {
            artworks: ArtworkStore::new(db.clone()),
            favorites: FavoriteStore::new(db.clone()),
            db,
            verifier,
        }
    }
}
