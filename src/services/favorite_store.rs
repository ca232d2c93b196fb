//! Typed gateway to the `favorites` collection.

use crate::{
    models::favorite::{Favorite, FavoriteWithArtwork},
    services::store::{self, Field, Filter, OwnedField, StoreError, StoreResult},
};
use chrono::Utc;
use sqlx::{QueryBuilder, SqlitePool, sqlite::Sqlite};
use std::sync::Arc;
use uuid::Uuid;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FavoriteField {
    Id,
    UserEmail,
}

impl Field for FavoriteField {
    const TABLE: &'static str = "favorites";

    fn column(self) -> &'static str {
        match self {
            FavoriteField::Id => "id",
            FavoriteField::UserEmail => "user_email",
        }
    }
}

impl OwnedField for FavoriteField {
    const ID: Self = FavoriteField::Id;
    const OWNER: Self = FavoriteField::UserEmail;
}

#[derive(Clone)]
pub struct FavoriteStore {
    pub db: Arc<SqlitePool>,
}

impl FavoriteStore {
    pub fn new(db: Arc<SqlitePool>) -> Self {
        Self { db }
    }

    /// Record that `user_email` favorited `artwork_id`.
    ///
    /// The caller checks that the artwork exists. A second favorite of the
    /// same artwork by the same user fails with `Duplicate`.
    pub async fn insert(&self, artwork_id: Uuid, user_email: &str) -> StoreResult<Favorite> {
        let result = sqlx::query_as::<_, Favorite>(
            "INSERT INTO favorites (id, artwork_id, user_email, added_at)
             VALUES (?, ?, ?, ?)
             RETURNING id, artwork_id, user_email, added_at",
        )
        .bind(Uuid::new_v4())
        .bind(artwork_id)
        .bind(user_email)
        .bind(Utc::now())
        .fetch_one(&*self.db)
        .await;

        match result {
            Ok(favorite) => Ok(favorite),
            Err(err) if store::is_unique_violation(&err) => Err(StoreError::Duplicate),
            Err(err) => Err(StoreError::Sqlx(err)),
        }
    }

    /// Favorites matching `filter`, each inner-joined to its artwork, newest
    /// first. Entries whose artwork is gone are dropped by the join.
    pub async fn find_joined(
        &self,
        filter: &Filter<FavoriteField>,
    ) -> StoreResult<Vec<FavoriteWithArtwork>> {
        let mut builder = QueryBuilder::<Sqlite>::new(
            "SELECT f.id AS fav_id, f.artwork_id AS fav_artwork_id, \
             f.user_email AS fav_user_email, f.added_at AS fav_added_at, \
             a.id, a.title, a.image_url, a.category, a.user_email, a.user_name, \
             a.user_photo, a.created_at, a.likes, a.visibility \
             FROM favorites f INNER JOIN artworks a ON a.id = f.artwork_id",
        );
        filter.push_where(&mut builder, "f.");
        builder.push(" ORDER BY f.added_at DESC, f.rowid DESC");

        let rows: Vec<FavoriteWithArtwork> = builder.build_query_as().fetch_all(&*self.db).await?;
        Ok(rows)
    }

    /// Returns the deleted count (0 or 1).
    pub async fn delete_one_if_match(&self, filter: &Filter<FavoriteField>) -> StoreResult<u64> {
        store::delete_one(&self.db, filter).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::{
        artwork_store::{ArtworkField, ArtworkStore, tests::new_artwork},
        database::test_pool,
    };

    async fn stores() -> (ArtworkStore, FavoriteStore) {
        let db = Arc::new(test_pool().await);
        (ArtworkStore::new(db.clone()), FavoriteStore::new(db))
    }

    #[tokio::test]
    async fn join_drops_orphaned_favorites() {
        let (artworks, favorites) = stores().await;
        let kept = artworks
            .insert(new_artwork("ann@example.com", "Kept", "Oil"))
            .await
            .unwrap();
        let gone = artworks
            .insert(new_artwork("ann@example.com", "Gone", "Oil"))
            .await
            .unwrap();

        favorites.insert(kept.id, "bob@example.com").await.unwrap();
        favorites.insert(gone.id, "bob@example.com").await.unwrap();
        artworks
            .delete_one_if_match(&Filter::all().eq(ArtworkField::Id, gone.id))
            .await
            .unwrap();

        let listed = favorites
            .find_joined(&Filter::all().eq(FavoriteField::UserEmail, "bob@example.com"))
            .await
            .unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].artwork_id, kept.id);
        assert_eq!(listed[0].artwork.title, "Kept");
        assert_eq!(listed[0].user_email, "bob@example.com");
        assert_eq!(listed[0].artwork.user_email, "ann@example.com");
    }

    #[tokio::test]
    async fn join_is_scoped_to_filter() {
        let (artworks, favorites) = stores().await;
        let art = artworks
            .insert(new_artwork("ann@example.com", "Kept", "Oil"))
            .await
            .unwrap();
        favorites.insert(art.id, "bob@example.com").await.unwrap();
        favorites.insert(art.id, "cy@example.com").await.unwrap();

        let listed = favorites
            .find_joined(&Filter::all().eq(FavoriteField::UserEmail, "cy@example.com"))
            .await
            .unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].user_email, "cy@example.com");
    }

    #[tokio::test]
    async fn duplicate_favorite_is_rejected() {
        let (artworks, favorites) = stores().await;
        let art = artworks
            .insert(new_artwork("ann@example.com", "Kept", "Oil"))
            .await
            .unwrap();

        favorites.insert(art.id, "bob@example.com").await.unwrap();
        let err = favorites
            .insert(art.id, "bob@example.com")
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Duplicate));
    }
}
