//! src/services/artwork_store.rs
//!
//! ArtworkStore — typed gateway to the `artworks` collection. It knows how to
//! find, insert, conditionally update/delete and aggregate artworks; it does
//! not decide who may do what. Owner scoping arrives already encoded in the
//! filter (see `ownership::OwnerScope`).

use crate::{
    models::artwork::{Artwork, Visibility},
    services::store::{self, Field, Filter, OwnedField, Patch, Sort, StoreResult},
};
use chrono::Utc;
use sqlx::{QueryBuilder, SqlitePool, sqlite::Sqlite};
use std::sync::Arc;
use uuid::Uuid;

const ARTWORK_COLUMNS: &str = "id, title, image_url, category, user_email, user_name, \
                               user_photo, created_at, likes, visibility";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ArtworkField {
    Id,
    Title,
    ImageUrl,
    Category,
    UserEmail,
    UserName,
    CreatedAt,
    Likes,
    Visibility,
}

impl Field for ArtworkField {
    const TABLE: &'static str = "artworks";

    fn column(self) -> &'static str {
        match self {
            ArtworkField::Id => "id",
            ArtworkField::Title => "title",
            ArtworkField::ImageUrl => "image_url",
            ArtworkField::Category => "category",
            ArtworkField::UserEmail => "user_email",
            ArtworkField::UserName => "user_name",
            ArtworkField::CreatedAt => "created_at",
            ArtworkField::Likes => "likes",
            ArtworkField::Visibility => "visibility",
        }
    }

    fn folded_column(self) -> Option<&'static str> {
        match self {
            ArtworkField::Title => Some("title_folded"),
            ArtworkField::UserName => Some("user_name_folded"),
            _ => None,
        }
    }
}

impl OwnedField for ArtworkField {
    const ID: Self = ArtworkField::Id;
    const OWNER: Self = ArtworkField::UserEmail;
}

/// Client-controlled part of a new artwork plus the owner fields taken from
/// the verified principal.
#[derive(Clone, Debug)]
pub struct NewArtwork {
    pub title: String,
    pub image_url: String,
    pub category: String,
    pub user_email: String,
    pub user_name: String,
    pub user_photo: Option<String>,
    pub visibility: Visibility,
}

#[derive(Clone)]
pub struct ArtworkStore {
    /// Shared pool, created at startup.
    pub db: Arc<SqlitePool>,
}

impl ArtworkStore {
    pub fn new(db: Arc<SqlitePool>) -> Self {
        Self { db }
    }

    /// Find every artwork matching `filter`, optionally ordered and capped.
    pub async fn find_many(
        &self,
        filter: &Filter<ArtworkField>,
        sort: Option<Sort<ArtworkField>>,
        limit: Option<i64>,
    ) -> StoreResult<Vec<Artwork>> {
        let mut builder =
            QueryBuilder::<Sqlite>::new(format!("SELECT {} FROM artworks", ARTWORK_COLUMNS));
        filter.push_where(&mut builder, "");
        if let Some(sort) = sort {
            sort.push_order_by(&mut builder, "");
        }
        if let Some(limit) = limit {
            builder.push(" LIMIT ");
            builder.push_bind(limit);
        }

        let rows: Vec<Artwork> = builder.build_query_as().fetch_all(&*self.db).await?;
        Ok(rows)
    }

    pub async fn find_one(&self, id: Uuid) -> StoreResult<Option<Artwork>> {
        let row = sqlx::query_as::<_, Artwork>(&format!(
            "SELECT {} FROM artworks WHERE id = ?",
            ARTWORK_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&*self.db)
        .await?;
        Ok(row)
    }

    /// Insert a new artwork. The store assigns `id` and `created_at` and
    /// starts `likes` at zero.
    pub async fn insert(&self, new: NewArtwork) -> StoreResult<Artwork> {
        let artwork = sqlx::query_as::<_, Artwork>(&format!(
            r#"
            INSERT INTO artworks (
                id, title, image_url, category, user_email, user_name,
                user_photo, created_at, likes, visibility,
                title_folded, user_name_folded
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, 0, ?, ?, ?)
            RETURNING {}
            "#,
            ARTWORK_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(&new.title)
        .bind(&new.image_url)
        .bind(&new.category)
        .bind(&new.user_email)
        .bind(&new.user_name)
        .bind(new.user_photo.clone())
        .bind(Utc::now())
        .bind(new.visibility)
        .bind(new.title.to_lowercase())
        .bind(new.user_name.to_lowercase())
        .fetch_one(&*self.db)
        .await?;

        tracing::debug!(id = %artwork.id, owner = %artwork.user_email, "inserted artwork");
        Ok(artwork)
    }

    /// Returns the matched count (0 or 1).
    pub async fn update_one_if_match(
        &self,
        filter: &Filter<ArtworkField>,
        patch: &Patch<ArtworkField>,
    ) -> StoreResult<u64> {
        store::update_one(&self.db, filter, patch).await
    }

    /// Returns the deleted count (0 or 1).
    pub async fn delete_one_if_match(&self, filter: &Filter<ArtworkField>) -> StoreResult<u64> {
        store::delete_one(&self.db, filter).await
    }

    /// Atomically add one like. The increment happens inside a single
    /// statement so concurrent calls never lose updates.
    pub async fn increment_likes(&self, id: Uuid) -> StoreResult<u64> {
        let result = sqlx::query("UPDATE artworks SET likes = likes + 1 WHERE id = ?")
            .bind(id)
            .execute(&*self.db)
            .await?;
        Ok(result.rows_affected())
    }

    /// Group matching artworks by `group_by`, count each group and return the
    /// `limit` largest groups (ties ordered by key).
    pub async fn group_count(
        &self,
        filter: &Filter<ArtworkField>,
        group_by: ArtworkField,
        limit: i64,
    ) -> StoreResult<Vec<(String, i64)>> {
        let key = group_by.column();
        let mut builder = QueryBuilder::<Sqlite>::new(format!(
            "SELECT CAST({key} AS TEXT) AS group_key, COUNT(*) AS count FROM artworks"
        ));
        filter.push_where(&mut builder, "");
        builder.push(format!(
            " GROUP BY {key} ORDER BY count DESC, group_key ASC LIMIT "
        ));
        builder.push_bind(limit);

        let rows: Vec<(String, i64)> = builder.build_query_as().fetch_all(&*self.db).await?;
        Ok(rows)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::services::database::test_pool;

    pub(crate) fn new_artwork(owner: &str, title: &str, category: &str) -> NewArtwork {
        NewArtwork {
            title: title.to_string(),
            image_url: format!("https://img.example.com/{}.png", title),
            category: category.to_string(),
            user_email: owner.to_string(),
            user_name: owner.split('@').next().unwrap_or(owner).to_string(),
            user_photo: None,
            visibility: Visibility::Public,
        }
    }

    async fn new_store() -> ArtworkStore {
        ArtworkStore::new(Arc::new(test_pool().await))
    }

    #[tokio::test]
    async fn insert_sets_server_fields() {
        let store = new_store().await;
        let art = store
            .insert(new_artwork("ann@example.com", "Sunrise", "Abstract"))
            .await
            .unwrap();

        assert_eq!(art.likes, 0);
        assert_eq!(art.visibility, Visibility::Public);
        assert_eq!(art.user_email, "ann@example.com");

        let fetched = store.find_one(art.id).await.unwrap().unwrap();
        assert_eq!(fetched.title, "Sunrise");
        assert_eq!(fetched.created_at, art.created_at);
    }

    #[tokio::test]
    async fn find_one_missing_is_none() {
        let store = new_store().await;
        assert!(store.find_one(Uuid::new_v4()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn find_many_sorts_and_limits() {
        let store = new_store().await;
        for title in ["a", "b", "c"] {
            store
                .insert(new_artwork("ann@example.com", title, "Oil"))
                .await
                .unwrap();
        }

        let newest = store
            .find_many(
                &Filter::all(),
                Some(Sort::desc(ArtworkField::CreatedAt)),
                Some(2),
            )
            .await
            .unwrap();
        let titles: Vec<_> = newest.iter().map(|a| a.title.as_str()).collect();
        assert_eq!(titles, vec!["c", "b"]);
    }

    #[tokio::test]
    async fn update_only_touches_matching_owner() {
        let store = new_store().await;
        let art = store
            .insert(new_artwork("ann@example.com", "Sunrise", "Abstract"))
            .await
            .unwrap();
        let patch = Patch::new().set(ArtworkField::Title, "Sunset");

        let wrong_owner = Filter::all()
            .eq(ArtworkField::Id, art.id)
            .eq(ArtworkField::UserEmail, "bob@example.com");
        assert_eq!(store.update_one_if_match(&wrong_owner, &patch).await.unwrap(), 0);

        let owner = Filter::all()
            .eq(ArtworkField::Id, art.id)
            .eq(ArtworkField::UserEmail, "ann@example.com");
        assert_eq!(store.update_one_if_match(&owner, &patch).await.unwrap(), 1);

        let fetched = store.find_one(art.id).await.unwrap().unwrap();
        assert_eq!(fetched.title, "Sunset");
    }

    #[tokio::test]
    async fn update_with_loose_filter_changes_one_document() {
        let store = new_store().await;
        for title in ["a", "b"] {
            store
                .insert(new_artwork("ann@example.com", title, "Oil"))
                .await
                .unwrap();
        }
        let patch = Patch::new().set(ArtworkField::Category, "Ink");
        let matched = store
            .update_one_if_match(&Filter::all().eq(ArtworkField::Category, "Oil"), &patch)
            .await
            .unwrap();
        assert_eq!(matched, 1);

        let still_oil = store
            .find_many(&Filter::all().eq(ArtworkField::Category, "Oil"), None, None)
            .await
            .unwrap();
        assert_eq!(still_oil.len(), 1);
    }

    #[tokio::test]
    async fn empty_patch_is_rejected() {
        let store = new_store().await;
        let err = store
            .update_one_if_match(&Filter::all(), &Patch::new())
            .await
            .unwrap_err();
        assert!(matches!(err, crate::services::store::StoreError::EmptyPatch));
    }

    #[tokio::test]
    async fn delete_twice_reports_zero() {
        let store = new_store().await;
        let art = store
            .insert(new_artwork("ann@example.com", "Sunrise", "Abstract"))
            .await
            .unwrap();
        let filter = Filter::all().eq(ArtworkField::Id, art.id);

        assert_eq!(store.delete_one_if_match(&filter).await.unwrap(), 1);
        assert_eq!(store.delete_one_if_match(&filter).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn concurrent_likes_are_not_lost() {
        let store = new_store().await;
        let art = store
            .insert(new_artwork("ann@example.com", "Sunrise", "Abstract"))
            .await
            .unwrap();

        let mut tasks = tokio::task::JoinSet::new();
        for _ in 0..25 {
            let store = store.clone();
            tasks.spawn(async move { store.increment_likes(art.id).await.unwrap() });
        }
        while let Some(res) = tasks.join_next().await {
            assert_eq!(res.unwrap(), 1);
        }

        let fetched = store.find_one(art.id).await.unwrap().unwrap();
        assert_eq!(fetched.likes, 25);
    }

    #[tokio::test]
    async fn group_count_orders_by_count_then_key() {
        let store = new_store().await;
        for (owner, n) in [("ann@example.com", 1), ("bob@example.com", 3), ("cy@example.com", 1)] {
            for i in 0..n {
                store
                    .insert(new_artwork(owner, &format!("t{}", i), "Oil"))
                    .await
                    .unwrap();
            }
        }

        let groups = store
            .group_count(&Filter::all(), ArtworkField::UserName, 2)
            .await
            .unwrap();
        assert_eq!(
            groups,
            vec![("bob".to_string(), 3), ("ann".to_string(), 1)]
        );
    }
}
