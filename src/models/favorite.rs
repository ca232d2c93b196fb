//! Represents a user's bookmark of an artwork.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::artwork::Artwork;

/// A favorite entry. `artwork_id` is checked at creation only; the store does
/// not enforce it, so an entry can outlive its artwork.
#[derive(Serialize, Deserialize, Clone, FromRow, Debug)]
#[serde(rename_all = "camelCase")]
pub struct Favorite {
    pub id: Uuid,
    pub artwork_id: Uuid,
    pub user_email: String,
    pub added_at: DateTime<Utc>,
}

/// A favorite joined with the artwork it references.
///
/// Produced by an inner join, so an orphaned favorite never yields one.
#[derive(Serialize, Clone, FromRow, Debug)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteWithArtwork {
    #[sqlx(rename = "fav_id")]
    pub id: Uuid,

    #[sqlx(rename = "fav_artwork_id")]
    pub artwork_id: Uuid,

    #[sqlx(rename = "fav_user_email")]
    pub user_email: String,

    #[sqlx(rename = "fav_added_at")]
    pub added_at: DateTime<Utc>,

    #[sqlx(flatten)]
    pub artwork: Artwork,
}
