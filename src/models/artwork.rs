//! Represents an artwork posted by a signed-in user.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Whether an artwork shows up in public listings.
#[derive(Serialize, Deserialize, sqlx::Type, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Visibility {
    #[default]
    #[serde(alias = "public")]
    Public,
    #[serde(alias = "private")]
    Private,
}

impl Visibility {
    pub fn as_str(&self) -> &'static str {
        match self {
            Visibility::Public => "Public",
            Visibility::Private => "Private",
        }
    }
}

/// A single artwork record.
///
/// The owner fields, `created_at` and `likes` are always set by the server;
/// none of them can be supplied or changed by a client.
#[derive(Serialize, Deserialize, Clone, FromRow, Debug)]
#[serde(rename_all = "camelCase")]
pub struct Artwork {
    /// Store-assigned identifier.
    pub id: Uuid,

    pub title: String,

    pub image_url: String,

    pub category: String,

    /// Email of the verified principal that created the artwork.
    pub user_email: String,

    /// Display name of the owner at creation time.
    pub user_name: String,

    /// Avatar URL of the owner, when the identity provider has one.
    pub user_photo: Option<String>,

    /// Insertion time. Never updated.
    pub created_at: DateTime<Utc>,

    /// Like counter. Starts at zero and only ever increments.
    pub likes: i64,

    pub visibility: Visibility,
}

/// One row of the "top artists" aggregation.
#[derive(Serialize, Clone, FromRow, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ArtistCount {
    pub user_name: String,
    pub count: i64,
}
