//! Aggregate views over public artworks.

use crate::{
    errors::AppError,
    models::artwork::{ArtistCount, Artwork, Visibility},
    services::{
        artwork_store::ArtworkField,
        store::{Filter, Sort},
    },
    state::AppState,
};
use axum::{Json, extract::State};

const TOP_ARTISTS_LIMIT: i64 = 5;
const HIGHLIGHTS_LIMIT: i64 = 6;

/// GET `/top-artists` — owners with the most public artworks.
pub async fn top_artists(
    State(state): State<AppState>,
) -> Result<Json<Vec<ArtistCount>>, AppError> {
    let filter = Filter::all().eq(ArtworkField::Visibility, Visibility::Public);
    let groups = state
        .artworks
        .group_count(&filter, ArtworkField::UserName, TOP_ARTISTS_LIMIT)
        .await?;

    let artists = groups
        .into_iter()
        .map(|(user_name, count)| ArtistCount { user_name, count })
        .collect();
    Ok(Json(artists))
}

/// GET `/community-highlights` — most-liked public artworks.
pub async fn community_highlights(
    State(state): State<AppState>,
) -> Result<Json<Vec<Artwork>>, AppError> {
    let filter = Filter::all().eq(ArtworkField::Visibility, Visibility::Public);
    let artworks = state
        .artworks
        .find_many(
            &filter,
            Some(Sort::desc(ArtworkField::Likes)),
            Some(HIGHLIGHTS_LIMIT),
        )
        .await?;
    Ok(Json(artworks))
}
