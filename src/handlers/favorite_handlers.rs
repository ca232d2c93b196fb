//! HTTP handlers for the caller's `/favorites`. Every route here is private.

use crate::{
    errors::AppError,
    handlers::{
        IdResponse, OkResponse,
        extract::{AuthUser, JsonBody, ResourceId, parse_id},
        non_blank,
    },
    models::favorite::FavoriteWithArtwork,
    services::{favorite_store::FavoriteField, ownership::OwnerScope},
    state::AppState,
};
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddFavoriteReq {
    pub artwork_id: Option<String>,
}

/// POST `/favorites` — bookmark an existing artwork.
pub async fn add_favorite(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    JsonBody(req): JsonBody<AddFavoriteReq>,
) -> Result<impl IntoResponse, AppError> {
    let raw = non_blank(req.artwork_id).ok_or_else(|| AppError::bad_request("artworkId required"))?;
    let artwork_id = parse_id(&raw).map_err(|_| AppError::bad_request("invalid artworkId"))?;

    if state.artworks.find_one(artwork_id).await?.is_none() {
        return Err(AppError::not_found("artwork not found"));
    }

    let favorite = state
        .favorites
        .insert(artwork_id, &principal.email)
        .await?;

    tracing::info!(id = %favorite.id, %artwork_id, owner = %principal.email, "favorite added");
    Ok((StatusCode::CREATED, Json(IdResponse { id: favorite.id })))
}

/// GET `/favorites` — the caller's favorites joined to their artworks.
pub async fn list_favorites(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
) -> Result<Json<Vec<FavoriteWithArtwork>>, AppError> {
    let filter = OwnerScope::new(&principal).all::<FavoriteField>();
    let favorites = state.favorites.find_joined(&filter).await?;
    Ok(Json(favorites))
}

/// DELETE `/favorites/{id}` — owner-only removal.
pub async fn remove_favorite(
    State(state): State<AppState>,
    ResourceId(id): ResourceId,
    AuthUser(principal): AuthUser,
) -> Result<Json<OkResponse>, AppError> {
    let filter = OwnerScope::new(&principal).one::<FavoriteField>(id);

    let deleted = state.favorites.delete_one_if_match(&filter).await?;
    if deleted == 0 {
        return Err(AppError::not_found_or_not_owned());
    }

    tracing::info!(%id, owner = %principal.email, "favorite removed");
    Ok(Json(OkResponse::ok()))
}
