//! HTTP handlers for the `/artworks` collection.
//!
//! Public reads only ever filter on what the client asked for; private
//! mutations go through `OwnerScope` so a non-owner's request matches
//! nothing and comes back as 404.

use crate::{
    errors::AppError,
    handlers::{
        IdResponse, OkResponse,
        extract::{AuthUser, JsonBody, ResourceId},
        non_blank,
    },
    models::artwork::{Artwork, Visibility},
    services::{
        artwork_store::{ArtworkField, NewArtwork},
        ownership::OwnerScope,
        store::{Filter, Patch, Sort},
    },
    state::AppState,
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};

const FEATURED_LIMIT: i64 = 6;

/// Query params accepted by `GET /artworks/search`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchQuery {
    pub category: Option<String>,
    pub title: Option<String>,
    pub user_name: Option<String>,
}

/// Body of `POST /artworks`. Owner fields, `createdAt` and `likes` are not
/// part of it, so a client sending them has no effect.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateArtworkReq {
    pub title: Option<String>,
    pub image_url: Option<String>,
    pub category: Option<String>,
    pub visibility: Option<Visibility>,
}

/// Body of `PUT /artworks/{id}`: the allow-listed updatable fields.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateArtworkReq {
    pub title: Option<String>,
    pub image_url: Option<String>,
    pub category: Option<String>,
    pub visibility: Option<Visibility>,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

fn public() -> Filter<ArtworkField> {
    Filter::all().eq(ArtworkField::Visibility, Visibility::Public)
}

fn newest_first() -> Option<Sort<ArtworkField>> {
    Some(Sort::desc(ArtworkField::CreatedAt))
}

/// GET `/artworks` — every artwork in insertion order.
pub async fn list_artworks(State(state): State<AppState>) -> Result<Json<Vec<Artwork>>, AppError> {
    let artworks = state
        .artworks
        .find_many(&Filter::all(), Some(Sort::asc(ArtworkField::CreatedAt)), None)
        .await?;
    Ok(Json(artworks))
}

/// GET `/artworks/featured` — the six newest public artworks.
pub async fn featured_artworks(
    State(state): State<AppState>,
) -> Result<Json<Vec<Artwork>>, AppError> {
    let artworks = state
        .artworks
        .find_many(&public(), newest_first(), Some(FEATURED_LIMIT))
        .await?;
    Ok(Json(artworks))
}

/// GET `/artworks/search?category=&title=&userName=`
///
/// Public artworks, optionally restricted to an exact category, and, when
/// `title` and/or `userName` are given, to those whose title or owner name
/// contains the term (case-insensitive).
pub async fn search_artworks(
    State(state): State<AppState>,
    Query(q): Query<SearchQuery>,
) -> Result<Json<Vec<Artwork>>, AppError> {
    let mut filter = public();
    if let Some(category) = non_blank(q.category) {
        filter = filter.eq(ArtworkField::Category, category);
    }

    let mut terms = Vec::new();
    if let Some(title) = non_blank(q.title) {
        terms.push((ArtworkField::Title, title));
    }
    if let Some(user_name) = non_blank(q.user_name) {
        terms.push((ArtworkField::UserName, user_name));
    }
    let filter = filter.contains_any(terms);

    let artworks = state
        .artworks
        .find_many(&filter, newest_first(), None)
        .await?;
    Ok(Json(artworks))
}

/// GET `/artworks/explore` — all public artworks, newest first.
pub async fn explore_artworks(
    State(state): State<AppState>,
) -> Result<Json<Vec<Artwork>>, AppError> {
    let artworks = state
        .artworks
        .find_many(&public(), newest_first(), None)
        .await?;
    Ok(Json(artworks))
}

/// GET `/artworks/user/{email}`
pub async fn artworks_by_user(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> Result<Json<Vec<Artwork>>, AppError> {
    let filter = Filter::all().eq(ArtworkField::UserEmail, email);
    let artworks = state
        .artworks
        .find_many(&filter, newest_first(), None)
        .await?;
    Ok(Json(artworks))
}

/// GET `/artworks/{id}`
pub async fn get_artwork(
    State(state): State<AppState>,
    ResourceId(id): ResourceId,
) -> Result<Json<Artwork>, AppError> {
    let artwork = state
        .artworks
        .find_one(id)
        .await?
        .ok_or_else(|| AppError::not_found("artwork not found"))?;
    Ok(Json(artwork))
}

/// POST `/artworks` — create an artwork owned by the caller.
pub async fn create_artwork(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    JsonBody(req): JsonBody<CreateArtworkReq>,
) -> Result<impl IntoResponse, AppError> {
    let (Some(title), Some(image_url), Some(category)) = (
        non_blank(req.title),
        non_blank(req.image_url),
        non_blank(req.category),
    ) else {
        return Err(AppError::bad_request("title, imageUrl, category required"));
    };

    let artwork = state
        .artworks
        .insert(NewArtwork {
            title,
            image_url,
            category,
            user_email: principal.email,
            user_name: principal.display_name,
            user_photo: principal.avatar_url,
            visibility: req.visibility.unwrap_or_default(),
        })
        .await?;

    tracing::info!(id = %artwork.id, owner = %artwork.user_email, "artwork created");
    Ok((StatusCode::CREATED, Json(IdResponse { id: artwork.id })))
}

/// PUT `/artworks/{id}` — owner-only update of the allow-listed fields.
pub async fn update_artwork(
    State(state): State<AppState>,
    ResourceId(id): ResourceId,
    AuthUser(principal): AuthUser,
    JsonBody(req): JsonBody<UpdateArtworkReq>,
) -> Result<Json<OkResponse>, AppError> {
    let patch = build_patch(req)?;
    let filter = OwnerScope::new(&principal).one::<ArtworkField>(id);

    let matched = state.artworks.update_one_if_match(&filter, &patch).await?;
    if matched == 0 {
        return Err(AppError::not_found_or_not_owned());
    }

    tracing::info!(%id, owner = %principal.email, "artwork updated");
    Ok(Json(OkResponse::ok()))
}

fn build_patch(req: UpdateArtworkReq) -> Result<Patch<ArtworkField>, AppError> {
    let mut patch = Patch::new();
    for (field, name, value) in [
        (ArtworkField::Title, "title", req.title),
        (ArtworkField::ImageUrl, "imageUrl", req.image_url),
        (ArtworkField::Category, "category", req.category),
    ] {
        if let Some(value) = value {
            if value.trim().is_empty() {
                return Err(AppError::bad_request(format!("{} must not be empty", name)));
            }
            patch = patch.set(field, value);
        }
    }
    if let Some(visibility) = req.visibility {
        patch = patch.set(ArtworkField::Visibility, visibility);
    }

    if patch.is_empty() {
        return Err(AppError::bad_request("no updatable fields"));
    }
    Ok(patch)
}

/// DELETE `/artworks/{id}` — owner-only delete.
pub async fn delete_artwork(
    State(state): State<AppState>,
    ResourceId(id): ResourceId,
    AuthUser(principal): AuthUser,
) -> Result<Json<OkResponse>, AppError> {
    let filter = OwnerScope::new(&principal).one::<ArtworkField>(id);

    let deleted = state.artworks.delete_one_if_match(&filter).await?;
    if deleted == 0 {
        return Err(AppError::not_found_or_not_owned());
    }

    tracing::info!(%id, owner = %principal.email, "artwork deleted");
    Ok(Json(OkResponse::ok()))
}

/// PATCH `/artworks/{id}/like` — public, no per-user dedup.
pub async fn like_artwork(
    State(state): State<AppState>,
    ResourceId(id): ResourceId,
) -> Result<Json<MessageResponse>, AppError> {
    let matched = state.artworks.increment_likes(id).await?;
    if matched == 0 {
        return Err(AppError::not_found("artwork not found"));
    }
    Ok(Json(MessageResponse { message: "Liked!" }))
}
