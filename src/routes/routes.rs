//! Defines routes for all artwork, favorite and aggregate endpoints.
//!
//! ## Structure
//! - **Artworks** (public reads, owner-only writes)
//!   - `GET    /artworks`                — list all
//!   - `GET    /artworks/featured`       — six newest public
//!   - `GET    /artworks/search`         — `?category=&title=&userName=`
//!   - `GET    /artworks/explore`        — all public
//!   - `GET    /artworks/user/{email}`   — by owner email
//!   - `GET    /artworks/{id}`           — single artwork
//!   - `POST   /artworks`                — create (auth)
//!   - `PUT    /artworks/{id}`           — update (owner)
//!   - `DELETE /artworks/{id}`           — delete (owner)
//!   - `PATCH  /artworks/{id}/like`      — like (public)
//!
//! - **Favorites** (all private)
//!   - `POST   /favorites`, `GET /favorites`, `DELETE /favorites/{id}`
//!
//! - **Aggregates**
//!   - `GET    /top-artists`, `GET /community-highlights`

use crate::{
    handlers::{
        artwork_handlers::{
            artworks_by_user, create_artwork, delete_artwork, explore_artworks,
            featured_artworks, get_artwork, like_artwork, list_artworks, search_artworks,
            update_artwork,
        },
        favorite_handlers::{add_favorite, list_favorites, remove_favorite},
        health_handlers::{healthz, readyz},
        stats_handlers::{community_highlights, top_artists},
    },
    state::AppState,
};
use anyhow::{Context, Result};
use axum::{
    Router,
    http::{HeaderValue, Method, header},
    routing::{delete, get, patch},
};
use std::time::Duration;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Build and return the router for every endpoint.
///
/// The router carries shared state (`AppState`) to all handlers.
pub fn routes() -> Router<AppState> {
    Router::new()
        // health endpoints (mounted at root)
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        // Artwork routes
        .route("/artworks", get(list_artworks).post(create_artwork))
        .route("/artworks/featured", get(featured_artworks))
        .route("/artworks/search", get(search_artworks))
        .route("/artworks/explore", get(explore_artworks))
        .route("/artworks/user/{email}", get(artworks_by_user))
        .route(
            "/artworks/{id}",
            get(get_artwork).put(update_artwork).delete(delete_artwork),
        )
        .route("/artworks/{id}/like", patch(like_artwork))
        // Favorite routes
        .route("/favorites", get(list_favorites).post(add_favorite))
        .route("/favorites/{id}", delete(remove_favorite))
        // Aggregates
        .route("/top-artists", get(top_artists))
        .route("/community-highlights", get(community_highlights))
}

/// The complete application: routes, state, CORS for `client_url` and
/// request tracing.
pub fn app(state: AppState, client_url: &str) -> Result<Router> {
    let origin = HeaderValue::from_str(client_url.trim_end_matches('/'))
        .with_context(|| format!("invalid client URL `{}`", client_url))?;

    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .max_age(Duration::from_secs(60 * 60));

    Ok(routes()
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http()))
}
