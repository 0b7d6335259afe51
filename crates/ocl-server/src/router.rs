//! Router assembly for the source dictionary HTTP API.
//!
//! [`build_router`] wires all handler functions to their routes with
//! CORS and tracing middleware layers.

use axum::routing::get;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::handlers::{extras, health, sources, versions};
use crate::state::AppState;

/// Builds the complete axum router with all API routes.
///
/// Routes use axum 0.8 `/{param}` path syntax. Static segments (`extras`,
/// `versions`, `latest`) take precedence over the `{version}` parameter.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health))
        // Sources
        .route("/sources", get(sources::list_all_sources))
        .route(
            "/{owner_kind}/{owner}/sources",
            get(sources::list_sources).post(sources::create_source),
        )
        .route(
            "/{owner_kind}/{owner}/sources/{source}",
            get(sources::get_source)
                .put(sources::update_source)
                .patch(sources::update_source)
                .delete(sources::delete_source),
        )
        // Extras
        .route(
            "/{owner_kind}/{owner}/sources/{source}/extras",
            get(extras::get_extras),
        )
        .route(
            "/{owner_kind}/{owner}/sources/{source}/extras/{key}",
            get(extras::get_extra)
                .put(extras::put_extra)
                .delete(extras::delete_extra),
        )
        // Versions
        .route(
            "/{owner_kind}/{owner}/sources/{source}/versions",
            get(versions::list_versions).post(versions::create_version),
        )
        .route(
            "/{owner_kind}/{owner}/sources/{source}/latest",
            get(versions::get_latest)
                .put(versions::update_latest)
                .patch(versions::update_latest),
        )
        .route(
            "/{owner_kind}/{owner}/sources/{source}/latest/children",
            get(versions::list_latest_children),
        )
        .route(
            "/{owner_kind}/{owner}/sources/{source}/{version}",
            get(versions::get_version)
                .put(versions::update_version)
                .patch(versions::update_version)
                .delete(versions::delete_version),
        )
        .route(
            "/{owner_kind}/{owner}/sources/{source}/{version}/children",
            get(versions::list_children),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
