use axum::{
    middleware,
    routing::{delete, get, patch, post, put},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::middleware::{make_span_with_request_id, request_id_middleware};

use super::handlers;
use super::AppState;

/// Creates the main API router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        // Search sessions
        .route("/sessions", post(handlers::create_session))
        .route(
            "/sessions/:id",
            get(handlers::get_session).delete(handlers::delete_session),
        )
        .route(
            "/sessions/:id/search",
            post(handlers::search).delete(handlers::reset_search),
        )
        .route(
            "/sessions/:id/filters",
            patch(handlers::update_filters).delete(handlers::clear_filters),
        )
        .route("/sessions/:id/view-mode", put(handlers::set_view_mode))
        .route(
            "/sessions/:id/view-mode/toggle",
            post(handlers::toggle_view_mode),
        )
        // Search history
        .route(
            "/history",
            get(handlers::get_history)
                .post(handlers::add_history)
                .delete(handlers::clear_history),
        )
        .route("/history/:query", delete(handlers::delete_history_entry))
        // Favorites
        .route(
            "/favorites",
            get(handlers::list_favorites).delete(handlers::clear_favorites),
        )
        .route(
            "/favorites/:source/:id",
            get(handlers::get_favorite)
                .put(handlers::save_favorite)
                .delete(handlers::delete_favorite),
        )
        // Play records
        .route("/play-records", get(handlers::list_play_records))
        .route(
            "/play-records/:source/:id",
            put(handlers::save_play_record).delete(handlers::delete_play_record),
        )
        .layer(
            ServiceBuilder::new()
                .layer(middleware::from_fn(request_id_middleware))
                .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
