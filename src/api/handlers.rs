use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::{
    db::{HistoryStore, LibraryStore},
    error::{AppError, AppResult},
    middleware::RequestId,
    models::{
        library::{favorite_entries, recent_play_records},
        Favorite, FavoriteEntry, FilterUpdate, PlayRecord, StorageKey, ViewMode,
    },
    services::{QueryOrigin, SearchView},
};

use super::AppState;

// Request/Response types

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub id: Uuid,
    #[serde(flatten)]
    pub view: SearchView,
}

#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    pub query: String,
    #[serde(default)]
    pub origin: QueryOrigin,
}

#[derive(Debug, Deserialize)]
pub struct ViewModeRequest {
    pub view_mode: ViewMode,
}

#[derive(Debug, Deserialize)]
pub struct HistoryRequest {
    pub query: String,
}

#[derive(Debug, Serialize)]
pub struct PlayRecordEntry {
    pub key: String,
    /// Watched share of the current episode, in percent
    pub progress: f64,
    #[serde(flatten)]
    pub record: PlayRecord,
}

fn session_response(id: Uuid, view: SearchView) -> Json<SessionResponse> {
    Json(SessionResponse { id, view })
}

fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

// Handlers

/// Health check endpoint
pub async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}

/// Open a search session in the configured default view mode
pub async fn create_session(
    State(state): State<AppState>,
) -> (StatusCode, Json<SessionResponse>) {
    let (id, controller) = state.create_session().await;
    (StatusCode::CREATED, session_response(id, controller.view().await))
}

pub async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<SessionResponse>> {
    let controller = state.session(id).await?;
    Ok(session_response(id, controller.view().await))
}

pub async fn delete_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    state.remove_session(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Run a query; a blank query changes nothing and answers 204
pub async fn search(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Extension(request_id): Extension<RequestId>,
    Json(request): Json<SearchRequest>,
) -> AppResult<Response> {
    let controller = state.session(id).await?;

    tracing::debug!(
        request_id = %request_id,
        session = %id,
        origin = ?request.origin,
        "Search requested"
    );

    match controller.submit(&request.query, request.origin).await {
        Some(view) => Ok(session_response(id, view).into_response()),
        None => Ok(StatusCode::NO_CONTENT.into_response()),
    }
}

/// Leave the results page without a query
pub async fn reset_search(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<SessionResponse>> {
    let controller = state.session(id).await?;
    Ok(session_response(id, controller.reset().await))
}

pub async fn update_filters(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(update): Json<FilterUpdate>,
) -> AppResult<Json<SessionResponse>> {
    let controller = state.session(id).await?;
    Ok(session_response(id, controller.update_filters(update).await))
}

/// Reset year, source, kind and sort together
pub async fn clear_filters(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<SessionResponse>> {
    let controller = state.session(id).await?;
    Ok(session_response(id, controller.clear_filters().await))
}

pub async fn set_view_mode(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<ViewModeRequest>,
) -> AppResult<Json<SessionResponse>> {
    let controller = state.session(id).await?;
    Ok(session_response(
        id,
        controller.set_view_mode(request.view_mode).await,
    ))
}

pub async fn toggle_view_mode(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<SessionResponse>> {
    let controller = state.session(id).await?;
    Ok(session_response(id, controller.toggle_view_mode().await))
}

/// Search history, most recent first
pub async fn get_history(State(state): State<AppState>) -> AppResult<Json<Vec<String>>> {
    Ok(Json(state.store.history().await?))
}

pub async fn add_history(
    State(state): State<AppState>,
    Json(request): Json<HistoryRequest>,
) -> AppResult<(StatusCode, Json<Vec<String>>)> {
    state.store.add_history(&request.query).await?;
    Ok((StatusCode::CREATED, Json(state.store.history().await?)))
}

pub async fn delete_history_entry(
    State(state): State<AppState>,
    Path(query): Path<String>,
) -> AppResult<StatusCode> {
    state.store.delete_history(&query).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn clear_history(State(state): State<AppState>) -> AppResult<StatusCode> {
    state.store.clear_history().await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Favorites newest first, with the episode the user is on
pub async fn list_favorites(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<FavoriteEntry>>> {
    let favorites = state.store.favorites().await?;
    let play_records = state.store.play_records().await?;
    Ok(Json(favorite_entries(&favorites, &play_records)))
}

pub async fn get_favorite(
    State(state): State<AppState>,
    Path((source, id)): Path<(String, String)>,
) -> AppResult<Json<Favorite>> {
    let key = StorageKey::new(&source, &id);
    state
        .store
        .favorite(&key)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Favorite {}", key)))
}

/// Save a favorite; a missing save time is stamped with the current time
pub async fn save_favorite(
    State(state): State<AppState>,
    Path((source, id)): Path<(String, String)>,
    Json(mut favorite): Json<Favorite>,
) -> AppResult<Json<Favorite>> {
    if favorite.title.trim().is_empty() {
        return Err(AppError::InvalidInput(
            "Favorite title cannot be empty".to_string(),
        ));
    }
    if favorite.save_time == 0 {
        favorite.save_time = now_millis();
    }

    let key = StorageKey::new(&source, &id);
    state.store.save_favorite(&key, favorite.clone()).await?;
    tracing::info!(key = %key, "Favorite saved");
    Ok(Json(favorite))
}

pub async fn delete_favorite(
    State(state): State<AppState>,
    Path((source, id)): Path<(String, String)>,
) -> AppResult<StatusCode> {
    state
        .store
        .delete_favorite(&StorageKey::new(&source, &id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn clear_favorites(State(state): State<AppState>) -> AppResult<StatusCode> {
    state.store.clear_favorites().await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Continue-watching list, newest first
pub async fn list_play_records(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<PlayRecordEntry>>> {
    let records = state.store.play_records().await?;
    Ok(Json(
        recent_play_records(&records)
            .into_iter()
            .map(|(key, record)| PlayRecordEntry {
                key,
                progress: record.progress(),
                record,
            })
            .collect(),
    ))
}

pub async fn save_play_record(
    State(state): State<AppState>,
    Path((source, id)): Path<(String, String)>,
    Json(mut record): Json<PlayRecord>,
) -> AppResult<Json<PlayRecord>> {
    if record.save_time == 0 {
        record.save_time = now_millis();
    }

    let key = StorageKey::new(&source, &id);
    state.store.save_play_record(&key, record.clone()).await?;
    tracing::debug!(key = %key, episode = record.index, "Play record saved");
    Ok(Json(record))
}

pub async fn delete_play_record(
    State(state): State<AppState>,
    Path((source, id)): Path<(String, String)>,
) -> AppResult<StatusCode> {
    state
        .store
        .delete_play_record(&StorageKey::new(&source, &id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
