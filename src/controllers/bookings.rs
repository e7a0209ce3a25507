use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::models::booking::ContactDetails;
use crate::services::registry::SharedSession;
use crate::services::session::{self, BookingSession, Phase, SessionView, SubmitReport};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/sessions", post(open_session))
        .route("/sessions/{id}", get(get_session))
        .route("/sessions/{id}", delete(close_session))
        .route("/sessions/{id}/selection", put(update_selection))
        .route("/sessions/{id}/submit", post(submit_booking))
        .route("/sessions/{id}/reload", post(reload_session))
}

/* ---------- helpers ---------- */

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub session_id: Uuid,
    #[serde(flatten)]
    pub view: SessionView,
}

fn not_found() -> (StatusCode, String) {
    (StatusCode::NOT_FOUND, "Session not found".to_string())
}

async fn find_session(state: &AppState, id: &Uuid) -> Result<SharedSession, (StatusCode, String)> {
    state.sessions.get(id).await.ok_or_else(not_found)
}

/* ---------- SESSIONS ---------- */

#[derive(Debug, Deserialize)]
pub struct OpenSessionQuery {
    #[serde(rename = "eventId")]
    pub event_id: Option<String>,
}

// POST /api/sessions?eventId=
pub async fn open_session(
    State(state): State<Arc<AppState>>,
    Query(params): Query<OpenSessionQuery>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let session = BookingSession::new(
        state.client.clone(),
        state.config.seatmap.policy.clone(),
        params.event_id,
    );
    // сессия видна в реестре уже во время загрузки
    let (session_id, shared) = state.sessions.insert(session).await;
    session::drive_open(&shared).await;
    let view = shared.lock().await.view();

    info!("Opened booking session {} ({:?})", session_id, view.phase);
    Ok((StatusCode::CREATED, Json(SessionResponse { session_id, view })))
}

// GET /api/sessions/{id}
pub async fn get_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let session = find_session(&state, &id).await?;
    let mut session = session.lock().await;
    session.touch();
    Ok(Json(SessionResponse { session_id: id, view: session.view() }))
}

#[derive(Debug, Deserialize)]
pub struct SelectionRequest {
    #[serde(default)]
    pub checked: Vec<String>,
}

// PUT /api/sessions/{id}/selection
pub async fn update_selection(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(req): Json<SelectionRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let session = find_session(&state, &id).await?;
    let mut session = session.lock().await;
    session.toggle(&req.checked);
    Ok(Json(SessionResponse { session_id: id, view: session.view() }))
}

// POST /api/sessions/{id}/submit
pub async fn submit_booking(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(contact): Json<ContactDetails>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let shared = find_session(&state, &id).await?;

    // повторная отправка не ставится в очередь
    match session::drive_submit(&shared, contact).await {
        SubmitReport::NotReady(Phase::Submitting) => Err((
            StatusCode::CONFLICT,
            "Booking is already being submitted".to_string(),
        )),
        SubmitReport::NotReady(phase) => Err((
            StatusCode::CONFLICT,
            format!("Session is not ready for booking ({:?})", phase),
        )),
        report => {
            info!("Session {} submit finished: {:?}", id, report);
            let view = shared.lock().await.view();
            Ok(Json(SessionResponse { session_id: id, view }))
        }
    }
}

// POST /api/sessions/{id}/reload
pub async fn reload_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let shared = find_session(&state, &id).await?;
    session::drive_reload(&shared).await;
    let view = shared.lock().await.view();
    Ok(Json(SessionResponse { session_id: id, view }))
}

// DELETE /api/sessions/{id}
pub async fn close_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    if state.sessions.remove(&id).await {
        info!("Closed booking session {}", id);
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found())
    }
}
