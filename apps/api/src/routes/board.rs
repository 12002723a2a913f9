use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::errors::AppError;
use crate::pipeline::board::{
    BoardSnapshot, DragEnded, DragTicket, EndDragRequest, HoverRequest, StartDragRequest,
};
use crate::pipeline::drag::{DragState, HoverOutcome};
use crate::pipeline::grouping::PipelineItem;
use crate::pipeline::stages::Stage;
use crate::resources::{Resource, ScopeParams};
use crate::state::{AppState, HasBoard};

/// GET /api/v1/boards/{board}
pub async fn handle_board<T>(
    State(state): State<AppState>,
    Query(scope): Query<ScopeParams>,
) -> Json<BoardSnapshot<T>>
where
    T: Resource + PipelineItem,
    AppState: HasBoard<T>,
{
    Json(HasBoard::<T>::board(&state).refresh(&scope).await)
}

/// GET /api/v1/boards/{board}/stages
pub async fn handle_stages<T>(State(state): State<AppState>) -> Json<Vec<Stage>>
where
    T: Resource + PipelineItem,
    AppState: HasBoard<T>,
{
    Json(HasBoard::<T>::board(&state).registry().stages().to_vec())
}

/// POST /api/v1/boards/{board}/drags
pub async fn handle_start_drag<T>(
    State(state): State<AppState>,
    Json(req): Json<StartDragRequest>,
) -> Result<(StatusCode, Json<DragTicket>), AppError>
where
    T: Resource + PipelineItem,
    AppState: HasBoard<T>,
{
    let ticket = HasBoard::<T>::board(&state)
        .start_drag(&req.item_id, req.sensor)
        .await?;
    Ok((StatusCode::CREATED, Json(ticket)))
}

/// GET /api/v1/boards/{board}/drags/:session
pub async fn handle_drag_state<T>(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<DragState>, AppError>
where
    T: Resource + PipelineItem,
    AppState: HasBoard<T>,
{
    Ok(Json(HasBoard::<T>::board(&state).drag_state(session_id).await?))
}

/// POST /api/v1/boards/{board}/drags/:session/hover
pub async fn handle_hover<T>(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(req): Json<HoverRequest>,
) -> Result<Json<HoverOutcome>, AppError>
where
    T: Resource + PipelineItem,
    AppState: HasBoard<T>,
{
    let outcome = HasBoard::<T>::board(&state)
        .hover(session_id, &req.stage_id)
        .await?;
    Ok(Json(outcome))
}

/// POST /api/v1/boards/{board}/drags/:session/end
pub async fn handle_end_drag<T>(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(req): Json<EndDragRequest>,
) -> Result<Json<DragEnded>, AppError>
where
    T: Resource + PipelineItem,
    AppState: HasBoard<T>,
{
    let ended = HasBoard::<T>::board(&state)
        .end_drag(session_id, req.reason)
        .await?;
    Ok(Json(ended))
}
