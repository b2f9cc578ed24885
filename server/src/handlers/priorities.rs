// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
use super::AppError;
use crate::database::{self, Collection};
use crate::records::PriorityRecord;
use crate::state::AppState;
use axum::{
    extract::{Json, Path, State},
    http::StatusCode,
};
use common::{Priority, PriorityAggregated, PriorityPayload};
use tracing::{debug, error, info};

pub async fn list_priorities(
    State(state): State<AppState>,
) -> Result<Json<Vec<PriorityAggregated>>, AppError> {
    let priorities = database::list_priorities(&state.pool).await?;
    info!("Successfully retrieved {} priorities.", priorities.len());
    Ok(Json(priorities))
}

pub async fn create_priority(
    State(state): State<AppState>,
    Json(payload): Json<PriorityPayload>,
) -> Result<(StatusCode, Json<Priority>), AppError> {
    debug!("Received request to create priority: {}", payload.name);

    let record = PriorityRecord::from_payload(payload)
        .map_err(|e| AppError::invalid_payload("create priority", e))?;
    let priority = database::create_priority(&state.pool, &record).await?;

    info!("Priority created successfully with ID: {}", priority.id);
    Ok((StatusCode::CREATED, Json(priority)))
}

pub async fn update_priority(
    State(state): State<AppState>,
    Path(priority_id): Path<String>,
    Json(payload): Json<PriorityPayload>,
) -> Result<Json<Priority>, AppError> {
    let record = PriorityRecord::from_payload(payload)
        .map_err(|e| AppError::invalid_payload("update priority", e))?;

    database::update_priority(&state.pool, &priority_id, &record)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::not_found("Priority", &priority_id))
}

pub async fn delete_priority(
    State(state): State<AppState>,
    Path(priority_id): Path<String>,
) -> Result<StatusCode, AppError> {
    if database::delete_record(&state.pool, Collection::Priorities, &priority_id).await? {
        info!("Priority with ID {} deleted successfully.", priority_id);
        Ok(StatusCode::NO_CONTENT)
    } else {
        error!("Priority with ID {} not found for deletion.", priority_id);
        Err(AppError::not_found("Priority", &priority_id))
    }
}
