// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
use super::AppError;
use crate::database::{self, Collection};
use crate::records::ListRecord;
use crate::state::AppState;
use axum::{
    extract::{Json, Path, State},
    http::StatusCode,
};
use common::{List, ListAggregated, ListPayload};
use tracing::{debug, error, info};

/// Handler for listing lists with their entry counts, ordered by name.
pub async fn list_lists(
    State(state): State<AppState>,
) -> Result<Json<Vec<ListAggregated>>, AppError> {
    let lists = database::list_lists(&state.pool).await?;
    info!("Successfully retrieved {} lists.", lists.len());
    Ok(Json(lists))
}

pub async fn create_list(
    State(state): State<AppState>,
    Json(payload): Json<ListPayload>,
) -> Result<(StatusCode, Json<List>), AppError> {
    debug!("Received request to create list: {}", payload.name);

    let record =
        ListRecord::from_payload(payload).map_err(|e| AppError::invalid_payload("create list", e))?;
    let list = database::create_list(&state.pool, &record).await?;

    info!("List created successfully with ID: {}", list.id);
    Ok((StatusCode::CREATED, Json(list)))
}

pub async fn update_list(
    State(state): State<AppState>,
    Path(list_id): Path<String>,
    Json(payload): Json<ListPayload>,
) -> Result<Json<List>, AppError> {
    debug!("Received request to update list with ID: {}", list_id);

    let record =
        ListRecord::from_payload(payload).map_err(|e| AppError::invalid_payload("update list", e))?;

    match database::update_list(&state.pool, &list_id, &record).await? {
        Some(list) => {
            info!("List with ID {} updated successfully.", list_id);
            Ok(Json(list))
        }
        None => {
            error!("List with ID {} not found for update.", list_id);
            Err(AppError::not_found("List", &list_id))
        }
    }
}

/// Entries filed under the list keep their (now dangling) reference.
pub async fn delete_list(
    State(state): State<AppState>,
    Path(list_id): Path<String>,
) -> Result<StatusCode, AppError> {
    if database::delete_record(&state.pool, Collection::Lists, &list_id).await? {
        info!("List with ID {} deleted successfully.", list_id);
        Ok(StatusCode::NO_CONTENT)
    } else {
        error!("List with ID {} not found for deletion.", list_id);
        Err(AppError::not_found("List", &list_id))
    }
}
