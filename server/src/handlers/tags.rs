// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
use super::AppError;
use crate::database::{self, Collection};
use crate::records::TagRecord;
use crate::state::AppState;
use axum::{
    extract::{Json, Path, State},
    http::StatusCode,
};
use common::{Tag, TagAggregated, TagPayload};
use tracing::{debug, error, info};

pub async fn list_tags(
    State(state): State<AppState>,
) -> Result<Json<Vec<TagAggregated>>, AppError> {
    let tags = database::list_tags(&state.pool).await?;
    info!("Successfully retrieved {} tags.", tags.len());
    Ok(Json(tags))
}

pub async fn create_tag(
    State(state): State<AppState>,
    Json(payload): Json<TagPayload>,
) -> Result<(StatusCode, Json<Tag>), AppError> {
    debug!("Received request to create tag: {}", payload.name);

    let record =
        TagRecord::from_payload(payload).map_err(|e| AppError::invalid_payload("create tag", e))?;
    let tag = database::create_tag(&state.pool, &record).await?;

    info!("Tag created successfully with ID: {}", tag.id);
    Ok((StatusCode::CREATED, Json(tag)))
}

pub async fn update_tag(
    State(state): State<AppState>,
    Path(tag_id): Path<String>,
    Json(payload): Json<TagPayload>,
) -> Result<Json<Tag>, AppError> {
    let record =
        TagRecord::from_payload(payload).map_err(|e| AppError::invalid_payload("update tag", e))?;

    database::update_tag(&state.pool, &tag_id, &record)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::not_found("Tag", &tag_id))
}

pub async fn delete_tag(
    State(state): State<AppState>,
    Path(tag_id): Path<String>,
) -> Result<StatusCode, AppError> {
    if database::delete_record(&state.pool, Collection::Tags, &tag_id).await? {
        info!("Tag with ID {} deleted successfully.", tag_id);
        Ok(StatusCode::NO_CONTENT)
    } else {
        error!("Tag with ID {} not found for deletion.", tag_id);
        Err(AppError::not_found("Tag", &tag_id))
    }
}
