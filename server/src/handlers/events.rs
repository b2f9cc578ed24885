// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
use super::AppError;
use crate::dates::{self, DueDateInput};
use crate::events;
use crate::state::AppState;
use axum::{
    extract::{Json, Query, State},
    http::StatusCode,
};
use chrono::{DateTime, NaiveTime, Utc};
use common::CalendarEvent;
use serde::Deserialize;
use tracing::debug;

#[derive(Deserialize, Debug)]
pub struct EventWindow {
    pub start: String,
    pub end: String,
}

/// Resolves a window bound. A plain date covers its whole day.
fn window_bound(raw: &str, state: &AppState, is_end: bool) -> Result<DateTime<Utc>, AppError> {
    let tz = &state.utc_offset;
    match dates::parse_due_date(raw, tz) {
        Ok(DueDateInput::Instant(instant)) => Ok(instant),
        Ok(DueDateInput::Day(day)) if is_end => {
            Ok(dates::end_of_day(dates::local_to_utc(tz, day.and_time(NaiveTime::MIN)), tz))
        }
        Ok(DueDateInput::Day(day)) => Ok(dates::local_to_utc(tz, day.and_time(NaiveTime::MIN))),
        Err(e) => Err(AppError::new(
            StatusCode::BAD_REQUEST,
            &format!("Failed to list events: {e}."),
        )),
    }
}

/// Handler for the calendar projection of entries due in `[start, end]`.
pub async fn list_events(
    State(state): State<AppState>,
    Query(window): Query<EventWindow>,
) -> Result<Json<Vec<CalendarEvent>>, AppError> {
    debug!("Received request for events between {} and {}", window.start, window.end);

    let start = window_bound(&window.start, &state, false)?;
    let end = window_bound(&window.end, &state, true)?;

    Ok(Json(events::events_between(&state.pool, start, end).await))
}
