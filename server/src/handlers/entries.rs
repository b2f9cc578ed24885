// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
use super::AppError;
use crate::database::{self, Collection};
use crate::dates::format_filter_instant;
use crate::filters::{EntryFilter, Status, entry_filters, status_filters};
use crate::records::EntryRecord;
use crate::state::AppState;
use crate::validation::ReferenceCheck;
use axum::{
    extract::{Json, Path, Query, State},
    http::StatusCode,
};
use chrono::{DateTime, FixedOffset, Utc};
use common::{Entry, EntryListQuery, EntryPayload, StatusCounter};
use sqlx::SqlitePool;
use tracing::{debug, error, info};

/// Handler for listing entries in a status bucket, optionally narrowed
/// by tag, list, priority and a summary search.
pub async fn list_entries(
    State(state): State<AppState>,
    Query(params): Query<EntryListQuery>,
) -> Result<Json<Vec<Entry>>, AppError> {
    let status = Status::from_keyword(params.status.as_deref().unwrap_or("all"));
    let filter = EntryFilter::new(params.tag, params.list, params.priority, params.query);
    debug!("Listing entries with status={} filter={:?}", status, filter);

    let missing = ReferenceCheck::new()
        .optional("tag", Collection::Tags, filter.tag.as_deref())
        .optional("list", Collection::Lists, filter.list.as_deref())
        .optional("priority", Collection::Priorities, filter.priority.as_deref())
        .run(&state.pool)
        .await?;
    if !missing.is_empty() {
        return Err(AppError::missing_references("list entries", missing));
    }

    let predicates = entry_filters(status, &filter, state.now(), &state.utc_offset);
    let entries = database::list_entries(&state.pool, &predicates).await?;

    info!("Successfully retrieved {} entries.", entries.len());
    Ok(Json(entries))
}

async fn count_status(
    pool: &SqlitePool,
    status: Status,
    now: DateTime<Utc>,
    tz: &FixedOffset,
) -> anyhow::Result<i64> {
    database::count_entries(pool, &status_filters(status, now, tz)).await
}

/// Handler counting entries in each status bucket.
pub async fn get_status_counter(
    State(state): State<AppState>,
) -> Result<Json<StatusCounter>, AppError> {
    let now = state.now();
    let (pool, tz) = (&state.pool, &state.utc_offset);

    // Independent queries; the results are merged by key.
    let (all, today, scheduled, overdue, completed) = tokio::try_join!(
        count_status(pool, Status::All, now, tz),
        count_status(pool, Status::Today, now, tz),
        count_status(pool, Status::Scheduled, now, tz),
        count_status(pool, Status::Overdue, now, tz),
        count_status(pool, Status::Completed, now, tz)
    )?;

    let counter = StatusCounter {
        all,
        today,
        scheduled,
        overdue,
        completed,
    };
    info!("Status counter: {:?}", counter);
    Ok(Json(counter))
}

/// Handler for fetching a single entry by ID.
pub async fn get_entry(
    State(state): State<AppState>,
    Path(entry_id): Path<String>,
) -> Result<Json<Entry>, AppError> {
    match database::get_entry(&state.pool, &entry_id).await? {
        Some(entry) => Ok(Json(entry)),
        None => {
            error!("Entry with ID {} not found.", entry_id);
            Err(AppError::not_found("Entry", &entry_id))
        }
    }
}

/// Handler for creating a new entry.
pub async fn create_entry(
    State(state): State<AppState>,
    Json(payload): Json<EntryPayload>,
) -> Result<(StatusCode, Json<Entry>), AppError> {
    debug!("Received request to create entry: {}", payload.summary);

    let record = EntryRecord::from_payload(payload, &state.utc_offset)
        .map_err(|e| AppError::invalid_payload("create entry", e))?;

    let missing = ReferenceCheck::for_entry(&record).run(&state.pool).await?;
    if !missing.is_empty() {
        return Err(AppError::missing_references("create entry", missing));
    }

    let entry = database::create_entry(&state.pool, &record, state.now()).await?;

    info!("Entry created successfully with ID: {}", entry.id);

    // Return a 201 Created status with the new entry as JSON.
    Ok((StatusCode::CREATED, Json(entry)))
}

/// Handler for replacing the editable fields of an entry.
pub async fn update_entry(
    State(state): State<AppState>,
    Path(entry_id): Path<String>,
    Json(payload): Json<EntryPayload>,
) -> Result<Json<Entry>, AppError> {
    debug!("Received request to update entry with ID: {}", entry_id);

    if !database::record_exists(&state.pool, Collection::Entries, &entry_id).await? {
        error!("Entry with ID {} not found for update.", entry_id);
        return Err(AppError::not_found("Entry", &entry_id));
    }

    let record = EntryRecord::from_payload(payload, &state.utc_offset)
        .map_err(|e| AppError::invalid_payload("update entry", e))?;

    let missing = ReferenceCheck::for_entry(&record).run(&state.pool).await?;
    if !missing.is_empty() {
        return Err(AppError::missing_references("update entry", missing));
    }

    // The entry may have been removed since the existence check.
    let entry = database::update_entry(&state.pool, &entry_id, &record, state.now())
        .await?
        .ok_or_else(|| AppError::not_found("Entry", &entry_id))?;

    info!("Entry with ID {} updated successfully.", entry.id);
    Ok(Json(entry))
}

/// Handler for deleting an entry by ID.
pub async fn delete_entry(
    State(state): State<AppState>,
    Path(entry_id): Path<String>,
) -> Result<StatusCode, AppError> {
    debug!("Attempting to delete entry with ID: {}", entry_id);

    if database::delete_record(&state.pool, Collection::Entries, &entry_id).await? {
        info!("Entry with ID {} deleted successfully.", entry_id);
        Ok(StatusCode::NO_CONTENT)
    } else {
        error!("Entry with ID {} not found for deletion.", entry_id);
        Err(AppError::not_found("Entry", &entry_id))
    }
}

/// Completion state after a toggle: an open entry is completed at `now`,
/// a completed one is reopened and loses its completion time.
pub fn toggled_completion(done: bool, now: DateTime<Utc>) -> (bool, String) {
    if done {
        (false, String::new())
    } else {
        (true, format_filter_instant(now))
    }
}

/// Handler flipping the persisted completion state of an entry.
pub async fn toggle_entry(
    State(state): State<AppState>,
    Path(entry_id): Path<String>,
) -> Result<Json<Entry>, AppError> {
    debug!("Received request to toggle entry with ID: {}", entry_id);

    let current = database::get_entry(&state.pool, &entry_id)
        .await?
        .ok_or_else(|| AppError::not_found("Entry", &entry_id))?;

    let now = state.now();
    let (done, completed_at) = toggled_completion(current.done, now);

    let entry = database::set_entry_completion(&state.pool, &entry_id, done, &completed_at, now)
        .await?
        .ok_or_else(|| AppError::not_found("Entry", &entry_id))?;

    info!("Entry with ID {} is now done={}.", entry.id, entry.done);
    Ok(Json(entry))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::MockClock;
    use chrono::{Duration, TimeZone};
    use std::sync::Arc;

    async fn test_state(now: DateTime<Utc>) -> (AppState, MockClock) {
        let pool = database::establish_in_memory_pool().await.unwrap();
        let clock = MockClock::new(now);
        let state = AppState::new(pool, FixedOffset::east_opt(0).unwrap())
            .with_clock(Arc::new(clock.clone()));
        (state, clock)
    }

    // Helper to create a payload for tests
    fn create_test_payload(summary: &str, due_date: Option<&str>) -> Json<EntryPayload> {
        Json(EntryPayload {
            summary: summary.to_string(),
            due_date: due_date.map(str::to_string),
            ..Default::default()
        })
    }

    fn list_query(status: &str) -> Query<EntryListQuery> {
        Query(EntryListQuery {
            status: Some(status.to_string()),
            ..Default::default()
        })
    }

    #[test]
    fn test_toggled_completion() {
        let now = Utc.with_ymd_and_hms(2024, 1, 15, 10, 0, 0).unwrap();
        assert_eq!(
            toggled_completion(false, now),
            (true, "2024-01-15 10:00:00".to_string())
        );
        assert_eq!(toggled_completion(true, now), (false, String::new()));
    }

    #[tokio::test]
    async fn test_create_entry_validation_empty_summary() {
        let (state, _) = test_state(Utc::now()).await;

        let result = create_entry(State(state), create_test_payload("  ", None)).await;

        let err = result.unwrap_err();
        assert_eq!(err.code, StatusCode::BAD_REQUEST);
        assert_eq!(err.message, "Failed to create entry: Summary cannot be empty.");
    }

    #[tokio::test]
    async fn test_create_entry_rejects_unknown_references() {
        let (state, _) = test_state(Utc::now()).await;
        let payload = Json(EntryPayload {
            summary: "Pay rent".to_string(),
            priority: Some("nopriority00000".to_string()),
            ..Default::default()
        });

        let err = create_entry(State(state.clone()), payload).await.unwrap_err();

        assert_eq!(err.code, StatusCode::BAD_REQUEST);
        assert_eq!(err.details[0].field, "priority");
        // Nothing was written.
        let all = database::list_entries(&state.pool, &[]).await.unwrap();
        assert!(all.is_empty());
    }

    #[tokio::test]
    async fn test_pay_rent_moves_from_today_to_overdue() {
        let (state, clock) = test_state(Utc.with_ymd_and_hms(2024, 1, 15, 10, 0, 0).unwrap()).await;

        let (code, Json(created)) = create_entry(
            State(state.clone()),
            create_test_payload("Pay rent", Some("2024-01-15")),
        )
        .await
        .unwrap();
        assert_eq!(code, StatusCode::CREATED);
        assert_eq!(created.due_date, "2024-01-15 23:59:59.999Z");

        let Json(today) = list_entries(State(state.clone()), list_query("today")).await.unwrap();
        assert_eq!(today.len(), 1);

        clock.set(Utc.with_ymd_and_hms(2024, 1, 16, 0, 0, 1).unwrap());

        let Json(today) = list_entries(State(state.clone()), list_query("today")).await.unwrap();
        assert!(today.is_empty());
        let Json(overdue) = list_entries(State(state.clone()), list_query("overdue"))
            .await
            .unwrap();
        assert_eq!(overdue.len(), 1);
        assert_eq!(overdue[0].id, created.id);
    }

    #[tokio::test]
    async fn test_toggle_twice_restores_state() {
        let (state, clock) = test_state(Utc.with_ymd_and_hms(2024, 1, 15, 10, 0, 0).unwrap()).await;
        let (_, Json(created)) =
            create_entry(State(state.clone()), create_test_payload("Water plants", None))
                .await
                .unwrap();

        clock.advance(Duration::minutes(5));
        let Json(done) = toggle_entry(State(state.clone()), Path(created.id.clone()))
            .await
            .unwrap();
        assert!(done.done);
        assert_eq!(done.completed_at, "2024-01-15 10:05:00");

        let Json(reopened) = toggle_entry(State(state.clone()), Path(created.id.clone()))
            .await
            .unwrap();
        assert_eq!(reopened.done, created.done);
        assert_eq!(reopened.completed_at, created.completed_at);
    }

    #[tokio::test]
    async fn test_toggle_missing_entry() {
        let (state, _) = test_state(Utc::now()).await;
        let err = toggle_entry(State(state), Path("missing".to_string()))
            .await
            .unwrap_err();
        assert_eq!(err.code, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_status_counter_partitions_entries() {
        let (state, _) = test_state(Utc.with_ymd_and_hms(2024, 1, 15, 10, 0, 0).unwrap()).await;

        for (summary, due) in [
            ("Undated", None),
            ("Today", Some("2024-01-15")),
            ("Yesterday", Some("2024-01-14")),
            ("Next week", Some("2024-01-22")),
        ] {
            let _ = create_entry(State(state.clone()), create_test_payload(summary, due))
                .await
                .unwrap();
        }
        let Json(open) = list_entries(State(state.clone()), list_query("all")).await.unwrap();
        let finished = open.iter().find(|e| e.summary == "Yesterday").unwrap();
        let _ = toggle_entry(State(state.clone()), Path(finished.id.clone()))
            .await
            .unwrap();

        let Json(counter) = get_status_counter(State(state.clone())).await.unwrap();

        assert_eq!(
            counter,
            StatusCounter {
                all: 3,
                today: 1,
                scheduled: 2,
                overdue: 0,
                completed: 1,
            }
        );
        let total = database::count_entries(&state.pool, &[]).await.unwrap();
        assert_eq!(counter.all + counter.completed, total);
    }

    #[tokio::test]
    async fn test_list_rejects_unknown_tag_filter() {
        let (state, _) = test_state(Utc::now()).await;
        let query = Query(EntryListQuery {
            tag: Some("notag0000000000".to_string()),
            ..Default::default()
        });

        let err = list_entries(State(state), query).await.unwrap_err();
        assert_eq!(err.code, StatusCode::BAD_REQUEST);
        assert!(err.message.starts_with("Failed to list entries"));
    }
}
