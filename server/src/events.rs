// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
//! Read-only projection of dated entries into calendar events.
use crate::database;
use crate::dates::{format_iso_millis, format_store_instant, parse_store_instant};
use chrono::{DateTime, Duration, Utc};
use common::{CalendarEvent, Coordinates, Entry};
use sqlx::SqlitePool;
use tracing::{info, warn};

/// Events for entries due within `[start, end]`.
/// Store failures yield no events: the calendar renders without them.
pub async fn events_between(
    pool: &SqlitePool,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Vec<CalendarEvent> {
    let entries = match database::entries_due_between(
        pool,
        &format_store_instant(start),
        &format_store_instant(end),
    )
    .await
    {
        Ok(entries) => entries,
        Err(e) => {
            warn!("Calendar projection failed, returning no events: {:?}", e);
            return Vec::new();
        }
    };

    info!("Projected {} entries into calendar events.", entries.len());
    entries.iter().map(to_calendar_event).collect()
}

pub fn to_calendar_event(entry: &Entry) -> CalendarEvent {
    let end = parse_store_instant(&entry.due_date)
        .map(|due| format_iso_millis(due + Duration::milliseconds(1)))
        .unwrap_or_else(|| entry.due_date.clone());

    CalendarEvent {
        id: entry.id.clone(),
        kind: "single".to_string(),
        title: entry.summary.clone(),
        start: entry.due_date.clone(),
        end,
        category: "_todo".to_string(),
        calendar: String::new(),
        description: entry.notes.clone(),
        location: String::new(),
        location_coords: Coordinates::default(),
        reference_link: format!("/todo-list?entry={}", entry.id),
        is_strikethrough: entry.done,
    }
}
