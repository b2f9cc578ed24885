// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[allow(clippy::doc_overindented_list_items)]
/// Represents a todo entry within the system.
///
/// Derivation attributes (derive):
/// - `Serialize`, `Deserialize`: Allows conversion to/from JSON.
/// - `sqlx::FromRow`: Allows `sqlx` to create an `Entry` instance directly
///    from a database result row. `tags` is stored as a JSON array.
///
/// `due_date` and `completed_at` are kept as strings: an empty string means
/// "unset", and the stored layout is what the status filters compare against.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct Entry {
    pub id: String,

    pub summary: String,

    pub notes: String,

    // `YYYY-MM-DD HH:MM:SS.mmmZ` in UTC, or "" when the entry has no due date.
    pub due_date: String,

    pub due_date_has_time: bool,

    pub list: Option<String>,

    #[sqlx(json)]
    pub tags: Vec<String>,

    pub priority: Option<String>,

    pub done: bool,

    // `YYYY-MM-DD HH:MM:SS` in UTC, or "" while the entry is open.
    pub completed_at: String,

    pub created: DateTime<Utc>,

    pub updated: DateTime<Utc>,
}

/// Body accepted by entry creation and update.
/// `done` and `completed_at` are deliberately absent: completion only
/// changes through the toggle operation, and unknown fields are ignored.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct EntryPayload {
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub notes: Option<String>,
    // Either a plain date (`2024-01-15`) or a full timestamp.
    #[serde(default)]
    pub due_date: Option<String>,
    #[serde(default)]
    pub due_date_has_time: bool,
    #[serde(default)]
    pub list: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub priority: Option<String>,
}

/// Query parameters accepted when listing entries.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct EntryListQuery {
    // One of all/today/scheduled/overdue/completed. Anything else means "all".
    pub status: Option<String>,
    pub list: Option<String>,
    pub tag: Option<String>,
    pub priority: Option<String>,
    // Case-insensitive search on the summary.
    pub query: Option<String>,
}

/// Number of entries in each status bucket.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusCounter {
    pub all: i64,
    pub today: i64,
    pub scheduled: i64,
    pub overdue: i64,
    pub completed: i64,
}

/// A named grouping bucket for entries.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct List {
    pub id: String,
    pub name: String,
    pub icon: String,
    pub color: String,
}

/// A list together with the number of entries filed under it.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct ListAggregated {
    pub id: String,
    pub name: String,
    pub icon: String,
    pub color: String,
    pub amount: i64,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct ListPayload {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub icon: String,
    // Picked from the default palette when omitted.
    #[serde(default)]
    pub color: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct Tag {
    pub id: String,
    pub name: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct TagAggregated {
    pub id: String,
    pub name: String,
    pub amount: i64,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct TagPayload {
    #[serde(default)]
    pub name: String,
}

/// A named, colored urgency level.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct Priority {
    pub id: String,
    pub name: String,
    pub color: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct PriorityAggregated {
    pub id: String,
    pub name: String,
    pub color: String,
    pub amount: i64,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct PriorityPayload {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub color: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

/// The generic event shape read by the calendar.
/// Todo entries always project to single, one-millisecond events.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct CalendarEvent {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub title: String,
    pub start: String,
    pub end: String,
    pub category: String,
    pub calendar: String,
    pub description: String,
    pub location: String,
    pub location_coords: Coordinates,
    pub reference_link: String,
    pub is_strikethrough: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_payload_ignores_completion_fields() {
        let payload: EntryPayload = serde_json::from_str(
            r#"{"summary":"Pay rent","done":true,"completed_at":"2024-01-01 00:00:00"}"#,
        )
        .unwrap();

        assert_eq!(payload.summary, "Pay rent");
        assert!(!payload.due_date_has_time);
        assert!(payload.tags.is_empty());
        assert_eq!(payload.due_date, None);
    }

    #[test]
    fn calendar_event_serializes_kind_as_type() {
        let event = CalendarEvent {
            id: "abc".to_string(),
            kind: "single".to_string(),
            title: "Pay rent".to_string(),
            start: "2024-01-15 23:59:59.999Z".to_string(),
            end: "2024-01-16T00:00:00.000Z".to_string(),
            category: "_todo".to_string(),
            calendar: String::new(),
            description: String::new(),
            location: String::new(),
            location_coords: Coordinates::default(),
            reference_link: "/todo-list?entry=abc".to_string(),
            is_strikethrough: false,
        };

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "single");
        assert_eq!(json["location_coords"]["lat"], 0.0);
        assert!(json.get("kind").is_none());
    }
}
