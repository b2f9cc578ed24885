// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
//! Write-side shapes built from request payloads.
//!
//! Create and update both go through these constructors, so a record that
//! reaches the database has already been trimmed, checked and normalized.
use crate::colors;
use crate::dates;
use chrono::TimeZone;
use common::{EntryPayload, ListPayload, PriorityPayload, TagPayload};

/// A payload field that is missing or malformed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct PayloadError(pub String);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryRecord {
    pub summary: String,
    pub notes: String,
    pub due_date: String,
    pub due_date_has_time: bool,
    pub list: Option<String>,
    pub tags: Vec<String>,
    pub priority: Option<String>,
}

fn required(value: &str, field: &str) -> Result<String, PayloadError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(PayloadError(format!("{field} cannot be empty.")));
    }
    Ok(trimmed.to_string())
}

fn reference(value: Option<String>) -> Option<String> {
    value
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty())
}

impl EntryRecord {
    /// Shared by create and update.
    pub fn from_payload<Tz: TimeZone>(
        payload: EntryPayload,
        tz: &Tz,
    ) -> Result<Self, PayloadError> {
        let summary = required(&payload.summary, "Summary")?;

        let due_date = dates::normalize_due_date(
            payload.due_date.as_deref(),
            payload.due_date_has_time,
            tz,
        )
        .map_err(|e| PayloadError(format!("Invalid due date: {e}.")))?;

        let mut tags: Vec<String> = Vec::with_capacity(payload.tags.len());
        for tag in payload.tags {
            let tag = tag.trim().to_string();
            if !tag.is_empty() && !tags.contains(&tag) {
                tags.push(tag);
            }
        }

        Ok(Self {
            summary,
            notes: payload.notes.unwrap_or_default(),
            due_date,
            due_date_has_time: payload.due_date_has_time,
            list: reference(payload.list),
            tags,
            priority: reference(payload.priority),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListRecord {
    pub name: String,
    pub icon: String,
    pub color: String,
}

impl ListRecord {
    pub fn from_payload(payload: ListPayload) -> Result<Self, PayloadError> {
        Ok(Self {
            name: required(&payload.name, "Name")?,
            icon: required(&payload.icon, "Icon")?,
            color: colors::color_or_default(payload.color.as_deref()),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagRecord {
    pub name: String,
}

impl TagRecord {
    pub fn from_payload(payload: TagPayload) -> Result<Self, PayloadError> {
        Ok(Self {
            name: required(&payload.name, "Name")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriorityRecord {
    pub name: String,
    pub color: String,
}

impl PriorityRecord {
    pub fn from_payload(payload: PriorityPayload) -> Result<Self, PayloadError> {
        Ok(Self {
            name: required(&payload.name, "Name")?,
            color: colors::color_or_default(payload.color.as_deref()),
        })
    }
}
