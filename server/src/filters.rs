// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
//! Status buckets and the predicates that define them.
//!
//! Building a filter is a pure function of the status, the reference
//! instant and the zone that decides calendar days. The predicates are
//! executed by `database::push_predicates`.
use crate::dates::{self, format_filter_instant};
use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::Serialize;
use std::fmt;

/// Named filter preset over entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    All,
    Today,
    Scheduled,
    Overdue,
    Completed,
}

impl Status {
    pub const ALL: [Status; 5] = [
        Status::All,
        Status::Today,
        Status::Scheduled,
        Status::Overdue,
        Status::Completed,
    ];

    /// Unknown keywords mean `All`; this never fails.
    pub fn from_keyword(keyword: &str) -> Self {
        match keyword.trim() {
            "today" => Status::Today,
            "scheduled" => Status::Scheduled,
            "overdue" => Status::Overdue,
            "completed" => Status::Completed,
            _ => Status::All,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Status::All => "all",
            Status::Today => "today",
            Status::Scheduled => "scheduled",
            Status::Overdue => "overdue",
            Status::Completed => "completed",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Entry columns a predicate may target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Done,
    DueDate,
    Tags,
    List,
    Priority,
    Summary,
}

impl Field {
    pub fn column(self) -> &'static str {
        match self {
            Field::Done => "done",
            Field::DueDate => "due_date",
            Field::Tags => "tags",
            Field::List => "list",
            Field::Priority => "priority",
            Field::Summary => "summary",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Operator {
    #[serde(rename = "=")]
    Eq,
    #[serde(rename = "!=")]
    Ne,
    #[serde(rename = ">=")]
    Gte,
    #[serde(rename = "<=")]
    Lte,
    #[serde(rename = "<")]
    Lt,
    /// Element match on `tags`, case-insensitive substring on `summary`.
    #[serde(rename = "~")]
    Contains,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FilterValue {
    Bool(bool),
    Text(String),
}

/// One `(field, operator, value)` triple. A filter is a list of them, ANDed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Predicate {
    pub field: Field,
    pub operator: Operator,
    pub value: FilterValue,
}

impl Predicate {
    pub fn new(field: Field, operator: Operator, value: FilterValue) -> Self {
        Self {
            field,
            operator,
            value,
        }
    }

    fn done(done: bool) -> Self {
        Self::new(Field::Done, Operator::Eq, FilterValue::Bool(done))
    }

    fn due_date(operator: Operator, value: String) -> Self {
        Self::new(Field::DueDate, operator, FilterValue::Text(value))
    }
}

/// Predicates defining membership of `status` at `now`.
/// Day boundaries are taken in `tz`; every bound is rendered in UTC.
pub fn status_filters<Tz: TimeZone>(
    status: Status,
    now: DateTime<Utc>,
    tz: &Tz,
) -> Vec<Predicate> {
    match status {
        Status::All => vec![Predicate::done(false)],
        Status::Today => {
            let start = dates::start_of_day(now, tz);
            let end = dates::end_of_day(now, tz) + Duration::seconds(1);
            vec![
                Predicate::done(false),
                Predicate::due_date(Operator::Gte, format_filter_instant(start)),
                Predicate::due_date(Operator::Lte, format_filter_instant(end)),
            ]
        }
        Status::Scheduled => vec![
            Predicate::done(false),
            Predicate::due_date(Operator::Ne, String::new()),
            Predicate::due_date(Operator::Gte, format_filter_instant(now)),
        ],
        Status::Overdue => vec![
            Predicate::done(false),
            Predicate::due_date(Operator::Ne, String::new()),
            Predicate::due_date(Operator::Lt, format_filter_instant(now)),
        ],
        Status::Completed => vec![Predicate::done(true)],
    }
}

/// Optional narrowing applied on top of a status bucket.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryFilter {
    pub tag: Option<String>,
    pub list: Option<String>,
    pub priority: Option<String>,
    pub query: Option<String>,
}

impl EntryFilter {
    /// Blank values are treated as absent.
    pub fn new(
        tag: Option<String>,
        list: Option<String>,
        priority: Option<String>,
        query: Option<String>,
    ) -> Self {
        fn present(value: Option<String>) -> Option<String> {
            value
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        }

        Self {
            tag: present(tag),
            list: present(list),
            priority: present(priority),
            query: present(query),
        }
    }
}

/// Status predicates followed by the optional ones, in a stable order.
pub fn entry_filters<Tz: TimeZone>(
    status: Status,
    filter: &EntryFilter,
    now: DateTime<Utc>,
    tz: &Tz,
) -> Vec<Predicate> {
    let mut predicates = status_filters(status, now, tz);

    if let Some(tag) = &filter.tag {
        predicates.push(Predicate::new(
            Field::Tags,
            Operator::Contains,
            FilterValue::Text(tag.clone()),
        ));
    }
    if let Some(list) = &filter.list {
        predicates.push(Predicate::new(
            Field::List,
            Operator::Eq,
            FilterValue::Text(list.clone()),
        ));
    }
    if let Some(priority) = &filter.priority {
        predicates.push(Predicate::new(
            Field::Priority,
            Operator::Eq,
            FilterValue::Text(priority.clone()),
        ));
    }
    if let Some(query) = &filter.query {
        predicates.push(Predicate::new(
            Field::Summary,
            Operator::Contains,
            FilterValue::Text(query.clone()),
        ));
    }

    predicates
}

/// Evaluates predicates against an in-memory entry, with the same
/// semantics the store applies. Summary search is only ever run here.
pub fn matches(entry: &common::Entry, predicates: &[Predicate]) -> bool {
    predicates.iter().all(|predicate| matches_one(entry, predicate))
}

fn text_field(entry: &common::Entry, field: Field) -> &str {
    match field {
        Field::DueDate => &entry.due_date,
        Field::Summary => &entry.summary,
        Field::List => entry.list.as_deref().unwrap_or(""),
        Field::Priority => entry.priority.as_deref().unwrap_or(""),
        Field::Done | Field::Tags => "",
    }
}

fn matches_one(entry: &common::Entry, predicate: &Predicate) -> bool {
    use std::cmp::Ordering;

    match (predicate.field, predicate.operator, &predicate.value) {
        (Field::Done, Operator::Eq, FilterValue::Bool(done)) => entry.done == *done,
        (Field::Done, Operator::Ne, FilterValue::Bool(done)) => entry.done != *done,
        (Field::Tags, Operator::Contains, FilterValue::Text(tag)) => entry.tags.contains(tag),
        (Field::Summary, Operator::Contains, FilterValue::Text(query)) => entry
            .summary
            .to_lowercase()
            .contains(&query.to_lowercase()),
        (field, operator, FilterValue::Text(value)) => {
            // NULL relations never compare equal to anything in the store.
            let is_null_relation = matches!(field, Field::List | Field::Priority)
                && text_field(entry, field).is_empty();
            if is_null_relation {
                return false;
            }
            let ordering = text_field(entry, field).cmp(value.as_str());
            match operator {
                Operator::Eq => ordering == Ordering::Equal,
                Operator::Ne => ordering != Ordering::Equal,
                Operator::Gte => ordering != Ordering::Less,
                Operator::Lte => ordering != Ordering::Greater,
                Operator::Lt => ordering == Ordering::Less,
                Operator::Contains => text_field(entry, field).contains(value.as_str()),
            }
        }
        _ => false,
    }
}
