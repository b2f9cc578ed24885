// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
use crate::filters::{self, Field, FilterValue, Operator, Predicate};
use crate::records::{EntryRecord, ListRecord, PriorityRecord, TagRecord};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use common::{Entry, List, ListAggregated, Priority, PriorityAggregated, Tag, TagAggregated};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::types::Json;
use sqlx::{QueryBuilder, Sqlite, SqlitePool, migrate::MigrateDatabase};
use tracing::{debug, info};

const SCHEMA: [&str; 7] = [
    r#"
    CREATE TABLE IF NOT EXISTS lists (
        id TEXT PRIMARY KEY NOT NULL,
        name TEXT NOT NULL UNIQUE,
        icon TEXT NOT NULL,
        color TEXT NOT NULL
    );
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS tags (
        id TEXT PRIMARY KEY NOT NULL,
        name TEXT NOT NULL UNIQUE
    );
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS priorities (
        id TEXT PRIMARY KEY NOT NULL,
        name TEXT NOT NULL UNIQUE,
        color TEXT NOT NULL
    );
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS entries (
        id TEXT PRIMARY KEY NOT NULL,
        summary TEXT NOT NULL,
        notes TEXT NOT NULL DEFAULT '',
        due_date TEXT NOT NULL DEFAULT '',
        due_date_has_time BOOLEAN NOT NULL DEFAULT 0,
        list TEXT NULL,
        tags TEXT NOT NULL DEFAULT '[]',
        priority TEXT NULL,
        done BOOLEAN NOT NULL DEFAULT 0,
        completed_at TEXT NOT NULL DEFAULT '',
        created TIMESTAMP NOT NULL,
        updated TIMESTAMP NOT NULL
    );
    "#,
    r#"
    CREATE VIEW IF NOT EXISTS lists_aggregated AS
    SELECT lists.id, lists.name, lists.icon, lists.color, COUNT(entries.id) AS amount
    FROM lists
        LEFT JOIN entries ON entries.list = lists.id
    GROUP BY lists.id;
    "#,
    r#"
    CREATE VIEW IF NOT EXISTS tags_aggregated AS
    WITH entry_tag_map AS (
        SELECT entries.id AS entry_id, json_each.value AS tag_id
        FROM entries, json_each(entries.tags)
    )
    SELECT tags.id, tags.name, COUNT(entry_tag_map.entry_id) AS amount
    FROM tags
        LEFT JOIN entry_tag_map ON entry_tag_map.tag_id = tags.id
    GROUP BY tags.id;
    "#,
    r#"
    CREATE VIEW IF NOT EXISTS priorities_aggregated AS
    SELECT priorities.id, priorities.name, priorities.color, COUNT(entries.id) AS amount
    FROM priorities
        LEFT JOIN entries ON entries.priority = priorities.id
    GROUP BY priorities.id;
    "#,
];

/// Collections a record id can point into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collection {
    Entries,
    Lists,
    Tags,
    Priorities,
}

impl Collection {
    pub fn table(self) -> &'static str {
        match self {
            Collection::Entries => "entries",
            Collection::Lists => "lists",
            Collection::Tags => "tags",
            Collection::Priorities => "priorities",
        }
    }
}

/// Establishes the database connection pool.
/// If the database does not exist, it creates it.
/// It also ensures the tables and aggregated views exist.
pub async fn establish_connection_pool(database_url: &str) -> Result<SqlitePool> {
    if let Some(parent) = database_url
        .strip_prefix("sqlite://")
        .map(std::path::Path::new)
        .and_then(|path| path.parent())
        .filter(|parent| !parent.as_os_str().is_empty())
    {
        std::fs::create_dir_all(parent).context("Failed to create database directory")?;
    }

    if !Sqlite::database_exists(database_url).await.unwrap_or(false) {
        info!("Creating database {}", database_url);
        Sqlite::create_database(database_url)
            .await
            .context("Failed to create database")?;
    } else {
        info!("Database already exists.");
    }

    let pool = SqlitePool::connect(database_url)
        .await
        .context("Failed to connect to database")?;

    init_schema(&pool).await?;

    Ok(pool)
}

/// A private in-memory database holding the full schema.
/// A single long-lived connection keeps every query on the same database.
pub async fn establish_in_memory_pool() -> Result<SqlitePool> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .context("Failed to open in-memory database")?;

    init_schema(&pool).await?;

    Ok(pool)
}

pub async fn init_schema(pool: &SqlitePool) -> Result<()> {
    for statement in SCHEMA {
        sqlx::query(statement)
            .execute(pool)
            .await
            .context("Failed to apply schema")?;
    }

    info!("Todo list tables and views are ready.");

    Ok(())
}

/// 15 lowercase alphanumerics, the id layout every collection uses.
pub fn new_record_id() -> String {
    let mut id = uuid::Uuid::new_v4().simple().to_string();
    id.truncate(15);
    id
}

/// Summary search folds case with Unicode rules, which SQLite's `lower()`
/// does not. Such predicates are applied to the fetched rows instead.
fn is_evaluated_in_memory(predicate: &Predicate) -> bool {
    predicate.field == Field::Summary && predicate.operator == Operator::Contains
}

fn split_predicates(predicates: &[Predicate]) -> (Vec<Predicate>, Vec<Predicate>) {
    predicates
        .iter()
        .cloned()
        .partition(|predicate| !is_evaluated_in_memory(predicate))
}

/// Appends `WHERE` clauses for `predicates`, ANDed, binding every value.
/// Predicates that only the in-memory evaluator handles are skipped.
pub fn push_predicates(builder: &mut QueryBuilder<'_, Sqlite>, predicates: &[Predicate]) {
    builder.push(" WHERE 1 = 1");

    for predicate in predicates.iter().filter(|p| !is_evaluated_in_memory(p)) {
        builder.push(" AND ");
        let comparison = match predicate.operator {
            Operator::Eq => " = ",
            Operator::Ne => " != ",
            Operator::Gte => " >= ",
            Operator::Lte => " <= ",
            Operator::Lt => " < ",
            Operator::Contains => {
                push_contains(builder, predicate.field, &predicate.value);
                continue;
            }
        };
        builder.push(predicate.field.column());
        builder.push(comparison);
        push_value(builder, &predicate.value);
    }
}

fn push_contains(builder: &mut QueryBuilder<'_, Sqlite>, field: Field, value: &FilterValue) {
    match field {
        Field::Tags => {
            builder.push("EXISTS (SELECT 1 FROM json_each(entries.tags) WHERE json_each.value = ");
            push_value(builder, value);
            builder.push(")");
        }
        other => {
            builder.push(format!("instr({}, ", other.column()));
            push_value(builder, value);
            builder.push(") > 0");
        }
    }
}

fn push_value(builder: &mut QueryBuilder<'_, Sqlite>, value: &FilterValue) {
    match value {
        FilterValue::Bool(flag) => builder.push_bind(*flag),
        FilterValue::Text(text) => builder.push_bind(text.clone()),
    };
}

/// Entries matching every predicate, newest first.
pub async fn list_entries(pool: &SqlitePool, predicates: &[Predicate]) -> Result<Vec<Entry>> {
    let (in_sql, in_memory) = split_predicates(predicates);

    let mut builder = QueryBuilder::<Sqlite>::new("SELECT * FROM entries");
    push_predicates(&mut builder, &in_sql);
    builder.push(" ORDER BY created DESC, rowid DESC");

    debug!("Listing entries: {}", builder.sql());

    let mut entries = builder
        .build_query_as::<Entry>()
        .fetch_all(pool)
        .await
        .context("Failed to retrieve entries from DB")?;

    if !in_memory.is_empty() {
        entries.retain(|entry| filters::matches(entry, &in_memory));
    }

    Ok(entries)
}

pub async fn count_entries(pool: &SqlitePool, predicates: &[Predicate]) -> Result<i64> {
    if predicates.iter().any(is_evaluated_in_memory) {
        let entries = list_entries(pool, predicates).await?;
        return Ok(entries.len() as i64);
    }

    let mut builder = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM entries");
    push_predicates(&mut builder, predicates);

    let count = builder
        .build_query_scalar::<i64>()
        .fetch_one(pool)
        .await
        .context("Failed to count entries in DB")?;

    Ok(count)
}

pub async fn get_entry(pool: &SqlitePool, entry_id: &str) -> Result<Option<Entry>> {
    sqlx::query_as::<_, Entry>("SELECT * FROM entries WHERE id = ?")
        .bind(entry_id)
        .fetch_optional(pool)
        .await
        .with_context(|| format!("Failed to retrieve entry with ID: {entry_id}"))
}

/// Inserts a new, open entry.
pub async fn create_entry(
    pool: &SqlitePool,
    record: &EntryRecord,
    now: DateTime<Utc>,
) -> Result<Entry> {
    let entry = Entry {
        id: new_record_id(),
        summary: record.summary.clone(),
        notes: record.notes.clone(),
        due_date: record.due_date.clone(),
        due_date_has_time: record.due_date_has_time,
        list: record.list.clone(),
        tags: record.tags.clone(),
        priority: record.priority.clone(),
        done: false,
        completed_at: String::new(),
        created: now,
        updated: now,
    };

    debug!(
        "Insert values: id={}, summary={}, due_date={:?}, list={:?}, tags={:?}, priority={:?}",
        entry.id, entry.summary, entry.due_date, entry.list, entry.tags, entry.priority
    );

    sqlx::query(
        "INSERT INTO entries (id, summary, notes, due_date, due_date_has_time, list, tags, priority, done, completed_at, created, updated) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&entry.id)
    .bind(&entry.summary)
    .bind(&entry.notes)
    .bind(&entry.due_date)
    .bind(entry.due_date_has_time)
    .bind(&entry.list)
    .bind(Json(&entry.tags))
    .bind(&entry.priority)
    .bind(entry.done)
    .bind(&entry.completed_at)
    .bind(entry.created)
    .bind(entry.updated)
    .execute(pool)
    .await
    .context("Failed to insert entry into DB")?;

    Ok(entry)
}

/// Replaces the editable fields of an entry. Completion state is untouched.
/// Returns `None` when no entry has this ID.
pub async fn update_entry(
    pool: &SqlitePool,
    entry_id: &str,
    record: &EntryRecord,
    now: DateTime<Utc>,
) -> Result<Option<Entry>> {
    let result = sqlx::query(
        "UPDATE entries SET summary = ?, notes = ?, due_date = ?, due_date_has_time = ?, list = ?, tags = ?, priority = ?, updated = ? WHERE id = ?",
    )
    .bind(&record.summary)
    .bind(&record.notes)
    .bind(&record.due_date)
    .bind(record.due_date_has_time)
    .bind(&record.list)
    .bind(Json(&record.tags))
    .bind(&record.priority)
    .bind(now)
    .bind(entry_id)
    .execute(pool)
    .await
    .with_context(|| format!("Failed to update entry with ID: {entry_id}"))?;

    if result.rows_affected() == 0 {
        return Ok(None);
    }

    get_entry(pool, entry_id).await
}

/// Writes `done` and `completed_at` together.
pub async fn set_entry_completion(
    pool: &SqlitePool,
    entry_id: &str,
    done: bool,
    completed_at: &str,
    now: DateTime<Utc>,
) -> Result<Option<Entry>> {
    let result =
        sqlx::query("UPDATE entries SET done = ?, completed_at = ?, updated = ? WHERE id = ?")
            .bind(done)
            .bind(completed_at)
            .bind(now)
            .bind(entry_id)
            .execute(pool)
            .await
            .with_context(|| format!("Failed to set completion of entry with ID: {entry_id}"))?;

    if result.rows_affected() == 0 {
        return Ok(None);
    }

    get_entry(pool, entry_id).await
}

/// Entries whose `due_date` lies in `[start, end]`, both in the stored layout.
pub async fn entries_due_between(
    pool: &SqlitePool,
    start: &str,
    end: &str,
) -> Result<Vec<Entry>> {
    sqlx::query_as::<_, Entry>(
        "SELECT * FROM entries WHERE due_date != '' AND due_date >= ? AND due_date <= ? ORDER BY due_date ASC",
    )
    .bind(start)
    .bind(end)
    .fetch_all(pool)
    .await
    .context("Failed to retrieve entries in date window from DB")
}

pub async fn record_exists(pool: &SqlitePool, collection: Collection, id: &str) -> Result<bool> {
    let sql = format!("SELECT EXISTS(SELECT 1 FROM {} WHERE id = ?)", collection.table());
    let exists = sqlx::query_scalar::<_, i64>(&sql)
        .bind(id)
        .fetch_one(pool)
        .await
        .with_context(|| format!("Failed to look up {} ID: {id}", collection.table()))?;

    Ok(exists > 0)
}

/// Hard delete. Nothing cascades: entries keep pointing at removed lookups.
/// Returns true if a record was removed.
pub async fn delete_record(pool: &SqlitePool, collection: Collection, id: &str) -> Result<bool> {
    debug!("Attempting to delete {} record with ID: {}", collection.table(), id);

    let sql = format!("DELETE FROM {} WHERE id = ?", collection.table());
    let result = sqlx::query(&sql)
        .bind(id)
        .execute(pool)
        .await
        .with_context(|| format!("Failed to delete {} record with ID: {id}", collection.table()))?;

    let rows_affected = result.rows_affected();
    info!(
        "Deleted {} rows from {} for ID: {}",
        rows_affected,
        collection.table(),
        id
    );

    Ok(rows_affected > 0)
}

pub async fn list_lists(pool: &SqlitePool) -> Result<Vec<ListAggregated>> {
    sqlx::query_as::<_, ListAggregated>("SELECT * FROM lists_aggregated ORDER BY name ASC")
        .fetch_all(pool)
        .await
        .context("Failed to retrieve lists from DB")
}

pub async fn create_list(pool: &SqlitePool, record: &ListRecord) -> Result<List> {
    let list = List {
        id: new_record_id(),
        name: record.name.clone(),
        icon: record.icon.clone(),
        color: record.color.clone(),
    };

    sqlx::query("INSERT INTO lists (id, name, icon, color) VALUES (?, ?, ?, ?)")
        .bind(&list.id)
        .bind(&list.name)
        .bind(&list.icon)
        .bind(&list.color)
        .execute(pool)
        .await
        .context("Failed to insert list into DB")?;

    Ok(list)
}

pub async fn update_list(
    pool: &SqlitePool,
    list_id: &str,
    record: &ListRecord,
) -> Result<Option<List>> {
    let result = sqlx::query("UPDATE lists SET name = ?, icon = ?, color = ? WHERE id = ?")
        .bind(&record.name)
        .bind(&record.icon)
        .bind(&record.color)
        .bind(list_id)
        .execute(pool)
        .await
        .with_context(|| format!("Failed to update list with ID: {list_id}"))?;

    Ok((result.rows_affected() > 0).then(|| List {
        id: list_id.to_string(),
        name: record.name.clone(),
        icon: record.icon.clone(),
        color: record.color.clone(),
    }))
}

pub async fn list_tags(pool: &SqlitePool) -> Result<Vec<TagAggregated>> {
    sqlx::query_as::<_, TagAggregated>("SELECT * FROM tags_aggregated ORDER BY name ASC")
        .fetch_all(pool)
        .await
        .context("Failed to retrieve tags from DB")
}

pub async fn create_tag(pool: &SqlitePool, record: &TagRecord) -> Result<Tag> {
    let tag = Tag {
        id: new_record_id(),
        name: record.name.clone(),
    };

    sqlx::query("INSERT INTO tags (id, name) VALUES (?, ?)")
        .bind(&tag.id)
        .bind(&tag.name)
        .execute(pool)
        .await
        .context("Failed to insert tag into DB")?;

    Ok(tag)
}

pub async fn update_tag(
    pool: &SqlitePool,
    tag_id: &str,
    record: &TagRecord,
) -> Result<Option<Tag>> {
    let result = sqlx::query("UPDATE tags SET name = ? WHERE id = ?")
        .bind(&record.name)
        .bind(tag_id)
        .execute(pool)
        .await
        .with_context(|| format!("Failed to update tag with ID: {tag_id}"))?;

    Ok((result.rows_affected() > 0).then(|| Tag {
        id: tag_id.to_string(),
        name: record.name.clone(),
    }))
}

pub async fn list_priorities(pool: &SqlitePool) -> Result<Vec<PriorityAggregated>> {
    sqlx::query_as::<_, PriorityAggregated>("SELECT * FROM priorities_aggregated ORDER BY name ASC")
        .fetch_all(pool)
        .await
        .context("Failed to retrieve priorities from DB")
}

pub async fn create_priority(pool: &SqlitePool, record: &PriorityRecord) -> Result<Priority> {
    let priority = Priority {
        id: new_record_id(),
        name: record.name.clone(),
        color: record.color.clone(),
    };

    sqlx::query("INSERT INTO priorities (id, name, color) VALUES (?, ?, ?)")
        .bind(&priority.id)
        .bind(&priority.name)
        .bind(&priority.color)
        .execute(pool)
        .await
        .context("Failed to insert priority into DB")?;

    Ok(priority)
}

pub async fn update_priority(
    pool: &SqlitePool,
    priority_id: &str,
    record: &PriorityRecord,
) -> Result<Option<Priority>> {
    let result = sqlx::query("UPDATE priorities SET name = ?, color = ? WHERE id = ?")
        .bind(&record.name)
        .bind(&record.color)
        .bind(priority_id)
        .execute(pool)
        .await
        .with_context(|| format!("Failed to update priority with ID: {priority_id}"))?;

    Ok((result.rows_affected() > 0).then(|| Priority {
        id: priority_id.to_string(),
        name: record.name.clone(),
        color: record.color.clone(),
    }))
}
