// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
//! Existence checks run before any write that carries a relation.
use crate::database::{self, Collection};
use crate::records::EntryRecord;
use anyhow::Result;
use serde::Serialize;
use sqlx::SqlitePool;
use tracing::debug;

/// A relation field pointing at a record that does not exist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MissingReference {
    pub field: &'static str,
    pub collection: &'static str,
    pub id: String,
}

/// The references one request wants to write, checked in a single pass.
#[derive(Debug, Default)]
pub struct ReferenceCheck {
    expected: Vec<(&'static str, Collection, String)>,
}

impl ReferenceCheck {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn optional(
        mut self,
        field: &'static str,
        collection: Collection,
        id: Option<&str>,
    ) -> Self {
        if let Some(id) = id {
            self.expected.push((field, collection, id.to_string()));
        }
        self
    }

    pub fn all(mut self, field: &'static str, collection: Collection, ids: &[String]) -> Self {
        self.expected
            .extend(ids.iter().map(|id| (field, collection, id.clone())));
        self
    }

    /// Relations of an entry: its list, priority and every tag.
    pub fn for_entry(record: &EntryRecord) -> Self {
        Self::new()
            .optional("list", Collection::Lists, record.list.as_deref())
            .optional("priority", Collection::Priorities, record.priority.as_deref())
            .all("tags", Collection::Tags, &record.tags)
    }

    /// Every violated reference, in the order they were declared.
    /// An empty result means the write may proceed.
    pub async fn run(&self, pool: &SqlitePool) -> Result<Vec<MissingReference>> {
        let mut missing = Vec::new();

        for (field, collection, id) in &self.expected {
            if !database::record_exists(pool, *collection, id).await? {
                debug!("Reference {}={} not found in {}", field, id, collection.table());
                missing.push(MissingReference {
                    field: *field,
                    collection: collection.table(),
                    id: id.clone(),
                });
            }
        }

        Ok(missing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::TagRecord;

    #[tokio::test]
    async fn test_reports_every_missing_reference() {
        let pool = database::establish_in_memory_pool().await.unwrap();
        let tag = database::create_tag(&pool, &TagRecord { name: "home".to_string() })
            .await
            .unwrap();

        let record = EntryRecord {
            summary: "Pay rent".to_string(),
            notes: String::new(),
            due_date: String::new(),
            due_date_has_time: false,
            list: Some("nolist000000000".to_string()),
            tags: vec![tag.id.clone(), "notag0000000000".to_string()],
            priority: None,
        };

        let missing = ReferenceCheck::for_entry(&record).run(&pool).await.unwrap();

        assert_eq!(
            missing,
            vec![
                MissingReference {
                    field: "list",
                    collection: "lists",
                    id: "nolist000000000".to_string(),
                },
                MissingReference {
                    field: "tags",
                    collection: "tags",
                    id: "notag0000000000".to_string(),
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_nothing_to_check_passes() {
        let pool = database::establish_in_memory_pool().await.unwrap();
        let missing = ReferenceCheck::new()
            .optional("list", Collection::Lists, None)
            .run(&pool)
            .await
            .unwrap();
        assert!(missing.is_empty());
    }
}
