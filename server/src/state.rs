// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
use crate::clock::{Clock, SystemClock};
use chrono::{DateTime, FixedOffset, Utc};
use sqlx::SqlitePool;
use std::sync::Arc;

/// Shared by every handler: the DB pool, the clock and the day-boundary zone.
#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub clock: Arc<dyn Clock>,
    pub utc_offset: FixedOffset,
}

impl AppState {
    pub fn new(pool: SqlitePool, utc_offset: FixedOffset) -> Self {
        Self {
            pool,
            clock: Arc::new(SystemClock),
            utc_offset,
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }
}
