// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
use crate::handlers::{entries, events, lists, priorities, tags};
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, patch, post},
};
use tower_http::trace::TraceLayer;

/// Creates and configures the application router.
pub fn create_router(state: AppState) -> Router {
    let api = Router::new()
        .route(
            "/entries",
            get(entries::list_entries).post(entries::create_entry),
        )
        // Static segment, matched before `/entries/{id}`.
        .route("/entries/status-counter", get(entries::get_status_counter))
        .route(
            "/entries/{id}",
            get(entries::get_entry)
                .patch(entries::update_entry)
                .delete(entries::delete_entry),
        )
        .route("/entries/{id}/toggle", post(entries::toggle_entry))
        .route("/lists", get(lists::list_lists).post(lists::create_list))
        .route(
            "/lists/{id}",
            patch(lists::update_list).delete(lists::delete_list),
        )
        .route("/tags", get(tags::list_tags).post(tags::create_tag))
        .route("/tags/{id}", patch(tags::update_tag).delete(tags::delete_tag))
        .route(
            "/priorities",
            get(priorities::list_priorities).post(priorities::create_priority),
        )
        .route(
            "/priorities/{id}",
            patch(priorities::update_priority).delete(priorities::delete_priority),
        )
        .route("/events", get(events::list_events));

    Router::new()
        .nest("/api/todo-list", api)
        // Adds the shared state to the application
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
