// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
pub mod clock;
pub mod colors;
pub mod config;
pub mod database;
pub mod dates;
pub mod events;
pub mod filters;
pub mod handlers;
pub mod records;
pub mod routes;
pub mod state;
pub mod validation;
