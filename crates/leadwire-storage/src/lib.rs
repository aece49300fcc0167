// SPDX-FileCopyrightText: 2026 Leadwire Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite persistence layer for the Leadwire chat front-end.
//!
//! Provides WAL-mode SQLite storage with embedded migrations and a
//! single-writer connection via `tokio-rusqlite`, holding chat language
//! preferences and the append-only lead log. Also hosts the optional
//! webhook lead sink.

pub mod adapter;
pub mod database;
pub mod migrations;
pub mod queries;
pub mod sink;

pub use adapter::SqliteStorage;
pub use database::Database;
pub use sink::WebhookSink;
