// SPDX-FileCopyrightText: 2026 Leadwire Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Embedded database migrations using refinery.
//!
//! SQL files under `migrations/` are compiled in via `embed_migrations!`
//! and applied every time a [`Database`](crate::Database) is opened.

use leadwire_core::LeadwireError;

mod embedded {
    use refinery::embed_migrations;
    embed_migrations!("migrations");
}

/// Run all pending migrations against the given connection.
pub fn run_migrations(conn: &mut rusqlite::Connection) -> Result<(), LeadwireError> {
    let report = embedded::migrations::runner()
        .run(conn)
        .map_err(|e| LeadwireError::Storage {
            source: Box::new(e),
        })?;
    for migration in report.applied_migrations() {
        tracing::debug!(name = migration.name(), version = migration.version(), "migration applied");
    }
    Ok(())
}
