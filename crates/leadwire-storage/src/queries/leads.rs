// SPDX-FileCopyrightText: 2026 Leadwire Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Append-only lead log operations.

use chrono::{DateTime, Utc};
use leadwire_core::{ChatId, LeadRecord, LeadwireError};
use rusqlite::params;

use crate::database::Database;

/// Append a lead. Returns the auto-generated row id.
pub async fn insert_lead(db: &Database, lead: &LeadRecord) -> Result<i64, LeadwireError> {
    let lead = lead.clone();
    db.connection()
        .call(move |conn| -> Result<i64, rusqlite::Error> {
            conn.execute(
                "INSERT INTO leads (chat_id, sender_phone, name, company, phone, task, status, recorded_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    lead.chat_id.as_str(),
                    lead.sender_phone,
                    lead.name,
                    lead.company,
                    lead.phone,
                    lead.task,
                    lead.status.to_string(),
                    lead.recorded_at.to_rfc3339(),
                ],
            )?;
            Ok(conn.last_insert_rowid())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Up to `limit` leads, newest first.
pub async fn recent_leads(db: &Database, limit: usize) -> Result<Vec<LeadRecord>, LeadwireError> {
    let limit = i64::try_from(limit).unwrap_or(i64::MAX);
    db.connection()
        .call(move |conn| -> Result<Vec<LeadRecord>, rusqlite::Error> {
            let mut stmt = conn.prepare(
                "SELECT chat_id, sender_phone, name, company, phone, task, status, recorded_at
                 FROM leads ORDER BY recorded_at DESC, id DESC LIMIT ?1",
            )?;
            let rows = stmt.query_map(params![limit], row_to_lead)?;
            rows.collect()
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Total number of stored leads.
pub async fn count_leads(db: &Database) -> Result<u64, LeadwireError> {
    let count = db
        .connection()
        .call(|conn| -> Result<i64, rusqlite::Error> {
            conn.query_row("SELECT COUNT(*) FROM leads", [], |row| row.get(0))
        })
        .await
        .map_err(crate::database::map_tr_err)?;
    Ok(u64::try_from(count).unwrap_or_default())
}

fn row_to_lead(row: &rusqlite::Row<'_>) -> Result<LeadRecord, rusqlite::Error> {
    let status: String = row.get(6)?;
    let recorded_at: String = row.get(7)?;
    Ok(LeadRecord {
        chat_id: ChatId(row.get(0)?),
        sender_phone: row.get(1)?,
        name: row.get(2)?,
        company: row.get(3)?,
        phone: row.get(4)?,
        task: row.get(5)?,
        status: status.parse().map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(6, rusqlite::types::Type::Text, Box::new(e))
        })?,
        recorded_at: DateTime::parse_from_rfc3339(&recorded_at)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(
                    7,
                    rusqlite::types::Type::Text,
                    Box::new(e),
                )
            })?,
    })
}
