// SPDX-FileCopyrightText: 2026 Leadwire Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Chat language preference operations.

use std::str::FromStr;

use leadwire_core::{ChatId, Language, LeadwireError};
use rusqlite::params;
use tracing::warn;

use crate::database::Database;

/// Insert or replace the language of a chat.
pub async fn upsert_language(
    db: &Database,
    chat: &ChatId,
    language: Language,
) -> Result<(), LeadwireError> {
    let chat_id = chat.as_str().to_string();
    let code = language.code();
    db.connection()
        .call(move |conn| -> Result<(), rusqlite::Error> {
            conn.execute(
                "INSERT INTO chat_languages (chat_id, language, updated_at)
                 VALUES (?1, ?2, strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
                 ON CONFLICT(chat_id) DO UPDATE SET
                    language = excluded.language,
                    updated_at = excluded.updated_at",
                params![chat_id, code],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Remove the language of a chat. Missing rows are not an error.
pub async fn delete_language(db: &Database, chat: &ChatId) -> Result<(), LeadwireError> {
    let chat_id = chat.as_str().to_string();
    db.connection()
        .call(move |conn| -> Result<(), rusqlite::Error> {
            conn.execute(
                "DELETE FROM chat_languages WHERE chat_id = ?1",
                params![chat_id],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Load every stored preference. Rows with an unknown language code are skipped.
pub async fn load_languages(db: &Database) -> Result<Vec<(ChatId, Language)>, LeadwireError> {
    let rows = db
        .connection()
        .call(|conn| -> Result<Vec<(String, String)>, rusqlite::Error> {
            let mut stmt =
                conn.prepare("SELECT chat_id, language FROM chat_languages ORDER BY chat_id")?;
            let rows = stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?;
            rows.collect()
        })
        .await
        .map_err(crate::database::map_tr_err)?;

    Ok(rows
        .into_iter()
        .filter_map(|(chat_id, code)| match Language::from_str(&code) {
            Ok(language) => Some((ChatId(chat_id), language)),
            Err(_) => {
                warn!(chat_id = %chat_id, code = %code, "skipping unknown language code");
                None
            }
        })
        .collect())
}
