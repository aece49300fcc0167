// SPDX-FileCopyrightText: 2026 Leadwire Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `leadwire leads` command implementation.

use std::fmt::Write;

use leadwire_config::model::LeadwireConfig;
use leadwire_core::{LeadRecord, LeadwireError, StorageAdapter};
use leadwire_storage::SqliteStorage;

/// Prints the `limit` most recent leads, newest first.
pub async fn run_leads(
    config: &LeadwireConfig,
    limit: usize,
    json: bool,
) -> Result<(), LeadwireError> {
    let storage = SqliteStorage::new(config.storage.clone());
    storage.initialize().await?;

    let leads = storage.recent_leads(limit).await?;
    let total = storage.count_leads().await?;
    storage.close().await?;

    if json {
        for lead in &leads {
            let line = serde_json::to_string(lead)
                .map_err(|e| LeadwireError::Internal(format!("failed to encode lead: {e}")))?;
            println!("{line}");
        }
    } else {
        print!("{}", render_listing(&leads, total));
    }
    Ok(())
}

fn render_listing(leads: &[LeadRecord], total: u64) -> String {
    if leads.is_empty() {
        return "No leads yet.\n".to_string();
    }

    let mut out = format!("Showing {} of {} leads\n\n", leads.len(), total);
    for lead in leads {
        let _ = writeln!(
            out,
            "{}  {}  {}\n    company: {}\n    task:    {}\n    chat:    {} ({})",
            lead.recorded_at.format("%Y-%m-%d %H:%M"),
            lead.phone,
            lead.name,
            lead.company,
            lead.task,
            lead.chat_id,
            lead.status,
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use leadwire_core::{ChatId, LeadStatus};

    use super::*;

    fn lead(name: &str) -> LeadRecord {
        LeadRecord {
            chat_id: ChatId::from("77001234567@c.us"),
            sender_phone: "77001234567@c.us".into(),
            name: name.into(),
            company: "Acme".into(),
            phone: "+7 700 123 45 67".into(),
            task: "bot for bookings".into(),
            recorded_at: Utc.with_ymd_and_hms(2026, 3, 1, 9, 30, 0).unwrap(),
            status: LeadStatus::New,
        }
    }

    #[test]
    fn empty_listing() {
        assert_eq!(render_listing(&[], 0), "No leads yet.\n");
    }

    #[test]
    fn listing_shows_every_field() {
        let out = render_listing(&[lead("Алия")], 5);
        assert!(out.starts_with("Showing 1 of 5 leads"));
        assert!(out.contains("2026-03-01 09:30  +7 700 123 45 67  Алия"));
        assert!(out.contains("company: Acme"));
        assert!(out.contains("task:    bot for bookings"));
        assert!(out.contains("(new)"));
    }

    #[tokio::test]
    async fn reads_leads_from_database() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = LeadwireConfig::default();
        config.storage.database_path = dir.path().join("leads.db").to_string_lossy().into_owned();

        let storage = SqliteStorage::new(config.storage.clone());
        storage.initialize().await.unwrap();
        storage.save_lead(&lead("Болат")).await.unwrap();
        storage.close().await.unwrap();

        run_leads(&config, 10, false).await.unwrap();
        run_leads(&config, 10, true).await.unwrap();
    }
}
