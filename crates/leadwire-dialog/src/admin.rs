// SPDX-FileCopyrightText: 2026 Leadwire Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Operator commands handled before the dialogue state machine.

use leadwire_core::LeadRecord;

use crate::text;

/// Reply sent to senders outside the allow-list.
pub const DENIED: &str = "У вас нет доступа к этой команде";

/// Reply to `/clients` when no lead has been recorded.
pub const NO_RECORDS: &str = "📭 Записей пока нет";

const CLIENTS_HEADER: &str = "📋 Последние записи:\n";

/// Number of leads listed by `/clients`.
pub const CLIENTS_LIMIT: usize = 3;

/// A recognized operator command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminCommand {
    /// Forget the sender chat's language, phase and history.
    Reset,
    /// List the most recent leads.
    Clients,
}

impl AdminCommand {
    /// Recognizes a command in normalized text.
    ///
    /// `/clients` matches as a prefix, `/reset` only exactly.
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        if text.starts_with("/clients") {
            Some(AdminCommand::Clients)
        } else if text == "/reset" {
            Some(AdminCommand::Reset)
        } else {
            None
        }
    }
}

/// Sender allow-list, compared on digits only.
#[derive(Debug, Clone, Default)]
pub struct AdminPolicy {
    allowed: Vec<String>,
}

impl AdminPolicy {
    pub fn new<I, S>(allowed: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let allowed = allowed
            .into_iter()
            .map(|phone| text::digits_only(phone.as_ref()))
            .filter(|digits| !digits.is_empty())
            .collect();
        Self { allowed }
    }

    /// `+7 777 646 31 38`, `77776463138` and `77776463138@c.us` all match the same entry.
    pub fn is_allowed(&self, sender: &str) -> bool {
        let digits = text::digits_only(sender);
        !digits.is_empty() && self.allowed.iter().any(|allowed| *allowed == digits)
    }
}

/// Renders the `/clients` reply for `leads`, newest first.
pub fn format_clients(leads: &[LeadRecord]) -> String {
    if leads.is_empty() {
        return NO_RECORDS.to_string();
    }
    let mut lines = vec![CLIENTS_HEADER.to_string()];
    for lead in leads {
        lines.push(format!(
            "📱 {}\n👤 {}\n🏢 {}\n🤖 {}\n📅 {}\n",
            lead.phone,
            lead.name,
            lead.company,
            lead.task,
            lead.recorded_at.format("%Y-%m-%d"),
        ));
    }
    lines.join("\n")
}
