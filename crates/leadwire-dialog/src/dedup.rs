// SPDX-FileCopyrightText: 2026 Leadwire Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Process-lifetime record of handled message ids.

use dashmap::DashSet;
use leadwire_core::MessageId;

/// Rejects message ids that were already handled since process start.
///
/// Absent or empty ids can never be deduplicated: they are reported as
/// unseen and never stored.
#[derive(Debug, Default)]
pub struct Deduplicator {
    seen: DashSet<String>,
}

impl Deduplicator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seen(&self, id: Option<&MessageId>) -> bool {
        match usable(id) {
            Some(id) => self.seen.contains(id),
            None => false,
        }
    }

    pub fn mark_seen(&self, id: Option<&MessageId>) {
        if let Some(id) = usable(id) {
            self.seen.insert(id.to_string());
        }
    }

    /// Atomically marks `id` as seen. Returns `false` if it already was.
    ///
    /// Ids that cannot be deduplicated are always claimable.
    pub fn claim(&self, id: Option<&MessageId>) -> bool {
        match usable(id) {
            Some(id) => self.seen.insert(id.to_string()),
            None => true,
        }
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

fn usable(id: Option<&MessageId>) -> Option<&str> {
    id.map(|m| m.0.as_str()).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    fn mid(s: &str) -> MessageId {
        MessageId(s.to_string())
    }

    #[test]
    fn mark_then_seen() {
        let dedup = Deduplicator::new();
        let id = mid("BAE5A1");
        assert!(!dedup.seen(Some(&id)));
        dedup.mark_seen(Some(&id));
        assert!(dedup.seen(Some(&id)));
        assert_eq!(dedup.len(), 1);
    }

    #[test]
    fn claim_succeeds_once() {
        let dedup = Deduplicator::new();
        let id = mid("BAE5A2");
        assert!(dedup.claim(Some(&id)));
        assert!(!dedup.claim(Some(&id)));
    }

    #[test]
    fn absent_and_empty_ids_are_never_seen() {
        let dedup = Deduplicator::new();
        let empty = mid("");
        dedup.mark_seen(None);
        dedup.mark_seen(Some(&empty));
        assert!(!dedup.seen(None));
        assert!(!dedup.seen(Some(&empty)));
        assert!(dedup.claim(None));
        assert!(dedup.claim(None));
        assert!(dedup.claim(Some(&empty)));
        assert!(dedup.is_empty());
    }

    #[test]
    fn concurrent_claims_have_one_winner() {
        let dedup = Arc::new(Deduplicator::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let dedup = Arc::clone(&dedup);
                std::thread::spawn(move || dedup.claim(Some(&mid("shared"))))
            })
            .collect();
        let winners = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|won| *won)
            .count();
        assert_eq!(winners, 1);
    }
}
