pub mod sessions;

pub use sessions::Sessions;

use ahash::AHashMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScanAction {
    Add,
    Remove,
    Unknown,
}

impl ScanAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScanAction::Add => "ADD",
            ScanAction::Remove => "REMOVE",
            ScanAction::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for ScanAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of the audit log. Never edited after it is appended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanEvent {
    pub timestamp: String,
    pub action: ScanAction,
    pub scanned_code: String,
    pub resolved_primary_code: String,
    pub quantity_delta: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LedgerSummary {
    pub total_units: u64,
    pub distinct_products: usize,
    pub unknown_units: u64,
    pub distinct_unknown: usize,
    pub events: usize,
}

/// Counters, audit log and unknown-code bucket of one counting session.
///
/// Mutated only through the scan processor; `counts` never holds a zero.
#[derive(Debug, Clone, Default)]
pub struct SessionLedger {
    pub(crate) counts: AHashMap<String, u64>,
    pub(crate) scan_log: Vec<ScanEvent>,
    pub(crate) unknown: AHashMap<String, u64>,
}

impl SessionLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self, primary_code: &str) -> u64 {
        self.counts.get(primary_code).copied().unwrap_or(0)
    }

    pub fn counts(&self) -> &AHashMap<String, u64> {
        &self.counts
    }

    pub fn scan_log(&self) -> &[ScanEvent] {
        &self.scan_log
    }

    pub fn unknown(&self) -> &AHashMap<String, u64> {
        &self.unknown
    }

    /// Unknown codes, highest quantity first, then by code.
    pub fn unknown_sorted(&self) -> Vec<(&str, u64)> {
        let mut entries: Vec<(&str, u64)> = self
            .unknown
            .iter()
            .map(|(code, qty)| (code.as_str(), *qty))
            .collect();
        entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        entries
    }

    /// The last `n` events, newest first.
    pub fn recent(&self, n: usize) -> impl Iterator<Item = &ScanEvent> {
        self.scan_log.iter().rev().take(n)
    }

    pub fn summary(&self) -> LedgerSummary {
        LedgerSummary {
            total_units: saturating_total(self.counts.values()),
            distinct_products: self.counts.len(),
            unknown_units: saturating_total(self.unknown.values()),
            distinct_unknown: self.unknown.len(),
            events: self.scan_log.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty() && self.scan_log.is_empty() && self.unknown.is_empty()
    }

    pub fn reset(&mut self) {
        *self = SessionLedger::default();
    }
}

fn saturating_total<'a>(values: impl Iterator<Item = &'a u64>) -> u64 {
    values.fold(0u64, |acc, v| acc.saturating_add(*v))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(action: ScanAction, code: &str, qty: u64) -> ScanEvent {
        ScanEvent {
            timestamp: "2024-01-01T00:00:00".to_string(),
            action,
            scanned_code: code.to_string(),
            resolved_primary_code: String::new(),
            quantity_delta: qty,
        }
    }

    #[test]
    fn test_summary_and_reset() {
        let mut ledger = SessionLedger::new();
        ledger.counts.insert("111".to_string(), 4);
        ledger.counts.insert("222".to_string(), 1);
        ledger.unknown.insert("999".to_string(), 2);
        ledger.scan_log.push(event(ScanAction::Add, "111", 4));
        ledger.scan_log.push(event(ScanAction::Unknown, "999", 2));

        let summary = ledger.summary();
        assert_eq!(summary.total_units, 5);
        assert_eq!(summary.distinct_products, 2);
        assert_eq!(summary.unknown_units, 2);
        assert_eq!(summary.distinct_unknown, 1);
        assert_eq!(summary.events, 2);

        ledger.reset();
        assert!(ledger.is_empty());
        assert_eq!(ledger.summary(), LedgerSummary::default());
    }

    #[test]
    fn test_summary_saturates_instead_of_overflowing() {
        let mut ledger = SessionLedger::new();
        ledger.counts.insert("111".to_string(), u64::MAX);
        ledger.counts.insert("222".to_string(), 7);
        ledger.unknown.insert("998".to_string(), u64::MAX - 1);
        ledger.unknown.insert("999".to_string(), 2);

        let summary = ledger.summary();
        assert_eq!(summary.total_units, u64::MAX);
        assert_eq!(summary.unknown_units, u64::MAX);
    }

    #[test]
    fn test_unknown_sorted_by_quantity_then_code() {
        let mut ledger = SessionLedger::new();
        ledger.unknown.insert("b".to_string(), 1);
        ledger.unknown.insert("c".to_string(), 5);
        ledger.unknown.insert("a".to_string(), 1);
        assert_eq!(ledger.unknown_sorted(), vec![("c", 5), ("a", 1), ("b", 1)]);
    }

    #[test]
    fn test_recent_is_newest_first() {
        let mut ledger = SessionLedger::new();
        for code in ["1", "2", "3"] {
            ledger.scan_log.push(event(ScanAction::Unknown, code, 1));
        }
        let codes: Vec<&str> = ledger.recent(2).map(|e| e.scanned_code.as_str()).collect();
        assert_eq!(codes, vec!["3", "2"]);
    }
}
