//! Scan processor: applies scans and removals to a session ledger.
//!
//! Every entry point takes the catalog and the ledger explicitly. A counter
//! change and its log entry are always applied together.

use crate::catalog::{normalize, Catalog, ProductRecord};
use crate::error::Rejection;
use crate::ledger::{ScanAction, ScanEvent, SessionLedger};
use chrono::{Local, NaiveDateTime};
use tracing::debug;

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanResult {
    /// The code resolved to a catalog product.
    Matched {
        product: ProductRecord,
        scanned_code: String,
        quantity: u64,
        total: u64,
        via_alias: bool,
    },
    /// The code is not in the catalog; it was bucketed as unknown.
    Unknown {
        code: String,
        quantity: u64,
        total: u64,
    },
    Removed {
        primary_code: String,
        product: Option<ProductRecord>,
        quantity: u64,
        remaining: u64,
    },
}

/// Register a scanned code at the current local time.
pub fn register_scan(
    catalog: &Catalog,
    ledger: &mut SessionLedger,
    raw_code: &str,
    quantity: i64,
) -> Option<ScanResult> {
    register_scan_at(catalog, ledger, raw_code, quantity, Local::now().naive_local())
}

/// Register a scanned code. Blank input is ignored and returns `None`;
/// a quantity of zero or less counts as 1.
pub fn register_scan_at(
    catalog: &Catalog,
    ledger: &mut SessionLedger,
    raw_code: &str,
    quantity: i64,
    at: NaiveDateTime,
) -> Option<ScanResult> {
    let code = normalize(raw_code);
    if code.is_empty() {
        return None;
    }
    let quantity = clamp_quantity(quantity);
    let timestamp = at.format(TIMESTAMP_FORMAT).to_string();

    match catalog.lookup(&code) {
        Some(product) => {
            let primary = product.primary_code.clone();
            let total = {
                let count = ledger.counts.entry(primary.clone()).or_insert(0);
                *count = count.saturating_add(quantity);
                *count
            };
            ledger.scan_log.push(ScanEvent {
                timestamp,
                action: ScanAction::Add,
                scanned_code: code.clone(),
                resolved_primary_code: primary.clone(),
                quantity_delta: quantity,
            });
            debug!("+{} {} (via {}) -> {}", quantity, primary, code, total);

            Some(ScanResult::Matched {
                product: product.clone(),
                via_alias: code != primary,
                scanned_code: code,
                quantity,
                total,
            })
        }
        None => {
            let total = {
                let count = ledger.unknown.entry(code.clone()).or_insert(0);
                *count = count.saturating_add(quantity);
                *count
            };
            ledger.scan_log.push(ScanEvent {
                timestamp,
                action: ScanAction::Unknown,
                scanned_code: code.clone(),
                resolved_primary_code: String::new(),
                quantity_delta: quantity,
            });
            debug!("Unknown code {} (+{}, {} total)", code, quantity, total);

            Some(ScanResult::Unknown {
                code,
                quantity,
                total,
            })
        }
    }
}

pub fn remove_quantity(
    catalog: &Catalog,
    ledger: &mut SessionLedger,
    primary_code: &str,
    quantity: i64,
) -> Result<ScanResult, Rejection> {
    remove_quantity_at(
        catalog,
        ledger,
        primary_code,
        quantity,
        Local::now().naive_local(),
    )
}

/// Take `quantity` units off a counted product. An entry that reaches zero
/// is dropped from the ledger.
pub fn remove_quantity_at(
    catalog: &Catalog,
    ledger: &mut SessionLedger,
    primary_code: &str,
    quantity: i64,
    at: NaiveDateTime,
) -> Result<ScanResult, Rejection> {
    if quantity <= 0 {
        return Err(Rejection::NonPositiveQuantity(quantity));
    }
    let quantity = quantity as u64;
    let Some(current) = ledger.counts.get(primary_code).copied() else {
        return Err(Rejection::NothingToRemove(primary_code.to_string()));
    };

    let remaining = current.saturating_sub(quantity);
    if remaining == 0 {
        ledger.counts.remove(primary_code);
    } else {
        ledger.counts.insert(primary_code.to_string(), remaining);
    }
    ledger.scan_log.push(ScanEvent {
        timestamp: at.format(TIMESTAMP_FORMAT).to_string(),
        action: ScanAction::Remove,
        scanned_code: String::new(),
        resolved_primary_code: primary_code.to_string(),
        quantity_delta: quantity,
    });
    debug!("-{} {} -> {}", quantity, primary_code, remaining);

    Ok(ScanResult::Removed {
        primary_code: primary_code.to_string(),
        product: catalog.get(primary_code).cloned(),
        quantity,
        remaining,
    })
}

/// Counted catalog products, highest quantity first, then by reference and
/// primary code.
pub fn scanned_inventory<'a>(
    catalog: &'a Catalog,
    ledger: &SessionLedger,
) -> impl Iterator<Item = (&'a ProductRecord, u64)> {
    let mut rows: Vec<(&'a ProductRecord, u64)> = catalog
        .products()
        .filter_map(|p| {
            let qty = ledger.count(&p.primary_code);
            (qty > 0).then_some((p, qty))
        })
        .collect();
    rows.sort_by(|a, b| {
        b.1.cmp(&a.1)
            .then_with(|| a.0.reference.cmp(&b.0.reference))
            .then_with(|| a.0.primary_code.cmp(&b.0.primary_code))
    });
    rows.into_iter()
}

fn clamp_quantity(quantity: i64) -> u64 {
    if quantity <= 0 {
        1
    } else {
        quantity as u64
    }
}
