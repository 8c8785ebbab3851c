use crate::catalog::{
    Catalog, COL_COLOR, COL_NAME, COL_PRIMARY, COL_REFERENCE, COL_SECONDARY, COL_SHOE_SIZE,
    COL_SIZE,
};
use crate::error::Error;
use crate::ledger::SessionLedger;
use crate::scan::scanned_inventory;
use csv::Writer;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

pub const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

pub const INVENTORY_HEADERS: [&str; 8] = [
    COL_PRIMARY,
    COL_SECONDARY,
    COL_REFERENCE,
    COL_NAME,
    COL_COLOR,
    COL_SIZE,
    COL_SHOE_SIZE,
    "Quantite",
];
pub const SCAN_LOG_HEADERS: [&str; 5] = ["timestamp", "action", "code_scanné", "ean1", "qty"];
pub const UNKNOWN_HEADERS: [&str; 2] = ["code_scanné", "quantite"];

fn bom_writer() -> Writer<Vec<u8>> {
    Writer::from_writer(UTF8_BOM.to_vec())
}

fn finish(writer: Writer<Vec<u8>>) -> Result<Vec<u8>, Error> {
    writer.into_inner().map_err(|e| Error::Io(e.into_error()))
}

/// Counted products with their catalog columns, in inventory order.
pub fn inventory_csv(catalog: &Catalog, ledger: &SessionLedger) -> Result<Vec<u8>, Error> {
    let mut writer = bom_writer();
    writer.write_record(INVENTORY_HEADERS)?;

    for (product, quantity) in scanned_inventory(catalog, ledger) {
        writer.write_record([
            product.primary_code.as_str(),
            product.secondary_code.as_deref().unwrap_or(""),
            product.reference.as_str(),
            product.name.as_str(),
            product.color.as_str(),
            product.size.as_str(),
            product.shoe_size.as_str(),
            quantity.to_string().as_str(),
        ])?;
    }

    finish(writer)
}

/// Every scan event in the order it was recorded.
pub fn scan_log_csv(ledger: &SessionLedger) -> Result<Vec<u8>, Error> {
    let mut writer = bom_writer();
    writer.write_record(SCAN_LOG_HEADERS)?;

    for event in ledger.scan_log() {
        writer.write_record([
            event.timestamp.as_str(),
            event.action.as_str(),
            event.scanned_code.as_str(),
            event.resolved_primary_code.as_str(),
            event.quantity_delta.to_string().as_str(),
        ])?;
    }

    finish(writer)
}

pub fn unknown_csv(ledger: &SessionLedger) -> Result<Vec<u8>, Error> {
    let mut writer = bom_writer();
    writer.write_record(UNKNOWN_HEADERS)?;

    for (code, quantity) in ledger.unknown_sorted() {
        writer.write_record([code, quantity.to_string().as_str()])?;
    }

    finish(writer)
}

/// Turn a session name into something safe for a file name. ASCII letters,
/// digits and `-` are kept; every other byte becomes `_xx` (lowercase hex),
/// so two different names never share a slug.
pub fn slug(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    for byte in name.bytes() {
        if byte.is_ascii_alphanumeric() || byte == b'-' {
            slug.push(byte as char);
        } else {
            slug.push_str(&format!("_{:02x}", byte));
        }
    }
    slug
}

/// Write the inventory, scan log and unknown-code exports of one session.
/// Returns the paths written, in that order.
pub fn write_session_exports(
    dir: &Path,
    session_name: &str,
    catalog: &Catalog,
    ledger: &SessionLedger,
) -> Result<Vec<PathBuf>, Error> {
    fs::create_dir_all(dir)?;
    let slug = slug(session_name);

    let outputs = [
        (format!("inventaire_{}.csv", slug), inventory_csv(catalog, ledger)?),
        (format!("journal_{}.csv", slug), scan_log_csv(ledger)?),
        (format!("inconnus_{}.csv", slug), unknown_csv(ledger)?),
    ];

    let mut written = Vec::with_capacity(outputs.len());
    for (file_name, bytes) in outputs {
        let path = dir.join(file_name);
        fs::write(&path, bytes)?;
        written.push(path);
    }

    info!(
        "Exported session '{}' to {}",
        session_name,
        dir.display()
    );
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slug() {
        assert_eq!(slug("Dossier 1"), "Dossier_201");
        assert_eq!(slug("réserve/A"), "r_c3_a9serve_2fA");
        assert_eq!(slug("stock-B"), "stock-B");
    }

    #[test]
    fn test_slug_keeps_similar_names_apart() {
        let names = ["Dossier 1", "Dossier_1", "Dossier/1", "Dossier-1", "Dossier1"];
        let slugs: std::collections::BTreeSet<String> = names.iter().map(|n| slug(n)).collect();
        assert_eq!(slugs.len(), names.len());
    }

    #[test]
    fn test_empty_log_is_header_only() {
        let bytes = scan_log_csv(&SessionLedger::new()).unwrap();
        assert!(bytes.starts_with(UTF8_BOM));
        let text = std::str::from_utf8(&bytes[UTF8_BOM.len()..]).unwrap();
        assert_eq!(text, "timestamp,action,code_scanné,ean1,qty\n");
    }

    #[test]
    fn test_empty_unknown_is_header_only() {
        let bytes = unknown_csv(&SessionLedger::new()).unwrap();
        let text = std::str::from_utf8(&bytes[UTF8_BOM.len()..]).unwrap();
        assert_eq!(text, "code_scanné,quantite\n");
    }
}
