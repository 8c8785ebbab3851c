pub mod catalog;
pub mod config;
pub mod error;
pub mod export;
pub mod ledger;
pub mod scan;
pub mod workspace;

pub use catalog::{normalize, Catalog, CatalogRow, ProductRecord};
pub use config::AppConfig;
pub use error::{Error, Rejection, ValidationError};
pub use ledger::{LedgerSummary, ScanAction, ScanEvent, SessionLedger, Sessions};
pub use scan::{register_scan, remove_quantity, scanned_inventory, ScanResult};
pub use workspace::Workspace;
