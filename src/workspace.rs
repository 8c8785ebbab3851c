use crate::catalog::Catalog;
use crate::error::{Error, Rejection};
use crate::ledger::{SessionLedger, Sessions};
use crate::scan::{self, ScanResult};
use std::path::Path;
use tracing::{error, info};

/// Everything a front end holds between operations: the installed catalog
/// and the counting sessions.
pub struct Workspace {
    catalog: Option<Catalog>,
    pub sessions: Sessions,
}

impl Workspace {
    pub fn new(initial_session: &str) -> Result<Self, Rejection> {
        Ok(Self {
            catalog: None,
            sessions: Sessions::new(initial_session)?,
        })
    }

    pub fn with_catalog(mut self, catalog: Catalog) -> Self {
        self.catalog = Some(catalog);
        self
    }

    pub fn catalog(&self) -> Option<&Catalog> {
        self.catalog.as_ref()
    }

    /// Replace the catalog with the one at `path`. On failure the previously
    /// installed catalog stays in place.
    pub fn import_catalog<P: AsRef<Path>>(&mut self, path: P) -> Result<&Catalog, Error> {
        match Catalog::from_path(path.as_ref()) {
            Ok(catalog) => Ok(&*self.catalog.insert(catalog)),
            Err(err) => {
                error!(
                    "Catalog import from '{}' failed: {}",
                    path.as_ref().display(),
                    err
                );
                if self.catalog.is_some() {
                    info!("Keeping previously loaded catalog");
                }
                Err(err)
            }
        }
    }

    fn parts(&mut self) -> Result<(&Catalog, &mut SessionLedger), Rejection> {
        let catalog = self.catalog.as_ref().ok_or(Rejection::NoCatalog)?;
        Ok((catalog, self.sessions.current_mut()))
    }

    /// Scan into the current session.
    pub fn scan(&mut self, raw_code: &str, quantity: i64) -> Result<Option<ScanResult>, Rejection> {
        let (catalog, ledger) = self.parts()?;
        Ok(scan::register_scan(catalog, ledger, raw_code, quantity))
    }

    pub fn remove(&mut self, primary_code: &str, quantity: i64) -> Result<ScanResult, Rejection> {
        let (catalog, ledger) = self.parts()?;
        scan::remove_quantity(catalog, ledger, primary_code, quantity)
    }
}
