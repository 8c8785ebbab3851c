//! Product catalog and the alias index derived from it.
//!
//! A catalog is built once from an imported table and never mutated. Every
//! product is reachable by its `EAN 1` (primary code) and, when present, its
//! `EAN 2` (secondary code).

use crate::error::{Error, ValidationError};
use ahash::AHashMap;
use csv::{ReaderBuilder, StringRecord};
use serde::Deserialize;
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

pub const COL_PRIMARY: &str = "EAN 1";
pub const COL_SECONDARY: &str = "EAN 2";
pub const COL_REFERENCE: &str = "Reference";
pub const COL_NAME: &str = "Name";
pub const COL_COLOR: &str = "Couleur";
pub const COL_SIZE: &str = "Taille";
pub const COL_SHOE_SIZE: &str = "Pointure";

pub const REQUIRED_COLUMNS: [&str; 7] = [
    COL_PRIMARY,
    COL_SECONDARY,
    COL_REFERENCE,
    COL_NAME,
    COL_COLOR,
    COL_SIZE,
    COL_SHOE_SIZE,
];

/// One row of the catalog table, as read from the source file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CatalogRow {
    #[serde(rename = "EAN 1")]
    pub primary_code: String,
    #[serde(rename = "EAN 2")]
    pub secondary_code: String,
    #[serde(rename = "Reference")]
    pub reference: String,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Couleur")]
    pub color: String,
    #[serde(rename = "Taille")]
    pub size: String,
    #[serde(rename = "Pointure")]
    pub shoe_size: String,
}

/// A validated product. Identity is `primary_code`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductRecord {
    pub primary_code: String,
    pub secondary_code: Option<String>,
    pub reference: String,
    pub name: String,
    pub color: String,
    pub size: String,
    pub shoe_size: String,
}

#[derive(Debug, Clone)]
pub struct Catalog {
    products: Vec<ProductRecord>,
    by_primary: AHashMap<String, usize>,
    aliases: AHashMap<String, String>,
}

/// Normalize a scanned or imported code: trim, drop every internal
/// whitespace character, and map NaN-like placeholders to "".
pub fn normalize(code: &str) -> String {
    let compact: String = code.chars().filter(|c| !c.is_whitespace()).collect();
    match compact.to_ascii_lowercase().as_str() {
        "nan" | "none" | "null" => String::new(),
        _ => compact,
    }
}

/// Check that every required column is present in `headers`.
pub fn check_columns(headers: &StringRecord) -> Result<(), ValidationError> {
    let present: BTreeSet<&str> = headers.iter().map(|h| h.trim()).collect();
    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|col| !present.contains(*col))
        .map(|col| col.to_string())
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(ValidationError::MissingColumns(missing))
    }
}

impl Catalog {
    /// Validate rows and build the alias index.
    pub fn load(rows: Vec<CatalogRow>) -> Result<Catalog, ValidationError> {
        let products: Vec<ProductRecord> = rows.into_iter().map(ProductRecord::from).collect();

        let empty_rows: Vec<usize> = products
            .iter()
            .enumerate()
            .filter(|(_, p)| p.primary_code.is_empty())
            .map(|(i, _)| i + 1)
            .collect();
        if !empty_rows.is_empty() {
            return Err(ValidationError::EmptyPrimaryCode(empty_rows));
        }

        let mut by_primary: AHashMap<String, usize> = AHashMap::with_capacity(products.len());
        let mut duplicates: BTreeSet<String> = BTreeSet::new();
        for (idx, product) in products.iter().enumerate() {
            if by_primary.insert(product.primary_code.clone(), idx).is_some() {
                duplicates.insert(product.primary_code.clone());
            }
        }
        if !duplicates.is_empty() {
            return Err(ValidationError::DuplicatePrimaryCodes(
                duplicates.into_iter().collect(),
            ));
        }

        // Primaries go in first so a secondary is checked against every
        // primary regardless of row order.
        let mut aliases: AHashMap<String, String> = by_primary
            .keys()
            .map(|code| (code.clone(), code.clone()))
            .collect();

        for product in &products {
            let Some(secondary) = product.secondary_code.as_ref() else {
                continue;
            };
            match aliases.get(secondary) {
                Some(existing) if *existing != product.primary_code => {
                    return Err(ValidationError::AliasConflict {
                        code: secondary.clone(),
                        first: existing.clone(),
                        second: product.primary_code.clone(),
                    });
                }
                Some(_) => {}
                None => {
                    aliases.insert(secondary.clone(), product.primary_code.clone());
                }
            }
        }

        debug!(
            "Catalog validated: {} products, {} indexed codes",
            products.len(),
            aliases.len()
        );

        Ok(Catalog {
            products,
            by_primary,
            aliases,
        })
    }

    /// Parse CSV text (comma or semicolon separated, optional BOM) and load it.
    pub fn from_csv_str(text: &str) -> Result<Catalog, Error> {
        let text = text.strip_prefix('\u{feff}').unwrap_or(text);
        let delimiter = sniff_delimiter(text);

        let mut reader = ReaderBuilder::new()
            .delimiter(delimiter)
            .trim(csv::Trim::Headers)
            .flexible(true)
            .from_reader(text.as_bytes());

        let headers = reader.headers()?.clone();
        check_columns(&headers)?;

        // Spreadsheet exports often drop trailing empty cells.
        let mut rows = Vec::new();
        for record in reader.records() {
            let mut record = record?;
            while record.len() < headers.len() {
                record.push_field("");
            }
            rows.push(record.deserialize::<CatalogRow>(Some(&headers))?);
        }

        Ok(Catalog::load(rows)?)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Catalog, Error> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        let catalog = Catalog::from_csv_str(&text)?;
        info!(
            "Loaded catalog '{}': {} products, {} scannable codes",
            path.display(),
            catalog.len(),
            catalog.alias_count()
        );
        Ok(catalog)
    }

    /// Resolve any scannable code to its primary code.
    pub fn resolve(&self, code: &str) -> Option<&str> {
        self.aliases.get(&normalize(code)).map(|p| p.as_str())
    }

    /// Resolve a scannable code straight to its product.
    pub fn lookup(&self, code: &str) -> Option<&ProductRecord> {
        self.resolve(code).and_then(|primary| self.get(primary))
    }

    pub fn get(&self, primary_code: &str) -> Option<&ProductRecord> {
        self.by_primary
            .get(primary_code)
            .map(|&idx| &self.products[idx])
    }

    /// Products in load order.
    pub fn products(&self) -> impl Iterator<Item = &ProductRecord> {
        self.products.iter()
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Number of distinct codes the index resolves (primaries plus aliases).
    pub fn alias_count(&self) -> usize {
        self.aliases.len()
    }
}

impl From<CatalogRow> for ProductRecord {
    fn from(row: CatalogRow) -> Self {
        let secondary = normalize(&row.secondary_code);
        ProductRecord {
            primary_code: normalize(&row.primary_code),
            secondary_code: (!secondary.is_empty()).then_some(secondary),
            reference: row.reference.trim().to_string(),
            name: row.name.trim().to_string(),
            color: row.color.trim().to_string(),
            size: row.size.trim().to_string(),
            shoe_size: row.shoe_size.trim().to_string(),
        }
    }
}

fn sniff_delimiter(text: &str) -> u8 {
    let header = text.lines().next().unwrap_or_default();
    if header.matches(';').count() > header.matches(',').count() {
        b';'
    } else {
        b','
    }
}
