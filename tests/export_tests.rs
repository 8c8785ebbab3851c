use chrono::NaiveDate;
use inventory_scan::catalog::{Catalog, CatalogRow};
use inventory_scan::export::{
    inventory_csv, scan_log_csv, unknown_csv, write_session_exports, UTF8_BOM,
};
use inventory_scan::scan::{register_scan_at, remove_quantity_at};
use inventory_scan::SessionLedger;
use std::fs;

fn row(primary: &str, secondary: &str, reference: &str, name: &str) -> CatalogRow {
    CatalogRow {
        primary_code: primary.to_string(),
        secondary_code: secondary.to_string(),
        reference: reference.to_string(),
        name: name.to_string(),
        color: "Rouge".to_string(),
        size: "L".to_string(),
        shoe_size: "40".to_string(),
    }
}

fn text(bytes: &[u8]) -> &str {
    assert!(bytes.starts_with(UTF8_BOM), "export must start with a BOM");
    std::str::from_utf8(&bytes[UTF8_BOM.len()..]).unwrap()
}

fn counted() -> (Catalog, SessionLedger) {
    let catalog = Catalog::load(vec![
        row("111", "222", "REF-A", "Basket"),
        row("333", "", "REF-B", "Bottine, cuir"),
        row("444", "", "REF-C", "Sandale"),
    ])
    .unwrap();
    let at = NaiveDate::from_ymd_opt(2024, 5, 2)
        .unwrap()
        .and_hms_opt(14, 0, 0)
        .unwrap();
    let mut ledger = SessionLedger::new();
    register_scan_at(&catalog, &mut ledger, "222", 1, at);
    register_scan_at(&catalog, &mut ledger, "333", 3, at);
    register_scan_at(&catalog, &mut ledger, "999", 2, at);
    register_scan_at(&catalog, &mut ledger, "888", 5, at);
    remove_quantity_at(&catalog, &mut ledger, "333", 1, at).unwrap();
    (catalog, ledger)
}

#[test]
fn test_inventory_export() {
    let (catalog, ledger) = counted();
    let bytes = inventory_csv(&catalog, &ledger).unwrap();
    assert_eq!(
        text(&bytes),
        "EAN 1,EAN 2,Reference,Name,Couleur,Taille,Pointure,Quantite\n\
         333,,REF-B,\"Bottine, cuir\",Rouge,L,40,2\n\
         111,222,REF-A,Basket,Rouge,L,40,1\n"
    );
}

#[test]
fn test_scan_log_export_in_append_order() {
    let (_, ledger) = counted();
    let bytes = scan_log_csv(&ledger).unwrap();
    assert_eq!(
        text(&bytes),
        "timestamp,action,code_scanné,ean1,qty\n\
         2024-05-02T14:00:00,ADD,222,111,1\n\
         2024-05-02T14:00:00,ADD,333,333,3\n\
         2024-05-02T14:00:00,UNKNOWN,999,,2\n\
         2024-05-02T14:00:00,UNKNOWN,888,,5\n\
         2024-05-02T14:00:00,REMOVE,,333,1\n"
    );
}

#[test]
fn test_unknown_export_sorted_by_quantity() {
    let (_, ledger) = counted();
    let bytes = unknown_csv(&ledger).unwrap();
    assert_eq!(text(&bytes), "code_scanné,quantite\n888,5\n999,2\n");
}

#[test]
fn test_empty_session_exports_headers_only() {
    let (catalog, _) = counted();
    let ledger = SessionLedger::new();
    assert_eq!(
        text(&inventory_csv(&catalog, &ledger).unwrap()),
        "EAN 1,EAN 2,Reference,Name,Couleur,Taille,Pointure,Quantite\n"
    );
    assert_eq!(
        text(&scan_log_csv(&ledger).unwrap()),
        "timestamp,action,code_scanné,ean1,qty\n"
    );
}

#[test]
fn test_write_session_exports() {
    let (catalog, ledger) = counted();
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("exports");

    let paths = write_session_exports(&out, "Dossier 1", &catalog, &ledger).unwrap();
    let names: Vec<String> = paths
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(
        names,
        vec![
            "inventaire_Dossier_201.csv",
            "journal_Dossier_201.csv",
            "inconnus_Dossier_201.csv",
        ]
    );

    let written = fs::read(&paths[2]).unwrap();
    assert_eq!(written, unknown_csv(&ledger).unwrap());
}

#[test]
fn test_similar_session_names_do_not_overwrite() {
    let (catalog, ledger) = counted();
    let empty = SessionLedger::new();
    let dir = tempfile::tempdir().unwrap();

    let spaced = write_session_exports(dir.path(), "Dossier 1", &catalog, &ledger).unwrap();
    let underscored = write_session_exports(dir.path(), "Dossier_1", &catalog, &empty).unwrap();

    assert_ne!(spaced[0], underscored[0]);
    assert_eq!(fs::read(&spaced[0]).unwrap(), inventory_csv(&catalog, &ledger).unwrap());
    assert_eq!(fs::read(&underscored[0]).unwrap(), inventory_csv(&catalog, &empty).unwrap());
}
