use inventory_scan::{Catalog, Rejection, ScanResult, Workspace};
use std::fs;

const CATALOG: &str = "EAN 1,EAN 2,Reference,Name,Couleur,Taille,Pointure\n\
                       111,222,REF-A,Basket,Noir,M,42\n\
                       333,,REF-B,Bottine,Marron,,39\n";

#[test]
fn test_scan_requires_catalog() {
    let mut workspace = Workspace::new("Dossier 1").unwrap();
    assert_eq!(workspace.scan("111", 1).unwrap_err(), Rejection::NoCatalog);
    assert_eq!(workspace.remove("111", 1).unwrap_err(), Rejection::NoCatalog);
    assert!(workspace.sessions.current().is_empty());
}

#[test]
fn test_sessions_count_independently() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("catalog.csv");
    fs::write(&path, CATALOG).unwrap();

    let mut workspace = Workspace::new("Dossier 1").unwrap();
    workspace.import_catalog(&path).unwrap();

    workspace.scan("222", 2).unwrap();
    workspace.sessions.create_session("Dossier 2").unwrap();
    workspace.scan("111", 1).unwrap();
    workspace.scan("999", 1).unwrap();

    assert_eq!(workspace.sessions.current().count("111"), 1);
    assert_eq!(workspace.sessions.get("Dossier 1").unwrap().count("111"), 2);
    assert!(workspace.sessions.get("Dossier 1").unwrap().unknown().is_empty());

    workspace.sessions.reset_session("Dossier 1").unwrap();
    assert!(workspace.sessions.get("Dossier 1").unwrap().is_empty());
    assert_eq!(workspace.sessions.current().count("111"), 1);

    let removed = workspace.remove("111", 1).unwrap();
    assert!(matches!(removed, ScanResult::Removed { remaining: 0, .. }));
}

#[test]
fn test_failed_import_keeps_previous_catalog() {
    let dir = tempfile::tempdir().unwrap();
    let good = dir.path().join("good.csv");
    let bad = dir.path().join("bad.csv");
    fs::write(&good, CATALOG).unwrap();
    fs::write(&bad, "EAN 1,Name\n111,Basket\n").unwrap();

    let mut workspace = Workspace::new("Dossier 1").unwrap();
    workspace.import_catalog(&good).unwrap();
    assert!(workspace.import_catalog(&bad).is_err());

    let catalog = workspace.catalog().unwrap();
    assert_eq!(catalog.len(), 2);
    assert_eq!(catalog.resolve("222"), Some("111"));
}

#[test]
fn test_deleting_sole_session_is_rejected() {
    let mut workspace = Workspace::new("Dossier 1").unwrap();
    assert_eq!(
        workspace.sessions.delete_session("Dossier 1").unwrap_err(),
        Rejection::LastSession
    );
    assert_eq!(workspace.sessions.names().collect::<Vec<_>>(), vec!["Dossier 1"]);
}

#[test]
fn test_with_catalog_installs_catalog() {
    let catalog = Catalog::from_csv_str(CATALOG).unwrap();
    let mut workspace = Workspace::new("Dossier 1").unwrap().with_catalog(catalog);

    assert_eq!(workspace.catalog().map(|c| c.len()), Some(2));
    let result = workspace.scan("222", 3).unwrap().unwrap();
    assert!(matches!(result, ScanResult::Matched { total: 3, via_alias: true, .. }));
    assert_eq!(workspace.sessions.current().count("111"), 3);
}
