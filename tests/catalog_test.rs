// Catalog file loading tests

use std::io::Write;
use std::path::Path;

use lake_quality_service::catalog::{load_catalog, load_or_default, CatalogError};

#[test]
fn test_load_catalog_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"[
            {{"id": "bgwl0085", "name": "Kulkwitzer See", "lat": 51.307, "lon": 12.248, "location": "Lausen"}},
            {{"id": "bwls0088", "name": "Cospudener See", "lat": 51.269, "lon": 12.335}}
        ]"#
    )
    .unwrap();

    let lakes = load_catalog(file.path()).unwrap();
    assert_eq!(lakes.len(), 2);
    assert_eq!(lakes[0].location.as_deref(), Some("Lausen"));
    assert_eq!(lakes[1].name, "Cospudener See");
}

#[test]
fn test_load_catalog_missing_file() {
    let result = load_catalog(Path::new("/nonexistent/lakes.json"));
    assert!(matches!(result, Err(CatalogError::Io(_))));
}

#[test]
fn test_load_catalog_duplicate_name() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"[
            {{"id": "a", "name": "Harthsee", "lat": 51.0, "lon": 12.5}},
            {{"id": "b", "name": "Harthsee", "lat": 51.0, "lon": 12.5}}
        ]"#
    )
    .unwrap();

    assert!(matches!(load_catalog(file.path()), Err(CatalogError::DuplicateName(n)) if n == "Harthsee"));
}

#[test]
fn test_load_or_default_without_path() {
    let lakes = load_or_default(None).unwrap();
    assert_eq!(lakes.len(), 8);
    assert!(lakes.iter().any(|l| l.name == "Cospudener See"));
}
