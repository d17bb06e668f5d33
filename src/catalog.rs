/// Lake catalog: the bathing lakes this service monitors.
///
/// The built-in list covers the lakes around Leipzig. A JSON file with the same
/// shape (`[{"id", "name", "lat", "lon", "location"?}]`) replaces it when
/// `CATALOG_PATH` or `--catalog` is given.
use std::collections::HashSet;
use std::path::Path;

use tracing::{info, instrument};

use crate::model::LakeDescriptor;

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Failed to read catalog file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse catalog JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Duplicate lake id in catalog: {0}")]
    DuplicateId(String),
    #[error("Duplicate lake name in catalog: {0}")]
    DuplicateName(String),
    #[error("Catalog contains no lakes")]
    Empty,
}

/// (id, name, lat, lon)
const DEFAULT_LAKES: &[(&str, &str, f64, f64)] = &[
    ("bgwl0085", "Kulkwitzer See", 51.30716868956218, 12.247896347253004),
    ("bgwm0071", "Albrechtshainer See", 51.31249082838858, 12.570372341129078),
    ("bgwm0072", "Moritz/Ammelshainer See", 51.29749712405867, 12.606977342144106),
    ("bwwl0092", "Speicherbecken Borna", 51.11011090686556, 12.451590688757843),
    ("bwwl0101", "Harthsee", 51.085874010632715, 12.54802432292868),
    ("bwwl0119", "Markkleeberger See", 51.26603400515653, 12.40812975334591),
    ("bwwm0078", "Spannbetonwerk See", 51.252215631525644, 12.61683371411002),
    ("bwls0088", "Cospudener See", 51.26915113014249, 12.334952110757772),
];

pub fn default_catalog() -> Vec<LakeDescriptor> {
    DEFAULT_LAKES
        .iter()
        .map(|&(id, name, lat, lon)| LakeDescriptor {
            id: id.to_string(),
            name: name.to_string(),
            lat,
            lon,
            location: None,
        })
        .collect()
}

pub fn parse_catalog(json: &str) -> Result<Vec<LakeDescriptor>, CatalogError> {
    let lakes: Vec<LakeDescriptor> = serde_json::from_str(json)?;
    validate(&lakes)?;
    Ok(lakes)
}

#[instrument]
pub fn load_catalog(path: &Path) -> Result<Vec<LakeDescriptor>, CatalogError> {
    let contents = std::fs::read_to_string(path)?;
    let lakes = parse_catalog(&contents)?;
    info!("Loaded {} lakes from catalog {}", lakes.len(), path.display());
    Ok(lakes)
}

/// Catalog from `path` if given, otherwise the built-in list.
pub fn load_or_default(path: Option<&Path>) -> Result<Vec<LakeDescriptor>, CatalogError> {
    match path {
        Some(path) => load_catalog(path),
        None => Ok(default_catalog()),
    }
}

fn validate(lakes: &[LakeDescriptor]) -> Result<(), CatalogError> {
    if lakes.is_empty() {
        return Err(CatalogError::Empty);
    }

    let mut ids = HashSet::new();
    let mut names = HashSet::new();
    for lake in lakes {
        if !ids.insert(lake.id.as_str()) {
            return Err(CatalogError::DuplicateId(lake.id.clone()));
        }
        if !names.insert(lake.name.as_str()) {
            return Err(CatalogError::DuplicateName(lake.name.clone()));
        }
    }
    Ok(())
}
