use std::collections::HashSet;
use std::path::Path;

use serde::Deserialize;

use crate::models::AssistancePoint;
use crate::ConfigError;

const BUILTIN_STATIONS: &str = include_str!("../data/stations.yaml");

#[derive(Debug, Clone, Deserialize)]
pub struct CatalogFile {
    pub stations: Vec<AssistancePoint>,
}

/// Load and validate an assistance-point catalog from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_catalog(path: &Path) -> Result<CatalogFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::CatalogFileIo {
        path: path.display().to_string(),
        source: e,
    })?;
    parse_catalog(&content)
}

/// Load the catalog at `path`, or the built-in catalog when the file does not exist.
///
/// # Errors
///
/// Returns `ConfigError` if an existing file cannot be read, parsed, or fails validation.
pub fn load_catalog_or_default(path: &Path) -> Result<CatalogFile, ConfigError> {
    if path.exists() {
        load_catalog(path)
    } else {
        default_catalog()
    }
}

/// The catalog compiled into the binary.
///
/// # Errors
///
/// Returns `ConfigError` if the embedded YAML is malformed.
pub fn default_catalog() -> Result<CatalogFile, ConfigError> {
    parse_catalog(BUILTIN_STATIONS)
}

fn parse_catalog(content: &str) -> Result<CatalogFile, ConfigError> {
    let catalog: CatalogFile = serde_yaml::from_str(content)?;
    validate_catalog(&catalog)?;
    Ok(catalog)
}

fn validate_catalog(catalog: &CatalogFile) -> Result<(), ConfigError> {
    let mut seen_names = HashSet::new();

    for station in &catalog.stations {
        if station.name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "station name must be non-empty".to_string(),
            ));
        }

        if !station.position().is_valid() {
            return Err(ConfigError::Validation(format!(
                "station '{}' has out-of-range coordinates ({}, {})",
                station.name, station.latitude, station.longitude
            )));
        }

        if !seen_names.insert(station.name.to_lowercase()) {
            return Err(ConfigError::Validation(format!(
                "duplicate station name: '{}'",
                station.name
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn station(name: &str, latitude: f64, longitude: f64) -> AssistancePoint {
        AssistancePoint {
            name: name.to_string(),
            latitude,
            longitude,
        }
    }

    #[test]
    fn builtin_catalog_is_valid() {
        let catalog = default_catalog().expect("embedded catalog should parse");
        assert!(!catalog.stations.is_empty());
    }

    #[test]
    fn parse_preserves_file_order() {
        let yaml = "stations:\n  - {name: B, latitude: 1.0, longitude: 1.0}\n  - {name: A, latitude: 0.0, longitude: 0.0}\n";
        let catalog = parse_catalog(yaml).unwrap();
        let names: Vec<&str> = catalog.stations.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["B", "A"]);
    }

    #[test]
    fn empty_station_list_is_accepted() {
        let catalog = parse_catalog("stations: []\n").unwrap();
        assert!(catalog.stations.is_empty());
    }

    #[test]
    fn validate_rejects_empty_name() {
        let catalog = CatalogFile {
            stations: vec![station("  ", 0.0, 0.0)],
        };
        let err = validate_catalog(&catalog).unwrap_err();
        assert!(err.to_string().contains("non-empty"));
    }

    #[test]
    fn validate_rejects_out_of_range_coordinates() {
        let catalog = CatalogFile {
            stations: vec![station("North", 95.0, 0.0)],
        };
        let err = validate_catalog(&catalog).unwrap_err();
        assert!(err.to_string().contains("out-of-range"));
    }

    #[test]
    fn validate_rejects_duplicate_names_case_insensitively() {
        let catalog = CatalogFile {
            stations: vec![station("Central", 0.0, 0.0), station("central", 1.0, 1.0)],
        };
        let err = validate_catalog(&catalog).unwrap_err();
        assert!(err.to_string().contains("duplicate station name"));
    }

    #[test]
    fn malformed_yaml_is_a_parse_error() {
        let err = parse_catalog("stations: [oops").unwrap_err();
        assert!(matches!(err, ConfigError::CatalogFileParse(_)));
    }

    #[test]
    fn missing_file_falls_back_to_builtin() {
        let catalog =
            load_catalog_or_default(Path::new("/definitely/not/here/stations.yaml")).unwrap();
        assert_eq!(
            catalog.stations.len(),
            default_catalog().unwrap().stations.len()
        );
    }

    #[test]
    fn load_catalog_reports_missing_file() {
        let err = load_catalog(Path::new("/definitely/not/here/stations.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::CatalogFileIo { .. }));
    }
}
