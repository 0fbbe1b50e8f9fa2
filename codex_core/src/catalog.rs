//! # Catalog Files
//!
//! A catalog is a JSON data table of equations. Two shapes are accepted:
//!
//! ```text
//! [ { "id": ..., "name": ... }, ... ]
//! { "equations": [ { "id": ..., "name": ... }, ... ] }
//! ```
//!
//! Entries are loaded in file order with [`Library::register`] semantics,
//! so a repeated id keeps the later record.
//!
//! The crate ships a builtin catalog (`data/catalog.json`) that is parsed
//! once on first use.

use std::fs;
use std::path::Path;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::equation::Equation;
use crate::errors::{CodexError, CodexResult};
use crate::registry::Library;

const BUILTIN_CATALOG_JSON: &str = include_str!("../data/catalog.json");

static BUILTIN: Lazy<Library> =
    Lazy::new(|| parse_catalog(BUILTIN_CATALOG_JSON).expect("builtin catalog must be valid JSON"));

#[derive(Deserialize)]
#[serde(untagged)]
enum CatalogShape {
    Bare(Vec<Equation>),
    Wrapped { equations: Vec<Equation> },
}

/// Wrapped form written by [`catalog_json`].
#[derive(Serialize)]
struct CatalogDocument<'a> {
    equations: &'a Library,
}

/// The builtin catalog.
pub fn builtin() -> &'static Library {
    &BUILTIN
}

/// Parse catalog JSON into a library.
pub fn parse_catalog(json: &str) -> CodexResult<Library> {
    let shape: CatalogShape = serde_json::from_str(json).map_err(|e| CodexError::SerializationError {
        reason: format!("Invalid catalog JSON: {}", e),
    })?;

    let equations = match shape {
        CatalogShape::Bare(equations) => equations,
        CatalogShape::Wrapped { equations } => equations,
    };
    debug!(records = equations.len(), "parsed catalog");
    Ok(equations.into_iter().collect())
}

/// Read and parse a catalog file.
pub fn load_catalog(path: &Path) -> CodexResult<Library> {
    let contents = fs::read_to_string(path)
        .map_err(|e| CodexError::file_error("read", path.display().to_string(), e.to_string()))?;
    parse_catalog(&contents).map_err(|e| match e {
        CodexError::SerializationError { reason } => CodexError::SerializationError {
            reason: format!("{} ({})", reason, path.display()),
        },
        other => other,
    })
}

/// Serialize a library in the wrapped catalog form.
pub fn catalog_json(library: &Library) -> CodexResult<String> {
    serde_json::to_string_pretty(&CatalogDocument { equations: library }).map_err(CodexError::serialization)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_catalog_loads() {
        let lib = builtin();
        // 15 records in the data file, one id repeated
        assert_eq!(lib.len(), 14);

        for eq in lib.iter() {
            assert!(eq.validate().is_ok(), "builtin entry {} is invalid", eq.id);
            assert!(!eq.formula.is_empty(), "builtin entry {} has no formula", eq.id);
            assert!(!eq.classification.is_empty(), "builtin entry {} has no classification", eq.id);
        }
    }

    #[test]
    fn test_builtin_duplicate_resolved_to_later_record() {
        let eq = builtin().get("EQ0007").unwrap();
        assert_eq!(eq.origin, "MODULO_85");
        assert!(eq.name.contains("revisada"));

        // Still at its first position
        assert_eq!(builtin().list()[6].id, "EQ0007");
    }

    #[test]
    fn test_builtin_lookups() {
        let lib = builtin();
        assert_eq!(lib.find_by_classification("Chave Mestra").len(), 2);
        assert_eq!(lib.find_by_classification("Energia").len(), 2);
        assert_eq!(lib.find_by_origin("MODULO_44").len(), 2);
    }

    #[test]
    fn test_parse_bare_array() {
        let lib = parse_catalog(r#"[{"id": "A1", "name": "Um"}, {"id": "A2", "name": "Dois"}]"#).unwrap();
        assert_eq!(lib.len(), 2);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        let err = parse_catalog("{ not json").unwrap_err();
        assert_eq!(err.error_code(), "SERIALIZATION_ERROR");

        assert!(parse_catalog(r#"{"other": []}"#).is_err());
    }

    #[test]
    fn test_catalog_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.json");

        fs::write(&path, catalog_json(builtin()).unwrap()).unwrap();
        let loaded = load_catalog(&path).unwrap();
        assert_eq!(&loaded, builtin());
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_catalog(&dir.path().join("absent.json")).unwrap_err();
        assert_eq!(err.error_code(), "FILE_ERROR");
    }
}
