//! # Equation Registry
//!
//! [`Library`] is the single in-memory catalog of [`Equation`]s, keyed by
//! id and kept in insertion order.
//!
//! ## Duplicate ids
//!
//! [`Library::register`] overwrites with a warning: the stored record
//! is replaced in place (it keeps its original position) and the previous
//! record is returned. [`Library::try_register`] is the strict variant used
//! when callers want collisions to be errors.
//!
//! ## Usage
//!
//! ```rust
//! use codex_core::equation::Equation;
//! use codex_core::registry::Library;
//!
//! let mut library = Library::new();
//! library.register(Equation::new("EQ0001", "Ressonância", "R = f / f_0").with_classification("Harmonia"));
//! library.register(Equation::new("EQ0002", "Coerência", "C = A B").with_classification("Coerência"));
//!
//! assert_eq!(library.list().len(), 2);
//! assert_eq!(library.find_by_classification("Harmonia")[0].id, "EQ0001");
//! ```

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::equation::Equation;
use crate::errors::{CodexError, CodexResult};

/// Insertion-ordered map from equation id to [`Equation`].
///
/// Serializes as a JSON array. Deserializing replays [`Library::register`]
/// over the array, so a later duplicate overwrites an earlier one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<Equation>", into = "Vec<Equation>")]
pub struct Library {
    entries: Vec<Equation>,
    /// id -> position in `entries`
    index: HashMap<String, usize>,
}

/// How [`Library::merge`] treats ids present on both sides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergePolicy {
    /// Keep the record already in the library
    #[default]
    KeepExisting,
    /// Replace with the incoming record
    Overwrite,
    /// Fail the whole merge on the first collision
    Reject,
}

/// Outcome of a [`Library::merge`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeReport {
    pub added: Vec<String>,
    pub replaced: Vec<String>,
    pub skipped: Vec<String>,
}

impl Library {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an equation (`registrar`).
    ///
    /// Returns the record previously stored under the same id, if any.
    pub fn register(&mut self, equation: Equation) -> Option<Equation> {
        match self.index.get(&equation.id) {
            Some(&pos) => {
                warn!(id = %equation.id, "duplicate equation id, overwriting previous record");
                Some(std::mem::replace(&mut self.entries[pos], equation))
            }
            None => {
                debug!(id = %equation.id, "registered equation");
                self.index.insert(equation.id.clone(), self.entries.len());
                self.entries.push(equation);
                None
            }
        }
    }

    /// Register an equation, rejecting invalid records and duplicate ids.
    pub fn try_register(&mut self, equation: Equation) -> CodexResult<()> {
        equation.validate()?;
        if self.contains(&equation.id) {
            return Err(CodexError::duplicate_id(&equation.id));
        }
        self.register(equation);
        Ok(())
    }

    /// All equations in insertion order (`listar`).
    pub fn list(&self) -> Vec<&Equation> {
        self.entries.iter().collect()
    }

    /// Equations whose classification equals `tag` exactly
    /// (`buscar_por_classificacao`).
    pub fn find_by_classification(&self, tag: &str) -> Vec<&Equation> {
        self.entries.iter().filter(|eq| eq.classification == tag).collect()
    }

    /// Equations whose origin equals `origin` exactly.
    pub fn find_by_origin(&self, origin: &str) -> Vec<&Equation> {
        self.entries.iter().filter(|eq| eq.origin == origin).collect()
    }

    /// Case-insensitive substring search over id, name, description and formula.
    pub fn search(&self, text: &str) -> Vec<&Equation> {
        let needle = text.to_lowercase();
        self.entries
            .iter()
            .filter(|eq| {
                eq.id.to_lowercase().contains(&needle)
                    || eq.name.to_lowercase().contains(&needle)
                    || eq.description.to_lowercase().contains(&needle)
                    || eq.formula.to_lowercase().contains(&needle)
            })
            .collect()
    }

    /// Distinct classification tags with their counts, first-seen order.
    pub fn classifications(&self) -> Vec<(String, usize)> {
        let mut counts: Vec<(String, usize)> = Vec::new();
        for eq in &self.entries {
            match counts.iter_mut().find(|(tag, _)| *tag == eq.classification) {
                Some((_, n)) => *n += 1,
                None => counts.push((eq.classification.clone(), 1)),
            }
        }
        counts
    }

    pub fn get(&self, id: &str) -> Option<&Equation> {
        self.index.get(id).map(|&pos| &self.entries[pos])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Remove an equation by id, preserving the order of the rest.
    pub fn remove(&mut self, id: &str) -> Option<Equation> {
        let pos = self.index.remove(id)?;
        let removed = self.entries.remove(pos);
        for slot in self.index.values_mut() {
            if *slot > pos {
                *slot -= 1;
            }
        }
        Some(removed)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Equation> {
        self.entries.iter()
    }

    /// Merge another library into this one.
    ///
    /// Every incoming record is validated first; the first invalid one
    /// fails the merge with `self` left untouched. With
    /// [`MergePolicy::Reject`] any collision likewise returns `DuplicateId`
    /// before anything is changed.
    pub fn merge(&mut self, other: Library, policy: MergePolicy) -> CodexResult<MergeReport> {
        for equation in &other.entries {
            equation.validate()?;
        }
        if policy == MergePolicy::Reject {
            if let Some(clash) = other.entries.iter().find(|eq| self.contains(&eq.id)) {
                return Err(CodexError::duplicate_id(&clash.id));
            }
        }

        let mut report = MergeReport::default();
        for equation in other.entries {
            let id = equation.id.clone();
            if !self.contains(&id) {
                self.register(equation);
                report.added.push(id);
            } else if policy == MergePolicy::Overwrite {
                self.register(equation);
                report.replaced.push(id);
            } else {
                report.skipped.push(id);
            }
        }
        Ok(report)
    }
}

impl From<Vec<Equation>> for Library {
    fn from(equations: Vec<Equation>) -> Self {
        equations.into_iter().collect()
    }
}

impl From<Library> for Vec<Equation> {
    fn from(library: Library) -> Self {
        library.entries
    }
}

impl FromIterator<Equation> for Library {
    fn from_iter<I: IntoIterator<Item = Equation>>(iter: I) -> Self {
        let mut library = Library::new();
        for equation in iter {
            library.register(equation);
        }
        library
    }
}

impl<'a> IntoIterator for &'a Library {
    type Item = &'a Equation;
    type IntoIter = std::slice::Iter<'a, Equation>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eq(id: &str, class: &str) -> Equation {
        Equation::new(id, format!("Equação {}", id), "x = y").with_classification(class)
    }

    fn sample() -> Library {
        let mut lib = Library::new();
        lib.register(eq("EQ0003", "Harmonia"));
        lib.register(eq("EQ0001", "Coerência"));
        lib.register(eq("EQ0002", "Harmonia"));
        lib
    }

    #[test]
    fn test_list_preserves_insertion_order() {
        let lib = sample();
        let listed = lib.list();
        let ids: Vec<_> = listed.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["EQ0003", "EQ0001", "EQ0002"]);
    }

    #[test]
    fn test_len_counts_distinct_ids() {
        let mut lib = sample();
        let previous = lib.register(eq("EQ0001", "Ressonância"));

        assert_eq!(previous.unwrap().classification, "Coerência");
        assert_eq!(lib.len(), 3);
        assert_eq!(lib.list().len(), 3);

        // Overwrite keeps the original position
        assert_eq!(lib.list()[1].id, "EQ0001");
        assert_eq!(lib.list()[1].classification, "Ressonância");
    }

    #[test]
    fn test_find_by_classification_is_exact() {
        let mut lib = sample();
        lib.register(eq("EQ0004", "harmonia"));

        let found: Vec<_> = lib.find_by_classification("Harmonia").iter().map(|e| e.id.clone()).collect();
        assert_eq!(found, vec!["EQ0003", "EQ0002"]);
        assert!(lib.find_by_classification("Inexistente").is_empty());
    }

    #[test]
    fn test_try_register_rejects_duplicates_and_invalid() {
        let mut lib = sample();
        let err = lib.try_register(eq("EQ0001", "Outra")).unwrap_err();
        assert_eq!(err, CodexError::duplicate_id("EQ0001"));

        assert!(lib.try_register(Equation::new("", "Sem id", "")).is_err());
        assert!(lib.try_register(eq("EQ0010", "Nova")).is_ok());
        assert_eq!(lib.len(), 4);
    }

    #[test]
    fn test_remove_keeps_index_consistent() {
        let mut lib = sample();
        let removed = lib.remove("EQ0003").unwrap();
        assert_eq!(removed.id, "EQ0003");
        assert!(lib.remove("EQ0003").is_none());

        assert_eq!(lib.get("EQ0002").unwrap().id, "EQ0002");
        assert_eq!(lib.get("EQ0001").unwrap().id, "EQ0001");
        assert_eq!(lib.len(), 2);
    }

    #[test]
    fn test_classifications_counts() {
        let lib = sample();
        assert_eq!(
            lib.classifications(),
            vec![("Harmonia".to_string(), 2), ("Coerência".to_string(), 1)]
        );
    }

    #[test]
    fn test_search_is_case_insensitive() {
        let mut lib = Library::new();
        lib.register(Equation::new("EQ0100", "Campo Toroidal", "T = B / r").with_description("Fluxo do toro"));
        lib.register(Equation::new("EQ0101", "Pulso", "P = E t"));

        assert_eq!(lib.search("toro").len(), 1);
        assert_eq!(lib.search("eq01").len(), 2);
        assert!(lib.search("nada").is_empty());
    }

    #[test]
    fn test_merge_rejects_invalid_records() {
        for bad in [
            Equation::new("", "", ""),
            Equation::new("EQ 9", "Com espaço", ""),
            Equation::new("EQ0009", "  ", ""),
        ] {
            let mut lib = sample();
            let incoming: Library = vec![eq("EQ0005", "Nova"), bad].into();

            let err = lib.merge(incoming, MergePolicy::Overwrite).unwrap_err();
            assert_eq!(err.error_code(), "INVALID_INPUT");
            assert_eq!(lib, sample());
        }
    }

    #[test]
    fn test_merge_keep_existing() {
        let mut lib = sample();
        let incoming: Library = vec![eq("EQ0001", "Nova"), eq("EQ0005", "Nova")].into();

        let report = lib.merge(incoming, MergePolicy::KeepExisting).unwrap();
        assert_eq!(report.added, vec!["EQ0005"]);
        assert_eq!(report.skipped, vec!["EQ0001"]);
        assert_eq!(lib.get("EQ0001").unwrap().classification, "Coerência");
    }

    #[test]
    fn test_merge_overwrite() {
        let mut lib = sample();
        let incoming: Library = vec![eq("EQ0001", "Nova")].into();

        let report = lib.merge(incoming, MergePolicy::Overwrite).unwrap();
        assert_eq!(report.replaced, vec!["EQ0001"]);
        assert_eq!(lib.get("EQ0001").unwrap().classification, "Nova");
    }

    #[test]
    fn test_merge_reject_is_all_or_nothing() {
        let mut lib = sample();
        let incoming: Library = vec![eq("EQ0009", "Nova"), eq("EQ0002", "Nova")].into();

        let err = lib.merge(incoming, MergePolicy::Reject).unwrap_err();
        assert_eq!(err.error_code(), "DUPLICATE_ID");
        assert!(!lib.contains("EQ0009"));
        assert_eq!(lib.len(), 3);
    }

    #[test]
    fn test_serializes_as_ordered_array() {
        let lib = sample();
        let json = serde_json::to_value(&lib).unwrap();
        let ids: Vec<_> = json.as_array().unwrap().iter().map(|v| v["id"].as_str().unwrap()).collect();
        assert_eq!(ids, vec!["EQ0003", "EQ0001", "EQ0002"]);

        let back: Library = serde_json::from_value(json).unwrap();
        assert_eq!(back, lib);
    }

    #[test]
    fn test_deserialize_duplicate_ids_later_wins() {
        let json = r#"[
            {"id": "EQ7", "name": "Primeira"},
            {"id": "EQ8", "name": "Outra"},
            {"id": "EQ7", "name": "Segunda"}
        ]"#;
        let lib: Library = serde_json::from_str(json).unwrap();
        assert_eq!(lib.len(), 2);
        assert_eq!(lib.get("EQ7").unwrap().name, "Segunda");
    }
}
