//! # Archive Document
//!
//! The `Archive` struct is the root container persisted to `.cdx` files as
//! human-readable JSON.
//!
//! ## Structure
//!
//! ```text
//! Archive
//! ├── meta: ArchiveMetadata (version, title, keeper, timestamps)
//! ├── equations: Library (insertion-ordered equation registry)
//! └── members: HashMap<Uuid, Member> (lineage of keepers)
//! ```
//!
//! ## Example
//!
//! ```rust
//! use codex_core::archive::Archive;
//! use codex_core::equation::Equation;
//!
//! let mut archive = Archive::new("Biblioteca Central", "Guardião");
//! archive.add_equation(Equation::new("EQ0001", "Energia", "E = m c^2")).unwrap();
//!
//! let json = serde_json::to_string_pretty(&archive).unwrap();
//! assert!(json.contains("EQ0001"));
//! ```

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::catalog;
use crate::equation::Equation;
use crate::errors::{CodexError, CodexResult};
use crate::registry::Library;

/// Current schema version for .cdx files
pub const SCHEMA_VERSION: &str = "0.1.0";

/// Root archive container.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Archive {
    pub meta: ArchiveMetadata,

    /// Registered equations, in insertion order
    pub equations: Library,

    /// Lineage members, keyed by UUID
    #[serde(default)]
    pub members: HashMap<Uuid, Member>,
}

impl Archive {
    /// Create a new empty archive.
    ///
    /// ```rust
    /// use codex_core::archive::Archive;
    ///
    /// let archive = Archive::new("Arquivo", "Guardião");
    /// assert_eq!(archive.meta.keeper, "Guardião");
    /// assert!(archive.equations.is_empty());
    /// ```
    pub fn new(title: impl Into<String>, keeper: impl Into<String>) -> Self {
        let now = Utc::now();
        Archive {
            meta: ArchiveMetadata {
                version: SCHEMA_VERSION.to_string(),
                title: title.into(),
                keeper: keeper.into(),
                created: now,
                modified: now,
            },
            equations: Library::new(),
            members: HashMap::new(),
        }
    }

    /// Create an archive pre-filled with the builtin catalog.
    pub fn seeded(title: impl Into<String>, keeper: impl Into<String>) -> Self {
        let mut archive = Archive::new(title, keeper);
        archive.equations = catalog::builtin().clone();
        archive
    }

    /// Validate and register an equation.
    ///
    /// Returns the record it replaced when the id was already present.
    pub fn add_equation(&mut self, equation: Equation) -> CodexResult<Option<Equation>> {
        equation.validate()?;
        let previous = self.equations.register(equation);
        self.touch();
        Ok(previous)
    }

    /// Remove an equation by id.
    pub fn remove_equation(&mut self, id: &str) -> CodexResult<Equation> {
        let removed = self
            .equations
            .remove(id)
            .ok_or_else(|| CodexError::equation_not_found(id))?;
        self.touch();
        Ok(removed)
    }

    /// Add a lineage member. Returns the UUID assigned to it.
    pub fn add_member(&mut self, name: impl Into<String>, role: impl Into<String>) -> Uuid {
        let id = Uuid::new_v4();
        self.members.insert(id, Member::new(name, role));
        self.touch();
        id
    }

    /// Remove a lineage member by UUID.
    pub fn remove_member(&mut self, id: &Uuid) -> CodexResult<Member> {
        let member = self
            .members
            .remove(id)
            .ok_or_else(|| CodexError::member_not_found(id.to_string()))?;
        self.touch();
        Ok(member)
    }

    /// Members ordered by join date, then name.
    pub fn members_sorted(&self) -> Vec<(&Uuid, &Member)> {
        let mut members: Vec<_> = self.members.iter().collect();
        members.sort_by(|(_, a), (_, b)| a.joined.cmp(&b.joined).then_with(|| a.name.cmp(&b.name)));
        members
    }

    /// Update the modified timestamp.
    pub fn touch(&mut self) {
        self.meta.modified = Utc::now();
    }
}

impl Default for Archive {
    fn default() -> Self {
        Archive::new("", "")
    }
}

/// Archive metadata stored in the file header.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchiveMetadata {
    /// Schema version (for migration compatibility)
    pub version: String,

    pub title: String,

    /// Person responsible for the archive
    pub keeper: String,

    pub created: DateTime<Utc>,

    pub modified: DateTime<Utc>,
}

/// A member of the lineage registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub name: String,
    pub role: String,
    pub joined: DateTime<Utc>,
}

impl Member {
    pub fn new(name: impl Into<String>, role: impl Into<String>) -> Self {
        Member {
            name: name.into(),
            role: role.into(),
            joined: Utc::now(),
        }
    }
}
