//! # Equation Records
//!
//! An [`Equation`] is one catalog entry: an identifier, a title, a
//! free-text formula, a description, a classification tag, the variable
//! names it declares and a provenance label.
//!
//! Formulas are display text. They are stored exactly as written
//! (often pseudo-LaTeX) and are never evaluated; see [`crate::symbols`]
//! for the heuristic that compares them against the declared variables.
//!
//! ## Example
//!
//! ```rust
//! use codex_core::equation::Equation;
//!
//! let eq = Equation::new("EQ0001", "Energia de Ressonância", "E_r = \\hbar \\omega")
//!     .with_classification("Ressonância")
//!     .with_variables(["E_r", "hbar", "omega"])
//!     .with_origin("MODULO_29");
//!
//! assert!(eq.validate().is_ok());
//! ```

use serde::{Deserialize, Serialize};

use crate::errors::{CodexError, CodexResult};

/// One catalog entry.
///
/// The Portuguese field names used by older JSON dumps (`nome`,
/// `descricao`, `classificacao`, `variaveis`, `origem`) are accepted when
/// deserializing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Equation {
    /// Catalog code (e.g., "EQ0001", "EQ177-A")
    pub id: String,

    /// Title
    #[serde(alias = "nome")]
    pub name: String,

    /// Formula as written; never parsed as mathematics
    #[serde(default)]
    pub formula: String,

    #[serde(default, alias = "descricao")]
    pub description: String,

    /// Free-text classification tag, compared by exact string equality
    #[serde(default, alias = "classificacao")]
    pub classification: String,

    /// Declared variable names
    #[serde(default, alias = "variaveis")]
    pub variables: Vec<String>,

    /// Provenance label (e.g., "MODULO_44")
    #[serde(default, alias = "origem")]
    pub origin: String,
}

impl Equation {
    /// Create an equation with the required fields; everything else empty.
    pub fn new(id: impl Into<String>, name: impl Into<String>, formula: impl Into<String>) -> Self {
        Equation {
            id: id.into(),
            name: name.into(),
            formula: formula.into(),
            description: String::new(),
            classification: String::new(),
            variables: Vec::new(),
            origin: String::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_classification(mut self, classification: impl Into<String>) -> Self {
        self.classification = classification.into();
        self
    }

    pub fn with_variables<I, S>(mut self, variables: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.variables = variables.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = origin.into();
        self
    }

    /// Check the structural rules enforced on new entries.
    ///
    /// Only the id and name are checked. The formula is free text and is
    /// not compared with `variables`.
    pub fn validate(&self) -> CodexResult<()> {
        if self.id.trim().is_empty() {
            return Err(CodexError::invalid_input("id", &self.id, "Id must not be empty"));
        }
        if self.id.chars().any(char::is_whitespace) {
            return Err(CodexError::invalid_input("id", &self.id, "Id must not contain whitespace"));
        }
        if self.name.trim().is_empty() {
            return Err(CodexError::invalid_input("name", &self.name, "Name must not be empty"));
        }
        Ok(())
    }

    /// One-line display form: `[id] name :: formula`
    pub fn summary_line(&self) -> String {
        if self.formula.is_empty() {
            format!("[{}] {}", self.id, self.name)
        } else {
            format!("[{}] {} :: {}", self.id, self.name, self.formula)
        }
    }
}
