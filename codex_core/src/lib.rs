//! # codex_core - Equation Catalog Engine
//!
//! `codex_core` holds a catalog of descriptive "equations" (identifier,
//! title, formula text, description, classification, variables, origin),
//! the archive document that persists it, and the Veritas ledger, a
//! SHA-256 hash chain of events.
//!
//! ## Design Philosophy
//!
//! - **One registry**: every catalog is a [`Library`] loaded from JSON data
//! - **JSON-First**: all types implement Serialize/Deserialize
//! - **Rich Errors**: structured error types, not just strings
//! - **Formulas are text**: stored and displayed, never evaluated
//!
//! ## Quick Start
//!
//! ```rust
//! use codex_core::catalog;
//!
//! let library = catalog::builtin();
//! for eq in library.find_by_classification("Energia") {
//!     println!("{}", eq.summary_line());
//! }
//! ```
//!
//! ## Modules
//!
//! - [`equation`] - The equation record
//! - [`registry`] - Insertion-ordered library with lookups and merging
//! - [`symbols`] - Heuristic symbol scan of formula text
//! - [`catalog`] - Catalog JSON files and the builtin catalog
//! - [`archive`] - Persisted archive document (equations + members)
//! - [`file_io`] - Atomic saves, locking and version checks
//! - [`ledger`] - Hash-chained event ledger
//! - [`report`] - Markdown and demo renderings
//! - [`errors`] - Structured error types

pub mod archive;
pub mod catalog;
pub mod equation;
pub mod errors;
pub mod file_io;
pub mod ledger;
pub mod registry;
pub mod report;
pub mod symbols;

// Re-export commonly used types at crate root for convenience
pub use archive::{Archive, ArchiveMetadata, Member};
pub use equation::Equation;
pub use errors::{CodexError, CodexResult};
pub use file_io::{load_archive, save_archive, FileLock};
pub use ledger::{Block, Ledger, LedgerFile};
pub use registry::{Library, MergePolicy, MergeReport};
