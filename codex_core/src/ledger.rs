//! # Veritas Ledger
//!
//! Append-only event log where every block carries the SHA-256 hash of
//! its predecessor.
//!
//! ## Block hash
//!
//! The hash is the lowercase hex SHA-256 of the compact JSON object
//! `{event, index, payload, prev_hash, timestamp}` with keys sorted at
//! every level. Timestamps are RFC 3339 UTC with microsecond precision.
//! The genesis block links to [`GENESIS_PREV_HASH`] (64 zeros).
//!
//! ## Example
//!
//! ```rust
//! use codex_core::ledger::Ledger;
//! use serde_json::json;
//!
//! let mut ledger = Ledger::new();
//! ledger.append("add_eq", json!({"id": "EQ0001"})).unwrap();
//! ledger.append("add_member", json!({"name": "Helena"})).unwrap();
//!
//! assert_eq!(ledger.blocks()[1].prev_hash, ledger.blocks()[0].hash);
//! assert!(ledger.verify().is_ok());
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, SecondsFormat, SubsecRound, Timelike, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};

use crate::errors::{CodexError, CodexResult};
use crate::file_io::{sibling_with_suffix, write_json_atomic};

/// `prev_hash` of the first block
pub const GENESIS_PREV_HASH: &str = "0000000000000000000000000000000000000000000000000000000000000000";

/// One ledger entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub index: u64,
    pub prev_hash: String,
    pub timestamp: DateTime<Utc>,
    pub event: String,
    pub payload: Value,
    pub hash: String,
}

impl Block {
    fn seal(index: u64, prev_hash: String, timestamp: DateTime<Utc>, event: String, payload: Value) -> CodexResult<Self> {
        let mut block = Block {
            index,
            prev_hash,
            timestamp,
            event,
            payload,
            hash: String::new(),
        };
        block.hash = block.compute_hash()?;
        Ok(block)
    }

    /// Recompute the hash from the block contents (ignores `self.hash`).
    pub fn compute_hash(&self) -> CodexResult<String> {
        let body = sorted_keys(&json!({
            "index": self.index,
            "prev_hash": self.prev_hash,
            "timestamp": self.timestamp.to_rfc3339_opts(SecondsFormat::Micros, true),
            "event": self.event,
            "payload": self.payload,
        }));
        let bytes = serde_json::to_vec(&body).map_err(CodexError::serialization)?;
        Ok(hex::encode(Sha256::digest(&bytes)))
    }
}

/// Rebuild objects with their keys in sorted order, recursively.
fn sorted_keys(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            let mut sorted = Map::new();
            for key in keys {
                sorted.insert(key.clone(), sorted_keys(&map[key.as_str()]));
            }
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.iter().map(sorted_keys).collect()),
        other => other.clone(),
    }
}

/// In-memory hash chain.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ledger {
    blocks: Vec<Block>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an event, linking it to the current head.
    pub fn append(&mut self, event: impl Into<String>, payload: Value) -> CodexResult<&Block> {
        let event = event.into();
        if event.trim().is_empty() {
            return Err(CodexError::invalid_input("event", event, "Event name must not be empty"));
        }

        let prev_hash = self
            .blocks
            .last()
            .map(|b| b.hash.clone())
            .unwrap_or_else(|| GENESIS_PREV_HASH.to_string());
        let index = self.blocks.len() as u64;
        let block = Block::seal(index, prev_hash, Utc::now().trunc_subsecs(6), event, payload)?;

        debug!(index, event = %block.event, hash = %block.hash, "appended block");
        self.blocks.push(block);
        Ok(&self.blocks[self.blocks.len() - 1])
    }

    /// Replay the chain and check indices, links and hashes.
    ///
    /// Timestamps finer than a microsecond are rejected, since the hash
    /// only covers microseconds.
    ///
    /// Reports the first broken block.
    pub fn verify(&self) -> CodexResult<()> {
        let mut expected_prev = GENESIS_PREV_HASH;

        for (position, block) in self.blocks.iter().enumerate() {
            let position = position as u64;
            if block.index != position {
                return Err(CodexError::chain_broken(
                    position,
                    format!("index is {}, expected {}", block.index, position),
                ));
            }
            if block.prev_hash != expected_prev {
                return Err(CodexError::chain_broken(
                    position,
                    "prev_hash does not match the previous block's hash",
                ));
            }
            if block.timestamp.nanosecond() % 1_000 != 0 {
                return Err(CodexError::chain_broken(
                    position,
                    "timestamp has more than microsecond precision",
                ));
            }
            if block.compute_hash()? != block.hash {
                return Err(CodexError::chain_broken(position, "stored hash does not match block contents"));
            }
            expected_prev = block.hash.as_str();
        }
        Ok(())
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn last(&self) -> Option<&Block> {
        self.blocks.last()
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn find_by_event(&self, event: &str) -> Vec<&Block> {
        self.blocks.iter().filter(|b| b.event == event).collect()
    }
}

/// Read a ledger file without verifying it.
pub fn load_ledger(path: &Path) -> CodexResult<Ledger> {
    let contents = fs::read_to_string(path)
        .map_err(|e| CodexError::file_error("read", path.display().to_string(), e.to_string()))?;
    serde_json::from_str(&contents).map_err(|e| CodexError::SerializationError {
        reason: format!("Invalid JSON in {}: {}", path.display(), e),
    })
}

/// Write a ledger file atomically.
pub fn save_ledger(ledger: &Ledger, path: &Path) -> CodexResult<()> {
    write_json_atomic(ledger, path)
}

/// A ledger bound to a file; every append rewrites the file.
#[derive(Debug)]
pub struct LedgerFile {
    path: PathBuf,
    ledger: Ledger,
}

impl LedgerFile {
    /// Open a ledger file, verifying the stored chain.
    ///
    /// A missing file starts an empty ledger. Corrupt JSON and broken
    /// chains are errors.
    pub fn open(path: &Path) -> CodexResult<Self> {
        let ledger = if path.exists() {
            let ledger = load_ledger(path)?;
            ledger.verify()?;
            ledger
        } else {
            debug!(path = %path.display(), "no ledger file, starting empty");
            Ledger::new()
        };
        Ok(LedgerFile {
            path: path.to_path_buf(),
            ledger,
        })
    }

    /// Like [`LedgerFile::open`], but a file with invalid JSON is renamed
    /// to `<name>.corrupt-<timestamp>` and an empty ledger is started.
    ///
    /// A broken chain in a well-formed file is still an error.
    pub fn open_or_quarantine(path: &Path) -> CodexResult<Self> {
        match Self::open(path) {
            Err(CodexError::SerializationError { reason }) => {
                let stamp = Utc::now().format("%Y%m%dT%H%M%S%.6fZ");
                let quarantine = sibling_with_suffix(path, &format!(".corrupt-{}", stamp));
                fs::rename(path, &quarantine).map_err(|e| {
                    CodexError::file_error("quarantine", path.display().to_string(), e.to_string())
                })?;
                warn!(
                    path = %path.display(),
                    moved_to = %quarantine.display(),
                    %reason,
                    "corrupt ledger moved aside, starting a new chain"
                );
                Ok(LedgerFile {
                    path: path.to_path_buf(),
                    ledger: Ledger::new(),
                })
            }
            other => other,
        }
    }

    /// Append an event and persist the whole chain.
    pub fn append(&mut self, event: impl Into<String>, payload: Value) -> CodexResult<&Block> {
        self.ledger.append(event, payload)?;
        save_ledger(&self.ledger, &self.path)?;
        let block = &self.ledger.blocks()[self.ledger.len() - 1];
        info!(index = block.index, event = %block.event, "ledger event recorded");
        Ok(block)
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }
}
