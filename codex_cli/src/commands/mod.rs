pub mod equations;
pub mod ledger;
pub mod members;

use crate::config::Config;
use crate::error::Result;
use codex_core::file_io::{load_archive_with_lock_check, save_archive};
use codex_core::{Archive, FileLock, LedgerFile};
use serde_json::Value;
use tracing::{debug, warn};

/// Settings shared by every command.
pub struct Context {
    pub config: Config,
}

impl Context {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Load the archive for reading.
    pub fn load_archive(&self) -> Result<Archive> {
        let (archive, lock) = load_archive_with_lock_check(&self.config.archive_path)?;
        if let Some(info) = lock {
            warn!(
                "Archive is being edited by {} ({}) since {}; showing the last saved state",
                info.user_id, info.machine, info.locked_at
            );
        }
        Ok(archive)
    }

    /// Open the ledger events will be appended to, or `None` when event
    /// recording is disabled.
    ///
    /// The chain is verified here, before any archive change is made.
    pub fn open_ledger(&self) -> Result<Option<LedgerFile>> {
        if !self.config.record_events {
            debug!("Event recording disabled");
            return Ok(None);
        }
        Ok(Some(LedgerFile::open(&self.config.ledger_path)?))
    }

    /// Append an event, tagged with the current user.
    pub fn record(&self, ledger: Option<&mut LedgerFile>, event: &str, mut payload: Value) -> Result<()> {
        let Some(ledger) = ledger else {
            debug!("Skipping '{}'", event);
            return Ok(());
        };
        if let Value::Object(map) = &mut payload {
            map.insert("user".to_string(), Value::String(self.config.user.clone()));
        }
        ledger.append(event, payload)?;
        Ok(())
    }

    /// Lock, load, modify and save the archive, then record `event` with
    /// the payload returned by `f`.
    ///
    /// The ledger is opened first. Nothing is written when it is unusable
    /// or when `f` fails.
    pub fn with_archive_mut<T>(
        &self,
        event: &str,
        f: impl FnOnce(&mut Archive) -> Result<(T, Value)>,
    ) -> Result<T> {
        let mut ledger = self.open_ledger()?;

        let path = &self.config.archive_path;
        let lock = FileLock::acquire(path, &self.config.user)?;
        let (mut archive, _) = load_archive_with_lock_check(path)?;
        let (value, payload) = f(&mut archive)?;
        save_archive(&archive, lock.target_path())?;
        debug!("Archive saved to {:?}", lock.target_path());

        self.record(ledger.as_mut(), event, payload)?;
        Ok(value)
    }
}
