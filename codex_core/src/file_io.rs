//! # File I/O Module
//!
//! Handles archive file operations with safety features:
//! - **Atomic saves**: Write to .tmp, sync, rename to prevent corruption
//! - **File locking**: Prevent two keepers editing the same archive
//! - **Version validation**: Ensure schema compatibility
//!
//! ## File Format
//!
//! Archives are saved as `.cdx` files containing JSON.
//! Lock files use `.cdx.lock` extension with metadata about who holds the lock.
//!
//! Corrupt files are reported, never deleted or reset.
//!
//! ## Example
//!
//! ```rust,no_run
//! use codex_core::archive::Archive;
//! use codex_core::file_io::{save_archive, load_archive, FileLock};
//! use std::path::Path;
//!
//! let archive = Archive::new("Arquivo", "Guardião");
//! let path = Path::new("arquivo.cdx");
//!
//! // Acquire lock before saving
//! let lock = FileLock::acquire(path, "guardiao").unwrap();
//!
//! save_archive(&archive, path).unwrap();
//!
//! // Lock is released when dropped
//! drop(lock);
//! ```

use std::ffi::OsString;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::archive::{Archive, SCHEMA_VERSION};
use crate::errors::{CodexError, CodexResult};

/// Lock file metadata stored in .lock files
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LockInfo {
    /// User identifier (email or username)
    pub user_id: String,
    /// Machine name where lock was acquired
    pub machine: String,
    /// Process ID that holds the lock
    pub pid: u32,
    pub locked_at: DateTime<Utc>,
}

impl LockInfo {
    /// Create new lock info for the current process
    pub fn new(user_id: impl Into<String>) -> Self {
        LockInfo {
            user_id: user_id.into(),
            machine: hostname().unwrap_or_else(|| "unknown".to_string()),
            pid: std::process::id(),
            locked_at: Utc::now(),
        }
    }
}

fn hostname() -> Option<String> {
    #[cfg(windows)]
    {
        std::env::var("COMPUTERNAME").ok()
    }
    #[cfg(not(windows))]
    {
        std::env::var("HOSTNAME")
            .ok()
            .or_else(|| std::env::var("HOST").ok())
    }
}

/// File lock guard that releases the lock when dropped.
///
/// Uses both:
/// 1. OS-level file locking (via fs2) for process safety
/// 2. .lock file with metadata for user visibility
pub struct FileLock {
    target_path: PathBuf,
    lock_path: PathBuf,
    /// Keeps the OS lock alive
    _lock_file: File,
    pub info: LockInfo,
}

impl FileLock {
    /// Acquire an exclusive lock on a file.
    ///
    /// Returns `CodexError::FileLocked` when a live lock is held elsewhere.
    /// Stale locks (dead process on this machine, or older than 24 hours)
    /// are taken over.
    pub fn acquire(path: &Path, user_id: impl Into<String>) -> CodexResult<Self> {
        let lock_path = lock_path_for(path);
        let info = LockInfo::new(user_id);

        if lock_path.exists() {
            if let Ok(existing) = read_lock_info(&lock_path) {
                if !is_lock_stale(&existing) {
                    return Err(CodexError::file_locked(
                        path.display().to_string(),
                        format!("{} ({})", existing.user_id, existing.machine),
                        existing.locked_at.to_rfc3339(),
                    ));
                }
                warn!(
                    path = %path.display(),
                    holder = %existing.user_id,
                    "taking over stale lock"
                );
            }
        }

        let mut lock_file = OpenOptions::new()
            .write(true)
            .read(true)
            .create(true)
            .truncate(true)
            .open(&lock_path)
            .map_err(|e| {
                CodexError::file_error("create lock", lock_path.display().to_string(), e.to_string())
            })?;

        // Non-blocking; another process in the same window loses
        lock_file.try_lock_exclusive().map_err(|_| {
            CodexError::file_locked(
                path.display().to_string(),
                "another process".to_string(),
                "unknown".to_string(),
            )
        })?;

        let lock_json = serde_json::to_string_pretty(&info).map_err(CodexError::serialization)?;

        lock_file.write_all(lock_json.as_bytes()).map_err(|e| {
            CodexError::file_error("write lock", lock_path.display().to_string(), e.to_string())
        })?;

        lock_file.sync_all().map_err(|e| {
            CodexError::file_error("sync lock", lock_path.display().to_string(), e.to_string())
        })?;

        debug!(path = %path.display(), user = %info.user_id, "lock acquired");

        Ok(FileLock {
            target_path: path.to_path_buf(),
            lock_path,
            _lock_file: lock_file,
            info,
        })
    }

    /// Check if a file is locked without acquiring the lock.
    ///
    /// Returns `Some(LockInfo)` if locked, `None` if available.
    pub fn check(path: &Path) -> Option<LockInfo> {
        let lock_path = lock_path_for(path);
        if lock_path.exists() {
            if let Ok(info) = read_lock_info(&lock_path) {
                if !is_lock_stale(&info) {
                    return Some(info);
                }
            }
        }
        None
    }

    /// Path of the file this lock guards
    pub fn target_path(&self) -> &Path {
        &self.target_path
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        // OS lock is released when _lock_file is dropped
        let _ = fs::remove_file(&self.lock_path);
    }
}

/// `archive.cdx` -> `archive.cdx.lock`
fn lock_path_for(path: &Path) -> PathBuf {
    sibling_with_suffix(path, ".lock")
}

/// Append a suffix to the full file name (`a.json` + `.tmp` -> `a.json.tmp`).
pub(crate) fn sibling_with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name: OsString = path.file_name().map(OsString::from).unwrap_or_default();
    name.push(suffix);
    path.with_file_name(name)
}

fn read_lock_info(lock_path: &Path) -> CodexResult<LockInfo> {
    let contents = fs::read_to_string(lock_path).map_err(|e| {
        CodexError::file_error("read lock", lock_path.display().to_string(), e.to_string())
    })?;

    serde_json::from_str(&contents).map_err(CodexError::serialization)
}

/// Check if a lock is stale (the process that created it is no longer running)
fn is_lock_stale(info: &LockInfo) -> bool {
    if let Some(our_machine) = hostname() {
        if info.machine == our_machine {
            #[cfg(windows)]
            {
                use std::process::Command;
                let output = Command::new("tasklist")
                    .args(["/FI", &format!("PID eq {}", info.pid), "/NH"])
                    .output();
                if let Ok(output) = output {
                    let stdout = String::from_utf8_lossy(&output.stdout);
                    if stdout.contains("No tasks") || !stdout.contains(&info.pid.to_string()) {
                        return true;
                    }
                }
            }
            #[cfg(unix)]
            {
                if fs::metadata(format!("/proc/{}", info.pid)).is_err() {
                    return true;
                }
            }
        }
    }

    let age = Utc::now() - info.locked_at;
    age.num_hours() > 24
}

/// Serialize `value` as pretty JSON and write it atomically.
///
/// 1. Write to `<path>.tmp`
/// 2. Sync to disk (fsync)
/// 3. Rename over `path` (atomic on most filesystems)
pub fn write_json_atomic<T: Serialize>(value: &T, path: &Path) -> CodexResult<()> {
    let json = serde_json::to_string_pretty(value).map_err(CodexError::serialization)?;

    let tmp_path = sibling_with_suffix(path, ".tmp");

    let mut tmp_file = File::create(&tmp_path).map_err(|e| {
        CodexError::file_error("create temp file", tmp_path.display().to_string(), e.to_string())
    })?;

    tmp_file.write_all(json.as_bytes()).map_err(|e| {
        CodexError::file_error("write temp file", tmp_path.display().to_string(), e.to_string())
    })?;

    tmp_file.sync_all().map_err(|e| {
        CodexError::file_error("sync temp file", tmp_path.display().to_string(), e.to_string())
    })?;

    fs::rename(&tmp_path, path).map_err(|e| {
        let _ = fs::remove_file(&tmp_path);
        CodexError::file_error("rename to final", path.display().to_string(), e.to_string())
    })?;

    debug!(path = %path.display(), bytes = json.len(), "saved");
    Ok(())
}

/// Save an archive with atomic write semantics.
pub fn save_archive(archive: &Archive, path: &Path) -> CodexResult<()> {
    write_json_atomic(archive, path)
}

/// Load an archive from a file.
///
/// # Returns
///
/// * `Err(CodexError::VersionMismatch)` - File version is incompatible
/// * `Err(CodexError::SerializationError)` - Invalid JSON
/// * `Err(CodexError::FileError)` - I/O error
pub fn load_archive(path: &Path) -> CodexResult<Archive> {
    let contents = fs::read_to_string(path)
        .map_err(|e| CodexError::file_error("read", path.display().to_string(), e.to_string()))?;

    let archive: Archive = serde_json::from_str(&contents).map_err(|e| CodexError::SerializationError {
        reason: format!("Invalid JSON in {}: {}", path.display(), e),
    })?;

    validate_version(&archive.meta.version)?;

    debug!(
        path = %path.display(),
        equations = archive.equations.len(),
        members = archive.members.len(),
        "loaded archive"
    );
    Ok(archive)
}

/// Load an archive, also reporting whether someone else holds its lock.
pub fn load_archive_with_lock_check(path: &Path) -> CodexResult<(Archive, Option<LockInfo>)> {
    let archive = load_archive(path)?;
    let lock_info = FileLock::check(path);
    Ok((archive, lock_info))
}

/// Validate that a file version is compatible with the current schema.
fn validate_version(file_version: &str) -> CodexResult<()> {
    let mismatch = || CodexError::VersionMismatch {
        file_version: file_version.to_string(),
        expected_version: SCHEMA_VERSION.to_string(),
    };

    let file_parts: Vec<u32> = file_version
        .split('.')
        .filter_map(|p| p.parse().ok())
        .collect();
    let current_parts: Vec<u32> = SCHEMA_VERSION
        .split('.')
        .filter_map(|p| p.parse().ok())
        .collect();

    if file_parts.is_empty() || current_parts.is_empty() {
        return Err(mismatch());
    }

    if file_parts[0] != current_parts[0] {
        return Err(mismatch());
    }

    // 0.x: a newer minor may carry breaking changes
    if current_parts[0] == 0
        && file_parts.len() > 1
        && current_parts.len() > 1
        && file_parts[1] > current_parts[1]
    {
        return Err(mismatch());
    }

    Ok(())
}
