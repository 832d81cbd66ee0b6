//! Advisory file locks for the game instance and the score file
//!
//! Two backends share one contract: an exclusive `flock(2)` on a lock file
//! that is kept around, or the classic hard link that exists only while the
//! lock is held. Either way acquisition polls a bounded number of times and
//! the returned guard releases on drop.

use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU32, Ordering};
use std::thread;
use std::time::Duration;

use fs2::FileExt;
use strum::{Display, EnumString};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Error, Debug)]
pub enum LockError {
    #[error("Cannot {what} - lock timeout. If no other game is running, try: rm {}", .path.display())]
    Timeout { what: &'static str, path: PathBuf },

    #[error("Cannot lock {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum LockBackend {
    #[default]
    Flock,
    Link,
}

/// How long to keep trying before giving up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockPolicy {
    pub attempts: u32,
    pub interval: Duration,
}

impl LockPolicy {
    /// The single-instance lock
    pub const GAME: LockPolicy = LockPolicy {
        attempts: 10,
        interval: Duration::from_secs(1),
    };

    /// Score file updates are short
    pub const RECORD: LockPolicy = LockPolicy {
        attempts: 5,
        interval: Duration::from_millis(100),
    };
}

/// A held lock. Dropping it releases the lock.
#[derive(Debug)]
pub struct LockGuard {
    path: PathBuf,
    backend: LockBackend,
    file: Option<File>,
    held: bool,
}

impl LockGuard {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn backend(&self) -> LockBackend {
        self.backend
    }

    pub fn is_held(&self) -> bool {
        self.held
    }

    /// Release the lock. Calling it again does nothing.
    pub fn release(&mut self) -> Result<(), LockError> {
        if !self.held {
            return Ok(());
        }
        self.held = false;
        match self.backend {
            LockBackend::Flock => {
                if let Some(file) = self.file.take() {
                    FileExt::unlock(&file).map_err(|e| io_error(&self.path, e))?;
                }
            }
            LockBackend::Link => match fs::remove_file(&self.path) {
                Ok(()) => {}
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => return Err(io_error(&self.path, e)),
            },
        }
        debug!(path = %self.path.display(), "lock released");
        Ok(())
    }
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        if let Err(e) = self.release() {
            warn!("{e}");
        }
    }
}

fn io_error(path: &Path, source: io::Error) -> LockError {
    LockError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Take the lock at `path`, polling per `policy`.
///
/// `what` names the operation in the timeout message ("start game").
pub fn acquire(
    path: &Path,
    backend: LockBackend,
    policy: LockPolicy,
    what: &'static str,
) -> Result<LockGuard, LockError> {
    for attempt in 0..policy.attempts.max(1) {
        let file = match backend {
            LockBackend::Flock => try_flock(path)?,
            LockBackend::Link => try_link(path)?.map(|()| None),
        };
        if let Some(file) = file {
            debug!(path = %path.display(), %backend, attempt, "lock acquired");
            return Ok(LockGuard {
                path: path.to_path_buf(),
                backend,
                file,
                held: true,
            });
        }
        if attempt + 1 < policy.attempts {
            thread::sleep(policy.interval);
        }
    }
    warn!(path = %path.display(), what, "lock timeout");
    Err(LockError::Timeout {
        what,
        path: path.to_path_buf(),
    })
}

/// `Some(Some(file))` once locked, `None` while someone else holds it
fn try_flock(path: &Path) -> Result<Option<Option<File>>, LockError> {
    let file = OpenOptions::new()
        .create(true)
        .truncate(false)
        .read(true)
        .write(true)
        .open(path)
        .map_err(|e| io_error(path, e))?;
    match FileExt::try_lock_exclusive(&file) {
        Ok(()) => Ok(Some(Some(file))),
        Err(e) if e.kind() == fs2::lock_contended_error().kind() => Ok(None),
        Err(e) => Err(io_error(path, e)),
    }
}

static LINK_SERIAL: AtomicU32 = AtomicU32::new(0);

/// Link a private file onto `path`; the link fails while the lock is held
fn try_link(path: &Path) -> Result<Option<()>, LockError> {
    let serial = LINK_SERIAL.fetch_add(1, Ordering::Relaxed);
    let mut private = path.as_os_str().to_owned();
    private.push(format!(".{}.{}", std::process::id(), serial));
    let private = PathBuf::from(private);
    File::create(&private).map_err(|e| io_error(&private, e))?;
    let linked = fs::hard_link(&private, path);
    let _ = fs::remove_file(&private);
    match linked {
        Ok(()) => Ok(Some(())),
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => Ok(None),
        Err(e) => Err(io_error(path, e)),
    }
}
