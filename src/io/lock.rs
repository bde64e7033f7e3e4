use std::fs::{self, File, OpenOptions};
use std::io::{Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

pub const LOCK_FILE: &str = ".lock";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);
const RETRY_INTERVAL: Duration = Duration::from_millis(10);

/// Exclusive advisory lock on a data directory, held across one
/// load-mutate-save cycle so concurrent `tp` writers can't lose updates.
///
/// The lock file holds the owner's pid while locked. It is never deleted: a
/// waiter may already have it open, and unlinking it would let a third
/// process lock a different inode.
#[derive(Debug)]
pub struct FileLock {
    file: File,
    path: PathBuf,
}

/// Error type for lock operations
#[derive(Debug, thiserror::Error)]
pub enum LockError {
    #[error("could not open lock file {path}: {source}")]
    CreateError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("timed out waiting for {path}{}", held_by(.holder))]
    Timeout { path: PathBuf, holder: Option<u32> },
}

fn held_by(holder: &Option<u32>) -> String {
    match holder {
        Some(pid) => format!(" (held by pid {})", pid),
        None => String::new(),
    }
}

impl FileLock {
    /// Lock `data_dir`, retrying until `timeout` has passed.
    pub fn acquire(data_dir: &Path, timeout: Duration) -> Result<Self, LockError> {
        let path = data_dir.join(LOCK_FILE);
        let open_err = |path: &Path, source| LockError::CreateError {
            path: path.to_path_buf(),
            source,
        };
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)
            .map_err(|e| open_err(&path, e))?;

        let deadline = Instant::now() + timeout;
        while !try_lock_exclusive(&file).map_err(|e| open_err(&path, e))? {
            if Instant::now() >= deadline {
                let holder = read_holder(&path);
                tracing::warn!(path = %path.display(), ?holder, "timed out waiting for lock");
                return Err(LockError::Timeout { path, holder });
            }
            std::thread::sleep(RETRY_INTERVAL);
        }

        let mut lock = FileLock { file, path };
        lock.record_holder();
        tracing::debug!(path = %lock.path.display(), "lock acquired");
        Ok(lock)
    }

    pub fn acquire_default(data_dir: &Path) -> Result<Self, LockError> {
        Self::acquire(data_dir, DEFAULT_TIMEOUT)
    }

    fn record_holder(&mut self) {
        if let Err(e) = write_pid(&mut self.file) {
            tracing::debug!(error = %e, "could not record lock holder");
        }
    }
}

fn write_pid(file: &mut File) -> Result<(), std::io::Error> {
    file.set_len(0)?;
    file.seek(SeekFrom::Start(0))?;
    write!(file, "{}", std::process::id())?;
    file.flush()
}

impl Drop for FileLock {
    fn drop(&mut self) {
        // the flock itself goes away when `file` closes
        let _ = self.file.set_len(0);
    }
}

fn read_holder(path: &Path) -> Option<u32> {
    fs::read_to_string(path).ok()?.trim().parse().ok()
}

/// Ok(false) when another open file description holds the lock.
#[cfg(unix)]
fn try_lock_exclusive(file: &File) -> Result<bool, std::io::Error> {
    use std::os::unix::io::AsRawFd;
    // SAFETY: the fd belongs to `file`, which outlives the call
    let rc = unsafe { libc::flock(file.as_raw_fd(), libc::LOCK_EX | libc::LOCK_NB) };
    if rc == 0 {
        return Ok(true);
    }
    let err = std::io::Error::last_os_error();
    match err.kind() {
        std::io::ErrorKind::WouldBlock | std::io::ErrorKind::Interrupted => Ok(false),
        _ => Err(err),
    }
}

#[cfg(not(unix))]
fn try_lock_exclusive(_file: &File) -> Result<bool, std::io::Error> {
    Ok(true)
}
