//! JSON-lines log store
//!
//! One `<stream>.jsonl` file per stream under a directory, one [`RecordedEvent`] per
//! line. Appends take a `<stream>.jsonl.lock` file created exclusively, check the
//! expected position against the file's last line, write every event, then fsync
//! before releasing the lock. A torn final line left by a crash is skipped on read
//! and overwritten by the next append.
//!
//! `read_last` and the append precondition only read the file backwards from its end,
//! so their cost does not grow with the stream. A lock file whose recorded writer is
//! no longer running is removed and taken over.

use super::store::{ExpectedPosition, LogStore, NewEvent, RecordedEvent};
use crate::domain::{CobsError, Result};
use async_trait::async_trait;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Bytes read per step when scanning back from the end of a stream
const TAIL_CHUNK: u64 = 8 * 1024;

/// Age after which a lock file without a readable pid counts as abandoned
const UNREADABLE_LOCK_GRACE: Duration = Duration::from_secs(30);

/// File-backed log store
#[derive(Debug, Clone)]
pub struct JsonlLogStore {
    directory: PathBuf,
}

impl JsonlLogStore {
    /// Opens a store directory, creating it if needed
    pub fn open(directory: impl Into<PathBuf>) -> Result<Self> {
        let directory = directory.into();
        fs::create_dir_all(&directory).map_err(|e| {
            CobsError::Access(format!(
                "failed to open log directory '{}': {e}",
                directory.display()
            ))
        })?;
        Ok(Self { directory })
    }

    /// Path of a stream's file
    pub fn stream_path(&self, stream: &str) -> PathBuf {
        self.directory.join(format!("{stream}.jsonl"))
    }

    async fn blocking<T, F>(&self, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(JsonlLogStore) -> Result<T> + Send + 'static,
    {
        let store = self.clone();
        tokio::task::spawn_blocking(move || f(store))
            .await
            .map_err(|e| CobsError::Io(format!("log store task failed: {e}")))?
    }

    fn read_sync(&self, stream: &str) -> Result<Option<StreamFile>> {
        let path = self.stream_path(stream);
        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(access(&path, e)),
        };
        parse_stream(&path, &contents).map(Some)
    }

    fn read_tail_sync(&self, stream: &str) -> Result<Option<StreamTail>> {
        let path = self.stream_path(stream);
        let file = match File::open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(access(&path, e)),
        };
        read_tail(&path, file).map(Some)
    }

    fn append_sync(
        &self,
        stream: &str,
        expected: ExpectedPosition,
        events: Vec<NewEvent>,
    ) -> Result<u64> {
        let path = self.stream_path(stream);
        let _lock = StreamLock::acquire(&path)?;

        let existing = self.read_tail_sync(stream)?;
        let current = existing
            .as_ref()
            .and_then(|tail| tail.last.as_ref())
            .map(|event| event.position);
        expected.check(stream, current)?;

        if events.is_empty() {
            return Ok(current.unwrap_or_default());
        }

        let mut next = current.map_or(0, |p| p + 1);
        let mut lines = String::new();
        for event in events {
            lines.push_str(&serde_json::to_string(&RecordedEvent::record(event, next))?);
            lines.push('\n');
            next += 1;
        }

        let created = existing.is_none();
        let mut file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(&path)
            .map_err(|e| access(&path, e))?;

        // Drop a torn tail before appending.
        let valid_len = existing.map_or(0, |tail| tail.valid_len);
        file.set_len(valid_len).map_err(|e| access(&path, e))?;
        file.seek(SeekFrom::Start(valid_len))
            .map_err(|e| access(&path, e))?;

        file.write_all(lines.as_bytes())
            .map_err(|e| access(&path, e))?;
        file.sync_all().map_err(|e| access(&path, e))?;
        if created {
            fsync_dir(&self.directory)?;
        }

        Ok(next - 1)
    }
}

#[async_trait]
impl LogStore for JsonlLogStore {
    async fn read_stream(&self, stream: &str) -> Result<Option<Vec<RecordedEvent>>> {
        let stream = stream.to_string();
        let file = self.blocking(move |store| store.read_sync(&stream)).await?;
        Ok(file.map(|f| f.events))
    }

    async fn read_last(&self, stream: &str) -> Result<Option<RecordedEvent>> {
        let stream = stream.to_string();
        let tail = self
            .blocking(move |store| store.read_tail_sync(&stream))
            .await?;
        Ok(tail.and_then(|tail| tail.last))
    }

    async fn append(
        &self,
        stream: &str,
        expected: ExpectedPosition,
        events: Vec<NewEvent>,
    ) -> Result<u64> {
        let stream = stream.to_string();
        let count = events.len();
        let last = self
            .blocking(move |store| store.append_sync(&stream, expected, events))
            .await?;
        tracing::trace!(events = count, last_position = last, "Appended to log");
        Ok(last)
    }
}

struct StreamFile {
    events: Vec<RecordedEvent>,
    /// Byte length of the complete, parseable lines
    valid_len: u64,
}

fn parse_stream(path: &Path, contents: &str) -> Result<StreamFile> {
    let mut events = Vec::new();
    let mut valid_len = 0u64;
    let mut lines = contents.split_inclusive('\n').enumerate().peekable();

    while let Some((number, line)) = lines.next() {
        // An unterminated final line is an append that never completed.
        if lines.peek().is_none() && !line.ends_with('\n') {
            tracing::warn!(
                path = %path.display(),
                line = number + 1,
                "Skipping torn final log line"
            );
            break;
        }

        let event = serde_json::from_str::<RecordedEvent>(line.trim_end()).map_err(|e| {
            CobsError::Access(format!(
                "corrupt log '{}' at line {}: {e}",
                path.display(),
                number + 1
            ))
        })?;
        events.push(event);
        valid_len += line.len() as u64;
    }

    Ok(StreamFile { events, valid_len })
}

/// The last complete line of a stream file
struct StreamTail {
    last: Option<RecordedEvent>,
    /// Byte length up to and including the last complete line
    valid_len: u64,
}

/// Scans back from the end of the file for the last newline-terminated line
///
/// Bytes after the last newline are a torn append and are left out of `valid_len`.
fn read_tail(path: &Path, mut file: File) -> Result<StreamTail> {
    let len = file.metadata().map_err(|e| access(path, e))?.len();

    // `buffer` holds the file from `start` to `len`.
    let mut buffer: Vec<u8> = Vec::new();
    let mut start = len;
    let mut line_end: Option<usize> = None;

    loop {
        if line_end.is_none() {
            line_end = buffer.iter().rposition(|&b| b == b'\n');
        }
        if let Some(end) = line_end {
            let line_start = buffer[..end]
                .iter()
                .rposition(|&b| b == b'\n')
                .map(|i| i + 1);
            if let Some(line_start) = line_start.or((start == 0).then_some(0)) {
                let valid_len = start + end as u64 + 1;
                if valid_len < len {
                    tracing::warn!(
                        path = %path.display(),
                        torn_bytes = len - valid_len,
                        "Skipping torn final log line"
                    );
                }
                let event = serde_json::from_slice::<RecordedEvent>(&buffer[line_start..end])
                    .map_err(|e| {
                        CobsError::Access(format!(
                            "corrupt log '{}' at byte {}: {e}",
                            path.display(),
                            start + line_start as u64
                        ))
                    })?;
                return Ok(StreamTail {
                    last: Some(event),
                    valid_len,
                });
            }
        }

        if start == 0 {
            if len > 0 {
                tracing::warn!(path = %path.display(), "Skipping torn final log line");
            }
            return Ok(StreamTail {
                last: None,
                valid_len: 0,
            });
        }

        let step = TAIL_CHUNK.min(start);
        start -= step;
        let mut chunk = vec![0u8; step as usize];
        file.seek(SeekFrom::Start(start))
            .and_then(|_| file.read_exact(&mut chunk))
            .map_err(|e| access(path, e))?;
        if let Some(end) = line_end.as_mut() {
            *end += chunk.len();
        }
        chunk.extend_from_slice(&buffer);
        buffer = chunk;
    }
}

fn access(path: &Path, e: io::Error) -> CobsError {
    CobsError::Access(format!("{}: {e}", path.display()))
}

fn fsync_dir(directory: &Path) -> Result<()> {
    // Directories cannot be opened for sync on every platform.
    #[cfg(unix)]
    {
        File::open(directory)
            .and_then(|dir| dir.sync_all())
            .map_err(|e| access(directory, e))?;
    }
    #[cfg(not(unix))]
    let _ = directory;
    Ok(())
}

/// Exclusive append lock, released on drop
struct StreamLock {
    path: PathBuf,
    _file: File,
}

impl StreamLock {
    fn acquire(stream_path: &Path) -> Result<Self> {
        let mut path = stream_path.as_os_str().to_os_string();
        path.push(".lock");
        let path = PathBuf::from(path);

        match Self::create(&path) {
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists && is_abandoned(&path) => {
                tracing::warn!(path = %path.display(), "Removing abandoned log lock");
                match fs::remove_file(&path) {
                    Ok(()) => {}
                    Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                    Err(e) => return Err(access(&path, e)),
                }
                Self::create(&path).map_err(|e| lock_error(&path, e))
            }
            result => result.map_err(|e| lock_error(&path, e)),
        }
    }

    fn create(path: &Path) -> io::Result<Self> {
        let mut file = OpenOptions::new().write(true).create_new(true).open(path)?;
        if let Err(e) = writeln!(file, "pid={}", std::process::id()).and_then(|()| file.sync_all())
        {
            let _ = fs::remove_file(path);
            return Err(e);
        }
        Ok(Self {
            path: path.to_path_buf(),
            _file: file,
        })
    }
}

fn lock_error(path: &Path, e: io::Error) -> CobsError {
    if e.kind() == io::ErrorKind::AlreadyExists {
        CobsError::Access(format!(
            "log stream is locked by another writer: {}",
            path.display()
        ))
    } else {
        access(path, e)
    }
}

/// Whether a lock file was left behind by a writer that is gone
///
/// A lock naming a pid that is not running is abandoned. A lock without a readable
/// pid is abandoned once it is older than [`UNREADABLE_LOCK_GRACE`].
fn is_abandoned(path: &Path) -> bool {
    let Ok(contents) = fs::read_to_string(path) else {
        return false;
    };

    match lock_owner(&contents) {
        Some(pid) => !process_alive(pid),
        None => fs::metadata(path)
            .and_then(|meta| meta.modified())
            .ok()
            .and_then(|modified| modified.elapsed().ok())
            .is_some_and(|age| age > UNREADABLE_LOCK_GRACE),
    }
}

fn lock_owner(contents: &str) -> Option<u32> {
    contents
        .lines()
        .find_map(|line| line.trim().strip_prefix("pid="))
        .and_then(|pid| pid.trim().parse().ok())
}

fn process_alive(pid: u32) -> bool {
    if pid == std::process::id() {
        return true;
    }
    // Without procfs liveness is unknown; keep the lock.
    if cfg!(target_os = "linux") {
        Path::new("/proc").join(pid.to_string()).exists()
    } else {
        true
    }
}

impl Drop for StreamLock {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_file(&self.path) {
            tracing::warn!(path = %self.path.display(), error = %e, "Failed to release log lock");
        }
    }
}
