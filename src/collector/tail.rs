//! Cursor tracking over a rotating log file (`tail -F` style polling).
//!
//! The cursor is seeded at end-of-file, so only lines appended after the
//! agent starts are ever read. Rotation is detected by comparing the recorded
//! offset with the path's current size: a file that shrank below the offset
//! is reopened and the cursor reseeded at its end.
//!
//! Known blind spot: a file truncated and then regrown past the old offset
//! between two polls looks identical to one that was never rotated.

use std::io::{ErrorKind, SeekFrom};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs::{self, File};
use tokio::io::{AsyncReadExt, AsyncSeekExt};
use tracing::{debug, info, warn};

#[derive(Error, Debug)]
pub enum TailError {
    #[error("Log file not found: {}", path.display())]
    NotFound { path: PathBuf },
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl TailError {
    fn from_io(path: &Path, source: std::io::Error) -> Self {
        if source.kind() == ErrorKind::NotFound {
            TailError::NotFound {
                path: path.to_path_buf(),
            }
        } else {
            TailError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    }
}

/// Read position into one log file plus the open handle.
///
/// `offset` never decreases within one file incarnation and always sits just
/// past the last newline handed out.
#[derive(Debug)]
pub struct TailCursor {
    path: PathBuf,
    file: File,
    offset: u64,
    rotations: u64,
}

impl TailCursor {
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, TailError> {
        let path = path.as_ref().to_path_buf();
        let (file, offset) = open_at_end(&path).await?;

        info!(path = %path.display(), offset, "Connected to log file");

        Ok(Self {
            path,
            file,
            offset,
            rotations: 0,
        })
    }

    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Number of rotations detected since `open`.
    pub fn rotations(&self) -> u64 {
        self.rotations
    }

    /// Return every complete line appended since the last poll, without
    /// line terminators.
    ///
    /// An unterminated trailing line is left unread until its newline
    /// arrives. A detected rotation reopens the file and yields nothing for
    /// this poll.
    pub async fn read_new_lines(&mut self) -> Result<Vec<String>, TailError> {
        let size = match fs::metadata(&self.path).await {
            Ok(metadata) => metadata.len(),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                warn!(path = %self.path.display(), "Log file missing; waiting for it to reappear");
                return Ok(Vec::new());
            }
            Err(e) => return Err(TailError::from_io(&self.path, e)),
        };

        if self.offset > size {
            info!(
                path = %self.path.display(),
                previous_offset = self.offset,
                current_size = size,
                "Log file rotated, reconnecting"
            );
            self.reopen().await?;
            return Ok(Vec::new());
        }

        if self.offset == size {
            return Ok(Vec::new());
        }

        let buffer = self.read_from_offset().await?;
        let Some(last_newline) = buffer.iter().rposition(|b| *b == b'\n') else {
            debug!(pending_bytes = buffer.len(), "Waiting for line terminator");
            return Ok(Vec::new());
        };

        self.offset += (last_newline + 1) as u64;

        let lines: Vec<String> = buffer[..last_newline]
            .split(|b| *b == b'\n')
            .map(|line| String::from_utf8_lossy(line).into_owned())
            .collect();

        debug!(lines = lines.len(), offset = self.offset, "Read new lines");
        Ok(lines)
    }

    /// Release the file handle.
    pub fn close(self) {
        debug!(path = %self.path.display(), offset = self.offset, "Closing log file");
    }

    async fn read_from_offset(&mut self) -> Result<Vec<u8>, TailError> {
        self.file
            .seek(SeekFrom::Start(self.offset))
            .await
            .map_err(|e| TailError::from_io(&self.path, e))?;

        let mut buffer = Vec::new();
        self.file
            .read_to_end(&mut buffer)
            .await
            .map_err(|e| TailError::from_io(&self.path, e))?;
        Ok(buffer)
    }

    async fn reopen(&mut self) -> Result<(), TailError> {
        let (file, offset) = open_at_end(&self.path).await?;
        self.file = file;
        self.offset = offset;
        self.rotations += 1;
        Ok(())
    }
}

async fn open_at_end(path: &Path) -> Result<(File, u64), TailError> {
    let mut file = File::open(path)
        .await
        .map_err(|e| TailError::from_io(path, e))?;
    let offset = file
        .seek(SeekFrom::End(0))
        .await
        .map_err(|e| TailError::from_io(path, e))?;
    Ok((file, offset))
}
