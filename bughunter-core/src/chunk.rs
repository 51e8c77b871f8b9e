//! Bounded Byte-Range File Reads
//!
//! Reads exactly the requested byte window of a file instead of pulling the
//! whole file into memory, so large analysis targets can be fed to the model
//! a chunk at a time.

use std::io::SeekFrom;
use std::path::Path;

use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncSeekExt};
use tracing::debug;

use crate::{Error, Result};

/// Read the bytes in `start..end` of `path` and decode them as UTF-8.
///
/// Requires `0 <= start <= end <= file size`; anything else is an
/// [`Error::Range`]. Invalid UTF-8 sequences are replaced rather than
/// rejected. The file handle is scoped to this call and released on every
/// exit path.
pub async fn read_range(path: &Path, start: u64, end: u64) -> Result<String> {
    let mut file = File::open(path).await?;
    let len = file.metadata().await?.len();
    if start > end || end > len {
        return Err(Error::Range { start, end, len });
    }

    debug!(path = %path.display(), start, end, "reading file chunk");
    file.seek(SeekFrom::Start(start)).await?;
    #[allow(clippy::cast_possible_truncation)]
    let mut buf = vec![0u8; (end - start) as usize];
    file.read_exact(&mut buf).await?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}
