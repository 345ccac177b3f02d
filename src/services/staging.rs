use std::io;
use std::path::Path;

use tempfile::NamedTempFile;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt, BufWriter};

#[derive(Debug, Error)]
pub enum StagingError {
    #[error("upload exceeds the {limit} byte limit")]
    TooLarge { limit: u64 },

    #[error(transparent)]
    Io(#[from] io::Error),
}

/// An uploaded body staged on local disk.
///
/// Owns its temp file exclusively: the file is removed when the value is
/// dropped, on every exit path of the request that created it.
#[derive(Debug)]
pub struct StagedFile {
    file: NamedTempFile,
    size: u64,
}

impl StagedFile {
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    pub fn size(&self) -> u64 {
        self.size
    }
}

const COPY_BUF_SIZE: usize = 64 * 1024;

/// Copy `reader` into a uniquely-named temp file, enforcing `max_bytes`
/// while the stream is read so an oversized body never lands on disk in
/// full. The returned [`StagedFile`] cleans up after itself on drop.
pub async fn stage_stream<R>(mut reader: R, max_bytes: u64) -> Result<StagedFile, StagingError>
where
    R: AsyncRead + Unpin,
{
    let file = NamedTempFile::new()?;
    let mut writer = BufWriter::new(tokio::fs::File::from_std(file.reopen()?));

    let mut buffer = vec![0u8; COPY_BUF_SIZE];
    let mut total: u64 = 0;

    loop {
        let n = reader.read(&mut buffer).await?;
        if n == 0 {
            break;
        }
        total += n as u64;
        if total > max_bytes {
            return Err(StagingError::TooLarge { limit: max_bytes });
        }
        writer.write_all(&buffer[..n]).await?;
    }

    writer.flush().await?;

    Ok(StagedFile { file, size: total })
}
