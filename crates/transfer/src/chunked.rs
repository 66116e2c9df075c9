use crate::source::FileSource;
use crate::types::Chunk;
use crate::TransferError;

/// Number of chunks needed to cover `len` bytes: `ceil(len / chunk_size)`.
pub fn total_chunks(len: u64, chunk_size: u64) -> u64 {
    if chunk_size == 0 {
        return 0;
    }
    len.div_ceil(chunk_size)
}

/// Splits `source` into chunks of at most `chunk_size` bytes.
///
/// Nothing is read until [`Segments::next_chunk`] is called. Each call to
/// `segment` starts a fresh sequence from the first byte.
pub fn segment(source: &dyn FileSource, chunk_size: usize) -> Result<Segments<'_>, TransferError> {
    if chunk_size == 0 {
        return Err(TransferError::InvalidChunkSize);
    }
    let chunk_size = chunk_size as u64;
    let file_size = source.len();
    Ok(Segments {
        source,
        chunk_size,
        file_size,
        total_chunks: total_chunks(file_size, chunk_size),
        next: 0,
    })
}

/// Lazy, ordered sequence of chunks over one [`FileSource`].
pub struct Segments<'a> {
    source: &'a dyn FileSource,
    chunk_size: u64,
    file_size: u64,
    total_chunks: u64,
    /// Zero-based position of the next chunk to read.
    next: u64,
}

impl Segments<'_> {
    /// Reads the next chunk. Returns `None` once every chunk was produced.
    ///
    /// A read failure ends the sequence: later calls return `None`.
    pub async fn next_chunk(&mut self) -> Result<Option<Chunk>, TransferError> {
        if self.next >= self.total_chunks {
            return Ok(None);
        }

        let position = self.next;
        let index = position + 1;
        let start = position * self.chunk_size;
        let end = std::cmp::min(start + self.chunk_size, self.file_size);

        // Advance before reading so a failed read is never retried.
        self.next = self.total_chunks;

        let data = self
            .source
            .read_range(start, end)
            .await
            .map_err(|source| TransferError::ChunkRead { index, source })?;

        let expected = (end - start) as usize;
        if data.len() != expected {
            return Err(TransferError::ChunkRead {
                index,
                source: std::io::Error::new(
                    std::io::ErrorKind::UnexpectedEof,
                    format!("expected {expected} bytes, got {}", data.len()),
                ),
            });
        }

        self.next = index;
        Ok(Some(Chunk {
            data,
            index,
            total_chunks: self.total_chunks,
            uploaded_bytes: end,
        }))
    }

    /// Total number of chunks in the sequence.
    pub fn total_chunks(&self) -> u64 {
        self.total_chunks
    }

    /// Size of the underlying source in bytes.
    pub fn file_size(&self) -> u64 {
        self.file_size
    }
}
