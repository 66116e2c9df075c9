/// One contiguous slice of a file, tagged with its position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// Raw chunk data.
    pub data: Vec<u8>,
    /// 1-based ordinal of this chunk.
    pub index: u64,
    /// Number of chunks the file was split into.
    pub total_chunks: u64,
    /// Bytes covered by this chunk and every chunk before it.
    pub uploaded_bytes: u64,
}

impl Chunk {
    /// Size of this chunk in bytes.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if the chunk carries no data.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Byte offset of this chunk within the file.
    pub fn offset(&self) -> u64 {
        self.uploaded_bytes - self.data.len() as u64
    }

    /// Returns `true` if this is the final chunk of the file.
    pub fn is_last(&self) -> bool {
        self.index == self.total_chunks
    }
}
