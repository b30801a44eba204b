//! Upload source and download sink buffers
//!
//! The upload buffer is read incrementally through [`UploadBuffer::read`]
//! while the request body streams out; the download buffer collects the
//! response body chunk by chunk.

use std::convert::Infallible;
use std::sync::Arc;

use bytes::Bytes;
use futures::Stream;
use parking_lot::Mutex;

/// Upload buffer shared between the context and the engine's read source.
pub type SharedUpload = Arc<Mutex<UploadBuffer>>;

/// Byte buffer with a read cursor.
#[derive(Debug, Default, Clone)]
pub struct UploadBuffer {
    data: Vec<u8>,
    cursor: usize,
}

impl UploadBuffer {
    /// Create an empty buffer
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the contents and zero the cursor.
    pub fn replace(&mut self, bytes: &[u8]) {
        self.data.clear();
        self.data.extend_from_slice(bytes);
        self.cursor = 0;
    }

    /// Copy up to `out.len()` unread bytes into `out`, advancing the cursor.
    ///
    /// Returns the number of bytes copied; `0` means the source is drained.
    pub fn read(&mut self, out: &mut [u8]) -> usize {
        let n = out.len().min(self.remaining());
        out[..n].copy_from_slice(&self.data[self.cursor..self.cursor + n]);
        self.cursor += n;
        n
    }

    /// Move the cursor back to the start of the payload.
    pub fn rewind(&mut self) {
        self.cursor = 0;
    }

    /// Total payload length
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the payload is empty
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Bytes not yet read
    pub fn remaining(&self) -> usize {
        self.data.len() - self.cursor
    }
}

/// Stream the unread part of a shared upload buffer in chunks of `chunk_size`.
///
/// Each poll is one [`UploadBuffer::read`] call, holding the lock only
/// long enough to copy one chunk out.
pub fn upload_stream(
    source: SharedUpload,
    chunk_size: usize,
) -> impl Stream<Item = Result<Bytes, Infallible>> + Send + 'static {
    futures::stream::unfold(source, move |source| async move {
        let chunk = {
            let mut upload = source.lock();
            let mut chunk = vec![0; chunk_size.min(upload.remaining())];
            upload.read(&mut chunk);
            chunk
        };
        if chunk.is_empty() {
            return None;
        }
        Some((Ok(Bytes::from(chunk)), source))
    })
}

/// Response body sink.
#[derive(Debug, Default, Clone)]
pub struct DownloadBuffer {
    data: Vec<u8>,
}

impl DownloadBuffer {
    /// Create an empty buffer
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop all collected bytes, keeping the allocation.
    pub fn clear(&mut self) {
        self.data.clear();
    }

    /// Append a chunk; returns the number of bytes accepted.
    pub fn write(&mut self, chunk: &[u8]) -> usize {
        self.data.extend_from_slice(chunk);
        chunk.len()
    }

    /// Everything collected since the last clear
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Collected length
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether nothing has been collected
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}
