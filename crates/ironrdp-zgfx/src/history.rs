use crate::error::{ZgfxError, ZgfxResult};

/// Sliding window of previously produced bytes.
///
/// The buffer is allocated once at its full capacity. Only the write index wraps;
/// back-references may reach into bytes written by earlier, unrelated calls.
pub(crate) struct HistoryBuffer {
    buffer: Box<[u8]>,
    index: usize,
}

impl HistoryBuffer {
    pub(crate) fn new(capacity: usize) -> Self {
        debug_assert!(capacity > 0, "history capacity must be non-zero");

        Self {
            buffer: vec![0; capacity].into_boxed_slice(),
            index: 0,
        }
    }

    pub(crate) fn capacity(&self) -> usize {
        self.buffer.len()
    }

    pub(crate) fn write_index(&self) -> usize {
        self.index
    }

    /// Moves the write index back to the start, leaving the stored bytes in place.
    pub(crate) fn rewind(&mut self) {
        self.index = 0;
    }

    pub(crate) fn push(&mut self, byte: u8) {
        self.buffer[self.index] = byte;
        self.index += 1;

        if self.index == self.buffer.len() {
            self.index = 0;
        }
    }

    /// Appends `bytes`, overwriting the oldest content once the buffer wraps.
    ///
    /// When `bytes` is longer than the whole window, only its tail is kept.
    pub(crate) fn write(&mut self, bytes: &[u8]) {
        let capacity = self.buffer.len();
        let bytes = &bytes[bytes.len().saturating_sub(capacity)..];

        let head = bytes.len().min(capacity - self.index);
        let (to_end, wrapped) = bytes.split_at(head);

        self.buffer[self.index..self.index + head].copy_from_slice(to_end);
        self.buffer[..wrapped.len()].copy_from_slice(wrapped);

        self.index = (self.index + bytes.len()) % capacity;
    }

    /// Fills `dst` with the bytes starting `distance` bytes behind the write index.
    ///
    /// `dst` may be longer than `distance`: the referenced window then repeats, as it
    /// would if each copied byte were appended to the history before the next is read.
    pub(crate) fn read_with_offset(&self, distance: usize, dst: &mut [u8]) -> ZgfxResult<()> {
        let capacity = self.buffer.len();

        if distance == 0 || distance > capacity {
            return Err(ZgfxError::InvalidMatchDistance {
                distance,
                history_size: capacity,
            });
        }

        let start = (self.index + capacity - distance) % capacity;
        let window = dst.len().min(distance);

        let head = window.min(capacity - start);
        dst[..head].copy_from_slice(&self.buffer[start..start + head]);
        dst[head..window].copy_from_slice(&self.buffer[..window - head]);

        let mut filled = window;
        while filled < dst.len() {
            let chunk = (dst.len() - filled).min(distance);
            dst.copy_within(..chunk, filled);
            filled += chunk;
        }

        Ok(())
    }
}
