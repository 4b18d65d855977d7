//! Transfer buffer
//!
//! Fixed-capacity staging area between the byte-stream boundary and a
//! protocol engine. Writes longer than the capacity are truncated, never
//! rejected; the valid length is tracked separately from the capacity.

/// Fixed-capacity byte staging buffer
#[derive(Debug, Clone)]
pub struct TransferBuffer<const N: usize> {
    data: heapless::Vec<u8, N>,
}

impl<const N: usize> TransferBuffer<N> {
    /// Create an empty buffer
    pub const fn new() -> Self {
        Self {
            data: heapless::Vec::new(),
        }
    }

    /// Buffer capacity in bytes
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Number of valid bytes currently staged
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if no bytes are staged
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Replace the buffer content with `bytes`, truncated to capacity
    ///
    /// Returns the number of bytes actually staged.
    pub fn stage(&mut self, bytes: &[u8]) -> usize {
        let take = bytes.len().min(N);
        self.data.clear();
        // Cannot fail: take is bounded by the capacity
        let _ = self.data.extend_from_slice(&bytes[..take]);
        take
    }

    /// Staged bytes
    pub fn bytes(&self) -> &[u8] {
        &self.data
    }

    /// Copy staged bytes into `out`, returning the number copied
    ///
    /// A short copy is reported through the return count, not an error.
    pub fn copy_to(&self, out: &mut [u8]) -> usize {
        let take = self.data.len().min(out.len());
        out[..take].copy_from_slice(&self.data[..take]);
        take
    }

    /// Discard the staged bytes
    pub fn clear(&mut self) {
        self.data.clear();
    }
}

impl<const N: usize> Default for TransferBuffer<N> {
    fn default() -> Self {
        Self::new()
    }
}
