//! In-memory handlers.

use crate::{
    PackBuffer, PackConfig, PackContext, PackHandler, UnpackBuffer, UnpackConfig, UnpackContext,
    UnpackHandler, WireError,
};

/// Initial length for growable pack buffers.
pub const DEFAULT_MEMORY_CAPACITY: usize = 1024;

/// Packs into a buffer of fixed length; running out of room is an error.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixedBuffer;

impl PackHandler for FixedBuffer {
    fn overflow(&mut self, _buffer: &mut PackBuffer, needed: usize) -> Result<(), WireError> {
        tracing::debug!(needed, "fixed pack buffer is full");
        Err(WireError::BufferOverflow)
    }
}

/// Packs into a buffer that doubles whenever it fills up.
#[derive(Debug, Default, Clone, Copy)]
pub struct GrowableBuffer;

impl PackHandler for GrowableBuffer {
    fn overflow(&mut self, buffer: &mut PackBuffer, needed: usize) -> Result<(), WireError> {
        buffer.grow_for(needed)
    }
}

/// Unpacks from a complete in-memory message; there is nothing to refill.
#[derive(Debug, Default, Clone, Copy)]
pub struct Exhausted;

impl UnpackHandler for Exhausted {
    fn underflow(&mut self, _buffer: &mut UnpackBuffer<'_>, _needed: usize) -> Result<(), WireError> {
        Err(WireError::EndOfInput)
    }
}

impl PackContext<FixedBuffer> {
    /// Packs into `len` bytes and fails with buffer overflow past that.
    pub fn fixed(len: usize) -> Self {
        Self::new(PackBuffer::with_len(len), FixedBuffer)
    }
}

impl PackContext<GrowableBuffer> {
    /// A growable context; a zero `capacity` selects the default.
    pub fn growable(capacity: usize) -> Self {
        Self::growable_with_config(capacity, PackConfig::default())
    }

    pub fn growable_with_config(capacity: usize, config: PackConfig) -> Self {
        let capacity = if capacity > 0 {
            capacity
        } else {
            DEFAULT_MEMORY_CAPACITY
        };
        Self::with_config(PackBuffer::with_len(capacity), GrowableBuffer, config)
    }

    /// The packed message.
    pub fn into_bytes(self) -> Vec<u8> {
        self.into_parts().0.into_vec()
    }
}

impl<'a> UnpackContext<'a, Exhausted> {
    pub fn from_slice(data: &'a [u8]) -> Self {
        Self::new(UnpackBuffer::from_slice(data), Exhausted)
    }

    pub fn from_slice_with_config(data: &'a [u8], config: UnpackConfig) -> Self {
        Self::with_config(UnpackBuffer::from_slice(data), Exhausted, config)
    }
}
