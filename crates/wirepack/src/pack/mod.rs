//! Pack side: the output buffer, its overflow handler and the context that
//! drives the encoder.

mod encoder;

use std::io;

use wirepack_buffers::ByteOrder;

use crate::WireError;

/// The byte region a pack context writes into.
///
/// Packed bytes live in `data[start..current]`; `data[current..]` is free
/// space, so the end of the region is always `data.len()`. A barrier, when
/// set, marks the first byte a draining handler must keep buffered.
#[derive(Debug, Default)]
pub struct PackBuffer {
    data: Vec<u8>,
    pub start: usize,
    pub current: usize,
    barrier: Option<usize>,
    handler_error: Option<io::Error>,
}

impl PackBuffer {
    /// A zero-filled region of `len` bytes.
    pub fn with_len(len: usize) -> Self {
        Self::from_vec(vec![0; len])
    }

    /// Uses `data` as the region; its contents are overwritten.
    pub fn from_vec(data: Vec<u8>) -> Self {
        Self {
            data,
            start: 0,
            current: 0,
            barrier: None,
            handler_error: None,
        }
    }

    pub fn end(&self) -> usize {
        self.data.len()
    }

    /// Free bytes after `current`.
    pub fn remaining(&self) -> usize {
        self.end() - self.current
    }

    /// Bytes packed since `start`.
    pub fn packed(&self) -> &[u8] {
        &self.data[self.start..self.current]
    }

    /// The whole region, including free space.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Resizes the region to `len` bytes, reporting allocation failure
    /// instead of aborting.
    pub fn resize(&mut self, len: usize) -> Result<(), WireError> {
        if len > self.data.len() {
            self.data
                .try_reserve_exact(len - self.data.len())
                .map_err(|_| WireError::AllocationError)?;
        }
        self.data.resize(len, 0);
        Ok(())
    }

    /// Doubles the region until `needed` bytes fit after `current`.
    pub fn grow_for(&mut self, needed: usize) -> Result<(), WireError> {
        let required = self
            .current
            .checked_add(needed)
            .ok_or(WireError::AllocationError)?;
        let mut len = self.end().max(1);
        while len < required {
            len = len.checked_mul(2).ok_or(WireError::AllocationError)?;
        }
        if len != self.end() {
            tracing::trace!(from = self.end(), to = len, "growing pack buffer");
            self.resize(len)?;
        }
        Ok(())
    }

    /// Drops `data[start..upto]` and shifts what follows down to `start`.
    pub fn discard_front(&mut self, upto: usize) {
        let upto = upto.clamp(self.start, self.current);
        let removed = upto - self.start;
        if removed == 0 {
            return;
        }
        self.data.copy_within(upto..self.current, self.start);
        self.current -= removed;
        if let Some(barrier) = self.barrier.as_mut() {
            *barrier = barrier.saturating_sub(removed).max(self.start);
        }
    }

    /// Pins every byte packed from now on until the barrier is cleared.
    pub fn set_barrier(&mut self) {
        self.barrier = Some(self.current);
    }

    pub fn clear_barrier(&mut self) {
        self.barrier = None;
    }

    pub fn barrier(&self) -> Option<usize> {
        self.barrier
    }

    /// Bytes packed since the barrier, empty when none is set.
    pub fn pinned(&self) -> &[u8] {
        match self.barrier {
            Some(barrier) => &self.data[barrier..self.current],
            None => &[],
        }
    }

    /// Mutable view of the pinned bytes, for patching headers in place.
    pub fn pinned_mut(&mut self) -> &mut [u8] {
        match self.barrier {
            Some(barrier) => &mut self.data[barrier..self.current],
            None => &mut [],
        }
    }

    /// Records an I/O failure for the caller to inspect later.
    pub fn set_handler_error(&mut self, err: io::Error) {
        self.handler_error = Some(err);
    }

    pub fn handler_error(&self) -> Option<&io::Error> {
        self.handler_error.as_ref()
    }

    pub fn take_handler_error(&mut self) -> Option<io::Error> {
        self.handler_error.take()
    }

    /// The region, truncated to the packed bytes.
    pub fn into_vec(mut self) -> Vec<u8> {
        self.data.truncate(self.current);
        self.data.drain(..self.start);
        self.data
    }
}

/// Hooks a pack context calls when its buffer runs out of room.
pub trait PackHandler {
    /// Makes at least `needed` contiguous bytes available at
    /// `buffer.current`, by draining, growing, or both.
    fn overflow(&mut self, buffer: &mut PackBuffer, needed: usize) -> Result<(), WireError>;

    fn supports_flush(&self) -> bool {
        false
    }

    /// Pushes packed bytes to the final destination.
    fn flush(&mut self, buffer: &mut PackBuffer) -> Result<(), WireError> {
        let _ = buffer;
        Err(WireError::IllegalCall)
    }

    fn supports_direct_write(&self) -> bool {
        false
    }

    /// Writes `bytes` straight to the destination, bypassing the buffer.
    fn write(&mut self, buffer: &mut PackBuffer, bytes: &[u8]) -> Result<(), WireError> {
        let _ = (buffer, bytes);
        Err(WireError::IllegalCall)
    }
}

/// Pack-side options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PackConfig {
    /// Restrict output to the pre-2013 format: no str8, bin as str, no ext.
    pub be_compatible: bool,
    pub byte_order: ByteOrder,
}

/// Encodes values into a [`PackBuffer`].
///
/// The first failing call records its error; every later call returns that
/// error without touching the buffer.
#[derive(Debug)]
pub struct PackContext<H> {
    buffer: PackBuffer,
    handler: H,
    config: PackConfig,
    status: Result<(), WireError>,
}

impl<H: PackHandler> PackContext<H> {
    pub fn new(buffer: PackBuffer, handler: H) -> Self {
        Self::with_config(buffer, handler, PackConfig::default())
    }

    pub fn with_config(buffer: PackBuffer, handler: H, config: PackConfig) -> Self {
        let status = config.byte_order.verify().map_err(WireError::from);
        Self {
            buffer,
            handler,
            config,
            status,
        }
    }

    /// The sticky return code.
    pub fn status(&self) -> Result<(), WireError> {
        self.status
    }

    pub fn config(&self) -> &PackConfig {
        &self.config
    }

    pub fn set_be_compatible(&mut self, be_compatible: bool) {
        self.config.be_compatible = be_compatible;
    }

    pub fn buffer(&self) -> &PackBuffer {
        &self.buffer
    }

    pub fn buffer_mut(&mut self) -> &mut PackBuffer {
        &mut self.buffer
    }

    pub fn handler(&self) -> &H {
        &self.handler
    }

    pub fn handler_mut(&mut self) -> &mut H {
        &mut self.handler
    }

    /// Bytes packed and not yet drained.
    pub fn packed(&self) -> &[u8] {
        self.buffer.packed()
    }

    pub fn into_parts(self) -> (PackBuffer, H) {
        (self.buffer, self.handler)
    }

    pub fn into_inner(self) -> H {
        self.handler
    }

    /// Appends raw bytes verbatim.
    ///
    /// A handler that can flush and write directly receives the bytes without
    /// a copy, unless a barrier is pinning buffered output.
    pub fn insert(&mut self, bytes: &[u8]) -> Result<(), WireError> {
        self.run(|ctx| {
            if ctx.handler.supports_flush()
                && ctx.handler.supports_direct_write()
                && ctx.buffer.barrier.is_none()
            {
                ctx.handler.flush(&mut ctx.buffer)?;
                return ctx.handler.write(&mut ctx.buffer, bytes);
            }
            let at = ctx.reserve(bytes.len())?;
            ctx.buffer.data[at..at + bytes.len()].copy_from_slice(bytes);
            Ok(())
        })
    }

    pub fn flush(&mut self) -> Result<(), WireError> {
        self.run(|ctx| {
            if !ctx.handler.supports_flush() {
                return Err(WireError::IllegalCall);
            }
            ctx.handler.flush(&mut ctx.buffer)
        })
    }

    pub(crate) fn run<F>(&mut self, op: F) -> Result<(), WireError>
    where
        F: FnOnce(&mut Self) -> Result<(), WireError>,
    {
        self.status?;
        let result = op(self);
        if let Err(err) = result {
            tracing::debug!(code = err.code(), error = %err, "pack context failed");
            self.status = Err(err);
        }
        result
    }

    /// Claims `needed` bytes at `current`, asking the handler for room first
    /// when the buffer is short. Returns the offset of the claimed bytes.
    fn reserve(&mut self, needed: usize) -> Result<usize, WireError> {
        if needed > self.buffer.remaining() {
            self.handler.overflow(&mut self.buffer, needed)?;
            if needed > self.buffer.remaining() {
                return Err(WireError::BufferOverflow);
            }
        }
        let at = self.buffer.current;
        self.buffer.current += needed;
        Ok(at)
    }

    /// Claims `needed` bytes and hands them to `fill`.
    pub(crate) fn emit<F>(&mut self, needed: usize, fill: F) -> Result<(), WireError>
    where
        F: FnOnce(&mut [u8], &ByteOrder),
    {
        let at = self.reserve(needed)?;
        let order = self.config.byte_order;
        fill(&mut self.buffer.data[at..at + needed], &order);
        Ok(())
    }
}
