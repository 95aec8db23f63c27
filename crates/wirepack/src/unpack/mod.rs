//! Unpack side: the input buffer, its underflow handler and the context
//! that drives the decoder.

mod decoder;
mod skip;

use std::borrow::Cow;
use std::io;

use wirepack_buffers::{print_octets, ByteOrder};

use crate::{Descriptor, Item, WireError};

/// The byte region an unpack context reads from.
///
/// Unread input is `data[current..end]`. Data may be borrowed from the
/// caller or owned by a refilling handler; handlers that compact the region
/// account for the dropped bytes in [`discarded`](Self::discarded) so absolute
/// stream offsets stay available.
#[derive(Debug)]
pub struct UnpackBuffer<'a> {
    data: Cow<'a, [u8]>,
    pub start: usize,
    pub current: usize,
    pub end: usize,
    discarded: u64,
    barrier: Option<usize>,
    handler_error: Option<io::Error>,
}

impl<'a> UnpackBuffer<'a> {
    /// Reads directly from `data` without copying it.
    pub fn from_slice(data: &'a [u8]) -> Self {
        Self {
            end: data.len(),
            data: Cow::Borrowed(data),
            start: 0,
            current: 0,
            discarded: 0,
            barrier: None,
            handler_error: None,
        }
    }

    /// An empty owned region of `capacity` bytes, for handlers that refill.
    pub fn with_capacity(capacity: usize) -> UnpackBuffer<'static> {
        UnpackBuffer {
            data: Cow::Owned(vec![0; capacity]),
            start: 0,
            current: 0,
            end: 0,
            discarded: 0,
            barrier: None,
            handler_error: None,
        }
    }

    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    /// Unread bytes.
    pub fn remaining(&self) -> usize {
        self.end - self.current
    }

    pub fn unread(&self) -> &[u8] {
        &self.data[self.current..self.end]
    }

    /// Bytes dropped from the front of the region by compaction so far.
    pub fn discarded(&self) -> u64 {
        self.discarded
    }

    /// Absolute position of `current` in the input stream.
    pub fn offset(&self) -> u64 {
        self.discarded + (self.current - self.start) as u64
    }

    /// Free space after `end`, for a handler to read into.
    pub fn spare_mut(&mut self) -> &mut [u8] {
        let end = self.end;
        &mut self.data.to_mut()[end..]
    }

    /// Marks `len` bytes of spare space as filled.
    pub fn commit(&mut self, len: usize) {
        self.end = (self.end + len).min(self.data.len());
    }

    /// Moves the bytes that must be kept (everything from the barrier, or
    /// the unread bytes) to the front of the region.
    pub fn compact(&mut self) {
        let keep_from = self
            .barrier
            .unwrap_or(self.current)
            .clamp(self.start, self.current);
        if keep_from == 0 {
            return;
        }
        let end = self.end;
        self.data.to_mut().copy_within(keep_from..end, 0);
        self.discarded += (keep_from - self.start) as u64;
        self.current -= keep_from;
        self.end -= keep_from;
        self.start = 0;
        if let Some(barrier) = self.barrier.as_mut() {
            *barrier = barrier.saturating_sub(keep_from);
        }
    }

    /// Grows the region by one doubling step, never past what `needed`
    /// bytes after `current` require. Does nothing once they fit.
    pub fn grow_toward(&mut self, needed: usize) -> Result<(), WireError> {
        let required = self
            .current
            .checked_add(needed)
            .ok_or(WireError::AllocationError)?;
        if required <= self.capacity() {
            return Ok(());
        }
        let len = self
            .capacity()
            .max(1)
            .saturating_mul(2)
            .min(required);
        tracing::trace!(from = self.capacity(), to = len, "growing unpack buffer");
        let data = self.data.to_mut();
        data.try_reserve_exact(len - data.len())
            .map_err(|_| WireError::AllocationError)?;
        data.resize(len, 0);
        Ok(())
    }

    /// Keeps every byte from the current position until the barrier is
    /// cleared, so a decode can be replayed with [`rescan`](Self::rescan).
    pub fn set_barrier(&mut self) {
        self.barrier = Some(self.current);
    }

    pub fn clear_barrier(&mut self) {
        self.barrier = None;
    }

    pub fn barrier(&self) -> Option<usize> {
        self.barrier
    }

    /// Rewinds `current` to the barrier. Returns `false` when none is set.
    pub fn rescan(&mut self) -> bool {
        match self.barrier {
            Some(barrier) => {
                self.current = barrier;
                true
            }
            None => false,
        }
    }

    /// Bytes from the barrier up to `current`, empty when none is set.
    pub fn pinned(&self) -> &[u8] {
        match self.barrier {
            Some(barrier) => &self.data[barrier..self.current],
            None => &[],
        }
    }

    pub fn set_handler_error(&mut self, err: io::Error) {
        self.handler_error = Some(err);
    }

    pub fn handler_error(&self) -> Option<&io::Error> {
        self.handler_error.as_ref()
    }

    pub fn take_handler_error(&mut self) -> Option<io::Error> {
        self.handler_error.take()
    }
}

/// Hook an unpack context calls when its buffer runs dry.
pub trait UnpackHandler {
    /// Makes at least `needed` bytes available at `buffer.current`.
    ///
    /// Returning [`WireError::EndOfInput`] means the input is exhausted;
    /// the context reports it as end of input or buffer underflow depending
    /// on whether an item was in progress.
    fn underflow(&mut self, buffer: &mut UnpackBuffer<'_>, needed: usize) -> Result<(), WireError>;
}

/// Unpack-side options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UnpackConfig {
    pub byte_order: ByteOrder,
}

#[derive(Debug, Clone, Copy)]
struct Decoded {
    descriptor: Descriptor,
    /// Absolute stream offset of the payload, once it is known to be buffered.
    payload_at: Option<u64>,
}

/// Decodes items from an [`UnpackBuffer`].
///
/// Like the pack side, the first error sticks: every later call returns it
/// without consuming input.
#[derive(Debug)]
pub struct UnpackContext<'a, H> {
    buffer: UnpackBuffer<'a>,
    handler: H,
    config: UnpackConfig,
    status: Result<(), WireError>,
    last: Option<Decoded>,
}

impl<'a, H: UnpackHandler> UnpackContext<'a, H> {
    pub fn new(buffer: UnpackBuffer<'a>, handler: H) -> Self {
        Self::with_config(buffer, handler, UnpackConfig::default())
    }

    pub fn with_config(buffer: UnpackBuffer<'a>, handler: H, config: UnpackConfig) -> Self {
        let status = config.byte_order.verify().map_err(WireError::from);
        Self {
            buffer,
            handler,
            config,
            status,
            last: None,
        }
    }

    /// The sticky return code.
    pub fn status(&self) -> Result<(), WireError> {
        self.status
    }

    pub fn config(&self) -> &UnpackConfig {
        &self.config
    }

    pub fn buffer(&self) -> &UnpackBuffer<'a> {
        &self.buffer
    }

    pub fn buffer_mut(&mut self) -> &mut UnpackBuffer<'a> {
        &mut self.buffer
    }

    pub fn handler(&self) -> &H {
        &self.handler
    }

    pub fn handler_mut(&mut self) -> &mut H {
        &mut self.handler
    }

    pub fn into_parts(self) -> (UnpackBuffer<'a>, H) {
        (self.buffer, self.handler)
    }

    pub fn into_inner(self) -> H {
        self.handler
    }

    /// Absolute stream offset of the next unread byte.
    pub fn offset(&self) -> u64 {
        self.buffer.offset()
    }

    pub fn set_barrier(&mut self) {
        self.buffer.set_barrier();
    }

    pub fn clear_barrier(&mut self) {
        self.buffer.clear_barrier();
    }

    /// Rewinds to the barrier so the pinned items can be decoded again.
    pub fn rescan(&mut self) -> Result<(), WireError> {
        self.run(|ctx| {
            if !ctx.buffer.rescan() {
                return Err(WireError::IllegalCall);
            }
            ctx.last = None;
            Ok(())
        })
    }

    /// The item produced by the last successful `next` or `next_descriptor`.
    ///
    /// Blob items decoded with `next_descriptor` have no payload yet and are
    /// not returned; neither are items whose bytes have since been compacted
    /// away.
    pub fn item(&self) -> Option<Item<'_>> {
        let last = self.last?;
        let payload: &[u8] = match (last.descriptor.blob_len(), last.payload_at) {
            (None, _) => &[],
            (Some(_), None) => return None,
            (Some(len), Some(at)) => {
                let local = at.checked_sub(self.buffer.discarded)? as usize + self.buffer.start;
                self.buffer.data.get(local..local + len as usize)?
            }
        };
        Some(Item::from_descriptor(last.descriptor, payload))
    }

    pub(crate) fn run<T, F>(&mut self, op: F) -> Result<T, WireError>
    where
        F: FnOnce(&mut Self) -> Result<T, WireError>,
    {
        self.status?;
        let result = op(self);
        if let Err(err) = &result {
            self.fail(*err);
        }
        result
    }

    /// Records `result`'s error, if any, as the sticky code.
    pub(crate) fn settle<T>(&mut self, result: Result<T, WireError>) -> Result<T, WireError> {
        if let Err(err) = &result {
            self.fail(*err);
        }
        result
    }

    fn fail(&mut self, err: WireError) {
        if self.status.is_ok() {
            tracing::debug!(
                code = err.code(),
                error = %err,
                offset = self.buffer.offset(),
                upcoming = %print_octets(self.buffer.unread(), 8),
                "unpack context failed"
            );
            self.status = Err(err);
        }
        self.last = None;
    }

    /// Ensures `needed` bytes are buffered at `current` and consumes them,
    /// returning their position. `leading` marks the first byte of an item,
    /// where running out of input is a clean end rather than a truncation.
    fn ensure(&mut self, needed: usize, leading: bool) -> Result<usize, WireError> {
        if needed > self.buffer.remaining() {
            let exhausted = if leading {
                WireError::EndOfInput
            } else {
                WireError::BufferUnderflow
            };
            match self.handler.underflow(&mut self.buffer, needed) {
                Ok(()) if needed <= self.buffer.remaining() => {}
                Ok(()) | Err(WireError::EndOfInput) => return Err(exhausted),
                Err(err) => return Err(err),
            }
        }
        let at = self.buffer.current;
        self.buffer.current += needed;
        Ok(at)
    }

    /// Like [`ensure`](Self::ensure) but leaves `current` in place. Never
    /// reports an error; `None` means the bytes are not available.
    fn peek(&mut self, needed: usize) -> Option<&[u8]> {
        if needed > self.buffer.remaining()
            && (self.handler.underflow(&mut self.buffer, needed).is_err()
                || needed > self.buffer.remaining())
        {
            return None;
        }
        let at = self.buffer.current;
        Some(&self.buffer.data[at..at + needed])
    }

    fn bytes(&self, at: usize, len: usize) -> &[u8] {
        &self.buffer.data[at..at + len]
    }
}
