//! Handlers backed by `std::io` streams.

use std::io::{self, Read, Write};

use crate::{
    PackBuffer, PackConfig, PackContext, PackHandler, UnpackBuffer, UnpackConfig, UnpackContext,
    UnpackHandler, WireError,
};

/// Initial buffer length for [`StreamSink`].
pub const DEFAULT_SINK_CAPACITY: usize = 4096;
/// Initial buffer length for [`StreamSource`].
pub const DEFAULT_SOURCE_CAPACITY: usize = 1024;

/// Packs through a buffer that is drained into a writer when it fills.
///
/// Bytes after a barrier set on the [`PackBuffer`] stay buffered across
/// drains until the barrier is cleared.
#[derive(Debug)]
pub struct StreamSink<W> {
    writer: W,
}

impl<W: Write> StreamSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn get_ref(&self) -> &W {
        &self.writer
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    /// Writes everything before the barrier (or everything, without one).
    fn drain(&mut self, buffer: &mut PackBuffer) -> Result<(), WireError> {
        let upto = buffer.barrier().unwrap_or(buffer.current);
        if upto <= buffer.start {
            return Ok(());
        }
        let pending = &buffer.data()[buffer.start..upto];
        tracing::trace!(bytes = pending.len(), "draining pack buffer");
        if let Err(err) = self.writer.write_all(pending) {
            tracing::debug!(error = %err, "stream sink write failed");
            buffer.set_handler_error(err);
            return Err(WireError::ErrorInHandler);
        }
        buffer.discard_front(upto);
        Ok(())
    }
}

impl<W: Write> PackHandler for StreamSink<W> {
    fn overflow(&mut self, buffer: &mut PackBuffer, needed: usize) -> Result<(), WireError> {
        self.drain(buffer)?;
        if needed > buffer.remaining() {
            buffer.grow_for(needed)?;
        }
        Ok(())
    }

    fn supports_flush(&self) -> bool {
        true
    }

    fn flush(&mut self, buffer: &mut PackBuffer) -> Result<(), WireError> {
        self.drain(buffer)?;
        self.writer.flush().map_err(|err| {
            buffer.set_handler_error(err);
            WireError::ErrorInHandler
        })
    }

    fn supports_direct_write(&self) -> bool {
        true
    }

    fn write(&mut self, buffer: &mut PackBuffer, bytes: &[u8]) -> Result<(), WireError> {
        self.writer.write_all(bytes).map_err(|err| {
            buffer.set_handler_error(err);
            WireError::ErrorInHandler
        })
    }
}

impl<W: Write> PackContext<StreamSink<W>> {
    /// A context that streams into `writer`; a zero `capacity` selects the
    /// default.
    pub fn to_writer(writer: W, capacity: usize) -> Self {
        Self::to_writer_with_config(writer, capacity, PackConfig::default())
    }

    pub fn to_writer_with_config(writer: W, capacity: usize, config: PackConfig) -> Self {
        let capacity = if capacity > 0 {
            capacity
        } else {
            DEFAULT_SINK_CAPACITY
        };
        Self::with_config(PackBuffer::with_len(capacity), StreamSink::new(writer), config)
    }

    /// Flushes what is left and returns the writer.
    ///
    /// Pinned bytes are written too; the barrier is cleared first.
    pub fn finish(mut self) -> Result<W, WireError> {
        self.buffer_mut().clear_barrier();
        self.flush()?;
        Ok(self.into_inner().into_inner())
    }
}

/// Refills an unpack buffer from a reader.
#[derive(Debug)]
pub struct StreamSource<R> {
    reader: R,
}

impl<R: Read> StreamSource<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }

    pub fn get_ref(&self) -> &R {
        &self.reader
    }

    pub fn into_inner(self) -> R {
        self.reader
    }
}

impl<R: Read> UnpackHandler for StreamSource<R> {
    fn underflow(&mut self, buffer: &mut UnpackBuffer<'_>, needed: usize) -> Result<(), WireError> {
        buffer.compact();
        while buffer.remaining() < needed {
            // Memory follows the bytes that arrive, not the declared length.
            if buffer.end == buffer.capacity() {
                buffer.grow_toward(needed)?;
            }
            match self.reader.read(buffer.spare_mut()) {
                Ok(0) => {
                    tracing::trace!(needed, have = buffer.remaining(), "stream source at end of input");
                    return Err(WireError::EndOfInput);
                }
                Ok(read) => {
                    tracing::trace!(read, "refilled unpack buffer");
                    buffer.commit(read);
                }
                Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
                Err(err) => {
                    tracing::debug!(error = %err, "stream source read failed");
                    buffer.set_handler_error(err);
                    return Err(WireError::ErrorInHandler);
                }
            }
        }
        Ok(())
    }
}

impl<R: Read> UnpackContext<'static, StreamSource<R>> {
    /// A context that reads from `reader`; a zero `capacity` selects the
    /// default.
    pub fn from_reader(reader: R, capacity: usize) -> Self {
        Self::from_reader_with_config(reader, capacity, UnpackConfig::default())
    }

    pub fn from_reader_with_config(reader: R, capacity: usize, config: UnpackConfig) -> Self {
        let capacity = if capacity > 0 {
            capacity
        } else {
            DEFAULT_SOURCE_CAPACITY
        };
        Self::with_config(UnpackBuffer::with_capacity(capacity), StreamSource::new(reader), config)
    }
}
