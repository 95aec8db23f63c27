//! Binary buffer reader with cursor tracking.

use crate::{BufferError, ByteOrder};

/// A big-endian reader over a byte slice.
///
/// The reader keeps a cursor and an exclusive end position. Every read checks
/// the remaining size first and fails with [`BufferError::EndOfBuffer`]
/// without moving the cursor.
///
/// # Example
///
/// ```
/// use wirepack_buffers::Reader;
///
/// let data = [0x01, 0x02, 0x03, 0x04];
/// let mut reader = Reader::new(&data);
///
/// assert_eq!(reader.u8(), Ok(0x01));
/// assert_eq!(reader.u16(), Ok(0x0203));
/// assert!(reader.u16().is_err());
/// ```
#[derive(Debug, Clone)]
pub struct Reader<'a> {
    /// The underlying byte slice.
    pub uint8: &'a [u8],
    /// Current cursor position.
    pub x: usize,
    /// End position (exclusive).
    pub end: usize,
    order: ByteOrder,
}

impl<'a> Reader<'a> {
    /// Creates a new reader for the given byte slice.
    pub fn new(uint8: &'a [u8]) -> Self {
        Self::with_byte_order(uint8, ByteOrder::native())
    }

    /// Creates a reader that loads multi-byte values through `order`.
    pub fn with_byte_order(uint8: &'a [u8], order: ByteOrder) -> Self {
        Self {
            uint8,
            x: 0,
            end: uint8.len(),
            order,
        }
    }

    /// Resets the reader with a new byte slice.
    pub fn reset(&mut self, uint8: &'a [u8]) {
        self.x = 0;
        self.end = uint8.len();
        self.uint8 = uint8;
    }

    /// Returns the number of remaining bytes.
    pub fn size(&self) -> usize {
        self.end - self.x
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], BufferError> {
        if n > self.size() {
            return Err(BufferError::EndOfBuffer);
        }
        let x = self.x;
        self.x += n;
        Ok(&self.uint8[x..x + n])
    }

    /// Peeks at the current byte without advancing the cursor.
    pub fn peek(&self) -> Result<u8, BufferError> {
        if self.x < self.end {
            Ok(self.uint8[self.x])
        } else {
            Err(BufferError::EndOfBuffer)
        }
    }

    /// Advances the cursor by the given number of bytes.
    pub fn skip(&mut self, length: usize) -> Result<(), BufferError> {
        self.take(length).map(|_| ())
    }

    /// Returns a subarray of the given size and advances the cursor.
    pub fn buf(&mut self, size: usize) -> Result<&'a [u8], BufferError> {
        self.take(size)
    }

    #[inline]
    pub fn u8(&mut self) -> Result<u8, BufferError> {
        Ok(self.take(1)?[0])
    }

    #[inline]
    pub fn i8(&mut self) -> Result<i8, BufferError> {
        Ok(self.take(1)?[0] as i8)
    }

    #[inline]
    pub fn u16(&mut self) -> Result<u16, BufferError> {
        let bytes = self.take(2)?;
        Ok(self.order.load_u16(bytes))
    }

    #[inline]
    pub fn i16(&mut self) -> Result<i16, BufferError> {
        let bytes = self.take(2)?;
        Ok(self.order.load_i16(bytes))
    }

    #[inline]
    pub fn u32(&mut self) -> Result<u32, BufferError> {
        let bytes = self.take(4)?;
        Ok(self.order.load_u32(bytes))
    }

    #[inline]
    pub fn i32(&mut self) -> Result<i32, BufferError> {
        let bytes = self.take(4)?;
        Ok(self.order.load_i32(bytes))
    }

    #[inline]
    pub fn u64(&mut self) -> Result<u64, BufferError> {
        let bytes = self.take(8)?;
        Ok(self.order.load_u64(bytes))
    }

    #[inline]
    pub fn i64(&mut self) -> Result<i64, BufferError> {
        let bytes = self.take(8)?;
        Ok(self.order.load_i64(bytes))
    }

    #[inline]
    pub fn f32(&mut self) -> Result<f32, BufferError> {
        let bytes = self.take(4)?;
        Ok(self.order.load_f32(bytes))
    }

    #[inline]
    pub fn f64(&mut self) -> Result<f64, BufferError> {
        let bytes = self.take(8)?;
        Ok(self.order.load_f64(bytes))
    }
}
