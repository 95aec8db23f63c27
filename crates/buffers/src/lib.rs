//! Byte-level primitives for wirepack.
//!
//! # Overview
//!
//! - [`ByteOrder`] - Big-endian load/store routines picked once per host layout
//! - [`Reader`] - Reads big-endian values from a byte slice with cursor tracking
//! - [`print_octets`] / [`hex_octets`] - Hex formatting for diagnostics
//!
//! # Example
//!
//! ```
//! use wirepack_buffers::{ByteOrder, Reader};
//!
//! let mut data = [0u8; 6];
//! let order = ByteOrder::native();
//! order.store_u16(&mut data, 0x0203);
//! order.store_u32(&mut data[2..], 0xdead_beef);
//!
//! let mut reader = Reader::new(&data);
//! assert_eq!(reader.u16(), Ok(0x0203));
//! assert_eq!(reader.u32(), Ok(0xdead_beef));
//! ```

mod byte_order;
mod print_octets;
mod reader;

pub use byte_order::{ByteOrder, HostLayout};
pub use print_octets::{hex_octets, print_octets};
pub use reader::Reader;

/// Error type for buffer operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferError {
    /// Attempted to read past the end of the buffer.
    EndOfBuffer,
    /// A byte-order strategy does not match the host it runs on.
    WrongByteOrder,
}

impl std::fmt::Display for BufferError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BufferError::EndOfBuffer => write!(f, "end of buffer"),
            BufferError::WrongByteOrder => write!(f, "byte order does not match host"),
        }
    }
}

impl std::error::Error for BufferError {}
