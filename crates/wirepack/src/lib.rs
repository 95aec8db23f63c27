//! MessagePack pack/unpack engine with pluggable buffer handlers.
//!
//! # Overview
//!
//! - [`PackContext`] - Encodes values into a [`PackBuffer`], choosing the
//!   shortest wire form, and asks a [`PackHandler`] for room when it fills
//! - [`UnpackContext`] - Decodes items from an [`UnpackBuffer`], asking an
//!   [`UnpackHandler`] for more input when it runs dry; also skips and looks
//!   ahead without materializing items
//! - [`contexts`] - Handlers for fixed and growable memory and for
//!   `std::io` readers and writers
//! - [`typed`] - `next_i32`, `next_f64` and friends with range checking
//! - [`numeric_ext`] - Numbers wrapped in user extensions
//!
//! Both contexts keep the first error they hit. Every later call returns
//! it without reading or writing anything, so a sequence of calls can be
//! checked once at the end with `status()`.
//!
//! # Example
//!
//! ```
//! use wirepack::{Item, PackContext, UnpackContext};
//!
//! let mut pack = PackContext::growable(0);
//! pack.pack_array_size(2).unwrap();
//! pack.pack_str("answer").unwrap();
//! pack.pack_unsigned(42).unwrap();
//! let bytes = pack.into_bytes();
//! assert_eq!(bytes[0], 0x92);
//!
//! let mut unpack = UnpackContext::from_slice(&bytes);
//! assert_eq!(unpack.next().unwrap(), Item::Array(2));
//! assert_eq!(unpack.next().unwrap().as_str(), Some("answer"));
//! assert_eq!(unpack.next_u8(), Ok(42));
//! ```

pub mod constants;
pub mod contexts;
mod error;
mod item;
pub mod numeric_ext;
mod pack;
pub mod typed;
mod unpack;

pub use error::{status_code, WireError};
pub use item::{Descriptor, Item, ItemType, Timestamp};
pub use pack::{PackBuffer, PackConfig, PackContext, PackHandler};
pub use unpack::{UnpackBuffer, UnpackConfig, UnpackContext, UnpackHandler};
pub use wirepack_buffers::{ByteOrder, HostLayout};
