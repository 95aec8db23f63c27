//! Big-endian load/store strategies.
//!
//! Every multi-byte field on the MessagePack wire is big-endian. How a host
//! gets there depends on its own layout: a little-endian host loads the word
//! natively and swaps it, a big-endian host uses it as is, and the portable
//! fallback assembles the value one byte at a time. A [`ByteOrder`] bundles
//! the routines for one of those layouts so a context can pick once at
//! construction and call through plain function pointers afterwards.
//!
//! # Example
//!
//! ```
//! use wirepack_buffers::ByteOrder;
//!
//! let order = ByteOrder::native();
//! let mut out = [0u8; 4];
//! order.store_u32(&mut out, 0x0102_0304);
//! assert_eq!(out, [0x01, 0x02, 0x03, 0x04]);
//! assert_eq!(ByteOrder::PORTABLE.load_u32(&out), 0x0102_0304);
//! ```

use crate::BufferError;

#[cfg(target_endian = "little")]
const NATIVE: ByteOrder = ByteOrder::LITTLE;
#[cfg(target_endian = "big")]
const NATIVE: ByteOrder = ByteOrder::BIG;

/// Host layout a [`ByteOrder`] was written for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HostLayout {
    /// Native loads followed by a byte swap.
    LittleEndian,
    /// Native loads, no swap.
    BigEndian,
    /// Byte-wise shifts; correct on any host.
    Portable,
}

/// A set of big-endian load/store routines specialised for one host layout.
///
/// All slices passed in must hold at least the width of the accessed value;
/// the routines index the first N bytes and panic otherwise.
#[derive(Clone, Copy)]
pub struct ByteOrder {
    layout: HostLayout,
    load16: fn(&[u8]) -> u16,
    load32: fn(&[u8]) -> u32,
    load64: fn(&[u8]) -> u64,
    store16: fn(&mut [u8], u16),
    store32: fn(&mut [u8], u32),
    store64: fn(&mut [u8], u64),
}

impl std::fmt::Debug for ByteOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ByteOrder")
            .field("layout", &self.layout)
            .finish()
    }
}

impl PartialEq for ByteOrder {
    fn eq(&self, other: &Self) -> bool {
        self.layout == other.layout
    }
}

impl Eq for ByteOrder {}

impl Default for ByteOrder {
    fn default() -> Self {
        Self::native()
    }
}

impl ByteOrder {
    /// Routines for a host known to be little-endian.
    pub const LITTLE: ByteOrder = ByteOrder {
        layout: HostLayout::LittleEndian,
        load16: swapped::load16,
        load32: swapped::load32,
        load64: swapped::load64,
        store16: swapped::store16,
        store32: swapped::store32,
        store64: swapped::store64,
    };

    /// Routines for a host known to be big-endian.
    pub const BIG: ByteOrder = ByteOrder {
        layout: HostLayout::BigEndian,
        load16: direct::load16,
        load32: direct::load32,
        load64: direct::load64,
        store16: direct::store16,
        store32: direct::store32,
        store64: direct::store64,
    };

    /// Byte-wise routines that do not depend on the host layout.
    pub const PORTABLE: ByteOrder = ByteOrder {
        layout: HostLayout::Portable,
        load16: bytewise::load16,
        load32: bytewise::load32,
        load64: bytewise::load64,
        store16: bytewise::store16,
        store32: bytewise::store32,
        store64: bytewise::store64,
    };

    /// The specialised routines for the target this crate was compiled for.
    pub const fn native() -> Self {
        NATIVE
    }

    /// Looks up the routines for a layout.
    pub const fn for_layout(layout: HostLayout) -> Self {
        match layout {
            HostLayout::LittleEndian => Self::LITTLE,
            HostLayout::BigEndian => Self::BIG,
            HostLayout::Portable => Self::PORTABLE,
        }
    }

    /// The layout these routines assume.
    pub fn layout(&self) -> HostLayout {
        self.layout
    }

    /// Checks at runtime that the assumed layout matches the host.
    ///
    /// Returns [`BufferError::WrongByteOrder`] when a specialised strategy is
    /// used on a host with the opposite layout. The portable strategy always
    /// passes.
    pub fn verify(&self) -> Result<(), BufferError> {
        let probe = u32::from_ne_bytes(*b"1234");
        let ok = match self.layout {
            HostLayout::LittleEndian => probe == 0x3433_3231,
            HostLayout::BigEndian => probe == 0x3132_3334,
            HostLayout::Portable => true,
        };
        if ok {
            Ok(())
        } else {
            Err(BufferError::WrongByteOrder)
        }
    }

    #[inline]
    pub fn load_u16(&self, src: &[u8]) -> u16 {
        (self.load16)(src)
    }

    #[inline]
    pub fn load_u32(&self, src: &[u8]) -> u32 {
        (self.load32)(src)
    }

    #[inline]
    pub fn load_u64(&self, src: &[u8]) -> u64 {
        (self.load64)(src)
    }

    #[inline]
    pub fn load_i16(&self, src: &[u8]) -> i16 {
        (self.load16)(src) as i16
    }

    #[inline]
    pub fn load_i32(&self, src: &[u8]) -> i32 {
        (self.load32)(src) as i32
    }

    #[inline]
    pub fn load_i64(&self, src: &[u8]) -> i64 {
        (self.load64)(src) as i64
    }

    #[inline]
    pub fn load_f32(&self, src: &[u8]) -> f32 {
        f32::from_bits((self.load32)(src))
    }

    #[inline]
    pub fn load_f64(&self, src: &[u8]) -> f64 {
        f64::from_bits((self.load64)(src))
    }

    #[inline]
    pub fn store_u16(&self, dst: &mut [u8], value: u16) {
        (self.store16)(dst, value)
    }

    #[inline]
    pub fn store_u32(&self, dst: &mut [u8], value: u32) {
        (self.store32)(dst, value)
    }

    #[inline]
    pub fn store_u64(&self, dst: &mut [u8], value: u64) {
        (self.store64)(dst, value)
    }

    #[inline]
    pub fn store_f32(&self, dst: &mut [u8], value: f32) {
        (self.store32)(dst, value.to_bits())
    }

    #[inline]
    pub fn store_f64(&self, dst: &mut [u8], value: f64) {
        (self.store64)(dst, value.to_bits())
    }
}

mod swapped {
    pub(super) fn load16(src: &[u8]) -> u16 {
        u16::from_ne_bytes([src[0], src[1]]).swap_bytes()
    }

    pub(super) fn load32(src: &[u8]) -> u32 {
        u32::from_ne_bytes([src[0], src[1], src[2], src[3]]).swap_bytes()
    }

    pub(super) fn load64(src: &[u8]) -> u64 {
        u64::from_ne_bytes([
            src[0], src[1], src[2], src[3], src[4], src[5], src[6], src[7],
        ])
        .swap_bytes()
    }

    pub(super) fn store16(dst: &mut [u8], value: u16) {
        dst[..2].copy_from_slice(&value.swap_bytes().to_ne_bytes());
    }

    pub(super) fn store32(dst: &mut [u8], value: u32) {
        dst[..4].copy_from_slice(&value.swap_bytes().to_ne_bytes());
    }

    pub(super) fn store64(dst: &mut [u8], value: u64) {
        dst[..8].copy_from_slice(&value.swap_bytes().to_ne_bytes());
    }
}

mod direct {
    pub(super) fn load16(src: &[u8]) -> u16 {
        u16::from_ne_bytes([src[0], src[1]])
    }

    pub(super) fn load32(src: &[u8]) -> u32 {
        u32::from_ne_bytes([src[0], src[1], src[2], src[3]])
    }

    pub(super) fn load64(src: &[u8]) -> u64 {
        u64::from_ne_bytes([
            src[0], src[1], src[2], src[3], src[4], src[5], src[6], src[7],
        ])
    }

    pub(super) fn store16(dst: &mut [u8], value: u16) {
        dst[..2].copy_from_slice(&value.to_ne_bytes());
    }

    pub(super) fn store32(dst: &mut [u8], value: u32) {
        dst[..4].copy_from_slice(&value.to_ne_bytes());
    }

    pub(super) fn store64(dst: &mut [u8], value: u64) {
        dst[..8].copy_from_slice(&value.to_ne_bytes());
    }
}

mod bytewise {
    pub(super) fn load16(src: &[u8]) -> u16 {
        ((src[0] as u16) << 8) | (src[1] as u16)
    }

    pub(super) fn load32(src: &[u8]) -> u32 {
        ((src[0] as u32) << 24) | ((src[1] as u32) << 16) | ((src[2] as u32) << 8) | (src[3] as u32)
    }

    pub(super) fn load64(src: &[u8]) -> u64 {
        src[..8]
            .iter()
            .fold(0u64, |acc, &byte| (acc << 8) | byte as u64)
    }

    pub(super) fn store16(dst: &mut [u8], value: u16) {
        dst[0] = (value >> 8) as u8;
        dst[1] = value as u8;
    }

    pub(super) fn store32(dst: &mut [u8], value: u32) {
        dst[0] = (value >> 24) as u8;
        dst[1] = (value >> 16) as u8;
        dst[2] = (value >> 8) as u8;
        dst[3] = value as u8;
    }

    pub(super) fn store64(dst: &mut [u8], value: u64) {
        for (i, byte) in dst[..8].iter_mut().enumerate() {
            *byte = (value >> (56 - 8 * i)) as u8;
        }
    }
}
