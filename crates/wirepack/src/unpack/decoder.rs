//! Item decoding.

use wirepack_buffers::Reader;

use super::{Decoded, UnpackContext, UnpackHandler};
use crate::constants::*;
use crate::{Descriptor, Item, Timestamp, WireError};

/// Signed tags carry non-negative values too; those are positive integers.
fn signed(value: i64) -> Descriptor {
    if value >= 0 {
        Descriptor::PositiveInteger(value as u64)
    } else {
        Descriptor::NegativeInteger(value)
    }
}

impl<'a, H: UnpackHandler> UnpackContext<'a, H> {
    /// Decodes the next item's header.
    ///
    /// Scalars are consumed completely. For str, bin and ext items only the
    /// header is consumed; the caller reads or skips the payload itself.
    /// Timestamps are decoded in full.
    pub fn next_descriptor(&mut self) -> Result<Descriptor, WireError> {
        self.run(|ctx| {
            ctx.last = None;
            let descriptor = ctx.read_descriptor()?;
            ctx.last = Some(Decoded {
                descriptor,
                payload_at: None,
            });
            Ok(descriptor)
        })
    }

    /// Decodes the next item, making sure any payload is buffered.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Result<Item<'_>, WireError> {
        let (descriptor, payload_at) = self.run(|ctx| {
            ctx.last = None;
            let descriptor = ctx.read_descriptor()?;
            let payload_at = match descriptor.blob_len() {
                Some(len) => Some(ctx.ensure(len as usize, false)?),
                None => None,
            };
            let (discarded, start) = (ctx.buffer.discarded, ctx.buffer.start);
            ctx.last = Some(Decoded {
                descriptor,
                payload_at: payload_at.map(|at| discarded + (at - start) as u64),
            });
            Ok((descriptor, payload_at))
        })?;
        let payload = match (payload_at, descriptor.blob_len()) {
            (Some(at), Some(len)) => self.bytes(at, len as usize),
            _ => &[],
        };
        Ok(Item::from_descriptor(descriptor, payload))
    }

    fn read_descriptor(&mut self) -> Result<Descriptor, WireError> {
        let at = self.ensure(1, true)?;
        let tag = self.buffer.data[at];
        let descriptor = match tag {
            0x00..=POS_FIXINT_MAX => Descriptor::PositiveInteger(tag as u64),
            FIXMAP..=0x8f => Descriptor::Map((tag & FIXMAP_MASK) as u32),
            FIXARRAY..=0x9f => Descriptor::Array((tag & FIXARRAY_MASK) as u32),
            FIXSTR..=0xbf => Descriptor::Str((tag & FIXSTR_MASK) as u32),
            NIL => Descriptor::Nil,
            FALSE => Descriptor::Boolean(false),
            TRUE => Descriptor::Boolean(true),
            BIN8 => Descriptor::Bin(self.read_u8()? as u32),
            BIN16 => Descriptor::Bin(self.read_u16()? as u32),
            BIN32 => Descriptor::Bin(self.read_u32()?),
            EXT8 => {
                let len = self.read_u8()? as u32;
                self.read_ext(tag, len)?
            }
            EXT16 => {
                let len = self.read_u16()? as u32;
                self.read_ext(tag, len)?
            }
            EXT32 => {
                let len = self.read_u32()?;
                self.read_ext(tag, len)?
            }
            FLOAT32 => Descriptor::Float(f32::from_bits(self.read_u32()?)),
            FLOAT64 => Descriptor::Double(f64::from_bits(self.read_u64()?)),
            UINT8 => Descriptor::PositiveInteger(self.read_u8()? as u64),
            UINT16 => Descriptor::PositiveInteger(self.read_u16()? as u64),
            UINT32 => Descriptor::PositiveInteger(self.read_u32()? as u64),
            UINT64 => Descriptor::PositiveInteger(self.read_u64()?),
            INT8 => signed(self.read_u8()? as i8 as i64),
            INT16 => signed(self.read_u16()? as i16 as i64),
            INT32 => signed(self.read_u32()? as i32 as i64),
            INT64 => signed(self.read_u64()? as i64),
            FIXEXT1..=FIXEXT16 => self.read_ext(tag, 1 << (tag - FIXEXT1))?,
            STR8 => Descriptor::Str(self.read_u8()? as u32),
            STR16 => Descriptor::Str(self.read_u16()? as u32),
            STR32 => Descriptor::Str(self.read_u32()?),
            ARRAY16 => Descriptor::Array(self.read_u16()? as u32),
            ARRAY32 => Descriptor::Array(self.read_u32()?),
            MAP16 => Descriptor::Map(self.read_u16()? as u32),
            MAP32 => Descriptor::Map(self.read_u32()?),
            NEG_FIXINT_MIN..=0xff => Descriptor::NegativeInteger(tag as i8 as i64),
            NEVER_USED => return Err(WireError::MalformedInput),
        };
        Ok(descriptor)
    }

    /// Reads the type byte of an ext whose payload is `len` bytes. A
    /// timestamp payload is consumed and decoded here; it is only accepted
    /// as fixext 4, fixext 8 or ext 8 with 12 bytes.
    fn read_ext(&mut self, tag: u8, len: u32) -> Result<Descriptor, WireError> {
        let ext_type = self.read_u8()? as i8;
        if ext_type != TIMESTAMP_EXT {
            return Ok(Descriptor::Ext(ext_type, len));
        }
        let order = self.config.byte_order;
        let time = match (tag, len) {
            (FIXEXT4, 4) => Timestamp::new(self.read_u32()? as i64, 0),
            (FIXEXT8, 8) => {
                let data64 = self.read_u64()?;
                Timestamp::new(
                    (data64 & TIMESTAMP64_SEC_MASK) as i64,
                    (data64 >> TIMESTAMP64_NSEC_SHIFT) as u32,
                )
            }
            (EXT8, 12) => {
                let at = self.ensure(12, false)?;
                let mut reader = Reader::with_byte_order(self.bytes(at, 12), order);
                let nanos = reader.u32()?;
                let secs = reader.i64()?;
                Timestamp::new(secs, nanos)
            }
            _ => return Err(WireError::WrongTimestampLength),
        };
        Ok(Descriptor::Timestamp(time))
    }

    pub(super) fn read_u8(&mut self) -> Result<u8, WireError> {
        let at = self.ensure(1, false)?;
        Ok(self.buffer.data[at])
    }

    pub(super) fn read_u16(&mut self) -> Result<u16, WireError> {
        let at = self.ensure(2, false)?;
        Ok(self.config.byte_order.load_u16(self.bytes(at, 2)))
    }

    pub(super) fn read_u32(&mut self) -> Result<u32, WireError> {
        let at = self.ensure(4, false)?;
        Ok(self.config.byte_order.load_u32(self.bytes(at, 4)))
    }

    pub(super) fn read_u64(&mut self) -> Result<u64, WireError> {
        let at = self.ensure(8, false)?;
        Ok(self.config.byte_order.load_u64(self.bytes(at, 8)))
    }
}

#[cfg(test)]
mod tests {
    use crate::contexts::Exhausted;
    use crate::{Descriptor, Item, Timestamp, UnpackBuffer, UnpackContext, WireError};

    fn decode(data: &[u8]) -> Result<Descriptor, WireError> {
        let mut ctx = UnpackContext::new(UnpackBuffer::from_slice(data), Exhausted);
        ctx.next_descriptor()
    }

    #[test]
    fn test_inline_tags() {
        assert_eq!(decode(&[0x7f]), Ok(Descriptor::PositiveInteger(127)));
        assert_eq!(decode(&[0xe0]), Ok(Descriptor::NegativeInteger(-32)));
        assert_eq!(decode(&[0x8f]), Ok(Descriptor::Map(15)));
        assert_eq!(decode(&[0x93]), Ok(Descriptor::Array(3)));
        assert_eq!(decode(&[0xbf]), Ok(Descriptor::Str(31)));
        assert_eq!(decode(&[0xc0]), Ok(Descriptor::Nil));
        assert_eq!(decode(&[0xc2]), Ok(Descriptor::Boolean(false)));
    }

    #[test]
    fn test_never_used_tag_is_malformed() {
        assert_eq!(decode(&[0xc1]), Err(WireError::MalformedInput));
    }

    #[test]
    fn test_signed_tags_reclassify_non_negative() {
        assert_eq!(decode(&[0xd0, 0x05]), Ok(Descriptor::PositiveInteger(5)));
        assert_eq!(decode(&[0xd1, 0xff, 0xfe]), Ok(Descriptor::NegativeInteger(-2)));
        assert_eq!(
            decode(&[0xd2, 0xff, 0xff, 0x7f, 0xff]),
            Ok(Descriptor::NegativeInteger(-32769))
        );
    }

    #[test]
    fn test_truncation_codes() {
        assert_eq!(decode(&[]), Err(WireError::EndOfInput));
        assert_eq!(decode(&[0xcd, 0x01]), Err(WireError::BufferUnderflow));
    }

    #[test]
    fn test_timestamp_forms() {
        assert_eq!(
            decode(&[0xd6, 0xff, 0, 0, 0, 7]),
            Ok(Descriptor::Timestamp(Timestamp::new(7, 0)))
        );
        assert_eq!(
            decode(&[0xd7, 0xff, 0x00, 0x00, 0x00, 0x08, 0x00, 0x00, 0x00, 0x01]),
            Ok(Descriptor::Timestamp(Timestamp::new(1, 2)))
        );
        let mut wide = vec![0xc7, 12, 0xff, 0, 0, 0, 9];
        wide.extend_from_slice(&(-5i64).to_be_bytes());
        assert_eq!(decode(&wide), Ok(Descriptor::Timestamp(Timestamp::new(-5, 9))));
        assert_eq!(
            decode(&[0xd4, 0xff, 0x00]),
            Err(WireError::WrongTimestampLength)
        );
    }

    #[test]
    fn test_timestamp_needs_its_own_form() {
        let mut ext16 = vec![0xc8, 0x00, 0x0c, 0xff];
        ext16.extend_from_slice(&[0; 12]);
        assert_eq!(decode(&ext16), Err(WireError::WrongTimestampLength));
        assert_eq!(
            decode(&[0xc7, 0x04, 0xff, 0, 0, 0, 7]),
            Err(WireError::WrongTimestampLength)
        );
        assert_eq!(
            decode(&[0xc7, 0x08, 0xff, 0, 0, 0, 0, 0, 0, 0, 1]),
            Err(WireError::WrongTimestampLength)
        );
        let mut ext32 = vec![0xc9, 0x00, 0x00, 0x00, 0x04, 0xff];
        ext32.extend_from_slice(&[0; 4]);
        assert_eq!(decode(&ext32), Err(WireError::WrongTimestampLength));
        // Other ext types keep any form.
        assert_eq!(decode(&[0xc7, 0x04, 0x05, 0, 0, 0, 7]), Ok(Descriptor::Ext(5, 4)));
    }

    #[test]
    fn test_next_returns_payloads() {
        let data = [0xc4, 0x02, 0xaa, 0xbb, 0xd5, 0x07, 0x01, 0x02];
        let mut ctx = UnpackContext::new(UnpackBuffer::from_slice(&data), Exhausted);
        assert_eq!(ctx.next().unwrap(), Item::Bin(&[0xaa, 0xbb]));
        assert_eq!(ctx.next().unwrap(), Item::Ext(7, &[0x01, 0x02]));
        assert_eq!(ctx.next(), Err(WireError::EndOfInput));
    }

    #[test]
    fn test_descriptor_leaves_payload() {
        let data = [0xa3, b'a', b'b', b'c'];
        let mut ctx = UnpackContext::new(UnpackBuffer::from_slice(&data), Exhausted);
        assert_eq!(ctx.next_descriptor(), Ok(Descriptor::Str(3)));
        assert_eq!(ctx.buffer().unread(), b"abc");
        assert!(ctx.item().is_none());
    }

    #[test]
    fn test_short_payload_is_underflow() {
        let data = [0xa3, b'a'];
        let mut ctx = UnpackContext::new(UnpackBuffer::from_slice(&data), Exhausted);
        assert_eq!(ctx.next(), Err(WireError::BufferUnderflow));
        assert_eq!(ctx.next(), Err(WireError::BufferUnderflow));
    }
}
