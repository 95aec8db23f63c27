//! Walking the input without materializing items.

use super::{UnpackContext, UnpackHandler};
use crate::constants::*;
use crate::{ItemType, WireError};

impl<'a, H: UnpackHandler> UnpackContext<'a, H> {
    /// Skips `count` items, including everything nested inside them.
    ///
    /// Nesting is flattened into a single counter: an array adds its element
    /// count, a map twice its entry count.
    pub fn skip_items(&mut self, count: u64) -> Result<(), WireError> {
        self.run(|ctx| {
            ctx.last = None;
            let mut remaining = count;
            while remaining > 0 {
                remaining -= 1;
                let at = ctx.ensure(1, true)?;
                let tag = ctx.buffer.data[at];
                let skip = match tag {
                    0x00..=POS_FIXINT_MAX | NEG_FIXINT_MIN..=0xff | NIL | FALSE | TRUE => 0,
                    FIXMAP..=0x8f => {
                        remaining += 2 * (tag & FIXMAP_MASK) as u64;
                        0
                    }
                    FIXARRAY..=0x9f => {
                        remaining += (tag & FIXARRAY_MASK) as u64;
                        0
                    }
                    FIXSTR..=0xbf => (tag & FIXSTR_MASK) as usize,
                    UINT8 | INT8 => 1,
                    UINT16 | INT16 => 2,
                    FLOAT32 | UINT32 | INT32 => 4,
                    FLOAT64 | UINT64 | INT64 => 8,
                    FIXEXT1..=FIXEXT16 => 1 + (1 << (tag - FIXEXT1)),
                    STR8 | BIN8 => ctx.read_u8()? as usize,
                    STR16 | BIN16 => ctx.read_u16()? as usize,
                    STR32 | BIN32 => ctx.read_u32()? as usize,
                    EXT8 => ctx.read_u8()? as usize + 1,
                    EXT16 => ctx.read_u16()? as usize + 1,
                    EXT32 => ctx.read_u32()? as usize + 1,
                    ARRAY16 => {
                        remaining += ctx.read_u16()? as u64;
                        0
                    }
                    ARRAY32 => {
                        remaining += ctx.read_u32()? as u64;
                        0
                    }
                    MAP16 => {
                        remaining += 2 * ctx.read_u16()? as u64;
                        0
                    }
                    MAP32 => {
                        remaining += 2 * ctx.read_u32()? as u64;
                        0
                    }
                    NEVER_USED => return Err(WireError::MalformedInput),
                };
                if skip > 0 {
                    ctx.ensure(skip, false)?;
                }
            }
            Ok(())
        })
    }

    /// Reports the type of the next item without consuming it.
    ///
    /// For extensions the type byte is read too, so timestamps and the
    /// individual ext types are told apart. Whenever the type cannot be
    /// determined, including on a context that already failed, the result is
    /// [`ItemType::NotAnItem`] and the sticky code is left untouched.
    pub fn look_ahead(&mut self) -> ItemType {
        if self.status.is_err() {
            return ItemType::NotAnItem;
        }
        let tag = match self.peek(1) {
            Some(bytes) => bytes[0],
            None => return ItemType::NotAnItem,
        };
        let ext_type_at = |ctx: &mut Self, header: usize| match ctx.peek(header) {
            Some(bytes) => ItemType::from_ext_type(bytes[header - 1] as i8),
            None => ItemType::NotAnItem,
        };
        let signed_at = |ctx: &mut Self, width: usize| match ctx.peek(1 + width) {
            Some(bytes) if bytes[1] & 0x80 == 0 => ItemType::PositiveInteger,
            Some(_) => ItemType::NegativeInteger,
            None => ItemType::NotAnItem,
        };
        match tag {
            0x00..=POS_FIXINT_MAX | UINT8..=UINT64 => ItemType::PositiveInteger,
            NEG_FIXINT_MIN..=0xff => ItemType::NegativeInteger,
            FIXMAP..=0x8f | MAP16 | MAP32 => ItemType::Map,
            FIXARRAY..=0x9f | ARRAY16 | ARRAY32 => ItemType::Array,
            FIXSTR..=0xbf | STR8..=STR32 => ItemType::Str,
            NIL => ItemType::Nil,
            FALSE | TRUE => ItemType::Boolean,
            BIN8..=BIN32 => ItemType::Bin,
            EXT8 => ext_type_at(self, 3),
            EXT16 => ext_type_at(self, 4),
            EXT32 => ext_type_at(self, 6),
            FIXEXT1..=FIXEXT16 => ext_type_at(self, 2),
            FLOAT32 => ItemType::Float,
            FLOAT64 => ItemType::Double,
            INT8 => signed_at(self, 1),
            INT16 => signed_at(self, 2),
            INT32 => signed_at(self, 4),
            INT64 => signed_at(self, 8),
            NEVER_USED => ItemType::NotAnItem,
        }
    }
}
