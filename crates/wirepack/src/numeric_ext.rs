//! Numbers carried inside user extensions.
//!
//! Applications sometimes tag a number with an ext type to give it a meaning
//! the plain integer and float items cannot express (a unit, an identifier
//! space, a record label). The payload is the big-endian value in the
//! smallest fixext that holds it.

use wirepack_buffers::Reader;

use crate::constants::{FIXEXT1, FIXEXT2, FIXEXT4, FIXEXT8, MIN_USER_EXT};
use crate::{Item, PackContext, PackHandler, UnpackContext, UnpackHandler, WireError};

impl<H: PackHandler> PackContext<H> {
    /// Packs `value` as a fixext 1, 2, 4 or 8 of type `ext_type`, whichever
    /// is the smallest that holds the signed value.
    pub fn pack_ext_integer(&mut self, ext_type: i8, value: i64) -> Result<(), WireError> {
        self.run(|ctx| {
            if ctx.config().be_compatible {
                return Err(WireError::IllegalCall);
            }
            if let Ok(v) = i8::try_from(value) {
                ctx.emit(3, |out, _| {
                    out[..2].copy_from_slice(&[FIXEXT1, ext_type as u8]);
                    out[2] = v as u8;
                })
            } else if let Ok(v) = i16::try_from(value) {
                ctx.emit(4, |out, order| {
                    out[..2].copy_from_slice(&[FIXEXT2, ext_type as u8]);
                    order.store_u16(&mut out[2..], v as u16);
                })
            } else if let Ok(v) = i32::try_from(value) {
                ctx.emit(6, |out, order| {
                    out[..2].copy_from_slice(&[FIXEXT4, ext_type as u8]);
                    order.store_u32(&mut out[2..], v as u32);
                })
            } else {
                ctx.emit(10, |out, order| {
                    out[..2].copy_from_slice(&[FIXEXT8, ext_type as u8]);
                    order.store_u64(&mut out[2..], value as u64);
                })
            }
        })
    }

    /// Packs `value` as a fixext 4 of type `ext_type`.
    pub fn pack_ext_f32(&mut self, ext_type: i8, value: f32) -> Result<(), WireError> {
        self.run(|ctx| {
            if ctx.config().be_compatible {
                return Err(WireError::IllegalCall);
            }
            ctx.emit(6, |out, order| {
                out[..2].copy_from_slice(&[FIXEXT4, ext_type as u8]);
                order.store_f32(&mut out[2..], value);
            })
        })
    }

    /// Packs `value` as a fixext 8 of type `ext_type`.
    pub fn pack_ext_f64(&mut self, ext_type: i8, value: f64) -> Result<(), WireError> {
        self.run(|ctx| {
            if ctx.config().be_compatible {
                return Err(WireError::IllegalCall);
            }
            ctx.emit(10, |out, order| {
                out[..2].copy_from_slice(&[FIXEXT8, ext_type as u8]);
                order.store_f64(&mut out[2..], value);
            })
        })
    }
}

impl<H: UnpackHandler> UnpackContext<'_, H> {
    /// Interprets the current item's payload with `read`, provided the item
    /// is a user extension.
    fn current_user_ext<T>(
        &mut self,
        read: impl FnOnce(&[u8], &mut Reader<'_>) -> Result<T, WireError>,
    ) -> Result<T, WireError> {
        self.status()?;
        let order = self.config().byte_order;
        let result = match self.item() {
            Some(Item::Ext(ext_type, payload)) if ext_type >= MIN_USER_EXT => {
                let mut reader = Reader::with_byte_order(payload, order);
                read(payload, &mut reader)
            }
            _ => Err(WireError::TypeError),
        };
        self.settle(result)
    }

    /// The signed integer in the current user ext item. An empty payload
    /// reads as zero.
    pub fn ext_integer(&mut self) -> Result<i64, WireError> {
        self.current_user_ext(|payload, reader| match payload.len() {
            0 => Ok(0),
            1 => Ok(reader.i8()? as i64),
            2 => Ok(reader.i16()? as i64),
            4 => Ok(reader.i32()? as i64),
            8 => Ok(reader.i64()?),
            _ => Err(WireError::ValueError),
        })
    }

    /// The `f32` in the current user ext item.
    pub fn ext_f32(&mut self) -> Result<f32, WireError> {
        self.current_user_ext(|payload, reader| match payload.len() {
            4 => Ok(reader.f32()?),
            _ => Err(WireError::ValueError),
        })
    }

    /// The `f64` in the current user ext item.
    pub fn ext_f64(&mut self) -> Result<f64, WireError> {
        self.current_user_ext(|payload, reader| match payload.len() {
            8 => Ok(reader.f64()?),
            _ => Err(WireError::ValueError),
        })
    }
}
