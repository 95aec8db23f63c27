//! Value encoders. Each picks the shortest representation for its input.

use std::time::SystemTime;

use super::{PackContext, PackHandler};
use crate::constants::*;
use crate::{Timestamp, WireError};

fn wire_len(len: usize) -> Result<u32, WireError> {
    u32::try_from(len).map_err(|_| WireError::ValueError)
}

impl<H: PackHandler> PackContext<H> {
    pub fn pack_nil(&mut self) -> Result<(), WireError> {
        self.run(|ctx| ctx.emit(1, |out, _| out[0] = NIL))
    }

    pub fn pack_true(&mut self) -> Result<(), WireError> {
        self.run(|ctx| ctx.emit(1, |out, _| out[0] = TRUE))
    }

    pub fn pack_false(&mut self) -> Result<(), WireError> {
        self.run(|ctx| ctx.emit(1, |out, _| out[0] = FALSE))
    }

    pub fn pack_bool(&mut self, value: bool) -> Result<(), WireError> {
        if value {
            self.pack_true()
        } else {
            self.pack_false()
        }
    }

    pub fn pack_unsigned(&mut self, value: u64) -> Result<(), WireError> {
        self.run(|ctx| ctx.write_unsigned(value))
    }

    pub fn pack_signed(&mut self, value: i64) -> Result<(), WireError> {
        self.run(|ctx| ctx.write_signed(value))
    }

    pub fn pack_f32(&mut self, value: f32) -> Result<(), WireError> {
        self.run(|ctx| ctx.write_f32(value))
    }

    pub fn pack_f64(&mut self, value: f64) -> Result<(), WireError> {
        self.run(|ctx| ctx.write_f64(value))
    }

    /// Packs a double in the smallest form that preserves it: an integer
    /// when it is integral and within `i32::MIN..=u32::MAX`, a float when the
    /// f32 conversion is exact, a double otherwise.
    pub fn pack_f64_opt(&mut self, value: f64) -> Result<(), WireError> {
        self.run(|ctx| {
            if value.fract() == 0.0 && value >= i32::MIN as f64 && value <= u32::MAX as f64 {
                return ctx.write_signed(value as i64);
            }
            let narrow = value as f32;
            if narrow as f64 == value {
                ctx.write_f32(narrow)
            } else {
                ctx.write_f64(value)
            }
        })
    }

    /// Packs a float as an integer when it is integral and within
    /// `i16::MIN..=u16::MAX`, otherwise as a float.
    pub fn pack_f32_opt(&mut self, value: f32) -> Result<(), WireError> {
        self.run(|ctx| {
            if value.fract() == 0.0 && value >= i16::MIN as f32 && value <= u16::MAX as f32 {
                ctx.write_signed(value as i64)
            } else {
                ctx.write_f32(value)
            }
        })
    }

    pub fn pack_array_size(&mut self, size: u32) -> Result<(), WireError> {
        self.run(|ctx| ctx.write_container(size, FIXARRAY, ARRAY16, ARRAY32))
    }

    pub fn pack_map_size(&mut self, size: u32) -> Result<(), WireError> {
        self.run(|ctx| ctx.write_container(size, FIXMAP, MAP16, MAP32))
    }

    pub fn pack_str(&mut self, value: &str) -> Result<(), WireError> {
        self.pack_str_bytes(value.as_bytes())
    }

    /// Packs `bytes` as a str item without checking that they are UTF-8.
    pub fn pack_str_bytes(&mut self, bytes: &[u8]) -> Result<(), WireError> {
        self.run(|ctx| ctx.write_str(bytes))
    }

    /// Packs only a str header; the caller appends `len` bytes with
    /// [`insert`](Self::insert).
    pub fn pack_str_size(&mut self, len: u32) -> Result<(), WireError> {
        self.run(|ctx| ctx.write_str_header(len, 0).map(|_| ()))
    }

    pub fn pack_bin(&mut self, bytes: &[u8]) -> Result<(), WireError> {
        self.run(|ctx| {
            if ctx.config.be_compatible {
                return ctx.write_str(bytes);
            }
            let at = ctx.write_bin_header(wire_len(bytes.len())?, bytes.len())?;
            ctx.buffer.data[at..at + bytes.len()].copy_from_slice(bytes);
            Ok(())
        })
    }

    pub fn pack_bin_size(&mut self, len: u32) -> Result<(), WireError> {
        self.run(|ctx| {
            let written = if ctx.config.be_compatible {
                ctx.write_str_header(len, 0)
            } else {
                ctx.write_bin_header(len, 0)
            };
            written.map(|_| ())
        })
    }

    pub fn pack_ext(&mut self, ext_type: i8, payload: &[u8]) -> Result<(), WireError> {
        self.run(|ctx| {
            let at = ctx.write_ext_header(ext_type, wire_len(payload.len())?, payload.len())?;
            ctx.buffer.data[at..at + payload.len()].copy_from_slice(payload);
            Ok(())
        })
    }

    pub fn pack_ext_size(&mut self, ext_type: i8, len: u32) -> Result<(), WireError> {
        self.run(|ctx| ctx.write_ext_header(ext_type, len, 0).map(|_| ()))
    }

    /// Packs a timestamp in the 32, 64 or 96-bit form, whichever is the
    /// smallest that holds it.
    pub fn pack_timestamp(&mut self, secs: i64, nanos: u32) -> Result<(), WireError> {
        self.run(|ctx| {
            if ctx.config.be_compatible {
                return Err(WireError::IllegalCall);
            }
            if nanos >= NANOS_PER_SEC {
                return Err(WireError::ValueError);
            }
            if (secs as u64) & !TIMESTAMP64_SEC_MASK != 0 {
                return ctx.emit(15, |out, order| {
                    out[0] = EXT8;
                    out[1] = 12;
                    out[2] = TIMESTAMP_EXT as u8;
                    order.store_u32(&mut out[3..], nanos);
                    order.store_u64(&mut out[7..], secs as u64);
                });
            }
            let data64 = ((nanos as u64) << TIMESTAMP64_NSEC_SHIFT) | secs as u64;
            if data64 >> 32 != 0 {
                ctx.emit(10, |out, order| {
                    out[0] = FIXEXT8;
                    out[1] = TIMESTAMP_EXT as u8;
                    order.store_u64(&mut out[2..], data64);
                })
            } else {
                ctx.emit(6, |out, order| {
                    out[0] = FIXEXT4;
                    out[1] = TIMESTAMP_EXT as u8;
                    order.store_u32(&mut out[2..], data64 as u32);
                })
            }
        })
    }

    pub fn pack_time(&mut self, time: Timestamp) -> Result<(), WireError> {
        self.pack_timestamp(time.secs, time.nanos)
    }

    pub fn pack_system_time(&mut self, time: SystemTime) -> Result<(), WireError> {
        self.pack_time(Timestamp::from(time))
    }

    /// Packs a number of seconds since the epoch as a timestamp, flooring to
    /// whole seconds and keeping the fraction as nanoseconds.
    pub fn pack_time_interval(&mut self, secs: f64) -> Result<(), WireError> {
        let whole = secs.floor();
        let nanos = ((secs - whole) * NANOS_PER_SEC as f64) as u32;
        self.pack_timestamp(whole as i64, nanos.min(NANOS_PER_SEC - 1))
    }

    fn write_unsigned(&mut self, value: u64) -> Result<(), WireError> {
        if value <= POS_FIXINT_MAX as u64 {
            self.emit(1, |out, _| out[0] = value as u8)
        } else if value <= u8::MAX as u64 {
            self.emit(2, |out, _| {
                out[0] = UINT8;
                out[1] = value as u8;
            })
        } else if value <= u16::MAX as u64 {
            self.emit(3, |out, order| {
                out[0] = UINT16;
                order.store_u16(&mut out[1..], value as u16);
            })
        } else if value <= u32::MAX as u64 {
            self.emit(5, |out, order| {
                out[0] = UINT32;
                order.store_u32(&mut out[1..], value as u32);
            })
        } else {
            self.emit(9, |out, order| {
                out[0] = UINT64;
                order.store_u64(&mut out[1..], value);
            })
        }
    }

    fn write_signed(&mut self, value: i64) -> Result<(), WireError> {
        if value > POS_FIXINT_MAX as i64 {
            self.write_unsigned(value as u64)
        } else if value >= -32 {
            self.emit(1, |out, _| out[0] = value as u8)
        } else if value >= i8::MIN as i64 {
            self.emit(2, |out, _| {
                out[0] = INT8;
                out[1] = value as u8;
            })
        } else if value >= i16::MIN as i64 {
            self.emit(3, |out, order| {
                out[0] = INT16;
                order.store_u16(&mut out[1..], value as u16);
            })
        } else if value >= i32::MIN as i64 {
            self.emit(5, |out, order| {
                out[0] = INT32;
                order.store_u32(&mut out[1..], value as u32);
            })
        } else {
            self.emit(9, |out, order| {
                out[0] = INT64;
                order.store_u64(&mut out[1..], value as u64);
            })
        }
    }

    fn write_f32(&mut self, value: f32) -> Result<(), WireError> {
        self.emit(5, |out, order| {
            out[0] = FLOAT32;
            order.store_f32(&mut out[1..], value);
        })
    }

    fn write_f64(&mut self, value: f64) -> Result<(), WireError> {
        self.emit(9, |out, order| {
            out[0] = FLOAT64;
            order.store_f64(&mut out[1..], value);
        })
    }

    fn write_container(&mut self, size: u32, fix: u8, tag16: u8, tag32: u8) -> Result<(), WireError> {
        if size < 16 {
            self.emit(1, |out, _| out[0] = fix | size as u8)
        } else if size <= u16::MAX as u32 {
            self.emit(3, |out, order| {
                out[0] = tag16;
                order.store_u16(&mut out[1..], size as u16);
            })
        } else {
            self.emit(5, |out, order| {
                out[0] = tag32;
                order.store_u32(&mut out[1..], size);
            })
        }
    }

    fn write_str(&mut self, bytes: &[u8]) -> Result<(), WireError> {
        let at = self.write_str_header(wire_len(bytes.len())?, bytes.len())?;
        self.buffer.data[at..at + bytes.len()].copy_from_slice(bytes);
        Ok(())
    }

    // The header helpers reserve `payload` extra bytes after the header in
    // the same claim and return the offset where the payload goes.

    fn write_str_header(&mut self, len: u32, payload: usize) -> Result<usize, WireError> {
        let header = if len < 32 {
            1
        } else if len <= u8::MAX as u32 && !self.config.be_compatible {
            2
        } else if len <= u16::MAX as u32 {
            3
        } else {
            5
        };
        let at = self.reserve(header + payload)?;
        let order = self.config.byte_order;
        let out = &mut self.buffer.data[at..at + header];
        match header {
            1 => out[0] = FIXSTR | len as u8,
            2 => {
                out[0] = STR8;
                out[1] = len as u8;
            }
            3 => {
                out[0] = STR16;
                order.store_u16(&mut out[1..], len as u16);
            }
            _ => {
                out[0] = STR32;
                order.store_u32(&mut out[1..], len);
            }
        }
        Ok(at + header)
    }

    fn write_bin_header(&mut self, len: u32, payload: usize) -> Result<usize, WireError> {
        let header = if len <= u8::MAX as u32 {
            2
        } else if len <= u16::MAX as u32 {
            3
        } else {
            5
        };
        let at = self.reserve(header + payload)?;
        let order = self.config.byte_order;
        let out = &mut self.buffer.data[at..at + header];
        match header {
            2 => {
                out[0] = BIN8;
                out[1] = len as u8;
            }
            3 => {
                out[0] = BIN16;
                order.store_u16(&mut out[1..], len as u16);
            }
            _ => {
                out[0] = BIN32;
                order.store_u32(&mut out[1..], len);
            }
        }
        Ok(at + header)
    }

    fn write_ext_header(&mut self, ext_type: i8, len: u32, payload: usize) -> Result<usize, WireError> {
        if self.config.be_compatible {
            return Err(WireError::IllegalCall);
        }
        let fixed = match len {
            1 => Some(FIXEXT1),
            2 => Some(FIXEXT2),
            4 => Some(FIXEXT4),
            8 => Some(FIXEXT8),
            16 => Some(FIXEXT16),
            _ => None,
        };
        let header = match fixed {
            Some(_) => 2,
            None if len <= u8::MAX as u32 => 3,
            None if len <= u16::MAX as u32 => 4,
            None => 6,
        };
        let at = self.reserve(header + payload)?;
        let order = self.config.byte_order;
        let out = &mut self.buffer.data[at..at + header];
        match (fixed, header) {
            (Some(tag), _) => out[0] = tag,
            (None, 3) => {
                out[0] = EXT8;
                out[1] = len as u8;
            }
            (None, 4) => {
                out[0] = EXT16;
                order.store_u16(&mut out[1..], len as u16);
            }
            (None, _) => {
                out[0] = EXT32;
                order.store_u32(&mut out[1..], len);
            }
        }
        out[header - 1] = ext_type as u8;
        Ok(at + header)
    }
}
