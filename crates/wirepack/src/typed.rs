//! Accessors that decode the next item as a specific Rust type.
//!
//! A mismatched item kind records [`WireError::TypeError`]; a value that does
//! not fit the requested type records [`WireError::ValueError`]. Both are
//! sticky like any other failure.

use crate::{Item, UnpackContext, UnpackHandler, WireError};

fn signed(item: Item<'_>) -> Result<i64, WireError> {
    match item {
        Item::PositiveInteger(u) => i64::try_from(u).map_err(|_| WireError::ValueError),
        Item::NegativeInteger(i) => Ok(i),
        _ => Err(WireError::TypeError),
    }
}

fn unsigned(item: Item<'_>) -> Result<u64, WireError> {
    match item {
        Item::PositiveInteger(u) => Ok(u),
        _ => Err(WireError::TypeError),
    }
}

fn real(item: Item<'_>) -> Result<f64, WireError> {
    match item {
        Item::PositiveInteger(u) => Ok(u as f64),
        Item::NegativeInteger(i) => Ok(i as f64),
        Item::Float(f) => Ok(f as f64),
        Item::Double(d) => Ok(d),
        _ => Err(WireError::TypeError),
    }
}

fn narrow<T: TryFrom<V>, V>(value: Result<V, WireError>) -> Result<T, WireError> {
    value.and_then(|v| T::try_from(v).map_err(|_| WireError::ValueError))
}

impl<H: UnpackHandler> UnpackContext<'_, H> {
    fn next_as<T>(&mut self, convert: impl FnOnce(Item<'_>) -> Result<T, WireError>) -> Result<T, WireError> {
        let result = convert(self.next()?);
        self.settle(result)
    }

    pub fn next_nil(&mut self) -> Result<(), WireError> {
        self.next_as(|item| match item {
            Item::Nil => Ok(()),
            _ => Err(WireError::TypeError),
        })
    }

    pub fn next_bool(&mut self) -> Result<bool, WireError> {
        self.next_as(|item| match item {
            Item::Boolean(b) => Ok(b),
            _ => Err(WireError::TypeError),
        })
    }

    pub fn next_i64(&mut self) -> Result<i64, WireError> {
        self.next_as(signed)
    }

    pub fn next_i32(&mut self) -> Result<i32, WireError> {
        self.next_as(|item| narrow(signed(item)))
    }

    pub fn next_i16(&mut self) -> Result<i16, WireError> {
        self.next_as(|item| narrow(signed(item)))
    }

    pub fn next_i8(&mut self) -> Result<i8, WireError> {
        self.next_as(|item| narrow(signed(item)))
    }

    pub fn next_u64(&mut self) -> Result<u64, WireError> {
        self.next_as(unsigned)
    }

    pub fn next_u32(&mut self) -> Result<u32, WireError> {
        self.next_as(|item| narrow(unsigned(item)))
    }

    pub fn next_u16(&mut self) -> Result<u16, WireError> {
        self.next_as(|item| narrow(unsigned(item)))
    }

    pub fn next_u8(&mut self) -> Result<u8, WireError> {
        self.next_as(|item| narrow(unsigned(item)))
    }

    /// Any numeric item, converted to `f32`.
    pub fn next_f32(&mut self) -> Result<f32, WireError> {
        self.next_as(|item| match item {
            Item::Float(f) => Ok(f),
            other => real(other).map(|d| d as f32),
        })
    }

    /// Any numeric item, converted to `f64`.
    pub fn next_f64(&mut self) -> Result<f64, WireError> {
        self.next_as(real)
    }

    /// A timestamp as fractional seconds since the epoch.
    pub fn next_time_interval(&mut self) -> Result<f64, WireError> {
        self.next_as(|item| match item {
            Item::Timestamp(ts) => Ok(ts.as_secs_f64()),
            _ => Err(WireError::TypeError),
        })
    }

    /// Length of the next str item; its payload is consumed.
    pub fn next_str_len(&mut self) -> Result<u32, WireError> {
        self.next_as(|item| match item {
            Item::Str(bytes) => Ok(bytes.len() as u32),
            _ => Err(WireError::TypeError),
        })
    }

    /// Length of the next bin item; its payload is consumed.
    pub fn next_bin_len(&mut self) -> Result<u32, WireError> {
        self.next_as(|item| match item {
            Item::Bin(bytes) => Ok(bytes.len() as u32),
            _ => Err(WireError::TypeError),
        })
    }

    pub fn next_array_size(&mut self) -> Result<u32, WireError> {
        self.next_as(|item| match item {
            Item::Array(n) => Ok(n),
            _ => Err(WireError::TypeError),
        })
    }

    pub fn next_map_size(&mut self) -> Result<u32, WireError> {
        self.next_as(|item| match item {
            Item::Map(n) => Ok(n),
            _ => Err(WireError::TypeError),
        })
    }
}
