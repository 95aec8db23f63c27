//! Decoded wire items.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::constants::{MAX_USER_EXT, MIN_USER_EXT, NANOS_PER_SEC, TIMESTAMP_EXT};

/// The kind of a wire item, without its value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemType {
    Nil,
    Boolean,
    PositiveInteger,
    NegativeInteger,
    Float,
    Double,
    Str,
    Bin,
    Array,
    Map,
    /// Any extension other than a timestamp. Negative types are reserved.
    Ext(i8),
    Timestamp,
    /// Returned by look-ahead when no item can be identified.
    NotAnItem,
}

impl ItemType {
    /// Maps an extension type byte to its item type.
    pub fn from_ext_type(ext_type: i8) -> Self {
        if ext_type == TIMESTAMP_EXT {
            ItemType::Timestamp
        } else {
            ItemType::Ext(ext_type)
        }
    }

    pub fn is_user_ext(self) -> bool {
        matches!(self, ItemType::Ext(t) if (MIN_USER_EXT..=MAX_USER_EXT).contains(&t))
    }

    pub fn is_reserved_ext(self) -> bool {
        matches!(self, ItemType::Ext(t) if t < MIN_USER_EXT) || self == ItemType::Timestamp
    }
}

/// A point in time as carried by the timestamp extension.
///
/// `nanos` is always below one second; `secs` may be negative for instants
/// before the Unix epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Timestamp {
    pub secs: i64,
    pub nanos: u32,
}

impl Timestamp {
    pub const fn new(secs: i64, nanos: u32) -> Self {
        Self { secs, nanos }
    }

    /// Seconds since the epoch as a float.
    pub fn as_secs_f64(&self) -> f64 {
        self.secs as f64 + self.nanos as f64 / NANOS_PER_SEC as f64
    }

    /// Converts back to a [`SystemTime`], or `None` when the instant is not
    /// representable on this platform or `nanos` is out of range.
    pub fn to_system_time(&self) -> Option<SystemTime> {
        if self.nanos >= NANOS_PER_SEC {
            return None;
        }
        let base = if self.secs >= 0 {
            UNIX_EPOCH.checked_add(Duration::from_secs(self.secs as u64))?
        } else {
            UNIX_EPOCH.checked_sub(Duration::from_secs(self.secs.unsigned_abs()))?
        };
        base.checked_add(Duration::from_nanos(self.nanos as u64))
    }
}

impl From<SystemTime> for Timestamp {
    fn from(time: SystemTime) -> Self {
        match time.duration_since(UNIX_EPOCH) {
            Ok(after) => Timestamp::new(after.as_secs() as i64, after.subsec_nanos()),
            Err(err) => {
                let before = err.duration();
                let secs = -(before.as_secs() as i64);
                match before.subsec_nanos() {
                    0 => Timestamp::new(secs, 0),
                    nanos => Timestamp::new(secs - 1, NANOS_PER_SEC - nanos),
                }
            }
        }
    }
}

/// Everything `next_descriptor` learns from an item's header.
///
/// Scalars carry their value. Length-prefixed items carry only the payload
/// length; the payload itself has not been consumed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Descriptor {
    Nil,
    Boolean(bool),
    PositiveInteger(u64),
    NegativeInteger(i64),
    Float(f32),
    Double(f64),
    Str(u32),
    Bin(u32),
    Array(u32),
    Map(u32),
    Ext(i8, u32),
    Timestamp(Timestamp),
}

impl Descriptor {
    pub fn item_type(&self) -> ItemType {
        match self {
            Descriptor::Nil => ItemType::Nil,
            Descriptor::Boolean(_) => ItemType::Boolean,
            Descriptor::PositiveInteger(_) => ItemType::PositiveInteger,
            Descriptor::NegativeInteger(_) => ItemType::NegativeInteger,
            Descriptor::Float(_) => ItemType::Float,
            Descriptor::Double(_) => ItemType::Double,
            Descriptor::Str(_) => ItemType::Str,
            Descriptor::Bin(_) => ItemType::Bin,
            Descriptor::Array(_) => ItemType::Array,
            Descriptor::Map(_) => ItemType::Map,
            Descriptor::Ext(t, _) => ItemType::Ext(*t),
            Descriptor::Timestamp(_) => ItemType::Timestamp,
        }
    }

    /// Payload length for str, bin and ext descriptors.
    pub fn blob_len(&self) -> Option<u32> {
        match *self {
            Descriptor::Str(len) | Descriptor::Bin(len) | Descriptor::Ext(_, len) => Some(len),
            _ => None,
        }
    }
}

/// A fully decoded item. Blob payloads borrow the unpack buffer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Item<'a> {
    Nil,
    Boolean(bool),
    PositiveInteger(u64),
    NegativeInteger(i64),
    Float(f32),
    Double(f64),
    Str(&'a [u8]),
    Bin(&'a [u8]),
    Array(u32),
    Map(u32),
    Ext(i8, &'a [u8]),
    Timestamp(Timestamp),
}

impl<'a> Item<'a> {
    pub(crate) fn from_descriptor(descriptor: Descriptor, payload: &'a [u8]) -> Self {
        match descriptor {
            Descriptor::Nil => Item::Nil,
            Descriptor::Boolean(b) => Item::Boolean(b),
            Descriptor::PositiveInteger(u) => Item::PositiveInteger(u),
            Descriptor::NegativeInteger(i) => Item::NegativeInteger(i),
            Descriptor::Float(f) => Item::Float(f),
            Descriptor::Double(d) => Item::Double(d),
            Descriptor::Str(_) => Item::Str(payload),
            Descriptor::Bin(_) => Item::Bin(payload),
            Descriptor::Array(n) => Item::Array(n),
            Descriptor::Map(n) => Item::Map(n),
            Descriptor::Ext(t, _) => Item::Ext(t, payload),
            Descriptor::Timestamp(ts) => Item::Timestamp(ts),
        }
    }

    pub fn item_type(&self) -> ItemType {
        match self {
            Item::Nil => ItemType::Nil,
            Item::Boolean(_) => ItemType::Boolean,
            Item::PositiveInteger(_) => ItemType::PositiveInteger,
            Item::NegativeInteger(_) => ItemType::NegativeInteger,
            Item::Float(_) => ItemType::Float,
            Item::Double(_) => ItemType::Double,
            Item::Str(_) => ItemType::Str,
            Item::Bin(_) => ItemType::Bin,
            Item::Array(_) => ItemType::Array,
            Item::Map(_) => ItemType::Map,
            Item::Ext(t, _) => ItemType::Ext(*t),
            Item::Timestamp(_) => ItemType::Timestamp,
        }
    }

    /// The string payload if this is a str item holding valid UTF-8.
    pub fn as_str(&self) -> Option<&'a str> {
        match self {
            Item::Str(bytes) => std::str::from_utf8(bytes).ok(),
            _ => None,
        }
    }
}
