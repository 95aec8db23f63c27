//! Return codes shared by pack and unpack contexts.

use thiserror::Error;
use wirepack_buffers::BufferError;

/// A non-OK return code.
///
/// Each variant carries a stable numeric code (see [`WireError::code`]) so the
/// value can cross an FFI or logging boundary unchanged. Contexts keep the
/// first error they hit and return it from every later call.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WireError {
    #[error("end of input")]
    EndOfInput,
    #[error("buffer overflow")]
    BufferOverflow,
    #[error("buffer underflow")]
    BufferUnderflow,
    #[error("malformed input")]
    MalformedInput,
    #[error("byte order strategy does not match the host")]
    WrongByteOrder,
    #[error("error in buffer handler")]
    ErrorInHandler,
    #[error("illegal call")]
    IllegalCall,
    #[error("allocation error")]
    AllocationError,
    #[error("type error")]
    TypeError,
    #[error("value error")]
    ValueError,
    #[error("wrong timestamp length")]
    WrongTimestampLength,
}

impl WireError {
    /// The stable numeric code. `0` is reserved for OK and `-9` is unassigned.
    pub fn code(self) -> i32 {
        match self {
            WireError::EndOfInput => -1,
            WireError::BufferOverflow => -2,
            WireError::BufferUnderflow => -3,
            WireError::MalformedInput => -4,
            WireError::WrongByteOrder => -5,
            WireError::ErrorInHandler => -6,
            WireError::IllegalCall => -7,
            WireError::AllocationError => -8,
            WireError::TypeError => -10,
            WireError::ValueError => -11,
            WireError::WrongTimestampLength => -12,
        }
    }

    /// Maps a numeric code back to its variant.
    pub fn from_code(code: i32) -> Option<Self> {
        Some(match code {
            -1 => WireError::EndOfInput,
            -2 => WireError::BufferOverflow,
            -3 => WireError::BufferUnderflow,
            -4 => WireError::MalformedInput,
            -5 => WireError::WrongByteOrder,
            -6 => WireError::ErrorInHandler,
            -7 => WireError::IllegalCall,
            -8 => WireError::AllocationError,
            -10 => WireError::TypeError,
            -11 => WireError::ValueError,
            -12 => WireError::WrongTimestampLength,
            _ => return None,
        })
    }
}

impl From<BufferError> for WireError {
    fn from(err: BufferError) -> Self {
        match err {
            BufferError::EndOfBuffer => WireError::BufferUnderflow,
            BufferError::WrongByteOrder => WireError::WrongByteOrder,
        }
    }
}

/// Collapses a `Result<(), WireError>` into the numeric code, `0` for OK.
pub fn status_code(result: Result<(), WireError>) -> i32 {
    match result {
        Ok(()) => 0,
        Err(err) => err.code(),
    }
}
