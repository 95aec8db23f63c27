//! Ready-made buffer handlers.
//!
//! | Handler          | Side   | Behaviour when the buffer runs out             |
//! |------------------|--------|------------------------------------------------|
//! | [`FixedBuffer`]  | pack   | buffer overflow                                |
//! | [`GrowableBuffer`] | pack | doubles the buffer                             |
//! | [`StreamSink`]   | pack   | drains to a writer, grows for oversized items  |
//! | [`Exhausted`]    | unpack | end of input                                   |
//! | [`StreamSource`] | unpack | compacts, grows and reads more from a reader   |

mod memory;
mod stream;

pub use memory::{Exhausted, FixedBuffer, GrowableBuffer, DEFAULT_MEMORY_CAPACITY};
pub use stream::{StreamSink, StreamSource, DEFAULT_SINK_CAPACITY, DEFAULT_SOURCE_CAPACITY};
