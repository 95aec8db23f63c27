//! Text rendering of a MessagePack stream.

use std::io::{self, Read, Write};

use thiserror::Error;
use wirepack::contexts::StreamSource;
use wirepack::{Item, Timestamp, UnpackContext, WireError};
use wirepack_buffers::hex_octets;

/// Ext type that marks an array as a record.
const RECORD_EXT: i8 = 127;

/// Initial unpack buffer length. It only grows for items that do not fit.
const INPUT_CAPACITY: usize = 4096;

#[derive(Debug, Clone, Copy, Default)]
pub struct Options {
    /// Spaces per nesting level. Zero keeps each top-level item on one line.
    pub indent: usize,
    /// Render arrays led by ext 127 as labelled records.
    pub records: bool,
}

#[derive(Debug, Error)]
enum DumpError {
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Wire(#[from] WireError),
}

type Source<R> = UnpackContext<'static, StreamSource<R>>;

struct Dumper<W> {
    out: W,
    options: Options,
}

/// Prints every item in `input` to `out` and returns the code that ended
/// the stream. A code other than end of input is reported in the output.
pub fn dump<R: Read, W: Write>(input: R, out: W, options: Options) -> io::Result<WireError> {
    let mut ctx = UnpackContext::from_reader(input, INPUT_CAPACITY);
    dump_from(&mut ctx, out, options)
}

/// Offsets come from the context, so consumed input is released as the
/// dump moves on.
fn dump_from<R: Read, W: Write>(
    ctx: &mut Source<R>,
    out: W,
    options: Options,
) -> io::Result<WireError> {
    let mut dumper = Dumper { out, options };
    let code = loop {
        dumper.new_line(ctx.offset(), 0)?;
        match dumper.next(ctx, 0) {
            Ok(()) => {}
            Err(DumpError::Wire(code)) => break code,
            Err(DumpError::Io(err)) => return Err(err),
        }
    };
    writeln!(dumper.out)?;
    if code != WireError::EndOfInput {
        if let Some(err) = ctx.buffer().handler_error() {
            tracing::warn!(error = %err, "input could not be read");
        }
        writeln!(dumper.out, "\nERROR RC = {}", code.code())?;
    }
    dumper.out.flush()?;
    Ok(code)
}

impl<W: Write> Dumper<W> {
    /// Starts a line with the stream offset `at` and the indent for `level`.
    fn new_line(&mut self, at: u64, level: usize) -> io::Result<()> {
        write!(
            self.out,
            "\n{:6x}  {:width$}",
            at,
            "",
            width = level * self.options.indent
        )
    }

    /// Starts the `index`th child of a container at `level`.
    fn separate(&mut self, at: u64, level: usize, index: u32) -> io::Result<()> {
        if self.options.indent > 0 {
            self.new_line(at, level)
        } else if index > 0 {
            write!(self.out, " ")
        } else {
            Ok(())
        }
    }

    fn close(&mut self, at: u64, level: usize, bracket: &str) -> io::Result<()> {
        if self.options.indent > 0 {
            self.new_line(at, level)?;
        }
        write!(self.out, "{bracket}")
    }

    fn next<R: Read>(&mut self, ctx: &mut Source<R>, level: usize) -> Result<(), DumpError> {
        ctx.next()?;
        self.current(ctx, level)
    }

    /// Prints the item `ctx` decoded last, descending into containers.
    fn current<R: Read>(&mut self, ctx: &mut Source<R>, level: usize) -> Result<(), DumpError> {
        let container = match ctx.item().ok_or(WireError::IllegalCall)? {
            Item::Array(len) => Some((true, len)),
            Item::Map(len) => Some((false, len)),
            scalar => {
                self.scalar(&scalar)?;
                None
            }
        };
        match container {
            Some((true, len)) => self.array(ctx, len, level),
            Some((false, len)) => self.map(ctx, len, level),
            None => Ok(()),
        }
    }

    fn array<R: Read>(&mut self, ctx: &mut Source<R>, len: u32, level: usize) -> Result<(), DumpError> {
        if len == 0 {
            write!(self.out, "[]")?;
            return Ok(());
        }
        let first_at = ctx.offset();
        ctx.next()?;
        if self.options.records && matches!(ctx.item(), Some(Item::Ext(RECORD_EXT, _))) {
            return self.record(ctx, len, level);
        }
        write!(self.out, "[")?;
        self.separate(first_at, level + 1, 0)?;
        self.current(ctx, level + 1)?;
        for index in 1..len {
            self.separate(ctx.offset(), level + 1, index)?;
            self.next(ctx, level + 1)?;
        }
        self.close(ctx.offset(), level, "]")?;
        Ok(())
    }

    /// `[ext127(label), name, fields...]` prints as `label->name(fields...)`.
    /// A one-element record is a reference to `label`; a negative label
    /// wraps a single plain value.
    fn record<R: Read>(&mut self, ctx: &mut Source<R>, len: u32, level: usize) -> Result<(), DumpError> {
        let label = ctx.ext_integer()?;
        if len == 1 {
            write!(self.out, "->{label}")?;
            return Ok(());
        }
        if label != 0 {
            write!(self.out, "{label}->")?;
        }
        if label < 0 {
            if len != 2 {
                return Err(WireError::MalformedInput.into());
            }
            return self.next(ctx, level);
        }
        ctx.next()?;
        match ctx.item() {
            Some(Item::Str(name)) => {
                self.out.write_all(name)?;
                write!(self.out, "(")?;
            }
            _ => return Err(WireError::MalformedInput.into()),
        }
        for index in 0..len - 2 {
            self.separate(ctx.offset(), level + 1, index)?;
            self.next(ctx, level + 1)?;
        }
        self.close(ctx.offset(), level, ")")?;
        Ok(())
    }

    fn map<R: Read>(&mut self, ctx: &mut Source<R>, len: u32, level: usize) -> Result<(), DumpError> {
        if len == 0 {
            write!(self.out, "{{}}")?;
            return Ok(());
        }
        write!(self.out, "{{")?;
        for index in 0..len {
            self.separate(ctx.offset(), level + 1, index)?;
            self.next(ctx, level + 1)?;
            write!(self.out, ":")?;
            self.next(ctx, level + 1)?;
        }
        self.close(ctx.offset(), level, "}")?;
        Ok(())
    }

    fn scalar(&mut self, item: &Item<'_>) -> io::Result<()> {
        match item {
            Item::Nil => write!(self.out, "nil"),
            Item::Boolean(value) => write!(self.out, "{value}"),
            Item::PositiveInteger(value) => write!(self.out, "{value}"),
            Item::NegativeInteger(value) => write!(self.out, "{value}"),
            Item::Float(value) => write!(self.out, "{value}"),
            Item::Double(value) => write!(self.out, "{value}"),
            Item::Str(bytes) => self.string(bytes),
            Item::Bin(bytes) => write!(self.out, "<{}>", hex_octets(bytes)),
            Item::Ext(ext_type, bytes) => write!(self.out, "({ext_type},<{}>)", hex_octets(bytes)),
            Item::Timestamp(time) => write!(self.out, "'{}'", format_timestamp(time)),
            Item::Array(_) | Item::Map(_) => Ok(()),
        }
    }

    /// Writes `bytes` quoted, with JSON escapes for quotes, backslashes and
    /// control characters. Other bytes pass through unchanged.
    fn string(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.out.write_all(b"\"")?;
        for &byte in bytes {
            match byte {
                b'"' => self.out.write_all(b"\\\"")?,
                b'\\' => self.out.write_all(b"\\\\")?,
                0x08 => self.out.write_all(b"\\b")?,
                0x0c => self.out.write_all(b"\\f")?,
                b'\n' => self.out.write_all(b"\\n")?,
                b'\r' => self.out.write_all(b"\\r")?,
                b'\t' => self.out.write_all(b"\\t")?,
                0x00..=0x1f => write!(self.out, "\\u{byte:04x}")?,
                _ => self.out.write_all(&[byte])?,
            }
        }
        self.out.write_all(b"\"")
    }
}

/// `YYYY-MM-DD HH:MM:SS` in UTC, with microseconds when the nanosecond part
/// is not zero. Instants outside chrono's range print as raw seconds.
fn format_timestamp(time: &Timestamp) -> String {
    let Some(utc) = chrono::DateTime::from_timestamp(time.secs, 0) else {
        return format!("{}s", time.secs);
    };
    let mut text = utc.format("%Y-%m-%d %H:%M:%S").to_string();
    if time.nanos != 0 {
        text.push_str(&format!(".{:06}", time.nanos / 1_000));
    }
    text
}
