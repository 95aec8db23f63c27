use std::io::{self, Cursor, Read};

use wirepack::contexts::{StreamSink, StreamSource};
use wirepack::{Item, ItemType, PackContext, Timestamp, UnpackContext, WireError};

/// A reader that returns at most `chunk` bytes per call and is interrupted
/// every other call.
struct Choppy {
    inner: Cursor<Vec<u8>>,
    chunk: usize,
    interrupt: bool,
}

impl Choppy {
    fn new(data: Vec<u8>, chunk: usize) -> Self {
        Self {
            inner: Cursor::new(data),
            chunk,
            interrupt: false,
        }
    }
}

impl Read for Choppy {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.interrupt = !self.interrupt;
        if self.interrupt {
            return Err(io::Error::from(io::ErrorKind::Interrupted));
        }
        let len = buf.len().min(self.chunk);
        self.inner.read(&mut buf[..len])
    }
}

fn sample_stream() -> Vec<u8> {
    let mut ctx = PackContext::to_writer(Vec::new(), 8);
    ctx.pack_array_size(4).unwrap();
    ctx.pack_str(&"stream".repeat(20)).unwrap();
    ctx.pack_signed(-70000).unwrap();
    ctx.pack_bin(&[0xab; 40]).unwrap();
    ctx.pack_timestamp(1_700_000_000, 123).unwrap();
    ctx.pack_map_size(1).unwrap();
    ctx.pack_nil().unwrap();
    ctx.pack_ext(12, &[1, 2, 3, 4, 5, 6, 7]).unwrap();
    ctx.finish().unwrap()
}

fn expect_sample<H: wirepack::UnpackHandler>(ctx: &mut UnpackContext<'_, H>) {
    let text = "stream".repeat(20);
    assert_eq!(ctx.next().unwrap(), Item::Array(4));
    assert_eq!(ctx.next().unwrap().as_str(), Some(text.as_str()));
    assert_eq!(ctx.next().unwrap(), Item::NegativeInteger(-70000));
    assert_eq!(ctx.next().unwrap(), Item::Bin(&[0xab; 40]));
    assert_eq!(
        ctx.next().unwrap(),
        Item::Timestamp(Timestamp::new(1_700_000_000, 123))
    );
    assert_eq!(ctx.next().unwrap(), Item::Map(1));
    assert_eq!(ctx.next().unwrap(), Item::Nil);
    assert_eq!(ctx.next().unwrap(), Item::Ext(12, &[1, 2, 3, 4, 5, 6, 7]));
    assert_eq!(ctx.next(), Err(WireError::EndOfInput));
}

#[test]
fn sink_output_matches_memory_output() {
    let streamed = sample_stream();
    let mut memory = PackContext::growable(0);
    memory.pack_array_size(4).unwrap();
    memory.pack_str(&"stream".repeat(20)).unwrap();
    memory.pack_signed(-70000).unwrap();
    memory.pack_bin(&[0xab; 40]).unwrap();
    memory.pack_timestamp(1_700_000_000, 123).unwrap();
    memory.pack_map_size(1).unwrap();
    memory.pack_nil().unwrap();
    memory.pack_ext(12, &[1, 2, 3, 4, 5, 6, 7]).unwrap();
    assert_eq!(streamed, memory.into_bytes());
}

#[test]
fn split_reads_decode_identically() {
    let data = sample_stream();
    for chunk in [1, 2, 3, 7, 64, 4096] {
        for capacity in [1, 5, 16, 1024] {
            let mut ctx = UnpackContext::from_reader(Choppy::new(data.clone(), chunk), capacity);
            expect_sample(&mut ctx);
            assert_eq!(ctx.offset(), data.len() as u64, "chunk {chunk} capacity {capacity}");
        }
    }
    expect_sample(&mut UnpackContext::from_slice(&data));
}

#[test]
fn skip_over_stream() {
    let data = sample_stream();
    let mut ctx = UnpackContext::from_reader(Choppy::new(data.clone(), 3), 4);
    ctx.skip_items(1).unwrap();
    assert_eq!(ctx.look_ahead(), ItemType::Map);
    ctx.skip_items(1).unwrap();
    assert_eq!(ctx.offset(), data.len() as u64);
    assert_eq!(ctx.skip_items(1), Err(WireError::EndOfInput));
}

#[test]
fn look_ahead_refills() {
    let mut ctx = UnpackContext::from_reader(Choppy::new(vec![0xc8, 0x00, 0x01, 0x05, 0x09], 1), 1);
    assert_eq!(ctx.look_ahead(), ItemType::Ext(5));
    assert_eq!(ctx.offset(), 0);
    assert_eq!(ctx.next().unwrap(), Item::Ext(5, &[0x09]));
}

#[test]
fn source_barrier_pins_for_offsets() {
    let data = sample_stream();
    let mut ctx = UnpackContext::from_reader(Cursor::new(data.clone()), 4);
    ctx.set_barrier();
    expect_sample(&mut ctx);
    assert_eq!(ctx.buffer().discarded(), 0);
    assert_eq!(ctx.buffer().pinned(), &data[..]);
}

#[test]
fn sink_flush_and_direct_write() {
    let mut ctx = PackContext::with_config(
        wirepack::PackBuffer::with_len(32),
        StreamSink::new(Vec::new()),
        wirepack::PackConfig::default(),
    );
    ctx.pack_str_size(3).unwrap();
    ctx.insert(b"abc").unwrap();
    ctx.pack_true().unwrap();
    assert_eq!(ctx.packed(), &[0xc3]);
    ctx.flush().unwrap();
    assert!(ctx.packed().is_empty());
    let writer = ctx.into_inner().into_inner();
    assert_eq!(writer, vec![0xa3, b'a', b'b', b'c', 0xc3]);
}

#[test]
fn source_handler_is_reachable() {
    let ctx = UnpackContext::from_reader(Cursor::new(vec![0xc0]), 0);
    let source: &StreamSource<Cursor<Vec<u8>>> = ctx.handler();
    assert_eq!(source.get_ref().position(), 0);
    assert_eq!(ctx.buffer().capacity(), wirepack::contexts::DEFAULT_SOURCE_CAPACITY);
}
