//! Property checks over generated documents.

use std::io::{self, Cursor, Read};

use proptest::prelude::*;
use wirepack::contexts::GrowableBuffer;
use wirepack::{Item, PackContext, Timestamp, UnpackContext, UnpackHandler, WireError};

#[derive(Debug, Clone)]
enum Node {
    Nil,
    Bool(bool),
    Unsigned(u64),
    Signed(i64),
    Double(f64),
    Str(String),
    Bin(Vec<u8>),
    Ext(i8, Vec<u8>),
    Time(i64, u32),
    Array(Vec<Node>),
    Map(Vec<(Node, Node)>),
}

fn value_strategy() -> impl Strategy<Value = Node> {
    let leaf = prop_oneof![
        Just(Node::Nil),
        any::<bool>().prop_map(Node::Bool),
        any::<u64>().prop_map(Node::Unsigned),
        any::<i64>().prop_map(Node::Signed),
        any::<f64>()
            .prop_filter("comparable", |v| !v.is_nan())
            .prop_map(Node::Double),
        "[a-z]{0,40}".prop_map(Node::Str),
        prop::collection::vec(any::<u8>(), 0..300).prop_map(Node::Bin),
        (0i8..=127, prop::collection::vec(any::<u8>(), 0..20)).prop_map(|(t, p)| Node::Ext(t, p)),
        (any::<i64>(), 0u32..1_000_000_000).prop_map(|(s, n)| Node::Time(s, n)),
    ];
    leaf.prop_recursive(4, 64, 8, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..8).prop_map(Node::Array),
            prop::collection::vec((inner.clone(), inner), 0..6).prop_map(Node::Map),
        ]
    })
}

fn pack_value(ctx: &mut PackContext<GrowableBuffer>, value: &Node) -> Result<(), WireError> {
    match value {
        Node::Nil => ctx.pack_nil(),
        Node::Bool(v) => ctx.pack_bool(*v),
        Node::Unsigned(v) => ctx.pack_unsigned(*v),
        Node::Signed(v) => ctx.pack_signed(*v),
        Node::Double(v) => ctx.pack_f64(*v),
        Node::Str(v) => ctx.pack_str(v),
        Node::Bin(v) => ctx.pack_bin(v),
        Node::Ext(t, p) => ctx.pack_ext(*t, p),
        Node::Time(s, n) => ctx.pack_timestamp(*s, *n),
        Node::Array(items) => {
            ctx.pack_array_size(items.len() as u32)?;
            items.iter().try_for_each(|item| pack_value(ctx, item))
        }
        Node::Map(entries) => {
            ctx.pack_map_size(entries.len() as u32)?;
            entries.iter().try_for_each(|(k, v)| {
                pack_value(ctx, k)?;
                pack_value(ctx, v)
            })
        }
    }
}

fn expect_value<H: UnpackHandler>(ctx: &mut UnpackContext<'_, H>, value: &Node) {
    let item = ctx.next().unwrap();
    match value {
        Node::Nil => assert_eq!(item, Item::Nil),
        Node::Bool(v) => assert_eq!(item, Item::Boolean(*v)),
        Node::Unsigned(v) => assert_eq!(item, Item::PositiveInteger(*v)),
        Node::Signed(v) if *v >= 0 => assert_eq!(item, Item::PositiveInteger(*v as u64)),
        Node::Signed(v) => assert_eq!(item, Item::NegativeInteger(*v)),
        Node::Double(v) => assert_eq!(item, Item::Double(*v)),
        Node::Str(v) => assert_eq!(item.as_str(), Some(v.as_str())),
        Node::Bin(v) => assert_eq!(item, Item::Bin(v)),
        Node::Ext(t, p) => assert_eq!(item, Item::Ext(*t, p)),
        Node::Time(s, n) => assert_eq!(item, Item::Timestamp(Timestamp::new(*s, *n))),
        Node::Array(items) => {
            assert_eq!(item, Item::Array(items.len() as u32));
            for item in items {
                expect_value(ctx, item);
            }
        }
        Node::Map(entries) => {
            assert_eq!(item, Item::Map(entries.len() as u32));
            for (k, v) in entries {
                expect_value(ctx, k);
                expect_value(ctx, v);
            }
        }
    }
}

fn encode(value: &Node) -> Vec<u8> {
    let mut ctx = PackContext::growable(0);
    pack_value(&mut ctx, value).unwrap();
    ctx.into_bytes()
}

/// Reads at most `chunk` bytes per call.
struct Chunked {
    inner: Cursor<Vec<u8>>,
    chunk: usize,
}

impl Read for Chunked {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let len = buf.len().min(self.chunk);
        self.inner.read(&mut buf[..len])
    }
}

proptest! {
    #[test]
    fn signed_integers_round_trip(value in any::<i64>()) {
        let bytes = encode(&Node::Signed(value));
        let mut ctx = UnpackContext::from_slice(&bytes);
        prop_assert_eq!(ctx.next_i64(), Ok(value));
        prop_assert_eq!(ctx.next(), Err(WireError::EndOfInput));
    }

    #[test]
    fn unsigned_integers_round_trip(value in any::<u64>()) {
        let bytes = encode(&Node::Unsigned(value));
        let mut ctx = UnpackContext::from_slice(&bytes);
        prop_assert_eq!(ctx.next_u64(), Ok(value));
    }

    #[test]
    fn signed_encoding_is_shortest(value in any::<i64>()) {
        let len = encode(&Node::Signed(value)).len();
        let expected = match value {
            -32..=127 => 1,
            -128..=255 => 2,
            -32768..=65535 => 3,
            -2147483648..=4294967295 => 5,
            _ => 9,
        };
        prop_assert_eq!(len, expected);
    }

    #[test]
    fn documents_round_trip(value in value_strategy()) {
        let bytes = encode(&value);
        let mut ctx = UnpackContext::from_slice(&bytes);
        expect_value(&mut ctx, &value);
        prop_assert_eq!(ctx.next(), Err(WireError::EndOfInput));
    }

    #[test]
    fn split_stream_matches_slice(
        value in value_strategy(),
        chunk in 1usize..17,
        capacity in 1usize..64,
    ) {
        let bytes = encode(&value);
        let reader = Chunked { inner: Cursor::new(bytes.clone()), chunk };
        let mut ctx = UnpackContext::from_reader(reader, capacity);
        expect_value(&mut ctx, &value);
        prop_assert_eq!(ctx.offset(), bytes.len() as u64);
        prop_assert_eq!(ctx.next(), Err(WireError::EndOfInput));
    }

    #[test]
    fn skip_lands_on_next_item(value in value_strategy(), chunk in 1usize..9) {
        let mut bytes = encode(&value);
        bytes.push(0x2a);
        let reader = Chunked { inner: Cursor::new(bytes.clone()), chunk };
        let mut ctx = UnpackContext::from_reader(reader, 4);
        ctx.skip_items(1).unwrap();
        prop_assert_eq!(ctx.offset(), bytes.len() as u64 - 1);
        prop_assert_eq!(ctx.next().unwrap(), Item::PositiveInteger(0x2a));
    }

    #[test]
    fn truncation_never_panics(value in value_strategy(), cut in any::<prop::sample::Index>()) {
        let bytes = encode(&value);
        let cut = cut.index(bytes.len());
        let mut ctx = UnpackContext::from_slice(&bytes[..cut]);
        let result = ctx.skip_items(1);
        if cut == 0 {
            prop_assert_eq!(result, Err(WireError::EndOfInput));
        } else {
            prop_assert!(result.is_err());
        }
    }
}
