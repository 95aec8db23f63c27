use wirepack::contexts::GrowableBuffer;
use wirepack::{
    Descriptor, Item, ItemType, PackContext, Timestamp, UnpackBuffer, UnpackContext, UnpackHandler,
    WireError,
};

fn packed<F>(op: F) -> Vec<u8>
where
    F: FnOnce(&mut PackContext<GrowableBuffer>) -> Result<(), WireError>,
{
    let mut ctx = PackContext::growable(0);
    op(&mut ctx).unwrap();
    ctx.into_bytes()
}

#[test]
fn integer_boundary_round_trip() {
    let signed = [
        0i64,
        -1,
        -32,
        -33,
        -128,
        -129,
        -32768,
        -32769,
        i32::MIN as i64,
        i32::MIN as i64 - 1,
        i64::MIN,
        127,
        128,
        i64::MAX,
    ];
    for value in signed {
        let bytes = packed(|c| c.pack_signed(value));
        let mut ctx = UnpackContext::from_slice(&bytes);
        let item = ctx.next().unwrap();
        let expected = if value >= 0 {
            Item::PositiveInteger(value as u64)
        } else {
            Item::NegativeInteger(value)
        };
        assert_eq!(item, expected, "value {value}");
        assert_eq!(ctx.next(), Err(WireError::EndOfInput));
    }
}

#[test]
fn known_encodings_decode() {
    let cases: [(&[u8], Item<'static>); 6] = [
        (&[0xd2, 0xff, 0xff, 0x7f, 0xff], Item::NegativeInteger(-32769)),
        (
            &[0xd7, 0xff, 0x00, 0x00, 0x00, 0x08, 0x00, 0x00, 0x00, 0x01],
            Item::Timestamp(Timestamp::new(1, 2)),
        ),
        (&[0xd3, 0, 0, 0, 0, 0, 0, 0, 9], Item::PositiveInteger(9)),
        (&[0xca, 0x3f, 0xc0, 0x00, 0x00], Item::Float(1.5)),
        (&[0xd9, 0x02, b'o', b'k'], Item::Str(b"ok")),
        (&[0xc8, 0x00, 0x01, 0x10, 0xee], Item::Ext(16, &[0xee])),
    ];
    for (bytes, expected) in cases {
        let mut ctx = UnpackContext::from_slice(bytes);
        assert_eq!(ctx.next().unwrap(), expected);
    }
}

#[test]
fn mixed_document_round_trip() {
    let bytes = packed(|c| {
        c.pack_map_size(3)?;
        c.pack_str("name")?;
        c.pack_str("wirepack")?;
        c.pack_str("tags")?;
        c.pack_array_size(2)?;
        c.pack_bin(&[1, 2, 3])?;
        c.pack_ext(-7, &[0; 5])?;
        c.pack_str("when")?;
        c.pack_timestamp(-1, 999_999_999)
    });
    let mut ctx = UnpackContext::from_slice(&bytes);
    assert_eq!(ctx.next().unwrap(), Item::Map(3));
    assert_eq!(ctx.next().unwrap().as_str(), Some("name"));
    assert_eq!(ctx.next().unwrap().as_str(), Some("wirepack"));
    assert_eq!(ctx.next().unwrap().as_str(), Some("tags"));
    assert_eq!(ctx.next().unwrap(), Item::Array(2));
    assert_eq!(ctx.next().unwrap(), Item::Bin(&[1, 2, 3]));
    assert_eq!(ctx.next().unwrap(), Item::Ext(-7, &[0; 5]));
    assert_eq!(ctx.next().unwrap().as_str(), Some("when"));
    assert_eq!(
        ctx.next().unwrap(),
        Item::Timestamp(Timestamp::new(-1, 999_999_999))
    );
    assert_eq!(ctx.next(), Err(WireError::EndOfInput));
}

#[test]
fn descriptor_then_manual_payload() {
    let bytes = packed(|c| {
        c.pack_bin(b"payload")?;
        c.pack_nil()
    });
    let mut ctx = UnpackContext::from_slice(&bytes);
    let descriptor = ctx.next_descriptor().unwrap();
    assert_eq!(descriptor, Descriptor::Bin(7));
    assert_eq!(descriptor.item_type(), ItemType::Bin);
    assert_eq!(&ctx.buffer().unread()[..7], b"payload");
    ctx.buffer_mut().current += 7;
    assert_eq!(ctx.next().unwrap(), Item::Nil);
}

#[test]
fn skip_matrix() {
    // Each case packs one structured item followed by a sentinel 0x2a.
    type Build = fn(&mut PackContext<GrowableBuffer>) -> Result<(), WireError>;
    let cases: [(&str, Build); 6] = [
        ("empty array", |c| c.pack_array_size(0)),
        ("empty map", |c| c.pack_map_size(0)),
        ("flat array", |c| {
            c.pack_array_size(3)?;
            c.pack_nil()?;
            c.pack_f64(1.0)?;
            c.pack_str("x")
        }),
        ("nested", |c| {
            c.pack_array_size(2)?;
            c.pack_map_size(1)?;
            c.pack_str("k")?;
            c.pack_array_size(1)?;
            c.pack_array_size(0)?;
            c.pack_bin(&[0; 300])
        }),
        ("wide array", |c| {
            c.pack_array_size(20)?;
            for i in 0..20 {
                c.pack_signed(-i * 1000)?;
            }
            Ok(())
        }),
        ("ext and timestamps", |c| {
            c.pack_map_size(2)?;
            c.pack_ext(1, &[0; 16])?;
            c.pack_timestamp(1 << 40, 5)?;
            c.pack_ext(2, &[0; 70000])?;
            c.pack_timestamp(3, 0)
        }),
    ];
    for (name, build) in cases {
        let bytes = packed(|c| {
            build(c)?;
            c.pack_unsigned(0x2a)
        });
        let mut ctx = UnpackContext::from_slice(&bytes);
        ctx.skip_items(1).unwrap();
        assert_eq!(ctx.next().unwrap(), Item::PositiveInteger(0x2a), "case {name}");
    }
}

#[test]
fn look_ahead_matrix() {
    let cases: [(&[u8], ItemType); 14] = [
        (&[0x05], ItemType::PositiveInteger),
        (&[0xcf, 0, 0, 0, 0, 0, 0, 0, 0], ItemType::PositiveInteger),
        (&[0xf0], ItemType::NegativeInteger),
        (&[0xc0], ItemType::Nil),
        (&[0xc3], ItemType::Boolean),
        (&[0xca, 0, 0, 0, 0], ItemType::Float),
        (&[0xcb, 0, 0, 0, 0, 0, 0, 0, 0], ItemType::Double),
        (&[0xa1, b'a'], ItemType::Str),
        (&[0xc4, 0x00], ItemType::Bin),
        (&[0x91, 0xc0], ItemType::Array),
        (&[0xde, 0x00, 0x00], ItemType::Map),
        (&[0xd6, 0xff, 0, 0, 0, 0], ItemType::Timestamp),
        (&[0xc7, 0x01, 0x7f, 0x00], ItemType::Ext(127)),
        (&[0xc7, 0x01], ItemType::NotAnItem),
    ];
    for (bytes, expected) in cases {
        let mut ctx = UnpackContext::from_slice(bytes);
        assert_eq!(ctx.look_ahead(), expected, "bytes {bytes:02x?}");
        assert_eq!(ctx.offset(), 0);
        assert_eq!(ctx.status(), Ok(()));
    }
}

#[test]
fn end_of_input_versus_underflow() {
    let cases: [(&[u8], WireError); 6] = [
        (&[], WireError::EndOfInput),
        (&[0xcc], WireError::BufferUnderflow),
        (&[0xd9], WireError::BufferUnderflow),
        (&[0xa4, b'a', b'b'], WireError::BufferUnderflow),
        (&[0xc7, 0x04], WireError::BufferUnderflow),
        (&[0xd7, 0xff, 0x00], WireError::BufferUnderflow),
    ];
    for (bytes, expected) in cases {
        let mut ctx = UnpackContext::from_slice(bytes);
        assert_eq!(ctx.next(), Err(expected), "bytes {bytes:02x?}");
    }
}

#[test]
fn sticky_unpack_errors() {
    let mut ctx = UnpackContext::from_slice(&[0xc1, 0x01, 0x02]);
    assert_eq!(ctx.next(), Err(WireError::MalformedInput));
    assert_eq!(ctx.next(), Err(WireError::MalformedInput));
    assert_eq!(ctx.skip_items(1), Err(WireError::MalformedInput));
    assert_eq!(ctx.next_descriptor(), Err(WireError::MalformedInput));
    assert_eq!(ctx.offset(), 1);
}

#[test]
fn wrong_timestamp_lengths() {
    for bytes in [
        &[0xd5, 0xff, 0x00, 0x00][..],
        &[0xd8, 0xff, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0][..],
        &[0xc7, 0x05, 0xff, 0, 0, 0, 0, 0][..],
        &[0xc7, 0x04, 0xff, 0, 0, 0, 1][..],
        &[0xc8, 0x00, 0x0c, 0xff, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1][..],
    ] {
        let mut ctx = UnpackContext::from_slice(bytes);
        assert_eq!(ctx.next(), Err(WireError::WrongTimestampLength));
    }
}

#[test]
fn handler_errors_propagate() {
    struct Failing;

    impl UnpackHandler for Failing {
        fn underflow(&mut self, _buffer: &mut UnpackBuffer<'_>, _needed: usize) -> Result<(), WireError> {
            Err(WireError::AllocationError)
        }
    }

    let mut ctx = UnpackContext::new(UnpackBuffer::from_slice(&[0xcd]), Failing);
    assert_eq!(ctx.next(), Err(WireError::AllocationError));
}
