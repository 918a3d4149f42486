use expect_test::expect;
use ironrdp_zgfx::{compressed_size_hint, SegmentedData, MAX_SEGMENT_PAYLOAD};
use rstest::rstest;

use super::*;

fn compressor() -> ZgfxContext {
    ZgfxContext::new(Role::Compressor)
}

#[rstest]
#[case::empty(0, 0)]
#[case::one_byte(1, 1)]
#[case::largest_single(MAX_SEGMENT_PAYLOAD, 1)]
#[case::smallest_multipart(MAX_SEGMENT_PAYLOAD + 1, 2)]
#[case::three_segments(2 * MAX_SEGMENT_PAYLOAD + 1, 3)]
fn segment_size_boundary(#[case] len: usize, #[case] expected_segments: usize) {
    let data = vec![0x5A; len];
    let wire = compressor().compress(&data).unwrap();

    assert_eq!(wire.len(), compressed_size_hint(len));

    match SegmentedData::decode(&wire).unwrap() {
        SegmentedData::Single(segment) => {
            assert_eq!(expected_segments, 1);
            assert!(!segment.is_compressed());
            assert_eq!(segment.payload, data);
        }
        SegmentedData::Multipart {
            uncompressed_size,
            segments,
        } => {
            assert_eq!(segments.len(), expected_segments);
            assert_eq!(uncompressed_size, len);
            assert!(segments.iter().all(|segment| !segment.is_compressed()));
            assert!(segments.iter().all(|segment| segment.payload.len() <= MAX_SEGMENT_PAYLOAD));
        }
    }

    assert_eq!(decompressor().decompress(&wire).unwrap(), data);
}

#[test]
fn compressed_framing() {
    let mut context = compressor();

    expect![[r#"
        [
            224,
            4,
            122,
            103,
            102,
            120,
        ]
    "#]]
    .assert_debug_eq(&context.compress(b"zgfx").unwrap());

    expect![[r#"
        [
            225,
            0,
            0,
            0,
            0,
            0,
            0,
        ]
    "#]]
    .assert_debug_eq(&context.compress(&[]).unwrap());
}

#[test]
fn corrupted_uncompressed_size_is_rejected() {
    let data = vec![0x42; MAX_SEGMENT_PAYLOAD * 2];
    let mut wire = compressor().compress(&data).unwrap();

    for declared in [data.len() - 1, data.len() + 1, 0] {
        wire[3..7].copy_from_slice(&u32::try_from(declared).unwrap().to_le_bytes());

        let mut output = Vec::new();
        let result = decompressor().decompress_into(&wire, &mut output);

        assert!(
            matches!(result, Err(ZgfxError::InvalidDecompressedSize { uncompressed_size, .. }) if uncompressed_size == declared),
            "{result:?}"
        );
        assert!(output.is_empty());
    }
}

#[rstest]
#[case::unknown_descriptor(&[0xE2, 0x04, 0x00])]
#[case::unknown_compression_type(&[0xE0, 0x01, 0x00])]
#[case::segment_too_short(&[0xE0, 0x24])]
#[case::truncated_segment_count(&[0xE1, 0x01])]
#[case::segment_size_past_the_buffer(&[0xE1, 0x01, 0x00, 0x01, 0x00, 0x00, 0x00, 0x05, 0x00, 0x00, 0x00, 0x04, 0x41])]
#[case::count_past_the_buffer(&[0xE1, 0x02, 0x00, 0x01, 0x00, 0x00, 0x00, 0x02, 0x00, 0x00, 0x00, 0x04, 0x41])]
#[case::zero_sized_multipart_segment(&[0xE1, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00])]
fn malformed_framing_is_rejected(#[case] wire: &[u8]) {
    let mut output = vec![0xAB];

    assert!(decompressor().decompress_into(wire, &mut output).is_err());
    assert_eq!(output, [0xAB]);
}

#[test]
fn error_messages() {
    let errors = [
        &[0xE2][..],
        &[0xE1, 0x01, 0x00, 0x01, 0x00, 0x00, 0x00, 0x05, 0x00, 0x00, 0x00, 0x04, 0x41],
        &[0xE1, 0x01, 0x00, 0x09, 0x00, 0x00, 0x00, 0x02, 0x00, 0x00, 0x00, 0x04, 0x41],
        &[0xE0, 0x24, 0x80, 0x00],
    ]
    .map(|wire| decompressor().decompress(wire).unwrap_err().to_string());

    expect![[r#"
        [
            "invalid segmented descriptor: 0xe2",
            "segment declares 5 bytes, but only 2 remain in the buffer",
            "decompressed size of segments (1) does not equal to uncompressed size (9)",
            "bit budget exhausted: requested 1 bits, but only 0 remain in the segment",
        ]
    "#]]
    .assert_debug_eq(&errors);
}

#[test]
fn framing_views_borrow_the_wire() {
    let wire = multipart(3, &[(STORED_HEADER, b"ab"), (COMPRESSED_HEADER, &[0xC8, 0x03])]);

    expect![[r#"
        Multipart {
            uncompressed_size: 3,
            segments: [
                Segment {
                    header: SegmentHeader {
                        compression_type: Rdp8,
                        flags: SegmentFlags(
                            0x0,
                        ),
                    },
                    payload: [
                        97,
                        98,
                    ],
                },
                Segment {
                    header: SegmentHeader {
                        compression_type: Rdp8,
                        flags: SegmentFlags(
                            COMPRESSED,
                        ),
                    },
                    payload: [
                        200,
                        3,
                    ],
                },
            ],
        }
    "#]]
    .assert_debug_eq(&SegmentedData::decode(&wire).unwrap());

    assert_eq!(decompressor().decompress(&wire).unwrap(), [b'a', b'b', 0x01]);
}
