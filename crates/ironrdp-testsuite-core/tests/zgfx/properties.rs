use ironrdp_zgfx::{compressed_size_hint, SEGMENT_OUTPUT_CAPACITY};
use proptest::prelude::*;

use super::*;

/// One token of a generated segment.
#[derive(Debug, Clone)]
enum Op {
    Literal(u8),
    BackReference { distance: u32, length: u32 },
    Unencoded(Vec<u8>),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => any::<u8>().prop_map(Op::Literal),
        2 => (1u32..=64, 3u32..=300).prop_map(|(distance, length)| Op::BackReference { distance, length }),
        1 => proptest::collection::vec(any::<u8>(), 0..40).prop_map(Op::Unencoded),
    ]
}

/// Reference model of the decoder: plain appends to a growing vector.
fn expand(ops: &[Op]) -> (BitWriter, Vec<u8>) {
    let mut writer = BitWriter::new();
    let mut expected = Vec::new();

    for op in ops {
        match op {
            Op::Literal(value) => {
                writer = writer.literal(*value);
                expected.push(*value);
            }
            Op::BackReference { distance, length } => {
                writer = writer.back_reference(*distance, *length);

                let distance = usize::try_from(*distance).unwrap();
                for _ in 0..*length {
                    // Before the first decoded byte the window is still zeroed.
                    let byte = expected.len().checked_sub(distance).map_or(0, |i| expected[i]);
                    expected.push(byte);
                }
            }
            Op::Unencoded(raw) => {
                writer = writer.unencoded(raw);
                expected.extend_from_slice(raw);
            }
        }
    }

    (writer, expected)
}

proptest! {
    #[test]
    fn round_trip(data in proptest::collection::vec(any::<u8>(), 0..140_000)) {
        let wire = ZgfxContext::new(Role::Compressor).compress(&data).unwrap();
        prop_assert_eq!(wire.len(), compressed_size_hint(data.len()));

        let decoded = decompressor().decompress(&wire).unwrap();
        prop_assert_eq!(decoded, data);
    }

    #[test]
    fn round_trip_reuses_one_context(chunks in proptest::collection::vec(proptest::collection::vec(any::<u8>(), 0..1_000), 1..8)) {
        let mut sender = ZgfxContext::new(Role::Compressor);
        let mut receiver = decompressor();

        for chunk in chunks {
            let wire = sender.compress(&chunk).unwrap();
            prop_assert_eq!(receiver.decompress(&wire).unwrap(), chunk);
        }
    }

    #[test]
    fn decodes_generated_token_streams(ops in proptest::collection::vec(op(), 1..60)) {
        let (writer, expected) = expand(&ops);
        prop_assume!(expected.len() <= SEGMENT_OUTPUT_CAPACITY);

        let decoded = decompressor().decompress(&compressed_single(writer)).unwrap();
        prop_assert_eq!(decoded, expected);
    }

    #[test]
    fn arbitrary_compressed_segments_terminate(payload in proptest::collection::vec(any::<u8>(), 1..2_048)) {
        let mut output = vec![0xCD; 4];

        match decompressor().decompress_into(&single_segment(COMPRESSED_HEADER, &payload), &mut output) {
            Ok(written) => {
                prop_assert!(written <= SEGMENT_OUTPUT_CAPACITY);
                prop_assert_eq!(output.len(), 4 + written);
            }
            Err(_) => prop_assert_eq!(output, vec![0xCD; 4]),
        }
    }

    #[test]
    fn mutated_segments_terminate(
        ops in proptest::collection::vec(op(), 1..30),
        flips in proptest::collection::vec((any::<prop::sample::Index>(), 0u8..8), 1..8),
        cut in any::<prop::sample::Index>(),
    ) {
        let (writer, _) = expand(&ops);
        let mut payload = writer.finish();

        for (index, bit) in flips {
            let i = index.index(payload.len());
            payload[i] ^= 1 << bit;
        }
        payload.truncate(cut.index(payload.len()) + 1);

        let result = decompressor().decompress(&single_segment(COMPRESSED_HEADER, &payload));
        if let Ok(decoded) = result {
            prop_assert!(decoded.len() <= SEGMENT_OUTPUT_CAPACITY);
        }
    }

    #[test]
    fn arbitrary_envelopes_terminate(wire in proptest::collection::vec(any::<u8>(), 0..512)) {
        let mut context = decompressor();

        if let Ok(decoded) = context.decompress(&wire) {
            // Each segment declares at least one byte of its own on the wire, so no envelope expands past this.
            prop_assert!(decoded.len() <= wire.len().max(1) * SEGMENT_OUTPUT_CAPACITY);
        }
    }
}

#[test]
fn all_zero_segments_are_rejected_or_decoded() {
    for len in [1, 2, 3, 17, 4_096] {
        let wire = single_segment(COMPRESSED_HEADER, &vec![0; len]);
        let result = decompressor().decompress(&wire);

        // Zero bits decode as null-prefixed literals; anything left over is too short for a token.
        match result {
            Ok(decoded) => assert!(decoded.iter().all(|&byte| byte == 0)),
            Err(error) => assert!(matches!(error, ZgfxError::BitBudgetExhausted { .. }), "{error:?}"),
        }
    }
}
