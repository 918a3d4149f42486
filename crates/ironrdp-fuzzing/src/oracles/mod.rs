//! Oracles.
//!
//! Oracles take a test case and determine whether we have a bug. For example,
//! one of the simplest oracles is to take a ZGFX transfer as our input test case,
//! decode it, and (implicitly) check that no assertions failed or panics
//! happened. A more complicated oracle might compress arbitrary data and make
//! sure that decompressing it gives back the exact same bytes.
//!
//! When an oracle finds a bug, it should report it to the fuzzing engine by
//! panicking.

use ironrdp_zgfx::{compressed_size_hint, Role, SegmentedData, ZgfxContext, SEGMENT_OUTPUT_CAPACITY};

use crate::generators::TransferSequence;

pub fn zgfx_decompress(data: &[u8]) {
    let _ = SegmentedData::decode(data);

    let mut context = ZgfxContext::new(Role::Decompressor);
    let mut output = vec![0xAA; 3];

    match context.decompress_into(data, &mut output) {
        Ok(written) => {
            assert_eq!(output.len(), 3 + written);

            if let Ok(SegmentedData::Single(_)) = SegmentedData::decode(data) {
                assert!(written <= SEGMENT_OUTPUT_CAPACITY);
            }
        }
        Err(_) => assert_eq!(output, [0xAA; 3]),
    }
}

pub fn zgfx_round_trip(data: &[u8]) {
    let mut compressor = ZgfxContext::new(Role::Compressor);
    let mut decompressor = ZgfxContext::new(Role::Decompressor);

    let wire = compressor.compress(data).expect("pass-through framing of fuzzer-sized input");
    assert_eq!(wire.len(), compressed_size_hint(data.len()));

    let decoded = decompressor.decompress(&wire).expect("decode own framing");
    assert_eq!(decoded, data);
}

pub fn zgfx_sequential_decompress(input: TransferSequence<'_>) {
    let mut context = ZgfxContext::new(Role::Decompressor);

    for (index, transfer) in input.transfers.iter().enumerate() {
        if input.reset_before.is_some_and(|reset| usize::from(reset) == index) {
            context.reset();
        }

        let _ = context.decompress(&transfer.to_wire());
    }
}
