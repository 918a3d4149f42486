use ironrdp_core::WriteCursor;
use tracing::trace;

use crate::error::{ZgfxError, ZgfxResult};
use crate::framing::{
    compressed_size_hint, ensure_space, Segment, MAX_SEGMENT_PAYLOAD, ZGFX_SEGMENTED_MULTIPART, ZGFX_SEGMENTED_SINGLE,
};

/// Frames `input` as stored segments and appends the envelope to `output`.
///
/// Input that fits one segment goes into a single envelope. Anything else, including
/// empty input, goes into a multipart envelope of `MAX_SEGMENT_PAYLOAD`-sized chunks.
pub(crate) fn encode_stored(input: &[u8], output: &mut Vec<u8>) -> ZgfxResult<()> {
    let uncompressed_size = u32::try_from(input.len()).map_err(|_| ZgfxError::InputTooLarge { size: input.len() })?;
    let segment_count = u16::try_from(input.len().div_ceil(MAX_SEGMENT_PAYLOAD))
        .map_err(|_| ZgfxError::InputTooLarge { size: input.len() })?;

    let start = output.len();
    output.resize(start + compressed_size_hint(input.len()), 0);

    let result = write_envelope(input, uncompressed_size, segment_count, &mut output[start..]);

    match result {
        Ok(written) => {
            output.truncate(start + written);

            trace!(
                input_len = input.len(),
                segment_count,
                encoded_len = written,
                "Encoded ZGFX envelope"
            );

            Ok(())
        }
        Err(error) => {
            output.truncate(start);
            Err(error)
        }
    }
}

fn write_envelope(input: &[u8], uncompressed_size: u32, segment_count: u16, dst: &mut [u8]) -> ZgfxResult<usize> {
    let mut dst = WriteCursor::new(dst);

    if segment_count == 1 {
        ensure_space(&dst, 1)?;
        dst.write_u8(ZGFX_SEGMENTED_SINGLE);
        Segment::stored(input).encode(&mut dst)?;
    } else {
        ensure_space(&dst, 1 + 2 + 4)?;
        dst.write_u8(ZGFX_SEGMENTED_MULTIPART);
        dst.write_u16(segment_count);
        dst.write_u32(uncompressed_size);

        for chunk in input.chunks(MAX_SEGMENT_PAYLOAD) {
            let segment = Segment::stored(chunk);
            let size = u32::try_from(segment.size()).map_err(|_| ZgfxError::InputTooLarge { size: segment.size() })?;

            ensure_space(&dst, 4)?;
            dst.write_u32(size);
            segment.encode(&mut dst)?;
        }
    }

    Ok(dst.pos())
}
