use ironrdp_testsuite_core::{multipart, single_segment, BitWriter, COMPRESSED_HEADER, STORED_HEADER};
use ironrdp_zgfx::{Role, ZgfxContext, ZgfxError};

mod framing;
mod properties;

fn decompressor() -> ZgfxContext {
    ZgfxContext::new(Role::Decompressor)
}

/// Wraps a token stream into a single compressed envelope.
fn compressed_single(writer: BitWriter) -> Vec<u8> {
    single_segment(COMPRESSED_HEADER, &writer.finish())
}
