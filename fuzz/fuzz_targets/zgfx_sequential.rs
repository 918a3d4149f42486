#![no_main]

use ironrdp_fuzzing::generators::TransferSequence;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|input: TransferSequence<'_>| {
    ironrdp_fuzzing::oracles::zgfx_sequential_decompress(input);
});
