#![no_main]

use libfuzzer_sys::fuzz_target;
use trie_verify_fuzz::fuzz_that_verify_never_panics;

fuzz_target!(|data: &[u8]| {
	fuzz_that_verify_never_panics::<trie_verify::EthereumLayout>(data);
});
