// Copyright 2020 Parity Technologies
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Tests for trie-verify crate.

#[cfg(test)]
mod codec;
#[cfg(test)]
mod eip1186;
#[cfg(test)]
mod sort;

use rand::{rngs::SmallRng, RngCore, SeedableRng};
use trie_verify::{Key, KEY_LENGTH};

/// `count` pseudo-random keys from `seed`, possibly repeating.
pub fn random_keys(seed: u64, count: usize) -> Vec<Key> {
	let mut rng = SmallRng::seed_from_u64(seed);
	(0..count)
		.map(|_| {
			let mut key = [0u8; KEY_LENGTH];
			rng.fill_bytes(&mut key[..]);
			key
		})
		.collect()
}

/// `count` entries with pseudo-random keys and values of `value_length` bytes.
pub fn random_entries(seed: u64, count: usize, value_length: usize) -> Vec<(Key, Vec<u8>)> {
	let mut rng = SmallRng::seed_from_u64(seed ^ 0x5eed);
	random_keys(seed, count)
		.into_iter()
		.map(|key| {
			let mut value = vec![0u8; value_length];
			rng.fill_bytes(&mut value[..]);
			(key, value)
		})
		.collect()
}

#[cfg(test)]
fn init_log() {
	let _ = env_logger::builder().is_test(true).try_init();
}
