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

use crate::random_keys;
use rand::{rngs::SmallRng, seq::SliceRandom, Rng, SeedableRng};
use trie_verify::{quick_sort, sort_keys, Key, KeySet};

#[test]
fn random_keys_sort_like_std() {
	for (seed, count) in [(1u64, 0usize), (2, 1), (3, 2), (4, 3), (5, 100), (6, 5000)].iter() {
		let mut keys = random_keys(*seed, *count);
		let mut expected = keys.clone();
		expected.sort_unstable();
		sort_keys(&mut keys);
		assert_eq!(keys, expected, "seed {}", seed);
	}
}

#[test]
fn heavy_duplicates() {
	let mut rng = SmallRng::seed_from_u64(12);
	let pool = random_keys(13, 4);
	let mut keys: Vec<Key> = (0..2000).map(|_| pool[rng.gen_range(0..pool.len())]).collect();
	let mut expected = keys.clone();
	expected.sort();
	sort_keys(&mut keys);
	assert_eq!(keys, expected);
}

#[test]
fn sorted_and_reversed_input() {
	let mut keys = random_keys(21, 1000);
	keys.sort();
	let expected = keys.clone();
	sort_keys(&mut keys);
	assert_eq!(keys, expected);

	keys.reverse();
	sort_keys(&mut keys);
	assert_eq!(keys, expected);
}

#[test]
fn generic_items() {
	let mut rng = SmallRng::seed_from_u64(31);
	let mut items: Vec<i64> = (0..3000).map(|_| rng.gen_range(-50..50)).collect();
	let mut expected = items.clone();
	expected.sort();
	quick_sort(&mut items);
	assert_eq!(items, expected);

	let mut words = vec!["house", "do", "horse", "dog", "alfa", "doge", "bravo", "do"];
	quick_sort(&mut words);
	assert_eq!(words, vec!["alfa", "bravo", "do", "do", "dog", "doge", "horse", "house"]);
}

#[test]
fn key_set_is_order_insensitive() {
	let mut rng = SmallRng::seed_from_u64(41);
	let mut keys = random_keys(42, 300);
	let repeated = keys[..100].to_vec();
	keys.extend(repeated);
	let set = KeySet::new(&keys);
	assert_eq!(set.len(), 300);

	keys.shuffle(&mut rng);
	assert_eq!(KeySet::new(&keys), set);
	for (rank, key) in set.iter().enumerate() {
		assert_eq!(set.position(key), Some(rank));
	}
	assert!(set.as_slice().windows(2).all(|w| w[0] < w[1]));
}
