// Copyright 2017, 2018 Parity Technologies
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

use criterion::{black_box, criterion_group, criterion_main, Bencher, Criterion};

use reference_trie::TestTrie;
use trie_verify::{
	sort_keys, verify_proof, EthereumLayout as Layout, Key, NibbleSlice, NodeCodec, ProofVerifier,
	RlpNodeCodec, KeccakHasher,
};
use trie_verify_test::{random_entries, random_keys};

criterion_group!(
	benches,
	nibble_common_prefix,
	node_decode,
	key_sort,
	trie_proof_verification,
	trie_proof_verification_single,
);
criterion_main!(benches);

fn nibble_common_prefix(c: &mut Criterion) {
	let keys = random_keys(1, 255);
	let others = random_keys(2, 255);
	c.bench_function("nibble_common_prefix", move |b| {
		let mixed: Vec<_> = keys
			.iter()
			.zip(others.iter().rev())
			.map(|pair| (NibbleSlice::new(&pair.0[..]), NibbleSlice::new(&pair.1[..])))
			.collect();

		b.iter(&mut || {
			for (left, right) in mixed.iter() {
				let _ = black_box(left.common_prefix(right));
			}
		})
	});
}

fn node_decode(c: &mut Criterion) {
	let entries = random_entries(3, 4096, 32);
	let trie = TestTrie::new(entries.clone());
	let proof = trie.proof(&entries[0].0);

	c.bench_function("node_decode", move |b: &mut Bencher| {
		b.iter(|| {
			for node in proof.iter() {
				let _ = black_box(RlpNodeCodec::<KeccakHasher>::decode(node));
			}
		})
	});
}

fn key_sort(c: &mut Criterion) {
	let keys = random_keys(4, 10_000);
	c.bench_function("key_sort", move |b: &mut Bencher| {
		b.iter(|| {
			let mut keys = keys.clone();
			sort_keys(&mut keys);
			black_box(keys)
		})
	});
}

fn trie_proof_verification(c: &mut Criterion) {
	let data = random_entries(29, 204800 / 3 * 2, 32);
	let mut keys: Vec<Key> = data.iter().step_by(7).map(|(key, _)| *key).collect();
	keys.extend(random_keys(30, 1000));

	let trie = TestTrie::new(data);
	let proof = trie.multi_proof(&keys);
	let root = *trie.root();

	c.bench_function("trie_proof_verification", move |b: &mut Bencher| {
		b.iter(|| {
			let results = verify_proof::<Layout, _>(&root, &proof, &keys);
			assert!(results.values().all(|result| result.is_proven()));
		})
	});
}

fn trie_proof_verification_single(c: &mut Criterion) {
	let data = random_entries(31, 20_000, 32);
	let keys: Vec<Key> = data.iter().map(|(key, _)| *key).take(100).collect();

	let trie = TestTrie::new(data);
	let proof = trie.multi_proof(&keys);
	let root = *trie.root();

	c.bench_function("trie_proof_verification_single", move |b: &mut Bencher| {
		let verifier = ProofVerifier::<Layout>::new(&root, &proof);
		b.iter(|| {
			for key in keys.iter() {
				black_box(verifier.verify_key(key));
			}
		})
	});
}
