// Copyright 2017, 2020 Parity Technologies
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

use arbitrary::{Arbitrary, Unstructured};
use reference_trie::TestTrie;
use std::collections::BTreeMap;
use trie_verify::{
	verify_proof, Hasher, KeccakHasher, Key, ProofVerifier, TrieLayout, VerificationResult,
};

/// Raw proof material, with no relation to any trie.
#[derive(Debug, Arbitrary)]
struct Garbage {
	root: Key,
	hash_first_node: bool,
	proof: Vec<Vec<u8>>,
	keys: Vec<Key>,
}

/// Entries of a trie, one key to look up, and where to corrupt its proof.
#[derive(Debug, Arbitrary)]
struct Tampering {
	entries: Vec<(Vec<u8>, Vec<u8>)>,
	key: Vec<u8>,
	node: usize,
	byte: usize,
	mask: u8,
}

/// Entries as the trie holds them: later duplicates win and empty values are
/// dropped, since an empty value marks absence.
fn fuzz_to_data(entries: Vec<(Vec<u8>, Vec<u8>)>) -> BTreeMap<Vec<u8>, Vec<u8>> {
	entries.into_iter().filter(|(_, v)| !v.is_empty()).collect()
}

pub fn fuzz_that_verify_never_panics<L: TrieLayout<Hash = KeccakHasher>>(input: &[u8]) {
	let garbage = match Garbage::arbitrary(&mut Unstructured::new(input)) {
		Ok(garbage) => garbage,
		Err(_) => return,
	};
	let root = match garbage.proof.first() {
		Some(node) if garbage.hash_first_node => KeccakHasher::hash(node),
		_ => garbage.root,
	};
	let results = verify_proof::<L, _>(&root, &garbage.proof, &garbage.keys);
	assert!(results.len() <= garbage.keys.len());
}

pub fn fuzz_that_verify_rejects_tampered_proofs<L: TrieLayout<Hash = KeccakHasher>>(input: &[u8]) {
	let tampering = match Tampering::arbitrary(&mut Unstructured::new(input)) {
		Ok(tampering) => tampering,
		Err(_) => return,
	};
	if tampering.mask == 0 {
		return
	}
	let trie = TestTrie::new(fuzz_to_data(tampering.entries));
	let mut proof = trie.proof(&tampering.key);
	let node = tampering.node % proof.len();
	if proof[node].is_empty() {
		return
	}
	let byte = tampering.byte % proof[node].len();
	proof[node][byte] ^= tampering.mask;

	let result = ProofVerifier::<L>::new(trie.root(), &proof).verify_key(&tampering.key);
	assert!(!result.is_proven(), "tampered proof accepted: {:?}", result);
}

pub fn fuzz_that_verify_accepts_valid_proofs<L: TrieLayout<Hash = KeccakHasher>>(input: &[u8]) {
	let (entries, absent) = match <(Vec<(Vec<u8>, Vec<u8>)>, Vec<u8>)>::arbitrary(&mut Unstructured::new(input)) {
		Ok(decoded) => decoded,
		Err(_) => return,
	};
	let data = fuzz_to_data(entries);
	let trie = TestTrie::new(data.clone());

	let keys: Vec<&[u8]> = data.keys().map(|k| &k[..]).chain(Some(&absent[..])).collect();
	let proof = trie.multi_proof(&keys);
	let verifier = ProofVerifier::<L>::new(trie.root(), &proof);
	for key in keys {
		let expected = match data.get(key) {
			Some(value) => VerificationResult::Found(value.clone()),
			None => VerificationResult::NotFound,
		};
		assert_eq!(verifier.verify_key(key), expected);
	}
}
