// Copyright 2019, 2020 Parity Technologies
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

//! Single key statements, as served by `eth_getProof`.

use reference_trie::{test_entries, test_layouts, RefHash, TestTrie};
use trie_verify::{verify_value, Hasher, KeccakHasher, Reason, TrieLayout, VerifyError};

fn test_generate_proof(
	entries: Vec<(&'static [u8], &'static [u8])>,
	key: &[u8],
) -> (RefHash, Vec<Vec<u8>>) {
	let trie = TestTrie::new(entries);
	(*trie.root(), trie.proof(key))
}

test_layouts!(trie_proof_works2, trie_proof_works_internal2);
fn trie_proof_works_internal2<T: TrieLayout<Hash = KeccakHasher>>() {
	let entries: Vec<(&'static [u8], &'static [u8])> = vec![(b"do", b"verb"), (b"dog", b"puppy")];

	let (root, proof) = test_generate_proof(entries.clone(), b"do");
	assert!(verify_value::<T, _>(&root, &proof, b"do", Some(b"verb")).is_ok(), "verifying do");

	let (root, proof) = test_generate_proof(entries, b"dog");
	assert!(verify_value::<T, _>(&root, &proof, b"dog", Some(b"puppy")).is_ok(), "verifying dog");
}

test_layouts!(trie_proof_works, trie_proof_works_internal);
fn trie_proof_works_internal<T: TrieLayout<Hash = KeccakHasher>>() {
	let present: [(&[u8], &[u8]); 4] =
		[(b"do", b"verb"), (b"dog", b"puppy"), (b"doge", &[0; 32]), (b"bravo", b"bravo")];
	for (key, value) in present.iter() {
		let (root, proof) = test_generate_proof(test_entries(), key);
		assert!(verify_value::<T, _>(&root, &proof, key, Some(*value)).is_ok(), "verifying {:?}", key);
	}

	let absent: [&[u8]; 4] = [b"alfabet", b"d", b"do\x10", b"halp"];
	for key in absent.iter() {
		let (root, proof) = test_generate_proof(test_entries(), key);
		assert!(verify_value::<T, _>(&root, &proof, key, None).is_ok(), "verifying {:?}", key);
	}
}

test_layouts!(trie_proof_works_for_empty_trie, trie_proof_works_for_empty_trie_internal);
fn trie_proof_works_for_empty_trie_internal<T: TrieLayout<Hash = KeccakHasher>>() {
	let absent: [&[u8]; 3] = [b"alpha", b"bravo", b"\x42\x42"];
	for key in absent.iter() {
		let (root, proof) = test_generate_proof(vec![], key);
		assert_eq!(proof, vec![vec![0x80]]);
		assert!(verify_value::<T, _>(&root, &proof, key, None).is_ok(), "verifying {:?}", key);
	}
}

test_layouts!(test_verify_value_mismatch, test_verify_value_mismatch_internal);
fn test_verify_value_mismatch_internal<T: TrieLayout<Hash = KeccakHasher>>() {
	let (root, proof) = test_generate_proof(test_entries(), b"horse");
	let res = verify_value::<T, _>(&root, &proof, b"horse", Some(b"stallion"));
	assert!(res.is_ok(), "verifying horse");

	let res = verify_value::<T, _>(&root, &proof, b"halp", Some(b"plz"));
	assert_eq!(res, Err(VerifyError::NonExistingValue(b"halp".to_vec())));

	let res = verify_value::<T, _>(&root, &proof, b"horse", Some(b"rocinante"));
	assert_eq!(res, Err(VerifyError::ValueMismatch(b"stallion".to_vec())));

	let res = verify_value::<T, _>(&root, &proof, b"horse", None);
	assert_eq!(res, Err(VerifyError::ExistingValue(b"stallion".to_vec())));
}

test_layouts!(test_verify_incomplete_proof, test_verify_incomplete_proof_internal);
fn test_verify_incomplete_proof_internal<T: TrieLayout<Hash = KeccakHasher>>() {
	let (root, mut proof) = test_generate_proof(test_entries(), b"alfa");

	proof.pop();
	let res = verify_value::<T, _>(&root, &proof, b"alfa", Some(&[0; 32]));
	assert_eq!(res, Err(VerifyError::InvalidProof(Reason::MissingNode)));
}

test_layouts!(test_verify_decode_error, test_verify_decode_error_internal);
fn test_verify_decode_error_internal<T: TrieLayout<Hash = KeccakHasher>>() {
	let (_, mut proof) = test_generate_proof(test_entries(), b"bravo");

	let fake_node = b"this is not a trie node";
	proof.insert(0, fake_node.to_vec());
	let fake_root = KeccakHasher::hash(fake_node);
	let res = verify_value::<T, _>(&fake_root, &proof, b"bravo", Some(b"bravo"));
	assert_eq!(res, Err(VerifyError::InvalidProof(Reason::MalformedEncoding)));
}
