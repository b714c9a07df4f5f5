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

use crate::random_entries;
use reference_trie::{test_entries, TestTrie};
use trie_verify::{
	node::decode_hash, Hasher, KeccakHasher, Node, NodeCodec, NodeHandle, Reason, RlpNodeCodec,
};

type Codec = RlpNodeCodec<KeccakHasher>;

/// Decode `node` and every node inlined in it.
fn decode_all(node: &[u8]) -> usize {
	let decoded = Codec::decode(node).expect("reference nodes decode");
	1 + decoded
		.children()
		.map(|child| match child {
			NodeHandle::Inline(inline) => decode_all(inline),
			NodeHandle::Hash(hash) => {
				assert!(decode_hash::<KeccakHasher>(hash).is_some());
				0
			},
		})
		.sum::<usize>()
}

#[test]
fn reference_nodes_decode() {
	let trie = TestTrie::new(test_entries());
	let keys: Vec<&[u8]> = test_entries().into_iter().map(|(k, _)| k).collect();
	let proof = trie.multi_proof(&keys);
	let decoded: usize = proof.iter().map(|node| decode_all(node)).sum();
	// "bravo" and the horse/house leaves are inlined in their parents
	assert!(decoded > proof.len());

	let trie = TestTrie::new(random_entries(3, 100, 20));
	for (key, _) in random_entries(3, 100, 20) {
		for node in trie.proof(&key) {
			decode_all(&node);
		}
	}
}

#[test]
fn hash_children_point_into_the_proof() {
	let trie = TestTrie::new(random_entries(9, 50, 40));
	for (key, _) in random_entries(9, 50, 40) {
		let proof = trie.proof(&key);
		for pair in proof.windows(2) {
			let child_hash = KeccakHasher::hash(&pair[1]);
			let parent = Codec::decode(&pair[0]).expect("reference nodes decode");
			assert!(parent.children().any(|child| child == NodeHandle::Hash(&child_hash[..])));
		}
	}
}

#[test]
fn root_is_never_empty_in_a_populated_trie() {
	let trie = TestTrie::new(test_entries());
	let proof = trie.proof(b"dog");
	assert!(!Codec::is_empty_node(&proof[0]));
	assert!(Codec::is_empty_node(Codec::empty_node()));
	assert_eq!(Codec::decode(Codec::empty_node()).ok(), Some(Node::Empty));
}

#[test]
fn corruption_maps_to_reasons() {
	let trie = TestTrie::new(test_entries());
	let root = trie.proof(b"do").remove(0);

	// cut short: the list header promises more than is there
	let truncated = &root[..root.len() - 1];
	let reason: Reason = Codec::decode(truncated).unwrap_err().into();
	assert_eq!(reason, Reason::MalformedEncoding);

	// one byte too many
	let mut extended = root.clone();
	extended.push(0x80);
	let reason: Reason = Codec::decode(&extended).unwrap_err().into();
	assert_eq!(reason, Reason::MalformedEncoding);
}
