// Copyright 2017, 2021 Parity Technologies
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

//! Reference Ethereum trie: builds RLP encoded tries in memory and extracts
//! proofs from them, to produce fixtures for proof verification.

use hashbrown::{HashMap, HashSet};
use rlp::{Rlp, RlpStream, NULL_RLP};
use std::{cmp, collections::BTreeMap};
use trie_verify::{Hasher, KeccakHasher, RlpNodeCodec, TrieLayout, HASH_LENGTH};

/// Reference hasher is a keccak hasher.
pub type RefHasher = KeccakHasher;

/// Node hash of the reference trie.
pub type RefHash = [u8; HASH_LENGTH];

pub use trie_verify::EthereumLayout;

/// Ethereum layout without a bound on lookup depth.
#[derive(Default, Clone)]
pub struct UnboundedLayout;

impl TrieLayout for UnboundedLayout {
	const MAX_DEPTH_PER_NIBBLE: Option<usize> = None;
	type Hash = RefHasher;
	type Codec = RlpNodeCodec<RefHasher>;
}

/// Apply a test method on every test layouts.
#[macro_export]
macro_rules! test_layouts {
	($test:ident, $test_internal:ident) => {
		#[test]
		fn $test() {
			eprintln!("Running with layout `EthereumLayout`");
			$test_internal::<$crate::EthereumLayout>();
			eprintln!("Running with layout `UnboundedLayout`");
			$test_internal::<$crate::UnboundedLayout>();
		}
	};
}

/// Entries exercising every node kind, including inline leaves and branches
/// with values.
pub fn test_entries() -> Vec<(&'static [u8], &'static [u8])> {
	vec![
		// "alfa" is at a hash-referenced leaf node.
		(b"alfa", &[0; 32]),
		// "bravo" is at an inline leaf node.
		(b"bravo", b"bravo"),
		// "do" is at a hash-referenced branch node.
		(b"do", b"verb"),
		// "dog" is at a hash-referenced branch node.
		(b"dog", b"puppy"),
		// "doge" is at a hash-referenced leaf node.
		(b"doge", &[0; 32]),
		// extension node "o" (plus nibble) to next branch.
		(b"horse", b"stallion"),
		(b"house", b"building"),
	]
}

/// Hex-prefix encode `nibbles`, flagging a leaf path if `is_leaf`.
pub fn hex_prefix_encode(nibbles: &[u8], is_leaf: bool) -> Vec<u8> {
	let flag = if is_leaf { 0x20 } else { 0x00 };
	let mut encoded = Vec::with_capacity(nibbles.len() / 2 + 1);
	let rest = if nibbles.len() % 2 == 1 {
		encoded.push(flag | 0x10 | nibbles[0]);
		&nibbles[1..]
	} else {
		encoded.push(flag);
		nibbles
	};
	for pair in rest.chunks(2) {
		encoded.push(pair[0] << 4 | pair[1]);
	}
	encoded
}

/// Split bytes into nibbles, high nibble first.
pub fn to_nibbles(bytes: &[u8]) -> Vec<u8> {
	bytes.iter().flat_map(|b| vec![b >> 4, b & 0x0F]).collect()
}

fn shared_prefix_len<T: Eq>(first: &[T], second: &[T]) -> usize {
	first
		.iter()
		.zip(second.iter())
		.position(|(f, s)| f != s)
		.unwrap_or_else(|| cmp::min(first.len(), second.len()))
}

/// A trie held as its encoded nodes, keyed by hash.
///
/// Only nodes referenced by hash are stored; inline nodes live inside their
/// parent.
#[derive(Clone, Debug)]
pub struct TestTrie {
	root: RefHash,
	nodes: HashMap<RefHash, Vec<u8>>,
}

impl TestTrie {
	/// Build the trie holding `input`. Later duplicates of a key win.
	pub fn new<I, A, B>(input: I) -> Self
	where
		I: IntoIterator<Item = (A, B)>,
		A: AsRef<[u8]> + Ord,
		B: AsRef<[u8]>,
	{
		// first put elements into btree to sort them and to remove duplicates
		let input = input.into_iter().collect::<BTreeMap<_, _>>();
		let input = input
			.iter()
			.map(|(k, v)| (to_nibbles(k.as_ref()), v.as_ref()))
			.collect::<Vec<_>>();

		let mut nodes = HashMap::new();
		let root_node = build_trie(&input, 0, &mut nodes);
		let root = RefHasher::hash(&root_node);
		nodes.insert(root, root_node);
		TestTrie { root, nodes }
	}

	/// Build the key-hashed (secure) trie holding `input`.
	pub fn new_secure<I, A, B>(input: I) -> Self
	where
		I: IntoIterator<Item = (A, B)>,
		A: AsRef<[u8]>,
		B: AsRef<[u8]>,
	{
		TestTrie::new(input.into_iter().map(|(k, v)| (RefHasher::hash(k.as_ref()), v)))
	}

	pub fn root(&self) -> &RefHash {
		&self.root
	}

	/// Number of hash-referenced nodes, the root included.
	pub fn node_count(&self) -> usize {
		self.nodes.len()
	}

	/// Nodes on the path to `key`, root first. Enough to prove either the value
	/// or the absence of `key`.
	pub fn proof(&self, key: &[u8]) -> Vec<Vec<u8>> {
		let nibbles = to_nibbles(key);
		let mut proof = Vec::new();
		let mut hash = self.root;
		let mut partial = &nibbles[..];
		while let Some(node) = self.nodes.get(&hash) {
			proof.push(node.clone());
			match next_hash(node, &mut partial) {
				Some(next) => hash = next,
				None => break,
			}
		}
		proof
	}

	/// Union of the proofs of `keys`, each node once, in path order of the first
	/// key needing it.
	pub fn multi_proof<K: AsRef<[u8]>>(&self, keys: &[K]) -> Vec<Vec<u8>> {
		let mut seen = HashSet::new();
		let mut proof = Vec::new();
		for key in keys {
			for node in self.proof(key.as_ref()) {
				if seen.insert(RefHasher::hash(&node)) {
					proof.push(node);
				}
			}
		}
		proof
	}
}

/// Follow `partial` through `node` and its inline children, returning the next
/// hash to visit and consuming the nibbles passed.
fn next_hash<'k>(node: &[u8], partial: &mut &'k [u8]) -> Option<RefHash> {
	let mut rlp = Rlp::new(node);
	loop {
		let remaining: &'k [u8] = *partial;
		let child = match rlp.item_count().ok()? {
			2 => {
				let path: Vec<u8> = rlp.val_at(0).ok()?;
				let (is_leaf, path) = hex_prefix_decode(&path)?;
				if is_leaf || !remaining.starts_with(&path) {
					return None
				}
				*partial = &remaining[path.len()..];
				rlp.at(1).ok()?
			},
			17 => {
				let (index, rest) = remaining.split_first()?;
				*partial = rest;
				rlp.at(*index as usize).ok()?
			},
			_ => return None,
		};
		if child.is_list() {
			rlp = child;
			continue
		}
		let hash: Vec<u8> = child.as_val().ok()?;
		if hash.len() != HASH_LENGTH {
			return None
		}
		let mut out = RefHash::default();
		out.copy_from_slice(&hash);
		return Some(out)
	}
}

fn hex_prefix_decode(encoded: &[u8]) -> Option<(bool, Vec<u8>)> {
	let nibbles = to_nibbles(encoded);
	let flag = *nibbles.first()?;
	let skip = if flag & 0x01 == 1 { 1 } else { 2 };
	Some((flag & 0x02 == 0x02, nibbles.get(skip..)?.to_vec()))
}

/// Append a child reference: the node itself when its encoding is shorter than
/// a hash, its hash otherwise.
fn append_child(stream: &mut RlpStream, encoded: Vec<u8>, nodes: &mut HashMap<RefHash, Vec<u8>>) {
	if encoded.len() < HASH_LENGTH {
		stream.append_raw(&encoded, 1);
	} else {
		let hash = RefHasher::hash(&encoded);
		nodes.insert(hash, encoded);
		stream.append(&hash.to_vec());
	}
}

/// Encode the node for sorted `(nibbles, value)` pairs sharing their first
/// `cursor` nibbles.
fn build_trie(
	input: &[(Vec<u8>, &[u8])],
	cursor: usize,
	nodes: &mut HashMap<RefHash, Vec<u8>>,
) -> Vec<u8> {
	match input.len() {
		// No input, just the empty node.
		0 => NULL_RLP.to_vec(),
		// Leaf node; the remainder of the key and the value. Done.
		1 => {
			let mut stream = RlpStream::new_list(2);
			stream.append(&hex_prefix_encode(&input[0].0[cursor..], true));
			stream.append(&input[0].1.to_vec());
			stream.out().to_vec()
		},
		// We have multiple items in the input. We need to figure out if we
		// should add an extension node or a branch node.
		_ => {
			let (key, value) = (&input[0].0, input[0].1);
			// Count the number of nibbles in the other elements that are
			// shared with the first key.
			let shared_nibble_count = input
				.iter()
				.skip(1)
				.fold(key.len(), |acc, (k, _)| cmp::min(shared_prefix_len(key, k), acc));
			// Add an extension node if the number of shared nibbles is greater
			// than what we saw on the last call (`cursor`).
			if shared_nibble_count > cursor {
				let mut stream = RlpStream::new_list(2);
				stream.append(&hex_prefix_encode(&key[cursor..shared_nibble_count], false));
				append_child(&mut stream, build_trie(input, shared_nibble_count, nodes), nodes);
				return stream.out().to_vec()
			}

			// We have a value for exactly this key. Branch node will have a value
			// attached to it.
			let value = if cursor == key.len() { Some(value) } else { None };

			let mut stream = RlpStream::new_list(17);
			// Children keys begin at either index 1 or 0, depending on whether we have a value.
			let mut begin = match value {
				None => 0,
				_ => 1,
			};
			for i in 0..16u8 {
				let count = input[begin..].iter().take_while(|(k, _)| k[cursor] == i).count();
				if count > 0 {
					let child = build_trie(&input[begin..begin + count], cursor + 1, nodes);
					append_child(&mut stream, child, nodes);
					begin += count;
				} else {
					stream.append_empty_data();
				}
			}
			match value {
				Some(value) => stream.append(&value.to_vec()),
				None => stream.append_empty_data(),
			};
			stream.out().to_vec()
		},
	}
}
