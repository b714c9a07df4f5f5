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

//! Index of the nodes supplied in a proof, keyed by their hash.

use crate::nibble::NibbleSlice;
use crate::node::{decode_hash, Node, NodeHandle};
use crate::node_codec::NodeCodec;
use crate::rstd::{hash::BuildHasherDefault, vec::Vec};
use crate::{Reason, TrieHash, TrieLayout};
use hash_db::Hasher;
use hashbrown::{HashMap, HashSet};
use log::trace;
use smallvec::SmallVec;

type StdHasherOf<L> = BuildHasherDefault<<<L as TrieLayout>::Hash as Hasher>::StdHasher>;

/// Read-only map from node hash to encoded node, built once per proof.
///
/// Every entry is keyed by the hash of its own bytes, so a successful lookup
/// is also a verified hash link.
pub struct ProofNodes<'a, L: TrieLayout> {
	nodes: HashMap<TrieHash<L>, &'a [u8], StdHasherOf<L>>,
	/// Nodes neither the root nor referenced by any other supplied node.
	unclaimed: Vec<(TrieHash<L>, &'a [u8])>,
}

impl<'a, L: TrieLayout> ProofNodes<'a, L> {
	/// Index `proof` for a walk starting at `root`.
	pub fn new<I: AsRef<[u8]>>(root: &TrieHash<L>, proof: &'a [I]) -> Self {
		let mut nodes: HashMap<_, _, StdHasherOf<L>> = HashMap::default();
		nodes.reserve(proof.len());
		for node in proof {
			let data = node.as_ref();
			nodes.insert(L::Hash::hash(data), data);
		}

		let mut claimed: HashSet<TrieHash<L>, StdHasherOf<L>> = HashSet::default();
		claimed.insert(*root);
		for data in nodes.values() {
			let mut pending: SmallVec<[&[u8]; 4]> = SmallVec::new();
			pending.push(data);
			// inline children are strict sub-slices, so this terminates
			while let Some(data) = pending.pop() {
				let node = match L::Codec::decode(data) {
					Ok(node) => node,
					Err(_) => continue,
				};
				for child in node.children() {
					match child {
						NodeHandle::Hash(hash) => {
							if let Some(hash) = decode_hash::<L::Hash>(hash) {
								claimed.insert(hash);
							}
						},
						NodeHandle::Inline(data) => pending.push(data),
					}
				}
			}
		}
		let unclaimed: Vec<_> = nodes
			.iter()
			.filter(|(hash, _)| !claimed.contains(*hash))
			.map(|(hash, data)| (*hash, *data))
			.collect();
		trace!(
			target: "trie",
			"indexed proof: {} nodes supplied, {} distinct, {} unclaimed",
			proof.len(),
			nodes.len(),
			unclaimed.len(),
		);

		ProofNodes { nodes, unclaimed }
	}

	/// Get the encoded node with the given hash.
	pub fn get(&self, hash: &TrieHash<L>) -> Option<&'a [u8]> {
		self.nodes.get(hash).copied()
	}

	/// Number of distinct nodes.
	pub fn len(&self) -> usize {
		self.nodes.len()
	}

	/// Whether the proof supplied no node at all.
	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty()
	}

	/// Number of supplied nodes that nothing in the proof links to.
	pub fn unclaimed(&self) -> usize {
		self.unclaimed.len()
	}

	/// Classify a hash reference that has no matching node, at the point of
	/// the walk where `partial` is left to consume.
	///
	/// The miss is a `HashMismatch` when some unlinked node could stand in
	/// that position: it no longer decodes, or the walk continues from it
	/// through the proof to a node that accounts for exactly the nibbles left.
	/// Otherwise the node was simply not supplied.
	pub fn missing_reason(&self, partial: NibbleSlice) -> Reason {
		match self.unclaimed.iter().any(|(hash, data)| self.stands_in(hash, *data, partial, false)) {
			true => Reason::HashMismatch,
			false => Reason::MissingNode,
		}
	}

	/// Whether the walk fits `data` at a position with `partial` left.
	///
	/// A second unlinked node may stand in for a child whose reference was
	/// corrupted along with `data`; `nested` stops the search there.
	fn stands_in(&self, own: &TrieHash<L>, data: &'a [u8], partial: NibbleSlice, nested: bool) -> bool {
		let mut data = data;
		let mut partial = partial;
		let mut first = true;
		// hash links cannot cycle and inline nodes shrink, so this terminates
		loop {
			let node = match L::Codec::decode(data) {
				Ok(node) => node,
				Err(_) => return first && !nested,
			};
			first = false;
			let child = match node {
				Node::Empty => return false,
				Node::Leaf(path, _) => return path.len() == partial.len(),
				Node::Extension(path, child) => {
					if !partial.starts_with(&path) {
						return false
					}
					partial = partial.mid(path.len());
					child
				},
				Node::Branch(children, value) => {
					if partial.is_empty() {
						return value.is_some()
					}
					match children[partial.at(0) as usize] {
						Some(child) => {
							partial = partial.mid(1);
							child
						},
						None => return false,
					}
				},
			};
			data = match child {
				NodeHandle::Inline(data) => data,
				NodeHandle::Hash(hash) => match decode_hash::<L::Hash>(hash).and_then(|h| self.get(&h)) {
					Some(data) => data,
					None =>
						return !nested &&
							self.unclaimed.iter().any(|(hash, data)| {
								hash != own && self.stands_in(hash, *data, partial, true)
							}),
				},
			};
		}
	}
}
