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

//! Trie lookup over the nodes of a proof.

use crate::nibble::NibbleSlice;
use crate::node::{decode_hash, Node, NodeHandle, ToHex};
use crate::node_codec::NodeCodec;
use crate::proof_nodes::ProofNodes;
use crate::{Reason, TrieHash, TrieLayout, VerificationResult};
use log::{debug, trace};

/// Outcome of applying one node to the remaining key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step<'a, 'k> {
	/// Continue at the child with the nibbles left to consume.
	Descend(NodeHandle<'a>, NibbleSlice<'k>),
	/// The key ends at this value.
	Found(&'a [u8]),
	/// The node proves the key absent.
	NotFound,
}

/// Transition function of the walk: consume the nibbles `node` accounts for.
pub fn step<'a, 'k>(node: Node<'a>, partial: NibbleSlice<'k>) -> Step<'a, 'k> {
	match node {
		Node::Empty => Step::NotFound,
		Node::Leaf(slice, value) => match slice == partial {
			true => Step::Found(value),
			false => Step::NotFound,
		},
		Node::Extension(slice, child) => match partial.starts_with(&slice) {
			true => Step::Descend(child, partial.mid(slice.len())),
			false => Step::NotFound,
		},
		Node::Branch(children, value) => match partial.is_empty() {
			true => value.map_or(Step::NotFound, Step::Found),
			false => match children[partial.at(0) as usize] {
				Some(child) => Step::Descend(child, partial.mid(1)),
				None => Step::NotFound,
			},
		},
	}
}

/// Trie lookup helper object.
pub struct Lookup<'a, 'n, L: TrieLayout> {
	/// Nodes of the proof.
	pub nodes: &'n ProofNodes<'a, L>,
	/// Hash to start at.
	pub hash: TrieHash<L>,
	/// Maximum number of nodes a walk may visit, inline nodes included.
	pub max_depth: Option<usize>,
}

impl<'a, 'n, L: TrieLayout> Lookup<'a, 'n, L> {
	/// Look up the given key, returning the proven value, a proven absence, or
	/// the reason the proof cannot answer.
	pub fn look_up(self, key: NibbleSlice) -> VerificationResult {
		let mut partial = key;
		let mut hash = self.hash;
		let mut depth = 0usize;

		// this loop iterates through non-inline nodes.
		loop {
			let mut node_data = match self.nodes.get(&hash) {
				Some(data) => data,
				None => {
					let reason = self.nodes.missing_reason(partial);
					debug!(
						target: "trie",
						"no node for hash {:?} at depth {}: {}",
						ToHex(hash.as_ref()),
						depth,
						reason,
					);
					return VerificationResult::Rejected(reason)
				},
			};

			// this loop iterates through all inline children (usually max 1).
			loop {
				if self.max_depth.map_or(false, |max| depth >= max) {
					debug!(target: "trie", "depth limit {:?} reached", self.max_depth);
					return VerificationResult::Rejected(Reason::DepthExceeded)
				}
				depth += 1;

				let decoded = match L::Codec::decode(node_data) {
					Ok(node) => node,
					Err(e) => {
						debug!(target: "trie", "undecodable node at depth {}: {:?}", depth, e);
						return VerificationResult::Rejected(e.into())
					},
				};
				trace!(target: "trie", "step: partial={:?}, node={:?}", partial, decoded);

				let next_node = match step(decoded, partial) {
					Step::Found(value) => return VerificationResult::Found(value.to_vec()),
					Step::NotFound => return VerificationResult::NotFound,
					Step::Descend(child, rest) => {
						partial = rest;
						child
					},
				};

				// check if new node data is inline or hash.
				match next_node {
					NodeHandle::Hash(data) => {
						hash = match decode_hash::<L::Hash>(data) {
							Some(hash) => hash,
							None => return VerificationResult::Rejected(Reason::MalformedNode),
						};
						break
					},
					NodeHandle::Inline(data) => {
						node_data = data;
					},
				}
			}
		}
	}
}
