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
#![cfg_attr(not(feature = "std"), no_std)]

//! Verification of Merkle-Patricia trie proofs.
//!
//! A proof is the list of encoded trie nodes on the paths from a root to the
//! keys in question. Each lookup walks those nodes from the root hash, checking
//! every hash link and consuming the key nibble by nibble, and ends in a proven
//! value, a proven absence, or the [`Reason`] the proof is unusable.

#[cfg(not(feature = "std"))]
extern crate alloc;

#[cfg(feature = "std")]
mod rstd {
	pub use std::{cmp, collections, error::Error, fmt, format, hash, marker, mem, slice, vec};
}

#[cfg(not(feature = "std"))]
mod rstd {
	pub use alloc::{collections, format, vec};
	pub use core::{cmp, fmt, hash, marker, mem, slice};
	pub trait Error {}
	impl<T> Error for T {}
}

use self::rstd::{fmt, vec::Vec};

mod keccak_hasher;
mod lookup;
pub mod nibble;
pub mod node;
pub mod node_codec;
mod proof_nodes;
pub mod sort;
mod verify;

pub use self::keccak_hasher::{KeccakHasher, HASH_LENGTH};
pub use self::lookup::{step, Lookup, Step};
pub use self::nibble::{HexPrefixError, NibbleSlice};
pub use self::node::{Node, NodeHandle};
pub use self::node_codec::{DecodeError, NodeCodec, RlpNodeCodec};
pub use self::proof_nodes::ProofNodes;
pub use self::sort::{quick_sort, sort_keys, KeySet};
pub use self::verify::{verify_proof, verify_value, ProofVerifier, VerifyError};
pub use hash_db::{self, Hasher};

/// Length in bytes of a key passed to [`verify_proof`].
pub const KEY_LENGTH: usize = 32;

/// A fixed width key, 64 nibbles.
pub type Key = [u8; KEY_LENGTH];

/// Why a proof cannot answer for a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Reason {
	/// A node is not a well-formed encoding.
	MalformedEncoding,
	/// A node is well encoded but matches no node shape.
	MalformedNode,
	/// The walk reached a hash reference the proof holds no node for.
	MissingNode,
	/// A node was supplied where a hash reference points, but its bytes hash
	/// to something else.
	HashMismatch,
	/// The walk visited more nodes than the depth limit allows.
	DepthExceeded,
}

impl fmt::Display for Reason {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		match self {
			Reason::MalformedEncoding => write!(f, "Malformed node encoding"),
			Reason::MalformedNode => write!(f, "Malformed trie node"),
			Reason::MissingNode => write!(f, "Proof is missing a node"),
			Reason::HashMismatch => write!(f, "Proof node does not match its hash reference"),
			Reason::DepthExceeded => write!(f, "Trie walk exceeded the depth limit"),
		}
	}
}

#[cfg(feature = "std")]
impl std::error::Error for Reason {}

/// Result of verifying one key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerificationResult {
	/// The key is in the trie, with this value.
	Found(Vec<u8>),
	/// The proof shows the key is not in the trie.
	NotFound,
	/// The proof is invalid or incomplete for this key.
	Rejected(Reason),
}

impl VerificationResult {
	/// The proven value, if any.
	pub fn value(&self) -> Option<&[u8]> {
		match self {
			VerificationResult::Found(value) => Some(value),
			_ => None,
		}
	}

	/// Whether the proof answered for the key, either way.
	pub fn is_proven(&self) -> bool {
		!matches!(self, VerificationResult::Rejected(_))
	}
}

/// Trait with definition of trie layout.
pub trait TrieLayout {
	/// Nodes a lookup may visit per key nibble, plus one for the root. `None`
	/// leaves lookups unbounded.
	const MAX_DEPTH_PER_NIBBLE: Option<usize> = Some(2);

	/// Hasher to use for this trie.
	type Hash: Hasher;
	/// Codec to use (needs to match hasher and nibble ops).
	type Codec: NodeCodec<HashOut = <Self::Hash as Hasher>::Out>;
}

/// Ethereum trie layout: Keccak-256 node hashes and RLP encoded nodes.
#[derive(Default, Clone)]
pub struct EthereumLayout;

impl TrieLayout for EthereumLayout {
	type Hash = KeccakHasher;
	type Codec = RlpNodeCodec<KeccakHasher>;
}

/// Hash type for a trie layout.
pub type TrieHash<L> = <<L as TrieLayout>::Hash as Hasher>::Out;
