// Copyright 2021, 2021 Parity Technologies
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

//! Verification of key/value statements against a trie root.

use crate::lookup::Lookup;
use crate::nibble::{nibble_ops::NIBBLE_PER_BYTE, NibbleSlice};
use crate::proof_nodes::ProofNodes;
use crate::rstd::{collections::BTreeMap, fmt, vec::Vec};
use crate::sort::KeySet;
use crate::{Key, Reason, TrieHash, TrieLayout, VerificationResult};
use hash_db::Hasher;
use log::trace;

/// Errors that may occur when verifying a single statement with [`verify_value`].
#[derive(PartialEq, Eq, Clone, Debug)]
pub enum VerifyError {
	/// The statement claims a value but the proof shows the key is absent. The
	/// parameter is the key.
	NonExistingValue(Vec<u8>),
	/// The statement claims absence but the proof holds the given value.
	ExistingValue(Vec<u8>),
	/// The proof holds a different value than the statement. The parameter is
	/// the proven value.
	ValueMismatch(Vec<u8>),
	/// The proof cannot answer for the key.
	InvalidProof(Reason),
}

impl fmt::Display for VerifyError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			VerifyError::NonExistingValue(key) =>
				write!(f, "Key does not exist in trie: key={:?}", key),
			VerifyError::ExistingValue(value) =>
				write!(f, "Trie contains a value for given key: value={:?}", value),
			VerifyError::ValueMismatch(value) =>
				write!(f, "Expected value was not found in the trie: value={:?}", value),
			VerifyError::InvalidProof(reason) => write!(f, "Invalid proof: {}", reason),
		}
	}
}

#[cfg(feature = "std")]
impl std::error::Error for VerifyError {
	fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
		match self {
			VerifyError::InvalidProof(reason) => Some(reason),
			_ => None,
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DepthLimit {
	/// Derived from the key length and `TrieLayout::MAX_DEPTH_PER_NIBBLE`.
	Layout,
	Fixed(usize),
	Unlimited,
}

/// Verifier for lookups against one root and one proof.
///
/// The proof is indexed once on construction and shared by every lookup, so
/// any number of keys can be checked against it.
///
/// ```
/// use trie_verify::{EthereumLayout, Hasher, KeccakHasher, ProofVerifier, VerificationResult};
///
/// // a trie holding the single leaf `0a0b => "v1"`
/// let leaf = vec![0xc7, 0x83, 0x20, 0x0a, 0x0b, 0x82, b'v', b'1'];
/// let root = KeccakHasher::hash(&leaf);
/// let proof = vec![leaf];
///
/// let verifier = ProofVerifier::<EthereumLayout>::new(&root, &proof);
/// assert_eq!(verifier.verify_key(&[0x0a, 0x0b]), VerificationResult::Found(b"v1".to_vec()));
/// assert_eq!(verifier.verify_key(&[0x0a, 0x0c]), VerificationResult::NotFound);
/// ```
pub struct ProofVerifier<'a, L: TrieLayout> {
	root: TrieHash<L>,
	nodes: ProofNodes<'a, L>,
	depth_limit: DepthLimit,
}

impl<'a, L: TrieLayout> ProofVerifier<'a, L> {
	/// Index `proof` for lookups under `root`.
	pub fn new<I: AsRef<[u8]>>(root: &TrieHash<L>, proof: &'a [I]) -> Self {
		ProofVerifier {
			root: *root,
			nodes: ProofNodes::new(root, proof),
			depth_limit: DepthLimit::Layout,
		}
	}

	/// Cap the number of nodes a single lookup may visit. `None` removes the
	/// cap, including the one the layout derives from the key length.
	pub fn with_max_depth(mut self, max_depth: Option<usize>) -> Self {
		self.depth_limit = match max_depth {
			Some(max) => DepthLimit::Fixed(max),
			None => DepthLimit::Unlimited,
		};
		self
	}

	/// Root the lookups start from.
	pub fn root(&self) -> &TrieHash<L> {
		&self.root
	}

	/// Number of distinct nodes in the proof.
	pub fn node_count(&self) -> usize {
		self.nodes.len()
	}

	fn max_depth(&self, key_len: usize) -> Option<usize> {
		match self.depth_limit {
			DepthLimit::Layout => L::MAX_DEPTH_PER_NIBBLE.map(|factor| {
				factor.saturating_mul(key_len.saturating_mul(NIBBLE_PER_BYTE)).saturating_add(1)
			}),
			DepthLimit::Fixed(max) => Some(max),
			DepthLimit::Unlimited => None,
		}
	}

	/// Verify a key of any length.
	pub fn verify_key(&self, key: &[u8]) -> VerificationResult {
		let result = Lookup {
			nodes: &self.nodes,
			hash: self.root,
			max_depth: self.max_depth(key.len()),
		}
		.look_up(NibbleSlice::new(key));
		trace!(target: "trie", "verify_key {:?}: {:?}", NibbleSlice::new(key), result);
		result
	}

	/// Verify a key of a secure trie, where entries sit at the hash of their key.
	pub fn verify_hashed_key(&self, key: &[u8]) -> VerificationResult {
		self.verify_key(L::Hash::hash(key).as_ref())
	}

	/// Verify every distinct key of `keys`. Duplicates collapse into one entry.
	#[cfg(not(feature = "parallel"))]
	pub fn verify_keys(&self, keys: &[Key]) -> BTreeMap<Key, VerificationResult> {
		KeySet::new(keys).iter().map(|key| (*key, self.verify_key(key))).collect()
	}

	/// Verify every distinct key of `keys`. Duplicates collapse into one entry.
	///
	/// Keys are looked up on the rayon thread pool.
	#[cfg(feature = "parallel")]
	pub fn verify_keys(&self, keys: &[Key]) -> BTreeMap<Key, VerificationResult> {
		use rayon::prelude::*;

		KeySet::new(keys)
			.as_slice()
			.par_iter()
			.map(|key| (*key, self.verify_key(key)))
			.collect()
	}
}

/// Verify `keys` against `root` using the nodes of `proof`.
///
/// Every distinct key gets exactly one result: the proven value, a proven
/// absence, or the reason the proof cannot answer for it.
pub fn verify_proof<L, I>(
	root: &TrieHash<L>,
	proof: &[I],
	keys: &[Key],
) -> BTreeMap<Key, VerificationResult>
where
	L: TrieLayout,
	I: AsRef<[u8]>,
{
	if keys.is_empty() {
		return BTreeMap::new()
	}
	ProofVerifier::<L>::new(root, proof).verify_keys(keys)
}

/// Verify that `key` maps to `expected` under `root`, where `None` states
/// that the key is absent.
pub fn verify_value<L, I>(
	root: &TrieHash<L>,
	proof: &[I],
	key: &[u8],
	expected: Option<&[u8]>,
) -> Result<(), VerifyError>
where
	L: TrieLayout,
	I: AsRef<[u8]>,
{
	match (ProofVerifier::<L>::new(root, proof).verify_key(key), expected) {
		(VerificationResult::Found(value), Some(expected)) if value == expected => Ok(()),
		(VerificationResult::Found(value), Some(_)) => Err(VerifyError::ValueMismatch(value)),
		(VerificationResult::Found(value), None) => Err(VerifyError::ExistingValue(value)),
		(VerificationResult::NotFound, None) => Ok(()),
		(VerificationResult::NotFound, Some(_)) => Err(VerifyError::NonExistingValue(key.to_vec())),
		(VerificationResult::Rejected(reason), _) => Err(VerifyError::InvalidProof(reason)),
	}
}
