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

use crate::nibble::{nibble_ops, NibbleSlice};
use crate::rstd::fmt;
use hash_db::Hasher;

/// A reference to a trie node which may be stored within another trie node.
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum NodeHandle<'a> {
	/// Hash of a node supplied separately in the proof.
	Hash(&'a [u8]),
	/// Encoded node embedded in its parent.
	Inline(&'a [u8]),
}

/// Read a hash from a slice into a Hasher output. Returns None if the slice is the wrong length.
pub fn decode_hash<H: Hasher>(data: &[u8]) -> Option<H::Out> {
	if data.len() != H::LENGTH {
		return None
	}
	let mut hash = H::Out::default();
	hash.as_mut().copy_from_slice(data);
	Some(hash)
}

/// Type of node in the trie and essential information thereof.
#[derive(Eq, PartialEq, Clone)]
pub enum Node<'a> {
	/// Null trie node; could be an empty root or an empty branch entry.
	Empty,
	/// Leaf node; has remaining key path and value.
	Leaf(NibbleSlice<'a>, &'a [u8]),
	/// Extension node; has shared key path and a child reference.
	Extension(NibbleSlice<'a>, NodeHandle<'a>),
	/// Branch node; has an array of 16 child nodes (each possibly null) and an optional value.
	Branch([Option<NodeHandle<'a>>; nibble_ops::NIBBLE_LENGTH], Option<&'a [u8]>),
}

impl<'a> Node<'a> {
	/// Iterate over the child references of this node.
	pub fn children(&self) -> impl Iterator<Item = NodeHandle<'a>> + '_ {
		let (single, branch) = match self {
			Node::Extension(_, child) => (Some(*child), None),
			Node::Branch(children, _) => (None, Some(children.iter().flatten().copied())),
			Node::Empty | Node::Leaf(..) => (None, None),
		};
		single.into_iter().chain(branch.into_iter().flatten())
	}
}

pub(crate) struct ToHex<'a>(pub &'a [u8]);

impl<'a> fmt::Debug for ToHex<'a> {
	#[cfg(feature = "std")]
	fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
		let hex = rustc_hex::ToHexIter::new(self.0.iter());
		for b in hex {
			write!(fmt, "{}", b)?;
		}
		Ok(())
	}

	#[cfg(not(feature = "std"))]
	fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
		for b in self.0 {
			write!(fmt, "{:02x}", b)?;
		}
		Ok(())
	}
}

impl<'a> fmt::Debug for NodeHandle<'a> {
	fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
		match self {
			NodeHandle::Hash(hash) => write!(fmt, "Hash({:?})", ToHex(hash)),
			NodeHandle::Inline(data) => write!(fmt, "Inline({:?})", ToHex(data)),
		}
	}
}

impl<'a> fmt::Debug for Node<'a> {
	fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
		match self {
			Node::Empty => write!(fmt, "Empty"),
			Node::Leaf(path, value) => write!(fmt, "Leaf({:?}, {:?})", path, ToHex(value)),
			Node::Extension(path, child) => write!(fmt, "Extension({:?}, {:?})", path, child),
			Node::Branch(children, value) =>
				write!(fmt, "Branch({:?}, {:?})", children, value.map(ToHex)),
		}
	}
}
