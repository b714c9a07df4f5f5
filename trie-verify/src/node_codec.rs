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

//! Generic trait for trie node decoding, and its implementation for the
//! RLP-encoded Ethereum node format.

use crate::nibble::{nibble_ops, HexPrefixError, NibbleSlice};
use crate::node::{Node, NodeHandle};
use crate::rstd::{fmt, hash, marker::PhantomData, Error};
use crate::Reason;
use hash_db::{Hasher, MaybeDebug};
use rlp::{DecoderError, PayloadInfo, Rlp, NULL_RLP};
use smallvec::SmallVec;

/// Number of items in an encoded branch node: 16 children and a value.
const BRANCH_ITEMS: usize = nibble_ops::NIBBLE_LENGTH + 1;

/// Number of items in an encoded leaf or extension node.
const PAIR_ITEMS: usize = 2;

/// Trait for trie node decoding.
pub trait NodeCodec: Sized {
	/// Codec error type.
	type Error: Error + fmt::Debug + Into<Reason>;

	/// Output type of encoded node hasher.
	type HashOut: AsRef<[u8]>
		+ AsMut<[u8]>
		+ Default
		+ MaybeDebug
		+ PartialEq
		+ Eq
		+ Ord
		+ hash::Hash
		+ Send
		+ Sync
		+ Clone
		+ Copy;

	/// Get the hashed null node.
	fn hashed_null_node() -> Self::HashOut;

	/// Decode bytes to a `Node`. Returns `Self::Error` on failure.
	fn decode(data: &[u8]) -> Result<Node, Self::Error>;

	/// Check if the provided bytes correspond to the codecs "empty" node.
	fn is_empty_node(data: &[u8]) -> bool;

	/// Returns an encoded empty node.
	fn empty_node() -> &'static [u8];
}

/// Error decoding an RLP trie node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
	/// The RLP structure itself is invalid.
	Rlp(DecoderError),
	/// The node path is not valid hex-prefix.
	HexPrefix(HexPrefixError),
	/// Bytes left over after the node item.
	TrailingBytes(usize),
	/// The items of a list do not exactly fill its payload.
	ListLengthMismatch,
	/// A non-empty RLP string where a node was expected.
	UnexpectedData,
	/// A list with an item count matching no node kind.
	ItemCount(usize),
	/// The path item of a leaf or extension is a list.
	InvalidPath,
	/// A node value is a list.
	InvalidValue,
	/// An extension without a child.
	MissingChild,
	/// A child reference string that is neither empty nor a hash.
	InvalidChildReference(usize),
	/// An embedded child node not shorter than a hash.
	InlineTooLarge(usize),
}

impl From<DecoderError> for DecodeError {
	fn from(e: DecoderError) -> Self {
		DecodeError::Rlp(e)
	}
}

impl From<HexPrefixError> for DecodeError {
	fn from(e: HexPrefixError) -> Self {
		DecodeError::HexPrefix(e)
	}
}

impl From<DecodeError> for Reason {
	fn from(e: DecodeError) -> Self {
		match e {
			DecodeError::Rlp(_) |
			DecodeError::HexPrefix(_) |
			DecodeError::TrailingBytes(_) |
			DecodeError::ListLengthMismatch => Reason::MalformedEncoding,
			DecodeError::UnexpectedData |
			DecodeError::ItemCount(_) |
			DecodeError::InvalidPath |
			DecodeError::InvalidValue |
			DecodeError::MissingChild |
			DecodeError::InvalidChildReference(_) |
			DecodeError::InlineTooLarge(_) => Reason::MalformedNode,
		}
	}
}

#[cfg(feature = "std")]
impl fmt::Display for DecodeError {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		match self {
			DecodeError::Rlp(e) => write!(f, "Invalid RLP: {}", e),
			DecodeError::HexPrefix(e) => write!(f, "{}", e),
			DecodeError::TrailingBytes(n) => write!(f, "{} trailing bytes after node", n),
			DecodeError::ListLengthMismatch => write!(f, "List items do not fill the list payload"),
			DecodeError::UnexpectedData => write!(f, "Expected a node list, found a string"),
			DecodeError::ItemCount(n) => write!(f, "Unexpected node item count: {}", n),
			DecodeError::InvalidPath => write!(f, "Node path is not a string"),
			DecodeError::InvalidValue => write!(f, "Node value is not a string"),
			DecodeError::MissingChild => write!(f, "Extension node without a child"),
			DecodeError::InvalidChildReference(len) =>
				write!(f, "Child reference of {} bytes is not a hash", len),
			DecodeError::InlineTooLarge(len) =>
				write!(f, "Embedded child node of {} bytes is too large", len),
		}
	}
}

#[cfg(feature = "std")]
impl std::error::Error for DecodeError {
	fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
		match self {
			DecodeError::Rlp(e) => Some(e),
			DecodeError::HexPrefix(e) => Some(e),
			_ => None,
		}
	}
}

/// One RLP item: its full encoding and its payload.
#[derive(Clone, Copy)]
struct Item<'a> {
	raw: &'a [u8],
	payload: &'a [u8],
	is_list: bool,
}

impl<'a> Item<'a> {
	fn data(&self) -> Option<&'a [u8]> {
		match self.is_list {
			true => None,
			false => Some(self.payload),
		}
	}
}

/// Split the first RLP item off `data`, returning it and the remaining bytes.
fn next_item(data: &[u8]) -> Result<(Item, &[u8]), DecodeError> {
	let info = PayloadInfo::from(data)?;
	// a long form length may claim anything up to `usize::MAX`
	let total = match info.header_len.checked_add(info.value_len) {
		Some(total) if total <= data.len() => total,
		_ => return Err(DecoderError::RlpIsTooShort.into()),
	};
	let (raw, rest) = data.split_at(total);
	let payload = &raw[info.header_len..];
	let is_list = Rlp::new(raw).is_list();
	// a single byte below 0x80 is its own encoding
	if !is_list && info.header_len == 1 && payload.len() == 1 && payload[0] < 0x80 {
		return Err(DecoderError::RlpInvalidIndirection.into())
	}
	Ok((Item { raw, payload, is_list }, rest))
}

/// Split a list payload into its items. The items must consume it exactly.
fn list_items(mut payload: &[u8]) -> Result<SmallVec<[Item; BRANCH_ITEMS]>, DecodeError> {
	let mut items = SmallVec::new();
	while !payload.is_empty() {
		let (item, rest) = next_item(payload).map_err(|e| match e {
			DecodeError::Rlp(DecoderError::RlpIsTooShort) => DecodeError::ListLengthMismatch,
			e => e,
		})?;
		items.push(item);
		payload = rest;
	}
	Ok(items)
}

/// Decode a child reference: empty, a hash, or an embedded node.
fn decode_child<H: Hasher>(item: Item) -> Result<Option<NodeHandle>, DecodeError> {
	if item.is_list {
		return match item.raw.len() < H::LENGTH {
			true => Ok(Some(NodeHandle::Inline(item.raw))),
			false => Err(DecodeError::InlineTooLarge(item.raw.len())),
		}
	}
	match item.payload.len() {
		0 => Ok(None),
		len if len == H::LENGTH => Ok(Some(NodeHandle::Hash(item.payload))),
		len => Err(DecodeError::InvalidChildReference(len)),
	}
}

/// Node codec for the Ethereum RLP node format, generic over the node hasher.
#[derive(Default, Clone)]
pub struct RlpNodeCodec<H>(PhantomData<H>);

impl<H: Hasher> NodeCodec for RlpNodeCodec<H> {
	type Error = DecodeError;
	type HashOut = H::Out;

	fn hashed_null_node() -> H::Out {
		H::hash(&NULL_RLP)
	}

	fn decode(data: &[u8]) -> Result<Node, Self::Error> {
		let (item, rest) = next_item(data)?;
		if !rest.is_empty() {
			return Err(DecodeError::TrailingBytes(rest.len()))
		}
		if !item.is_list {
			return match item.payload.is_empty() {
				true => Ok(Node::Empty),
				false => Err(DecodeError::UnexpectedData),
			}
		}
		let items = list_items(item.payload)?;
		match items.len() {
			PAIR_ITEMS => {
				let path = items[0].data().ok_or(DecodeError::InvalidPath)?;
				let (partial, is_leaf) = NibbleSlice::from_hex_prefix(path)?;
				if is_leaf {
					let value = items[1].data().ok_or(DecodeError::InvalidValue)?;
					Ok(Node::Leaf(partial, value))
				} else {
					let child = decode_child::<H>(items[1])?.ok_or(DecodeError::MissingChild)?;
					Ok(Node::Extension(partial, child))
				}
			},
			BRANCH_ITEMS => {
				let mut children = [None; nibble_ops::NIBBLE_LENGTH];
				for (child, item) in children.iter_mut().zip(items.iter()) {
					*child = decode_child::<H>(*item)?;
				}
				let value = items[nibble_ops::NIBBLE_LENGTH].data().ok_or(DecodeError::InvalidValue)?;
				Ok(Node::Branch(children, if value.is_empty() { None } else { Some(value) }))
			},
			n => Err(DecodeError::ItemCount(n)),
		}
	}

	fn is_empty_node(data: &[u8]) -> bool {
		data == &NULL_RLP[..]
	}

	fn empty_node() -> &'static [u8] {
		&NULL_RLP
	}
}
