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

//! Nibble-orientated view onto byte-slice, allowing nibble-precision offsets.

use crate::rstd::{cmp::min, fmt, vec::Vec};

/// Utility methods to work on radix 16 nibble.
pub mod nibble_ops {
	/// Single nibble length in bit.
	pub const BIT_PER_NIBBLE: usize = 4;
	/// Number of nibble per byte.
	pub const NIBBLE_PER_BYTE: usize = 2;
	/// Number of child for a branch (trie radix).
	pub const NIBBLE_LENGTH: usize = 16;
	/// Mask for the high nibble of a byte.
	pub const PADDING_BITMASK: u8 = 0x0F;

	/// Get the nibble at position `i` of a packed byte slice.
	#[inline(always)]
	pub fn at_left(ix: u8, b: u8) -> u8 {
		if ix == 1 {
			b & PADDING_BITMASK
		} else {
			b >> BIT_PER_NIBBLE
		}
	}
}

use nibble_ops::NIBBLE_PER_BYTE;

/// Hex-prefix flag bit marking a leaf path.
const LEAF_FLAG: u8 = 0x02;
/// Hex-prefix flag bit marking an odd number of nibbles.
const ODD_FLAG: u8 = 0x01;

/// Error decoding a hex-prefix encoded path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HexPrefixError {
	/// No flag byte.
	Empty,
	/// Flag nibble outside `0..=3`.
	InvalidFlag(u8),
}

#[cfg(feature = "std")]
impl fmt::Display for HexPrefixError {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		match self {
			HexPrefixError::Empty => write!(f, "Empty hex-prefix path"),
			HexPrefixError::InvalidFlag(flag) => write!(f, "Invalid hex-prefix flag: {:#x}", flag),
		}
	}
}

#[cfg(feature = "std")]
impl std::error::Error for HexPrefixError {}

/// Nibble-orientated view onto byte-slice, allowing nibble-precision offsets.
///
/// This is an immutable struct. No operations actually change it.
///
/// # Example
/// ```
/// use trie_verify::NibbleSlice;
///
/// let d1 = &[0x01u8, 0x23, 0x45];
/// let d2 = &[0x34u8, 0x50, 0x12];
/// let n1 = NibbleSlice::new(d1);			// 0,1,2,3,4,5
/// let n2 = NibbleSlice::new_offset(d2, 1);	// 4,5,0,1,2
/// assert!(n2.starts_with(&n1.mid(4)));
/// assert_eq!(n1.mid(4).common_prefix(&n2), 2);
/// ```
#[derive(Copy, Clone)]
pub struct NibbleSlice<'a> {
	data: &'a [u8],
	offset: usize,
}

/// Iterator type for a nibble slice.
pub struct NibbleSliceIterator<'a> {
	p: &'a NibbleSlice<'a>,
	i: usize,
}

impl<'a> Iterator for NibbleSliceIterator<'a> {
	type Item = u8;
	fn next(&mut self) -> Option<u8> {
		self.i += 1;
		match self.i <= self.p.len() {
			true => Some(self.p.at(self.i - 1)),
			false => None,
		}
	}
}

impl<'a> NibbleSlice<'a> {
	/// Create a new nibble slice with the given byte-slice.
	pub fn new(data: &'a [u8]) -> Self {
		NibbleSlice::new_offset(data, 0)
	}

	/// Create a new nibble slice with the given byte-slice with a nibble offset.
	///
	/// An offset past the end of `data` yields an empty slice.
	pub fn new_offset(data: &'a [u8], offset: usize) -> Self {
		NibbleSlice { data, offset: min(offset, data.len() * NIBBLE_PER_BYTE) }
	}

	/// Decode a hex-prefix encoded path, returning the nibbles and whether the
	/// flag marks a leaf.
	///
	/// The padding nibble of an even-length path is skipped, not checked.
	pub fn from_hex_prefix(data: &'a [u8]) -> Result<(Self, bool), HexPrefixError> {
		let first = *data.first().ok_or(HexPrefixError::Empty)?;
		let flag = first >> nibble_ops::BIT_PER_NIBBLE;
		if flag > (LEAF_FLAG | ODD_FLAG) {
			return Err(HexPrefixError::InvalidFlag(flag))
		}
		let is_leaf = flag & LEAF_FLAG == LEAF_FLAG;
		let is_odd = flag & ODD_FLAG == ODD_FLAG;
		Ok((NibbleSlice::new_offset(data, if is_odd { 1 } else { 2 }), is_leaf))
	}

	/// Get an iterator for the series of nibbles.
	pub fn iter<'b>(&'b self) -> NibbleSliceIterator<'b> {
		NibbleSliceIterator { p: self, i: 0 }
	}

	/// Is this an empty slice?
	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// Get the length (in nibbles, naturally) of this slice.
	#[inline]
	pub fn len(&self) -> usize {
		self.data.len() * NIBBLE_PER_BYTE - self.offset
	}

	/// Get the nibble at position `i`.
	#[inline(always)]
	pub fn at(&self, i: usize) -> u8 {
		let ix = (self.offset + i) / NIBBLE_PER_BYTE;
		let pad = (self.offset + i) % NIBBLE_PER_BYTE;
		nibble_ops::at_left(pad as u8, self.data[ix])
	}

	/// Return object which represents a view on to this slice (further) offset by `i` nibbles.
	pub fn mid(&self, i: usize) -> NibbleSlice<'a> {
		NibbleSlice::new_offset(self.data, self.offset + i)
	}

	/// Do we start with the same nibbles as the whole of `them`?
	pub fn starts_with(&self, them: &NibbleSlice<'_>) -> bool {
		self.common_prefix(them) == them.len()
	}

	/// How many of the same nibbles at the beginning do we match with `them`?
	pub fn common_prefix(&self, them: &NibbleSlice<'_>) -> usize {
		let s = min(self.len(), them.len());
		let mut i = 0usize;
		while i < s {
			if self.at(i) != them.at(i) {
				break
			}
			i += 1;
		}
		i
	}

	/// Owned copy of the nibbles, one per byte.
	pub fn to_vec(&self) -> Vec<u8> {
		self.iter().collect()
	}
}

impl<'a, 'b> PartialEq<NibbleSlice<'b>> for NibbleSlice<'a> {
	fn eq(&self, them: &NibbleSlice<'b>) -> bool {
		self.len() == them.len() && self.starts_with(them)
	}
}

impl<'a> Eq for NibbleSlice<'a> {}

impl<'a> fmt::Debug for NibbleSlice<'a> {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		for i in 0..self.len() {
			match i {
				0 => write!(f, "{:01x}", self.at(i))?,
				_ => write!(f, "'{:01x}", self.at(i))?,
			}
		}
		Ok(())
	}
}
