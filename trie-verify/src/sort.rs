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

//! In-place key sorting and the sorted key set used to drive batch verification.

use crate::rstd::{mem, slice, vec::Vec};
use crate::Key;

/// Sort keys ascending, comparing bytes as unsigned integers.
pub fn sort_keys(keys: &mut [Key]) {
	quick_sort(keys)
}

/// In-place unstable quicksort with three-way partitioning.
///
/// Runs of equal items are gathered around the pivot and never revisited, so
/// arrays of repeated keys take linear time per level. Recursion only goes into
/// the smaller partition, which bounds the stack to `O(log n)` frames.
pub fn quick_sort<T: Ord>(mut items: &mut [T]) {
	loop {
		match items.len() {
			0 | 1 => return,
			2 => {
				if items[0] > items[1] {
					items.swap(0, 1);
				}
				return
			},
			len => {
				median_of_three(items, 0, len / 2, len - 1);
				let (lt, gt) = partition(items);
				let (low, rest) = mem::take(&mut items).split_at_mut(lt);
				let high = &mut rest[gt - lt..];
				if low.len() < high.len() {
					quick_sort(low);
					items = high;
				} else {
					quick_sort(high);
					items = low;
				}
			},
		}
	}
}

/// Move the median of `items[a]`, `items[b]`, `items[c]` to index 0.
fn median_of_three<T: Ord>(items: &mut [T], a: usize, b: usize, c: usize) {
	let mut idx = [a, b, c];
	if items[idx[0]] > items[idx[1]] {
		idx.swap(0, 1);
	}
	if items[idx[1]] > items[idx[2]] {
		idx.swap(1, 2);
	}
	if items[idx[0]] > items[idx[1]] {
		idx.swap(0, 1);
	}
	items.swap(0, idx[1]);
}

/// Dijkstra partition around the pivot at index 0.
///
/// Returns `(lt, gt)` such that `items[..lt] < pivot`, `items[lt..gt] == pivot`
/// and `items[gt..] > pivot`. All indices stay within `0..=len`.
fn partition<T: Ord>(items: &mut [T]) -> (usize, usize) {
	let mut lt = 0;
	let mut i = 1;
	let mut gt = items.len();
	// the pivot always sits at `items[lt]`
	while i < gt {
		if items[i] < items[lt] {
			items.swap(i, lt);
			lt += 1;
			i += 1;
		} else if items[i] > items[lt] {
			gt -= 1;
			items.swap(i, gt);
		} else {
			i += 1;
		}
	}
	(lt, gt)
}

/// A sorted set of distinct keys.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeySet {
	keys: Vec<Key>,
}

impl KeySet {
	/// Sort and deduplicate a copy of `keys`.
	pub fn new(keys: &[Key]) -> Self {
		let mut keys = keys.to_vec();
		sort_keys(&mut keys);
		keys.dedup();
		KeySet { keys }
	}

	/// Number of distinct keys.
	pub fn len(&self) -> usize {
		self.keys.len()
	}

	pub fn is_empty(&self) -> bool {
		self.keys.is_empty()
	}

	/// Whether `key` is in the set.
	pub fn contains(&self, key: &Key) -> bool {
		self.position(key).is_some()
	}

	/// Rank of `key` in ascending order.
	pub fn position(&self, key: &Key) -> Option<usize> {
		self.keys.binary_search(key).ok()
	}

	/// Iterate in ascending order.
	pub fn iter(&self) -> slice::Iter<'_, Key> {
		self.keys.iter()
	}

	/// Keys as a sorted slice.
	pub fn as_slice(&self) -> &[Key] {
		&self.keys
	}
}

impl<'a> IntoIterator for &'a KeySet {
	type Item = &'a Key;
	type IntoIter = slice::Iter<'a, Key>;

	fn into_iter(self) -> Self::IntoIter {
		self.keys.iter()
	}
}
