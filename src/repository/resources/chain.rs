//! Types for dealing with ranges of resources.
//!
//! These types are used for dealing with both IP resources and AS resources.
//! A range of such resources, defined by a minimum and a maximum range shall
//! be a `block`. As there are different representations of these blocks, we
//! define the trait [`Block`] for that.
//!
//! An sequence of ordered, non-overlapping, non-adjacent blocks shall be
//! called a `chain`. It is available as the type [`Chain`]. All set
//! operations on chains produce chains again, so two chains containing the
//! same resources always compare equal.

use std::{iter, slice};
use std::cmp::{min, max};


//------------ Block ---------------------------------------------------------

pub trait Block: Clone + Eq {
    type Item: Copy + Eq + Ord;

    /// Creates a new block from the minimum and maximum.
    fn new(min: Self::Item, max: Self::Item) -> Self;

    /// Returns the smallest item that is part of the block.
    fn min(&self) -> Self::Item;

    /// Returns the largest item that is part of the block.
    fn max(&self) -> Self::Item;

    /// Returns the item immediately following the given item.
    fn next(item: Self::Item) -> Option<Self::Item>;

    /// Returns the item immediately preceding the given item.
    fn previous(item: Self::Item) -> Option<Self::Item>;

    /// Returns whether a block intersects with another block.
    fn intersects(&self, other: &Self) -> bool {
        self.min() <= other.max() && self.max() >= other.min()
    }

    /// Returns whether a block is encompassed by another block.
    ///
    /// For this to happen, the other block needs to be larger or the same.
    fn is_encompassed(&self, other: &Self) -> bool {
        other.min() <= self.min() && other.max() >= self.max()
    }

    /// Returns the sum of two blocks if they overlap or are adjacent.
    fn sum(&self, other: &Self) -> Option<Self> {
        if self.intersects(other) {
            Some(Self::new(
                min(self.min(), other.min()),
                max(self.max(), other.max())
            ))
        }
        else if Self::next(self.max()) == Some(other.min()) {
            Some(Self::new(self.min(), other.max()))
        }
        else if Self::next(other.max()) == Some(self.min()) {
            Some(Self::new(other.min(), self.max()))
        }
        else {
            None
        }
    }
}


//------------ Chain ---------------------------------------------------------

/// A normalized sequence of blocks.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Chain<T: Block>(Vec<T>);

impl<T: Block> Chain<T> {
    /// Creates a chain without any blocks.
    pub fn empty() -> Self {
        Chain(Vec::new())
    }

    pub fn as_slice(&self) -> &[T] {
        self.0.as_slice()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> slice::Iter<T> {
        self.0.iter()
    }

    /// Returns whether all resources of `other` are part of `self`.
    ///
    /// Because blocks in a chain are never adjacent, each block of `other`
    /// has to be encompassed by a single block of `self`.
    pub fn contains(&self, other: &Self) -> bool {
        other.0.iter().all(|block| {
            let idx = self.0.partition_point(|item| {
                item.max() < block.min()
            });
            match self.0.get(idx) {
                Some(item) => block.is_encompassed(item),
                None => false
            }
        })
    }

    /// Returns a chain with the resources in either `self` or `other`.
    pub fn union(&self, other: &Self) -> Self {
        self.0.iter().chain(other.0.iter()).cloned().collect()
    }

    /// Returns a chain with the resources in both `self` and `other`.
    pub fn intersection(&self, other: &Self) -> Self {
        let mut res = Vec::new();
        let (mut left, mut right) = (0, 0);
        while let (Some(l), Some(r)) = (self.0.get(left), other.0.get(right)) {
            let low = max(l.min(), r.min());
            let high = min(l.max(), r.max());
            if low <= high {
                res.push(T::new(low, high));
            }
            if l.max() < r.max() {
                left += 1;
            }
            else {
                right += 1;
            }
        }
        Chain(res)
    }

    /// Returns a chain with the resources of `self` not in `other`.
    pub fn difference(&self, other: &Self) -> Self {
        let mut res = Vec::new();
        for block in &self.0 {
            let mut start = Some(block.min());
            for item in &other.0 {
                let current = match start {
                    Some(current) => current,
                    None => break
                };
                if item.max() < current {
                    continue
                }
                if item.min() > block.max() {
                    break
                }
                if item.min() > current {
                    if let Some(end) = T::previous(item.min()) {
                        res.push(T::new(current, end));
                    }
                }
                start = if item.max() >= block.max() {
                    None
                }
                else {
                    T::next(item.max())
                };
            }
            if let Some(start) = start {
                res.push(T::new(start, block.max()));
            }
        }
        Chain(res)
    }
}


//--- Default

impl<T: Block> Default for Chain<T> {
    fn default() -> Self {
        Self::empty()
    }
}


//--- FromIterator

impl<T: Block> iter::FromIterator<T> for Chain<T> {
    /// Collects blocks in any order into a normalized chain.
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut blocks: Vec<T> = iter.into_iter().collect();
        blocks.sort_by_key(|block| block.min());
        let mut res: Vec<T> = Vec::with_capacity(blocks.len());
        for block in blocks {
            if let Some(last) = res.last_mut() {
                if let Some(sum) = last.sum(&block) {
                    *last = sum;
                    continue
                }
            }
            res.push(block);
        }
        Chain(res)
    }
}


//--- IntoIterator

impl<'a, T: Block> IntoIterator for &'a Chain<T> {
    type Item = &'a T;
    type IntoIter = slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;

    impl Block for (u8, u8) {
        type Item = u8;

        fn new(min: u8, max: u8) -> Self { (min, max) }
        fn min(&self) -> u8 { self.0 }
        fn max(&self) -> u8 { self.1 }
        fn next(item: u8) -> Option<u8> { item.checked_add(1) }
        fn previous(item: u8) -> Option<u8> { item.checked_sub(1) }
    }

    fn chain(blocks: &[(u8, u8)]) -> Chain<(u8, u8)> {
        blocks.iter().cloned().collect()
    }

    #[test]
    fn from_iter_normalizes() {
        assert_eq!(
            chain(&[(10, 12), (1, 3), (4, 5), (11, 20), (30, 30)]).as_slice(),
            &[(1, 5), (10, 20), (30, 30)]
        );
        assert_eq!(chain(&[(0, 255), (3, 4)]).as_slice(), &[(0, 255)]);
        assert!(chain(&[]).is_empty());
    }

    #[test]
    fn contains() {
        let outer = chain(&[(10, 20), (30, 40)]);
        assert!(outer.contains(&chain(&[(10, 12), (35, 40)])));
        assert!(outer.contains(&chain(&[])));
        assert!(!outer.contains(&chain(&[(15, 25)])));
        assert!(!outer.contains(&chain(&[(41, 41)])));
        assert!(!outer.contains(&chain(&[(0, 9)])));
        assert!(!chain(&[]).contains(&chain(&[(1, 1)])));
    }

    #[test]
    fn union() {
        assert_eq!(
            chain(&[(10, 20)]).union(&chain(&[(21, 25), (0, 5)])),
            chain(&[(0, 5), (10, 25)])
        );
    }

    #[test]
    fn intersection() {
        assert_eq!(
            chain(&[(0, 10), (20, 30)]).intersection(
                &chain(&[(5, 25), (28, 40)])
            ),
            chain(&[(5, 10), (20, 25), (28, 30)])
        );
        assert!(
            chain(&[(0, 10)]).intersection(&chain(&[(11, 20)])).is_empty()
        );
    }

    #[test]
    fn difference() {
        assert_eq!(
            chain(&[(0, 100)]).difference(&chain(&[(10, 20), (50, 60)])),
            chain(&[(0, 9), (21, 49), (61, 100)])
        );
        assert_eq!(
            chain(&[(10, 20), (30, 40)]).difference(&chain(&[(15, 35)])),
            chain(&[(10, 14), (36, 40)])
        );
        assert!(
            chain(&[(10, 20)]).difference(&chain(&[(0, 255)])).is_empty()
        );
        assert_eq!(
            chain(&[(0, 255)]).difference(&chain(&[(0, 0), (255, 255)])),
            chain(&[(1, 254)])
        );
        assert_eq!(
            chain(&[(10, 20)]).difference(&chain(&[])),
            chain(&[(10, 20)])
        );
    }
}
