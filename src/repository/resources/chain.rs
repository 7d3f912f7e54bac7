//! Sorted sequences of non-overlapping resource blocks.
//!
//! Both IP address and AS number resources are sets of consecutive runs
//! of numbers. This module provides the normalized representation shared
//! by both: blocks are ordered by their smallest element and neither
//! overlap nor touch each other. Keeping the sequence normalized makes
//! containment a single linear walk over both sides.

use std::{fmt, ops, slice};
use std::iter::FromIterator;


//------------ Block ---------------------------------------------------------

/// A type representing a consecutive run of items.
pub trait Block: Clone + fmt::Debug {
    /// The type of a single item.
    type Item: Copy + fmt::Debug + Ord;

    /// Creates a new block from the smallest and largest item.
    ///
    /// The caller guarantees that `min` is not larger than `max`.
    fn new(min: Self::Item, max: Self::Item) -> Self;

    /// Returns the smallest item of the block.
    fn min(&self) -> Self::Item;

    /// Returns the largest item of the block.
    fn max(&self) -> Self::Item;

    /// Returns the item following `item` or `None` if there is none.
    fn next(item: Self::Item) -> Option<Self::Item>;

    /// Returns the item preceding `item` or `None` if there is none.
    fn prev(item: Self::Item) -> Option<Self::Item>;

    /// Returns whether all items of `other` are part of this block.
    fn contains(&self, other: &Self) -> bool {
        self.min() <= other.min() && other.max() <= self.max()
    }
}


//------------ Chain ---------------------------------------------------------

/// A normalized sequence of blocks.
#[derive(Clone, Eq, Hash, PartialEq)]
pub struct Chain<T>(Vec<T>);

impl<T: Block> Chain<T> {
    /// Returns an empty chain.
    pub fn empty() -> Self {
        Chain(Vec::new())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> slice::Iter<T> {
        self.0.iter()
    }

    /// Returns whether every item in `other` is also in `self`.
    pub fn contains(&self, other: &Self) -> bool {
        let mut mine = self.0.iter().peekable();
        'outer: for block in other.iter() {
            while let Some(my) = mine.peek() {
                if my.max() < block.min() {
                    mine.next();
                    continue
                }
                if my.contains(block) {
                    continue 'outer
                }
                return false
            }
            return false
        }
        true
    }

    /// Returns a chain with the items of both `self` and `other`.
    pub fn union(&self, other: &Self) -> Self {
        self.iter().chain(other.iter()).cloned().collect()
    }

    /// Returns a chain with the items of `self` that are not in `other`.
    pub fn difference(&self, other: &Self) -> Self {
        let mut res = Vec::new();
        for block in self.iter() {
            let mut min = Some(block.min());
            for cut in other.iter() {
                let start = match min {
                    Some(start) => start,
                    None => break
                };
                if cut.max() < start {
                    continue
                }
                if cut.min() > block.max() {
                    break
                }
                if cut.min() > start {
                    if let Some(end) = T::prev(cut.min()) {
                        res.push(T::new(start, end));
                    }
                }
                min = if cut.max() < block.max() {
                    T::next(cut.max())
                }
                else {
                    None
                };
            }
            if let Some(start) = min {
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


//--- Deref

impl<T> ops::Deref for Chain<T> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        self.0.as_ref()
    }
}


//--- FromIterator

impl<T: Block> FromIterator<T> for Chain<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut blocks: Vec<T> = iter.into_iter().collect();
        blocks.sort_by_key(|block| block.min());

        let mut res: Vec<T> = Vec::with_capacity(blocks.len());
        for block in blocks {
            if let Some(last) = res.last_mut() {
                // Blocks are sorted, so block.min() >= last.min().
                let joins = match T::next(last.max()) {
                    Some(next) => block.min() <= next,
                    None => true,
                };
                if joins {
                    if block.max() > last.max() {
                        *last = T::new(last.min(), block.max());
                    }
                    continue
                }
            }
            res.push(block)
        }
        Chain(res)
    }
}


//--- Debug

impl<T: fmt::Debug> fmt::Debug for Chain<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_list().entries(self.0.iter()).finish()
    }
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;

    #[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
    struct Run(u8, u8);

    impl Block for Run {
        type Item = u8;

        fn new(min: u8, max: u8) -> Self { Run(min, max) }
        fn min(&self) -> u8 { self.0 }
        fn max(&self) -> u8 { self.1 }
        fn next(item: u8) -> Option<u8> { item.checked_add(1) }
        fn prev(item: u8) -> Option<u8> { item.checked_sub(1) }
    }

    fn chain(runs: &[(u8, u8)]) -> Chain<Run> {
        runs.iter().map(|&(min, max)| Run(min, max)).collect()
    }

    #[test]
    fn normalize() {
        assert_eq!(
            &chain(&[(10, 20), (1, 3), (4, 5), (15, 30), (40, 41)])[..],
            &[Run(1, 5), Run(10, 30), Run(40, 41)]
        );
        assert_eq!(
            &chain(&[(250, 255), (100, 200), (201, 255)])[..],
            &[Run(100, 255)]
        );
        assert!(chain(&[]).is_empty());
    }

    #[test]
    fn contains() {
        let outer = chain(&[(10, 20), (30, 40)]);
        assert!(outer.contains(&chain(&[])));
        assert!(outer.contains(&chain(&[(10, 12), (14, 20), (35, 35)])));
        assert!(outer.contains(&outer));
        assert!(!outer.contains(&chain(&[(9, 12)])));
        assert!(!outer.contains(&chain(&[(15, 31)])));
        assert!(!outer.contains(&chain(&[(10, 20), (41, 41)])));
        assert!(!chain(&[]).contains(&chain(&[(1, 1)])));
    }

    #[test]
    fn union() {
        let left = chain(&[(10, 20)]);
        let right = chain(&[(21, 25), (30, 31)]);
        let both = left.union(&right);
        assert_eq!(&both[..], &[Run(10, 25), Run(30, 31)]);
        assert!(both.contains(&left));
        assert!(both.contains(&right));
    }

    #[test]
    fn difference() {
        let outer = chain(&[(10, 20), (30, 40)]);
        assert_eq!(
            &outer.difference(&chain(&[(12, 14), (18, 32)]))[..],
            &[Run(10, 11), Run(15, 17), Run(33, 40)]
        );
        assert!(outer.difference(&outer).is_empty());
        assert!(outer.difference(&chain(&[(0, 255)])).is_empty());
        assert_eq!(outer.difference(&chain(&[])), outer);
        assert_eq!(
            &chain(&[(0, 255)]).difference(&chain(&[(0, 0), (255, 255)]))[..],
            &[Run(1, 254)]
        );
    }
}
