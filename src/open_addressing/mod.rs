//! Fixed-capacity hash set using open addressing with linear probing.
//!
//! The table holds exactly `2^bits` slots and never grows; inserting into a
//! table with no empty or tombstone slot left fails with
//! [`SetError::TableFull`].
//!
//! A removed element leaves a tombstone rather than an empty slot. Lookups
//! probe past tombstones, so elements placed further along the same probe
//! sequence stay reachable; insertions reuse the first tombstone they pass.
//!
//! ```rust
//! use arena_sets::OpenAddressingSet;
//!
//! let mut set = OpenAddressingSet::new(4).unwrap();
//! assert_eq!(set.capacity(), 16);
//! assert!(set.add("apple").unwrap());
//! assert!(!set.add("apple").unwrap());
//! assert!(set.contains(&"apple"));
//! assert!(set.remove(&"apple"));
//! assert!(set.is_empty());
//! ```

use std::collections::hash_map::RandomState;
use std::fmt;
use std::hash::{BuildHasher, Hash};
use std::iter::FusedIterator;

use crate::error::{Result, SetError};
use crate::set::{Set, SetMut};

/// Smallest accepted bit width (capacity 4).
pub const MIN_BITS: u32 = 2;

/// Largest accepted bit width (capacity 2^31).
pub const MAX_BITS: u32 = 31;

#[derive(Clone, Debug, PartialEq, Eq)]
enum Slot<T> {
    /// Never occupied; terminates a probe.
    Empty,
    /// Occupied once; probes continue past it.
    Tombstone,
    Occupied(T),
}

impl<T> Slot<T> {
    #[inline]
    fn value(&self) -> Option<&T> {
        match self {
            Slot::Occupied(value) => Some(value),
            _ => None,
        }
    }

    #[inline]
    fn into_value(self) -> Option<T> {
        match self {
            Slot::Occupied(value) => Some(value),
            _ => None,
        }
    }
}

fn occupied_from<T>(slots: &[Slot<T>], start: usize) -> Option<usize> {
    (start..slots.len()).find(|&i| matches!(slots[i], Slot::Occupied(_)))
}

/// Hash set over a fixed array of `2^bits` slots.
#[derive(Clone)]
pub struct OpenAddressingSet<T, S = RandomState> {
    slots: Box<[Slot<T>]>,
    bits: u32,
    len: usize,
    hasher: S,
}

impl<T> OpenAddressingSet<T, RandomState> {
    /// Creates a table of `2^bits` slots. `bits` must be within
    /// [`MIN_BITS`]`..=`[`MAX_BITS`], else [`SetError::InvalidBitWidth`].
    pub fn new(bits: u32) -> Result<Self> {
        Self::with_hasher(bits, RandomState::new())
    }
}

impl<T, S> OpenAddressingSet<T, S> {
    pub fn with_hasher(bits: u32, hasher: S) -> Result<Self> {
        if !(MIN_BITS..=MAX_BITS).contains(&bits) {
            return Err(SetError::InvalidBitWidth { bits });
        }
        let capacity = 1usize << bits;
        log::debug!("allocating open-addressing table with {capacity} slots");
        Ok(Self {
            slots: (0..capacity).map(|_| Slot::Empty).collect(),
            bits,
            len: 0,
            hasher,
        })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of slots, `2^bits`.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    pub fn bits(&self) -> u32 {
        self.bits
    }

    pub fn hasher(&self) -> &S {
        &self.hasher
    }

    /// Empties every slot, tombstones included.
    pub fn clear(&mut self) {
        log::debug!("clearing open-addressing table of {} values", self.len);
        self.slots.iter_mut().for_each(|slot| *slot = Slot::Empty);
        self.len = 0;
    }

    /// Iterates values in slot order.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            slots: self.slots.iter(),
            remaining: self.len,
        }
    }

    /// Slot-order cursor whose `remove` tombstones the last yielded slot.
    pub fn cursor(&mut self) -> Cursor<'_, T> {
        let next = occupied_from(&self.slots, 0);
        Cursor {
            slots: &mut self.slots,
            len: &mut self.len,
            next,
            last: None,
        }
    }
}

impl<T: Hash + Eq, S: BuildHasher> OpenAddressingSet<T, S> {
    #[inline]
    fn starting_index(&self, value: &T) -> usize {
        (self.hasher.hash_one(value) as usize) & (self.capacity() - 1)
    }

    /// Slot indices in probe order: the starting index, then +1 with
    /// wraparound, visiting every slot once.
    fn probe(&self, value: &T) -> impl Iterator<Item = usize> {
        let start = self.starting_index(value);
        let mask = self.capacity() - 1;
        (0..self.capacity()).map(move |step| (start + step) & mask)
    }

    fn find_slot(&self, value: &T) -> Option<usize> {
        for index in self.probe(value) {
            match &self.slots[index] {
                Slot::Empty => return None,
                Slot::Tombstone => {}
                Slot::Occupied(stored) if stored == value => return Some(index),
                Slot::Occupied(_) => {}
            }
        }
        None
    }

    pub fn contains(&self, value: &T) -> bool {
        self.find_slot(value).is_some()
    }

    /// Inserts `value`, returning `Ok(false)` if it is already present.
    ///
    /// The probe runs until an empty slot (or a full wraparound) so that a
    /// copy stored past a tombstone is still detected; the value then goes
    /// into the first tombstone seen, or else that empty slot.
    pub fn add(&mut self, value: T) -> Result<bool> {
        let mut vacancy = None;
        for index in self.probe(&value) {
            match &self.slots[index] {
                Slot::Empty => {
                    vacancy.get_or_insert(index);
                    break;
                }
                Slot::Tombstone => {
                    vacancy.get_or_insert(index);
                }
                Slot::Occupied(stored) if *stored == value => return Ok(false),
                Slot::Occupied(_) => {}
            }
        }

        let Some(index) = vacancy else {
            log::debug!(
                "open-addressing table full: {} of {} slots occupied",
                self.len,
                self.capacity()
            );
            return Err(SetError::TableFull {
                capacity: self.capacity(),
            });
        };
        if matches!(self.slots[index], Slot::Tombstone) {
            log::trace!("reusing tombstone at slot {index}");
        }
        self.slots[index] = Slot::Occupied(value);
        self.len += 1;
        Ok(true)
    }

    /// Removes `value`, leaving a tombstone. Returns false if absent.
    pub fn remove(&mut self, value: &T) -> bool {
        self.take(value).is_some()
    }

    /// Removes `value` and returns the stored instance.
    pub fn take(&mut self, value: &T) -> Option<T> {
        let index = self.find_slot(value)?;
        self.len -= 1;
        std::mem::replace(&mut self.slots[index], Slot::Tombstone).into_value()
    }
}

impl<T: fmt::Debug, S> fmt::Debug for OpenAddressingSet<T, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<'a, T, S> IntoIterator for &'a OpenAddressingSet<T, S> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Iter<'a, T> {
        self.iter()
    }
}

impl<T: Hash + Eq, S: BuildHasher> Set<T> for OpenAddressingSet<T, S> {
    fn len(&self) -> usize {
        self.len
    }

    fn contains(&self, value: &T) -> bool {
        OpenAddressingSet::contains(self, value)
    }
}

impl<T: Hash + Eq, S: BuildHasher> SetMut<T> for OpenAddressingSet<T, S> {
    fn add(&mut self, value: T) -> Result<bool> {
        OpenAddressingSet::add(self, value)
    }

    fn remove(&mut self, value: &T) -> Result<bool> {
        Ok(OpenAddressingSet::remove(self, value))
    }
}

pub struct Iter<'a, T> {
    slots: std::slice::Iter<'a, Slot<T>>,
    remaining: usize,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        let value = self.slots.find_map(Slot::value)?;
        self.remaining -= 1;
        Some(value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

impl<T> FusedIterator for Iter<'_, T> {}

pub struct Cursor<'a, T> {
    slots: &'a mut [Slot<T>],
    len: &'a mut usize,
    next: Option<usize>,
    last: Option<usize>,
}

impl<T> Cursor<'_, T> {
    #[inline]
    pub fn has_next(&self) -> bool {
        self.next.is_some()
    }

    pub fn advance(&mut self) -> Result<&T> {
        let index = self.next.ok_or(SetError::NoSuchElement)?;
        self.next = occupied_from(self.slots, index + 1);
        self.last = Some(index);
        self.slots[index].value().ok_or(SetError::NoSuchElement)
    }

    /// Replaces the slot last returned by `advance` with a tombstone.
    pub fn remove(&mut self) -> Result<T> {
        let index = self.last.take().ok_or(SetError::IllegalState)?;
        let value = std::mem::replace(&mut self.slots[index], Slot::Tombstone)
            .into_value()
            .ok_or(SetError::IllegalState)?;
        *self.len -= 1;
        Ok(value)
    }
}
