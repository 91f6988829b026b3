//! Associative container with O(1) uniform random sampling.
//!
//! Sampling a random key from an ordinary hash map is O(n): the map has no
//! way to address its i-th element. [`RandomSamplingMap`] keeps, alongside the
//! key → value mapping, a bijection between the present keys and the dense id
//! range `[0, len)`. Drawing a uniform integer in that range and resolving it
//! through the bijection yields a uniform key in O(1).
//!
//! # Deletion
//!
//! Deleting a key frees its id. The key holding the *last* id is moved into
//! the freed slot and the range shrinks by one, so the id space stays dense
//! without compacting anything:
//!
//! ```text
//! ids: [a, b, c, d]    remove b    ids: [a, d, c]
//!       0  1  2  3                       0  1  2
//! ```
//!
//! # Example
//!
//! ```rust
//! use gaussian_lsh::sampling::RandomSamplingMap;
//! use rand::{rngs::StdRng, SeedableRng};
//!
//! let mut map = RandomSamplingMap::new();
//! map.insert("a", 1);
//! map.insert("b", 2);
//! map.insert("c", 3);
//! map.remove(&"a");
//!
//! let mut rng = StdRng::seed_from_u64(7);
//! let key = map.random_key(&mut rng).unwrap();
//! assert!(*key == "b" || *key == "c");
//!
//! let sample: Vec<_> = map.sample_keys(&mut rng, 2, false).unwrap().collect();
//! assert_eq!(sample.len(), 2);
//! ```

use std::hash::Hash;
use std::iter::FusedIterator;

use rand::Rng;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::error::{LshError, Result};

/// Hash map supporting O(1) insert, remove, lookup, and uniform sampling.
#[derive(Debug, Clone)]
pub struct RandomSamplingMap<K, V> {
    /// key -> (dense id, value)
    entries: FxHashMap<K, (usize, V)>,
    /// dense id -> key
    ids: Vec<K>,
}

impl<K, V> Default for RandomSamplingMap<K, V> {
    fn default() -> Self {
        Self {
            entries: FxHashMap::default(),
            ids: Vec::new(),
        }
    }
}

impl<K: Hash + Eq + Clone, V> RandomSamplingMap<K, V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
            ids: Vec::with_capacity(capacity),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    #[inline]
    pub fn contains_key(&self, key: &K) -> bool {
        self.entries.contains_key(key)
    }

    #[inline]
    pub fn get(&self, key: &K) -> Option<&V> {
        self.entries.get(key).map(|(_, v)| v)
    }

    /// Like [`get`](Self::get), but an absent key is a `KeyNotFound` error.
    pub fn get_or_err(&self, key: &K) -> Result<&V>
    where
        K: std::fmt::Debug,
    {
        self.get(key).ok_or_else(|| LshError::key_not_found(key))
    }

    /// Insert or overwrite a value.
    ///
    /// A new key takes the next unused id (the current length). Overwriting
    /// keeps the key's id. Returns the previous value, if any.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        if let Some((_, slot)) = self.entries.get_mut(&key) {
            return Some(std::mem::replace(slot, value));
        }
        let id = self.ids.len();
        self.ids.push(key.clone());
        self.entries.insert(key, (id, value));
        None
    }

    /// Remove a key, returning its value.
    ///
    /// The key occupying the last id is moved into the freed id.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        let (id, value) = self.entries.remove(key)?;
        self.ids.swap_remove(id);
        if let Some(moved) = self.ids.get(id) {
            if let Some(entry) = self.entries.get_mut(moved) {
                entry.0 = id;
            }
        }
        Some(value)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.ids.clear();
    }

    /// Dense id currently assigned to `key`.
    #[inline]
    pub fn id_of(&self, key: &K) -> Option<usize> {
        self.entries.get(key).map(|(id, _)| *id)
    }

    /// Key currently holding dense id `id`.
    #[inline]
    pub fn key_at(&self, id: usize) -> Option<&K> {
        self.ids.get(id)
    }

    /// Iterate over entries. No ordering is guaranteed.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> + '_ {
        self.entries.iter().map(|(k, (_, v))| (k, v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> + '_ {
        self.ids.iter()
    }

    pub fn values(&self) -> impl Iterator<Item = &V> + '_ {
        self.entries.values().map(|(_, v)| v)
    }

    fn random_id<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<usize> {
        if self.ids.is_empty() {
            return Err(LshError::EmptyContainer);
        }
        Ok(rng.random_range(0..self.ids.len()))
    }

    /// Uniformly random key.
    pub fn random_key<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<&K> {
        let id = self.random_id(rng)?;
        Ok(&self.ids[id])
    }

    /// Value of a uniformly random key.
    pub fn random_value<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<&V> {
        self.random_item(rng).map(|(_, v)| v)
    }

    /// Uniformly random `(key, value)` pair.
    pub fn random_item<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<(&K, &V)> {
        let id = self.random_id(rng)?;
        let key = &self.ids[id];
        let (_, value) = &self.entries[key];
        Ok((key, value))
    }

    /// Lazily draw exactly `n` keys.
    ///
    /// With replacement every draw is independent. Without replacement draws
    /// are rejection-sampled, which slows down as `n` approaches `len()`.
    ///
    /// # Errors
    ///
    /// - [`LshError::InvalidSampleSize`] if `n > len()` without replacement.
    /// - [`LshError::EmptyContainer`] if `n > 0` with replacement on an empty map.
    pub fn sample_keys<'a, 'r, R: Rng + ?Sized>(
        &'a self,
        rng: &'r mut R,
        n: usize,
        with_replacement: bool,
    ) -> Result<SampleKeys<'a, 'r, K, R>> {
        if !with_replacement && n > self.len() {
            return Err(LshError::InvalidSampleSize {
                requested: n,
                available: self.len(),
            });
        }
        if with_replacement && n > 0 && self.is_empty() {
            return Err(LshError::EmptyContainer);
        }
        Ok(SampleKeys {
            ids: &self.ids,
            rng,
            remaining: n,
            seen: (!with_replacement).then(FxHashSet::default),
        })
    }

    /// Values of `n` sampled keys.
    pub fn sample_values<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        n: usize,
        with_replacement: bool,
    ) -> Result<Vec<&V>> {
        Ok(self
            .sample_keys(rng, n, with_replacement)?
            .map(|k| &self.entries[k].1)
            .collect())
    }

    /// `(key, value)` pairs of `n` sampled keys.
    pub fn sample_items<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        n: usize,
        with_replacement: bool,
    ) -> Result<Vec<(&K, &V)>> {
        Ok(self
            .sample_keys(rng, n, with_replacement)?
            .map(|k| (k, &self.entries[k].1))
            .collect())
    }
}

/// Iterator returned by [`RandomSamplingMap::sample_keys`].
///
/// Yields exactly the requested number of keys, then stops for good.
pub struct SampleKeys<'a, 'r, K, R: ?Sized> {
    ids: &'a [K],
    rng: &'r mut R,
    remaining: usize,
    /// Ids already yielded; `None` when sampling with replacement.
    seen: Option<FxHashSet<usize>>,
}

impl<'a, K, R: Rng + ?Sized> Iterator for SampleKeys<'a, '_, K, R> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        loop {
            let id = self.rng.random_range(0..self.ids.len());
            let fresh = match self.seen.as_mut() {
                Some(seen) => seen.insert(id),
                None => true,
            };
            if fresh {
                self.remaining -= 1;
                return Some(&self.ids[id]);
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, R: Rng + ?Sized> ExactSizeIterator for SampleKeys<'_, '_, K, R> {}

impl<K, R: Rng + ?Sized> FusedIterator for SampleKeys<'_, '_, K, R> {}
