// Copyright 2025 the Plotweave Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Mark-and-sweep caches for backend resources.

use core::hash::Hash;

use indexmap::IndexMap;
use plotweave_render::{Color, LineJoin};
use smallvec::SmallVec;

/// Identity of a stroke style.
///
/// Floats are keyed by their bit patterns, so `0.0` and `-0.0` are distinct
/// pens. That only costs an extra entry.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub(crate) struct PenKey {
    color: u32,
    thickness: u64,
    dashes: SmallVec<[u64; 8]>,
    join: LineJoin,
}

impl PenKey {
    pub(crate) fn new(
        color: Color,
        thickness: f64,
        dash_array: Option<&[f64]>,
        join: LineJoin,
    ) -> Self {
        Self {
            color: color.to_u32(),
            thickness: thickness.to_bits(),
            dashes: dash_array
                .unwrap_or_default()
                .iter()
                .map(|d| d.to_bits())
                .collect(),
            join,
        }
    }
}

#[derive(Debug)]
struct Entry<V> {
    value: V,
    generation: u64,
}

/// A cache whose entries survive a sweep only if they were used since the
/// previous one.
#[derive(Debug)]
pub(crate) struct GenerationalCache<K, V> {
    entries: IndexMap<K, Entry<V>>,
    generation: u64,
}

impl<K: Hash + Eq, V> Default for GenerationalCache<K, V> {
    fn default() -> Self {
        Self {
            entries: IndexMap::new(),
            generation: 0,
        }
    }
}

impl<K: Hash + Eq, V> GenerationalCache<K, V> {
    /// Returns the entry for `key`, creating it with `create` on a miss, and
    /// marks it as used in the current generation.
    pub(crate) fn get_or_insert_with(&mut self, key: K, create: impl FnOnce() -> V) -> &V {
        let generation = self.generation;
        let entry = self.entries.entry(key).or_insert_with(|| Entry {
            value: create(),
            generation,
        });
        entry.generation = generation;
        &entry.value
    }

    /// Drops entries not used since the last sweep and starts a new
    /// generation. Returns the number of evicted entries.
    pub(crate) fn sweep(&mut self) -> usize {
        let generation = self.generation;
        let before = self.entries.len();
        self.entries.retain(|_, e| e.generation == generation);
        self.generation += 1;
        before - self.entries.len()
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entries_unused_for_a_pass_are_evicted() {
        let mut cache = GenerationalCache::default();
        cache.get_or_insert_with("a", || 1);
        cache.get_or_insert_with("b", || 2);
        assert_eq!(cache.sweep(), 0);

        cache.get_or_insert_with("b", || unreachable!("b is cached"));
        assert_eq!(cache.sweep(), 1);
        assert_eq!(cache.len(), 1);
        assert_eq!(*cache.get_or_insert_with("b", || 0), 2);
    }

    #[test]
    fn pen_keys_distinguish_every_field() {
        let base = PenKey::new(Color::RED, 1.0, None, LineJoin::Miter);
        assert_eq!(base, PenKey::new(Color::RED, 1.0, Some(&[]), LineJoin::Miter));
        assert_ne!(base, PenKey::new(Color::BLUE, 1.0, None, LineJoin::Miter));
        assert_ne!(base, PenKey::new(Color::RED, 2.0, None, LineJoin::Miter));
        assert_ne!(base, PenKey::new(Color::RED, 1.0, Some(&[4.0, 1.0]), LineJoin::Miter));
        assert_ne!(base, PenKey::new(Color::RED, 1.0, None, LineJoin::Round));
    }
}
