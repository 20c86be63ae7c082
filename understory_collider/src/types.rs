// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Public types for the collider tree: identifiers, priorities, and bounds lookup.

use kurbo::Rect;

/// Identifier for a collider node (generational).
///
/// Identifiers are never reused while their node is alive. After a node is
/// removed its slot may be recycled, but with a bumped generation, so a stale
/// identifier never aliases a newer node.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct ColliderId(pub(crate) u32, pub(crate) u32);

impl ColliderId {
    pub(crate) const fn new(idx: u32, generation: u32) -> Self {
        Self(idx, generation)
    }

    pub(crate) const fn idx(self) -> usize {
        self.0 as usize
    }
}

/// Upper end of the conventional priority range.
///
/// Buckets are stored under `MAX_PRIORITY - priority` and visited in ascending
/// key order, so higher caller priorities are hit tested first. Priorities
/// outside `0..=MAX_PRIORITY` are accepted and keep the same ordering.
pub const MAX_PRIORITY: i32 = 1_000;

/// Stored bucket key for a caller-supplied priority.
#[inline]
pub(crate) const fn bucket_key(priority: i32) -> i64 {
    MAX_PRIORITY as i64 - priority as i64
}

/// Caller priority for a stored bucket key.
#[inline]
pub(crate) const fn priority_of_key(key: i64) -> i32 {
    #[allow(
        clippy::cast_possible_truncation,
        reason = "keys are only ever produced by `bucket_key` from an i32."
    )]
    let priority = (MAX_PRIORITY as i64 - key) as i32;
    priority
}

/// Source of live on-screen bounds for targets.
///
/// Bounds are read at hit-test time rather than cached, so a target that moves
/// or resizes between events is tested against where it is now. Return `None`
/// for targets that currently have no on-screen presence; such targets never
/// contain a point.
///
/// Any `Fn(&K) -> Option<Rect>` closure is a lookup.
pub trait BoundsLookup<K> {
    /// Current bounding box of `target` in viewport coordinates.
    fn bounds(&self, target: &K) -> Option<Rect>;
}

impl<K, F> BoundsLookup<K> for F
where
    F: Fn(&K) -> Option<Rect>,
{
    fn bounds(&self, target: &K) -> Option<Rect> {
        self(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn higher_priority_sorts_first() {
        assert!(bucket_key(10) < bucket_key(1));
        assert!(bucket_key(i32::MAX) < bucket_key(i32::MIN));
    }

    #[test]
    fn key_round_trips_extreme_priorities() {
        for p in [i32::MIN, -1, 0, 1, MAX_PRIORITY, i32::MAX] {
            assert_eq!(priority_of_key(bucket_key(p)), p);
        }
    }
}
