// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Core tree implementation: registration, removal, and bucket iteration.

use alloc::collections::BTreeMap;
use alloc::vec::Vec;
use core::fmt::Debug;
use core::hash::Hash;

use hashbrown::HashMap;
use kurbo::{Point, Vec2};
use smallvec::SmallVec;

use crate::types::{BoundsLookup, ColliderId, bucket_key, priority_of_key};
use crate::util::contains_with_offset;

type Bucket = SmallVec<[ColliderId; 4]>;

/// Priority-bucketed tree of hit-test targets.
///
/// The tree owns a root node with no target. Every other node wraps one target
/// key `K` and sits in exactly one priority bucket of its parent. A node with
/// children of its own is a *composite*: hit testing descends into it instead
/// of treating it as a recipient.
///
/// Geometry is not stored. Bounds are read from a [`BoundsLookup`] at query
/// time and normalized against the surface offset (see
/// [`ColliderTree::set_offset`]).
///
/// ## Example
///
/// ```rust
/// use kurbo::{Point, Rect};
/// use understory_collider::ColliderTree;
///
/// let mut tree = ColliderTree::new();
/// let low = tree.create_collider(None, "background", 1);
/// let high = tree.create_collider(None, "window", 10);
///
/// // Same (parent, target, priority) returns the node already registered.
/// assert_eq!(tree.create_collider(None, "window", 10), high);
///
/// // Buckets iterate highest caller priority first.
/// let order: Vec<_> = tree.buckets(tree.root()).map(|(p, _)| p).collect();
/// assert_eq!(order, vec![10, 1]);
///
/// let bounds = |_: &&str| Some(Rect::new(0.0, 0.0, 100.0, 100.0));
/// assert!(tree.contains_point(&bounds, &"window", Point::new(50.0, 50.0)));
///
/// assert_eq!(tree.remove_collider(low), vec!["background"]);
/// assert!(!tree.is_alive(low));
/// ```
pub struct ColliderTree<K> {
    /// slots
    nodes: Vec<Option<Node<K>>>,
    /// last generation per slot (persists across frees)
    generations: Vec<u32>,
    free_list: Vec<usize>,
    root: ColliderId,
    registered: HashMap<K, ColliderId>,
    offset: Vec2,
}

impl<K> Debug for ColliderTree<K> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let total = self.nodes.len();
        let alive = self.nodes.iter().filter(|n| n.is_some()).count();
        f.debug_struct("ColliderTree")
            .field("nodes_total", &total)
            .field("nodes_alive", &alive)
            .field("free_list", &self.free_list.len())
            .field("registered", &self.registered.len())
            .field("offset", &self.offset)
            .finish_non_exhaustive()
    }
}

#[derive(Clone, Debug)]
struct Node<K> {
    generation: u32,
    target: Option<K>,
    parent: Option<ColliderId>,
    priority: i32,
    buckets: BTreeMap<i64, Bucket>,
}

impl<K> Node<K> {
    fn new(generation: u32, target: Option<K>, parent: Option<ColliderId>, priority: i32) -> Self {
        Self {
            generation,
            target,
            parent,
            priority,
            buckets: BTreeMap::new(),
        }
    }
}

impl<K: Clone + Eq + Hash + Debug> Default for ColliderTree<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Clone + Eq + Hash + Debug> ColliderTree<K> {
    /// Create an empty tree with a zero surface offset.
    pub fn new() -> Self {
        Self::with_offset(Vec2::ZERO)
    }

    /// Create an empty tree with an initial surface offset.
    pub fn with_offset(offset: Vec2) -> Self {
        let root = ColliderId::new(0, 1);
        Self {
            nodes: alloc::vec![Some(Node::new(1, None, None, 0))],
            generations: alloc::vec![1],
            free_list: Vec::new(),
            root,
            registered: HashMap::new(),
            offset,
        }
    }

    /// The root node. It has no target and cannot be removed.
    pub fn root(&self) -> ColliderId {
        self.root
    }

    /// Register `target` under `parent` (or the root if `None`) at `priority`.
    ///
    /// Idempotent: if `target` is already registered under the same parent and
    /// priority, the existing node is returned unchanged. If it is registered
    /// elsewhere, that node is moved (with its subtree) into the requested
    /// bucket and keeps its identifier, so a target never occupies more than
    /// one bucket.
    ///
    /// A stale `parent` falls back to the root. A move that would place a node
    /// inside its own subtree is refused and returns the node where it was.
    pub fn create_collider(
        &mut self,
        parent: Option<ColliderId>,
        target: K,
        priority: i32,
    ) -> ColliderId {
        let parent = match parent {
            Some(p) if self.is_alive(p) => p,
            Some(p) => {
                tracing::warn!(parent = ?p, key = ?target, "stale parent collider, registering under root");
                self.root
            }
            None => self.root,
        };

        if let Some(&existing) = self.registered.get(&target) {
            let node = self.node(existing);
            if node.parent == Some(parent) && node.priority == priority {
                return existing;
            }
            if parent == existing || self.is_descendant(parent, existing) {
                tracing::warn!(
                    collider = ?existing,
                    key = ?target,
                    "refusing to move a collider into its own subtree"
                );
                return existing;
            }
            self.unlink(existing);
            self.link(existing, parent, priority);
            tracing::debug!(collider = ?existing, key = ?target, priority, "collider relocated");
            return existing;
        }

        let (idx, generation) = if let Some(idx) = self.free_list.pop() {
            let generation = self.generations[idx].saturating_add(1);
            self.generations[idx] = generation;
            self.nodes[idx] = Some(Node::new(generation, Some(target.clone()), None, priority));
            #[allow(
                clippy::cast_possible_truncation,
                reason = "ColliderId stores 32-bit indices."
            )]
            (idx as u32, generation)
        } else {
            let generation = 1_u32;
            self.nodes
                .push(Some(Node::new(generation, Some(target.clone()), None, priority)));
            self.generations.push(generation);
            #[allow(
                clippy::cast_possible_truncation,
                reason = "ColliderId stores 32-bit indices."
            )]
            ((self.nodes.len() - 1) as u32, generation)
        };
        let id = ColliderId::new(idx, generation);
        self.link(id, parent, priority);
        tracing::debug!(collider = ?id, key = ?target, priority, "collider created");
        self.registered.insert(target, id);
        id
    }

    /// Register several targets under one parent and priority.
    ///
    /// Returns one identifier per input, in input order.
    pub fn create_colliders(
        &mut self,
        parent: Option<ColliderId>,
        targets: impl IntoIterator<Item = K>,
        priority: i32,
    ) -> Vec<ColliderId> {
        targets
            .into_iter()
            .map(|t| self.create_collider(parent, t, priority))
            .collect()
    }

    /// Remove a node and its whole subtree.
    ///
    /// The node leaves its parent's bucket; an emptied bucket is dropped. The
    /// parent itself stays registered, as an empty container if this was its
    /// last child.
    ///
    /// Returns the targets that were unregistered, the node's own first. A
    /// stale identifier or the root is a no-op and returns nothing.
    pub fn remove_collider(&mut self, id: ColliderId) -> Vec<K> {
        let mut removed = Vec::new();
        if !self.is_alive(id) || id == self.root {
            return removed;
        }
        self.unlink(id);
        self.free_subtree(id, &mut removed);
        tracing::debug!(collider = ?id, removed = removed.len(), "collider removed");
        removed
    }

    /// Remove each node in turn. Stale or duplicate identifiers are skipped.
    pub fn remove_colliders(&mut self, ids: impl IntoIterator<Item = ColliderId>) -> Vec<K> {
        let mut removed = Vec::new();
        for id in ids {
            removed.extend(self.remove_collider(id));
        }
        removed
    }

    /// Set the surface offset subtracted from target bounds before point tests.
    ///
    /// Use this when the logical surface is panned or scrolled relative to the
    /// viewport coordinates that bounds are reported in.
    pub fn set_offset(&mut self, x: f64, y: f64) {
        let offset = Vec2::new(x, y);
        if self.offset != offset {
            tracing::debug!(x, y, "surface offset changed");
            self.offset = offset;
        }
    }

    /// Current surface offset.
    pub fn offset(&self) -> Vec2 {
        self.offset
    }

    /// Whether `target`'s current bounds, normalized by the offset, contain `pt`.
    ///
    /// Edges are inclusive. Targets without bounds contain nothing.
    pub fn contains_point<L>(&self, lookup: &L, target: &K, pt: Point) -> bool
    where
        L: BoundsLookup<K> + ?Sized,
    {
        lookup
            .bounds(target)
            .is_some_and(|b| contains_with_offset(b, self.offset, pt))
    }

    /// Node registered for `target`, if any.
    pub fn find(&self, target: &K) -> Option<ColliderId> {
        self.registered.get(target).copied()
    }
}

impl<K> ColliderTree<K> {
    /// Returns true if `id` refers to a live node.
    pub fn is_alive(&self, id: ColliderId) -> bool {
        self.nodes
            .get(id.idx())
            .and_then(|n| n.as_ref())
            .is_some_and(|n| n.generation == id.1)
    }

    /// Target of a live node. `None` for the root and stale identifiers.
    pub fn target(&self, id: ColliderId) -> Option<&K> {
        self.node_opt(id).and_then(|n| n.target.as_ref())
    }

    /// Parent of a live node, or `None` for the root and stale identifiers.
    pub fn parent_of(&self, id: ColliderId) -> Option<ColliderId> {
        self.node_opt(id).and_then(|n| n.parent)
    }

    /// Caller priority a live, non-root node was registered with.
    pub fn priority_of(&self, id: ColliderId) -> Option<i32> {
        self.node_opt(id)
            .filter(|n| n.parent.is_some())
            .map(|n| n.priority)
    }

    /// Whether a live node currently has children of its own.
    pub fn is_composite(&self, id: ColliderId) -> bool {
        self.node_opt(id).is_some_and(|n| !n.buckets.is_empty())
    }

    /// Children of a node grouped by priority, in hit-test order.
    ///
    /// Yields `(priority, children)` from highest caller priority to lowest;
    /// children within a bucket keep registration order. Empty for leaves and
    /// stale identifiers.
    pub fn buckets(&self, id: ColliderId) -> impl Iterator<Item = (i32, &[ColliderId])> + '_ {
        self.node_opt(id)
            .into_iter()
            .flat_map(|n| n.buckets.iter())
            .map(|(key, bucket)| (priority_of_key(*key), bucket.as_slice()))
    }

    /// Number of registered targets (the root is not counted).
    pub fn len(&self) -> usize {
        self.registered.len()
    }

    /// Whether no targets are registered.
    pub fn is_empty(&self) -> bool {
        self.registered.is_empty()
    }

    // --- internals ---

    fn node_opt(&self, id: ColliderId) -> Option<&Node<K>> {
        let n = self.nodes.get(id.idx())?.as_ref()?;
        if n.generation != id.1 {
            return None;
        }
        Some(n)
    }

    /// Access a live node; panics if `id` is stale.
    fn node(&self, id: ColliderId) -> &Node<K> {
        self.nodes[id.idx()].as_ref().expect("dangling ColliderId")
    }

    /// Access a live node mutably; panics if `id` is stale.
    fn node_mut(&mut self, id: ColliderId) -> &mut Node<K> {
        self.nodes[id.idx()].as_mut().expect("dangling ColliderId")
    }

    /// Whether `candidate` lies strictly below `ancestor`.
    fn is_descendant(&self, candidate: ColliderId, ancestor: ColliderId) -> bool {
        let mut cur = self.parent_of(candidate);
        while let Some(p) = cur {
            if p == ancestor {
                return true;
            }
            cur = self.parent_of(p);
        }
        false
    }

    fn link(&mut self, id: ColliderId, parent: ColliderId, priority: i32) {
        self.node_mut(parent)
            .buckets
            .entry(bucket_key(priority))
            .or_default()
            .push(id);
        let node = self.node_mut(id);
        node.parent = Some(parent);
        node.priority = priority;
    }

    fn unlink(&mut self, id: ColliderId) {
        let (parent, key) = {
            let n = self.node(id);
            (n.parent, bucket_key(n.priority))
        };
        let Some(parent) = parent else {
            return;
        };
        let buckets = &mut self.node_mut(parent).buckets;
        if let Some(bucket) = buckets.get_mut(&key) {
            bucket.retain(|c| *c != id);
            if bucket.is_empty() {
                buckets.remove(&key);
            }
        }
        self.node_mut(id).parent = None;
    }
}

impl<K: Eq + Hash> ColliderTree<K> {
    fn free_subtree(&mut self, id: ColliderId, removed: &mut Vec<K>) {
        let Some(node) = self.nodes[id.idx()].take() else {
            return;
        };
        self.free_list.push(id.idx());
        if let Some(target) = node.target {
            self.registered.remove(&target);
            removed.push(target);
        }
        for bucket in node.buckets.into_values() {
            for child in bucket {
                self.free_subtree(child, removed);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;
    use kurbo::Rect;

    fn order(tree: &ColliderTree<u32>, id: ColliderId) -> Vec<(i32, Vec<u32>)> {
        tree.buckets(id)
            .map(|(p, kids)| {
                (
                    p,
                    kids.iter()
                        .map(|k| *tree.target(*k).expect("live child"))
                        .collect(),
                )
            })
            .collect()
    }

    #[test]
    fn buckets_visit_higher_priority_first() {
        let mut tree = ColliderTree::new();
        tree.create_collider(None, 1_u32, 1);
        tree.create_collider(None, 2, 10);
        tree.create_collider(None, 3, 1);
        tree.create_collider(None, 4, 5);
        let root = tree.root();
        assert_eq!(
            order(&tree, root),
            vec![(10, vec![2]), (5, vec![4]), (1, vec![1, 3])]
        );
    }

    #[test]
    fn create_is_idempotent() {
        let mut tree = ColliderTree::new();
        let a = tree.create_collider(None, 7_u32, 3);
        let b = tree.create_collider(None, 7, 3);
        assert_eq!(a, b);
        assert_eq!(tree.len(), 1);
        let root = tree.root();
        assert_eq!(order(&tree, root), vec![(3, vec![7])]);
    }

    #[test]
    fn batch_create_preserves_order() {
        let mut tree = ColliderTree::new();
        let ids = tree.create_colliders(None, [5_u32, 6, 7], 2);
        assert_eq!(ids.len(), 3);
        let targets: Vec<u32> = ids.iter().map(|id| *tree.target(*id).unwrap()).collect();
        assert_eq!(targets, vec![5, 6, 7]);
    }

    #[test]
    fn reregistering_elsewhere_moves_the_node() {
        let mut tree = ColliderTree::new();
        let group = tree.create_collider(None, 100_u32, 0);
        let a = tree.create_collider(None, 1, 0);
        let moved = tree.create_collider(Some(group), 1, 4);
        assert_eq!(a, moved);
        assert_eq!(tree.parent_of(a), Some(group));
        assert_eq!(tree.priority_of(a), Some(4));
        let root = tree.root();
        assert_eq!(order(&tree, root), vec![(0, vec![100])]);
        assert_eq!(order(&tree, group), vec![(4, vec![1])]);
    }

    #[test]
    fn refuses_to_nest_a_node_inside_itself() {
        let mut tree = ColliderTree::new();
        let outer = tree.create_collider(None, 1_u32, 0);
        let inner = tree.create_collider(Some(outer), 2, 0);
        assert_eq!(tree.create_collider(Some(inner), 1, 0), outer);
        assert_eq!(tree.parent_of(outer), Some(tree.root()));
    }

    #[test]
    fn stale_parent_falls_back_to_root() {
        let mut tree = ColliderTree::new();
        let gone = tree.create_collider(None, 1_u32, 0);
        tree.remove_collider(gone);
        let id = tree.create_collider(Some(gone), 2, 0);
        assert_eq!(tree.parent_of(id), Some(tree.root()));
    }

    #[test]
    fn remove_prunes_empty_bucket_and_keeps_parent() {
        let mut tree = ColliderTree::new();
        let group = tree.create_collider(None, 10_u32, 0);
        let a = tree.create_collider(Some(group), 1, 2);
        let b = tree.create_collider(Some(group), 2, 3);
        assert!(tree.is_composite(group));

        assert_eq!(tree.remove_collider(a), vec![1]);
        assert_eq!(order(&tree, group), vec![(3, vec![2])]);

        assert_eq!(tree.remove_collider(b), vec![2]);
        assert!(tree.is_alive(group));
        assert!(!tree.is_composite(group));
        assert_eq!(tree.buckets(group).count(), 0);
    }

    #[test]
    fn remove_frees_subtree() {
        let mut tree = ColliderTree::new();
        let group = tree.create_collider(None, 10_u32, 0);
        let a = tree.create_collider(Some(group), 1, 0);
        let b = tree.create_collider(Some(a), 2, 0);
        let removed = tree.remove_collider(group);
        assert_eq!(removed, vec![10, 1, 2]);
        assert!(!tree.is_alive(a));
        assert!(!tree.is_alive(b));
        assert!(tree.is_empty());
        assert_eq!(tree.find(&2), None);
    }

    #[test]
    fn stale_and_duplicate_removal_is_noop() {
        let mut tree = ColliderTree::new();
        let a = tree.create_collider(None, 1_u32, 0);
        let _b = tree.create_collider(None, 2, 0);
        assert_eq!(tree.remove_colliders([a, a]), vec![1]);
        assert!(tree.remove_collider(a).is_empty());
        assert!(tree.remove_collider(tree.root()).is_empty());
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn recycled_slot_does_not_alias_stale_id() {
        let mut tree = ColliderTree::new();
        let a = tree.create_collider(None, 1_u32, 0);
        tree.remove_collider(a);
        let b = tree.create_collider(None, 2, 0);
        assert_eq!(a.idx(), b.idx());
        assert_ne!(a, b);
        assert!(!tree.is_alive(a));
        assert_eq!(tree.target(a), None);
        assert_eq!(tree.target(b), Some(&2));
    }

    #[test]
    fn offset_applies_to_contains_point() {
        let mut tree = ColliderTree::new();
        tree.create_collider(None, 1_u32, 0);
        let lookup = |_: &u32| Some(Rect::new(200.0, 100.0, 300.0, 200.0));
        assert!(!tree.contains_point(&lookup, &1, Point::new(50.0, 50.0)));
        tree.set_offset(200.0, 100.0);
        assert_eq!(tree.offset(), Vec2::new(200.0, 100.0));
        assert!(tree.contains_point(&lookup, &1, Point::new(50.0, 50.0)));
    }

    #[test]
    fn missing_bounds_never_contain() {
        let tree: ColliderTree<u32> = ColliderTree::new();
        let lookup = |_: &u32| -> Option<Rect> { None };
        assert!(!tree.contains_point(&lookup, &1, Point::ZERO));
    }
}
