// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The dispatcher: hit testing, synthetic events, and propagation.
//!
//! [`Dispatcher::deliver`] routes one raw event for one user. It runs in three
//! steps.
//!
//! 1. **Pre-dispatch.** A press blurs the user's focus target and clears the
//!    hit cache. A release ends any drag. A move while a drag is in progress
//!    fires `Drag` on the drag target directly, regardless of where the
//!    pointer is.
//! 2. **Hit cache.** If propagation is still on and the user's cached target
//!    is still a leaf containing the point, that target is processed first.
//!    Otherwise the cache is dropped.
//! 3. **Traversal.** If propagation is still on, the collider tree is walked
//!    from the root. Buckets are visited from highest priority to lowest and
//!    children in registration order. A composite that contains the point is
//!    descended into, and the scan of its siblings ends there. A leaf that
//!    contains the point is processed, unless step 2 already processed it.
//!    Propagation stopping ends the walk.
//!
//! A release always clears the click target afterwards, even if it hit
//! nothing. If nothing was hit by a move, the user's hover target (if any) gets
//! `MouseLeave`.
//!
//! ## Processing a target
//!
//! | Event            | Effect                                                                  |
//! |------------------|-------------------------------------------------------------------------|
//! | `PointerMove`    | `MouseMove`; on hover change `MouseLeave` (old) then `MouseEnter` (new) |
//! | `PointerPress`   | sets click and drag target, `MouseDown`, always stops propagation       |
//! | `PointerRelease` | `MouseUp`; if it is the click target `Click` then `Focus`               |
//! | `PointerScroll`  | `MouseWheel`                                                            |
//! | `KeyDown`        | `KeyDown`                                                               |
//! | `KeyUp`          | the slot chosen by [`DispatchConfig::key_up`]                           |
//!
//! Every processed target then becomes the user's cached target.
//!
//! Any handler returning [`Outcome::Stop`] ends propagation for the rest of the
//! delivery; it never carries over to the next one.

use alloc::vec::Vec;
use core::fmt::Debug;
use core::hash::Hash;

use understory_collider::{ColliderId, ColliderTree};

use crate::config::{DispatchConfig, KeyUpSlot};
use crate::state::{PointerState, UserStates};
use crate::target::TargetHost;
use crate::types::{Delivery, EventKind, Handler, Outcome, PointerEvent};

/// Counters describing the dispatcher's work since creation or the last reset.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct DispatchStats {
    /// Calls to [`Dispatcher::deliver`].
    pub deliveries: u64,
    /// Full tree traversals started by a delivery.
    pub traversals: u64,
    /// Deliveries whose cached target still contained the point.
    pub cache_hits: u64,
    /// Deliveries whose cached target no longer contained the point or had become a composite.
    pub cache_misses: u64,
}

/// Multi-user event dispatcher.
///
/// Owns the collider tree and the per-user state table. Hosts register targets
/// through the dispatcher so that removing a target also scrubs it from every
/// user's state.
///
/// ## Example
///
/// ```
/// use kurbo::{Point, Rect};
/// use understory_collider::BoundsLookup;
/// use understory_multipointer::{
///     Dispatcher, Handler, Handlers, Outcome, PointerEvent, TargetHost,
/// };
///
/// struct Host {
///     log: Vec<(u32, Handler)>,
/// }
///
/// impl BoundsLookup<u32> for Host {
///     fn bounds(&self, _: &u32) -> Option<Rect> {
///         Some(Rect::new(0.0, 0.0, 10.0, 10.0))
///     }
/// }
///
/// impl TargetHost<u32, &'static str> for Host {
///     fn handlers(&self, _: &u32) -> Handlers {
///         Handlers::all()
///     }
///     fn invoke(&mut self, t: &u32, h: Handler, _: &PointerEvent<&'static str>) -> Outcome {
///         self.log.push((*t, h));
///         Outcome::Continue
///     }
/// }
///
/// let mut host = Host { log: Vec::new() };
/// let mut dispatcher: Dispatcher<u32, &str> = Dispatcher::new();
/// dispatcher.create_collider(None, 1, 0);
///
/// let at = Point::new(5.0, 5.0);
/// dispatcher.deliver(&mut host, &PointerEvent::press("ada", at));
/// dispatcher.deliver(&mut host, &PointerEvent::release("ada", at));
///
/// assert_eq!(
///     host.log,
///     vec![
///         (1, Handler::MouseDown),
///         (1, Handler::MouseUp),
///         (1, Handler::Click),
///         (1, Handler::Focus),
///     ]
/// );
/// assert_eq!(dispatcher.user_state(&"ada").unwrap().focus_target(), Some(&1));
/// ```
pub struct Dispatcher<K, U> {
    tree: ColliderTree<K>,
    users: UserStates<U, K>,
    config: DispatchConfig,
    stats: DispatchStats,
}

impl<K, U> Debug for Dispatcher<K, U> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("tree", &self.tree)
            .field("users", &self.users)
            .field("config", &self.config)
            .field("stats", &self.stats)
            .finish()
    }
}

impl<K, U> Default for Dispatcher<K, U>
where
    K: Clone + Eq + Hash + Debug,
    U: Clone + Eq + Hash + Debug,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, U> Dispatcher<K, U>
where
    K: Clone + Eq + Hash + Debug,
    U: Clone + Eq + Hash + Debug,
{
    /// Dispatcher with an empty tree and the default configuration.
    pub fn new() -> Self {
        Self::with_config(DispatchConfig::default())
    }

    /// Dispatcher with an empty tree and the given configuration.
    pub fn with_config(config: DispatchConfig) -> Self {
        Self {
            tree: ColliderTree::new(),
            users: UserStates::new(),
            config,
            stats: DispatchStats::default(),
        }
    }

    /// Active configuration.
    pub fn config(&self) -> DispatchConfig {
        self.config
    }

    /// The collider tree, for inspection.
    pub fn tree(&self) -> &ColliderTree<K> {
        &self.tree
    }

    /// Register a target. See [`ColliderTree::create_collider`].
    pub fn create_collider(
        &mut self,
        parent: Option<ColliderId>,
        target: K,
        priority: i32,
    ) -> ColliderId {
        self.tree.create_collider(parent, target, priority)
    }

    /// Register several targets. See [`ColliderTree::create_colliders`].
    pub fn create_colliders(
        &mut self,
        parent: Option<ColliderId>,
        targets: impl IntoIterator<Item = K>,
        priority: i32,
    ) -> Vec<ColliderId> {
        self.tree.create_colliders(parent, targets, priority)
    }

    /// Unregister a node and its subtree, and drop the removed targets from
    /// every user's state without firing leave or blur.
    ///
    /// Returns the removed targets. A stale identifier is a no-op.
    pub fn remove_collider(&mut self, id: ColliderId) -> Vec<K> {
        let removed = self.tree.remove_collider(id);
        self.forget_targets(&removed);
        removed
    }

    /// Unregister several nodes. See [`Dispatcher::remove_collider`].
    pub fn remove_colliders(&mut self, ids: impl IntoIterator<Item = ColliderId>) -> Vec<K> {
        let removed = self.tree.remove_colliders(ids);
        self.forget_targets(&removed);
        removed
    }

    /// Set the surface offset. See [`ColliderTree::set_offset`].
    pub fn set_offset(&mut self, x: f64, y: f64) {
        self.tree.set_offset(x, y);
    }

    /// State of `user`, if it has sent any event.
    pub fn user_state(&self, user: &U) -> Option<&PointerState<K>> {
        self.users.get(user)
    }

    /// All tracked users.
    pub fn users(&self) -> &UserStates<U, K> {
        &self.users
    }

    /// Forget a user, typically on disconnect. Nothing is fired.
    pub fn remove_user(&mut self, user: &U) -> Option<PointerState<K>> {
        self.users.remove(user)
    }

    /// Work counters.
    pub fn stats(&self) -> DispatchStats {
        self.stats
    }

    /// Zero the work counters.
    pub fn reset_stats(&mut self) {
        self.stats = DispatchStats::default();
    }

    /// Route one event.
    ///
    /// Creates state for an unseen user, then runs pre-dispatch, the hit cache,
    /// and the tree traversal as described in the [module docs](self).
    pub fn deliver<D, H>(&mut self, host: &mut H, event: &PointerEvent<U, D>) -> Delivery
    where
        H: TargetHost<K, U, D> + ?Sized,
    {
        self.stats.deliveries += 1;
        let route = Route {
            tree: &self.tree,
            state: self.users.entry(&event.user),
            host,
            event,
            config: self.config,
            stats: &mut self.stats,
            propagate: true,
            fast_path: None,
        };
        route.run()
    }

    fn forget_targets(&mut self, removed: &[K]) {
        for target in removed {
            let users = self.users.forget_target(target);
            if users > 0 {
                tracing::debug!(key = ?target, users, "removed target dropped from pointer state");
            }
        }
    }
}

/// One delivery in flight.
struct Route<'a, K, U, D, H: ?Sized> {
    tree: &'a ColliderTree<K>,
    state: &'a mut PointerState<K>,
    host: &'a mut H,
    event: &'a PointerEvent<U, D>,
    config: DispatchConfig,
    stats: &'a mut DispatchStats,
    propagate: bool,
    /// Target already processed through the hit cache during this delivery.
    fast_path: Option<K>,
}

impl<K, U, D, H> Route<'_, K, U, D, H>
where
    K: Clone + Eq + Hash + Debug,
    U: Debug,
    H: TargetHost<K, U, D> + ?Sized,
{
    fn run(mut self) -> Delivery {
        let kind = self.event.kind;
        let position = self.event.position;

        match kind {
            EventKind::PointerPress => {
                if let Some(focused) = self.state.focus_target.take() {
                    self.fire(&focused, Handler::Blur);
                }
                self.state.cached_target = None;
            }
            EventKind::PointerRelease => {
                self.state.drag_target = None;
            }
            EventKind::PointerMove => {
                if let Some(dragged) = self.state.drag_target.clone() {
                    self.fire(&dragged, Handler::Drag);
                }
            }
            EventKind::PointerScroll | EventKind::KeyDown | EventKind::KeyUp => {}
        }

        let mut hit = false;
        if self.propagate
            && let Some(cached) = self.state.cached_target.clone()
        {
            // A target that gained children is a container now, not a recipient.
            let leaf = self
                .tree
                .find(&cached)
                .is_some_and(|id| !self.tree.is_composite(id));
            if leaf && self.tree.contains_point(&*self.host, &cached, position) {
                self.stats.cache_hits += 1;
                tracing::trace!(user = ?self.event.user, key = ?cached, "hit cache");
                self.process(&cached);
                self.fast_path = Some(cached);
                hit = true;
            } else {
                self.stats.cache_misses += 1;
                tracing::trace!(user = ?self.event.user, key = ?cached, "hit cache missed");
                self.state.cached_target = None;
            }
        }

        if self.propagate {
            self.stats.traversals += 1;
            tracing::trace!(user = ?self.event.user, ?kind, x = position.x, y = position.y, "traverse");
            let root = self.tree.root();
            hit |= self.traverse(root);
        }

        if kind == EventKind::PointerRelease {
            // A release ends the press sequence whether or not it hit anything.
            self.state.click_target = None;
        }

        if !hit
            && kind == EventKind::PointerMove
            && let Some(hovered) = self.state.hover_target.take()
        {
            self.fire(&hovered, Handler::MouseLeave);
        }

        Delivery {
            handled: hit,
            propagate: self.propagate,
        }
    }

    /// Walk `node`'s buckets and process every matching leaf until propagation stops.
    fn traverse(&mut self, node: ColliderId) -> bool {
        let tree = self.tree;
        let position = self.event.position;
        let mut hit = false;
        for (_, bucket) in tree.buckets(node) {
            for &child in bucket {
                let Some(target) = tree.target(child) else {
                    continue;
                };
                if !tree.contains_point(&*self.host, target, position) {
                    continue;
                }
                if tree.is_composite(child) {
                    hit |= self.traverse(child);
                    break;
                }
                if self.fast_path.as_ref() != Some(target) {
                    self.process(target);
                    hit = true;
                }
                if !self.propagate {
                    break;
                }
            }
            if !self.propagate {
                break;
            }
        }
        hit
    }

    /// Fire the handlers `target` receives for this event and update state.
    fn process(&mut self, target: &K) {
        match self.event.kind {
            EventKind::PointerMove => {
                self.fire(target, Handler::MouseMove);
                if self.state.hover_target.as_ref() != Some(target) {
                    if let Some(previous) = self.state.hover_target.take() {
                        self.fire(&previous, Handler::MouseLeave);
                    }
                    self.fire(target, Handler::MouseEnter);
                    self.state.hover_target = Some(target.clone());
                }
            }
            EventKind::PointerPress => {
                self.state.drag_target = Some(target.clone());
                self.state.click_target = Some(target.clone());
                self.fire(target, Handler::MouseDown);
                // Only one target may start a drag or click sequence.
                self.propagate = false;
            }
            EventKind::PointerRelease => {
                self.fire(target, Handler::MouseUp);
                if self.state.click_target.as_ref() == Some(target) {
                    self.fire(target, Handler::Click);
                    self.fire(target, Handler::Focus);
                    self.state.focus_target = Some(target.clone());
                }
                self.state.click_target = None;
            }
            EventKind::PointerScroll => self.fire(target, Handler::MouseWheel),
            EventKind::KeyDown => self.fire(target, Handler::KeyDown),
            EventKind::KeyUp => {
                let slot = match self.config.key_up {
                    KeyUpSlot::KeyUp => Handler::KeyUp,
                    KeyUpSlot::KeyDown => Handler::KeyDown,
                };
                self.fire(target, slot);
            }
        }
        if self.config.hit_cache {
            self.state.cached_target = Some(target.clone());
        }
    }

    /// Invoke `handler` on `target` if the target implements it.
    fn fire(&mut self, target: &K, handler: Handler) {
        if !self.host.handlers(target).contains(handler.flag()) {
            return;
        }
        tracing::trace!(user = ?self.event.user, key = ?target, ?handler, "invoke");
        if self.host.invoke(target, handler, self.event) == Outcome::Stop {
            self.propagate = false;
        }
    }
}
