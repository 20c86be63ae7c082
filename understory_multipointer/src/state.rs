// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-user pointer state.
//!
//! Every user that has sent at least one event owns a [`PointerState`]: the
//! transient relationships between that user's pointer and the targets it has
//! touched. Users never share state, so two people dragging on the same wall
//! do not disturb each other's hover, click, or focus.
//!
//! ## Fields
//!
//! - click target: received the most recent press; cleared on release.
//! - drag target: receives drag notifications while the button is held;
//!   cleared on release.
//! - hover target: currently "entered" for move-derived enter/leave.
//! - focus target: last target to complete a press and release; blurred by
//!   the next press.
//! - cached target: last target that handled an event, tested first on the
//!   next one.
//!
//! ## Lifecycle
//!
//! State is created lazily on a user's first event and kept until the caller
//! removes it with [`UserStates::remove`] (or
//! [`Dispatcher::remove_user`](crate::Dispatcher::remove_user)). Hosts that
//! learn about disconnects should forward them, or the table grows with every
//! user ever seen.
//!
//! ```
//! use understory_multipointer::state::UserStates;
//!
//! let mut users: UserStates<&str, u32> = UserStates::new();
//! assert!(users.get(&"ada").is_none());
//!
//! // First event from a user creates idle state.
//! assert!(users.entry(&"ada").is_idle());
//! assert_eq!(users.len(), 1);
//!
//! // Disconnect.
//! assert!(users.remove(&"ada").is_some());
//! assert!(users.is_empty());
//! ```

use core::fmt::Debug;
use core::hash::Hash;

use hashbrown::HashMap;

/// Hover, drag, click, focus, and hit-cache bookkeeping for one user.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PointerState<K> {
    pub(crate) click_target: Option<K>,
    pub(crate) drag_target: Option<K>,
    pub(crate) hover_target: Option<K>,
    pub(crate) focus_target: Option<K>,
    pub(crate) cached_target: Option<K>,
}

impl<K> Default for PointerState<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K> PointerState<K> {
    /// State with no relationships.
    pub const fn new() -> Self {
        Self {
            click_target: None,
            drag_target: None,
            hover_target: None,
            focus_target: None,
            cached_target: None,
        }
    }

    /// Target that received the current press, if the button is still down.
    pub fn click_target(&self) -> Option<&K> {
        self.click_target.as_ref()
    }

    /// Target receiving drag notifications.
    pub fn drag_target(&self) -> Option<&K> {
        self.drag_target.as_ref()
    }

    /// Target the pointer is currently over, as far as enter/leave goes.
    pub fn hover_target(&self) -> Option<&K> {
        self.hover_target.as_ref()
    }

    /// Target that holds focus.
    pub fn focus_target(&self) -> Option<&K> {
        self.focus_target.as_ref()
    }

    /// Target tested first on the next event.
    pub fn cached_target(&self) -> Option<&K> {
        self.cached_target.as_ref()
    }

    /// Returns `true` if no relationship is set.
    pub fn is_idle(&self) -> bool {
        self.click_target.is_none()
            && self.drag_target.is_none()
            && self.hover_target.is_none()
            && self.focus_target.is_none()
            && self.cached_target.is_none()
    }
}

impl<K: PartialEq> PointerState<K> {
    /// Drop every reference to `target` without firing anything.
    ///
    /// Returns `true` if a field changed.
    pub fn forget(&mut self, target: &K) -> bool {
        let mut changed = false;
        for slot in [
            &mut self.click_target,
            &mut self.drag_target,
            &mut self.hover_target,
            &mut self.focus_target,
            &mut self.cached_target,
        ] {
            if slot.as_ref() == Some(target) {
                *slot = None;
                changed = true;
            }
        }
        changed
    }
}

/// Table of [`PointerState`] keyed by user id.
#[derive(Clone)]
pub struct UserStates<U, K> {
    users: HashMap<U, PointerState<K>>,
}

impl<U, K> Debug for UserStates<U, K> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("UserStates")
            .field("users", &self.users.len())
            .finish_non_exhaustive()
    }
}

impl<U, K> Default for UserStates<U, K> {
    fn default() -> Self {
        Self {
            users: HashMap::default(),
        }
    }
}

impl<U: Clone + Eq + Hash + Debug, K> UserStates<U, K> {
    /// Empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// State for `user`, created idle if this is the first time it is seen.
    pub fn entry(&mut self, user: &U) -> &mut PointerState<K> {
        self.users.entry(user.clone()).or_insert_with(|| {
            tracing::debug!(?user, "pointer state created");
            PointerState::new()
        })
    }

    /// State for `user`, if any.
    pub fn get(&self, user: &U) -> Option<&PointerState<K>> {
        self.users.get(user)
    }

    /// Forget `user`, returning its last state.
    pub fn remove(&mut self, user: &U) -> Option<PointerState<K>> {
        let state = self.users.remove(user);
        if state.is_some() {
            tracing::debug!(?user, "pointer state removed");
        }
        state
    }

    /// Forget every user.
    pub fn clear(&mut self) {
        self.users.clear();
    }

    /// Number of tracked users.
    pub fn len(&self) -> usize {
        self.users.len()
    }

    /// Returns `true` if no user is tracked.
    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    /// Iterate over `(user, state)` pairs in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (&U, &PointerState<K>)> {
        self.users.iter()
    }
}

impl<U: Clone + Eq + Hash + Debug, K: PartialEq> UserStates<U, K> {
    /// Drop `target` from every user's state.
    ///
    /// Returns how many users referenced it.
    pub fn forget_target(&mut self, target: &K) -> usize {
        self.users
            .values_mut()
            .map(|state| state.forget(target))
            .filter(|changed| *changed)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_state_is_idle() {
        let s: PointerState<u32> = PointerState::new();
        assert!(s.is_idle());
        assert_eq!(s, PointerState::default());
    }

    #[test]
    fn forget_clears_only_matching_fields() {
        let mut s = PointerState {
            click_target: Some(1_u32),
            drag_target: Some(1),
            hover_target: Some(2),
            focus_target: Some(1),
            cached_target: Some(2),
        };
        assert!(s.forget(&1));
        assert_eq!(s.click_target(), None);
        assert_eq!(s.drag_target(), None);
        assert_eq!(s.focus_target(), None);
        assert_eq!(s.hover_target(), Some(&2));
        assert_eq!(s.cached_target(), Some(&2));
        assert!(!s.forget(&1));
    }

    #[test]
    fn entry_creates_once_per_user() {
        let mut users: UserStates<u64, u32> = UserStates::new();
        users.entry(&7).hover_target = Some(3);
        users.entry(&7);
        users.entry(&8);
        assert_eq!(users.len(), 2);
        assert_eq!(users.get(&7).and_then(|s| s.hover_target()), Some(&3));
    }

    #[test]
    fn users_are_independent() {
        let mut users: UserStates<u64, u32> = UserStates::new();
        users.entry(&1).focus_target = Some(10);
        users.entry(&2).focus_target = Some(20);
        assert_eq!(users.get(&1).and_then(|s| s.focus_target()), Some(&10));
        assert_eq!(users.get(&2).and_then(|s| s.focus_target()), Some(&20));
    }

    #[test]
    fn forget_target_counts_affected_users() {
        let mut users: UserStates<u64, u32> = UserStates::new();
        users.entry(&1).hover_target = Some(5);
        users.entry(&2).drag_target = Some(5);
        users.entry(&3).hover_target = Some(6);
        assert_eq!(users.forget_target(&5), 2);
        assert!(users.get(&1).is_some_and(PointerState::is_idle));
        assert_eq!(users.get(&3).and_then(|s| s.hover_target()), Some(&6));
    }

    #[test]
    fn remove_unknown_user_is_none() {
        let mut users: UserStates<u64, u32> = UserStates::new();
        assert!(users.remove(&1).is_none());
        users.entry(&1);
        users.clear();
        assert!(users.is_empty());
    }
}
