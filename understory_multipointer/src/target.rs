// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The host seam: where targets' bounds and handlers live.

use understory_collider::BoundsLookup;

use crate::types::{Handler, Handlers, Outcome, PointerEvent};

/// Owner of the targets registered with a [`Dispatcher`](crate::Dispatcher).
///
/// The dispatcher only holds target keys. At delivery time it asks the host
/// for each key's current bounds (through [`BoundsLookup`]), which handler
/// slots it implements, and to run those handlers.
///
/// ## Contract
///
/// - [`TargetHost::invoke`] is only called for slots present in
///   [`TargetHost::handlers`] for that key.
/// - Returning [`Outcome::Stop`] from any invocation stops propagation for the
///   rest of the current delivery.
/// - Handlers run inline and must not re-enter the dispatcher.
pub trait TargetHost<K, U, D = ()>: BoundsLookup<K> {
    /// Handler slots `target` implements. Unknown keys should return an empty set.
    fn handlers(&self, target: &K) -> Handlers;

    /// Run `handler` on `target` for `event`.
    fn invoke(&mut self, target: &K, handler: Handler, event: &PointerEvent<U, D>) -> Outcome;
}
