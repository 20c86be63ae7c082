// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Understory Collider: a priority-bucketed target registry for hit testing.
//!
//! Understory Collider is the registry half of a multi-user pointer router.
//! UI code registers interactive targets as they appear and unregisters them as
//! they go away; a dispatcher walks the tree to decide which target an input
//! event lands on.
//!
//! - Targets are opaque keys `K` (a widget id, an entity, a handle). The tree
//!   never stores geometry; current bounds come from a [`BoundsLookup`] at
//!   query time.
//! - Each node groups its children into priority buckets. Higher caller
//!   priorities are visited first; within a bucket children keep registration
//!   order.
//! - Nodes may nest. A node with children is a composite, which a dispatcher
//!   descends into rather than delivering to.
//! - A process-wide surface offset is subtracted from every bound before point
//!   tests, so a panned or scrolled surface hit tests in surface space.
//!
//! ## Priority encoding
//!
//! Buckets are stored under `MAX_PRIORITY - priority` and iterated in ascending
//! key order. A target registered at priority 10 is therefore tested before one
//! registered at priority 1 when both overlap a point. See [`MAX_PRIORITY`].
//!
//! ## Registration rules
//!
//! - [`ColliderTree::create_collider`] is idempotent for an identical
//!   `(parent, target, priority)`.
//! - A target lives in at most one bucket of one parent. Registering it again
//!   elsewhere moves the existing node.
//! - [`ColliderTree::remove_collider`] detaches a node and its subtree, drops
//!   the bucket if it became empty, and keeps the parent as an (possibly empty)
//!   container. Removing a stale identifier does nothing.
//!
//! ## Example
//!
//! ```rust
//! use kurbo::{Point, Rect};
//! use understory_collider::ColliderTree;
//!
//! #[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
//! enum Widget {
//!     Toolbar,
//!     Button,
//!     Canvas,
//! }
//!
//! let mut tree = ColliderTree::new();
//! let toolbar = tree.create_collider(None, Widget::Toolbar, 5);
//! tree.create_collider(Some(toolbar), Widget::Button, 0);
//! tree.create_collider(None, Widget::Canvas, 0);
//!
//! let bounds = |w: &Widget| match w {
//!     Widget::Toolbar => Some(Rect::new(0.0, 0.0, 400.0, 40.0)),
//!     Widget::Button => Some(Rect::new(10.0, 5.0, 40.0, 35.0)),
//!     Widget::Canvas => Some(Rect::new(0.0, 0.0, 400.0, 400.0)),
//! };
//!
//! // The toolbar group is visited before the canvas.
//! let root = tree.root();
//! let (first_priority, first) = tree.buckets(root).next().unwrap();
//! assert_eq!(first_priority, 5);
//! assert_eq!(first, &[toolbar]);
//! assert!(tree.is_composite(toolbar));
//!
//! // The surface is scrolled down by 20: the button now spans y = -15..15.
//! tree.set_offset(0.0, 20.0);
//! assert!(tree.contains_point(&bounds, &Widget::Button, Point::new(20.0, 10.0)));
//! assert!(!tree.contains_point(&bounds, &Widget::Button, Point::new(20.0, 30.0)));
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod tree;
mod types;
mod util;

pub use tree::ColliderTree;
pub use types::{BoundsLookup, ColliderId, MAX_PRIORITY};
