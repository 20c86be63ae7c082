// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Understory Multipointer: event propagation for surfaces shared by many users.
//!
//! ## Overview
//!
//! Several people can point at the same surface at once: a wall display, a
//! shared whiteboard, a remote session with guests. Each of them has their own
//! hover, drag, click, and focus. This crate routes raw pointer and key events
//! from all of them to registered targets and derives the higher-level events
//! (enter, leave, click, focus, blur, drag) per user.
//!
//! ## Pieces
//!
//! - [`understory_collider::ColliderTree`] holds the registered targets, grouped
//!   by priority under composite parents.
//! - [`TargetHost`] is implemented by the caller. It reports each target's
//!   current bounds, which handler slots it implements, and runs them.
//! - [`UserStates`] keeps one [`PointerState`] per user, created on the user's
//!   first event.
//! - [`Dispatcher`] ties them together: [`Dispatcher::deliver`] takes one
//!   [`PointerEvent`], hit tests it against the tree, fires handlers, and
//!   returns a [`Delivery`].
//!
//! ## Propagation
//!
//! A delivery keeps going until a handler returns [`Outcome::Stop`] or a press
//! lands, so a move over overlapping targets reaches all of them from highest
//! priority to lowest, while a press reaches exactly one. See the
//! [`dispatcher`] module for the full rules.
//!
//! ## Example
//!
//! Two users over two overlapping targets.
//!
//! ```
//! use kurbo::{Point, Rect};
//! use understory_collider::BoundsLookup;
//! use understory_multipointer::{
//!     Dispatcher, Handler, Handlers, Outcome, PointerEvent, TargetHost,
//! };
//!
//! #[derive(Default)]
//! struct Wall {
//!     log: Vec<(&'static str, Handler, u8)>,
//! }
//!
//! impl BoundsLookup<&'static str> for Wall {
//!     fn bounds(&self, target: &&'static str) -> Option<Rect> {
//!         match *target {
//!             "sticky" => Some(Rect::new(10.0, 10.0, 30.0, 30.0)),
//!             "board" => Some(Rect::new(0.0, 0.0, 100.0, 100.0)),
//!             _ => None,
//!         }
//!     }
//! }
//!
//! impl TargetHost<&'static str, u8> for Wall {
//!     fn handlers(&self, _: &&'static str) -> Handlers {
//!         Handlers::MOUSE_ENTER | Handlers::MOUSE_DOWN
//!     }
//!     fn invoke(
//!         &mut self,
//!         target: &&'static str,
//!         handler: Handler,
//!         event: &PointerEvent<u8>,
//!     ) -> Outcome {
//!         self.log.push((*target, handler, event.user));
//!         Outcome::Continue
//!     }
//! }
//!
//! let mut wall = Wall::default();
//! let mut dispatcher: Dispatcher<&'static str, u8> = Dispatcher::new();
//! dispatcher.create_collider(None, "sticky", 10);
//! dispatcher.create_collider(None, "board", 0);
//!
//! // User 1 hovers the sticky note, which sits on top of the board.
//! dispatcher.deliver(&mut wall, &PointerEvent::pointer_move(1, Point::new(20.0, 20.0)));
//! // User 2 presses on the bare board.
//! dispatcher.deliver(&mut wall, &PointerEvent::press(2, Point::new(50.0, 50.0)));
//!
//! assert_eq!(
//!     wall.log,
//!     vec![
//!         ("sticky", Handler::MouseEnter, 1),
//!         ("board", Handler::MouseEnter, 1),
//!         ("board", Handler::MouseDown, 2),
//!     ]
//! );
//! assert_eq!(dispatcher.user_state(&2).unwrap().drag_target(), Some(&"board"));
//! assert_eq!(dispatcher.user_state(&1).unwrap().drag_target(), None);
//! ```
//!
//! ## Features
//!
//! - `std` (default): forwards `std` to Kurbo and `tracing`.
//! - `libm`: floating point for `no_std` builds through Kurbo.
//! - `serde`: `Serialize`/`Deserialize` for [`EventKind`] and [`PointerEvent`].
//!
//! Routing decisions are logged through `tracing` at `trace` level, and state
//! lifecycle changes at `debug` level.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

pub mod config;
pub mod dispatcher;
pub mod state;
pub mod target;
pub mod types;

pub use config::{DispatchConfig, KeyUpSlot};
pub use dispatcher::{DispatchStats, Dispatcher};
pub use state::{PointerState, UserStates};
pub use target::TargetHost;
pub use types::{Delivery, EventKind, Handler, Handlers, Outcome, PointerEvent};
pub use understory_collider::{BoundsLookup, ColliderId, ColliderTree};
