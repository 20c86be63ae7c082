// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Event, handler-slot, and outcome types shared by the dispatcher and hosts.

use kurbo::Point;

/// Raw input primitive carried by a [`PointerEvent`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EventKind {
    /// Pointer moved.
    PointerMove,
    /// A pointer button went down.
    PointerPress,
    /// A pointer button came up.
    PointerRelease,
    /// Wheel or trackpad scroll.
    PointerScroll,
    /// A key went down.
    KeyDown,
    /// A key came up.
    KeyUp,
}

/// One raw input event from one user.
///
/// The dispatcher never mutates the event. Routing results come back as a
/// [`Delivery`] instead.
///
/// `D` carries whatever payload the transport attached (button, wheel delta,
/// key code); the dispatcher passes it through to handlers untouched.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PointerEvent<U, D = ()> {
    /// What happened.
    pub kind: EventKind,
    /// Pointer position in surface coordinates.
    pub position: Point,
    /// The user the event belongs to.
    pub user: U,
    /// Transport payload.
    pub data: D,
}

impl<U> PointerEvent<U> {
    /// Create an event without payload.
    pub fn new(kind: EventKind, position: Point, user: U) -> Self {
        Self {
            kind,
            position,
            user,
            data: (),
        }
    }

    /// A [`EventKind::PointerMove`] event.
    pub fn pointer_move(user: U, position: Point) -> Self {
        Self::new(EventKind::PointerMove, position, user)
    }

    /// A [`EventKind::PointerPress`] event.
    pub fn press(user: U, position: Point) -> Self {
        Self::new(EventKind::PointerPress, position, user)
    }

    /// A [`EventKind::PointerRelease`] event.
    pub fn release(user: U, position: Point) -> Self {
        Self::new(EventKind::PointerRelease, position, user)
    }

    /// A [`EventKind::PointerScroll`] event.
    pub fn scroll(user: U, position: Point) -> Self {
        Self::new(EventKind::PointerScroll, position, user)
    }

    /// A [`EventKind::KeyDown`] event at the user's last known position.
    pub fn key_down(user: U, position: Point) -> Self {
        Self::new(EventKind::KeyDown, position, user)
    }

    /// A [`EventKind::KeyUp`] event at the user's last known position.
    pub fn key_up(user: U, position: Point) -> Self {
        Self::new(EventKind::KeyUp, position, user)
    }
}

impl<U, D> PointerEvent<U, D> {
    /// Replace the payload.
    pub fn with_data<E>(self, data: E) -> PointerEvent<U, E> {
        PointerEvent {
            kind: self.kind,
            position: self.position,
            user: self.user,
            data,
        }
    }
}

/// A handler slot on a target.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Handler {
    /// Pointer moved over the target.
    MouseMove,
    /// Pointer entered the target.
    MouseEnter,
    /// Pointer left the target.
    MouseLeave,
    /// Press landed on the target.
    MouseDown,
    /// Release landed on the target.
    MouseUp,
    /// Press and release both landed on the target.
    Click,
    /// Target gained focus after a click.
    Focus,
    /// Target lost focus to a later press.
    Blur,
    /// Pointer moved while the target holds the drag.
    Drag,
    /// Scroll over the target.
    MouseWheel,
    /// Key went down while the pointer was over the target.
    KeyDown,
    /// Key came up while the pointer was over the target.
    KeyUp,
}

impl Handler {
    /// The capability flag for this slot.
    pub const fn flag(self) -> Handlers {
        match self {
            Self::MouseMove => Handlers::MOUSE_MOVE,
            Self::MouseEnter => Handlers::MOUSE_ENTER,
            Self::MouseLeave => Handlers::MOUSE_LEAVE,
            Self::MouseDown => Handlers::MOUSE_DOWN,
            Self::MouseUp => Handlers::MOUSE_UP,
            Self::Click => Handlers::CLICK,
            Self::Focus => Handlers::FOCUS,
            Self::Blur => Handlers::BLUR,
            Self::Drag => Handlers::DRAG,
            Self::MouseWheel => Handlers::MOUSE_WHEEL,
            Self::KeyDown => Handlers::KEY_DOWN,
            Self::KeyUp => Handlers::KEY_UP,
        }
    }
}

bitflags::bitflags! {
    /// Set of handler slots a target implements.
    ///
    /// A slot that is absent is skipped without error.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct Handlers: u16 {
        /// See [`Handler::MouseMove`].
        const MOUSE_MOVE  = 1 << 0;
        /// See [`Handler::MouseEnter`].
        const MOUSE_ENTER = 1 << 1;
        /// See [`Handler::MouseLeave`].
        const MOUSE_LEAVE = 1 << 2;
        /// See [`Handler::MouseDown`].
        const MOUSE_DOWN  = 1 << 3;
        /// See [`Handler::MouseUp`].
        const MOUSE_UP    = 1 << 4;
        /// See [`Handler::Click`].
        const CLICK       = 1 << 5;
        /// See [`Handler::Focus`].
        const FOCUS       = 1 << 6;
        /// See [`Handler::Blur`].
        const BLUR        = 1 << 7;
        /// See [`Handler::Drag`].
        const DRAG        = 1 << 8;
        /// See [`Handler::MouseWheel`].
        const MOUSE_WHEEL = 1 << 9;
        /// See [`Handler::KeyDown`].
        const KEY_DOWN    = 1 << 10;
        /// See [`Handler::KeyUp`].
        const KEY_UP      = 1 << 11;
    }
}

impl Default for Handlers {
    fn default() -> Self {
        Self::empty()
    }
}

/// Result of a handler invocation.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum Outcome {
    /// Keep propagating.
    #[default]
    Continue,
    /// Stop propagation for the rest of this delivery.
    Stop,
}

/// What happened to one delivered event.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Delivery {
    /// At least one target was selected as the recipient.
    pub handled: bool,
    /// Propagation was never stopped.
    pub propagate: bool,
}
