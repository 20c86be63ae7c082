// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dispatcher configuration.

/// Which handler slot a [`KeyUp`](crate::EventKind::KeyUp) event is routed to.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum KeyUpSlot {
    /// Route key-up to [`Handler::KeyUp`](crate::Handler::KeyUp).
    #[default]
    KeyUp,
    /// Route key-up to [`Handler::KeyDown`](crate::Handler::KeyDown).
    ///
    /// Compatibility mode for hosts written against the earlier behaviour,
    /// where both key events reached the key-down handler.
    KeyDown,
}

/// Tunables for a [`Dispatcher`](crate::Dispatcher).
///
/// ```
/// use understory_multipointer::{DispatchConfig, KeyUpSlot};
///
/// let config = DispatchConfig::new()
///     .with_key_up(KeyUpSlot::KeyDown)
///     .with_hit_cache(false);
/// assert_eq!(config.key_up, KeyUpSlot::KeyDown);
/// assert!(!config.hit_cache);
/// ```
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct DispatchConfig {
    /// Slot used for key-up events.
    pub key_up: KeyUpSlot,
    /// Remember the last target each user hit and test it before walking the tree.
    ///
    /// When disabled no target is ever remembered, so every delivery walks the
    /// whole tree.
    pub hit_cache: bool,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            key_up: KeyUpSlot::default(),
            hit_cache: true,
        }
    }
}

impl DispatchConfig {
    /// Default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Choose the slot for key-up events.
    pub fn with_key_up(mut self, slot: KeyUpSlot) -> Self {
        self.key_up = slot;
        self
    }

    /// Enable or disable the per-user hit cache.
    pub fn with_hit_cache(mut self, enabled: bool) -> Self {
        self.hit_cache = enabled;
        self
    }
}
