//! Identifiers and the allocator the scheduler uses to issue them.

use serde::{Deserialize, Serialize};

/// Identity of an animation within one scheduler.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct AnimationId(pub u32);

/// Monotonic allocator for AnimationId.
/// Owned by a scheduler; identities are only unique within that scheduler.
#[derive(Default, Debug)]
pub struct IdAllocator {
    next_animation: u32,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn alloc_animation(&mut self) -> AnimationId {
        let id = AnimationId(self.next_animation);
        self.next_animation = self.next_animation.wrapping_add(1);
        id
    }

    /// Number of identities issued so far (modulo wrap-around).
    #[inline]
    pub fn issued(&self) -> u32 {
        self.next_animation
    }
}
