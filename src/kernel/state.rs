use serde::{Deserialize, Serialize};

use super::category::FlaskCategory;
use super::slots::SlotArray;
use super::time::Millis;

/// Per-actor flask bookkeeping. Field order is the persisted byte layout:
/// slot arrays (Health, Stamina, Magick, Other), anti-spam timers,
/// pending-glow flags, last-touched stamp.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ActorFlaskState {
    slots: [SlotArray; FlaskCategory::COUNT],
    anti_spam: [f32; FlaskCategory::COUNT],
    pending_glow: [bool; FlaskCategory::COUNT],
    pub last_touched: Millis,
}

impl ActorFlaskState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn touch(&mut self, now: Millis) {
        self.last_touched = now;
    }

    pub fn slots(&self, category: FlaskCategory) -> &SlotArray {
        &self.slots[category.index()]
    }

    pub fn slots_mut(&mut self, category: FlaskCategory) -> &mut SlotArray {
        &mut self.slots[category.index()]
    }

    // --- Anti-spam ---

    pub fn anti_spam_remaining(&self, category: FlaskCategory) -> f32 {
        self.anti_spam[category.index()]
    }

    pub fn is_anti_spam_active(&self, category: FlaskCategory) -> bool {
        self.anti_spam[category.index()] > 0.0
    }

    pub fn arm_anti_spam(&mut self, category: FlaskCategory, delay: f32) {
        self.anti_spam[category.index()] = delay.max(0.0);
    }

    /// Anti-spam decays in real seconds, independent of regeneration speed.
    pub fn decay_anti_spam(&mut self, elapsed: f32) {
        for timer in self.anti_spam.iter_mut().filter(|t| **t > 0.0) {
            *timer = (*timer - elapsed).max(0.0);
        }
    }

    // --- Failure glow ---

    pub fn mark_failed(&mut self, category: FlaskCategory) {
        self.pending_glow[category.index()] = true;
    }

    pub fn has_pending_glow(&self, category: FlaskCategory) -> bool {
        self.pending_glow[category.index()]
    }

    /// At-most-once read: returns the flag and clears it.
    pub fn take_pending_glow(&mut self, category: FlaskCategory) -> bool {
        std::mem::take(&mut self.pending_glow[category.index()])
    }

    // --- Slots ---

    /// Occupies a free slot below `limit`, arming anti-spam on success.
    pub fn try_acquire(
        &mut self,
        category: FlaskCategory,
        limit: usize,
        cooldown: f32,
        anti_spam_delay: Option<f32>,
    ) -> Option<usize> {
        let index = self.slots_mut(category).acquire(limit, cooldown)?;
        if let Some(delay) = anti_spam_delay {
            self.arm_anti_spam(category, delay);
        }
        Some(index)
    }

    pub fn regenerate(&mut self, category: FlaskCategory, delta: f32, parallel: bool) {
        self.slots_mut(category).regenerate(delta, parallel);
    }
}
