//! Effective per-actor numbers derived from a category's base values plus the
//! magnitudes of tagged effects currently on the actor.

use tracing::debug;

use crate::config::CategorySettings;
use crate::host::{FlaskActor, TagId};
use crate::kernel::SLOT_CAPACITY;

fn modifier_sum(actor: &dyn FlaskActor, tag: Option<TagId>) -> f32 {
    tag.map_or(0.0, |tag| actor.sum_active_effect_magnitudes(tag))
}

/// One category's settings viewed through one actor.
#[derive(Clone, Copy)]
pub struct CategoryPolicy<'a> {
    settings: &'a CategorySettings,
    actor: &'a dyn FlaskActor,
}

impl<'a> CategoryPolicy<'a> {
    pub fn new(settings: &'a CategorySettings, actor: &'a dyn FlaskActor) -> Self {
        Self { settings, actor }
    }

    pub fn effective_capacity(&self) -> i32 {
        let raw = self.settings.cap_base as f32 + modifier_sum(self.actor, self.settings.cap_modifier);
        raw.round().max(0.0) as i32
    }

    /// Seconds.
    pub fn effective_cooldown(&self) -> f32 {
        (self.settings.cooldown_base + modifier_sum(self.actor, self.settings.cooldown_modifier)).max(0.0)
    }

    /// Percent form, as reported to external callers.
    pub fn regen_multiplier_raw(&self) -> f32 {
        (self.settings.regen_mult_base + modifier_sum(self.actor, self.settings.regen_modifier)).max(0.0)
    }

    /// Fraction of a second of cooldown recovered per real second.
    pub fn regen_rate(&self) -> f32 {
        self.regen_multiplier_raw() / 100.0
    }

    /// Number of leading slots in use, never past the fixed array.
    pub fn slot_limit(&self) -> usize {
        let capacity = self.effective_capacity() as usize;
        if capacity > SLOT_CAPACITY {
            debug!(actor = self.actor.id(), capacity, "effective capacity clamped to {}", SLOT_CAPACITY);
            return SLOT_CAPACITY;
        }
        capacity
    }
}
