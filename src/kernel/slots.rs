use std::fmt;

use serde::de::{self, SeqAccess, Visitor};
use serde::ser::SerializeTuple;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Hard ceiling on slots per category. Configured capacities are clamped to it.
pub const SLOT_CAPACITY: usize = 64;

/// One unit of flask capacity.
/// `remaining <= 0` is available, `remaining > 0` is recharging.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CooldownSlot {
    pub duration_at_start: f32,
    pub remaining: f32,
}

impl CooldownSlot {
    pub fn is_available(&self) -> bool {
        self.remaining <= 0.0
    }

    pub fn is_occupied(&self) -> bool {
        self.remaining > 0.0
    }

    fn occupy(&mut self, cooldown: f32) {
        self.duration_at_start = cooldown;
        self.remaining = cooldown;
    }

    /// 0.0 right after use, 1.0 when recharged.
    pub fn charge(&self) -> f32 {
        if !self.is_occupied() || self.duration_at_start <= 0.0 {
            return 1.0;
        }
        (1.0 - self.remaining / self.duration_at_start).clamp(0.0, 1.0)
    }
}

/// Fixed-size slot storage for one category. Only the first `limit` slots
/// (the policy-computed capacity) take part in acquisition and queries;
/// regeneration runs over the whole array so slots left behind by a shrinking
/// capacity still recover.
#[derive(Debug, Clone, PartialEq)]
pub struct SlotArray([CooldownSlot; SLOT_CAPACITY]);

impl Default for SlotArray {
    fn default() -> Self {
        SlotArray([CooldownSlot::default(); SLOT_CAPACITY])
    }
}

impl SlotArray {
    fn window(&self, limit: usize) -> &[CooldownSlot] {
        &self.0[..limit.min(SLOT_CAPACITY)]
    }

    pub fn slots(&self) -> &[CooldownSlot] {
        &self.0
    }

    pub fn slot(&self, index: usize) -> Option<&CooldownSlot> {
        self.0.get(index)
    }

    /// Occupies the first free slot below `limit`. Returns its index.
    pub fn acquire(&mut self, limit: usize, cooldown: f32) -> Option<usize> {
        let limit = limit.min(SLOT_CAPACITY);
        let index = self.0[..limit].iter().position(CooldownSlot::is_available)?;
        self.0[index].occupy(cooldown);
        Some(index)
    }

    pub fn available(&self, limit: usize) -> usize {
        self.window(limit).iter().filter(|s| s.is_available()).count()
    }

    pub fn occupied(&self, limit: usize) -> usize {
        self.window(limit).iter().filter(|s| s.is_occupied()).count()
    }

    /// Index of the occupied slot closest to being ready.
    fn soonest(&self, limit: usize) -> Option<usize> {
        self.window(limit)
            .iter()
            .enumerate()
            .filter(|(_, s)| s.is_occupied())
            .min_by(|(_, a), (_, b)| a.remaining.total_cmp(&b.remaining))
            .map(|(i, _)| i)
    }

    /// Seconds until the next slot frees up, 0.0 if none is recharging.
    pub fn next_cooldown(&self, limit: usize) -> f32 {
        self.soonest(limit).map(|i| self.0[i].remaining).unwrap_or(0.0)
    }

    pub fn charge_fraction(&self, limit: usize) -> f32 {
        self.soonest(limit).map(|i| self.0[i].charge()).unwrap_or(1.0)
    }

    /// Shifts the remaining cooldown of the soonest slot, or of every
    /// occupied slot, by `delta` seconds. Result stays within `[0, duration]`.
    pub fn modify(&mut self, limit: usize, delta: f32, all_slots: bool) {
        let limit = limit.min(SLOT_CAPACITY);
        let adjust = |slot: &mut CooldownSlot| {
            slot.remaining = (slot.remaining + delta).min(slot.duration_at_start).max(0.0);
        };

        if all_slots {
            self.0[..limit]
                .iter_mut()
                .filter(|s| s.is_occupied())
                .for_each(adjust);
        } else if let Some(i) = self.soonest(limit) {
            adjust(&mut self.0[i]);
        }
    }

    /// Parallel mode recharges every occupied slot, sequential mode only the
    /// first one in index order. Overshoot below zero is kept.
    pub fn regenerate(&mut self, delta: f32, parallel: bool) {
        if delta <= 0.0 {
            return;
        }
        for slot in self.0.iter_mut().filter(|s| s.is_occupied()) {
            slot.remaining -= delta;
            if !parallel {
                break;
            }
        }
    }
}

// serde only derives arrays up to 32 elements; encode as a fixed tuple so the
// binary layout carries no length prefix.
impl Serialize for SlotArray {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut tuple = serializer.serialize_tuple(SLOT_CAPACITY)?;
        for slot in &self.0 {
            tuple.serialize_element(slot)?;
        }
        tuple.end()
    }
}

impl<'de> Deserialize<'de> for SlotArray {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct SlotArrayVisitor;

        impl<'de> Visitor<'de> for SlotArrayVisitor {
            type Value = SlotArray;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                write!(f, "{} cooldown slots", SLOT_CAPACITY)
            }

            fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<SlotArray, A::Error> {
                let mut slots = [CooldownSlot::default(); SLOT_CAPACITY];
                for (i, slot) in slots.iter_mut().enumerate() {
                    *slot = seq
                        .next_element()?
                        .ok_or_else(|| de::Error::invalid_length(i, &self))?;
                }
                Ok(SlotArray(slots))
            }
        }

        deserializer.deserialize_tuple(SLOT_CAPACITY, SlotArrayVisitor)
    }
}
