use std::sync::Arc;

use tracing::debug;

use crate::config::FlaskConfig;
use crate::host::{Feedback, FlaskActor, FlaskItem};
use crate::kernel::{FlaskCategory, FlaskStateCache};
use crate::policy::CategoryPolicy;

/// Sorts a consumable into a category. Food and poison are not flasks.
/// Health, Stamina and Magick tags are tested in that order; everything else is `Other`.
pub fn classify(item: &dyn FlaskItem, config: &FlaskConfig) -> Option<FlaskCategory> {
    if item.is_food() || item.is_poison() {
        return None;
    }

    let category = FlaskCategory::CLASSIFIED
        .into_iter()
        .find(|c| config.category(*c).tag.is_some_and(|tag| item.has_tag(tag)))
        .unwrap_or(FlaskCategory::Other);
    Some(category)
}

/// Whether an `Other` item skips slot consumption under the exclusivity rule.
pub fn bypasses_exclusivity(item: &dyn FlaskItem, config: &FlaskConfig) -> bool {
    let has_tag = config.exclusivity.tag.is_some_and(|tag| item.has_tag(tag));
    config.exclusivity.revert != has_tag
}

/// Whether a drunk item stays in the inventory.
pub fn keeps_item(item: &dyn FlaskItem, config: &FlaskConfig) -> bool {
    config.keep_item_tag.is_some_and(|tag| item.has_tag(tag))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcceptReason {
    NotAFlask,
    ExclusivityBypass,
    CategoryDisabled,
    SlotAcquired { category: FlaskCategory, slot: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    AntiSpam(FlaskCategory),
    NoFreeSlot(FlaskCategory),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Accepted(AcceptReason),
    Rejected(RejectReason),
}

impl Verdict {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Verdict::Accepted(_))
    }
}

/// Accept/reject decisions for drink attempts.
pub struct ConsumptionService {
    cache: Arc<FlaskStateCache>,
    feedback: Arc<dyn Feedback>,
}

impl ConsumptionService {
    pub fn new(cache: Arc<FlaskStateCache>, feedback: Arc<dyn Feedback>) -> Self {
        Self { cache, feedback }
    }

    pub fn attempt_consume(&self, actor: &dyn FlaskActor, item: &dyn FlaskItem, config: &FlaskConfig) -> Verdict {
        let Some(category) = classify(item, config) else {
            return Verdict::Accepted(AcceptReason::NotAFlask);
        };

        if category == FlaskCategory::Other && bypasses_exclusivity(item, config) {
            return Verdict::Accepted(AcceptReason::ExclusivityBypass);
        }

        if !config.category(category).applies_to(actor.is_player()) {
            return Verdict::Accepted(AcceptReason::CategoryDisabled);
        }

        self.consume_slot(actor, category, config)
    }

    /// Slot acquisition without classification, as used by the direct API.
    pub fn consume_slot(&self, actor: &dyn FlaskActor, category: FlaskCategory, config: &FlaskConfig) -> Verdict {
        let settings = config.category(category);
        let policy = CategoryPolicy::new(settings, actor);
        let limit = policy.slot_limit();
        let cooldown = policy.effective_cooldown();
        let now = self.cache.now();

        let verdict = self.cache.get_or_create(actor.id(), |state| {
            state.touch(now);

            if settings.anti_spam && state.is_anti_spam_active(category) {
                return Verdict::Rejected(RejectReason::AntiSpam(category));
            }

            match state.try_acquire(category, limit, cooldown, settings.anti_spam_delay()) {
                Some(slot) => Verdict::Accepted(AcceptReason::SlotAcquired { category, slot }),
                None => {
                    state.mark_failed(category);
                    Verdict::Rejected(RejectReason::NoFreeSlot(category))
                }
            }
        });

        match verdict {
            Verdict::Rejected(RejectReason::NoFreeSlot(_)) if actor.is_primary() => {
                if !settings.notify.is_empty() {
                    self.feedback.notify(&settings.notify);
                }
                if let Some(sound) = settings.fail_sound {
                    self.feedback.play_sound(sound);
                }
            }
            Verdict::Rejected(reason) => debug!(actor = actor.id(), ?reason, "consumption rejected"),
            Verdict::Accepted(_) => {}
        }

        verdict
    }
}
