//! Read/write surface for external scripts and plugins.
//!
//! Every call tolerates a missing actor and an unknown category index by
//! returning a neutral value instead of failing.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::debug;

use crate::config::ConfigStore;
use crate::consumption::{bypasses_exclusivity, classify, ConsumptionService};
use crate::host::{FlaskActor, FlaskItem};
use crate::kernel::{FlaskCategory, FlaskStateCache};
use crate::policy::CategoryPolicy;

/// Identity of an external plugin registering callbacks.
pub type PluginHandle = u32;

pub type GlowListener = Arc<dyn Fn(FlaskCategory) + Send + Sync>;

/// Callbacks asked to flash a category's gauge, at most one per plugin.
#[derive(Default)]
pub struct GlowListeners {
    listeners: Mutex<BTreeMap<PluginHandle, GlowListener>>,
}

impl GlowListeners {
    fn lock(&self) -> MutexGuard<'_, BTreeMap<PluginHandle, GlowListener>> {
        self.listeners.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Registers `listener` for `plugin`, replacing any earlier one.
    pub fn register(&self, plugin: PluginHandle, listener: GlowListener) {
        self.lock().insert(plugin, listener);
    }

    pub fn unregister(&self, plugin: PluginHandle) -> bool {
        self.lock().remove(&plugin).is_some()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Calls every listener. Returns how many ran.
    pub fn emit(&self, category: FlaskCategory) -> usize {
        // Listeners run outside the lock so they may register or unregister.
        let listeners: Vec<GlowListener> = self.lock().values().cloned().collect();
        for listener in &listeners {
            listener(category);
        }
        listeners.len()
    }
}

/// Category number and whether drinking it costs a slot, as reported by
/// [`FlaskApi::classify_item`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlaskInfo {
    /// Category index, or -1 for anything that is not a flask.
    pub category: i32,
    pub uses_slot: bool,
}

impl FlaskInfo {
    pub const NOT_A_FLASK: FlaskInfo = FlaskInfo { category: -1, uses_slot: false };
}

pub struct FlaskApi {
    cache: Arc<FlaskStateCache>,
    config: Arc<ConfigStore>,
    consumption: Arc<ConsumptionService>,
    glow: Arc<GlowListeners>,
}

impl FlaskApi {
    pub fn new(
        cache: Arc<FlaskStateCache>,
        config: Arc<ConfigStore>,
        consumption: Arc<ConsumptionService>,
        glow: Arc<GlowListeners>,
    ) -> Self {
        Self { cache, config, consumption, glow }
    }

    fn category(index: i32) -> Option<FlaskCategory> {
        let category = FlaskCategory::from_index(index);
        if category.is_none() {
            debug!(index, "ignoring unknown flask category index");
        }
        category
    }

    fn slot_limit(&self, actor: &dyn FlaskActor, category: FlaskCategory) -> usize {
        let config = self.config.snapshot();
        CategoryPolicy::new(config.category(category), actor).slot_limit()
    }

    /// Adds `amount` seconds to the soonest-ready occupied slot, or to every
    /// occupied slot when `all_slots` is set. Negative amounts speed recovery.
    pub fn modify_cooldown(&self, actor: Option<&dyn FlaskActor>, category: i32, amount: f32, all_slots: bool) {
        let (Some(actor), Some(category)) = (actor, Self::category(category)) else {
            return;
        };
        if !amount.is_finite() {
            return;
        }
        let limit = self.slot_limit(actor, category);
        self.cache
            .get_or_create(actor.id(), |state| state.slots_mut(category).modify(limit, amount, all_slots));
    }

    /// Seconds until the soonest occupied slot is ready; 0.0 if none is occupied.
    pub fn next_cooldown(&self, actor: Option<&dyn FlaskActor>, category: i32) -> f32 {
        let (Some(actor), Some(category)) = (actor, Self::category(category)) else {
            return 0.0;
        };
        let limit = self.slot_limit(actor, category);
        self.cache
            .inspect(actor.id(), |state| state.slots(category).next_cooldown(limit))
            .unwrap_or(0.0)
    }

    pub fn max_slots(&self, actor: Option<&dyn FlaskActor>, category: i32) -> i32 {
        let (Some(actor), Some(category)) = (actor, Self::category(category)) else {
            return 0;
        };
        self.slot_limit(actor, category) as i32
    }

    pub fn current_slots(&self, actor: Option<&dyn FlaskActor>, category: i32) -> i32 {
        let (Some(actor), Some(category)) = (actor, Self::category(category)) else {
            return 0;
        };
        let limit = self.slot_limit(actor, category);
        self.cache
            .inspect(actor.id(), |state| state.slots(category).available(limit) as i32)
            .unwrap_or(limit as i32)
    }

    /// Percent form, un-divided.
    pub fn regen_multiplier(&self, actor: Option<&dyn FlaskActor>, category: i32) -> f32 {
        let (Some(actor), Some(category)) = (actor, Self::category(category)) else {
            return 0.0;
        };
        let config = self.config.snapshot();
        CategoryPolicy::new(config.category(category), actor).regen_multiplier_raw()
    }

    /// Charge of the soonest-ready slot; 1.0 when nothing recharges.
    pub fn cooldown_fraction(&self, actor: Option<&dyn FlaskActor>, category: i32) -> f32 {
        let (Some(actor), Some(category)) = (actor, Self::category(category)) else {
            return 1.0;
        };
        let limit = self.slot_limit(actor, category);
        self.cache
            .inspect(actor.id(), |state| state.slots(category).charge_fraction(limit))
            .unwrap_or(1.0)
    }

    pub fn classify_item(&self, item: Option<&dyn FlaskItem>) -> FlaskInfo {
        let Some(item) = item else {
            return FlaskInfo::NOT_A_FLASK;
        };
        let config = self.config.snapshot();
        let Some(category) = classify(item, &config) else {
            return FlaskInfo::NOT_A_FLASK;
        };

        let bypassed = category == FlaskCategory::Other && bypasses_exclusivity(item, &config);
        FlaskInfo {
            category: category.index() as i32,
            uses_slot: config.category(category).enabled && !bypassed,
        }
    }

    /// Asks every registered plugin to flash the category. Returns how many were called.
    pub fn play_glow(&self, category: i32) -> usize {
        Self::category(category).map_or(0, |category| self.glow.emit(category))
    }

    pub fn register_glow_listener(&self, plugin: PluginHandle, listener: GlowListener) {
        self.glow.register(plugin, listener);
    }

    pub fn unregister_glow_listener(&self, plugin: PluginHandle) -> bool {
        self.glow.unregister(plugin)
    }

    /// Takes a slot directly, skipping classification and the enable switches.
    /// Returns false only on rejection; a missing actor or unknown category is accepted.
    pub fn consume_slot(&self, actor: Option<&dyn FlaskActor>, category: i32) -> bool {
        let (Some(actor), Some(category)) = (actor, Self::category(category)) else {
            return true;
        };
        let config = self.config.snapshot();
        self.consumption.consume_slot(actor, category, &config).is_accepted()
    }
}
