use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use tracing::{debug, warn};

use crate::api::GlowListeners;
use crate::config::ConfigStore;
use crate::consumption::{keeps_item, ConsumptionService, Verdict};
use crate::host::{FlaskActor, FlaskItem, WidgetSink};
use crate::kernel::{FlaskCategory, FlaskStateCache};
use crate::presentation::{present, FlaskGauge};
use crate::regen::RegenerationDriver;

/// Frame delta used for NPCs before the first player frame arrives.
pub const INITIAL_FRAME_DELTA: f32 = 0.1;

/// Entry points the host calls from its update and drink notifications.
pub struct HostHooks {
    cache: Arc<FlaskStateCache>,
    config: Arc<ConfigStore>,
    regen: RegenerationDriver,
    consumption: Arc<ConsumptionService>,
    widget: Arc<dyn WidgetSink>,
    glow: Arc<GlowListeners>,
    // f32 bits of the latest player frame delta.
    last_player_delta: AtomicU32,
}

impl HostHooks {
    pub fn new(
        cache: Arc<FlaskStateCache>,
        config: Arc<ConfigStore>,
        consumption: Arc<ConsumptionService>,
        widget: Arc<dyn WidgetSink>,
        glow: Arc<GlowListeners>,
    ) -> Self {
        Self {
            regen: RegenerationDriver::new(cache.clone()),
            cache,
            config,
            consumption,
            widget,
            glow,
            last_player_delta: AtomicU32::new(INITIAL_FRAME_DELTA.to_bits()),
        }
    }

    pub fn last_player_delta(&self) -> f32 {
        f32::from_bits(self.last_player_delta.load(Ordering::Relaxed))
    }

    /// NPC update. NPCs regenerate at the pace of the latest player frame,
    /// not their own (possibly throttled) update delta.
    pub fn on_actor_update(&self, actor: Option<&dyn FlaskActor>, delta: f32) {
        let Some(actor) = actor else { return };
        if delta == 0.0 {
            return;
        }
        let config = self.config.snapshot();
        self.regen.on_tick(actor, self.last_player_delta(), &config);
    }

    /// Player update. Records the frame delta, regenerates, and for the
    /// primary actor pushes a fresh widget frame. Returns that frame.
    pub fn on_player_update(&self, actor: Option<&dyn FlaskActor>, delta: f32) -> Option<[FlaskGauge; FlaskCategory::COUNT]> {
        self.last_player_delta.store(delta.to_bits(), Ordering::Relaxed);

        let actor = actor?;
        if delta == 0.0 {
            return None;
        }

        let config = self.config.snapshot();
        self.regen.on_tick(actor, delta, &config);

        if !actor.is_primary() {
            return None;
        }

        let gauges = present(&self.cache, actor, &config);
        for gauge in &gauges {
            match gauge.to_payload() {
                Ok(payload) => self.widget.update_flask(&payload),
                Err(e) => warn!(error = %e, "could not encode widget frame"),
            }
            if gauge.force_glow {
                if let Some(category) = gauge.category() {
                    self.glow.emit(category);
                }
            }
        }
        Some(gauges)
    }

    /// Drink notification. Returns whether the host should let the drink happen.
    pub fn on_drink(&self, actor: Option<&dyn FlaskActor>, item: Option<&dyn FlaskItem>) -> bool {
        let (Some(actor), Some(item)) = (actor, item) else {
            return true;
        };
        let config = self.config.snapshot();
        let verdict = self.consumption.attempt_consume(actor, item, &config);
        if let Verdict::Accepted(reason) = verdict {
            debug!(actor = actor.id(), ?reason, "drink accepted");
        }
        verdict.is_accepted()
    }

    /// Whether the host should leave a drunk item in the inventory.
    pub fn keeps_item(&self, item: Option<&dyn FlaskItem>) -> bool {
        item.is_some_and(|item| keeps_item(item, &self.config.snapshot()))
    }
}
