use serde::{Deserialize, Serialize};

use crate::config::FlaskConfig;
use crate::host::FlaskActor;
use crate::kernel::{FlaskCategory, FlaskStateCache};
use crate::policy::CategoryPolicy;

/// What the widget draws for one category.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FlaskGauge {
    #[serde(rename = "typeIndex")]
    pub type_index: usize,
    /// Charge of the soonest-ready slot, 0.0 to 1.0.
    pub percent: f32,
    /// Slots available right now.
    pub count: usize,
    pub max_slots: usize,
    /// True once per rejected drink.
    #[serde(rename = "forceGlow")]
    pub force_glow: bool,
}

impl FlaskGauge {
    pub fn category(&self) -> Option<FlaskCategory> {
        FlaskCategory::from_index(self.type_index as i32)
    }

    pub fn to_payload(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Reads every category's gauge for `actor`, consuming its pending glow flags.
pub fn present(cache: &FlaskStateCache, actor: &dyn FlaskActor, config: &FlaskConfig) -> [FlaskGauge; FlaskCategory::COUNT] {
    let limits = FlaskCategory::ALL.map(|c| CategoryPolicy::new(config.category(c), actor).slot_limit());

    cache.get_or_create(actor.id(), |state| {
        FlaskCategory::ALL.map(|category| {
            let limit = limits[category.index()];
            let slots = state.slots(category);
            FlaskGauge {
                type_index: category.index(),
                percent: slots.charge_fraction(limit),
                count: slots.available(limit),
                max_slots: limit,
                force_glow: state.take_pending_glow(category),
            }
        })
    })
}
