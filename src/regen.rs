use std::sync::Arc;

use crate::config::FlaskConfig;
use crate::host::FlaskActor;
use crate::kernel::{FlaskCategory, FlaskStateCache};
use crate::policy::CategoryPolicy;

/// Per-tick cooldown recovery for one actor at a time.
pub struct RegenerationDriver {
    cache: Arc<FlaskStateCache>,
}

impl RegenerationDriver {
    pub fn new(cache: Arc<FlaskStateCache>) -> Self {
        Self { cache }
    }

    /// Advances the actor's slots and anti-spam timers by `elapsed` seconds.
    /// A zero, negative or non-finite delta does nothing.
    pub fn on_tick(&self, actor: &dyn FlaskActor, elapsed: f32, config: &FlaskConfig) {
        if !elapsed.is_finite() || elapsed <= 0.0 {
            return;
        }

        let deltas = FlaskCategory::ALL.map(|category| {
            let settings = config.category(category);
            let rate = CategoryPolicy::new(settings, actor).regen_rate();
            (category, rate * elapsed, settings.parallel_cooldown)
        });
        let now = self.cache.now();

        self.cache.get_or_create(actor.id(), |state| {
            state.touch(now);
            state.decay_anti_spam(elapsed);
            for (category, delta, parallel) in deltas {
                state.regenerate(category, delta, parallel);
            }
        });
    }
}
