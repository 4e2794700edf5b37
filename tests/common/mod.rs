#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use flaskcore::config::FlaskConfig;
use flaskcore::host::{Feedback, FlaskActor, FlaskItem, SoundId, TagId, WidgetSink};
use flaskcore::kernel::{ActorId, FlaskCategory, ManualClock};
use flaskcore::FlaskRuntime;

pub const HEALTH_TAG: TagId = TagId(0x0200_0800);
pub const STAMINA_TAG: TagId = TagId(0x0200_0801);
pub const MAGICK_TAG: TagId = TagId(0x0200_0802);
pub const EXCLUSIVE_TAG: TagId = TagId(0x0200_0803);
pub const KEEP_TAG: TagId = TagId(0x0200_0804);
pub const CAP_TAG: TagId = TagId(0x0200_0900);
pub const COOLDOWN_TAG: TagId = TagId(0x0200_0901);
pub const REGEN_TAG: TagId = TagId(0x0200_0902);

pub struct FakeActor {
    pub id: ActorId,
    pub player: bool,
    pub primary: bool,
    pub effects: HashMap<TagId, f32>,
}

impl FakeActor {
    pub fn player(id: ActorId) -> Self {
        Self { id, player: true, primary: true, effects: HashMap::new() }
    }

    pub fn npc(id: ActorId) -> Self {
        Self { id, player: false, primary: false, effects: HashMap::new() }
    }

    pub fn with_effect(mut self, tag: TagId, magnitude: f32) -> Self {
        *self.effects.entry(tag).or_default() += magnitude;
        self
    }
}

impl FlaskActor for FakeActor {
    fn id(&self) -> ActorId {
        self.id
    }

    fn is_player(&self) -> bool {
        self.player
    }

    fn is_primary(&self) -> bool {
        self.primary
    }

    fn sum_active_effect_magnitudes(&self, tag: TagId) -> f32 {
        self.effects.get(&tag).copied().unwrap_or(0.0)
    }
}

#[derive(Default)]
pub struct FakeItem {
    pub food: bool,
    pub poison: bool,
    pub tags: Vec<TagId>,
}

impl FakeItem {
    pub fn tagged(tags: &[TagId]) -> Self {
        Self { tags: tags.to_vec(), ..Self::default() }
    }

    pub fn health() -> Self {
        Self::tagged(&[HEALTH_TAG])
    }

    pub fn food() -> Self {
        Self { food: true, ..Self::default() }
    }

    pub fn poison() -> Self {
        Self { poison: true, ..Self::default() }
    }
}

impl FlaskItem for FakeItem {
    fn is_food(&self) -> bool {
        self.food
    }

    fn is_poison(&self) -> bool {
        self.poison
    }

    fn has_tag(&self, tag: TagId) -> bool {
        self.tags.contains(&tag)
    }
}

#[derive(Default)]
pub struct RecordingFeedback {
    pub notes: Mutex<Vec<String>>,
    pub sounds: Mutex<Vec<SoundId>>,
}

impl Feedback for RecordingFeedback {
    fn notify(&self, text: &str) {
        self.notes.lock().unwrap().push(text.to_string());
    }

    fn play_sound(&self, sound: SoundId) {
        self.sounds.lock().unwrap().push(sound);
    }
}

#[derive(Default)]
pub struct RecordingWidget {
    pub payloads: Mutex<Vec<String>>,
}

impl WidgetSink for RecordingWidget {
    fn update_flask(&self, payload: &str) {
        self.payloads.lock().unwrap().push(payload.to_string());
    }
}

/// Defaults with classification tags wired up.
pub fn tagged_config() -> FlaskConfig {
    let mut config = FlaskConfig::default();
    config.category_mut(FlaskCategory::Health).tag = Some(HEALTH_TAG);
    config.category_mut(FlaskCategory::Stamina).tag = Some(STAMINA_TAG);
    config.category_mut(FlaskCategory::Magick).tag = Some(MAGICK_TAG);
    config
}

pub struct Harness {
    pub clock: Arc<ManualClock>,
    pub feedback: Arc<RecordingFeedback>,
    pub widget: Arc<RecordingWidget>,
    pub runtime: FlaskRuntime,
}

pub fn harness(config: FlaskConfig) -> Harness {
    let clock = Arc::new(ManualClock::new(0));
    let feedback = Arc::new(RecordingFeedback::default());
    let widget = Arc::new(RecordingWidget::default());
    let runtime = FlaskRuntime::new(config, clock.clone(), feedback.clone(), widget.clone());
    Harness { clock, feedback, widget, runtime }
}
