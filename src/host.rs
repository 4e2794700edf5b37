//! Boundary traits implemented by the host simulation. The core never learns
//! how actors, items, effects, or forms are stored.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::kernel::ActorId;

/// A resolved marker that can be attached to items and timed effects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TagId(pub u32);

/// A resolved sound descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SoundId(pub u32);

pub trait FlaskActor {
    fn id(&self) -> ActorId;

    /// Player-controlled kind (as opposed to NPC).
    fn is_player(&self) -> bool;

    /// The one actor the local user controls. Only it receives feedback.
    fn is_primary(&self) -> bool;

    /// Sum of magnitudes of every active timed effect carrying `tag`; 0.0 if none.
    fn sum_active_effect_magnitudes(&self, tag: TagId) -> f32;
}

pub trait FlaskItem {
    fn is_food(&self) -> bool;
    fn is_poison(&self) -> bool;
    fn has_tag(&self, tag: TagId) -> bool;
}

/// Turns human-written references from the config file into resolved ids.
pub trait TagResolver {
    fn resolve_tag(&self, reference: &str) -> Option<TagId>;
    fn resolve_sound(&self, reference: &str) -> Option<SoundId>;
}

/// User-visible failure feedback for the primary actor.
pub trait Feedback: Send + Sync {
    fn notify(&self, text: &str);
    fn play_sound(&self, sound: SoundId);
}

/// Receives one widget payload per category per primary-actor update.
pub trait WidgetSink: Send + Sync {
    fn update_flask(&self, payload: &str);
}

/// Feedback that only writes to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogFeedback;

impl Feedback for LogFeedback {
    fn notify(&self, text: &str) {
        info!("[NOTIFY] {}", text);
    }

    fn play_sound(&self, sound: SoundId) {
        info!("[SOUND] {:#010x}", sound.0);
    }
}

/// Widget that discards every frame.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoWidget;

impl WidgetSink for NoWidget {
    fn update_flask(&self, _payload: &str) {}
}

/// Resolves `0x<local id>~<plugin file>` references against a fixed load order.
/// The resolved id carries the plugin's load index in its top byte.
#[derive(Debug, Clone, Default)]
pub struct LoadOrderResolver {
    plugins: Vec<String>,
}

impl LoadOrderResolver {
    pub fn new<I, S>(plugins: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { plugins: plugins.into_iter().map(Into::into).collect() }
    }

    fn resolve(&self, reference: &str) -> Option<u32> {
        let (id, plugin) = parse_form_reference(reference)?;
        let index = self.plugins.iter().position(|p| p.eq_ignore_ascii_case(plugin))?;
        if index > 0xFE {
            return None;
        }
        Some(((index as u32) << 24) | (id & 0x00FF_FFFF))
    }
}

impl TagResolver for LoadOrderResolver {
    fn resolve_tag(&self, reference: &str) -> Option<TagId> {
        self.resolve(reference).map(TagId)
    }

    fn resolve_sound(&self, reference: &str) -> Option<SoundId> {
        self.resolve(reference).map(SoundId)
    }
}

/// Splits `0x800~Mod.esp` into `(0x800, "Mod.esp")`.
pub fn parse_form_reference(reference: &str) -> Option<(u32, &str)> {
    let (id, plugin) = reference.trim().split_once('~')?;
    let id = id.trim();
    let digits = id
        .strip_prefix("0x")
        .or_else(|| id.strip_prefix("0X"))
        .unwrap_or(id);
    let id = u32::from_str_radix(digits, 16).ok()?;
    let plugin = plugin.trim();
    if plugin.is_empty() {
        return None;
    }
    Some((id, plugin))
}
