use crate::host::{SoundId, TagId};
use crate::kernel::FlaskCategory;

/// Resolved tunables of one flask category.
#[derive(Debug, Clone, PartialEq)]
pub struct CategorySettings {
    pub enabled: bool,
    pub player: bool,
    pub npc: bool,
    /// Shown to the primary actor when no slot is free. Empty disables it.
    pub notify: String,
    pub parallel_cooldown: bool,
    pub anti_spam: bool,
    /// Seconds.
    pub anti_spam_delay: f32,
    /// Percent; 100.0 regenerates one second of cooldown per second.
    pub regen_mult_base: f32,
    pub regen_modifier: Option<TagId>,
    pub cap_base: i32,
    pub cap_modifier: Option<TagId>,
    /// Seconds.
    pub cooldown_base: f32,
    pub cooldown_modifier: Option<TagId>,
    /// Played on a no-free-slot rejection of the primary actor.
    pub fail_sound: Option<SoundId>,
    /// Classification tag. Ignored for `Other`, which is the fallthrough.
    pub tag: Option<TagId>,
}

impl CategorySettings {
    pub fn defaults_for(category: FlaskCategory) -> Self {
        let base = Self {
            enabled: true,
            player: true,
            npc: false,
            notify: String::new(),
            parallel_cooldown: false,
            anti_spam: true,
            anti_spam_delay: 0.1,
            regen_mult_base: 100.0,
            regen_modifier: None,
            cap_base: 2,
            cap_modifier: None,
            cooldown_base: 30.0,
            cooldown_modifier: None,
            fail_sound: None,
            tag: None,
        };

        match category {
            FlaskCategory::Health => Self {
                notify: "I can't drink any more Healing Flasks.".into(),
                ..base
            },
            FlaskCategory::Stamina => Self {
                notify: "I can't drink any more Flasks of Vigor.".into(),
                ..base
            },
            FlaskCategory::Magick => Self {
                notify: "I can't drink any more Flasks of Magick.".into(),
                ..base
            },
            FlaskCategory::Other => Self {
                notify: "I can't drink any more potions.".into(),
                anti_spam: false,
                cap_base: 5,
                cooldown_base: 180.0,
                ..base
            },
        }
    }

    /// Whether the slot system governs this actor kind at all.
    pub fn applies_to(&self, is_player: bool) -> bool {
        self.enabled && if is_player { self.player } else { self.npc }
    }

    pub fn anti_spam_delay(&self) -> Option<f32> {
        self.anti_spam.then_some(self.anti_spam_delay)
    }
}

/// Inclusion/exclusion switch for the `Other` category.
///
/// With `revert == false` items carrying `tag` bypass slot consumption; with
/// `revert == true` only items carrying `tag` consume slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExclusivityRule {
    pub tag: Option<TagId>,
    pub revert: bool,
}

/// Immutable snapshot consulted by every core operation.
#[derive(Debug, Clone, PartialEq)]
pub struct FlaskConfig {
    categories: [CategorySettings; FlaskCategory::COUNT],
    pub exclusivity: ExclusivityRule,
    /// Items carrying this tag stay in the inventory after being drunk.
    pub keep_item_tag: Option<TagId>,
}

impl Default for FlaskConfig {
    fn default() -> Self {
        Self {
            categories: FlaskCategory::ALL.map(CategorySettings::defaults_for),
            exclusivity: ExclusivityRule::default(),
            keep_item_tag: None,
        }
    }
}

impl FlaskConfig {
    pub fn category(&self, category: FlaskCategory) -> &CategorySettings {
        &self.categories[category.index()]
    }

    pub fn category_mut(&mut self, category: FlaskCategory) -> &mut CategorySettings {
        &mut self.categories[category.index()]
    }
}
