use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::settings::{CategorySettings, ExclusivityRule, FlaskConfig};
use crate::error::ConfigError;
use crate::host::{SoundId, TagId, TagResolver};
use crate::kernel::{FlaskCategory, SLOT_CAPACITY};

/// The human-editable file as written on disk. Every key is optional; a
/// missing key takes the per-category default of [`CategorySettings::defaults_for`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub general: GeneralSection,
    pub health: CategorySection,
    pub stamina: CategorySection,
    pub magick: CategorySection,
    pub other: CategorySection,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSection {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keep_item_tag: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CategorySection {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub player: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub npc: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notify: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parallel_cooldown: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anti_spam: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anti_spam_delay: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub regen_mult_base: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub regen_modifier_tag: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cap_base: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cap_modifier_tag: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cooldown_base: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cooldown_modifier_tag: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fail_audio: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fail_sound: Option<String>,
    /// Classification tag (health, stamina, magick).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    /// `other` only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclusive_tag: Option<String>,
    /// `other` only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revert_exclusive: Option<bool>,
}

impl CategorySection {
    /// Section with every scalar key spelled out, used for generated files.
    fn spelled_out(category: FlaskCategory) -> Self {
        let d = CategorySettings::defaults_for(category);
        let is_other = category == FlaskCategory::Other;
        Self {
            enabled: Some(d.enabled),
            player: Some(d.player),
            npc: Some(d.npc),
            notify: Some(d.notify),
            parallel_cooldown: Some(d.parallel_cooldown),
            anti_spam: Some(d.anti_spam),
            anti_spam_delay: Some(d.anti_spam_delay as f64),
            regen_mult_base: Some(d.regen_mult_base as f64),
            cap_base: Some(d.cap_base as i64),
            cooldown_base: Some(d.cooldown_base as f64),
            fail_audio: Some(false),
            revert_exclusive: is_other.then_some(false),
            ..Self::default()
        }
    }
}

impl FileConfig {
    pub fn spelled_out() -> Self {
        Self {
            general: GeneralSection::default(),
            health: CategorySection::spelled_out(FlaskCategory::Health),
            stamina: CategorySection::spelled_out(FlaskCategory::Stamina),
            magick: CategorySection::spelled_out(FlaskCategory::Magick),
            other: CategorySection::spelled_out(FlaskCategory::Other),
        }
    }

    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    pub fn render(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Reads `path`, or writes a fully spelled-out default file there if it
    /// does not exist yet.
    pub fn load_or_create(path: &Path) -> Result<Self, ConfigError> {
        let io_err = |source| ConfigError::Io { path: path.display().to_string(), source };

        if !path.exists() {
            info!("Configuration file {} not found, generating default.", path.display());
            let defaults = Self::spelled_out();
            fs::write(path, defaults.render()?).map_err(io_err)?;
            return Ok(defaults);
        }

        info!("Loading configuration from {}", path.display());
        let text = fs::read_to_string(path).map_err(io_err)?;
        Self::parse(&text)
    }

    pub fn section(&self, category: FlaskCategory) -> &CategorySection {
        match category {
            FlaskCategory::Health => &self.health,
            FlaskCategory::Stamina => &self.stamina,
            FlaskCategory::Magick => &self.magick,
            FlaskCategory::Other => &self.other,
        }
    }

    /// Resolves every reference and fills missing keys with defaults.
    /// Unresolvable references degrade to "absent" with a warning.
    pub fn resolve(&self, resolver: &dyn TagResolver) -> FlaskConfig {
        let mut config = FlaskConfig::default();

        for category in FlaskCategory::ALL {
            *config.category_mut(category) = resolve_category(category, self.section(category), resolver);
        }

        config.exclusivity = ExclusivityRule {
            tag: resolve_tag(resolver, "other.exclusive_tag", &self.other.exclusive_tag),
            revert: self.other.revert_exclusive.unwrap_or(false),
        };
        config.keep_item_tag = resolve_tag(resolver, "general.keep_item_tag", &self.general.keep_item_tag);

        config
    }
}

fn resolve_category(category: FlaskCategory, section: &CategorySection, resolver: &dyn TagResolver) -> CategorySettings {
    let d = CategorySettings::defaults_for(category);
    let key = |name: &str| format!("{}.{}", category, name);

    let mut cap_base = section.cap_base.map(|v| v.clamp(i32::MIN as i64, i32::MAX as i64) as i32).unwrap_or(d.cap_base);
    if cap_base > SLOT_CAPACITY as i32 {
        warn!(category = %category, configured = cap_base, ceiling = SLOT_CAPACITY, "cap_base exceeds the slot ceiling; clamping");
        cap_base = SLOT_CAPACITY as i32;
    }

    let fail_sound = if section.fail_audio.unwrap_or(false) {
        resolve_sound(resolver, &key("fail_sound"), &section.fail_sound)
    } else {
        None
    };

    let tag = if category == FlaskCategory::Other {
        if section.tag.is_some() {
            debug!("other.tag is ignored; other is the classification fallthrough");
        }
        None
    } else {
        resolve_tag(resolver, &key("tag"), &section.tag)
    };

    CategorySettings {
        enabled: section.enabled.unwrap_or(d.enabled),
        player: section.player.unwrap_or(d.player),
        npc: section.npc.unwrap_or(d.npc),
        notify: section.notify.clone().unwrap_or(d.notify),
        parallel_cooldown: section.parallel_cooldown.unwrap_or(d.parallel_cooldown),
        anti_spam: section.anti_spam.unwrap_or(d.anti_spam),
        anti_spam_delay: section.anti_spam_delay.map(|v| v as f32).unwrap_or(d.anti_spam_delay),
        regen_mult_base: section.regen_mult_base.map(|v| v as f32).unwrap_or(d.regen_mult_base),
        regen_modifier: resolve_tag(resolver, &key("regen_modifier_tag"), &section.regen_modifier_tag),
        cap_base,
        cap_modifier: resolve_tag(resolver, &key("cap_modifier_tag"), &section.cap_modifier_tag),
        cooldown_base: section.cooldown_base.map(|v| v as f32).unwrap_or(d.cooldown_base),
        cooldown_modifier: resolve_tag(resolver, &key("cooldown_modifier_tag"), &section.cooldown_modifier_tag),
        fail_sound,
        tag,
    }
}

fn non_empty(reference: &Option<String>) -> Option<&str> {
    reference.as_deref().map(str::trim).filter(|r| !r.is_empty())
}

fn resolve_tag(resolver: &dyn TagResolver, key: &str, reference: &Option<String>) -> Option<TagId> {
    let reference = non_empty(reference)?;
    let resolved = resolver.resolve_tag(reference);
    match resolved {
        Some(tag) => debug!("Resolved tag {} = {} -> {:#010x}", key, reference, tag.0),
        None => warn!("Tag {} = {} did not resolve; ignoring it", key, reference),
    }
    resolved
}

fn resolve_sound(resolver: &dyn TagResolver, key: &str, reference: &Option<String>) -> Option<SoundId> {
    let reference = non_empty(reference)?;
    let resolved = resolver.resolve_sound(reference);
    match resolved {
        Some(sound) => debug!("Resolved sound {} = {} -> {:#010x}", key, reference, sound.0),
        None => warn!("Sound {} = {} did not resolve; ignoring it", key, reference),
    }
    resolved
}
