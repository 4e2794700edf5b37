use serde::{Deserialize, Serialize};

/// The four fixed flask classes. The discriminant doubles as the array index
/// and as the wire index used by scripting callers and the widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FlaskCategory {
    Health = 0,
    Stamina = 1,
    Magick = 2,
    Other = 3,
}

impl FlaskCategory {
    pub const COUNT: usize = 4;

    pub const ALL: [FlaskCategory; Self::COUNT] = [
        FlaskCategory::Health,
        FlaskCategory::Stamina,
        FlaskCategory::Magick,
        FlaskCategory::Other,
    ];

    /// Order in which classification tags are tested. `Other` is the fallthrough.
    pub const CLASSIFIED: [FlaskCategory; 3] = [
        FlaskCategory::Health,
        FlaskCategory::Stamina,
        FlaskCategory::Magick,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    /// Maps a loosely-typed index from an external caller. Unknown values yield `None`.
    pub fn from_index(index: i32) -> Option<Self> {
        match index {
            0 => Some(FlaskCategory::Health),
            1 => Some(FlaskCategory::Stamina),
            2 => Some(FlaskCategory::Magick),
            3 => Some(FlaskCategory::Other),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            FlaskCategory::Health => "health",
            FlaskCategory::Stamina => "stamina",
            FlaskCategory::Magick => "magick",
            FlaskCategory::Other => "other",
        }
    }
}

impl std::fmt::Display for FlaskCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
