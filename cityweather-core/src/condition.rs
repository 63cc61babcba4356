use std::fmt;

/// Coarse grouping of provider condition codes, used to pick a glyph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConditionCategory {
    Thunderstorm,
    Drizzle,
    Rain,
    Snow,
    Atmosphere,
    Volcanic,
    HeavyWind,
    Tornado,
    Clear,
    Cloudy,
    Unknown,
}

impl ConditionCategory {
    /// Map a condition id to its category. Ranges are inclusive and disjoint.
    pub fn from_id(id: i64) -> Self {
        match id {
            200..=232 => ConditionCategory::Thunderstorm,
            302..=321 => ConditionCategory::Drizzle,
            500..=531 => ConditionCategory::Rain,
            600..=622 => ConditionCategory::Snow,
            701..=741 => ConditionCategory::Atmosphere,
            762 => ConditionCategory::Volcanic,
            771 => ConditionCategory::HeavyWind,
            781 => ConditionCategory::Tornado,
            800 => ConditionCategory::Clear,
            801..=804 => ConditionCategory::Cloudy,
            _ => ConditionCategory::Unknown,
        }
    }

    pub fn glyph(&self) -> &'static str {
        match self {
            ConditionCategory::Thunderstorm => "⛈️",
            ConditionCategory::Drizzle => "🌦️",
            ConditionCategory::Rain => "🌧️",
            ConditionCategory::Snow => "❄️",
            ConditionCategory::Atmosphere => "🌫️",
            ConditionCategory::Volcanic => "🌋",
            ConditionCategory::HeavyWind => "💨",
            ConditionCategory::Tornado => "🌪️",
            ConditionCategory::Clear => "☀️",
            ConditionCategory::Cloudy => "☁️",
            ConditionCategory::Unknown => "",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ConditionCategory::Thunderstorm => "thunderstorm",
            ConditionCategory::Drizzle => "drizzle",
            ConditionCategory::Rain => "rain",
            ConditionCategory::Snow => "snow",
            ConditionCategory::Atmosphere => "atmosphere",
            ConditionCategory::Volcanic => "volcanic ash",
            ConditionCategory::HeavyWind => "squalls",
            ConditionCategory::Tornado => "tornado",
            ConditionCategory::Clear => "clear",
            ConditionCategory::Cloudy => "cloudy",
            ConditionCategory::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ConditionCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
