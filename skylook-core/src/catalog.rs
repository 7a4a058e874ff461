//! Weather code → icon mapping.
//!
//! Codes follow the WMO interpretation used by Open-Meteo
//! (<https://open-meteo.com/en/docs#weathervariables>).

use serde::{Deserialize, Serialize};

/// Icon shown for a weather code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IconId {
    #[default]
    Sunny,
    PartlyCloudy,
    Overcast,
    Fog,
    Drizzle,
    Rain,
    Snow,
    Storm,
}

impl IconId {
    pub fn as_str(&self) -> &'static str {
        match self {
            IconId::Sunny => "sunny",
            IconId::PartlyCloudy => "partly-cloudy",
            IconId::Overcast => "overcast",
            IconId::Fog => "fog",
            IconId::Drizzle => "drizzle",
            IconId::Rain => "rain",
            IconId::Snow => "snow",
            IconId::Storm => "storm",
        }
    }

    /// File stem of the matching image asset, e.g. `icon-partly-cloudy`.
    pub fn asset_name(&self) -> String {
        format!("icon-{}", self.as_str())
    }

    pub const fn all() -> &'static [IconId] {
        &[
            IconId::Sunny,
            IconId::PartlyCloudy,
            IconId::Overcast,
            IconId::Fog,
            IconId::Drizzle,
            IconId::Rain,
            IconId::Snow,
            IconId::Storm,
        ]
    }
}

impl std::fmt::Display for IconId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

fn lookup(code: i32) -> Option<IconId> {
    let icon = match code {
        0 | 1 => IconId::Sunny,
        2 => IconId::PartlyCloudy,
        3 => IconId::Overcast,
        45 | 48 => IconId::Fog,
        51 | 53 | 55 | 56 | 57 => IconId::Drizzle,
        61 | 63 | 65 | 66 | 67 | 80 | 81 | 82 => IconId::Rain,
        71 | 73 | 75 | 77 | 85 | 86 => IconId::Snow,
        95 | 96 | 99 => IconId::Storm,
        _ => return None,
    };
    Some(icon)
}

/// Icon for a weather code. Codes outside the table map to [`IconId::Sunny`].
pub fn icon_for(code: i32) -> IconId {
    lookup(code).unwrap_or_default()
}

/// Whether `code` has an explicit entry in the table.
pub fn is_known(code: i32) -> bool {
    lookup(code).is_some()
}
