/// Displayable weather icon.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Icon {
    Sun,
    Moon,
    CloudSun,
    CloudMoon,
    Cloud,
    Rain,
    SunRain,
    MoonRain,
    Thunderstorm,
    Snow,
    Fog,
}

impl Icon {
    /// Maps a provider icon code (`"01d"`, `"10n"`, ...) to an icon. Unknown
    /// codes map to [`Icon::Cloud`].
    pub fn from_code(code: &str) -> Self {
        match code {
            "01d" => Icon::Sun,
            "01n" => Icon::Moon,
            "02d" => Icon::CloudSun,
            "02n" => Icon::CloudMoon,
            "03d" | "03n" | "04d" | "04n" => Icon::Cloud,
            "09d" | "09n" => Icon::Rain,
            "10d" => Icon::SunRain,
            "10n" => Icon::MoonRain,
            "11d" | "11n" => Icon::Thunderstorm,
            "13d" | "13n" => Icon::Snow,
            "50d" | "50n" => Icon::Fog,
            _ => Icon::Cloud,
        }
    }

    /// Night counterpart of a sun icon; other icons are unchanged.
    pub fn night(self) -> Self {
        match self {
            Icon::Sun => Icon::Moon,
            Icon::CloudSun => Icon::CloudMoon,
            Icon::SunRain => Icon::MoonRain,
            other => other,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Icon::Sun => "sun.max.fill",
            Icon::Moon => "moon.stars.fill",
            Icon::CloudSun => "cloud.sun.fill",
            Icon::CloudMoon => "cloud.moon.fill",
            Icon::Cloud => "cloud.fill",
            Icon::Rain => "cloud.rain.fill",
            Icon::SunRain => "cloud.sun.rain.fill",
            Icon::MoonRain => "cloud.moon.rain.fill",
            Icon::Thunderstorm => "cloud.bolt.rain.fill",
            Icon::Snow => "snowflake",
            Icon::Fog => "cloud.fog.fill",
        }
    }

    /// Terminal glyph.
    pub fn glyph(&self) -> &'static str {
        match self {
            Icon::Sun => "☀",
            Icon::Moon => "☾",
            Icon::CloudSun => "⛅",
            Icon::CloudMoon => "☁",
            Icon::Cloud => "☁",
            Icon::Rain => "☂",
            Icon::SunRain => "☔",
            Icon::MoonRain => "☔",
            Icon::Thunderstorm => "⚡",
            Icon::Snow => "❄",
            Icon::Fog => "≋",
        }
    }
}
