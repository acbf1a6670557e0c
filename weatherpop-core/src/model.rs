use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Measurement system applied to both the outbound query and rendered labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Units {
    #[default]
    Metric,
    Imperial,
}

impl Units {
    pub fn as_str(&self) -> &'static str {
        match self {
            Units::Metric => "metric",
            Units::Imperial => "imperial",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Units::Metric => Units::Imperial,
            Units::Imperial => Units::Metric,
        }
    }

    pub fn temp_label(&self) -> &'static str {
        match self {
            Units::Metric => "°C",
            Units::Imperial => "°F",
        }
    }

    pub fn wind_label(&self) -> &'static str {
        match self {
            Units::Metric => "m/s",
            Units::Imperial => "mph",
        }
    }

    /// Label for the toggle button: shows the system you would switch to.
    pub fn toggle_label(&self) -> &'static str {
        match self {
            Units::Metric => "°F",
            Units::Imperial => "°C",
        }
    }
}

impl std::fmt::Display for Units {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

/// How an observation was obtained. Drives the re-fetch after a unit change:
/// a coordinate-sourced result refreshes by coordinates, a city-sourced one
/// by the text currently in the search field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum QuerySource {
    City(String),
    Coords(Coordinates),
}

/// A single normalized reading from the weather provider.
///
/// Temperature and wind speed carry the unit system they were fetched with;
/// changing units means fetching again, never converting client-side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherObservation {
    pub name: String,
    pub country: String,
    pub temperature: f64,
    pub condition: String,
    pub icon: String,
    pub humidity: u8,
    pub wind_speed: f64,
    pub source: QuerySource,
    pub fetched_at: DateTime<Utc>,
}

/// Cosmetic icon asset for a provider icon id.
pub fn icon_url(icon: &str) -> String {
    format!("https://openweathermap.org/img/wn/{icon}@2x.png")
}
