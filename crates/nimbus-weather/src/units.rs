//! Celsius/Fahrenheit display conversion.
//!
//! The provider is always queried in metric units; everything here is a
//! pure display transform over the stored Celsius value.

use crate::types::TemperatureUnit;

pub fn celsius_to_fahrenheit(celsius: f64) -> f64 {
    celsius * 9.0 / 5.0 + 32.0
}

/// Round to the nearest integer with halves going up (-2.5 -> -2, 2.5 -> 3).
pub fn round_half_up(value: f64) -> i64 {
    (value + 0.5).floor() as i64
}

impl TemperatureUnit {
    /// Integer shown for a stored Celsius value in this unit.
    pub fn display_value(self, celsius: f64) -> i64 {
        match self {
            TemperatureUnit::Celsius => round_half_up(celsius),
            TemperatureUnit::Fahrenheit => round_half_up(celsius_to_fahrenheit(celsius)),
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            TemperatureUnit::Celsius => "°C",
            TemperatureUnit::Fahrenheit => "°F",
        }
    }

    /// "21 °C" style, used by the current weather panel.
    pub fn format_spaced(self, celsius: f64) -> String {
        format!("{} {}", self.display_value(celsius), self.symbol())
    }

    /// "21°C" style, used by forecast and favorites cards.
    pub fn format_compact(self, celsius: f64) -> String {
        format!("{}{}", self.display_value(celsius), self.symbol())
    }
}
