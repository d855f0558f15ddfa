//! 5 day / 3 hour forecast reduction.
//!
//! The provider returns up to 40 entries at three hour steps. Cards show one
//! entry per calendar day: the one stamped at the provider's midday slot.
//! Days without that slot (typically today after noon) are dropped.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::Deserialize;

use crate::types::{ForecastEntry, ForecastSnapshot};

/// Representative time of day used to pick one entry per date.
pub const MIDDAY_SLOT: &str = "12:00:00";

const DT_TXT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, Deserialize)]
pub struct ForecastResponse {
    #[serde(default)]
    pub city: Option<ForecastCity>,
    #[serde(default)]
    pub list: Vec<ForecastItem>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ForecastCity {
    pub name: String,
    #[serde(default)]
    pub country: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ForecastItem {
    #[serde(default)]
    pub dt_txt: Option<String>,
    pub main: ForecastMain,
    #[serde(default)]
    pub weather: Vec<ForecastCondition>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ForecastMain {
    pub temp: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ForecastCondition {
    pub description: String,
    pub icon: String,
}

fn midday() -> NaiveTime {
    NaiveTime::from_hms_opt(12, 0, 0).unwrap_or_default()
}

/// Parse a provider `dt_txt` stamp ("2024-03-01 12:00:00").
pub fn parse_dt_txt(dt_txt: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(dt_txt, DT_TXT_FORMAT).ok()
}

/// Full English weekday name for a date, e.g. "Friday".
pub fn weekday_label(date: NaiveDate) -> String {
    date.format("%A").to_string()
}

/// Keep the midday entry of each date, first occurrence wins, provider order.
pub fn midday_entries(
    items: &[ForecastItem],
    icon_url: impl Fn(&str) -> Option<String>,
) -> Vec<ForecastEntry> {
    let slot = midday();
    let mut seen: Vec<NaiveDate> = Vec::new();
    let mut entries = Vec::new();

    for item in items {
        let Some(stamp) = item.dt_txt.as_deref() else {
            continue;
        };
        let Some(at) = parse_dt_txt(stamp) else {
            tracing::debug!("Skipping forecast entry with unparseable dt_txt {:?}", stamp);
            continue;
        };
        if at.time() != slot || seen.contains(&at.date()) {
            continue;
        }
        seen.push(at.date());

        let (description, icon) = item
            .weather
            .first()
            .map(|w| (w.description.clone(), w.icon.clone()))
            .unwrap_or_default();

        entries.push(ForecastEntry {
            date: at.date(),
            day_label: weekday_label(at.date()),
            raw_temp_celsius: item.main.temp,
            description,
            icon_url: icon_url(&icon),
        });
    }

    entries
}

impl ForecastResponse {
    /// "name, country", or just the name when the provider omits a country.
    pub fn city_label(&self) -> String {
        match &self.city {
            Some(ForecastCity {
                name,
                country: Some(country),
            }) if !country.is_empty() => format!("{}, {}", name, country),
            Some(city) => city.name.clone(),
            None => String::new(),
        }
    }

    pub fn into_snapshot(self, icon_url: impl Fn(&str) -> Option<String>) -> ForecastSnapshot {
        let entries = midday_entries(&self.list, icon_url);
        ForecastSnapshot {
            city_label: self.city_label(),
            entries,
        }
    }
}
