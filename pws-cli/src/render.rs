//! Human-readable display of a reading in the user's preferred units.

use pws_core::{Quantity, SourceDescriptor, UnitPreferences, WeatherReading, convert_units};
use std::fmt;
use tracing::debug;

/// Shown for anything the station did not report.
pub const PLACEHOLDER: &str = "-";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayReading {
    pub location: String,
    pub timestamp: String,
    pub temperature: String,
    pub humidity: String,
    pub pressure: String,
    pub rain: String,
    pub wind_speed: String,
}

impl DisplayReading {
    pub fn new(
        reading: &WeatherReading,
        source: &SourceDescriptor,
        prefs: &UnitPreferences,
    ) -> Self {
        let show = |quantity| converted(reading, quantity, prefs);

        Self {
            location: reading
                .location
                .clone()
                .unwrap_or_else(|| source.name.clone()),
            timestamp: reading
                .timestamp
                .clone()
                .unwrap_or_else(|| PLACEHOLDER.to_string()),
            temperature: show(Quantity::Temperature),
            humidity: reading
                .humidity_percent
                .map(|h| format!("{h}%"))
                .unwrap_or_else(|| PLACEHOLDER.to_string()),
            pressure: show(Quantity::Pressure),
            rain: show(Quantity::Rain),
            wind_speed: show(Quantity::WindSpeed),
        }
    }
}

fn converted(reading: &WeatherReading, quantity: Quantity, prefs: &UnitPreferences) -> String {
    let Some((value, unit)) = reading.measurement(quantity) else {
        return PLACEHOLDER.to_string();
    };

    let target = prefs.target(quantity);
    match convert_units(value, unit, target) {
        Ok(value) if quantity == Quantity::Temperature => format!("{value}{target}"),
        Ok(value) => format!("{value} {target}"),
        Err(err) => {
            debug!(%err, "Could not convert for display");
            PLACEHOLDER.to_string()
        }
    }
}

impl fmt::Display for DisplayReading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} ({})", self.location, self.timestamp)?;
        writeln!(f, "  Temperature: {}", self.temperature)?;
        writeln!(f, "  Humidity:    {}", self.humidity)?;
        writeln!(f, "  Pressure:    {}", self.pressure)?;
        writeln!(f, "  Rain today:  {}", self.rain)?;
        write!(f, "  Wind speed:  {}", self.wind_speed)
    }
}
