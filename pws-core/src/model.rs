use serde::{Deserialize, Serialize};

use crate::units::{Quantity, Unit};

const REALTIME_TXT: &str = "realtime.txt";
const REALTIME_XML: &str = "realtime.xml";

/// Where a payload comes from. Only `url` takes part in dialect selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceDescriptor {
    pub name: String,
    pub url: String,
}

impl SourceDescriptor {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }

    /// Descriptors worth fetching for this source.
    ///
    /// A URL without a `.txt` or `.xml` suffix is a station base directory and
    /// expands to its `realtime.txt` and `realtime.xml` files.
    pub fn candidates(&self) -> Vec<SourceDescriptor> {
        if self.url.ends_with(".txt") || self.url.ends_with(".xml") {
            return vec![self.clone()];
        }

        let base = self.url.trim_end_matches('/');
        [REALTIME_TXT, REALTIME_XML]
            .iter()
            .map(|file| SourceDescriptor::new(self.name.clone(), format!("{base}/{file}")))
            .collect()
    }
}

/// A fetched body together with the source it was fetched from.
#[derive(Debug, Clone)]
pub struct RawPayload {
    pub source: SourceDescriptor,
    pub bytes: Vec<u8>,
}

impl RawPayload {
    pub fn new(source: SourceDescriptor, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            source,
            bytes: bytes.into(),
        }
    }

    /// Body as text; invalid UTF-8 sequences are replaced rather than rejected.
    pub fn text(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.bytes)
    }
}

/// One normalized station reading.
///
/// Every field may be absent. Numeric fields keep the unit the station
/// reported them in; converting is left to whoever displays the reading.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeatherReading {
    pub location: Option<String>,
    pub timestamp: Option<String>,
    pub temperature: Option<(f64, Unit)>,
    pub humidity_percent: Option<f64>,
    pub pressure: Option<(f64, Unit)>,
    pub rain: Option<(f64, Unit)>,
    pub wind_speed: Option<(f64, Unit)>,
}

impl WeatherReading {
    /// The unit-tagged value for `quantity`, if the station reported it.
    pub fn measurement(&self, quantity: Quantity) -> Option<(f64, Unit)> {
        match quantity {
            Quantity::Temperature => self.temperature,
            Quantity::Pressure => self.pressure,
            Quantity::Rain => self.rain,
            Quantity::WindSpeed => self.wind_speed,
        }
    }
}

/// Target unit per quantity, chosen by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitPreferences {
    pub temperature: Unit,
    pub pressure: Unit,
    pub rain: Unit,
    pub wind_speed: Unit,
}

impl UnitPreferences {
    pub fn target(&self, quantity: Quantity) -> Unit {
        match quantity {
            Quantity::Temperature => self.temperature,
            Quantity::Pressure => self.pressure,
            Quantity::Rain => self.rain,
            Quantity::WindSpeed => self.wind_speed,
        }
    }

    /// Replace the preferred unit of the unit's own quantity.
    pub fn set(&mut self, unit: Unit) {
        match unit.quantity() {
            Quantity::Temperature => self.temperature = unit,
            Quantity::Pressure => self.pressure = unit,
            Quantity::Rain => self.rain = unit,
            Quantity::WindSpeed => self.wind_speed = unit,
        }
    }
}

impl Default for UnitPreferences {
    fn default() -> Self {
        Self {
            temperature: Unit::Celsius,
            pressure: Unit::Mb,
            rain: Unit::Mm,
            wind_speed: Unit::Kmh,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suffixed_url_is_its_own_candidate() {
        let source = SourceDescriptor::new("Home", "http://example.com/clientraw.txt");
        assert_eq!(source.candidates(), vec![source.clone()]);
    }

    #[test]
    fn base_url_expands_to_realtime_files() {
        let source = SourceDescriptor::new("Home", "http://example.com/wx/");
        let urls: Vec<String> = source.candidates().into_iter().map(|s| s.url).collect();
        assert_eq!(
            urls,
            vec![
                "http://example.com/wx/realtime.txt",
                "http://example.com/wx/realtime.xml",
            ]
        );
    }

    #[test]
    fn payload_text_is_lossy() {
        let payload = RawPayload::new(SourceDescriptor::new("a", "b.txt"), vec![b'o', b'k', 0xff]);
        assert_eq!(payload.text(), "ok\u{fffd}");
    }

    #[test]
    fn preferences_set_routes_by_quantity() {
        let mut prefs = UnitPreferences::default();
        prefs.set(Unit::Fahrenheit);
        prefs.set(Unit::Kts);
        assert_eq!(prefs.target(Quantity::Temperature), Unit::Fahrenheit);
        assert_eq!(prefs.target(Quantity::WindSpeed), Unit::Kts);
        assert_eq!(prefs.target(Quantity::Pressure), Unit::Mb);
    }

    #[test]
    fn reading_serializes_units_as_labels() {
        let reading = WeatherReading {
            temperature: Some((21.4, Unit::Celsius)),
            ..Default::default()
        };
        let json = serde_json::to_value(&reading).unwrap();
        assert_eq!(json["temperature"], serde_json::json!([21.4, "°C"]));
        assert!(json["rain"].is_null());
    }
}
