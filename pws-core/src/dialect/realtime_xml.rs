//! `realtime.xml`: `<misc>` and `<data>` elements whose attribute values name
//! the measurement carried in the element text.
//!
//! Different station packages spell the same measurement differently, so the
//! attribute value is looked up in [`SYNONYMS`] rather than matched by name.

use quick_xml::{
    Reader,
    escape::{escape, unescape},
    events::{BytesStart, Event},
};
use tracing::debug;

use crate::{
    error::ParseError,
    model::WeatherReading,
    timestamp::{ISO_PATTERNS, normalize_or_else, normalize_separators},
    units::{Quantity, Unit},
};

use super::{Dialect, DialectParser, number, unit};

/// A field a `<data>` element can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum XmlField {
    Temperature,
    TemperatureUnit,
    Humidity,
    Pressure,
    PressureUnit,
    Rain,
    RainUnit,
    WindSpeed,
    WindUnit,
    Date,
    Time,
    Location,
    /// `yyyy-mm-dd` at characters 0..10, time from character 12 on.
    RefreshTime,
}

pub const SYNONYMS: &[(&str, XmlField)] = &[
    ("temp", XmlField::Temperature),
    ("tempunit", XmlField::TemperatureUnit),
    ("hum", XmlField::Humidity),
    ("press", XmlField::Pressure),
    ("barometer", XmlField::Pressure),
    ("barunit", XmlField::PressureUnit),
    ("todaysrain", XmlField::Rain),
    ("today_rainfall", XmlField::Rain),
    ("rainunit", XmlField::RainUnit),
    ("windspeed", XmlField::WindSpeed),
    ("avg_windspeed", XmlField::WindSpeed),
    ("windunit", XmlField::WindUnit),
    ("station_date", XmlField::Date),
    ("station_time", XmlField::Time),
    ("location", XmlField::Location),
    ("refresh_time", XmlField::RefreshTime),
];

const MISC_ATTRIBUTE: &[u8] = b"data";
const MISC_LOCATION: &str = "station_location";

impl XmlField {
    pub fn from_attribute_value(value: &str) -> Option<XmlField> {
        SYNONYMS
            .iter()
            .find(|(synonym, _)| *synonym == value)
            .map(|(_, field)| *field)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Target {
    StationLocation,
    Data(XmlField),
}

/// Element texts collected before they are interpreted.
#[derive(Debug, Default)]
struct RawFields {
    station_location: Option<String>,
    location: Option<String>,
    date: Option<String>,
    time: Option<String>,
    temperature: Option<String>,
    temperature_unit: Option<String>,
    humidity: Option<String>,
    pressure: Option<String>,
    pressure_unit: Option<String>,
    rain: Option<String>,
    rain_unit: Option<String>,
    wind_speed: Option<String>,
    wind_unit: Option<String>,
}

impl RawFields {
    fn set(&mut self, target: Target, text: &str) {
        let text = text.trim();
        if text.is_empty() {
            return;
        }
        let value = Some(text.to_string());

        match target {
            Target::StationLocation => self.station_location = value,
            Target::Data(field) => match field {
                XmlField::Temperature => self.temperature = value,
                XmlField::TemperatureUnit => self.temperature_unit = value,
                XmlField::Humidity => self.humidity = value,
                XmlField::Pressure => self.pressure = value,
                XmlField::PressureUnit => self.pressure_unit = value,
                XmlField::Rain => self.rain = value,
                XmlField::RainUnit => self.rain_unit = value,
                XmlField::WindSpeed => self.wind_speed = value,
                XmlField::WindUnit => self.wind_unit = value,
                XmlField::Date => self.date = value,
                XmlField::Time => self.time = value,
                XmlField::Location => self.location = value,
                XmlField::RefreshTime => {
                    let date: String = text.chars().take(10).collect();
                    let time: String = text.chars().skip(12).collect();
                    self.date = Some(date);
                    self.time = Some(time).filter(|t| !t.trim().is_empty());
                }
            },
        }
    }

    fn timestamp(&self) -> Option<String> {
        let date = self.date.as_deref().map(str::trim);
        let time = self.time.as_deref().map(str::trim);

        let fallback = || {
            [date, time]
                .into_iter()
                .flatten()
                .collect::<Vec<_>>()
                .join(" ")
        };

        match (date, time) {
            (Some(date), Some(time)) => {
                let candidate = normalize_separators(&format!("{date} {time}"));
                Some(normalize_or_else(&candidate, ISO_PATTERNS, fallback))
            }
            (None, None) => None,
            _ => Some(fallback()),
        }
    }

    fn measurement(
        value: &Option<String>,
        label: &Option<String>,
        quantity: Quantity,
    ) -> Option<(f64, Unit)> {
        let value = number(value.as_deref()?, quantity.as_str())?;
        let Some(label) = label.as_deref() else {
            debug!(%quantity, "Dropping value reported without a unit");
            return None;
        };
        unit(quantity, label).map(|unit| (value, unit))
    }

    fn into_reading(self) -> WeatherReading {
        WeatherReading {
            timestamp: self.timestamp(),
            temperature: Self::measurement(
                &self.temperature,
                &self.temperature_unit,
                Quantity::Temperature,
            ),
            humidity_percent: self
                .humidity
                .as_deref()
                .and_then(|text| number(text, "humidity")),
            pressure: Self::measurement(&self.pressure, &self.pressure_unit, Quantity::Pressure),
            rain: Self::measurement(&self.rain, &self.rain_unit, Quantity::Rain),
            wind_speed: Self::measurement(&self.wind_speed, &self.wind_unit, Quantity::WindSpeed),
            location: self.location.or(self.station_location),
        }
    }
}

/// An element whose text is being collected.
#[derive(Debug)]
struct Capture {
    targets: Vec<Target>,
    depth: usize,
    text: String,
}

impl Capture {
    fn text(&self) -> String {
        unescape(&self.text)
            .map(|text| text.into_owned())
            .unwrap_or_else(|_| self.text.clone())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RealtimeXmlParser;

impl RealtimeXmlParser {
    fn malformed(reason: impl Into<String>) -> ParseError {
        ParseError::malformed(Dialect::RealtimeXml, reason)
    }

    fn targets(element: &BytesStart<'_>) -> Result<Vec<Target>, ParseError> {
        let mut targets = Vec::new();
        let name = element.name();

        for attribute in element.attributes() {
            let attribute =
                attribute.map_err(|err| Self::malformed(format!("XML attribute error: {err}")))?;

            match name.as_ref() {
                b"misc" => {
                    if attribute.key.as_ref() == MISC_ATTRIBUTE
                        && attribute.value.as_ref() == MISC_LOCATION.as_bytes()
                    {
                        targets.push(Target::StationLocation);
                    }
                }
                b"data" => {
                    let value = String::from_utf8_lossy(&attribute.value);
                    if let Some(field) = XmlField::from_attribute_value(&value) {
                        targets.push(Target::Data(field));
                    }
                }
                _ => {}
            }
        }

        Ok(targets)
    }
}

impl DialectParser for RealtimeXmlParser {
    fn dialect(&self) -> Dialect {
        Dialect::RealtimeXml
    }

    fn parse(&self, body: &str) -> Result<WeatherReading, ParseError> {
        let mut reader = Reader::from_str(body);
        let mut fields = RawFields::default();
        let mut capture: Option<Capture> = None;
        let mut depth = 0usize;
        let mut saw_element = false;

        loop {
            let event = reader
                .read_event()
                .map_err(|err| Self::malformed(format!("XML error: {err}")))?;

            match event {
                Event::Start(element) => {
                    saw_element = true;
                    depth += 1;
                    if capture.is_none() {
                        let targets = Self::targets(&element)?;
                        if !targets.is_empty() {
                            capture = Some(Capture {
                                targets,
                                depth,
                                text: String::new(),
                            });
                        }
                    }
                }
                Event::Text(text) => {
                    if let Some(capture) = capture.as_mut() {
                        capture.text.push_str(&String::from_utf8_lossy(&text));
                    }
                }
                Event::CData(cdata) => {
                    // Escaped so the later unescape leaves it literal.
                    if let Some(capture) = capture.as_mut() {
                        let raw = String::from_utf8_lossy(&cdata);
                        capture.text.push_str(&escape(&*raw));
                    }
                }
                Event::GeneralRef(reference) => {
                    // Re-escaped so the whole text unescapes in one pass.
                    if let Some(capture) = capture.as_mut() {
                        capture.text.push('&');
                        capture.text.push_str(&String::from_utf8_lossy(&reference));
                        capture.text.push(';');
                    }
                }
                Event::End(_) => {
                    if let Some(done) = capture.take_if(|capture| capture.depth == depth) {
                        let text = done.text();
                        for target in done.targets {
                            fields.set(target, &text);
                        }
                    }
                    depth = depth.saturating_sub(1);
                }
                Event::Empty(_) => saw_element = true,
                Event::Eof => break,
                _ => {}
            }
        }

        if !saw_element {
            return Err(Self::malformed("document contains no elements"));
        }
        if depth != 0 {
            return Err(Self::malformed(format!("{depth} element(s) left unclosed")));
        }

        Ok(fields.into_reading())
    }
}
