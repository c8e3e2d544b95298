//! `realtime.txt`: the space-separated line written by Cumulus and friends.
//!
//! Unlike clientraw, every measurement comes with its unit label in a later
//! field, and the date carries a two digit year.

use chrono::{Datelike, Local};
use tracing::debug;

use crate::{
    error::ParseError,
    model::WeatherReading,
    timestamp::{ISO_PATTERNS, expand_two_digit_year, normalize_or_else, normalize_separators},
    units::{Quantity, Unit},
};

use super::{Dialect, DialectParser, number, positional_fields, require_fields, unit};

/// Field positions within a realtime.txt line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RealtimeTxtLayout {
    pub date: usize,
    pub time: usize,
    pub temperature: usize,
    pub humidity: usize,
    pub wind_speed: usize,
    pub rain: usize,
    pub pressure: usize,
    pub wind_unit: usize,
    pub temperature_unit: usize,
    pub pressure_unit: usize,
    pub rain_unit: usize,
}

impl RealtimeTxtLayout {
    pub fn highest_index(&self) -> usize {
        [
            self.date,
            self.time,
            self.temperature,
            self.humidity,
            self.wind_speed,
            self.rain,
            self.pressure,
            self.wind_unit,
            self.temperature_unit,
            self.pressure_unit,
            self.rain_unit,
        ]
        .into_iter()
        .max()
        .unwrap_or_default()
    }
}

pub const REALTIME_TXT_LAYOUT: RealtimeTxtLayout = RealtimeTxtLayout {
    date: 0,
    time: 1,
    temperature: 2,
    humidity: 3,
    wind_speed: 5,
    rain: 9,
    pressure: 10,
    wind_unit: 13,
    temperature_unit: 14,
    pressure_unit: 15,
    rain_unit: 16,
};

#[derive(Debug, Clone)]
pub struct RealtimeTxtParser {
    layout: RealtimeTxtLayout,
    current_year: Option<i32>,
}

impl RealtimeTxtParser {
    pub fn with_layout(layout: RealtimeTxtLayout) -> Self {
        Self {
            layout,
            current_year: None,
        }
    }

    /// Pin the year whose century completes two digit station years.
    pub fn with_current_year(mut self, year: i32) -> Self {
        self.current_year = Some(year);
        self
    }

    fn current_year(&self) -> i32 {
        self.current_year.unwrap_or_else(|| Local::now().year())
    }

    fn timestamp(&self, date: &str, time: &str) -> String {
        let fallback = || format!("{} {}", date.trim(), time.trim());

        match expand_two_digit_year(&normalize_separators(date), self.current_year()) {
            Some(iso_date) => {
                let candidate = format!("{iso_date} {}", time.trim());
                normalize_or_else(&candidate, ISO_PATTERNS, fallback)
            }
            None => {
                debug!(date, "Station date is not dd/mm/yy, keeping raw text");
                fallback()
            }
        }
    }
}

impl Default for RealtimeTxtParser {
    fn default() -> Self {
        Self::with_layout(REALTIME_TXT_LAYOUT)
    }
}

impl DialectParser for RealtimeTxtParser {
    fn dialect(&self) -> Dialect {
        Dialect::RealtimeTxt
    }

    fn parse(&self, body: &str) -> Result<WeatherReading, ParseError> {
        let fields = positional_fields(body);
        require_fields(self.dialect(), &fields, self.layout.highest_index())?;

        let layout = &self.layout;
        let tagged = |value: usize, label: usize, quantity: Quantity| -> Option<(f64, Unit)> {
            number(fields[value], quantity.as_str()).zip(unit(quantity, fields[label]))
        };

        Ok(WeatherReading {
            location: None,
            timestamp: Some(self.timestamp(fields[layout.date], fields[layout.time])),
            temperature: tagged(
                layout.temperature,
                layout.temperature_unit,
                Quantity::Temperature,
            ),
            humidity_percent: number(fields[layout.humidity], "humidity"),
            pressure: tagged(layout.pressure, layout.pressure_unit, Quantity::Pressure),
            rain: tagged(layout.rain, layout.rain_unit, Quantity::Rain),
            wind_speed: tagged(layout.wind_speed, layout.wind_unit, Quantity::WindSpeed),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "18/10/08 16:03:45 8.4 84 5.5 24.2 33.0 261 0.0 1.0 999.7 W 6 mph C mb mm \
                          146.6 +0.1 85.2 588.4 11.6 20.3 57 3.6 -0.7 10.9 12:00 7.8 14:41";

    fn parser() -> RealtimeTxtParser {
        RealtimeTxtParser::default().with_current_year(2026)
    }

    #[test]
    fn parses_values_with_their_unit_fields() {
        let reading = parser().parse(SAMPLE).unwrap();

        assert_eq!(reading.temperature, Some((8.4, Unit::Celsius)));
        assert_eq!(reading.humidity_percent, Some(84.0));
        assert_eq!(reading.pressure, Some((999.7, Unit::Mb)));
        assert_eq!(reading.rain, Some((1.0, Unit::Mm)));
        assert_eq!(reading.wind_speed, Some((24.2, Unit::Mph)));
    }

    #[test]
    fn two_digit_year_uses_current_century() {
        let reading = parser().parse(SAMPLE).unwrap();
        assert_eq!(reading.timestamp.as_deref(), Some("2008-10-18 16:03:45"));
    }

    #[test]
    fn unexpected_date_layout_keeps_raw_tokens() {
        let body = SAMPLE.replacen("18/10/08", "2008-10-18", 1);
        let reading = parser().parse(&body).unwrap();
        assert_eq!(reading.timestamp.as_deref(), Some("2008-10-18 16:03:45"));

        let body = SAMPLE.replacen("16:03:45", "4pm", 1);
        let reading = parser().parse(&body).unwrap();
        assert_eq!(reading.timestamp.as_deref(), Some("18/10/08 4pm"));
    }

    #[test]
    fn degree_prefixed_and_imperial_units() {
        let body = SAMPLE
            .replacen(" C mb mm", " °F inHg in", 1)
            .replacen(" mph ", " kts ", 1);
        let reading = parser().parse(&body).unwrap();

        assert_eq!(reading.temperature, Some((8.4, Unit::Fahrenheit)));
        assert_eq!(reading.pressure, Some((999.7, Unit::InHg)));
        assert_eq!(reading.rain, Some((1.0, Unit::In)));
        assert_eq!(reading.wind_speed, Some((24.2, Unit::Kts)));
    }

    #[test]
    fn cumulus_in_label_reads_pressure_as_inhg() {
        let body = SAMPLE
            .replacen(" 999.7 ", " 29.52 ", 1)
            .replacen(" C mb mm", " F in in", 1);
        let reading = parser().parse(&body).unwrap();

        assert_eq!(reading.pressure, Some((29.52, Unit::InHg)));
        assert_eq!(reading.rain, Some((1.0, Unit::In)));
        assert_eq!(reading.temperature, Some((8.4, Unit::Fahrenheit)));
    }

    #[test]
    fn unknown_unit_drops_only_that_measurement() {
        let body = SAMPLE.replacen(" mph ", " bft ", 1);
        let reading = parser().parse(&body).unwrap();
        assert_eq!(reading.wind_speed, None);
        assert_eq!(reading.temperature, Some((8.4, Unit::Celsius)));
    }

    #[test]
    fn short_line_is_malformed() {
        let err = parser().parse("18/10/08 16:03:45 8.4 84").unwrap_err();
        assert!(matches!(
            err,
            ParseError::MalformedPayload { dialect: Dialect::RealtimeTxt, .. }
        ));
    }
}
