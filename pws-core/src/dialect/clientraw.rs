//! `clientraw.txt`: one long space-separated line written by Weather Display.

use crate::{
    error::ParseError,
    model::WeatherReading,
    timestamp::{DAY_FIRST_PATTERNS, normalize_or_else, normalize_separators},
    units::Unit,
};

use super::{Dialect, DialectParser, number, positional_fields, require_fields};

/// Field positions within a clientraw line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientRawLayout {
    pub wind_speed: usize,
    pub temperature: usize,
    pub humidity: usize,
    pub pressure: usize,
    pub rain: usize,
    pub hour: usize,
    pub minute: usize,
    pub second: usize,
    pub date: usize,
}

impl ClientRawLayout {
    pub fn highest_index(&self) -> usize {
        [
            self.wind_speed,
            self.temperature,
            self.humidity,
            self.pressure,
            self.rain,
            self.hour,
            self.minute,
            self.second,
            self.date,
        ]
        .into_iter()
        .max()
        .unwrap_or_default()
    }
}

/// Wind in knots, temperature in °C, pressure in hPa, rain in mm.
pub const CLIENTRAW_LAYOUT: ClientRawLayout = ClientRawLayout {
    wind_speed: 2,
    temperature: 4,
    humidity: 5,
    pressure: 6,
    rain: 7,
    hour: 29,
    minute: 30,
    second: 31,
    date: 74,
};

#[derive(Debug, Clone)]
pub struct ClientRawParser {
    layout: ClientRawLayout,
}

impl ClientRawParser {
    pub fn with_layout(layout: ClientRawLayout) -> Self {
        Self { layout }
    }

    fn timestamp(&self, fields: &[&str]) -> String {
        let layout = &self.layout;
        let raw = format!(
            "{} {}:{}:{}",
            fields[layout.date],
            fields[layout.hour],
            fields[layout.minute],
            fields[layout.second],
        );
        let normalized = normalize_separators(&raw);

        normalize_or_else(&normalized, DAY_FIRST_PATTERNS, || normalized.clone())
    }
}

impl Default for ClientRawParser {
    fn default() -> Self {
        Self::with_layout(CLIENTRAW_LAYOUT)
    }
}

impl DialectParser for ClientRawParser {
    fn dialect(&self) -> Dialect {
        Dialect::ClientRaw
    }

    fn parse(&self, body: &str) -> Result<WeatherReading, ParseError> {
        let fields = positional_fields(body);
        require_fields(self.dialect(), &fields, self.layout.highest_index())?;

        let layout = &self.layout;
        let tagged = |index: usize, field: &'static str, unit: Unit| {
            number(fields[index], field).map(|value| (value, unit))
        };

        Ok(WeatherReading {
            location: None,
            timestamp: Some(self.timestamp(&fields)),
            temperature: tagged(layout.temperature, "temperature", Unit::Celsius),
            humidity_percent: number(fields[layout.humidity], "humidity"),
            pressure: tagged(layout.pressure, "pressure", Unit::Hpa),
            rain: tagged(layout.rain, "rain", Unit::Mm),
            wind_speed: tagged(layout.wind_speed, "wind speed", Unit::Kts),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A 75 field line with the given overrides; every other field is `0`.
    fn line(overrides: &[(usize, &str)]) -> String {
        let mut fields = vec!["0"; 75];
        fields[0] = "12345";
        for (index, value) in overrides {
            fields[*index] = *value;
        }
        fields.join(" ")
    }

    fn sample() -> String {
        line(&[
            (2, "10.0"),
            (4, "21.4"),
            (5, "55"),
            (6, "1013.2"),
            (7, "0.0"),
            (29, "14"),
            (30, "5"),
            (31, "9"),
            (74, "16/10/2026"),
        ])
    }

    #[test]
    fn parses_fields_in_native_units() {
        let reading = ClientRawParser::default().parse(&sample()).unwrap();

        assert_eq!(reading.temperature, Some((21.4, Unit::Celsius)));
        assert_eq!(reading.humidity_percent, Some(55.0));
        assert_eq!(reading.pressure, Some((1013.2, Unit::Hpa)));
        assert_eq!(reading.rain, Some((0.0, Unit::Mm)));
        assert_eq!(reading.wind_speed, Some((10.0, Unit::Kts)));
        assert_eq!(reading.location, None);
    }

    #[test]
    fn formats_station_date_and_time() {
        let reading = ClientRawParser::default().parse(&sample()).unwrap();
        assert_eq!(reading.timestamp.as_deref(), Some("2026-10-16 14:05:09"));
    }

    #[test]
    fn two_digit_year_date_is_accepted() {
        let body = line(&[(29, "7"), (30, "30"), (31, "0"), (74, "1.2.26")]);
        let reading = ClientRawParser::default().parse(&body).unwrap();
        assert_eq!(reading.timestamp.as_deref(), Some("2026-02-01 07:30:00"));
    }

    #[test]
    fn unparsable_timestamp_keeps_normalized_text() {
        let body = line(&[(29, "xx"), (30, "30"), (31, "0"), (74, "16/10/2026")]);
        let reading = ClientRawParser::default().parse(&body).unwrap();
        assert_eq!(reading.timestamp.as_deref(), Some("16-10-2026 xx:30:0"));
    }

    #[test]
    fn bad_token_only_empties_its_field() {
        let body = line(&[(4, "-"), (5, "55")]);
        let reading = ClientRawParser::default().parse(&body).unwrap();
        assert_eq!(reading.temperature, None);
        assert_eq!(reading.humidity_percent, Some(55.0));
    }

    #[test]
    fn short_line_is_malformed() {
        let body = ["1"; 74].join(" ");
        let err = ClientRawParser::default().parse(&body).unwrap_err();
        assert!(matches!(
            err,
            ParseError::MalformedPayload { dialect: Dialect::ClientRaw, .. }
        ));
        assert!(err.to_string().contains("found 74"));
    }

    #[test]
    fn trailing_newline_is_ignored() {
        let body = format!("{}\r\n", sample());
        assert!(ClientRawParser::default().parse(&body).is_ok());
    }

    #[test]
    fn custom_layout_moves_fields() {
        let layout = ClientRawLayout {
            temperature: 3,
            ..CLIENTRAW_LAYOUT
        };
        let body = line(&[(3, "-4.5")]);
        let reading = ClientRawParser::with_layout(layout).parse(&body).unwrap();
        assert_eq!(reading.temperature, Some((-4.5, Unit::Celsius)));
    }
}
