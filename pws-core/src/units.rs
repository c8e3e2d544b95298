//! Unit conversion for the four measured quantities.
//!
//! Every conversion pivots through a canonical unit per quantity
//! (°C, hPa, mm, km/h). Results are rounded to two decimals, except when
//! source and target are the same unit, in which case the value is returned
//! untouched.

use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

use crate::error::ConversionError;

const KMH_PER_KNOT: f64 = 1.852;
const KMH_PER_MPH: f64 = 1.60934;
const KMH_PER_MS: f64 = 3.6;
const HPA_PER_INHG: f64 = 33.86389;
const HPA_PER_MB: f64 = 1.0;
const MM_PER_INCH: f64 = 25.4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Quantity {
    Temperature,
    Pressure,
    Rain,
    WindSpeed,
}

impl Quantity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Quantity::Temperature => "temperature",
            Quantity::Pressure => "pressure",
            Quantity::Rain => "rain",
            Quantity::WindSpeed => "wind speed",
        }
    }

    pub const fn all() -> &'static [Quantity] {
        &[
            Quantity::Temperature,
            Quantity::Pressure,
            Quantity::Rain,
            Quantity::WindSpeed,
        ]
    }

    /// Units that measure this quantity, canonical unit first.
    pub fn units(&self) -> &'static [Unit] {
        match self {
            Quantity::Temperature => &[Unit::Celsius, Unit::Fahrenheit],
            Quantity::Pressure => &[Unit::Hpa, Unit::Mb, Unit::InHg],
            Quantity::Rain => &[Unit::Mm, Unit::In],
            Quantity::WindSpeed => &[Unit::Kmh, Unit::Kts, Unit::Mph, Unit::Ms],
        }
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A unit label a reading can be tagged with.
///
/// `Mb` and `Hpa` are numerically identical but kept apart because stations
/// report them under different names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Unit {
    Celsius,
    Fahrenheit,
    Hpa,
    InHg,
    Mb,
    Mm,
    In,
    Kmh,
    Kts,
    Mph,
    Ms,
}

impl Unit {
    pub fn quantity(&self) -> Quantity {
        match self {
            Unit::Celsius | Unit::Fahrenheit => Quantity::Temperature,
            Unit::Hpa | Unit::InHg | Unit::Mb => Quantity::Pressure,
            Unit::Mm | Unit::In => Quantity::Rain,
            Unit::Kmh | Unit::Kts | Unit::Mph | Unit::Ms => Quantity::WindSpeed,
        }
    }

    /// Display label, e.g. `°C` or `km/h`.
    pub fn label(&self) -> &'static str {
        match self {
            Unit::Celsius => "°C",
            Unit::Fahrenheit => "°F",
            Unit::Hpa => "hPa",
            Unit::InHg => "inHg",
            Unit::Mb => "mb",
            Unit::Mm => "mm",
            Unit::In => "in",
            Unit::Kmh => "km/h",
            Unit::Kts => "kts",
            Unit::Mph => "mph",
            Unit::Ms => "m/s",
        }
    }

    /// Resolve a station-supplied label for a known quantity.
    ///
    /// Temperature labels are matched on their final letter once degree signs
    /// are gone, so `°C`, `degC` and `c` all resolve to Celsius.
    pub fn parse(quantity: Quantity, label: &str) -> Result<Unit, ConversionError> {
        let normalized = normalize_label(label);
        let unknown = || ConversionError::UnknownUnit {
            quantity,
            label: label.to_string(),
        };

        if quantity == Quantity::Temperature {
            return match normalized.chars().last() {
                Some('c') => Ok(Unit::Celsius),
                Some('f') => Ok(Unit::Fahrenheit),
                _ => Err(unknown()),
            };
        }

        // Cumulus labels inches of mercury plain `in`.
        if quantity == Quantity::Pressure && normalized == "in" {
            return Ok(Unit::InHg);
        }

        let unit = lookup(&normalized).ok_or_else(unknown)?;
        if unit.quantity() == quantity {
            Ok(unit)
        } else {
            Err(unknown())
        }
    }

    fn to_canonical(self, value: f64) -> f64 {
        match self {
            Unit::Celsius | Unit::Hpa | Unit::Mm | Unit::Kmh => value,
            Unit::Fahrenheit => (value - 32.0) * 5.0 / 9.0,
            Unit::InHg => value * HPA_PER_INHG,
            Unit::Mb => value * HPA_PER_MB,
            Unit::In => value * MM_PER_INCH,
            Unit::Kts => value * KMH_PER_KNOT,
            Unit::Mph => value * KMH_PER_MPH,
            Unit::Ms => value * KMH_PER_MS,
        }
    }

    fn from_canonical(self, value: f64) -> f64 {
        match self {
            Unit::Celsius | Unit::Hpa | Unit::Mm | Unit::Kmh => value,
            Unit::Fahrenheit => (value * 9.0 / 5.0) + 32.0,
            Unit::InHg => value / HPA_PER_INHG,
            Unit::Mb => value / HPA_PER_MB,
            Unit::In => value / MM_PER_INCH,
            Unit::Kts => value / KMH_PER_KNOT,
            Unit::Mph => value / KMH_PER_MPH,
            Unit::Ms => value / KMH_PER_MS,
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Unit {
    type Err = ConversionError;

    /// Quantity-agnostic lookup, used for labels coming from configuration.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = normalize_label(s);
        match normalized.as_str() {
            "c" | "celsius" => Ok(Unit::Celsius),
            "f" | "fahrenheit" => Ok(Unit::Fahrenheit),
            other => lookup(other).ok_or_else(|| ConversionError::UnrecognizedLabel {
                label: s.to_string(),
            }),
        }
    }
}

impl TryFrom<String> for Unit {
    type Error = ConversionError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Unit> for String {
    fn from(unit: Unit) -> Self {
        unit.label().to_string()
    }
}

fn lookup(normalized: &str) -> Option<Unit> {
    let unit = match normalized {
        "hpa" => Unit::Hpa,
        "mb" | "mbar" => Unit::Mb,
        "inhg" => Unit::InHg,
        "mm" => Unit::Mm,
        "in" => Unit::In,
        "kmh" | "kph" => Unit::Kmh,
        "kts" | "kt" | "knots" => Unit::Kts,
        "mph" => Unit::Mph,
        "ms" | "mps" => Unit::Ms,
        _ => return None,
    };
    Some(unit)
}

/// Trim, drop `/` and `°`, lowercase.
pub fn normalize_label(label: &str) -> String {
    label
        .trim()
        .chars()
        .filter(|c| *c != '/' && *c != '°')
        .flat_map(char::to_lowercase)
        .collect()
}

/// Round half-up to two decimal places.
pub fn round_to_2_decimals(value: f64) -> f64 {
    (value * 100.0 + 0.5).floor() / 100.0
}

/// Convert between two typed units of the same quantity.
pub fn convert_units(value: f64, from: Unit, to: Unit) -> Result<f64, ConversionError> {
    if from.quantity() != to.quantity() {
        return Err(ConversionError::QuantityMismatch { from, to });
    }

    if from == to {
        return Ok(value);
    }

    Ok(round_to_2_decimals(to.from_canonical(from.to_canonical(value))))
}

/// Convert `value` of `quantity` between two station-style unit labels.
///
/// Labels are compared case-insensitively with `/` and degree signs ignored,
/// so `km/h` and `KMH` name the same unit.
pub fn convert(
    value: f64,
    quantity: Quantity,
    from: &str,
    to: &str,
) -> Result<f64, ConversionError> {
    let from = Unit::parse(quantity, from)?;
    let to = Unit::parse(quantity, to)?;
    convert_units(value, from, to)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() <= 0.01 + 1e-9,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn fahrenheit_freezing_point_is_zero_celsius() {
        assert_eq!(convert(32.0, Quantity::Temperature, "F", "C").unwrap(), 0.0);
        assert_eq!(convert(100.0, Quantity::Temperature, "°C", "°F").unwrap(), 212.0);
    }

    #[test]
    fn one_knot_is_rounded_kmh() {
        assert_eq!(convert(1.0, Quantity::WindSpeed, "kts", "kmh").unwrap(), 1.85);
    }

    #[test]
    fn wind_pressure_and_rain_factors() {
        assert_eq!(convert(10.0, Quantity::WindSpeed, "m/s", "km/h").unwrap(), 36.0);
        assert_eq!(convert(10.0, Quantity::WindSpeed, "mph", "km/h").unwrap(), 16.09);
        assert_eq!(convert(1.0, Quantity::Pressure, "inHg", "hPa").unwrap(), 33.86);
        assert_eq!(convert(1013.2, Quantity::Pressure, "hPa", "mb").unwrap(), 1013.2);
        assert_eq!(convert(1.0, Quantity::Rain, "in", "mm").unwrap(), 25.4);
        assert_eq!(convert(25.4, Quantity::Rain, "mm", "in").unwrap(), 1.0);
    }

    #[test]
    fn identity_returns_value_unrounded() {
        let value = 12.34567;
        assert_eq!(convert(value, Quantity::WindSpeed, "km/h", "KMH").unwrap(), value);
        assert_eq!(convert(value, Quantity::Temperature, "°C", "c").unwrap(), value);
        assert_eq!(convert(value, Quantity::Pressure, "INHG", "inHg").unwrap(), value);
        assert_eq!(convert(value, Quantity::Rain, " mm ", "MM").unwrap(), value);
    }

    #[test]
    fn round_trip_stays_within_a_hundredth() {
        // Going through a coarser unit first loses more than a hundredth
        // (hPa -> inHg -> hPa), so only pairs that keep the resolution are checked.
        let pairs = [
            (Unit::Celsius, Unit::Fahrenheit),
            (Unit::Fahrenheit, Unit::Celsius),
            (Unit::Hpa, Unit::Mb),
            (Unit::Mb, Unit::Hpa),
            (Unit::InHg, Unit::Hpa),
            (Unit::InHg, Unit::Mb),
            (Unit::In, Unit::Mm),
            (Unit::Kts, Unit::Kmh),
            (Unit::Kmh, Unit::Kts),
            (Unit::Mph, Unit::Kmh),
            (Unit::Kmh, Unit::Mph),
            (Unit::Ms, Unit::Kmh),
            (Unit::Ms, Unit::Kts),
            (Unit::Kts, Unit::Mph),
            (Unit::Mph, Unit::Kts),
        ];
        let samples = [-12.5, 0.0, 3.3, 21.4, 1013.2];

        for (a, b) in pairs {
            for x in samples {
                let there = convert_units(x, a, b).unwrap();
                let back = convert_units(there, b, a).unwrap();
                assert_close(back, x);
            }
        }
    }

    #[test]
    fn rounding_is_half_up() {
        assert_eq!(round_to_2_decimals(1.005_000_1), 1.01);
        assert_eq!(round_to_2_decimals(-2.345), -2.34);
        assert_eq!(round_to_2_decimals(1.852), 1.85);
    }

    #[test]
    fn temperature_labels_match_on_final_letter() {
        assert_eq!(Unit::parse(Quantity::Temperature, "degC").unwrap(), Unit::Celsius);
        assert_eq!(Unit::parse(Quantity::Temperature, "°F").unwrap(), Unit::Fahrenheit);
        assert!(Unit::parse(Quantity::Temperature, "K").is_err());
    }

    #[test]
    fn plain_in_is_inches_of_mercury_for_pressure() {
        assert_eq!(Unit::parse(Quantity::Pressure, "in").unwrap(), Unit::InHg);
        assert_eq!(Unit::parse(Quantity::Rain, "in").unwrap(), Unit::In);
        assert_eq!(convert(29.92, Quantity::Pressure, "in", "hPa").unwrap(), 1013.21);
    }

    #[test]
    fn label_for_wrong_quantity_is_rejected() {
        let err = Unit::parse(Quantity::Rain, "hPa").unwrap_err();
        assert!(matches!(err, ConversionError::UnknownUnit { quantity: Quantity::Rain, .. }));
    }

    #[test]
    fn cross_quantity_conversion_fails() {
        let err = convert_units(1.0, Unit::Mm, Unit::Kmh).unwrap_err();
        assert_eq!(
            err,
            ConversionError::QuantityMismatch { from: Unit::Mm, to: Unit::Kmh }
        );
    }

    #[test]
    fn from_str_accepts_display_labels() {
        for quantity in Quantity::all() {
            for unit in quantity.units() {
                assert_eq!(unit.label().parse::<Unit>().unwrap(), *unit);
            }
        }
        assert!("furlongs".parse::<Unit>().is_err());
    }
}
