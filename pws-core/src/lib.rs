//! Core library for the `pws` weather station tool.
//!
//! This crate defines:
//! - Detection of the station dialect from a source URL
//! - Parsers for clientraw.txt, realtime.txt and realtime.xml payloads
//! - Timestamp normalization and unit conversion
//! - Shared domain models (sources, payloads, readings, unit preferences)
//!
//! Nothing here performs I/O; fetching, storage and display belong to the
//! caller. It is used by `pws-cli`, but can also be reused by other binaries.

pub mod dialect;
pub mod error;
pub mod model;
pub mod timestamp;
pub mod units;

pub use dialect::{Dialect, DialectParser, dispatch, dispatch_and_parse};
pub use error::{ConversionError, ParseError};
pub use model::{RawPayload, SourceDescriptor, UnitPreferences, WeatherReading};
pub use units::{Quantity, Unit, convert, convert_units};
