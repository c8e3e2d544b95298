use crate::{
    dialect::{
        clientraw::ClientRawParser, realtime_txt::RealtimeTxtParser,
        realtime_xml::RealtimeXmlParser,
    },
    error::{ParseError, UnknownDialect},
    model::{RawPayload, SourceDescriptor, WeatherReading},
    units::{Quantity, Unit},
};
use std::fmt::Debug;
use tracing::debug;

pub mod clientraw;
pub mod realtime_txt;
pub mod realtime_xml;

/// The wire formats stations publish.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dialect {
    ClientRaw,
    RealtimeTxt,
    RealtimeXml,
}

impl Dialect {
    pub fn as_str(&self) -> &'static str {
        match self {
            Dialect::ClientRaw => "clientraw",
            Dialect::RealtimeTxt => "realtime-txt",
            Dialect::RealtimeXml => "realtime-xml",
        }
    }

    pub const fn all() -> &'static [Dialect] {
        &[Dialect::ClientRaw, Dialect::RealtimeTxt, Dialect::RealtimeXml]
    }

    /// Pick a dialect from the URL suffix, case-sensitively.
    ///
    /// `clientraw.txt` is checked before the generic `.txt`.
    pub fn from_url(url: &str) -> Option<Dialect> {
        if url.ends_with("clientraw.txt") {
            Some(Dialect::ClientRaw)
        } else if url.ends_with(".txt") {
            Some(Dialect::RealtimeTxt)
        } else if url.ends_with(".xml") {
            Some(Dialect::RealtimeXml)
        } else {
            None
        }
    }

    pub fn parser(&self) -> Box<dyn DialectParser> {
        match self {
            Dialect::ClientRaw => Box::new(ClientRawParser::default()),
            Dialect::RealtimeTxt => Box::new(RealtimeTxtParser::default()),
            Dialect::RealtimeXml => Box::new(RealtimeXmlParser),
        }
    }
}

impl std::fmt::Display for Dialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for Dialect {
    type Error = UnknownDialect;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let lower = value.to_lowercase();

        match lower.as_str() {
            "clientraw" => Ok(Dialect::ClientRaw),
            "realtime-txt" => Ok(Dialect::RealtimeTxt),
            "realtime-xml" => Ok(Dialect::RealtimeXml),
            _ => Err(UnknownDialect(value.to_string())),
        }
    }
}

/// Turns one payload body of a known dialect into a reading.
pub trait DialectParser: Send + Sync + Debug {
    fn dialect(&self) -> Dialect;

    fn parse(&self, body: &str) -> Result<WeatherReading, ParseError>;
}

/// Select a parser by the payload's source URL and run it.
///
/// The body is never inspected to choose the dialect.
pub fn dispatch(payload: RawPayload) -> Result<WeatherReading, ParseError> {
    let dialect = Dialect::from_url(&payload.source.url).ok_or_else(|| {
        ParseError::UnsupportedFormat {
            url: payload.source.url.clone(),
        }
    })?;

    debug!(source = %payload.source.name, url = %payload.source.url, %dialect, "Selected parser");
    dialect.parser().parse(&payload.text())
}

/// Convenience wrapper around [`dispatch`] for callers holding the pieces.
pub fn dispatch_and_parse(
    source: &SourceDescriptor,
    body: impl Into<Vec<u8>>,
) -> Result<WeatherReading, ParseError> {
    dispatch(RawPayload::new(source.clone(), body))
}

/// Space-delimited fields of a positional dialect line.
///
/// Only the surrounding whitespace is trimmed; consecutive spaces yield empty
/// fields so indices stay where the station put them.
pub(crate) fn positional_fields(body: &str) -> Vec<&str> {
    body.trim().split(' ').collect()
}

pub(crate) fn require_fields(
    dialect: Dialect,
    fields: &[&str],
    highest_index: usize,
) -> Result<(), ParseError> {
    let needed = highest_index + 1;
    if fields.len() < needed {
        return Err(ParseError::malformed(
            dialect,
            format!("expected at least {needed} fields, found {}", fields.len()),
        ));
    }
    Ok(())
}

/// Parse a numeric token; anything unreadable leaves the field empty.
pub(crate) fn number(text: &str, field: &'static str) -> Option<f64> {
    let cleaned = text.trim().trim_end_matches('%').trim();
    let value = cleaned
        .parse::<f64>()
        .ok()
        .or_else(|| {
            cleaned
                .split_whitespace()
                .next()
                .and_then(|first| first.parse::<f64>().ok())
        })
        .filter(|value| value.is_finite());

    if value.is_none() {
        debug!(field, text, "Dropping unreadable numeric field");
    }
    value
}

pub(crate) fn unit(quantity: Quantity, label: &str) -> Option<Unit> {
    match Unit::parse(quantity, label) {
        Ok(unit) => Some(unit),
        Err(err) => {
            debug!(%err, "Dropping field with unknown unit");
            None
        }
    }
}
