use thiserror::Error;

use crate::{
    dialect::Dialect,
    units::{Quantity, Unit},
};

/// Structural failures that abort a whole parse.
///
/// Anything narrower (one bad token, an unparsable timestamp, a missing XML
/// field) never surfaces here; the affected field is left empty instead.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("Unsupported source format: '{url}' does not end with clientraw.txt, .txt or .xml")]
    UnsupportedFormat { url: String },

    #[error("Malformed {dialect} payload: {reason}")]
    MalformedPayload { dialect: Dialect, reason: String },
}

impl ParseError {
    pub(crate) fn malformed(dialect: Dialect, reason: impl Into<String>) -> Self {
        ParseError::MalformedPayload {
            dialect,
            reason: reason.into(),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConversionError {
    #[error("Unknown {quantity} unit '{label}'")]
    UnknownUnit { quantity: Quantity, label: String },

    #[error("Unrecognized unit label '{label}'")]
    UnrecognizedLabel { label: String },

    #[error("Cannot convert {from} ({}) to {to} ({})", .from.quantity(), .to.quantity())]
    QuantityMismatch { from: Unit, to: Unit },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown dialect '{0}'. Supported dialects: clientraw, realtime-txt, realtime-xml.")]
pub struct UnknownDialect(pub String);
