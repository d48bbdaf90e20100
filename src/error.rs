//! Error types

use crate::binary::read::ReadEof;
use crate::tag::DisplayTag;
use std::fmt;

/// Error returned from shaping functions
#[derive(Clone, Eq, PartialEq, Debug)]
pub enum ShapingError {
    ComplexScript(ComplexScriptError),
    Parse(ParseError),
    /// The font lacks the features this script requires. Callers are
    /// expected to fall back to unshaped base glyphs.
    UnsupportedScript(u32),
}

impl From<ComplexScriptError> for ShapingError {
    fn from(error: ComplexScriptError) -> Self {
        ShapingError::ComplexScript(error)
    }
}

impl From<ParseError> for ShapingError {
    fn from(error: ParseError) -> Self {
        ShapingError::Parse(error)
    }
}

impl From<std::num::TryFromIntError> for ShapingError {
    fn from(_error: std::num::TryFromIntError) -> Self {
        ShapingError::Parse(ParseError::BadValue)
    }
}

impl fmt::Display for ShapingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShapingError::ComplexScript(err) => write!(f, "complex script shaping: {}", err),
            ShapingError::Parse(err) => write!(f, "shaping parse: {}", err),
            ShapingError::UnsupportedScript(tag) => {
                write!(f, "font does not support script '{}'", DisplayTag(*tag))
            }
        }
    }
}

impl std::error::Error for ShapingError {}

/// Error returned when shaping complex scripts
#[derive(Clone, Eq, PartialEq, Debug)]
pub enum ComplexScriptError {
    EmptyBuffer,
    MissingBaseConsonant,
    MissingGlyph(char),
    UnexpectedGlyphOrigin,
}

impl fmt::Display for ComplexScriptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComplexScriptError::EmptyBuffer => write!(f, "empty buffer"),
            ComplexScriptError::MissingBaseConsonant => write!(f, "missing base consonant"),
            ComplexScriptError::MissingGlyph(ch) => {
                write!(f, "no glyph for U+{:04X}", u32::from(*ch))
            }
            ComplexScriptError::UnexpectedGlyphOrigin => write!(f, "unexpected glyph origin"),
        }
    }
}

impl std::error::Error for ComplexScriptError {}

/// Errors that originate when parsing binary data
#[derive(Clone, Eq, PartialEq, Debug)]
pub enum ParseError {
    BadEof,
    BadValue,
    BadVersion,
    BadOffset,
    BadIndex,
    LimitExceeded,
    MissingValue,
    NotImplemented,
}

impl From<ReadEof> for ParseError {
    fn from(_error: ReadEof) -> Self {
        ParseError::BadEof
    }
}

impl From<std::num::TryFromIntError> for ParseError {
    fn from(_error: std::num::TryFromIntError) -> Self {
        ParseError::BadValue
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::BadEof => write!(f, "end of data reached unexpectedly"),
            ParseError::BadValue => write!(f, "invalid value"),
            ParseError::BadVersion => write!(f, "unexpected data version"),
            ParseError::BadOffset => write!(f, "invalid data offset"),
            ParseError::BadIndex => write!(f, "invalid data index"),
            ParseError::LimitExceeded => write!(f, "limit exceeded"),
            ParseError::MissingValue => write!(f, "an expected data value was missing"),
            ParseError::NotImplemented => write!(f, "feature not implemented"),
        }
    }
}

impl std::error::Error for ParseError {}
