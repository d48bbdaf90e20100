pub mod arabic;
pub mod indic;
mod syllable;
pub mod syriac;

use crate::gsub::Direction;
use crate::tag;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ScriptType {
    Arabic,
    Default,
    Indic,
    Syriac,
}

impl From<u32> for ScriptType {
    fn from(script_tag: u32) -> Self {
        match script_tag {
            tag::ARAB => ScriptType::Arabic,
            tag::SYRC => ScriptType::Syriac,
            tag::DEVA => ScriptType::Indic,
            tag::BENG => ScriptType::Indic,
            tag::GURU => ScriptType::Indic,
            tag::GUJR => ScriptType::Indic,
            tag::ORYA => ScriptType::Indic,
            tag::TAML => ScriptType::Indic,
            tag::TELU => ScriptType::Indic,
            tag::KNDA => ScriptType::Indic,
            tag::MLYM => ScriptType::Indic,
            tag::SINH => ScriptType::Indic,
            _ => ScriptType::Default,
        }
    }
}

/// Direction glyph substitution proceeds in for a script.
pub fn script_direction(script_tag: u32) -> Direction {
    match script_tag {
        tag::ARAB | tag::SYRC | tag::HEBR => Direction::RightToLeft,
        _ => Direction::LeftToRight,
    }
}
