//! Bidirectional character classification.

use unicode_bidi::{bidi_class, BidiClass};

/// Bidirectional class of a character.
///
/// Assigned once at classification time; the resolution passes rewrite
/// classes in place but never character identity.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Class {
    ON,
    L,
    R,
    AN,
    EN,
    AL,
    NSM,
    CS,
    ES,
    ET,
    BN,
    S,
    WS,
    B,
    RLO,
    RLE,
    LRO,
    LRE,
    PDF,
    LRI,
    RLI,
    FSI,
    PDI,
}

impl Class {
    /// RLE, LRE, RLO, LRO, RLI, LRI or FSI.
    pub fn is_explicit_initiator(self) -> bool {
        self.is_embedding_initiator() || self.is_isolate_initiator()
    }

    /// RLE, LRE, RLO or LRO.
    pub fn is_embedding_initiator(self) -> bool {
        matches!(self, Class::RLE | Class::LRE | Class::RLO | Class::LRO)
    }

    /// RLI, LRI or FSI.
    pub fn is_isolate_initiator(self) -> bool {
        matches!(self, Class::RLI | Class::LRI | Class::FSI)
    }

    /// Classes rewritten to BN by rule X9 after explicit resolution.
    pub fn is_removed_by_x9(self) -> bool {
        self.is_embedding_initiator() || self == Class::PDF
    }

    /// Neutral or isolate formatting character (the NI set of the
    /// neutral-resolution rules).
    pub fn is_neutral_or_isolate(self) -> bool {
        matches!(
            self,
            Class::B | Class::S | Class::WS | Class::ON
        ) || self.is_isolate_initiator()
            || self == Class::PDI
    }
}

/// Classify a character by its Unicode bidirectional category.
pub fn classify(ch: char) -> Class {
    match bidi_class(ch) {
        BidiClass::ON => Class::ON,
        BidiClass::L => Class::L,
        BidiClass::R => Class::R,
        BidiClass::AN => Class::AN,
        BidiClass::EN => Class::EN,
        BidiClass::AL => Class::AL,
        BidiClass::NSM => Class::NSM,
        BidiClass::CS => Class::CS,
        BidiClass::ES => Class::ES,
        BidiClass::ET => Class::ET,
        BidiClass::BN => Class::BN,
        BidiClass::S => Class::S,
        BidiClass::WS => Class::WS,
        BidiClass::B => Class::B,
        BidiClass::RLO => Class::RLO,
        BidiClass::RLE => Class::RLE,
        BidiClass::LRO => Class::LRO,
        BidiClass::LRE => Class::LRE,
        BidiClass::PDF => Class::PDF,
        BidiClass::LRI => Class::LRI,
        BidiClass::RLI => Class::RLI,
        BidiClass::FSI => Class::FSI,
        BidiClass::PDI => Class::PDI,
    }
}

/// Coarse directional strength used by external run segmentation.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Strength {
    Strong,
    Weak,
    Neutral,
}

pub fn strength(class: Class) -> Strength {
    match class {
        Class::L | Class::R | Class::AL => Strength::Strong,
        class if class.is_explicit_initiator() => Strength::Strong,
        Class::EN
        | Class::ES
        | Class::ET
        | Class::AN
        | Class::CS
        | Class::NSM
        | Class::BN
        | Class::PDF
        | Class::PDI => Strength::Weak,
        _ => Strength::Neutral,
    }
}
