use crate::error::ParseError;
use std::fmt;

/// Generate a 4-byte table tag from a byte string
///
/// Example:
///
/// ```
/// use typeline::tag;
/// assert_eq!(tag!(b"GSUB"), 0x47535542);
/// ```
#[macro_export]
macro_rules! tag {
    ($w:expr) => {
        $crate::tag::tag(*$w)
    };
}

#[derive(PartialEq, Eq, Clone, Copy)]
pub struct DisplayTag(pub u32);

pub const fn tag(chars: [u8; 4]) -> u32 {
    ((chars[3] as u32) << 0)
        | ((chars[2] as u32) << 8)
        | ((chars[1] as u32) << 16)
        | ((chars[0] as u32) << 24)
}

pub fn from_string(s: &str) -> Result<u32, ParseError> {
    if s.len() > 4 {
        return Err(ParseError::BadValue);
    }

    let mut tag: u32 = 0;
    let mut count = 0;

    for c in s.chars() {
        if !c.is_ascii() || c.is_ascii_control() {
            return Err(ParseError::BadValue);
        }

        tag = (tag << 8) | (c as u32);
        count += 1;
    }

    while count < 4 {
        tag = (tag << 8) | (' ' as u32);
        count += 1;
    }

    Ok(tag)
}

impl fmt::Display for DisplayTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = self.0;
        let mut s = String::with_capacity(4);
        s.push(char::from((tag >> 24) as u8));
        s.push(char::from(((tag >> 16) & 255) as u8));
        s.push(char::from(((tag >> 8) & 255) as u8));
        s.push(char::from((tag & 255) as u8));
        if s.chars().any(|c| !c.is_ascii() || c.is_ascii_control()) {
            write!(f, "0x{:08x}", tag)
        } else {
            s.fmt(f)
        }
    }
}

impl fmt::Debug for DisplayTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.to_string().fmt(f)
    }
}

// Script tags
pub const ARAB: u32 = tag!(b"arab");
pub const BENG: u32 = tag!(b"beng");
pub const DEVA: u32 = tag!(b"deva");
pub const DFLT: u32 = tag!(b"DFLT");
pub const GUJR: u32 = tag!(b"gujr");
pub const GURU: u32 = tag!(b"guru");
pub const HEBR: u32 = tag!(b"hebr");
pub const KNDA: u32 = tag!(b"knda");
pub const LATN: u32 = tag!(b"latn");
pub const MLYM: u32 = tag!(b"mlym");
pub const ORYA: u32 = tag!(b"orya");
pub const SINH: u32 = tag!(b"sinh");
pub const SYRC: u32 = tag!(b"syrc");
pub const TAML: u32 = tag!(b"taml");
pub const TELU: u32 = tag!(b"telu");

// Feature tags
pub const ABVS: u32 = tag!(b"abvs");
pub const AKHN: u32 = tag!(b"akhn");
pub const BLWF: u32 = tag!(b"blwf");
pub const BLWS: u32 = tag!(b"blws");
pub const CALT: u32 = tag!(b"calt");
pub const CLIG: u32 = tag!(b"clig");
pub const FIN2: u32 = tag!(b"fin2");
pub const FIN3: u32 = tag!(b"fin3");
pub const FINA: u32 = tag!(b"fina");
pub const HALF: u32 = tag!(b"half");
pub const HALN: u32 = tag!(b"haln");
pub const INIT: u32 = tag!(b"init");
pub const ISOL: u32 = tag!(b"isol");
pub const LIGA: u32 = tag!(b"liga");
pub const LOCL: u32 = tag!(b"locl");
pub const MED2: u32 = tag!(b"med2");
pub const MEDI: u32 = tag!(b"medi");
pub const NUKT: u32 = tag!(b"nukt");
pub const PRES: u32 = tag!(b"pres");
pub const PSTF: u32 = tag!(b"pstf");
pub const PSTS: u32 = tag!(b"psts");
pub const RKRF: u32 = tag!(b"rkrf");
pub const RLIG: u32 = tag!(b"rlig");
pub const RPHF: u32 = tag!(b"rphf");
pub const VATU: u32 = tag!(b"vatu");

// Table tags
pub const GSUB: u32 = tag!(b"GSUB");

#[cfg(test)]
mod tests {
    use super::*;

    mod from_string {
        use super::*;

        #[test]
        fn test_four_chars() {
            let tag = from_string("beng").expect("invalid tag");

            assert_eq!(tag, 1650814567);
        }

        #[test]
        fn test_three_chars() {
            let tag = from_string("BEN").expect("invalid tag");

            assert_eq!(tag, 1111838240);
        }
    }

    mod display_tag {
        use crate::tag::{DisplayTag, GSUB};

        #[test]
        fn test_ascii() {
            assert_eq!(DisplayTag(GSUB).to_string(), "GSUB".to_string());
        }

        #[test]
        fn test_non_ascii() {
            assert_eq!(DisplayTag(0x12345678).to_string(), "0x12345678".to_string());
        }
    }
}
