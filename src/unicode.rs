//! Unicode combining mark ordering.
//!
//! Marks are sorted by a *modified* combining class rather than the
//! canonical one: the Hebrew points are renumbered per the SBL Hebrew
//! ordering, and the Telugu length marks (CCC 84 and 91) are moved
//! below the virama so they are not reordered after a halant.

use unicode_ccc::{get_canonical_combining_class, CanonicalCombiningClass};

/// Modified combining class of a character. Zero means not reordered.
pub fn modified_combining_class(ch: char) -> u8 {
    use CanonicalCombiningClass as C;
    match get_canonical_combining_class(ch) {
        C::NotReordered => 0,
        C::Overlay => 1,
        C::HanReading => 6,
        C::Nukta => 7,
        C::KanaVoicing => 8,
        C::Virama => 9,
        // Hebrew points, renumbered per the SBL Hebrew Font User
        // Manual ordering.
        C::CCC10 => 22,
        C::CCC11 => 15,
        C::CCC12 => 16,
        C::CCC13 => 17,
        C::CCC14 => 23,
        C::CCC15 => 18,
        C::CCC16 => 19,
        C::CCC17 => 20,
        C::CCC18 => 21,
        C::CCC19 => 14,
        C::CCC20 => 24,
        C::CCC21 => 12,
        C::CCC22 => 25,
        C::CCC23 => 13,
        C::CCC24 => 10,
        C::CCC25 => 11,
        C::CCC26 => 26,
        // Arabic and Syriac.
        C::CCC27 => 27,
        C::CCC28 => 28,
        C::CCC29 => 29,
        C::CCC30 => 30,
        C::CCC31 => 31,
        C::CCC32 => 32,
        C::CCC33 => 33,
        C::CCC34 => 34,
        C::CCC35 => 35,
        C::CCC36 => 36,
        // Telugu length marks, kept below the virama so a mark after a
        // halant stays put.
        C::CCC84 => 4,
        C::CCC91 => 5,
        // Thai and Lao.
        C::CCC103 => 103,
        C::CCC107 => 107,
        C::CCC118 => 118,
        C::CCC122 => 122,
        // Tibetan.
        C::CCC129 => 129,
        C::CCC130 => 130,
        C::CCC132 => 132,
        C::AttachedBelow => 202,
        C::AttachedAbove => 214,
        C::AttachedAboveRight => 216,
        C::BelowLeft => 218,
        C::Below => 220,
        C::BelowRight => 222,
        C::Left => 224,
        C::Right => 226,
        C::AboveLeft => 228,
        C::Above => 230,
        C::AboveRight => 232,
        C::DoubleBelow => 233,
        C::DoubleAbove => 234,
        C::IotaSubscript => 240,
    }
}

/// Stable-sort each run of non-starters by modified combining class.
/// `ch` extracts the character from an item, so callers can sort
/// characters together with per-character bookkeeping.
pub fn sort_by_modified_combining_class<T>(items: &mut [T], ch: impl Fn(&T) -> char) {
    for run in items.split_mut(|item| modified_combining_class(ch(item)) == 0) {
        run.sort_by_key(|item| modified_combining_class(ch(item)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starters_are_class_zero() {
        assert_eq!(modified_combining_class('a'), 0);
        assert_eq!(modified_combining_class('\u{05D0}'), 0);
    }

    #[test]
    fn sort_reorders_marks_only() {
        // a + acute (above, 230) + cedilla (attached below, 202): the
        // marks swap, the base stays.
        let mut cs = vec!['a', '\u{0301}', '\u{0327}', 'b'];
        sort_by_modified_combining_class(&mut cs, |&c| c);
        assert_eq!(cs, vec!['a', '\u{0327}', '\u{0301}', 'b']);
    }

    #[test]
    fn sort_is_stable_within_a_class() {
        let mut cs = vec!['\u{0301}', '\u{0300}'];
        sort_by_modified_combining_class(&mut cs, |&c| c);
        assert_eq!(cs, vec!['\u{0301}', '\u{0300}']);
    }

    #[test]
    fn telugu_length_mark_stays_after_halant() {
        // KA + VIRAMA (9) + AI LENGTH MARK (CCC 84, remapped to 4):
        // without the remap the length mark would sort after the
        // virama's class and move.
        assert!(modified_combining_class('\u{0C56}') < modified_combining_class('\u{0C4D}'));
    }
}
