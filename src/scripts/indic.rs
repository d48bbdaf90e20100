//! Shaping support for Indic scripts.
//!
//! Shaping happens in character space before glyphs exist: two-part
//! vowels are decomposed, characters are lexically classified, the
//! classified run is segmented into syllables, and each syllable is
//! reordered for its script (Ra and pre-base matra repositioning).
//! The GSUB feature pipeline then runs over each syllable's glyph
//! window.

use crate::error::{ParseError, ShapingError};
use crate::gsub::{
    self, Direction, FeatureMask, GlyphBuffer, GlyphData,
};
use crate::layout::LayoutCache;
use crate::scripts::syllable::*;
use crate::tag;
use crate::DOTTED_CIRCLE;
use log::debug;
use unicode_general_category::{get_general_category, GeneralCategory};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum IndicScript {
    Devanagari,
    Bengali,
    Gurmukhi,
    Gujarati,
    Oriya,
    Tamil,
    Telugu,
    Kannada,
    Malayalam,
    Sinhala,
}

impl IndicScript {
    pub fn from_tag(script_tag: u32) -> Option<IndicScript> {
        match script_tag {
            tag::DEVA => Some(IndicScript::Devanagari),
            tag::BENG => Some(IndicScript::Bengali),
            tag::GURU => Some(IndicScript::Gurmukhi),
            tag::GUJR => Some(IndicScript::Gujarati),
            tag::ORYA => Some(IndicScript::Oriya),
            tag::TAML => Some(IndicScript::Tamil),
            tag::TELU => Some(IndicScript::Telugu),
            tag::KNDA => Some(IndicScript::Kannada),
            tag::MLYM => Some(IndicScript::Malayalam),
            tag::SINH => Some(IndicScript::Sinhala),
            _ => None,
        }
    }
}

/// Lexical class of a character within one Indic script.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LexicalClass {
    Generic,
    Consonant,
    Ra,
    Vowel,
    MatraPre,
    MatraAbove,
    MatraBelow,
    MatraPost,
    Halant,
    Nukta,
    Anudatta,
    Modifier,
    VedicSign,
    Zwj,
    Zwnj,
    Nbsp,
}

/// One syllable within a character buffer. `base` marks the base
/// consonant (or vowel), `ralf` a repositioned Ra-Halant pair. All
/// indices are inclusive and shift as reordering moves characters.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Syllable {
    pub start: usize,
    pub base: usize,
    pub end: usize,
    pub ralf: Option<usize>,
}

pub fn lex(script: IndicScript, ch: char) -> LexicalClass {
    use LexicalClass::*;
    let cp = u32::from(ch);
    match script {
        IndicScript::Devanagari => match cp {
            0x0901..=0x0903 => Modifier,
            0x0904..=0x0914 => Vowel,
            0x0930 => Ra,
            0x0915..=0x0939 => Consonant,
            0x093C => Nukta,
            0x093F => MatraPre,
            0x0941..=0x0944 => MatraBelow,
            0x0945..=0x0948 => MatraAbove,
            0x093E | 0x0940 | 0x0949..=0x094C => MatraPost,
            0x094D => Halant,
            0x0951 | 0x0953..=0x0954 => VedicSign,
            0x0952 => Anudatta,
            0x0958..=0x095F => Consonant,
            0x0960..=0x0961 => Vowel,
            0x0962..=0x0963 => MatraBelow,
            _ => common_lex(ch),
        },
        IndicScript::Bengali => match cp {
            0x0981..=0x0983 => Modifier,
            0x0985..=0x0994 => Vowel,
            0x09B0 => Ra,
            0x0995..=0x09B9 => Consonant,
            0x09BC => Nukta,
            0x09BF | 0x09C7..=0x09C8 => MatraPre,
            0x09C1..=0x09C4 => MatraBelow,
            0x09BE | 0x09C0 | 0x09CB..=0x09CC | 0x09D7 => MatraPost,
            0x09CD => Halant,
            0x09DC..=0x09DF => Consonant,
            0x09E0..=0x09E1 => Vowel,
            0x09E2..=0x09E3 => MatraBelow,
            0x09F0..=0x09F1 => Consonant,
            _ => common_lex(ch),
        },
        IndicScript::Gurmukhi => match cp {
            0x0A01..=0x0A03 => Modifier,
            0x0A05..=0x0A14 => Vowel,
            0x0A30 => Ra,
            0x0A15..=0x0A39 => Consonant,
            0x0A3C => Nukta,
            0x0A3F => MatraPre,
            0x0A41..=0x0A42 => MatraBelow,
            0x0A47..=0x0A48 | 0x0A4B..=0x0A4C => MatraAbove,
            0x0A3E | 0x0A40 => MatraPost,
            0x0A4D => Halant,
            0x0A59..=0x0A5E => Consonant,
            0x0A70..=0x0A71 => Modifier,
            _ => common_lex(ch),
        },
        IndicScript::Gujarati => match cp {
            0x0A81..=0x0A83 => Modifier,
            0x0A85..=0x0A94 => Vowel,
            0x0AB0 => Ra,
            0x0A95..=0x0AB9 => Consonant,
            0x0ABC => Nukta,
            0x0ABF => MatraPre,
            0x0AC1..=0x0AC4 => MatraBelow,
            0x0AC5 | 0x0AC7..=0x0AC8 => MatraAbove,
            0x0ABE | 0x0AC0 | 0x0AC9 | 0x0ACB..=0x0ACC => MatraPost,
            0x0ACD => Halant,
            0x0AE0..=0x0AE1 => Vowel,
            _ => common_lex(ch),
        },
        IndicScript::Oriya => match cp {
            0x0B01..=0x0B03 => Modifier,
            0x0B05..=0x0B14 => Vowel,
            0x0B30 => Ra,
            0x0B15..=0x0B39 => Consonant,
            0x0B3C => Nukta,
            0x0B47 => MatraPre,
            0x0B3F => MatraAbove,
            0x0B41..=0x0B44 => MatraBelow,
            0x0B3E | 0x0B40 | 0x0B48 | 0x0B4B..=0x0B4C | 0x0B56..=0x0B57 => MatraPost,
            0x0B4D => Halant,
            0x0B5C..=0x0B5F => Consonant,
            0x0B60..=0x0B61 => Vowel,
            0x0B71 => Consonant,
            _ => common_lex(ch),
        },
        IndicScript::Tamil => match cp {
            0x0B82..=0x0B83 => Modifier,
            0x0B85..=0x0B94 => Vowel,
            0x0BB0 => Ra,
            0x0B95..=0x0BB9 => Consonant,
            0x0BC6..=0x0BC8 => MatraPre,
            0x0BC0 => MatraAbove,
            0x0BBE..=0x0BBF | 0x0BC1..=0x0BC2 | 0x0BCA..=0x0BCC | 0x0BD7 => MatraPost,
            0x0BCD => Halant,
            _ => common_lex(ch),
        },
        IndicScript::Telugu => match cp {
            0x0C01..=0x0C03 => Modifier,
            0x0C05..=0x0C14 => Vowel,
            0x0C30 => Ra,
            0x0C15..=0x0C39 => Consonant,
            0x0C3E..=0x0C40 | 0x0C46..=0x0C48 | 0x0C4A..=0x0C4C | 0x0C55 => MatraAbove,
            0x0C41..=0x0C44 => MatraPost,
            0x0C56 => MatraBelow,
            0x0C4D => Halant,
            0x0C58..=0x0C59 => Consonant,
            0x0C60..=0x0C61 => Vowel,
            _ => common_lex(ch),
        },
        IndicScript::Kannada => match cp {
            0x0C82..=0x0C83 => Modifier,
            0x0C85..=0x0C94 => Vowel,
            0x0CB0 => Ra,
            0x0C95..=0x0CB9 => Consonant,
            0x0CBC => Nukta,
            0x0CBF | 0x0CC6 => MatraAbove,
            0x0CBE | 0x0CC0..=0x0CC4 | 0x0CC7..=0x0CC8 | 0x0CCA..=0x0CCB | 0x0CD5..=0x0CD6 => {
                MatraPost
            }
            0x0CCC => MatraBelow,
            0x0CCD => Halant,
            0x0CDE => Consonant,
            0x0CE0..=0x0CE1 => Vowel,
            _ => common_lex(ch),
        },
        IndicScript::Malayalam => match cp {
            0x0D02..=0x0D03 => Modifier,
            0x0D05..=0x0D14 => Vowel,
            0x0D30 => Ra,
            0x0D15..=0x0D39 => Consonant,
            0x0D46..=0x0D48 => MatraPre,
            0x0D3E..=0x0D44 | 0x0D4A..=0x0D4C | 0x0D57 => MatraPost,
            0x0D4D => Halant,
            0x0D60..=0x0D61 => Vowel,
            _ => common_lex(ch),
        },
        IndicScript::Sinhala => match cp {
            0x0D82..=0x0D83 => Modifier,
            0x0D85..=0x0D96 => Vowel,
            0x0DBB => Ra,
            0x0D9A..=0x0DC6 => Consonant,
            0x0DD9..=0x0DDB => MatraPre,
            0x0DCF..=0x0DD1 | 0x0DDC..=0x0DDF | 0x0DF2..=0x0DF3 => MatraPost,
            0x0DD2..=0x0DD3 => MatraAbove,
            0x0DD4 | 0x0DD6 => MatraBelow,
            0x0DCA => Halant,
            _ => common_lex(ch),
        },
    }
}

fn common_lex(ch: char) -> LexicalClass {
    match ch {
        '\u{200C}' => LexicalClass::Zwnj,
        '\u{200D}' => LexicalClass::Zwj,
        '\u{00A0}' => LexicalClass::Nbsp,
        _ => match get_general_category(ch) {
            GeneralCategory::NonspacingMark
            | GeneralCategory::SpacingMark
            | GeneralCategory::EnclosingMark => LexicalClass::Modifier,
            _ => LexicalClass::Generic,
        },
    }
}

/// Decompose two-part dependent vowels so the left half can be
/// repositioned independently of the right half. `clusters` stays
/// parallel to `chars`: every part keeps the source vowel's cluster.
pub fn decompose_matras(script: IndicScript, chars: &mut Vec<char>, clusters: &mut Vec<usize>) {
    let decomposition = |ch: char| -> Option<&'static [char]> {
        let parts: &'static [char] = match (script, ch) {
            (IndicScript::Bengali, '\u{09CB}') => &['\u{09C7}', '\u{09BE}'],
            (IndicScript::Bengali, '\u{09CC}') => &['\u{09C7}', '\u{09D7}'],
            (IndicScript::Oriya, '\u{0B48}') => &['\u{0B47}', '\u{0B56}'],
            (IndicScript::Oriya, '\u{0B4B}') => &['\u{0B47}', '\u{0B3E}'],
            (IndicScript::Oriya, '\u{0B4C}') => &['\u{0B47}', '\u{0B57}'],
            (IndicScript::Tamil, '\u{0BCA}') => &['\u{0BC6}', '\u{0BBE}'],
            (IndicScript::Tamil, '\u{0BCB}') => &['\u{0BC7}', '\u{0BBE}'],
            (IndicScript::Tamil, '\u{0BCC}') => &['\u{0BC6}', '\u{0BD7}'],
            (IndicScript::Kannada, '\u{0CC0}') => &['\u{0CBF}', '\u{0CD5}'],
            (IndicScript::Kannada, '\u{0CC7}') => &['\u{0CC6}', '\u{0CD5}'],
            (IndicScript::Kannada, '\u{0CC8}') => &['\u{0CC6}', '\u{0CD6}'],
            (IndicScript::Kannada, '\u{0CCA}') => &['\u{0CC6}', '\u{0CC2}'],
            (IndicScript::Kannada, '\u{0CCB}') => &['\u{0CC6}', '\u{0CC2}', '\u{0CD5}'],
            (IndicScript::Malayalam, '\u{0D4A}') => &['\u{0D46}', '\u{0D3E}'],
            (IndicScript::Malayalam, '\u{0D4B}') => &['\u{0D47}', '\u{0D3E}'],
            (IndicScript::Malayalam, '\u{0D4C}') => &['\u{0D46}', '\u{0D57}'],
            (IndicScript::Sinhala, '\u{0DDA}') => &['\u{0DD9}', '\u{0DCA}'],
            (IndicScript::Sinhala, '\u{0DDC}') => &['\u{0DD9}', '\u{0DCF}'],
            (IndicScript::Sinhala, '\u{0DDD}') => &['\u{0DD9}', '\u{0DCF}', '\u{0DCA}'],
            (IndicScript::Sinhala, '\u{0DDE}') => &['\u{0DD9}', '\u{0DDF}'],
            _ => return None,
        };
        Some(parts)
    };
    if chars.iter().any(|&ch| decomposition(ch).is_some()) {
        let mut decomposed = Vec::with_capacity(chars.len() + 1);
        let mut decomposed_clusters = Vec::with_capacity(chars.len() + 1);
        for (&ch, &cluster) in chars.iter().zip(clusters.iter()) {
            match decomposition(ch) {
                Some(parts) => {
                    decomposed.extend_from_slice(parts);
                    decomposed_clusters.extend(std::iter::repeat(cluster).take(parts.len()));
                }
                None => {
                    decomposed.push(ch);
                    decomposed_clusters.push(cluster);
                }
            }
        }
        *chars = decomposed;
        *clusters = decomposed_clusters;
    }
}

/// Give orphaned combining characters a stand-in base: a matra, halant
/// or modifier preceded by nothing or by a non-script character gets a
/// dotted circle inserted before it, sharing the mark's cluster.
/// Callers should check the font can display one first.
pub fn insert_dotted_circles(script: IndicScript, chars: &mut Vec<char>, clusters: &mut Vec<usize>) {
    let mut i = 0;
    while i < chars.len() {
        let class = lex(script, chars[i]);
        let combining = is_matra(class)
            || matches!(class, LexicalClass::Halant | LexicalClass::Modifier);
        let orphaned = combining
            && (i == 0
                || (chars[i - 1] != DOTTED_CIRCLE
                    && lex(script, chars[i - 1]) == LexicalClass::Generic));
        if orphaned {
            chars.insert(i, DOTTED_CIRCLE);
            clusters.insert(i, clusters[i]);
            i += 2;
        } else {
            i += 1;
        }
    }
}

fn is_consonant(class: LexicalClass) -> bool {
    matches!(class, LexicalClass::Consonant | LexicalClass::Ra)
}

fn is_matra(class: LexicalClass) -> bool {
    matches!(
        class,
        LexicalClass::MatraPre
            | LexicalClass::MatraAbove
            | LexicalClass::MatraBelow
            | LexicalClass::MatraPost
    )
}

fn is_joiner(class: LexicalClass) -> bool {
    matches!(class, LexicalClass::Zwj | LexicalClass::Zwnj)
}

fn is(class: LexicalClass) -> impl Fn(LexicalClass) -> bool {
    move |c| c == class
}

/// Match one syllable at the head of `classes`, returning its length
/// and the offset of its base character.
fn match_syllable(classes: &[LexicalClass]) -> Option<(usize, usize)> {
    match_consonant_syllable(classes).or_else(|| match_vowel_syllable(classes))
}

/// consonant-header* base-consonant tail
fn match_consonant_syllable(classes: &[LexicalClass]) -> Option<(usize, usize)> {
    use LexicalClass::*;
    // header: Consonant [Nukta] Halant [joiner]
    let header = match_seq(
        match_one(is_consonant),
        match_seq(
            match_optional(match_one(is(Nukta))),
            match_seq(
                match_one(is(Halant)),
                match_optional(match_one(is_joiner)),
            ),
        ),
    );

    // Headers only count when another consonant follows to act as (or
    // lead towards) the base; a trailing Consonant+Halant is a dead
    // consonant around the base instead.
    let mut offset = 0;
    while let Some(n) = header(&classes[offset..]) {
        if classes.get(offset + n).copied().is_some_and(is_consonant) {
            offset += n;
        } else {
            break;
        }
    }

    if !classes.get(offset).copied().is_some_and(is_consonant) {
        return None;
    }
    let base = offset;
    offset += 1;

    offset += match_optional(match_one(is(Nukta)))(&classes[offset..])?;
    offset += match_optional(match_one(is(Anudatta)))(&classes[offset..])?;

    let halant_tail = match_seq(
        match_one(is(Halant)),
        match_optional(match_one(is_joiner)),
    );
    let matra_tail = |cs: &[LexicalClass]| -> Option<usize> {
        let n1 = match_repeat(match_one(is_matra))(cs)?;
        let n2 = match_optional(match_one(is(Nukta)))(&cs[n1..])?;
        let n3 = match_optional(match_one(is(Halant)))(&cs[n1 + n2..])?;
        Some(n1 + n2 + n3)
    };
    offset += match_either(halant_tail, matra_tail)(&classes[offset..])?;

    offset += match_optional(match_one(is(Modifier)))(&classes[offset..])?;
    offset += match_optional(match_one(is(VedicSign)))(&classes[offset..])?;
    Some((offset, base))
}

/// Independent vowel syllable, including the Ra+Halant combining form
/// and the NBSP placeholder form.
fn match_vowel_syllable(classes: &[LexicalClass]) -> Option<(usize, usize)> {
    use LexicalClass::*;
    let mut offset = 0;
    if classes.first() == Some(&Ra)
        && classes.get(1) == Some(&Halant)
        && classes.get(2) == Some(&Vowel)
    {
        offset = 2;
    }
    let base = offset;
    match classes.get(offset) {
        Some(&Vowel) | Some(&Nbsp) => offset += 1,
        _ => return None,
    }

    offset += match_optional(match_one(is(Nukta)))(&classes[offset..])?;
    let halant_tail = match_seq(
        match_one(is(Halant)),
        match_optional(match_one(is_joiner)),
    );
    let matra_tail = match_repeat(match_one(is_matra));
    offset += match_either(halant_tail, matra_tail)(&classes[offset..])?;
    offset += match_optional(match_one(is(Modifier)))(&classes[offset..])?;
    offset += match_optional(match_one(is(VedicSign)))(&classes[offset..])?;
    Some((offset, base))
}

/// Segment a classified character run into syllables.
///
/// On a grammar mismatch the scan advances to the next Generic
/// character, so progress is guaranteed and the pass is O(n) even on
/// malformed input.
pub fn segment(classes: &[LexicalClass]) -> Vec<Syllable> {
    let mut syllables = Vec::new();
    let mut i = 0;
    while i < classes.len() {
        match match_syllable(&classes[i..]) {
            Some((len, base)) => {
                syllables.push(Syllable {
                    start: i,
                    base: i + base,
                    end: i + len - 1,
                    ralf: None,
                });
                i += len;
            }
            None => {
                let skip = classes[i..]
                    .iter()
                    .position(|&class| class == LexicalClass::Generic)
                    .map(|p| p.max(1))
                    .unwrap_or(classes.len() - i);
                i += skip;
            }
        }
    }
    syllables
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum RaMove {
    FollowsBase,
    FollowsMatra,
    FollowsSyllable,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum MatraMove {
    PrecedesBase,
    PrecedesSyllable,
}

fn reorder_strategy(script: IndicScript) -> (RaMove, MatraMove) {
    match script {
        IndicScript::Sinhala => (RaMove::FollowsBase, MatraMove::PrecedesBase),
        IndicScript::Bengali => (RaMove::FollowsBase, MatraMove::PrecedesSyllable),
        IndicScript::Devanagari
        | IndicScript::Gurmukhi
        | IndicScript::Gujarati
        | IndicScript::Oriya => (RaMove::FollowsMatra, MatraMove::PrecedesSyllable),
        IndicScript::Kannada | IndicScript::Telugu => {
            (RaMove::FollowsSyllable, MatraMove::PrecedesSyllable)
        }
        IndicScript::Malayalam | IndicScript::Tamil => {
            (RaMove::FollowsMatra, MatraMove::PrecedesBase)
        }
    }
}

/// Reorder one syllable in place for its script, keeping `classes` and
/// `clusters` parallel to `chars` and updating the syllable's indices
/// as characters move. Callers must not hold on to indices taken
/// before the call.
pub fn reorder_syllable(
    script: IndicScript,
    chars: &mut [char],
    classes: &mut [LexicalClass],
    clusters: &mut [usize],
    syllable: &mut Syllable,
) {
    if syllable.start == syllable.base && syllable.base == syllable.end {
        return;
    }
    if matches!(
        classes[syllable.base],
        LexicalClass::Vowel | LexicalClass::Nbsp
    ) {
        return;
    }
    let (ra_move, matra_move) = reorder_strategy(script);
    reorder_ra(ra_move, chars, classes, clusters, syllable);
    reorder_matra(matra_move, chars, classes, clusters, syllable);
}

/// Relocate a leading Ra+Halant pair after the base, the matras, or
/// the whole syllable.
fn reorder_ra(
    ra_move: RaMove,
    chars: &mut [char],
    classes: &mut [LexicalClass],
    clusters: &mut [usize],
    syllable: &mut Syllable,
) {
    let start = syllable.start;
    if classes[start] != LexicalClass::Ra
        || classes.get(start + 1) != Some(&LexicalClass::Halant)
        || syllable.base < start + 2
    {
        return;
    }
    let target = match ra_move {
        RaMove::FollowsBase => syllable.base,
        RaMove::FollowsSyllable => syllable.end,
        RaMove::FollowsMatra => {
            let mut j = syllable.base;
            while j + 1 <= syllable.end && is_matra(classes[j + 1]) {
                j += 1;
            }
            j
        }
    };
    chars[start..=target].rotate_left(2);
    classes[start..=target].rotate_left(2);
    clusters[start..=target].rotate_left(2);
    syllable.base -= 2;
    syllable.ralf = Some(target - 1);
}

/// Relocate a pre-base matra to just before the base consonant or the
/// whole syllable.
fn reorder_matra(
    matra_move: MatraMove,
    chars: &mut [char],
    classes: &mut [LexicalClass],
    clusters: &mut [usize],
    syllable: &mut Syllable,
) {
    let matra = (syllable.base + 1..=syllable.end)
        .find(|&j| classes[j] == LexicalClass::MatraPre);
    let matra = match matra {
        Some(matra) => matra,
        None => return,
    };
    let target = match matra_move {
        MatraMove::PrecedesBase => syllable.base,
        MatraMove::PrecedesSyllable => syllable.start,
    };
    chars[target..=matra].rotate_right(1);
    classes[target..=matra].rotate_right(1);
    clusters[target..=matra].rotate_right(1);
    syllable.base += 1;
    if let Some(ralf) = syllable.ralf {
        if ralf >= target && ralf < matra {
            syllable.ralf = Some(ralf + 1);
        }
    }
}

// The per-syllable feature pipeline: the basic features build the
// consonant cluster forms, the presentation features then apply
// across the shaped cluster. Flagged features are only applied when
// the font exposes them.
const BASIC_FEATURES: &[(u32, FeatureMask, bool)] = &[
    (tag::LOCL, FeatureMask::LOCL, false),
    (tag::NUKT, FeatureMask::NUKT, false),
    (tag::AKHN, FeatureMask::AKHN, false),
    (tag::RPHF, FeatureMask::RPHF, true),
    (tag::RKRF, FeatureMask::RKRF, true),
    (tag::BLWF, FeatureMask::BLWF, true),
    (tag::HALF, FeatureMask::HALF, true),
    (tag::VATU, FeatureMask::VATU, false),
    (tag::PSTF, FeatureMask::PSTF, false),
];

const PRESENTATION_FEATURES: &[(u32, FeatureMask, bool)] = &[
    (tag::PRES, FeatureMask::PRES, false),
    (tag::ABVS, FeatureMask::ABVS, false),
    (tag::BLWS, FeatureMask::BLWS, false),
    (tag::PSTS, FeatureMask::PSTS, false),
    (tag::HALN, FeatureMask::HALN, false),
    (tag::CALT, FeatureMask::CALT, false),
    (tag::LIGA, FeatureMask::LIGA, false),
    (tag::CLIG, FeatureMask::CLIG, false),
];

/// Probe which of the pipeline's features the font exposes.
fn available_features(
    gsub_cache: &LayoutCache,
    script_tag: u32,
    lang_tag: Option<u32>,
) -> Result<FeatureMask, ParseError> {
    let mut mask = FeatureMask::empty();
    for &(feature_tag, bit, _) in BASIC_FEATURES.iter().chain(PRESENTATION_FEATURES) {
        if gsub::gsub_feature_is_supported(gsub_cache, script_tag, lang_tag, feature_tag)? {
            mask |= bit;
        }
    }
    Ok(mask)
}

/// Apply the ordered Indic feature pipeline per syllable. The glyph
/// window for each syllable is recomputed from the cluster map after
/// every feature so ligature merges are accounted for.
pub fn gsub_apply_indic<T: GlyphData>(
    gsub_cache: &LayoutCache,
    script_tag: u32,
    lang_tag: Option<u32>,
    syllables: &[Syllable],
    buffer: &mut GlyphBuffer<T>,
) -> Result<(), ShapingError> {
    let script_table = match gsub_cache.layout_table.find_script_or_default(script_tag)? {
        Some(script_table) => script_table,
        None => return Err(ShapingError::UnsupportedScript(script_tag)),
    };
    let langsys = match script_table.find_langsys_or_default(lang_tag)? {
        Some(langsys) => langsys,
        None => return Err(ShapingError::UnsupportedScript(script_tag)),
    };
    let supported = available_features(gsub_cache, script_tag, lang_tag)?;
    debug!(
        "indic shaping {} syllable(s), features {:?}",
        syllables.len(),
        supported
    );

    for syllable in syllables {
        for features in [BASIC_FEATURES, PRESENTATION_FEATURES] {
            for &(feature_tag, bit, optional) in features {
                if optional && !supported.contains(bit) {
                    continue;
                }
                let start = buffer.log_clust[syllable.start];
                let end = buffer.log_clust[syllable.end] + 1;
                gsub::gsub_apply_feature_span(
                    gsub_cache,
                    langsys,
                    feature_tag,
                    Direction::LeftToRight,
                    buffer,
                    start,
                    end,
                )?;
            }
        }
    }
    Ok(())
}
