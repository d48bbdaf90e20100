//! Shaping support for Arabic.
//!
//! Letter joining states are computed from Unicode joining types, then
//! either the font's GSUB form features (`isol`, `fina`, `medi`,
//! `init`) are applied, or, when the font carries no Arabic layout
//! rules, the Unicode presentation forms (U+FE80..U+FEFC) stand in for
//! them.

use crate::error::{ParseError, ShapingError};
use crate::gsub::{self, Direction, GlyphBuffer, GlyphData, GlyphOrigin, RawGlyph};
use crate::layout::LayoutCache;
use crate::shape::GlyphLookup;
use crate::tag;
use lazy_static::lazy_static;
use log::debug;
use std::collections::HashMap;
use unicode_joining_type::{get_joining_type, JoiningType};

#[derive(Clone)]
pub(super) struct ArabicData {
    joining_type: JoiningType,
    // Form feature this glyph takes, per the joining state machine.
    pub(super) feature_tag: u32,
}

impl GlyphData for ArabicData {
    fn merge(data1: ArabicData, _data2: ArabicData) -> ArabicData {
        data1
    }
}

pub(super) type ArabicGlyph = RawGlyph<ArabicData>;

impl ArabicGlyph {
    pub(super) fn is_transparent(&self) -> bool {
        self.extra_data.joining_type == JoiningType::Transparent
    }

    pub(super) fn is_left_joining(&self) -> bool {
        matches!(
            self.extra_data.joining_type,
            JoiningType::LeftJoining | JoiningType::DualJoining | JoiningType::JoinCausing
        )
    }

    pub(super) fn is_right_joining(&self) -> bool {
        matches!(
            self.extra_data.joining_type,
            JoiningType::RightJoining | JoiningType::DualJoining | JoiningType::JoinCausing
        )
    }
}

impl From<&RawGlyph<()>> for ArabicGlyph {
    fn from(raw_glyph: &RawGlyph<()>) -> ArabicGlyph {
        // There is no character to derive a joining type from once a
        // glyph is the product of substitution, so those are treated
        // as non-joining.
        let joining_type = match raw_glyph.glyph_origin {
            GlyphOrigin::Char(c) => get_joining_type(c),
            GlyphOrigin::Direct => JoiningType::NonJoining,
        };
        ArabicGlyph {
            unicodes: raw_glyph.unicodes.clone(),
            glyph_index: raw_glyph.glyph_index,
            glyph_origin: raw_glyph.glyph_origin,
            extra_data: ArabicData {
                joining_type,
                // Every letter starts out isolated; the joining state
                // machine upgrades them pairwise.
                feature_tag: tag::ISOL,
            },
        }
    }
}

impl From<&ArabicGlyph> for RawGlyph<()> {
    fn from(arabic_glyph: &ArabicGlyph) -> RawGlyph<()> {
        RawGlyph {
            unicodes: arabic_glyph.unicodes.clone(),
            glyph_index: arabic_glyph.glyph_index,
            glyph_origin: arabic_glyph.glyph_origin,
            extra_data: (),
        }
    }
}

pub(super) fn to_arabic_buffer(buffer: &GlyphBuffer<()>) -> GlyphBuffer<ArabicData> {
    GlyphBuffer {
        glyphs: buffer.glyphs.iter().map(ArabicGlyph::from).collect(),
        log_clust: buffer.log_clust.clone(),
    }
}

pub(super) fn from_arabic_buffer(buffer: GlyphBuffer<ArabicData>) -> GlyphBuffer<()> {
    GlyphBuffer {
        glyphs: buffer.glyphs.iter().map(RawGlyph::from).collect(),
        log_clust: buffer.log_clust,
    }
}

/// Assign a form feature to every glyph by walking adjacent
/// non-transparent pairs: a letter that joins leftward followed by one
/// that joins rightward upgrades the pair (`isol` to `init`, `fina` to
/// `medi`).
pub(super) fn compute_joining_states(glyphs: &mut [ArabicGlyph]) {
    let mut previous_i = match glyphs.iter().position(|g| !g.is_transparent()) {
        Some(i) => i,
        None => return,
    };
    for i in (previous_i + 1)..glyphs.len() {
        if glyphs[i].is_transparent() {
            continue;
        }
        if glyphs[previous_i].is_left_joining() && glyphs[i].is_right_joining() {
            glyphs[i].extra_data.feature_tag = tag::FINA;
            match glyphs[previous_i].extra_data.feature_tag {
                tag::ISOL => glyphs[previous_i].extra_data.feature_tag = tag::INIT,
                tag::FINA => glyphs[previous_i].extra_data.feature_tag = tag::MEDI,
                _ => {}
            }
        }
        previous_i = i;
    }
}

/// Apply a form feature to exactly the glyphs the joining state machine
/// assigned it to.
pub(super) fn apply_form_feature<T: GlyphData>(
    gsub_cache: &LayoutCache,
    langsys: &crate::layout::LangSys,
    feature_tag: u32,
    buffer: &mut GlyphBuffer<T>,
    tag_of: impl Fn(&T) -> u32,
) -> Result<(), ParseError> {
    let mut i = 0;
    while i < buffer.glyphs.len() {
        if tag_of(&buffer.glyphs[i].extra_data) != feature_tag {
            i += 1;
            continue;
        }
        match gsub::gsub_apply_feature(
            gsub_cache,
            langsys,
            feature_tag,
            Direction::RightToLeft,
            buffer,
            i,
        )? {
            Some(next) => i = next.max(i + 1),
            None => i += 1,
        }
    }
    Ok(())
}

const FORM_FEATURES: &[u32] = &[tag::ISOL, tag::FINA, tag::MEDI, tag::INIT];

/// Shape an Arabic glyph run with the font's GSUB rules.
///
/// Fails with [`ShapingError::UnsupportedScript`] when the font has no
/// Arabic layout rules at all, in which case the caller falls back to
/// [`apply_presentation_forms`].
pub fn gsub_apply_arabic(
    gsub_cache: &LayoutCache,
    script_tag: u32,
    lang_tag: Option<u32>,
    buffer: &mut GlyphBuffer<()>,
) -> Result<(), ShapingError> {
    let script_table = match gsub_cache.layout_table.find_script_or_default(script_tag)? {
        Some(script_table) => script_table,
        None => return Err(ShapingError::UnsupportedScript(script_tag)),
    };
    let langsys = match script_table.find_langsys_or_default(lang_tag)? {
        Some(langsys) => langsys,
        None => return Err(ShapingError::UnsupportedScript(script_tag)),
    };
    let any_form_supported = FORM_FEATURES.iter().try_fold(false, |any, &feature_tag| {
        gsub::gsub_feature_is_supported(gsub_cache, script_tag, lang_tag, feature_tag)
            .map(|supported| any || supported)
    })?;
    if !any_form_supported {
        debug!("font exposes no arabic form features");
        return Err(ShapingError::UnsupportedScript(script_tag));
    }

    let mut arabic_buffer = to_arabic_buffer(buffer);
    compute_joining_states(&mut arabic_buffer.glyphs);

    gsub::gsub_apply_feature_span(
        gsub_cache,
        langsys,
        tag::LOCL,
        Direction::RightToLeft,
        &mut arabic_buffer,
        0,
        usize::MAX,
    )?;
    for &feature_tag in FORM_FEATURES {
        apply_form_feature(gsub_cache, langsys, feature_tag, &mut arabic_buffer, |data| {
            data.feature_tag
        })?;
    }
    for feature_tag in [tag::RLIG, tag::CALT, tag::LIGA] {
        gsub::gsub_apply_feature_span(
            gsub_cache,
            langsys,
            feature_tag,
            Direction::RightToLeft,
            &mut arabic_buffer,
            0,
            usize::MAX,
        )?;
    }

    *buffer = from_arabic_buffer(arabic_buffer);
    Ok(())
}

lazy_static! {
    /// Presentation form block base and form count per letter: 1 is
    /// isolated only, 2 adds the final form, 4 all four forms. The
    /// forms are contiguous from the base in isolated, final, initial,
    /// medial order.
    static ref PRESENTATION_FORMS: HashMap<char, (u32, u32)> = {
        const ENTRIES: &[(char, u32, u32)] = &[
            ('\u{0621}', 0xFE80, 1),
            ('\u{0622}', 0xFE81, 2),
            ('\u{0623}', 0xFE83, 2),
            ('\u{0624}', 0xFE85, 2),
            ('\u{0625}', 0xFE87, 2),
            ('\u{0626}', 0xFE89, 4),
            ('\u{0627}', 0xFE8D, 2),
            ('\u{0628}', 0xFE8F, 4),
            ('\u{0629}', 0xFE93, 2),
            ('\u{062A}', 0xFE95, 4),
            ('\u{062B}', 0xFE99, 4),
            ('\u{062C}', 0xFE9D, 4),
            ('\u{062D}', 0xFEA1, 4),
            ('\u{062E}', 0xFEA5, 4),
            ('\u{062F}', 0xFEA9, 2),
            ('\u{0630}', 0xFEAB, 2),
            ('\u{0631}', 0xFEAD, 2),
            ('\u{0632}', 0xFEAF, 2),
            ('\u{0633}', 0xFEB1, 4),
            ('\u{0634}', 0xFEB5, 4),
            ('\u{0635}', 0xFEB9, 4),
            ('\u{0636}', 0xFEBD, 4),
            ('\u{0637}', 0xFEC1, 4),
            ('\u{0638}', 0xFEC5, 4),
            ('\u{0639}', 0xFEC9, 4),
            ('\u{063A}', 0xFECD, 4),
            ('\u{0641}', 0xFED1, 4),
            ('\u{0642}', 0xFED5, 4),
            ('\u{0643}', 0xFED9, 4),
            ('\u{0644}', 0xFEDD, 4),
            ('\u{0645}', 0xFEE1, 4),
            ('\u{0646}', 0xFEE5, 4),
            ('\u{0647}', 0xFEE9, 4),
            ('\u{0648}', 0xFEED, 2),
            ('\u{0649}', 0xFEEF, 2),
            ('\u{064A}', 0xFEF1, 4),
        ];
        ENTRIES
            .iter()
            .map(|&(ch, base, count)| (ch, (base, count)))
            .collect()
    };
}

/// Presentation form of `ch` for a joining state feature tag, if the
/// letter has one.
pub fn presentation_form(ch: char, feature_tag: u32) -> Option<char> {
    let &(base, count) = PRESENTATION_FORMS.get(&ch)?;
    let offset = match feature_tag {
        tag::ISOL => 0,
        tag::FINA => 1,
        tag::INIT => 2,
        tag::MEDI => 3,
        _ => return None,
    };
    if offset >= count {
        return None;
    }
    char::from_u32(base + offset)
}

/// Isolated presentation form of the lam-alef ligature for the given
/// alef variant; the final form is the next code point up.
fn lam_alef_isolated(alef: char) -> Option<char> {
    match u32::from(alef) {
        0x0622 => Some('\u{FEF5}'),
        0x0623 => Some('\u{FEF7}'),
        0x0625 => Some('\u{FEF9}'),
        0x0627 => Some('\u{FEFB}'),
        _ => None,
    }
}

/// Shape with Unicode presentation forms when the font has no Arabic
/// GSUB rules: the lam-alef ligatures are formed first, then each
/// letter is replaced by the form glyph for its joining state. Letters
/// whose form the font cannot display are left as base glyphs.
pub fn apply_presentation_forms<L: GlyphLookup>(
    font: &L,
    buffer: &mut GlyphBuffer<()>,
) -> Result<(), ShapingError> {
    let mut arabic_buffer = to_arabic_buffer(buffer);
    compute_joining_states(&mut arabic_buffer.glyphs);

    // Lam-alef ligatures. The ligature takes its final form when the
    // lam itself was joined from the right.
    let mut i = 0;
    while i + 1 < arabic_buffer.glyphs.len() {
        let lam_is_lam = matches!(
            arabic_buffer.glyphs[i].glyph_origin,
            GlyphOrigin::Char('\u{0644}')
        );
        let alef = match arabic_buffer.glyphs[i + 1].glyph_origin {
            GlyphOrigin::Char(c) => c,
            GlyphOrigin::Direct => {
                i += 1;
                continue;
            }
        };
        let isolated = match (lam_is_lam, lam_alef_isolated(alef)) {
            (true, Some(isolated)) => isolated,
            _ => {
                i += 1;
                continue;
            }
        };
        let lam_joined = matches!(
            arabic_buffer.glyphs[i].extra_data.feature_tag,
            tag::FINA | tag::MEDI
        );
        let ligature = if lam_joined {
            char::from_u32(u32::from(isolated) + 1).unwrap_or(isolated)
        } else {
            isolated
        };
        match font.char_to_glyph(ligature) {
            Some(glyph_index) => {
                arabic_buffer.glyphs[i].glyph_index = glyph_index;
                arabic_buffer.glyphs[i].glyph_origin = GlyphOrigin::Direct;
                i = arabic_buffer.ligate(i, &[i + 1]) + 1;
            }
            None => i += 1,
        }
    }

    for glyph in arabic_buffer.glyphs.iter_mut() {
        let ch = match glyph.glyph_origin {
            GlyphOrigin::Char(c) => c,
            GlyphOrigin::Direct => continue,
        };
        let form = match presentation_form(ch, glyph.extra_data.feature_tag) {
            Some(form) => form,
            None => continue,
        };
        if let Some(glyph_index) = font.char_to_glyph(form) {
            glyph.glyph_index = glyph_index;
            glyph.glyph_origin = GlyphOrigin::Direct;
        }
    }

    *buffer = from_arabic_buffer(arabic_buffer);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tinyvec::tiny_vec;

    fn raw(ch: char) -> RawGlyph<()> {
        RawGlyph {
            unicodes: tiny_vec![[char; 1] => ch],
            glyph_index: u32::from(ch) as u16,
            glyph_origin: GlyphOrigin::Char(ch),
            extra_data: (),
        }
    }

    fn states(text: &str) -> Vec<u32> {
        let raw_glyphs: Vec<RawGlyph<()>> = text.chars().map(raw).collect();
        let mut glyphs: Vec<ArabicGlyph> = raw_glyphs.iter().map(ArabicGlyph::from).collect();
        compute_joining_states(&mut glyphs);
        glyphs.iter().map(|g| g.extra_data.feature_tag).collect()
    }

    #[test]
    fn isolated_letter() {
        assert_eq!(states("\u{0628}"), vec![tag::ISOL]);
    }

    #[test]
    fn two_dual_joining_letters() {
        // BEH BEH: init, fina.
        assert_eq!(states("\u{0628}\u{0628}"), vec![tag::INIT, tag::FINA]);
    }

    #[test]
    fn three_dual_joining_letters() {
        assert_eq!(
            states("\u{0628}\u{0628}\u{0628}"),
            vec![tag::INIT, tag::MEDI, tag::FINA]
        );
    }

    #[test]
    fn right_joining_letter_breaks_the_chain() {
        // BEH DAL BEH: dal joins right but not left, so the run breaks.
        assert_eq!(
            states("\u{0628}\u{062F}\u{0628}"),
            vec![tag::INIT, tag::FINA, tag::ISOL]
        );
    }

    #[test]
    fn transparent_marks_are_skipped() {
        // BEH FATHA BEH: the combining mark does not break joining.
        assert_eq!(
            states("\u{0628}\u{064E}\u{0628}"),
            vec![tag::INIT, tag::ISOL, tag::FINA]
        );
    }

    #[test]
    fn presentation_form_lookup() {
        assert_eq!(presentation_form('\u{0628}', tag::ISOL), Some('\u{FE8F}'));
        assert_eq!(presentation_form('\u{0628}', tag::MEDI), Some('\u{FE92}'));
        // Alef has no medial form.
        assert_eq!(presentation_form('\u{0627}', tag::MEDI), None);
        // Hamza is isolated only.
        assert_eq!(presentation_form('\u{0621}', tag::FINA), None);
        assert_eq!(presentation_form('a', tag::ISOL), None);
    }

    #[test]
    fn lam_alef_forms() {
        assert_eq!(lam_alef_isolated('\u{0627}'), Some('\u{FEFB}'));
        assert_eq!(lam_alef_isolated('\u{0628}'), None);
    }
}
