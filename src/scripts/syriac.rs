//! Shaping support for Syriac.
//!
//! Syriac joins like Arabic but adds special treatment of Alaph at the
//! end of a word: its form depends on what precedes it (`fina`, `fin2`
//! or `fin3`), and a medial Alaph after an unjoinable letter takes
//! `med2`.

use crate::error::ShapingError;
use crate::gsub::{self, Direction, GlyphBuffer, GlyphData, GlyphOrigin, RawGlyph};
use crate::layout::LayoutCache;
use crate::scripts::arabic::apply_form_feature;
use crate::tag;
use unicode_joining_type::{get_joining_group, get_joining_type, JoiningGroup, JoiningType};

#[derive(Clone)]
struct SyriacData {
    joining_group: JoiningGroup,
    joining_type: JoiningType,
    feature_tag: u32,
}

impl GlyphData for SyriacData {
    fn merge(data1: SyriacData, _data2: SyriacData) -> SyriacData {
        data1
    }
}

type SyriacGlyph = RawGlyph<SyriacData>;

impl SyriacGlyph {
    fn is_alaph(&self) -> bool {
        self.extra_data.joining_group == JoiningGroup::Alaph
    }

    fn is_dalath_rish(&self) -> bool {
        self.extra_data.joining_group == JoiningGroup::DalathRish
    }

    fn is_transparent(&self) -> bool {
        self.extra_data.joining_type == JoiningType::Transparent
    }

    fn is_non_joining(&self) -> bool {
        self.extra_data.joining_type == JoiningType::NonJoining
    }

    fn is_left_joining(&self) -> bool {
        matches!(
            self.extra_data.joining_type,
            JoiningType::LeftJoining | JoiningType::DualJoining | JoiningType::JoinCausing
        )
    }

    fn is_right_joining(&self) -> bool {
        matches!(
            self.extra_data.joining_type,
            JoiningType::RightJoining | JoiningType::DualJoining | JoiningType::JoinCausing
        )
    }
}

impl From<&RawGlyph<()>> for SyriacGlyph {
    fn from(raw_glyph: &RawGlyph<()>) -> SyriacGlyph {
        let (joining_type, joining_group) = match raw_glyph.glyph_origin {
            GlyphOrigin::Char(c) => (get_joining_type(c), get_joining_group(c)),
            GlyphOrigin::Direct => (JoiningType::NonJoining, JoiningGroup::NoJoiningGroup),
        };
        SyriacGlyph {
            unicodes: raw_glyph.unicodes.clone(),
            glyph_index: raw_glyph.glyph_index,
            glyph_origin: raw_glyph.glyph_origin,
            extra_data: SyriacData {
                joining_group,
                joining_type,
                feature_tag: tag::ISOL,
            },
        }
    }
}

impl From<&SyriacGlyph> for RawGlyph<()> {
    fn from(syriac_glyph: &SyriacGlyph) -> RawGlyph<()> {
        RawGlyph {
            unicodes: syriac_glyph.unicodes.clone(),
            glyph_index: syriac_glyph.glyph_index,
            glyph_origin: syriac_glyph.glyph_origin,
            extra_data: (),
        }
    }
}

/// Pairwise joining states as for Arabic, except that an Alaph joined
/// from the right takes `med2` instead of `fina`. The trailing letter
/// is then revisited: a final Alaph takes `fina` after a left-joining
/// letter, `fin3` after Dalath or Rish, and `fin2` otherwise.
fn compute_joining_states(glyphs: &mut [SyriacGlyph]) {
    let mut previous_i = match glyphs.iter().position(|g| !g.is_transparent()) {
        Some(i) => i,
        None => return,
    };
    for i in (previous_i + 1)..glyphs.len() {
        if glyphs[i].is_transparent() {
            continue;
        }
        if glyphs[previous_i].is_left_joining() && glyphs[i].is_right_joining() {
            if glyphs[i].is_alaph() {
                glyphs[i].extra_data.feature_tag = tag::MED2;
            } else {
                glyphs[i].extra_data.feature_tag = tag::FINA;
            }
            match glyphs[previous_i].extra_data.feature_tag {
                tag::ISOL => glyphs[previous_i].extra_data.feature_tag = tag::INIT,
                tag::FINA => glyphs[previous_i].extra_data.feature_tag = tag::MEDI,
                _ => {}
            }
        }
        previous_i = i;
    }

    let last_i = glyphs
        .iter()
        .rposition(|g| !(g.is_transparent() || g.is_non_joining()))
        .unwrap_or(0);
    if last_i != 0 && glyphs[last_i].is_alaph() {
        let previous_i = last_i - 1;
        if glyphs[previous_i].is_left_joining() {
            glyphs[last_i].extra_data.feature_tag = tag::FINA;
        } else if glyphs[previous_i].is_dalath_rish() {
            glyphs[last_i].extra_data.feature_tag = tag::FIN3;
        } else {
            glyphs[last_i].extra_data.feature_tag = tag::FIN2;
        }
    }
}

const FORM_FEATURES: &[u32] = &[
    tag::ISOL,
    tag::FINA,
    tag::FIN2,
    tag::FIN3,
    tag::MEDI,
    tag::MED2,
    tag::INIT,
];

/// Shape a Syriac glyph run with the font's GSUB rules. A font without
/// Syriac layout rules leaves the buffer untouched.
pub fn gsub_apply_syriac(
    gsub_cache: &LayoutCache,
    script_tag: u32,
    lang_tag: Option<u32>,
    buffer: &mut GlyphBuffer<()>,
) -> Result<(), ShapingError> {
    let script_table = match gsub_cache.layout_table.find_script(script_tag)? {
        Some(script_table) => script_table,
        None => return Ok(()),
    };
    let langsys = match script_table.find_langsys_or_default(lang_tag)? {
        Some(langsys) => langsys,
        None => return Ok(()),
    };

    let mut syriac_buffer = GlyphBuffer {
        glyphs: buffer.glyphs.iter().map(SyriacGlyph::from).collect(),
        log_clust: buffer.log_clust.clone(),
    };
    compute_joining_states(&mut syriac_buffer.glyphs);

    gsub::gsub_apply_feature_span(
        gsub_cache,
        langsys,
        tag::LOCL,
        Direction::RightToLeft,
        &mut syriac_buffer,
        0,
        usize::MAX,
    )?;
    for &feature_tag in FORM_FEATURES {
        apply_form_feature(gsub_cache, langsys, feature_tag, &mut syriac_buffer, |data| {
            data.feature_tag
        })?;
    }
    for feature_tag in [tag::RLIG, tag::CALT, tag::LIGA] {
        gsub::gsub_apply_feature_span(
            gsub_cache,
            langsys,
            feature_tag,
            Direction::RightToLeft,
            &mut syriac_buffer,
            0,
            usize::MAX,
        )?;
    }

    buffer.glyphs = syriac_buffer.glyphs.iter().map(RawGlyph::from).collect();
    buffer.log_clust = syriac_buffer.log_clust;
    Ok(())
}
