//! Glyph substitution (`gsub`) engine.
//!
//! Applies single, alternate, ligature and chaining-context lookups to a
//! glyph buffer while keeping the logical cluster map in sync: every
//! substitution that changes the glyph count renumbers the map so each
//! source character still points at a live glyph.

use crate::error::ParseError;
use crate::layout::{
    AlternateSubst, ChainContextSubst, Coverage, LangSys, LayoutCache, Ligature, LigatureSubst,
    LookupList, SingleSubst, SubstLookup,
};
use bitflags::bitflags;
use std::rc::Rc;
use tinyvec::TinyVec;

const SUBST_RECURSION_LIMIT: usize = 2;

/// Direction glyph substitution proceeds in. Ligature components are
/// matched in this direction from the lead glyph.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Direction {
    LeftToRight,
    RightToLeft,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum GlyphOrigin {
    /// The glyph was produced by cmap-style lookup of this character.
    Char(char),
    /// The glyph was produced by substitution.
    Direct,
}

#[derive(Clone, Debug, PartialEq)]
pub struct RawGlyph<T> {
    pub unicodes: TinyVec<[char; 1]>,
    pub glyph_index: u16,
    pub glyph_origin: GlyphOrigin,
    pub extra_data: T,
}

/// `merge` is called during ligature substitution (i.e. merging of glyphs),
/// and determines how the `RawGlyph.extra_data` field should be merged
pub trait GlyphData: Clone {
    fn merge(data1: Self, data2: Self) -> Self;
}

impl GlyphData for () {
    fn merge(_data1: (), _data2: ()) {}
}

/// Glyph array plus the per-character logical cluster map.
///
/// `log_clust[i]` is the index of the glyph character `i` maps to.
/// Multiple characters may share a glyph after a ligature merge, and a
/// character decomposed during preprocessing maps to the glyph of its
/// first part.
#[derive(Clone, Debug)]
pub struct GlyphBuffer<T> {
    pub glyphs: Vec<RawGlyph<T>>,
    pub log_clust: Vec<usize>,
}

impl<T: GlyphData> GlyphBuffer<T> {
    pub fn new(glyphs: Vec<RawGlyph<T>>, log_clust: Vec<usize>) -> Self {
        GlyphBuffer { glyphs, log_clust }
    }

    /// Merge the glyphs at `consumed` into the glyph at `survivor`,
    /// removing them from the buffer and renumbering the cluster map.
    /// Returns the survivor's index after compaction.
    ///
    /// `consumed` must be distinct indices not containing `survivor`.
    pub(crate) fn ligate(&mut self, survivor: usize, consumed: &[usize]) -> usize {
        for &index in consumed {
            let unicodes = self.glyphs[index].unicodes.clone();
            let extra_data = self.glyphs[index].extra_data.clone();
            self.glyphs[survivor].unicodes.extend(unicodes);
            self.glyphs[survivor].extra_data =
                GlyphData::merge(self.glyphs[survivor].extra_data.clone(), extra_data);
        }

        // Remove from the highest index down so the lower ones stay valid.
        let mut removed: Vec<usize> = consumed.to_vec();
        removed.sort_unstable();
        for &index in removed.iter().rev() {
            self.glyphs.remove(index);
        }

        // Redirect consumed glyph references to the survivor, then shift
        // every reference by the number of removed glyphs below it.
        for clust in self.log_clust.iter_mut() {
            let redirected = if removed.contains(clust) {
                survivor
            } else {
                *clust
            };
            let shift = removed.iter().filter(|&&r| r < redirected).count();
            *clust = redirected - shift;
        }

        let shift = removed.iter().filter(|&&r| r < survivor).count();
        survivor - shift
    }
}

bitflags! {
    /// Set of optional GSUB features a font exposes for a script.
    #[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
    pub struct FeatureMask: u32 {
        const LOCL = 1 << 0;
        const NUKT = 1 << 1;
        const AKHN = 1 << 2;
        const RPHF = 1 << 3;
        const RKRF = 1 << 4;
        const BLWF = 1 << 5;
        const HALF = 1 << 6;
        const VATU = 1 << 7;
        const PSTF = 1 << 8;
        const PRES = 1 << 9;
        const ABVS = 1 << 10;
        const BLWS = 1 << 11;
        const PSTS = 1 << 12;
        const HALN = 1 << 13;
        const CALT = 1 << 14;
        const LIGA = 1 << 15;
        const CLIG = 1 << 16;
    }
}

struct Subst {
    /// Position to continue substitution from.
    next: usize,
    /// Glyph count change (negative for merges).
    delta: isize,
}

/// Apply one feature's lookup list at glyph position `at`.
///
/// Returns the position substitution should continue from, or `None` if
/// no lookup applied. A single substitution that maps a glyph to itself
/// counts as no match so repeated application cannot loop.
pub fn gsub_apply_feature<T: GlyphData>(
    gsub_cache: &LayoutCache,
    langsys: &LangSys,
    feature_tag: u32,
    direction: Direction,
    buffer: &mut GlyphBuffer<T>,
    at: usize,
) -> Result<Option<usize>, ParseError> {
    let gsub_table = &gsub_cache.layout_table;
    let feature_table = match gsub_table.find_langsys_feature(langsys, feature_tag)? {
        Some(feature_table) => feature_table,
        None => return Ok(None),
    };
    let lookup_list = match gsub_table.opt_lookup_list {
        Some(ref lookup_list) => lookup_list,
        None => return Ok(None),
    };
    for lookup_index in &feature_table.lookup_indices {
        let subst = gsub_apply_lookup(
            SUBST_RECURSION_LIMIT,
            gsub_cache,
            lookup_list,
            usize::from(*lookup_index),
            direction,
            buffer,
            at,
        )?;
        if let Some(subst) = subst {
            return Ok(Some(subst.next));
        }
    }
    Ok(None)
}

/// Apply one feature over the glyph window `start..end`, returning the
/// window's end position after any merges within it.
pub fn gsub_apply_feature_span<T: GlyphData>(
    gsub_cache: &LayoutCache,
    langsys: &LangSys,
    feature_tag: u32,
    direction: Direction,
    buffer: &mut GlyphBuffer<T>,
    start: usize,
    end: usize,
) -> Result<usize, ParseError> {
    let mut end = end.min(buffer.glyphs.len());
    let mut i = start;
    while i < end {
        let before = buffer.glyphs.len();
        match gsub_apply_feature(gsub_cache, langsys, feature_tag, direction, buffer, i)? {
            Some(next) => {
                // A ligature's components may extend past the window,
                // so the shrunk end is clamped rather than trusted.
                let delta = buffer.glyphs.len() as isize - before as isize;
                end = end.saturating_add_signed(delta).min(buffer.glyphs.len());
                i = next.max(i + 1);
            }
            None => i += 1,
        }
    }
    Ok(end)
}

/// Test whether the font exposes `feature_tag` for the script, without
/// applying anything. Results are memoized in the layout cache.
pub fn gsub_feature_is_supported(
    gsub_cache: &LayoutCache,
    script_tag: u32,
    opt_lang_tag: Option<u32>,
    feature_tag: u32,
) -> Result<bool, ParseError> {
    let key = (script_tag, opt_lang_tag.unwrap_or(0), feature_tag);
    if let Some(&supported) = gsub_cache.supported_features.borrow().get(&key) {
        return Ok(supported);
    }
    let gsub_table = &gsub_cache.layout_table;
    let supported = match gsub_table.find_script_or_default(script_tag)? {
        Some(script_table) => match script_table.find_langsys_or_default(opt_lang_tag)? {
            Some(langsys) => gsub_table.find_langsys_feature(langsys, feature_tag)?.is_some(),
            None => false,
        },
        None => false,
    };
    gsub_cache
        .supported_features
        .borrow_mut()
        .insert(key, supported);
    Ok(supported)
}

fn gsub_apply_lookup<T: GlyphData>(
    recursion_budget: usize,
    gsub_cache: &LayoutCache,
    lookup_list: &LookupList,
    lookup_index: usize,
    direction: Direction,
    buffer: &mut GlyphBuffer<T>,
    at: usize,
) -> Result<Option<Subst>, ParseError> {
    if at >= buffer.glyphs.len() {
        return Ok(None);
    }
    let lookup = lookup_list.lookup_cache(gsub_cache, lookup_index)?;
    match lookup.lookup_subtables {
        SubstLookup::SingleSubst(ref subtables) => singlesubst(subtables, buffer, at),
        SubstLookup::AlternateSubst(ref subtables) => alternatesubst(subtables, buffer, at),
        SubstLookup::LigatureSubst(ref subtables) => {
            ligaturesubst(subtables, direction, buffer, at)
        }
        SubstLookup::ChainContextSubst(ref subtables) => chaincontextsubst(
            recursion_budget,
            gsub_cache,
            lookup_list,
            subtables,
            direction,
            buffer,
            at,
        ),
        SubstLookup::Unsupported(_lookup_type) => Ok(None),
    }
}

fn singlesubst<T: GlyphData>(
    subtables: &[SingleSubst],
    buffer: &mut GlyphBuffer<T>,
    at: usize,
) -> Result<Option<Subst>, ParseError> {
    let glyph_index = buffer.glyphs[at].glyph_index;
    for subtable in subtables {
        if let Some(output_glyph) = subtable.apply_glyph(glyph_index)? {
            if output_glyph == glyph_index {
                // Identity substitution. Treated as no match so the
                // caller does not reapply the lookup forever.
                return Ok(None);
            }
            buffer.glyphs[at].glyph_index = output_glyph;
            buffer.glyphs[at].glyph_origin = GlyphOrigin::Direct;
            return Ok(Some(Subst {
                next: at + 1,
                delta: 0,
            }));
        }
    }
    Ok(None)
}

fn alternatesubst<T: GlyphData>(
    subtables: &[AlternateSubst],
    buffer: &mut GlyphBuffer<T>,
    at: usize,
) -> Result<Option<Subst>, ParseError> {
    let glyph_index = buffer.glyphs[at].glyph_index;
    for subtable in subtables {
        if let Some(alternate_set) = subtable.apply_glyph(glyph_index)? {
            // There is no alternate-selection UI at this level so the
            // first alternate is always the one chosen.
            match alternate_set.alternate_glyphs.first() {
                Some(&output_glyph) => {
                    buffer.glyphs[at].glyph_index = output_glyph;
                    buffer.glyphs[at].glyph_origin = GlyphOrigin::Direct;
                    return Ok(Some(Subst {
                        next: at + 1,
                        delta: 0,
                    }));
                }
                None => return Ok(None),
            }
        }
    }
    Ok(None)
}

fn ligaturesubst<T: GlyphData>(
    subtables: &[LigatureSubst],
    direction: Direction,
    buffer: &mut GlyphBuffer<T>,
    at: usize,
) -> Result<Option<Subst>, ParseError> {
    let glyph_index = buffer.glyphs[at].glyph_index;
    for subtable in subtables {
        let ligature_set = match subtable.apply_glyph(glyph_index)? {
            Some(ligature_set) => ligature_set,
            None => continue,
        };
        for ligature in &ligature_set.ligatures {
            if let Some(consumed) = ligature_matches(ligature, direction, buffer, at) {
                buffer.glyphs[at].glyph_index = ligature.ligature_glyph;
                buffer.glyphs[at].glyph_origin = GlyphOrigin::Direct;
                let delta = -(consumed.len() as isize);
                let survivor = buffer.ligate(at, &consumed);
                return Ok(Some(Subst {
                    next: survivor + 1,
                    delta,
                }));
            }
        }
    }
    Ok(None)
}

/// Walk the ligature's remaining components from `at` in the
/// substitution direction. Returns the matched component positions, or
/// `None` if the components are not all present.
fn ligature_matches<T>(
    ligature: &Ligature,
    direction: Direction,
    buffer: &GlyphBuffer<T>,
    at: usize,
) -> Option<Vec<usize>> {
    let mut consumed = Vec::with_capacity(ligature.component_glyphs.len());
    let mut pos = at;
    for &component in &ligature.component_glyphs {
        pos = match direction {
            Direction::LeftToRight => pos.checked_add(1).filter(|&p| p < buffer.glyphs.len())?,
            Direction::RightToLeft => pos.checked_sub(1)?,
        };
        if buffer.glyphs[pos].glyph_index != component {
            return None;
        }
        consumed.push(pos);
    }
    Some(consumed)
}

fn chaincontextsubst<T: GlyphData>(
    recursion_budget: usize,
    gsub_cache: &LayoutCache,
    lookup_list: &LookupList,
    subtables: &[ChainContextSubst],
    direction: Direction,
    buffer: &mut GlyphBuffer<T>,
    at: usize,
) -> Result<Option<Subst>, ParseError> {
    if recursion_budget == 0 {
        return Ok(None);
    }
    for subtable in subtables {
        let (backtrack, input, lookahead, records) = match subtable {
            ChainContextSubst::Format3 {
                backtrack_coverages,
                input_coverages,
                lookahead_coverages,
                subst_lookup_records,
            } => (
                backtrack_coverages,
                input_coverages,
                lookahead_coverages,
                subst_lookup_records,
            ),
            ChainContextSubst::Unsupported(_format) => continue,
        };
        if !context_matches(backtrack, input, lookahead, buffer, at) {
            continue;
        }

        // Nested lookups apply at offsets into the input sequence.
        // Earlier substitutions can shrink the buffer, so later offsets
        // are corrected by the accumulated delta.
        let mut total_delta: isize = 0;
        for &(sequence_index, lookup_index) in records {
            let pos = at as isize + sequence_index as isize + total_delta;
            if pos < 0 || pos as usize >= buffer.glyphs.len() {
                continue;
            }
            let subst = gsub_apply_lookup(
                recursion_budget - 1,
                gsub_cache,
                lookup_list,
                usize::from(lookup_index),
                direction,
                buffer,
                pos as usize,
            )?;
            if let Some(subst) = subst {
                total_delta += subst.delta;
            }
        }
        let next = (at + input.len()) as isize + total_delta;
        return Ok(Some(Subst {
            next: next.max(0) as usize,
            delta: total_delta,
        }));
    }
    Ok(None)
}

fn context_matches<T>(
    backtrack: &[Rc<Coverage>],
    input: &[Rc<Coverage>],
    lookahead: &[Rc<Coverage>],
    buffer: &GlyphBuffer<T>,
    at: usize,
) -> bool {
    if at < backtrack.len() || at + input.len() + lookahead.len() > buffer.glyphs.len() {
        return false;
    }
    // Backtrack coverages are stored nearest-first.
    for (j, coverage) in backtrack.iter().enumerate() {
        let glyph = buffer.glyphs[at - 1 - j].glyph_index;
        if coverage.glyph_coverage_value(glyph).is_none() {
            return false;
        }
    }
    for (j, coverage) in input.iter().enumerate() {
        let glyph = buffer.glyphs[at + j].glyph_index;
        if coverage.glyph_coverage_value(glyph).is_none() {
            return false;
        }
    }
    for (j, coverage) in lookahead.iter().enumerate() {
        let glyph = buffer.glyphs[at + input.len() + j].glyph_index;
        if coverage.glyph_coverage_value(glyph).is_none() {
            return false;
        }
    }
    true
}
