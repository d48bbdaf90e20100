//! `GSUB` table parsing.
//!
//! The table is a tree of byte-offset-addressed subtables:
//! ScriptList → LangSys, FeatureList → lookup indices, LookupList →
//! lookup subtables. All offsets are relative to the start of the
//! record that carries them and all fields are big-endian.
//!
//! — <https://docs.microsoft.com/en-us/typography/opentype/spec/gsub>

use crate::binary::read::{
    ReadArray, ReadBinary, ReadBinaryDep, ReadCache, ReadCtxt, ReadFixedSizeDep, ReadFrom,
    ReadScope, ReadScopeOwned,
};
use crate::binary::U16Be;
use crate::error::ParseError;
use crate::size;
use log::warn;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

pub struct LayoutTable {
    pub opt_script_list: Option<ScriptList>,
    pub opt_feature_list: Option<FeatureList>,
    pub opt_lookup_list: Option<LookupList>,
}

pub struct ScriptList {
    script_records: Vec<ScriptRecord>,
}

pub struct ScriptRecord {
    pub script_tag: u32,
    script_table: ScriptTable,
}

pub struct ScriptTable {
    opt_default_langsys: Option<LangSys>,
    langsys_records: Vec<LangSysRecord>,
}

pub struct LangSysRecord {
    pub langsys_tag: u32,
    langsys_table: LangSys,
}

pub struct LangSys {
    _lookup_order: usize,           // reserved field, should be zero
    _required_feature_index: usize, // ignored for now, 0xFFFF
    feature_indices: Vec<u16>,
}

pub struct FeatureList {
    feature_records: Vec<FeatureRecord>,
}

pub struct FeatureRecord {
    pub feature_tag: u32,
    feature_table: FeatureTable,
}

pub struct FeatureTable {
    _feature_params: usize, // reserved field, should be zero
    pub lookup_indices: Vec<u16>,
}

pub struct LookupList {
    scope_owned: ReadScopeOwned,
    lookup_offsets: Vec<u16>,
}

/// Substitution lookup subtables, parsed once per lookup index.
pub enum SubstLookup {
    SingleSubst(Vec<SingleSubst>),
    AlternateSubst(Vec<AlternateSubst>),
    LigatureSubst(Vec<LigatureSubst>),
    ChainContextSubst(Vec<ChainContextSubst>),
    /// Lookup types 2, 5, 7, 8. Skipped by the engine.
    Unsupported(u16),
}

pub struct LookupCacheItem {
    pub lookup_flag: u16,
    pub lookup_subtables: SubstLookup,
}

impl ReadBinary for LayoutTable {
    type HostType<'a> = Self;

    fn read<'a>(ctxt: &mut ReadCtxt<'a>) -> Result<Self, ParseError> {
        let table = ctxt.scope();

        let major_version = ctxt.read_u16be()?;
        let _minor_version = ctxt.read_u16be()?;
        let script_list_offset = usize::from(ctxt.read_u16be()?);
        let feature_list_offset = usize::from(ctxt.read_u16be()?);
        let lookup_list_offset = usize::from(ctxt.read_u16be()?);

        // We handle versions 1.x
        if major_version != 1 {
            return Err(ParseError::BadVersion);
        }

        let opt_script_list = if script_list_offset >= table.data().len() {
            return Err(ParseError::BadOffset);
        } else if script_list_offset == 0 {
            None
        } else {
            Some(table.offset(script_list_offset).read::<ScriptList>()?)
        };

        let opt_feature_list = if feature_list_offset >= table.data().len() {
            return Err(ParseError::BadOffset);
        } else if feature_list_offset == 0 {
            None
        } else {
            Some(table.offset(feature_list_offset).read::<FeatureList>()?)
        };

        let opt_lookup_list = if lookup_list_offset >= table.data().len() {
            return Err(ParseError::BadOffset);
        } else if lookup_list_offset == 0 {
            None
        } else {
            Some(table.offset(lookup_list_offset).read::<LookupList>()?)
        };

        Ok(LayoutTable {
            opt_script_list,
            opt_feature_list,
            opt_lookup_list,
        })
    }
}

impl ReadBinary for ScriptList {
    type HostType<'a> = Self;

    fn read<'a>(ctxt: &mut ReadCtxt<'a>) -> Result<Self, ParseError> {
        let scope = ctxt.scope();
        let script_count = usize::from(ctxt.read_u16be()?);
        let script_records = ctxt
            .read_array_dep::<ScriptRecord>(script_count, scope)?
            .read_to_vec()?;
        Ok(ScriptList { script_records })
    }
}

impl ReadBinaryDep for ScriptRecord {
    type Args<'a> = ReadScope<'a>;
    type HostType<'a> = ScriptRecord;

    fn read_dep<'a>(ctxt: &mut ReadCtxt<'a>, scope: Self::Args<'a>) -> Result<Self, ParseError> {
        let script_tag = ctxt.read_u32be()?;
        let script_offset = ctxt.read_u16be()?;
        let script_table = scope
            .offset(usize::from(script_offset))
            .read::<ScriptTable>()?;
        Ok(ScriptRecord {
            script_tag,
            script_table,
        })
    }
}

impl ReadFixedSizeDep for ScriptRecord {
    fn size(_scope: Self::Args<'_>) -> usize {
        size::U32 + size::U16
    }
}

impl ReadBinary for ScriptTable {
    type HostType<'a> = Self;

    fn read<'a>(ctxt: &mut ReadCtxt<'a>) -> Result<Self, ParseError> {
        let scope = ctxt.scope();
        let default_langsys_offset = usize::from(ctxt.read_u16be()?);
        let opt_default_langsys = if default_langsys_offset != 0 {
            Some(scope.offset(default_langsys_offset).read::<LangSys>()?)
        } else {
            None
        };
        let langsys_count = usize::from(ctxt.read_u16be()?);
        let langsys_records = ctxt
            .read_array_dep::<LangSysRecord>(langsys_count, scope)?
            .read_to_vec()?;
        Ok(ScriptTable {
            opt_default_langsys,
            langsys_records,
        })
    }
}

impl ReadBinaryDep for LangSysRecord {
    type Args<'a> = ReadScope<'a>;
    type HostType<'a> = LangSysRecord;

    fn read_dep<'a>(ctxt: &mut ReadCtxt<'a>, scope: Self::Args<'a>) -> Result<Self, ParseError> {
        let langsys_tag = ctxt.read_u32be()?;
        let langsys_offset = ctxt.read_u16be()?;
        let langsys_table = scope.offset(usize::from(langsys_offset)).read::<LangSys>()?;
        Ok(LangSysRecord {
            langsys_tag,
            langsys_table,
        })
    }
}

impl ReadFixedSizeDep for LangSysRecord {
    fn size(_scope: Self::Args<'_>) -> usize {
        size::U32 + size::U16
    }
}

impl ReadBinary for LangSys {
    type HostType<'a> = Self;

    fn read<'a>(ctxt: &mut ReadCtxt<'a>) -> Result<Self, ParseError> {
        let lookup_order = usize::from(ctxt.read_u16be()?);
        let required_feature_index = usize::from(ctxt.read_u16be()?);
        let feature_index_count = usize::from(ctxt.read_u16be()?);
        let feature_indices = ctxt.read_array::<U16Be>(feature_index_count)?.to_vec();
        Ok(LangSys {
            _lookup_order: lookup_order,
            _required_feature_index: required_feature_index,
            feature_indices,
        })
    }
}

impl LangSys {
    pub fn feature_indices_iter(&self) -> impl Iterator<Item = &u16> {
        self.feature_indices.iter()
    }
}

impl ReadBinary for FeatureList {
    type HostType<'a> = Self;

    fn read<'a>(ctxt: &mut ReadCtxt<'a>) -> Result<Self, ParseError> {
        let scope = ctxt.scope();
        let feature_count = usize::from(ctxt.read_u16be()?);
        let feature_records = ctxt
            .read_array_dep::<FeatureRecord>(feature_count, scope)?
            .read_to_vec()?;
        Ok(FeatureList { feature_records })
    }
}

impl FeatureList {
    pub fn nth_feature_record(&self, index: usize) -> Result<&FeatureRecord, ParseError> {
        self.feature_records
            .get(index)
            .ok_or(ParseError::BadIndex)
    }
}

impl ReadBinaryDep for FeatureRecord {
    type Args<'a> = ReadScope<'a>;
    type HostType<'a> = FeatureRecord;

    fn read_dep<'a>(ctxt: &mut ReadCtxt<'a>, scope: Self::Args<'a>) -> Result<Self, ParseError> {
        let feature_tag = ctxt.read_u32be()?;
        let feature_offset = ctxt.read_u16be()?;
        let feature_table = scope
            .offset(usize::from(feature_offset))
            .read::<FeatureTable>()?;
        Ok(FeatureRecord {
            feature_tag,
            feature_table,
        })
    }
}

impl ReadFixedSizeDep for FeatureRecord {
    fn size(_scope: Self::Args<'_>) -> usize {
        size::U32 + size::U16
    }
}

impl ReadBinary for FeatureTable {
    type HostType<'a> = Self;

    fn read<'a>(ctxt: &mut ReadCtxt<'a>) -> Result<Self, ParseError> {
        let feature_params = usize::from(ctxt.read_u16be()?);
        let lookup_index_count = usize::from(ctxt.read_u16be()?);
        let lookup_indices = ctxt.read_array::<U16Be>(lookup_index_count)?.to_vec();
        Ok(FeatureTable {
            _feature_params: feature_params,
            lookup_indices,
        })
    }
}

impl ReadBinary for LookupList {
    type HostType<'a> = Self;

    fn read<'a>(ctxt: &mut ReadCtxt<'a>) -> Result<Self, ParseError> {
        let scope_owned = ReadScopeOwned::new(ctxt.scope());
        let lookup_count = usize::from(ctxt.read_u16be()?);
        let lookup_offsets = ctxt.read_array::<U16Be>(lookup_count)?.to_vec();
        Ok(LookupList {
            scope_owned,
            lookup_offsets,
        })
    }
}

impl LayoutTable {
    pub fn find_script(&self, script_tag: u32) -> Result<Option<&ScriptTable>, ParseError> {
        if let Some(ref script_list) = self.opt_script_list {
            for script_record in &script_list.script_records {
                if script_record.script_tag == script_tag {
                    return Ok(Some(&script_record.script_table));
                }
            }
        }
        Ok(None)
    }

    pub fn find_script_or_default(
        &self,
        script_tag: u32,
    ) -> Result<Option<&ScriptTable>, ParseError> {
        match self.find_script(script_tag)? {
            Some(script_table) => Ok(Some(script_table)),
            None => self.find_script(crate::tag::DFLT),
        }
    }

    pub fn find_langsys_feature(
        &self,
        langsys: &LangSys,
        feature_tag: u32,
    ) -> Result<Option<&FeatureTable>, ParseError> {
        if let Some(ref feature_list) = self.opt_feature_list {
            for feature_index in langsys.feature_indices_iter() {
                let feature_record =
                    feature_list.nth_feature_record(usize::from(*feature_index))?;
                if feature_record.feature_tag == feature_tag {
                    return Ok(Some(&feature_record.feature_table));
                }
            }
        }
        Ok(None)
    }
}

impl ScriptTable {
    pub fn default_langsys(&self) -> Option<&LangSys> {
        self.opt_default_langsys.as_ref()
    }

    pub fn find_langsys(&self, langsys_tag: u32) -> Result<Option<&LangSys>, ParseError> {
        for langsys_record in &self.langsys_records {
            if langsys_record.langsys_tag == langsys_tag {
                return Ok(Some(&langsys_record.langsys_table));
            }
        }
        Ok(None)
    }

    pub fn find_langsys_or_default(
        &self,
        opt_lang_tag: Option<u32>,
    ) -> Result<Option<&LangSys>, ParseError> {
        match opt_lang_tag {
            Some(lang_tag) => match self.find_langsys(lang_tag)? {
                Some(langsys) => Ok(Some(langsys)),
                None => Ok(self.default_langsys()),
            },
            None => Ok(self.default_langsys()),
        }
    }
}

impl LookupList {
    fn lookup(&self, lookup_index: usize, cache: &LayoutCache) -> Result<LookupCacheItem, ParseError> {
        let offset = self
            .lookup_offsets
            .get(lookup_index)
            .copied()
            .ok_or(ParseError::BadIndex)?;
        let scope = self.scope_owned.scope();
        let lookup_scope = scope.offset(usize::from(offset));
        let mut ctxt = lookup_scope.ctxt();
        let lookup_type = ctxt.read_u16be()?;
        let lookup_flag = ctxt.read_u16be()?;
        let subtable_count = usize::from(ctxt.read_u16be()?);
        let subtable_offsets = ctxt.read_array::<U16Be>(subtable_count)?;

        let lookup_subtables = read_subtables(lookup_type, lookup_scope, &subtable_offsets, cache)?;
        Ok(LookupCacheItem {
            lookup_flag,
            lookup_subtables,
        })
    }

    /// Parse-once access to a lookup by index.
    pub fn lookup_cache(
        &self,
        cache: &LayoutCache,
        lookup_index: usize,
    ) -> Result<Rc<LookupCacheItem>, ParseError> {
        {
            let lookup_cache = cache.lookup_cache.borrow();
            if let Some(Some(item)) = lookup_cache.get(lookup_index) {
                return Ok(Rc::clone(item));
            }
        }
        let item = Rc::new(self.lookup(lookup_index, cache)?);
        let mut lookup_cache = cache.lookup_cache.borrow_mut();
        if lookup_cache.len() <= lookup_index {
            lookup_cache.resize(lookup_index + 1, None);
        }
        lookup_cache[lookup_index] = Some(Rc::clone(&item));
        Ok(item)
    }
}

fn read_subtables(
    lookup_type: u16,
    lookup_scope: ReadScope<'_>,
    subtable_offsets: &ReadArray<'_, U16Be>,
    cache: &LayoutCache,
) -> Result<SubstLookup, ParseError> {
    macro_rules! subtables {
        ($t:ty) => {{
            let mut subtables = Vec::with_capacity(subtable_offsets.len());
            for offset in subtable_offsets {
                let subtable = lookup_scope
                    .offset(usize::from(offset))
                    .read_dep::<$t>(cache)?;
                subtables.push(subtable);
            }
            subtables
        }};
    }

    match lookup_type {
        1 => Ok(SubstLookup::SingleSubst(subtables!(SingleSubst))),
        3 => Ok(SubstLookup::AlternateSubst(subtables!(AlternateSubst))),
        4 => Ok(SubstLookup::LigatureSubst(subtables!(LigatureSubst))),
        6 => Ok(SubstLookup::ChainContextSubst(subtables!(
            ChainContextSubst
        ))),
        _ => {
            warn!("unsupported GSUB lookup type {}, skipping", lookup_type);
            Ok(SubstLookup::Unsupported(lookup_type))
        }
    }
}

pub enum SingleSubst {
    Format1 {
        coverage: Rc<Coverage>,
        delta_glyph_index: i16,
    },
    Format2 {
        coverage: Rc<Coverage>,
        substitute_glyph_array: Vec<u16>,
    },
}

impl ReadBinaryDep for SingleSubst {
    type Args<'a> = &'a LayoutCache;
    type HostType<'a> = Self;

    fn read_dep<'a>(ctxt: &mut ReadCtxt<'a>, cache: Self::Args<'a>) -> Result<Self, ParseError> {
        let subtable = ctxt.scope();
        match ctxt.read_u16be()? {
            1 => {
                let coverage_offset = usize::from(ctxt.read_u16be()?);
                let coverage = subtable
                    .offset(coverage_offset)
                    .read_cache::<Coverage>(&mut cache.coverages.borrow_mut())?;
                let delta_glyph_index = ctxt.read_i16be()?;
                Ok(SingleSubst::Format1 {
                    coverage,
                    delta_glyph_index,
                })
            }
            2 => {
                let coverage_offset = usize::from(ctxt.read_u16be()?);
                let coverage = subtable
                    .offset(coverage_offset)
                    .read_cache::<Coverage>(&mut cache.coverages.borrow_mut())?;
                let glyph_count = ctxt.read_u16be()?;
                let substitute_glyph_array =
                    ctxt.read_array::<U16Be>(usize::from(glyph_count))?.to_vec();
                Ok(SingleSubst::Format2 {
                    coverage,
                    substitute_glyph_array,
                })
            }
            _ => Err(ParseError::BadVersion),
        }
    }
}

impl SingleSubst {
    pub fn apply_glyph(&self, glyph: u16) -> Result<Option<u16>, ParseError> {
        match *self {
            SingleSubst::Format1 {
                ref coverage,
                delta_glyph_index,
            } => {
                if coverage.glyph_coverage_value(glyph).is_some() {
                    let new_glyph_index = glyph as isize + delta_glyph_index as isize;
                    // Addition of deltaGlyphID is modulo 65536, which is why the mask is used.
                    Ok(Some((new_glyph_index & 0xffff) as u16)) // Cast safe due to mask
                } else {
                    Ok(None)
                }
            }
            SingleSubst::Format2 {
                ref coverage,
                ref substitute_glyph_array,
            } => match coverage.glyph_coverage_value(glyph) {
                Some(coverage_index) => substitute_glyph_array
                    .get(usize::from(coverage_index))
                    .copied()
                    .map(Some)
                    .ok_or(ParseError::BadIndex),
                None => Ok(None),
            },
        }
    }
}

pub struct AlternateSubst {
    coverage: Rc<Coverage>,
    alternate_sets: Vec<AlternateSet>,
}

pub struct AlternateSet {
    pub alternate_glyphs: Vec<u16>,
}

impl ReadBinaryDep for AlternateSubst {
    type Args<'a> = &'a LayoutCache;
    type HostType<'a> = Self;

    fn read_dep<'a>(ctxt: &mut ReadCtxt<'a>, cache: Self::Args<'a>) -> Result<Self, ParseError> {
        let subtable = ctxt.scope();
        let format = ctxt.read_u16be()?;
        ctxt.check_version(format == 1)?;
        let coverage_offset = usize::from(ctxt.read_u16be()?);
        let coverage = subtable
            .offset(coverage_offset)
            .read_cache::<Coverage>(&mut cache.coverages.borrow_mut())?;
        let alternate_set_count = usize::from(ctxt.read_u16be()?);
        let alternate_set_offsets = ctxt.read_array::<U16Be>(alternate_set_count)?;
        let mut alternate_sets = Vec::with_capacity(alternate_set_count);
        for offset in &alternate_set_offsets {
            let alternate_set = subtable.offset(usize::from(offset)).read::<AlternateSet>()?;
            alternate_sets.push(alternate_set);
        }
        Ok(AlternateSubst {
            coverage,
            alternate_sets,
        })
    }
}

impl AlternateSubst {
    pub fn apply_glyph(&self, glyph: u16) -> Result<Option<&AlternateSet>, ParseError> {
        match self.coverage.glyph_coverage_value(glyph) {
            Some(coverage_index) => self
                .alternate_sets
                .get(usize::from(coverage_index))
                .map(Some)
                .ok_or(ParseError::BadIndex),
            None => Ok(None),
        }
    }
}

impl ReadBinary for AlternateSet {
    type HostType<'a> = Self;

    fn read<'a>(ctxt: &mut ReadCtxt<'a>) -> Result<Self, ParseError> {
        let glyph_count = usize::from(ctxt.read_u16be()?);
        let alternate_glyphs = ctxt.read_array::<U16Be>(glyph_count)?.to_vec();
        Ok(AlternateSet { alternate_glyphs })
    }
}

pub struct LigatureSubst {
    coverage: Rc<Coverage>,
    ligature_sets: Vec<LigatureSet>,
}

pub struct LigatureSet {
    pub ligatures: Vec<Ligature>,
}

pub struct Ligature {
    pub ligature_glyph: u16,
    /// Components after the first, in logical order.
    pub component_glyphs: Vec<u16>,
}

impl ReadBinaryDep for LigatureSubst {
    type Args<'a> = &'a LayoutCache;
    type HostType<'a> = Self;

    fn read_dep<'a>(ctxt: &mut ReadCtxt<'a>, cache: Self::Args<'a>) -> Result<Self, ParseError> {
        let subtable = ctxt.scope();
        let format = ctxt.read_u16be()?;
        ctxt.check_version(format == 1)?;
        let coverage_offset = usize::from(ctxt.read_u16be()?);
        let coverage = subtable
            .offset(coverage_offset)
            .read_cache::<Coverage>(&mut cache.coverages.borrow_mut())?;
        let ligature_set_count = usize::from(ctxt.read_u16be()?);
        let ligature_set_offsets = ctxt.read_array::<U16Be>(ligature_set_count)?;
        let mut ligature_sets = Vec::with_capacity(ligature_set_count);
        for offset in &ligature_set_offsets {
            let ligature_set = subtable.offset(usize::from(offset)).read::<LigatureSet>()?;
            ligature_sets.push(ligature_set);
        }
        Ok(LigatureSubst {
            coverage,
            ligature_sets,
        })
    }
}

impl LigatureSubst {
    pub fn apply_glyph(&self, glyph: u16) -> Result<Option<&LigatureSet>, ParseError> {
        match self.coverage.glyph_coverage_value(glyph) {
            Some(coverage_index) => self
                .ligature_sets
                .get(usize::from(coverage_index))
                .map(Some)
                .ok_or(ParseError::BadIndex),
            None => Ok(None),
        }
    }
}

impl ReadBinary for LigatureSet {
    type HostType<'a> = Self;

    fn read<'a>(ctxt: &mut ReadCtxt<'a>) -> Result<Self, ParseError> {
        let subtable = ctxt.scope();
        let ligature_count = usize::from(ctxt.read_u16be()?);
        let ligature_offsets = ctxt.read_array::<U16Be>(ligature_count)?;
        let mut ligatures = Vec::with_capacity(ligature_count);
        for offset in &ligature_offsets {
            let ligature = subtable.offset(usize::from(offset)).read::<Ligature>()?;
            ligatures.push(ligature);
        }
        Ok(LigatureSet { ligatures })
    }
}

impl ReadBinary for Ligature {
    type HostType<'a> = Self;

    fn read<'a>(ctxt: &mut ReadCtxt<'a>) -> Result<Self, ParseError> {
        let ligature_glyph = ctxt.read_u16be()?;
        let component_count = usize::from(ctxt.read_u16be()?);
        ctxt.check(component_count > 0)?;
        let component_glyphs = ctxt.read_array::<U16Be>(component_count - 1)?.to_vec();
        Ok(Ligature {
            ligature_glyph,
            component_glyphs,
        })
    }
}

/// Chaining context substitution.
///
/// Only the coverage-based format (3) is implemented; the glyph- and
/// class-based formats (1 and 2) parse to `Unsupported` and are skipped
/// by the engine. Fonts that rely on them keep their base forms.
pub enum ChainContextSubst {
    Format3 {
        backtrack_coverages: Vec<Rc<Coverage>>,
        input_coverages: Vec<Rc<Coverage>>,
        lookahead_coverages: Vec<Rc<Coverage>>,
        /// (input sequence index, lookup index) pairs.
        subst_lookup_records: Vec<(u16, u16)>,
    },
    Unsupported(u16),
}

impl ReadBinaryDep for ChainContextSubst {
    type Args<'a> = &'a LayoutCache;
    type HostType<'a> = Self;

    fn read_dep<'a>(ctxt: &mut ReadCtxt<'a>, cache: Self::Args<'a>) -> Result<Self, ParseError> {
        let subtable = ctxt.scope();
        let format = ctxt.read_u16be()?;
        match format {
            3 => {
                let read_coverages =
                    |ctxt: &mut ReadCtxt<'a>| -> Result<Vec<Rc<Coverage>>, ParseError> {
                        let count = usize::from(ctxt.read_u16be()?);
                        let offsets = ctxt.read_array::<U16Be>(count)?;
                        let mut coverages = Vec::with_capacity(count);
                        for offset in &offsets {
                            let coverage = subtable
                                .offset(usize::from(offset))
                                .read_cache::<Coverage>(&mut cache.coverages.borrow_mut())?;
                            coverages.push(coverage);
                        }
                        Ok(coverages)
                    };

                let backtrack_coverages = read_coverages(ctxt)?;
                let input_coverages = read_coverages(ctxt)?;
                let lookahead_coverages = read_coverages(ctxt)?;
                let subst_count = usize::from(ctxt.read_u16be()?);
                let subst_lookup_records = ctxt
                    .read_array::<(U16Be, U16Be)>(subst_count)?
                    .to_vec();
                Ok(ChainContextSubst::Format3 {
                    backtrack_coverages,
                    input_coverages,
                    lookahead_coverages,
                    subst_lookup_records,
                })
            }
            1 | 2 => {
                warn!(
                    "chaining context substitution format {} not implemented, skipping",
                    format
                );
                Ok(ChainContextSubst::Unsupported(format))
            }
            _ => Err(ParseError::BadVersion),
        }
    }
}

pub enum Coverage {
    Format1 {
        glyph_array: Vec<u16>,
    },
    Format2 {
        coverage_range_array: Vec<CoverageRangeRecord>,
    },
}

#[derive(Copy, Clone, Debug)]
pub struct CoverageRangeRecord {
    start_glyph: u16,
    end_glyph: u16,
    start_coverage_index: u16,
}

impl ReadFrom for CoverageRangeRecord {
    type ReadType = (U16Be, U16Be, U16Be);
    fn read_from((start_glyph, end_glyph, start_coverage_index): (u16, u16, u16)) -> Self {
        CoverageRangeRecord {
            start_glyph,
            end_glyph,
            start_coverage_index,
        }
    }
}

impl ReadBinary for Coverage {
    type HostType<'a> = Self;

    fn read<'a>(ctxt: &mut ReadCtxt<'a>) -> Result<Self, ParseError> {
        match ctxt.read_u16be()? {
            1 => {
                let glyph_count = ctxt.read_u16be()?;
                let glyph_array = ctxt.read_array::<U16Be>(usize::from(glyph_count))?;
                // The glyph indices must be in numerical order for binary searching of the list.
                Ok(Coverage::Format1 {
                    glyph_array: glyph_array.to_vec(),
                })
            }
            2 => {
                let coverage_range_count = ctxt.read_u16be()?;
                let coverage_range_array =
                    ctxt.read_array::<CoverageRangeRecord>(usize::from(coverage_range_count))?;
                let coverage_range_vec = coverage_range_array.to_vec();
                for coverage_range_record in &coverage_range_vec {
                    ctxt.check(
                        coverage_range_record.start_glyph <= coverage_range_record.end_glyph,
                    )?
                }
                Ok(Coverage::Format2 {
                    coverage_range_array: coverage_range_vec,
                })
            }
            _ => Err(ParseError::BadVersion),
        }
    }
}

impl Coverage {
    /// Membership test. The returned coverage index feeds array
    /// lookups in the owning subtable so the scan must match the
    /// declared format exactly.
    pub fn glyph_coverage_value(&self, glyph: u16) -> Option<u16> {
        match *self {
            Coverage::Format1 { ref glyph_array } => {
                if let Ok(index) = glyph_array.binary_search(&glyph) {
                    Some(index as u16)
                } else {
                    None
                }
            }
            Coverage::Format2 {
                ref coverage_range_array,
            } => {
                for coverage_range in coverage_range_array {
                    if (glyph >= coverage_range.start_glyph) && (glyph <= coverage_range.end_glyph)
                    {
                        return Some(
                            coverage_range.start_coverage_index
                                + (glyph - coverage_range.start_glyph),
                        );
                    }
                }
                None
            }
        }
    }
}

pub type LayoutCache = Rc<LayoutCacheData>;

pub struct LayoutCacheData {
    pub layout_table: LayoutTable,
    coverages: RefCell<ReadCache<Coverage>>,
    lookup_cache: RefCell<Vec<Option<Rc<LookupCacheItem>>>>,

    /// maps (script_tag, lang_tag, feature_tag) to "font exposes this feature"
    pub supported_features: RefCell<HashMap<(u32, u32, u32), bool>>,
}

pub fn new_layout_cache(layout_table: LayoutTable) -> LayoutCache {
    Rc::new(LayoutCacheData {
        layout_table,
        coverages: RefCell::new(ReadCache::new()),
        lookup_cache: RefCell::new(Vec::new()),
        supported_features: RefCell::new(HashMap::new()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binary::read::ReadScope;

    #[test]
    fn read_gsub_v1_x() {
        let data: &[u8] = &[
            0x00, 0x01, // major version
            0x00, 0x01, // minor version
            0x00, 0x00, // script list offset
            0x00, 0x00, // feature list offset
            0x00, 0x00, // lookup list offset
        ];
        assert!(ReadScope::new(data).read::<LayoutTable>().is_ok())
    }

    #[test]
    fn read_gsub_bad_version() {
        let data: &[u8] = &[0x00, 0x02, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00];
        match ReadScope::new(data).read::<LayoutTable>() {
            Err(ParseError::BadVersion) => {}
            _ => panic!("expected ParseError::BadVersion"),
        }
    }

    #[test]
    fn coverage_format_1() {
        let data: &[u8] = &[
            0x00, 0x01, // format
            0x00, 0x03, // glyph count
            0x00, 0x05, 0x00, 0x09, 0x00, 0x20, // glyphs 5, 9, 32
        ];
        let coverage = ReadScope::new(data).read::<Coverage>().unwrap();
        assert_eq!(coverage.glyph_coverage_value(5), Some(0));
        assert_eq!(coverage.glyph_coverage_value(9), Some(1));
        assert_eq!(coverage.glyph_coverage_value(32), Some(2));
        assert_eq!(coverage.glyph_coverage_value(6), None);
    }

    #[test]
    fn coverage_format_2() {
        let data: &[u8] = &[
            0x00, 0x02, // format
            0x00, 0x02, // range count
            0x00, 0x0A, 0x00, 0x0C, 0x00, 0x00, // 10..=12 from coverage index 0
            0x00, 0x20, 0x00, 0x21, 0x00, 0x03, // 32..=33 from coverage index 3
        ];
        let coverage = ReadScope::new(data).read::<Coverage>().unwrap();
        assert_eq!(coverage.glyph_coverage_value(11), Some(1));
        assert_eq!(coverage.glyph_coverage_value(33), Some(4));
        assert_eq!(coverage.glyph_coverage_value(13), None);
    }
}
