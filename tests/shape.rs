//! End-to-end shaping against a hand-built `GSUB` table.
//!
//! The fixture exposes an Arabic script with two features: `isol`
//! (single substitution of the isolated beh glyph) and `rlig` (two
//! ligatures off the same lead glyph).

use std::collections::HashMap;

use tinyvec::tiny_vec;
use typeline::binary::read::ReadScope;
use typeline::error::ShapingError;
use typeline::gsub::{
    gsub_apply_feature_span, gsub_feature_is_supported, Direction, GlyphBuffer, GlyphOrigin,
    RawGlyph,
};
use typeline::layout::{new_layout_cache, LayoutCache, LayoutTable};
use typeline::shape::{contextual_shape, GlyphLookup};
use typeline::tag;

const LAM: char = '\u{0644}';
const ALEF: char = '\u{0627}';
const BEH: char = '\u{0628}';

#[rustfmt::skip]
const GSUB_DATA: &[u8] = &[
    // GSUB header
    0x00, 0x01, 0x00, 0x00,             // version 1.0
    0x00, 0x0A,                         // script list at 10
    0x00, 0x20,                         // feature list at 32
    0x00, 0x3A,                         // lookup list at 58
    // ScriptList (10)
    0x00, 0x01,                         // 1 script record
    b'a', b'r', b'a', b'b', 0x00, 0x08, // 'arab' script table at 10+8
    // ScriptTable (18)
    0x00, 0x04,                         // default LangSys at 18+4
    0x00, 0x00,                         // no tagged langsys records
    // LangSys (22)
    0x00, 0x00,                         // lookup order (reserved)
    0xFF, 0xFF,                         // no required feature
    0x00, 0x02,                         // 2 feature indices
    0x00, 0x00, 0x00, 0x01,
    // FeatureList (32)
    0x00, 0x02,                         // 2 feature records
    b'i', b's', b'o', b'l', 0x00, 0x0E, // feature table at 32+14
    b'r', b'l', b'i', b'g', 0x00, 0x14, // feature table at 32+20
    // FeatureTable 'isol' (46)
    0x00, 0x00, 0x00, 0x01, 0x00, 0x00, // params, 1 lookup: index 0
    // FeatureTable 'rlig' (52)
    0x00, 0x00, 0x00, 0x01, 0x00, 0x01, // params, 1 lookup: index 1
    // LookupList (58)
    0x00, 0x02,                         // 2 lookups
    0x00, 0x06, 0x00, 0x1C,             // at 58+6 and 58+28
    // Lookup 0 (64): single substitution
    0x00, 0x01, 0x00, 0x00,             // type 1, flag 0
    0x00, 0x01, 0x00, 0x08,             // 1 subtable at 64+8
    // SingleSubst format 2 (72)
    0x00, 0x02, 0x00, 0x08,             // format 2, coverage at 72+8
    0x00, 0x01, 0x00, 0x32,             // 1 substitute: glyph 50
    // Coverage (80)
    0x00, 0x01, 0x00, 0x01, 0x00, 0x05, // format 1, 1 glyph: 5
    // Lookup 1 (86): ligature substitution
    0x00, 0x04, 0x00, 0x00,             // type 4, flag 0
    0x00, 0x01, 0x00, 0x08,             // 1 subtable at 86+8
    // LigatureSubst format 1 (94)
    0x00, 0x01, 0x00, 0x1C,             // format 1, coverage at 94+28
    0x00, 0x01, 0x00, 0x08,             // 1 ligature set at 94+8
    // LigatureSet (102)
    0x00, 0x02, 0x00, 0x06, 0x00, 0x0E, // 2 ligatures at 102+6, 102+14
    // Ligature (108): three components
    0x00, 0x62,                         // ligature glyph 98
    0x00, 0x03, 0x00, 0x14, 0x00, 0x16, // 3 components, glyphs 20 and 22
    // Ligature (116): lam-alef
    0x00, 0x63,                         // ligature glyph 99
    0x00, 0x02, 0x00, 0x14,             // 2 components, trailing glyph 20
    // Coverage (122): the lead glyph in visual order
    0x00, 0x01, 0x00, 0x01, 0x00, 0x15, // format 1, 1 glyph: 21
];

// A Devanagari script with no features: shaping succeeds, every
// feature application is a no-op.
#[rustfmt::skip]
const DEVA_GSUB_DATA: &[u8] = &[
    // GSUB header
    0x00, 0x01, 0x00, 0x00,             // version 1.0
    0x00, 0x0A,                         // script list at 10
    0x00, 0x00,                         // no feature list
    0x00, 0x00,                         // no lookup list
    // ScriptList (10)
    0x00, 0x01,                         // 1 script record
    b'd', b'e', b'v', b'a', 0x00, 0x08, // 'deva' script table at 10+8
    // ScriptTable (18)
    0x00, 0x04,                         // default LangSys at 18+4
    0x00, 0x00,                         // no tagged langsys records
    // LangSys (22)
    0x00, 0x00, 0xFF, 0xFF, 0x00, 0x00, // no features
];

fn layout_cache(data: &[u8]) -> LayoutCache {
    let layout_table = ReadScope::new(data)
        .read::<LayoutTable>()
        .expect("fixture parses");
    new_layout_cache(layout_table)
}

fn gsub_cache() -> LayoutCache {
    layout_cache(GSUB_DATA)
}

struct TestFont {
    cmap: HashMap<char, u16>,
}

impl TestFont {
    fn new(entries: &[(char, u16)]) -> TestFont {
        TestFont {
            cmap: entries.iter().copied().collect(),
        }
    }
}

impl GlyphLookup for TestFont {
    fn char_to_glyph(&self, ch: char) -> Option<u16> {
        self.cmap.get(&ch).copied()
    }
}

fn glyph_indices(buffer: &typeline::shape::ShapedBuffer) -> Vec<u16> {
    buffer.glyphs.iter().map(|g| g.glyph_index).collect()
}

#[test]
fn fixture_scripts_and_features() {
    let cache = gsub_cache();
    let table = &cache.layout_table;
    assert!(table.find_script(tag::ARAB).unwrap().is_some());
    assert!(table.find_script(tag::LATN).unwrap().is_none());
    assert!(gsub_feature_is_supported(&cache, tag::ARAB, None, tag::ISOL).unwrap());
    assert!(gsub_feature_is_supported(&cache, tag::ARAB, None, tag::RLIG).unwrap());
    assert!(!gsub_feature_is_supported(&cache, tag::ARAB, None, tag::MEDI).unwrap());
}

#[test]
fn isolated_form_substitution() {
    let font = TestFont::new(&[(BEH, 5)]);
    let cache = gsub_cache();
    let shaped = contextual_shape("\u{0628}", tag::ARAB, None, &font, Some(&cache)).unwrap();
    assert_eq!(glyph_indices(&shaped), vec![50]);
    assert_eq!(shaped.log_clust, vec![0]);
}

#[test]
fn ligature_merges_clusters() {
    let font = TestFont::new(&[(LAM, 20), (ALEF, 21)]);
    let cache = gsub_cache();
    let text: String = [LAM, ALEF].iter().collect();
    let shaped = contextual_shape(&text, tag::ARAB, None, &font, Some(&cache)).unwrap();
    assert_eq!(glyph_indices(&shaped), vec![99]);
    // Both characters now map to the single ligature glyph.
    assert_eq!(shaped.log_clust, vec![0, 0]);
}

#[test]
fn reversed_pair_does_not_ligate() {
    // Alef before lam: the component walk runs right to left, so the
    // ligature only forms from lam followed by alef.
    let font = TestFont::new(&[(LAM, 20), (ALEF, 21)]);
    let cache = gsub_cache();
    let text: String = [ALEF, LAM].iter().collect();
    let shaped = contextual_shape(&text, tag::ARAB, None, &font, Some(&cache)).unwrap();
    assert_eq!(glyph_indices(&shaped), vec![21, 20]);
    assert_eq!(shaped.log_clust, vec![0, 1]);
}

#[test]
fn ligature_past_window_end_terminates() {
    // The three-component ligature consumes two glyphs beyond the
    // one-glyph window; the window end clamps to the shrunk buffer
    // instead of wrapping.
    let cache = gsub_cache();
    let script = cache
        .layout_table
        .find_script(tag::ARAB)
        .unwrap()
        .expect("fixture script");
    let langsys = script
        .find_langsys_or_default(None)
        .unwrap()
        .expect("fixture langsys");
    let glyphs = [21, 20, 22]
        .iter()
        .map(|&glyph_index| RawGlyph {
            unicodes: tiny_vec![[char; 1] => 'x'],
            glyph_index,
            glyph_origin: GlyphOrigin::Direct,
            extra_data: (),
        })
        .collect();
    let mut buffer = GlyphBuffer::new(glyphs, vec![0, 1, 2]);
    let end = gsub_apply_feature_span(
        &cache,
        langsys,
        tag::RLIG,
        Direction::LeftToRight,
        &mut buffer,
        0,
        1,
    )
    .unwrap();
    assert_eq!(end, 0);
    let glyph_indices: Vec<u16> = buffer.glyphs.iter().map(|g| g.glyph_index).collect();
    assert_eq!(glyph_indices, vec![98]);
    assert_eq!(buffer.log_clust, vec![0, 0, 0]);
}

#[test]
fn default_script_ignores_layout_rules() {
    let font = TestFont::new(&[('a', 1), ('b', 2)]);
    let cache = gsub_cache();
    let shaped = contextual_shape("ab", tag::LATN, None, &font, Some(&cache)).unwrap();
    assert_eq!(glyph_indices(&shaped), vec![1, 2]);
}

#[test]
fn matra_reorder_keeps_source_cluster_order() {
    // KA + I-MATRA: the matra's glyph moves before KA's, but the
    // cluster map stays indexed by source character.
    let font = TestFont::new(&[('\u{0915}', 1), ('\u{093F}', 2), ('\u{25CC}', 3)]);
    let cache = layout_cache(DEVA_GSUB_DATA);
    let shaped =
        contextual_shape("\u{0915}\u{093F}", tag::DEVA, None, &font, Some(&cache)).unwrap();
    assert_eq!(glyph_indices(&shaped), vec![2, 1]);
    assert_eq!(shaped.log_clust, vec![1, 0]);
}

#[test]
fn indic_script_missing_from_layout_rules() {
    // KA VIRAMA SSA parses and reorders, but the fixture carries no
    // Devanagari (or default) script so substitution cannot run.
    let font = TestFont::new(&[('\u{0915}', 1), ('\u{094D}', 2), ('\u{0937}', 3)]);
    let cache = gsub_cache();
    let err = contextual_shape(
        "\u{0915}\u{094D}\u{0937}",
        tag::DEVA,
        None,
        &font,
        Some(&cache),
    )
    .unwrap_err();
    assert_eq!(err, ShapingError::UnsupportedScript(tag::DEVA));
}
