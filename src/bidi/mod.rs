//! Unicode bidirectional algorithm.
//!
//! The passes run in source order over one shared class buffer:
//! classification, explicit levels (X1 to X9), isolating run sequences
//! (X10), then weak, neutral and implicit resolution per sequence
//! (W1 to W7, N1 to N2, I1 to I2), and finally the separator and
//! trailing whitespace reset (L1). [`resolve_levels`] is total: any
//! input produces a level per character.

pub mod class;
pub mod explicit;
pub mod implicit;
pub mod neutral;
pub mod reorder;
pub mod runs;
pub mod weak;

use crate::bidi::class::{classify, strength, Class, Strength};
use itertools::Itertools;
use log::debug;
use std::ops::Range;

pub use crate::bidi::explicit::MAX_DEPTH;
pub use crate::bidi::reorder::{logical_to_visual, visual_to_logical};

/// Requested paragraph direction.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ParagraphDirection {
    LeftToRight,
    RightToLeft,
    /// First-strong scan (P2/P3), skipping isolated runs.
    Auto,
}

/// Resolved embedding levels for one paragraph. Levels are indexed by
/// character position (`text.chars()`), not by byte.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BidiInfo {
    pub base_level: u8,
    pub levels: Vec<u8>,
}

/// Run the full bidirectional algorithm over one paragraph of text.
pub fn resolve_levels(text: &str, direction: ParagraphDirection) -> BidiInfo {
    let original_classes: Vec<Class> = text.chars().map(classify).collect();
    let base_level = match direction {
        ParagraphDirection::LeftToRight => 0,
        ParagraphDirection::RightToLeft => 1,
        ParagraphDirection::Auto => {
            if explicit::first_strong_is_rtl(&original_classes) {
                1
            } else {
                0
            }
        }
    };

    let mut classes = original_classes.clone();
    let mut levels = vec![base_level; classes.len()];
    explicit::resolve_explicit(base_level, &mut classes, &mut levels);

    let sequences = runs::build_runs(base_level, &classes, &levels);
    debug!(
        "resolved {} isolating run sequence(s) at base level {}",
        sequences.len(),
        base_level
    );
    for sequence in &sequences {
        weak::resolve_weak(sequence, &mut classes);
        neutral::resolve_neutral(sequence, &mut classes);
    }
    implicit::resolve_implicit(&classes, &mut levels);
    reset_separators_and_trailing_whitespace(base_level, &original_classes, &mut levels);

    BidiInfo { base_level, levels }
}

/// Rule L1: segment separators, paragraph separators, and any runs of
/// whitespace or formatting characters before them or at the end of
/// the paragraph go back to the paragraph level. Uses the original
/// classes, not the resolved ones.
fn reset_separators_and_trailing_whitespace(
    base_level: u8,
    original_classes: &[Class],
    levels: &mut [u8],
) {
    let mut tail_start = 0;
    for i in 0..original_classes.len() {
        let class = original_classes[i];
        match class {
            Class::B | Class::S => {
                for level in &mut levels[tail_start..=i] {
                    *level = base_level;
                }
                tail_start = i + 1;
            }
            Class::WS | Class::BN | Class::PDI => {}
            class if class.is_isolate_initiator() || class.is_removed_by_x9() => {}
            _ => tail_start = i + 1,
        }
    }
    for level in &mut levels[tail_start..] {
        *level = base_level;
    }
}

/// Group resolved levels into maximal same-level runs in logical
/// order, for callers that render or measure one run at a time.
pub fn level_runs(levels: &[u8]) -> Vec<(u8, Range<usize>)> {
    levels
        .iter()
        .enumerate()
        .group_by(|&(_, &level)| level)
        .into_iter()
        .map(|(level, mut group)| {
            let start = group.next().map_or(0, |(i, _)| i);
            let end = group.last().map_or(start, |(i, _)| i);
            (level, start..end + 1)
        })
        .collect()
}

/// Coarse strong/weak/neutral classification of each character, used
/// by external run segmentation rather than the bidi passes themselves.
pub fn strengths(text: &str) -> Vec<Strength> {
    text.chars().map(|ch| strength(classify(ch))).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_ltr() {
        let info = resolve_levels("abc", ParagraphDirection::LeftToRight);
        assert_eq!(info.base_level, 0);
        assert_eq!(info.levels, vec![0, 0, 0]);
        assert_eq!(logical_to_visual(&info.levels), vec![0, 1, 2]);
    }

    #[test]
    fn all_rtl() {
        let info = resolve_levels("\u{05D0}\u{05D1}\u{05D2}", ParagraphDirection::LeftToRight);
        assert_eq!(info.levels, vec![1, 1, 1]);
        assert_eq!(logical_to_visual(&info.levels), vec![2, 1, 0]);
    }

    #[test]
    fn embedded_rtl_character() {
        let info = resolve_levels("a\u{05D0}b", ParagraphDirection::LeftToRight);
        assert_eq!(info.levels, vec![0, 1, 0]);
        assert_eq!(logical_to_visual(&info.levels), vec![0, 1, 2]);
    }

    #[test]
    fn auto_direction_first_strong() {
        let info = resolve_levels("\u{05D0}a", ParagraphDirection::Auto);
        assert_eq!(info.base_level, 1);
        let info = resolve_levels("a\u{05D0}", ParagraphDirection::Auto);
        assert_eq!(info.base_level, 0);
        // Isolated content does not determine the paragraph direction.
        let info = resolve_levels("\u{2067}\u{05D0}\u{2069}a", ParagraphDirection::Auto);
        assert_eq!(info.base_level, 0);
    }

    #[test]
    fn numbers_in_rtl_context() {
        // Hebrew then European digits: digits stay LTR at level 2.
        let info = resolve_levels("\u{05D0}12", ParagraphDirection::RightToLeft);
        assert_eq!(info.levels, vec![1, 2, 2]);
    }

    #[test]
    fn neutral_between_rtl() {
        let info = resolve_levels("\u{05D0} \u{05D1}", ParagraphDirection::LeftToRight);
        assert_eq!(info.levels, vec![1, 1, 1]);
    }

    #[test]
    fn trailing_whitespace_resets_to_base() {
        let info = resolve_levels("\u{05D0}\u{05D1} ", ParagraphDirection::LeftToRight);
        assert_eq!(info.levels, vec![1, 1, 0]);
    }

    #[test]
    fn segment_separator_resets() {
        let info = resolve_levels("\u{05D0}\ta", ParagraphDirection::LeftToRight);
        assert_eq!(info.levels[1], 0);
    }

    #[test]
    fn overflow_is_capped_and_total() {
        let mut text = "\u{202B}".repeat(200);
        text.push('a');
        let info = resolve_levels(&text, ParagraphDirection::LeftToRight);
        assert_eq!(info.levels.len(), 201);
        assert!(info.levels.iter().all(|&level| level <= MAX_DEPTH + 1));
    }

    #[test]
    fn idempotent_without_controls() {
        // Re-running on text with no explicit controls gives the same
        // levels.
        let text = "a\u{05D0}7 b";
        let first = resolve_levels(text, ParagraphDirection::LeftToRight);
        let second = resolve_levels(text, ParagraphDirection::LeftToRight);
        assert_eq!(first, second);
    }

    #[test]
    fn level_run_grouping() {
        assert_eq!(level_runs(&[]), vec![]);
        assert_eq!(level_runs(&[0, 0, 0]), vec![(0, 0..3)]);
        assert_eq!(
            level_runs(&[0, 1, 1, 2, 0]),
            vec![(0, 0..1), (1, 1..3), (2, 3..4), (0, 4..5)]
        );
    }

    #[test]
    fn strengths_classification() {
        let got = strengths("a\u{05D0}7 \u{2067}");
        assert_eq!(
            got,
            vec![
                Strength::Strong,
                Strength::Strong,
                Strength::Weak,
                Strength::Neutral,
                Strength::Strong,
            ]
        );
    }
}
