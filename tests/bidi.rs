//! End-to-end bidirectional analysis: resolved levels composed with
//! visual reordering over whole paragraphs.

use typeline::bidi::{
    level_runs, logical_to_visual, resolve_levels, visual_to_logical, ParagraphDirection,
    MAX_DEPTH,
};

/// Render `text` in visual order according to its resolved levels.
fn visual_order(text: &str, direction: ParagraphDirection) -> String {
    let info = resolve_levels(text, direction);
    let chars: Vec<char> = text.chars().collect();
    logical_to_visual(&info.levels)
        .into_iter()
        .map(|i| chars[i])
        .collect()
}

#[test]
fn latin_paragraph_is_untouched() {
    let info = resolve_levels("abc", ParagraphDirection::LeftToRight);
    assert_eq!(info.base_level, 0);
    assert_eq!(info.levels, vec![0, 0, 0]);
    assert_eq!(visual_order("abc", ParagraphDirection::LeftToRight), "abc");
}

#[test]
fn hebrew_paragraph_reverses() {
    let text = "\u{05D0}\u{05D1}\u{05D2}";
    let info = resolve_levels(text, ParagraphDirection::LeftToRight);
    assert_eq!(info.levels, vec![1, 1, 1]);
    assert_eq!(logical_to_visual(&info.levels), vec![2, 1, 0]);
    assert_eq!(
        visual_order(text, ParagraphDirection::LeftToRight),
        "\u{05D2}\u{05D1}\u{05D0}"
    );
}

#[test]
fn single_rtl_character_embeds() {
    let info = resolve_levels("a\u{05D0}b", ParagraphDirection::LeftToRight);
    assert_eq!(info.levels, vec![0, 1, 0]);
    // A one-character run reverses to itself.
    assert_eq!(
        visual_order("a\u{05D0}b", ParagraphDirection::LeftToRight),
        "a\u{05D0}b"
    );
}

#[test]
fn hebrew_words_keep_word_order_reversed() {
    // Two Hebrew words separated by a space: words and letters both
    // reverse, the space stays between them.
    let text = "\u{05D0}\u{05D1} \u{05D2}\u{05D3}";
    assert_eq!(
        visual_order(text, ParagraphDirection::LeftToRight),
        "\u{05D3}\u{05D2} \u{05D1}\u{05D0}"
    );
}

#[test]
fn digits_in_hebrew_stay_ltr() {
    // Hebrew letters around European digits: the digits keep their
    // internal order while the strong text reverses around them.
    let text = "\u{05D0}12\u{05D1}";
    let info = resolve_levels(text, ParagraphDirection::RightToLeft);
    assert_eq!(info.levels, vec![1, 2, 2, 1]);
    assert_eq!(
        visual_order(text, ParagraphDirection::RightToLeft),
        "\u{05D1}12\u{05D0}"
    );
}

#[test]
fn explicit_overflow_is_capped() {
    let mut text = "\u{202B}".repeat(200); // RLE x200
    text.push('a');
    let info = resolve_levels(&text, ParagraphDirection::LeftToRight);
    assert_eq!(info.levels.len(), 201);
    assert!(info.levels.iter().all(|&level| level <= MAX_DEPTH + 1));
}

#[test]
fn isolate_overflow_is_capped() {
    let mut text = "\u{2067}".repeat(200); // RLI x200
    text.push('a');
    let info = resolve_levels(&text, ParagraphDirection::LeftToRight);
    assert!(info.levels.iter().all(|&level| level <= MAX_DEPTH + 1));
}

#[test]
fn reorder_round_trip() {
    let texts = [
        "abc",
        "\u{05D0}\u{05D1}\u{05D2}",
        "a\u{05D0}b",
        "\u{05D0}12\u{05D1} xy",
        "a \u{05D0}\u{05D1} 12 b",
    ];
    for text in texts {
        for direction in [ParagraphDirection::LeftToRight, ParagraphDirection::RightToLeft] {
            let info = resolve_levels(text, direction);
            let l2v = logical_to_visual(&info.levels);
            let v2l = visual_to_logical(&info.levels);
            let n = info.levels.len();
            let seq: Vec<usize> = (0..n).collect();
            let visual: Vec<usize> = l2v.iter().map(|&i| seq[i]).collect();
            let back: Vec<usize> = v2l.iter().map(|&i| visual[i]).collect();
            assert_eq!(back, seq, "text {:?} direction {:?}", text, direction);
        }
    }
}

#[test]
fn auto_direction_follows_first_strong() {
    assert_eq!(
        resolve_levels("\u{05D0}abc", ParagraphDirection::Auto).base_level,
        1
    );
    assert_eq!(
        resolve_levels("abc\u{05D0}", ParagraphDirection::Auto).base_level,
        0
    );
    // No strong character at all: left-to-right.
    assert_eq!(
        resolve_levels("123", ParagraphDirection::Auto).base_level,
        0
    );
}

#[test]
fn runs_cover_the_paragraph() {
    let info = resolve_levels("a\u{05D0}\u{05D1}1b", ParagraphDirection::LeftToRight);
    let runs = level_runs(&info.levels);
    let mut covered = 0;
    for (level, range) in &runs {
        assert_eq!(covered, range.start);
        assert!(range.end > range.start);
        assert!(info.levels[range.clone()].iter().all(|l| l == level));
        covered = range.end;
    }
    assert_eq!(covered, info.levels.len());
}

#[test]
fn tab_resets_between_opposing_runs() {
    // Segment separator between Hebrew and Latin goes back to the
    // paragraph level.
    let info = resolve_levels("\u{05D0}\ta", ParagraphDirection::LeftToRight);
    assert_eq!(info.levels, vec![1, 0, 0]);
}
