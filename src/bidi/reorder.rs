//! Visual reordering from resolved levels.
//!
//! Both directions are recursive reverse-in-place over an owned index
//! buffer, but they are not mirror images of each other: logical to
//! visual recurses into deeper spans first and reverses on the way
//! out, while visual to logical must pre-scan for deeper levels,
//! reverse first, and only then re-scan and recurse, because its
//! output positions already reflect the outer reversal. The reverse
//! flag holds once an odd level has been entered.

/// Permutation taking visual position to logical index: applying it to
/// a logical sequence produces visual order.
pub fn logical_to_visual(levels: &[u8]) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..levels.len()).collect();
    reorder_logical_to_visual(0, levels, &mut indices, false);
    indices
}

/// Permutation taking logical position to visual index; the inverse of
/// [`logical_to_visual`] for the same level array.
pub fn visual_to_logical(levels: &[u8]) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..levels.len()).collect();
    reorder_visual_to_logical(0, levels, &mut indices, 0, false);
    indices
}

fn reorder_logical_to_visual(level: u8, levels: &[u8], indices: &mut [usize], reverse: bool) {
    let reverse = reverse || level & 1 == 1;
    let mut i = 0;
    while i < indices.len() {
        if levels[indices[i]] > level {
            let start = i;
            while i < indices.len() && levels[indices[i]] > level {
                i += 1;
            }
            reorder_logical_to_visual(level + 1, levels, &mut indices[start..i], reverse);
        } else {
            i += 1;
        }
    }
    if reverse {
        indices.reverse();
    }
}

fn reorder_visual_to_logical(
    level: u8,
    levels: &[u8],
    indices: &mut [usize],
    offset: usize,
    reverse: bool,
) {
    let reverse = reverse || level & 1 == 1;
    // Spans here live at logical positions (`offset` into the level
    // array), not at the values being permuted, so deeper levels must
    // be located up front.
    let has_deeper = levels[offset..offset + indices.len()]
        .iter()
        .any(|&l| l > level);
    if reverse {
        indices.reverse();
    }
    if has_deeper {
        let mut i = 0;
        while i < indices.len() {
            if levels[offset + i] > level {
                let start = i;
                while i < indices.len() && levels[offset + i] > level {
                    i += 1;
                }
                reorder_visual_to_logical(
                    level + 1,
                    levels,
                    &mut indices[start..i],
                    offset + start,
                    reverse,
                );
            } else {
                i += 1;
            }
        }
    }
}
