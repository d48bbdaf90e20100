//! Isolating run sequence construction (rule X10).
//!
//! Level runs are grouped left to right, with boundary neutrals
//! attaching to the run in progress, then chained across isolate
//! initiator/PDI pairs into isolating run sequences. Each sequence
//! stores indices into the shared class buffer so the weak and neutral
//! passes mutate one owned buffer rather than per-run copies.

use crate::bidi::class::Class;
use std::collections::HashMap;

pub struct IsolatingRunSequence {
    pub level: u8,
    /// Resolved direction at the start of the sequence: L or R.
    pub sos: Class,
    /// Resolved direction at the end of the sequence: L or R.
    pub eos: Class,
    /// Character indices, in logical order. Each character belongs to
    /// exactly one sequence.
    pub indices: Vec<usize>,
}

struct LevelRun {
    level: u8,
    indices: Vec<usize>,
}

pub fn build_runs(base_level: u8, classes: &[Class], levels: &[u8]) -> Vec<IsolatingRunSequence> {
    let level_runs = build_level_runs(base_level, classes, levels);
    let matching_pdi = match_isolates(classes);

    // Map from the text index a run starts at (first non-BN character)
    // to its position in `level_runs`.
    let mut run_starting_at = HashMap::new();
    for (run_index, run) in level_runs.iter().enumerate() {
        if let Some(&first) = run.indices.iter().find(|&&i| classes[i] != Class::BN) {
            run_starting_at.insert(first, run_index);
        }
    }

    let mut used = vec![false; level_runs.len()];
    let mut sequences = Vec::new();
    for run_index in 0..level_runs.len() {
        if used[run_index] {
            continue;
        }
        used[run_index] = true;
        let mut chain = vec![run_index];
        let mut current = run_index;
        loop {
            let last = match last_non_bn(&level_runs[current], classes) {
                Some(last) => last,
                None => break,
            };
            if !classes[last].is_isolate_initiator() {
                break;
            }
            let next = matching_pdi
                .get(&last)
                .and_then(|pdi| run_starting_at.get(pdi))
                .copied();
            match next {
                Some(next) if !used[next] => {
                    used[next] = true;
                    chain.push(next);
                    current = next;
                }
                _ => break,
            }
        }

        let level = level_runs[chain[0]].level;
        let indices: Vec<usize> = chain
            .iter()
            .flat_map(|&r| level_runs[r].indices.iter().copied())
            .collect();
        let sos = boundary_class(
            preceding_level(&indices, classes, levels, base_level),
            level,
        );
        let eos_neighbor = match indices.iter().rev().find(|&&i| classes[i] != Class::BN) {
            // An unmatched isolate initiator ends against the paragraph.
            Some(&last)
                if classes[last].is_isolate_initiator() && !matching_pdi.contains_key(&last) =>
            {
                base_level
            }
            _ => following_level(&indices, classes, levels, base_level),
        };
        let eos = boundary_class(eos_neighbor, level);
        sequences.push(IsolatingRunSequence {
            level,
            sos,
            eos,
            indices,
        });
    }
    sequences
}

fn build_level_runs(base_level: u8, classes: &[Class], levels: &[u8]) -> Vec<LevelRun> {
    let mut runs: Vec<LevelRun> = Vec::new();
    let mut pending: Vec<usize> = Vec::new();
    for i in 0..classes.len() {
        if classes[i] == Class::BN {
            // Boundary neutrals attach to the run in progress.
            match runs.last_mut() {
                Some(run) => run.indices.push(i),
                None => pending.push(i),
            }
            continue;
        }
        match runs.last_mut() {
            Some(run) if run.level == levels[i] => run.indices.push(i),
            _ => {
                let mut indices = std::mem::take(&mut pending);
                indices.push(i);
                runs.push(LevelRun {
                    level: levels[i],
                    indices,
                });
            }
        }
    }
    if !pending.is_empty() {
        // Nothing but boundary neutrals.
        runs.push(LevelRun {
            level: base_level,
            indices: pending,
        });
    }
    runs
}

/// Match isolate initiators to their PDIs (BD9).
fn match_isolates(classes: &[Class]) -> HashMap<usize, usize> {
    let mut matching = HashMap::new();
    let mut stack: Vec<usize> = Vec::new();
    for (i, &class) in classes.iter().enumerate() {
        if class.is_isolate_initiator() {
            stack.push(i);
        } else if class == Class::PDI {
            if let Some(initiator) = stack.pop() {
                matching.insert(initiator, i);
            }
        }
    }
    matching
}

fn last_non_bn(run: &LevelRun, classes: &[Class]) -> Option<usize> {
    run.indices
        .iter()
        .rev()
        .find(|&&i| classes[i] != Class::BN)
        .copied()
}

fn preceding_level(indices: &[usize], classes: &[Class], levels: &[u8], base_level: u8) -> u8 {
    let first = match indices.first() {
        Some(&first) => first,
        None => return base_level,
    };
    (0..first)
        .rev()
        .find(|&j| classes[j] != Class::BN)
        .map(|j| levels[j])
        .unwrap_or(base_level)
}

fn following_level(indices: &[usize], classes: &[Class], levels: &[u8], base_level: u8) -> u8 {
    let last = match indices.last() {
        Some(&last) => last,
        None => return base_level,
    };
    (last + 1..classes.len())
        .find(|&j| classes[j] != Class::BN)
        .map(|j| levels[j])
        .unwrap_or(base_level)
}

/// The boundary direction is the higher of the neighbor level and the
/// run level: even maps to L, odd to R.
fn boundary_class(neighbor_level: u8, run_level: u8) -> Class {
    if neighbor_level.max(run_level) & 1 == 1 {
        Class::R
    } else {
        Class::L
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bidi::class::classify;
    use crate::bidi::explicit::resolve_explicit;

    fn runs_for(text: &str, base_level: u8) -> (Vec<IsolatingRunSequence>, Vec<Class>) {
        let mut classes: Vec<Class> = text.chars().map(classify).collect();
        let mut levels = vec![0u8; classes.len()];
        resolve_explicit(base_level, &mut classes, &mut levels);
        let runs = build_runs(base_level, &classes, &levels);
        (runs, classes)
    }

    #[test]
    fn single_run_plain_text() {
        let (runs, _) = runs_for("abc", 0);
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].level, 0);
        assert_eq!(runs[0].indices, vec![0, 1, 2]);
        assert_eq!(runs[0].sos, Class::L);
        assert_eq!(runs[0].eos, Class::L);
    }

    #[test]
    fn strong_classes_alone_do_not_split_runs() {
        // a, hebrew, b: all still level 0 after the explicit pass, so
        // rule X10 sees a single level run.
        let (runs, _) = runs_for("a\u{05D0}b", 0);
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].level, 0);
        assert_eq!(runs[0].indices, vec![0, 1, 2]);
        assert_eq!(runs[0].sos, Class::L);
        assert_eq!(runs[0].eos, Class::L);
    }

    #[test]
    fn mixed_direction_runs() {
        // a RLE b PDF c: the embedded 'b' is its own level-1 run.
        let (runs, _) = runs_for("a\u{202B}b\u{202C}c", 0);
        assert_eq!(runs.len(), 3);
        assert_eq!(runs[0].indices, vec![0, 1]);
        assert_eq!(runs[1].indices, vec![2, 3]);
        assert_eq!(runs[2].indices, vec![4]);
        assert_eq!(runs[1].level, 1);
        // The odd run sees R on both sides (max of 0 and 1 is odd).
        assert_eq!(runs[1].sos, Class::R);
        assert_eq!(runs[1].eos, Class::R);
    }

    #[test]
    fn isolate_chains_outer_run() {
        // a RLI b PDI c: the outer level-0 text is one sequence, the
        // isolated 'b' its own.
        let (runs, _) = runs_for("a\u{2067}b\u{2069}c", 0);
        assert_eq!(runs.len(), 2);
        assert_eq!(runs[0].indices, vec![0, 1, 3, 4]);
        assert_eq!(runs[0].level, 0);
        assert_eq!(runs[1].indices, vec![2]);
        assert_eq!(runs[1].level, 1);
    }

    #[test]
    fn bn_attaches_to_preceding_run() {
        // a RLE hebrew PDF b: the controls become BN.
        let (runs, classes) = runs_for("a\u{202B}\u{05D0}\u{202C}b", 0);
        assert_eq!(classes[1], Class::BN);
        assert_eq!(classes[3], Class::BN);
        // BN at index 1 stays with the level-0 run, BN at 3 with the
        // level-1 run.
        assert_eq!(runs.len(), 3);
        assert_eq!(runs[0].indices, vec![0, 1]);
        assert_eq!(runs[1].indices, vec![2, 3]);
        assert_eq!(runs[2].indices, vec![4]);
    }

    #[test]
    fn every_character_in_exactly_one_sequence() {
        let text = "a\u{2067}b\u{2069}\u{05D0}7 c\u{202B}x\u{202C}";
        let (runs, classes) = runs_for(text, 0);
        let mut seen = vec![0usize; classes.len()];
        for run in &runs {
            for &i in &run.indices {
                seen[i] += 1;
            }
        }
        assert!(seen.iter().all(|&count| count == 1));
    }
}
