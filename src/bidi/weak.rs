//! Weak type resolution (rules W1 to W7).

use crate::bidi::class::Class;
use crate::bidi::runs::IsolatingRunSequence;

/// Resolve weak types in place over one isolating run sequence,
/// using `sos`/`eos` as virtual boundary classes. Boundary neutrals are
/// transparent to every neighbor search and are only rewritten by the
/// W6 adjacency cleanup.
pub fn resolve_weak(sequence: &IsolatingRunSequence, classes: &mut [Class]) {
    let indices = &sequence.indices;

    // W1: NSM takes the class of the preceding character; after an
    // isolate initiator or PDI it becomes ON.
    let mut prev = sequence.sos;
    for &i in indices {
        match classes[i] {
            Class::NSM => {
                classes[i] = if prev.is_isolate_initiator() || prev == Class::PDI {
                    Class::ON
                } else {
                    prev
                };
                prev = classes[i];
            }
            Class::BN => {}
            class => prev = class,
        }
    }

    // W2: EN becomes AN when the nearest preceding strong type is AL.
    let mut last_strong = sequence.sos;
    for &i in indices {
        match classes[i] {
            Class::L | Class::R | Class::AL => last_strong = classes[i],
            Class::EN if last_strong == Class::AL => classes[i] = Class::AN,
            _ => {}
        }
    }

    // W3: AL becomes R.
    for &i in indices {
        if classes[i] == Class::AL {
            classes[i] = Class::R;
        }
    }

    // W4: a single ES between two EN becomes EN; a single CS between
    // two EN becomes EN, between two AN becomes AN.
    for (pos, &i) in indices.iter().enumerate() {
        if classes[i] != Class::ES && classes[i] != Class::CS {
            continue;
        }
        let before = prev_non_bn(indices, classes, pos).unwrap_or(sequence.sos);
        let after = next_non_bn(indices, classes, pos).unwrap_or(sequence.eos);
        if before == Class::EN && after == Class::EN {
            classes[i] = Class::EN;
        } else if classes[i] == Class::CS && before == Class::AN && after == Class::AN {
            classes[i] = Class::AN;
        }
    }

    // W5: a run of ET adjacent to EN becomes EN.
    for (pos, &i) in indices.iter().enumerate() {
        if classes[i] != Class::ET {
            continue;
        }
        let before = prev_non_bn(indices, classes, pos).unwrap_or(sequence.sos);
        if before == Class::EN {
            classes[i] = Class::EN;
            continue;
        }
        // Scan past the rest of the ET run for a following EN.
        let mut lookahead = pos + 1;
        let mut resolved = false;
        while lookahead < indices.len() {
            match classes[indices[lookahead]] {
                Class::ET | Class::BN => lookahead += 1,
                Class::EN => {
                    resolved = true;
                    break;
                }
                _ => break,
            }
        }
        if resolved {
            classes[i] = Class::EN;
        }
    }

    // W6: remaining separators and terminators become ON, along with
    // any directly adjacent BN so later lookups cannot see a stale
    // boundary neutral between two neutrals.
    for pos in 0..indices.len() {
        let i = indices[pos];
        if matches!(classes[i], Class::ES | Class::CS | Class::ET) {
            classes[i] = Class::ON;
            if pos > 0 && classes[indices[pos - 1]] == Class::BN {
                classes[indices[pos - 1]] = Class::ON;
            }
            if pos + 1 < indices.len() && classes[indices[pos + 1]] == Class::BN {
                classes[indices[pos + 1]] = Class::ON;
            }
        }
    }

    // W7: EN becomes L when the nearest preceding strong type is L.
    let mut last_strong = sequence.sos;
    for &i in indices {
        match classes[i] {
            Class::L | Class::R => last_strong = classes[i],
            Class::EN if last_strong == Class::L => classes[i] = Class::L,
            _ => {}
        }
    }
}

fn prev_non_bn(indices: &[usize], classes: &[Class], pos: usize) -> Option<Class> {
    indices[..pos]
        .iter()
        .rev()
        .map(|&i| classes[i])
        .find(|&class| class != Class::BN)
}

fn next_non_bn(indices: &[usize], classes: &[Class], pos: usize) -> Option<Class> {
    indices[pos + 1..]
        .iter()
        .map(|&i| classes[i])
        .find(|&class| class != Class::BN)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sequence(classes: &[Class], sos: Class, eos: Class) -> IsolatingRunSequence {
        IsolatingRunSequence {
            level: 0,
            sos,
            eos,
            indices: (0..classes.len()).collect(),
        }
    }

    fn resolve(mut classes: Vec<Class>, sos: Class, eos: Class) -> Vec<Class> {
        let seq = sequence(&classes, sos, eos);
        resolve_weak(&seq, &mut classes);
        classes
    }

    #[test]
    fn w1_nsm_takes_preceding_class() {
        let classes = resolve(vec![Class::R, Class::NSM, Class::NSM], Class::L, Class::L);
        assert_eq!(classes, vec![Class::R, Class::R, Class::R]);
    }

    #[test]
    fn w1_nsm_at_start_takes_sos() {
        let classes = resolve(vec![Class::NSM], Class::R, Class::L);
        assert_eq!(classes, vec![Class::R]);
    }

    #[test]
    fn w1_nsm_after_isolate_becomes_on() {
        let classes = resolve(vec![Class::PDI, Class::NSM], Class::L, Class::L);
        assert_eq!(classes[1], Class::ON);
    }

    #[test]
    fn w2_en_after_al_becomes_an() {
        let classes = resolve(vec![Class::AL, Class::EN], Class::L, Class::L);
        assert_eq!(classes, vec![Class::R, Class::AN]);
    }

    #[test]
    fn w4_single_es_between_en() {
        let classes = resolve(vec![Class::EN, Class::ES, Class::EN], Class::L, Class::L);
        assert_eq!(classes, vec![Class::L, Class::L, Class::L]);
        // All resolve through W7 with sos L; the interior check is that
        // the ES became EN before W7 promoted the whole triple.
        let classes = resolve(vec![Class::EN, Class::ES, Class::EN], Class::R, Class::R);
        assert_eq!(classes, vec![Class::EN, Class::EN, Class::EN]);
    }

    #[test]
    fn w4_cs_between_an() {
        let classes = resolve(vec![Class::AN, Class::CS, Class::AN], Class::R, Class::R);
        assert_eq!(classes, vec![Class::AN, Class::AN, Class::AN]);
    }

    #[test]
    fn w4_skips_bn() {
        let classes = resolve(
            vec![Class::EN, Class::BN, Class::ES, Class::EN],
            Class::R,
            Class::R,
        );
        assert_eq!(classes[2], Class::EN);
    }

    #[test]
    fn w5_et_run_adjacent_to_en() {
        let classes = resolve(vec![Class::ET, Class::ET, Class::EN], Class::R, Class::R);
        assert_eq!(classes, vec![Class::EN, Class::EN, Class::EN]);
        let classes = resolve(vec![Class::EN, Class::ET, Class::ET], Class::R, Class::R);
        assert_eq!(classes, vec![Class::EN, Class::EN, Class::EN]);
    }

    #[test]
    fn w6_unattached_terminators_become_on() {
        let classes = resolve(vec![Class::ET, Class::R], Class::R, Class::R);
        assert_eq!(classes, vec![Class::ON, Class::R]);
        let classes = resolve(vec![Class::AN, Class::ES, Class::EN], Class::R, Class::R);
        assert_eq!(classes[1], Class::ON);
    }

    #[test]
    fn w7_en_after_l_becomes_l() {
        let classes = resolve(vec![Class::L, Class::EN], Class::R, Class::R);
        assert_eq!(classes, vec![Class::L, Class::L]);
        let classes = resolve(vec![Class::R, Class::EN], Class::L, Class::L);
        assert_eq!(classes, vec![Class::R, Class::EN]);
    }
}
