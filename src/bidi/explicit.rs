//! Explicit embedding level resolution (rules X1 to X9).

use crate::bidi::class::Class;

/// Maximum embedding level.
pub const MAX_DEPTH: u8 = 125;

/// Directional status stack capacity: MAX_DEPTH + 2 entries, the base
/// entry plus one potential overflowing push.
const STACK_CAPACITY: usize = MAX_DEPTH as usize + 2;

#[derive(Clone, Copy)]
struct StatusEntry {
    level: u8,
    /// ON when no override is active.
    override_class: Class,
    is_isolate: bool,
}

struct StatusStack {
    entries: Vec<StatusEntry>,
}

impl StatusStack {
    fn new(base_level: u8) -> Self {
        let mut entries = Vec::with_capacity(STACK_CAPACITY);
        entries.push(StatusEntry {
            level: base_level,
            override_class: Class::ON,
            is_isolate: false,
        });
        StatusStack { entries }
    }

    fn top(&self) -> StatusEntry {
        // The base entry is never popped.
        *self.entries.last().unwrap()
    }

    fn push(&mut self, entry: StatusEntry) {
        debug_assert!(self.entries.len() < STACK_CAPACITY);
        self.entries.push(entry);
    }

    fn pop(&mut self) {
        if self.entries.len() > 1 {
            self.entries.pop();
        }
    }
}

fn next_odd(level: u8) -> u8 {
    (level + 1) | 1
}

fn next_even(level: u8) -> u8 {
    (level + 2) & !1
}

/// Resolve explicit embedding levels and directional overrides in
/// place. `classes` is rewritten where an override applies, and rule X9
/// finally turns the embedding/override/PDF controls into BN. Isolate
/// initiators and PDI keep their classes so run chaining can still
/// match them.
///
/// Total over all inputs: malformed nesting is absorbed by the
/// overflow counters and never grows the stack past its bound.
pub fn resolve_explicit(base_level: u8, classes: &mut [Class], levels: &mut [u8]) {
    let mut stack = StatusStack::new(base_level);
    let mut overflow_isolate_count: usize = 0;
    let mut overflow_embedding_count: usize = 0;
    let mut valid_isolate_count: usize = 0;

    for i in 0..classes.len() {
        let class = classes[i];
        match class {
            Class::RLE | Class::LRE | Class::RLO | Class::LRO => {
                let top = stack.top();
                levels[i] = top.level;
                let new_level = match class {
                    Class::RLE | Class::RLO => next_odd(top.level),
                    _ => next_even(top.level),
                };
                let override_class = match class {
                    Class::RLO => Class::R,
                    Class::LRO => Class::L,
                    _ => Class::ON,
                };
                if new_level <= MAX_DEPTH
                    && overflow_isolate_count == 0
                    && overflow_embedding_count == 0
                {
                    stack.push(StatusEntry {
                        level: new_level,
                        override_class,
                        is_isolate: false,
                    });
                } else if overflow_isolate_count == 0 {
                    overflow_embedding_count += 1;
                }
            }
            Class::RLI | Class::LRI | Class::FSI => {
                let top = stack.top();
                levels[i] = top.level;
                let rtl = match class {
                    Class::RLI => true,
                    Class::LRI => false,
                    // FSI resolves its direction from the first strong
                    // character of the isolated text (P2/P3).
                    _ => first_strong_is_rtl(&classes[i + 1..]),
                };
                let new_level = if rtl {
                    next_odd(top.level)
                } else {
                    next_even(top.level)
                };
                if new_level <= MAX_DEPTH
                    && overflow_isolate_count == 0
                    && overflow_embedding_count == 0
                {
                    valid_isolate_count += 1;
                    stack.push(StatusEntry {
                        level: new_level,
                        override_class: Class::ON,
                        is_isolate: true,
                    });
                } else {
                    overflow_isolate_count += 1;
                }
            }
            Class::PDI => {
                if overflow_isolate_count > 0 {
                    overflow_isolate_count -= 1;
                } else if valid_isolate_count > 0 {
                    overflow_embedding_count = 0;
                    while !stack.top().is_isolate {
                        stack.pop();
                    }
                    stack.pop();
                    valid_isolate_count -= 1;
                }
                levels[i] = stack.top().level;
            }
            Class::PDF => {
                if overflow_isolate_count > 0 {
                    // Matched against an overflowing isolate initiator.
                } else if overflow_embedding_count > 0 {
                    overflow_embedding_count -= 1;
                } else if !stack.top().is_isolate {
                    stack.pop();
                }
                levels[i] = stack.top().level;
            }
            _ => {
                let top = stack.top();
                levels[i] = top.level;
                if top.override_class != Class::ON {
                    classes[i] = top.override_class;
                }
            }
        }
    }

    // X9: the embedding and override controls become boundary neutrals,
    // invisible to the weak/neutral/implicit passes but still leveled.
    for class in classes.iter_mut() {
        if class.is_removed_by_x9() {
            *class = Class::BN;
        }
    }
}

/// First-strong scan for FSI (and the Auto paragraph direction):
/// returns true if the first strong class, skipping isolated runs, is
/// R or AL.
pub fn first_strong_is_rtl(classes: &[Class]) -> bool {
    let mut isolate_depth: usize = 0;
    for &class in classes {
        if class.is_isolate_initiator() {
            isolate_depth += 1;
        } else if class == Class::PDI {
            if isolate_depth == 0 {
                // Matching PDI terminates an FSI scan.
                break;
            }
            isolate_depth -= 1;
        } else if isolate_depth == 0 {
            match class {
                Class::L => return false,
                Class::R | Class::AL => return true,
                _ => {}
            }
        }
    }
    false
}
