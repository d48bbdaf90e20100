//! Neutral type resolution (rules N1 and N2), as a table-driven state
//! machine.
//!
//! The `A`/`Na` states track "AN preceded by L", which is how the
//! N1/N2 rules interact with W7's EN-to-L promotion. The transition and
//! action tables are carried over from the reference implementation
//! verbatim and must not be re-derived; a clean-room reconstruction can
//! diverge on the AN-after-L edge cases.

use crate::bidi::class::Class;
use crate::bidi::runs::IsolatingRunSequence;

#[derive(Clone, Copy)]
enum State {
    /// Just saw a strong R (or R-acting EN/AN).
    R,
    /// Just saw a strong L.
    L,
    /// Deferring neutrals after R context.
    Rn,
    /// Deferring neutrals after L context.
    Ln,
    /// AN seen while the last strong type was L.
    A,
    /// Deferring neutrals after that AN.
    Na,
}

#[derive(Clone, Copy)]
enum Action {
    /// No action.
    None,
    /// Add the current character to the deferred neutral run.
    In,
    /// Resolve the current EN to L.
    L,
    /// Resolve the deferred run to the embedding direction.
    En,
    /// Resolve the deferred run to R.
    Rn,
    /// Resolve the deferred run to L.
    Ln,
    /// Resolve the deferred run to L and the current EN to L.
    LnL,
}

// Columns: NI, L, R, AN, EN.
#[rustfmt::skip]
const ACTION_NEUTRALS: [[Action; 5]; 6] = [
    /* R  */ [Action::In, Action::None, Action::None, Action::None, Action::None],
    /* L  */ [Action::In, Action::None, Action::None, Action::None, Action::L],
    /* Rn */ [Action::In, Action::En,   Action::Rn,   Action::Rn,   Action::Rn],
    /* Ln */ [Action::In, Action::Ln,   Action::En,   Action::En,   Action::LnL],
    /* A  */ [Action::In, Action::None, Action::None, Action::None, Action::L],
    /* Na */ [Action::In, Action::En,   Action::Rn,   Action::Rn,   Action::En],
];

#[rustfmt::skip]
const STATE_NEUTRALS: [[State; 5]; 6] = [
    /* R  */ [State::Rn, State::L, State::R, State::R, State::R],
    /* L  */ [State::Ln, State::L, State::R, State::A, State::L],
    /* Rn */ [State::Rn, State::L, State::R, State::R, State::R],
    /* Ln */ [State::Ln, State::L, State::R, State::A, State::L],
    /* A  */ [State::Na, State::L, State::R, State::A, State::L],
    /* Na */ [State::Na, State::L, State::R, State::A, State::L],
];

/// Column index for a resolved class; `None` for transparent BN.
fn column(class: Class) -> Option<usize> {
    match class {
        Class::BN => None,
        Class::L => Some(1),
        Class::R => Some(2),
        Class::AN => Some(3),
        Class::EN => Some(4),
        _ => Some(0), // the NI set: ON, WS, S, B, isolates, PDI
    }
}

/// Resolve neutral types over one isolating run sequence, in place.
/// Runs after weak resolution, so the only classes left are L, R, AN,
/// EN, BN and the NI set.
pub fn resolve_neutral(sequence: &IsolatingRunSequence, classes: &mut [Class]) {
    let embedding = if sequence.level & 1 == 1 {
        Class::R
    } else {
        Class::L
    };
    let mut state = if sequence.sos == Class::R {
        State::R
    } else {
        State::L
    };
    let mut deferred: Vec<usize> = Vec::new();

    for &i in &sequence.indices {
        let col = match column(classes[i]) {
            Some(col) => col,
            None => {
                // BN extends the deferred run so it resolves with the
                // neutrals around it.
                if !deferred.is_empty() {
                    deferred.push(i);
                }
                continue;
            }
        };
        match ACTION_NEUTRALS[state as usize][col] {
            Action::None => {}
            Action::In => deferred.push(i),
            Action::L => classes[i] = Class::L,
            Action::En => resolve_deferred(&mut deferred, classes, embedding),
            Action::Rn => resolve_deferred(&mut deferred, classes, Class::R),
            Action::Ln => resolve_deferred(&mut deferred, classes, Class::L),
            Action::LnL => {
                resolve_deferred(&mut deferred, classes, Class::L);
                classes[i] = Class::L;
            }
        }
        state = STATE_NEUTRALS[state as usize][col];
    }

    // Flush any run still deferred at the end of the sequence with the
    // embedding direction of the final level.
    resolve_deferred(&mut deferred, classes, embedding);
}

fn resolve_deferred(deferred: &mut Vec<usize>, classes: &mut [Class], direction: Class) {
    for &i in deferred.iter() {
        classes[i] = direction;
    }
    deferred.clear();
}
