//! Implicit level resolution (rules I1 and I2).

use crate::bidi::class::Class;

/// Bump each character's level according to its resolved class. After
/// this pass every non-BN character's level parity matches its resolved
/// direction: even for L, odd for R.
pub fn resolve_implicit(classes: &[Class], levels: &mut [u8]) {
    for (i, &class) in classes.iter().enumerate() {
        let even = levels[i] & 1 == 0;
        levels[i] += match class {
            Class::L => {
                if even {
                    0
                } else {
                    1
                }
            }
            Class::R => {
                if even {
                    1
                } else {
                    0
                }
            }
            Class::AN => {
                if even {
                    2
                } else {
                    1
                }
            }
            Class::EN => {
                if even {
                    2
                } else {
                    1
                }
            }
            _ => 0,
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn even_level_increments() {
        let classes = [Class::L, Class::R, Class::AN, Class::EN];
        let mut levels = [0u8; 4];
        resolve_implicit(&classes, &mut levels);
        assert_eq!(levels, [0, 1, 2, 2]);
    }

    #[test]
    fn odd_level_increments() {
        let classes = [Class::L, Class::R, Class::AN, Class::EN];
        let mut levels = [1u8; 4];
        resolve_implicit(&classes, &mut levels);
        assert_eq!(levels, [2, 1, 2, 2]);
    }

    #[test]
    fn bn_is_untouched() {
        let classes = [Class::BN];
        let mut levels = [1u8];
        resolve_implicit(&classes, &mut levels);
        assert_eq!(levels, [1]);
    }

    #[test]
    fn parity_matches_direction() {
        let classes = [Class::L, Class::R];
        for base in [0u8, 1] {
            let mut levels = [base; 2];
            resolve_implicit(&classes, &mut levels);
            assert_eq!(levels[0] & 1, 0);
            assert_eq!(levels[1] & 1, 1);
        }
    }
}
