//! Combinators for matching syllable grammars.
//!
//! Matchers take a slice of classified characters and return the
//! number of characters consumed, or `None` when the prefix does not
//! match.

pub fn match_one<T: Copy>(f: impl Fn(T) -> bool) -> impl Fn(&[T]) -> Option<usize> {
    move |cs: &[T]| match cs.first() {
        Some(&c) if f(c) => Some(1),
        _ => None,
    }
}

pub fn match_nonempty<T: Copy>(
    f: impl Fn(&[T]) -> Option<usize>,
) -> impl Fn(&[T]) -> Option<usize> {
    move |cs: &[T]| f(cs).filter(|&n| n > 0)
}

pub fn match_optional<T: Copy>(
    f: impl Fn(&[T]) -> Option<usize>,
) -> impl Fn(&[T]) -> Option<usize> {
    move |cs: &[T]| f(cs).or(Some(0))
}

pub fn match_repeat<T: Copy>(f: impl Fn(&[T]) -> Option<usize>) -> impl Fn(&[T]) -> Option<usize> {
    move |mut cs: &[T]| {
        let mut total = 0;
        while let Some(n) = match_nonempty(&f)(cs) {
            total += n;
            cs = &cs[n..];
        }
        Some(total)
    }
}

pub fn match_seq<T: Copy>(
    f1: impl Fn(&[T]) -> Option<usize>,
    f2: impl Fn(&[T]) -> Option<usize>,
) -> impl Fn(&[T]) -> Option<usize> {
    move |cs: &[T]| {
        let n1 = f1(cs)?;
        let n2 = f2(&cs[n1..])?;
        Some(n1 + n2)
    }
}

pub fn match_either<T: Copy>(
    f1: impl Fn(&[T]) -> Option<usize>,
    f2: impl Fn(&[T]) -> Option<usize>,
) -> impl Fn(&[T]) -> Option<usize> {
    move |cs: &[T]| {
        let n1 = f1(cs);
        let n2 = f2(cs);
        std::cmp::max(n1, n2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Copy, Debug, Eq, PartialEq)]
    enum C {
        A,
        B,
    }

    #[test]
    fn one_and_seq() {
        let m = match_seq(match_one(|c| c == C::A), match_one(|c| c == C::B));
        assert_eq!(m(&[C::A, C::B]), Some(2));
        assert_eq!(m(&[C::A, C::A]), None);
        assert_eq!(m(&[]), None);
    }

    #[test]
    fn either_takes_longest() {
        let m = match_either(
            match_one(|c| c == C::A),
            match_seq(match_one(|c| c == C::A), match_one(|c| c == C::A)),
        );
        assert_eq!(m(&[C::A, C::A]), Some(2));
        assert_eq!(m(&[C::A, C::B]), Some(1));
    }

    #[test]
    fn repeat_consumes_greedily() {
        let m = match_repeat(match_one(|c| c == C::A));
        assert_eq!(m(&[C::A, C::A, C::B]), Some(2));
        assert_eq!(m(&[C::B]), Some(0));
    }
}
