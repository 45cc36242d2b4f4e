//! Mapping from a generator state to one output character.
//!
//! The character is bits 16..22 of the state (the low seven bits of
//! `next_int()`), with bit `0x20` forced to a fixed polarity.

use serde::{Deserialize, Serialize};

pub const SHIFT: u32 = 16;
pub const LOW_SEVEN: u64 = 0x7F;
pub const CASE_BIT: u8 = 0x20;

/// Polarity of the `0x20` bit in every produced character.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum CaseMode {
    /// Bit cleared: `@`, `A`-`Z`, `[\]^_` and control bytes.
    Upper,
    /// Bit set: space, digits, punctuation and `a`-`z`.
    #[default]
    Lower,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Extractor {
    case: CaseMode
}

impl Extractor {
    pub const fn new(case: CaseMode) -> Self {
        Extractor { case }
    }

    pub const fn case(&self) -> CaseMode {
        self.case
    }

    #[inline]
    const fn apply_case(&self, seven: u8) -> u8 {
        match self.case {
            CaseMode::Upper => seven & !CASE_BIT,
            CaseMode::Lower => seven | CASE_BIT,
        }
    }

    /// Character for a generator state.
    #[inline]
    pub const fn extract(&self, state: u64) -> u8 {
        self.apply_case(((state >> SHIFT) & LOW_SEVEN) as u8)
    }

    /// Character for a `next_int()` / `next(32)` output.
    #[inline]
    pub const fn from_output(&self, output: u32) -> u8 {
        self.apply_case((output as u64 & LOW_SEVEN) as u8)
    }

    pub const fn is_realizable(&self, byte: u8) -> bool {
        byte < 0x80 && byte == self.apply_case(byte)
    }

    /// The two values of `(state >> 16) & 0x7F` that produce `byte`, or
    /// `None` if no state does.
    pub const fn preimages(&self, byte: u8) -> Option<[u8; 2]> {
        if self.is_realizable(byte) {
            Some([byte & !CASE_BIT, byte | CASE_BIT])
        } else {
            None
        }
    }

    /// Moves an ASCII letter into this extractor's case.
    pub const fn fold(&self, byte: u8) -> u8 {
        match self.case {
            CaseMode::Upper => byte.to_ascii_uppercase(),
            CaseMode::Lower => byte.to_ascii_lowercase(),
        }
    }

    pub fn first_unrealizable(&self, message: &[u8]) -> Option<(usize, u8)> {
        message
            .iter()
            .copied()
            .enumerate()
            .find(|&(_, byte)| !self.is_realizable(byte))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::JavaRandom;

    const UPPER: Extractor = Extractor::new(CaseMode::Upper);
    const LOWER: Extractor = Extractor::new(CaseMode::Lower);

    #[test]
    fn polarity_is_forced() {
        let state = 0x61u64 << SHIFT;
        assert_eq!(UPPER.extract(state), b'A');
        assert_eq!(LOWER.extract(state), b'a');
        let state = 0x41u64 << SHIFT;
        assert_eq!(UPPER.extract(state), b'A');
        assert_eq!(LOWER.extract(state), b'a');
    }

    #[test]
    fn only_seven_bits_are_used() {
        let state = (0xFFFF_u64 << 32) | (0xC1 << SHIFT) | 0xFFFF;
        assert_eq!(UPPER.extract(state), b'A');
    }

    #[test]
    fn output_and_state_agree() {
        let mut rng = JavaRandom::new(2024);
        for _ in 0..64 {
            let output = rng.next_bits(32);
            assert_eq!(LOWER.from_output(output), LOWER.extract(rng.state()));
            assert_eq!(UPPER.from_output(output), UPPER.extract(rng.state()));
        }
    }

    #[test]
    fn realizable_ranges() {
        for byte in b'A'..=b'Z' {
            assert!(UPPER.is_realizable(byte));
            assert!(!LOWER.is_realizable(byte));
        }
        for &byte in b"happy valentines 123" {
            assert!(LOWER.is_realizable(byte));
        }
        assert!(!UPPER.is_realizable(b' '));
        assert!(!LOWER.is_realizable(0xE9));
        assert!(!UPPER.is_realizable(0xC1));
    }

    #[test]
    fn preimages_map_back() {
        let [a, b] = UPPER.preimages(b'L').unwrap();
        assert_eq!(UPPER.extract((a as u64) << SHIFT), b'L');
        assert_eq!(UPPER.extract((b as u64) << SHIFT), b'L');
        assert_ne!(a, b);
        assert_eq!(LOWER.preimages(b'L'), None);
    }

    #[test]
    fn first_unrealizable_reports_position() {
        assert_eq!(LOWER.first_unrealizable(b"hello world"), None);
        assert_eq!(LOWER.first_unrealizable(b"hello World"), Some((6, b'W')));
        assert_eq!(UPPER.first_unrealizable(b""), None);
    }

    #[test]
    fn fold_moves_letters_only() {
        assert_eq!(LOWER.fold(b'Q'), b'q');
        assert_eq!(UPPER.fold(b'q'), b'Q');
        assert_eq!(UPPER.fold(b' '), b' ');
    }
}
