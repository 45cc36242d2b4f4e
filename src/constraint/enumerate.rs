//! Exact, solver-free backend.
//!
//! Bit `j` of `advance(s)` depends only on bits `0..=j` of `s`, so every
//! extracted character (bits 16..22) is a function of the low 23 bits of
//! `state0` alone. Pinning one character fixes seven bits of that state's
//! low 23 up to the case bit, leaving `2 * 2^16` candidates, which are
//! stepped back to `state0` and checked against the remaining pins.

use rayon::prelude::*;
use tracing::trace;

use super::{check_index, Backend, Session, Verdict};
use crate::error::{Error, Result};
use crate::extract::{Extractor, SHIFT};
use crate::rng::{advance, jump_coefficients, unscramble, PERIOD};

/// Bits of `state0` that determine every character.
pub const OBSERVED_BITS: u32 = 23;
pub const OBSERVED_MASK: u64 = (1 << OBSERVED_BITS) - 1;

#[derive(Debug, Default, Clone, Copy)]
pub struct EnumerationBackend;

impl Backend for EnumerationBackend {
    type Session<'a> = EnumerationSession;

    fn open(&self, depth: usize, extractor: Extractor) -> Result<EnumerationSession> {
        if depth == 0 {
            return Err(Error::config("chain depth must be at least 1"));
        }
        Ok(EnumerationSession {
            extractor,
            pins: vec![None; depth],
            conflicting: false,
            anchor: None,
            candidates: Vec::new(),
            witness: None,
        })
    }

    fn name(&self) -> &'static str {
        "enumerate"
    }
}

#[derive(Debug)]
pub struct EnumerationSession {
    extractor: Extractor,
    pins: Vec<Option<u8>>,
    // Two different codes pinned to one character.
    conflicting: bool,
    // Lowest pinned index at the time `candidates` was enumerated.
    anchor: Option<usize>,
    // Surviving low 23 bits of state0, ascending.
    candidates: Vec<u32>,
    witness: Option<u64>,
}

fn chain_matches(extractor: Extractor, pins: &[Option<u8>], state0: u32) -> bool {
    let mut state = u64::from(state0);
    pins.iter().all(|pin| {
        state = advance(state);
        pin.map_or(true, |code| extractor.extract(state) == code)
    })
}

impl EnumerationSession {
    fn enumerate(&self, anchor: usize, code: u8) -> Vec<u32> {
        let Some(patterns) = self.extractor.preimages(code) else {
            return Vec::new();
        };
        // From state[anchor + 1] back to state0.
        let (mult, plus) = jump_coefficients(PERIOD - (anchor as u64 + 1));
        let extractor = self.extractor;
        let pins = &self.pins;

        let mut found: Vec<u32> = patterns[..]
            .par_iter()
            .flat_map_iter(|&pattern| {
                (0..1u64 << SHIFT).map(move |low| (u64::from(pattern) << SHIFT) | low)
            })
            .map(|state| (state.wrapping_mul(mult).wrapping_add(plus) & OBSERVED_MASK) as u32)
            .filter(|&state0| chain_matches(extractor, pins, state0))
            .collect();
        found.par_sort_unstable();
        found
    }

    /// Number of low-23-bit `state0` values consistent with the pins, as of
    /// the last check.
    pub fn candidate_count(&self) -> usize {
        self.candidates.len()
    }
}

impl Session for EnumerationSession {
    fn depth(&self) -> usize {
        self.pins.len()
    }

    fn pin(&mut self, index: usize, code: u8) -> Result<()> {
        check_index(index, self.pins.len())?;
        match self.pins[index] {
            Some(existing) if existing != code => self.conflicting = true,
            _ => self.pins[index] = Some(code),
        }
        Ok(())
    }

    fn check(&mut self) -> Result<Verdict> {
        self.witness = None;
        if self.conflicting {
            self.candidates.clear();
            return Ok(Verdict::Unsat);
        }
        let Some((anchor, code)) = self
            .pins
            .iter()
            .enumerate()
            .find_map(|(index, pin)| pin.map(|code| (index, code)))
        else {
            // Nothing pinned: any seed will do.
            self.witness = Some(unscramble(0));
            return Ok(Verdict::Sat);
        };

        if self.anchor == Some(anchor) {
            let extractor = self.extractor;
            let pins = &self.pins;
            self.candidates = std::mem::take(&mut self.candidates)
                .into_par_iter()
                .filter(|&state0| chain_matches(extractor, pins, state0))
                .collect();
        } else {
            self.candidates = self.enumerate(anchor, code);
            self.anchor = Some(anchor);
        }
        trace!(anchor, candidates = self.candidates.len(), "enumerated chain");

        match self.candidates.first() {
            Some(&state0) => {
                self.witness = Some(unscramble(u64::from(state0)));
                Ok(Verdict::Sat)
            }
            None => Ok(Verdict::Unsat),
        }
    }

    fn witness_seed(&self) -> Result<u64> {
        self.witness
            .ok_or_else(|| Error::solver("no model available: last check was not SAT"))
    }
}
