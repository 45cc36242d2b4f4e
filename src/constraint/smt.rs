//! Z3 bit-vector backend.
//!
//! The chain is declared with 64-bit bit-vectors exactly as the generator
//! computes it:
//!
//! ```text
//! state0 == (seed ^ MULTIPLIER) & MASK
//! stateI == (stateI-1 * MULTIPLIER + ADDEND) & MASK
//! chI    == ((stateI >> 16) & 0x7F) | 0x20     (lower)
//! chI    == ((stateI >> 16) & 0x7F) & ~0x20    (upper)
//! ```
//!
//! Only available with `--features smt`; otherwise [`Z3Backend::new`]
//! reports that the feature is missing.

#[cfg(feature = "smt")]
use z3::ast::{Ast, BV};
#[cfg(feature = "smt")]
use z3::{Config, Context, SatResult, Solver};
#[cfg(feature = "smt")]
use tracing::debug;

use super::{Backend, Session, Verdict};
use crate::error::{Error, Result};
use crate::extract::Extractor;
#[cfg(feature = "smt")]
use crate::extract::{CaseMode, CASE_BIT, LOW_SEVEN, SHIFT};
#[cfg(feature = "smt")]
use crate::rng::{ADDEND, MASK, MULTIPLIER};

#[cfg(feature = "smt")]
const WIDTH: u32 = 64;

#[cfg(feature = "smt")]
pub struct Z3Backend {
    context: Context,
}

#[cfg(feature = "smt")]
impl Z3Backend {
    /// `timeout_ms` bounds every individual satisfiability query.
    pub fn new(timeout_ms: Option<u64>) -> Result<Self> {
        let mut cfg = Config::new();
        cfg.set_model_generation(true);
        if let Some(ms) = timeout_ms {
            cfg.set_timeout_msec(ms);
        }
        Ok(Z3Backend {
            context: Context::new(&cfg),
        })
    }
}

#[cfg(feature = "smt")]
pub struct Z3Session<'ctx> {
    context: &'ctx Context,
    solver: Solver<'ctx>,
    seed: BV<'ctx>,
    characters: Vec<BV<'ctx>>,
    witness: Option<u64>,
}

#[cfg(feature = "smt")]
impl Backend for Z3Backend {
    type Session<'a> = Z3Session<'a> where Self: 'a;

    fn open(&self, depth: usize, extractor: Extractor) -> Result<Z3Session<'_>> {
        if depth == 0 {
            return Err(Error::config("chain depth must be at least 1"));
        }
        let ctx = &self.context;
        let solver = Solver::new(ctx);
        let constant = |value: u64| BV::from_u64(ctx, value, WIDTH);

        let multiplier = constant(MULTIPLIER);
        let addend = constant(ADDEND);
        let mask = constant(MASK);
        let shift = constant(u64::from(SHIFT));
        let seven = constant(LOW_SEVEN);

        let seed = BV::new_const(ctx, "seed", WIDTH);
        let mut state = BV::new_const(ctx, "state0", WIDTH);
        solver.assert(&state._eq(&seed.bvxor(&multiplier).bvand(&mask)));

        let mut characters = Vec::with_capacity(depth);
        for i in 1..=depth {
            let next = BV::new_const(ctx, format!("state{}", i), WIDTH);
            solver.assert(&next._eq(&state.bvmul(&multiplier).bvadd(&addend).bvand(&mask)));

            let low = next.bvlshr(&shift).bvand(&seven);
            let cased = match extractor.case() {
                CaseMode::Upper => low.bvand(&constant(u64::from(!CASE_BIT))),
                CaseMode::Lower => low.bvor(&constant(u64::from(CASE_BIT))),
            };
            let character = BV::new_const(ctx, format!("ch{}", i), WIDTH);
            solver.assert(&character._eq(&cased));

            characters.push(character);
            state = next;
        }
        debug!(depth, "declared z3 chain");

        Ok(Z3Session {
            context: ctx,
            solver,
            seed,
            characters,
            witness: None,
        })
    }

    fn name(&self) -> &'static str {
        "z3"
    }
}

#[cfg(feature = "smt")]
impl<'ctx> Session for Z3Session<'ctx> {
    fn depth(&self) -> usize {
        self.characters.len()
    }

    fn pin(&mut self, index: usize, code: u8) -> Result<()> {
        super::check_index(index, self.characters.len())?;
        let code = BV::from_u64(self.context, u64::from(code), WIDTH);
        self.solver.assert(&self.characters[index]._eq(&code));
        Ok(())
    }

    fn check(&mut self) -> Result<Verdict> {
        self.witness = None;
        match self.solver.check() {
            SatResult::Sat => {
                let model = self.solver.get_model().ok_or_else(|| {
                    Error::solver("solver returned SAT but no model available")
                })?;
                let seed = model
                    .eval(&self.seed, true)
                    .ok_or_else(|| Error::solver("could not evaluate seed from model"))?
                    .as_u64()
                    .ok_or_else(|| Error::solver("could not convert seed to u64"))?;
                self.witness = Some(seed & MASK);
                Ok(Verdict::Sat)
            }
            SatResult::Unsat => Ok(Verdict::Unsat),
            SatResult::Unknown => {
                let reason = self
                    .solver
                    .get_reason_unknown()
                    .unwrap_or_else(|| "no reason given".to_string());
                Err(Error::solver(format!("solver returned unknown ({})", reason)))
            }
        }
    }

    fn witness_seed(&self) -> Result<u64> {
        self.witness
            .ok_or_else(|| Error::solver("no model available: last check was not SAT"))
    }
}

/// Stand-in when the crate is built without Z3. It cannot be constructed.
#[cfg(not(feature = "smt"))]
pub enum Z3Backend {}

#[cfg(not(feature = "smt"))]
pub enum Z3Session {}

#[cfg(not(feature = "smt"))]
impl Z3Backend {
    pub fn new(_timeout_ms: Option<u64>) -> Result<Self> {
        Err(Error::config("SMT feature not enabled. Rebuild with --features smt"))
    }
}

#[cfg(not(feature = "smt"))]
impl Backend for Z3Backend {
    type Session<'a> = Z3Session;

    fn open(&self, _depth: usize, _extractor: Extractor) -> Result<Z3Session> {
        match *self {}
    }

    fn name(&self) -> &'static str {
        match *self {}
    }
}

#[cfg(not(feature = "smt"))]
impl Session for Z3Session {
    fn depth(&self) -> usize {
        match *self {}
    }

    fn pin(&mut self, _index: usize, _code: u8) -> Result<()> {
        match *self {}
    }

    fn check(&mut self) -> Result<Verdict> {
        match *self {}
    }

    fn witness_seed(&self) -> Result<u64> {
        match *self {}
    }
}
