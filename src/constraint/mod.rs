//! The seed/state/character chain as a constraint system.
//!
//! A [`Backend`] declares, for an unroll depth `D`, one unknown seed, the
//! states `state0..=stateD` linked by `scramble` and `advance`, and the
//! characters `ch1..=chD` linked to their states by the [`Extractor`].
//! The returned [`Session`] then accepts incremental character pins and
//! satisfiability queries against that one declaration.

pub mod enumerate;
pub mod smt;

pub use enumerate::EnumerationBackend;
pub use smt::Z3Backend;

use crate::error::Result;
use crate::extract::Extractor;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Sat,
    Unsat,
}

/// One scoped assertion stack over a declared chain.
pub trait Session {
    /// Number of characters the chain exposes.
    fn depth(&self) -> usize;

    /// Asserts `ch[index] == code`. Pins are never retracted.
    fn pin(&mut self, index: usize, code: u8) -> Result<()>;

    /// Decides the conjunction of everything pinned so far. A solver that
    /// cannot decide must return `Error::Solver`.
    fn check(&mut self) -> Result<Verdict>;

    /// Seed witnessing the most recent `Sat` verdict, reduced to 48 bits.
    fn witness_seed(&self) -> Result<u64>;
}

pub trait Backend {
    type Session<'a>: Session
    where
        Self: 'a;

    /// Declares a fresh chain of `depth` characters.
    fn open(&self, depth: usize, extractor: Extractor) -> Result<Self::Session<'_>>;

    fn name(&self) -> &'static str;
}

/// Bounds check shared by the backends.
pub(crate) fn check_index(index: usize, depth: usize) -> Result<()> {
    if index < depth {
        Ok(())
    } else {
        Err(crate::error::Error::config(format!(
            "character index {} outside a chain of depth {}",
            index, depth
        )))
    }
}

/// Backend whose every query fails the way a solver out of resources does.
#[cfg(test)]
pub(crate) mod failing {
    use super::{check_index, Backend, Session, Verdict};
    use crate::error::{Error, Result};
    use crate::extract::Extractor;

    pub(crate) struct FailingBackend;

    pub(crate) struct FailingSession {
        depth: usize,
    }

    impl Backend for FailingBackend {
        type Session<'a> = FailingSession;

        fn open(&self, depth: usize, _extractor: Extractor) -> Result<FailingSession> {
            Ok(FailingSession { depth })
        }

        fn name(&self) -> &'static str {
            "failing"
        }
    }

    impl Session for FailingSession {
        fn depth(&self) -> usize {
            self.depth
        }

        fn pin(&mut self, index: usize, _code: u8) -> Result<()> {
            check_index(index, self.depth)
        }

        fn check(&mut self) -> Result<Verdict> {
            Err(Error::solver("resource exhaustion"))
        }

        fn witness_seed(&self) -> Result<u64> {
            Err(Error::solver("no model available"))
        }
    }
}
