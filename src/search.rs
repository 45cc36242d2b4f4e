//! Greedy search for the longest run of a message one seed can produce.

use tracing::debug;

use crate::constraint::{Backend, Session, Verdict};
use crate::error::{Error, Result};
use crate::extract::Extractor;

/// Characters matched from one offset, and the seed that produces them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Run {
    pub seed: Option<u64>,
    pub length: usize,
}

impl Run {
    pub const fn empty() -> Self {
        Run { seed: None, length: 0 }
    }
}

/// Pins `message[start..]` one character at a time against a fresh chain of
/// `max_depth` characters and stops at the first unsatisfiable pin.
///
/// A length of 0 means the character at `start` cannot be produced (or there
/// is nothing left to match). Solver failures are returned as errors.
pub fn find_run<B: Backend>(
    backend: &B,
    extractor: Extractor,
    message: &[u8],
    start: usize,
    max_depth: usize,
) -> Result<Run> {
    if max_depth == 0 {
        return Err(Error::config("max_depth must be at least 1"));
    }
    let remaining = message.get(start..).unwrap_or_default();
    if remaining.is_empty() {
        return Ok(Run::empty());
    }

    let mut session = backend.open(max_depth, extractor)?;
    let mut run = Run::empty();

    for (index, &code) in remaining.iter().take(session.depth()).enumerate() {
        session.pin(index, code)?;
        let verdict = session.check()?;
        debug!(start, index, code, ?verdict, backend = backend.name(), "pinned character");
        match verdict {
            Verdict::Sat => {
                run.seed = Some(session.witness_seed()?);
                run.length = index + 1;
            }
            Verdict::Unsat => break,
        }
    }
    Ok(run)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraint::EnumerationBackend;
    use crate::extract::CaseMode;
    use crate::segment::replay;

    const UPPER: Extractor = Extractor::new(CaseMode::Upper);

    #[test]
    fn empty_message_and_end_offset() {
        assert_eq!(find_run(&EnumerationBackend, UPPER, b"", 0, 4).unwrap(), Run::empty());
        assert_eq!(find_run(&EnumerationBackend, UPPER, b"AL", 2, 4).unwrap(), Run::empty());
        assert_eq!(find_run(&EnumerationBackend, UPPER, b"AL", 9, 4).unwrap(), Run::empty());
    }

    #[test]
    fn zero_depth_is_a_configuration_error() {
        assert!(matches!(
            find_run(&EnumerationBackend, UPPER, b"AL", 0, 0),
            Err(Error::Config { .. })
        ));
    }

    #[test]
    fn run_replays_to_the_message() {
        let message = b"ALEX";
        let run = find_run(&EnumerationBackend, UPPER, message, 0, 4).unwrap();
        assert!(run.length >= 2, "two characters are always reachable, got {}", run.length);
        let seed = run.seed.unwrap();
        assert_eq!(replay(seed, run.length, UPPER), &message[..run.length]);
    }

    #[test]
    fn run_is_capped_by_depth() {
        // Output of a real seed is always fully reachable.
        let message = replay(987654321, 6, UPPER);
        let run = find_run(&EnumerationBackend, UPPER, &message, 0, 3).unwrap();
        assert_eq!(run.length, 3);
        let run = find_run(&EnumerationBackend, UPPER, &message, 0, 6).unwrap();
        assert_eq!(run.length, 6);
        assert_eq!(replay(run.seed.unwrap(), 6, UPPER), message);
    }

    #[test]
    fn unmatchable_first_character_gives_empty_run() {
        let run = find_run(&EnumerationBackend, UPPER, b"A b", 1, 4).unwrap();
        assert_eq!(run, Run::empty());
    }

    #[test]
    fn run_stops_before_unmatchable_character() {
        let run = find_run(&EnumerationBackend, UPPER, b"Ab", 0, 4).unwrap();
        assert_eq!(run.length, 1);
        assert_eq!(replay(run.seed.unwrap(), 1, UPPER), b"A");
    }

    #[test]
    fn solver_failure_is_not_an_empty_run() {
        use crate::constraint::failing::FailingBackend;
        let result = find_run(&FailingBackend, UPPER, b"ALEX", 0, 4);
        match result {
            Err(Error::Solver { reason }) => assert_eq!(reason, "resource exhaustion"),
            other => panic!("expected solver failure, got {:?}", other),
        }
    }

    #[test]
    fn repeated_searches_agree() {
        let message = b"hello world";
        let lower = Extractor::new(CaseMode::Lower);
        let first = find_run(&EnumerationBackend, lower, message, 3, 4).unwrap();
        let second = find_run(&EnumerationBackend, lower, message, 3, 4).unwrap();
        assert_eq!(first, second);
    }
}
