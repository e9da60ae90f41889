//! Bounded enumeration of distinct solutions.

use tracing::{debug, warn};

use crate::solver::{all_of, BoolExpr, CellVar, Session};

/// How many solutions the convenience `solutions` methods collect before
/// giving up; puzzles with more than this many answers are considered
/// broken rather than worth enumerating exhaustively.
pub const MAX_SOLUTIONS: usize = 10;

/// Collect up to `max` distinct solutions.
///
/// After each successful solve, `extract` reads the model into a caller
/// shape and `block` produces the expression describing the model; its
/// negation is added as a hard constraint so the next solve must differ.
/// The blocking constraints persist in the session, so a later call
/// resumes the enumeration instead of restarting it.
pub fn enumerate<T>(
    session: &mut Session,
    mut extract: impl FnMut(&Session) -> T,
    mut block: impl FnMut(&Session) -> BoolExpr,
    max: usize,
) -> Vec<T> {
    let mut found = Vec::new();
    while found.len() < max {
        if !session.solve() {
            debug!(solutions = found.len(), "enumeration exhausted");
            return found;
        }
        found.push(extract(session));
        let seen = block(session);
        session.require(!seen);
    }
    warn!(max, "stopped enumerating at the solution cap");
    found
}

/// The blocking expression for a set of cell variables: all of them hold
/// the value they have in the current model.
pub(crate) fn observed_all<'a>(
    session: &Session,
    cells: impl IntoIterator<Item = &'a CellVar>,
) -> BoolExpr {
    all_of(cells.into_iter().map(|cell| cell.observed(session)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enumerates_all_assignments_of_two_bools() {
        let mut session = Session::new();
        let a = session.bool_var();
        let b = session.bool_var();
        let mut seen = enumerate(
            &mut session,
            |s| (a.value(s), b.value(s)),
            |s| a.observed(s) & b.observed(s),
            MAX_SOLUTIONS,
        );
        seen.sort_unstable();
        assert_eq!(
            seen,
            vec![(false, false), (false, true), (true, false), (true, true)]
        );
    }

    #[test]
    fn cap_truncates_enumeration() {
        let mut session = Session::new();
        let x = session.int_var(0, 15);
        let found = enumerate(&mut session, |s| x.value(s), |s| x.observed(s), 3);
        assert_eq!(found.len(), 3);
        assert_eq!(
            found.iter().collect::<std::collections::HashSet<_>>().len(),
            3
        );
    }

    #[test]
    fn enumeration_is_resumable() {
        let mut session = Session::new();
        let x = session.int_var(0, 3);
        let first = enumerate(&mut session, |s| x.value(s), |s| x.observed(s), 2);
        let rest = enumerate(&mut session, |s| x.value(s), |s| x.observed(s), MAX_SOLUTIONS);
        assert_eq!(first.len() + rest.len(), 4);
        let mut all: Vec<i64> = first.into_iter().chain(rest).collect();
        all.sort_unstable();
        assert_eq!(all, vec![0, 1, 2, 3]);
    }
}
