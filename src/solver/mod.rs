//! The constraint-engine session the encoders build against.
//!
//! One [`Session`] owns every variable and constraint of a single puzzle
//! attempt. Constraints accumulate monotonically as CNF clauses; boolean
//! expressions are lowered by Tseitin transformation, bounded integers by
//! ripple-carry adder and comparator circuits, and monotone proof atoms by
//! level-guarded justification clauses. [`Session::solve`] hands the
//! accumulated clauses to [`varisat`] and stores the model for value
//! readback on every variable.

use std::convert::identity;

use itertools::Itertools;
use tracing::debug;
use varisat::{CnfFormula, Lit, Solver, Var};

pub use expr::{all_of, any_of, BoolExpr, IntExpr};
pub use vars::{Atom, AtomId, BoolVar, CellVar, IntVar, SymVar};

use crate::solver::logic::{bit_width, exactly_one};

mod expr;
mod logic;
mod vars;

struct AtomState {
    proven: Lit,
    level: Vec<Lit>,
    justifications: Vec<BoolExpr>,
}

/// One puzzle attempt's worth of variables, constraints and model.
pub struct Session {
    num_vars: usize,
    clauses: Vec<Vec<Lit>>,
    true_lit: Lit,
    atoms: Vec<AtomState>,
    atoms_finalized: bool,
    model: Vec<bool>,
    int_bound: i64,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    /// A fresh session with no variables or constraints.
    pub fn new() -> Self {
        let mut session = Self {
            num_vars: 0,
            clauses: Vec::new(),
            true_lit: Lit::from_var(Var::from_index(0), true),
            atoms: Vec::new(),
            atoms_finalized: false,
            model: Vec::new(),
            int_bound: 128,
        };
        session.true_lit = session.fresh_lit();
        session.clauses.push(vec![session.true_lit]);
        session
    }

    /// Discard all variables and constraints, yielding a fresh session in
    /// place.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Hint for the default upper bound of integer variables created
    /// without an explicit range (typically the cell count of the puzzle).
    pub fn set_int_bound(&mut self, bound: i64) {
        assert!(bound >= 0);
        self.int_bound = bound;
    }

    fn fresh_lit(&mut self) -> Lit {
        let lit = Var::from_index(self.num_vars).positive();
        self.num_vars += 1;
        lit
    }

    fn false_lit(&self) -> Lit {
        !self.true_lit
    }

    /// A fresh boolean variable.
    pub fn bool_var(&mut self) -> BoolVar {
        BoolVar(self.fresh_lit())
    }

    /// A fresh integer variable constrained into `lo..=hi`.
    pub fn int_var(&mut self, lo: i64, hi: i64) -> IntVar {
        assert!(0 <= lo && lo <= hi, "empty or negative integer domain");
        let bits = (0..bit_width(hi)).map(|_| self.fresh_lit()).collect();
        let var = IntVar { bits, lo, hi };
        // width is at most 63, so the encodable maximum fits an i64
        let encodable_max = ((1u64 << var.bits.len()) - 1) as i64;
        if encodable_max > hi {
            let le = var.expr().le(hi);
            self.require(le);
        }
        if lo > 0 {
            let ge = var.expr().ge(lo);
            self.require(ge);
        }
        var
    }

    /// A fresh integer variable over `0..=bound` where `bound` is the
    /// session's integer-domain hint.
    pub fn int_var_default(&mut self) -> IntVar {
        self.int_var(0, self.int_bound)
    }

    /// A fresh one-hot symbol variable over a domain of `size` symbols.
    pub fn sym_var(&mut self, size: usize) -> SymVar {
        assert!(size > 0, "empty symbol domain");
        let lits: Vec<Lit> = (0..size).map(|_| self.fresh_lit()).collect();
        self.clauses.extend(exactly_one(lits.clone()));
        SymVar { lits }
    }

    /// A fresh proof atom with no justifications.
    pub fn atom(&mut self) -> Atom {
        let proven = self.fresh_lit();
        self.atoms.push(AtomState { proven, level: Vec::new(), justifications: Vec::new() });
        Atom(self.atoms.len() - 1)
    }

    /// Register one more justification for `atom`: the atom may be proven
    /// whenever `condition` holds.
    ///
    /// Justifications only accumulate; there is no way to retract one.
    /// Atom references inside `condition` are guarded by proof levels at
    /// solve time, so an atom can never (transitively) justify itself.
    ///
    /// # Panics
    ///
    /// Panics if called after the session has solved once; justification
    /// wiring is fixed at the first solve.
    pub fn prove_if(&mut self, atom: Atom, condition: BoolExpr) {
        assert!(
            !self.atoms_finalized,
            "prove_if after the first solve; build all proofs before solving"
        );
        self.atoms[atom.0].justifications.push(condition);
    }

    /// Add a hard constraint.
    pub fn require(&mut self, expr: BoolExpr) {
        let lit = self.lower(&expr, None);
        self.clauses.push(vec![lit]);
    }

    /// An expression true iff at least `k` of `exprs` hold.
    pub fn at_least(&mut self, k: usize, exprs: &[BoolExpr]) -> BoolExpr {
        if k == 0 {
            return BoolExpr::Const(true);
        }
        if k > exprs.len() {
            return BoolExpr::Const(false);
        }
        let register = self.count_register(exprs, k);
        BoolExpr::Lit(register[k - 1])
    }

    /// An expression true iff at most `k` of `exprs` hold.
    pub fn at_most(&mut self, k: usize, exprs: &[BoolExpr]) -> BoolExpr {
        if k >= exprs.len() {
            return BoolExpr::Const(true);
        }
        let register = self.count_register(exprs, k + 1);
        !BoolExpr::Lit(register[k])
    }

    /// An expression true iff exactly `k` of `exprs` hold.
    pub fn exactly(&mut self, k: usize, exprs: &[BoolExpr]) -> BoolExpr {
        if k > exprs.len() {
            return BoolExpr::Const(false);
        }
        let register = self.count_register(exprs, k + 1);
        let lower_bound = match k {
            0 => BoolExpr::Const(true),
            _ => BoolExpr::Lit(register[k - 1]),
        };
        lower_bound & !BoolExpr::Lit(register[k])
    }

    /// Require that all of `vars` take pairwise distinct values.
    pub fn all_different(&mut self, vars: &[IntVar]) {
        for (a, b) in vars.iter().tuple_combinations() {
            let distinct = a.expr().ne(b.expr());
            self.require(distinct);
        }
    }

    /// Sequential counter: `register[j]` is true iff at least `j + 1` of
    /// `exprs` hold, saturating at `width`.
    fn count_register(&mut self, exprs: &[BoolExpr], width: usize) -> Vec<Lit> {
        let xs: Vec<Lit> = exprs.iter().map(|e| self.lower(e, None)).collect();
        let mut register = vec![self.false_lit(); width];
        for x in xs {
            for j in (1..width).rev() {
                let step =
                    BoolExpr::Lit(register[j]) | (BoolExpr::Lit(x) & BoolExpr::Lit(register[j - 1]));
                register[j] = self.lower(&step, None);
            }
            let step = BoolExpr::Lit(register[0]) | BoolExpr::Lit(x);
            register[0] = self.lower(&step, None);
        }
        register
    }

    /// Tseitin-lower `expr` to a single literal, adding defining clauses.
    ///
    /// `guard` carries the proof level of the atom currently being
    /// justified; atom references lower to "proven at a strictly smaller
    /// level" while it is set.
    fn lower(&mut self, expr: &BoolExpr, guard: Option<&[Lit]>) -> Lit {
        match expr {
            BoolExpr::Const(b) => match b {
                true => self.true_lit,
                false => self.false_lit(),
            },
            BoolExpr::Lit(lit) => *lit,
            BoolExpr::Not(inner) => !self.lower(inner, guard),
            BoolExpr::And(children) => {
                if children.is_empty() {
                    return self.true_lit;
                }
                let lits: Vec<Lit> = children.iter().map(|c| self.lower(c, guard)).collect();
                let z = self.fresh_lit();
                let mut long_clause = Vec::with_capacity(lits.len() + 1);
                long_clause.push(z);
                for lit in lits {
                    self.clauses.push(vec![!z, lit]);
                    long_clause.push(!lit);
                }
                self.clauses.push(long_clause);
                z
            }
            BoolExpr::Or(children) => {
                if children.is_empty() {
                    return self.false_lit();
                }
                let lits: Vec<Lit> = children.iter().map(|c| self.lower(c, guard)).collect();
                let z = self.fresh_lit();
                let mut long_clause = Vec::with_capacity(lits.len() + 1);
                long_clause.push(!z);
                for lit in lits {
                    self.clauses.push(vec![z, !lit]);
                    long_clause.push(lit);
                }
                self.clauses.push(long_clause);
                z
            }
            BoolExpr::Iff(a, b) => {
                let a = self.lower(a, guard);
                let b = self.lower(b, guard);
                let z = self.fresh_lit();
                self.clauses.push(vec![!z, !a, b]);
                self.clauses.push(vec![!z, a, !b]);
                self.clauses.push(vec![z, a, b]);
                self.clauses.push(vec![z, !a, !b]);
                z
            }
            BoolExpr::IntEq(a, b) => {
                let a = self.int_bits(a, guard);
                let b = self.int_bits(b, guard);
                let width = a.len().max(b.len());
                let equal = all_of((0..width).map(|i| {
                    let ai = a.get(i).copied().unwrap_or(self.false_lit());
                    let bi = b.get(i).copied().unwrap_or(self.false_lit());
                    BoolExpr::Lit(ai).iff(BoolExpr::Lit(bi))
                }));
                self.lower(&equal, None)
            }
            BoolExpr::IntLt(a, b) => {
                let a = self.int_bits(a, guard);
                let b = self.int_bits(b, guard);
                let less = self.lt_bits(&a, &b);
                self.lower(&less, None)
            }
            BoolExpr::Proven(id) => match guard {
                None => self.atoms[*id].proven,
                Some(target_level) => {
                    let proven = self.atoms[*id].proven;
                    let level = self.atoms[*id].level.clone();
                    let below = self.lt_bits(&level, target_level);
                    let guarded = BoolExpr::Lit(proven) & below;
                    self.lower(&guarded, None)
                }
            },
        }
    }

    /// Unsigned comparison circuit over bit vectors (LSB first).
    fn lt_bits(&self, a: &[Lit], b: &[Lit]) -> BoolExpr {
        let width = a.len().max(b.len());
        let bit = |bits: &[Lit], i: usize| bits.get(i).copied().unwrap_or(self.false_lit());
        any_of((0..width).map(|i| {
            let here = !BoolExpr::Lit(bit(a, i)) & BoolExpr::Lit(bit(b, i));
            let above = all_of(
                (i + 1..width)
                    .map(|j| BoolExpr::Lit(bit(a, j)).iff(BoolExpr::Lit(bit(b, j)))),
            );
            here & above
        }))
    }

    /// Lower an integer expression to a bit vector (LSB first).
    fn int_bits(&mut self, expr: &IntExpr, guard: Option<&[Lit]>) -> Vec<Lit> {
        match expr {
            IntExpr::Const(c) => {
                assert!(*c >= 0, "negative integer constant");
                (0..bit_width(*c))
                    .map(|i| match (c >> i) & 1 {
                        1 => self.true_lit,
                        _ => self.false_lit(),
                    })
                    .collect()
            }
            IntExpr::Var(v) => v.bits.clone(),
            IntExpr::Add(terms) => {
                let mut acc = vec![self.false_lit()];
                for term in terms {
                    let bits = self.int_bits(term, guard);
                    acc = self.ripple_add(&acc, &bits);
                }
                acc
            }
            IntExpr::Cond(cond, then, otherwise) => {
                let cond = self.lower(cond, guard);
                let then = self.int_bits(then, guard);
                let otherwise = self.int_bits(otherwise, guard);
                let width = then.len().max(otherwise.len());
                (0..width)
                    .map(|i| {
                        let t = then.get(i).copied().unwrap_or(self.false_lit());
                        let f = otherwise.get(i).copied().unwrap_or(self.false_lit());
                        let mux = (BoolExpr::Lit(cond) & BoolExpr::Lit(t))
                            | (!BoolExpr::Lit(cond) & BoolExpr::Lit(f));
                        self.lower(&mux, None)
                    })
                    .collect()
            }
        }
    }

    /// Ripple-carry addition of two bit vectors.
    fn ripple_add(&mut self, a: &[Lit], b: &[Lit]) -> Vec<Lit> {
        let width = a.len().max(b.len());
        let mut out = Vec::with_capacity(width + 1);
        let mut carry = self.false_lit();
        for i in 0..width {
            let ai = a.get(i).copied().unwrap_or(self.false_lit());
            let bi = b.get(i).copied().unwrap_or(self.false_lit());
            let sum = BoolExpr::Lit(ai)
                .ne(BoolExpr::Lit(bi))
                .ne(BoolExpr::Lit(carry));
            out.push(self.lower(&sum, None));
            let carry_out = (BoolExpr::Lit(ai) & BoolExpr::Lit(bi))
                | (BoolExpr::Lit(ai) & BoolExpr::Lit(carry))
                | (BoolExpr::Lit(bi) & BoolExpr::Lit(carry));
            carry = self.lower(&carry_out, None);
        }
        out.push(carry);
        out
    }

    /// Wire every atom's accumulated justifications into the clause store.
    ///
    /// Each atom gets a level bit-vector; a justification supports its atom
    /// only in models where every atom referenced inside it sits at a
    /// strictly smaller level, which makes circular "proofs" unsatisfiable.
    fn finalize_atoms(&mut self) {
        if self.atoms_finalized {
            return;
        }
        self.atoms_finalized = true;
        if self.atoms.is_empty() {
            return;
        }

        let width = bit_width(self.atoms.len() as i64 - 1);
        for i in 0..self.atoms.len() {
            self.atoms[i].level = (0..width).map(|_| self.fresh_lit()).collect();
        }

        for i in 0..self.atoms.len() {
            let target_level = self.atoms[i].level.clone();
            let proven = self.atoms[i].proven;
            let justifications = self.atoms[i].justifications.clone();

            let mut support_clause = Vec::with_capacity(justifications.len() + 1);
            support_clause.push(!proven);
            for justification in &justifications {
                support_clause.push(self.lower(justification, Some(&target_level)));
            }
            self.clauses.push(support_clause);
        }
    }

    /// Solve the accumulated constraints, storing the model on success.
    ///
    /// UNSAT is an ordinary `false` return; every variable's `value` is
    /// readable after a `true` return.
    pub fn solve(&mut self) -> bool {
        self.finalize_atoms();

        let mut solver = Solver::new();
        solver.add_formula(&CnfFormula::from(self.clauses.clone()));
        let sat = solver.solve().is_ok_and(identity);
        debug!(
            vars = self.num_vars,
            clauses = self.clauses.len(),
            atoms = self.atoms.len(),
            sat,
            "solve finished"
        );

        if sat {
            self.model = vec![false; self.num_vars];
            for lit in solver.model().unwrap() {
                if lit.var().index() < self.num_vars {
                    self.model[lit.var().index()] = lit.is_positive();
                }
            }
        }
        sat
    }

    pub(crate) fn lit_value(&self, lit: Lit) -> bool {
        self.model.get(lit.var().index()).copied().unwrap_or(false) ^ lit.is_negative()
    }

    pub(crate) fn atom_value(&self, id: AtomId) -> bool {
        self.lit_value(self.atoms[id].proven)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bool_basics() {
        let mut session = Session::new();
        let a = session.bool_var();
        let b = session.bool_var();
        session.require(a.expr() & !b.expr());
        assert!(session.solve());
        assert!(a.value(&session));
        assert!(!b.value(&session));
    }

    #[test]
    fn contradiction_is_unsat() {
        let mut session = Session::new();
        let a = session.bool_var();
        session.require(a.expr());
        session.require(!a.expr());
        assert!(!session.solve());
    }

    #[test]
    fn iff_and_implies() {
        let mut session = Session::new();
        let a = session.bool_var();
        let b = session.bool_var();
        session.require(a.expr().iff(b.expr()));
        session.require(a.expr());
        assert!(session.solve());
        assert!(b.value(&session));
    }

    #[test]
    fn int_bounds_hold() {
        let mut session = Session::new();
        let x = session.int_var(2, 5);
        assert!(session.solve());
        let v = x.value(&session);
        assert!((2..=5).contains(&v));
    }

    #[test]
    fn full_width_domain_is_accepted() {
        let mut session = Session::new();
        let x = session.int_var(0, i64::MAX);
        assert!(session.solve());
        assert!(x.value(&session) >= 0);
    }

    #[test]
    fn int_sum_and_cond() {
        let mut session = Session::new();
        let x = session.int_var(0, 7);
        let y = session.int_var(0, 7);
        let eq = (x.expr() + &y).eq(9);
        session.require(eq);
        let gt = x.expr().gt(y.expr());
        session.require(gt);
        assert!(session.solve());
        assert_eq!(x.value(&session) + y.value(&session), 9);
        assert!(x.value(&session) > y.value(&session));

        let flag = session.bool_var();
        let pick = IntExpr::cond(flag.expr(), x.expr(), y.expr());
        session.require(pick.eq(2));
        assert!(session.solve());
        let picked = match flag.value(&session) {
            true => x.value(&session),
            false => y.value(&session),
        };
        assert_eq!(picked, 2);
    }

    #[test]
    fn cardinality_window() {
        let mut session = Session::new();
        let vars: Vec<BoolVar> = (0..5).map(|_| session.bool_var()).collect();
        let exprs: Vec<BoolExpr> = vars.iter().map(|v| v.expr()).collect();
        let lo = session.at_least(2, &exprs);
        session.require(lo);
        let hi = session.at_most(3, &exprs);
        session.require(hi);
        assert!(session.solve());
        let count = vars.iter().filter(|v| v.value(&session)).count();
        assert!((2..=3).contains(&count));
    }

    #[test]
    fn exactly_pins_count() {
        let mut session = Session::new();
        let vars: Vec<BoolVar> = (0..4).map(|_| session.bool_var()).collect();
        let exprs: Vec<BoolExpr> = vars.iter().map(|v| v.expr()).collect();
        let exact = session.exactly(1, &exprs);
        session.require(exact);
        assert!(session.solve());
        assert_eq!(vars.iter().filter(|v| v.value(&session)).count(), 1);
    }

    #[test]
    fn all_different_small_domain() {
        let mut session = Session::new();
        let vars: Vec<IntVar> = (0..3).map(|_| session.int_var(0, 2)).collect();
        session.all_different(&vars);
        assert!(session.solve());
        let values: std::collections::HashSet<i64> =
            vars.iter().map(|v| v.value(&session)).collect();
        assert_eq!(values.len(), 3);
    }

    #[test]
    fn sym_var_is_one_hot() {
        let mut session = Session::new();
        let s = session.sym_var(4);
        session.require(s.is_in([1, 2]));
        let not_two = !s.is(2);
        session.require(not_two);
        assert!(session.solve());
        assert_eq!(s.value(&session), 1);
    }

    #[test]
    fn atom_without_justification_cannot_be_required() {
        let mut session = Session::new();
        let atom = session.atom();
        session.require(atom.proven());
        assert!(!session.solve());
    }

    #[test]
    fn atom_chain_forces_seed() {
        let mut session = Session::new();
        let seed = session.bool_var();
        let a = session.atom();
        let b = session.atom();
        let c = session.atom();
        session.prove_if(a, seed.expr());
        session.prove_if(b, a.proven());
        session.prove_if(c, b.proven());
        session.require(c.proven());
        assert!(session.solve());
        assert!(seed.value(&session));
        assert!(a.value(&session) && b.value(&session) && c.value(&session));
    }

    #[test]
    fn circular_proof_is_rejected() {
        let mut session = Session::new();
        let a = session.atom();
        let b = session.atom();
        // each justified only by the other; neither can be grounded
        session.prove_if(a, b.proven());
        session.prove_if(b, a.proven());
        session.require(a.proven());
        assert!(!session.solve());
    }

    #[test]
    fn reused_session_keeps_blocking_constraints() {
        let mut session = Session::new();
        let x = session.int_var(0, 3);
        assert!(session.solve());
        let mut seen = vec![x.value(&session)];
        loop {
            let observed = x.observed(&session);
            session.require(!observed);
            if !session.solve() {
                break;
            }
            seen.push(x.value(&session));
        }
        seen.sort_unstable();
        assert_eq!(seen, vec![0, 1, 2, 3]);
    }
}
