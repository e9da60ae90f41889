use varisat::Lit;

use crate::solver::expr::{any_of, BoolExpr, IntExpr};
use crate::solver::Session;

/// Identity of a proof atom within its session.
pub type AtomId = usize;

/// A boolean decision variable.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct BoolVar(pub(crate) Lit);

impl BoolVar {
    /// This variable as an expression.
    pub fn expr(&self) -> BoolExpr {
        BoolExpr::Lit(self.0)
    }

    /// The value assigned by the last successful solve.
    pub fn value(&self, session: &Session) -> bool {
        session.lit_value(self.0)
    }

    /// "This variable equals the value it holds in the last model", for
    /// blocking constraints.
    pub fn observed(&self, session: &Session) -> BoolExpr {
        match self.value(session) {
            true => self.expr(),
            false => !self.expr(),
        }
    }
}

/// A bounded integer decision variable in binary encoding.
///
/// The bit vector holds the value directly (no offset); construction
/// constrains it into `lo..=hi`.
#[derive(Clone, Debug)]
pub struct IntVar {
    pub(crate) bits: Vec<Lit>,
    pub(crate) lo: i64,
    pub(crate) hi: i64,
}

impl IntVar {
    /// The inclusive lower bound.
    pub fn lo(&self) -> i64 {
        self.lo
    }

    /// The inclusive upper bound.
    pub fn hi(&self) -> i64 {
        self.hi
    }

    /// This variable as an expression.
    pub fn expr(&self) -> IntExpr {
        IntExpr::Var(self.clone())
    }

    /// The value assigned by the last successful solve.
    pub fn value(&self, session: &Session) -> i64 {
        self.bits
            .iter()
            .enumerate()
            .map(|(i, lit)| (session.lit_value(*lit) as i64) << i)
            .sum()
    }

    /// "This variable equals the value it holds in the last model", for
    /// blocking constraints.
    pub fn observed(&self, session: &Session) -> BoolExpr {
        self.expr().eq(self.value(session))
    }
}

/// A finite-domain symbol variable as a one-hot literal vector.
///
/// Exactly one of the literals is true in every model; the index of the
/// true literal is the symbol value. Encoders map their own alphabets onto
/// the index space.
#[derive(Clone, Debug)]
pub struct SymVar {
    pub(crate) lits: Vec<Lit>,
}

impl SymVar {
    /// Size of the symbol domain.
    pub fn domain_size(&self) -> usize {
        self.lits.len()
    }

    /// "This variable holds symbol `index`."
    pub fn is(&self, index: usize) -> BoolExpr {
        BoolExpr::Lit(self.lits[index])
    }

    /// "This variable holds one of `indices`."
    pub fn is_in(&self, indices: impl IntoIterator<Item = usize>) -> BoolExpr {
        any_of(indices.into_iter().map(|i| self.is(i)))
    }

    /// "These two variables hold the same symbol." Panics if the domains
    /// differ in size.
    pub fn eq(&self, other: &SymVar) -> BoolExpr {
        assert_eq!(self.lits.len(), other.lits.len());
        any_of((0..self.lits.len()).map(|i| self.is(i) & other.is(i)))
    }

    /// The symbol index assigned by the last successful solve.
    pub fn value(&self, session: &Session) -> usize {
        self.lits
            .iter()
            .position(|lit| session.lit_value(*lit))
            .unwrap_or_else(|| unreachable!("one-hot invariant"))
    }

    /// "This variable equals the value it holds in the last model", for
    /// blocking constraints.
    pub fn observed(&self, session: &Session) -> BoolExpr {
        self.is(self.value(session))
    }
}

/// A monotone proof witness.
///
/// An atom becomes provably true once any justification registered via
/// [`Session::prove_if`](crate::solver::Session::prove_if) holds; it is
/// never provably false, only "not yet proven". Requiring
/// [`Atom::proven`] in a hard constraint therefore forces at least one
/// justification to hold in every model. Justifications accumulate and
/// are never retracted.
#[derive(Clone, Copy, Debug)]
pub struct Atom(pub(crate) AtomId);

impl Atom {
    /// "This atom is proven."
    pub fn proven(&self) -> BoolExpr {
        BoolExpr::Proven(self.0)
    }

    /// Whether the atom is proven in the last model.
    pub fn value(&self, session: &Session) -> bool {
        session.atom_value(self.0)
    }
}

/// The closed variant over the cell-variable kinds an encoder can layer
/// constraints on.
///
/// Shading and region encoders accept grids of any of these; the shared
/// algebra is value equality against the `i64` symbol space (booleans as
/// 0/1, symbol variables as their domain index).
#[derive(Clone, Debug)]
pub enum CellVar {
    /// A boolean cell; values 0 and 1.
    Bool(BoolVar),
    /// A bounded integer cell.
    Int(IntVar),
    /// A finite-domain symbol cell; values are domain indices.
    Sym(SymVar),
}

impl CellVar {
    /// "This cell holds `value`."
    pub fn eq_value(&self, value: i64) -> BoolExpr {
        match self {
            CellVar::Bool(v) => {
                if value != 0 {
                    v.expr()
                } else {
                    !v.expr()
                }
            }
            CellVar::Int(v) => v.expr().eq(value),
            CellVar::Sym(v) => {
                if (0..v.domain_size() as i64).contains(&value) {
                    v.is(value as usize)
                } else {
                    BoolExpr::Const(false)
                }
            }
        }
    }

    /// "This cell holds one of `values`."
    pub fn in_values<'a>(&self, values: impl IntoIterator<Item = &'a i64>) -> BoolExpr {
        any_of(values.into_iter().map(|v| self.eq_value(*v)))
    }

    /// The value assigned by the last successful solve.
    pub fn value(&self, session: &Session) -> i64 {
        match self {
            CellVar::Bool(v) => v.value(session) as i64,
            CellVar::Int(v) => v.value(session),
            CellVar::Sym(v) => v.value(session) as i64,
        }
    }

    /// "This cell equals the value it holds in the last model", for
    /// blocking constraints.
    pub fn observed(&self, session: &Session) -> BoolExpr {
        match self {
            CellVar::Bool(v) => v.observed(session),
            CellVar::Int(v) => v.observed(session),
            CellVar::Sym(v) => v.observed(session),
        }
    }
}

impl From<BoolVar> for CellVar {
    fn from(value: BoolVar) -> Self {
        CellVar::Bool(value)
    }
}

impl From<IntVar> for CellVar {
    fn from(value: IntVar) -> Self {
        CellVar::Int(value)
    }
}

impl From<SymVar> for CellVar {
    fn from(value: SymVar) -> Self {
        CellVar::Sym(value)
    }
}
