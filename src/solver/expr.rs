use std::ops::{Add, BitAnd, BitOr, Not};

use varisat::Lit;

use crate::solver::vars::{AtomId, IntVar};

/// A boolean formula over session variables.
///
/// Built structurally by the encoders and lowered to CNF by
/// [`Session::require`](crate::solver::Session::require) via Tseitin
/// transformation. `&`, `|` and `!` compose expressions; integer
/// comparisons (see [`IntExpr`]) and proof-atom references embed as leaves.
#[derive(Clone, Debug)]
pub enum BoolExpr {
    /// A constant truth value.
    Const(bool),
    /// A single SAT literal.
    Lit(Lit),
    /// Negation.
    Not(Box<BoolExpr>),
    /// Conjunction; an empty list is true.
    And(Vec<BoolExpr>),
    /// Disjunction; an empty list is false.
    Or(Vec<BoolExpr>),
    /// Biconditional.
    Iff(Box<BoolExpr>, Box<BoolExpr>),
    /// Equality of two integer expressions.
    IntEq(Box<IntExpr>, Box<IntExpr>),
    /// Strict unsigned less-than of two integer expressions.
    IntLt(Box<IntExpr>, Box<IntExpr>),
    /// "This proof atom is proven." Inside a justification this lowers
    /// with a proof-level guard; inside an ordinary requirement it is the
    /// atom's proven flag.
    Proven(AtomId),
}

impl BoolExpr {
    /// `self` holds exactly when `other` does.
    pub fn iff(self, other: BoolExpr) -> BoolExpr {
        BoolExpr::Iff(Box::new(self), Box::new(other))
    }

    /// `self` and `other` differ.
    pub fn ne(self, other: BoolExpr) -> BoolExpr {
        !self.iff(other)
    }

    /// `self` implies `other`.
    pub fn implies(self, other: BoolExpr) -> BoolExpr {
        !self | other
    }
}

impl From<bool> for BoolExpr {
    fn from(value: bool) -> Self {
        BoolExpr::Const(value)
    }
}

impl BitAnd for BoolExpr {
    type Output = BoolExpr;

    fn bitand(self, rhs: Self) -> Self::Output {
        match (self, rhs) {
            (BoolExpr::And(mut lhs), BoolExpr::And(rhs)) => {
                lhs.extend(rhs);
                BoolExpr::And(lhs)
            }
            (BoolExpr::And(mut lhs), rhs) => {
                lhs.push(rhs);
                BoolExpr::And(lhs)
            }
            (lhs, BoolExpr::And(mut rhs)) => {
                rhs.insert(0, lhs);
                BoolExpr::And(rhs)
            }
            (lhs, rhs) => BoolExpr::And(vec![lhs, rhs]),
        }
    }
}

impl BitOr for BoolExpr {
    type Output = BoolExpr;

    fn bitor(self, rhs: Self) -> Self::Output {
        match (self, rhs) {
            (BoolExpr::Or(mut lhs), BoolExpr::Or(rhs)) => {
                lhs.extend(rhs);
                BoolExpr::Or(lhs)
            }
            (BoolExpr::Or(mut lhs), rhs) => {
                lhs.push(rhs);
                BoolExpr::Or(lhs)
            }
            (lhs, BoolExpr::Or(mut rhs)) => {
                rhs.insert(0, lhs);
                BoolExpr::Or(rhs)
            }
            (lhs, rhs) => BoolExpr::Or(vec![lhs, rhs]),
        }
    }
}

impl Not for BoolExpr {
    type Output = BoolExpr;

    fn not(self) -> Self::Output {
        match self {
            BoolExpr::Const(b) => BoolExpr::Const(!b),
            BoolExpr::Not(inner) => *inner,
            other => BoolExpr::Not(Box::new(other)),
        }
    }
}

/// Conjunction of an iterator of expressions.
pub fn all_of(exprs: impl IntoIterator<Item = BoolExpr>) -> BoolExpr {
    BoolExpr::And(exprs.into_iter().collect())
}

/// Disjunction of an iterator of expressions.
pub fn any_of(exprs: impl IntoIterator<Item = BoolExpr>) -> BoolExpr {
    BoolExpr::Or(exprs.into_iter().collect())
}

/// A non-negative bounded integer formula over session variables.
///
/// Sums and conditionals stay symbolic until a comparison embeds them in a
/// [`BoolExpr`], at which point the session lowers both sides to
/// ripple-carry adder and comparator circuits.
#[derive(Clone, Debug)]
pub enum IntExpr {
    /// A constant; must be non-negative.
    Const(i64),
    /// A bounded integer variable.
    Var(IntVar),
    /// Sum of the terms.
    Add(Vec<IntExpr>),
    /// `if cond { then } else { otherwise }`.
    Cond(Box<BoolExpr>, Box<IntExpr>, Box<IntExpr>),
}

impl IntExpr {
    /// `if cond { then } else { otherwise }` as an integer value.
    pub fn cond(
        cond: BoolExpr,
        then: impl Into<IntExpr>,
        otherwise: impl Into<IntExpr>,
    ) -> IntExpr {
        IntExpr::Cond(Box::new(cond), Box::new(then.into()), Box::new(otherwise.into()))
    }

    /// `self == other`.
    pub fn eq(self, other: impl Into<IntExpr>) -> BoolExpr {
        BoolExpr::IntEq(Box::new(self), Box::new(other.into()))
    }

    /// `self != other`.
    pub fn ne(self, other: impl Into<IntExpr>) -> BoolExpr {
        !self.eq(other)
    }

    /// `self < other`.
    pub fn lt(self, other: impl Into<IntExpr>) -> BoolExpr {
        BoolExpr::IntLt(Box::new(self), Box::new(other.into()))
    }

    /// `self <= other`.
    pub fn le(self, other: impl Into<IntExpr>) -> BoolExpr {
        !BoolExpr::IntLt(Box::new(other.into()), Box::new(self))
    }

    /// `self > other`.
    pub fn gt(self, other: impl Into<IntExpr>) -> BoolExpr {
        BoolExpr::IntLt(Box::new(other.into()), Box::new(self))
    }

    /// `self >= other`.
    pub fn ge(self, other: impl Into<IntExpr>) -> BoolExpr {
        !BoolExpr::IntLt(Box::new(self), Box::new(other.into()))
    }
}

impl From<i64> for IntExpr {
    fn from(value: i64) -> Self {
        IntExpr::Const(value)
    }
}

impl From<IntVar> for IntExpr {
    fn from(value: IntVar) -> Self {
        IntExpr::Var(value)
    }
}

impl From<&IntVar> for IntExpr {
    fn from(value: &IntVar) -> Self {
        IntExpr::Var(value.clone())
    }
}

impl<R: Into<IntExpr>> Add<R> for IntExpr {
    type Output = IntExpr;

    fn add(self, rhs: R) -> Self::Output {
        match self {
            IntExpr::Add(mut terms) => {
                terms.push(rhs.into());
                IntExpr::Add(terms)
            }
            lhs => IntExpr::Add(vec![lhs, rhs.into()]),
        }
    }
}
