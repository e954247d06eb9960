//! Fermionic operators as sums of weighted ladder-operator strings.

use std::error::Error;
use std::fmt;
use std::str::FromStr;

use anyhow::{self, ensure};
use indexmap::IndexMap;
use itertools::Itertools;
use num_complex::Complex;
use num_traits::Zero;
use serde::{Deserialize, Serialize};

use crate::integrals::DimensionError;
use crate::operators::OperatorAlgebra;

#[cfg(test)]
#[path = "fermionic_op_tests.rs"]
mod fermionic_op_tests;

type C128 = Complex<f64>;

// =================
// Enum definitions
// =================

/// An enumerated type for the action of a fermionic operator string on a single orbital.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FermionicAction {
    /// Variant for the identity, written `I`.
    Identity,

    /// Variant for the creation operator $`\hat{a}^{\dagger}`$, written `+`.
    Create,

    /// Variant for the annihilation operator $`\hat{a}`$, written `-`.
    Annihilate,

    /// Variant for the number operator $`\hat{a}^{\dagger}\hat{a}`$, written `N`.
    Number,

    /// Variant for the hole-number operator $`\hat{a}\hat{a}^{\dagger}`$, written `E`.
    Empty,
}

impl FermionicAction {
    /// Returns the symbol of this action.
    pub fn symbol(&self) -> char {
        match self {
            FermionicAction::Identity => 'I',
            FermionicAction::Create => '+',
            FermionicAction::Annihilate => '-',
            FermionicAction::Number => 'N',
            FermionicAction::Empty => 'E',
        }
    }

    /// Returns `true` if this action changes the number of particles by one, so that it
    /// anticommutes with other such actions on different orbitals.
    pub fn is_odd(&self) -> bool {
        matches!(self, FermionicAction::Create | FermionicAction::Annihilate)
    }

    /// Returns the Hermitian adjoint of this action.
    pub fn dagger(&self) -> Self {
        match self {
            FermionicAction::Create => FermionicAction::Annihilate,
            FermionicAction::Annihilate => FermionicAction::Create,
            other => *other,
        }
    }

    /// Returns the product `self · other` of two actions on the same orbital, or `None` if the
    /// product vanishes.
    pub fn product(&self, other: &Self) -> Option<Self> {
        use FermionicAction::*;
        match (self, other) {
            (Identity, x) | (x, Identity) => Some(*x),
            (Create, Annihilate) => Some(Number),
            (Create, Empty) => Some(Create),
            (Annihilate, Create) => Some(Empty),
            (Annihilate, Number) => Some(Annihilate),
            (Number, Create) => Some(Create),
            (Number, Number) => Some(Number),
            (Empty, Annihilate) => Some(Annihilate),
            (Empty, Empty) => Some(Empty),
            _ => None,
        }
    }
}

impl TryFrom<char> for FermionicAction {
    type Error = LabelParseError;

    fn try_from(symbol: char) -> Result<Self, Self::Error> {
        match symbol {
            'I' => Ok(FermionicAction::Identity),
            '+' => Ok(FermionicAction::Create),
            '-' => Ok(FermionicAction::Annihilate),
            'N' => Ok(FermionicAction::Number),
            'E' => Ok(FermionicAction::Empty),
            _ => Err(LabelParseError(format!("unknown fermionic action `{symbol}`"))),
        }
    }
}

impl fmt::Display for FermionicAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

// ==================
// Error definitions
// ==================

/// Error raised when a string cannot be parsed as a fermionic label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelParseError(pub String);

impl fmt::Display for LabelParseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Label parse error: {}.", self.0)
    }
}

impl Error for LabelParseError {}

// ==================
// Struct definitions
// ==================

/// A fixed-length string of single-orbital actions. Orbital $`0`$ is the leftmost symbol, and the
/// string denotes the ordered product of its actions from left to right.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct FermionicLabel(Vec<FermionicAction>);

impl FermionicLabel {
    /// Returns the all-identity label on `register_length` orbitals.
    pub fn identity(register_length: usize) -> Self {
        Self(vec![FermionicAction::Identity; register_length])
    }

    /// Returns the label with a single non-identity action.
    ///
    /// # Panics
    ///
    /// Panics if `index` is not smaller than `register_length`.
    pub fn single(action: FermionicAction, index: usize, register_length: usize) -> Self {
        let mut actions = vec![FermionicAction::Identity; register_length];
        actions[index] = action;
        Self(actions)
    }

    /// Returns the number of orbitals this label acts on.
    pub fn register_length(&self) -> usize {
        self.0.len()
    }

    /// Returns the single-orbital actions.
    pub fn actions(&self) -> &[FermionicAction] {
        &self.0
    }

    /// Returns the number of particle-number-changing actions in this label.
    pub fn num_odd(&self) -> usize {
        self.0.iter().filter(|action| action.is_odd()).count()
    }

    /// Composes two labels of the same length into `self · other`.
    ///
    /// Moving each odd action of `other` leftwards past the odd actions of `self` on
    /// higher-indexed orbitals contributes a factor of $`-1`$ per exchange.
    ///
    /// # Returns
    ///
    /// The composed label and its sign, or `None` if the product vanishes.
    pub fn compose(&self, other: &Self) -> Option<(Self, f64)> {
        let mut odd_after = 0;
        let mut sign = 1.0;
        let mut actions = vec![FermionicAction::Identity; self.0.len()];
        for (i, (left, right)) in self.0.iter().zip(other.0.iter()).enumerate().rev() {
            if right.is_odd() && odd_after % 2 == 1 {
                sign = -sign;
            }
            actions[i] = left.product(right)?;
            if left.is_odd() {
                odd_after += 1;
            }
        }
        Some((Self(actions), sign))
    }

    /// Returns the adjoint label together with the sign from restoring orbital order.
    pub fn dagger(&self) -> (Self, f64) {
        let num_odd = self.num_odd();
        let sign = if (num_odd * num_odd.saturating_sub(1) / 2) % 2 == 0 {
            1.0
        } else {
            -1.0
        };
        (
            Self(self.0.iter().map(FermionicAction::dagger).collect()),
            sign,
        )
    }
}

impl fmt::Display for FermionicLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.iter().map(FermionicAction::symbol).collect::<String>())
    }
}

impl FromStr for FermionicLabel {
    type Err = LabelParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.chars()
            .filter(|c| !c.is_whitespace())
            .map(FermionicAction::try_from)
            .collect::<Result<Vec<_>, _>>()
            .map(Self)
    }
}

impl From<FermionicLabel> for String {
    fn from(label: FermionicLabel) -> Self {
        label.to_string()
    }
}

impl TryFrom<String> for FermionicLabel {
    type Error = LabelParseError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// A fermionic operator: a sum of weighted fermionic labels on a fixed number of orbitals.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FermionicOp {
    register_length: usize,
    terms: Vec<(FermionicLabel, C128)>,
}

impl FermionicOp {
    /// Constructs an operator from weighted labels.
    ///
    /// # Errors
    ///
    /// Errors with [`DimensionError`] if the labels do not all have `register_length` orbitals.
    pub fn new(
        register_length: usize,
        terms: Vec<(FermionicLabel, C128)>,
    ) -> Result<Self, anyhow::Error> {
        if let Some((label, _)) = terms
            .iter()
            .find(|(label, _)| label.register_length() != register_length)
        {
            return Err(DimensionError(format!(
                "label `{label}` does not act on {register_length} orbitals"
            ))
            .into());
        }
        Ok(Self {
            register_length,
            terms,
        })
    }

    /// Constructs an operator from `(label, coefficient)` pairs, the register length being that of
    /// the first label.
    pub fn from_list<S: AsRef<str>>(list: &[(S, C128)]) -> Result<Self, anyhow::Error> {
        let terms = list
            .iter()
            .map(|(label, coeff)| -> Result<_, anyhow::Error> {
                Ok((label.as_ref().parse::<FermionicLabel>()?, *coeff))
            })
            .collect::<Result<Vec<_>, _>>()?;
        let register_length = terms
            .first()
            .map(|(label, _)| label.register_length())
            .unwrap_or(0);
        Self::new(register_length, terms)
    }

    /// Sums operators without simplification.
    ///
    /// # Errors
    ///
    /// Errors with [`DimensionError`] if any operator does not act on `register_length`
    /// orbitals.
    pub fn sum<I>(register_length: usize, ops: I) -> Result<Self, anyhow::Error>
    where
        I: IntoIterator<Item = FermionicOp>,
    {
        let mut terms = vec![];
        for op in ops {
            op.ensure_compatible(&Self::zero(register_length))?;
            terms.extend(op.terms);
        }
        Ok(Self {
            register_length,
            terms,
        })
    }

    /// Returns the empty sum on `register_length` orbitals.
    pub fn zero(register_length: usize) -> Self {
        Self {
            register_length,
            terms: vec![],
        }
    }

    /// Returns the identity operator on `register_length` orbitals.
    pub fn identity(register_length: usize) -> Self {
        Self {
            register_length,
            terms: vec![(FermionicLabel::identity(register_length), C128::new(1.0, 0.0))],
        }
    }

    /// Returns the creation operator on orbital `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is not smaller than `register_length`.
    pub fn creation(index: usize, register_length: usize) -> Self {
        Self::single(FermionicAction::Create, index, register_length)
    }

    /// Returns the annihilation operator on orbital `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is not smaller than `register_length`.
    pub fn annihilation(index: usize, register_length: usize) -> Self {
        Self::single(FermionicAction::Annihilate, index, register_length)
    }

    fn single(action: FermionicAction, index: usize, register_length: usize) -> Self {
        Self {
            register_length,
            terms: vec![(
                FermionicLabel::single(action, index, register_length),
                C128::new(1.0, 0.0),
            )],
        }
    }

    /// Returns the number of orbitals this operator acts on.
    pub fn register_length(&self) -> usize {
        self.register_length
    }

    /// Returns the weighted labels of this operator.
    pub fn terms(&self) -> &Vec<(FermionicLabel, C128)> {
        &self.terms
    }

    /// Returns the number of terms.
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    /// Returns `true` if this operator has no terms.
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Returns the terms as `(label, coefficient)` pairs with string labels.
    pub fn to_list(&self) -> Vec<(String, C128)> {
        self.terms
            .iter()
            .map(|(label, coeff)| (label.to_string(), *coeff))
            .collect()
    }

    fn ensure_compatible(&self, other: &Self) -> Result<(), anyhow::Error> {
        ensure!(
            self.register_length == other.register_length,
            DimensionError(format!(
                "operators act on {} and {} orbitals",
                self.register_length, other.register_length
            ))
        );
        Ok(())
    }
}

impl OperatorAlgebra for FermionicOp {
    fn compose(&self, other: &Self) -> Result<Self, anyhow::Error> {
        self.ensure_compatible(other)?;
        let terms = self
            .terms
            .iter()
            .cartesian_product(other.terms.iter())
            .filter_map(|((left, c_left), (right, c_right))| {
                left.compose(right)
                    .map(|(label, sign)| (label, c_left * c_right * sign))
            })
            .collect_vec();
        Ok(Self {
            register_length: self.register_length,
            terms,
        })
    }

    fn add(&self, other: &Self) -> Result<Self, anyhow::Error> {
        self.ensure_compatible(other)?;
        Ok(Self {
            register_length: self.register_length,
            terms: self
                .terms
                .iter()
                .chain(other.terms.iter())
                .cloned()
                .collect(),
        })
    }

    fn mul(&self, scalar: C128) -> Self {
        Self {
            register_length: self.register_length,
            terms: self
                .terms
                .iter()
                .map(|(label, coeff)| (label.clone(), coeff * scalar))
                .collect(),
        }
    }

    fn adjoint(&self) -> Self {
        Self {
            register_length: self.register_length,
            terms: self
                .terms
                .iter()
                .map(|(label, coeff)| {
                    let (label, sign) = label.dagger();
                    (label, coeff.conj() * sign)
                })
                .collect(),
        }
    }

    fn reduce(&self) -> Self {
        let mut merged: IndexMap<FermionicLabel, C128> = IndexMap::new();
        for (label, coeff) in self.terms.iter() {
            *merged.entry(label.clone()).or_insert_with(C128::zero) += coeff;
        }
        Self {
            register_length: self.register_length,
            terms: merged
                .into_iter()
                .filter(|(_, coeff)| !coeff.is_zero())
                .collect(),
        }
    }
}

impl fmt::Display for FermionicOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.terms.is_empty() {
            return writeln!(f, "0 (on {} orbitals)", self.register_length);
        }
        let width = self.register_length.max(5);
        writeln!(f, "{:<width$}  {:>18}  {:>18}", "Label", "Re", "Im")?;
        for (label, coeff) in self.terms.iter() {
            writeln!(
                f,
                "{:<width$}  {:>+18.10e}  {:>+18.10e}",
                label.to_string(),
                coeff.re,
                coeff.im
            )?;
        }
        Ok(())
    }
}
