//! Second-quantised operators over mixed particle types.

use std::fmt;

use anyhow::{self, ensure};
use num_complex::Complex;

use crate::operators::fermionic_op::FermionicOp;
use crate::operators::OperatorAlgebra;
use crate::transformers::NotSupportedError;

#[cfg(test)]
#[path = "second_quantized_op_tests.rs"]
mod second_quantized_op_tests;

/// An enumerated type for the kinds of particles on which second-quantised operators can act.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ParticleKind {
    Fermion,
    Boson,
    Spin,
}

impl fmt::Display for ParticleKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ParticleKind::Fermion => write!(f, "fermionic"),
            ParticleKind::Boson => write!(f, "bosonic"),
            ParticleKind::Spin => write!(f, "spin"),
        }
    }
}

/// An operator acting on a single kind of particle.
///
/// Only fermionic operators carry data. Bosonic and spin operators are placeholders which are
/// rejected on construction of a [`SecondQuantizedOp`].
#[derive(Clone, Debug, PartialEq)]
pub enum ParticleOp {
    Fermion(FermionicOp),
    Boson,
    Spin,
}

impl ParticleOp {
    /// Returns the particle kind of this operator.
    pub fn kind(&self) -> ParticleKind {
        match self {
            ParticleOp::Fermion(_) => ParticleKind::Fermion,
            ParticleOp::Boson => ParticleKind::Boson,
            ParticleOp::Spin => ParticleKind::Spin,
        }
    }
}

/// A structure for second-quantised operators composed of parts acting on different kinds of
/// particles.
#[derive(Clone, Debug, PartialEq)]
pub struct SecondQuantizedOp {
    fermion: Option<FermionicOp>,
}

impl SecondQuantizedOp {
    /// Constructs a mixed-particle operator from its parts.
    ///
    /// # Errors
    ///
    /// Errors if more than one fermionic part is given, or with [`NotSupportedError`] if any part
    /// is bosonic or spin.
    pub fn new(ops: Vec<ParticleOp>) -> Result<Self, anyhow::Error> {
        let mut fermion = None;
        for op in ops {
            match op {
                ParticleOp::Fermion(fermionic_op) => {
                    ensure!(
                        fermion.is_none(),
                        "At most one fermionic operator may be given."
                    );
                    fermion = Some(fermionic_op);
                }
                other => {
                    return Err(NotSupportedError(format!(
                        "{} parts of second-quantised operators",
                        other.kind()
                    ))
                    .into())
                }
            }
        }
        Ok(Self { fermion })
    }

    /// Returns the fermionic part, if any.
    pub fn fermion(&self) -> Option<&FermionicOp> {
        self.fermion.as_ref()
    }

    /// Returns the kinds of particles on which this operator acts.
    pub fn particle_kinds(&self) -> Vec<ParticleKind> {
        self.fermion
            .iter()
            .map(|_| ParticleKind::Fermion)
            .collect()
    }
}

impl OperatorAlgebra for SecondQuantizedOp {
    fn compose(&self, _: &Self) -> Result<Self, anyhow::Error> {
        Err(NotSupportedError("composition of mixed-particle operators".to_string()).into())
    }

    fn add(&self, _: &Self) -> Result<Self, anyhow::Error> {
        Err(NotSupportedError("addition of mixed-particle operators".to_string()).into())
    }

    fn mul(&self, scalar: Complex<f64>) -> Self {
        Self {
            fermion: self.fermion.as_ref().map(|op| op.mul(scalar)),
        }
    }

    fn adjoint(&self) -> Self {
        Self {
            fermion: self.fermion.as_ref().map(|op| op.adjoint()),
        }
    }

    fn reduce(&self) -> Self {
        Self {
            fermion: self.fermion.as_ref().map(|op| op.reduce()),
        }
    }
}
