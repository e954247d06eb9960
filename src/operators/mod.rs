//! Second-quantised operators and their construction from molecular integrals.

use anyhow;
use num_complex::Complex;

pub mod builder;
pub mod fermionic_op;
pub mod second_quantized_op;

// ================
// Trait definition
// ================

/// A trait for the star-algebra operations supported by second-quantised operators.
pub trait OperatorAlgebra: Sized {
    /// Composes `self` with `other`, with `self` acting last, i.e. returns `self · other`.
    ///
    /// # Errors
    ///
    /// Errors if the two operators act on incompatible registers, or if composition is not
    /// supported for the operator type.
    fn compose(&self, other: &Self) -> Result<Self, anyhow::Error>;

    /// Returns the sum of `self` and `other`, without simplification.
    ///
    /// # Errors
    ///
    /// Errors if the two operators act on incompatible registers, or if addition is not
    /// supported for the operator type.
    fn add(&self, other: &Self) -> Result<Self, anyhow::Error>;

    /// Returns `self` scaled by a complex scalar.
    fn mul(&self, scalar: Complex<f64>) -> Self;

    /// Returns the Hermitian adjoint of `self`.
    fn adjoint(&self) -> Self;

    /// Returns the canonical form of `self`, in which identical terms have been merged and terms
    /// with vanishing coefficients removed.
    fn reduce(&self) -> Self;
}
