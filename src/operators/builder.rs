//! Construction of fermionic Hamiltonians from one- and two-electron integrals.

use anyhow;
use log;
use ndarray::{Array2, Array4};
use num_complex::Complex;

use crate::integrals::{DimensionError, MolecularIntegrals};
use crate::operators::fermionic_op::FermionicOp;
use crate::operators::OperatorAlgebra;

#[cfg(test)]
#[path = "builder_tests.rs"]
mod builder_tests;

/// Builds the fermionic operator
/// ```math
///     \hat{H} = \sum_{ij} h_{ij} \hat{a}^{\dagger}_i \hat{a}_j
///         + \sum_{ijkl} g_{ijkl} \hat{a}^{\dagger}_i \hat{a}^{\dagger}_k \hat{a}_l \hat{a}_j
/// ```
/// from integral tensors, the two-electron one being in chemists' ordering.
///
/// Exactly vanishing integrals are skipped. The result is reduced, so that every label appears
/// at most once and no coefficient vanishes.
///
/// # Arguments
///
/// * `one_body` - The one-electron integrals $`h_{ij}`$.
/// * `two_body` - The optional two-electron integrals $`g_{ijkl}`$.
///
/// # Errors
///
/// Errors with [`DimensionError`] if `one_body` is not square, or if `two_body` does not have the
/// same dimension as `one_body` along each of its four axes.
pub fn build_fermionic_op_from_ints(
    one_body: &Array2<f64>,
    two_body: Option<&Array4<f64>>,
) -> Result<FermionicOp, anyhow::Error> {
    let (n, ncols) = one_body.dim();
    if n != ncols {
        return Err(DimensionError(format!(
            "one-electron integrals must be square, but have shape {n} × {ncols}"
        ))
        .into());
    }
    if let Some(two_body) = two_body {
        if two_body.shape() != [n, n, n, n] {
            return Err(DimensionError(format!(
                "two-electron integrals have shape {:?}, which does not match {n} orbitals",
                two_body.shape()
            ))
            .into());
        }
    }

    let ladder = |creators: &[usize], annihilators: &[usize]| {
        creators
            .iter()
            .map(|&p| FermionicOp::creation(p, n))
            .chain(annihilators.iter().map(|&q| FermionicOp::annihilation(q, n)))
            .try_fold(FermionicOp::identity(n), |acc, op| acc.compose(&op))
    };

    let mut terms = vec![];
    for ((i, j), &h_ij) in one_body.indexed_iter() {
        if h_ij != 0.0 {
            terms.push(ladder(&[i], &[j])?.mul(Complex::new(h_ij, 0.0)));
        }
    }
    let num_onee_terms = terms.len();
    if let Some(two_body) = two_body {
        for ((i, j, k, l), &g_ijkl) in two_body.indexed_iter() {
            if g_ijkl != 0.0 {
                terms.push(ladder(&[i, k], &[l, j])?.mul(Complex::new(g_ijkl, 0.0)));
            }
        }
    }
    log::debug!(
        "Fermionic operator on {n} orbitals built from {num_onee_terms} one-electron and {} two-electron integrals.",
        terms.len() - num_onee_terms
    );

    let op = FermionicOp::sum(n, terms)?.reduce();
    log::debug!("Reduced fermionic operator has {} terms.", op.len());
    Ok(op)
}

/// Builds the electronic Hamiltonian of a molecular integral record as a fermionic operator over
/// spin orbitals, all $`\alpha`$ spin orbitals preceding all $`\beta`$ ones.
///
/// The constant energy shifts and the nuclear repulsion energy are not included.
pub fn build_fermionic_op(molecule: &MolecularIntegrals) -> Result<FermionicOp, anyhow::Error> {
    molecule.check_dimensions()?;
    let one_body = molecule.one_body_spin_orbital_ints();
    let two_body = molecule.two_body_spin_orbital_ints()?;
    build_fermionic_op_from_ints(&one_body, Some(&two_body))
}
