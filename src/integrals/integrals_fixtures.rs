//! Small molecular integral records shared by unit tests.

use ndarray::{array, Array2, Array4};

use crate::integrals::{DipoleAxis, DipoleIntegrals, MolecularIntegrals, SpinChannel};

// -----------------------------
// H₂ / STO-3G in the MO basis
// -----------------------------

pub(crate) fn h2_hcore() -> Array2<f64> {
    array![[-1.25633907, 0.0], [0.0, -0.47189601]]
}

pub(crate) fn h2_eri() -> Array4<f64> {
    let mut eri = Array4::<f64>::zeros((2, 2, 2, 2));
    eri[(0, 0, 0, 0)] = 0.67571015;
    eri[(1, 1, 1, 1)] = 0.69857372;
    eri[(0, 0, 1, 1)] = 0.66458173;
    eri[(1, 1, 0, 0)] = 0.66458173;
    for (i, j, k, l) in [(0, 1, 0, 1), (0, 1, 1, 0), (1, 0, 0, 1), (1, 0, 1, 0)] {
        eri[(i, j, k, l)] = 0.18093120;
    }
    eri
}

pub(crate) fn h2_dipoles() -> Vec<DipoleIntegrals> {
    let dipole = |axis: DipoleAxis, ao_ints: Array2<f64>| {
        DipoleIntegrals::builder()
            .axis(axis)
            .ao_ints(ao_ints)
            .build()
            .unwrap()
    };
    vec![
        dipole(DipoleAxis::X, Array2::zeros((2, 2))),
        dipole(DipoleAxis::Y, Array2::zeros((2, 2))),
        dipole(
            DipoleAxis::Z,
            array![[0.69447435, -1.01418298], [-1.01418298, 0.69447435]],
        ),
    ]
}

pub(crate) fn h2_molecule() -> MolecularIntegrals {
    MolecularIntegrals::builder()
        .spin_channel(SpinChannel::Restricted)
        .nuclear_repulsion_energy(0.71996899)
        .num_alpha(1)
        .num_beta(1)
        .hcore(vec![h2_hcore()])
        .eri(h2_eri())
        .mo_coeff(vec![Array2::eye(2)])
        .dipoles(h2_dipoles())
        .build()
        .unwrap()
}

// -------------------------------------------
// Three-orbital model with rotated orbitals
// -------------------------------------------

pub(crate) fn model_hcore() -> Array2<f64> {
    array![[-1.5, 0.1, 0.05], [0.1, -0.9, 0.2], [0.05, 0.2, -0.3]]
}

pub(crate) fn model_eri() -> Array4<f64> {
    Array4::from_shape_fn((3, 3, 3, 3), |(i, j, k, l)| {
        0.6 / (1.0 + i.abs_diff(j) as f64 + k.abs_diff(l) as f64) + 0.05 * ((i + j) * (k + l)) as f64
    })
}

pub(crate) fn model_dipole_z() -> DipoleIntegrals {
    DipoleIntegrals::builder()
        .axis(DipoleAxis::Z)
        .ao_ints(array![[0.4, -0.2, 0.1], [-0.2, 0.3, 0.05], [0.1, 0.05, -0.6]])
        .build()
        .unwrap()
}

/// Givens rotation by `theta` in the `(p, q)` plane of a three-dimensional space.
pub(crate) fn givens(p: usize, q: usize, theta: f64) -> Array2<f64> {
    let mut r = Array2::<f64>::eye(3);
    let (c, s) = (theta.cos(), theta.sin());
    r[(p, p)] = c;
    r[(q, q)] = c;
    r[(p, q)] = -s;
    r[(q, p)] = s;
    r
}

pub(crate) fn model_coeff_alpha() -> Array2<f64> {
    givens(0, 1, 0.3).dot(&givens(1, 2, 0.2))
}

pub(crate) fn model_coeff_beta() -> Array2<f64> {
    givens(0, 1, -0.25).dot(&givens(0, 2, 0.15))
}

/// Closed-shell four-electron restricted record.
pub(crate) fn restricted_model(coeff: Array2<f64>, core_orbitals: Vec<usize>) -> MolecularIntegrals {
    MolecularIntegrals::builder()
        .spin_channel(SpinChannel::Restricted)
        .nuclear_repulsion_energy(1.2)
        .num_alpha(2)
        .num_beta(2)
        .core_orbitals(core_orbitals)
        .hcore(vec![model_hcore()])
        .eri(model_eri())
        .mo_coeff(vec![coeff])
        .dipoles(vec![model_dipole_z()])
        .build()
        .unwrap()
}

/// Doublet three-electron unrestricted record.
pub(crate) fn unrestricted_model() -> MolecularIntegrals {
    MolecularIntegrals::builder()
        .spin_channel(SpinChannel::Unrestricted)
        .nuclear_repulsion_energy(1.2)
        .num_alpha(2)
        .num_beta(1)
        .multiplicity(2)
        .hcore(vec![model_hcore()])
        .eri(model_eri())
        .mo_coeff(vec![model_coeff_alpha(), model_coeff_beta()])
        .dipoles(vec![model_dipole_z()])
        .build()
        .unwrap()
}
