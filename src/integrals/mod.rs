//! Molecular integral records consumed and produced by orbital reducers.

use std::error::Error;
use std::fmt;

use anyhow::{self, format_err};
use derive_builder::Builder;
use indexmap::{IndexMap, IndexSet};
use ndarray::{Array1, Array2, Array4, ArrayView2, ArrayView4, Ix4};
use ndarray_einsum_beta::*;
use serde::{Deserialize, Serialize};

#[cfg(test)]
#[path = "integrals_fixtures.rs"]
pub(crate) mod integrals_fixtures;


/// Magnitude below which spin-orbital integrals are treated as exact zeros.
const SPIN_ORBITAL_THRESHOLD: f64 = 1e-12;

// =================
// Enum definitions
// =================

/// An enumerated type for the spin treatment of a set of molecular orbitals.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpinChannel {
    /// Variant for spin-restricted orbitals: both spin spaces share one coefficient matrix.
    Restricted,

    /// Variant for spin-unrestricted orbitals: the $`\alpha`$ and $`\beta`$ spin spaces have their
    /// own coefficient matrices.
    Unrestricted,
}

impl SpinChannel {
    /// Returns the number of explicitly stored spin spaces.
    pub fn n_spin_spaces(&self) -> usize {
        match self {
            SpinChannel::Restricted => 1,
            SpinChannel::Unrestricted => 2,
        }
    }

    /// Returns the number of stored two-electron tensors in the molecular-orbital basis
    /// ($`\alpha\alpha`$ only, or $`\alpha\alpha`$, $`\beta\alpha`$ and $`\beta\beta`$).
    pub fn n_twoe_blocks(&self) -> usize {
        match self {
            SpinChannel::Restricted => 1,
            SpinChannel::Unrestricted => 3,
        }
    }
}

impl fmt::Display for SpinChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpinChannel::Restricted => write!(f, "Spin-restricted"),
            SpinChannel::Unrestricted => write!(f, "Spin-unrestricted"),
        }
    }
}

/// An enumerated type for the Cartesian components of the electric dipole moment.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DipoleAxis {
    X,
    Y,
    Z,
}

impl DipoleAxis {
    /// Returns all three axes in the order $`x`$, $`y`$, $`z`$.
    pub fn all() -> [DipoleAxis; 3] {
        [DipoleAxis::X, DipoleAxis::Y, DipoleAxis::Z]
    }
}

impl fmt::Display for DipoleAxis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DipoleAxis::X => write!(f, "x"),
            DipoleAxis::Y => write!(f, "y"),
            DipoleAxis::Z => write!(f, "z"),
        }
    }
}

// ==================
// Error definitions
// ==================

/// Error raised when integral tensors have inconsistent shapes.
#[derive(Debug, Clone)]
pub struct DimensionError(pub String);

impl fmt::Display for DimensionError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Dimension error: {}.", self.0)
    }
}

impl Error for DimensionError {}

// ==================
// Struct definitions
// ==================

/// Structure to manage the integrals of one Cartesian component of the electric dipole moment.
#[derive(Builder, Clone, Debug, Serialize, Deserialize)]
pub struct DipoleIntegrals {
    /// The Cartesian axis of this dipole component.
    axis: DipoleAxis,

    /// The dipole integrals in the atomic-orbital basis.
    ao_ints: Array2<f64>,

    /// The dipole integrals in the molecular-orbital basis, one matrix per spin space.
    #[builder(default = "None")]
    #[serde(default)]
    mo_ints: Option<Vec<Array2<f64>>>,

    /// The constant shifts of this dipole component, keyed by the name of the transformation
    /// that produced them.
    #[builder(default = "IndexMap::new()")]
    #[serde(default)]
    energy_shift: IndexMap<String, f64>,
}

impl DipoleIntegrals {
    /// Returns a builder to construct a new [`DipoleIntegrals`].
    pub fn builder() -> DipoleIntegralsBuilder {
        DipoleIntegralsBuilder::default()
    }

    /// Returns the Cartesian axis of this dipole component.
    pub fn axis(&self) -> DipoleAxis {
        self.axis
    }

    /// Returns the dipole integrals in the atomic-orbital basis.
    pub fn ao_ints(&self) -> &Array2<f64> {
        &self.ao_ints
    }

    /// Returns the dipole integrals in the molecular-orbital basis, if available.
    pub fn mo_ints(&self) -> Option<&Vec<Array2<f64>>> {
        self.mo_ints.as_ref()
    }

    /// Returns the constant shifts of this dipole component.
    pub fn energy_shift(&self) -> &IndexMap<String, f64> {
        &self.energy_shift
    }
}

/// Structure to manage the integrals and orbital information of a molecular electronic
/// Hamiltonian, as produced by an external quantum-chemistry driver.
///
/// Atomic-orbital quantities (`hcore`, `eri`, dipole integrals) are square in the number of basis
/// functions $`n_{\mathrm{bas}}`$, whereas molecular-orbital quantities are square in the number
/// of molecular orbitals $`n_{\mathrm{orb}}`$, which is the number of columns of the coefficient
/// matrices. The two-electron integrals are stored in chemists' ordering, so that
/// $`(ij|kl)`$ corresponds to $`\hat{a}^{\dagger}_i \hat{a}^{\dagger}_k \hat{a}_l \hat{a}_j`$.
#[derive(Builder, Clone, Debug, Serialize, Deserialize)]
#[builder(build_fn(validate = "Self::validate"))]
pub struct MolecularIntegrals {
    /// The spin treatment of the molecular orbitals.
    spin_channel: SpinChannel,

    /// The nuclear repulsion energy.
    #[builder(default = "0.0")]
    #[serde(default)]
    nuclear_repulsion_energy: f64,

    /// The number of $`\alpha`$ electrons.
    num_alpha: usize,

    /// The number of $`\beta`$ electrons.
    num_beta: usize,

    /// The spin multiplicity $`2S + 1`$.
    #[builder(default = "1")]
    #[serde(default = "default_multiplicity")]
    multiplicity: usize,

    /// The indices of the core molecular orbitals.
    #[builder(default = "vec![]")]
    #[serde(default)]
    core_orbitals: Vec<usize>,

    /// The core Hamiltonian in the atomic-orbital basis. A second matrix may be given for the
    /// $`\beta`$ spin space of unrestricted orbitals; otherwise the first is shared.
    hcore: Vec<Array2<f64>>,

    /// The electron-repulsion integrals in the atomic-orbital basis.
    eri: Array4<f64>,

    /// The molecular-orbital coefficient matrices, one per spin space.
    mo_coeff: Vec<Array2<f64>>,

    /// The molecular-orbital occupation numbers, one vector per spin space. Restricted
    /// occupations count both spins, so range from $`0`$ to $`2`$.
    #[builder(default = "None")]
    #[serde(default)]
    mo_occ: Option<Vec<Array1<f64>>>,

    /// The molecular-orbital energies, one vector per spin space.
    #[builder(default = "None")]
    #[serde(default)]
    orbital_energies: Option<Vec<Array1<f64>>>,

    /// The one-electron integrals in the molecular-orbital basis, one matrix per spin space.
    #[builder(default = "None")]
    #[serde(default)]
    mo_onee_ints: Option<Vec<Array2<f64>>>,

    /// The two-electron integrals in the molecular-orbital basis: $`\alpha\alpha`$ for restricted
    /// orbitals, or $`\alpha\alpha`$, $`\beta\alpha`$ and $`\beta\beta`$ for unrestricted ones.
    #[builder(default = "None")]
    #[serde(default)]
    mo_eri_ints: Option<Vec<Array4<f64>>>,

    /// The dipole-moment integrals, at most one per Cartesian axis.
    #[builder(default = "vec![]")]
    #[serde(default)]
    dipoles: Vec<DipoleIntegrals>,

    /// The constant energy shifts, keyed by the name of the transformation that produced them.
    #[builder(default = "IndexMap::new()")]
    #[serde(default)]
    energy_shift: IndexMap<String, f64>,
}

fn default_multiplicity() -> usize {
    1
}

impl MolecularIntegralsBuilder {
    fn validate(&self) -> Result<(), String> {
        let spin_channel = self
            .spin_channel
            .ok_or("No spin channel found.".to_string())?;
        let hcore = self.hcore.as_ref().ok_or("No core Hamiltonian found.".to_string())?;
        let eri = self
            .eri
            .as_ref()
            .ok_or("No electron-repulsion integrals found.".to_string())?;
        let mo_coeff = self
            .mo_coeff
            .as_ref()
            .ok_or("No molecular-orbital coefficients found.".to_string())?;
        let num_alpha = self
            .num_alpha
            .ok_or("No number of alpha electrons found.".to_string())?;
        let num_beta = self
            .num_beta
            .ok_or("No number of beta electrons found.".to_string())?;
        let empty_dipoles = vec![];
        let empty_core = vec![];
        let shapes = IntegralShapes {
            spin_channel,
            hcore,
            eri,
            mo_coeff,
            mo_occ: self.mo_occ.as_ref().and_then(|occ| occ.as_ref()),
            orbital_energies: self.orbital_energies.as_ref().and_then(|e| e.as_ref()),
            mo_onee_ints: self.mo_onee_ints.as_ref().and_then(|h| h.as_ref()),
            mo_eri_ints: self.mo_eri_ints.as_ref().and_then(|g| g.as_ref()),
            dipoles: self.dipoles.as_ref().unwrap_or(&empty_dipoles),
            core_orbitals: self.core_orbitals.as_ref().unwrap_or(&empty_core),
            num_alpha,
            num_beta,
        };
        shapes.check().map_err(|err| err.to_string())
    }
}

/// Borrowed view of every shaped quantity in a [`MolecularIntegrals`], so that the same
/// consistency checks serve both the builder and already-constructed records.
struct IntegralShapes<'a> {
    spin_channel: SpinChannel,
    hcore: &'a [Array2<f64>],
    eri: &'a Array4<f64>,
    mo_coeff: &'a [Array2<f64>],
    mo_occ: Option<&'a Vec<Array1<f64>>>,
    orbital_energies: Option<&'a Vec<Array1<f64>>>,
    mo_onee_ints: Option<&'a Vec<Array2<f64>>>,
    mo_eri_ints: Option<&'a Vec<Array4<f64>>>,
    dipoles: &'a [DipoleIntegrals],
    core_orbitals: &'a [usize],
    num_alpha: usize,
    num_beta: usize,
}

impl<'a> IntegralShapes<'a> {
    fn check(&self) -> Result<(), DimensionError> {
        let nspins = self.spin_channel.n_spin_spaces();
        if self.mo_coeff.len() != nspins {
            return Err(DimensionError(format!(
                "{} orbitals require {nspins} coefficient matrices, but {} found",
                self.spin_channel,
                self.mo_coeff.len()
            )));
        }
        let (nbas, norb) = self.mo_coeff[0].dim();
        if self.mo_coeff.iter().any(|c| c.dim() != (nbas, norb)) {
            return Err(DimensionError(
                "coefficient matrices of different spin spaces have different shapes".to_string(),
            ));
        }
        if norb > nbas {
            return Err(DimensionError(format!(
                "{norb} molecular orbitals cannot be spanned by {nbas} basis functions"
            )));
        }

        let max_hcore = match self.spin_channel {
            SpinChannel::Restricted => 1,
            SpinChannel::Unrestricted => 2,
        };
        if self.hcore.is_empty() || self.hcore.len() > max_hcore {
            return Err(DimensionError(format!(
                "{} orbitals admit between 1 and {max_hcore} core Hamiltonians, but {} found",
                self.spin_channel,
                self.hcore.len()
            )));
        }
        if self.hcore.iter().any(|h| h.dim() != (nbas, nbas)) {
            return Err(DimensionError(format!(
                "core Hamiltonian must be {nbas} × {nbas}"
            )));
        }
        if self.eri.shape() != [nbas, nbas, nbas, nbas] {
            return Err(DimensionError(format!(
                "electron-repulsion integrals have shape {:?}, but [{nbas}, {nbas}, {nbas}, {nbas}] expected",
                self.eri.shape()
            )));
        }

        for (name, vecs) in [
            ("occupation", self.mo_occ),
            ("orbital-energy", self.orbital_energies),
        ] {
            if let Some(vecs) = vecs {
                if vecs.len() != nspins || vecs.iter().any(|v| v.len() != norb) {
                    return Err(DimensionError(format!(
                        "{nspins} {name} vector(s) of length {norb} expected"
                    )));
                }
            }
        }

        if let Some(mo_onee_ints) = self.mo_onee_ints {
            if mo_onee_ints.len() != nspins
                || mo_onee_ints.iter().any(|h| h.dim() != (norb, norb))
            {
                return Err(DimensionError(format!(
                    "{nspins} molecular-orbital one-electron matrices of size {norb} × {norb} expected"
                )));
            }
        }
        if let Some(mo_eri_ints) = self.mo_eri_ints {
            let nblocks = self.spin_channel.n_twoe_blocks();
            if mo_eri_ints.len() != nblocks
                || mo_eri_ints
                    .iter()
                    .any(|g| g.shape() != [norb, norb, norb, norb])
            {
                return Err(DimensionError(format!(
                    "{nblocks} molecular-orbital two-electron tensors with side {norb} expected"
                )));
            }
        }

        let mut axes = IndexSet::new();
        for dipole in self.dipoles.iter() {
            if !axes.insert(dipole.axis) {
                return Err(DimensionError(format!(
                    "more than one set of {}-dipole integrals found",
                    dipole.axis
                )));
            }
            if dipole.ao_ints.dim() != (nbas, nbas) {
                return Err(DimensionError(format!(
                    "{}-dipole integrals must be {nbas} × {nbas}",
                    dipole.axis
                )));
            }
            if let Some(mo_ints) = dipole.mo_ints.as_ref() {
                if mo_ints.len() != nspins || mo_ints.iter().any(|d| d.dim() != (norb, norb)) {
                    return Err(DimensionError(format!(
                        "{nspins} molecular-orbital {}-dipole matrices of size {norb} × {norb} expected",
                        dipole.axis
                    )));
                }
            }
        }

        if let Some(core) = self.core_orbitals.iter().find(|&&i| i >= norb) {
            return Err(DimensionError(format!(
                "core orbital index {core} is out of range for {norb} orbitals"
            )));
        }
        if self.num_alpha > norb || self.num_beta > norb {
            return Err(DimensionError(format!(
                "{} alpha and {} beta electrons cannot be accommodated in {norb} orbitals",
                self.num_alpha, self.num_beta
            )));
        }
        Ok(())
    }
}

impl MolecularIntegrals {
    /// Returns a builder to construct a new [`MolecularIntegrals`].
    pub fn builder() -> MolecularIntegralsBuilder {
        MolecularIntegralsBuilder::default()
    }

    /// Checks that all stored tensors have mutually consistent shapes.
    ///
    /// Records built via [`Self::builder`] are always consistent, but records deserialised from
    /// files bypass the builder and must be checked before use.
    pub fn check_dimensions(&self) -> Result<(), DimensionError> {
        IntegralShapes {
            spin_channel: self.spin_channel,
            hcore: &self.hcore,
            eri: &self.eri,
            mo_coeff: &self.mo_coeff,
            mo_occ: self.mo_occ.as_ref(),
            orbital_energies: self.orbital_energies.as_ref(),
            mo_onee_ints: self.mo_onee_ints.as_ref(),
            mo_eri_ints: self.mo_eri_ints.as_ref(),
            dipoles: &self.dipoles,
            core_orbitals: &self.core_orbitals,
            num_alpha: self.num_alpha,
            num_beta: self.num_beta,
        }
        .check()
    }

    /// Returns the spin treatment of the molecular orbitals.
    pub fn spin_channel(&self) -> SpinChannel {
        self.spin_channel
    }

    /// Returns the nuclear repulsion energy.
    pub fn nuclear_repulsion_energy(&self) -> f64 {
        self.nuclear_repulsion_energy
    }

    /// Returns the number of $`\alpha`$ electrons.
    pub fn num_alpha(&self) -> usize {
        self.num_alpha
    }

    /// Returns the number of $`\beta`$ electrons.
    pub fn num_beta(&self) -> usize {
        self.num_beta
    }

    /// Returns the total number of electrons.
    pub fn num_electrons(&self) -> usize {
        self.num_alpha + self.num_beta
    }

    /// Returns the spin multiplicity.
    pub fn multiplicity(&self) -> usize {
        self.multiplicity
    }

    /// Returns the number of molecular orbitals.
    pub fn num_orbitals(&self) -> usize {
        self.mo_coeff[0].ncols()
    }

    /// Returns the number of atomic-orbital basis functions.
    pub fn num_basis_functions(&self) -> usize {
        self.mo_coeff[0].nrows()
    }

    /// Returns the indices of the core molecular orbitals.
    pub fn core_orbitals(&self) -> &Vec<usize> {
        &self.core_orbitals
    }

    /// Returns the stored core Hamiltonian matrices.
    pub fn hcore(&self) -> &Vec<Array2<f64>> {
        &self.hcore
    }

    /// Returns the core Hamiltonian of a spin space, falling back onto the $`\alpha`$ matrix when
    /// no separate $`\beta`$ matrix has been given.
    pub fn hcore_for(&self, ispin: usize) -> &Array2<f64> {
        self.hcore.get(ispin).unwrap_or(&self.hcore[0])
    }

    /// Returns the electron-repulsion integrals in the atomic-orbital basis.
    pub fn eri(&self) -> &Array4<f64> {
        &self.eri
    }

    /// Returns the molecular-orbital coefficient matrices.
    pub fn mo_coeff(&self) -> &Vec<Array2<f64>> {
        &self.mo_coeff
    }

    /// Returns the stored occupation numbers, if the driver supplied them.
    pub fn mo_occ(&self) -> Option<&Vec<Array1<f64>>> {
        self.mo_occ.as_ref()
    }

    /// Returns the molecular-orbital energies, if available.
    pub fn orbital_energies(&self) -> Option<&Vec<Array1<f64>>> {
        self.orbital_energies.as_ref()
    }

    /// Returns the dipole-moment integrals.
    pub fn dipoles(&self) -> &Vec<DipoleIntegrals> {
        &self.dipoles
    }

    /// Returns the dipole-moment integrals along one axis, if available.
    pub fn dipole(&self, axis: DipoleAxis) -> Option<&DipoleIntegrals> {
        self.dipoles.iter().find(|dipole| dipole.axis == axis)
    }

    /// Returns the constant energy shifts.
    pub fn energy_shift(&self) -> &IndexMap<String, f64> {
        &self.energy_shift
    }

    /// Returns the occupation numbers of the molecular orbitals, one vector per spin space.
    ///
    /// If the driver did not supply any, the ground-state aufbau occupation is constructed: the
    /// lowest [`Self::num_alpha`] orbitals hold one $`\alpha`$ electron each and the lowest
    /// [`Self::num_beta`] orbitals one $`\beta`$ electron each. For restricted orbitals, both
    /// contributions are summed into a single vector.
    pub fn occupations(&self) -> Vec<Array1<f64>> {
        if let Some(mo_occ) = self.mo_occ.as_ref() {
            return mo_occ.clone();
        }
        let norb = self.num_orbitals();
        let occ_alpha = Array1::from_shape_fn(norb, |i| if i < self.num_alpha { 1.0 } else { 0.0 });
        let occ_beta = Array1::from_shape_fn(norb, |i| if i < self.num_beta { 1.0 } else { 0.0 });
        match self.spin_channel {
            SpinChannel::Restricted => vec![occ_alpha + occ_beta],
            SpinChannel::Unrestricted => vec![occ_alpha, occ_beta],
        }
    }

    /// Returns the total (spin-summed) occupation number of every molecular orbital.
    pub fn total_occupations(&self) -> Array1<f64> {
        self.occupations()
            .into_iter()
            .reduce(|acc, occ| acc + occ)
            .unwrap_or_else(|| Array1::zeros(self.num_orbitals()))
    }

    /// Returns the one-electron integrals in the molecular-orbital basis, one matrix per spin
    /// space. Stored integrals are returned as they are; otherwise they are obtained by
    /// transforming the core Hamiltonian with the coefficient matrices.
    pub fn mo_onee_ints(&self) -> Vec<Array2<f64>> {
        if let Some(mo_onee_ints) = self.mo_onee_ints.as_ref() {
            return mo_onee_ints.clone();
        }
        self.mo_coeff
            .iter()
            .enumerate()
            .map(|(ispin, c)| transform_onee(&self.hcore_for(ispin).view(), &c.view()))
            .collect()
    }

    /// Returns the two-electron integrals in the molecular-orbital basis ($`\alpha\alpha`$ for
    /// restricted orbitals, or $`\alpha\alpha`$, $`\beta\alpha`$ and $`\beta\beta`$ for
    /// unrestricted ones). Stored integrals are returned as they are; otherwise they are obtained
    /// by transforming the atomic-orbital electron-repulsion integrals.
    pub fn mo_eri_ints(&self) -> Result<Vec<Array4<f64>>, anyhow::Error> {
        if let Some(mo_eri_ints) = self.mo_eri_ints.as_ref() {
            return Ok(mo_eri_ints.clone());
        }
        let eri = self.eri.view();
        let ca = self.mo_coeff[0].view();
        match self.spin_channel {
            SpinChannel::Restricted => Ok(vec![transform_twoe(&eri, [&ca, &ca, &ca, &ca])?]),
            SpinChannel::Unrestricted => {
                let cb = self.mo_coeff[1].view();
                Ok(vec![
                    transform_twoe(&eri, [&ca, &ca, &ca, &ca])?,
                    transform_twoe(&eri, [&cb, &cb, &ca, &ca])?,
                    transform_twoe(&eri, [&cb, &cb, &cb, &cb])?,
                ])
            }
        }
    }

    /// Returns the one-electron integrals in the spin-orbital basis.
    ///
    /// The $`2n_{\mathrm{orb}}`$ spin orbitals are ordered with all $`\alpha`$ orbitals first,
    /// so the matrix is block-diagonal in the two spin spaces. Entries with magnitudes below
    /// $`10^{-12}`$ are set to zero.
    pub fn one_body_spin_orbital_ints(&self) -> Array2<f64> {
        let mo_onee_ints = self.mo_onee_ints();
        let norb = self.num_orbitals();
        Array2::from_shape_fn((2 * norb, 2 * norb), |(p, q)| {
            let (spin_p, spin_q) = (p / norb, q / norb);
            if spin_p != spin_q {
                return 0.0;
            }
            let h = mo_onee_ints.get(spin_p).unwrap_or(&mo_onee_ints[0]);
            let value = h[(p % norb, q % norb)];
            if value.abs() > SPIN_ORBITAL_THRESHOLD {
                value
            } else {
                0.0
            }
        })
    }

    /// Returns the two-electron integrals in the spin-orbital basis, arranged for
    /// [`crate::operators::builder::build_fermionic_op_from_ints`].
    ///
    /// Element $`[p, q, r, s]`$ holds $`-\tfrac{1}{2}(rq|sp)`$ whenever spin orbitals $`p`$ and
    /// $`s`$ share a spin, and so do $`q`$ and $`r`$; all other elements vanish, as do those
    /// with magnitudes below $`10^{-12}`$.
    pub fn two_body_spin_orbital_ints(&self) -> Result<Array4<f64>, anyhow::Error> {
        let mo_eri_ints = self.mo_eri_ints()?;
        let norb = self.num_orbitals();
        let (aa, ba, bb) = match self.spin_channel {
            SpinChannel::Restricted => (&mo_eri_ints[0], &mo_eri_ints[0], &mo_eri_ints[0]),
            SpinChannel::Unrestricted => (&mo_eri_ints[0], &mo_eri_ints[1], &mo_eri_ints[2]),
        };
        Ok(Array4::from_shape_fn(
            (2 * norb, 2 * norb, 2 * norb, 2 * norb),
            |(p, q, r, s)| {
                let (spin_p, spin_q, spin_r, spin_s) = (p / norb, q / norb, r / norb, s / norb);
                if spin_p != spin_s || spin_q != spin_r {
                    return 0.0;
                }
                let (i, j, k, l) = (p % norb, q % norb, r % norb, s % norb);
                let value = match (spin_p, spin_q) {
                    (0, 0) => aa[(k, j, l, i)],
                    // βα holds (ββ|αα); the αβ block reads it with the index order reversed.
                    (0, _) => ba[(k, j, l, i)],
                    (_, 0) => ba[(i, l, j, k)],
                    _ => bb[(k, j, l, i)],
                };
                if value.abs() > SPIN_ORBITAL_THRESHOLD {
                    -0.5 * value
                } else {
                    0.0
                }
            },
        ))
    }

    fn summary(&self) -> String {
        let mut lines = vec![
            format!("Spin treatment: {}", self.spin_channel),
            format!("Number of basis functions: {}", self.num_basis_functions()),
            format!("Number of molecular orbitals: {}", self.num_orbitals()),
            format!(
                "Number of electrons: {} (α: {}, β: {})",
                self.num_electrons(),
                self.num_alpha,
                self.num_beta
            ),
            format!("Spin multiplicity: {}", self.multiplicity),
            format!(
                "Dipole components: {}",
                if self.dipoles.is_empty() {
                    "--".to_string()
                } else {
                    self.dipoles
                        .iter()
                        .map(|dipole| dipole.axis.to_string())
                        .collect::<Vec<_>>()
                        .join(", ")
                }
            ),
        ];
        for (name, shift) in self.energy_shift.iter() {
            lines.push(format!("Energy shift ({name}): {shift:+.10}"));
        }
        lines.join("\n")
    }
}

impl fmt::Display for MolecularIntegrals {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.summary())
    }
}

// =========
// Functions
// =========

/// Transforms a one-electron operator $`\mathbf{O}`$ into the basis spanned by the columns of
/// $`\mathbf{C}`$, giving $`\mathbf{C}^{\mathsf{T}} \mathbf{O} \mathbf{C}`$.
pub(crate) fn transform_onee(op: &ArrayView2<f64>, c: &ArrayView2<f64>) -> Array2<f64> {
    c.t().dot(op).dot(c)
}

/// Transforms a two-electron tensor in chemists' ordering into the basis spanned by the columns
/// of four coefficient matrices, one per index:
/// ```math
///     g_{ijkl} = \sum_{pqrs} (pq|rs) C^{(1)}_{pi} C^{(2)}_{qj} C^{(3)}_{rk} C^{(4)}_{sl}.
/// ```
/// The contraction is carried out one index at a time.
pub(crate) fn transform_twoe(
    eri: &ArrayView4<f64>,
    cs: [&ArrayView2<f64>; 4],
) -> Result<Array4<f64>, anyhow::Error> {
    let [c1, c2, c3, c4] = cs;
    let g_iqrs = einsum("pqrs,pi->iqrs", &[eri, c1]).map_err(|err| format_err!(err))?;
    let g_ijrs = einsum("iqrs,qj->ijrs", &[&g_iqrs, c2]).map_err(|err| format_err!(err))?;
    let g_ijks = einsum("ijrs,rk->ijks", &[&g_ijrs, c3]).map_err(|err| format_err!(err))?;
    let g_ijkl = einsum("ijks,sl->ijkl", &[&g_ijks, c4]).map_err(|err| format_err!(err))?;
    Ok(g_ijkl.into_dimensionality::<Ix4>()?)
}
