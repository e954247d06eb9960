//! Active-space reduction of molecular integral records.
//!
//! The orbitals of a record are partitioned into an active and an inactive set. The electrons in
//! the inactive orbitals are folded into an effective one-electron operator, the inactive Fock
//! operator
//! ```math
//!     F^{\mathrm{I}}_{\mu\nu} = h_{\mu\nu}
//!         + \sum_{\lambda\sigma} D^{\mathrm{I}}_{\sigma\lambda} (\lambda\sigma|\mu\nu)
//!         - \tfrac{1}{2} \sum_{\lambda\sigma} D^{\mathrm{I}}_{\lambda\sigma} (\mu\lambda|\sigma\nu),
//! ```
//! and the energy they contribute is recorded as a constant shift. Only the active orbitals are
//! retained in the reduced record.

use std::fmt;

use anyhow::{self, ensure, format_err};
use derive_builder::Builder;
use itertools::Itertools;
use log;
use ndarray::{Array1, Array2, Array4, Axis, Ix0, Ix2};
use ndarray_einsum_beta::*;
use serde::{Deserialize, Serialize};

use crate::integrals::{
    transform_onee, transform_twoe, DipoleIntegrals, MolecularIntegrals, SpinChannel,
};
use crate::io::format::{nice_bool, nice_indices, qredux_warn, write_subtitle, write_title};
use crate::transformers::{ActiveSpaceError, ConfigurationError, OrbitalReducer};

#[cfg(test)]
#[path = "active_space_tests.rs"]
mod active_space_tests;

// ==================
// Struct definitions
// ==================

// ----------
// Parameters
// ----------

fn default_occupation_threshold() -> f64 {
    1e-8
}

/// A structure containing control parameters for active-space reduction.
///
/// Two mutually exclusive modes are available: either [`Self::freeze_core`] is set (optionally
/// together with [`Self::remove_orbitals`]), or both [`Self::num_electrons`] and
/// [`Self::num_molecular_orbitals`] are given.
#[derive(Clone, Builder, Debug, Serialize, Deserialize)]
pub struct ActiveSpaceParams {
    /// The number of active electrons.
    #[builder(setter(strip_option), default = "None")]
    #[serde(default)]
    pub num_electrons: Option<usize>,

    /// The number of active molecular orbitals.
    #[builder(setter(strip_option), default = "None")]
    #[serde(default)]
    pub num_molecular_orbitals: Option<usize>,

    /// The number of active $`\alpha`$ electrons. Only meaningful for spin-unrestricted records;
    /// otherwise the split is derived from the spin multiplicity.
    #[builder(setter(strip_option), default = "None")]
    #[serde(default)]
    pub num_alpha: Option<usize>,

    /// Explicit indices of the active molecular orbitals. If not given, the active orbitals form
    /// a contiguous block directly above the doubly occupied inactive ones.
    #[builder(setter(strip_option), default = "None")]
    #[serde(default)]
    pub active_orbitals: Option<Vec<usize>>,

    /// Boolean indicating if the core orbitals of the record are to be frozen.
    #[builder(default = "false")]
    #[serde(default)]
    pub freeze_core: bool,

    /// Additional orbitals to be removed in freeze-core mode.
    #[builder(default = "vec![]")]
    #[serde(default)]
    pub remove_orbitals: Vec<usize>,

    /// Tolerance for comparing summed occupation numbers against integral electron counts.
    #[builder(default = "default_occupation_threshold()")]
    #[serde(default = "default_occupation_threshold")]
    pub occupation_threshold: f64,
}

impl ActiveSpaceParams {
    /// Returns a builder to construct a [`ActiveSpaceParams`] structure.
    pub fn builder() -> ActiveSpaceParamsBuilder {
        ActiveSpaceParamsBuilder::default()
    }

    /// Resolves the reduction mode described by these parameters.
    ///
    /// # Errors
    ///
    /// Errors with [`ConfigurationError`] if no mode or more than one mode can be resolved.
    pub fn mode(&self) -> Result<ActiveSpaceMode, ConfigurationError> {
        let explicit_given = self.num_electrons.is_some()
            || self.num_molecular_orbitals.is_some()
            || self.num_alpha.is_some()
            || self.active_orbitals.is_some();
        if self.freeze_core {
            if explicit_given {
                return Err(ConfigurationError(
                    "`freeze_core` cannot be combined with explicit active-space sizing"
                        .to_string(),
                ));
            }
            return Ok(ActiveSpaceMode::FreezeCore {
                remove_orbitals: self.remove_orbitals.clone(),
            });
        }
        if !self.remove_orbitals.is_empty() {
            return Err(ConfigurationError(
                "`remove_orbitals` is only meaningful together with `freeze_core`".to_string(),
            ));
        }
        match (self.num_electrons, self.num_molecular_orbitals) {
            (Some(num_electrons), Some(num_orbitals)) => Ok(ActiveSpaceMode::Explicit {
                num_electrons,
                num_orbitals,
                num_alpha: self.num_alpha,
                active_orbitals: self.active_orbitals.clone(),
            }),
            _ if explicit_given => Err(ConfigurationError(
                "both `num_electrons` and `num_molecular_orbitals` must be given for explicit active-space sizing"
                    .to_string(),
            )),
            _ => Err(ConfigurationError(
                "neither `freeze_core` nor explicit active-space sizing has been requested"
                    .to_string(),
            )),
        }
    }
}

impl Default for ActiveSpaceParams {
    fn default() -> Self {
        Self::builder()
            .build()
            .expect("Unable to construct a default `ActiveSpaceParams`.")
    }
}

impl fmt::Display for ActiveSpaceParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_title(f, "Active-Space Reduction")?;
        writeln!(f)?;
        writeln!(f, "Freeze core: {}", nice_bool(self.freeze_core))?;
        if self.freeze_core {
            writeln!(
                f,
                "Removed orbitals: {}",
                nice_indices(Some(&self.remove_orbitals))
            )?;
        } else {
            let nice_count = |count: Option<usize>| {
                count
                    .map(|n| n.to_string())
                    .unwrap_or_else(|| "--".to_string())
            };
            writeln!(f, "Active electrons: {}", nice_count(self.num_electrons))?;
            writeln!(
                f,
                "Active molecular orbitals: {}",
                nice_count(self.num_molecular_orbitals)
            )?;
            writeln!(f, "Active α electrons: {}", nice_count(self.num_alpha))?;
            writeln!(
                f,
                "Explicit active orbitals: {}",
                nice_indices(self.active_orbitals.as_ref())
            )?;
        }
        writeln!(
            f,
            "Occupation threshold: {:.3e}",
            self.occupation_threshold
        )?;
        writeln!(f)?;
        Ok(())
    }
}

/// An enumerated type for the resolved modes of active-space reduction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ActiveSpaceMode {
    /// Variant for freezing the core orbitals of the record, together with any additional
    /// orbitals to be removed. All remaining orbitals are active.
    FreezeCore { remove_orbitals: Vec<usize> },

    /// Variant for explicit sizing of the active space.
    Explicit {
        num_electrons: usize,
        num_orbitals: usize,
        num_alpha: Option<usize>,
        active_orbitals: Option<Vec<usize>>,
    },
}

// ---------
// Partition
// ---------

/// A partition of the molecular orbitals of a record into active and inactive sets, together with
/// the electrons retained in the active set.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OrbitalPartition {
    active: Vec<usize>,
    inactive: Vec<usize>,
    num_alpha: usize,
    num_beta: usize,
    num_inactive_electrons: usize,
}

impl OrbitalPartition {
    /// Constructs a partition from the active orbitals, the inactive set being their complement in
    /// `0..num_orbitals`.
    fn from_active(
        active: Vec<usize>,
        num_orbitals: usize,
        num_alpha: usize,
        num_beta: usize,
        num_inactive_electrons: usize,
    ) -> Self {
        let inactive = (0..num_orbitals)
            .filter(|i| !active.contains(i))
            .collect_vec();
        Self {
            active,
            inactive,
            num_alpha,
            num_beta,
            num_inactive_electrons,
        }
    }

    /// Returns the indices of the active orbitals, in the order they appear in the reduced record.
    pub fn active(&self) -> &Vec<usize> {
        &self.active
    }

    /// Returns the indices of the inactive orbitals in increasing order.
    pub fn inactive(&self) -> &Vec<usize> {
        &self.inactive
    }

    /// Returns the number of active $`\alpha`$ electrons.
    pub fn num_alpha(&self) -> usize {
        self.num_alpha
    }

    /// Returns the number of active $`\beta`$ electrons.
    pub fn num_beta(&self) -> usize {
        self.num_beta
    }

    /// Returns the number of active electrons.
    pub fn num_active_electrons(&self) -> usize {
        self.num_alpha + self.num_beta
    }

    /// Returns the number of inactive electrons.
    pub fn num_inactive_electrons(&self) -> usize {
        self.num_inactive_electrons
    }
}

impl fmt::Display for OrbitalPartition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_subtitle(f, "Orbital partition")?;
        writeln!(f, "Active orbitals: {}", nice_indices(Some(&self.active)))?;
        writeln!(f, "Inactive orbitals: {}", nice_indices(Some(&self.inactive)))?;
        writeln!(
            f,
            "Active electrons: {} (α: {}, β: {})",
            self.num_active_electrons(),
            self.num_alpha,
            self.num_beta
        )?;
        writeln!(f, "Inactive electrons: {}", self.num_inactive_electrons)?;
        Ok(())
    }
}

// -------
// Context
// -------

/// Quantities derived from one record and one partition, shared by all steps of a single
/// reduction.
struct ReductionContext<'a> {
    molecule: &'a MolecularIntegrals,
    partition: OrbitalPartition,

    /// Active coefficient columns, one matrix per spin space.
    c_active: Vec<Array2<f64>>,

    /// Active occupation numbers, one vector per spin space.
    occ_active: Vec<Array1<f64>>,

    /// Inactive density matrices in the atomic-orbital basis, one per spin space.
    density: Vec<Array2<f64>>,
}

impl<'a> ReductionContext<'a> {
    fn new(molecule: &'a MolecularIntegrals, partition: OrbitalPartition) -> Self {
        let occupations = molecule.occupations();
        let c_active = molecule
            .mo_coeff()
            .iter()
            .map(|c| c.select(Axis(1), &partition.active))
            .collect_vec();
        let occ_active = occupations
            .iter()
            .map(|occ| occ.select(Axis(0), &partition.active))
            .collect_vec();
        let density = molecule
            .mo_coeff()
            .iter()
            .zip(occupations.iter())
            .map(|(c, occ)| {
                let nbas = c.nrows();
                if partition.inactive.is_empty() {
                    Array2::zeros((nbas, nbas))
                } else {
                    let c_inactive = c.select(Axis(1), &partition.inactive);
                    let occ_inactive = occ.select(Axis(0), &partition.inactive);
                    (&c_inactive * &occ_inactive).dot(&c_inactive.t())
                }
            })
            .collect_vec();
        Self {
            molecule,
            partition,
            c_active,
            occ_active,
            density,
        }
    }

    /// Returns the per-spin one-electron matrices of the record in the atomic-orbital basis.
    fn hcore(&self) -> Vec<Array2<f64>> {
        (0..self.molecule.spin_channel().n_spin_spaces())
            .map(|ispin| self.molecule.hcore_for(ispin).clone())
            .collect()
    }

    /// Constructs the inactive Fock operator for a one-electron operator, one matrix per spin
    /// space. Without electron-repulsion integrals, the one-electron operator is returned as it
    /// is.
    fn inactive_fock(
        &self,
        one_body: &[Array2<f64>],
        eri: Option<&Array4<f64>>,
    ) -> Result<Vec<Array2<f64>>, anyhow::Error> {
        let Some(eri) = eri else {
            return Ok(one_body.to_vec());
        };
        match self.molecule.spin_channel() {
            SpinChannel::Restricted => {
                let j = coulomb(eri, &self.density[0])?;
                let k = exchange(eri, &self.density[0])?;
                Ok(vec![&one_body[0] + &j - 0.5 * &k])
            }
            SpinChannel::Unrestricted => {
                let j = coulomb(eri, &self.density[0])? + coulomb(eri, &self.density[1])?;
                let k_a = exchange(eri, &self.density[0])?;
                let k_b = exchange(eri, &self.density[1])?;
                Ok(vec![&one_body[0] + &j - k_a, &one_body[1] + &j - k_b])
            }
        }
    }

    /// Computes the energy of the inactive electrons,
    /// $`\tfrac{1}{2} \sum_{\sigma} \operatorname{tr}[\mathbf{D}^{\sigma}(\mathbf{h}^{\sigma} + \mathbf{F}^{\sigma})]`$.
    fn inactive_energy(
        &self,
        one_body: &[Array2<f64>],
        fock: &[Array2<f64>],
    ) -> Result<f64, anyhow::Error> {
        self.density
            .iter()
            .zip(one_body.iter().zip(fock.iter()))
            .map(|(d, (h, f))| trace_product(d, &(h + f)))
            .sum::<Result<f64, _>>()
            .map(|energy| 0.5 * energy)
    }

    /// Projects per-spin atomic-orbital operators onto the active orbitals.
    fn project_onee(&self, ops: &[Array2<f64>]) -> Vec<Array2<f64>> {
        ops.iter()
            .zip(self.c_active.iter())
            .map(|(op, c)| transform_onee(&op.view(), &c.view()))
            .collect()
    }

    /// Projects the electron-repulsion integrals onto the active orbitals.
    fn project_twoe(&self) -> Result<Vec<Array4<f64>>, anyhow::Error> {
        let eri = self.molecule.eri().view();
        let ca = self.c_active[0].view();
        match self.molecule.spin_channel() {
            SpinChannel::Restricted => Ok(vec![transform_twoe(&eri, [&ca, &ca, &ca, &ca])?]),
            SpinChannel::Unrestricted => {
                let cb = self.c_active[1].view();
                Ok(vec![
                    transform_twoe(&eri, [&ca, &ca, &ca, &ca])?,
                    transform_twoe(&eri, [&cb, &cb, &ca, &ca])?,
                    transform_twoe(&eri, [&cb, &cb, &cb, &cb])?,
                ])
            }
        }
    }

    /// Reduces one dipole component with the same procedure as the Hamiltonian, without any
    /// two-electron contribution.
    fn reduce_dipole(
        &self,
        dipole: &DipoleIntegrals,
        shift_name: &str,
    ) -> Result<DipoleIntegrals, anyhow::Error> {
        let ao_ints = vec![dipole.ao_ints().clone(); self.molecule.spin_channel().n_spin_spaces()];
        let fock = self.inactive_fock(&ao_ints, None)?;
        let shift = self.inactive_energy(&ao_ints, &fock)?;
        log::debug!("Inactive {}-dipole shift: {shift:+.10}", dipole.axis());
        let mut energy_shift = dipole.energy_shift().clone();
        *energy_shift.entry(shift_name.to_string()).or_insert(0.0) += shift;
        DipoleIntegrals::builder()
            .axis(dipole.axis())
            .ao_ints(fock[0].clone())
            .mo_ints(Some(self.project_onee(&fock)))
            .energy_shift(energy_shift)
            .build()
            .map_err(|err| format_err!(err))
    }

    /// Carries out the reduction and assembles the reduced record.
    fn reduce(&self, shift_name: &str) -> Result<MolecularIntegrals, anyhow::Error> {
        let mol = self.molecule;
        let hcore = self.hcore();
        let fock = self.inactive_fock(&hcore, Some(mol.eri()))?;
        let shift = self.inactive_energy(&hcore, &fock)?;
        log::debug!("Inactive energy shift: {shift:+.10}");

        let mo_onee_ints = self.project_onee(&fock);
        let mo_eri_ints = self.project_twoe()?;
        let dipoles = mol
            .dipoles()
            .iter()
            .map(|dipole| self.reduce_dipole(dipole, shift_name))
            .collect::<Result<Vec<_>, _>>()?;

        let core_orbitals = mol
            .core_orbitals()
            .iter()
            .filter_map(|core| self.partition.active.iter().position(|i| i == core))
            .sorted()
            .collect_vec();
        let orbital_energies = mol.orbital_energies().map(|energies| {
            energies
                .iter()
                .map(|e| e.select(Axis(0), &self.partition.active))
                .collect_vec()
        });
        // Repeated reductions under the same name accumulate their shifts.
        let mut energy_shift = mol.energy_shift().clone();
        *energy_shift.entry(shift_name.to_string()).or_insert(0.0) += shift;

        let (num_alpha, num_beta) = (self.partition.num_alpha, self.partition.num_beta);
        MolecularIntegrals::builder()
            .spin_channel(mol.spin_channel())
            .nuclear_repulsion_energy(mol.nuclear_repulsion_energy())
            .num_alpha(num_alpha)
            .num_beta(num_beta)
            .multiplicity(num_alpha.abs_diff(num_beta) + 1)
            .core_orbitals(core_orbitals)
            .hcore(fock)
            .eri(mol.eri().clone())
            .mo_coeff(self.c_active.clone())
            .mo_occ(Some(self.occ_active.clone()))
            .orbital_energies(orbital_energies)
            .mo_onee_ints(Some(mo_onee_ints))
            .mo_eri_ints(Some(mo_eri_ints))
            .dipoles(dipoles)
            .energy_shift(energy_shift)
            .build()
            .map_err(|err| format_err!(err))
    }
}

// -----------
// Transformer
// -----------

/// A structure for the reduction of molecular integral records onto an active space.
#[derive(Clone, Debug)]
pub struct ActiveSpaceTransformer {
    params: ActiveSpaceParams,
}

impl ActiveSpaceTransformer {
    /// Creates a new transformer from control parameters.
    pub fn new(params: ActiveSpaceParams) -> Self {
        Self { params }
    }

    /// Returns the control parameters of this transformer.
    pub fn params(&self) -> &ActiveSpaceParams {
        &self.params
    }

    /// Validates the control parameters against a record and partitions its orbitals.
    ///
    /// # Errors
    ///
    /// Errors with [`crate::integrals::DimensionError`] if the record's arrays or core indices
    /// disagree with its orbital count, with [`ConfigurationError`] if no unique mode can be
    /// resolved, and with [`ActiveSpaceError`] if the requested active space is incompatible with
    /// the record.
    pub fn partition(
        &self,
        molecule: &MolecularIntegrals,
    ) -> Result<OrbitalPartition, anyhow::Error> {
        molecule.check_dimensions()?;
        match self.params.mode()? {
            ActiveSpaceMode::FreezeCore { remove_orbitals } => {
                self.partition_freeze_core(molecule, &remove_orbitals)
            }
            ActiveSpaceMode::Explicit {
                num_electrons,
                num_orbitals,
                num_alpha,
                active_orbitals,
            } => self.partition_explicit(
                molecule,
                num_electrons,
                num_orbitals,
                num_alpha,
                active_orbitals,
            ),
        }
    }

    fn partition_explicit(
        &self,
        molecule: &MolecularIntegrals,
        num_electrons: usize,
        num_orbitals: usize,
        num_alpha: Option<usize>,
        active_orbitals: Option<Vec<usize>>,
    ) -> Result<OrbitalPartition, anyhow::Error> {
        let total_orbitals = molecule.num_orbitals();
        let inactive_electrons = molecule.num_electrons() as isize - num_electrons as isize;
        if inactive_electrons < 0 || inactive_electrons % 2 != 0 {
            return Err(ActiveSpaceError(format!(
                "inactive electrons must be non-negative and even, but {} total and {num_electrons} active electrons leave {inactive_electrons}",
                molecule.num_electrons()
            ))
            .into());
        }
        let inactive_electrons = inactive_electrons as usize;
        let num_inactive_orbitals = inactive_electrons / 2;
        if num_orbitals + num_inactive_orbitals > total_orbitals {
            return Err(ActiveSpaceError(format!(
                "more orbitals requested than available: {num_orbitals} active and {num_inactive_orbitals} inactive orbitals exceed the {total_orbitals} available"
            ))
            .into());
        }

        let (num_alpha, num_beta) = self.split_active_electrons(molecule, num_electrons, num_alpha)?;
        if num_alpha > num_orbitals || num_beta > num_orbitals {
            return Err(ActiveSpaceError(format!(
                "{num_alpha} α and {num_beta} β electrons cannot be accommodated in {num_orbitals} active orbitals"
            ))
            .into());
        }

        let active = match active_orbitals {
            Some(active_orbitals) => {
                if active_orbitals.len() != num_orbitals {
                    return Err(ActiveSpaceError(format!(
                        "the number of explicit active orbitals ({}) does not match the number of requested active orbitals ({num_orbitals})",
                        active_orbitals.len()
                    ))
                    .into());
                }
                if let Some(max_index) = active_orbitals.iter().max() {
                    if *max_index >= total_orbitals {
                        return Err(ActiveSpaceError(format!(
                            "active orbital index {max_index} is out of range for {total_orbitals} orbitals"
                        ))
                        .into());
                    }
                }
                if !active_orbitals.iter().all_unique() {
                    return Err(ActiveSpaceError(format!(
                        "explicit active orbitals {} contain duplicates",
                        nice_indices(Some(&active_orbitals))
                    ))
                    .into());
                }
                let occupied = molecule
                    .total_occupations()
                    .select(Axis(0), &active_orbitals)
                    .sum();
                if (occupied - num_electrons as f64).abs() > self.params.occupation_threshold {
                    return Err(ActiveSpaceError(format!(
                        "the explicit active orbitals hold {occupied} electrons, but {num_electrons} active electrons were requested"
                    ))
                    .into());
                }
                active_orbitals
            }
            None => (num_inactive_orbitals..num_inactive_orbitals + num_orbitals).collect_vec(),
        };

        Ok(OrbitalPartition::from_active(
            active,
            total_orbitals,
            num_alpha,
            num_beta,
            inactive_electrons,
        ))
    }

    fn partition_freeze_core(
        &self,
        molecule: &MolecularIntegrals,
        remove_orbitals: &[usize],
    ) -> Result<OrbitalPartition, anyhow::Error> {
        let total_orbitals = molecule.num_orbitals();
        if let Some(max_index) = remove_orbitals.iter().max() {
            if *max_index >= total_orbitals {
                return Err(ActiveSpaceError(format!(
                    "removed orbital index {max_index} is out of range for {total_orbitals} orbitals"
                ))
                .into());
            }
        }
        let occupations = molecule.total_occupations();
        let removed_occupation = remove_orbitals
            .iter()
            .filter(|&i| !molecule.core_orbitals().contains(i))
            .unique()
            .map(|&i| occupations[i])
            .sum::<f64>();
        if removed_occupation.abs() > self.params.occupation_threshold {
            log::debug!(
                "Removed orbitals carry {removed_occupation} electrons, which are treated as inactive."
            );
        }

        let inactive = molecule
            .core_orbitals()
            .iter()
            .chain(remove_orbitals.iter())
            .copied()
            .unique()
            .collect_vec();
        let inactive_occupation = inactive.iter().map(|&i| occupations[i]).sum::<f64>();
        let inactive_electrons = inactive_occupation.round();
        ensure!(
            (inactive_occupation - inactive_electrons).abs() <= self.params.occupation_threshold,
            ActiveSpaceError(format!(
                "the frozen orbitals hold a non-integral number of electrons ({inactive_occupation})"
            ))
        );
        let inactive_electrons = inactive_electrons as usize;
        if inactive_electrons > molecule.num_electrons() || inactive_electrons % 2 != 0 {
            return Err(ActiveSpaceError(format!(
                "inactive electrons must be non-negative and even, but the frozen orbitals hold {inactive_electrons}"
            ))
            .into());
        }

        let num_electrons = molecule.num_electrons() - inactive_electrons;
        let (num_alpha, num_beta) = self.split_active_electrons(molecule, num_electrons, None)?;
        let active = (0..total_orbitals)
            .filter(|i| !inactive.contains(i))
            .collect_vec();
        if num_alpha > active.len() || num_beta > active.len() {
            return Err(ActiveSpaceError(format!(
                "{num_alpha} α and {num_beta} β electrons cannot be accommodated in {} active orbitals",
                active.len()
            ))
            .into());
        }
        Ok(OrbitalPartition::from_active(
            active,
            total_orbitals,
            num_alpha,
            num_beta,
            inactive_electrons,
        ))
    }

    /// Splits the active electrons into $`\alpha`$ and $`\beta`$ counts. An explicit
    /// $`\alpha`$ count is honoured for spin-unrestricted records only; otherwise all unpaired
    /// electrons implied by the spin multiplicity are taken to be $`\alpha`$.
    fn split_active_electrons(
        &self,
        molecule: &MolecularIntegrals,
        num_electrons: usize,
        num_alpha: Option<usize>,
    ) -> Result<(usize, usize), anyhow::Error> {
        match (molecule.spin_channel(), num_alpha) {
            (SpinChannel::Unrestricted, Some(num_alpha)) => {
                ensure!(
                    num_alpha <= num_electrons,
                    ActiveSpaceError(format!(
                        "{num_alpha} active α electrons exceed the {num_electrons} active electrons"
                    ))
                );
                Ok((num_alpha, num_electrons - num_alpha))
            }
            (spin_channel, num_alpha) => {
                if let (SpinChannel::Restricted, Some(num_alpha)) = (spin_channel, num_alpha) {
                    qredux_warn!(
                        "`num_alpha` = {num_alpha} has no effect on a spin-restricted record and will be ignored."
                    );
                }
                let num_unpaired = molecule.multiplicity().saturating_sub(1);
                ensure!(
                    num_unpaired <= num_electrons && (num_electrons - num_unpaired) % 2 == 0,
                    ActiveSpaceError(format!(
                        "{num_electrons} active electrons are incompatible with spin multiplicity {}",
                        molecule.multiplicity()
                    ))
                );
                let num_beta = (num_electrons - num_unpaired) / 2;
                Ok((num_electrons - num_beta, num_beta))
            }
        }
    }

    /// Reduces a record, recording the energy shifts under the given name.
    pub(crate) fn reduce(
        &self,
        molecule: &MolecularIntegrals,
        shift_name: &str,
    ) -> Result<MolecularIntegrals, anyhow::Error> {
        let partition = self.partition(molecule)?;
        log::debug!("Active orbitals: {}", nice_indices(Some(partition.active())));
        log::debug!("Inactive orbitals: {}", nice_indices(Some(partition.inactive())));
        ReductionContext::new(molecule, partition).reduce(shift_name)
    }
}

impl OrbitalReducer for ActiveSpaceTransformer {
    fn name(&self) -> &'static str {
        "ActiveSpaceTransformer"
    }

    fn transform(&self, molecule: &MolecularIntegrals) -> Result<MolecularIntegrals, anyhow::Error> {
        self.reduce(molecule, self.name())
    }
}

// =========
// Functions
// =========

/// Computes the Coulomb matrix $`J_{kl} = \sum_{ij} (ij|kl) D_{ji}`$.
fn coulomb(eri: &Array4<f64>, density: &Array2<f64>) -> Result<Array2<f64>, anyhow::Error> {
    Ok(einsum("ijkl,ji->kl", &[eri, density])
        .map_err(|err| format_err!(err))?
        .into_dimensionality::<Ix2>()?)
}

/// Computes the exchange matrix $`K_{il} = \sum_{jk} (ij|kl) D_{jk}`$.
fn exchange(eri: &Array4<f64>, density: &Array2<f64>) -> Result<Array2<f64>, anyhow::Error> {
    Ok(einsum("ijkl,jk->il", &[eri, density])
        .map_err(|err| format_err!(err))?
        .into_dimensionality::<Ix2>()?)
}

/// Computes $`\operatorname{tr}(\mathbf{A}\mathbf{B})`$.
fn trace_product(a: &Array2<f64>, b: &Array2<f64>) -> Result<f64, anyhow::Error> {
    einsum("ij,ji->", &[a, b])
        .map_err(|err| format_err!(err))?
        .into_dimensionality::<Ix0>()?
        .into_iter()
        .next()
        .ok_or_else(|| format_err!("Unable to extract the result of the einsum contraction."))
}
