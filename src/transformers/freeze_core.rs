//! Freezing of core orbitals.

use anyhow;

use crate::integrals::MolecularIntegrals;
use crate::transformers::active_space::{
    ActiveSpaceParams, ActiveSpaceTransformer, OrbitalPartition,
};
use crate::transformers::OrbitalReducer;

#[cfg(test)]
#[path = "freeze_core_tests.rs"]
mod freeze_core_tests;

/// A structure for removing the core orbitals of a record, and optionally some further
/// orbitals, from the orbital space.
///
/// The core orbitals are taken from [`MolecularIntegrals::core_orbitals`]. Their electrons are
/// folded into the inactive Fock operator exactly as in [`ActiveSpaceTransformer`], and the
/// resulting energy shift is recorded under the name of this transformer.
#[derive(Clone, Debug)]
pub struct FreezeCoreTransformer {
    active_space: ActiveSpaceTransformer,
}

impl FreezeCoreTransformer {
    /// Creates a new transformer.
    ///
    /// # Arguments
    ///
    /// * `remove_orbitals` - Indices of additional orbitals to be removed alongside the core
    /// orbitals.
    pub fn new(remove_orbitals: Vec<usize>) -> Self {
        Self {
            active_space: ActiveSpaceTransformer::new(ActiveSpaceParams {
                freeze_core: true,
                remove_orbitals,
                ..ActiveSpaceParams::default()
            }),
        }
    }

    /// Sets the threshold for comparing summed occupation numbers against integral electron
    /// counts.
    pub fn with_occupation_threshold(mut self, occupation_threshold: f64) -> Self {
        let params = ActiveSpaceParams {
            occupation_threshold,
            ..self.active_space.params().clone()
        };
        self.active_space = ActiveSpaceTransformer::new(params);
        self
    }

    /// Returns the indices of the additional orbitals to be removed.
    pub fn remove_orbitals(&self) -> &Vec<usize> {
        &self.active_space.params().remove_orbitals
    }

    /// Partitions the orbitals of a record into the frozen and the remaining ones.
    pub fn partition(
        &self,
        molecule: &MolecularIntegrals,
    ) -> Result<OrbitalPartition, anyhow::Error> {
        self.active_space.partition(molecule)
    }
}

impl Default for FreezeCoreTransformer {
    fn default() -> Self {
        Self::new(vec![])
    }
}

impl OrbitalReducer for FreezeCoreTransformer {
    fn name(&self) -> &'static str {
        "FreezeCoreTransformer"
    }

    fn transform(&self, molecule: &MolecularIntegrals) -> Result<MolecularIntegrals, anyhow::Error> {
        self.active_space.reduce(molecule, self.name())
    }
}
