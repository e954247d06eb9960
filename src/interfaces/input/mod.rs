//! YAML input specification for the `qredux` binary.

use std::path::PathBuf;

use anyhow::{self, Context};
use serde::{Deserialize, Serialize};

use crate::integrals::MolecularIntegrals;
use crate::interfaces::InputHandle;
use crate::io::format::{log_subtitle, log_title, nice_bool, qredux_output, QReduxOutput};
use crate::io::{read_qredux_record, write_qredux_binary, write_qredux_yaml, QReduxFileType};
use crate::operators::builder::build_fermionic_op;
use crate::operators::fermionic_op::FermionicOp;
use crate::transformers::active_space::{
    ActiveSpaceMode, ActiveSpaceParams, ActiveSpaceTransformer, OrbitalPartition,
};
use crate::transformers::freeze_core::FreezeCoreTransformer;
use crate::transformers::OrbitalReducer;


/// A structure containing `QRedux` input parameters which can be serialised into and deserialised
/// from a YAML input file.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Input {
    /// Path to the molecular integral record. Files ending in `.qredux.mol` are read as
    /// `bincode` records and all others as YAML.
    pub molecule: PathBuf,

    /// Specification for active-space reduction. If `None`, the record is used as read in.
    ///
    /// # Default
    ///
    /// If not specified, this will be taken to be `None`.
    #[serde(default)]
    pub active_space: Option<ActiveSpaceParams>,

    /// Name of a YAML file (without extension) to which the reduced record is written.
    #[serde(default)]
    pub reduced_molecule_save_name: Option<PathBuf>,

    /// Boolean indicating if the fermionic Hamiltonian of the (reduced) record is to be built and
    /// logged.
    #[serde(default)]
    pub build_fermionic_op: bool,

    /// Name of a [`QReduxFileType::Op`] binary file to which the fermionic Hamiltonian is
    /// written. The `.qredux.op` extension is appended if missing.
    #[serde(default)]
    pub fermionic_op_save_name: Option<PathBuf>,
}

impl Default for Input {
    fn default() -> Self {
        Input {
            molecule: PathBuf::from("path/to/molecule.yml"),
            active_space: Some(ActiveSpaceParams::default()),
            reduced_molecule_save_name: None,
            build_fermionic_op: true,
            fermionic_op_save_name: None,
        }
    }
}

/// The results of handling an [`Input`].
#[derive(Clone, Debug)]
pub struct InputOutcome {
    /// The record after any requested reduction.
    pub molecule: MolecularIntegrals,

    /// The fermionic Hamiltonian of [`Self::molecule`], if requested.
    pub fermionic_op: Option<FermionicOp>,
}

/// The reducer selected by the active-space parameters of an input.
enum InputReducer {
    ActiveSpace(ActiveSpaceTransformer),
    FreezeCore(FreezeCoreTransformer),
}

impl InputReducer {
    fn from_params(params: &ActiveSpaceParams) -> Result<Self, anyhow::Error> {
        match params.mode()? {
            ActiveSpaceMode::FreezeCore { remove_orbitals } => Ok(InputReducer::FreezeCore(
                FreezeCoreTransformer::new(remove_orbitals)
                    .with_occupation_threshold(params.occupation_threshold),
            )),
            ActiveSpaceMode::Explicit { .. } => Ok(InputReducer::ActiveSpace(
                ActiveSpaceTransformer::new(params.clone()),
            )),
        }
    }

    fn partition(&self, molecule: &MolecularIntegrals) -> Result<OrbitalPartition, anyhow::Error> {
        match self {
            InputReducer::ActiveSpace(transformer) => transformer.partition(molecule),
            InputReducer::FreezeCore(transformer) => transformer.partition(molecule),
        }
    }

    fn reducer(&self) -> &dyn OrbitalReducer {
        match self {
            InputReducer::ActiveSpace(transformer) => transformer,
            InputReducer::FreezeCore(transformer) => transformer,
        }
    }
}

impl Input {
    /// Reads in the molecular integral record, reduces it and builds its fermionic Hamiltonian
    /// as requested, logging along the way.
    pub fn process(&self) -> Result<InputOutcome, anyhow::Error> {
        log_title("Molecular Integrals");
        qredux_output!("");
        let molecule =
            read_qredux_record::<MolecularIntegrals, _>(&self.molecule, QReduxFileType::Mol)
                .with_context(|| {
                    format!(
                        "Unable to read the molecular integral record `{}`",
                        self.molecule.display()
                    )
                })?;
        molecule
            .check_dimensions()
            .with_context(|| "Inconsistent molecular integral record")?;
        qredux_output!("Source: {}", self.molecule.display());
        molecule.log_output_display();
        qredux_output!("");

        let molecule = if let Some(params) = self.active_space.as_ref() {
            params.log_output_display();
            let input_reducer = InputReducer::from_params(params)?;
            let partition = input_reducer.partition(&molecule)?;
            partition.log_output_display();
            qredux_output!("");

            let reducer = input_reducer.reducer();
            let reduced = reducer.transform(&molecule).with_context(|| {
                format!("Unable to reduce the molecular integral record with `{}`", reducer.name())
            })?;
            log_subtitle("Reduced molecular integrals");
            reduced.log_output_display();
            for dipole in reduced.dipoles().iter() {
                for (name, shift) in dipole.energy_shift().iter() {
                    qredux_output!("Dipole {} shift ({name}): {shift:+.10}", dipole.axis());
                }
            }
            qredux_output!("");

            if let Some(name) = self.reduced_molecule_save_name.as_ref() {
                write_qredux_yaml(name, &reduced).with_context(|| {
                    format!("Unable to write the reduced record to `{}`", name.display())
                })?;
                qredux_output!(
                    "Reduced record written to `{}.yml`.",
                    name.display()
                );
                qredux_output!("");
            }
            reduced
        } else {
            molecule
        };

        qredux_output!(
            "Fermionic operator requested: {}",
            nice_bool(self.build_fermionic_op)
        );
        qredux_output!("");
        let fermionic_op = if self.build_fermionic_op {
            let op = build_fermionic_op(&molecule)
                .with_context(|| "Unable to build the fermionic Hamiltonian")?;
            log_title("Fermionic Hamiltonian");
            qredux_output!("");
            qredux_output!(
                "Number of spin orbitals: {}",
                op.register_length()
            );
            qredux_output!("Number of terms: {}", op.len());
            qredux_output!("");
            op.log_output_display();
            qredux_output!("");
            if let Some(name) = self.fermionic_op_save_name.as_ref() {
                write_qredux_binary(name, QReduxFileType::Op, &op).with_context(|| {
                    format!("Unable to write the fermionic Hamiltonian to `{}`", name.display())
                })?;
                qredux_output!(
                    "Fermionic Hamiltonian written to `{}`.",
                    QReduxFileType::Op.path_for(name).display()
                );
                qredux_output!("");
            }
            Some(op)
        } else {
            None
        };

        Ok(InputOutcome {
            molecule,
            fermionic_op,
        })
    }
}

impl InputHandle for Input {
    fn handle(&self) -> Result<(), anyhow::Error> {
        self.process().map(|_| ())
    }
}
