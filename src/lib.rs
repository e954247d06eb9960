//! # QRedux: Active-Space Reduction of Molecular Hamiltonians
//!
//! QRedux takes the integrals of a molecular electronic Hamiltonian, as produced by an external
//! quantum-chemistry driver, and
//! - reduces them onto an active space of molecular orbitals, folding the electrons in the
//!   inactive orbitals into an effective one-electron operator and a constant energy shift, and
//! - builds the corresponding second-quantised Hamiltonian as a canonical sum of fermionic
//!   ladder-operator strings, ready to be mapped onto qubits.
//!
//! The same reduction is applied to every Cartesian component of the electric dipole moment that
//! accompanies the integrals.
//!
//! ## Getting started
//!
//! A molecular integral record ([`integrals::MolecularIntegrals`]) is reduced by any
//! [`transformers::OrbitalReducer`]:
//! - [`transformers::active_space::ActiveSpaceTransformer`], controlled by
//!   [`transformers::active_space::ActiveSpaceParams`], for an explicitly sized active space or
//!   for frozen core orbitals, and
//! - [`transformers::freeze_core::FreezeCoreTransformer`] for frozen core orbitals only.
//!
//! The fermionic Hamiltonian of a (reduced) record is obtained with
//! [`operators::builder::build_fermionic_op`].
//!
//! The `qredux` binary drives both steps from a YAML input file. See
//! [`interfaces::input::Input`] for the available input parameters.
//!
//! ## Examples and usage
//!
//! For most items (structs, enums, functions, and traits), their usages are illustrated in test
//! functions.
//!
//! ## License
//!
//! GNU Lesser General Public License v3.0.

pub mod integrals;
pub mod interfaces;
pub mod io;
pub mod operators;
pub mod transformers;
