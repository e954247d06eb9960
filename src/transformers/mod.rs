//! Transformations that reduce the orbital space of molecular integral records.

use std::error::Error;
use std::fmt;

use anyhow;

use crate::integrals::MolecularIntegrals;

pub mod active_space;
pub mod freeze_core;
pub mod transcorrelated;

// ================
// Trait definition
// ================

/// A trait for transformations that take in a molecular integral record and produce a new,
/// reduced one without modifying the original.
pub trait OrbitalReducer {
    /// The name under which energy shifts arising from this transformation are recorded.
    fn name(&self) -> &'static str;

    /// Transforms a molecular integral record.
    ///
    /// # Arguments
    ///
    /// * `molecule` - The record to be transformed.
    ///
    /// # Returns
    ///
    /// A freshly constructed reduced record, or an error if the requested reduction is invalid.
    fn transform(&self, molecule: &MolecularIntegrals) -> Result<MolecularIntegrals, anyhow::Error>;
}

// ==================
// Error definitions
// ==================

/// Error raised when a reduction configuration is underspecified or contradictory.
#[derive(Debug, Clone)]
pub struct ConfigurationError(pub String);

impl fmt::Display for ConfigurationError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Configuration error: {}.", self.0)
    }
}

impl Error for ConfigurationError {}

/// Error raised when a numeric constraint on the requested active space is violated.
#[derive(Debug, Clone)]
pub struct ActiveSpaceError(pub String);

impl fmt::Display for ActiveSpaceError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Active-space error: {}.", self.0)
    }
}

impl Error for ActiveSpaceError {}

/// Error raised by capabilities that have no implementation.
#[derive(Debug, Clone)]
pub struct NotSupportedError(pub String);

impl fmt::Display for NotSupportedError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Not supported: {}.", self.0)
    }
}

impl Error for NotSupportedError {}
