//! Interfaces between QRedux and its users.

use anyhow;

pub mod cli;
pub mod input;

/// Trait for handling an input specification.
pub trait InputHandle {
    /// Handles the input specification and runs the requested reductions.
    fn handle(&self) -> Result<(), anyhow::Error>;
}
