//! Transcorrelated Hamiltonians.

use anyhow;

use crate::integrals::MolecularIntegrals;
use crate::transformers::{NotSupportedError, OrbitalReducer};

/// A transformer for similarity-transformed (transcorrelated) Hamiltonians. No transformation is
/// implemented: every request fails with [`NotSupportedError`].
#[derive(Clone, Debug, Default)]
pub struct TranscorrelatedTransformer;

impl OrbitalReducer for TranscorrelatedTransformer {
    fn name(&self) -> &'static str {
        "TranscorrelatedTransformer"
    }

    fn transform(&self, _: &MolecularIntegrals) -> Result<MolecularIntegrals, anyhow::Error> {
        Err(NotSupportedError(
            "transcorrelated transformations are not implemented".to_string(),
        )
        .into())
    }
}
