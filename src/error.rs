//! Recoverable errors reported by the estimators and problem constructors.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EstimationError {
    #[error("problem reports a minimal sample size of zero")]
    EmptyMinimalSample,
    #[error("expected at least {required} samples but got {available}")]
    NotEnoughSamples { available: usize, required: usize },
    #[error("expected a finite, positive threshold but got: {threshold}")]
    InvalidThreshold { threshold: f64 },
    #[error("no trial produced a valid model after {iterations} iterations")]
    NoValidModel { iterations: usize },
    #[error("expected an Nx{expected} matrix but got {rows}x{cols}")]
    InvalidDimensions {
        expected: usize,
        rows: usize,
        cols: usize,
    },
    #[error("coordinate slices differ in length: {lengths:?}")]
    LengthMismatch { lengths: Vec<usize> },
}
