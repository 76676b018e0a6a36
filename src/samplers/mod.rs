//! Minimal-sample strategies.
//!
//! Every sampler implements the shared [`Sampler`](crate::core::Sampler)
//! trait; the estimators only ever need duplicate-free uniform draws.

pub mod uniform;

pub use uniform::UniformRandomSampler;
