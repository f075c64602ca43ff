//! Error types shared by the simulation engine and the sweep driver

use serde::Serialize;
use thiserror::Error;

/// Error raised for a single simulation run.
///
/// These never abort a sweep: the sampler stores them in the failing run's
/// result slot and carries on with the others.
#[derive(Debug, Clone, PartialEq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SimError {
    /// A parameter violates its domain (zero dimension, probability outside
    /// [0, 1], non-positive temperature, non-finite coupling, ...)
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },
}

impl SimError {
    pub(crate) fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        SimError::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }
}

/// Error raised while setting up or driving a whole sweep
#[derive(Debug, Error)]
pub enum SweepError {
    #[error("sweep configuration is invalid: {0}")]
    InvalidSweep(String),

    #[error("failed to build worker pool")]
    Pool(#[from] rayon::ThreadPoolBuildError),
}
