//! Dispatches a family of single-precision matmul kernels to a GPU, times
//! them and checks their output against a baseline kernel.

pub mod config;
pub mod engine;
pub mod error;
pub mod geometry;
pub mod manager;
pub mod matrix;
pub mod reference;
pub mod variant;
pub mod verify;

#[cfg(detected_cuda)]
pub mod cuda_backend;

#[cfg(test)]
mod host;

pub use config::{BenchConfig, Dims};
pub use engine::{Backend, Engine, Sample};
pub use error::{ConfigError, DispatchError, SetupError};
pub use manager::{BenchManager, RunOutcome, State};
pub use matrix::{Matrix, Operands};
pub use variant::Variant;
pub use verify::Verdict;
