//! Error taxonomy of the harness.
//!
//! [`ConfigError`] and [`SetupError`] end the process. [`DispatchError`] only
//! aborts the dispatch that raised it.

use thiserror::Error;

#[derive(Error, Clone, PartialEq, Eq, Debug)]
pub enum ConfigError {
    #[error("{axis} must be greater than zero")]
    ZeroDimension { axis: char },

    #[error("if M, K, N are greater than 32, they must be divisible by 32 ({axis} = {value})")]
    Misaligned { axis: char, value: u32 },

    #[error("{axis} = {value} does not fit the kernels' 16-bit dimension arguments")]
    TooLarge { axis: char, value: u32 },

    #[error("{field} must be at least 1")]
    ZeroCount { field: &'static str },
}

#[derive(Error, Debug)]
pub enum SetupError {
    #[error("no CUDA device found")]
    NoDevice,

    #[error("failed to read kernel library {path}: {source}")]
    KernelSource {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to compile kernel library: {0}")]
    Compile(String),

    #[error("failed to load kernel module: {0}")]
    ModuleLoad(String),

    #[error("reference computation failed: {0}")]
    Reference(#[from] DispatchError),
}

#[derive(Error, Clone, PartialEq, Eq, Debug)]
pub enum DispatchError {
    #[error("failed to obtain kernel {entry}: {reason}")]
    KernelNotFound { entry: String, reason: String },

    #[error(
        "block size {block} of {kernel} exceeds the kernel's max threads per block ({max}), try reducing the occupancy"
    )]
    BlockTooLarge {
        kernel: &'static str,
        block: u32,
        max: u32,
    },

    #[error(
        "block size {block} of {kernel} does not match its cooperative load footprint (A tile {a_tile}, B tile {b_tile})"
    )]
    CooperativeLoadMismatch {
        kernel: &'static str,
        block: u32,
        a_tile: u32,
        b_tile: u32,
    },

    #[error("failed to launch {kernel}: {reason}")]
    Launch { kernel: &'static str, reason: String },
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_messages() {
        let e = ConfigError::Misaligned {
            axis: 'M',
            value: 33,
        };
        assert_eq!(
            e.to_string(),
            "if M, K, N are greater than 32, they must be divisible by 32 (M = 33)"
        );

        let e = DispatchError::BlockTooLarge {
            kernel: "naive",
            block: 2048,
            max: 1024,
        };
        assert!(e.to_string().contains("2048"));

        let e = SetupError::from(DispatchError::KernelNotFound {
            entry: "matmul_reference".into(),
            reason: "not found".into(),
        });
        assert!(matches!(e, SetupError::Reference(_)));
    }
}
