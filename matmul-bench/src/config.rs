use crate::error::ConfigError;
use std::path::PathBuf;

/// Problem size: `C (m×n) = A (m×k) · B (k×n)`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Dims {
    pub m: u32,
    pub k: u32,
    pub n: u32,
}

/// Widest tile edge of any kernel in the library.
const TILE_ALIGN: u32 = 32;

impl Dims {
    /// Accepts each dimension if it is at most 32 or an exact multiple of 32,
    /// and small enough to be passed to the kernels as `unsigned short`.
    pub fn new(m: u32, k: u32, n: u32) -> Result<Self, ConfigError> {
        for (axis, value) in [('M', m), ('K', k), ('N', n)] {
            if value == 0 {
                return Err(ConfigError::ZeroDimension { axis });
            }
            if value > TILE_ALIGN && value % TILE_ALIGN != 0 {
                return Err(ConfigError::Misaligned { axis, value });
            }
            if value > u16::MAX as u32 {
                return Err(ConfigError::TooLarge { axis, value });
            }
        }
        Ok(Self { m, k, n })
    }

    /// Floating-point operations of one multiplication.
    #[inline]
    pub fn flops(&self) -> f64 {
        2. * self.m as f64 * self.k as f64 * self.n as f64
    }

    /// `(M, N, K)` in the order and width the kernels take them.
    #[inline]
    pub fn narrow(&self) -> (u16, u16, u16) {
        (self.m as _, self.n as _, self.k as _)
    }

    #[inline]
    pub fn a_len(&self) -> usize {
        self.m as usize * self.k as usize
    }

    #[inline]
    pub fn b_len(&self) -> usize {
        self.k as usize * self.n as usize
    }

    #[inline]
    pub fn c_len(&self) -> usize {
        self.m as usize * self.n as usize
    }
}

#[derive(Clone, Debug)]
pub struct BenchConfig {
    pub m: u32,
    pub k: u32,
    pub n: u32,
    /// Identical dispatches enqueued per timed batch.
    pub iterations: usize,
    /// Timed batches per run; each prints its own report line.
    pub samples: usize,
    /// Runs issued by one `profile` call.
    pub profile_runs: usize,
    /// Untimed batches before the first sample.
    pub warmup: usize,
    /// Seed for the operands. `None` draws from the thread rng.
    pub seed: Option<u64>,
    /// Replacement kernel library. `None` uses the bundled one.
    pub kernels: Option<PathBuf>,
    /// Largest accepted absolute difference. `None` requires exact equality.
    pub tolerance: Option<f32>,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            m: 16,
            k: 16,
            n: 16,
            iterations: 10,
            samples: 10,
            profile_runs: 200,
            warmup: 0,
            seed: None,
            kernels: None,
            tolerance: None,
        }
    }
}

impl BenchConfig {
    pub fn dims(&self) -> Result<Dims, ConfigError> {
        Dims::new(self.m, self.k, self.n)
    }

    pub fn validate(&self) -> Result<Dims, ConfigError> {
        for (field, value) in [
            ("iterations", self.iterations),
            ("samples", self.samples),
            ("profile runs", self.profile_runs),
        ] {
            if value == 0 {
                return Err(ConfigError::ZeroCount { field });
            }
        }
        self.dims()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_accepts_small_and_aligned() {
        for v in (1..=32).chain([64, 96, 128, 1024, 4096]) {
            assert!(Dims::new(v, v, v).is_ok(), "{v}");
        }
        assert!(Dims::new(16, 64, 7).is_ok());
    }

    #[test]
    fn test_rejects_misaligned() {
        assert_eq!(
            Dims::new(33, 16, 16),
            Err(ConfigError::Misaligned {
                axis: 'M',
                value: 33
            })
        );
        assert!(matches!(
            Dims::new(16, 48, 16),
            Err(ConfigError::Misaligned { axis: 'K', .. })
        ));
        assert!(matches!(
            Dims::new(16, 16, 100),
            Err(ConfigError::Misaligned { axis: 'N', .. })
        ));
    }

    #[test]
    fn test_rejects_zero_and_oversized() {
        assert_eq!(
            Dims::new(0, 16, 16),
            Err(ConfigError::ZeroDimension { axis: 'M' })
        );
        assert!(matches!(
            Dims::new(16, 16, 65536),
            Err(ConfigError::TooLarge { axis: 'N', .. })
        ));
        assert!(Dims::new(65504, 16, 16).is_ok());
    }

    #[test]
    fn test_narrow_order() {
        let dims = Dims::new(64, 32, 96).unwrap();
        assert_eq!(dims.narrow(), (64, 96, 32));
        assert_eq!(dims.flops(), 2. * 64. * 32. * 96.);
        assert_eq!((dims.a_len(), dims.b_len(), dims.c_len()), (2048, 3072, 6144));
    }

    #[test]
    fn test_default_is_reference_behaviour() {
        let config = BenchConfig::default();
        assert_eq!(config.validate(), Dims::new(16, 16, 16));
        assert_eq!(
            (config.iterations, config.samples, config.profile_runs),
            (10, 10, 200)
        );

        let config = BenchConfig {
            samples: 0,
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::ZeroCount { field: "samples" })
        );
    }
}
