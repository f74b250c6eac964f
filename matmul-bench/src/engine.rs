//! Dispatch and timing of one kernel descriptor.

use crate::{config::Dims, error::DispatchError, geometry::KernelDescriptor};
use std::{fmt, time::Duration};

/// The device side of a session: a loaded kernel library plus the bound
/// A, B and C buffers.
pub trait Backend {
    type Kernel<'a>
    where
        Self: 'a;

    /// Looks up a kernel entry point. Does no GPU work.
    fn resolve(&self, entry_point: &str) -> Result<Self::Kernel<'_>, DispatchError>;

    fn max_threads_per_block(&self, kernel: &Self::Kernel<'_>) -> u32;

    /// Binds A, B, C and `(M, N, K)`, enqueues `iterations` launches on a fresh
    /// submission unit and blocks until they complete. Returns wall-clock time
    /// from just before the first launch to completion.
    fn submit(
        &self,
        kernel: &Self::Kernel<'_>,
        launch: &KernelDescriptor,
        dims: Dims,
        iterations: usize,
    ) -> Result<Duration, DispatchError>;

    /// Copies the device-resident C into `out`.
    fn read_output(&self, out: &mut [f32]);
}

/// One timed batch.
#[derive(Clone, PartialEq, Debug)]
pub struct Sample {
    pub kernel: &'static str,
    pub iterations: usize,
    pub secs_per_iter: f64,
    pub gflops: f64,
}

impl Sample {
    pub fn new(kernel: &'static str, dims: Dims, iterations: usize, elapsed: Duration) -> Self {
        assert!(iterations > 0, "a sample needs at least one iteration");
        let micros = elapsed.as_nanos() as f64 / 1e3;
        let secs_per_iter = micros / 1e6 / iterations as f64;
        Self {
            kernel,
            iterations,
            secs_per_iter,
            gflops: gflops(dims, secs_per_iter),
        }
    }
}

#[inline]
pub fn gflops(dims: Dims, secs: f64) -> f64 {
    dims.flops() / secs * 1e-9
}

impl fmt::Display for Sample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Kernel: {}, ran for a total of {} iterations, with average of {:.10} seconds per iteration, with GFLOPS: {:.10}",
            self.kernel, self.iterations, self.secs_per_iter, self.gflops,
        )
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Engine {
    pub iterations: usize,
    pub samples: usize,
    pub warmup: usize,
}

impl Engine {
    /// Resolves, checks and times `launch`. Every sample copies C back into
    /// `out` and goes to `report` as soon as it is taken.
    ///
    /// On error nothing past the failing step runs; a failure before the first
    /// submission leaves both device and host buffers untouched.
    pub fn measure<B: Backend>(
        &self,
        backend: &B,
        launch: &KernelDescriptor,
        dims: Dims,
        out: &mut [f32],
        mut report: impl FnMut(&Sample),
    ) -> Result<Vec<Sample>, DispatchError> {
        assert!(self.iterations > 0, "a sample needs at least one iteration");
        let kernel = backend.resolve(launch.entry_point)?;
        launch.check(backend.max_threads_per_block(&kernel))?;
        log::debug!(
            "{}: grid {:?} block {:?}",
            launch.name,
            launch.grid,
            launch.block
        );

        for _ in 0..self.warmup {
            backend.submit(&kernel, launch, dims, self.iterations)?;
        }

        let mut samples = Vec::with_capacity(self.samples);
        for _ in 0..self.samples {
            let elapsed = backend.submit(&kernel, launch, dims, self.iterations)?;
            backend.read_output(out);
            let sample = Sample::new(launch.name, dims, self.iterations, elapsed);
            report(&sample);
            samples.push(sample);
        }
        Ok(samples)
    }
}
