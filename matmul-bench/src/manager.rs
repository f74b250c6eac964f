use crate::{
    config::{BenchConfig, Dims},
    engine::{Backend, Engine, Sample},
    error::{DispatchError, SetupError},
    matrix::Operands,
    reference,
    variant::Variant,
    verify::{Verdict, compare},
};
use std::io::{self, Write};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum State {
    Uninitialized,
    Ready,
    Running,
    TornDown,
}

#[derive(Clone, PartialEq, Debug)]
pub enum RunOutcome {
    /// The name matched no variant. Nothing was dispatched.
    Unrecognized,
    /// The dispatch was refused or failed. C was not verified.
    Skipped(DispatchError),
    Completed {
        samples: Vec<Sample>,
        verdict: Verdict,
    },
}

/// Owns one benchmark session: the device backend, the host matrices and the
/// cached reference result.
pub struct BenchManager<B: Backend> {
    backend: B,
    operands: Operands,
    reference: Vec<f32>,
    engine: Engine,
    tolerance: Option<f32>,
    profile_runs: usize,
    state: State,
}

impl<B: Backend> BenchManager<B> {
    /// `backend` must already hold `operands` on the device.
    pub fn new(
        backend: B,
        mut operands: Operands,
        config: &BenchConfig,
    ) -> Result<Self, SetupError> {
        log::debug!("manager {:?}", State::Uninitialized);
        let dims = operands.dims;
        let reference = reference::compute(&backend, dims, operands.c.as_mut_slice())?;

        let state = State::Ready;
        log::debug!("manager {state:?}");
        Ok(Self {
            backend,
            operands,
            reference,
            engine: Engine {
                iterations: config.iterations,
                samples: config.samples,
                warmup: config.warmup,
            },
            tolerance: config.tolerance,
            profile_runs: config.profile_runs,
            state,
        })
    }

    #[inline]
    pub fn state(&self) -> State {
        self.state
    }

    #[inline]
    pub fn operands(&self) -> &Operands {
        &self.operands
    }

    #[inline]
    pub fn reference(&self) -> &[f32] {
        &self.reference
    }

    #[inline]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Looks `name` up in the registry and runs it. Unknown names are a no-op.
    pub fn run(&mut self, name: &str) -> RunOutcome {
        match Variant::lookup(name) {
            Some(variant) => self.run_variant(variant),
            None => {
                log::warn!("unrecognized kernel {name:?}, nothing dispatched");
                RunOutcome::Unrecognized
            }
        }
    }

    pub fn run_variant(&mut self, variant: Variant) -> RunOutcome {
        let name = variant.name();
        println!("running kernel: {name} ... ");

        let dims = self.operands.dims;
        let launch = variant.plan(dims);
        self.state = State::Running;
        let result = self.engine.measure(
            &self.backend,
            &launch,
            dims,
            self.operands.c.as_mut_slice(),
            |s| println!("{s}"),
        );
        self.state = State::Ready;

        let samples = match result {
            Ok(samples) => samples,
            Err(e) => {
                match e {
                    DispatchError::Launch { .. } => log::error!("{e}"),
                    _ => log::warn!("skipped {name}: {e}"),
                }
                return RunOutcome::Skipped(e);
            }
        };

        let verdict = compare(self.operands.c.as_slice(), &self.reference, self.tolerance);
        if let Verdict::Mismatch {
            mismatched,
            first,
            max_abs_diff,
        } = verdict
        {
            println!("{name}, computed the incorrect value for C ");
            log::info!(
                "{name}: {mismatched} of {} elements differ, first at {first}, max abs diff {max_abs_diff}",
                self.reference.len()
            );
        }
        if !self.operands.c.is_finite() {
            log::warn!("{name} produced non-finite values");
        }
        RunOutcome::Completed { samples, verdict }
    }

    /// Runs every variant in registry order.
    pub fn run_all(&mut self) -> Vec<RunOutcome> {
        Variant::ALL
            .into_iter()
            .map(|v| self.run_variant(v))
            .collect()
    }

    /// Runs `name` back to back as many times as the configured profile run count.
    pub fn profile(&mut self, name: &str) -> Vec<RunOutcome> {
        (0..self.profile_runs).map(|_| self.run(name)).collect()
    }

    pub fn render_matrices(&self, mut w: impl Write) -> io::Result<()> {
        let Operands { a, b, c, .. } = &self.operands;
        write!(w, "A\n{a}")?;
        write!(w, "\n------\n")?;
        write!(w, "B\n{b}")?;
        write!(w, "\n-------\n")?;
        write!(w, "C\n{c}")?;
        write!(w, "\n------\n")
    }

    pub fn print_matrices(&self) -> io::Result<()> {
        self.render_matrices(io::stdout().lock())
    }

    /// Ends the session and releases the device resources.
    pub fn teardown(mut self) {
        self.state = State::TornDown;
        log::debug!("manager {:?}", self.state);
    }
}
