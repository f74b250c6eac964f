use crate::{
    config::Dims,
    engine::{Backend, Engine},
    error::DispatchError,
    variant::reference_plan,
};

const ONCE: Engine = Engine {
    iterations: 1,
    samples: 1,
    warmup: 0,
};

/// Runs the baseline kernel once and returns its output.
///
/// Overwrites the device-side C and `out`.
pub fn compute<B: Backend>(
    backend: &B,
    dims: Dims,
    out: &mut [f32],
) -> Result<Vec<f32>, DispatchError> {
    ONCE.measure(backend, &reference_plan(dims), dims, out, |s| println!("{s}"))?;
    Ok(out.to_vec())
}
