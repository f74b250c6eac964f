//! A [`Backend`] that runs the kernel library on the CPU.
//!
//! Each registered entry point writes the blocks its grid reaches with the
//! same fused multiply-add order as the device kernels.

use crate::{
    config::Dims,
    engine::Backend,
    error::DispatchError,
    geometry::KernelDescriptor,
    matrix::Operands,
    variant::{REFERENCE_ENTRY, Variant},
};
use std::{
    cell::{Cell, RefCell},
    rc::Rc,
    time::Duration,
};

pub(crate) struct HostBackend {
    product: Vec<f32>,
    c: RefCell<Vec<f32>>,
    max_threads: u32,
    missing: Vec<&'static str>,
    faulty: Option<&'static str>,
    failing: Option<&'static str>,
    submissions: Cell<usize>,
    launches: Cell<usize>,
    copies: Cell<usize>,
    released: Option<Rc<Cell<usize>>>,
}

impl HostBackend {
    pub fn new(ops: &Operands) -> Self {
        let Dims { m, k, n } = ops.dims;
        Self {
            product: test_utils::host_matmul(
                ops.a.as_slice(),
                ops.b.as_slice(),
                m as _,
                k as _,
                n as _,
            ),
            c: RefCell::new(ops.c.as_slice().to_vec()),
            max_threads: 1024,
            missing: Vec::new(),
            faulty: None,
            failing: None,
            submissions: Cell::new(0),
            launches: Cell::new(0),
            copies: Cell::new(0),
            released: None,
        }
    }

    /// Drops `entry_point` from the loaded library.
    pub fn without(mut self, entry_point: &'static str) -> Self {
        self.missing.push(entry_point);
        self
    }

    /// Makes `entry_point` write a wrong first element.
    pub fn with_faulty(mut self, entry_point: &'static str) -> Self {
        self.faulty = Some(entry_point);
        self
    }

    /// Makes every submission of `entry_point` fail the way a faulting kernel does.
    pub fn with_failing(mut self, entry_point: &'static str) -> Self {
        self.failing = Some(entry_point);
        self
    }

    pub fn with_max_threads(mut self, max: u32) -> Self {
        self.max_threads = max;
        self
    }

    /// Counts drops into `counter`.
    pub fn on_release(mut self, counter: Rc<Cell<usize>>) -> Self {
        self.released = Some(counter);
        self
    }

    pub fn submissions(&self) -> usize {
        self.submissions.get()
    }

    pub fn launches(&self) -> usize {
        self.launches.get()
    }

    pub fn copies(&self) -> usize {
        self.copies.get()
    }

    /// The device-side C.
    pub fn output(&self) -> Vec<f32> {
        self.c.borrow().clone()
    }

    fn launch_once(&self, entry_point: &str, launch: &KernelDescriptor, dims: Dims) {
        let (tile_m, tile_n) = launch.policy.footprint();
        let (m, n) = (dims.m as usize, dims.n as usize);
        let (tile_m, tile_n) = (tile_m as usize, tile_n as usize);
        let mut c = self.c.borrow_mut();
        for by in 0..launch.grid.y as usize {
            for bx in 0..launch.grid.x as usize {
                for row in by * tile_m..((by + 1) * tile_m).min(m) {
                    for col in bx * tile_n..((bx + 1) * tile_n).min(n) {
                        c[row * n + col] = self.product[row * n + col];
                    }
                }
            }
        }
        if self.faulty == Some(entry_point) {
            c[0] += 1.;
        }
    }
}

impl Backend for HostBackend {
    type Kernel<'a> = &'static str;

    fn resolve(&self, entry_point: &str) -> Result<Self::Kernel<'_>, DispatchError> {
        Variant::ALL
            .iter()
            .map(|v| v.entry_point())
            .chain([REFERENCE_ENTRY])
            .find(|e| *e == entry_point && !self.missing.contains(e))
            .ok_or_else(|| DispatchError::KernelNotFound {
                entry: entry_point.into(),
                reason: "not in library".into(),
            })
    }

    fn max_threads_per_block(&self, _kernel: &Self::Kernel<'_>) -> u32 {
        self.max_threads
    }

    fn submit(
        &self,
        kernel: &Self::Kernel<'_>,
        launch: &KernelDescriptor,
        dims: Dims,
        iterations: usize,
    ) -> Result<Duration, DispatchError> {
        self.submissions.set(self.submissions.get() + 1);
        if self.failing == Some(*kernel) {
            return Err(DispatchError::Launch {
                kernel: launch.name,
                reason: "illegal address".into(),
            });
        }
        for _ in 0..iterations {
            self.launch_once(kernel, launch, dims);
            self.launches.set(self.launches.get() + 1);
        }
        Ok(Duration::from_micros(25 * iterations as u64))
    }

    fn read_output(&self, out: &mut [f32]) {
        self.copies.set(self.copies.get() + 1);
        out.copy_from_slice(&self.c.borrow());
    }
}

impl Drop for HostBackend {
    fn drop(&mut self) {
        if let Some(counter) = &self.released {
            counter.set(counter.get() + 1)
        }
    }
}
