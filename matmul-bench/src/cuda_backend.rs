use crate::{
    config::Dims,
    engine::Backend,
    error::{DispatchError, SetupError},
    geometry::KernelDescriptor,
    matrix::Operands,
    variant::{REFERENCE_ENTRY, Variant},
};
use cuda::{AsRaw, CurrentCtx, DevMem, Device, KernelFn, Module, Program, Rtc, params};
use std::{
    ffi::CString,
    time::{Duration, Instant},
};

/// The bundled kernel library.
pub const KERNELS: &str = include_str!("kernels/matmul.cu");

/// Compiles a kernel library for `dev`.
pub fn compile(dev: &Device, code: &str) -> Result<Program, SetupError> {
    let symbols = cuda::nvrtc::global_symbols(code).collect::<Vec<_>>();
    for entry in Variant::ALL
        .iter()
        .map(|v| v.entry_point())
        .chain([REFERENCE_ENTRY])
    {
        if !symbols.contains(&entry) {
            log::warn!("kernel library does not declare {entry}");
        }
    }

    let cc = dev.compute_capability();
    log::debug!("compiling {} kernels for sm_{}", symbols.len(), cc.to_arch_string());
    Rtc::new()
        .arch(cc)
        .compile(code)
        .map_err(|e| SetupError::Compile(e.to_string()))
}

/// Device side of a session. Must live inside the `apply` that produced `ctx`.
pub struct CudaBackend<'ctx> {
    // dropped in field order: C, B, A, then the module
    c: DevMem<'ctx>,
    b: DevMem<'ctx>,
    a: DevMem<'ctx>,
    module: Module<'ctx>,
    ctx: &'ctx CurrentCtx,
}

impl<'ctx> CudaBackend<'ctx> {
    /// Loads `program` and uploads the operands.
    pub fn new(
        ctx: &'ctx CurrentCtx,
        program: &Program,
        ops: &Operands,
    ) -> Result<Self, SetupError> {
        let module = ctx
            .load(program)
            .map_err(|e| SetupError::ModuleLoad(e.to_string()))?;
        let a = ctx.from_host(ops.a.as_slice());
        let b = ctx.from_host(ops.b.as_slice());
        let c = ctx.from_host(ops.c.as_slice());
        Ok(Self {
            c,
            b,
            a,
            module,
            ctx,
        })
    }
}

impl Backend for CudaBackend<'_> {
    type Kernel<'a>
        = KernelFn<'a>
    where
        Self: 'a;

    fn resolve(&self, entry_point: &str) -> Result<KernelFn<'_>, DispatchError> {
        let not_found = |reason: String| DispatchError::KernelNotFound {
            entry: entry_point.into(),
            reason,
        };
        let name = CString::new(entry_point).map_err(|e| not_found(e.to_string()))?;
        let kernel = self
            .module
            .get_kernel(name)
            .map_err(|e| not_found(e.to_string()))?;
        log::debug!(
            "{entry_point}: {} regs, {} bytes static smem",
            kernel.num_regs(),
            kernel.static_smem(),
        );
        Ok(kernel)
    }

    #[inline]
    fn max_threads_per_block(&self, kernel: &KernelFn<'_>) -> u32 {
        kernel.max_threads_per_block() as _
    }

    fn submit(
        &self,
        kernel: &KernelFn<'_>,
        launch: &KernelDescriptor,
        dims: Dims,
        iterations: usize,
    ) -> Result<Duration, DispatchError> {
        let (a, b, c) = unsafe { (self.a.as_raw(), self.b.as_raw(), self.c.as_raw()) };
        let (m, n, k) = dims.narrow();
        let params = params![a, b, c, m, n, k];
        let grid = (launch.grid.z, launch.grid.y, launch.grid.x);
        let block = (launch.block.z, launch.block.y, launch.block.x);

        let failed = |e: cuda::DriverError| DispatchError::Launch {
            kernel: launch.name,
            reason: e.to_string(),
        };
        let stream = self.ctx.stream();
        let start = Instant::now();
        for _ in 0..iterations {
            kernel
                .launch(grid, block, params.as_ptr(), 0, Some(&stream))
                .map_err(failed)?;
        }
        stream.synchronize().map_err(failed)?;
        Ok(start.elapsed())
    }

    #[inline]
    fn read_output(&self, out: &mut [f32]) {
        self.c.copy_out(out)
    }
}
