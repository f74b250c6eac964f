use super::{KernelFn, Program};
use crate::{AsRaw, CurrentCtx, DriverError, bindings::CUmodule};
use std::{ffi::CStr, marker::PhantomData, ptr::null_mut};

pub struct Module<'ctx>(CUmodule, PhantomData<&'ctx CurrentCtx>);

impl CurrentCtx {
    pub fn load(&self, program: &Program) -> Result<Module, DriverError> {
        let mut module = null_mut();
        try_driver!(cuModuleLoadData(&mut module, program.bin.as_ptr().cast()))?;
        Ok(Module(module, PhantomData))
    }
}

impl Drop for Module<'_> {
    #[inline]
    fn drop(&mut self) {
        if let Err(e) = try_driver!(cuModuleUnload(self.0)) {
            log::warn!("failed to unload module: {e}")
        }
    }
}

impl AsRaw for Module<'_> {
    type Raw = CUmodule;
    #[inline]
    unsafe fn as_raw(&self) -> Self::Raw {
        self.0
    }
}

impl Module<'_> {
    /// Looks up a `__global__` entry point by name.
    pub fn get_kernel(&self, name: impl AsRef<CStr>) -> Result<KernelFn, DriverError> {
        let mut kernel = null_mut();
        try_driver!(cuModuleGetFunction(
            &mut kernel,
            self.0,
            name.as_ref().as_ptr().cast(),
        ))?;
        Ok(KernelFn(kernel, PhantomData))
    }
}
