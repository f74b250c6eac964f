use crate::{AsRaw, CurrentCtx, bindings as cuda};
use std::{alloc::Layout, marker::PhantomData, mem::size_of_val};

/// Device memory owned by a context that stays current for `'ctx`.
pub struct DevMem<'ctx> {
    ptr: cuda::CUdeviceptr,
    len: usize,
    _ctx: PhantomData<&'ctx CurrentCtx>,
}

impl CurrentCtx {
    pub fn malloc<T: Copy>(&self, len: usize) -> DevMem {
        let len = Layout::array::<T>(len).unwrap().size();
        let mut ptr = 0;
        driver!(cuMemAlloc_v2(&mut ptr, len));
        DevMem {
            ptr,
            len,
            _ctx: PhantomData,
        }
    }

    pub fn from_host<T: Copy>(&self, slice: &[T]) -> DevMem {
        let mut mem = self.malloc::<T>(slice.len());
        mem.copy_in(slice);
        mem
    }
}

impl Drop for DevMem<'_> {
    #[inline]
    fn drop(&mut self) {
        if let Err(e) = try_driver!(cuMemFree_v2(self.ptr)) {
            log::warn!("failed to free device memory: {e}")
        }
    }
}

impl AsRaw for DevMem<'_> {
    type Raw = cuda::CUdeviceptr;

    #[inline]
    unsafe fn as_raw(&self) -> Self::Raw {
        self.ptr
    }
}

impl DevMem<'_> {
    /// Size in bytes.
    #[inline]
    pub const fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn copy_in<T: Copy>(&mut self, slice: &[T]) {
        let len = size_of_val(slice);
        let src = slice.as_ptr().cast();
        assert_eq!(len, self.len);
        driver!(cuMemcpyHtoD_v2(self.ptr, src, len));
    }

    /// Synchronous copy to host. Waits for prior work touching this memory.
    pub fn copy_out<T: Copy>(&self, slice: &mut [T]) {
        let len = size_of_val(slice);
        let dst = slice.as_mut_ptr().cast();
        assert_eq!(len, self.len);
        driver!(cuMemcpyDtoH_v2(dst, self.ptr, len));
    }

    #[inline]
    pub fn zero(&mut self) {
        driver!(cuMemsetD8_v2(self.ptr, 0, self.len));
    }
}

#[test]
fn test_round_trip() {
    use rand::Rng;

    if let Err(crate::NoDevice) = crate::init() {
        return;
    }
    let Some(dev) = crate::Device::fetch() else {
        return;
    };
    dev.retain_primary().apply(|ctx| {
        let mut rng = rand::rng();
        let host = (0..1024).map(|_| rng.random::<f32>()).collect::<Vec<_>>();
        let mut mem = ctx.from_host(&host);
        assert_eq!(mem.len(), host.len() * size_of::<f32>());

        let mut back = vec![0.0f32; host.len()];
        mem.copy_out(&mut back);
        assert_eq!(back, host);

        mem.zero();
        mem.copy_out(&mut back);
        assert!(back.iter().all(|&x| x == 0.));
    });
}
