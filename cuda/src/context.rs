use crate::{
    AsRaw, Device,
    bindings::{CUcontext, CUdevice},
};
use std::ptr::null_mut;

#[derive(PartialEq, Eq, Hash, Debug)]
pub struct Context {
    ctx: CUcontext,
    dev: CUdevice,
}

impl Device {
    #[inline]
    pub fn retain_primary(&self) -> Context {
        let dev = unsafe { self.as_raw() };
        let mut ctx = null_mut();
        driver!(cuDevicePrimaryCtxRetain(&mut ctx, dev));
        Context { ctx, dev }
    }
}

impl Drop for Context {
    #[inline]
    fn drop(&mut self) {
        if let Err(e) = try_driver!(cuDevicePrimaryCtxRelease_v2(self.dev)) {
            log::warn!("failed to release primary context: {e}")
        }
    }
}

unsafe impl Send for Context {}
unsafe impl Sync for Context {}

impl AsRaw for Context {
    type Raw = CUcontext;
    #[inline]
    unsafe fn as_raw(&self) -> Self::Raw {
        self.ctx
    }
}

impl Context {
    #[inline]
    pub fn device(&self) -> Device {
        Device::from_raw(self.dev)
    }

    /// Makes this context current for the duration of `f`.
    ///
    /// The context is popped again when `f` returns or unwinds.
    #[inline]
    pub fn apply<T>(&self, f: impl FnOnce(&CurrentCtx) -> T) -> T {
        driver!(cuCtxPushCurrent_v2(self.ctx));
        let guard = Pushed(self.ctx);
        f(&CurrentCtx(guard.0))
    }
}

struct Pushed(CUcontext);

impl Drop for Pushed {
    #[inline]
    fn drop(&mut self) {
        let mut top = null_mut();
        match try_driver!(cuCtxPopCurrent_v2(&mut top)) {
            Ok(()) if !std::thread::panicking() => assert_eq!(top, self.0),
            Ok(()) => {}
            Err(e) => log::warn!("failed to pop context: {e}"),
        }
    }
}

/// A context known to be current on the calling thread.
#[repr(transparent)]
pub struct CurrentCtx(CUcontext);

impl AsRaw for CurrentCtx {
    type Raw = CUcontext;
    #[inline]
    unsafe fn as_raw(&self) -> Self::Raw {
        self.0
    }
}

#[test]
fn test_apply_pops() {
    if let Err(crate::NoDevice) = crate::init() {
        return;
    }
    let Some(dev) = Device::fetch() else {
        return;
    };
    let ctx = dev.retain_primary();
    assert_eq!(unsafe { ctx.device().as_raw() }, unsafe { dev.as_raw() });
    assert_eq!(ctx.device().name(), dev.name());
    let raw = ctx.apply(|current| {
        let mut top = null_mut();
        driver!(cuCtxGetCurrent(&mut top));
        assert_eq!(top, unsafe { current.as_raw() });
        top
    });
    assert_eq!(raw, unsafe { ctx.as_raw() });

    let mut top = null_mut();
    driver!(cuCtxGetCurrent(&mut top));
    assert!(top.is_null());
}
