use crate::{AsRaw, CurrentCtx, DriverError, bindings as cuda};
use std::{marker::PhantomData, ptr::null_mut};

pub struct Stream<'ctx>(cuda::CUstream, PhantomData<&'ctx CurrentCtx>);

impl CurrentCtx {
    #[inline]
    pub fn stream(&self) -> Stream {
        let mut stream = null_mut();
        driver!(cuStreamCreate(
            &mut stream,
            CUstream_flags::CU_STREAM_NON_BLOCKING as _
        ));
        Stream(stream, PhantomData)
    }
}

impl Drop for Stream<'_> {
    #[inline]
    fn drop(&mut self) {
        // a faulted context keeps failing every call, so only report here
        if let Err(e) = self.synchronize() {
            log::warn!("stream dropped with pending error: {e}")
        }
        if let Err(e) = try_driver!(cuStreamDestroy_v2(self.0)) {
            log::warn!("failed to destroy stream: {e}")
        }
    }
}

impl AsRaw for Stream<'_> {
    type Raw = cuda::CUstream;
    #[inline]
    unsafe fn as_raw(&self) -> Self::Raw {
        self.0
    }
}

impl Stream<'_> {
    /// Blocks the calling thread until every command queued on this stream has completed.
    ///
    /// Faults raised by queued kernels surface here.
    #[inline]
    pub fn synchronize(&self) -> Result<(), DriverError> {
        try_driver!(cuStreamSynchronize(self.0))
    }
}
