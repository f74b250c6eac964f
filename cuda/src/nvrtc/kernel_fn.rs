use crate::{
    AsRaw, Dim3, DriverError, Stream,
    bindings::{
        CUfunction,
        CUfunction_attribute_enum::{self, *},
    },
};
use std::{
    ffi::{c_int, c_void},
    marker::PhantomData,
    ptr::null_mut,
};

pub struct KernelFn<'m>(pub(super) CUfunction, pub(super) PhantomData<&'m ()>);

impl KernelFn<'_> {
    pub fn launch(
        &self,
        grid_dims: impl Into<Dim3>,
        block_dims: impl Into<Dim3>,
        params: *const *const c_void,
        shared_mem: usize,
        stream: Option<&Stream>,
    ) -> Result<(), DriverError> {
        let grid_dims = grid_dims.into();
        let block_dims = block_dims.into();
        try_driver!(cuLaunchKernel(
            self.0,
            grid_dims.x,
            grid_dims.y,
            grid_dims.z,
            block_dims.x,
            block_dims.y,
            block_dims.z,
            shared_mem as _,
            stream.map_or(null_mut(), |x| x.as_raw()),
            params as _,
            null_mut(),
        ))
    }

    /// Upper bound on threads per block for this function, given its register and shared memory use.
    #[inline]
    pub fn max_threads_per_block(&self) -> usize {
        self.get_attribute(CU_FUNC_ATTRIBUTE_MAX_THREADS_PER_BLOCK) as _
    }

    #[inline]
    pub fn static_smem(&self) -> usize {
        self.get_attribute(CU_FUNC_ATTRIBUTE_SHARED_SIZE_BYTES) as _
    }

    #[inline]
    pub fn num_regs(&self) -> usize {
        self.get_attribute(CU_FUNC_ATTRIBUTE_NUM_REGS) as _
    }

    #[inline]
    fn get_attribute(&self, attr: CUfunction_attribute_enum) -> c_int {
        let mut value = 0;
        driver!(cuFuncGetAttribute(&mut value, attr, self.0));
        value
    }
}

pub trait AsParam {
    #[inline(always)]
    fn as_param(&self) -> *const c_void {
        self as *const _ as _
    }
}

macro_rules! impl_as_param_for {
    ($ty:ty) => {
        impl AsParam for $ty {}
    };
}

impl_as_param_for!(u16);
impl_as_param_for!(i32);
impl_as_param_for!(u32);
impl_as_param_for!(u64);
impl_as_param_for!(f32);
impl_as_param_for!(usize);

/// Packs kernel arguments into the pointer array `cuLaunchKernel` expects.
///
/// The arguments must outlive the launch, so pass places rather than temporaries
/// unless the array is consumed within the same statement.
#[macro_export]
macro_rules! params {
    [$($p:expr),*] => {{
        use $crate::AsParam;
        [$($p.as_param()),*]
    }};
}

#[test]
fn test_macro() {
    let (a, b, c) = (1u16, 2u16, 3u16);
    let params = params![a, b, c];
    let params = params
        .into_iter()
        .map(|ptr| unsafe { *(ptr as *const u16) })
        .collect::<Vec<_>>();
    assert_eq!(params, [1, 2, 3]);
}
