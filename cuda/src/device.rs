use crate::{AsRaw, Dim3, Version, bindings as cuda};
use std::ffi::{CStr, c_int};

#[repr(transparent)]
pub struct Device(cuda::CUdevice);

impl AsRaw for Device {
    type Raw = cuda::CUdevice;
    #[inline]
    unsafe fn as_raw(&self) -> Self::Raw {
        self.0
    }
}

impl Device {
    #[inline]
    pub fn new(index: c_int) -> Self {
        let mut device = 0;
        driver!(cuDeviceGet(&mut device, index));
        Self(device)
    }

    /// Wraps a handle already returned by the driver.
    #[inline]
    pub(crate) const fn from_raw(raw: cuda::CUdevice) -> Self {
        Self(raw)
    }

    #[inline]
    pub fn fetch() -> Option<Self> {
        if Self::count() > 0 {
            Some(Self::new(0))
        } else {
            None
        }
    }

    #[inline]
    pub fn count() -> usize {
        let mut count = 0;
        driver!(cuDeviceGetCount(&mut count));
        count as _
    }

    pub fn name(&self) -> String {
        let mut name = [0u8; 256];
        driver!(cuDeviceGetName(
            name.as_mut_ptr().cast(),
            name.len() as _,
            self.0
        ));
        CStr::from_bytes_until_nul(&name)
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    #[inline]
    pub fn compute_capability(&self) -> Version {
        use cuda::CUdevice_attribute_enum::*;
        Version {
            major: self.get_attribute(CU_DEVICE_ATTRIBUTE_COMPUTE_CAPABILITY_MAJOR),
            minor: self.get_attribute(CU_DEVICE_ATTRIBUTE_COMPUTE_CAPABILITY_MINOR),
        }
    }

    #[inline]
    pub fn total_memory(&self) -> usize {
        let mut bytes = 0;
        driver!(cuDeviceTotalMem_v2(&mut bytes, self.0));
        bytes as _
    }

    pub fn max_block_dims(&self) -> (usize, Dim3) {
        use cuda::CUdevice_attribute_enum::*;
        (
            self.get_attribute(CU_DEVICE_ATTRIBUTE_MAX_THREADS_PER_BLOCK) as _,
            Dim3 {
                x: self.get_attribute(CU_DEVICE_ATTRIBUTE_MAX_BLOCK_DIM_X) as _,
                y: self.get_attribute(CU_DEVICE_ATTRIBUTE_MAX_BLOCK_DIM_Y) as _,
                z: self.get_attribute(CU_DEVICE_ATTRIBUTE_MAX_BLOCK_DIM_Z) as _,
            },
        )
    }

    #[inline]
    pub fn warp_size(&self) -> usize {
        self.get_attribute(cuda::CUdevice_attribute_enum::CU_DEVICE_ATTRIBUTE_WARP_SIZE) as _
    }

    #[inline]
    fn get_attribute(&self, attr: cuda::CUdevice_attribute) -> i32 {
        let mut value = 0;
        driver!(cuDeviceGetAttribute(&mut value, attr, self.0));
        value
    }
}

#[test]
fn test() {
    if let Err(crate::NoDevice) = crate::init() {
        return;
    }
    for i in 0..Device::count() {
        let dev = Device::new(i as _);
        let cc = dev.compute_capability();
        let (max_threads, max_block_dims) = dev.max_block_dims();
        assert!(max_threads >= dev.warp_size());
        println!(
            "gpu{i}: {} ver{cc} mem={}, max_threads_per_block={}, max_block_dims={:?}",
            dev.name(),
            dev.total_memory(),
            max_threads,
            max_block_dims,
        );
    }
}
