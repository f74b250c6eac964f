#![cfg(detected_cuda)]

#[macro_use]
pub mod bindings {
    #![allow(unused, non_upper_case_globals, non_camel_case_types, non_snake_case)]
    include!(concat!(env!("OUT_DIR"), "/bindings.rs"));

    #[macro_export]
    macro_rules! driver {
        ($f:expr) => {{
            #[allow(unused_imports)]
            use $crate::bindings::*;
            #[allow(unused_unsafe)]
            let err = unsafe { $f };
            assert_eq!(err, CUresult::CUDA_SUCCESS);
        }};
    }

    /// Like [`driver!`], but hands the failure back to the caller.
    #[macro_export]
    macro_rules! try_driver {
        ($f:expr) => {{
            #[allow(unused_imports)]
            use $crate::bindings::*;
            #[allow(unused_unsafe)]
            let err = unsafe { $f };
            if err == CUresult::CUDA_SUCCESS {
                Ok(())
            } else {
                Err($crate::DriverError(err))
            }
        }};
    }

    #[macro_export]
    macro_rules! nvrtc {
        ($f:expr) => {{
            #[allow(unused_imports)]
            use $crate::bindings::*;
            #[allow(unused_unsafe)]
            let err = unsafe { $f };
            assert_eq!(err, nvrtcResult::NVRTC_SUCCESS);
        }};
    }
}

mod context;
mod device;
mod memory;
pub mod nvrtc;
mod stream;

pub trait AsRaw {
    type Raw;

    /// # Safety
    ///
    /// The caller must ensure that the returned item is dropped before the original item.
    unsafe fn as_raw(&self) -> Self::Raw;
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct NoDevice;

/// Initializes the driver. Fails when no driver or no device is present.
pub fn init() -> Result<(), NoDevice> {
    let err = unsafe { bindings::cuInit(0) };
    if err == bindings::CUresult::CUDA_SUCCESS && Device::count() > 0 {
        Ok(())
    } else {
        Err(NoDevice)
    }
}

#[derive(thiserror::Error, Clone, Copy, PartialEq, Eq, Debug)]
#[error("cuda driver call failed with {0:?}")]
pub struct DriverError(pub bindings::CUresult);

pub use context::{Context, CurrentCtx};
pub use device::Device;
pub use memory::DevMem;
pub use nvrtc::{AsParam, CompilationError, KernelFn, Module, Program, Rtc};
pub use stream::Stream;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Version {
    pub major: i32,
    pub minor: i32,
}

impl Version {
    #[inline]
    pub fn to_arch_string(&self) -> String {
        format!("{}{}", self.major, self.minor)
    }
}

impl PartialOrd for Version {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Version {
    #[inline]
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.major
            .cmp(&other.major)
            .then(self.minor.cmp(&other.minor))
    }
}

impl std::fmt::Display for Version {
    #[inline]
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

use std::ffi::c_uint;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Dim3 {
    pub x: c_uint,
    pub y: c_uint,
    pub z: c_uint,
}

impl From<c_uint> for Dim3 {
    #[inline]
    fn from(x: c_uint) -> Self {
        Self { x, y: 1, z: 1 }
    }
}

impl From<(c_uint, c_uint)> for Dim3 {
    #[inline]
    fn from((y, x): (c_uint, c_uint)) -> Self {
        Self { x, y, z: 1 }
    }
}

impl From<(c_uint, c_uint, c_uint)> for Dim3 {
    #[inline]
    fn from((z, y, x): (c_uint, c_uint, c_uint)) -> Self {
        Self { x, y, z }
    }
}

#[test]
fn test_version_order() {
    let old = Version { major: 7, minor: 5 };
    let new = Version { major: 8, minor: 0 };
    assert!(old < new);
    assert!(Version { major: 8, minor: 6 } > new);
    assert_eq!(new.to_arch_string(), "80");
    assert_eq!(old.to_string(), "7.5");
}
