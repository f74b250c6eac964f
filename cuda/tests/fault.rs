#![cfg(detected_cuda)]

use cuda::{Device, Rtc, params};

const CODE: &str = r#"
extern "C" __global__ void write_through(float *x) {
    x[threadIdx.x] = 1.f;
}
"#;

// Runs in its own process: the fault poisons the context for good.
#[test]
fn test_kernel_fault_is_returned() {
    if let Err(cuda::NoDevice) = cuda::init() {
        return;
    }
    let Some(dev) = Device::fetch() else {
        return;
    };
    let program = Rtc::new()
        .arch(dev.compute_capability())
        .compile(CODE)
        .unwrap();
    dev.retain_primary().apply(|ctx| {
        let module = ctx.load(&program).unwrap();
        let kernel = module.get_kernel(c"write_through").unwrap();
        let null = 0u64;
        let stream = ctx.stream();
        let launched = kernel.launch(1u32, 32u32, params![null].as_ptr(), 0, Some(&stream));
        // either the launch or the wait reports the fault, nothing panics
        assert!(launched.is_err() || stream.synchronize().is_err());
    });
}
