mod kernel_fn;
mod module;
mod rtc;

pub use kernel_fn::{AsParam, KernelFn};
pub use module::Module;
pub use rtc::{CompilationError, Program, Rtc};

/// Names of the `extern "C" __global__` entry points declared in `code`.
pub fn global_symbols(code: &str) -> impl Iterator<Item = &str> {
    code.split("extern")
        .skip(1)
        .filter_map(|s| s.trim().strip_prefix(r#""C""#))
        .filter_map(|f| f.split_once('(').map(|(head, _)| head.trim()))
        .filter(|head| head.contains("__global__") && head.contains("void"))
        .filter_map(|head| head.rsplit_once(char::is_whitespace).map(|(_, name)| name))
}

#[test]
fn test_search_symbols() {
    let code = r#"
extern "C" __global__ void matmul_a(const float *A) { }
static __device__ float helper(float x) { return x; }
extern "C" __device__ long not_a_kernel() { return 0; }
extern "C" __global__ void
matmul_b(const float *A, float *C) { }
    "#;
    assert_eq!(
        global_symbols(code).collect::<Vec<_>>(),
        ["matmul_a", "matmul_b"]
    );
}

#[test]
fn test_compile_and_launch() {
    use crate::{AsRaw, Device, params};
    use std::ffi::c_uint;

    const N: usize = 64;
    let code = r#"
extern "C" __global__ void scale(float *x, float k, unsigned int n) {
    unsigned int i = blockIdx.x * blockDim.x + threadIdx.x;
    if (i < n) x[i] *= k;
}
"#;

    if let Err(crate::NoDevice) = crate::init() {
        return;
    }
    let Some(dev) = Device::fetch() else {
        return;
    };
    let program = Rtc::new()
        .arch(dev.compute_capability())
        .compile(code)
        .unwrap();
    dev.retain_primary().apply(|ctx| {
        let module = ctx.load(&program).unwrap();
        let kernel = module.get_kernel(c"scale").unwrap();
        assert!(kernel.max_threads_per_block() >= 32);
        assert!(module.get_kernel(c"missing").is_err());

        let host = (0..N).map(|i| i as f32).collect::<Vec<_>>();
        let mem = ctx.from_host(&host);
        let ptr = unsafe { mem.as_raw() };
        let k = 2.0f32;
        let n = N as c_uint;
        let stream = ctx.stream();
        kernel
            .launch(1, N as c_uint, params![ptr, k, n].as_ptr(), 0, Some(&stream))
            .unwrap();
        stream.synchronize().unwrap();

        let mut back = vec![0.0f32; N];
        mem.copy_out(&mut back);
        assert!(back.iter().enumerate().all(|(i, &x)| x == 2. * i as f32));
    });
}
