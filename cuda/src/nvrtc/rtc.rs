use crate::{
    Version,
    bindings::{nvrtcCompileProgram, nvrtcResult},
};
use std::{
    ffi::CString,
    fmt,
    ptr::{null, null_mut},
};

#[derive(Clone, Debug)]
pub struct Rtc {
    cc: Version,
    line_info: bool,
    fmad: bool,
}

pub struct Program {
    pub bin: Box<[u8]>,
    pub log: String,
}

#[derive(thiserror::Error)]
#[error("rtc failed with {result:?}\n{log}")]
pub struct CompilationError {
    pub result: nvrtcResult,
    pub log: String,
}

impl Default for Rtc {
    fn default() -> Self {
        Self::new()
    }
}

impl Rtc {
    pub fn new() -> Self {
        Self {
            cc: Version { major: 8, minor: 0 },
            line_info: false,
            fmad: true,
        }
    }

    pub fn arch(mut self, cc: Version) -> Self {
        self.cc = cc;
        self
    }

    pub fn line_info(mut self, enable: bool) -> Self {
        self.line_info = enable;
        self
    }

    /// Whether the compiler may contract `a * b + c` into a fused multiply-add.
    pub fn fmad(mut self, enable: bool) -> Self {
        self.fmad = enable;
        self
    }

    pub fn compile(&self, code: &str) -> Result<Program, CompilationError> {
        let options = self.generate();
        let options = options.iter().map(|s| s.as_ptr()).collect::<Vec<_>>();

        let Ok(code) = CString::new(code) else {
            return Err(CompilationError {
                result: nvrtcResult::NVRTC_ERROR_INVALID_INPUT,
                log: "source contains an interior nul byte".into(),
            });
        };
        let mut program = null_mut();
        nvrtc!(nvrtcCreateProgram(
            &mut program,
            code.as_ptr().cast(),
            null(),
            0,
            null(),
            null(),
        ));

        let result = unsafe { nvrtcCompileProgram(program, options.len() as _, options.as_ptr()) };
        let log = {
            let mut log_len = 0;
            nvrtc!(nvrtcGetProgramLogSize(program, &mut log_len));
            if log_len > 1 {
                let mut log = vec![0u8; log_len];
                nvrtc!(nvrtcGetProgramLog(program, log.as_mut_ptr().cast()));
                log.pop();
                String::from_utf8_lossy(&log).trim().to_string()
            } else {
                String::new()
            }
        };
        let ans = if result == nvrtcResult::NVRTC_SUCCESS {
            if !log.is_empty() {
                log::warn!("nvrtc: {log}")
            }
            let mut ptx_len = 0;
            nvrtc!(nvrtcGetPTXSize(program, &mut ptx_len));
            let mut bin = vec![0u8; ptx_len].into_boxed_slice();
            nvrtc!(nvrtcGetPTX(program, bin.as_mut_ptr().cast()));
            Ok(Program { bin, log })
        } else {
            Err(CompilationError { result, log })
        };
        nvrtc!(nvrtcDestroyProgram(&mut program));
        ans
    }

    fn generate(&self) -> Vec<CString> {
        let &Self {
            cc,
            line_info,
            fmad,
        } = self;
        // kernels use constexpr tile sizes
        let mut vec = [
            format!("-arch=compute_{}", cc.to_arch_string()),
            "-std=c++17".into(),
            format!("-fmad={fmad}"),
        ]
        .map(|s| CString::new(s).unwrap())
        .to_vec();
        if line_info {
            vec.push(c"-lineinfo".into())
        }
        vec
    }
}

impl fmt::Debug for CompilationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "rtc failed with {:?}", self.result)?;
        if !self.log.is_empty() {
            writeln!(f, "{}", self.log)
        } else {
            Ok(())
        }
    }
}

#[test]
fn test_options() {
    let options = Rtc::new()
        .arch(Version { major: 8, minor: 6 })
        .fmad(false)
        .line_info(true)
        .generate();
    let options = options
        .iter()
        .map(|s| s.to_str().unwrap())
        .collect::<Vec<_>>();
    assert_eq!(
        options,
        ["-arch=compute_86", "-std=c++17", "-fmad=false", "-lineinfo"]
    );
}

#[test]
fn test_compile_error_log() {
    if let Err(crate::NoDevice) = crate::init() {
        return;
    }
    let Err(e) = Rtc::new().compile(r#"extern "C" __global__ void broken( {"#) else {
        panic!("broken source compiled")
    };
    assert_ne!(e.result, nvrtcResult::NVRTC_SUCCESS);
    assert!(!e.log.is_empty());
}
