use clap::Parser;
use matmul_bench::{BenchConfig, Variant};
use std::path::PathBuf;

/// Times the matmul kernel variants on the first CUDA device and checks them
/// against a baseline kernel.
#[derive(Parser, Debug)]
#[command(name = "matmul-bench", version)]
struct Args {
    /// Rows of A and C
    #[arg(long, default_value_t = 16)]
    m: u32,
    /// Columns of A and rows of B
    #[arg(long, default_value_t = 16)]
    k: u32,
    /// Columns of B and C
    #[arg(long, default_value_t = 16)]
    n: u32,
    /// Variant name, `v1`..`v7` alias or entry point
    #[arg(long, default_value = "warp-tile")]
    kernel: String,
    /// Run the kernel `--profile-runs` times
    #[arg(long, conflicts_with = "all")]
    profile: bool,
    /// Run every variant once
    #[arg(long)]
    all: bool,
    /// Print the registered variants and exit
    #[arg(long)]
    list: bool,
    /// Launches per timed sample
    #[arg(long, default_value_t = 10)]
    iterations: usize,
    /// Timed samples per run
    #[arg(long, default_value_t = 10)]
    samples: usize,
    #[arg(long, default_value_t = 200)]
    profile_runs: usize,
    /// Untimed samples before the first timed one
    #[arg(long, default_value_t = 0)]
    warmup: usize,
    /// Seed for A and B
    #[arg(long)]
    seed: Option<u64>,
    /// CUDA C source replacing the bundled kernel library
    #[arg(long, value_name = "PATH")]
    kernels: Option<PathBuf>,
    /// Accept results within this absolute difference of the reference
    #[arg(long)]
    tolerance: Option<f32>,
    /// Do not print A, B and C
    #[arg(long)]
    no_matrices: bool,
}

impl Args {
    fn config(&self) -> BenchConfig {
        BenchConfig {
            m: self.m,
            k: self.k,
            n: self.n,
            iterations: self.iterations,
            samples: self.samples,
            profile_runs: self.profile_runs,
            warmup: self.warmup,
            seed: self.seed,
            kernels: self.kernels.clone(),
            tolerance: self.tolerance,
        }
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let config = args.config();
    let dims = config.validate()?;
    if args.list {
        for v in Variant::ALL {
            println!("{v}");
        }
        return Ok(());
    }
    session::run(&args, &config, dims)
}

#[cfg(detected_cuda)]
mod session {
    use super::Args;
    use anyhow::Context as _;
    use matmul_bench::{
        BenchConfig, BenchManager, Dims, Operands, SetupError,
        cuda_backend::{self, CudaBackend},
    };
    use std::{borrow::Cow, fs};

    pub fn run(args: &Args, config: &BenchConfig, dims: Dims) -> anyhow::Result<()> {
        cuda::init().map_err(|_| SetupError::NoDevice)?;
        let dev = cuda::Device::fetch().ok_or(SetupError::NoDevice)?;
        log::info!("{} (sm_{})", dev.name(), dev.compute_capability().to_arch_string());

        let code = match &config.kernels {
            Some(path) => Cow::Owned(fs::read_to_string(path).map_err(|source| {
                SetupError::KernelSource {
                    path: path.display().to_string(),
                    source,
                }
            })?),
            None => Cow::Borrowed(cuda_backend::KERNELS),
        };
        let program = cuda_backend::compile(&dev, &code)?;

        dev.retain_primary().apply(|ctx| -> anyhow::Result<()> {
            let operands = Operands::random(dims, config.seed);
            let backend = CudaBackend::new(ctx, &program, &operands)?;
            let mut manager = BenchManager::new(backend, operands, config)?;

            if args.all {
                manager.run_all();
            } else if args.profile {
                manager.profile(&args.kernel);
            } else {
                manager.run(&args.kernel);
            }
            if !args.no_matrices {
                manager.print_matrices().context("failed to print matrices")?;
            }
            manager.teardown();
            Ok(())
        })
    }
}

#[cfg(not(detected_cuda))]
mod session {
    use super::Args;
    use matmul_bench::{BenchConfig, Dims, SetupError};

    pub fn run(_args: &Args, _config: &BenchConfig, _dims: Dims) -> anyhow::Result<()> {
        Err(SetupError::NoDevice.into())
    }
}
