use anyhow::Result;
use clap::Parser;
use mnist_mlp_demo::cli::Args;
use mnist_mlp_demo::train::TrainingConfig;

/// CUDA through torch when the node has a GPU, torch on the CPU otherwise
#[cfg(feature = "tch-gpu")]
mod tch_gpu {
    use burn::backend::{
        Autodiff,
        libtorch::{LibTorch, LibTorchDevice},
    };
    use mnist_mlp_demo::device::Accelerator;
    use mnist_mlp_demo::train::{TrainingConfig, run};

    pub fn run_job(config: &TrainingConfig) -> anyhow::Result<()> {
        let accelerator = Accelerator::detect();
        println!("Using {accelerator}");
        let device = LibTorchDevice::from(accelerator);
        run::<Autodiff<LibTorch>>(config, device)?;
        Ok(())
    }
}

#[cfg(all(feature = "tch-cpu", not(feature = "tch-gpu")))]
mod tch_cpu {
    use burn::backend::{
        Autodiff,
        libtorch::{LibTorch, LibTorchDevice},
    };
    use mnist_mlp_demo::device::Accelerator;
    use mnist_mlp_demo::train::{TrainingConfig, run};

    pub fn run_job(config: &TrainingConfig) -> anyhow::Result<()> {
        let accelerator = Accelerator::Cpu;
        println!("Using {accelerator}");
        let device = LibTorchDevice::from(accelerator);
        run::<Autodiff<LibTorch>>(config, device)?;
        Ok(())
    }
}

/// The default wgpu device is the best adapter found at run time, falling
/// back to the CPU when no GPU is present. The adapter is set up eagerly so
/// the one actually chosen can be reported
#[cfg(all(
    any(feature = "wgpu", feature = "metal", feature = "vulkan"),
    not(any(feature = "tch-gpu", feature = "tch-cpu"))
))]
mod wgpu {
    use burn::backend::{
        Autodiff,
        wgpu::{RuntimeOptions, Wgpu, WgpuDevice, graphics::AutoGraphicsApi, init_setup},
    };
    use mnist_mlp_demo::train::{TrainingConfig, run};

    pub fn run_job(config: &TrainingConfig) -> anyhow::Result<()> {
        let device = WgpuDevice::default();
        let setup = init_setup::<AutoGraphicsApi>(&device, RuntimeOptions::default());
        let adapter = setup.adapter.get_info();
        println!("Using {} ({:?})", adapter.name, adapter.device_type);
        log::info!("wgpu backend: {:?}", adapter.backend);
        run::<Autodiff<Wgpu>>(config, device)?;
        Ok(())
    }
}

#[cfg(all(
    any(feature = "ndarray", feature = "ndarray-blas-openblas"),
    not(any(
        feature = "tch-gpu",
        feature = "tch-cpu",
        feature = "wgpu",
        feature = "metal",
        feature = "vulkan"
    ))
))]
mod ndarray {
    use burn::backend::{
        Autodiff,
        ndarray::{NdArray, NdArrayDevice},
    };
    use mnist_mlp_demo::device::Accelerator;
    use mnist_mlp_demo::train::{TrainingConfig, run};

    pub fn run_job(config: &TrainingConfig) -> anyhow::Result<()> {
        let device = NdArrayDevice::Cpu;
        println!("Using {}", Accelerator::Cpu);
        run::<Autodiff<NdArray>>(config, device)?;
        Ok(())
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    println!("Passed arguments: arg = {}", args.arg);

    let config = TrainingConfig::demo();

    #[cfg(feature = "tch-gpu")]
    tch_gpu::run_job(&config)?;

    #[cfg(all(feature = "tch-cpu", not(feature = "tch-gpu")))]
    tch_cpu::run_job(&config)?;

    #[cfg(all(
        any(feature = "wgpu", feature = "metal", feature = "vulkan"),
        not(any(feature = "tch-gpu", feature = "tch-cpu"))
    ))]
    wgpu::run_job(&config)?;

    #[cfg(all(
        any(feature = "ndarray", feature = "ndarray-blas-openblas"),
        not(any(
            feature = "tch-gpu",
            feature = "tch-cpu",
            feature = "wgpu",
            feature = "metal",
            feature = "vulkan"
        ))
    ))]
    ndarray::run_job(&config)?;

    Ok(())
}
