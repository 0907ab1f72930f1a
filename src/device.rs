use std::fmt;

/// Compute device the job runs on, chosen when it starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Accelerator {
    Cuda(usize),
    Cpu,
}

impl Accelerator {
    /// The first CUDA device when the runtime reports one, the CPU otherwise.
    pub fn select(cuda_available: bool) -> Self {
        if cuda_available {
            Self::Cuda(0)
        } else {
            Self::Cpu
        }
    }

    /// Ask libtorch whether a CUDA device can be used.
    #[cfg(feature = "tch-gpu")]
    pub fn detect() -> Self {
        let cuda_available = tch::utils::has_cuda();
        log::debug!("libtorch reports cuda available: {cuda_available}");
        Self::select(cuda_available)
    }
}

impl fmt::Display for Accelerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cuda(_) => f.write_str("cuda"),
            Self::Cpu => f.write_str("cpu"),
        }
    }
}

#[cfg(any(feature = "tch-cpu", feature = "tch-gpu"))]
impl From<Accelerator> for burn::backend::libtorch::LibTorchDevice {
    fn from(accelerator: Accelerator) -> Self {
        match accelerator {
            Accelerator::Cuda(index) => Self::Cuda(index),
            Accelerator::Cpu => Self::Cpu,
        }
    }
}
