//! Backend selection.
//!
//! Training always runs on an `Autodiff` backend; evaluation and prediction
//! use its inner backend. `DeviceKind` picks which pair to use.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

pub type GpuBackend = burn::backend::Wgpu;
pub type GpuTrainBackend = burn::backend::Autodiff<GpuBackend>;
pub type CpuBackend = burn::backend::NdArray;
pub type CpuTrainBackend = burn::backend::Autodiff<CpuBackend>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum DeviceKind {
    /// Default WGPU adapter (Vulkan / Metal / DX12)
    #[default]
    Wgpu,
    /// ndarray on the CPU
    Cpu,
}

pub fn gpu_device() -> burn::backend::wgpu::WgpuDevice {
    burn::backend::wgpu::WgpuDevice::default()
}

pub fn cpu_device() -> burn::backend::ndarray::NdArrayDevice {
    burn::backend::ndarray::NdArrayDevice::Cpu
}
