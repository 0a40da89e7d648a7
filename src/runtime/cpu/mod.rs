//! CPU runtime implementation
//!
//! The CPU runtime is the reference device. "Device" memory is 64-byte
//! aligned heap memory, so device addresses are directly dereferenceable
//! and managed allocations need no separate pool.
//!
//! # Kernel execution
//!
//! Kernels keep device launch semantics: a [`LaunchConfig`](crate::runtime::LaunchConfig)
//! is executed thread by thread, and each grid row (one batch element) is an
//! independent task. With the `rayon` feature the rows run on the rayon pool.
//! Launches complete before returning, so stream order is program order.

mod client;
mod device;
mod kernel;
pub(crate) mod kernels;
mod launch;
mod runtime;

pub use client::{CpuAllocator, CpuClient};
pub use device::CpuDevice;
pub use runtime::CpuRuntime;
