//! # batchblas
//!
//! **Batched and strided BLAS kernels with a device memory model.**
//!
//! batchblas runs many small, independent linear-algebra problems in one
//! call. Operands are laid out as batches of strided matrices or vectors,
//! optionally grouped into several "multiples" sharing one allocation, and
//! every kernel launch maps one grid row to one batch element.
//!
//! ## Components
//!
//! - [`addressing`]: pure offset, stride and packed-storage arithmetic
//! - [`memory`]: host and device batch containers with bulk transfers
//! - [`blas`]: validating dispatchers for copy, hpr, her2, tpmv, rotg and ger
//! - [`runtime`]: backend traits and the CPU reference device
//! - [`verify`]: host reference routines and tolerance checks
//! - [`abi`]: `extern "C"` entry points returning status codes
//!
//! ## Quick Start
//!
//! ```
//! use batchblas::prelude::*;
//! use batchblas::blas;
//!
//! let device = CpuRuntime::default_device();
//! let handle = Handle::<CpuRuntime>::new(CpuRuntime::default_client(&device));
//!
//! // Two 3x3 upper packed matrices and two vectors
//! let mut hx = HostBatch::<f64>::vector(3, 1, 3, 2, 1);
//! hx.fill_with(|| 1.0);
//! let dx = DeviceBatch::<f64, CpuRuntime>::from_host(&hx, &device)?;
//! let dap = DeviceBatch::<f64, CpuRuntime>::new(BatchLayout::packed::<f64>(3, 6, 2, 1), &device);
//! dap.memcheck()?;
//!
//! blas::hpr_strided_batched::<f64, _>(
//!     &handle, Fill::Upper, 3, Scalar::Host(2.0),
//!     dx.batch_ptr(0, 0), 1, 3,
//!     dap.batch_ptr(0, 0), 6,
//!     2,
//! )?;
//! assert!(dap.to_host()?.batch(0, 1).iter().all(|&v| v == 2.0));
//! # Ok::<(), batchblas::error::Error>(())
//! ```
//!
//! ## Feature Flags
//!
//! - `cpu` (default): CPU reference backend and the C surface
//! - `rayon` (default): batch elements run on the rayon thread pool

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_inception)]

#[cfg(feature = "cpu")]
pub mod abi;
pub mod addressing;
pub mod blas;
pub mod dtype;
pub mod error;
pub mod handle;
pub mod memory;
pub mod runtime;
pub mod verify;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::blas::{BatchPtr, BlasKernels, Diagonal, Fill, Operation, PointerMode, Scalar};
    pub use crate::dtype::{Complex64, Complex128, DType, Element, RealElement};
    pub use crate::error::{Error, Result, Status};
    pub use crate::handle::{CheckNumerics, Handle, HandleConfig, LayerMode};
    pub use crate::memory::{BatchLayout, DeviceBatch, HostBatch};
    pub use crate::runtime::{Device, Runtime, RuntimeClient};

    #[cfg(feature = "cpu")]
    pub use crate::runtime::cpu::CpuRuntime;
}
