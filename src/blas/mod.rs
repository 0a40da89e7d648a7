//! Batched BLAS dispatchers
//!
//! Every operation has a pointer-array form (`*_batched`, each operand is a
//! device array of per-batch-element addresses) and a base+stride form
//! (`*_strided_batched`). Both build the same argument descriptors and run
//! one shared template:
//!
//! 1. log the call (when the handle's layer mode asks for it)
//! 2. reject illegal enumerated values, then illegal sizes
//! 3. return early for empty problems and memory-size queries
//! 4. reject null operands
//! 5. scan inputs, launch, scan outputs (when numerics checks are on)
//!
//! Nothing touches device memory before step 5, so a rejected call has no
//! side effects. Batch counts above [`MAX_GRID_Y`](crate::runtime::LaunchConfig::MAX_GRID_Y) are issued
//! as several launches on the same stream.
//!
//! # Example
//!
//! ```
//! use batchblas::prelude::*;
//! use batchblas::blas;
//!
//! let device = CpuRuntime::default_device();
//! let handle = Handle::<CpuRuntime>::new(CpuRuntime::default_client(&device));
//!
//! let mut hx = HostBatch::<f64>::vector(3, 1, 3, 2, 1);
//! hx.fill_with(|| 1.5);
//! let dx = DeviceBatch::<f64, CpuRuntime>::from_host(&hx, &device)?;
//! let dy = DeviceBatch::<f64, CpuRuntime>::new(*hx.layout(), &device);
//! dy.memcheck()?;
//!
//! blas::copy_strided_batched::<f64, _>(&handle, 3, dx.batch_ptr(0, 0), 1, 3, dy.batch_ptr(0, 0), 1, 3, 2)?;
//! assert_eq!(dy.to_host()?.as_slice(), hx.as_slice());
//! # Ok::<(), batchblas::error::Error>(())
//! ```

pub mod args;
pub(crate) mod check_numerics;
mod copy;
mod ger;
mod her2;
mod hpr;
pub mod logging;
pub(crate) mod rotg;
mod tpmv;
pub mod traits;
pub mod types;

pub use args::{BatchPtr, Scalar};
pub use copy::{copy_batched, copy_strided_batched};
pub use ger::{ger_batched, ger_strided_batched, gerc_batched, gerc_strided_batched};
pub use her2::{her2_batched, her2_strided_batched};
pub use hpr::{hpr_batched, hpr_strided_batched};
pub use rotg::{Givens, givens, rotg_batched, rotg_strided_batched};
pub use tpmv::{tpmv_batched, tpmv_strided_batched};
pub use traits::BlasKernels;
pub use types::{Diagonal, Fill, Operation, PointerMode};

use crate::error::{Error, Result};
use crate::runtime::launch::batch_chunks;

/// Non-negative size argument as `usize`
pub(crate) fn check_size(arg: &'static str, value: i64) -> Result<usize> {
    usize::try_from(value)
        .map_err(|_| Error::invalid_size(arg, format!("must be non-negative, got {value}")))
}

/// Non-zero increment
pub(crate) fn check_inc(arg: &'static str, inc: i64) -> Result<()> {
    if inc == 0 {
        return Err(Error::invalid_size(arg, "increment must not be zero"));
    }
    Ok(())
}

/// Non-null operand
pub(crate) fn check_ptr(arg: &'static str, is_null: bool) -> Result<()> {
    if is_null {
        return Err(Error::InvalidPointer { arg });
    }
    Ok(())
}

/// Run `launch(first_batch, len)` over launch-sized chunks of the batch
pub(crate) fn for_each_launch(
    batch_count: usize,
    mut launch: impl FnMut(usize, usize) -> Result<()>,
) -> Result<()> {
    for (first, len) in batch_chunks(batch_count) {
        launch(first, len)?;
    }
    Ok(())
}
