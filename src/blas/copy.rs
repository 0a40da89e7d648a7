//! Batched vector copy

use super::args::{BatchPtr, CopyArgs, VectorArg};
use super::check_numerics::{Scan, check_numerics};
use super::logging::{CallLog, LogValue};
use super::traits::BlasKernels;
use super::{check_inc, check_ptr, check_size, for_each_launch};
use crate::dtype::Element;
use crate::error::{NumericsStage, Result};
use crate::handle::Handle;
use crate::runtime::{LaunchConfig, Runtime};

const COPY_BLOCK: u32 = 256;

/// `y_b := x_b` with per-batch-element pointer arrays `x` and `y`
pub fn copy_batched<T: Element, R: Runtime>(
    handle: &Handle<R>,
    n: i64,
    x: u64,
    incx: i64,
    y: u64,
    incy: i64,
    batch_count: i64,
) -> Result<()>
where
    R::Client: BlasKernels<R>,
{
    copy_template::<T, R>(
        handle,
        "copy_batched",
        n,
        VectorArg::new(BatchPtr::array(x), incx),
        VectorArg::new(BatchPtr::array(y), incy),
        batch_count,
    )
}

/// `y_b := x_b` with base+stride addressing
#[allow(clippy::too_many_arguments)]
pub fn copy_strided_batched<T: Element, R: Runtime>(
    handle: &Handle<R>,
    n: i64,
    x: u64,
    incx: i64,
    stride_x: i64,
    y: u64,
    incy: i64,
    stride_y: i64,
    batch_count: i64,
) -> Result<()>
where
    R::Client: BlasKernels<R>,
{
    copy_template::<T, R>(
        handle,
        "copy_strided_batched",
        n,
        VectorArg::new(BatchPtr::strided(x, stride_x), incx),
        VectorArg::new(BatchPtr::strided(y, stride_y), incy),
        batch_count,
    )
}

fn copy_template<T: Element, R: Runtime>(
    handle: &Handle<R>,
    name: &'static str,
    n: i64,
    x: VectorArg,
    y: VectorArg,
    batch_count: i64,
) -> Result<()>
where
    R::Client: BlasKernels<R>,
{
    handle.log_call(|| {
        CallLog::new(T::DTYPE, name)
            .arg("n", LogValue::Int(n))
            .arg("x", LogValue::Ptr(x.ptr.raw()))
            .arg("incx", LogValue::Int(x.inc))
            .arg("stride_x", LogValue::Int(x.ptr.stride()))
            .arg("y", LogValue::Ptr(y.ptr.raw()))
            .arg("incy", LogValue::Int(y.inc))
            .arg("stride_y", LogValue::Int(y.ptr.stride()))
            .arg("batch_count", LogValue::Int(batch_count))
    });

    let n = check_size("n", n)?;
    check_inc("incx", x.inc)?;
    check_inc("incy", y.inc)?;
    let batch_count = check_size("batch_count", batch_count)?;
    if n == 0 || batch_count == 0 || handle.is_device_memory_size_query() {
        return Ok(());
    }

    check_ptr("x", x.ptr.is_null())?;
    check_ptr("y", y.ptr.is_null())?;

    check_numerics::<T, R>(
        handle,
        name,
        NumericsStage::Input,
        &[Scan::Vector { n, v: x }],
        batch_count,
    )?;

    launch_copy::<T, R>(handle.client(), n, x, y, batch_count)?;

    check_numerics::<T, R>(
        handle,
        name,
        NumericsStage::Output,
        &[Scan::Vector { n, v: y }],
        batch_count,
    )
}

/// Issue the copy kernel; `x` and `y` are unshifted
///
/// Also used to write workspaces back into strided destinations.
pub(crate) fn launch_copy<T: Element, R: Runtime>(
    client: &R::Client,
    n: usize,
    x: VectorArg,
    y: VectorArg,
    batch_count: usize,
) -> Result<()>
where
    R::Client: BlasKernels<R>,
{
    let args = CopyArgs {
        n,
        x: x.shifted(n as i64),
        y: y.shifted(n as i64),
    };
    for_each_launch(batch_count, |first, len| {
        let cfg = LaunchConfig::batched(n, len, COPY_BLOCK);
        // SAFETY: validated non-null operands; chunk bounds come from batch_count
        unsafe { client.copy_kernel::<T>(cfg, args.advance::<T>(first)) }
    })
}
