//! Batched Hermitian rank-2 update

use super::args::{BatchPtr, Her2Args, MatrixArg, Scalar, VectorArg};
use super::check_numerics::{Scan, check_numerics};
use super::logging::{CallLog, LogValue};
use super::traits::BlasKernels;
use super::types::Fill;
use super::{check_inc, check_ptr, check_size, for_each_launch};
use crate::dtype::Element;
use crate::error::{Error, NumericsStage, Result};
use crate::handle::Handle;
use crate::runtime::{LaunchConfig, Runtime};

const HER2_BLOCK: u32 = 128;

fn matrix(ptr: BatchPtr, lda: i64) -> MatrixArg {
    MatrixArg { ptr, offset: 0, lda }
}

/// `A_b := alpha * x_b * y_bᴴ + conj(alpha) * y_b * x_bᴴ + A_b` with pointer arrays
///
/// Only the `uplo` triangle of each `A_b` is read and written; diagonal
/// imaginary parts are set to zero. For real `T` this is the symmetric
/// rank-2 update.
#[allow(clippy::too_many_arguments)]
pub fn her2_batched<T: Element, R: Runtime>(
    handle: &Handle<R>,
    uplo: Fill,
    n: i64,
    alpha: Scalar<T>,
    x: u64,
    incx: i64,
    y: u64,
    incy: i64,
    a: u64,
    lda: i64,
    batch_count: i64,
) -> Result<()>
where
    R::Client: BlasKernels<R>,
{
    her2_template::<T, R>(
        handle,
        "her2_batched",
        uplo,
        n,
        alpha,
        VectorArg::new(BatchPtr::array(x), incx),
        VectorArg::new(BatchPtr::array(y), incy),
        matrix(BatchPtr::array(a), lda),
        batch_count,
    )
}

/// `A_b := alpha * x_b * y_bᴴ + conj(alpha) * y_b * x_bᴴ + A_b` with base+stride addressing
#[allow(clippy::too_many_arguments)]
pub fn her2_strided_batched<T: Element, R: Runtime>(
    handle: &Handle<R>,
    uplo: Fill,
    n: i64,
    alpha: Scalar<T>,
    x: u64,
    incx: i64,
    stride_x: i64,
    y: u64,
    incy: i64,
    stride_y: i64,
    a: u64,
    lda: i64,
    stride_a: i64,
    batch_count: i64,
) -> Result<()>
where
    R::Client: BlasKernels<R>,
{
    her2_template::<T, R>(
        handle,
        "her2_strided_batched",
        uplo,
        n,
        alpha,
        VectorArg::new(BatchPtr::strided(x, stride_x), incx),
        VectorArg::new(BatchPtr::strided(y, stride_y), incy),
        matrix(BatchPtr::strided(a, stride_a), lda),
        batch_count,
    )
}

#[allow(clippy::too_many_arguments)]
fn her2_template<T: Element, R: Runtime>(
    handle: &Handle<R>,
    name: &'static str,
    uplo: Fill,
    n: i64,
    alpha: Scalar<T>,
    x: VectorArg,
    y: VectorArg,
    a: MatrixArg,
    batch_count: i64,
) -> Result<()>
where
    R::Client: BlasKernels<R>,
{
    handle.log_call(|| {
        CallLog::new(T::DTYPE, name)
            .arg("uplo", LogValue::Char(uplo.letter()))
            .arg("n", LogValue::Int(n))
            .arg("alpha", LogValue::from_scalar::<T, R>(&alpha, handle.device()))
            .arg("x", LogValue::Ptr(x.ptr.raw()))
            .arg("incx", LogValue::Int(x.inc))
            .arg("stride_x", LogValue::Int(x.ptr.stride()))
            .arg("y", LogValue::Ptr(y.ptr.raw()))
            .arg("incy", LogValue::Int(y.inc))
            .arg("stride_y", LogValue::Int(y.ptr.stride()))
            .arg("A", LogValue::Ptr(a.ptr.raw()))
            .arg("lda", LogValue::Int(a.lda))
            .arg("stride_a", LogValue::Int(a.ptr.stride()))
            .arg("batch_count", LogValue::Int(batch_count))
    });

    let upper = uplo.triangle_upper()?;
    let n = check_size("n", n)?;
    check_inc("incx", x.inc)?;
    check_inc("incy", y.inc)?;
    if a.lda < n.max(1) as i64 {
        return Err(Error::invalid_size(
            "lda",
            format!("must be at least max(1, n) = {}, got {}", n.max(1), a.lda),
        ));
    }
    let batch_count = check_size("batch_count", batch_count)?;
    if n == 0 || batch_count == 0 || handle.is_device_memory_size_query() {
        return Ok(());
    }

    check_ptr("alpha", alpha.is_null())?;
    if let Scalar::Host(v) = alpha {
        if v == T::ZERO {
            return Ok(());
        }
    }
    check_ptr("x", x.ptr.is_null())?;
    check_ptr("y", y.ptr.is_null())?;
    check_ptr("A", a.ptr.is_null())?;

    let square = Scan::Matrix { m: n, n, a };
    let inputs = [square, Scan::Vector { n, v: x }, Scan::Vector { n, v: y }];
    check_numerics::<T, R>(handle, name, NumericsStage::Input, &inputs, batch_count)?;

    let args = Her2Args {
        n,
        upper,
        alpha,
        x: x.shifted(n as i64),
        y: y.shifted(n as i64),
        a,
    };
    let client = handle.client();
    for_each_launch(batch_count, |first, len| {
        let cfg = LaunchConfig::batched(n, len, HER2_BLOCK);
        // SAFETY: validated non-null operands; chunk bounds come from batch_count
        unsafe { client.her2_kernel::<T>(cfg, args.advance(first)) }
    })?;

    check_numerics::<T, R>(handle, name, NumericsStage::Output, &[square], batch_count)
}
