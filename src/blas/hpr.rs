//! Batched packed Hermitian rank-1 update

use super::args::{BatchPtr, HprArgs, Operand, Scalar, VectorArg};
use super::check_numerics::{Scan, check_numerics};
use super::logging::{CallLog, LogValue};
use super::traits::BlasKernels;
use super::types::Fill;
use super::{check_inc, check_ptr, check_size, for_each_launch};
use crate::addressing::packed_size;
use crate::dtype::Element;
use crate::error::{NumericsStage, Result};
use crate::handle::Handle;
use crate::runtime::{LaunchConfig, Runtime};

const HPR_BLOCK: u32 = 128;

/// `AP_b := alpha * x_b * x_bᴴ + AP_b` with pointer arrays `x` and `ap`
///
/// `alpha` is real. For real `T` this is the symmetric packed update.
#[allow(clippy::too_many_arguments)]
pub fn hpr_batched<T: Element, R: Runtime>(
    handle: &Handle<R>,
    uplo: Fill,
    n: i64,
    alpha: Scalar<T::Real>,
    x: u64,
    incx: i64,
    ap: u64,
    batch_count: i64,
) -> Result<()>
where
    R::Client: BlasKernels<R>,
{
    hpr_template::<T, R>(
        handle,
        "hpr_batched",
        uplo,
        n,
        alpha,
        VectorArg::new(BatchPtr::array(x), incx),
        Operand::new(BatchPtr::array(ap)),
        batch_count,
    )
}

/// `AP_b := alpha * x_b * x_bᴴ + AP_b` with base+stride addressing
#[allow(clippy::too_many_arguments)]
pub fn hpr_strided_batched<T: Element, R: Runtime>(
    handle: &Handle<R>,
    uplo: Fill,
    n: i64,
    alpha: Scalar<T::Real>,
    x: u64,
    incx: i64,
    stride_x: i64,
    ap: u64,
    stride_ap: i64,
    batch_count: i64,
) -> Result<()>
where
    R::Client: BlasKernels<R>,
{
    hpr_template::<T, R>(
        handle,
        "hpr_strided_batched",
        uplo,
        n,
        alpha,
        VectorArg::new(BatchPtr::strided(x, stride_x), incx),
        Operand::new(BatchPtr::strided(ap, stride_ap)),
        batch_count,
    )
}

#[allow(clippy::too_many_arguments)]
fn hpr_template<T: Element, R: Runtime>(
    handle: &Handle<R>,
    name: &'static str,
    uplo: Fill,
    n: i64,
    alpha: Scalar<T::Real>,
    x: VectorArg,
    ap: Operand,
    batch_count: i64,
) -> Result<()>
where
    R::Client: BlasKernels<R>,
{
    handle.log_call(|| {
        CallLog::new(T::DTYPE, name)
            .arg("uplo", LogValue::Char(uplo.letter()))
            .arg("n", LogValue::Int(n))
            .arg("alpha", LogValue::from_scalar::<T::Real, R>(&alpha, handle.device()))
            .arg("x", LogValue::Ptr(x.ptr.raw()))
            .arg("incx", LogValue::Int(x.inc))
            .arg("stride_x", LogValue::Int(x.ptr.stride()))
            .arg("AP", LogValue::Ptr(ap.ptr.raw()))
            .arg("stride_AP", LogValue::Int(ap.ptr.stride()))
            .arg("batch_count", LogValue::Int(batch_count))
    });

    let upper = uplo.triangle_upper()?;
    let n = check_size("n", n)?;
    check_inc("incx", x.inc)?;
    let batch_count = check_size("batch_count", batch_count)?;
    if n == 0 || batch_count == 0 || handle.is_device_memory_size_query() {
        return Ok(());
    }

    check_ptr("alpha", alpha.is_null())?;
    if let Scalar::Host(a) = alpha {
        if a == <T::Real as Element>::ZERO {
            return Ok(());
        }
    }
    check_ptr("x", x.ptr.is_null())?;
    check_ptr("AP", ap.ptr.is_null())?;

    let operands = [
        Scan::Contiguous {
            len: packed_size(n as i64),
            op: ap,
        },
        Scan::Vector { n, v: x },
    ];
    check_numerics::<T, R>(handle, name, NumericsStage::Input, &operands, batch_count)?;

    let args = HprArgs::<T> {
        n,
        upper,
        alpha,
        x: x.shifted(n as i64),
        ap,
    };
    let client = handle.client();
    for_each_launch(batch_count, |first, len| {
        let cfg = LaunchConfig::batched(n, len, HPR_BLOCK);
        // SAFETY: validated non-null operands; chunk bounds come from batch_count
        unsafe { client.hpr_kernel::<T>(cfg, args.advance(first)) }
    })?;

    check_numerics::<T, R>(handle, name, NumericsStage::Output, &operands[..1], batch_count)
}
