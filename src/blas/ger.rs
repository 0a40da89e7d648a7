//! Batched general rank-1 update

use super::args::{BatchPtr, GerArgs, MatrixArg, Scalar, VectorArg};
use super::check_numerics::{Scan, check_numerics};
use super::logging::{CallLog, LogValue};
use super::traits::BlasKernels;
use super::{check_inc, check_ptr, check_size, for_each_launch};
use crate::dtype::Element;
use crate::error::{Error, NumericsStage, Result};
use crate::handle::Handle;
use crate::runtime::{LaunchConfig, Runtime};

const GER_BLOCK: u32 = 256;

/// Pointer-array or strided operands of one rank-1 update
#[derive(Copy, Clone, Debug)]
struct GerOperands {
    x: VectorArg,
    y: VectorArg,
    a: MatrixArg,
}

impl GerOperands {
    fn batched(x: u64, incx: i64, y: u64, incy: i64, a: u64, lda: i64) -> Self {
        Self {
            x: VectorArg::new(BatchPtr::array(x), incx),
            y: VectorArg::new(BatchPtr::array(y), incy),
            a: MatrixArg {
                ptr: BatchPtr::array(a),
                offset: 0,
                lda,
            },
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn strided(
        x: u64,
        incx: i64,
        stride_x: i64,
        y: u64,
        incy: i64,
        stride_y: i64,
        a: u64,
        lda: i64,
        stride_a: i64,
    ) -> Self {
        Self {
            x: VectorArg::new(BatchPtr::strided(x, stride_x), incx),
            y: VectorArg::new(BatchPtr::strided(y, stride_y), incy),
            a: MatrixArg {
                ptr: BatchPtr::strided(a, stride_a),
                offset: 0,
                lda,
            },
        }
    }
}

macro_rules! ger_entry_points {
    ($conj:literal, $batched:ident, $strided:ident, $op:literal) => {
        #[doc = concat!("`A_b := alpha * x_b * ", $op, " + A_b` with pointer arrays")]
        #[allow(clippy::too_many_arguments)]
        pub fn $batched<T: Element, R: Runtime>(
            handle: &Handle<R>,
            m: i64,
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
            ger_template::<T, R>(
                handle,
                stringify!($batched),
                $conj,
                m,
                n,
                alpha,
                GerOperands::batched(x, incx, y, incy, a, lda),
                batch_count,
            )
        }

        #[doc = concat!("`A_b := alpha * x_b * ", $op, " + A_b` with base+stride addressing")]
        #[allow(clippy::too_many_arguments)]
        pub fn $strided<T: Element, R: Runtime>(
            handle: &Handle<R>,
            m: i64,
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
            ger_template::<T, R>(
                handle,
                stringify!($strided),
                $conj,
                m,
                n,
                alpha,
                GerOperands::strided(x, incx, stride_x, y, incy, stride_y, a, lda, stride_a),
                batch_count,
            )
        }
    };
}

ger_entry_points!(false, ger_batched, ger_strided_batched, "y_bᵀ");
ger_entry_points!(true, gerc_batched, gerc_strided_batched, "y_bᴴ");

#[allow(clippy::too_many_arguments)]
fn ger_template<T: Element, R: Runtime>(
    handle: &Handle<R>,
    name: &'static str,
    conj: bool,
    m: i64,
    n: i64,
    alpha: Scalar<T>,
    ops: GerOperands,
    batch_count: i64,
) -> Result<()>
where
    R::Client: BlasKernels<R>,
{
    let GerOperands { x, y, a } = ops;
    handle.log_call(|| {
        CallLog::new(T::DTYPE, name)
            .arg("m", LogValue::Int(m))
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

    let m = check_size("m", m)?;
    let n = check_size("n", n)?;
    check_inc("incx", x.inc)?;
    check_inc("incy", y.inc)?;
    if a.lda < m.max(1) as i64 {
        return Err(Error::invalid_size(
            "lda",
            format!("must be at least max(1, m) = {}, got {}", m.max(1), a.lda),
        ));
    }
    let batch_count = check_size("batch_count", batch_count)?;
    if m == 0 || n == 0 || batch_count == 0 || handle.is_device_memory_size_query() {
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

    let matrix = Scan::Matrix { m, n, a };
    let inputs = [matrix, Scan::Vector { n: m, v: x }, Scan::Vector { n, v: y }];
    check_numerics::<T, R>(handle, name, NumericsStage::Input, &inputs, batch_count)?;

    let args = GerArgs {
        m,
        n,
        conj,
        alpha,
        x: x.shifted(m as i64),
        y: y.shifted(n as i64),
        a,
    };
    let client = handle.client();
    for_each_launch(batch_count, |first, len| {
        let cfg = LaunchConfig::batched(m, len, GER_BLOCK);
        // SAFETY: validated non-null operands; chunk bounds come from batch_count
        unsafe { client.ger_kernel::<T>(cfg, args.advance(first)) }
    })?;

    check_numerics::<T, R>(handle, name, NumericsStage::Output, &[matrix], batch_count)
}
