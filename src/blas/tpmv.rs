//! Batched packed triangular matrix-vector product

use super::args::{BatchPtr, Operand, TpmvArgs, VectorArg};
use super::check_numerics::{Scan, check_numerics};
use super::copy::launch_copy;
use super::logging::{CallLog, LogValue};
use super::traits::BlasKernels;
use super::types::{Diagonal, Fill, Operation};
use super::{check_inc, check_ptr, check_size, for_each_launch};
use crate::addressing::packed_size;
use crate::dtype::Element;
use crate::error::{Error, NumericsStage, Result};
use crate::handle::Handle;
use crate::memory::Workspace;
use crate::runtime::{LaunchConfig, Runtime, RuntimeClient};
use std::mem;

const TPMV_BLOCK: u32 = 512;

/// `x_b := op(A_b) * x_b` with pointer arrays `a` and `x`
#[allow(clippy::too_many_arguments)]
pub fn tpmv_batched<T: Element, R: Runtime>(
    handle: &Handle<R>,
    uplo: Fill,
    trans: Operation,
    diag: Diagonal,
    m: i64,
    a: u64,
    x: u64,
    incx: i64,
    batch_count: i64,
) -> Result<()>
where
    R::Client: BlasKernels<R>,
{
    tpmv_template::<T, R>(
        handle,
        "tpmv_batched",
        uplo,
        trans,
        diag,
        m,
        Operand::new(BatchPtr::array(a)),
        VectorArg::new(BatchPtr::array(x), incx),
        batch_count,
    )
}

/// `x_b := op(A_b) * x_b` with base+stride addressing
#[allow(clippy::too_many_arguments)]
pub fn tpmv_strided_batched<T: Element, R: Runtime>(
    handle: &Handle<R>,
    uplo: Fill,
    trans: Operation,
    diag: Diagonal,
    m: i64,
    a: u64,
    stride_a: i64,
    x: u64,
    incx: i64,
    stride_x: i64,
    batch_count: i64,
) -> Result<()>
where
    R::Client: BlasKernels<R>,
{
    tpmv_template::<T, R>(
        handle,
        "tpmv_strided_batched",
        uplo,
        trans,
        diag,
        m,
        Operand::new(BatchPtr::strided(a, stride_a)),
        VectorArg::new(BatchPtr::strided(x, stride_x), incx),
        batch_count,
    )
}

/// Workspace bytes one call needs: one contiguous vector per batch element
fn workspace_bytes<T>(m: usize, batch_count: usize) -> Result<usize> {
    m.checked_mul(batch_count)
        .and_then(|n| n.checked_mul(mem::size_of::<T>()))
        .ok_or(Error::OutOfMemory { size: usize::MAX })
}

#[allow(clippy::too_many_arguments)]
fn tpmv_template<T: Element, R: Runtime>(
    handle: &Handle<R>,
    name: &'static str,
    uplo: Fill,
    trans: Operation,
    diag: Diagonal,
    m: i64,
    a: Operand,
    x: VectorArg,
    batch_count: i64,
) -> Result<()>
where
    R::Client: BlasKernels<R>,
{
    handle.log_call(|| {
        CallLog::new(T::DTYPE, name)
            .arg("uplo", LogValue::Char(uplo.letter()))
            .arg("transA", LogValue::Char(trans.letter()))
            .arg("diag", LogValue::Char(diag.letter()))
            .arg("m", LogValue::Int(m))
            .arg("A", LogValue::Ptr(a.ptr.raw()))
            .arg("stride_a", LogValue::Int(a.ptr.stride()))
            .arg("x", LogValue::Ptr(x.ptr.raw()))
            .arg("incx", LogValue::Int(x.inc))
            .arg("stride_x", LogValue::Int(x.ptr.stride()))
            .arg("batch_count", LogValue::Int(batch_count))
    });

    let upper = uplo.triangle_upper()?;
    let m = check_size("m", m)?;
    check_inc("incx", x.inc)?;
    let batch_count = check_size("batch_count", batch_count)?;
    if m == 0 || batch_count == 0 {
        return Ok(());
    }

    let ws_bytes = workspace_bytes::<T>(m, batch_count)?;
    if handle.is_device_memory_size_query() {
        handle.record_workspace_size(ws_bytes);
        return Ok(());
    }

    check_ptr("A", a.ptr.is_null())?;
    check_ptr("x", x.ptr.is_null())?;

    let client = handle.client();
    let workspace = Workspace::<R>::new(client.allocator(), ws_bytes)?;
    let w = VectorArg::new(BatchPtr::strided(workspace.ptr(), m as i64), 1);

    let packed = Scan::Contiguous {
        len: packed_size(m as i64),
        op: a,
    };
    let vector = Scan::Vector { n: m, v: x };
    check_numerics::<T, R>(
        handle,
        name,
        NumericsStage::Input,
        &[packed, vector],
        batch_count,
    )?;

    let args = TpmvArgs {
        m,
        upper,
        unit_diag: diag == Diagonal::Unit,
        a,
        x: x.shifted(m as i64),
        w,
    };
    for_each_launch(batch_count, |first, len| {
        let cfg = LaunchConfig::batched(m, len, TPMV_BLOCK);
        // SAFETY: validated non-null operands; the workspace holds
        // m * batch_count elements and overlaps nothing
        unsafe { client.tpmv_kernel::<T>(cfg, trans, args.advance::<T>(first)) }
    })?;

    // Same stream, so the copy observes the finished workspace
    launch_copy::<T, R>(client, m, w, x, batch_count)?;

    check_numerics::<T, R>(handle, name, NumericsStage::Output, &[vector], batch_count)
}
