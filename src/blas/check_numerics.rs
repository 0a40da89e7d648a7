//! NaN/Inf scan around kernel launches
//!
//! Operands are read back to the host batch element by batch element, so the
//! scan works for any runtime. It only runs when the handle enables it.

use super::args::{BatchPtr, MatrixArg, Operand, VectorArg};
use crate::addressing::vector_extent;
use crate::dtype::Element;
use crate::error::{Error, NumericsStage, Result};
use crate::handle::{CheckNumerics, Handle};
use crate::runtime::Runtime;
use std::mem;

/// Operand shapes that can be scanned
#[derive(Copy, Clone, Debug)]
pub(crate) enum Scan {
    /// Vector of `n` entries; the offset is the lowest entry in memory
    Vector { n: usize, v: VectorArg },
    /// `len` contiguous entries (packed matrices, scalars)
    Contiguous { len: usize, op: Operand },
    /// `m × n` column-major matrix
    Matrix { m: usize, n: usize, a: MatrixArg },
}

impl Scan {
    fn ptr(&self) -> BatchPtr {
        match self {
            Scan::Vector { v, .. } => v.ptr,
            Scan::Contiguous { op, .. } => op.ptr,
            Scan::Matrix { a, .. } => a.ptr,
        }
    }
}

/// True when any batch element of `scan` holds a NaN or infinity
pub(crate) fn has_nan_or_inf<T: Element, R: Runtime>(
    scan: Scan,
    batch_count: usize,
    device: &R::Device,
) -> Result<bool> {
    let bases = scan.ptr().resolve::<T, R>(batch_count, device)?;

    let (offset, extent, step, rows, lda) = match scan {
        Scan::Vector { n, v } => (
            v.offset,
            vector_extent(n, v.inc),
            v.inc.unsigned_abs() as usize,
            1,
            1,
        ),
        Scan::Contiguous { len, op } => (op.offset, len, 1, 1, 1),
        Scan::Matrix { m, n, a } => {
            let extent = if m == 0 || n == 0 {
                0
            } else {
                a.lda as usize * (n - 1) + m
            };
            (a.offset, extent, 1, m, a.lda as usize)
        }
    };
    if extent == 0 {
        return Ok(false);
    }

    let mut host = vec![T::ZERO; extent];
    for base in bases {
        let start = base.wrapping_add((offset as i64 * mem::size_of::<T>() as i64) as u64);
        R::copy_from_device(start, bytemuck::cast_slice_mut(&mut host), device)?;

        let found = if rows > 1 || lda > 1 {
            host.chunks(lda)
                .any(|col| col.iter().take(rows).any(|v| v.is_nan_or_inf()))
        } else {
            host.iter().step_by(step.max(1)).any(|v| v.is_nan_or_inf())
        };
        if found {
            return Ok(true);
        }
    }
    Ok(false)
}

/// Scan `operands` and report according to the handle's check mode
///
/// `Warn` logs and continues; `Fail` returns [`Error::Numerics`].
pub(crate) fn check_numerics<T: Element, R: Runtime>(
    handle: &Handle<R>,
    op: &'static str,
    stage: NumericsStage,
    operands: &[Scan],
    batch_count: usize,
) -> Result<()> {
    let mode = handle.check_numerics();
    if mode == CheckNumerics::Off {
        return Ok(());
    }

    for &scan in operands {
        if has_nan_or_inf::<T, R>(scan, batch_count, handle.device())? {
            return report(mode, op, stage);
        }
    }
    Ok(())
}

/// Same as [`check_numerics`] for operands holding real values of `T`
pub(crate) fn check_numerics_real<T: Element, R: Runtime>(
    handle: &Handle<R>,
    op: &'static str,
    stage: NumericsStage,
    operands: &[Scan],
    batch_count: usize,
) -> Result<()> {
    check_numerics::<T::Real, R>(handle, op, stage, operands, batch_count)
}

pub(crate) fn report(mode: CheckNumerics, op: &'static str, stage: NumericsStage) -> Result<()> {
    match mode {
        CheckNumerics::Off => Ok(()),
        CheckNumerics::Warn => {
            tracing::warn!(op, %stage, "NaN/Inf detected");
            Ok(())
        }
        CheckNumerics::Fail => Err(Error::Numerics { op, stage }),
    }
}
