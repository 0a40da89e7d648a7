//! Tolerance checks between reference and computed results

use crate::dtype::{Element, RealElement};
use crate::memory::HostBatch;
use thiserror::Error;

/// First entry that failed a tolerance check
#[derive(Error, Debug, Clone, PartialEq)]
#[error(
    "mismatch at group {multiple}, batch {batch}, row {row}, col {col}: expected {expected}, got {actual} (tolerance {tolerance:e})"
)]
pub struct CheckFailure {
    /// Group index
    pub multiple: usize,
    /// Batch index within the group
    pub batch: usize,
    /// Row
    pub row: usize,
    /// Column
    pub col: usize,
    /// Reference value, formatted
    pub expected: String,
    /// Computed value, formatted
    pub actual: String,
    /// Relative tolerance that was exceeded
    pub tolerance: f64,
}

/// Per-operation-step error allowance for `T`
///
/// Callers scale it by the number of accumulated terms, e.g.
/// `n as f64 * sum_error_tolerance::<T>()`.
pub fn sum_error_tolerance<T: Element>() -> f64 {
    <T::Real as RealElement>::EPSILON.to_f64() * 10.0
}

fn entry_distance<T: Element>(a: T, b: T) -> (f64, f64) {
    ((a - b).magnitude().to_f64(), b.magnitude().to_f64())
}

/// Compare one `m × n` column-major matrix entry by entry
///
/// Passes when `|actual - expected| <= tol * max(1, |expected|)` everywhere;
/// reports the first failing entry with `multiple` and `batch` left at 0.
pub fn near_check_general<T: Element>(
    m: usize,
    n: usize,
    lda: usize,
    expected: &[T],
    actual: &[T],
    tol: f64,
) -> Result<(), CheckFailure> {
    for col in 0..n {
        for row in 0..m {
            let idx = row + col * lda;
            let (diff, scale) = entry_distance(actual[idx], expected[idx]);
            // Negated comparison also rejects NaN
            if !(diff <= tol * scale.max(1.0)) {
                return Err(CheckFailure {
                    multiple: 0,
                    batch: 0,
                    row,
                    col,
                    expected: expected[idx].to_string(),
                    actual: actual[idx].to_string(),
                    tolerance: tol,
                });
            }
        }
    }
    Ok(())
}

/// Relative Frobenius error `‖actual - expected‖ / ‖expected‖` of one matrix
///
/// Falls back to the absolute error when `expected` is zero.
pub fn norm_check_general<T: Element>(
    m: usize,
    n: usize,
    lda: usize,
    expected: &[T],
    actual: &[T],
) -> f64 {
    let mut diff = 0.0f64;
    let mut reference = 0.0f64;
    for col in 0..n {
        for row in 0..m {
            let idx = row + col * lda;
            let (d, r) = entry_distance(actual[idx], expected[idx]);
            diff += d * d;
            reference += r * r;
        }
    }
    if reference == 0.0 {
        diff.sqrt()
    } else {
        (diff / reference).sqrt()
    }
}

/// [`near_check_general`] over every batch element of two containers
///
/// Both containers must share a layout; vectors are compared entry by entry
/// at their increment.
pub fn near_check_batch<T: Element>(
    expected: &HostBatch<T>,
    actual: &HostBatch<T>,
    tol: f64,
) -> Result<(), CheckFailure> {
    let layout = expected.layout();
    for mi in 0..layout.multiple_count() {
        for b in 0..layout.batch_count() {
            near_check_general(
                layout.rows(),
                layout.cols(),
                layout.lda(),
                expected.batch(mi, b),
                actual.batch(mi, b),
                tol,
            )
            .map_err(|failure| CheckFailure {
                multiple: mi,
                batch: b,
                ..failure
            })?;
        }
    }
    Ok(())
}

/// Largest [`norm_check_general`] error over every batch element
pub fn norm_check_batch<T: Element>(expected: &HostBatch<T>, actual: &HostBatch<T>) -> f64 {
    let layout = expected.layout();
    let mut worst = 0.0f64;
    for mi in 0..layout.multiple_count() {
        for b in 0..layout.batch_count() {
            let err = norm_check_general(
                layout.rows(),
                layout.cols(),
                layout.lda(),
                expected.batch(mi, b),
                actual.batch(mi, b),
            );
            worst = worst.max(err);
        }
    }
    worst
}
