//! Strided addressing calculator
//!
//! Pure functions that turn shape, stride and batch parameters into element
//! offsets and allocation sizes. Host and device containers both size
//! themselves through [`multiple_stride`] and [`total_elements`], which keeps
//! their layouts byte-for-byte transfer compatible.
//!
//! # Layout
//!
//! ```text
//! group 0                                   group 1
//! ├── batch 0 ── batch 1 ── ... ── pad ──┤ ├── batch 0 ── ...
//! |<------------ multiple_stride -------->|
//! ```
//!
//! A negative `stride` stores batch 0 at the highest offset of its group, so
//! walking `base + b * stride` from batch 0 never leaves the group.
//!
//! Size computations saturate instead of wrapping: an absurd shape yields an
//! absurd size that the allocator then refuses.

use std::mem;

/// Byte boundary every multiple stride is padded to (one cache line)
pub const STRIDE_ALIGNMENT_BYTES: usize = 64;

/// Number of elements in a packed triangular matrix of order `n`
///
/// Returns 0 for `n <= 0`; callers reject negative orders before sizing
/// anything.
#[inline]
pub fn packed_size(n: i64) -> usize {
    if n <= 0 {
        return 0;
    }
    let n = n as usize;
    n.saturating_mul(n.saturating_add(1)) / 2
}

/// Alignment of `T` expressed in elements
///
/// Types wider than the alignment boundary align to a single element.
#[inline]
pub fn alignment_in_elements<T>() -> usize {
    (STRIDE_ALIGNMENT_BYTES / mem::size_of::<T>().max(1)).max(1)
}

/// Round `raw` up to the next multiple of `align` elements
#[inline]
pub fn align_stride_with(raw: usize, align: usize) -> usize {
    let align = align.max(1);
    match raw % align {
        0 => raw,
        rem => raw.saturating_add(align - rem),
    }
}

/// Round `raw` up to the cache-line boundary for `T`
#[inline]
pub fn align_stride<T>(raw: usize) -> usize {
    align_stride_with(raw, alignment_in_elements::<T>())
}

/// Unpadded extent of one group: `lda * cols + (batch_count - 1) * |stride|`
#[inline]
pub fn group_extent(cols: usize, lda: usize, stride: isize, batch_count: usize) -> usize {
    lda.saturating_mul(cols).saturating_add(
        batch_count
            .saturating_sub(1)
            .saturating_mul(stride.unsigned_abs()),
    )
}

/// Minimum alignment-padded offset between consecutive groups
#[inline]
pub fn multiple_stride<T>(cols: usize, lda: usize, stride: isize, batch_count: usize) -> usize {
    align_stride::<T>(group_extent(cols, lda, stride, batch_count))
}

/// Total number of elements backing `multiple_count` groups
#[inline]
pub fn total_elements<T>(
    cols: usize,
    lda: usize,
    stride: isize,
    batch_count: usize,
    multiple_count: usize,
) -> usize {
    multiple_stride::<T>(cols, lda, stride, batch_count).saturating_mul(multiple_count)
}

/// Offset of batch element `batch_index` from the start of its group
///
/// With a negative stride batch 0 sits at `(batch_count - 1) * |stride|`.
#[inline]
pub fn batch_offset(batch_index: usize, batch_count: usize, stride: isize) -> usize {
    if stride >= 0 {
        batch_index * stride as usize
    } else {
        (batch_count - 1 - batch_index) * stride.unsigned_abs()
    }
}

/// Offset of `(multiple_index, batch_index)` from the start of the allocation
#[inline]
pub fn element_offset(
    multiple_index: usize,
    multiple_stride: usize,
    batch_index: usize,
    batch_count: usize,
    stride: isize,
) -> usize {
    multiple_index * multiple_stride + batch_offset(batch_index, batch_count, stride)
}

/// Number of elements spanned by a vector of length `n` with increment `inc`
#[inline]
pub fn vector_extent(n: usize, inc: i64) -> usize {
    if n == 0 {
        return 0;
    }
    1 + (n - 1) * inc.unsigned_abs() as usize
}

/// Starting offset of the first kernel-visited element
///
/// A negative increment walks the vector backward: logical element 0 lives
/// at `offset + (n - 1) * |inc|`.
#[inline]
pub fn increment_shift(offset: isize, inc: i64, n: i64) -> isize {
    if inc < 0 {
        offset - (inc as isize) * (n as isize - 1)
    } else {
        offset
    }
}

/// Linear offset of `(row, col)` in a packed matrix of order `n`
///
/// Column-major packing: the upper triangle stores column `j` as rows
/// `0..=j`, the lower triangle stores column `j` as rows `j..n`. Returns
/// `None` outside the stored triangle.
#[inline]
pub fn packed_offset(upper: bool, n: usize, row: usize, col: usize) -> Option<usize> {
    if row >= n || col >= n {
        return None;
    }
    if upper {
        (row <= col).then(|| col * (col + 1) / 2 + row)
    } else {
        (row >= col).then(|| col * (2 * n - col - 1) / 2 + row)
    }
}
