//! Shape, stride and grouping parameters shared by host and device containers

use crate::addressing::{element_offset, multiple_stride, packed_size};
use crate::error::{Error, Result};
use std::ops::Range;

/// Logical layout of a batch container
///
/// A vector of length `n` and increment `inc` is stored as a `1 × n` matrix
/// with leading dimension `max(1, |inc|)`; a packed matrix of order `n` is a
/// unit-increment vector of `n(n+1)/2` entries.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct BatchLayout {
    rows: usize,
    cols: usize,
    lda: usize,
    inc: i64,
    stride: isize,
    batch_count: usize,
    multiple_count: usize,
    multiple_stride: usize,
}

impl BatchLayout {
    /// `rows × cols` column-major matrices with leading dimension `lda`
    pub fn matrix<T>(
        rows: usize,
        cols: usize,
        lda: usize,
        stride: isize,
        batch_count: usize,
        multiple_count: usize,
    ) -> Self {
        Self {
            rows,
            cols,
            lda,
            inc: 1,
            stride,
            batch_count,
            multiple_count,
            multiple_stride: multiple_stride::<T>(cols, lda, stride, batch_count),
        }
    }

    /// Vectors of length `n` with increment `inc`
    pub fn vector<T>(
        n: usize,
        inc: i64,
        stride: isize,
        batch_count: usize,
        multiple_count: usize,
    ) -> Self {
        let lda = (inc.unsigned_abs() as usize).max(1);
        Self {
            inc,
            ..Self::matrix::<T>(1, n, lda, stride, batch_count, multiple_count)
        }
    }

    /// Packed triangular matrices of order `n`
    pub fn packed<T>(n: usize, stride: isize, batch_count: usize, multiple_count: usize) -> Self {
        Self::vector::<T>(packed_size(n as i64), 1, stride, batch_count, multiple_count)
    }

    /// Rows per batch element (1 for vectors)
    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Columns per batch element (vector length for vectors)
    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Leading dimension (`|inc|` for vectors)
    #[inline]
    pub fn lda(&self) -> usize {
        self.lda
    }

    /// Vector increment (1 for matrices)
    #[inline]
    pub fn inc(&self) -> i64 {
        self.inc
    }

    /// Element distance between consecutive batch elements
    #[inline]
    pub fn stride(&self) -> isize {
        self.stride
    }

    /// Batch elements per group
    #[inline]
    pub fn batch_count(&self) -> usize {
        self.batch_count
    }

    /// Number of groups
    #[inline]
    pub fn multiple_count(&self) -> usize {
        self.multiple_count
    }

    /// Alignment-padded element distance between groups
    #[inline]
    pub fn multiple_stride(&self) -> usize {
        self.multiple_stride
    }

    /// Number of elements backing the container
    #[inline]
    pub fn total_elements(&self) -> usize {
        self.multiple_stride.saturating_mul(self.multiple_count)
    }

    /// Elements one batch element spans, from its first to its last entry
    #[inline]
    pub fn element_extent(&self) -> usize {
        if self.cols == 0 || self.rows == 0 {
            return 0;
        }
        self.lda * (self.cols - 1) + self.rows
    }

    /// Offset of group `multiple_index`
    #[inline]
    pub fn group_offset(&self, multiple_index: usize) -> usize {
        multiple_index * self.multiple_stride
    }

    /// Offset of batch element `(multiple_index, batch_index)`
    #[inline]
    pub fn batch_offset(&self, multiple_index: usize, batch_index: usize) -> usize {
        element_offset(
            multiple_index,
            self.multiple_stride,
            batch_index,
            self.batch_count,
            self.stride,
        )
    }

    /// Element range of batch element `(multiple_index, batch_index)`
    #[inline]
    pub fn batch_range(&self, multiple_index: usize, batch_index: usize) -> Range<usize> {
        let start = self.batch_offset(multiple_index, batch_index);
        start..start + self.element_extent()
    }

    /// Ok when `other` has exactly this layout, naming the first difference otherwise
    pub fn check_compatible(&self, other: &BatchLayout) -> Result<()> {
        let fields: [(&str, i128, i128); 8] = [
            ("rows", self.rows as i128, other.rows as i128),
            ("cols", self.cols as i128, other.cols as i128),
            ("lda", self.lda as i128, other.lda as i128),
            ("inc", self.inc as i128, other.inc as i128),
            ("stride", self.stride as i128, other.stride as i128),
            ("batch_count", self.batch_count as i128, other.batch_count as i128),
            ("multiple_count", self.multiple_count as i128, other.multiple_count as i128),
            ("multiple_stride", self.multiple_stride as i128, other.multiple_stride as i128),
        ];
        match fields.iter().find(|(_, a, b)| a != b) {
            None => Ok(()),
            Some((name, a, b)) => Err(Error::layout_mismatch(format!("{name}: {a} != {b}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vector_layout() {
        let l = BatchLayout::vector::<f64>(5, -2, 20, 3, 2);
        assert_eq!(l.lda(), 2);
        assert_eq!(l.inc(), -2);
        assert_eq!(l.element_extent(), 9);
        // 2 * 5 + 2 * 20 = 50, padded to 8 f64
        assert_eq!(l.multiple_stride(), 56);
        assert_eq!(l.total_elements(), 112);
        assert_eq!(l.batch_range(1, 2), 96..105);
    }

    #[test]
    fn test_packed_layout() {
        let l = BatchLayout::packed::<f32>(4, 10, 2, 1);
        assert_eq!(l.cols(), 10);
        assert_eq!(l.element_extent(), 10);
        assert_eq!(l.multiple_stride(), 32);
    }

    #[test]
    fn test_zero_sized_layout() {
        let l = BatchLayout::matrix::<f32>(0, 0, 1, 0, 0, 4);
        assert_eq!(l.total_elements(), 0);
        assert_eq!(l.element_extent(), 0);
    }

    #[test]
    fn test_compatibility_names_first_difference() {
        let a = BatchLayout::matrix::<f64>(3, 3, 4, 12, 2, 1);
        assert!(a.check_compatible(&a).is_ok());
        let b = BatchLayout::matrix::<f64>(3, 3, 5, 15, 2, 1);
        let err = a.check_compatible(&b).unwrap_err();
        assert!(err.to_string().contains("lda"));
    }
}
