//! Host-resident batch container

use super::device::DeviceBatch;
use super::layout::BatchLayout;
use crate::dtype::Element;
use crate::error::{Error, Result};
use crate::runtime::Runtime;
use std::mem;

/// Batch of matrices or vectors in host memory
#[derive(Clone, Debug)]
pub struct HostBatch<T: Element> {
    layout: BatchLayout,
    data: Vec<T>,
    valid: bool,
}

impl<T: Element> HostBatch<T> {
    /// Allocate a zero-filled container for `layout`
    ///
    /// Allocation failure leaves the container invalid; see [`Self::memcheck`].
    pub fn new(layout: BatchLayout) -> Self {
        let len = layout.total_elements();
        let mut data = Vec::new();
        let valid = data.try_reserve_exact(len).is_ok();
        if valid {
            data.resize(len, T::ZERO);
        }
        Self {
            layout,
            data,
            valid,
        }
    }

    /// Matrix container, see [`BatchLayout::matrix`]
    pub fn matrix(
        rows: usize,
        cols: usize,
        lda: usize,
        stride: isize,
        batch_count: usize,
        multiple_count: usize,
    ) -> Self {
        Self::new(BatchLayout::matrix::<T>(
            rows,
            cols,
            lda,
            stride,
            batch_count,
            multiple_count,
        ))
    }

    /// Vector container, see [`BatchLayout::vector`]
    pub fn vector(n: usize, inc: i64, stride: isize, batch_count: usize, multiple_count: usize) -> Self {
        Self::new(BatchLayout::vector::<T>(n, inc, stride, batch_count, multiple_count))
    }

    /// Packed-matrix container, see [`BatchLayout::packed`]
    pub fn packed(n: usize, stride: isize, batch_count: usize, multiple_count: usize) -> Self {
        Self::new(BatchLayout::packed::<T>(n, stride, batch_count, multiple_count))
    }

    /// Layout of this container
    #[inline]
    pub fn layout(&self) -> &BatchLayout {
        &self.layout
    }

    /// True when the backing allocation succeeded
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// Ok when the backing allocation succeeded
    pub fn memcheck(&self) -> Result<()> {
        if self.valid {
            Ok(())
        } else {
            Err(Error::OutOfMemory {
                size: self.layout.total_elements().saturating_mul(mem::size_of::<T>()),
            })
        }
    }

    /// Whole backing allocation
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// Whole backing allocation, mutable
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }

    /// Group `multiple_index`, from its first element to the next group
    pub fn group(&self, multiple_index: usize) -> &[T] {
        let start = self.layout.group_offset(multiple_index);
        &self.data[start..start + self.layout.multiple_stride()]
    }

    /// Group `multiple_index`, mutable
    pub fn group_mut(&mut self, multiple_index: usize) -> &mut [T] {
        let start = self.layout.group_offset(multiple_index);
        let end = start + self.layout.multiple_stride();
        &mut self.data[start..end]
    }

    /// Storage of one batch element (`lda`/`inc` spacing preserved)
    pub fn batch(&self, multiple_index: usize, batch_index: usize) -> &[T] {
        &self.data[self.layout.batch_range(multiple_index, batch_index)]
    }

    /// Storage of one batch element, mutable
    pub fn batch_mut(&mut self, multiple_index: usize, batch_index: usize) -> &mut [T] {
        let range = self.layout.batch_range(multiple_index, batch_index);
        &mut self.data[range]
    }

    /// Logical entries of a vector batch element, in increment order
    ///
    /// For a negative increment entry 0 is the last one in memory. With a
    /// zero increment every entry aliases the single stored element.
    pub fn vector_entries(&self, multiple_index: usize, batch_index: usize) -> Vec<T> {
        let storage = self.batch(multiple_index, batch_index);
        if self.layout.inc() == 0 {
            return storage
                .first()
                .map(|&v| vec![v; self.layout.cols()])
                .unwrap_or_default();
        }
        let step = self.layout.lda().max(1);
        let mut out: Vec<T> = storage.iter().step_by(step).copied().collect();
        if self.layout.inc() < 0 {
            out.reverse();
        }
        out
    }

    /// Fill every stored entry of every batch element from `f`
    ///
    /// Padding between batch elements and groups is left untouched.
    pub fn fill_with(&mut self, mut f: impl FnMut() -> T) {
        let (rows, cols, lda) = (self.layout.rows(), self.layout.cols(), self.layout.lda());
        for mi in 0..self.layout.multiple_count() {
            for b in 0..self.layout.batch_count() {
                let start = self.layout.batch_offset(mi, b);
                for j in 0..cols {
                    for i in 0..rows {
                        self.data[start + j * lda + i] = f();
                    }
                }
            }
        }
    }

    /// Copy from a container with an identical layout
    ///
    /// All-or-nothing: on any layout difference nothing is written.
    pub fn copy_from(&mut self, other: &HostBatch<T>) -> Result<()> {
        self.layout.check_compatible(&other.layout)?;
        self.memcheck()?;
        other.memcheck()?;
        self.data.copy_from_slice(&other.data);
        Ok(())
    }

    /// Copy a device container's contents into this one, blocking
    ///
    /// Managed memory is read directly after a device-wide barrier; device
    /// memory goes through a device-to-host copy.
    pub fn transfer_from<R: Runtime>(&mut self, device: &DeviceBatch<T, R>) -> Result<()> {
        self.layout.check_compatible(device.layout())?;
        self.memcheck()?;
        device.memcheck()?;
        if self.data.is_empty() {
            return Ok(());
        }

        if device.is_managed() {
            R::synchronize(device.device())?;
            // SAFETY: managed memory is host-addressable and holds
            // total_elements() values of T; layouts match so lengths agree.
            unsafe {
                std::ptr::copy_nonoverlapping(
                    device.ptr() as *const T,
                    self.data.as_mut_ptr(),
                    self.data.len(),
                );
            }
            Ok(())
        } else {
            R::copy_from_device(
                device.ptr(),
                bytemuck::cast_slice_mut(&mut self.data),
                device.device(),
            )
        }
    }
}
