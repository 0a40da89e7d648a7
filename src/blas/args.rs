//! Kernel argument descriptors
//!
//! Operands reach kernels as plain address arithmetic so the descriptors are
//! `Copy + Send + Sync` and can be captured by worker threads. Offsets and
//! strides are counted in elements of the operand's type.

use super::types::PointerMode;
use crate::addressing::increment_shift;
use crate::dtype::Element;
use crate::error::Result;
use crate::runtime::Runtime;
use std::mem;

/// How the per-batch-element base address of an operand is found
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BatchPtr {
    /// Single allocation; element `b` starts at `base + b * stride`
    Strided {
        /// Device address of batch element 0
        base: u64,
        /// Element distance between consecutive batch elements (may be negative)
        stride: i64,
    },
    /// Device-resident array holding one device address per batch element
    Array {
        /// Device address of the pointer array
        ptrs: u64,
    },
}

impl BatchPtr {
    /// Strided form
    #[inline]
    pub fn strided(base: u64, stride: i64) -> Self {
        BatchPtr::Strided { base, stride }
    }

    /// Pointer-array form
    #[inline]
    pub fn array(ptrs: u64) -> Self {
        BatchPtr::Array { ptrs }
    }

    /// The address passed by the caller (base or pointer array)
    #[inline]
    pub fn raw(&self) -> u64 {
        match *self {
            BatchPtr::Strided { base, .. } => base,
            BatchPtr::Array { ptrs } => ptrs,
        }
    }

    /// True when the caller passed a null base or pointer array
    #[inline]
    pub fn is_null(&self) -> bool {
        self.raw() == 0
    }

    /// Batch stride, zero for the pointer-array form
    #[inline]
    pub fn stride(&self) -> i64 {
        match *self {
            BatchPtr::Strided { stride, .. } => stride,
            BatchPtr::Array { .. } => 0,
        }
    }

    /// Descriptor for the batch elements starting at `batches`
    #[inline]
    pub fn advance<T>(self, batches: usize) -> Self {
        match self {
            BatchPtr::Strided { base, stride } => BatchPtr::Strided {
                base: strided_address::<T>(base, batches, stride),
                stride,
            },
            BatchPtr::Array { ptrs } => BatchPtr::Array {
                ptrs: ptrs.wrapping_add((batches * mem::size_of::<u64>()) as u64),
            },
        }
    }

    /// Base address of batch element `batch`, as seen from the device
    ///
    /// # Safety
    /// For the pointer-array form `ptrs` must be readable and hold at least
    /// `batch + 1` addresses.
    #[inline]
    pub unsafe fn batch_base<T>(&self, batch: usize) -> u64 {
        match *self {
            BatchPtr::Strided { base, stride } => strided_address::<T>(base, batch, stride),
            BatchPtr::Array { ptrs } => (ptrs as *const u64).add(batch).read_unaligned(),
        }
    }

    /// Base addresses of the first `batch_count` elements, read from the host
    ///
    /// The pointer-array form copies the array back from the device.
    pub fn resolve<T, R: Runtime>(&self, batch_count: usize, device: &R::Device) -> Result<Vec<u64>> {
        match *self {
            BatchPtr::Strided { base, stride } => Ok((0..batch_count)
                .map(|b| strided_address::<T>(base, b, stride))
                .collect()),
            BatchPtr::Array { ptrs } => {
                let mut out = vec![0u64; batch_count];
                R::copy_from_device(ptrs, bytemuck::cast_slice_mut(&mut out), device)?;
                Ok(out)
            }
        }
    }
}

#[inline]
fn strided_address<T>(base: u64, batch: usize, stride: i64) -> u64 {
    let delta = (batch as i64)
        .wrapping_mul(stride)
        .wrapping_mul(mem::size_of::<T>() as i64);
    base.wrapping_add(delta as u64)
}

#[inline]
fn offset_address<T>(base: u64, offset: isize) -> u64 {
    base.wrapping_add((offset as i64).wrapping_mul(mem::size_of::<T>() as i64) as u64)
}

/// Batched operand addressed from its batch base plus a fixed offset
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Operand {
    /// Batch addressing
    pub ptr: BatchPtr,
    /// Element offset added to every batch base
    pub offset: isize,
}

impl Operand {
    /// Operand starting at the batch base
    #[inline]
    pub fn new(ptr: BatchPtr) -> Self {
        Self { ptr, offset: 0 }
    }

    /// First element of batch `batch`
    ///
    /// # Safety
    /// See [`BatchPtr::batch_base`].
    #[inline]
    pub unsafe fn at<T>(&self, batch: usize) -> *mut T {
        offset_address::<T>(self.ptr.batch_base::<T>(batch), self.offset) as *mut T
    }

    /// Descriptor for the batch elements starting at `batches`
    #[inline]
    pub fn advance<T>(self, batches: usize) -> Self {
        Self {
            ptr: self.ptr.advance::<T>(batches),
            ..self
        }
    }
}

/// Batched strided vector
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct VectorArg {
    /// Batch addressing
    pub ptr: BatchPtr,
    /// Element offset of the vector inside each batch element
    pub offset: isize,
    /// Element distance between consecutive vector entries
    pub inc: i64,
}

impl VectorArg {
    /// Vector with the given increment and no offset
    #[inline]
    pub fn new(ptr: BatchPtr, inc: i64) -> Self {
        Self { ptr, offset: 0, inc }
    }

    /// Copy with the offset moved to the first kernel-visited entry
    ///
    /// For a negative increment logical entry 0 is the last one in memory.
    #[inline]
    pub fn shifted(self, n: i64) -> Self {
        Self {
            offset: increment_shift(self.offset, self.inc, n),
            ..self
        }
    }

    /// Entry `i` of batch `batch`; the descriptor must already be shifted
    ///
    /// # Safety
    /// See [`BatchPtr::batch_base`].
    #[inline]
    pub unsafe fn entry<T>(&self, batch: usize, i: usize) -> *mut T {
        let idx = self.offset as i64 + i as i64 * self.inc;
        offset_address::<T>(self.ptr.batch_base::<T>(batch), idx as isize) as *mut T
    }

    /// Descriptor for the batch elements starting at `batches`
    #[inline]
    pub fn advance<T>(self, batches: usize) -> Self {
        Self {
            ptr: self.ptr.advance::<T>(batches),
            ..self
        }
    }
}

/// Batched column-major matrix with leading dimension `lda`
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct MatrixArg {
    /// Batch addressing
    pub ptr: BatchPtr,
    /// Element offset of the matrix inside each batch element
    pub offset: isize,
    /// Leading dimension
    pub lda: i64,
}

impl MatrixArg {
    /// Entry `(row, col)` of batch `batch`
    ///
    /// # Safety
    /// See [`BatchPtr::batch_base`].
    #[inline]
    pub unsafe fn entry<T>(&self, batch: usize, row: usize, col: usize) -> *mut T {
        let idx = self.offset as i64 + row as i64 + col as i64 * self.lda;
        offset_address::<T>(self.ptr.batch_base::<T>(batch), idx as isize) as *mut T
    }

    /// Descriptor for the batch elements starting at `batches`
    #[inline]
    pub fn advance<T>(self, batches: usize) -> Self {
        Self {
            ptr: self.ptr.advance::<T>(batches),
            ..self
        }
    }
}

/// Scalar argument resolved according to the pointer mode
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Scalar<T> {
    /// Value read from the host at call time
    Host(T),
    /// Device address read by the kernel
    Device(u64),
}

impl<T: Element> Scalar<T> {
    /// Scalar from a raw pointer interpreted per pointer mode
    ///
    /// A null host pointer is kept as a null address so the dispatcher
    /// reports it as an invalid pointer.
    ///
    /// # Safety
    /// In host mode a non-null `ptr` must be readable.
    pub unsafe fn from_raw(mode: PointerMode, ptr: *const T) -> Self {
        match mode {
            PointerMode::Host if !ptr.is_null() => unsafe { Scalar::Host(ptr.read_unaligned()) },
            _ => Scalar::Device(ptr as u64),
        }
    }

    /// Value as seen from a kernel
    ///
    /// # Safety
    /// A device scalar must point to readable memory holding a `T`.
    #[inline]
    pub unsafe fn load(&self) -> T {
        match *self {
            Scalar::Host(v) => v,
            Scalar::Device(ptr) => (ptr as *const T).read_unaligned(),
        }
    }

    /// True for a null device scalar
    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, Scalar::Device(0))
    }

    /// Value read back to the host (copies from the device if needed)
    pub fn fetch<R: Runtime>(&self, device: &R::Device) -> Result<T> {
        match *self {
            Scalar::Host(v) => Ok(v),
            Scalar::Device(ptr) => {
                let mut out = [T::ZERO];
                R::copy_from_device(ptr, bytemuck::cast_slice_mut(&mut out), device)?;
                Ok(out[0])
            }
        }
    }
}

/// Strided copy: `y := x`, both descriptors shifted
#[derive(Copy, Clone, Debug)]
pub struct CopyArgs {
    /// Vector length
    pub n: usize,
    /// Source
    pub x: VectorArg,
    /// Destination
    pub y: VectorArg,
}

impl CopyArgs {
    pub(crate) fn advance<T>(self, batches: usize) -> Self {
        Self {
            x: self.x.advance::<T>(batches),
            y: self.y.advance::<T>(batches),
            ..self
        }
    }
}

/// Packed Hermitian rank-1 update: `AP := alpha * x * xᴴ + AP`
#[derive(Copy, Clone, Debug)]
pub struct HprArgs<T: Element> {
    /// Matrix order
    pub n: usize,
    /// Upper (true) or lower packed triangle
    pub upper: bool,
    /// Real scaling factor
    pub alpha: Scalar<T::Real>,
    /// Shifted vector
    pub x: VectorArg,
    /// Packed matrix
    pub ap: Operand,
}

impl<T: Element> HprArgs<T> {
    pub(crate) fn advance(self, batches: usize) -> Self {
        Self {
            x: self.x.advance::<T>(batches),
            ap: self.ap.advance::<T>(batches),
            ..self
        }
    }
}

/// Packed triangular matrix-vector product into a workspace: `w := op(A) * x`
#[derive(Copy, Clone, Debug)]
pub struct TpmvArgs {
    /// Matrix order
    pub m: usize,
    /// Upper (true) or lower packed triangle
    pub upper: bool,
    /// Unit diagonal
    pub unit_diag: bool,
    /// Packed matrix
    pub a: Operand,
    /// Shifted input vector
    pub x: VectorArg,
    /// Workspace, one contiguous vector per batch element
    pub w: VectorArg,
}

impl TpmvArgs {
    pub(crate) fn advance<T>(self, batches: usize) -> Self {
        Self {
            a: self.a.advance::<T>(batches),
            x: self.x.advance::<T>(batches),
            w: self.w.advance::<T>(batches),
            ..self
        }
    }
}

/// Givens rotation generation; `c` holds real values
#[derive(Copy, Clone, Debug)]
pub struct RotgArgs {
    /// In: `a`, out: `r`
    pub a: Operand,
    /// In: `b`, out: `z` (real types only)
    pub b: Operand,
    /// Out: cosine
    pub c: Operand,
    /// Out: sine
    pub s: Operand,
}

impl RotgArgs {
    pub(crate) fn advance<T: Element>(self, batches: usize) -> Self {
        Self {
            a: self.a.advance::<T>(batches),
            b: self.b.advance::<T>(batches),
            c: self.c.advance::<T::Real>(batches),
            s: self.s.advance::<T>(batches),
        }
    }
}

/// General rank-1 update: `A := alpha * x * op(y)ᵀ + A`
#[derive(Copy, Clone, Debug)]
pub struct GerArgs<T> {
    /// Rows
    pub m: usize,
    /// Columns
    pub n: usize,
    /// Conjugate `y`
    pub conj: bool,
    /// Scaling factor
    pub alpha: Scalar<T>,
    /// Shifted column vector
    pub x: VectorArg,
    /// Shifted row vector
    pub y: VectorArg,
    /// Matrix
    pub a: MatrixArg,
}

impl<T: Element> GerArgs<T> {
    pub(crate) fn advance(self, batches: usize) -> Self {
        Self {
            x: self.x.advance::<T>(batches),
            y: self.y.advance::<T>(batches),
            a: self.a.advance::<T>(batches),
            ..self
        }
    }
}

/// Hermitian rank-2 update on one triangle:
/// `A := alpha * x * yᴴ + conj(alpha) * y * xᴴ + A`
#[derive(Copy, Clone, Debug)]
pub struct Her2Args<T> {
    /// Matrix order
    pub n: usize,
    /// Upper (true) or lower triangle
    pub upper: bool,
    /// Scaling factor
    pub alpha: Scalar<T>,
    /// Shifted first vector
    pub x: VectorArg,
    /// Shifted second vector
    pub y: VectorArg,
    /// Matrix
    pub a: MatrixArg,
}

impl<T: Element> Her2Args<T> {
    pub(crate) fn advance(self, batches: usize) -> Self {
        Self {
            x: self.x.advance::<T>(batches),
            y: self.y.advance::<T>(batches),
            a: self.a.advance::<T>(batches),
            ..self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strided_batch_base_negative_stride() {
        let p = BatchPtr::strided(0x1000, -4);
        unsafe {
            assert_eq!(p.batch_base::<f64>(0), 0x1000);
            assert_eq!(p.batch_base::<f64>(2), 0x1000 - 64);
        }
        assert_eq!(p.advance::<f64>(1), BatchPtr::strided(0x1000 - 32, -4));
    }

    #[test]
    fn test_array_batch_base_reads_pointer() {
        let storage = [0xa0u64, 0xb0, 0xc0];
        let p = BatchPtr::array(storage.as_ptr() as u64);
        unsafe {
            assert_eq!(p.batch_base::<f32>(1), 0xb0);
            assert_eq!(p.advance::<f32>(2).batch_base::<f32>(0), 0xc0);
        }
    }

    #[test]
    fn test_vector_shift_walks_backward() {
        let data = [0.0f32, 1.0, 2.0, 3.0, 4.0, 5.0];
        let v = VectorArg::new(BatchPtr::strided(data.as_ptr() as u64, 0), -2).shifted(3);
        assert_eq!(v.offset, 4);
        let read: Vec<f32> = (0..3).map(|i| unsafe { *v.entry::<f32>(0, i) }).collect();
        assert_eq!(read, vec![4.0, 2.0, 0.0]);
    }

    #[test]
    fn test_matrix_entry_column_major() {
        let data: Vec<f64> = (0..12).map(|v| v as f64).collect();
        let a = MatrixArg {
            ptr: BatchPtr::strided(data.as_ptr() as u64, 0),
            offset: 0,
            lda: 4,
        };
        assert_eq!(unsafe { *a.entry::<f64>(0, 1, 2) }, 9.0);
    }

    #[test]
    fn test_scalar_load() {
        let v = 2.5f64;
        assert_eq!(unsafe { Scalar::Host(1.0f64).load() }, 1.0);
        assert_eq!(unsafe { Scalar::<f64>::Device(&v as *const f64 as u64).load() }, 2.5);
        assert!(Scalar::<f64>::Device(0).is_null());
        assert!(!Scalar::Host(0.0f64).is_null());
    }
}
