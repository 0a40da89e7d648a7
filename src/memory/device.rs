//! Device-resident batch container

use super::buffer::DeviceBuffer;
use super::host::HostBatch;
use super::layout::BatchLayout;
use crate::blas::args::BatchPtr;
use crate::dtype::Element;
use crate::error::{Error, Result};
use crate::runtime::Runtime;
use parking_lot::Mutex;
use std::marker::PhantomData;
use std::mem;

/// Batch of matrices or vectors in device memory
///
/// Offers two views of one allocation: base+stride ([`Self::strided`]) and
/// pointer-per-batch-element ([`Self::batched`]). The pointer array is built
/// on first use and cached for the container's lifetime.
pub struct DeviceBatch<T: Element, R: Runtime> {
    layout: BatchLayout,
    device: R::Device,
    managed: bool,
    storage: Option<DeviceBuffer<R>>,
    ptr_array: Mutex<Option<DeviceBuffer<R>>>,
    _marker: PhantomData<T>,
}

impl<T: Element, R: Runtime> DeviceBatch<T, R> {
    /// Allocate a zero-filled device container for `layout`
    ///
    /// Allocation failure leaves the container invalid; see [`Self::memcheck`].
    pub fn new(layout: BatchLayout, device: &R::Device) -> Self {
        Self::allocate(layout, device, false)
    }

    /// Allocate a zero-filled managed-memory container for `layout`
    pub fn new_managed(layout: BatchLayout, device: &R::Device) -> Self {
        Self::allocate(layout, device, true)
    }

    fn allocate(layout: BatchLayout, device: &R::Device, managed: bool) -> Self {
        let storage = layout
            .total_elements()
            .checked_mul(mem::size_of::<T>())
            .and_then(|bytes| {
                if managed {
                    DeviceBuffer::new_managed(bytes, device).ok()
                } else {
                    DeviceBuffer::new(bytes, device).ok()
                }
            });
        Self {
            layout,
            device: device.clone(),
            managed,
            storage,
            ptr_array: Mutex::new(None),
            _marker: PhantomData,
        }
    }

    /// Allocate a device container shaped like `host` and upload its contents
    pub fn from_host(host: &HostBatch<T>, device: &R::Device) -> Result<Self> {
        host.memcheck()?;
        let mut out = Self::new(*host.layout(), device);
        out.memcheck()?;
        out.transfer_from(host)?;
        Ok(out)
    }

    /// Layout of this container
    #[inline]
    pub fn layout(&self) -> &BatchLayout {
        &self.layout
    }

    /// Device holding the allocation
    #[inline]
    pub fn device(&self) -> &R::Device {
        &self.device
    }

    /// True when backed by managed (host-addressable) memory
    #[inline]
    pub fn is_managed(&self) -> bool {
        self.managed
    }

    /// True when the backing allocation succeeded
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.storage.is_some()
    }

    /// Ok when the backing allocation succeeded
    pub fn memcheck(&self) -> Result<()> {
        if self.is_valid() {
            Ok(())
        } else {
            Err(Error::OutOfMemory {
                size: self.layout.total_elements().saturating_mul(mem::size_of::<T>()),
            })
        }
    }

    /// Device address of the allocation (0 when empty or invalid)
    #[inline]
    pub fn ptr(&self) -> u64 {
        self.storage.as_ref().map_or(0, DeviceBuffer::ptr)
    }

    /// Device address of element `offset`
    #[inline]
    fn address(&self, offset: usize) -> u64 {
        self.ptr() + (offset * mem::size_of::<T>()) as u64
    }

    /// Device address of group `multiple_index`
    #[inline]
    pub fn group_ptr(&self, multiple_index: usize) -> u64 {
        self.address(self.layout.group_offset(multiple_index))
    }

    /// Device address of batch element `(multiple_index, batch_index)`
    #[inline]
    pub fn batch_ptr(&self, multiple_index: usize, batch_index: usize) -> u64 {
        self.address(self.layout.batch_offset(multiple_index, batch_index))
    }

    /// Base+stride view of group `multiple_index`
    ///
    /// The base is batch element 0, which for a negative stride sits at the
    /// top of the group.
    pub fn strided(&self, multiple_index: usize) -> BatchPtr {
        if self.ptr() == 0 || self.layout.batch_count() == 0 {
            return BatchPtr::strided(self.ptr(), self.layout.stride() as i64);
        }
        BatchPtr::strided(
            self.batch_ptr(multiple_index, 0),
            self.layout.stride() as i64,
        )
    }

    /// Device address of the cached pointer array
    ///
    /// Holds `multiple_count * batch_count` addresses, group-major. Built and
    /// uploaded on first call.
    pub fn ptr_on_device(&self) -> Result<u64> {
        self.memcheck()?;
        let mut cached = self.ptr_array.lock();
        if let Some(buf) = cached.as_ref() {
            return Ok(buf.ptr());
        }

        let (mc, bc) = (self.layout.multiple_count(), self.layout.batch_count());
        let ptrs: Vec<u64> = (0..mc)
            .flat_map(|mi| (0..bc).map(move |b| (mi, b)))
            .map(|(mi, b)| self.batch_ptr(mi, b))
            .collect();
        let buf = DeviceBuffer::from_slice(&ptrs, &self.device)?;
        R::synchronize(&self.device)?;
        let ptr = buf.ptr();
        *cached = Some(buf);
        Ok(ptr)
    }

    /// Pointer-array view of group `multiple_index`
    pub fn batched(&self, multiple_index: usize) -> Result<BatchPtr> {
        let base = self.ptr_on_device()?;
        let skip = multiple_index * self.layout.batch_count() * mem::size_of::<u64>();
        Ok(BatchPtr::array(base + skip as u64))
    }

    /// Upload a host container with an identical layout, blocking
    pub fn transfer_from(&mut self, host: &HostBatch<T>) -> Result<()> {
        self.layout.check_compatible(host.layout())?;
        self.memcheck()?;
        host.memcheck()?;
        let src = host.as_slice();
        if src.is_empty() {
            return Ok(());
        }

        if self.managed {
            R::synchronize(&self.device)?;
            // SAFETY: managed memory is host-addressable and sized for the
            // shared layout.
            unsafe {
                std::ptr::copy_nonoverlapping(src.as_ptr(), self.ptr() as *mut T, src.len());
            }
            Ok(())
        } else {
            R::copy_to_device(bytemuck::cast_slice(src), self.ptr(), &self.device)
        }
    }

    /// Copy another device container with an identical layout
    pub fn copy_from(&mut self, other: &DeviceBatch<T, R>) -> Result<()> {
        self.layout.check_compatible(other.layout())?;
        self.memcheck()?;
        other.memcheck()?;
        if self.managed || other.managed {
            R::synchronize(&self.device)?;
        }
        R::copy_within_device(
            other.ptr(),
            self.ptr(),
            self.layout.total_elements() * mem::size_of::<T>(),
            &self.device,
        )
    }

    /// Download into a new host container
    pub fn to_host(&self) -> Result<HostBatch<T>> {
        let mut host = HostBatch::new(self.layout);
        host.memcheck()?;
        host.transfer_from(self)?;
        Ok(host)
    }
}

impl<T: Element, R: Runtime> std::fmt::Debug for DeviceBatch<T, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeviceBatch")
            .field("layout", &self.layout)
            .field("ptr", &format_args!("{:#x}", self.ptr()))
            .field("managed", &self.managed)
            .finish()
    }
}
