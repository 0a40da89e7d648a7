//! Owned device allocations

use crate::error::Result;
use crate::runtime::{Allocator, Runtime};

/// Exclusively owned device (or managed) memory
///
/// The allocation is released exactly once, when the buffer is dropped.
pub struct DeviceBuffer<R: Runtime> {
    /// Raw device pointer (GPU address or CPU ptr cast to u64)
    ptr: u64,
    /// Size in bytes
    size_bytes: usize,
    /// Device where memory is allocated
    device: R::Device,
    /// Allocated from the managed (host-addressable) pool
    managed: bool,
}

impl<R: Runtime> DeviceBuffer<R> {
    /// Allocate `size_bytes` of zeroed device memory
    pub fn new(size_bytes: usize, device: &R::Device) -> Result<Self> {
        let ptr = R::allocate(size_bytes, device)?;
        Ok(Self {
            ptr,
            size_bytes,
            device: device.clone(),
            managed: false,
        })
    }

    /// Allocate `size_bytes` of zeroed managed memory
    pub fn new_managed(size_bytes: usize, device: &R::Device) -> Result<Self> {
        let ptr = R::allocate_managed(size_bytes, device)?;
        Ok(Self {
            ptr,
            size_bytes,
            device: device.clone(),
            managed: true,
        })
    }

    /// Allocate and fill from a host slice
    pub fn from_slice<T: bytemuck::Pod>(data: &[T], device: &R::Device) -> Result<Self> {
        let bytes: &[u8] = bytemuck::cast_slice(data);
        let buffer = Self::new(bytes.len(), device)?;
        R::copy_to_device(bytes, buffer.ptr, device)?;
        Ok(buffer)
    }

    /// Get the raw device pointer
    #[inline]
    pub fn ptr(&self) -> u64 {
        self.ptr
    }

    /// Get size in bytes
    #[inline]
    pub fn size_in_bytes(&self) -> usize {
        self.size_bytes
    }

    /// Get the device
    #[inline]
    pub fn device(&self) -> &R::Device {
        &self.device
    }

    /// True when the memory is host-addressable managed memory
    #[inline]
    pub fn is_managed(&self) -> bool {
        self.managed
    }

    /// Copy the buffer back into a host vector
    pub fn to_vec<T: bytemuck::Pod>(&self) -> Result<Vec<T>> {
        let mut out = vec![T::zeroed(); self.size_bytes / std::mem::size_of::<T>().max(1)];
        R::copy_from_device(self.ptr, bytemuck::cast_slice_mut(&mut out), &self.device)?;
        Ok(out)
    }
}

impl<R: Runtime> Drop for DeviceBuffer<R> {
    fn drop(&mut self) {
        if self.ptr != 0 {
            R::deallocate(self.ptr, self.size_bytes, &self.device);
        }
    }
}

impl<R: Runtime> std::fmt::Debug for DeviceBuffer<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeviceBuffer")
            .field("ptr", &format_args!("{:#x}", self.ptr))
            .field("size_bytes", &self.size_bytes)
            .field("managed", &self.managed)
            .finish()
    }
}

/// Per-call scratch memory drawn from a client allocator
///
/// Returned to the allocator on drop, including on early error returns.
pub struct Workspace<R: Runtime> {
    ptr: u64,
    size_bytes: usize,
    allocator: R::Allocator,
}

impl<R: Runtime> Workspace<R> {
    /// Allocate `size_bytes` from `allocator`
    pub fn new(allocator: &R::Allocator, size_bytes: usize) -> Result<Self> {
        let ptr = allocator.allocate(size_bytes)?;
        Ok(Self {
            ptr,
            size_bytes,
            allocator: allocator.clone(),
        })
    }

    /// Get the raw device pointer
    #[inline]
    pub fn ptr(&self) -> u64 {
        self.ptr
    }

    /// Get size in bytes
    #[inline]
    pub fn size_in_bytes(&self) -> usize {
        self.size_bytes
    }
}

impl<R: Runtime> Drop for Workspace<R> {
    fn drop(&mut self) {
        self.allocator.deallocate(self.ptr, self.size_bytes);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::RuntimeClient;
    use crate::runtime::cpu::CpuRuntime;

    #[test]
    fn test_from_slice_roundtrip() {
        let device = CpuRuntime::default_device();
        let data = [1.5f64, -2.0, 3.25];
        let buf = DeviceBuffer::<CpuRuntime>::from_slice(&data, &device).unwrap();
        assert_eq!(buf.size_in_bytes(), 24);
        assert_eq!(buf.ptr() % 64, 0);
        assert_eq!(buf.to_vec::<f64>().unwrap(), data.to_vec());
    }

    #[test]
    fn test_workspace_released_on_drop() {
        let device = CpuRuntime::default_device();
        let client = CpuRuntime::default_client(&device);
        {
            let ws = Workspace::<CpuRuntime>::new(client.allocator(), 400).unwrap();
            assert_ne!(ws.ptr(), 0);
            assert_eq!(client.allocator().allocated_bytes(), 400);
        }
        assert_eq!(client.allocator().allocated_bytes(), 0);
    }
}
