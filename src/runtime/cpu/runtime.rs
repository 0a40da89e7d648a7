//! CPU runtime implementation

use super::client::{CpuAllocator, CpuClient};
use super::device::CpuDevice;
use crate::error::{Error, Result};
use crate::runtime::Runtime;
use std::alloc::{Layout as AllocLayout, alloc_zeroed, dealloc};

/// Alignment of every CPU "device" allocation
pub(crate) const CPU_ALLOC_ALIGN: usize = 64;

/// CPU compute runtime
///
/// The reference device. Memory lives on the host heap, so device and
/// managed allocations are both host-addressable, and kernels complete
/// before `launch` returns.
#[derive(Clone, Debug, Default)]
pub struct CpuRuntime;

pub(crate) fn cpu_allocate(size_bytes: usize) -> Result<u64> {
    if size_bytes == 0 {
        return Ok(0);
    }

    let layout = AllocLayout::from_size_align(size_bytes, CPU_ALLOC_ALIGN)
        .map_err(|_| Error::OutOfMemory { size: size_bytes })?;

    let ptr = unsafe { alloc_zeroed(layout) };
    if ptr.is_null() {
        return Err(Error::OutOfMemory { size: size_bytes });
    }

    Ok(ptr as u64)
}

pub(crate) fn cpu_deallocate(ptr: u64, size_bytes: usize) {
    if ptr == 0 || size_bytes == 0 {
        return;
    }

    // Only sizes that produced a layout in cpu_allocate reach here
    if let Ok(layout) = AllocLayout::from_size_align(size_bytes, CPU_ALLOC_ALIGN) {
        unsafe {
            dealloc(ptr as *mut u8, layout);
        }
    }
}

fn null_transfer(direction: &str, len: usize) -> Error {
    Error::Transfer {
        reason: format!("{direction} copy of {len} bytes through a null pointer"),
    }
}

impl Runtime for CpuRuntime {
    type Device = CpuDevice;
    type Client = CpuClient;
    type Allocator = CpuAllocator;

    fn name() -> &'static str {
        "cpu"
    }

    fn allocate(size_bytes: usize, _device: &Self::Device) -> Result<u64> {
        cpu_allocate(size_bytes)
    }

    fn deallocate(ptr: u64, size_bytes: usize, _device: &Self::Device) {
        cpu_deallocate(ptr, size_bytes)
    }

    fn copy_to_device(src: &[u8], dst: u64, _device: &Self::Device) -> Result<()> {
        if src.is_empty() {
            return Ok(());
        }
        if dst == 0 {
            return Err(null_transfer("host-to-device", src.len()));
        }

        unsafe {
            std::ptr::copy_nonoverlapping(src.as_ptr(), dst as *mut u8, src.len());
        }
        Ok(())
    }

    fn copy_from_device(src: u64, dst: &mut [u8], _device: &Self::Device) -> Result<()> {
        if dst.is_empty() {
            return Ok(());
        }
        if src == 0 {
            return Err(null_transfer("device-to-host", dst.len()));
        }

        unsafe {
            std::ptr::copy_nonoverlapping(src as *const u8, dst.as_mut_ptr(), dst.len());
        }
        Ok(())
    }

    fn copy_within_device(
        src: u64,
        dst: u64,
        size_bytes: usize,
        _device: &Self::Device,
    ) -> Result<()> {
        if size_bytes == 0 {
            return Ok(());
        }
        if src == 0 || dst == 0 {
            return Err(null_transfer("device-to-device", size_bytes));
        }

        unsafe {
            // Use copy (not copy_nonoverlapping) in case src and dst overlap
            std::ptr::copy(src as *const u8, dst as *mut u8, size_bytes);
        }
        Ok(())
    }

    fn synchronize(_device: &Self::Device) -> Result<()> {
        // Kernels run to completion inside launch
        Ok(())
    }

    fn default_device() -> Self::Device {
        CpuDevice::new()
    }

    fn default_client(device: &Self::Device) -> Self::Client {
        CpuClient::new(device.clone())
    }
}
