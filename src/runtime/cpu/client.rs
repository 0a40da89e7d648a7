//! CPU client and allocator implementation

use super::device::CpuDevice;
use super::runtime::{CpuRuntime, cpu_allocate, cpu_deallocate};
use crate::error::Result;
use crate::runtime::{DefaultAllocator, RuntimeClient};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// CPU client for operation dispatch
///
/// Plays the role of a device stream. Clones share the same launch counter.
#[derive(Clone, Debug)]
pub struct CpuClient {
    pub(crate) device: CpuDevice,
    allocator: CpuAllocator,
    launches: Arc<AtomicU64>,
    min_batches_per_task: usize,
}

impl CpuClient {
    /// Create a new CPU client
    pub fn new(device: CpuDevice) -> Self {
        let allocator = create_cpu_allocator(device.clone());
        Self {
            device,
            allocator,
            launches: Arc::new(AtomicU64::new(0)),
            min_batches_per_task: 1,
        }
    }

    /// Minimum number of batch elements a worker thread takes at once
    pub fn with_min_batches_per_task(mut self, min: usize) -> Self {
        self.min_batches_per_task = min.max(1);
        self
    }

    /// Number of kernels launched through this client (and its clones)
    pub fn launch_count(&self) -> u64 {
        self.launches.load(Ordering::Relaxed)
    }

    pub(crate) fn record_launch(&self) {
        self.launches.fetch_add(1, Ordering::Relaxed);
    }

    #[cfg_attr(not(feature = "rayon"), allow(dead_code))]
    pub(crate) fn rayon_min_len(&self) -> usize {
        self.min_batches_per_task
    }
}

impl RuntimeClient<CpuRuntime> for CpuClient {
    fn device(&self) -> &CpuDevice {
        &self.device
    }

    fn synchronize(&self) -> Result<()> {
        // CPU operations are synchronous, nothing to do
        Ok(())
    }

    fn allocator(&self) -> &CpuAllocator {
        &self.allocator
    }
}

/// CPU-specific allocator type alias
pub type CpuAllocator = DefaultAllocator<CpuDevice>;

/// Create a CPU allocator for the given device
fn create_cpu_allocator(device: CpuDevice) -> CpuAllocator {
    DefaultAllocator::new(
        device,
        |size, _dev| cpu_allocate(size),
        |ptr, size, _dev| cpu_deallocate(ptr, size),
    )
}
