//! Core trait for compute backends

/// Core trait for compute backends
///
/// `Runtime` abstracts over device memory and stream ownership. It uses
/// static dispatch via generics so batch containers and kernels are
/// monomorphized per backend.
///
/// # Associated Types
///
/// - `Device`: Identifies a specific compute unit (e.g., GPU 0, GPU 1)
/// - `Client`: Owns the stream; launches kernels and synchronizes
/// - `Allocator`: Workspace memory management
///
/// # Example
///
/// ```
/// use batchblas::runtime::Runtime;
/// use batchblas::runtime::cpu::CpuRuntime;
///
/// let device = CpuRuntime::default_device();
/// let ptr = CpuRuntime::allocate(1024, &device)?;
/// CpuRuntime::copy_to_device(&[1u8; 16], ptr, &device)?;
/// CpuRuntime::deallocate(ptr, 1024, &device);
/// # Ok::<(), batchblas::error::Error>(())
/// ```
pub trait Runtime: Clone + Send + Sync + 'static {
    /// Device identifier type
    type Device: super::Device;

    /// Client for dispatching operations
    type Client: super::RuntimeClient<Self>;

    /// Memory allocator type
    type Allocator: crate::runtime::Allocator;

    /// Human-readable name of this runtime
    fn name() -> &'static str;

    /// Allocate zero-initialized device memory
    ///
    /// Returns a device pointer (u64). Zero-byte requests return the null
    /// pointer. Returns `Err(OutOfMemory)` if allocation fails.
    fn allocate(size_bytes: usize, device: &Self::Device) -> crate::error::Result<u64>;

    /// Allocate managed (unified) memory addressable from host and device
    ///
    /// Backends without a distinct managed pool fall back to `allocate`,
    /// which must then return host-addressable memory.
    fn allocate_managed(size_bytes: usize, device: &Self::Device) -> crate::error::Result<u64> {
        Self::allocate(size_bytes, device)
    }

    /// Deallocate device memory
    fn deallocate(ptr: u64, size_bytes: usize, device: &Self::Device);

    /// Copy data from host to device, blocking until complete
    fn copy_to_device(src: &[u8], dst: u64, device: &Self::Device) -> crate::error::Result<()>;

    /// Copy data from device to host, blocking until complete
    fn copy_from_device(
        src: u64,
        dst: &mut [u8],
        device: &Self::Device,
    ) -> crate::error::Result<()>;

    /// Copy data within device (device to device)
    fn copy_within_device(
        src: u64,
        dst: u64,
        size_bytes: usize,
        device: &Self::Device,
    ) -> crate::error::Result<()>;

    /// Device-wide barrier: wait for all streams on `device` to drain
    ///
    /// Required before the host reads managed memory a kernel may still be
    /// writing.
    fn synchronize(device: &Self::Device) -> crate::error::Result<()>;

    /// Get the default device
    fn default_device() -> Self::Device;

    /// Get the default client for a device
    fn default_client(device: &Self::Device) -> Self::Client;
}
