//! Trait for runtime clients that handle operation dispatch

use super::Runtime;

/// Trait for runtime clients that handle operation dispatch
///
/// A client is a stream: kernels issued through one client execute in
/// program order, and `synchronize` waits for all of them.
pub trait RuntimeClient<R: Runtime>: Clone + Send + Sync {
    /// Get the device this client operates on
    fn device(&self) -> &R::Device;

    /// Synchronize: wait for all pending operations to complete
    fn synchronize(&self) -> crate::error::Result<()>;

    /// Get the allocator for this client
    fn allocator(&self) -> &R::Allocator;
}
