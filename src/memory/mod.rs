//! Batch containers
//!
//! A batch container owns one allocation partitioned into `multiple_count`
//! groups of `batch_count` strided matrices or vectors. [`HostBatch`] lives
//! in host memory, [`DeviceBatch`] in device (or managed) memory; both size
//! themselves from the same [`BatchLayout`], so a transfer between them is a
//! single bulk copy.
//!
//! Allocation failure does not error at construction. The container is
//! built in an invalid state and every call site checks `memcheck()` before
//! use.

mod buffer;
mod device;
mod host;
mod layout;

pub use buffer::{DeviceBuffer, Workspace};
pub use device::DeviceBatch;
pub use host::HostBatch;
pub use layout::BatchLayout;
