//! Runtime backends for batched kernel execution
//!
//! This module defines the `Runtime` trait and provides the CPU
//! implementation used as the reference device.
//!
//! # Architecture
//!
//! ```text
//! Runtime (backend identity, device memory, transfers)
//! ├── Device (identifies a specific GPU/CPU)
//! ├── Client (owns the stream, launches kernels, synchronizes)
//! └── Allocator (workspace memory with live-byte tracking)
//! ```

mod allocator;
pub mod launch;
pub mod traits;

#[cfg(feature = "cpu")]
pub mod cpu;

pub use allocator::{Allocator, DefaultAllocator};
pub use launch::{Dim3, LaunchConfig, ThreadIdx};
pub use traits::{Device, Runtime, RuntimeClient};
