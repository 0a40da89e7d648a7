//! CPU kernel bodies
//!
//! Each function is the body of one device thread: it receives its
//! [`ThreadIdx`](crate::runtime::ThreadIdx) and the launch arguments,
//! bounds-checks its global index and touches only its own batch element.

#![allow(unsafe_op_in_unsafe_fn)] // Kernels are already marked unsafe, inner unsafe is redundant

pub mod copy;
pub mod ger;
pub mod her2;
pub mod hpr;
pub mod rotg;
pub mod tpmv;

pub use copy::copy_thread;
pub use ger::ger_thread;
pub use her2::her2_thread;
pub use hpr::hpr_thread;
pub use rotg::rotg_thread;
pub use tpmv::tpmv_thread;
