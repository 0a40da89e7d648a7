//! Numerical verification
//!
//! Plain host implementations of every batched operation plus the tolerance
//! checks used to compare device output against them. Nothing here is
//! accelerated; it exists to serve as a test oracle.

pub mod check;
pub mod reference;

pub use check::{
    CheckFailure, near_check_batch, near_check_general, norm_check_batch, norm_check_general,
    sum_error_tolerance,
};
