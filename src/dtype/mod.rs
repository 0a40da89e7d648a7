//! Data type system for batchblas containers and kernels
//!
//! This module provides the `DType` enum describing the element types the
//! BLAS entry points are instantiated for, along with the `Element` trait that
//! connects Rust types to it.

pub mod complex;
mod element;

pub use complex::{Complex64, Complex128};
pub use element::{Element, RealElement};

use std::fmt;

/// Element types supported by the batched kernels
///
/// The discriminants follow the single-letter BLAS prefixes in order
/// (s, d, c, z).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum DType {
    /// 32-bit floating point (`s` prefix)
    F32 = 0,
    /// 64-bit floating point (`d` prefix)
    F64 = 1,
    /// Complex number with f32 components (`c` prefix)
    Complex64 = 2,
    /// Complex number with f64 components (`z` prefix)
    Complex128 = 3,
}

impl DType {
    /// Size of one element in bytes
    #[inline]
    pub const fn size_in_bytes(self) -> usize {
        match self {
            DType::F32 => 4,
            DType::F64 => 8,
            DType::Complex64 => 8,
            DType::Complex128 => 16,
        }
    }

    /// Whether the type has an imaginary component
    #[inline]
    pub const fn is_complex(self) -> bool {
        matches!(self, DType::Complex64 | DType::Complex128)
    }

    /// The real type underlying this dtype
    #[inline]
    pub const fn real(self) -> DType {
        match self {
            DType::F32 | DType::Complex64 => DType::F32,
            DType::F64 | DType::Complex128 => DType::F64,
        }
    }

    /// BLAS routine prefix letter (`s`, `d`, `c`, `z`)
    #[inline]
    pub const fn prefix(self) -> char {
        match self {
            DType::F32 => 's',
            DType::F64 => 'd',
            DType::Complex64 => 'c',
            DType::Complex128 => 'z',
        }
    }

    /// Precision string used on bench command lines
    #[inline]
    pub const fn precision_str(self) -> &'static str {
        match self {
            DType::F32 => "f32_r",
            DType::F64 => "f64_r",
            DType::Complex64 => "f32_c",
            DType::Complex128 => "f64_c",
        }
    }
}

impl fmt::Display for DType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DType::F32 => "f32",
            DType::F64 => "f64",
            DType::Complex64 => "complex64",
            DType::Complex128 => "complex128",
        };
        f.write_str(name)
    }
}
