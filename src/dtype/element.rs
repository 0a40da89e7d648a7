//! Element trait for mapping Rust types to DType

use super::{Complex64, Complex128, DType};
use bytemuck::{Pod, Zeroable};
use std::fmt::{Debug, Display};
use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub};

/// Trait for types that can be elements of a batch container
///
/// Implemented for the four BLAS precisions: `f32`, `f64`, [`Complex64`]
/// and [`Complex128`]. Real types treat `conj` as the identity and `imag` as
/// zero, so a single generic kernel body serves both the symmetric and the
/// Hermitian variant of an operation.
///
/// # Bounds
/// - `Pod + Zeroable` - host/device transfers are raw byte copies (bytemuck)
/// - `Add + Sub + Mul + Div + Neg` - field arithmetic (Output = Self)
pub trait Element:
    Copy
    + Clone
    + Send
    + Sync
    + Pod
    + Zeroable
    + Debug
    + Display
    + PartialEq
    + 'static
    + Add<Output = Self>
    + AddAssign
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
    + Neg<Output = Self>
{
    /// The corresponding DType for this Rust type
    const DTYPE: DType;

    /// Additive identity
    const ZERO: Self;

    /// Multiplicative identity
    const ONE: Self;

    /// Real scalar type (`f32` for `Complex64`, itself for real types)
    type Real: RealElement;

    /// Build a value with zero imaginary part
    fn from_real(re: Self::Real) -> Self;

    /// Real component
    fn real(self) -> Self::Real;

    /// Imaginary component (zero for real types)
    fn imag(self) -> Self::Real;

    /// Complex conjugate (identity for real types)
    fn conj(self) -> Self;

    /// Absolute value / complex modulus
    fn magnitude(self) -> Self::Real;

    /// Multiply by a real factor
    fn scale(self, factor: Self::Real) -> Self;

    /// True when any component is NaN or infinite
    fn is_nan_or_inf(self) -> bool;
}

/// Real scalar types (`f32`, `f64`)
pub trait RealElement: Element<Real = Self> + PartialOrd {
    /// Machine epsilon
    const EPSILON: Self;

    /// Square root
    fn sqrt(self) -> Self;

    /// Widen to f64
    fn to_f64(self) -> f64;

    /// Narrow from f64
    fn from_f64(v: f64) -> Self;
}

macro_rules! impl_real_element {
    ($t:ty, $dtype:expr) => {
        impl Element for $t {
            const DTYPE: DType = $dtype;
            const ZERO: Self = 0.0;
            const ONE: Self = 1.0;

            type Real = $t;

            #[inline]
            fn from_real(re: Self::Real) -> Self {
                re
            }

            #[inline]
            fn real(self) -> Self::Real {
                self
            }

            #[inline]
            fn imag(self) -> Self::Real {
                0.0
            }

            #[inline]
            fn conj(self) -> Self {
                self
            }

            #[inline]
            fn magnitude(self) -> Self::Real {
                self.abs()
            }

            #[inline]
            fn scale(self, factor: Self::Real) -> Self {
                self * factor
            }

            #[inline]
            fn is_nan_or_inf(self) -> bool {
                !self.is_finite()
            }
        }

        impl RealElement for $t {
            const EPSILON: Self = <$t>::EPSILON;

            #[inline]
            fn sqrt(self) -> Self {
                <$t>::sqrt(self)
            }

            #[inline]
            fn to_f64(self) -> f64 {
                self as f64
            }

            #[inline]
            fn from_f64(v: f64) -> Self {
                v as $t
            }
        }
    };
}

impl_real_element!(f32, DType::F32);
impl_real_element!(f64, DType::F64);

macro_rules! impl_complex_element {
    ($t:ty, $real:ty, $dtype:expr) => {
        impl Element for $t {
            const DTYPE: DType = $dtype;
            const ZERO: Self = <$t>::ZERO;
            const ONE: Self = <$t>::ONE;

            type Real = $real;

            #[inline]
            fn from_real(re: Self::Real) -> Self {
                <$t>::new(re, 0.0)
            }

            #[inline]
            fn real(self) -> Self::Real {
                self.re
            }

            #[inline]
            fn imag(self) -> Self::Real {
                self.im
            }

            #[inline]
            fn conj(self) -> Self {
                <$t>::conj(self)
            }

            #[inline]
            fn magnitude(self) -> Self::Real {
                <$t>::magnitude(self)
            }

            #[inline]
            fn scale(self, factor: Self::Real) -> Self {
                <$t>::scale(self, factor)
            }

            #[inline]
            fn is_nan_or_inf(self) -> bool {
                !self.re.is_finite() || !self.im.is_finite()
            }
        }
    };
}

impl_complex_element!(Complex64, f32, DType::Complex64);
impl_complex_element!(Complex128, f64, DType::Complex128);
