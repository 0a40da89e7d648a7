//! Enumerated BLAS arguments
//!
//! Raw codes follow the conventional BLAS numbering so values coming through
//! the C surface can be converted with `TryFrom<i32>`.

use crate::error::{Error, Result};

macro_rules! impl_code_enum {
    ($name:ident, $arg:literal, { $($variant:ident = $code:literal => $letter:literal),+ $(,)? }) => {
        impl $name {
            /// Raw integer code
            #[inline]
            pub const fn code(self) -> i32 {
                self as i32
            }

            /// Single-letter form used by bench lines
            pub const fn letter(self) -> char {
                match self {
                    $($name::$variant => $letter,)+
                }
            }
        }

        impl TryFrom<i32> for $name {
            type Error = Error;

            fn try_from(code: i32) -> Result<Self> {
                match code {
                    $($code => Ok($name::$variant),)+
                    other => Err(Error::invalid_value($arg, format!("unknown code {other}"))),
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.letter())
            }
        }
    };
}

/// Operation applied to a matrix operand
#[repr(i32)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
pub enum Operation {
    /// `A`
    #[default]
    None = 111,
    /// `Aᵀ`
    Transpose = 112,
    /// `Aᴴ`
    ConjugateTranspose = 113,
}

impl_code_enum!(Operation, "trans", {
    None = 111 => 'N',
    Transpose = 112 => 'T',
    ConjugateTranspose = 113 => 'C',
});

/// Which triangle of a matrix is referenced
#[repr(i32)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
pub enum Fill {
    /// Upper triangle
    #[default]
    Upper = 121,
    /// Lower triangle
    Lower = 122,
    /// Whole matrix (not accepted by packed operations)
    Full = 123,
}

impl_code_enum!(Fill, "uplo", {
    Upper = 121 => 'U',
    Lower = 122 => 'L',
    Full = 123 => 'F',
});

impl Fill {
    /// Resolve to upper/lower for triangle-only storage, rejecting [`Fill::Full`]
    pub fn triangle_upper(self) -> Result<bool> {
        match self {
            Fill::Upper => Ok(true),
            Fill::Lower => Ok(false),
            Fill::Full => Err(Error::invalid_value(
                "uplo",
                "operation reads an upper or lower triangle only",
            )),
        }
    }
}

/// Whether the diagonal of a triangular matrix is implicitly one
#[repr(i32)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
pub enum Diagonal {
    /// Diagonal entries are read from memory
    #[default]
    NonUnit = 131,
    /// Diagonal entries are assumed to be one and never read
    Unit = 132,
}

impl_code_enum!(Diagonal, "diag", {
    NonUnit = 131 => 'N',
    Unit = 132 => 'U',
});

/// Where scalar arguments such as `alpha` live
#[repr(i32)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
pub enum PointerMode {
    /// Scalars are read from host memory at call time
    #[default]
    Host = 0,
    /// Scalars are read from device memory by the kernel
    Device = 1,
}

impl_code_enum!(PointerMode, "pointer_mode", {
    Host = 0 => 'H',
    Device = 1 => 'D',
});
