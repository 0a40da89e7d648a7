//! Backend kernel trait for batched BLAS operations

use super::args::{CopyArgs, GerArgs, Her2Args, HprArgs, RotgArgs, TpmvArgs};
use super::types::Operation;
use crate::dtype::Element;
use crate::error::Result;
use crate::runtime::{LaunchConfig, Runtime, RuntimeClient};

/// Typed batched kernels a backend client can launch
///
/// Each method issues one launch over `cfg` on the client's stream. `grid.y`
/// indexes batch elements; a batch element's work never reads memory another
/// batch element writes. The dispatchers in [`crate::blas`] validate
/// arguments, size the grid, chunk large batch counts and shift negative
/// increments before calling in.
///
/// # Safety Contract
///
/// All kernel methods are unsafe because they dereference device addresses.
/// Callers must ensure:
/// - Every descriptor addresses memory valid for `grid.y` batch elements
/// - Pointer-array descriptors hold at least `grid.y` valid addresses
/// - Output operands of different batch elements do not overlap
pub trait BlasKernels<R: Runtime<Client = Self>>: RuntimeClient<R> {
    /// `y_b := x_b` for every batch element
    ///
    /// # Safety
    /// See the trait-level contract.
    unsafe fn copy_kernel<T: Element>(&self, cfg: LaunchConfig, args: CopyArgs) -> Result<()>;

    /// Packed Hermitian (symmetric for real `T`) rank-1 update
    ///
    /// # Safety
    /// See the trait-level contract. A device `alpha` must be readable.
    unsafe fn hpr_kernel<T: Element>(&self, cfg: LaunchConfig, args: HprArgs<T>) -> Result<()>;

    /// Packed triangular product `w := op(A) * x` into the workspace
    ///
    /// Exactly one of the three mode variants runs; conjugation applies to
    /// matrix entries only.
    ///
    /// # Safety
    /// See the trait-level contract. `w` must not overlap `x` or `A`.
    unsafe fn tpmv_kernel<T: Element>(
        &self,
        cfg: LaunchConfig,
        op: Operation,
        args: TpmvArgs,
    ) -> Result<()>;

    /// Givens rotation generation, one thread per batch element
    ///
    /// # Safety
    /// See the trait-level contract.
    unsafe fn rotg_kernel<T: Element>(&self, cfg: LaunchConfig, args: RotgArgs) -> Result<()>;

    /// General rank-1 update `A := alpha * x * op(y)ᵀ + A`
    ///
    /// # Safety
    /// See the trait-level contract. A device `alpha` must be readable.
    unsafe fn ger_kernel<T: Element>(&self, cfg: LaunchConfig, args: GerArgs<T>) -> Result<()>;

    /// Hermitian (symmetric for real `T`) rank-2 update of one triangle
    ///
    /// # Safety
    /// See the trait-level contract. A device `alpha` must be readable.
    unsafe fn her2_kernel<T: Element>(&self, cfg: LaunchConfig, args: Her2Args<T>) -> Result<()>;
}
