//! C-linkage entry points
//!
//! Every operation is exported per element type (`s`, `d`, `c`, `z`) and per
//! index width: the plain name takes `i32` sizes and counts, the `_64` name
//! takes `i64`. Strides are always `i64`. Pointer-array arguments are device
//! arrays of device addresses; scalar arguments are read according to the
//! handle's pointer mode.
//!
//! Each entry point converts enumerated codes, delegates to [`crate::blas`]
//! and returns a [`Status`]. Panics are caught here and reported as
//! [`Status::InternalError`]; nothing unwinds across the boundary.

use crate::blas::{self, Diagonal, Fill, Operation, PointerMode, Scalar};
use crate::dtype::{Complex64, Complex128};
use crate::error::{Error, Result, Status};
use crate::handle::{Handle, LayerMode};
use crate::runtime::cpu::CpuRuntime;
use paste::paste;
use std::panic::{self, AssertUnwindSafe};

/// Handle type behind the C surface
pub type SbHandle = Handle<CpuRuntime>;

/// Run `f`, converting its result (or a panic) to a status code
fn guard(f: impl FnOnce() -> Result<()>) -> Status {
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(result) => Status::from(&result),
        Err(_) => {
            tracing::error!("panic caught at the C boundary");
            Status::InternalError
        }
    }
}

unsafe fn handle_ref<'a>(handle: *mut SbHandle) -> Result<&'a SbHandle> {
    unsafe { handle.as_ref() }.ok_or(Error::InvalidHandle)
}

unsafe fn handle_mut<'a>(handle: *mut SbHandle) -> Result<&'a mut SbHandle> {
    unsafe { handle.as_mut() }.ok_or(Error::InvalidHandle)
}

/// Create a handle on the default device
///
/// The handle's configuration is read from the environment.
///
/// # Safety
/// `handle` must be null or valid for writing one pointer.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn sb_create_handle(handle: *mut *mut SbHandle) -> Status {
    guard(|| {
        if handle.is_null() {
            return Err(Error::InvalidHandle);
        }
        let created = Box::new(SbHandle::from_env()?);
        unsafe { handle.write(Box::into_raw(created)) };
        Ok(())
    })
}

/// Destroy a handle created by [`sb_create_handle`]
///
/// # Safety
/// `handle` must come from [`sb_create_handle`] and not be used afterwards.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn sb_destroy_handle(handle: *mut SbHandle) -> Status {
    guard(|| {
        if handle.is_null() {
            return Err(Error::InvalidHandle);
        }
        drop(unsafe { Box::from_raw(handle) });
        Ok(())
    })
}

/// Set the pointer mode (`0` host, `1` device)
///
/// # Safety
/// `handle` must be null or a live handle.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn sb_set_pointer_mode(handle: *mut SbHandle, mode: i32) -> Status {
    guard(|| {
        let handle = unsafe { handle_mut(handle) }?;
        handle.set_pointer_mode(PointerMode::try_from(mode)?);
        Ok(())
    })
}

/// Read the pointer mode
///
/// # Safety
/// `handle` must be null or a live handle; `mode` must be null or writable.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn sb_get_pointer_mode(handle: *mut SbHandle, mode: *mut i32) -> Status {
    guard(|| {
        let handle = unsafe { handle_ref(handle) }?;
        if mode.is_null() {
            return Err(Error::InvalidPointer { arg: "mode" });
        }
        unsafe { mode.write(handle.pointer_mode().code()) };
        Ok(())
    })
}

/// Set the layer-mode bit set (trace 1, bench 2, profile 4)
///
/// # Safety
/// `handle` must be null or a live handle.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn sb_set_layer_mode(handle: *mut SbHandle, mode: u32) -> Status {
    guard(|| {
        let handle = unsafe { handle_mut(handle) }?;
        handle.set_layer_mode(LayerMode::from_bits(mode));
        Ok(())
    })
}

/// Enter device-memory-size query mode
///
/// # Safety
/// `handle` must be null or a live handle.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn sb_start_device_memory_size_query(handle: *mut SbHandle) -> Status {
    guard(|| unsafe { handle_ref(handle) }?.start_device_memory_size_query())
}

/// Leave query mode and report the largest workspace requested, in bytes
///
/// # Safety
/// `handle` must be null or a live handle; `size` must be null or writable.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn sb_stop_device_memory_size_query(
    handle: *mut SbHandle,
    size: *mut usize,
) -> Status {
    guard(|| {
        let handle = unsafe { handle_ref(handle) }?;
        if size.is_null() {
            return Err(Error::InvalidPointer { arg: "size" });
        }
        let bytes = handle.stop_device_memory_size_query()?;
        unsafe { size.write(bytes) };
        Ok(())
    })
}

macro_rules! entry_points {
    ($p:ident, $t:ty, $real:ty, $int:ty $(, $sfx:ident)?) => {
        paste! {
            /// Batched copy, see [`blas::copy_batched`]
            ///
            /// # Safety
            /// Pointers must satisfy the conventions in the module docs.
            #[unsafe(no_mangle)]
            pub unsafe extern "C" fn [<sb_ $p copy_batched $($sfx)?>](
                handle: *mut SbHandle,
                n: $int,
                x: *const *const $t,
                incx: $int,
                y: *const *mut $t,
                incy: $int,
                batch_count: $int,
            ) -> Status {
                guard(|| {
                    let handle = unsafe { handle_ref(handle) }?;
                    blas::copy_batched::<$t, CpuRuntime>(
                        handle, n as i64, x as u64, incx as i64, y as u64, incy as i64,
                        batch_count as i64,
                    )
                })
            }

            /// Strided batched copy, see [`blas::copy_strided_batched`]
            ///
            /// # Safety
            /// Pointers must satisfy the conventions in the module docs.
            #[unsafe(no_mangle)]
            pub unsafe extern "C" fn [<sb_ $p copy_strided_batched $($sfx)?>](
                handle: *mut SbHandle,
                n: $int,
                x: *const $t,
                incx: $int,
                stride_x: i64,
                y: *mut $t,
                incy: $int,
                stride_y: i64,
                batch_count: $int,
            ) -> Status {
                guard(|| {
                    let handle = unsafe { handle_ref(handle) }?;
                    blas::copy_strided_batched::<$t, CpuRuntime>(
                        handle, n as i64, x as u64, incx as i64, stride_x, y as u64,
                        incy as i64, stride_y, batch_count as i64,
                    )
                })
            }

            /// Batched packed triangular product, see [`blas::tpmv_batched`]
            ///
            /// # Safety
            /// Pointers must satisfy the conventions in the module docs.
            #[unsafe(no_mangle)]
            pub unsafe extern "C" fn [<sb_ $p tpmv_batched $($sfx)?>](
                handle: *mut SbHandle,
                uplo: i32,
                trans: i32,
                diag: i32,
                m: $int,
                a: *const *const $t,
                x: *const *mut $t,
                incx: $int,
                batch_count: $int,
            ) -> Status {
                guard(|| {
                    let handle = unsafe { handle_ref(handle) }?;
                    blas::tpmv_batched::<$t, CpuRuntime>(
                        handle,
                        Fill::try_from(uplo)?,
                        Operation::try_from(trans)?,
                        Diagonal::try_from(diag)?,
                        m as i64, a as u64, x as u64, incx as i64, batch_count as i64,
                    )
                })
            }

            /// Strided batched packed triangular product, see [`blas::tpmv_strided_batched`]
            ///
            /// # Safety
            /// Pointers must satisfy the conventions in the module docs.
            #[unsafe(no_mangle)]
            pub unsafe extern "C" fn [<sb_ $p tpmv_strided_batched $($sfx)?>](
                handle: *mut SbHandle,
                uplo: i32,
                trans: i32,
                diag: i32,
                m: $int,
                a: *const $t,
                stride_a: i64,
                x: *mut $t,
                incx: $int,
                stride_x: i64,
                batch_count: $int,
            ) -> Status {
                guard(|| {
                    let handle = unsafe { handle_ref(handle) }?;
                    blas::tpmv_strided_batched::<$t, CpuRuntime>(
                        handle,
                        Fill::try_from(uplo)?,
                        Operation::try_from(trans)?,
                        Diagonal::try_from(diag)?,
                        m as i64, a as u64, stride_a, x as u64, incx as i64, stride_x,
                        batch_count as i64,
                    )
                })
            }

            /// Batched Givens rotation generation, see [`blas::rotg_batched`]
            ///
            /// # Safety
            /// Pointers must satisfy the conventions in the module docs.
            #[unsafe(no_mangle)]
            pub unsafe extern "C" fn [<sb_ $p rotg_batched $($sfx)?>](
                handle: *mut SbHandle,
                a: *const *mut $t,
                b: *const *mut $t,
                c: *const *mut $real,
                s: *const *mut $t,
                batch_count: $int,
            ) -> Status {
                guard(|| {
                    let handle = unsafe { handle_ref(handle) }?;
                    blas::rotg_batched::<$t, CpuRuntime>(
                        handle, a as u64, b as u64, c as u64, s as u64, batch_count as i64,
                    )
                })
            }

            /// Strided batched Givens rotation generation, see [`blas::rotg_strided_batched`]
            ///
            /// # Safety
            /// Pointers must satisfy the conventions in the module docs.
            #[unsafe(no_mangle)]
            pub unsafe extern "C" fn [<sb_ $p rotg_strided_batched $($sfx)?>](
                handle: *mut SbHandle,
                a: *mut $t,
                stride_a: i64,
                b: *mut $t,
                stride_b: i64,
                c: *mut $real,
                stride_c: i64,
                s: *mut $t,
                stride_s: i64,
                batch_count: $int,
            ) -> Status {
                guard(|| {
                    let handle = unsafe { handle_ref(handle) }?;
                    blas::rotg_strided_batched::<$t, CpuRuntime>(
                        handle, a as u64, stride_a, b as u64, stride_b, c as u64, stride_c,
                        s as u64, stride_s, batch_count as i64,
                    )
                })
            }

            ger_entry_point!($p, ger, ger_strided_batched, $t, $int $(, $sfx)?);
        }
    };
}

macro_rules! ger_entry_point {
    ($p:ident, $op:ident, $func:ident, $t:ty, $int:ty $(, $sfx:ident)?) => {
        paste! {
            #[doc = concat!("Strided batched rank-1 update, see [`blas::", stringify!($func), "`]")]
            ///
            /// # Safety
            /// Pointers must satisfy the conventions in the module docs.
            #[unsafe(no_mangle)]
            pub unsafe extern "C" fn [<sb_ $p $op _strided_batched $($sfx)?>](
                handle: *mut SbHandle,
                m: $int,
                n: $int,
                alpha: *const $t,
                x: *const $t,
                incx: $int,
                stride_x: i64,
                y: *const $t,
                incy: $int,
                stride_y: i64,
                a: *mut $t,
                lda: $int,
                stride_a: i64,
                batch_count: $int,
            ) -> Status {
                guard(|| {
                    let handle = unsafe { handle_ref(handle) }?;
                    let alpha = unsafe { Scalar::from_raw(handle.pointer_mode(), alpha) };
                    blas::$func::<$t, CpuRuntime>(
                        handle, m as i64, n as i64, alpha, x as u64, incx as i64, stride_x,
                        y as u64, incy as i64, stride_y, a as u64, lda as i64, stride_a,
                        batch_count as i64,
                    )
                })
            }
        }
    };
}

macro_rules! complex_entry_points {
    ($p:ident, $t:ty, $real:ty, $int:ty $(, $sfx:ident)?) => {
        paste! {
            /// Batched packed Hermitian rank-1 update, see [`blas::hpr_batched`]
            ///
            /// # Safety
            /// Pointers must satisfy the conventions in the module docs.
            #[unsafe(no_mangle)]
            pub unsafe extern "C" fn [<sb_ $p hpr_batched $($sfx)?>](
                handle: *mut SbHandle,
                uplo: i32,
                n: $int,
                alpha: *const $real,
                x: *const *const $t,
                incx: $int,
                ap: *const *mut $t,
                batch_count: $int,
            ) -> Status {
                guard(|| {
                    let handle = unsafe { handle_ref(handle) }?;
                    let uplo = Fill::try_from(uplo)?;
                    let alpha = unsafe { Scalar::from_raw(handle.pointer_mode(), alpha) };
                    blas::hpr_batched::<$t, CpuRuntime>(
                        handle, uplo, n as i64, alpha, x as u64, incx as i64, ap as u64,
                        batch_count as i64,
                    )
                })
            }

            /// Strided batched packed Hermitian rank-1 update, see [`blas::hpr_strided_batched`]
            ///
            /// # Safety
            /// Pointers must satisfy the conventions in the module docs.
            #[unsafe(no_mangle)]
            pub unsafe extern "C" fn [<sb_ $p hpr_strided_batched $($sfx)?>](
                handle: *mut SbHandle,
                uplo: i32,
                n: $int,
                alpha: *const $real,
                x: *const $t,
                incx: $int,
                stride_x: i64,
                ap: *mut $t,
                stride_ap: i64,
                batch_count: $int,
            ) -> Status {
                guard(|| {
                    let handle = unsafe { handle_ref(handle) }?;
                    let uplo = Fill::try_from(uplo)?;
                    let alpha = unsafe { Scalar::from_raw(handle.pointer_mode(), alpha) };
                    blas::hpr_strided_batched::<$t, CpuRuntime>(
                        handle, uplo, n as i64, alpha, x as u64, incx as i64, stride_x,
                        ap as u64, stride_ap, batch_count as i64,
                    )
                })
            }

            /// Batched Hermitian rank-2 update, see [`blas::her2_batched`]
            ///
            /// # Safety
            /// Pointers must satisfy the conventions in the module docs.
            #[unsafe(no_mangle)]
            pub unsafe extern "C" fn [<sb_ $p her2_batched $($sfx)?>](
                handle: *mut SbHandle,
                uplo: i32,
                n: $int,
                alpha: *const $t,
                x: *const *const $t,
                incx: $int,
                y: *const *const $t,
                incy: $int,
                a: *const *mut $t,
                lda: $int,
                batch_count: $int,
            ) -> Status {
                guard(|| {
                    let handle = unsafe { handle_ref(handle) }?;
                    let uplo = Fill::try_from(uplo)?;
                    let alpha = unsafe { Scalar::from_raw(handle.pointer_mode(), alpha) };
                    blas::her2_batched::<$t, CpuRuntime>(
                        handle, uplo, n as i64, alpha, x as u64, incx as i64, y as u64,
                        incy as i64, a as u64, lda as i64, batch_count as i64,
                    )
                })
            }

            /// Strided batched Hermitian rank-2 update, see [`blas::her2_strided_batched`]
            ///
            /// # Safety
            /// Pointers must satisfy the conventions in the module docs.
            #[unsafe(no_mangle)]
            pub unsafe extern "C" fn [<sb_ $p her2_strided_batched $($sfx)?>](
                handle: *mut SbHandle,
                uplo: i32,
                n: $int,
                alpha: *const $t,
                x: *const $t,
                incx: $int,
                stride_x: i64,
                y: *const $t,
                incy: $int,
                stride_y: i64,
                a: *mut $t,
                lda: $int,
                stride_a: i64,
                batch_count: $int,
            ) -> Status {
                guard(|| {
                    let handle = unsafe { handle_ref(handle) }?;
                    let uplo = Fill::try_from(uplo)?;
                    let alpha = unsafe { Scalar::from_raw(handle.pointer_mode(), alpha) };
                    blas::her2_strided_batched::<$t, CpuRuntime>(
                        handle, uplo, n as i64, alpha, x as u64, incx as i64, stride_x,
                        y as u64, incy as i64, stride_y, a as u64, lda as i64, stride_a,
                        batch_count as i64,
                    )
                })
            }

            ger_entry_point!($p, gerc, gerc_strided_batched, $t, $int $(, $sfx)?);
        }
    };
}

entry_points!(s, f32, f32, i32);
entry_points!(s, f32, f32, i64, _64);
entry_points!(d, f64, f64, i32);
entry_points!(d, f64, f64, i64, _64);
entry_points!(c, Complex64, f32, i32);
entry_points!(c, Complex64, f32, i64, _64);
entry_points!(z, Complex128, f64, i32);
entry_points!(z, Complex128, f64, i64, _64);

complex_entry_points!(c, Complex64, f32, i32);
complex_entry_points!(c, Complex64, f32, i64, _64);
complex_entry_points!(z, Complex128, f64, i32);
complex_entry_points!(z, Complex128, f64, i64, _64);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guard_catches_panic() {
        let status = guard(|| panic!("kernel bug"));
        assert_eq!(status, Status::InternalError);
        assert_eq!(guard(|| Ok(())), Status::Success);
        assert_eq!(
            guard(|| Err(Error::invalid_size("n", "negative"))),
            Status::InvalidSize
        );
    }

    #[test]
    fn test_null_handle() {
        let status = unsafe { sb_set_layer_mode(std::ptr::null_mut(), 1) };
        assert_eq!(status, Status::InvalidHandle);
        let status = unsafe { sb_create_handle(std::ptr::null_mut()) };
        assert_eq!(status, Status::InvalidHandle);
    }
}
