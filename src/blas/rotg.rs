//! Batched Givens rotation generation

use super::args::{BatchPtr, Operand, RotgArgs};
use super::check_numerics::{Scan, check_numerics, check_numerics_real, report};
use super::logging::{CallLog, LogValue};
use super::traits::BlasKernels;
use super::types::PointerMode;
use super::{check_ptr, for_each_launch};
use crate::dtype::{Element, RealElement};
use crate::error::{NumericsStage, Result};
use crate::handle::{CheckNumerics, Handle};
use crate::runtime::{LaunchConfig, Runtime};

/// Output of [`givens`]
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Givens<T: Element> {
    /// Replaces `a`
    pub r: T,
    /// Replaces `b`: the reconstruction value for real types, `b` itself for complex
    pub z: T,
    /// Cosine
    pub c: T::Real,
    /// Sine
    pub s: T,
}

/// Rotation `[c s; -conj(s) c]` that zeroes `b` against `a`
pub fn givens<T: Element>(a: T, b: T) -> Givens<T> {
    let zero = <T::Real as Element>::ZERO;
    let one = <T::Real as Element>::ONE;
    let abs_a = a.magnitude();
    let abs_b = b.magnitude();

    if T::DTYPE.is_complex() {
        if abs_a == zero {
            return Givens {
                r: b,
                z: b,
                c: zero,
                s: T::ONE,
            };
        }
        let scale = abs_a + abs_b;
        let sa = a.scale(one / scale).magnitude();
        let sb = b.scale(one / scale).magnitude();
        let norm = scale * (sa * sa + sb * sb).sqrt();
        let alpha = a.scale(one / abs_a);
        return Givens {
            r: alpha.scale(norm),
            z: b,
            c: abs_a / norm,
            s: (alpha * b.conj()).scale(one / norm),
        };
    }

    let scale = abs_a + abs_b;
    if scale == zero {
        return Givens {
            r: T::ZERO,
            z: T::ZERO,
            c: one,
            s: T::ZERO,
        };
    }
    let sa = abs_a / scale;
    let sb = abs_b / scale;
    let mut r = scale * (sa * sa + sb * sb).sqrt();
    let roe = if abs_a > abs_b { a } else { b };
    if roe.real() < zero {
        r = -r;
    }
    let c = a.real() / r;
    let s = b.real() / r;
    let z = if abs_a > abs_b {
        s
    } else if c != zero {
        one / c
    } else {
        one
    };
    Givens {
        r: T::from_real(r),
        z: T::from_real(z),
        c,
        s: T::from_real(s),
    }
}

/// Generate the rotation for batch element `batch` in place
///
/// # Safety
/// Every operand of `args` must be dereferenceable for `batch`.
pub(crate) unsafe fn rotg_element<T: Element>(args: &RotgArgs, batch: usize) {
    unsafe {
        let a = args.a.at::<T>(batch);
        let b = args.b.at::<T>(batch);
        let rot = givens(*a, *b);
        *a = rot.r;
        *b = rot.z;
        *args.c.at::<T::Real>(batch) = rot.c;
        *args.s.at::<T>(batch) = rot.s;
    }
}

/// Rotations for pointer arrays `a`, `b`, `c`, `s`
///
/// In host pointer mode the arrays and the values live in host memory and
/// the rotations are computed on the host.
pub fn rotg_batched<T: Element, R: Runtime>(
    handle: &Handle<R>,
    a: u64,
    b: u64,
    c: u64,
    s: u64,
    batch_count: i64,
) -> Result<()>
where
    R::Client: BlasKernels<R>,
{
    let args = RotgArgs {
        a: Operand::new(BatchPtr::array(a)),
        b: Operand::new(BatchPtr::array(b)),
        c: Operand::new(BatchPtr::array(c)),
        s: Operand::new(BatchPtr::array(s)),
    };
    rotg_template::<T, R>(handle, "rotg_batched", args, batch_count)
}

/// Rotations with base+stride addressing
#[allow(clippy::too_many_arguments)]
pub fn rotg_strided_batched<T: Element, R: Runtime>(
    handle: &Handle<R>,
    a: u64,
    stride_a: i64,
    b: u64,
    stride_b: i64,
    c: u64,
    stride_c: i64,
    s: u64,
    stride_s: i64,
    batch_count: i64,
) -> Result<()>
where
    R::Client: BlasKernels<R>,
{
    let args = RotgArgs {
        a: Operand::new(BatchPtr::strided(a, stride_a)),
        b: Operand::new(BatchPtr::strided(b, stride_b)),
        c: Operand::new(BatchPtr::strided(c, stride_c)),
        s: Operand::new(BatchPtr::strided(s, stride_s)),
    };
    rotg_template::<T, R>(handle, "rotg_strided_batched", args, batch_count)
}

fn rotg_template<T: Element, R: Runtime>(
    handle: &Handle<R>,
    name: &'static str,
    args: RotgArgs,
    batch_count: i64,
) -> Result<()>
where
    R::Client: BlasKernels<R>,
{
    handle.log_call(|| {
        CallLog::new(T::DTYPE, name)
            .arg("a", LogValue::Ptr(args.a.ptr.raw()))
            .arg("b", LogValue::Ptr(args.b.ptr.raw()))
            .arg("c", LogValue::Ptr(args.c.ptr.raw()))
            .arg("s", LogValue::Ptr(args.s.ptr.raw()))
            .arg("batch_count", LogValue::Int(batch_count))
    });

    if batch_count <= 0 || handle.is_device_memory_size_query() {
        return Ok(());
    }
    let batch_count = batch_count as usize;

    check_ptr("a", args.a.ptr.is_null())?;
    check_ptr("b", args.b.ptr.is_null())?;
    check_ptr("c", args.c.ptr.is_null())?;
    check_ptr("s", args.s.ptr.is_null())?;

    match handle.pointer_mode() {
        PointerMode::Host => rotg_host::<T, R>(handle, name, &args, batch_count),
        PointerMode::Device => rotg_device::<T, R>(handle, name, &args, batch_count),
    }
}

fn rotg_host<T: Element, R: Runtime>(
    handle: &Handle<R>,
    name: &'static str,
    args: &RotgArgs,
    batch_count: usize,
) -> Result<()> {
    let mode = handle.check_numerics();
    let scanning = mode != CheckNumerics::Off;

    // SAFETY (all blocks below): host pointer mode, so the operands are host
    // addresses; non-null was checked by the caller.
    if scanning {
        let bad = (0..batch_count).any(|b| unsafe {
            (*args.a.at::<T>(b)).is_nan_or_inf() || (*args.b.at::<T>(b)).is_nan_or_inf()
        });
        if bad {
            report(mode, name, NumericsStage::Input)?;
        }
    }

    for b in 0..batch_count {
        unsafe { rotg_element::<T>(args, b) };
    }

    if scanning {
        let bad = (0..batch_count).any(|b| unsafe {
            (*args.a.at::<T>(b)).is_nan_or_inf()
                || (*args.b.at::<T>(b)).is_nan_or_inf()
                || (*args.c.at::<T::Real>(b)).is_nan_or_inf()
                || (*args.s.at::<T>(b)).is_nan_or_inf()
        });
        if bad {
            report(mode, name, NumericsStage::Output)?;
        }
    }
    Ok(())
}

fn rotg_device<T: Element, R: Runtime>(
    handle: &Handle<R>,
    name: &'static str,
    args: &RotgArgs,
    batch_count: usize,
) -> Result<()>
where
    R::Client: BlasKernels<R>,
{
    let scalar = |op: Operand| Scan::Contiguous { len: 1, op };
    let inputs = [scalar(args.a), scalar(args.b)];
    check_numerics::<T, R>(handle, name, NumericsStage::Input, &inputs, batch_count)?;

    let client = handle.client();
    for_each_launch(batch_count, |first, len| {
        let cfg = LaunchConfig::batched(1, len, 1);
        // SAFETY: validated non-null operands; chunk bounds come from batch_count
        unsafe { client.rotg_kernel::<T>(cfg, args.advance::<T>(first)) }
    })?;

    let outputs = [scalar(args.a), scalar(args.b), scalar(args.s)];
    check_numerics::<T, R>(handle, name, NumericsStage::Output, &outputs, batch_count)?;
    check_numerics_real::<T, R>(
        handle,
        name,
        NumericsStage::Output,
        &[scalar(args.c)],
        batch_count,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dtype::Complex128;

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() <= 1e-12 * b.abs().max(1.0), "{a} != {b}");
    }

    #[test]
    fn test_real_rotation_zeroes_b() {
        let (a, b) = (3.0f64, 4.0f64);
        let g = givens(a, b);
        assert_close(g.r, 5.0);
        assert_close(g.c, 0.6);
        assert_close(g.s, 0.8);
        // |b| >= |a| and c != 0, so z = 1/c
        assert_close(g.z, 1.0 / 0.6);
        assert_close(-g.s * a + g.c * b, 0.0);
    }

    #[test]
    fn test_real_sign_follows_larger_input() {
        let g = givens(-4.0f64, 3.0);
        assert_close(g.r, -5.0);
        assert_close(g.z, g.s);
    }

    #[test]
    fn test_real_zero_inputs() {
        let g = givens(0.0f32, 0.0);
        assert_eq!((g.r, g.z, g.c, g.s), (0.0, 0.0, 1.0, 0.0));
    }

    #[test]
    fn test_complex_rotation_zeroes_b() {
        let a = Complex128::new(1.0, 2.0);
        let b = Complex128::new(-3.0, 0.5);
        let g = givens(a, b);
        // -conj(s) * a + c * b == 0
        let residual = -(g.s.conj() * a) + b.scale(g.c);
        assert!(residual.magnitude() < 1e-12);
        assert_close(g.r.magnitude(), (a.magnitude_squared() + b.magnitude_squared()).sqrt());
        assert_eq!(g.z, b);
    }

    #[test]
    fn test_complex_zero_a() {
        let b = Complex128::new(2.0, -1.0);
        let g = givens(Complex128::ZERO, b);
        assert_eq!(g.c, 0.0);
        assert_eq!(g.s, Complex128::ONE);
        assert_eq!(g.r, b);
    }
}
