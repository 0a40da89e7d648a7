//! Host reference routines on plain slices
//!
//! Vectors follow the BLAS convention: with a negative increment, logical
//! entry 0 is stored at `(n - 1) * |inc|`. Matrices are column-major with
//! leading dimension `lda`; packed matrices store one triangle column by
//! column.

use crate::blas::types::{Diagonal, Operation};
use crate::dtype::{Element, RealElement};

/// Storage index of logical entry `i` of a vector
#[inline]
pub fn vector_index(i: usize, n: usize, inc: i64) -> usize {
    let step = inc.unsigned_abs() as usize;
    if inc < 0 { (n - 1 - i) * step } else { i * step }
}

/// `y := x`
pub fn copy<T: Element>(n: usize, x: &[T], incx: i64, y: &mut [T], incy: i64) {
    for i in 0..n {
        y[vector_index(i, n, incy)] = x[vector_index(i, n, incx)];
    }
}

/// `AP := alpha * x * xᴴ + AP` on one packed matrix
pub fn hpr<T: Element>(upper: bool, n: usize, alpha: T::Real, x: &[T], incx: i64, ap: &mut [T]) {
    let mut full = vec![T::ZERO; n * n];
    packed_to_regular(upper, n, ap, &mut full);
    for j in 0..n {
        let xj = x[vector_index(j, n, incx)].conj();
        for i in 0..n {
            let xi = x[vector_index(i, n, incx)];
            full[i + j * n] += (xi * xj).scale(alpha);
        }
        full[j + j * n] = T::from_real(full[j + j * n].real());
    }
    regular_to_packed(upper, n, &full, ap);
}

/// `x := op(A) * x` on one packed triangular matrix
pub fn tpmv<T: Element>(
    upper: bool,
    trans: Operation,
    diag: Diagonal,
    m: usize,
    ap: &[T],
    x: &mut [T],
    incx: i64,
) {
    let mut a = vec![T::ZERO; m * m];
    packed_to_regular(upper, m, ap, &mut a);
    let at = |i: usize, j: usize| -> T {
        let stored = if upper { i <= j } else { i >= j };
        if i == j && diag == Diagonal::Unit {
            T::ONE
        } else if stored {
            a[i + j * m]
        } else {
            T::ZERO
        }
    };

    let input: Vec<T> = (0..m).map(|i| x[vector_index(i, m, incx)]).collect();
    for i in 0..m {
        let mut acc = T::ZERO;
        for (j, &xj) in input.iter().enumerate() {
            let aij = match trans {
                Operation::None => at(i, j),
                Operation::Transpose => at(j, i),
                Operation::ConjugateTranspose => at(j, i).conj(),
            };
            acc += aij * xj;
        }
        x[vector_index(i, m, incx)] = acc;
    }
}

/// Givens rotation generation, textbook form
///
/// Real: `r = ±sqrt(a² + b²)` signed like the larger input, `c = a/r`,
/// `s = b/r`, `b` replaced by the reconstruction value `z`.
/// Complex: `c = |a| / ‖(a, b)‖`, `s = (a/|a|) conj(b) / ‖(a, b)‖`,
/// `a` replaced by `(a/|a|) ‖(a, b)‖`.
pub fn rotg<T: Element>(a: &mut T, b: &mut T, c: &mut T::Real, s: &mut T) {
    let zero = <T::Real as Element>::ZERO;
    let one = <T::Real as Element>::ONE;
    let (ra, rb) = (a.magnitude().to_f64(), b.magnitude().to_f64());

    if T::DTYPE.is_complex() {
        if ra == 0.0 {
            *c = zero;
            *s = T::ONE;
            *a = *b;
            return;
        }
        let norm = ra.hypot(rb);
        let phase = a.scale(<T::Real as RealElement>::from_f64(1.0 / ra));
        *c = <T::Real as RealElement>::from_f64(ra / norm);
        *s = (phase * b.conj()).scale(<T::Real as RealElement>::from_f64(1.0 / norm));
        *a = phase.scale(<T::Real as RealElement>::from_f64(norm));
        return;
    }

    if ra == 0.0 && rb == 0.0 {
        *c = one;
        *s = T::ZERO;
        *a = T::ZERO;
        *b = T::ZERO;
        return;
    }
    let (av, bv) = (a.real().to_f64(), b.real().to_f64());
    let sign = if ra > rb { av.signum() } else { bv.signum() };
    let r = sign * ra.hypot(rb);
    let (cv, sv) = (av / r, bv / r);
    let z = if ra > rb {
        sv
    } else if cv != 0.0 {
        1.0 / cv
    } else {
        1.0
    };
    *c = <T::Real as RealElement>::from_f64(cv);
    *s = T::from_real(<T::Real as RealElement>::from_f64(sv));
    *a = T::from_real(<T::Real as RealElement>::from_f64(r));
    *b = T::from_real(<T::Real as RealElement>::from_f64(z));
}

/// `A := alpha * x * op(y)ᵀ + A`, conjugating `y` when `conj` is set
#[allow(clippy::too_many_arguments)]
pub fn ger<T: Element>(
    conj: bool,
    m: usize,
    n: usize,
    alpha: T,
    x: &[T],
    incx: i64,
    y: &[T],
    incy: i64,
    a: &mut [T],
    lda: usize,
) {
    for j in 0..n {
        let yj = y[vector_index(j, n, incy)];
        let yj = if conj { yj.conj() } else { yj };
        for i in 0..m {
            a[i + j * lda] += alpha * x[vector_index(i, m, incx)] * yj;
        }
    }
}

/// `A := alpha * x * yᴴ + conj(alpha) * y * xᴴ + A` on one triangle of `A`
///
/// The other triangle is left as is; the diagonal keeps only its real part.
#[allow(clippy::too_many_arguments)]
pub fn her2<T: Element>(
    upper: bool,
    n: usize,
    alpha: T,
    x: &[T],
    incx: i64,
    y: &[T],
    incy: i64,
    a: &mut [T],
    lda: usize,
) {
    for j in 0..n {
        let xj = x[vector_index(j, n, incx)];
        let yj = y[vector_index(j, n, incy)];
        let rows = if upper { 0..j + 1 } else { j..n };
        for i in rows {
            let xi = x[vector_index(i, n, incx)];
            let yi = y[vector_index(i, n, incy)];
            let entry = &mut a[i + j * lda];
            *entry += alpha * xi * yj.conj() + alpha.conj() * yi * xj.conj();
            if i == j {
                *entry = T::from_real(entry.real());
            }
        }
    }
}

/// Pack the chosen triangle of an `n × n` column-major matrix
pub fn regular_to_packed<T: Element>(upper: bool, n: usize, a: &[T], ap: &mut [T]) {
    let mut k = 0;
    for j in 0..n {
        let rows = if upper { 0..j + 1 } else { j..n };
        for i in rows {
            ap[k] = a[i + j * n];
            k += 1;
        }
    }
}

/// Unpack a packed matrix into a full Hermitian `n × n` matrix
///
/// Entries of the other triangle are the conjugates of the stored ones;
/// diagonal entries are copied unchanged.
pub fn packed_to_regular<T: Element>(upper: bool, n: usize, ap: &[T], a: &mut [T]) {
    let mut k = 0;
    for j in 0..n {
        let rows = if upper { 0..j + 1 } else { j..n };
        for i in rows {
            a[i + j * n] = ap[k];
            if i != j {
                a[j + i * n] = ap[k].conj();
            }
            k += 1;
        }
    }
}

/// Make an `n × n` column-major matrix Hermitian from its upper triangle
///
/// The diagonal keeps only its real part.
pub fn make_hermitian<T: Element>(n: usize, a: &mut [T]) {
    for j in 0..n {
        for i in 0..j {
            a[j + i * n] = a[i + j * n].conj();
        }
        a[j + j * n] = T::from_real(a[j + j * n].real());
    }
}
