//! Packed Hermitian rank-1 update

use crate::addressing::packed_offset;
use crate::blas::args::HprArgs;
use crate::dtype::Element;
use crate::runtime::ThreadIdx;

/// Update row `i` of the stored triangle: `A(i, j) += alpha * x_i * conj(x_j)`
///
/// The diagonal keeps only its real part so the result stays Hermitian.
///
/// # Safety
/// `args` must describe valid memory for the launched batch elements.
pub unsafe fn hpr_thread<T: Element>(t: ThreadIdx, args: &HprArgs<T>) {
    let i = t.global_x();
    let n = args.n;
    if i >= n {
        return;
    }

    let alpha = args.alpha.load();
    if alpha == <T::Real as Element>::ZERO {
        return;
    }

    let b = t.batch();
    let ap = args.ap.at::<T>(b);
    let xi = *args.x.entry::<T>(b, i);
    let cols = if args.upper { i..n } else { 0..i + 1 };

    for j in cols {
        let Some(off) = packed_offset(args.upper, n, i, j) else {
            continue;
        };
        let entry = ap.add(off);
        if j == i {
            let norm = (xi * xi.conj()).real();
            *entry = T::from_real((*entry).real() + alpha * norm);
        } else {
            let xj = *args.x.entry::<T>(b, j);
            *entry += (xi * xj.conj()).scale(alpha);
        }
    }
}
