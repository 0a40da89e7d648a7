//! Hermitian rank-2 update

use crate::blas::args::Her2Args;
use crate::dtype::Element;
use crate::runtime::ThreadIdx;

/// Row `i` of the stored triangle:
/// `A(i, j) += alpha * x_i * conj(y_j) + conj(alpha) * y_i * conj(x_j)`
///
/// The diagonal keeps only its real part.
///
/// # Safety
/// `args` must describe valid memory for the launched batch elements.
pub unsafe fn her2_thread<T: Element>(t: ThreadIdx, args: &Her2Args<T>) {
    let i = t.global_x();
    let n = args.n;
    if i >= n {
        return;
    }

    let alpha = args.alpha.load();
    if alpha == T::ZERO {
        return;
    }

    let b = t.batch();
    let ax = alpha * *args.x.entry::<T>(b, i);
    let ay = alpha.conj() * *args.y.entry::<T>(b, i);
    let cols = if args.upper { i..n } else { 0..i + 1 };

    for j in cols {
        let xj = *args.x.entry::<T>(b, j);
        let yj = *args.y.entry::<T>(b, j);
        let entry = args.a.entry::<T>(b, i, j);
        let updated = *entry + (ax * yj.conj() + ay * xj.conj());
        *entry = if j == i {
            T::from_real(updated.real())
        } else {
            updated
        };
    }
}
