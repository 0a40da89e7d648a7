//! General rank-1 update

use crate::blas::args::GerArgs;
use crate::dtype::Element;
use crate::runtime::ThreadIdx;

/// Row `i` of `A := alpha * x * op(y)ᵀ + A`
///
/// # Safety
/// `args` must describe valid memory for the launched batch elements.
pub unsafe fn ger_thread<T: Element>(t: ThreadIdx, args: &GerArgs<T>) {
    let i = t.global_x();
    if i >= args.m {
        return;
    }

    let alpha = args.alpha.load();
    if alpha == T::ZERO {
        return;
    }

    let b = t.batch();
    let ax = alpha * *args.x.entry::<T>(b, i);
    for j in 0..args.n {
        let yj = *args.y.entry::<T>(b, j);
        let yj = if args.conj { yj.conj() } else { yj };
        *args.a.entry::<T>(b, i, j) += ax * yj;
    }
}
