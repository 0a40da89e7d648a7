//! Packed triangular matrix-vector product

use crate::addressing::packed_offset;
use crate::blas::args::TpmvArgs;
use crate::dtype::Element;
use crate::runtime::ThreadIdx;

/// Entry `w_i` of `w := op(A) * x`
///
/// `TRANS` reads column `i` of `A` instead of row `i`; `CONJ` conjugates
/// every matrix entry read. The vector is never conjugated.
///
/// # Safety
/// `args` must describe valid memory for the launched batch elements and
/// `w` must not overlap `x`.
pub unsafe fn tpmv_thread<T: Element, const TRANS: bool, const CONJ: bool>(
    t: ThreadIdx,
    args: &TpmvArgs,
) {
    let i = t.global_x();
    let m = args.m;
    if i >= m {
        return;
    }

    let b = t.batch();
    let a = args.a.at::<T>(b);

    // Row i of A for the plain product, column i for the transposed ones.
    // Either way the referenced entries sit on one side of the diagonal.
    let span = if args.upper != TRANS { i..m } else { 0..i + 1 };

    let mut acc = T::ZERO;
    for j in span {
        let (row, col) = if TRANS { (j, i) } else { (i, j) };
        let aij = if j == i && args.unit_diag {
            T::ONE
        } else {
            match packed_offset(args.upper, m, row, col) {
                Some(off) if CONJ => (*a.add(off)).conj(),
                Some(off) => *a.add(off),
                None => continue,
            }
        };
        acc += aij * *args.x.entry::<T>(b, j);
    }

    *args.w.entry::<T>(b, i) = acc;
}
