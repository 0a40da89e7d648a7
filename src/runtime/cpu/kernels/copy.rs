//! Strided batched copy

use crate::blas::args::CopyArgs;
use crate::dtype::Element;
use crate::runtime::ThreadIdx;

/// One entry of `y := x`
///
/// # Safety
/// `args` must describe valid memory for the launched batch elements.
#[inline]
pub unsafe fn copy_thread<T: Element>(t: ThreadIdx, args: &CopyArgs) {
    let i = t.global_x();
    if i >= args.n {
        return;
    }
    let b = t.batch();
    *args.y.entry::<T>(b, i) = *args.x.entry::<T>(b, i);
}
