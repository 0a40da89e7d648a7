//! Givens rotation generation

use crate::blas::args::RotgArgs;
use crate::blas::rotg::rotg_element;
use crate::dtype::Element;
use crate::runtime::ThreadIdx;

/// Rotation for one batch element; only thread 0 of each row works
///
/// # Safety
/// `args` must describe valid memory for the launched batch elements.
pub unsafe fn rotg_thread<T: Element>(t: ThreadIdx, args: &RotgArgs) {
    if t.global_x() != 0 {
        return;
    }
    rotg_element::<T>(args, t.batch());
}
