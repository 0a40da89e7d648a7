//! Grid executor for CPU kernels
//!
//! Runs a [`LaunchConfig`] with device launch semantics: every
//! `(block, thread)` pair of the grid executes the kernel body once. Grid
//! rows (`grid.y`, the batch dimension) are independent and are spread over
//! the rayon pool; blocks and threads within a row run in order.

use super::client::CpuClient;
use crate::runtime::{Dim3, LaunchConfig, ThreadIdx};

#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// Execute `body` for every thread of `cfg`, returning when all are done
pub(crate) fn launch<F>(client: &CpuClient, cfg: LaunchConfig, body: F)
where
    F: Fn(ThreadIdx) + Send + Sync,
{
    client.record_launch();

    let run_row = |y: u32| {
        for bx in 0..cfg.grid.x {
            for tx in 0..cfg.block.x {
                body(ThreadIdx {
                    block: Dim3::new(bx, y, 0),
                    thread: Dim3::new(tx, 0, 0),
                    block_dim: cfg.block,
                });
            }
        }
    };

    #[cfg(feature = "rayon")]
    {
        (0..cfg.grid.y)
            .into_par_iter()
            .with_min_len(client.rayon_min_len())
            .for_each(run_row);
    }

    #[cfg(not(feature = "rayon"))]
    {
        (0..cfg.grid.y).for_each(run_row);
    }
}
