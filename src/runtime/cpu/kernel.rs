//! BlasKernels implementation for the CPU client

use super::client::CpuClient;
use super::kernels;
use super::launch::launch;
use super::runtime::CpuRuntime;
use crate::blas::args::{CopyArgs, GerArgs, Her2Args, HprArgs, RotgArgs, TpmvArgs};
use crate::blas::traits::BlasKernels;
use crate::blas::types::Operation;
use crate::dtype::Element;
use crate::error::Result;
use crate::runtime::LaunchConfig;

impl BlasKernels<CpuRuntime> for CpuClient {
    unsafe fn copy_kernel<T: Element>(&self, cfg: LaunchConfig, args: CopyArgs) -> Result<()> {
        launch(self, cfg, |t| unsafe { kernels::copy_thread::<T>(t, &args) });
        Ok(())
    }

    unsafe fn hpr_kernel<T: Element>(&self, cfg: LaunchConfig, args: HprArgs<T>) -> Result<()> {
        launch(self, cfg, |t| unsafe { kernels::hpr_thread::<T>(t, &args) });
        Ok(())
    }

    unsafe fn tpmv_kernel<T: Element>(
        &self,
        cfg: LaunchConfig,
        op: Operation,
        args: TpmvArgs,
    ) -> Result<()> {
        match op {
            Operation::None => launch(self, cfg, |t| unsafe {
                kernels::tpmv_thread::<T, false, false>(t, &args)
            }),
            Operation::Transpose => launch(self, cfg, |t| unsafe {
                kernels::tpmv_thread::<T, true, false>(t, &args)
            }),
            Operation::ConjugateTranspose => launch(self, cfg, |t| unsafe {
                kernels::tpmv_thread::<T, true, true>(t, &args)
            }),
        }
        Ok(())
    }

    unsafe fn rotg_kernel<T: Element>(&self, cfg: LaunchConfig, args: RotgArgs) -> Result<()> {
        launch(self, cfg, |t| unsafe { kernels::rotg_thread::<T>(t, &args) });
        Ok(())
    }

    unsafe fn ger_kernel<T: Element>(&self, cfg: LaunchConfig, args: GerArgs<T>) -> Result<()> {
        launch(self, cfg, |t| unsafe { kernels::ger_thread::<T>(t, &args) });
        Ok(())
    }

    unsafe fn her2_kernel<T: Element>(&self, cfg: LaunchConfig, args: Her2Args<T>) -> Result<()> {
        launch(self, cfg, |t| unsafe { kernels::her2_thread::<T>(t, &args) });
        Ok(())
    }
}
