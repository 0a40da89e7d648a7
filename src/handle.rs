//! Library handle: stream, pointer mode, layer mode and memory-size query
//!
//! Every dispatcher takes a [`Handle`]. It carries the client (stream) that
//! kernels are issued on and the per-handle configuration that would
//! otherwise be process-global: pointer mode, logging layer bits and the
//! numerics check. Handles are never mutated by the operations they run.

use crate::blas::logging::CallLog;
use crate::blas::types::PointerMode;
use crate::error::{Error, Result};
use crate::runtime::{Runtime, RuntimeClient};
use parking_lot::Mutex;
use std::ops::BitOr;

/// Environment variable holding the layer-mode bit set
pub const LAYER_ENV: &str = "BATCHBLAS_LAYER";

/// Environment variable selecting the numerics check
pub const CHECK_NUMERICS_ENV: &str = "BATCHBLAS_CHECK_NUMERICS";

/// Bit set selecting which log lines a handle emits
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct LayerMode(u32);

impl LayerMode {
    /// No logging
    pub const NONE: Self = Self(0);
    /// One trace line per call: function name and arguments
    pub const LOG_TRACE: Self = Self(1);
    /// One bench command line per call
    pub const LOG_BENCH: Self = Self(2);
    /// One profile record per call
    pub const LOG_PROFILE: Self = Self(4);

    /// Build from raw bits; unknown bits are dropped
    #[inline]
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits & 0b111)
    }

    /// Raw bits
    #[inline]
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// True when every bit of `other` is set
    #[inline]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// True when no bit is set
    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl BitOr for LayerMode {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// Whether operands are scanned for NaN/Inf around each kernel
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum CheckNumerics {
    /// No scan
    #[default]
    Off,
    /// Scan and log a warning
    Warn,
    /// Scan and fail the call
    Fail,
}

impl std::str::FromStr for CheckNumerics {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "0" | "off" => Ok(CheckNumerics::Off),
            "1" | "warn" => Ok(CheckNumerics::Warn),
            "2" | "fail" => Ok(CheckNumerics::Fail),
            other => Err(Error::invalid_value(
                "check_numerics",
                format!("expected off, warn or fail, got '{other}'"),
            )),
        }
    }
}

/// Per-handle configuration
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct HandleConfig {
    /// Where scalar arguments live
    pub pointer_mode: PointerMode,
    /// Enabled log lines
    pub layer_mode: LayerMode,
    /// NaN/Inf scan mode
    pub check_numerics: CheckNumerics,
}

impl HandleConfig {
    /// Read [`LAYER_ENV`] and [`CHECK_NUMERICS_ENV`] from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable lookup
    ///
    /// Unset variables keep their defaults; malformed values are an error.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(raw) = lookup(LAYER_ENV) {
            let bits = raw.trim().parse::<u32>().map_err(|_| {
                Error::invalid_value("layer_mode", format!("expected an integer, got '{raw}'"))
            })?;
            config.layer_mode = LayerMode::from_bits(bits);
        }

        if let Some(raw) = lookup(CHECK_NUMERICS_ENV) {
            config.check_numerics = raw.parse()?;
        }

        Ok(config)
    }
}

#[derive(Debug, Default)]
struct MemoryQuery {
    active: bool,
    size: usize,
}

/// Library context bound to one client (stream)
pub struct Handle<R: Runtime> {
    client: R::Client,
    config: HandleConfig,
    query: Mutex<MemoryQuery>,
}

impl<R: Runtime> Handle<R> {
    /// Handle with default configuration
    pub fn new(client: R::Client) -> Self {
        Self::with_config(client, HandleConfig::default())
    }

    /// Handle with explicit configuration
    pub fn with_config(client: R::Client, config: HandleConfig) -> Self {
        Self {
            client,
            config,
            query: Mutex::new(MemoryQuery::default()),
        }
    }

    /// Handle on the runtime's default device, configured from the environment
    pub fn from_env() -> Result<Self> {
        let device = R::default_device();
        Ok(Self::with_config(
            R::default_client(&device),
            HandleConfig::from_env()?,
        ))
    }

    /// Client kernels are issued on
    #[inline]
    pub fn client(&self) -> &R::Client {
        &self.client
    }

    /// Device of the client
    #[inline]
    pub fn device(&self) -> &R::Device {
        self.client.device()
    }

    /// Current configuration
    #[inline]
    pub fn config(&self) -> &HandleConfig {
        &self.config
    }

    /// Current pointer mode
    #[inline]
    pub fn pointer_mode(&self) -> PointerMode {
        self.config.pointer_mode
    }

    /// Set where scalar arguments are read from
    pub fn set_pointer_mode(&mut self, mode: PointerMode) {
        self.config.pointer_mode = mode;
    }

    /// Current layer mode
    #[inline]
    pub fn layer_mode(&self) -> LayerMode {
        self.config.layer_mode
    }

    /// Select which log lines are emitted
    pub fn set_layer_mode(&mut self, mode: LayerMode) {
        self.config.layer_mode = mode;
    }

    /// Current numerics check
    #[inline]
    pub fn check_numerics(&self) -> CheckNumerics {
        self.config.check_numerics
    }

    /// Select the numerics check
    pub fn set_check_numerics(&mut self, mode: CheckNumerics) {
        self.config.check_numerics = mode;
    }

    /// Wait for every kernel issued on this handle
    pub fn synchronize(&self) -> Result<()> {
        self.client.synchronize()
    }

    /// Enter query mode: operations record their workspace need and do no work
    pub fn start_device_memory_size_query(&self) -> Result<()> {
        let mut query = self.query.lock();
        if query.active {
            return Err(Error::invalid_value(
                "handle",
                "device memory size query already active",
            ));
        }
        *query = MemoryQuery {
            active: true,
            size: 0,
        };
        Ok(())
    }

    /// Leave query mode, returning the largest workspace recorded in bytes
    pub fn stop_device_memory_size_query(&self) -> Result<usize> {
        let mut query = self.query.lock();
        if !query.active {
            return Err(Error::invalid_value(
                "handle",
                "no device memory size query active",
            ));
        }
        query.active = false;
        Ok(query.size)
    }

    /// True while a memory-size query is active
    pub fn is_device_memory_size_query(&self) -> bool {
        self.query.lock().active
    }

    pub(crate) fn record_workspace_size(&self, bytes: usize) {
        let mut query = self.query.lock();
        if query.active {
            query.size = query.size.max(bytes);
        }
    }

    /// Emit the log lines enabled by the layer mode
    ///
    /// `build` only runs when at least one layer bit is set.
    pub(crate) fn log_call(&self, build: impl FnOnce() -> CallLog) {
        let mode = self.config.layer_mode;
        if mode.is_empty() {
            return;
        }
        let call = build();
        if mode.contains(LayerMode::LOG_TRACE) {
            tracing::info!(target: "batchblas::trace", "{}", call.trace_line());
        }
        if mode.contains(LayerMode::LOG_BENCH) {
            tracing::info!(target: "batchblas::bench", "{}", call.bench_line());
        }
        if mode.contains(LayerMode::LOG_PROFILE) {
            tracing::info!(target: "batchblas::profile", "{}", call.profile_line());
        }
    }
}

impl<R: Runtime> std::fmt::Debug for Handle<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Handle")
            .field("runtime", &R::name())
            .field("config", &self.config)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::cpu::CpuRuntime;
    use std::collections::HashMap;

    fn cpu_handle() -> Handle<CpuRuntime> {
        let device = CpuRuntime::default_device();
        Handle::new(CpuRuntime::default_client(&device))
    }

    #[test]
    fn test_layer_mode_bits() {
        let mode = LayerMode::LOG_TRACE | LayerMode::LOG_PROFILE;
        assert_eq!(mode.bits(), 5);
        assert!(mode.contains(LayerMode::LOG_TRACE));
        assert!(!mode.contains(LayerMode::LOG_BENCH));
        assert_eq!(LayerMode::from_bits(0xff).bits(), 7);
        assert!(LayerMode::NONE.is_empty());
    }

    #[test]
    fn test_config_from_lookup() {
        let vars: HashMap<&str, &str> =
            [(LAYER_ENV, "3"), (CHECK_NUMERICS_ENV, "Fail")].into_iter().collect();
        let config = HandleConfig::from_lookup(|k| vars.get(k).map(|v| v.to_string())).unwrap();
        assert_eq!(config.layer_mode, LayerMode::LOG_TRACE | LayerMode::LOG_BENCH);
        assert_eq!(config.check_numerics, CheckNumerics::Fail);
        assert_eq!(config.pointer_mode, PointerMode::Host);

        let empty = HandleConfig::from_lookup(|_| None).unwrap();
        assert_eq!(empty, HandleConfig::default());

        let bad = HandleConfig::from_lookup(|k| (k == LAYER_ENV).then(|| "trace".to_string()));
        assert!(matches!(bad, Err(Error::InvalidValue { .. })));
    }

    #[test]
    fn test_memory_query_tracks_maximum() {
        let handle = cpu_handle();
        assert!(!handle.is_device_memory_size_query());
        handle.record_workspace_size(100);

        handle.start_device_memory_size_query().unwrap();
        assert!(handle.start_device_memory_size_query().is_err());
        handle.record_workspace_size(64);
        handle.record_workspace_size(256);
        handle.record_workspace_size(8);
        assert_eq!(handle.stop_device_memory_size_query().unwrap(), 256);
        assert!(handle.stop_device_memory_size_query().is_err());
    }

    #[test]
    fn test_setters() {
        let mut handle = cpu_handle();
        handle.set_pointer_mode(PointerMode::Device);
        handle.set_layer_mode(LayerMode::LOG_BENCH);
        handle.set_check_numerics(CheckNumerics::Warn);
        assert_eq!(handle.pointer_mode(), PointerMode::Device);
        assert_eq!(handle.layer_mode(), LayerMode::LOG_BENCH);
        assert_eq!(handle.check_numerics(), CheckNumerics::Warn);
    }
}
