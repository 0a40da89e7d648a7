//! Trace, bench and profile line formatting
//!
//! Formatting is pure; [`Handle::log_call`](crate::handle::Handle) decides
//! which lines are emitted and hands them to `tracing`.

use super::args::Scalar;
use crate::dtype::{DType, Element, RealElement};
use crate::runtime::Runtime;
use std::fmt::Write;

/// One logged argument value
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum LogValue {
    /// Device or host address
    Ptr(u64),
    /// Size, increment, stride or count
    Int(i64),
    /// Real scalar
    Real(f64),
    /// Complex scalar
    Complex(f64, f64),
    /// Enumerated argument letter
    Char(char),
}

impl LogValue {
    /// Log value for a scalar of any element type
    pub fn scalar<T: Element>(v: T) -> Self {
        if T::DTYPE.is_complex() {
            LogValue::Complex(v.real().to_f64(), v.imag().to_f64())
        } else {
            LogValue::Real(v.real().to_f64())
        }
    }

    /// Log value for a scalar argument, reading a device scalar back
    ///
    /// Falls back to the address when the read fails.
    pub fn from_scalar<T: Element, R: Runtime>(s: &Scalar<T>, device: &R::Device) -> Self {
        match s.fetch::<R>(device) {
            Ok(v) => Self::scalar(v),
            Err(_) => match *s {
                Scalar::Device(ptr) => LogValue::Ptr(ptr),
                Scalar::Host(v) => Self::scalar(v),
            },
        }
    }
}

impl std::fmt::Display for LogValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match *self {
            LogValue::Ptr(p) => write!(f, "{p:#x}"),
            LogValue::Int(v) => write!(f, "{v}"),
            LogValue::Real(v) => write!(f, "{v}"),
            LogValue::Complex(re, im) => write!(f, "({re},{im})"),
            LogValue::Char(c) => write!(f, "{c}"),
        }
    }
}

/// Everything needed to describe one call in the three log formats
#[derive(Clone, Debug)]
pub struct CallLog {
    function: String,
    bench_name: String,
    precision: &'static str,
    args: Vec<(&'static str, LogValue)>,
}

impl CallLog {
    /// Start a record for operation `op` (e.g. `"hpr_batched"`) on `dtype`
    pub fn new(dtype: DType, op: &str) -> Self {
        Self {
            function: format!("sb_{}{op}", dtype.prefix()),
            bench_name: op.to_string(),
            precision: dtype.precision_str(),
            args: Vec::new(),
        }
    }

    /// Append an argument
    pub fn arg(mut self, key: &'static str, value: LogValue) -> Self {
        self.args.push((key, value));
        self
    }

    /// Full function name, e.g. `sb_zhpr_batched`
    pub fn function(&self) -> &str {
        &self.function
    }

    /// `function,arg,arg,...`
    pub fn trace_line(&self) -> String {
        let mut line = self.function.clone();
        for (_, value) in &self.args {
            let _ = write!(line, ",{value}");
        }
        line
    }

    /// Command line reproducing the call with the bench client
    ///
    /// Addresses are omitted; a complex scalar `alpha` becomes
    /// `--alpha <re> --alphai <im>`.
    pub fn bench_line(&self) -> String {
        let mut line = format!(
            "./batchblas-bench -f {} -r {}",
            self.bench_name, self.precision
        );
        for (key, value) in &self.args {
            match *value {
                LogValue::Ptr(_) => {}
                LogValue::Complex(re, im) => {
                    let _ = write!(line, " --{key} {re} --{key}i {im}");
                }
                _ if key.len() == 1 => {
                    let _ = write!(line, " -{key} {value}");
                }
                _ => {
                    let _ = write!(line, " --{key} {value}");
                }
            }
        }
        line
    }

    /// `- { function: "...", key: value, ... }` without addresses or scalars
    pub fn profile_line(&self) -> String {
        let mut line = format!("- {{ function: \"{}\"", self.function);
        for (key, value) in &self.args {
            if matches!(value, LogValue::Int(_) | LogValue::Char(_)) {
                let _ = write!(line, ", {key}: {value}");
            }
        }
        line.push_str(" }");
        line
    }
}
