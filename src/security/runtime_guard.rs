//! Advisory runtime environment check.
//!
//! The verdict is reporting only. Nothing in the crate refuses to generate or
//! export because of it.

use async_trait::async_trait;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpStream;
use tracing::{debug, warn};

use crate::core::config::GuardConfig;
use crate::core::errors::WalletGenError;
use crate::security::anti_debug;

/// Signals the guard inspects.
#[async_trait]
pub trait EnvironmentProbe: Send + Sync {
    /// Whether a debugger or tracer is attached.
    fn debugger_attached(&self) -> Result<bool, WalletGenError>;

    /// Whether an outbound connection succeeded. Refused / timed out is `Ok(false)`.
    async fn outbound_connects(&self) -> Result<bool, WalletGenError>;
}

/// Probe backed by the real process and network.
#[derive(Debug, Clone)]
pub struct SystemProbe {
    probe_addr: String,
    timeout: Duration,
}

impl SystemProbe {
    pub fn new(probe_addr: impl Into<String>, timeout: Duration) -> Self {
        Self { probe_addr: probe_addr.into(), timeout }
    }

    pub fn from_config(config: &GuardConfig) -> Self {
        Self::new(config.probe_addr.clone(), Duration::from_millis(config.probe_timeout_ms))
    }
}

#[async_trait]
impl EnvironmentProbe for SystemProbe {
    fn debugger_attached(&self) -> Result<bool, WalletGenError> {
        anti_debug::debugger_attached().map_err(|e| WalletGenError::EnvironmentCheck(e.to_string()))
    }

    async fn outbound_connects(&self) -> Result<bool, WalletGenError> {
        let addr: SocketAddr = self.probe_addr.parse().map_err(|e| {
            WalletGenError::EnvironmentCheck(format!("invalid probe address {:?}: {}", self.probe_addr, e))
        })?;
        match tokio::time::timeout(self.timeout, TcpStream::connect(addr)).await {
            Ok(Ok(_stream)) => Ok(true),
            Ok(Err(e)) => {
                debug!(error = %e, "Outbound probe failed");
                Ok(false)
            }
            Err(_) => {
                debug!("Outbound probe timed out");
                Ok(false)
            }
        }
    }
}

/// Outcome of a guard run, kept for reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Safe,
    DebuggerAttached,
    OutboundReachable,
    CheckFailed,
}

impl Verdict {
    pub fn is_safe(&self) -> bool {
        matches!(self, Verdict::Safe)
    }

    fn describe(&self) -> &'static str {
        match self {
            Verdict::Safe => "✅ Network environment looks quiet",
            Verdict::DebuggerAttached => "❌ Debugger attached to the process",
            Verdict::OutboundReachable => "❌ Unexpected outbound connection succeeded",
            Verdict::CheckFailed => "❌ Environment check failed",
        }
    }
}

pub struct RuntimeGuard<P: EnvironmentProbe> {
    probe: P,
}

impl RuntimeGuard<SystemProbe> {
    pub fn from_config(config: &GuardConfig) -> Self {
        Self::new(SystemProbe::from_config(config))
    }
}

impl<P: EnvironmentProbe> RuntimeGuard<P> {
    pub fn new(probe: P) -> Self {
        Self { probe }
    }

    /// Run both checks. The debugger check short-circuits the network probe.
    pub async fn evaluate(&self) -> Verdict {
        match self.probe.debugger_attached() {
            Ok(true) => return Verdict::DebuggerAttached,
            Ok(false) => {}
            Err(e) => {
                warn!(error = %e, "Debugger check failed");
                return Verdict::CheckFailed;
            }
        }

        match self.probe.outbound_connects().await {
            Ok(true) => Verdict::OutboundReachable,
            Ok(false) => Verdict::Safe,
            Err(e) => {
                warn!(error = %e, "Network check failed");
                Verdict::CheckFailed
            }
        }
    }

    /// `true` when the environment looks safe. Prints the verdict when `verbose`.
    pub async fn assess_safety(&self, verbose: bool) -> bool {
        let verdict = self.evaluate().await;
        if verbose {
            println!("{}", verdict.describe());
        }
        if !verdict.is_safe() {
            warn!(?verdict, "Runtime environment flagged as unsafe (advisory only)");
        }
        verdict.is_safe()
    }
}
