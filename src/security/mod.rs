// src/security/mod.rs
//! Best-effort security helpers: debugger detection, an advisory runtime
//! guard, the in-memory secret store and redaction for logs.

pub mod anti_debug;
pub mod redaction;
pub mod runtime_guard;
pub mod secure_store;
pub mod status;

pub use runtime_guard::{EnvironmentProbe, RuntimeGuard, SystemProbe, Verdict};
pub use secure_store::SecureStore;
