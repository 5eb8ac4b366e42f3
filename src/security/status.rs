//! Human-readable status report for the security helpers.

use crate::security::runtime_guard::{EnvironmentProbe, RuntimeGuard};

/// One line of the module report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleStatus {
    pub name: &'static str,
    pub available: bool,
}

/// Security helpers compiled into this binary.
pub fn module_statuses() -> Vec<ModuleStatus> {
    vec![
        ModuleStatus { name: "owner-only file permissions", available: cfg!(unix) || cfg!(windows) },
        ModuleStatus { name: "in-memory secret store (sha256 keys)", available: true },
        ModuleStatus {
            name: "debugger detection",
            available: cfg!(any(target_os = "linux", target_os = "windows", target_os = "macos")),
        },
    ]
}

fn mark(ok: bool) -> &'static str {
    if ok {
        "✅"
    } else {
        "❌"
    }
}

/// Render the module section of the report.
pub fn render_modules(statuses: &[ModuleStatus]) -> String {
    statuses
        .iter()
        .map(|s| format!("{} {}: {}", mark(s.available), s.name, if s.available { "loaded" } else { "unavailable" }))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Print module availability followed by a verbose runtime guard run.
pub async fn display_module_status<P: EnvironmentProbe>(guard: &RuntimeGuard<P>) -> bool {
    println!("\n=== Security module status ===");
    println!("{}", render_modules(&module_statuses()));
    println!("\n=== Runtime environment ===");
    guard.assess_safety(true).await
}
