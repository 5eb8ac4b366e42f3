//! Debugger / tracer detection
//!
//! Platform support:
//! - Linux: `TracerPid` in /proc/self/status
//! - Windows: `IsDebuggerPresent`
//! - macOS: `ptrace(PT_DENY_ATTACH)` failing means something is already attached
//! - anything else: reports "not attached"

use std::io;
use tracing::warn;

/// Extract the tracer pid from the contents of /proc/<pid>/status.
///
/// Returns `None` when the line is missing or unparsable.
pub fn tracer_pid_from_status(status: &str) -> Option<u32> {
    status
        .lines()
        .find(|line| line.starts_with("TracerPid:"))
        .and_then(|line| line.split_whitespace().nth(1))
        .and_then(|pid| pid.parse().ok())
}

/// Whether a debugger or tracer is attached to this process.
///
/// Errors mean the check could not run (e.g. /proc is not mounted).
pub fn debugger_attached() -> io::Result<bool> {
    #[cfg(target_os = "linux")]
    {
        let status = std::fs::read_to_string("/proc/self/status")?;
        match tracer_pid_from_status(&status) {
            Some(0) => Ok(false),
            Some(pid) => {
                warn!("Debugger detected on Linux platform (TracerPid: {})", pid);
                Ok(true)
            }
            None => Err(io::Error::new(io::ErrorKind::InvalidData, "TracerPid missing from /proc/self/status")),
        }
    }

    #[cfg(target_os = "windows")]
    {
        use windows::Win32::System::Diagnostics::Debug::IsDebuggerPresent;

        let attached = unsafe { IsDebuggerPresent().as_bool() };
        if attached {
            warn!("Debugger detected on Windows platform");
        }
        Ok(attached)
    }

    #[cfg(target_os = "macos")]
    {
        #[allow(non_camel_case_types)]
        type pid_t = i32;

        const PT_DENY_ATTACH: i32 = 31;

        extern "C" {
            fn ptrace(request: i32, pid: pid_t, addr: *mut std::ffi::c_void, data: i32) -> i32;
        }

        let attached = unsafe { ptrace(PT_DENY_ATTACH, 0, std::ptr::null_mut(), 0) != 0 };
        if attached {
            warn!("Debugger detected on macOS platform");
        }
        Ok(attached)
    }

    #[cfg(not(any(target_os = "windows", target_os = "linux", target_os = "macos")))]
    {
        tracing::debug!("Debugger detection is not supported on this platform");
        Ok(false)
    }
}
