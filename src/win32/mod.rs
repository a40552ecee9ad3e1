//! Win32 window and process plumbing for the process watcher.
//!
//! Every handle acquired here lives in a [`HandleGuard`] so it is closed
//! exactly once, no matter which branch of the scan wins.

use anyhow::{Context, Result};
use windows::Win32::Foundation::{BOOL, CloseHandle, HANDLE, HWND, LPARAM, MAX_PATH};
use windows::Win32::System::Threading::{
    OpenProcess, PROCESS_NAME_WIN32, PROCESS_QUERY_LIMITED_INFORMATION, PROCESS_TERMINATE,
    QueryFullProcessImageNameW, TerminateProcess,
};
use windows::Win32::UI::WindowsAndMessaging::{
    EnumWindows, GetClassNameW, GetWindowThreadProcessId,
};
use windows::core::PWSTR;

/// Window-class names are short; 256 matches the classic WNDCLASS limit.
const MAX_CLASS_NAME: usize = 256;

/// Owned process handle, closed on drop.
pub struct HandleGuard(HANDLE);

impl HandleGuard {
    pub fn new(handle: HANDLE) -> Self {
        Self(handle)
    }

    pub fn raw(&self) -> HANDLE {
        self.0
    }
}

impl Drop for HandleGuard {
    fn drop(&mut self) {
        if !self.0.is_invalid() {
            // SAFETY: the handle was returned by OpenProcess and is only
            // closed here, once.
            unsafe {
                let _ = CloseHandle(self.0);
            }
        }
    }
}

/// One engine window found during a scan pass.
///
/// `image_path` is `None` when the owning process's executable path could
/// not be resolved even though the window class matched.
pub struct EngineWindow {
    pub pid: u32,
    pub image_path: Option<String>,
    handle: HandleGuard,
}

impl EngineWindow {
    /// Terminate the owning process. Consumes the record; the process
    /// handle is closed when the guard drops.
    pub fn terminate(self) -> Result<()> {
        // SAFETY: the guard holds a live handle opened with PROCESS_TERMINATE.
        unsafe { TerminateProcess(self.handle.raw(), 0) }
            .with_context(|| format!("Failed to terminate process {}", self.pid))
    }
}

struct EnumContext {
    class_name: String,
    known_exes: Vec<String>,
    found: Option<EngineWindow>,
}

/// Scan all top-level windows for one whose class name equals `class_name`
/// and whose owning process image path contains one of `known_exes`.
///
/// A window with the right class but the wrong executable is skipped and
/// the scan continues. A window with the right class whose path cannot be
/// resolved at all stops the scan and is returned with `image_path: None`.
pub fn find_engine_window(class_name: &str, known_exes: &[&str]) -> Option<EngineWindow> {
    let mut ctx = EnumContext {
        class_name: class_name.to_string(),
        known_exes: known_exes.iter().map(|e| e.to_string()).collect(),
        found: None,
    };

    // EnumWindows reports an error when the callback stops enumeration
    // early; for this scan that is the match signal, not a failure.
    unsafe {
        let _ = EnumWindows(
            Some(enum_windows_proc),
            LPARAM(&mut ctx as *mut EnumContext as isize),
        );
    }

    ctx.found
}

unsafe extern "system" fn enum_windows_proc(hwnd: HWND, lparam: LPARAM) -> BOOL {
    // SAFETY: lparam carries the EnumContext pointer for the duration of
    // the EnumWindows call in find_engine_window.
    let ctx = unsafe { &mut *(lparam.0 as *mut EnumContext) };

    let mut class_buf = [0u16; MAX_CLASS_NAME];
    // SAFETY: class_buf is a valid bounded buffer.
    let len = unsafe { GetClassNameW(hwnd, &mut class_buf) };
    if len <= 0 {
        return BOOL(1);
    }

    let class = String::from_utf16_lossy(&class_buf[..len as usize]);
    if class != ctx.class_name {
        return BOOL(1);
    }

    let mut pid = 0u32;
    // SAFETY: pid is a valid out pointer.
    unsafe { GetWindowThreadProcessId(hwnd, Some(&mut pid)) };
    if pid == 0 {
        return BOOL(1);
    }

    // Query access resolves the image path; terminate rights are needed so
    // the watcher can kill the process without reopening it.
    // SAFETY: standard OpenProcess call; the result is owned by the guard.
    let Ok(raw) = (unsafe {
        OpenProcess(PROCESS_QUERY_LIMITED_INFORMATION | PROCESS_TERMINATE, false, pid)
    }) else {
        return BOOL(1);
    };
    let handle = HandleGuard::new(raw);

    match query_image_path(&handle) {
        Some(path) if ctx.known_exes.iter().any(|exe| path.contains(exe.as_str())) => {
            ctx.found = Some(EngineWindow {
                pid,
                image_path: Some(path),
                handle,
            });
            BOOL(0)
        }
        Some(other) => {
            // Right class, wrong executable. The guard drops here, closing
            // the handle, and enumeration moves on to the next window.
            tracing::debug!("Skipping {} window owned by {}", ctx.class_name, other);
            BOOL(1)
        }
        None => {
            ctx.found = Some(EngineWindow {
                pid,
                image_path: None,
                handle,
            });
            BOOL(0)
        }
    }
}

fn query_image_path(handle: &HandleGuard) -> Option<String> {
    let mut path_buf = vec![0u16; MAX_PATH as usize];
    let mut size = path_buf.len() as u32;

    // SAFETY: path_buf and size stay valid for the duration of the call;
    // size is updated to the written length.
    let result = unsafe {
        QueryFullProcessImageNameW(
            handle.raw(),
            PROCESS_NAME_WIN32,
            PWSTR(path_buf.as_mut_ptr()),
            &mut size,
        )
    };

    if result.is_err() || size == 0 {
        return None;
    }

    Some(String::from_utf16_lossy(&path_buf[..size as usize]))
}
