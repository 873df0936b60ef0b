//! Dynamic loading of the native CLBlast library.
//!
//! Uses `libloading` to load `clblast.dll` (Windows) or `libclblast.so`
//! (Linux) and resolves every wrapped entry point into a function-pointer
//! table. Resolution happens once, at attach; a missing library or a
//! missing required symbol fails the whole attach and nothing is exposed.

use std::ffi::{c_int, c_void};
use std::path::Path;
use std::sync::Arc;

use libloading::{Library, Symbol};
use tracing::{debug, info};

use clbridge_common::platform;

use crate::error::BridgeError;
use crate::status::RawStatus;

// Native OpenCL handle types as seen by the library's C API.
#[allow(non_camel_case_types)]
pub type cl_mem = *mut c_void;
#[allow(non_camel_case_types)]
pub type cl_command_queue = *mut c_void;
#[allow(non_camel_case_types)]
pub type cl_event = *mut c_void;
#[allow(non_camel_case_types)]
pub type cl_device_id = *mut c_void;

// Function pointer types for the wrapped CLBlast C API.
pub(crate) type FnSaxpy = unsafe extern "C" fn(
    n: usize,
    alpha: f32,
    x_buffer: cl_mem,
    x_offset: usize,
    x_inc: usize,
    y_buffer: cl_mem,
    y_offset: usize,
    y_inc: usize,
    queue: *mut cl_command_queue,
    event: *mut cl_event,
) -> RawStatus;
pub(crate) type FnDaxpy = unsafe extern "C" fn(
    n: usize,
    alpha: f64,
    x_buffer: cl_mem,
    x_offset: usize,
    x_inc: usize,
    y_buffer: cl_mem,
    y_offset: usize,
    y_inc: usize,
    queue: *mut cl_command_queue,
    event: *mut cl_event,
) -> RawStatus;
pub(crate) type FnSscal = unsafe extern "C" fn(
    n: usize,
    alpha: f32,
    x_buffer: cl_mem,
    x_offset: usize,
    x_inc: usize,
    queue: *mut cl_command_queue,
    event: *mut cl_event,
) -> RawStatus;
pub(crate) type FnSdot = unsafe extern "C" fn(
    n: usize,
    dot_buffer: cl_mem,
    dot_offset: usize,
    x_buffer: cl_mem,
    x_offset: usize,
    x_inc: usize,
    y_buffer: cl_mem,
    y_offset: usize,
    y_inc: usize,
    queue: *mut cl_command_queue,
    event: *mut cl_event,
) -> RawStatus;
pub(crate) type FnSgemv = unsafe extern "C" fn(
    layout: c_int,
    a_transpose: c_int,
    m: usize,
    n: usize,
    alpha: f32,
    a_buffer: cl_mem,
    a_offset: usize,
    a_ld: usize,
    x_buffer: cl_mem,
    x_offset: usize,
    x_inc: usize,
    beta: f32,
    y_buffer: cl_mem,
    y_offset: usize,
    y_inc: usize,
    queue: *mut cl_command_queue,
    event: *mut cl_event,
) -> RawStatus;
pub(crate) type FnSgemm = unsafe extern "C" fn(
    layout: c_int,
    a_transpose: c_int,
    b_transpose: c_int,
    m: usize,
    n: usize,
    k: usize,
    alpha: f32,
    a_buffer: cl_mem,
    a_offset: usize,
    a_ld: usize,
    b_buffer: cl_mem,
    b_offset: usize,
    b_ld: usize,
    beta: f32,
    c_buffer: cl_mem,
    c_offset: usize,
    c_ld: usize,
    queue: *mut cl_command_queue,
    event: *mut cl_event,
) -> RawStatus;
pub(crate) type FnDgemm = unsafe extern "C" fn(
    layout: c_int,
    a_transpose: c_int,
    b_transpose: c_int,
    m: usize,
    n: usize,
    k: usize,
    alpha: f64,
    a_buffer: cl_mem,
    a_offset: usize,
    a_ld: usize,
    b_buffer: cl_mem,
    b_offset: usize,
    b_ld: usize,
    beta: f64,
    c_buffer: cl_mem,
    c_offset: usize,
    c_ld: usize,
    queue: *mut cl_command_queue,
    event: *mut cl_event,
) -> RawStatus;
pub(crate) type FnClearCache = unsafe extern "C" fn() -> RawStatus;
pub(crate) type FnFillCache = unsafe extern "C" fn(device: cl_device_id) -> RawStatus;

/// Dynamically loaded CLBlast library with resolved function pointers.
/// Write-once at attach, read-only afterwards.
pub struct ClblastLibrary {
    // None only for the in-process stub tables built by tests.
    pub(crate) _lib: Option<Library>,
    pub(crate) saxpy: FnSaxpy,
    pub(crate) daxpy: FnDaxpy,
    pub(crate) sscal: FnSscal,
    pub(crate) sdot: FnSdot,
    pub(crate) sgemv: FnSgemv,
    pub(crate) sgemm: FnSgemm,
    pub(crate) dgemm: FnDgemm,
    pub(crate) clear_cache: FnClearCache,
    pub(crate) fill_cache: FnFillCache,
}

// SAFETY: the native library handles are valid from any thread and the
// table is never written after resolution.
unsafe impl Send for ClblastLibrary {}
unsafe impl Sync for ClblastLibrary {}

impl ClblastLibrary {
    /// Load the native library and resolve the full dispatch table.
    ///
    /// Search order: explicit `path` if given, else the CLBRIDGE_LIBRARY
    /// environment variable, else the platform's default file names.
    pub fn load(path: Option<&Path>) -> Result<Arc<Self>, BridgeError> {
        let lib = Self::open_library(path)?;
        unsafe { Self::resolve(lib).map(Arc::new) }
    }

    fn open_library(path: Option<&Path>) -> Result<Library, BridgeError> {
        if let Some(path) = path {
            return unsafe { Library::new(path) }.map_err(|e| {
                BridgeError::LibraryNotFound(format!("{}: {}", path.display(), e))
            });
        }

        if let Ok(env_path) = std::env::var(platform::LIBRARY_ENV) {
            return unsafe { Library::new(&env_path) }
                .map_err(|e| BridgeError::LibraryNotFound(format!("{}: {}", env_path, e)));
        }

        let mut last_err = String::new();
        for name in platform::native_library_names() {
            match unsafe { Library::new(name) } {
                Ok(lib) => {
                    info!("loaded native BLAS library from: {}", name);
                    return Ok(lib);
                }
                Err(e) => last_err = format!("{}: {}", name, e),
            }
        }
        Err(BridgeError::LibraryNotFound(last_err))
    }

    unsafe fn resolve(lib: Library) -> Result<Self, BridgeError> {
        let table = unsafe {
            Self {
                saxpy: Self::load_fn(&lib, "CLBlastSaxpy")?,
                daxpy: Self::load_fn(&lib, "CLBlastDaxpy")?,
                sscal: Self::load_fn(&lib, "CLBlastSscal")?,
                sdot: Self::load_fn(&lib, "CLBlastSdot")?,
                sgemv: Self::load_fn(&lib, "CLBlastSgemv")?,
                sgemm: Self::load_fn(&lib, "CLBlastSgemm")?,
                dgemm: Self::load_fn(&lib, "CLBlastDgemm")?,
                clear_cache: Self::load_fn(&lib, "CLBlastClearCache")?,
                fill_cache: Self::load_fn(&lib, "CLBlastFillCache")?,
                _lib: Some(lib),
            }
        };
        info!("native BLAS dispatch table resolved");
        Ok(table)
    }

    unsafe fn load_fn<T: Copy>(lib: &Library, name: &str) -> Result<T, BridgeError> {
        let symbol: Symbol<T> = unsafe { lib.get(name.as_bytes()) }
            .map_err(|_| BridgeError::MissingSymbol(name.to_string()))?;
        debug!("resolved symbol: {}", name);
        Ok(*symbol)
    }
}
