//! C ABI surface of the bridge.
//!
//! This cdylib exposes the attach/detach entry points and one forwarding
//! function per wrapped routine to non-Rust embedders. Each function
//! converts raw pointers into the typed proxies of `clbridge-core`, calls
//! the bridge, and returns the status code unchanged. A conversion the
//! shim cannot perform (null context, null required handle, unknown enum
//! discriminant) yields the reserved bridge-internal status, never a
//! native code.
//!
//! Usage from C:
//! ```c
//! clbridge_ctx *ctx;
//! if (clbridge_abi_version() != 1) abort();
//! if (clbridge_attach(NULL, &ctx) != 0) abort();
//! int status = clbridge_saxpy(ctx, n, 2.0f, x, 0, 1, y, 0, 1, &queue, NULL);
//! clbridge_detach(ctx);
//! ```

pub mod status_name;

use std::ffi::{c_char, c_int, c_void, CStr};

use tracing::error;

use clbridge_common::logging::LogSeverity;
use clbridge_core::config::{default_config_path, BridgeConfig};
use clbridge_core::handle::{CommandQueue, DeviceId, EventHandle, MemBuffer};
use clbridge_core::status::StatusCode;
use clbridge_core::types::{Layout, Transpose};
use clbridge_core::Bridge;

const SUCCESS: c_int = StatusCode::SUCCESS.raw();
const INTERNAL_ERROR: c_int = StatusCode::BRIDGE_INTERNAL_ERROR.raw();

/// Opaque context handed to the embedder by `clbridge_attach`.
pub struct BridgeContext {
    bridge: Bridge,
}

unsafe fn bridge<'a>(ctx: *mut BridgeContext) -> Option<&'a Bridge> {
    unsafe { ctx.as_ref() }.map(|c| &c.bridge)
}

/// ABI version of this binding surface. Embedders check compatibility
/// before attaching.
#[no_mangle]
pub extern "C" fn clbridge_abi_version() -> c_int {
    clbridge_core::ABI_VERSION
}

/// Attach to the native library.
///
/// `config_path` may be null, in which case the platform default config
/// location is consulted and missing files fall back to defaults. On
/// success writes the context pointer into `out_ctx` and returns 0. On
/// failure nothing is written and no other entry point is usable.
#[no_mangle]
pub unsafe extern "C" fn clbridge_attach(
    config_path: *const c_char,
    out_ctx: *mut *mut BridgeContext,
) -> c_int {
    if out_ctx.is_null() {
        return INTERNAL_ERROR;
    }

    let config = if config_path.is_null() {
        BridgeConfig::load_or_default(&default_config_path())
    } else {
        let path = match unsafe { CStr::from_ptr(config_path) }.to_str() {
            Ok(path) => path.to_owned(),
            Err(_) => return INTERNAL_ERROR,
        };
        match BridgeConfig::load(&path) {
            Ok(config) => config,
            Err(e) => {
                error!("failed to load config {}: {}", path, e);
                return INTERNAL_ERROR;
            }
        }
    };

    match Bridge::attach(&config) {
        Ok(bridge) => {
            let ctx = Box::new(BridgeContext { bridge });
            unsafe { *out_ctx = Box::into_raw(ctx) };
            SUCCESS
        }
        Err(e) => {
            error!("attach failed: {}", e);
            INTERNAL_ERROR
        }
    }
}

/// Detach and release the context. A null context is a permitted no-op.
#[no_mangle]
pub unsafe extern "C" fn clbridge_detach(ctx: *mut BridgeContext) -> c_int {
    if ctx.is_null() {
        return SUCCESS;
    }
    let ctx = unsafe { Box::from_raw(ctx) };
    ctx.bridge.detach();
    SUCCESS
}

/// Set the bridge's log filtering to exactly `level` (0 = off .. 5 = trace).
#[no_mangle]
pub unsafe extern "C" fn clbridge_set_log_level(ctx: *mut BridgeContext, level: c_int) -> c_int {
    let bridge = match unsafe { bridge(ctx) } {
        Some(bridge) => bridge,
        None => return INTERNAL_ERROR,
    };
    let severity = match LogSeverity::from_raw(level) {
        Some(severity) => severity,
        None => return INTERNAL_ERROR,
    };
    bridge.set_log_level(severity);
    SUCCESS
}

#[no_mangle]
pub unsafe extern "C" fn clbridge_saxpy(
    ctx: *mut BridgeContext,
    n: usize,
    alpha: f32,
    x_buffer: *mut c_void,
    x_offset: usize,
    x_inc: usize,
    y_buffer: *mut c_void,
    y_offset: usize,
    y_inc: usize,
    queue: *mut *mut c_void,
    event: *mut *mut c_void,
) -> c_int {
    let bridge = match unsafe { bridge(ctx) } {
        Some(bridge) => bridge,
        None => return INTERNAL_ERROR,
    };
    if queue.is_null() {
        return INTERNAL_ERROR;
    }

    let mut q = CommandQueue::from_ptr(unsafe { *queue });
    let mut ev = EventHandle::from_raw(0);
    let want_event = !event.is_null();
    let status = bridge.saxpy(
        n,
        alpha,
        MemBuffer::from_ptr(x_buffer),
        x_offset,
        x_inc,
        MemBuffer::from_ptr(y_buffer),
        y_offset,
        y_inc,
        &mut q,
        if want_event { Some(&mut ev) } else { None },
    );
    unsafe { *queue = q.as_ptr() };
    if want_event {
        unsafe { *event = ev.as_ptr() };
    }
    status.raw()
}

#[no_mangle]
pub unsafe extern "C" fn clbridge_daxpy(
    ctx: *mut BridgeContext,
    n: usize,
    alpha: f64,
    x_buffer: *mut c_void,
    x_offset: usize,
    x_inc: usize,
    y_buffer: *mut c_void,
    y_offset: usize,
    y_inc: usize,
    queue: *mut *mut c_void,
    event: *mut *mut c_void,
) -> c_int {
    let bridge = match unsafe { bridge(ctx) } {
        Some(bridge) => bridge,
        None => return INTERNAL_ERROR,
    };
    if queue.is_null() {
        return INTERNAL_ERROR;
    }

    let mut q = CommandQueue::from_ptr(unsafe { *queue });
    let mut ev = EventHandle::from_raw(0);
    let want_event = !event.is_null();
    let status = bridge.daxpy(
        n,
        alpha,
        MemBuffer::from_ptr(x_buffer),
        x_offset,
        x_inc,
        MemBuffer::from_ptr(y_buffer),
        y_offset,
        y_inc,
        &mut q,
        if want_event { Some(&mut ev) } else { None },
    );
    unsafe { *queue = q.as_ptr() };
    if want_event {
        unsafe { *event = ev.as_ptr() };
    }
    status.raw()
}

#[no_mangle]
pub unsafe extern "C" fn clbridge_sscal(
    ctx: *mut BridgeContext,
    n: usize,
    alpha: f32,
    x_buffer: *mut c_void,
    x_offset: usize,
    x_inc: usize,
    queue: *mut *mut c_void,
    event: *mut *mut c_void,
) -> c_int {
    let bridge = match unsafe { bridge(ctx) } {
        Some(bridge) => bridge,
        None => return INTERNAL_ERROR,
    };
    if queue.is_null() {
        return INTERNAL_ERROR;
    }

    let mut q = CommandQueue::from_ptr(unsafe { *queue });
    let mut ev = EventHandle::from_raw(0);
    let want_event = !event.is_null();
    let status = bridge.sscal(
        n,
        alpha,
        MemBuffer::from_ptr(x_buffer),
        x_offset,
        x_inc,
        &mut q,
        if want_event { Some(&mut ev) } else { None },
    );
    unsafe { *queue = q.as_ptr() };
    if want_event {
        unsafe { *event = ev.as_ptr() };
    }
    status.raw()
}

#[no_mangle]
pub unsafe extern "C" fn clbridge_sdot(
    ctx: *mut BridgeContext,
    n: usize,
    dot_buffer: *mut c_void,
    dot_offset: usize,
    x_buffer: *mut c_void,
    x_offset: usize,
    x_inc: usize,
    y_buffer: *mut c_void,
    y_offset: usize,
    y_inc: usize,
    queue: *mut *mut c_void,
    event: *mut *mut c_void,
) -> c_int {
    let bridge = match unsafe { bridge(ctx) } {
        Some(bridge) => bridge,
        None => return INTERNAL_ERROR,
    };
    if queue.is_null() {
        return INTERNAL_ERROR;
    }

    let mut q = CommandQueue::from_ptr(unsafe { *queue });
    let mut ev = EventHandle::from_raw(0);
    let want_event = !event.is_null();
    let status = bridge.sdot(
        n,
        MemBuffer::from_ptr(dot_buffer),
        dot_offset,
        MemBuffer::from_ptr(x_buffer),
        x_offset,
        x_inc,
        MemBuffer::from_ptr(y_buffer),
        y_offset,
        y_inc,
        &mut q,
        if want_event { Some(&mut ev) } else { None },
    );
    unsafe { *queue = q.as_ptr() };
    if want_event {
        unsafe { *event = ev.as_ptr() };
    }
    status.raw()
}

#[no_mangle]
pub unsafe extern "C" fn clbridge_sgemv(
    ctx: *mut BridgeContext,
    layout: c_int,
    a_transpose: c_int,
    m: usize,
    n: usize,
    alpha: f32,
    a_buffer: *mut c_void,
    a_offset: usize,
    a_ld: usize,
    x_buffer: *mut c_void,
    x_offset: usize,
    x_inc: usize,
    beta: f32,
    y_buffer: *mut c_void,
    y_offset: usize,
    y_inc: usize,
    queue: *mut *mut c_void,
    event: *mut *mut c_void,
) -> c_int {
    let bridge = match unsafe { bridge(ctx) } {
        Some(bridge) => bridge,
        None => return INTERNAL_ERROR,
    };
    if queue.is_null() {
        return INTERNAL_ERROR;
    }
    let (layout, a_transpose) = match (Layout::from_raw(layout), Transpose::from_raw(a_transpose))
    {
        (Some(layout), Some(a_transpose)) => (layout, a_transpose),
        _ => return INTERNAL_ERROR,
    };

    let mut q = CommandQueue::from_ptr(unsafe { *queue });
    let mut ev = EventHandle::from_raw(0);
    let want_event = !event.is_null();
    let status = bridge.sgemv(
        layout,
        a_transpose,
        m,
        n,
        alpha,
        MemBuffer::from_ptr(a_buffer),
        a_offset,
        a_ld,
        MemBuffer::from_ptr(x_buffer),
        x_offset,
        x_inc,
        beta,
        MemBuffer::from_ptr(y_buffer),
        y_offset,
        y_inc,
        &mut q,
        if want_event { Some(&mut ev) } else { None },
    );
    unsafe { *queue = q.as_ptr() };
    if want_event {
        unsafe { *event = ev.as_ptr() };
    }
    status.raw()
}

#[no_mangle]
pub unsafe extern "C" fn clbridge_sgemm(
    ctx: *mut BridgeContext,
    layout: c_int,
    a_transpose: c_int,
    b_transpose: c_int,
    m: usize,
    n: usize,
    k: usize,
    alpha: f32,
    a_buffer: *mut c_void,
    a_offset: usize,
    a_ld: usize,
    b_buffer: *mut c_void,
    b_offset: usize,
    b_ld: usize,
    beta: f32,
    c_buffer: *mut c_void,
    c_offset: usize,
    c_ld: usize,
    queue: *mut *mut c_void,
    event: *mut *mut c_void,
) -> c_int {
    let bridge = match unsafe { bridge(ctx) } {
        Some(bridge) => bridge,
        None => return INTERNAL_ERROR,
    };
    if queue.is_null() {
        return INTERNAL_ERROR;
    }
    let layout = match Layout::from_raw(layout) {
        Some(layout) => layout,
        None => return INTERNAL_ERROR,
    };
    let (a_transpose, b_transpose) =
        match (Transpose::from_raw(a_transpose), Transpose::from_raw(b_transpose)) {
            (Some(a), Some(b)) => (a, b),
            _ => return INTERNAL_ERROR,
        };

    let mut q = CommandQueue::from_ptr(unsafe { *queue });
    let mut ev = EventHandle::from_raw(0);
    let want_event = !event.is_null();
    let status = bridge.sgemm(
        layout,
        a_transpose,
        b_transpose,
        m,
        n,
        k,
        alpha,
        MemBuffer::from_ptr(a_buffer),
        a_offset,
        a_ld,
        MemBuffer::from_ptr(b_buffer),
        b_offset,
        b_ld,
        beta,
        MemBuffer::from_ptr(c_buffer),
        c_offset,
        c_ld,
        &mut q,
        if want_event { Some(&mut ev) } else { None },
    );
    unsafe { *queue = q.as_ptr() };
    if want_event {
        unsafe { *event = ev.as_ptr() };
    }
    status.raw()
}

#[no_mangle]
pub unsafe extern "C" fn clbridge_dgemm(
    ctx: *mut BridgeContext,
    layout: c_int,
    a_transpose: c_int,
    b_transpose: c_int,
    m: usize,
    n: usize,
    k: usize,
    alpha: f64,
    a_buffer: *mut c_void,
    a_offset: usize,
    a_ld: usize,
    b_buffer: *mut c_void,
    b_offset: usize,
    b_ld: usize,
    beta: f64,
    c_buffer: *mut c_void,
    c_offset: usize,
    c_ld: usize,
    queue: *mut *mut c_void,
    event: *mut *mut c_void,
) -> c_int {
    let bridge = match unsafe { bridge(ctx) } {
        Some(bridge) => bridge,
        None => return INTERNAL_ERROR,
    };
    if queue.is_null() {
        return INTERNAL_ERROR;
    }
    let layout = match Layout::from_raw(layout) {
        Some(layout) => layout,
        None => return INTERNAL_ERROR,
    };
    let (a_transpose, b_transpose) =
        match (Transpose::from_raw(a_transpose), Transpose::from_raw(b_transpose)) {
            (Some(a), Some(b)) => (a, b),
            _ => return INTERNAL_ERROR,
        };

    let mut q = CommandQueue::from_ptr(unsafe { *queue });
    let mut ev = EventHandle::from_raw(0);
    let want_event = !event.is_null();
    let status = bridge.dgemm(
        layout,
        a_transpose,
        b_transpose,
        m,
        n,
        k,
        alpha,
        MemBuffer::from_ptr(a_buffer),
        a_offset,
        a_ld,
        MemBuffer::from_ptr(b_buffer),
        b_offset,
        b_ld,
        beta,
        MemBuffer::from_ptr(c_buffer),
        c_offset,
        c_ld,
        &mut q,
        if want_event { Some(&mut ev) } else { None },
    );
    unsafe { *queue = q.as_ptr() };
    if want_event {
        unsafe { *event = ev.as_ptr() };
    }
    status.raw()
}

/// Clear the native library's cache of compiled kernel binaries.
#[no_mangle]
pub unsafe extern "C" fn clbridge_clear_cache(ctx: *mut BridgeContext) -> c_int {
    match unsafe { bridge(ctx) } {
        Some(bridge) => bridge.clear_cache().raw(),
        None => INTERNAL_ERROR,
    }
}

/// Pre-compile the native library's kernels for `device`.
#[no_mangle]
pub unsafe extern "C" fn clbridge_fill_cache(
    ctx: *mut BridgeContext,
    device: *mut c_void,
) -> c_int {
    match unsafe { bridge(ctx) } {
        Some(bridge) => bridge.fill_cache(DeviceId::from_ptr(device)).raw(),
        None => INTERNAL_ERROR,
    }
}
