//! The attach/detach context and the per-routine call shims.
//!
//! Every shim is a synchronous one-to-one forward: convert the arguments
//! to their native representation, invoke the corresponding library entry
//! point through the dispatch table, convert the result back. Status codes
//! from the native library are passed through verbatim; a conversion the
//! bridge cannot perform yields the reserved internal status instead and
//! the native library is not called.

use std::path::Path;
use std::ptr;
use std::sync::Arc;

use tracing::{debug, info, warn};

use clbridge_common::logging::{self, LogHandle, LogSeverity};
use clbridge_common::platform;

use crate::config::BridgeConfig;
use crate::dispatch::{cl_event, ClblastLibrary};
use crate::error::BridgeError;
use crate::handle::{CommandQueue, DeviceId, EventHandle, MemBuffer};
use crate::status::StatusCode;
use crate::types::{Layout, Transpose};

/// Attached bridge context: the resolved dispatch table plus the handle to
/// the log filter. Populated once at attach, read-only afterwards, so it
/// can be shared freely between threads.
pub struct Bridge {
    lib: Arc<ClblastLibrary>,
    log: LogHandle,
}

impl Bridge {
    /// Attach to the native library.
    ///
    /// Resolves every wrapped entry point up front; a missing library or a
    /// missing required symbol fails the whole attach and no shim becomes
    /// callable.
    pub fn attach(config: &BridgeConfig) -> Result<Self, BridgeError> {
        let log = logging::init_logging();
        match LogSeverity::from_name(&config.logging.level) {
            Some(severity) => log.set_severity(severity),
            None => warn!("unknown log level in config: {}", config.logging.level),
        }

        info!(
            "attaching to the native BLAS library on {}, abi v{}",
            platform::platform_name(),
            crate::ABI_VERSION
        );
        let lib = ClblastLibrary::load(config.library.path.as_deref().map(Path::new))?;
        info!("attach complete");
        Ok(Self { lib, log })
    }

    /// Detach. Dropping the context releases the dispatch table and unmaps
    /// the native library; handles owned by the caller are not touched.
    pub fn detach(self) {
        info!("detaching from the native BLAS library");
    }

    /// Set the bridge's own log filtering to exactly `severity`.
    pub fn set_log_level(&self, severity: LogSeverity) {
        debug!("set_log_level({:?})", severity);
        self.log.set_severity(severity);
    }

    /// y = alpha * x + y, single precision.
    #[allow(clippy::too_many_arguments)]
    pub fn saxpy(
        &self,
        n: usize,
        alpha: f32,
        x: MemBuffer,
        x_offset: usize,
        x_inc: usize,
        y: MemBuffer,
        y_offset: usize,
        y_inc: usize,
        queue: &mut CommandQueue,
        event: Option<&mut EventHandle>,
    ) -> StatusCode {
        if x.is_null() || y.is_null() || queue.is_null() {
            return StatusCode::BRIDGE_INTERNAL_ERROR;
        }
        debug!("saxpy(n={})", n);

        let mut raw_queue = queue.as_ptr();
        let mut raw_event: cl_event = ptr::null_mut();
        let event_ptr: *mut cl_event = match &event {
            Some(_) => &mut raw_event,
            None => ptr::null_mut(),
        };
        let status = unsafe {
            (self.lib.saxpy)(
                n,
                alpha,
                x.as_ptr(),
                x_offset,
                x_inc,
                y.as_ptr(),
                y_offset,
                y_inc,
                &mut raw_queue,
                event_ptr,
            )
        };
        *queue = CommandQueue::from_ptr(raw_queue);
        if let Some(out) = event {
            *out = EventHandle::from_ptr(raw_event);
        }
        StatusCode::from_raw(status)
    }

    /// y = alpha * x + y, double precision.
    #[allow(clippy::too_many_arguments)]
    pub fn daxpy(
        &self,
        n: usize,
        alpha: f64,
        x: MemBuffer,
        x_offset: usize,
        x_inc: usize,
        y: MemBuffer,
        y_offset: usize,
        y_inc: usize,
        queue: &mut CommandQueue,
        event: Option<&mut EventHandle>,
    ) -> StatusCode {
        if x.is_null() || y.is_null() || queue.is_null() {
            return StatusCode::BRIDGE_INTERNAL_ERROR;
        }
        debug!("daxpy(n={})", n);

        let mut raw_queue = queue.as_ptr();
        let mut raw_event: cl_event = ptr::null_mut();
        let event_ptr: *mut cl_event = match &event {
            Some(_) => &mut raw_event,
            None => ptr::null_mut(),
        };
        let status = unsafe {
            (self.lib.daxpy)(
                n,
                alpha,
                x.as_ptr(),
                x_offset,
                x_inc,
                y.as_ptr(),
                y_offset,
                y_inc,
                &mut raw_queue,
                event_ptr,
            )
        };
        *queue = CommandQueue::from_ptr(raw_queue);
        if let Some(out) = event {
            *out = EventHandle::from_ptr(raw_event);
        }
        StatusCode::from_raw(status)
    }

    /// x = alpha * x, single precision.
    pub fn sscal(
        &self,
        n: usize,
        alpha: f32,
        x: MemBuffer,
        x_offset: usize,
        x_inc: usize,
        queue: &mut CommandQueue,
        event: Option<&mut EventHandle>,
    ) -> StatusCode {
        if x.is_null() || queue.is_null() {
            return StatusCode::BRIDGE_INTERNAL_ERROR;
        }
        debug!("sscal(n={})", n);

        let mut raw_queue = queue.as_ptr();
        let mut raw_event: cl_event = ptr::null_mut();
        let event_ptr: *mut cl_event = match &event {
            Some(_) => &mut raw_event,
            None => ptr::null_mut(),
        };
        let status = unsafe {
            (self.lib.sscal)(
                n,
                alpha,
                x.as_ptr(),
                x_offset,
                x_inc,
                &mut raw_queue,
                event_ptr,
            )
        };
        *queue = CommandQueue::from_ptr(raw_queue);
        if let Some(out) = event {
            *out = EventHandle::from_ptr(raw_event);
        }
        StatusCode::from_raw(status)
    }

    /// dot = x . y, single precision. The result lands in `dot`, a
    /// caller-provided device buffer.
    #[allow(clippy::too_many_arguments)]
    pub fn sdot(
        &self,
        n: usize,
        dot: MemBuffer,
        dot_offset: usize,
        x: MemBuffer,
        x_offset: usize,
        x_inc: usize,
        y: MemBuffer,
        y_offset: usize,
        y_inc: usize,
        queue: &mut CommandQueue,
        event: Option<&mut EventHandle>,
    ) -> StatusCode {
        if dot.is_null() || x.is_null() || y.is_null() || queue.is_null() {
            return StatusCode::BRIDGE_INTERNAL_ERROR;
        }
        debug!("sdot(n={})", n);

        let mut raw_queue = queue.as_ptr();
        let mut raw_event: cl_event = ptr::null_mut();
        let event_ptr: *mut cl_event = match &event {
            Some(_) => &mut raw_event,
            None => ptr::null_mut(),
        };
        let status = unsafe {
            (self.lib.sdot)(
                n,
                dot.as_ptr(),
                dot_offset,
                x.as_ptr(),
                x_offset,
                x_inc,
                y.as_ptr(),
                y_offset,
                y_inc,
                &mut raw_queue,
                event_ptr,
            )
        };
        *queue = CommandQueue::from_ptr(raw_queue);
        if let Some(out) = event {
            *out = EventHandle::from_ptr(raw_event);
        }
        StatusCode::from_raw(status)
    }

    /// y = alpha * A * x + beta * y, single precision.
    #[allow(clippy::too_many_arguments)]
    pub fn sgemv(
        &self,
        layout: Layout,
        a_transpose: Transpose,
        m: usize,
        n: usize,
        alpha: f32,
        a: MemBuffer,
        a_offset: usize,
        a_ld: usize,
        x: MemBuffer,
        x_offset: usize,
        x_inc: usize,
        beta: f32,
        y: MemBuffer,
        y_offset: usize,
        y_inc: usize,
        queue: &mut CommandQueue,
        event: Option<&mut EventHandle>,
    ) -> StatusCode {
        if a.is_null() || x.is_null() || y.is_null() || queue.is_null() {
            return StatusCode::BRIDGE_INTERNAL_ERROR;
        }
        debug!("sgemv(m={}, n={})", m, n);

        let mut raw_queue = queue.as_ptr();
        let mut raw_event: cl_event = ptr::null_mut();
        let event_ptr: *mut cl_event = match &event {
            Some(_) => &mut raw_event,
            None => ptr::null_mut(),
        };
        let status = unsafe {
            (self.lib.sgemv)(
                layout.raw(),
                a_transpose.raw(),
                m,
                n,
                alpha,
                a.as_ptr(),
                a_offset,
                a_ld,
                x.as_ptr(),
                x_offset,
                x_inc,
                beta,
                y.as_ptr(),
                y_offset,
                y_inc,
                &mut raw_queue,
                event_ptr,
            )
        };
        *queue = CommandQueue::from_ptr(raw_queue);
        if let Some(out) = event {
            *out = EventHandle::from_ptr(raw_event);
        }
        StatusCode::from_raw(status)
    }

    /// C = alpha * A * B + beta * C, single precision.
    #[allow(clippy::too_many_arguments)]
    pub fn sgemm(
        &self,
        layout: Layout,
        a_transpose: Transpose,
        b_transpose: Transpose,
        m: usize,
        n: usize,
        k: usize,
        alpha: f32,
        a: MemBuffer,
        a_offset: usize,
        a_ld: usize,
        b: MemBuffer,
        b_offset: usize,
        b_ld: usize,
        beta: f32,
        c: MemBuffer,
        c_offset: usize,
        c_ld: usize,
        queue: &mut CommandQueue,
        event: Option<&mut EventHandle>,
    ) -> StatusCode {
        if a.is_null() || b.is_null() || c.is_null() || queue.is_null() {
            return StatusCode::BRIDGE_INTERNAL_ERROR;
        }
        debug!("sgemm(m={}, n={}, k={})", m, n, k);

        let mut raw_queue = queue.as_ptr();
        let mut raw_event: cl_event = ptr::null_mut();
        let event_ptr: *mut cl_event = match &event {
            Some(_) => &mut raw_event,
            None => ptr::null_mut(),
        };
        let status = unsafe {
            (self.lib.sgemm)(
                layout.raw(),
                a_transpose.raw(),
                b_transpose.raw(),
                m,
                n,
                k,
                alpha,
                a.as_ptr(),
                a_offset,
                a_ld,
                b.as_ptr(),
                b_offset,
                b_ld,
                beta,
                c.as_ptr(),
                c_offset,
                c_ld,
                &mut raw_queue,
                event_ptr,
            )
        };
        *queue = CommandQueue::from_ptr(raw_queue);
        if let Some(out) = event {
            *out = EventHandle::from_ptr(raw_event);
        }
        StatusCode::from_raw(status)
    }

    /// C = alpha * A * B + beta * C, double precision.
    #[allow(clippy::too_many_arguments)]
    pub fn dgemm(
        &self,
        layout: Layout,
        a_transpose: Transpose,
        b_transpose: Transpose,
        m: usize,
        n: usize,
        k: usize,
        alpha: f64,
        a: MemBuffer,
        a_offset: usize,
        a_ld: usize,
        b: MemBuffer,
        b_offset: usize,
        b_ld: usize,
        beta: f64,
        c: MemBuffer,
        c_offset: usize,
        c_ld: usize,
        queue: &mut CommandQueue,
        event: Option<&mut EventHandle>,
    ) -> StatusCode {
        if a.is_null() || b.is_null() || c.is_null() || queue.is_null() {
            return StatusCode::BRIDGE_INTERNAL_ERROR;
        }
        debug!("dgemm(m={}, n={}, k={})", m, n, k);

        let mut raw_queue = queue.as_ptr();
        let mut raw_event: cl_event = ptr::null_mut();
        let event_ptr: *mut cl_event = match &event {
            Some(_) => &mut raw_event,
            None => ptr::null_mut(),
        };
        let status = unsafe {
            (self.lib.dgemm)(
                layout.raw(),
                a_transpose.raw(),
                b_transpose.raw(),
                m,
                n,
                k,
                alpha,
                a.as_ptr(),
                a_offset,
                a_ld,
                b.as_ptr(),
                b_offset,
                b_ld,
                beta,
                c.as_ptr(),
                c_offset,
                c_ld,
                &mut raw_queue,
                event_ptr,
            )
        };
        *queue = CommandQueue::from_ptr(raw_queue);
        if let Some(out) = event {
            *out = EventHandle::from_ptr(raw_event);
        }
        StatusCode::from_raw(status)
    }

    /// Clear the native library's cache of compiled kernel binaries.
    pub fn clear_cache(&self) -> StatusCode {
        debug!("clear_cache()");
        let status = unsafe { (self.lib.clear_cache)() };
        StatusCode::from_raw(status)
    }

    /// Pre-compile the native library's kernels for `device`.
    pub fn fill_cache(&self, device: DeviceId) -> StatusCode {
        if device.is_null() {
            return StatusCode::BRIDGE_INTERNAL_ERROR;
        }
        debug!("fill_cache(device=0x{:x})", device.as_raw());
        let status = unsafe { (self.lib.fill_cache)(device.as_ptr()) };
        StatusCode::from_raw(status)
    }
}

#[cfg(test)]
mod tests {
    use std::ffi::c_int;

    use super::*;
    use crate::dispatch::{cl_command_queue, cl_device_id, cl_mem};
    use crate::status::RawStatus;

    // The stubs stand in for the native library. They derive their return
    // value from the arguments so the tests need no shared state: a call
    // with n = -code reports status `code`.

    const STUB_EVENT: u64 = 0x5150;

    unsafe extern "C" fn stub_saxpy(
        n: usize,
        _alpha: f32,
        _x: cl_mem,
        _x_offset: usize,
        _x_inc: usize,
        _y: cl_mem,
        _y_offset: usize,
        _y_inc: usize,
        _queue: *mut cl_command_queue,
        event: *mut cl_event,
    ) -> RawStatus {
        if !event.is_null() {
            unsafe { *event = STUB_EVENT as cl_event };
        }
        -(n as RawStatus)
    }

    unsafe extern "C" fn stub_daxpy(
        n: usize,
        _alpha: f64,
        _x: cl_mem,
        _x_offset: usize,
        _x_inc: usize,
        _y: cl_mem,
        _y_offset: usize,
        _y_inc: usize,
        _queue: *mut cl_command_queue,
        _event: *mut cl_event,
    ) -> RawStatus {
        -(n as RawStatus)
    }

    unsafe extern "C" fn stub_sscal(
        n: usize,
        _alpha: f32,
        _x: cl_mem,
        _x_offset: usize,
        _x_inc: usize,
        _queue: *mut cl_command_queue,
        _event: *mut cl_event,
    ) -> RawStatus {
        -(n as RawStatus)
    }

    unsafe extern "C" fn stub_sdot(
        n: usize,
        _dot: cl_mem,
        _dot_offset: usize,
        _x: cl_mem,
        _x_offset: usize,
        _x_inc: usize,
        _y: cl_mem,
        _y_offset: usize,
        _y_inc: usize,
        _queue: *mut cl_command_queue,
        _event: *mut cl_event,
    ) -> RawStatus {
        -(n as RawStatus)
    }

    unsafe extern "C" fn stub_sgemv(
        _layout: c_int,
        _a_transpose: c_int,
        m: usize,
        _n: usize,
        _alpha: f32,
        _a: cl_mem,
        _a_offset: usize,
        _a_ld: usize,
        _x: cl_mem,
        _x_offset: usize,
        _x_inc: usize,
        _beta: f32,
        _y: cl_mem,
        _y_offset: usize,
        _y_inc: usize,
        _queue: *mut cl_command_queue,
        _event: *mut cl_event,
    ) -> RawStatus {
        -(m as RawStatus)
    }

    // Reports success only for the argument combination the test forwards,
    // so a discriminant mix-up shows up as a status mismatch.
    unsafe extern "C" fn stub_sgemm(
        layout: c_int,
        a_transpose: c_int,
        b_transpose: c_int,
        _m: usize,
        _n: usize,
        _k: usize,
        _alpha: f32,
        _a: cl_mem,
        _a_offset: usize,
        _a_ld: usize,
        _b: cl_mem,
        _b_offset: usize,
        _b_ld: usize,
        _beta: f32,
        _c: cl_mem,
        _c_offset: usize,
        _c_ld: usize,
        _queue: *mut cl_command_queue,
        _event: *mut cl_event,
    ) -> RawStatus {
        if layout == 101 && a_transpose == 111 && b_transpose == 112 {
            0
        } else {
            StatusCode::INVALID_VALUE.raw()
        }
    }

    unsafe extern "C" fn stub_dgemm(
        _layout: c_int,
        _a_transpose: c_int,
        _b_transpose: c_int,
        m: usize,
        _n: usize,
        _k: usize,
        _alpha: f64,
        _a: cl_mem,
        _a_offset: usize,
        _a_ld: usize,
        _b: cl_mem,
        _b_offset: usize,
        _b_ld: usize,
        _beta: f64,
        _c: cl_mem,
        _c_offset: usize,
        _c_ld: usize,
        _queue: *mut cl_command_queue,
        _event: *mut cl_event,
    ) -> RawStatus {
        -(m as RawStatus)
    }

    unsafe extern "C" fn stub_clear_cache() -> RawStatus {
        0
    }

    unsafe extern "C" fn stub_fill_cache(device: cl_device_id) -> RawStatus {
        if device.is_null() {
            StatusCode::INVALID_VALUE.raw()
        } else {
            0
        }
    }

    fn stub_bridge() -> Bridge {
        Bridge {
            lib: Arc::new(ClblastLibrary {
                _lib: None,
                saxpy: stub_saxpy,
                daxpy: stub_daxpy,
                sscal: stub_sscal,
                sdot: stub_sdot,
                sgemv: stub_sgemv,
                sgemm: stub_sgemm,
                dgemm: stub_dgemm,
                clear_cache: stub_clear_cache,
                fill_cache: stub_fill_cache,
            }),
            log: logging::init_logging(),
        }
    }

    fn buffer() -> MemBuffer {
        MemBuffer::from_raw(0x1000)
    }

    fn queue() -> CommandQueue {
        CommandQueue::from_raw(0x2000)
    }

    #[test]
    fn native_status_codes_pass_through_verbatim() {
        let bridge = stub_bridge();
        for status in [
            StatusCode::SUCCESS,
            StatusCode::OPENCL_COMPILER_NOT_AVAILABLE,
            StatusCode::OPENCL_BUILD_PROGRAM_FAILURE,
            StatusCode::INVALID_VALUE,
            StatusCode::INVALID_COMMAND_QUEUE,
            StatusCode::INVALID_MEM_OBJECT,
            StatusCode::NOT_IMPLEMENTED,
            StatusCode::INVALID_MATRIX_A,
            StatusCode::INVALID_VECTOR_X,
            StatusCode::INSUFFICIENT_MEMORY_TEMP,
            StatusCode::NO_DOUBLE_PRECISION,
            StatusCode::DATABASE_ERROR,
            StatusCode::UNEXPECTED_ERROR,
        ] {
            // The stub reports -n, so ask for exactly that status.
            let n = (-status.raw()) as usize;
            let mut q = queue();
            let reported =
                bridge.saxpy(n, 1.0, buffer(), 0, 1, buffer(), 0, 1, &mut q, None);
            assert_eq!(reported, status);
        }
    }

    #[test]
    fn pass_through_holds_for_every_routine_shape() {
        let bridge = stub_bridge();
        let n = (-StatusCode::INVALID_COMMAND_QUEUE.raw()) as usize;

        let mut q = queue();
        assert_eq!(
            bridge.daxpy(n, 1.0, buffer(), 0, 1, buffer(), 0, 1, &mut q, None),
            StatusCode::INVALID_COMMAND_QUEUE
        );
        let mut q = queue();
        assert_eq!(
            bridge.sscal(n, 2.0, buffer(), 0, 1, &mut q, None),
            StatusCode::INVALID_COMMAND_QUEUE
        );
        let mut q = queue();
        assert_eq!(
            bridge.sdot(n, buffer(), 0, buffer(), 0, 1, buffer(), 0, 1, &mut q, None),
            StatusCode::INVALID_COMMAND_QUEUE
        );
        let mut q = queue();
        assert_eq!(
            bridge.sgemv(
                Layout::ColMajor,
                Transpose::No,
                n,
                4,
                1.0,
                buffer(),
                0,
                4,
                buffer(),
                0,
                1,
                0.0,
                buffer(),
                0,
                1,
                &mut q,
                None,
            ),
            StatusCode::INVALID_COMMAND_QUEUE
        );
        let mut q = queue();
        assert_eq!(
            bridge.dgemm(
                Layout::ColMajor,
                Transpose::No,
                Transpose::No,
                n,
                4,
                4,
                1.0,
                buffer(),
                0,
                4,
                buffer(),
                0,
                4,
                0.0,
                buffer(),
                0,
                4,
                &mut q,
                None,
            ),
            StatusCode::INVALID_COMMAND_QUEUE
        );
    }

    #[test]
    fn enum_discriminants_reach_the_native_side_unchanged() {
        let bridge = stub_bridge();
        let mut q = queue();
        let status = bridge.sgemm(
            Layout::RowMajor,
            Transpose::No,
            Transpose::Yes,
            2,
            2,
            2,
            1.0,
            buffer(),
            0,
            2,
            buffer(),
            0,
            2,
            0.0,
            buffer(),
            0,
            2,
            &mut q,
            None,
        );
        assert_eq!(status, StatusCode::SUCCESS);
    }

    #[test]
    fn a_produced_event_handle_roundtrips_exactly() {
        let bridge = stub_bridge();
        let mut q = queue();
        let mut event = EventHandle::from_raw(0);
        let status = bridge.saxpy(
            0,
            1.0,
            buffer(),
            0,
            1,
            buffer(),
            0,
            1,
            &mut q,
            Some(&mut event),
        );
        assert_eq!(status, StatusCode::SUCCESS);
        assert_eq!(event.as_raw(), STUB_EVENT);
        // The queue the caller owns is untouched.
        assert_eq!(q.as_raw(), 0x2000);
    }

    #[test]
    fn null_handles_yield_the_internal_status_without_a_native_call() {
        let bridge = stub_bridge();

        // n = 7 would make the stub report -7, so seeing the internal
        // status proves the native side was never reached.
        let mut q = queue();
        let status = bridge.saxpy(
            7,
            1.0,
            MemBuffer::from_raw(0),
            0,
            1,
            buffer(),
            0,
            1,
            &mut q,
            None,
        );
        assert_eq!(status, StatusCode::BRIDGE_INTERNAL_ERROR);

        let mut null_queue = CommandQueue::from_raw(0);
        let status = bridge.saxpy(7, 1.0, buffer(), 0, 1, buffer(), 0, 1, &mut null_queue, None);
        assert_eq!(status, StatusCode::BRIDGE_INTERNAL_ERROR);

        let status = bridge.fill_cache(DeviceId::from_raw(0));
        assert_eq!(status, StatusCode::BRIDGE_INTERNAL_ERROR);
    }

    #[test]
    fn cache_utilities_forward() {
        let bridge = stub_bridge();
        assert_eq!(bridge.clear_cache(), StatusCode::SUCCESS);
        assert_eq!(
            bridge.fill_cache(DeviceId::from_raw(0x3000)),
            StatusCode::SUCCESS
        );
    }

    #[test]
    fn detach_is_a_plain_teardown() {
        let bridge = stub_bridge();
        bridge.set_log_level(LogSeverity::Info);
        bridge.detach();
    }

    #[test]
    fn attach_fails_when_the_library_is_missing() {
        let config = BridgeConfig {
            library: crate::config::LibraryConfig {
                path: Some("/nonexistent/libclblast.so".to_string()),
            },
            ..BridgeConfig::default()
        };
        let err = Bridge::attach(&config).err().expect("attach must fail");
        assert!(matches!(err, BridgeError::LibraryNotFound(_)));
    }
}
