//! Typed proxies for the caller's native OpenCL handles.
//!
//! A proxy carries exactly the native pointer value, nothing else. The
//! bridge never allocates or frees the underlying resource and there are
//! no destructors here; ownership stays with the caller, and the native
//! representation must remain valid for the duration of the call using it.

use std::ffi::c_void;

/// A `cl_mem` device buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct MemBuffer(u64);

impl MemBuffer {
    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub fn from_ptr(ptr: *mut c_void) -> Self {
        Self(ptr as u64)
    }

    pub fn as_raw(self) -> u64 {
        self.0
    }

    pub fn as_ptr(self) -> *mut c_void {
        self.0 as *mut c_void
    }

    pub fn is_null(self) -> bool {
        self.0 == 0
    }
}

/// A `cl_command_queue`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct CommandQueue(u64);

impl CommandQueue {
    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub fn from_ptr(ptr: *mut c_void) -> Self {
        Self(ptr as u64)
    }

    pub fn as_raw(self) -> u64 {
        self.0
    }

    pub fn as_ptr(self) -> *mut c_void {
        self.0 as *mut c_void
    }

    pub fn is_null(self) -> bool {
        self.0 == 0
    }
}

/// A `cl_event` produced by the library on request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct EventHandle(u64);

impl EventHandle {
    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub fn from_ptr(ptr: *mut c_void) -> Self {
        Self(ptr as u64)
    }

    pub fn as_raw(self) -> u64 {
        self.0
    }

    pub fn as_ptr(self) -> *mut c_void {
        self.0 as *mut c_void
    }

    pub fn is_null(self) -> bool {
        self.0 == 0
    }
}

/// A `cl_device_id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct DeviceId(u64);

impl DeviceId {
    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub fn from_ptr(ptr: *mut c_void) -> Self {
        Self(ptr as u64)
    }

    pub fn as_raw(self) -> u64 {
        self.0
    }

    pub fn as_ptr(self) -> *mut c_void {
        self.0 as *mut c_void
    }

    pub fn is_null(self) -> bool {
        self.0 == 0
    }
}
