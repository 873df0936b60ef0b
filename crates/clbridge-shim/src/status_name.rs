//! Status-name query functions (client-side only, no native call).

use std::ffi::{c_char, c_int};

use clbridge_core::status::StatusCode;

const SUCCESS: c_int = StatusCode::SUCCESS.raw();
const INTERNAL_ERROR: c_int = StatusCode::BRIDGE_INTERNAL_ERROR.raw();

/// Write the symbolic name for `status` into `p_str`. Unknown codes get a
/// fixed fallback name; the pointer stays valid for the process lifetime.
#[no_mangle]
pub unsafe extern "C" fn clbridge_status_name(
    status: c_int,
    p_str: *mut *const c_char,
) -> c_int {
    if p_str.is_null() {
        return INTERNAL_ERROR;
    }
    unsafe { *p_str = StatusCode::from_raw(status).name_cstr().as_ptr() };
    SUCCESS
}
