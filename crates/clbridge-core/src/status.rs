//! The native library's status-code space plus the single reserved
//! bridge-internal value.
//!
//! Codes reported by the native library are passed through verbatim and
//! never reinterpreted. The reserved value lies outside both the
//! OpenCL-derived and the CLBlast-specific ranges so a caller can always
//! tell "the library rejected the operation" from "the binding could not
//! attempt it".

use std::ffi::{c_int, CStr};
use std::fmt;

/// Raw status code as returned by the native library.
pub type RawStatus = c_int;

/// Status code reported to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct StatusCode(pub RawStatus);

macro_rules! status_names {
    ($($code:literal => $name:literal),+ $(,)?) => {
        impl StatusCode {
            /// Symbolic name for a status code.
            pub fn name(self) -> &'static str {
                match self.0 {
                    $($code => $name,)+
                    _ => "CLBlastUnknownError",
                }
            }

            /// Same, as a null-terminated C string for the exported
            /// status-name query.
            pub fn name_cstr(self) -> &'static CStr {
                match self.0 {
                    $($code => {
                        const BYTES: &[u8] = concat!($name, "\0").as_bytes();
                        // Built from a literal with a single trailing nul.
                        unsafe { CStr::from_bytes_with_nul_unchecked(BYTES) }
                    })+
                    _ => unsafe {
                        CStr::from_bytes_with_nul_unchecked(b"CLBlastUnknownError\0")
                    },
                }
            }
        }
    };
}

impl StatusCode {
    pub const SUCCESS: StatusCode = StatusCode(0);

    // OpenCL-derived codes reported by the native library.
    pub const OPENCL_COMPILER_NOT_AVAILABLE: StatusCode = StatusCode(-3);
    pub const TEMP_BUFFER_ALLOC_FAILURE: StatusCode = StatusCode(-4);
    pub const OPENCL_OUT_OF_RESOURCES: StatusCode = StatusCode(-5);
    pub const OPENCL_OUT_OF_HOST_MEMORY: StatusCode = StatusCode(-6);
    pub const OPENCL_BUILD_PROGRAM_FAILURE: StatusCode = StatusCode(-11);
    pub const INVALID_VALUE: StatusCode = StatusCode(-30);
    pub const INVALID_COMMAND_QUEUE: StatusCode = StatusCode(-36);
    pub const INVALID_MEM_OBJECT: StatusCode = StatusCode(-38);
    pub const INVALID_BINARY: StatusCode = StatusCode(-42);
    pub const INVALID_BUILD_OPTIONS: StatusCode = StatusCode(-43);
    pub const INVALID_PROGRAM: StatusCode = StatusCode(-44);
    pub const INVALID_PROGRAM_EXECUTABLE: StatusCode = StatusCode(-45);
    pub const INVALID_KERNEL_NAME: StatusCode = StatusCode(-46);
    pub const INVALID_KERNEL_DEFINITION: StatusCode = StatusCode(-47);
    pub const INVALID_KERNEL: StatusCode = StatusCode(-48);
    pub const INVALID_ARG_INDEX: StatusCode = StatusCode(-49);
    pub const INVALID_ARG_VALUE: StatusCode = StatusCode(-50);
    pub const INVALID_ARG_SIZE: StatusCode = StatusCode(-51);
    pub const INVALID_KERNEL_ARGS: StatusCode = StatusCode(-52);
    pub const INVALID_LOCAL_NUM_DIMENSIONS: StatusCode = StatusCode(-53);
    pub const INVALID_LOCAL_THREADS_TOTAL: StatusCode = StatusCode(-54);
    pub const INVALID_LOCAL_THREADS_DIM: StatusCode = StatusCode(-55);
    pub const INVALID_GLOBAL_OFFSET: StatusCode = StatusCode(-56);
    pub const INVALID_EVENT_WAIT_LIST: StatusCode = StatusCode(-57);
    pub const INVALID_EVENT: StatusCode = StatusCode(-58);
    pub const INVALID_OPERATION: StatusCode = StatusCode(-59);
    pub const INVALID_BUFFER_SIZE: StatusCode = StatusCode(-61);
    pub const INVALID_GLOBAL_WORK_SIZE: StatusCode = StatusCode(-63);

    // Codes shared with the clBLAS code space.
    pub const NOT_IMPLEMENTED: StatusCode = StatusCode(-1024);
    pub const INVALID_MATRIX_A: StatusCode = StatusCode(-1022);
    pub const INVALID_MATRIX_B: StatusCode = StatusCode(-1021);
    pub const INVALID_MATRIX_C: StatusCode = StatusCode(-1020);
    pub const INVALID_VECTOR_X: StatusCode = StatusCode(-1019);
    pub const INVALID_VECTOR_Y: StatusCode = StatusCode(-1018);
    pub const INSUFFICIENT_MEMORY_A: StatusCode = StatusCode(-1017);
    pub const INSUFFICIENT_MEMORY_B: StatusCode = StatusCode(-1016);
    pub const INSUFFICIENT_MEMORY_C: StatusCode = StatusCode(-1015);
    pub const INSUFFICIENT_MEMORY_X: StatusCode = StatusCode(-1014);
    pub const INSUFFICIENT_MEMORY_Y: StatusCode = StatusCode(-1013);

    // CLBlast-specific codes.
    pub const INSUFFICIENT_MEMORY_TEMP: StatusCode = StatusCode(-2050);
    pub const INVALID_BATCH_COUNT: StatusCode = StatusCode(-2049);
    pub const INVALID_OVERRIDE_KERNEL: StatusCode = StatusCode(-2048);
    pub const MISSING_OVERRIDE_PARAMETER: StatusCode = StatusCode(-2047);
    pub const INVALID_LOCAL_MEM_USAGE: StatusCode = StatusCode(-2046);
    pub const NO_HALF_PRECISION: StatusCode = StatusCode(-2045);
    pub const NO_DOUBLE_PRECISION: StatusCode = StatusCode(-2044);
    pub const INVALID_VECTOR_SCALAR: StatusCode = StatusCode(-2043);
    pub const INSUFFICIENT_MEMORY_SCALAR: StatusCode = StatusCode(-2042);
    pub const DATABASE_ERROR: StatusCode = StatusCode(-2041);
    pub const UNKNOWN_ERROR: StatusCode = StatusCode(-2040);
    pub const UNEXPECTED_ERROR: StatusCode = StatusCode(-2039);

    /// Reserved for failures inside the bridge itself: argument conversion
    /// impossible, null handle where a non-null native pointer is
    /// required, attach not performed.
    pub const BRIDGE_INTERNAL_ERROR: StatusCode = StatusCode(-16384);

    pub const fn from_raw(raw: RawStatus) -> Self {
        StatusCode(raw)
    }

    pub const fn raw(self) -> RawStatus {
        self.0
    }

    pub fn is_success(self) -> bool {
        self == Self::SUCCESS
    }

    pub fn is_bridge_internal(self) -> bool {
        self == Self::BRIDGE_INTERNAL_ERROR
    }
}

status_names! {
    0 => "CLBlastSuccess",
    -3 => "CLBlastOpenCLCompilerNotAvailable",
    -4 => "CLBlastTempBufferAllocFailure",
    -5 => "CLBlastOpenCLOutOfResources",
    -6 => "CLBlastOpenCLOutOfHostMemory",
    -11 => "CLBlastOpenCLBuildProgramFailure",
    -30 => "CLBlastInvalidValue",
    -36 => "CLBlastInvalidCommandQueue",
    -38 => "CLBlastInvalidMemObject",
    -42 => "CLBlastInvalidBinary",
    -43 => "CLBlastInvalidBuildOptions",
    -44 => "CLBlastInvalidProgram",
    -45 => "CLBlastInvalidProgramExecutable",
    -46 => "CLBlastInvalidKernelName",
    -47 => "CLBlastInvalidKernelDefinition",
    -48 => "CLBlastInvalidKernel",
    -49 => "CLBlastInvalidArgIndex",
    -50 => "CLBlastInvalidArgValue",
    -51 => "CLBlastInvalidArgSize",
    -52 => "CLBlastInvalidKernelArgs",
    -53 => "CLBlastInvalidLocalNumDimensions",
    -54 => "CLBlastInvalidLocalThreadsTotal",
    -55 => "CLBlastInvalidLocalThreadsDim",
    -56 => "CLBlastInvalidGlobalOffset",
    -57 => "CLBlastInvalidEventWaitList",
    -58 => "CLBlastInvalidEvent",
    -59 => "CLBlastInvalidOperation",
    -61 => "CLBlastInvalidBufferSize",
    -63 => "CLBlastInvalidGlobalWorkSize",
    -1024 => "CLBlastNotImplemented",
    -1022 => "CLBlastInvalidMatrixA",
    -1021 => "CLBlastInvalidMatrixB",
    -1020 => "CLBlastInvalidMatrixC",
    -1019 => "CLBlastInvalidVectorX",
    -1018 => "CLBlastInvalidVectorY",
    -1017 => "CLBlastInsufficientMemoryA",
    -1016 => "CLBlastInsufficientMemoryB",
    -1015 => "CLBlastInsufficientMemoryC",
    -1014 => "CLBlastInsufficientMemoryX",
    -1013 => "CLBlastInsufficientMemoryY",
    -2050 => "CLBlastInsufficientMemoryTemp",
    -2049 => "CLBlastInvalidBatchCount",
    -2048 => "CLBlastInvalidOverrideKernel",
    -2047 => "CLBlastMissingOverrideParameter",
    -2046 => "CLBlastInvalidLocalMemUsage",
    -2045 => "CLBlastNoHalfPrecision",
    -2044 => "CLBlastNoDoublePrecision",
    -2043 => "CLBlastInvalidVectorScalar",
    -2042 => "CLBlastInsufficientMemoryScalar",
    -2041 => "CLBlastDatabaseError",
    -2040 => "CLBlastUnknownError",
    -2039 => "CLBlastUnexpectedError",
    -16384 => "CLBridgeInternalError",
}

impl StatusCode {
    /// Human-readable description for the most common codes.
    pub fn description(self) -> &'static str {
        match self.0 {
            0 => "no error",
            -3 => "OpenCL compiler not available",
            -4 => "temporary buffer allocation failed",
            -5 => "device out of resources",
            -6 => "out of host memory",
            -11 => "kernel compilation failed",
            -30 => "invalid argument value",
            -36 => "invalid command queue",
            -38 => "invalid memory object",
            -1024 => "routine not implemented by the library",
            -1022 => "invalid matrix A",
            -1021 => "invalid matrix B",
            -1020 => "invalid matrix C",
            -1019 => "invalid vector X",
            -1018 => "invalid vector Y",
            -2045 => "half precision not supported by the device",
            -2044 => "double precision not supported by the device",
            -16384 => "failure inside the bridge, the native library was not reached",
            _ => "unknown status",
        }
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name(), self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Every code in the native library's defined space that the bridge
    /// knows by name.
    pub(crate) const NATIVE_CODES: &[StatusCode] = &[
        StatusCode::SUCCESS,
        StatusCode::OPENCL_COMPILER_NOT_AVAILABLE,
        StatusCode::TEMP_BUFFER_ALLOC_FAILURE,
        StatusCode::OPENCL_OUT_OF_RESOURCES,
        StatusCode::OPENCL_OUT_OF_HOST_MEMORY,
        StatusCode::OPENCL_BUILD_PROGRAM_FAILURE,
        StatusCode::INVALID_VALUE,
        StatusCode::INVALID_COMMAND_QUEUE,
        StatusCode::INVALID_MEM_OBJECT,
        StatusCode::INVALID_BINARY,
        StatusCode::INVALID_BUILD_OPTIONS,
        StatusCode::INVALID_PROGRAM,
        StatusCode::INVALID_PROGRAM_EXECUTABLE,
        StatusCode::INVALID_KERNEL_NAME,
        StatusCode::INVALID_KERNEL_DEFINITION,
        StatusCode::INVALID_KERNEL,
        StatusCode::INVALID_ARG_INDEX,
        StatusCode::INVALID_ARG_VALUE,
        StatusCode::INVALID_ARG_SIZE,
        StatusCode::INVALID_KERNEL_ARGS,
        StatusCode::INVALID_LOCAL_NUM_DIMENSIONS,
        StatusCode::INVALID_LOCAL_THREADS_TOTAL,
        StatusCode::INVALID_LOCAL_THREADS_DIM,
        StatusCode::INVALID_GLOBAL_OFFSET,
        StatusCode::INVALID_EVENT_WAIT_LIST,
        StatusCode::INVALID_EVENT,
        StatusCode::INVALID_OPERATION,
        StatusCode::INVALID_BUFFER_SIZE,
        StatusCode::INVALID_GLOBAL_WORK_SIZE,
        StatusCode::NOT_IMPLEMENTED,
        StatusCode::INVALID_MATRIX_A,
        StatusCode::INVALID_MATRIX_B,
        StatusCode::INVALID_MATRIX_C,
        StatusCode::INVALID_VECTOR_X,
        StatusCode::INVALID_VECTOR_Y,
        StatusCode::INSUFFICIENT_MEMORY_A,
        StatusCode::INSUFFICIENT_MEMORY_B,
        StatusCode::INSUFFICIENT_MEMORY_C,
        StatusCode::INSUFFICIENT_MEMORY_X,
        StatusCode::INSUFFICIENT_MEMORY_Y,
        StatusCode::INSUFFICIENT_MEMORY_TEMP,
        StatusCode::INVALID_BATCH_COUNT,
        StatusCode::INVALID_OVERRIDE_KERNEL,
        StatusCode::MISSING_OVERRIDE_PARAMETER,
        StatusCode::INVALID_LOCAL_MEM_USAGE,
        StatusCode::NO_HALF_PRECISION,
        StatusCode::NO_DOUBLE_PRECISION,
        StatusCode::INVALID_VECTOR_SCALAR,
        StatusCode::INSUFFICIENT_MEMORY_SCALAR,
        StatusCode::DATABASE_ERROR,
        StatusCode::UNKNOWN_ERROR,
        StatusCode::UNEXPECTED_ERROR,
    ];

    #[test]
    fn internal_error_is_outside_the_native_space() {
        for code in NATIVE_CODES {
            assert_ne!(*code, StatusCode::BRIDGE_INTERNAL_ERROR);
        }
        assert!(StatusCode::BRIDGE_INTERNAL_ERROR.is_bridge_internal());
        assert!(!StatusCode::INVALID_COMMAND_QUEUE.is_bridge_internal());
    }

    #[test]
    fn raw_roundtrip_is_lossless() {
        for code in NATIVE_CODES {
            assert_eq!(StatusCode::from_raw(code.raw()), *code);
        }
    }

    #[test]
    fn names_cover_every_known_code() {
        for code in NATIVE_CODES {
            if *code == StatusCode::UNKNOWN_ERROR {
                continue;
            }
            assert_ne!(code.name(), "CLBlastUnknownError", "unnamed: {}", code.0);
        }
        assert_eq!(StatusCode::SUCCESS.name(), "CLBlastSuccess");
        assert_eq!(
            StatusCode::INVALID_COMMAND_QUEUE.name(),
            "CLBlastInvalidCommandQueue"
        );
        assert_eq!(
            StatusCode::BRIDGE_INTERNAL_ERROR.name(),
            "CLBridgeInternalError"
        );
        // Unmapped codes fall back to the fixed name.
        assert_eq!(StatusCode::from_raw(-9999).name(), "CLBlastUnknownError");
    }

    #[test]
    fn name_cstr_matches_name() {
        for code in NATIVE_CODES {
            assert_eq!(code.name_cstr().to_str().expect("ascii name"), code.name());
        }
        assert_eq!(
            StatusCode::BRIDGE_INTERNAL_ERROR
                .name_cstr()
                .to_str()
                .expect("ascii name"),
            "CLBridgeInternalError"
        );
    }

    #[test]
    fn success_predicate() {
        assert!(StatusCode::SUCCESS.is_success());
        assert!(!StatusCode::INVALID_VALUE.is_success());
        assert_eq!(format!("{}", StatusCode::SUCCESS), "CLBlastSuccess (0)");
    }
}
