/// Environment variable consulted for an explicit native library path.
pub const LIBRARY_ENV: &str = "CLBRIDGE_LIBRARY";

/// Candidate file names for the native CLBlast library, tried in order.
pub fn native_library_names() -> &'static [&'static str] {
    #[cfg(target_os = "windows")]
    {
        &["clblast.dll"]
    }
    #[cfg(target_os = "linux")]
    {
        &["libclblast.so.1", "libclblast.so"]
    }
    #[cfg(target_os = "macos")]
    {
        &["libclblast.dylib"]
    }
    #[cfg(not(any(target_os = "windows", target_os = "linux", target_os = "macos")))]
    {
        &["libclblast.so"]
    }
}

/// Returns the platform name string.
pub fn platform_name() -> &'static str {
    #[cfg(target_os = "windows")]
    { "windows" }
    #[cfg(target_os = "linux")]
    { "linux" }
    #[cfg(target_os = "macos")]
    { "macos" }
    #[cfg(not(any(target_os = "windows", target_os = "linux", target_os = "macos")))]
    { "unknown" }
}
