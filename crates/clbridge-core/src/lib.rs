//! Core of the clbridge binding layer.
//!
//! clbridge exposes the CLBlast GPU BLAS library to an embedding host
//! application. This crate holds everything except the C surface: the
//! status-code space, the typed handle proxies, the dynamically loaded
//! dispatch table, and the [`Bridge`] attach/detach context with one
//! call-translation shim per wrapped routine.
//!
//! All numeric computation and device dispatch live in the wrapped native
//! library; this layer only marshals arguments and results across the
//! boundary.

pub mod bridge;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod handle;
pub mod status;
pub mod types;

pub use bridge::Bridge;
pub use error::BridgeError;
pub use status::StatusCode;

/// ABI version of the binding surface. Embedders check this before
/// attaching; it changes whenever an exported signature does.
pub const ABI_VERSION: i32 = 1;
