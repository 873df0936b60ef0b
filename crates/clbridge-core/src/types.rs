//! Argument enums for the wrapped BLAS routines.
//!
//! Discriminant values match the native library's C enums and are stable
//! across the C surface. An unknown discriminant is a conversion failure,
//! reported as the bridge-internal status at the boundary.

use std::ffi::c_int;

/// Matrix storage layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum Layout {
    RowMajor = 101,
    ColMajor = 102,
}

impl Layout {
    pub fn from_raw(raw: c_int) -> Option<Self> {
        match raw {
            101 => Some(Self::RowMajor),
            102 => Some(Self::ColMajor),
            _ => None,
        }
    }

    pub fn raw(self) -> c_int {
        self as c_int
    }
}

/// Matrix transpose mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum Transpose {
    No = 111,
    Yes = 112,
    Conjugate = 113,
}

impl Transpose {
    pub fn from_raw(raw: c_int) -> Option<Self> {
        match raw {
            111 => Some(Self::No),
            112 => Some(Self::Yes),
            113 => Some(Self::Conjugate),
            _ => None,
        }
    }

    pub fn raw(self) -> c_int {
        self as c_int
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_discriminants_roundtrip() {
        for layout in [Layout::RowMajor, Layout::ColMajor] {
            assert_eq!(Layout::from_raw(layout.raw()), Some(layout));
        }
        assert_eq!(Layout::from_raw(100), None);
        assert_eq!(Layout::from_raw(0), None);
    }

    #[test]
    fn transpose_discriminants_roundtrip() {
        for transpose in [Transpose::No, Transpose::Yes, Transpose::Conjugate] {
            assert_eq!(Transpose::from_raw(transpose.raw()), Some(transpose));
        }
        assert_eq!(Transpose::from_raw(114), None);
    }
}
