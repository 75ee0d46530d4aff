//! Utility functions.

use crate::error::{Error, Result};
use std::convert::TryFrom;
use std::{ffi, mem, slice};
use std::os::raw::c_char;

/// Copies a NUL-terminated byte string into a C string, rejecting
/// interior NUL bytes.
pub fn cstring<T>(bytes: T) -> Result<ffi::CString>
    where T: Into<Vec<u8>>
{
    ffi::CString::new(bytes).map_err(|_| Error::invalid("string contains an interior NUL byte"))
}

/// Copies a NUL-terminated string returned by the driver.
///
/// Returns `None` for a null pointer.
///
/// # Safety
///
/// `ptr` must be null or point to a NUL-terminated string that stays
/// valid for the duration of the call.
pub unsafe fn owned_string(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        None
    } else {
        Some(ffi::CStr::from_ptr(ptr).to_string_lossy().into_owned())
    }
}

/// Decodes the first `length` bytes of a driver-filled buffer.
pub fn truncated_string(buffer: &[u8], length: i32) -> String {
    let length = (length.max(0) as usize).min(buffer.len());
    let end = buffer[.. length].iter().position(|&b| b == 0).unwrap_or(length);
    String::from_utf8_lossy(&buffer[.. end]).into_owned()
}

/// Views a slice of plain values as its bytes.
pub fn as_bytes<T: Copy>(data: &[T]) -> &[u8] {
    let len = data.len() * mem::size_of::<T>();
    unsafe { slice::from_raw_parts(data.as_ptr() as *const u8, len) }
}

/// Converts a caller-supplied count or offset to a `GLsizei`.
pub fn to_glsizei(what: &str, value: usize) -> Result<i32> {
    i32::try_from(value)
        .map_err(|_| Error::invalid(format!("{} {} exceeds the GL range", what, value)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncated_string_honours_length_and_nul() {
        assert_eq!(truncated_string(b"position\0junk", 8), "position");
        assert_eq!(truncated_string(b"abc\0def", 7), "abc");
        assert_eq!(truncated_string(b"abc", 10), "abc");
        assert_eq!(truncated_string(b"abc", -1), "");
    }

    #[test]
    fn owned_string_handles_null() {
        assert_eq!(unsafe { owned_string(std::ptr::null()) }, None);
        let text = b"GL_KHR_debug\0";
        let copied = unsafe { owned_string(text.as_ptr() as *const c_char) };
        assert_eq!(copied.as_deref(), Some("GL_KHR_debug"));
    }

    #[test]
    fn cstring_rejects_interior_nul() {
        assert!(cstring("main").is_ok());
        assert!(cstring("ma\0in").unwrap_err().is_invalid_argument());
    }

    #[test]
    fn as_bytes_covers_the_whole_slice() {
        assert_eq!(as_bytes(&[1u16, 2]).len(), 4);
        assert_eq!(as_bytes(&[0x0102_0304u32]), &0x0102_0304u32.to_ne_bytes()[..]);
        assert!(as_bytes::<f32>(&[]).is_empty());
    }

    #[test]
    fn glsizei_conversion_rejects_large_values() {
        assert_eq!(to_glsizei("count", 3).unwrap(), 3);
        assert_eq!(to_glsizei("count", i32::MAX as usize).unwrap(), i32::MAX);
        let error = to_glsizei("count", i32::MAX as usize + 1).unwrap_err();
        assert!(error.is_invalid_argument());
        assert!(to_glsizei("count", usize::MAX).is_err());
    }
}
