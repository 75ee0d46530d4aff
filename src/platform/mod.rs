//! Operating system primitives consumed by the display bootstrap.
//!
//! The bootstrap is written against [`Platform`] so that it can run on
//! any implementation of these primitives; [`windows::Win32Platform`]
//! is the native one.

use crate::error::{Error, Result};
use crate::format::PixelFormatDescriptor;
use crate::resolver::DeviceResolver;
use raw_window_handle::RawWindowHandle;
use std::os::raw::c_void;
use std::ptr;

#[cfg(windows)]
pub mod windows;

macro_rules! handle {
    ($(#[$attr:meta])* $name:ident) => {
        $(#[$attr])*
        #[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
        pub struct $name(*mut c_void);

        impl $name {
            /// The null handle.
            pub fn null() -> Self {
                $name(ptr::null_mut())
            }

            /// Wraps a raw handle.
            pub fn from_ptr(ptr: *mut c_void) -> Self {
                $name(ptr)
            }

            /// Returns the raw handle.
            pub fn as_ptr(self) -> *mut c_void {
                self.0
            }

            /// Returns the raw handle as a const pointer.
            pub fn as_const(self) -> *const c_void {
                self.0 as *const c_void
            }

            /// Returns `true` for the null handle.
            pub fn is_null(self) -> bool {
                self.0.is_null()
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::null()
            }
        }

        // Handles are opaque identifiers owned by the operating system.
        unsafe impl Send for $name {}
        unsafe impl Sync for $name {}
    };
}

handle! {
    /// A window, i.e. `HWND`.
    WindowHandle
}

handle! {
    /// A device context, i.e. `HDC`.
    DeviceHandle
}

handle! {
    /// A GL rendering context, i.e. `HGLRC`.
    ContextHandle
}

/// The purpose of a window created by the display.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum WindowKind {
    /// Hidden window carrying the throwaway legacy context.
    Auxiliary,

    /// Hidden window owned by the display for its root context.
    Root,
}

/// Parameters of a hidden window created during bootstrap.
#[derive(Clone, Copy, Debug)]
pub struct WindowRequest {
    /// What the window is for.
    pub kind: WindowKind,

    /// Place the window on the same output device as this window.
    pub near: Option<WindowHandle>,

    /// Stored in the window's user data for the lifetime of the window.
    pub user_data: *const c_void,
}

/// Operating system window, device, and context primitives.
///
/// Every method maps a failure onto [`Error::Platform`] carrying the
/// failing API name.
pub trait Platform: Send + Sync + 'static {
    /// The resolver type for this platform.
    type Resolver: DeviceResolver + Send;

    /// Creates an unbound resolver.
    fn create_resolver(&self) -> Result<Self::Resolver>;

    /// Extracts the native window from a drawable.
    fn drawable(&self, raw: RawWindowHandle) -> Result<WindowHandle> {
        win32_window(raw)
    }

    /// Checks that `window` is a live window whose class has a private
    /// device context.
    fn validate_drawable(&self, window: WindowHandle) -> Result<()>;

    /// Creates a hidden window with a private device context.
    fn create_window(&self, request: &WindowRequest) -> Result<WindowHandle>;

    /// Destroys a window created by [`create_window`](#tymethod.create_window).
    fn destroy_window(&self, window: WindowHandle) -> Result<()>;

    /// Obtains the device context of `window`.
    fn device(&self, window: WindowHandle) -> Result<DeviceHandle>;

    /// Releases a device context obtained from [`device`](#tymethod.device).
    fn release_device(&self, window: WindowHandle, device: DeviceHandle) -> Result<()>;

    /// Returns the pixel format id set on `device`, or zero if none is set.
    fn pixel_format(&self, device: DeviceHandle) -> Result<i32>;

    /// Chooses the closest legacy pixel format to `descriptor`.
    fn choose_pixel_format(
        &self,
        device: DeviceHandle,
        descriptor: &PixelFormatDescriptor,
    ) -> Result<i32>;

    /// Describes pixel format `format` of `device`.
    fn describe_pixel_format(
        &self,
        device: DeviceHandle,
        format: i32,
    ) -> Result<PixelFormatDescriptor>;

    /// Sets the pixel format of `device`. Permitted once per device.
    fn set_pixel_format(
        &self,
        device: DeviceHandle,
        format: i32,
        descriptor: &PixelFormatDescriptor,
    ) -> Result<()>;

    /// Creates a legacy GL context on `device`.
    fn create_legacy_context(&self, device: DeviceHandle) -> Result<ContextHandle>;

    /// Deletes a GL context. It must not be current on another thread.
    fn delete_context(&self, context: ContextHandle) -> Result<()>;

    /// Binds `context` to the calling thread on `device`.
    fn make_current(&self, device: DeviceHandle, context: ContextHandle) -> Result<()>;

    /// Unbinds any context from the calling thread.
    fn clear_current(&self) -> Result<()>;

    /// The context current on the calling thread, or null.
    fn current_context(&self) -> ContextHandle;

    /// The device the current context is bound on, or null.
    fn current_device(&self) -> DeviceHandle;

    /// Presents the back buffer of `device`.
    fn swap_buffers(&self, device: DeviceHandle) -> Result<()>;

    /// The calling thread's last OS error code.
    fn last_error(&self) -> u32;
}

/// Extracts a non-null Win32 window from a raw window handle.
pub fn win32_window(raw: RawWindowHandle) -> Result<WindowHandle> {
    match raw {
        RawWindowHandle::Win32(handle) if !handle.hwnd.is_null() => {
            Ok(WindowHandle::from_ptr(handle.hwnd))
        }
        RawWindowHandle::Win32(_) => Err(Error::invalid("drawable is a null window")),
        other => Err(Error::invalid(format!("drawable is not a Win32 window: {:?}", other))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use raw_window_handle::{Win32WindowHandle, XlibWindowHandle};

    #[test]
    fn only_non_null_win32_windows_are_drawables() {
        let mut handle = Win32WindowHandle::empty();
        assert!(win32_window(RawWindowHandle::Win32(handle)).unwrap_err().is_invalid_argument());

        handle.hwnd = 0x10 as *mut c_void;
        let window = win32_window(RawWindowHandle::Win32(handle)).unwrap();
        assert_eq!(window.as_ptr() as usize, 0x10);

        let xlib = RawWindowHandle::Xlib(XlibWindowHandle::empty());
        assert!(win32_window(xlib).unwrap_err().is_invalid_argument());
    }

    #[test]
    fn handles_default_to_null() {
        assert!(ContextHandle::default().is_null());
        assert_eq!(DeviceHandle::null(), DeviceHandle::from_ptr(ptr::null_mut()));
    }
}
