//! Entry point resolution.

use crate::error::Result;
use crate::extensions::ExtensionSet;
use crate::platform::DeviceHandle;
use std::os::raw::c_void;

/// Fetches the next accumulated GL error code, i.e. `glGetError`.
pub type ErrorReporter = unsafe extern "system" fn() -> u32;

/// Maps entry point names to callable addresses and answers extension
/// presence questions for the context currently bound on the calling
/// thread.
///
/// A resolver is passed by reference to every command set's `resolve`
/// step and is never stored by the command set.
pub trait Resolver {
    /// Returns the address of the named entry point, or null if the
    /// platform has no entry point of that name for the current device.
    fn resolve_entry_point(&self, name: &str) -> *const c_void;

    /// Returns `true` if the named extension is advertised.
    fn is_extension_present(&self, name: &str) -> bool;

    /// Returns the callable used to drain pending GL errors.
    fn error_reporter(&self) -> Option<ErrorReporter>;
}

/// A resolver whose answers depend on the display device it is bound to.
pub trait DeviceResolver: Resolver {
    /// Binds the resolver to `device` and rebuilds the extension set.
    ///
    /// A context must be current on `device` for the calling thread.
    /// Pointers returned before rebinding may be invalid afterwards on
    /// platforms where entry points are context specific.
    fn set_device(&mut self, device: DeviceHandle) -> Result<()>;

    /// Returns the extension set of the bound device.
    fn extensions(&self) -> &ExtensionSet;
}

impl<'a, R: Resolver + ?Sized> Resolver for &'a R {
    fn resolve_entry_point(&self, name: &str) -> *const c_void {
        (**self).resolve_entry_point(name)
    }

    fn is_extension_present(&self, name: &str) -> bool {
        (**self).is_extension_present(name)
    }

    fn error_reporter(&self) -> Option<ErrorReporter> {
        (**self).error_reporter()
    }
}
