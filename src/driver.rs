//! Entry point of the crate: creates displays.

use crate::display::Display;
use crate::error::Result;
use crate::format::DisplayFormat;
use crate::platform::Platform;
use std::{fmt, sync};

/// Creates display contexts on top of a set of platform primitives.
pub struct Driver<P: Platform> {
    platform: sync::Arc<P>,
}

impl<P: Platform> Driver<P> {
    /// Constructor.
    pub fn new(platform: P) -> Self {
        Self {
            platform: sync::Arc::new(platform),
        }
    }

    /// Returns the platform primitives.
    pub fn platform(&self) -> &P {
        &self.platform
    }

    /// Creates a display for output in `format`.
    ///
    /// No window or context is created until the first render context is
    /// requested from the display.
    pub fn create_display(&self, format: DisplayFormat) -> Result<Display<P>> {
        Display::new(self.platform.clone(), format)
    }
}

#[cfg(windows)]
impl Driver<crate::platform::windows::Win32Platform> {
    /// A driver over the native WGL implementation.
    pub fn native() -> Result<Self> {
        crate::platform::windows::Win32Platform::new().map(Self::new)
    }
}

impl<P: Platform> Clone for Driver<P> {
    fn clone(&self) -> Self {
        Self {
            platform: self.platform.clone(),
        }
    }
}

impl<P: Platform> fmt::Debug for Driver<P> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Driver").finish()
    }
}
