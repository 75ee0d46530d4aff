//! Command sets: guarded tables of resolved entry points.

mod core_api;
mod debug;
mod wgl;

pub use self::core_api::{ActiveVariable, CoreCommands};
pub use self::debug::KhrDebug;
pub use self::wgl::{ArbCreateContext, ArbExtensionsString, ArbPixelFormat, ExtSwapControl};

use crate::command::{CommandSet, ExtensionCommandSet};
use crate::resolver::Resolver;

/// Every command set a render context resolves against itself.
#[derive(Clone, Debug, Default)]
pub struct Api {
    core: CoreCommands,
    create_context: ArbCreateContext,
    pixel_format: ArbPixelFormat,
    extensions_string: ArbExtensionsString,
    swap_control: ExtSwapControl,
    debug: KhrDebug,
}

impl Api {
    /// Unresolved command sets.
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolves every command set against `resolver`.
    ///
    /// The context `resolver` answers for must be current.
    pub fn resolve(&mut self, resolver: &dyn Resolver) {
        self.core.resolve(resolver);
        self.create_context.resolve(resolver);
        self.pixel_format.resolve(resolver);
        self.extensions_string.resolve(resolver);
        self.swap_control.resolve(resolver);
        self.debug.resolve(resolver);
    }

    /// The core GL command set.
    pub fn core(&self) -> &CoreCommands {
        &self.core
    }

    /// `WGL_ARB_create_context`.
    pub fn create_context(&self) -> &ArbCreateContext {
        &self.create_context
    }

    /// `WGL_ARB_pixel_format`.
    pub fn pixel_format(&self) -> &ArbPixelFormat {
        &self.pixel_format
    }

    /// `WGL_ARB_extensions_string`.
    pub fn extensions_string(&self) -> &ArbExtensionsString {
        &self.extensions_string
    }

    /// `WGL_EXT_swap_control`.
    pub fn swap_control(&self) -> &ExtSwapControl {
        &self.swap_control
    }

    /// `GL_KHR_debug`.
    pub fn debug(&self) -> &KhrDebug {
        &self.debug
    }

    /// Iterates the extension command sets.
    pub fn extensions(&self) -> impl Iterator<Item = &dyn ExtensionCommandSet> {
        let sets: [&dyn ExtensionCommandSet; 5] = [
            &self.create_context,
            &self.pixel_format,
            &self.extensions_string,
            &self.swap_control,
            &self.debug,
        ];
        IntoIterator::into_iter(sets)
    }

    /// Returns `true` if the named extension command set is present.
    pub fn is_present(&self, name: &str) -> bool {
        self.extensions().any(|set| set.name() == name && set.is_present())
    }
}
