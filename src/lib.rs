//! OpenGL entry point resolution and context bootstrap.
//!
//! A [`Driver`] creates [`Display`]s for a requested [`DisplayFormat`].
//! The first [`Display::create_context`] call bootstraps a modern
//! context-creation path through a throwaway legacy context, after which
//! every [`RenderContext`] issued by the display shares resources with a
//! hidden root context. Each render context owns its own resolved
//! command sets ([`Api`]) and creates the resource wrappers in
//! [`buffer`], [`shader`], [`program`], and [`vertex_array`].
//!
//! ```no_run
//! # #[cfg(windows)]
//! # fn main() -> glctx::Result<()> {
//! use glctx::{ContextKey, ContextOptions, DisplayFormat, Driver, ProfileMask};
//! # let drawable: raw_window_handle::RawWindowHandle = unimplemented!();
//! let driver = Driver::native()?;
//! let display = driver.create_display(DisplayFormat::standard())?;
//! let options = ContextOptions::version(3, 3)
//!     .with(ContextKey::ProfileMask, ProfileMask::CORE);
//! let context = display.create_context(drawable, &options)?;
//! context.make_current()?;
//! context.api().core().clear(glctx::gl::COLOR_BUFFER_BIT)?;
//! context.swap_buffers()?;
//! # Ok(())
//! # }
//! # #[cfg(not(windows))]
//! # fn main() {}
//! ```

#[macro_use]
extern crate bitflags;
#[macro_use]
extern crate log;

#[macro_use]
mod macros;

mod factory;
mod queue;
mod util;

pub mod buffer;
pub mod command;
pub mod commands;
pub mod context;
pub mod display;
pub mod driver;
pub mod error;
pub mod extensions;
pub mod format;
pub mod gl;
pub mod options;
pub mod platform;
pub mod program;
pub mod properties;
pub mod resolver;
pub mod resource;
pub mod shader;
pub mod vertex_array;
pub mod wgl;

#[doc(inline)]
pub use buffer::{Buffer, IndexBuffer, VertexBuffer, VertexSchema};

#[doc(inline)]
pub use command::{CommandSet, ExtensionCommandSet};

#[doc(inline)]
pub use commands::Api;

#[doc(inline)]
pub use context::RenderContext;

#[doc(inline)]
pub use display::Display;

#[doc(inline)]
pub use driver::Driver;

#[doc(inline)]
pub use error::{Error, OperationError, Result};

#[doc(inline)]
pub use extensions::ExtensionSet;

#[doc(inline)]
pub use format::{DisplayFormat, FormatKey};

#[doc(inline)]
pub use options::{ContextFlags, ContextKey, ContextOptions, ProfileMask};

#[doc(inline)]
pub use platform::Platform;

#[doc(inline)]
pub use program::Program;

#[doc(inline)]
pub use resolver::{DeviceResolver, Resolver};

#[doc(inline)]
pub use shader::Shader;

#[doc(inline)]
pub use vertex_array::VertexArray;
