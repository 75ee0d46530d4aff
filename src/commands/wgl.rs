//! WGL extension command sets.
//!
//! Window-system entry points report failure through their return values
//! rather than the GL error state, so these sets use an unchecked guard
//! and hand raw results back for the caller to map onto platform errors.

use crate::command::{self, CommandSet, ExtensionCommandSet, Guard, Presence, State};
use crate::error::{Error, Result};
use crate::platform::{ContextHandle, DeviceHandle};
use crate::resolver::Resolver;
use crate::util;
use crate::wgl;
use std::fmt;

/// Checks the `(key, value, ..., 0)` termination of an attribute list.
fn terminated<T: Copy + Default + PartialEq>(list: &[T]) -> Result<()> {
    match list.last() {
        Some(last) if *last == T::default() => Ok(()),
        _ => Err(Error::invalid("attribute list must be zero-terminated")),
    }
}

/// `WGL_ARB_create_context`.
#[derive(Clone)]
pub struct ArbCreateContext {
    table: wgl::Wgl,
    guard: Guard,
    presence: Presence,
    state: State,
}

impl ArbCreateContext {
    /// Extension string name.
    pub const NAME: &'static str = "WGL_ARB_create_context";

    /// Entry points resolved by this set.
    pub const COMMANDS: &'static [&'static str] = &["wglCreateContextAttribsARB"];

    /// An unresolved command set.
    pub fn new() -> Self {
        Self {
            table: wgl::Wgl::load_with(command::load_none),
            guard: Guard::unchecked(),
            presence: Presence::new(Self::NAME),
            state: State::Unresolved,
        }
    }

    /// Corresponds to `wglCreateContextAttribsARB`.
    ///
    /// Returns a null handle when the driver refuses the request.
    pub fn create_context_attribs(
        &self,
        device: DeviceHandle,
        share: ContextHandle,
        attribs: &[i32],
    ) -> Result<ContextHandle> {
        terminated(attribs)?;
        let (hdc, share, list) = (device.as_const(), share.as_const(), attribs.as_ptr());
        let context = command!(
            self,
            CreateContextAttribsARB,
            "wglCreateContextAttribsARB",
            (hdc, share, list),
        );
        Ok(ContextHandle::from_ptr(context as *mut _))
    }
}

impl CommandSet for ArbCreateContext {
    fn resolve(&mut self, resolver: &dyn Resolver) {
        self.table = wgl::Wgl::load_with(command::load_subset(resolver, Self::COMMANDS));
        self.presence.update(resolver, &[self.table.CreateContextAttribsARB.is_loaded()]);
        self.state = State::Resolved;
    }

    fn state(&self) -> State {
        self.state
    }
}

impl ExtensionCommandSet for ArbCreateContext {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn is_present(&self) -> bool {
        self.presence.is_present()
    }
}

/// `WGL_ARB_pixel_format`.
#[derive(Clone)]
pub struct ArbPixelFormat {
    table: wgl::Wgl,
    guard: Guard,
    presence: Presence,
    state: State,
}

impl ArbPixelFormat {
    /// Extension string name.
    pub const NAME: &'static str = "WGL_ARB_pixel_format";

    /// Entry points resolved by this set.
    pub const COMMANDS: &'static [&'static str] = &[
        "wglChoosePixelFormatARB",
        "wglGetPixelFormatAttribivARB",
        "wglGetPixelFormatAttribfvARB",
    ];

    /// An unresolved command set.
    pub fn new() -> Self {
        Self {
            table: wgl::Wgl::load_with(command::load_none),
            guard: Guard::unchecked(),
            presence: Presence::new(Self::NAME),
            state: State::Unresolved,
        }
    }

    /// Corresponds to `wglChoosePixelFormatARB`.
    ///
    /// Returns up to `max_formats` matching pixel format ids in driver
    /// preference order, or `None` when the call itself failed.
    pub fn choose_pixel_format(
        &self,
        device: DeviceHandle,
        int_attribs: &[i32],
        float_attribs: &[f32],
        max_formats: u32,
    ) -> Result<Option<Vec<i32>>> {
        terminated(int_attribs)?;
        terminated(float_attribs)?;
        let mut formats = vec![0i32; max_formats as usize];
        let mut count = 0u32;
        let (hdc, ints, floats) = (device.as_const(), int_attribs.as_ptr(), float_attribs.as_ptr());
        let (out, out_count) = (formats.as_mut_ptr(), &mut count as *mut u32);
        let ok = command!(
            self,
            ChoosePixelFormatARB,
            "wglChoosePixelFormatARB",
            (hdc, ints, floats, max_formats, out, out_count),
        );
        if ok == 0 {
            return Ok(None);
        }
        formats.truncate((count as usize).min(max_formats as usize));
        Ok(Some(formats))
    }

    /// Corresponds to `wglGetPixelFormatAttribivARB`.
    pub fn get_pixel_format_attribs(
        &self,
        device: DeviceHandle,
        format: i32,
        layer: i32,
        attributes: &[i32],
    ) -> Result<Option<Vec<i32>>> {
        let mut values = vec![0i32; attributes.len()];
        let (hdc, count) = (device.as_const(), attributes.len() as u32);
        let (keys, out) = (attributes.as_ptr(), values.as_mut_ptr());
        let ok = command!(
            self,
            GetPixelFormatAttribivARB,
            "wglGetPixelFormatAttribivARB",
            (hdc, format, layer, count, keys, out),
        );
        Ok(if ok == 0 { None } else { Some(values) })
    }

    /// Corresponds to `wglGetPixelFormatAttribfvARB`.
    pub fn get_pixel_format_attribs_f(
        &self,
        device: DeviceHandle,
        format: i32,
        layer: i32,
        attributes: &[i32],
    ) -> Result<Option<Vec<f32>>> {
        let mut values = vec![0f32; attributes.len()];
        let (hdc, count) = (device.as_const(), attributes.len() as u32);
        let (keys, out) = (attributes.as_ptr(), values.as_mut_ptr());
        let ok = command!(
            self,
            GetPixelFormatAttribfvARB,
            "wglGetPixelFormatAttribfvARB",
            (hdc, format, layer, count, keys, out),
        );
        Ok(if ok == 0 { None } else { Some(values) })
    }
}

impl CommandSet for ArbPixelFormat {
    fn resolve(&mut self, resolver: &dyn Resolver) {
        self.table = wgl::Wgl::load_with(command::load_subset(resolver, Self::COMMANDS));
        // Attribute queries are optional for choosing a format.
        self.presence.update(resolver, &[self.table.ChoosePixelFormatARB.is_loaded()]);
        self.state = State::Resolved;
    }

    fn state(&self) -> State {
        self.state
    }
}

impl ExtensionCommandSet for ArbPixelFormat {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn is_present(&self) -> bool {
        self.presence.is_present()
    }
}

/// `WGL_ARB_extensions_string`.
#[derive(Clone)]
pub struct ArbExtensionsString {
    table: wgl::Wgl,
    guard: Guard,
    presence: Presence,
    state: State,
}

impl ArbExtensionsString {
    /// Extension string name.
    pub const NAME: &'static str = "WGL_ARB_extensions_string";

    /// Entry points resolved by this set.
    pub const COMMANDS: &'static [&'static str] = &["wglGetExtensionsStringARB"];

    /// An unresolved command set.
    pub fn new() -> Self {
        Self {
            table: wgl::Wgl::load_with(command::load_none),
            guard: Guard::unchecked(),
            presence: Presence::new(Self::NAME),
            state: State::Unresolved,
        }
    }

    /// Corresponds to `wglGetExtensionsStringARB`.
    pub fn get_extensions_string(&self, device: DeviceHandle) -> Result<Option<String>> {
        let hdc = device.as_const();
        let string = command!(self, GetExtensionsStringARB, "wglGetExtensionsStringARB", (hdc));
        Ok(unsafe { util::owned_string(string) })
    }
}

impl CommandSet for ArbExtensionsString {
    fn resolve(&mut self, resolver: &dyn Resolver) {
        self.table = wgl::Wgl::load_with(command::load_subset(resolver, Self::COMMANDS));
        self.presence.update(resolver, &[self.table.GetExtensionsStringARB.is_loaded()]);
        self.state = State::Resolved;
    }

    fn state(&self) -> State {
        self.state
    }
}

impl ExtensionCommandSet for ArbExtensionsString {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn is_present(&self) -> bool {
        self.presence.is_present()
    }
}

/// `WGL_EXT_swap_control`.
#[derive(Clone)]
pub struct ExtSwapControl {
    table: wgl::Wgl,
    guard: Guard,
    presence: Presence,
    state: State,
}

impl ExtSwapControl {
    /// Extension string name.
    pub const NAME: &'static str = "WGL_EXT_swap_control";

    /// Entry points resolved by this set.
    pub const COMMANDS: &'static [&'static str] = &[
        "wglSwapIntervalEXT",
        "wglGetSwapIntervalEXT",
    ];

    /// An unresolved command set.
    pub fn new() -> Self {
        Self {
            table: wgl::Wgl::load_with(command::load_none),
            guard: Guard::unchecked(),
            presence: Presence::new(Self::NAME),
            state: State::Unresolved,
        }
    }

    /// Corresponds to `wglSwapIntervalEXT`; returns `false` on failure.
    pub fn swap_interval(&self, interval: i32) -> Result<bool> {
        let ok = command!(self, SwapIntervalEXT, "wglSwapIntervalEXT", (interval));
        Ok(ok != 0)
    }

    /// Corresponds to `wglGetSwapIntervalEXT`.
    pub fn get_swap_interval(&self) -> Result<i32> {
        Ok(command!(self, GetSwapIntervalEXT, "wglGetSwapIntervalEXT", ()))
    }
}

impl CommandSet for ExtSwapControl {
    fn resolve(&mut self, resolver: &dyn Resolver) {
        self.table = wgl::Wgl::load_with(command::load_subset(resolver, Self::COMMANDS));
        self.presence.update(
            resolver,
            &[
                self.table.SwapIntervalEXT.is_loaded(),
                self.table.GetSwapIntervalEXT.is_loaded(),
            ],
        );
        self.state = State::Resolved;
    }

    fn state(&self) -> State {
        self.state
    }
}

impl ExtensionCommandSet for ExtSwapControl {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn is_present(&self) -> bool {
        self.presence.is_present()
    }
}

macro_rules! impl_debug_and_default {
    ( $($ident:ident,)* ) => {
        $(
            impl fmt::Debug for $ident {
                fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
                    f.debug_struct(stringify!($ident))
                        .field("state", &self.state)
                        .field("present", &self.presence.is_present())
                        .finish()
                }
            }

            impl Default for $ident {
                fn default() -> Self {
                    Self::new()
                }
            }
        )*
    };
}

impl_debug_and_default!(
    ArbCreateContext,
    ArbPixelFormat,
    ArbExtensionsString,
    ExtSwapControl,
);

