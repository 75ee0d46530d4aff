//! The `GL_KHR_debug` command set.

use crate::command::{self, CommandSet, ExtensionCommandSet, Guard, Presence, State};
use crate::error::Result;
use crate::gl;
use crate::resolver::Resolver;
use std::{fmt, ptr};
use std::os::raw::c_void;

/// `GL_KHR_debug`: driver message filtering, annotations, and labels.
#[derive(Clone)]
pub struct KhrDebug {
    table: gl::Gl,
    guard: Guard,
    presence: Presence,
    state: State,
}

impl KhrDebug {
    /// Extension string name.
    pub const NAME: &'static str = "GL_KHR_debug";

    /// Entry points resolved by this set.
    pub const COMMANDS: &'static [&'static str] = &[
        "glDebugMessageControl",
        "glDebugMessageInsert",
        "glDebugMessageCallback",
        "glPushDebugGroup",
        "glPopDebugGroup",
        "glObjectLabel",
    ];

    /// An unresolved command set.
    pub fn new() -> Self {
        Self {
            table: gl::Gl::load_with(command::load_none),
            guard: Guard::default(),
            presence: Presence::new(Self::NAME),
            state: State::Unresolved,
        }
    }

    /// Corresponds to `glDebugMessageControl` without an id filter.
    pub fn debug_message_control(
        &self,
        source: u32,
        ty: u32,
        severity: u32,
        enabled: bool,
    ) -> Result<()> {
        let ids = ptr::null::<u32>();
        let enabled = if enabled { gl::TRUE } else { gl::FALSE };
        command!(
            self,
            DebugMessageControl,
            "glDebugMessageControl",
            (source, ty, severity, 0, ids, enabled),
        );
        Ok(())
    }

    /// Corresponds to `glDebugMessageInsert`.
    pub fn debug_message_insert(
        &self,
        source: u32,
        ty: u32,
        id: u32,
        severity: u32,
        message: &str,
    ) -> Result<()> {
        let (length, buf) = (message.len() as i32, message.as_ptr() as *const gl::types::GLchar);
        command!(
            self,
            DebugMessageInsert,
            "glDebugMessageInsert",
            (source, ty, id, severity, length, buf),
        );
        Ok(())
    }

    /// Corresponds to `glDebugMessageCallback`.
    ///
    /// # Safety
    ///
    /// `user` must remain valid for as long as the callback is installed
    /// on the current context.
    pub unsafe fn debug_message_callback(
        &self,
        callback: gl::types::GLDEBUGPROC,
        user: *const c_void,
    ) -> Result<()> {
        let name = "glDebugMessageCallback";
        self.guard.before(name, self.table.DebugMessageCallback.is_loaded())?;
        trace!(target: "gl", "glDebugMessageCallback{:?}", (callback.is_some(), user));
        self.table.DebugMessageCallback(callback, user);
        self.guard.after(name)
    }

    /// Corresponds to `glPushDebugGroup`.
    pub fn push_debug_group(&self, source: u32, id: u32, message: &str) -> Result<()> {
        let (length, buf) = (message.len() as i32, message.as_ptr() as *const gl::types::GLchar);
        command!(self, PushDebugGroup, "glPushDebugGroup", (source, id, length, buf));
        Ok(())
    }

    /// Corresponds to `glPopDebugGroup`.
    pub fn pop_debug_group(&self) -> Result<()> {
        command!(self, PopDebugGroup, "glPopDebugGroup", ());
        Ok(())
    }

    /// Corresponds to `glObjectLabel`.
    pub fn object_label(&self, identifier: u32, name: u32, label: &str) -> Result<()> {
        let (length, buf) = (label.len() as i32, label.as_ptr() as *const gl::types::GLchar);
        command!(self, ObjectLabel, "glObjectLabel", (identifier, name, length, buf));
        Ok(())
    }
}

impl CommandSet for KhrDebug {
    fn resolve(&mut self, resolver: &dyn Resolver) {
        self.table = gl::Gl::load_with(command::load_subset(resolver, Self::COMMANDS));
        self.guard = Guard::new(resolver.error_reporter());
        self.presence.update(
            resolver,
            &[
                self.table.DebugMessageControl.is_loaded(),
                self.table.DebugMessageInsert.is_loaded(),
                self.table.DebugMessageCallback.is_loaded(),
                self.table.PushDebugGroup.is_loaded(),
                self.table.PopDebugGroup.is_loaded(),
                self.table.ObjectLabel.is_loaded(),
            ],
        );
        self.state = State::Resolved;
    }

    fn state(&self) -> State {
        self.state
    }
}

impl ExtensionCommandSet for KhrDebug {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn is_present(&self) -> bool {
        self.presence.is_present()
    }
}

impl Default for KhrDebug {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for KhrDebug {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("KhrDebug")
            .field("state", &self.state)
            .field("present", &self.presence.is_present())
            .finish()
    }
}
