//! The core OpenGL command set.

use crate::command::{self, CommandSet, Guard, Loaded, State};
use crate::error::Result;
use crate::gl;
use crate::resolver::Resolver;
use crate::util;
use std::{ffi, fmt, ptr};
use std::os::raw::c_void;

/// An active program variable reported by `glGetActiveAttrib` or
/// `glGetActiveUniform`.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct ActiveVariable {
    /// The variable name.
    pub name: String,

    /// The array size, 1 for non-arrays.
    pub size: i32,

    /// The GL type token, e.g. `GL_FLOAT_VEC3`.
    pub ty: u32,
}

/// Entry points required by the base graphics API.
///
/// Every method corresponds to one GL call, guarded: a method whose entry
/// point did not resolve fails with unsupported, and any GL error left
/// behind by the call fails it with a subsystem error.
#[derive(Clone)]
pub struct CoreCommands {
    /// Raw function pointers.
    table: gl::Gl,

    /// Pre-call and post-call checks.
    guard: Guard,

    /// Names that resolved non-null.
    loaded: Loaded,

    /// Resolution state.
    state: State,
}

impl CoreCommands {
    /// An unresolved command set.
    pub fn new() -> Self {
        Self {
            table: gl::Gl::load_with(command::load_none),
            guard: Guard::default(),
            loaded: Loaded::default(),
            state: State::Unresolved,
        }
    }

    /// Returns `true` if the named entry point resolved non-null.
    pub fn is_loaded(&self, command: &str) -> bool {
        self.loaded.contains(command)
    }

    /// Returns the names that resolved.
    pub fn loaded(&self) -> &Loaded {
        &self.loaded
    }

    /// Returns the call guard, e.g. to drain stale errors.
    pub fn guard(&self) -> &Guard {
        &self.guard
    }

    // Error state

    /// Corresponds to `glGetError`, without draining further codes.
    pub fn get_error(&self) -> Result<u32> {
        self.guard.before("glGetError", self.table.GetError.is_loaded())?;
        Ok(unsafe { self.table.GetError() })
    }

    // Pipeline state operations

    /// Corresponds to `glClear`.
    pub fn clear(&self, mask: u32) -> Result<()> {
        command!(self, Clear, "glClear", (mask));
        Ok(())
    }

    /// Corresponds to `glClearColor`.
    pub fn clear_color(&self, r: f32, g: f32, b: f32, a: f32) -> Result<()> {
        command!(self, ClearColor, "glClearColor", (r, g, b, a));
        Ok(())
    }

    /// Corresponds to `glViewport`.
    pub fn viewport(&self, x: i32, y: i32, w: i32, h: i32) -> Result<()> {
        command!(self, Viewport, "glViewport", (x, y, w, h));
        Ok(())
    }

    /// Corresponds to `glEnable`.
    pub fn enable(&self, cap: u32) -> Result<()> {
        command!(self, Enable, "glEnable", (cap));
        Ok(())
    }

    /// Corresponds to `glDisable`.
    pub fn disable(&self, cap: u32) -> Result<()> {
        command!(self, Disable, "glDisable", (cap));
        Ok(())
    }

    /// Corresponds to `glFlush`.
    pub fn flush(&self) -> Result<()> {
        command!(self, Flush, "glFlush", ());
        Ok(())
    }

    /// Corresponds to `glFinish`.
    pub fn finish(&self) -> Result<()> {
        command!(self, Finish, "glFinish", ());
        Ok(())
    }

    // Queries

    /// Corresponds to `glGetString`.
    pub fn get_string(&self, name: u32) -> Result<Option<String>> {
        let string = command!(self, GetString, "glGetString", (name));
        Ok(unsafe { util::owned_string(string as *const _) })
    }

    /// Corresponds to `glGetStringi`.
    pub fn get_stringi(&self, name: u32, index: u32) -> Result<Option<String>> {
        let string = command!(self, GetStringi, "glGetStringi", (name, index));
        Ok(unsafe { util::owned_string(string as *const _) })
    }

    /// Corresponds to `glGetIntegerv` for a single value.
    pub fn get_integer(&self, pname: u32) -> Result<i32> {
        let mut value = 0;
        let data = &mut value as *mut i32;
        command!(self, GetIntegerv, "glGetIntegerv", (pname, data));
        Ok(value)
    }

    // Buffer operations

    /// Corresponds to `glGenBuffers(1)`.
    pub fn gen_buffer(&self) -> Result<u32> {
        let mut id = 0;
        let ids = &mut id as *mut u32;
        command!(self, GenBuffers, "glGenBuffers", (1, ids));
        trace!(target: "gl", "=> {}", id);
        Ok(id)
    }

    /// Corresponds to `glDeleteBuffers(1)`.
    pub fn delete_buffer(&self, id: u32) -> Result<()> {
        let ids = &id as *const u32;
        command!(self, DeleteBuffers, "glDeleteBuffers", (1, ids));
        Ok(())
    }

    /// Corresponds to `glBindBuffer`.
    pub fn bind_buffer(&self, target: u32, id: u32) -> Result<()> {
        command!(self, BindBuffer, "glBindBuffer", (target, id));
        Ok(())
    }

    /// Corresponds to `glBufferData` with initial contents.
    pub fn buffer_data(&self, target: u32, data: &[u8], usage: u32) -> Result<()> {
        let size = data.len() as isize;
        let ptr = data.as_ptr() as *const c_void;
        command!(self, BufferData, "glBufferData", (target, size, ptr, usage));
        Ok(())
    }

    /// Corresponds to `glBufferData` with uninitialized contents.
    pub fn allocate_buffer(&self, target: u32, size: usize, usage: u32) -> Result<()> {
        let size = size as isize;
        let ptr = ptr::null::<c_void>();
        command!(self, BufferData, "glBufferData", (target, size, ptr, usage));
        Ok(())
    }

    /// Corresponds to `glBufferSubData`.
    pub fn buffer_sub_data(&self, target: u32, offset: usize, data: &[u8]) -> Result<()> {
        let offset = offset as isize;
        let size = data.len() as isize;
        let ptr = data.as_ptr() as *const c_void;
        command!(self, BufferSubData, "glBufferSubData", (target, offset, size, ptr));
        Ok(())
    }

    /// Corresponds to `glGetBufferParameteriv` for a single value.
    pub fn get_buffer_parameter(&self, target: u32, pname: u32) -> Result<i32> {
        let mut value = 0;
        let params = &mut value as *mut i32;
        command!(
            self,
            GetBufferParameteriv,
            "glGetBufferParameteriv",
            (target, pname, params),
        );
        Ok(value)
    }

    // Shader operations

    /// Corresponds to `glCreateShader`.
    pub fn create_shader(&self, stage: u32) -> Result<u32> {
        let id = command!(self, CreateShader, "glCreateShader", (stage));
        trace!(target: "gl", "=> {}", id);
        Ok(id)
    }

    /// Corresponds to `glDeleteShader`.
    pub fn delete_shader(&self, id: u32) -> Result<()> {
        command!(self, DeleteShader, "glDeleteShader", (id));
        Ok(())
    }

    /// Corresponds to `glShaderSource` with a single string.
    pub fn shader_source(&self, id: u32, source: &ffi::CStr) -> Result<()> {
        let string = source.as_ptr();
        let strings = &string as *const *const _;
        let lengths = ptr::null::<i32>();
        command!(self, ShaderSource, "glShaderSource", (id, 1, strings, lengths));
        Ok(())
    }

    /// Corresponds to `glCompileShader`.
    pub fn compile_shader(&self, id: u32) -> Result<()> {
        command!(self, CompileShader, "glCompileShader", (id));
        Ok(())
    }

    /// Corresponds to `glGetShaderiv` for a single value.
    pub fn get_shader(&self, id: u32, pname: u32) -> Result<i32> {
        let mut value = 0;
        let params = &mut value as *mut i32;
        command!(self, GetShaderiv, "glGetShaderiv", (id, pname, params));
        Ok(value)
    }

    /// Corresponds to `glGetShaderInfoLog`.
    pub fn shader_info_log(&self, id: u32) -> Result<String> {
        let capacity = self.get_shader(id, gl::INFO_LOG_LENGTH)?;
        let mut buffer = vec![0u8; capacity.max(1) as usize];
        let mut length = 0;
        let size = buffer.len() as i32;
        let len = &mut length as *mut i32;
        let log = buffer.as_mut_ptr() as *mut gl::types::GLchar;
        command!(self, GetShaderInfoLog, "glGetShaderInfoLog", (id, size, len, log));
        Ok(util::truncated_string(&buffer, length))
    }

    // Program operations

    /// Corresponds to `glCreateProgram`.
    pub fn create_program(&self) -> Result<u32> {
        let id = command!(self, CreateProgram, "glCreateProgram", ());
        trace!(target: "gl", "=> {}", id);
        Ok(id)
    }

    /// Corresponds to `glDeleteProgram`.
    pub fn delete_program(&self, id: u32) -> Result<()> {
        command!(self, DeleteProgram, "glDeleteProgram", (id));
        Ok(())
    }

    /// Corresponds to `glAttachShader`.
    pub fn attach_shader(&self, program: u32, shader: u32) -> Result<()> {
        command!(self, AttachShader, "glAttachShader", (program, shader));
        Ok(())
    }

    /// Corresponds to `glDetachShader`.
    pub fn detach_shader(&self, program: u32, shader: u32) -> Result<()> {
        command!(self, DetachShader, "glDetachShader", (program, shader));
        Ok(())
    }

    /// Corresponds to `glLinkProgram`.
    pub fn link_program(&self, id: u32) -> Result<()> {
        command!(self, LinkProgram, "glLinkProgram", (id));
        Ok(())
    }

    /// Corresponds to `glValidateProgram`.
    pub fn validate_program(&self, id: u32) -> Result<()> {
        command!(self, ValidateProgram, "glValidateProgram", (id));
        Ok(())
    }

    /// Corresponds to `glGetProgramiv` for a single value.
    pub fn get_program(&self, id: u32, pname: u32) -> Result<i32> {
        let mut value = 0;
        let params = &mut value as *mut i32;
        command!(self, GetProgramiv, "glGetProgramiv", (id, pname, params));
        Ok(value)
    }

    /// Corresponds to `glGetProgramInfoLog`.
    pub fn program_info_log(&self, id: u32) -> Result<String> {
        let capacity = self.get_program(id, gl::INFO_LOG_LENGTH)?;
        let mut buffer = vec![0u8; capacity.max(1) as usize];
        let mut length = 0;
        let size = buffer.len() as i32;
        let len = &mut length as *mut i32;
        let log = buffer.as_mut_ptr() as *mut gl::types::GLchar;
        command!(self, GetProgramInfoLog, "glGetProgramInfoLog", (id, size, len, log));
        Ok(util::truncated_string(&buffer, length))
    }

    /// Corresponds to `glGetActiveAttrib`.
    pub fn get_active_attrib(&self, id: u32, index: u32) -> Result<ActiveVariable> {
        let capacity = self.get_program(id, gl::ACTIVE_ATTRIBUTE_MAX_LENGTH)?;
        let mut buffer = vec![0u8; capacity.max(1) as usize];
        let (mut length, mut size, mut ty) = (0, 0, 0);
        let bufsize = buffer.len() as i32;
        let (len, sz, ty_ptr, name) = (
            &mut length as *mut i32,
            &mut size as *mut i32,
            &mut ty as *mut u32,
            buffer.as_mut_ptr() as *mut gl::types::GLchar,
        );
        command!(
            self,
            GetActiveAttrib,
            "glGetActiveAttrib",
            (id, index, bufsize, len, sz, ty_ptr, name),
        );
        Ok(ActiveVariable {
            name: util::truncated_string(&buffer, length),
            size,
            ty,
        })
    }

    /// Corresponds to `glGetActiveUniform`.
    pub fn get_active_uniform(&self, id: u32, index: u32) -> Result<ActiveVariable> {
        let capacity = self.get_program(id, gl::ACTIVE_UNIFORM_MAX_LENGTH)?;
        let mut buffer = vec![0u8; capacity.max(1) as usize];
        let (mut length, mut size, mut ty) = (0, 0, 0);
        let bufsize = buffer.len() as i32;
        let (len, sz, ty_ptr, name) = (
            &mut length as *mut i32,
            &mut size as *mut i32,
            &mut ty as *mut u32,
            buffer.as_mut_ptr() as *mut gl::types::GLchar,
        );
        command!(
            self,
            GetActiveUniform,
            "glGetActiveUniform",
            (id, index, bufsize, len, sz, ty_ptr, name),
        );
        Ok(ActiveVariable {
            name: util::truncated_string(&buffer, length),
            size,
            ty,
        })
    }

    /// Corresponds to `glGetAttribLocation`.
    pub fn get_attrib_location(&self, id: u32, name: &ffi::CStr) -> Result<i32> {
        let name = name.as_ptr();
        let location = command!(self, GetAttribLocation, "glGetAttribLocation", (id, name));
        trace!(target: "gl", "=> {}", location);
        Ok(location)
    }

    /// Corresponds to `glGetUniformLocation`.
    pub fn get_uniform_location(&self, id: u32, name: &ffi::CStr) -> Result<i32> {
        let name = name.as_ptr();
        let location = command!(self, GetUniformLocation, "glGetUniformLocation", (id, name));
        trace!(target: "gl", "=> {}", location);
        Ok(location)
    }

    /// Corresponds to `glUseProgram`.
    pub fn use_program(&self, id: u32) -> Result<()> {
        command!(self, UseProgram, "glUseProgram", (id));
        Ok(())
    }

    // Vertex array operations

    /// Corresponds to `glGenVertexArrays(1)`.
    pub fn gen_vertex_array(&self) -> Result<u32> {
        let mut id = 0;
        let ids = &mut id as *mut u32;
        command!(self, GenVertexArrays, "glGenVertexArrays", (1, ids));
        trace!(target: "gl", "=> {}", id);
        Ok(id)
    }

    /// Corresponds to `glDeleteVertexArrays(1)`.
    pub fn delete_vertex_array(&self, id: u32) -> Result<()> {
        let ids = &id as *const u32;
        command!(self, DeleteVertexArrays, "glDeleteVertexArrays", (1, ids));
        Ok(())
    }

    /// Corresponds to `glBindVertexArray`.
    pub fn bind_vertex_array(&self, id: u32) -> Result<()> {
        command!(self, BindVertexArray, "glBindVertexArray", (id));
        Ok(())
    }

    /// Corresponds to `glEnableVertexAttribArray`.
    pub fn enable_vertex_attrib_array(&self, index: u32) -> Result<()> {
        command!(self, EnableVertexAttribArray, "glEnableVertexAttribArray", (index));
        Ok(())
    }

    /// Corresponds to `glDisableVertexAttribArray`.
    pub fn disable_vertex_attrib_array(&self, index: u32) -> Result<()> {
        command!(self, DisableVertexAttribArray, "glDisableVertexAttribArray", (index));
        Ok(())
    }

    /// Corresponds to `glVertexAttribPointer` with a buffer offset.
    pub fn vertex_attrib_pointer(
        &self,
        index: u32,
        size: i32,
        ty: u32,
        normalized: bool,
        stride: i32,
        offset: usize,
    ) -> Result<()> {
        let normalized = if normalized { gl::TRUE } else { gl::FALSE };
        let pointer = offset as *const c_void;
        command!(
            self,
            VertexAttribPointer,
            "glVertexAttribPointer",
            (index, size, ty, normalized, stride, pointer),
        );
        Ok(())
    }

    /// Corresponds to `glVertexAttribIPointer` with a buffer offset.
    pub fn vertex_attrib_i_pointer(
        &self,
        index: u32,
        size: i32,
        ty: u32,
        stride: i32,
        offset: usize,
    ) -> Result<()> {
        let pointer = offset as *const c_void;
        command!(
            self,
            VertexAttribIPointer,
            "glVertexAttribIPointer",
            (index, size, ty, stride, pointer),
        );
        Ok(())
    }

    /// Corresponds to `glPrimitiveRestartIndex`.
    pub fn primitive_restart_index(&self, index: u32) -> Result<()> {
        command!(self, PrimitiveRestartIndex, "glPrimitiveRestartIndex", (index));
        Ok(())
    }

    // Draw call operations

    /// Corresponds to `glDrawArrays`.
    pub fn draw_arrays(&self, mode: u32, first: i32, count: i32) -> Result<()> {
        command!(self, DrawArrays, "glDrawArrays", (mode, first, count));
        Ok(())
    }

    /// Corresponds to `glDrawElements` with an index buffer offset.
    pub fn draw_elements(&self, mode: u32, count: i32, ty: u32, offset: usize) -> Result<()> {
        let indices = offset as *const c_void;
        command!(self, DrawElements, "glDrawElements", (mode, count, ty, indices));
        Ok(())
    }
}

impl CommandSet for CoreCommands {
    fn resolve(&mut self, resolver: &dyn Resolver) {
        let mut loaded = Loaded::default();
        self.table = gl::Gl::load_with(command::load_all(resolver, &mut loaded));
        self.guard = Guard::new(resolver.error_reporter());
        self.loaded = loaded;
        self.state = State::Resolved;
        debug!(target: "gl", "resolved {} core entry points", self.loaded.len());
    }

    fn state(&self) -> State {
        self.state
    }
}

impl Default for CoreCommands {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for CoreCommands {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("CoreCommands")
            .field("state", &self.state)
            .field("loaded", &self.loaded.len())
            .finish()
    }
}
