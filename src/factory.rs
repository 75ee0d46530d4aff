//! Resource creation on a render context.
//!
//! Every method issues GL calls and so requires the context to be
//! current on the calling thread.

use crate::buffer::{
    self,
    Buffer,
    IndexBuffer,
    IndexEncoding,
    Target,
    Usage,
    VertexBuffer,
    VertexSchema,
};
use crate::commands::ActiveVariable;
use crate::context::RenderContext;
use crate::error::{Error, Result};
use crate::gl;
use crate::platform::Platform;
use crate::program::Program;
use crate::resource::{Kind, Name, Resource};
use crate::shader::{Shader, Stage};
use crate::util;
use crate::vertex_array::VertexArray;
use fnv::FnvHashSet;

/// Uploads go through the copy-write binding so that the element array
/// binding of whatever VAO is bound stays untouched.
const UPLOAD_TARGET: u32 = gl::COPY_WRITE_BUFFER;

/// Size queries go through the copy-read binding.
const QUERY_TARGET: u32 = gl::COPY_READ_BUFFER;

impl<P: Platform> RenderContext<P> {
    fn resource(&self, name: Name, kind: Kind) -> Resource {
        Resource::new(self.display().id(), name, kind, self.display().garbage().tx())
    }

    fn create_buffer_object(&self, target: Target, usage: Usage, data: &[u8]) -> Result<Buffer> {
        let core = self.api().core();
        let name = core.gen_buffer()?;
        let buffer = Buffer::new(self.resource(name, Kind::Buffer), target, usage, data.len());
        core.bind_buffer(UPLOAD_TARGET, name)?;
        core.buffer_data(UPLOAD_TARGET, data, usage.as_gl_enum())?;
        core.bind_buffer(UPLOAD_TARGET, 0)?;
        Ok(buffer)
    }

    /// Creates a buffer initialized with `data`.
    pub fn create_buffer<T: Copy>(
        &self,
        target: Target,
        usage: Usage,
        data: &[T],
    ) -> Result<Buffer> {
        self.create_buffer_object(target, usage, util::as_bytes(data))
    }

    /// Creates an uninitialized buffer of `size` bytes.
    pub fn allocate_buffer(&self, target: Target, usage: Usage, size: usize) -> Result<Buffer> {
        let core = self.api().core();
        let name = core.gen_buffer()?;
        let buffer = Buffer::new(self.resource(name, Kind::Buffer), target, usage, size);
        core.bind_buffer(UPLOAD_TARGET, name)?;
        core.allocate_buffer(UPLOAD_TARGET, size, usage.as_gl_enum())?;
        core.bind_buffer(UPLOAD_TARGET, 0)?;
        Ok(buffer)
    }

    /// Creates an index buffer.
    ///
    /// `data` must hold whole elements of `encoding`, and `restart` must
    /// be representable in it.
    pub fn create_index_buffer<T: Copy>(
        &self,
        encoding: IndexEncoding,
        restart: Option<u32>,
        usage: Usage,
        data: &[T],
    ) -> Result<IndexBuffer> {
        buffer::validate_restart(encoding, restart)?;
        let bytes = util::as_bytes(data);
        if bytes.len() % encoding.size() != 0 {
            return Err(Error::invalid(format!(
                "{} bytes is not a whole number of {:?} indices",
                bytes.len(),
                encoding,
            )));
        }
        let buffer = self.create_buffer_object(Target::ElementArray, usage, bytes)?;
        IndexBuffer::new(buffer, encoding, restart)
    }

    /// Creates a vertex buffer annotated with `schema`.
    pub fn create_vertex_buffer<T: Copy>(
        &self,
        schema: VertexSchema,
        usage: Usage,
        data: &[T],
    ) -> Result<VertexBuffer> {
        let buffer = self.create_buffer_object(Target::Array, usage, util::as_bytes(data))?;
        Ok(VertexBuffer::new(buffer, schema))
    }

    /// Overwrites part of a buffer.
    pub fn upload<B, T>(&self, buffer: &B, offset: usize, data: &[T]) -> Result<()>
        where B: AsRef<Buffer>, T: Copy
    {
        let buffer = buffer.as_ref();
        self.check_owner(buffer.display())?;
        let bytes = util::as_bytes(data);
        match offset.checked_add(bytes.len()) {
            Some(end) if end <= buffer.size() => {}
            _ => {
                return Err(Error::invalid(format!(
                    "upload of {} bytes at {} overruns buffer of {} bytes",
                    bytes.len(),
                    offset,
                    buffer.size(),
                )));
            }
        }
        let core = self.api().core();
        core.bind_buffer(UPLOAD_TARGET, buffer.name())?;
        core.buffer_sub_data(UPLOAD_TARGET, offset, bytes)?;
        core.bind_buffer(UPLOAD_TARGET, 0)?;
        Ok(())
    }

    /// Queries the size of a buffer's data store from the driver.
    pub fn buffer_size<B: AsRef<Buffer>>(&self, buffer: &B) -> Result<usize> {
        let buffer = buffer.as_ref();
        self.check_owner(buffer.display())?;
        let core = self.api().core();
        core.bind_buffer(QUERY_TARGET, buffer.name())?;
        let size = core.get_buffer_parameter(QUERY_TARGET, gl::BUFFER_SIZE)?;
        core.bind_buffer(QUERY_TARGET, 0)?;
        Ok(size.max(0) as usize)
    }

    /// Compiles GLSL source into a shader object.
    ///
    /// Compilation failure is not an error; query it with
    /// [`is_compiled`](#method.is_compiled).
    pub fn create_shader(&self, stage: Stage, source: &str) -> Result<Shader> {
        let source = util::cstring(source)?;
        let core = self.api().core();
        let name = core.create_shader(stage.as_gl_enum())?;
        let shader = Shader::new(self.resource(name, Kind::Shader), stage);
        core.shader_source(name, &source)?;
        core.compile_shader(name)?;
        Ok(shader)
    }

    /// Returns the compile status of a shader.
    pub fn is_compiled(&self, shader: &Shader) -> Result<bool> {
        self.check_owner(shader.display())?;
        let status = self.api().core().get_shader(shader.name(), gl::COMPILE_STATUS)?;
        Ok(status != 0)
    }

    /// Returns the compiler log of a shader.
    pub fn shader_info_log(&self, shader: &Shader) -> Result<String> {
        self.check_owner(shader.display())?;
        self.api().core().shader_info_log(shader.name())
    }

    /// Links shader objects into a program.
    ///
    /// Link failure is not an error; query it with
    /// [`is_linked`](#method.is_linked).
    pub fn create_program(&self, shaders: &[&Shader]) -> Result<Program> {
        for shader in shaders {
            self.check_owner(shader.display())?;
        }
        let core = self.api().core();
        let name = core.create_program()?;
        let program = Program::new(self.resource(name, Kind::Program));
        for shader in shaders {
            core.attach_shader(name, shader.name())?;
        }
        core.link_program(name)?;
        for shader in shaders {
            core.detach_shader(name, shader.name())?;
        }
        Ok(program)
    }

    /// Returns the link status of a program.
    pub fn is_linked(&self, program: &Program) -> Result<bool> {
        self.check_owner(program.display())?;
        let status = self.api().core().get_program(program.name(), gl::LINK_STATUS)?;
        Ok(status != 0)
    }

    /// Validates a program against the current pipeline state.
    pub fn validate(&self, program: &Program) -> Result<bool> {
        self.check_owner(program.display())?;
        let core = self.api().core();
        core.validate_program(program.name())?;
        Ok(core.get_program(program.name(), gl::VALIDATE_STATUS)? != 0)
    }

    /// Returns the linker log of a program.
    pub fn program_info_log(&self, program: &Program) -> Result<String> {
        self.check_owner(program.display())?;
        self.api().core().program_info_log(program.name())
    }

    /// Lists the active vertex attributes of a linked program.
    pub fn active_attributes(&self, program: &Program) -> Result<Vec<ActiveVariable>> {
        self.check_owner(program.display())?;
        let core = self.api().core();
        let count = core.get_program(program.name(), gl::ACTIVE_ATTRIBUTES)?;
        (0..count.max(0) as u32)
            .map(|index| core.get_active_attrib(program.name(), index))
            .collect()
    }

    /// Lists the active uniforms of a linked program.
    pub fn active_uniforms(&self, program: &Program) -> Result<Vec<ActiveVariable>> {
        self.check_owner(program.display())?;
        let core = self.api().core();
        let count = core.get_program(program.name(), gl::ACTIVE_UNIFORMS)?;
        (0..count.max(0) as u32)
            .map(|index| core.get_active_uniform(program.name(), index))
            .collect()
    }

    /// Returns the location of a named vertex attribute.
    pub fn attrib_location(&self, program: &Program, name: &str) -> Result<Option<u32>> {
        self.check_owner(program.display())?;
        let name = util::cstring(name)?;
        match self.api().core().get_attrib_location(program.name(), &name)? {
            -1 => Ok(None),
            x => Ok(Some(x as u32)),
        }
    }

    /// Returns the location of a named uniform.
    pub fn uniform_location(&self, program: &Program, name: &str) -> Result<Option<i32>> {
        self.check_owner(program.display())?;
        let name = util::cstring(name)?;
        match self.api().core().get_uniform_location(program.name(), &name)? {
            -1 => Ok(None),
            x => Ok(Some(x)),
        }
    }

    /// Binds a program for subsequent draw calls, or unbinds with `None`.
    pub fn use_program(&self, program: Option<&Program>) -> Result<()> {
        let name = match program {
            Some(program) => {
                self.check_owner(program.display())?;
                program.name()
            }
            None => 0,
        };
        self.api().core().use_program(name)
    }

    /// Creates a vertex array binding each vertex buffer's schema to its
    /// attribute locations, and `indices` as the element array buffer.
    pub fn create_vertex_array(
        &self,
        vertices: &[&VertexBuffer],
        indices: Option<&IndexBuffer>,
    ) -> Result<VertexArray> {
        let mut locations = FnvHashSet::default();
        for vertex_buffer in vertices {
            self.check_owner(vertex_buffer.buffer().display())?;
            for attribute in vertex_buffer.schema().attributes() {
                if !locations.insert(attribute.location) {
                    return Err(Error::invalid(format!(
                        "location {} is bound by two vertex buffers",
                        attribute.location,
                    )));
                }
            }
        }
        if let Some(index_buffer) = indices {
            self.check_owner(index_buffer.buffer().display())?;
        }

        let core = self.api().core();
        let name = core.gen_vertex_array()?;
        let vertex_array = VertexArray::new(
            self.resource(name, Kind::VertexArray).owned_by(self.id()),
            vertices.iter().map(|&vb| vb.clone()).collect(),
            indices.cloned(),
        );
        core.bind_vertex_array(name)?;
        for vertex_buffer in vertices {
            let schema = vertex_buffer.schema();
            let stride = schema.stride() as i32;
            core.bind_buffer(gl::ARRAY_BUFFER, vertex_buffer.buffer().name())?;
            for attribute in schema.attributes() {
                let size = attribute.components as i32;
                let ty = attribute.ty.as_gl_enum();
                core.enable_vertex_attrib_array(attribute.location)?;
                if attribute.integer {
                    core.vertex_attrib_i_pointer(attribute.location, size, ty, stride, attribute.offset)?;
                } else {
                    core.vertex_attrib_pointer(
                        attribute.location,
                        size,
                        ty,
                        attribute.normalized,
                        stride,
                        attribute.offset,
                    )?;
                }
            }
        }
        if let Some(index_buffer) = indices {
            core.bind_buffer(gl::ELEMENT_ARRAY_BUFFER, index_buffer.buffer().name())?;
        }
        core.bind_vertex_array(0)?;
        core.bind_buffer(gl::ARRAY_BUFFER, 0)?;
        Ok(vertex_array)
    }

    /// Binds a vertex array and applies the primitive restart state of
    /// its index buffer.
    ///
    /// The vertex array must have been created by this context.
    pub fn bind_vertex_array(&self, vertex_array: &VertexArray) -> Result<()> {
        self.check_context(vertex_array.display(), vertex_array.context())?;
        let core = self.api().core();
        core.bind_vertex_array(vertex_array.name())?;
        match vertex_array.indices().and_then(|indices| indices.restart_index()) {
            Some(index) => {
                core.enable(gl::PRIMITIVE_RESTART)?;
                core.primitive_restart_index(index)?;
            }
            None => core.disable(gl::PRIMITIVE_RESTART)?,
        }
        Ok(())
    }

    /// Draws `count` vertices of a vertex array starting at `first`.
    pub fn draw_arrays(
        &self,
        vertex_array: &VertexArray,
        mode: u32,
        first: usize,
        count: usize,
    ) -> Result<()> {
        let first = util::to_glsizei("first vertex", first)?;
        let count = util::to_glsizei("vertex count", count)?;
        self.bind_vertex_array(vertex_array)?;
        self.api().core().draw_arrays(mode, first, count)
    }

    /// Draws every index of a vertex array's index buffer.
    pub fn draw_elements(&self, vertex_array: &VertexArray, mode: u32) -> Result<()> {
        let indices = vertex_array
            .indices()
            .ok_or_else(|| Error::invalid("vertex array has no index buffer"))?;
        let count = util::to_glsizei("index count", indices.len())?;
        self.bind_vertex_array(vertex_array)?;
        let ty = indices.encoding().as_gl_enum();
        self.api().core().draw_elements(mode, count, ty, 0)
    }
}
