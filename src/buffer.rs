//! GPU buffer objects.

use crate::error::{Error, Result};
use crate::gl;
use crate::resource::{Name, Resource};
use crate::util;
use arrayvec::ArrayVec;
use std::{cmp, fmt, hash, sync};

/// The maximum number of attributes in a vertex schema.
pub const MAX_ATTRIBUTES: usize = 16;

/// Determines what the buffer may be bound as.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Target {
    /// Corresponds to `GL_ARRAY_BUFFER`.
    Array,

    /// Corresponds to `GL_ELEMENT_ARRAY_BUFFER`.
    ElementArray,

    /// Corresponds to `GL_UNIFORM_BUFFER`.
    Uniform,

    /// Corresponds to `GL_TEXTURE_BUFFER`.
    Texture,

    /// Corresponds to `GL_COPY_READ_BUFFER`.
    CopyRead,

    /// Corresponds to `GL_COPY_WRITE_BUFFER`.
    CopyWrite,
}

impl Target {
    /// Returns the equivalent OpenGL enumeration constant.
    pub fn as_gl_enum(self) -> u32 {
        match self {
            Target::Array => gl::ARRAY_BUFFER,
            Target::ElementArray => gl::ELEMENT_ARRAY_BUFFER,
            Target::Uniform => gl::UNIFORM_BUFFER,
            Target::Texture => gl::TEXTURE_BUFFER,
            Target::CopyRead => gl::COPY_READ_BUFFER,
            Target::CopyWrite => gl::COPY_WRITE_BUFFER,
        }
    }
}

/// A buffer data usage hint.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Usage {
    /// Corresponds to `GL_STATIC_DRAW`.
    StaticDraw,

    /// Corresponds to `GL_DYNAMIC_DRAW`.
    DynamicDraw,

    /// Corresponds to `GL_STREAM_DRAW`.
    StreamDraw,
}

impl Usage {
    /// Returns the equivalent OpenGL enumeration constant.
    pub fn as_gl_enum(self) -> u32 {
        match self {
            Usage::StaticDraw => gl::STATIC_DRAW,
            Usage::DynamicDraw => gl::DYNAMIC_DRAW,
            Usage::StreamDraw => gl::STREAM_DRAW,
        }
    }
}

/// A contiguous region of GPU memory.
#[derive(Clone)]
pub struct Buffer {
    /// Deletes the buffer on the owning display upon destruction.
    resource: sync::Arc<Resource>,

    /// The binding target used for uploads.
    target: Target,

    /// Data usage hint.
    usage: Usage,

    /// The number of bytes held by the buffer.
    size: usize,
}

impl Buffer {
    /// Constructor.
    pub(crate) fn new(resource: Resource, target: Target, usage: Usage, size: usize) -> Self {
        Self {
            resource: sync::Arc::new(resource),
            target,
            usage,
            size,
        }
    }

    /// Returns the OpenGL buffer name.
    pub fn name(&self) -> Name {
        self.resource.name()
    }

    /// Returns the id of the owning display.
    pub(crate) fn display(&self) -> usize {
        self.resource.display()
    }

    /// Returns the binding target.
    pub fn target(&self) -> Target {
        self.target
    }

    /// Returns the buffer data usage hint.
    pub fn usage(&self) -> Usage {
        self.usage
    }

    /// Returns the number of bytes this buffer contains.
    pub fn size(&self) -> usize {
        self.size
    }
}

impl AsRef<Buffer> for Buffer {
    fn as_ref(&self) -> &Buffer {
        self
    }
}

impl cmp::PartialEq<Self> for Buffer {
    fn eq(&self, other: &Self) -> bool {
        self.name() == other.name() && self.display() == other.display()
    }
}

impl cmp::Eq for Buffer {}

impl fmt::Debug for Buffer {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        #[derive(Debug)]
        struct Buffer {
            name: Name,
            target: Target,
            usage: Usage,
            size: usize,
        }

        Buffer {
            name: self.name(),
            target: self.target,
            usage: self.usage,
            size: self.size,
        }.fmt(f)
    }
}

impl hash::Hash for Buffer {
    fn hash<H: hash::Hasher>(&self, state: &mut H) {
        self.display().hash(state);
        self.name().hash(state);
    }
}

/// Element type of an index buffer.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum IndexEncoding {
    /// Corresponds to `GL_UNSIGNED_BYTE`.
    U8,

    /// Corresponds to `GL_UNSIGNED_SHORT`.
    U16,

    /// Corresponds to `GL_UNSIGNED_INT`.
    U32,
}

impl IndexEncoding {
    /// Returns the size of one element in bytes.
    pub fn size(self) -> usize {
        match self {
            IndexEncoding::U8 => 1,
            IndexEncoding::U16 => 2,
            IndexEncoding::U32 => 4,
        }
    }

    /// Returns the largest representable index.
    pub fn max_index(self) -> u32 {
        match self {
            IndexEncoding::U8 => u8::max_value() as u32,
            IndexEncoding::U16 => u16::max_value() as u32,
            IndexEncoding::U32 => u32::max_value(),
        }
    }

    /// Returns the equivalent OpenGL data type.
    pub fn as_gl_enum(self) -> u32 {
        match self {
            IndexEncoding::U8 => gl::UNSIGNED_BYTE,
            IndexEncoding::U16 => gl::UNSIGNED_SHORT,
            IndexEncoding::U32 => gl::UNSIGNED_INT,
        }
    }
}

/// A buffer of draw sequence indices.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct IndexBuffer {
    buffer: Buffer,
    encoding: IndexEncoding,

    /// The primitive restart index, if primitive restart is enabled.
    restart: Option<u32>,
}

impl IndexBuffer {
    /// Constructor.
    ///
    /// Fails when the restart index does not fit `encoding`.
    pub(crate) fn new(
        buffer: Buffer,
        encoding: IndexEncoding,
        restart: Option<u32>,
    ) -> Result<Self> {
        validate_restart(encoding, restart)?;
        Ok(Self { buffer, encoding, restart })
    }

    /// Returns the underlying buffer.
    pub fn buffer(&self) -> &Buffer {
        &self.buffer
    }

    /// Returns the element encoding.
    pub fn encoding(&self) -> IndexEncoding {
        self.encoding
    }

    /// Returns the number of indices held.
    pub fn len(&self) -> usize {
        self.buffer.size() / self.encoding.size()
    }

    /// Returns `true` if the buffer holds no indices.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns `true` if primitive restart is enabled.
    pub fn is_restart_enabled(&self) -> bool {
        self.restart.is_some()
    }

    /// Returns the primitive restart index, if enabled.
    pub fn restart_index(&self) -> Option<u32> {
        self.restart
    }
}

impl AsRef<Buffer> for IndexBuffer {
    fn as_ref(&self) -> &Buffer {
        &self.buffer
    }
}

/// Checks that a restart index is representable in `encoding`.
pub fn validate_restart(encoding: IndexEncoding, restart: Option<u32>) -> Result<()> {
    match restart {
        Some(index) if index > encoding.max_index() => Err(Error::invalid(format!(
            "restart index {} does not fit {:?}",
            index,
            encoding,
        ))),
        _ => Ok(()),
    }
}

/// Component type of a vertex attribute.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ComponentType {
    I8,
    U8,
    I16,
    U16,
    I32,
    U32,
    F16,
    F32,
    F64,
}

impl ComponentType {
    /// Returns the size of one component in bytes.
    pub fn size(self) -> usize {
        match self {
            ComponentType::I8 | ComponentType::U8 => 1,
            ComponentType::I16 | ComponentType::U16 | ComponentType::F16 => 2,
            ComponentType::I32 | ComponentType::U32 | ComponentType::F32 => 4,
            ComponentType::F64 => 8,
        }
    }

    /// Returns `true` for the integer types.
    pub fn is_integer(self) -> bool {
        match self {
            ComponentType::F16 | ComponentType::F32 | ComponentType::F64 => false,
            _ => true,
        }
    }

    /// Returns the equivalent OpenGL data type.
    pub fn as_gl_enum(self) -> u32 {
        match self {
            ComponentType::I8 => gl::BYTE,
            ComponentType::U8 => gl::UNSIGNED_BYTE,
            ComponentType::I16 => gl::SHORT,
            ComponentType::U16 => gl::UNSIGNED_SHORT,
            ComponentType::I32 => gl::INT,
            ComponentType::U32 => gl::UNSIGNED_INT,
            ComponentType::F16 => gl::HALF_FLOAT,
            ComponentType::F32 => gl::FLOAT,
            ComponentType::F64 => gl::DOUBLE,
        }
    }
}

/// Describes one vertex attribute within a vertex.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Attribute {
    /// Binding location in the vertex shader.
    pub location: u32,

    /// Number of components, 1 to 4.
    pub components: u8,

    /// Component type.
    pub ty: ComponentType,

    /// Integer components are normalized to `[0, 1]` or `[-1, 1]`.
    pub normalized: bool,

    /// Integer components are passed through unconverted.
    pub integer: bool,

    /// Byte offset within the vertex.
    pub offset: usize,
}

impl Attribute {
    /// A float-converted attribute.
    pub fn new(
        location: u32,
        components: u8,
        ty: ComponentType,
        normalized: bool,
        offset: usize,
    ) -> Self {
        Self {
            location,
            components,
            ty,
            normalized,
            integer: false,
            offset,
        }
    }

    /// An integer attribute bound with `glVertexAttribIPointer`.
    pub fn integer(location: u32, components: u8, ty: ComponentType, offset: usize) -> Self {
        Self {
            location,
            components,
            ty,
            normalized: false,
            integer: true,
            offset,
        }
    }

    /// Returns the size of the attribute in bytes.
    pub fn size(&self) -> usize {
        self.components as usize * self.ty.size()
    }
}

/// The attribute layout of the vertices in a vertex buffer.
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct VertexSchema {
    attributes: ArrayVec<Attribute, MAX_ATTRIBUTES>,
    stride: usize,
}

impl VertexSchema {
    /// A schema with no attributes.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Builds and validates a schema.
    ///
    /// Locations must be unique, each attribute must have one to four
    /// components and lie within `stride`, and `stride` must be
    /// positive when there are attributes.
    pub fn new(stride: usize, attributes: &[Attribute]) -> Result<Self> {
        if attributes.len() > MAX_ATTRIBUTES {
            return Err(Error::invalid(format!(
                "{} attributes exceed the maximum of {}",
                attributes.len(),
                MAX_ATTRIBUTES,
            )));
        }
        if !attributes.is_empty() && stride == 0 {
            return Err(Error::invalid("vertex schema with attributes has zero stride"));
        }
        util::to_glsizei("vertex stride", stride)?;
        let mut schema = Self { attributes: ArrayVec::new(), stride };
        for attribute in attributes {
            if attribute.components == 0 || attribute.components > 4 {
                return Err(Error::invalid(format!(
                    "attribute {} has {} components",
                    attribute.location,
                    attribute.components,
                )));
            }
            if attribute.integer && !attribute.ty.is_integer() {
                return Err(Error::invalid(format!(
                    "attribute {} is integer but has {:?} components",
                    attribute.location,
                    attribute.ty,
                )));
            }
            match attribute.offset.checked_add(attribute.size()) {
                Some(end) if end <= stride => {}
                _ => {
                    return Err(Error::invalid(format!(
                        "attribute {} at offset {} does not fit stride {}",
                        attribute.location,
                        attribute.offset,
                        stride,
                    )));
                }
            }
            if schema.attribute(attribute.location).is_some() {
                return Err(Error::invalid(format!(
                    "location {} is bound twice",
                    attribute.location,
                )));
            }
            schema.attributes.push(*attribute);
        }
        Ok(schema)
    }

    /// Returns the attributes in declaration order.
    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    /// Returns the attribute bound to `location`.
    pub fn attribute(&self, location: u32) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.location == location)
    }

    /// Returns the size of one vertex in bytes.
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Returns `true` if the schema has no attributes.
    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }
}

/// A buffer of vertices annotated with their attribute layout.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct VertexBuffer {
    buffer: Buffer,
    schema: VertexSchema,
}

impl VertexBuffer {
    /// Constructor.
    pub(crate) fn new(buffer: Buffer, schema: VertexSchema) -> Self {
        Self { buffer, schema }
    }

    /// Returns the underlying buffer.
    pub fn buffer(&self) -> &Buffer {
        &self.buffer
    }

    /// Returns the vertex schema.
    pub fn schema(&self) -> &VertexSchema {
        &self.schema
    }

    /// Returns the number of whole vertices held.
    pub fn len(&self) -> usize {
        match self.schema.stride {
            0 => 0,
            stride => self.buffer.size() / stride,
        }
    }

    /// Returns `true` if the buffer holds no whole vertex.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl AsRef<Buffer> for VertexBuffer {
    fn as_ref(&self) -> &Buffer {
        &self.buffer
    }
}
